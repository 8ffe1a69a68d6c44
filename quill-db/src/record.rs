use quill_common::{
    model::{
        ModelValidationError,
        account::{Account, EmailAddress, Username},
        auth::Session,
        post::{Content, Post, Title},
    },
    util::PositiveDuration,
};
use time::PrimitiveDateTime;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, sqlx::FromRow)]
pub(crate) struct AccountRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Account row plus its stored password hash; only the credential check
/// ever selects this shape.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, sqlx::FromRow)]
pub(crate) struct CredentialsRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, sqlx::FromRow)]
pub(crate) struct PostRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub date_posted: PrimitiveDateTime,
    pub account_id: i64,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, sqlx::FromRow)]
pub(crate) struct SessionRecord {
    pub account_id: i64,
    pub token_hash: Vec<u8>,
    pub created_at: PrimitiveDateTime,
    pub expires_after_seconds: Option<i64>,
}

impl TryFrom<AccountRecord> for Account {
    type Error = ModelValidationError;

    fn try_from(value: AccountRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            username: Username::new(value.username)?,
            email: EmailAddress::new(value.email)?,
        })
    }
}

impl TryFrom<CredentialsRecord> for Account {
    type Error = ModelValidationError;

    fn try_from(value: CredentialsRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            username: Username::new(value.username)?,
            email: EmailAddress::new(value.email)?,
        })
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            title: Title::new(value.title)?,
            content: Content::new(value.content)?,
            date_posted: value.date_posted.as_utc(),
            author: value.account_id.into(),
        })
    }
}

impl TryFrom<SessionRecord> for Session {
    type Error = ModelValidationError;

    fn try_from(value: SessionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            account: value.account_id.into(),
            token_hash: value.token_hash.try_into()?,
            created_at: value.created_at.as_utc(),
            expires_after: value
                .expires_after_seconds
                .map(PositiveDuration::from_seconds)
                .transpose()?,
        })
    }
}

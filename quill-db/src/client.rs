use crate::record::{AccountRecord, CredentialsRecord, PostRecord, SessionRecord};
use quill_common::model::{
    Id, ModelValidationError,
    account::{Account, AccountMarker, EmailAddress, Password, Username},
    auth::{self, PasswordHashError, Session, SessionTokenHash},
    post::{Post, PostDraft},
};
use sqlx::PgPool;
use thiserror::Error;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

const ACCOUNT_COLUMNS: &str = "id, username, email";
const POST_COLUMNS: &str = "id, title, content, date_posted, account_id";
const SESSION_COLUMNS: &str = "account_id, token_hash, created_at, expires_after_seconds";

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new account. The password is stored only as a salted argon2
    /// hash. Uniqueness of username and email is left entirely to the
    /// database constraints so that concurrent registrations cannot race
    /// past an application-level pre-check.
    pub async fn register(
        &self,
        username: &Username,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<Account> {
        let password_hash = auth::hash_password(password)?;

        let query = format!(
            "
            INSERT INTO accounts (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {ACCOUNT_COLUMNS}
            "
        );
        let record = sqlx::query_as::<_, AccountRecord>(&query)
            .bind(username.get())
            .bind(email.get())
            .bind(&password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(classify_unique_violation)?;

        Ok(record.try_into()?)
    }

    /// Look up the account for a username and verify the password against
    /// the stored hash. A missing account and a failed verification are
    /// indistinguishable to the caller.
    pub async fn verify_credentials(
        &self,
        username: &Username,
        password: &Password,
    ) -> Result<Account> {
        let query = format!(
            "
            SELECT {ACCOUNT_COLUMNS}, password_hash
            FROM accounts
            WHERE username = $1
            "
        );
        let record = sqlx::query_as::<_, CredentialsRecord>(&query)
            .bind(username.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::InvalidCredentials)?;

        if auth::verify_password(password, &record.password_hash)? {
            Ok(record.try_into()?)
        } else {
            Err(DbError::InvalidCredentials)
        }
    }

    pub async fn fetch_account(&self, account_id: Id<AccountMarker>) -> Result<Option<Account>> {
        let query = format!(
            "
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            WHERE id = $1
            "
        );
        let record = sqlx::query_as::<_, AccountRecord>(&query)
            .bind(account_id.get())
            .fetch_optional(&self.pool)
            .await?;

        let account = record.map(Account::try_from).transpose()?;
        Ok(account)
    }

    /// All posts owned by the account, most recent first. The explicit
    /// ordering clause (timestamp, then id) keeps same-timestamp inserts
    /// deterministic.
    pub async fn list_posts_for_owner(&self, owner: Id<AccountMarker>) -> Result<Vec<Post>> {
        let query = format!(
            "
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE account_id = $1
            ORDER BY date_posted DESC, id DESC
            "
        );
        let records = sqlx::query_as::<_, PostRecord>(&query)
            .bind(owner.get())
            .fetch_all(&self.pool)
            .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    pub async fn create_post(&self, owner: Id<AccountMarker>, draft: &PostDraft) -> Result<Post> {
        let query = format!(
            "
            INSERT INTO posts (title, content, account_id)
            VALUES ($1, $2, $3)
            RETURNING {POST_COLUMNS}
            "
        );
        let record = sqlx::query_as::<_, PostRecord>(&query)
            .bind(draft.title.get())
            .bind(draft.content.get())
            .bind(owner.get())
            .fetch_one(&self.pool)
            .await?;

        Ok(record.try_into()?)
    }

    pub async fn create_session(
        &self,
        account_id: Id<AccountMarker>,
        token_hash: &SessionTokenHash,
    ) -> Result<()> {
        sqlx::query(
            "
            INSERT INTO sessions (token_hash, account_id)
            VALUES ($1, $2)
            ",
        )
        .bind(token_hash.as_bytes())
        .bind(account_id.get())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn fetch_session(&self, token_hash: &SessionTokenHash) -> Result<Option<Session>> {
        let query = format!(
            "
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE token_hash = $1
            "
        );
        let record = sqlx::query_as::<_, SessionRecord>(&query)
            .bind(token_hash.as_bytes())
            .fetch_optional(&self.pool)
            .await?;

        let session = record.map(Session::try_from).transpose()?;
        Ok(session)
    }

    pub async fn delete_session(&self, token_hash: &SessionTokenHash) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash.as_bytes())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Turn a unique-constraint violation on the accounts table into the
/// matching domain error; everything else passes through untouched.
fn classify_unique_violation(err: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
    {
        match db_err.constraint() {
            Some("accounts_username_key") => return DbError::DuplicateUsername,
            Some("accounts_email_key") => return DbError::DuplicateEmail,
            _ => {}
        }
    }

    DbError::Sqlx(err)
}

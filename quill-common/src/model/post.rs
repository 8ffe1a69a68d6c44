use crate::model::{
    Id, ModelValidationError,
    account::AccountMarker,
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;
use time::UtcDateTime;

pub const TITLE_MAX_LEN: usize = 100;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: Title,
    pub content: Content,
    pub date_posted: UtcDateTime,
    pub author: Id<AccountMarker>,
}

/// Validated input for post creation. Constructing a draft is the only way
/// to reach the insert path, so empty titles or bodies never hit the store.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct PostDraft {
    pub title: Title,
    pub content: Content,
}

impl PostDraft {
    pub fn new(title: String, content: String) -> Result<Self, ModelValidationError> {
        Ok(Self {
            title: Title::new(title)?,
            content: Content::new(content)?,
        })
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Title(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The title is invalid: {0}")]
pub struct InvalidTitleError(String);

impl Title {
    pub fn new(title: String) -> Result<Self, InvalidTitleError> {
        let length = title.chars().count();
        if (1..=TITLE_MAX_LEN).contains(&length) {
            Ok(Title(title))
        } else {
            Err(InvalidTitleError(title))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Title {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Title::new(inner).map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Title"))
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Content(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The post content must not be empty")]
pub struct EmptyContentError;

impl Content {
    pub fn new(content: String) -> Result<Self, EmptyContentError> {
        if content.is_empty() {
            Err(EmptyContentError)
        } else {
            Ok(Content(content))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Content::new(inner).map_err(|_| Error::invalid_value(Unexpected::Str(""), &"Content"))
    }
}

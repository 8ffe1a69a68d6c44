use crate::model::Id;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::{Debug, Formatter};
use thiserror::Error;

pub const USERNAME_MAX_LEN: usize = 80;
pub const EMAIL_MAX_LEN: usize = 120;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct AccountMarker;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct Account {
    pub id: Id<AccountMarker>,
    pub username: Username,
    pub email: EmailAddress,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The username is invalid: {0}")]
pub struct InvalidUsernameError(String);

impl Username {
    pub fn new(username: String) -> Result<Self, InvalidUsernameError> {
        let length = username.chars().count();
        if (1..=USERNAME_MAX_LEN).contains(&length) {
            Ok(Username(username))
        } else {
            Err(InvalidUsernameError(username))
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

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Username::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Username"))
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The email address is invalid: {0}")]
pub struct InvalidEmailError(String);

impl EmailAddress {
    pub fn new(email: String) -> Result<Self, InvalidEmailError> {
        let length = email.chars().count();
        if (1..=EMAIL_MAX_LEN).contains(&length) {
            Ok(EmailAddress(email))
        } else {
            Err(InvalidEmailError(email))
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

impl<'de> Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        EmailAddress::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"EmailAddress"))
    }
}

/// A plaintext password in transit. Only ever held long enough to hash or
/// verify; `Debug` never prints the contents.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Password(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The password must not be empty")]
pub struct EmptyPasswordError;

impl Password {
    pub fn new(password: String) -> Result<Self, EmptyPasswordError> {
        if password.is_empty() {
            Err(EmptyPasswordError)
        } else {
            Ok(Password(password))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Password").field(&"[redacted]").finish()
    }
}

impl<'de> Deserialize<'de> for Password {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Password::new(inner).map_err(Error::custom)
    }
}

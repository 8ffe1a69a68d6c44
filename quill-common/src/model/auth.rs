use crate::{
    model::{Id, account::{AccountMarker, Password}},
    util::PositiveDuration,
};
use argon2::{
    Argon2, Params,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{DecodeError, Engine, display::Base64Display, prelude::BASE64_STANDARD};
use std::{
    fmt::{Debug, Formatter},
    num::ParseIntError,
    str::FromStr,
};
use thiserror::Error;
use time::UtcDateTime;

pub const SESSION_TOKEN_CORE_LEN: usize = 24;
pub const SESSION_TOKEN_SALT_LEN: usize = 18;
pub const SESSION_TOKEN_HASH_LEN: usize = Params::DEFAULT_OUTPUT_LEN;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing session token failed: {0}")]
pub struct SessionTokenHashError(argon2::Error);

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum SessionTokenDecodeError {
    #[error("Not enough parts separated by ':'")]
    NotEnoughParts,
    #[error("Invalid account id: {0}")]
    InvalidAccountId(ParseIntError),
    #[error("Decoding base64 failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("The length of the core part is incorrect")]
    InvalidCoreLength,
    #[error("The length of the salt part is incorrect")]
    InvalidSaltLength,
}

/// The client-held session credential: the account id plus random core and
/// salt bytes. Only the argon2 hash of the core ever reaches the database,
/// so a leaked sessions table cannot be replayed.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SessionToken {
    pub account_id: Id<AccountMarker>,
    pub core: [u8; SESSION_TOKEN_CORE_LEN],
    pub salt: [u8; SESSION_TOKEN_SALT_LEN],
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SessionTokenHash(pub Box<[u8; SESSION_TOKEN_HASH_LEN]>);

/// Server-side session row: which account a token hash belongs to and when
/// the association was made. `expires_after` is optional; no lifetime policy
/// is imposed when it is absent.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Session {
    pub account: Id<AccountMarker>,
    pub token_hash: SessionTokenHash,
    pub created_at: UtcDateTime,
    pub expires_after: Option<PositiveDuration>,
}

impl SessionToken {
    #[must_use]
    pub fn generate_random(account_id: Id<AccountMarker>) -> Self {
        let core = rand::random();
        let salt = rand::random();

        Self {
            account_id,
            core,
            salt,
        }
    }

    #[must_use]
    pub fn as_token_str(&self) -> String {
        let account_id = self.account_id;
        let encoded_core = Base64Display::new(&self.core, &BASE64_STANDARD);
        let encoded_salt = Base64Display::new(&self.salt, &BASE64_STANDARD);

        format!("{account_id}:{encoded_core}:{encoded_salt}")
    }

    pub fn hash(&self) -> Result<SessionTokenHash, SessionTokenHashError> {
        let argon2 = Argon2::default();

        let mut hash = Box::new([0; SESSION_TOKEN_HASH_LEN]);
        argon2
            .hash_password_into(&self.core, &self.salt, &mut *hash)
            .map_err(SessionTokenHashError)?;

        Ok(SessionTokenHash(hash))
    }
}

impl FromStr for SessionToken {
    type Err = SessionTokenDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');

        let account_id_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let core_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let salt_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;

        let account_id = i64::from_str(account_id_part)
            .map_err(Self::Err::InvalidAccountId)?
            .into();
        let core = BASE64_STANDARD
            .decode(core_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidCoreLength)?;
        let salt = BASE64_STANDARD
            .decode(salt_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSaltLength)?;

        Ok(Self {
            account_id,
            core,
            salt,
        })
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("account_id", &self.account_id)
            .field("core", &"[redacted]")
            .field("salt", &"[redacted]")
            .finish()
    }
}

impl SessionTokenHash {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &*self.0
    }
}

impl Debug for SessionTokenHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionTokenHash")
            .field(&"[redacted]")
            .finish()
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The session token hash had an invalid length")]
pub struct InvalidSessionTokenHashError;

impl TryFrom<Box<[u8]>> for SessionTokenHash {
    type Error = InvalidSessionTokenHashError;

    fn try_from(value: Box<[u8]>) -> Result<Self, Self::Error> {
        Ok(Self(
            value.try_into().map_err(|_| InvalidSessionTokenHashError)?,
        ))
    }
}

impl TryFrom<Vec<u8>> for SessionTokenHash {
    type Error = InvalidSessionTokenHashError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        value.into_boxed_slice().try_into()
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing password failed: {0}")]
pub struct PasswordHashError(argon2::password_hash::Error);

/// Hash a plaintext password with Argon2id and a random salt. The returned
/// PHC string embeds algorithm parameters and salt.
pub fn hash_password(password: &Password) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.get().as_bytes(), &salt)
        .map_err(PasswordHashError)?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash. The comparison
/// inside the argon2 crate is constant-time.
pub fn verify_password(password: &Password, hash: &str) -> Result<bool, PasswordHashError> {
    let parsed = PasswordHash::new(hash).map_err(PasswordHashError)?;

    match Argon2::default().verify_password(password.get().as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHashError(err)),
    }
}

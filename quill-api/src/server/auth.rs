use crate::server::{ServerError, routes::pages::AuthPagePath};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use axum_extra::{
    TypedHeader,
    extract::cookie::{Cookie, CookieJar, SameSite},
};
use headers::{Authorization, authorization::Bearer};
use quill_common::model::{
    account::Account,
    auth::{SessionToken, SessionTokenHash},
};
use quill_db::client::DbClient;
use std::{convert::Infallible, sync::Arc};
use time::UtcDateTime;

pub const SESSION_COOKIE: &str = "session";

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// A request that presented a valid session token. Carries the resolved
/// account and the token hash identifying the session row.
#[derive(Clone, Debug)]
pub struct AuthenticatedAccount {
    account: Account,
    token_hash: SessionTokenHash,
}

impl AuthenticatedAccount {
    #[must_use]
    pub fn account(&self) -> &Account {
        &self.account
    }

    #[must_use]
    pub fn token_hash(&self) -> &SessionTokenHash {
        &self.token_hash
    }

    #[must_use]
    pub fn into_account(self) -> Account {
        self.account
    }
}

impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token: SessionToken = session_token_value(parts, state).await?.parse()?;
        let token_hash = token.hash()?;

        let db = Arc::<DbClient>::from_ref(state);
        let session = db
            .fetch_session(&token_hash)
            .await?
            .ok_or(ServerError::InvalidSession)?;

        if let Some(expires_after) = session.expires_after
            && session.created_at + expires_after.get() < UtcDateTime::now()
        {
            return Err(ServerError::InvalidSession);
        }

        let account = db
            .fetch_account(session.account)
            .await?
            .ok_or(ServerError::InvalidSession)?;

        Ok(Self {
            account,
            token_hash,
        })
    }
}

/// The session token may arrive in the session cookie (browser clients) or
/// as a bearer token (API clients); the cookie wins when both are present.
async fn session_token_value<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
) -> Result<String, ServerError> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Ok(cookie.value().to_owned());
    }

    let header = AuthorizationHeader::from_request_parts(parts, state)
        .await
        .map_err(|rejection| {
            if rejection.is_missing() {
                ServerError::MissingSessionToken
            } else {
                ServerError::InvalidAuthorizationHeader(rejection)
            }
        })?;

    Ok(header.token().to_owned())
}

/// Page-route variant of [`AuthenticatedAccount`]: any authentication
/// failure redirects to the anonymous entry page instead of erroring.
#[derive(Clone, Debug)]
pub struct PageAccount(pub AuthenticatedAccount);

impl<S> FromRequestParts<S> for PageAccount
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        AuthenticatedAccount::from_request_parts(parts, state)
            .await
            .map(Self)
            .map_err(|_| Redirect::to(&AuthPagePath.to_string()))
    }
}

/// Like [`PageAccount`] but never rejects; routes that branch on
/// authentication state (the index redirect) use this.
#[derive(Clone, Debug)]
pub struct MaybeAccount(pub Option<Account>);

impl<S> FromRequestParts<S> for MaybeAccount
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            AuthenticatedAccount::from_request_parts(parts, state)
                .await
                .ok()
                .map(AuthenticatedAccount::into_account),
        ))
    }
}

#[must_use]
pub(crate) fn session_cookie(token: &SessionToken) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.as_token_str());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);

    cookie
}

#[must_use]
pub(crate) fn remove_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

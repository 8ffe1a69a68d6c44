use crate::server::{
    Result, ServerError, ServerRouter,
    auth::{self, MaybeAccount, PageAccount},
    flash, pages,
};
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::{
    extract::cookie::CookieJar,
    routing::{RouterExt, TypedPath},
};
use quill_common::model::{
    account::{EmailAddress, Password, Username},
    auth::SessionToken,
};
use quill_db::client::{DbClient, DbError};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(index)
        .typed_get(auth_page)
        .typed_post(register)
        .typed_post(login)
        .typed_get(logout)
        .typed_get(account_posts)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/")]
struct IndexPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/auth")]
pub(crate) struct AuthPagePath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/register")]
struct RegisterPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/login")]
struct LoginPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/logout")]
struct LogoutPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/{username}", rejection(ServerError))]
struct AccountPostsPath {
    username: String,
}

#[derive(Deserialize)]
struct RegisterForm {
    username: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

fn redirect_with_notice(jar: CookieJar, notice: &str) -> (CookieJar, Redirect) {
    (
        flash::set_notice(jar, notice),
        Redirect::to(&AuthPagePath.to_string()),
    )
}

async fn index(_: IndexPath, MaybeAccount(account): MaybeAccount) -> Redirect {
    match account {
        Some(account) => Redirect::to(
            &AccountPostsPath {
                username: account.username.into_inner(),
            }
            .to_string(),
        ),
        None => Redirect::to(&AuthPagePath.to_string()),
    }
}

async fn auth_page(_: AuthPagePath, jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, notice) = flash::take_notice(jar);

    (jar, pages::auth_page(notice.as_deref()))
}

async fn register(
    _: RegisterPath,
    State(db): State<Arc<DbClient>>,
    jar: CookieJar,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<(CookieJar, Redirect)> {
    let Ok(Form(form)) = form else {
        return Ok(redirect_with_notice(jar, "Invalid registration form"));
    };

    let (username, email, password) = match parse_register_form(form) {
        Ok(parts) => parts,
        Err(notice) => return Ok(redirect_with_notice(jar, &notice)),
    };

    match db.register(&username, &email, &password).await {
        Ok(account) => {
            info!(account_id = %account.id, "New account registered");
            Ok(redirect_with_notice(
                jar,
                "Registration successful! Please login.",
            ))
        }
        Err(DbError::DuplicateUsername) => {
            Ok(redirect_with_notice(jar, "Username already exists"))
        }
        Err(DbError::DuplicateEmail) => Ok(redirect_with_notice(jar, "Email already registered")),
        Err(err) => Err(err.into()),
    }
}

fn parse_register_form(
    form: RegisterForm,
) -> Result<(Username, EmailAddress, Password), String> {
    let username = Username::new(form.username).map_err(|err| err.to_string())?;
    let email = EmailAddress::new(form.email).map_err(|err| err.to_string())?;
    let password = Password::new(form.password).map_err(|err| err.to_string())?;

    Ok((username, email, password))
}

async fn login(
    _: LoginPath,
    State(db): State<Arc<DbClient>>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<(CookieJar, Redirect)> {
    const FAILED_NOTICE: &str = "Invalid username or password";

    let Ok(Form(form)) = form else {
        return Ok(redirect_with_notice(jar, FAILED_NOTICE));
    };
    let (Ok(username), Ok(password)) = (
        Username::new(form.username),
        Password::new(form.password),
    ) else {
        return Ok(redirect_with_notice(jar, FAILED_NOTICE));
    };

    match db.verify_credentials(&username, &password).await {
        Ok(account) => {
            let token = SessionToken::generate_random(account.id);
            let token_hash = token.hash()?;
            db.create_session(account.id, &token_hash).await?;

            info!(account_id = %account.id, "Login succeeded");
            let jar = jar.add(auth::session_cookie(&token));
            let target = AccountPostsPath {
                username: account.username.into_inner(),
            };
            Ok((jar, Redirect::to(&target.to_string())))
        }
        Err(DbError::InvalidCredentials) => Ok(redirect_with_notice(jar, FAILED_NOTICE)),
        Err(err) => Err(err.into()),
    }
}

async fn logout(
    _: LogoutPath,
    State(db): State<Arc<DbClient>>,
    session: PageAccount,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    db.delete_session(session.0.token_hash()).await?;

    let jar = auth::remove_session_cookie(jar);
    Ok((jar, Redirect::to(&AuthPagePath.to_string())))
}

async fn account_posts(
    AccountPostsPath { username }: AccountPostsPath,
    State(db): State<Arc<DbClient>>,
    session: PageAccount,
    jar: CookieJar,
) -> Result<Response> {
    let account = session.0.account();
    if username != account.username.get() {
        return Ok(Redirect::to(&AuthPagePath.to_string()).into_response());
    }

    let posts = db.list_posts_for_owner(account.id).await?;
    let (jar, notice) = flash::take_notice(jar);
    let page = pages::posts_page(&account.username, &posts, notice.as_deref())?;

    Ok((jar, page).into_response())
}

use crate::server::{
    Result, ServerError, ServerRouter, auth::AuthenticatedAccount, format_timestamp, json::Json,
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use quill_common::model::{
    Id,
    post::{Post, PostDraft, PostMarker},
};
use quill_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_posts)
        .typed_post(create_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/api/posts")]
struct ApiPostsPath;

/// Both fields default so an absent field and an empty one take the same
/// rejection path.
#[derive(Deserialize)]
struct CreatePostBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl CreatePostBody {
    fn into_draft(self) -> Result<PostDraft> {
        let title = self.title.unwrap_or_default();
        let content = self.content.unwrap_or_default();
        if title.is_empty() || content.is_empty() {
            return Err(ServerError::MissingPostContent);
        }

        Ok(PostDraft::new(title, content)?)
    }
}

#[derive(Serialize)]
struct PostEntry {
    title: String,
    content: String,
    date_posted: String,
}

impl PostEntry {
    fn from_post(post: Post) -> Result<Self> {
        Ok(Self {
            title: post.title.into_inner(),
            content: post.content.into_inner(),
            date_posted: format_timestamp(post.date_posted)?,
        })
    }
}

#[derive(Serialize)]
struct CreatedPost {
    id: Id<PostMarker>,
    title: String,
    content: String,
    date_posted: String,
}

impl CreatedPost {
    fn from_post(post: Post) -> Result<Self> {
        Ok(Self {
            id: post.id,
            title: post.title.into_inner(),
            content: post.content.into_inner(),
            date_posted: format_timestamp(post.date_posted)?,
        })
    }
}

async fn list_posts(
    _: ApiPostsPath,
    State(db): State<Arc<DbClient>>,
    session: AuthenticatedAccount,
) -> Result<Json<Vec<PostEntry>>> {
    let posts = db.list_posts_for_owner(session.account().id).await?;

    let entries = posts
        .into_iter()
        .map(PostEntry::from_post)
        .collect::<Result<_>>()?;
    Ok(Json(entries))
}

async fn create_post(
    _: ApiPostsPath,
    State(db): State<Arc<DbClient>>,
    session: AuthenticatedAccount,
    Json(body): Json<CreatePostBody>,
) -> Result<(StatusCode, Json<CreatedPost>)> {
    let draft = body.into_draft()?;
    let post = db.create_post(session.account().id, &draft).await?;

    Ok((StatusCode::CREATED, Json(CreatedPost::from_post(post)?)))
}

//! Server-rendered pages. The markup is deliberately small; user-supplied
//! text is escaped on output.

use crate::server::{Result, format_timestamp};
use axum::response::Html;
use quill_common::model::{account::Username, post::Post};
use std::fmt::Write;

pub(crate) fn auth_page(notice: Option<&str>) -> Html<String> {
    let notice = notice_fragment(notice);

    Html(format!(
        "<!doctype html>\n\
        <html>\n\
        <head><meta charset=\"utf-8\"><title>quill</title></head>\n\
        <body>\n\
        {notice}\
        <h1>Welcome to quill</h1>\n\
        <section>\n\
        <h2>Log in</h2>\n\
        <form action=\"/login\" method=\"post\">\n\
        <label>Username <input name=\"username\" required></label>\n\
        <label>Password <input name=\"password\" type=\"password\" required></label>\n\
        <button type=\"submit\">Log in</button>\n\
        </form>\n\
        </section>\n\
        <section>\n\
        <h2>Register</h2>\n\
        <form action=\"/register\" method=\"post\">\n\
        <label>Username <input name=\"username\" required></label>\n\
        <label>Email <input name=\"email\" type=\"email\" required></label>\n\
        <label>Password <input name=\"password\" type=\"password\" required></label>\n\
        <button type=\"submit\">Register</button>\n\
        </form>\n\
        </section>\n\
        </body>\n\
        </html>\n"
    ))
}

pub(crate) fn posts_page(
    username: &Username,
    posts: &[Post],
    notice: Option<&str>,
) -> Result<Html<String>> {
    let notice = notice_fragment(notice);
    let username = escape(username.get());

    let mut articles = String::new();
    if posts.is_empty() {
        articles.push_str("<p>No posts yet.</p>\n");
    }
    for post in posts {
        let title = escape(post.title.get());
        let content = escape(post.content.get());
        let date_posted = format_timestamp(post.date_posted)?;
        let _ = write!(
            articles,
            "<article>\n<h2>{title}</h2>\n<time>{date_posted}</time>\n<p>{content}</p>\n</article>\n"
        );
    }

    Ok(Html(format!(
        "<!doctype html>\n\
        <html>\n\
        <head><meta charset=\"utf-8\"><title>{username} - quill</title></head>\n\
        <body>\n\
        {notice}\
        <h1>Posts by {username}</h1>\n\
        {articles}\
        <p><a href=\"/logout\">Log out</a></p>\n\
        </body>\n\
        </html>\n"
    )))
}

fn notice_fragment(notice: Option<&str>) -> String {
    match notice {
        Some(notice) => format!("<p class=\"notice\">{}</p>\n", escape(notice)),
        None => String::new(),
    }
}

pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }

    escaped
}

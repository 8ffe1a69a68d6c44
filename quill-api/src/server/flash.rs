//! One-shot notices carried across a redirect in a cookie, set when a page
//! handler redirects and cleared as soon as a page renders it.

use axum_extra::extract::cookie::{Cookie, CookieJar};

pub const NOTICE_COOKIE: &str = "notice";

#[must_use]
pub fn set_notice(jar: CookieJar, message: &str) -> CookieJar {
    let mut cookie = Cookie::new(NOTICE_COOKIE, message.to_owned());
    cookie.set_path("/");
    cookie.set_http_only(true);

    jar.add(cookie)
}

/// Read and clear the pending notice, if any.
#[must_use]
pub fn take_notice(jar: CookieJar) -> (CookieJar, Option<String>) {
    let notice = jar
        .get(NOTICE_COOKIE)
        .map(|cookie| cookie.value().to_owned());

    let jar = if notice.is_some() {
        jar.remove(Cookie::build(NOTICE_COOKIE).path("/"))
    } else {
        jar
    };

    (jar, notice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_round_trips_through_the_jar() {
        let jar = set_notice(CookieJar::default(), "Registration successful! Please login.");

        let (_, notice) = take_notice(jar);
        assert_eq!(
            notice.as_deref(),
            Some("Registration successful! Please login.")
        );
    }

    #[test]
    fn taking_from_an_empty_jar_yields_nothing() {
        let (_, notice) = take_notice(CookieJar::default());
        assert_eq!(notice, None);
    }
}

// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use base64::{Engine, engine::general_purpose};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

// Guard on every API route. No configured password means the instance is
// open; otherwise the auth_token cookie (set by POST /auth) or Basic auth
// must carry the password.
pub struct AuthGuard;

fn cookie_matches(request: &Request<'_>, password: &str) -> bool {
    request
        .cookies()
        .get("auth_token")
        .map(|cookie| cookie.value() == password)
        .unwrap_or(false)
}

fn basic_auth_matches(request: &Request<'_>, password: &str) -> bool {
    let Some(auth_header) = request.headers().get_one("Authorization") else {
        return false;
    };
    let Some(encoded) = auth_header.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = general_purpose::STANDARD.decode(encoded) else {
        return false;
    };
    let Ok(credentials) = String::from_utf8(decoded) else {
        return false;
    };
    // username is ignored, only the password half counts
    credentials
        .split_once(':')
        .map(|(_username, auth_password)| auth_password == password)
        .unwrap_or(false)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthGuard {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = crate::config::load_config_or_default();

        let password = match config.password.as_deref() {
            Some(p) => p,
            None => return Outcome::Success(AuthGuard),
        };

        if cookie_matches(request, password) || basic_auth_matches(request, password) {
            return Outcome::Success(AuthGuard);
        }

        Outcome::Error((Status::Unauthorized, ()))
    }
}

// HTTP Basic authentication for the façade.
//
// Every /api route sits behind the two configured credential values.
// Comparison is constant-time so header probing cannot measure a prefix
// match.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use subtle::ConstantTimeEq;
use tracing::warn;

use super::{AppError, AppState};

pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match header_value.and_then(parse_basic) {
        Some((user, password))
            if credentials_match(
                &user,
                &password,
                &state.config.auth.api_user,
                &state.config.auth.api_password,
            ) =>
        {
            next.run(request).await
        }
        Some((user, _)) => {
            warn!(user, "rejected basic-auth attempt");
            challenge()
        }
        None => challenge(),
    }
}

fn challenge() -> Response {
    let mut response =
        AppError::new(StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"roomcast\""),
    );
    response
}

/// Decode `Basic <base64(user:password)>` into its two parts
fn parse_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

fn credentials_match(user: &str, password: &str, want_user: &str, want_password: &str) -> bool {
    let user_ok = user.as_bytes().ct_eq(want_user.as_bytes());
    let password_ok = password.as_bytes().ct_eq(want_password.as_bytes());
    bool::from(user_ok & password_ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_header() {
        // admin:s3cret
        let parsed = parse_basic("Basic YWRtaW46czNjcmV0").expect("parse");
        assert_eq!(parsed.0, "admin");
        assert_eq!(parsed.1, "s3cret");

        assert!(parse_basic("Bearer abc").is_none());
        assert!(parse_basic("Basic !!!").is_none());
    }

    #[test]
    fn test_password_may_contain_colons() {
        // user:pa:ss
        let encoded = BASE64.encode("user:pa:ss");
        let parsed = parse_basic(&format!("Basic {encoded}")).expect("parse");
        assert_eq!(parsed.0, "user");
        assert_eq!(parsed.1, "pa:ss");
    }

    #[test]
    fn test_credentials_match() {
        assert!(credentials_match("admin", "pw", "admin", "pw"));
        assert!(!credentials_match("admin", "pw", "admin", "other"));
        assert!(!credentials_match("nope", "pw", "admin", "pw"));
        assert!(!credentials_match("admin", "", "admin", "pw"));
    }
}

//! Access-token issuance for the media server.
//!
//! The media server authenticates both client joins and administrative API
//! calls with an HMAC-signed JWT keyed by the api-secret. Claims carry the
//! api-key as issuer, the participant identity as subject, and a `video`
//! grants object describing what the holder may do.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Video grants embedded in an access token
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoGrants {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub room_join: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub room_create: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub room_list: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub room_admin: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub room_record: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ingress_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_publish: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_subscribe: Option<bool>,
}

impl VideoGrants {
    /// Grants for a participant joining a room
    #[must_use]
    pub fn join(room: impl Into<String>, can_publish: bool) -> Self {
        Self {
            room: Some(room.into()),
            room_join: true,
            can_subscribe: Some(true),
            can_publish: Some(can_publish),
            ..Self::default()
        }
    }

    /// Grants for administrative API calls (rooms, egress, ingress)
    #[must_use]
    pub fn admin() -> Self {
        Self {
            room_create: true,
            room_list: true,
            room_admin: true,
            room_record: true,
            ingress_admin: true,
            ..Self::default()
        }
    }
}

/// JWT claims structure understood by the media server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// API key of the issuing project
    pub iss: String,
    /// Participant identity
    pub sub: String,
    /// Not-before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub video: VideoGrants,
}

/// A signed token together with the facts callers report back
#[derive(Debug, Clone)]
pub struct TokenResult {
    pub token: String,
    pub identity: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs access tokens with the project's api-key/api-secret pair
#[derive(Clone)]
pub struct TokenIssuer {
    api_key: String,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("api_key", &self.api_key)
            .finish()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: &str) -> Self {
        Self {
            api_key: api_key.into(),
            encoding_key: EncodingKey::from_secret(api_secret.as_bytes()),
        }
    }

    /// Issue a token for `identity` with the given grants and TTL.
    pub fn issue(
        &self,
        identity: &str,
        grants: VideoGrants,
        name: Option<String>,
        metadata: Option<String>,
        ttl: Duration,
    ) -> Result<TokenResult> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = Claims {
            iss: self.api_key.clone(),
            sub: identity.to_string(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
            name,
            metadata,
            video: grants,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(format!("Failed to sign access token: {e}")))?;

        Ok(TokenResult {
            token,
            identity: identity.to_string(),
            expires_at,
        })
    }

    /// Short-lived token carrying admin grants, minted per remote API call.
    pub fn admin_token(&self) -> Result<String> {
        self.issue(
            &self.api_key,
            VideoGrants::admin(),
            None,
            None,
            Duration::minutes(10),
        )
        .map(|r| r.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation};

    fn decode_claims(token: &str, secret: &str) -> Claims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();
        jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .expect("token should decode")
        .claims
    }

    #[test]
    fn test_issue_round_trip() {
        let issuer = TokenIssuer::new("key1", "secret1");
        let result = issuer
            .issue(
                "alice",
                VideoGrants::join("studio-1", true),
                Some("Alice".to_string()),
                Some(r#"{"role":"emitter"}"#.to_string()),
                Duration::seconds(3600),
            )
            .expect("issue");

        let claims = decode_claims(&result.token, "secret1");
        assert_eq!(claims.iss, "key1");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.video.room.as_deref(), Some("studio-1"));
        assert!(claims.video.room_join);
        assert_eq!(claims.video.can_publish, Some(true));
        assert_eq!(claims.video.can_subscribe, Some(true));
        assert_eq!(claims.exp - claims.nbf, 3600);
    }

    #[test]
    fn test_viewer_grants_cannot_publish() {
        let grants = VideoGrants::join("studio-1", false);
        assert_eq!(grants.can_publish, Some(false));
        assert!(!grants.room_admin);
    }

    #[test]
    fn test_admin_token_grants() {
        let issuer = TokenIssuer::new("key1", "secret1");
        let token = issuer.admin_token().expect("admin token");
        let claims = decode_claims(&token, "secret1");
        assert!(claims.video.room_admin);
        assert!(claims.video.room_record);
        assert!(claims.video.ingress_admin);
        assert!(claims.video.room.is_none());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenIssuer::new("key1", "secret1");
        let result = issuer
            .issue(
                "bob",
                VideoGrants::join("r", false),
                None,
                None,
                Duration::seconds(600),
            )
            .expect("issue");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        assert!(jsonwebtoken::decode::<Claims>(
            &result.token,
            &DecodingKey::from_secret(b"other"),
            &validation,
        )
        .is_err());
    }
}

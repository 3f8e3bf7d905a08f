//! Participant listing and access-token issuance.
//!
//! Participants carry their role in the room inside their metadata JSON
//! (`{"role": "emitter"}`); anything absent or unparseable is treated as a
//! viewer. Emitters may publish, viewers only subscribe.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::Duration;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::MediaClient;
use crate::config::{TokenConfig, TOKEN_TTL_MAX_SECONDS, TOKEN_TTL_MIN_SECONDS};
use crate::token::{TokenResult, VideoGrants};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Emitter,
    Viewer,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emitter => "emitter",
            Self::Viewer => "viewer",
        }
    }

    #[must_use]
    pub fn can_publish(self) -> bool {
        matches!(self, Self::Emitter)
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "emitter" => Ok(Self::Emitter),
            "viewer" => Ok(Self::Viewer),
            other => Err(Error::InvalidInput(format!("Unknown role: {other}"))),
        }
    }
}

/// A participant as reported to API callers
#[derive(Debug, Clone)]
pub struct ParticipantSummary {
    pub room: String,
    pub identity: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct ParticipantService {
    client: MediaClient,
    token_config: TokenConfig,
}

impl ParticipantService {
    #[must_use]
    pub fn new(client: MediaClient, token_config: TokenConfig) -> Self {
        Self {
            client,
            token_config,
        }
    }

    /// Issue a join token for `identity` in `room_name`. The room must
    /// already exist on the media server.
    pub async fn generate_token(
        &self,
        room_name: &str,
        identity: &str,
        role: Role,
        name: Option<String>,
        metadata: Option<HashMap<String, Value>>,
        ttl_seconds: Option<u64>,
    ) -> Result<TokenResult> {
        if !self.room_exists(room_name).await? {
            return Err(Error::InvalidInput(format!(
                "Room '{room_name}' does not exist"
            )));
        }

        let ttl = self.resolve_ttl(ttl_seconds)?;
        let grants = VideoGrants::join(room_name, role.can_publish());
        let metadata_json = Self::build_metadata(role, metadata)?;

        let result = self.client.token_issuer().issue(
            identity,
            grants,
            Some(name.unwrap_or_else(|| identity.to_string())),
            Some(metadata_json),
            ttl,
        )?;

        info!(room = room_name, identity, role = role.as_str(), "token issued");
        Ok(result)
    }

    /// Issue tokens for several rooms at once. Rooms that fail validation
    /// are skipped; the map holds only the successes.
    pub async fn generate_tokens_for_rooms(
        &self,
        rooms: &[String],
        identity: &str,
        role: Role,
        name: Option<String>,
        metadata: Option<HashMap<String, Value>>,
        ttl_seconds: Option<u64>,
    ) -> Result<HashMap<String, TokenResult>> {
        let mut results = HashMap::new();
        for room in rooms {
            match self
                .generate_token(
                    room,
                    identity,
                    role,
                    name.clone(),
                    metadata.clone(),
                    ttl_seconds,
                )
                .await
            {
                Ok(token) => {
                    results.insert(room.clone(), token);
                }
                Err(Error::InvalidInput(reason)) => {
                    debug!(room, reason, "skipping room in batch token issuance");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(results)
    }

    pub async fn list_room_participants(&self, room_name: &str) -> Result<Vec<ParticipantSummary>> {
        let participants = self.client.list_participants(room_name).await?;
        Ok(participants
            .into_iter()
            .map(|p| ParticipantSummary {
                room: room_name.to_string(),
                name: if p.name.is_empty() {
                    p.identity.clone()
                } else {
                    p.name
                },
                role: Self::extract_role(&p.metadata),
                identity: p.identity,
            })
            .collect())
    }

    /// Every participant across every active room
    pub async fn list_all_participants(&self) -> Result<Vec<ParticipantSummary>> {
        let rooms = self
            .client
            .list_rooms(&crate::client::types::ListRoomsRequest::default())
            .await?;
        let mut summaries = Vec::new();
        for room in rooms {
            summaries.extend(self.list_room_participants(&room.name).await?);
        }
        Ok(summaries)
    }

    pub async fn remove_participant(&self, room_name: &str, identity: &str) -> Result<()> {
        info!(room = room_name, identity, "removing participant");
        self.client.remove_participant(room_name, identity).await?;
        Ok(())
    }

    async fn room_exists(&self, room_name: &str) -> Result<bool> {
        let rooms = self
            .client
            .list_rooms(&crate::client::types::ListRoomsRequest {
                names: vec![room_name.to_string()],
            })
            .await?;
        Ok(rooms.iter().any(|r| r.name == room_name))
    }

    fn resolve_ttl(&self, ttl_seconds: Option<u64>) -> Result<Duration> {
        let ttl = ttl_seconds.unwrap_or(self.token_config.default_ttl_seconds);
        if !(TOKEN_TTL_MIN_SECONDS..=TOKEN_TTL_MAX_SECONDS).contains(&ttl) {
            return Err(Error::InvalidInput(format!(
                "ttl_seconds must be within {TOKEN_TTL_MIN_SECONDS}..={TOKEN_TTL_MAX_SECONDS}, got {ttl}"
            )));
        }
        Ok(Duration::seconds(ttl as i64))
    }

    fn build_metadata(role: Role, extra: Option<HashMap<String, Value>>) -> Result<String> {
        let mut payload = serde_json::Map::new();
        payload.insert("role".to_string(), Value::String(role.as_str().to_string()));
        if let Some(extra) = extra {
            payload.extend(extra);
        }
        Ok(serde_json::to_string(&Value::Object(payload))?)
    }

    fn extract_role(metadata_json: &str) -> Role {
        if metadata_json.is_empty() {
            return Role::Viewer;
        }
        serde_json::from_str::<Value>(metadata_json)
            .ok()
            .and_then(|v| v.get("role").and_then(Value::as_str).map(str::to_owned))
            .and_then(|s| s.parse().ok())
            .unwrap_or(Role::Viewer)
    }
}

//! Client for the media server's administrative API.
//!
//! `MediaClient` is an explicitly owned connection handle: constructed once
//! from configuration, cheaply cloneable (all clones share one pooled HTTP
//! client), and passed into every service that needs the remote API. There
//! is no lazy global instance.

pub mod twirp;
pub mod types;

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::LiveKitConfig;
use crate::token::TokenIssuer;
pub use twirp::TwirpError;
use types::{
    CreateIngressRequest, CreateRoomRequest, DeleteIngressRequest, DeleteRoomRequest, EgressInfo,
    IngressInfo, ListEgressRequest, ListEgressResponse, ListIngressRequest, ListIngressResponse,
    ListParticipantsRequest, ListParticipantsResponse, ListRoomsRequest, ListRoomsResponse,
    ParticipantEgressRequest, Room, RoomCompositeEgressRequest, RoomParticipantIdentity,
    StopEgressRequest, UpdateIngressRequest,
};

/// Shared HTTP client for all media-server requests (connection pooling)
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build shared media-server HTTP client")
});

#[derive(Clone)]
pub struct MediaClient {
    base_url: String,
    issuer: TokenIssuer,
    client: Client,
}

impl std::fmt::Debug for MediaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MediaClient {
    /// Create a client against `base_url`, signing each call with a fresh
    /// short-lived admin token (reuses the shared connection pool).
    pub fn new(
        base_url: impl Into<String>,
        api_key: &str,
        api_secret: &str,
    ) -> Result<Self, TwirpError> {
        if api_key.is_empty() || api_secret.is_empty() {
            return Err(TwirpError::InvalidConfig(
                "media server api_key/api_secret must be set".to_string(),
            ));
        }
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            issuer: TokenIssuer::new(api_key, api_secret),
            client: SHARED_CLIENT.clone(),
        })
    }

    /// Build a client from the livekit config section.
    pub fn from_config(config: &LiveKitConfig, http_url: &str) -> Result<Self, TwirpError> {
        Self::new(http_url, &config.api_key, &config.api_secret)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token issuer sharing this client's api-key/secret pair
    #[must_use]
    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    async fn call<Req, Resp>(&self, service: &str, method: &str, req: &Req) -> Result<Resp, TwirpError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/twirp/livekit.{service}/{method}", self.base_url);
        let token = self
            .issuer
            .admin_token()
            .map_err(|e| TwirpError::InvalidConfig(e.to_string()))?;

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .json(req)
            .send()
            .await?;

        let response = twirp::check_response(response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    // -- Room sub-resource --------------------------------------------------

    pub async fn create_room(&self, req: &CreateRoomRequest) -> Result<Room, TwirpError> {
        self.call("RoomService", "CreateRoom", req).await
    }

    pub async fn list_rooms(&self, req: &ListRoomsRequest) -> Result<Vec<Room>, TwirpError> {
        let resp: ListRoomsResponse = self.call("RoomService", "ListRooms", req).await?;
        Ok(resp.rooms)
    }

    pub async fn delete_room(&self, room: &str) -> Result<(), TwirpError> {
        let req = DeleteRoomRequest {
            room: room.to_string(),
        };
        let _: serde_json::Value = self.call("RoomService", "DeleteRoom", &req).await?;
        Ok(())
    }

    pub async fn list_participants(
        &self,
        room: &str,
    ) -> Result<Vec<types::ParticipantInfo>, TwirpError> {
        let req = ListParticipantsRequest {
            room: room.to_string(),
        };
        let resp: ListParticipantsResponse =
            self.call("RoomService", "ListParticipants", &req).await?;
        Ok(resp.participants)
    }

    pub async fn remove_participant(&self, room: &str, identity: &str) -> Result<(), TwirpError> {
        let req = RoomParticipantIdentity {
            room: room.to_string(),
            identity: identity.to_string(),
        };
        let _: serde_json::Value = self.call("RoomService", "RemoveParticipant", &req).await?;
        Ok(())
    }

    // -- Egress sub-resource ------------------------------------------------

    pub async fn start_room_composite_egress(
        &self,
        req: &RoomCompositeEgressRequest,
    ) -> Result<EgressInfo, TwirpError> {
        self.call("Egress", "StartRoomCompositeEgress", req).await
    }

    pub async fn start_participant_egress(
        &self,
        req: &ParticipantEgressRequest,
    ) -> Result<EgressInfo, TwirpError> {
        self.call("Egress", "StartParticipantEgress", req).await
    }

    pub async fn stop_egress(&self, egress_id: &str) -> Result<EgressInfo, TwirpError> {
        let req = StopEgressRequest {
            egress_id: egress_id.to_string(),
        };
        self.call("Egress", "StopEgress", &req).await
    }

    pub async fn list_egress(&self, req: &ListEgressRequest) -> Result<Vec<EgressInfo>, TwirpError> {
        let resp: ListEgressResponse = self.call("Egress", "ListEgress", req).await?;
        Ok(resp.items)
    }

    // -- Ingress sub-resource -----------------------------------------------

    pub async fn create_ingress(
        &self,
        req: &CreateIngressRequest,
    ) -> Result<IngressInfo, TwirpError> {
        self.call("Ingress", "CreateIngress", req).await
    }

    pub async fn list_ingress(
        &self,
        req: &ListIngressRequest,
    ) -> Result<Vec<IngressInfo>, TwirpError> {
        let resp: ListIngressResponse = self.call("Ingress", "ListIngress", req).await?;
        Ok(resp.items)
    }

    pub async fn update_ingress(
        &self,
        req: &UpdateIngressRequest,
    ) -> Result<IngressInfo, TwirpError> {
        self.call("Ingress", "UpdateIngress", req).await
    }

    pub async fn delete_ingress(&self, ingress_id: &str) -> Result<IngressInfo, TwirpError> {
        let req = DeleteIngressRequest {
            ingress_id: ingress_id.to_string(),
        };
        self.call("Ingress", "DeleteIngress", &req).await
    }
}

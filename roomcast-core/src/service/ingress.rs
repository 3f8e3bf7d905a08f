//! Ingress (stream intake) configuration, delegated to the media server.

use tracing::info;

use crate::client::types::{
    CreateIngressRequest, IngressInfo, IngressInput, ListIngressRequest, UpdateIngressRequest,
};
use crate::client::MediaClient;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct IngressService {
    client: MediaClient,
}

impl IngressService {
    #[must_use]
    pub fn new(client: MediaClient) -> Self {
        Self { client }
    }

    /// Create an ingress point. URL inputs pull from a source url, which is
    /// therefore required for that input type.
    pub async fn create(
        &self,
        input_type: IngressInput,
        name: &str,
        room_name: &str,
        participant_identity: &str,
        participant_name: Option<String>,
        url: Option<String>,
        enable_transcoding: Option<bool>,
    ) -> Result<IngressInfo> {
        if input_type == IngressInput::Url && url.as_deref().map_or(true, str::is_empty) {
            return Err(Error::InvalidInput(
                "url is required for url-input ingress".to_string(),
            ));
        }

        info!(
            name,
            room = room_name,
            identity = participant_identity,
            ?input_type,
            "creating ingress"
        );

        let info = self
            .client
            .create_ingress(&CreateIngressRequest {
                input_type,
                name: name.to_string(),
                room_name: room_name.to_string(),
                participant_identity: participant_identity.to_string(),
                participant_name,
                url,
                enable_transcoding,
            })
            .await?;
        info!(ingress_id = %info.ingress_id, "ingress created");
        Ok(info)
    }

    pub async fn list(
        &self,
        room_name: Option<String>,
        ingress_id: Option<String>,
    ) -> Result<Vec<IngressInfo>> {
        Ok(self
            .client
            .list_ingress(&ListIngressRequest {
                room_name,
                ingress_id,
            })
            .await?)
    }

    /// Update an existing (inactive) ingress
    pub async fn update(&self, req: UpdateIngressRequest) -> Result<IngressInfo> {
        info!(ingress_id = %req.ingress_id, "updating ingress");
        Ok(self.client.update_ingress(&req).await?)
    }

    pub async fn delete(&self, ingress_id: &str) -> Result<IngressInfo> {
        info!(ingress_id, "deleting ingress");
        Ok(self.client.delete_ingress(ingress_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(uri: &str) -> IngressService {
        IngressService::new(MediaClient::new(uri, "key", "secret").expect("client"))
    }

    #[tokio::test]
    async fn test_url_input_requires_source_url() {
        let server = MockServer::start().await;
        let svc = service(&server.uri());
        let err = svc
            .create(IngressInput::Url, "in", "room", "ident", None, None, None)
            .await
            .expect_err("should reject");
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_create_rtmp_ingress() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Ingress/CreateIngress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ingressId": "IN_1",
                "name": "studio-feed",
                "streamKey": "sk_abc",
                "url": "rtmp://media.example.com/live",
                "inputType": "RTMP_INPUT",
                "roomName": "studio-1",
                "participantIdentity": "ob-1"
            })))
            .mount(&server)
            .await;

        let svc = service(&server.uri());
        let info = svc
            .create(
                IngressInput::Rtmp,
                "studio-feed",
                "studio-1",
                "ob-1",
                None,
                None,
                None,
            )
            .await
            .expect("create");
        assert_eq!(info.ingress_id, "IN_1");
        assert_eq!(info.stream_key, "sk_abc");
        assert_eq!(info.input_type, IngressInput::Rtmp);
    }
}

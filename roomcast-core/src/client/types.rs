//! Wire models for the media server's Twirp API.
//!
//! The server speaks protobuf-JSON: field names are camelCase, enums are
//! SCREAMING_SNAKE names, and int64 values may arrive either as JSON
//! numbers or as strings. Deserializers here accept both.

use serde::{Deserialize, Deserializer, Serialize};

/// Accept an int64 encoded as either a JSON number or a string.
pub fn de_i64_flexible<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(i64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

// ---------------------------------------------------------------------------
// Rooms & participants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Room {
    pub sid: String,
    pub name: String,
    pub empty_timeout: u32,
    pub max_participants: u32,
    #[serde(deserialize_with = "de_i64_flexible")]
    pub creation_time: i64,
    pub num_participants: u32,
    pub num_publishers: u32,
    pub active_recording: bool,
    pub metadata: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TrackType {
    #[serde(rename = "AUDIO")]
    Audio,
    #[serde(rename = "VIDEO")]
    Video,
    #[serde(rename = "DATA")]
    Data,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackInfo {
    pub sid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TrackType,
    pub muted: bool,
}

impl TrackInfo {
    /// Unmuted audio/video tracks are what qualify a participant as an
    /// emitter for batch recording.
    #[must_use]
    pub fn is_live_media(&self) -> bool {
        !self.muted && matches!(self.kind, TrackType::Audio | TrackType::Video)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantInfo {
    pub sid: String,
    pub identity: String,
    pub name: String,
    pub metadata: String,
    pub tracks: Vec<TrackInfo>,
}

impl ParticipantInfo {
    #[must_use]
    pub fn live_media_tracks(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_live_media()).count()
    }
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    pub empty_timeout: u32,
    pub max_participants: u32,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListRoomsRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ListRoomsResponse {
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRoomRequest {
    pub room: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParticipantsRequest {
    pub room: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParticipantsResponse {
    pub participants: Vec<ParticipantInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomParticipantIdentity {
    pub room: String,
    pub identity: String,
}

// ---------------------------------------------------------------------------
// Egress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EgressStatus {
    #[serde(rename = "EGRESS_STARTING")]
    Starting,
    #[serde(rename = "EGRESS_ACTIVE")]
    Active,
    #[serde(rename = "EGRESS_ENDING")]
    Ending,
    #[serde(rename = "EGRESS_COMPLETE")]
    Complete,
    #[serde(rename = "EGRESS_FAILED")]
    Failed,
    #[serde(rename = "EGRESS_ABORTED")]
    Aborted,
    #[serde(rename = "EGRESS_LIMIT_REACHED")]
    LimitReached,
    /// Status strings newer than this enum; kept so one unrecognized
    /// record cannot fail a whole list decode
    #[serde(other, rename = "EGRESS_UNKNOWN")]
    Unknown,
}

impl EgressStatus {
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Starting | Self::Active | Self::Ending)
    }

    #[must_use]
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Self::Starting => "EGRESS_STARTING",
            Self::Active => "EGRESS_ACTIVE",
            Self::Ending => "EGRESS_ENDING",
            Self::Complete => "EGRESS_COMPLETE",
            Self::Failed => "EGRESS_FAILED",
            Self::Aborted => "EGRESS_ABORTED",
            Self::LimitReached => "EGRESS_LIMIT_REACHED",
            Self::Unknown => "EGRESS_UNKNOWN",
        }
    }
}

/// Upload destination forwarded verbatim inside egress start requests.
/// The façade never performs object operations itself.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct S3Upload {
    pub access_key: String,
    pub secret: String,
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    pub force_path_style: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedFileOutput {
    /// Encoded file type enum name, e.g. "MP4"
    pub file_type: String,
    pub filepath: String,
    pub s3: S3Upload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCompositeEgressRequest {
    pub room_name: String,
    pub layout: String,
    pub file_outputs: Vec<EncodedFileOutput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantEgressRequest {
    pub room_name: String,
    pub identity: String,
    #[serde(skip_deserializing)]
    pub file_outputs: Vec<EncodedFileOutput>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopEgressRequest {
    pub egress_id: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListEgressRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egress_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ListEgressResponse {
    pub items: Vec<EgressInfo>,
}

/// File metadata the server reports once a recording has output
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FileInfo {
    pub filename: String,
    pub location: String,
    #[serde(deserialize_with = "de_i64_flexible")]
    pub size: i64,
    #[serde(deserialize_with = "de_i64_flexible")]
    pub duration: i64,
    #[serde(deserialize_with = "de_i64_flexible")]
    pub started_at: i64,
    #[serde(deserialize_with = "de_i64_flexible")]
    pub ended_at: i64,
}

/// Mirror of the room-composite request as it comes back in `EgressInfo`,
/// kept for the output path the server recorded.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomCompositeEgressInfo {
    pub room_name: String,
    pub layout: String,
    pub file_outputs: Vec<FileOutputInfo>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FileOutputInfo {
    pub filepath: String,
}

/// The handle plus state snapshot the server returns for every egress
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EgressInfo {
    pub egress_id: String,
    pub room_id: String,
    pub room_name: String,
    pub status: Option<EgressStatus>,
    /// Nanoseconds since epoch, 0 when not started
    #[serde(deserialize_with = "de_i64_flexible")]
    pub started_at: i64,
    /// Nanoseconds since epoch, 0 when still running
    #[serde(deserialize_with = "de_i64_flexible")]
    pub ended_at: i64,
    pub error: String,
    pub room_composite: Option<RoomCompositeEgressInfo>,
    pub participant: Option<ParticipantEgressRequest>,
    pub file_results: Vec<FileInfo>,
}

impl EgressInfo {
    /// Identity of the recorded participant, when this is a participant egress
    #[must_use]
    pub fn participant_identity(&self) -> Option<&str> {
        self.participant.as_ref().map(|p| p.identity.as_str())
    }
}

// ---------------------------------------------------------------------------
// Ingress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IngressInput {
    #[default]
    #[serde(rename = "RTMP_INPUT")]
    Rtmp,
    #[serde(rename = "WHIP_INPUT")]
    Whip,
    #[serde(rename = "URL_INPUT")]
    Url,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngressRequest {
    pub input_type: IngressInput,
    pub name: String,
    pub room_name: String,
    pub participant_identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_transcoding: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIngressRequest {
    pub ingress_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_transcoding: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListIngressRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ListIngressResponse {
    pub items: Vec<IngressInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteIngressRequest {
    pub ingress_id: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IngressState {
    pub status: String,
    pub error: String,
    #[serde(deserialize_with = "de_i64_flexible")]
    pub started_at: i64,
    #[serde(deserialize_with = "de_i64_flexible")]
    pub ended_at: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IngressInfo {
    pub ingress_id: String,
    pub name: String,
    pub stream_key: String,
    pub url: String,
    pub input_type: IngressInput,
    pub room_name: String,
    pub participant_identity: String,
    pub participant_name: String,
    pub state: Option<IngressState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i64_accepts_string_and_number() {
        let info: EgressInfo = serde_json::from_str(
            r#"{"egressId":"EG_1","roomName":"r","startedAt":"1700000000000000000","endedAt":0}"#,
        )
        .expect("decode");
        assert_eq!(info.started_at, 1_700_000_000_000_000_000);
        assert_eq!(info.ended_at, 0);
    }

    #[test]
    fn test_status_enum_names() {
        let info: EgressInfo =
            serde_json::from_str(r#"{"egressId":"EG_1","status":"EGRESS_ACTIVE"}"#).expect("decode");
        assert_eq!(info.status, Some(EgressStatus::Active));
        assert!(info.status.expect("status").is_active());

        let done: EgressInfo =
            serde_json::from_str(r#"{"egressId":"EG_2","status":"EGRESS_COMPLETE"}"#)
                .expect("decode");
        assert!(!done.status.expect("status").is_active());
    }

    #[test]
    fn test_unrecognized_status_still_decodes() {
        let info: EgressInfo =
            serde_json::from_str(r#"{"egressId":"EG_1","status":"EGRESS_PAUSED"}"#)
                .expect("decode");
        assert_eq!(info.status, Some(EgressStatus::Unknown));
        assert!(!info.status.expect("status").is_active());

        let items: ListEgressResponse = serde_json::from_str(
            r#"{"items":[
                {"egressId":"EG_1","status":"EGRESS_PAUSED"},
                {"egressId":"EG_2","status":"EGRESS_ACTIVE"}
            ]}"#,
        )
        .expect("decode");
        assert_eq!(items.items.len(), 2);
        assert_eq!(items.items[1].status, Some(EgressStatus::Active));
    }

    #[test]
    fn test_participant_identity_from_request_oneof() {
        let info: EgressInfo = serde_json::from_str(
            r#"{"egressId":"EG_1","participant":{"roomName":"r","identity":"alice"}}"#,
        )
        .expect("decode");
        assert_eq!(info.participant_identity(), Some("alice"));
    }

    #[test]
    fn test_track_qualification() {
        let p: ParticipantInfo = serde_json::from_str(
            r#"{"identity":"a","tracks":[
                {"sid":"1","type":"AUDIO","muted":false},
                {"sid":"2","type":"VIDEO","muted":true},
                {"sid":"3","type":"DATA","muted":false}
            ]}"#,
        )
        .expect("decode");
        assert_eq!(p.live_media_tracks(), 1);
    }
}

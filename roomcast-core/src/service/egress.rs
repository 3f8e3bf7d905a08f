//! Egress (recording) orchestration.
//!
//! Coordinates recording starts and stops against the media server: a whole
//! room, a single participant, every qualifying participant in a room
//! ("emitters"), or a combined full-room recording that joins a
//! room-composite start with an emitter fan-out under one shared storage
//! prefix. The media server owns all recording state; the orchestrator only
//! computes destinations and reshapes responses.
//!
//! Failure policy differs by operation and is part of the contract:
//! single-target starts and the combined full record propagate the first
//! error; the emitter fan-out drops and logs individual failures; stop-many
//! reports each outcome independently.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::client::types::{
    EgressInfo, EgressStatus, EncodedFileOutput, ListEgressRequest, ParticipantEgressRequest,
    RoomCompositeEgressRequest, S3Upload,
};
use crate::client::MediaClient;
use crate::config::{EgressConfig, StorageConfig};
use crate::{Error, Result};

/// What a recording request targets, which decides file naming and the
/// storage folder it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingKind {
    /// Room-composite recording under the `Rooms` folder
    Room,
    /// Single participant under the `Participants` folder
    Participant,
    /// One participant of an emitter batch, foldered by room name
    Emitter,
    /// Room-composite branch of a full record, under the session prefix
    FullRoom,
    /// Participant branch of a full record, under the session prefix
    FullParticipant,
}

/// Handles returned by a combined full-room recording: the one
/// room-composite handle plus the handles of the emitter fan-out.
#[derive(Debug, Clone)]
pub struct FullRecording {
    pub room: String,
    pub participants: Vec<String>,
}

/// Result of stopping a single recording
#[derive(Debug, Clone)]
pub struct StopOutcome {
    pub info: EgressInfo,
    /// True when the remote reported the recording already stopped and the
    /// state was recovered from the egress list instead
    pub already_finished: bool,
}

/// Per-identifier outcome of a batch stop; one report per requested id
#[derive(Debug, Clone)]
pub struct StopReport {
    pub egress_id: String,
    pub status: Option<EgressStatus>,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EgressOrchestrator {
    client: MediaClient,
    egress: EgressConfig,
    storage: StorageConfig,
    zone: FixedOffset,
}

impl EgressOrchestrator {
    #[must_use]
    pub fn new(client: MediaClient, egress: EgressConfig, storage: StorageConfig) -> Self {
        let zone = FixedOffset::east_opt(egress.utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix());
        Self {
            client,
            egress,
            storage,
            zone,
        }
    }

    /// Start a room-composite recording. An explicit `filename` overrides
    /// the generated one; the folder stays `Rooms` either way.
    pub async fn record_room(
        &self,
        room_name: &str,
        filename: Option<String>,
    ) -> Result<EgressInfo> {
        let ts = self.now_stamp();
        let filename = filename.unwrap_or_else(|| {
            build_file_name(RecordingKind::Room, room_name, None, &ts, &self.egress.file_type)
        });
        let filepath = join_path(folder_prefix(RecordingKind::Room, room_name, None), &filename);

        info!(room = room_name, filepath, "starting room composite egress");
        let info = self
            .client
            .start_room_composite_egress(&RoomCompositeEgressRequest {
                room_name: room_name.to_string(),
                layout: self.egress.room_layout.clone(),
                file_outputs: vec![self.file_output(filepath)],
            })
            .await?;
        Ok(info)
    }

    /// Start recording one participant's tracks
    pub async fn record_participant(&self, room_name: &str, identity: &str) -> Result<EgressInfo> {
        let ts = self.now_stamp();
        let filename = build_file_name(
            RecordingKind::Participant,
            room_name,
            Some(identity),
            &ts,
            &self.egress.file_type,
        );
        let filepath = join_path(
            folder_prefix(RecordingKind::Participant, room_name, None),
            &filename,
        );

        info!(room = room_name, identity, filepath, "starting participant egress");
        let info = self
            .client
            .start_participant_egress(&ParticipantEgressRequest {
                room_name: room_name.to_string(),
                identity: identity.to_string(),
                file_outputs: vec![self.file_output(filepath)],
            })
            .await?;
        Ok(info)
    }

    /// Start one recording per emitter: every participant currently holding
    /// at least `min_tracks` unmuted audio/video tracks. Starts are issued
    /// concurrently; individual failures are logged and dropped, so the
    /// returned list holds only the recordings that actually started. An
    /// empty list with no error means nothing qualified.
    pub async fn record_emitters(
        &self,
        room_name: &str,
        min_tracks: usize,
    ) -> Result<Vec<EgressInfo>> {
        self.record_emitters_inner(room_name, min_tracks, None).await
    }

    async fn record_emitters_inner(
        &self,
        room_name: &str,
        min_tracks: usize,
        session_prefix: Option<&str>,
    ) -> Result<Vec<EgressInfo>> {
        let participants = self.client.list_participants(room_name).await?;
        let ts = self.now_stamp();
        let kind = if session_prefix.is_some() {
            RecordingKind::FullParticipant
        } else {
            RecordingKind::Emitter
        };

        let mut requests = Vec::new();
        for participant in participants {
            let live = participant.live_media_tracks();
            if live < min_tracks {
                debug!(
                    room = room_name,
                    identity = participant.identity,
                    live,
                    min_tracks,
                    "skipping participant below track threshold"
                );
                continue;
            }

            let filename = build_file_name(
                kind,
                room_name,
                Some(&participant.identity),
                &ts,
                &self.egress.file_type,
            );
            let prefix = session_prefix
                .map(str::to_owned)
                .unwrap_or_else(|| folder_prefix(kind, room_name, None));
            requests.push(ParticipantEgressRequest {
                room_name: room_name.to_string(),
                identity: participant.identity,
                file_outputs: vec![self.file_output(join_path(prefix, &filename))],
            });
        }

        if requests.is_empty() {
            return Ok(Vec::new());
        }

        // Issue every start before waiting on any, bounded by the
        // configured concurrency cap. Each task yields a tagged result;
        // the partition below separates successes from failures.
        let outcomes: Vec<(String, Result<EgressInfo>)> = stream::iter(requests)
            .map(|req| {
                let client = self.client.clone();
                async move {
                    let identity = req.identity.clone();
                    let result = client
                        .start_participant_egress(&req)
                        .await
                        .map_err(Error::from);
                    (identity, result)
                }
            })
            .buffer_unordered(self.egress.max_concurrent_starts)
            .collect()
            .await;

        let mut started = Vec::new();
        for (identity, outcome) in outcomes {
            match outcome {
                Ok(info) => started.push(info),
                Err(e) => {
                    error!(room = room_name, identity, error = %e, "participant egress start failed");
                }
            }
        }
        Ok(started)
    }

    /// Start a room-composite recording and the emitter fan-out together,
    /// both under one time-scoped session prefix so every artifact of this
    /// call lands in the same storage folder. Both branches run
    /// concurrently and the call waits for both; a failure in either branch
    /// fails the whole call.
    pub async fn full_record(&self, room_name: &str) -> Result<FullRecording> {
        let ts = self.now_stamp();
        let session_prefix = folder_prefix(RecordingKind::FullRoom, room_name, Some(&ts));

        let room_branch = async {
            let filename = build_file_name(
                RecordingKind::FullRoom,
                room_name,
                None,
                &ts,
                &self.egress.file_type,
            );
            let filepath = join_path(session_prefix.clone(), &filename);
            info!(room = room_name, filepath, "starting full-record room branch");
            self.client
                .start_room_composite_egress(&RoomCompositeEgressRequest {
                    room_name: room_name.to_string(),
                    layout: self.egress.room_layout.clone(),
                    file_outputs: vec![self.file_output(filepath)],
                })
                .await
                .map_err(Error::from)
        };
        let emitters_branch = self.record_emitters_inner(room_name, 1, Some(&session_prefix));

        let (room_info, emitter_infos) = tokio::try_join!(room_branch, emitters_branch)?;

        Ok(FullRecording {
            room: room_info.egress_id,
            participants: emitter_infos.into_iter().map(|i| i.egress_id).collect(),
        })
    }

    /// Stop a recording by handle. When the remote reports it already
    /// stopped, the last-known state is recovered from the egress list and
    /// returned flagged `already_finished` instead of surfacing the error;
    /// an id absent from that list is a not-found.
    pub async fn stop_recording(&self, egress_id: &str) -> Result<StopOutcome> {
        match self.client.stop_egress(egress_id).await {
            Ok(info) => Ok(StopOutcome {
                info,
                already_finished: false,
            }),
            Err(e) => {
                let err = Error::from(e);
                if !err.is_failed_precondition() {
                    return Err(err);
                }
                warn!(egress_id, "stop on already-finished recording, consulting egress list");
                let all = self.list_recordings().await?;
                all.into_iter()
                    .find(|r| r.egress_id == egress_id)
                    .map(|info| StopOutcome {
                        info,
                        already_finished: true,
                    })
                    .ok_or_else(|| Error::NotFound(format!("Egress {egress_id} not found")))
            }
        }
    }

    /// Stop several recordings concurrently. Always yields exactly one
    /// report per input id, in input order; one failing stop never blocks
    /// the rest.
    pub async fn stop_many(&self, egress_ids: &[String]) -> Vec<StopReport> {
        let stops = egress_ids.iter().map(|id| async move {
            match self.stop_recording(id).await {
                Ok(outcome) => StopReport {
                    egress_id: id.clone(),
                    status: outcome.info.status,
                    message: Some(if outcome.already_finished {
                        "Recording was already finished".to_string()
                    } else {
                        "Recording stopped".to_string()
                    }),
                    error: None,
                },
                Err(e) => StopReport {
                    egress_id: id.clone(),
                    status: None,
                    message: None,
                    error: Some(e.to_string()),
                },
            }
        });
        futures::future::join_all(stops).await
    }

    pub async fn list_recordings(&self) -> Result<Vec<EgressInfo>> {
        Ok(self.client.list_egress(&ListEgressRequest::default()).await?)
    }

    pub async fn list_recordings_by_room(
        &self,
        room_name: &str,
        active_only: bool,
    ) -> Result<Vec<EgressInfo>> {
        let req = ListEgressRequest {
            room_name: Some(room_name.to_string()),
            egress_id: None,
            active: active_only.then_some(true),
        };
        Ok(self.client.list_egress(&req).await?)
    }

    /// Nanoseconds-since-epoch to a zone-local ISO-8601 string. Absent,
    /// zero, or unconvertible values yield `None` rather than an error.
    #[must_use]
    pub fn local_timestamp(&self, nanos: i64) -> Option<String> {
        if nanos <= 0 {
            return None;
        }
        let secs = nanos.div_euclid(1_000_000_000);
        let nsecs = u32::try_from(nanos.rem_euclid(1_000_000_000)).ok()?;
        DateTime::<Utc>::from_timestamp(secs, nsecs)
            .map(|dt| dt.with_timezone(&self.zone).to_rfc3339())
    }

    fn now_stamp(&self) -> String {
        Utc::now().with_timezone(&self.zone).format("%Y%m%d_%H%M%S").to_string()
    }

    fn file_output(&self, filepath: String) -> EncodedFileOutput {
        EncodedFileOutput {
            file_type: self.egress.file_type.to_uppercase(),
            filepath,
            s3: S3Upload {
                access_key: self.storage.access_key.clone(),
                secret: self.storage.secret_key.clone(),
                bucket: self.storage.bucket.clone(),
                region: self.storage.region.clone(),
                endpoint: self.storage.endpoint.trim_end_matches('/').to_string(),
                force_path_style: self.storage.force_path_style,
            },
        }
    }
}

/// Deterministic file name for a recording target:
/// `{kind-tag}_{room}[_{identity}]_{timestamp}.{ext}` with the field order
/// the storage layout has always used.
fn build_file_name(
    kind: RecordingKind,
    room: &str,
    identity: Option<&str>,
    ts: &str,
    ext: &str,
) -> String {
    match kind {
        RecordingKind::Room | RecordingKind::FullRoom => format!("room_{room}_{ts}.{ext}"),
        RecordingKind::Participant => {
            let identity = identity.unwrap_or_default();
            format!("participant_{identity}_{room}_{ts}.{ext}")
        }
        RecordingKind::Emitter | RecordingKind::FullParticipant => {
            let identity = identity.unwrap_or_default();
            format!("participant_{room}_{identity}_{ts}.{ext}")
        }
    }
}

/// Storage folder for a recording kind. Full-record kinds share a session
/// folder scoped by room and start timestamp.
fn folder_prefix(kind: RecordingKind, room: &str, ts: Option<&str>) -> String {
    match kind {
        RecordingKind::Room => "Rooms".to_string(),
        RecordingKind::Participant => "Participants".to_string(),
        RecordingKind::Emitter => room.to_string(),
        RecordingKind::FullRoom | RecordingKind::FullParticipant => {
            format!("full/{room}_{}", ts.unwrap_or_default())
        }
    }
}

/// Join folder prefix and file name, collapsing any doubled separator
fn join_path(prefix: String, filename: &str) -> String {
    if prefix.is_empty() {
        return filename.to_string();
    }
    format!("{prefix}/{filename}").replace("//", "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EgressConfig, StorageConfig};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn orchestrator(uri: &str) -> EgressOrchestrator {
        EgressOrchestrator::new(
            MediaClient::new(uri, "key", "secret").expect("client"),
            EgressConfig::default(),
            StorageConfig::default(),
        )
    }

    fn egress_json(id: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "egressId": id,
            "roomName": "studio-1",
            "status": status,
            "startedAt": "1700000000000000000",
        })
    }

    // -- naming -------------------------------------------------------------

    #[test]
    fn test_room_file_name_shape() {
        let name = build_file_name(RecordingKind::Room, "studio-1", None, "20240131_120000", "mp4");
        assert_eq!(name, "room_studio-1_20240131_120000.mp4");
    }

    #[test]
    fn test_participant_name_orders_identity_first() {
        let single = build_file_name(
            RecordingKind::Participant,
            "studio-1",
            Some("alice"),
            "20240131_120000",
            "mp4",
        );
        assert_eq!(single, "participant_alice_studio-1_20240131_120000.mp4");

        let batch = build_file_name(
            RecordingKind::Emitter,
            "studio-1",
            Some("alice"),
            "20240131_120000",
            "mp4",
        );
        assert_eq!(batch, "participant_studio-1_alice_20240131_120000.mp4");
    }

    #[test]
    fn test_folder_prefixes() {
        assert_eq!(folder_prefix(RecordingKind::Room, "r", None), "Rooms");
        assert_eq!(
            folder_prefix(RecordingKind::Participant, "r", None),
            "Participants"
        );
        assert_eq!(folder_prefix(RecordingKind::Emitter, "studio-1", None), "studio-1");
        assert_eq!(
            folder_prefix(RecordingKind::FullRoom, "studio-1", Some("20240131_120000")),
            "full/studio-1_20240131_120000"
        );
    }

    #[test]
    fn test_join_path_collapses_double_separator() {
        assert_eq!(join_path("Rooms/".to_string(), "a.mp4"), "Rooms/a.mp4");
        assert_eq!(join_path("Rooms".to_string(), "a.mp4"), "Rooms/a.mp4");
        assert_eq!(join_path(String::new(), "a.mp4"), "a.mp4");
    }

    #[test]
    fn test_generated_stamp_matches_pattern() {
        let orch = EgressOrchestrator::new(
            MediaClient::new("http://localhost:1", "key", "secret").expect("client"),
            EgressConfig::default(),
            StorageConfig::default(),
        );
        let ts = orch.now_stamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'_');
        assert_eq!(ts.chars().filter(char::is_ascii_digit).count(), 14);
    }

    #[test]
    fn test_local_timestamp_optional_parse() {
        let orch = EgressOrchestrator::new(
            MediaClient::new("http://localhost:1", "key", "secret").expect("client"),
            EgressConfig::default(),
            StorageConfig::default(),
        );
        assert_eq!(orch.local_timestamp(0), None);
        assert_eq!(orch.local_timestamp(-5), None);

        let iso = orch.local_timestamp(1_700_000_000_000_000_000).expect("timestamp");
        // -06:00 fixed zone from the default config
        assert!(iso.ends_with("-06:00"), "unexpected zone in {iso}");
    }

    // -- orchestration over the wire ----------------------------------------

    #[tokio::test]
    async fn test_emitter_fan_out_starts_only_qualifiers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/ListParticipants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "participants": [
                    {"identity": "alice", "tracks": [{"sid": "1", "type": "AUDIO", "muted": false}]},
                    {"identity": "bob", "tracks": [{"sid": "2", "type": "VIDEO", "muted": true}]},
                    {"identity": "carol", "tracks": [{"sid": "3", "type": "VIDEO", "muted": false}]}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StartParticipantEgress"))
            .and(body_partial_json(serde_json::json!({"identity": "alice"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(egress_json("EG_a", "EGRESS_STARTING")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StartParticipantEgress"))
            .and(body_partial_json(serde_json::json!({"identity": "carol"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(egress_json("EG_c", "EGRESS_STARTING")))
            .expect(1)
            .mount(&server)
            .await;

        let orch = orchestrator(&server.uri());
        let started = orch.record_emitters("studio-1", 1).await.expect("fan-out");

        let mut ids: Vec<_> = started.iter().map(|i| i.egress_id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["EG_a", "EG_c"]);
    }

    #[tokio::test]
    async fn test_emitter_fan_out_all_failures_is_empty_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/ListParticipants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "participants": [
                    {"identity": "alice", "tracks": [{"sid": "1", "type": "AUDIO", "muted": false}]}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StartParticipantEgress"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "code": "internal", "msg": "egress unavailable"
            })))
            .mount(&server)
            .await;

        let orch = orchestrator(&server.uri());
        let started = orch.record_emitters("studio-1", 1).await.expect("fan-out");
        assert!(started.is_empty());
    }

    #[tokio::test]
    async fn test_emitter_fan_out_nothing_qualifies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/ListParticipants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "participants": [
                    {"identity": "bob", "tracks": [{"sid": "1", "type": "AUDIO", "muted": true}]}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StartParticipantEgress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(egress_json("EG_x", "EGRESS_STARTING")))
            .expect(0)
            .mount(&server)
            .await;

        let orch = orchestrator(&server.uri());
        let started = orch.record_emitters("studio-1", 1).await.expect("fan-out");
        assert!(started.is_empty());
    }

    #[tokio::test]
    async fn test_full_record_groups_handles_under_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/ListParticipants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "participants": [
                    {"identity": "alice", "tracks": [{"sid": "1", "type": "VIDEO", "muted": false}]}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StartRoomCompositeEgress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(egress_json("EG_room", "EGRESS_STARTING")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StartParticipantEgress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(egress_json("EG_p", "EGRESS_STARTING")))
            .mount(&server)
            .await;

        let orch = orchestrator(&server.uri());
        let full = orch.full_record("studio-1").await.expect("full record");
        assert_eq!(full.room, "EG_room");
        assert_eq!(full.participants, vec!["EG_p"]);
    }

    #[tokio::test]
    async fn test_full_record_fails_when_room_branch_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/ListParticipants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "participants": [
                    {"identity": "alice", "tracks": [{"sid": "1", "type": "VIDEO", "muted": false}]}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StartRoomCompositeEgress"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "code": "internal", "msg": "compositor crashed"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StartParticipantEgress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(egress_json("EG_p", "EGRESS_STARTING")))
            .mount(&server)
            .await;

        let orch = orchestrator(&server.uri());
        assert!(orch.full_record("studio-1").await.is_err());
    }

    #[tokio::test]
    async fn test_stop_already_finished_returns_last_known_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StopEgress"))
            .respond_with(ResponseTemplate::new(412).set_body_json(serde_json::json!({
                "code": "failed_precondition", "msg": "egress is not active"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/ListEgress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [egress_json("EG_1", "EGRESS_COMPLETE")]
            })))
            .mount(&server)
            .await;

        let orch = orchestrator(&server.uri());
        let outcome = orch.stop_recording("EG_1").await.expect("stop");
        assert!(outcome.already_finished);
        assert_eq!(outcome.info.status, Some(EgressStatus::Complete));
    }

    #[tokio::test]
    async fn test_stop_unknown_id_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StopEgress"))
            .respond_with(ResponseTemplate::new(412).set_body_json(serde_json::json!({
                "code": "failed_precondition", "msg": "egress is not active"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/ListEgress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
            .mount(&server)
            .await;

        let orch = orchestrator(&server.uri());
        let err = orch.stop_recording("EG_missing").await.expect_err("not found");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stop_many_reports_every_id_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StopEgress"))
            .and(body_partial_json(serde_json::json!({"egressId": "EG_ok"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(egress_json("EG_ok", "EGRESS_ENDING")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/StopEgress"))
            .and(body_partial_json(serde_json::json!({"egressId": "EG_bad"})))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "code": "internal", "msg": "boom"
            })))
            .mount(&server)
            .await;

        let orch = orchestrator(&server.uri());
        let reports = orch
            .stop_many(&["EG_ok".to_string(), "EG_bad".to_string()])
            .await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].egress_id, "EG_ok");
        assert_eq!(reports[0].status, Some(EgressStatus::Ending));
        assert!(reports[0].error.is_none());
        assert_eq!(reports[1].egress_id, "EG_bad");
        assert!(reports[1].error.is_some());
    }

    #[tokio::test]
    async fn test_list_by_room_forwards_active_filter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.Egress/ListEgress"))
            .and(body_partial_json(serde_json::json!({"roomName": "studio-1", "active": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [egress_json("EG_live", "EGRESS_ACTIVE")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let orch = orchestrator(&server.uri());
        let items = orch
            .list_recordings_by_room("studio-1", true)
            .await
            .expect("list");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].egress_id, "EG_live");
    }
}

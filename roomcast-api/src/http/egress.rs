// Recording (egress) HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use roomcast_core::client::types::EgressInfo;
use roomcast_core::service::StopReport;
use serde::{Deserialize, Serialize};

use super::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RecordRoomRequest {
    pub room_name: String,
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordParticipantRequest {
    pub room_name: String,
    pub identity: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordEmittersRequest {
    pub room_name: String,
    #[serde(default = "default_min_tracks")]
    pub min_tracks: usize,
}

fn default_min_tracks() -> usize {
    1
}

#[derive(Debug, Deserialize)]
pub struct FullRecordRequest {
    pub room_name: String,
}

#[derive(Debug, Deserialize)]
pub struct StopRecordingQuery {
    pub egress_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StopByIdsRequest {
    #[serde(default)]
    pub room: Vec<String>,
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordingStartedResponse {
    pub status: String,
    pub message: String,
    pub room_name: String,
    pub identity: Option<String>,
    pub egress_id: String,
    /// Zone-local ISO-8601, null until the media server reports a start
    pub started_at: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmitterRecordingsResponse {
    pub status: String,
    pub message: String,
    pub room_name: String,
    pub recordings: Vec<RecordingStartedResponse>,
}

#[derive(Debug, Serialize)]
pub struct FullRecordResponse {
    pub status: String,
    pub room_egress_id: String,
    pub participant_egress_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub status: String,
    pub message: String,
    pub egress_id: String,
    pub egress_status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StopReportResponse {
    pub egress_id: String,
    pub status: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StopByIdsResponse {
    pub room: Vec<StopReportResponse>,
    pub participants: Vec<StopReportResponse>,
}

/// One recording as reported to API callers, with timestamps rendered in
/// the configured zone and the primary file surfaced.
#[derive(Debug, Serialize)]
pub struct RecordingResponse {
    pub egress_id: String,
    pub room_name: String,
    pub status: Option<String>,
    pub file: Option<String>,
    pub url: Option<String>,
    pub size: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListByRoomQuery {
    #[serde(default)]
    pub active_only: bool,
}

fn started_response(state: &AppState, message: &str, info: EgressInfo) -> RecordingStartedResponse {
    RecordingStartedResponse {
        status: "recording".to_string(),
        message: message.to_string(),
        identity: info.participant_identity().map(str::to_owned),
        started_at: state.egress.local_timestamp(info.started_at),
        error: Some(info.error).filter(|e| !e.is_empty()),
        egress_id: info.egress_id,
        room_name: info.room_name,
    }
}

fn recording_to_response(state: &AppState, info: EgressInfo) -> RecordingResponse {
    let file = info
        .room_composite
        .as_ref()
        .and_then(|rc| rc.file_outputs.first())
        .map(|f| f.filepath.clone());
    let result = info.file_results.first();
    RecordingResponse {
        status: info.status.map(|s| s.as_wire_str().to_string()),
        file,
        url: result.map(|f| f.location.clone()).filter(|l| !l.is_empty()),
        size: result.map(|f| f.size).filter(|s| *s > 0),
        duration_seconds: result
            .map(|f| f.duration / 1_000_000_000)
            .filter(|d| *d > 0),
        started_at: state.egress.local_timestamp(info.started_at),
        ended_at: state.egress.local_timestamp(info.ended_at),
        egress_id: info.egress_id,
        room_name: info.room_name,
    }
}

fn report_to_response(report: StopReport) -> StopReportResponse {
    StopReportResponse {
        egress_id: report.egress_id,
        status: report.status.map(|s| s.as_wire_str().to_string()),
        message: report.message,
        error: report.error,
    }
}

/// Start a composite recording of the whole room
pub async fn record_room(
    State(state): State<AppState>,
    Json(req): Json<RecordRoomRequest>,
) -> AppResult<(StatusCode, Json<RecordingStartedResponse>)> {
    if req.room_name.is_empty() {
        return Err(AppError::bad_request("room_name is required"));
    }
    let info = state.egress.record_room(&req.room_name, req.filename).await?;
    Ok((
        StatusCode::CREATED,
        Json(started_response(&state, "Room recording started", info)),
    ))
}

/// Start recording one participant's tracks
pub async fn record_participant(
    State(state): State<AppState>,
    Json(req): Json<RecordParticipantRequest>,
) -> AppResult<(StatusCode, Json<RecordingStartedResponse>)> {
    if req.room_name.is_empty() || req.identity.is_empty() {
        return Err(AppError::bad_request("room_name and identity are required"));
    }
    let info = state
        .egress
        .record_participant(&req.room_name, &req.identity)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(started_response(&state, "Participant recording started", info)),
    ))
}

/// Start one recording per emitter currently publishing in the room.
/// Succeeds with an empty list when nobody qualifies.
pub async fn record_emitters(
    State(state): State<AppState>,
    Json(req): Json<RecordEmittersRequest>,
) -> AppResult<(StatusCode, Json<EmitterRecordingsResponse>)> {
    if req.room_name.is_empty() {
        return Err(AppError::bad_request("room_name is required"));
    }
    if req.min_tracks == 0 {
        return Err(AppError::bad_request("min_tracks must be at least 1"));
    }
    let infos = state
        .egress
        .record_emitters(&req.room_name, req.min_tracks)
        .await?;
    let message = if infos.is_empty() {
        "No participant qualified for recording".to_string()
    } else {
        format!("{} recordings started", infos.len())
    };
    Ok((
        StatusCode::CREATED,
        Json(EmitterRecordingsResponse {
            status: "recording".to_string(),
            message,
            room_name: req.room_name,
            recordings: infos
                .into_iter()
                .map(|i| started_response(&state, "Participant recording started", i))
                .collect(),
        }),
    ))
}

/// Start the room composite plus the emitter fan-out under one session folder
pub async fn full_record(
    State(state): State<AppState>,
    Json(req): Json<FullRecordRequest>,
) -> AppResult<(StatusCode, Json<FullRecordResponse>)> {
    if req.room_name.is_empty() {
        return Err(AppError::bad_request("room_name is required"));
    }
    let recording = state.egress.full_record(&req.room_name).await?;
    Ok((
        StatusCode::CREATED,
        Json(FullRecordResponse {
            status: "recording".to_string(),
            room_egress_id: recording.room,
            participant_egress_ids: recording.participants,
        }),
    ))
}

/// Stop a single recording by its egress id
pub async fn stop_recording(
    State(state): State<AppState>,
    Query(query): Query<StopRecordingQuery>,
) -> AppResult<Json<StopRecordingResponse>> {
    let outcome = state.egress.stop_recording(&query.egress_id).await?;
    let message = if outcome.already_finished {
        "Recording was already finished".to_string()
    } else {
        "Recording stopped".to_string()
    };
    Ok(Json(StopRecordingResponse {
        status: "stopped".to_string(),
        message,
        egress_id: outcome.info.egress_id,
        egress_status: outcome.info.status.map(|s| s.as_wire_str().to_string()),
    }))
}

/// Stop a batch of recordings, reporting each outcome individually
pub async fn stop_recordings_by_ids(
    State(state): State<AppState>,
    Json(req): Json<StopByIdsRequest>,
) -> AppResult<Json<StopByIdsResponse>> {
    if req.room.is_empty() && req.participants.is_empty() {
        return Err(AppError::bad_request("no egress ids supplied"));
    }
    // Both groups stop as one concurrent batch; a slow room stop must not
    // hold up the participant stops.
    let (room, participants) = tokio::join!(
        state.egress.stop_many(&req.room),
        state.egress.stop_many(&req.participants),
    );
    Ok(Json(StopByIdsResponse {
        room: room.into_iter().map(report_to_response).collect(),
        participants: participants.into_iter().map(report_to_response).collect(),
    }))
}

/// List every recording the media server knows about
pub async fn list_recordings(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RecordingResponse>>> {
    let infos = state.egress.list_recordings().await?;
    Ok(Json(
        infos
            .into_iter()
            .map(|i| recording_to_response(&state, i))
            .collect(),
    ))
}

/// List recordings for a single room, optionally only the active ones
pub async fn list_recordings_by_room(
    State(state): State<AppState>,
    Path(room_name): Path<String>,
    Query(query): Query<ListByRoomQuery>,
) -> AppResult<Json<Vec<RecordingResponse>>> {
    let infos = state
        .egress
        .list_recordings_by_room(&room_name, query.active_only)
        .await?;
    Ok(Json(
        infos
            .into_iter()
            .map(|i| recording_to_response(&state, i))
            .collect(),
    ))
}

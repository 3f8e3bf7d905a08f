// Room management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::DateTime;
use roomcast_core::client::types::Room;
use serde::{Deserialize, Serialize};

use super::{AppError, AppResult, AppState};

/// Create room request
#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    /// 0 = unlimited
    #[serde(default)]
    pub max_participants: u32,
    /// Seconds before an empty room closes, 0 = never
    #[serde(default)]
    pub empty_timeout: u32,
}

/// Room response
#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub room_id: String,
    pub room_name: String,
    pub max_participants: u32,
    pub empty_timeout_seconds: u32,
    pub creation_time: Option<String>,
    pub num_participants: u32,
    pub num_publishers: u32,
    pub active_recording: bool,
}

/// Envelope shared by the room endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    pub data: T,
}

fn room_to_response(room: Room) -> RoomResponse {
    let creation_time =
        DateTime::from_timestamp(room.creation_time, 0).map(|dt| dt.to_rfc3339());

    RoomResponse {
        room_id: room.sid,
        room_name: room.name,
        max_participants: room.max_participants,
        empty_timeout_seconds: room.empty_timeout,
        creation_time,
        num_participants: room.num_participants,
        num_publishers: room.num_publishers,
        active_recording: room.active_recording,
    }
}

/// Create a new room
pub async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RoomResponse>>)> {
    if req.name.is_empty() {
        return Err(AppError::bad_request("Room name cannot be empty"));
    }

    if state.rooms.room_exists(&req.name).await? {
        return Err(AppError::conflict("Room already exists and is active"));
    }

    let room = state
        .rooms
        .create_room(&req.name, req.max_participants, req.empty_timeout)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            status: 201,
            message: "Room created".to_string(),
            data: room_to_response(room),
        }),
    ))
}

/// List active rooms
pub async fn list_rooms(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<RoomResponse>>>> {
    let rooms = state.rooms.list_rooms(Vec::new()).await?;
    Ok(Json(ApiResponse {
        status: 200,
        message: "Active rooms".to_string(),
        data: rooms.into_iter().map(room_to_response).collect(),
    }))
}

/// Delete a room by name, disconnecting every participant
pub async fn delete_room(
    State(state): State<AppState>,
    Path(room_name): Path<String>,
) -> AppResult<Json<ApiResponse<Option<()>>>> {
    if !state.rooms.room_exists(&room_name).await? {
        return Err(AppError::not_found(format!(
            "Room '{room_name}' does not exist or was already deleted"
        )));
    }

    state.rooms.delete_room(&room_name).await?;

    Ok(Json(ApiResponse {
        status: 200,
        message: "Room deleted".to_string(),
        data: None,
    }))
}

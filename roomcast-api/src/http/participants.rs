// Participant and access-token HTTP handlers

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use roomcast_core::service::{ParticipantSummary, Role};
use roomcast_core::token::TokenResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub room_name: String,
    pub identity: String,
    pub role: String,
    pub name: Option<String>,
    pub metadata: Option<HashMap<String, Value>>,
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct BatchTokenRequest {
    pub rooms: Vec<String>,
    pub identity: String,
    pub role: String,
    pub name: Option<String>,
    pub metadata: Option<HashMap<String, Value>>,
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub status: String,
    pub message: String,
    pub identity: String,
    pub token: String,
    pub expiration_date: String,
}

#[derive(Debug, Serialize)]
pub struct BatchTokenResponse {
    pub tokens: HashMap<String, TokenResponse>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantSummaryResponse {
    pub room: String,
    pub identity: String,
    pub name: String,
    pub role: String,
    pub is_emitter: bool,
    pub is_viewer: bool,
}

#[derive(Debug, Deserialize)]
pub struct RemoveParticipantQuery {
    pub room: String,
    pub identity: String,
}

fn token_to_response(result: TokenResult) -> TokenResponse {
    TokenResponse {
        status: "success".to_string(),
        message: "Token generated successfully".to_string(),
        identity: result.identity,
        token: result.token,
        expiration_date: result.expires_at.to_rfc3339(),
    }
}

fn summary_to_response(summary: ParticipantSummary) -> ParticipantSummaryResponse {
    ParticipantSummaryResponse {
        room: summary.room,
        identity: summary.identity,
        name: summary.name,
        role: summary.role.as_str().to_string(),
        is_emitter: summary.role == Role::Emitter,
        is_viewer: summary.role == Role::Viewer,
    }
}

fn parse_role(role: &str) -> AppResult<Role> {
    role.parse()
        .map_err(|e: roomcast_core::Error| AppError::bad_request(e.to_string()))
}

/// Issue an access token for one participant in one room
pub async fn generate_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    if req.room_name.is_empty() || req.identity.is_empty() {
        return Err(AppError::bad_request("room_name and identity are required"));
    }

    let role = parse_role(&req.role)?;
    let result = state
        .participants
        .generate_token(
            &req.room_name,
            &req.identity,
            role,
            req.name,
            req.metadata,
            req.ttl_seconds,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(token_to_response(result))))
}

/// Issue tokens for several rooms at once. Rooms failing validation are
/// skipped; when none produce a token the call is a 404.
pub async fn generate_tokens_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchTokenRequest>,
) -> AppResult<(StatusCode, Json<BatchTokenResponse>)> {
    if req.rooms.is_empty() {
        return Err(AppError::bad_request("rooms must not be empty"));
    }

    let role = parse_role(&req.role)?;
    let results = state
        .participants
        .generate_tokens_for_rooms(
            &req.rooms,
            &req.identity,
            role,
            req.name,
            req.metadata,
            req.ttl_seconds,
        )
        .await?;

    if results.is_empty() {
        return Err(AppError::not_found(
            "No token could be generated for any of the requested rooms",
        ));
    }

    let tokens = results
        .into_iter()
        .map(|(room, result)| (room, token_to_response(result)))
        .collect();

    Ok((StatusCode::CREATED, Json(BatchTokenResponse { tokens })))
}

/// List the participants currently in a room
pub async fn list_room_participants(
    State(state): State<AppState>,
    Path(room_name): Path<String>,
) -> AppResult<Json<Vec<ParticipantSummaryResponse>>> {
    let summaries = state.participants.list_room_participants(&room_name).await?;
    Ok(Json(summaries.into_iter().map(summary_to_response).collect()))
}

/// List every participant across every active room
pub async fn list_all_participants(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ParticipantSummaryResponse>>> {
    let summaries = state.participants.list_all_participants().await?;
    Ok(Json(summaries.into_iter().map(summary_to_response).collect()))
}

/// Remove a participant from a room
pub async fn remove_participant(
    State(state): State<AppState>,
    Query(query): Query<RemoveParticipantQuery>,
) -> AppResult<StatusCode> {
    state
        .participants
        .remove_participant(&query.room, &query.identity)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

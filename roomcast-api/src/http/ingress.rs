// Ingress (stream intake) HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use roomcast_core::client::types::{IngressInfo, IngressInput, UpdateIngressRequest};
use serde::{Deserialize, Serialize};

use super::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateIngressBody {
    pub input_type: String,
    pub name: String,
    pub room_name: String,
    pub participant_identity: String,
    pub participant_name: Option<String>,
    pub url: Option<String>,
    pub enable_transcoding: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListIngressQuery {
    pub room_name: Option<String>,
    pub ingress_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateIngressBody {
    pub name: Option<String>,
    pub room_name: Option<String>,
    pub participant_identity: Option<String>,
    pub participant_name: Option<String>,
    pub enable_transcoding: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct IngressResponse {
    pub ingress_id: String,
    pub name: String,
    pub input_type: String,
    pub room_name: String,
    pub participant_identity: String,
    pub participant_name: String,
    pub url: String,
    pub stream_key: String,
    pub status: Option<String>,
}

fn parse_input_type(s: &str) -> AppResult<IngressInput> {
    match s.to_lowercase().as_str() {
        "rtmp" => Ok(IngressInput::Rtmp),
        "whip" => Ok(IngressInput::Whip),
        "url" => Ok(IngressInput::Url),
        other => Err(AppError::bad_request(format!(
            "Unknown input_type '{other}', expected rtmp, whip or url"
        ))),
    }
}

fn input_type_str(input: IngressInput) -> &'static str {
    match input {
        IngressInput::Rtmp => "rtmp",
        IngressInput::Whip => "whip",
        IngressInput::Url => "url",
    }
}

fn ingress_to_response(info: IngressInfo) -> IngressResponse {
    IngressResponse {
        input_type: input_type_str(info.input_type).to_string(),
        status: info.state.map(|s| s.status),
        ingress_id: info.ingress_id,
        name: info.name,
        room_name: info.room_name,
        participant_identity: info.participant_identity,
        participant_name: info.participant_name,
        url: info.url,
        stream_key: info.stream_key,
    }
}

/// Create an ingress point for pushing or pulling media into a room
pub async fn create_ingress(
    State(state): State<AppState>,
    Json(body): Json<CreateIngressBody>,
) -> AppResult<(StatusCode, Json<IngressResponse>)> {
    if body.name.is_empty() || body.room_name.is_empty() || body.participant_identity.is_empty() {
        return Err(AppError::bad_request(
            "name, room_name and participant_identity are required",
        ));
    }
    let input_type = parse_input_type(&body.input_type)?;
    let info = state
        .ingress
        .create(
            input_type,
            &body.name,
            &body.room_name,
            &body.participant_identity,
            body.participant_name,
            body.url,
            body.enable_transcoding,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ingress_to_response(info))))
}

/// List ingress points, optionally filtered by room or id
pub async fn list_ingress(
    State(state): State<AppState>,
    Query(query): Query<ListIngressQuery>,
) -> AppResult<Json<Vec<IngressResponse>>> {
    let infos = state.ingress.list(query.room_name, query.ingress_id).await?;
    Ok(Json(infos.into_iter().map(ingress_to_response).collect()))
}

/// Update an existing ingress
pub async fn update_ingress(
    State(state): State<AppState>,
    Path(ingress_id): Path<String>,
    Json(body): Json<UpdateIngressBody>,
) -> AppResult<Json<IngressResponse>> {
    let info = state
        .ingress
        .update(UpdateIngressRequest {
            ingress_id,
            name: body.name,
            room_name: body.room_name,
            participant_identity: body.participant_identity,
            participant_name: body.participant_name,
            enable_transcoding: body.enable_transcoding,
        })
        .await?;
    Ok(Json(ingress_to_response(info)))
}

/// Delete an ingress
pub async fn delete_ingress(
    State(state): State<AppState>,
    Path(ingress_id): Path<String>,
) -> AppResult<StatusCode> {
    state.ingress.delete(&ingress_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

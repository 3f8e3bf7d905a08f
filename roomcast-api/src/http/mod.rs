// Module: http
// HTTP/JSON REST façade routes and shared state

pub mod auth;
pub mod egress;
pub mod error;
pub mod health;
pub mod ingress;
pub mod participants;
pub mod room;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use roomcast_core::service::{
    EgressOrchestrator, IngressService, ParticipantService, RoomService,
};
use roomcast_core::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rooms: RoomService,
    pub participants: ParticipantService,
    pub egress: Arc<EgressOrchestrator>,
    pub ingress: IngressService,
}

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Room management
        .route("/api/rooms", post(room::create_room))
        .route("/api/rooms", get(room::list_rooms))
        .route("/api/rooms/{room_name}", delete(room::delete_room))
        // Participants & tokens
        .route("/api/participants/token", post(participants::generate_token))
        .route(
            "/api/participants/token/batch",
            post(participants::generate_tokens_batch),
        )
        .route(
            "/api/participants/{room_name}",
            get(participants::list_room_participants),
        )
        .route(
            "/api/participants",
            get(participants::list_all_participants)
                .delete(participants::remove_participant),
        )
        // Egress / recordings
        .route("/api/egress/room", post(egress::record_room))
        .route("/api/egress/participant", post(egress::record_participant))
        .route("/api/egress/emitters", post(egress::record_emitters))
        .route("/api/egress/full", post(egress::full_record))
        .route("/api/egress/stop", post(egress::stop_recording))
        .route("/api/egress/stop/by-ids", post(egress::stop_recordings_by_ids))
        .route("/api/egress", get(egress::list_recordings))
        .route(
            "/api/egress/list/by-room/{room_name}",
            get(egress::list_recordings_by_room),
        )
        // Ingress
        .route("/api/ingress", post(ingress::create_ingress))
        .route("/api/ingress", get(ingress::list_ingress))
        .route("/api/ingress/{ingress_id}", patch(ingress::update_ingress))
        .route("/api/ingress/{ingress_id}", delete(ingress::delete_ingress))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ));

    let router = Router::new()
        // Health check endpoints (for monitoring probes)
        .merge(health::create_health_router())
        .merge(api);

    // Apply layers before state
    let router = router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Apply state to all routes (must be last)
    router.with_state(state)
}

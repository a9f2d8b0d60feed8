//! HTTP + WebSocket API for Maneki
//!
//! Endpoints:
//! - POST /session/new - Create new session
//! - GET /session/{id} - Get session status
//! - POST /session/{id}/detections - Feed one detection tick
//! - POST /session/{id}/gestures - Feed one gesture tick
//! - POST /session/{id}/strategy - Switch strategy
//! - WS /ws/{id} - Live behavior updates
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};

use crate::core::{
    BehaviorController, BlinkSynthesizer, ControllerConfig, LipSyncSynthesizer, Strategy,
};
use crate::types::{
    ActionId, AnimationSink, BehaviorUpdate, DetectionBox, ExpressionSink, FrameSize, HandFrame,
    LookAtSink, MessageCatalog, MessageSink,
};

/// Session state
pub struct Session {
    pub id: String,
    pub controller: BehaviorController,
    pub update_tx: broadcast::Sender<WsEvent>,
    /// Runs for the session's lifetime, like the avatar it drives
    pub blink: BlinkSynthesizer,
    pub lipsync: Option<LipSyncSynthesizer>,
}

/// Everything a WS subscriber sees: behavior snapshots plus the raw sink
/// calls the controller makes, so a remote avatar embedding can mirror them.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEvent {
    Update(BehaviorUpdate),
    Action { action: ActionId },
    Message { text: Option<String>, duration_ms: Option<u64> },
    LookAt { point: [f64; 3] },
    Expression { channel: String, weight: f32 },
}

/// Sink implementation that forwards every call onto the session's
/// broadcast channel. Lagging or absent subscribers are ignored.
struct BroadcastSink {
    tx: broadcast::Sender<WsEvent>,
}

impl AnimationSink for BroadcastSink {
    fn play_action(&self, action: ActionId) {
        let _ = self.tx.send(WsEvent::Action { action });
    }
    fn stop_action(&self, _action: ActionId) {}
}

impl MessageSink for BroadcastSink {
    fn show(&self, text: &str, duration: Duration) {
        let _ = self.tx.send(WsEvent::Message {
            text: Some(text.to_string()),
            duration_ms: Some(duration.as_millis() as u64),
        });
    }
    fn hide(&self) {
        let _ = self.tx.send(WsEvent::Message {
            text: None,
            duration_ms: None,
        });
    }
}

impl LookAtSink for BroadcastSink {
    fn look_at(&self, target: Option<[f64; 3]>) {
        if let Some(point) = target {
            let _ = self.tx.send(WsEvent::LookAt { point });
        }
    }
}

impl ExpressionSink for BroadcastSink {
    fn set_value(&self, channel: &str, weight: f32) {
        let _ = self.tx.send(WsEvent::Expression {
            channel: channel.to_string(),
            weight,
        });
    }
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Session>>,
}

/// Create new session request
#[derive(Debug, Deserialize)]
pub struct NewSessionRequest {
    pub strategy: Option<Strategy>,
    pub frame: Option<FrameSize>,
    pub frame_skip: Option<u32>,
    pub beckon_available: Option<bool>,
    pub messages: Option<MessageCatalog>,
    /// Also run the lip-sync scheduler for this session
    pub lipsync: Option<bool>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub blinking: bool,
    pub lipsync: bool,
    #[serde(flatten)]
    pub update: BehaviorUpdate,
}

/// Detection tick request
#[derive(Debug, Deserialize)]
pub struct DetectionsRequest {
    pub detections: Vec<DetectionBox>,
}

/// Gesture tick request
#[derive(Debug, Deserialize)]
pub struct GesturesRequest {
    pub hands: Vec<HandFrame>,
}

/// Tick response: resulting state plus the smoothed look-at point
#[derive(Debug, Serialize)]
pub struct TickResponse {
    #[serde(flatten)]
    pub update: BehaviorUpdate,
    pub look_at: [f64; 3],
}

/// Strategy switch request
#[derive(Debug, Deserialize)]
pub struct StrategyRequest {
    pub strategy: Strategy,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router() -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/detections", post(post_detections))
        .route("/session/:id/gestures", post(post_gestures))
        .route("/session/:id/strategy", post(post_strategy))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session. Sessions drive a headless controller; the avatar
/// embedding consumes the resulting state over the WebSocket feed.
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<NewSessionResponse>, StatusCode> {
    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);

    let config = ControllerConfig {
        strategy: req.strategy.unwrap_or(Strategy::Selective),
        frame: req.frame.unwrap_or_default(),
        frame_skip: req.frame_skip.unwrap_or(1),
        beckon_available: req.beckon_available.unwrap_or(true),
        messages: req.messages.unwrap_or_default(),
        ..ControllerConfig::default()
    };

    let sink = Arc::new(BroadcastSink { tx: tx.clone() });

    // The avatar blinks for as long as the session exists
    let blink = BlinkSynthesizer::new(sink.clone());
    blink
        .start()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let lipsync = if req.lipsync.unwrap_or(false) {
        let synth = LipSyncSynthesizer::new(sink.clone());
        synth
            .start()
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        Some(synth)
    } else {
        None
    };

    let session = Session {
        id: session_id.clone(),
        controller: BehaviorController::new(config, sink.clone(), sink.clone(), sink),
        update_tx: tx,
        blink,
        lipsync,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);

    Ok(Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
    }))
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(SessionStatusResponse {
        session_id: id,
        blinking: session.blink.is_active(),
        lipsync: session
            .lipsync
            .as_ref()
            .is_some_and(|synth| synth.is_running()),
        update: session.controller.snapshot(),
    }))
}

/// Feed one detection tick to a session
async fn post_detections(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<DetectionsRequest>,
) -> Result<Json<TickResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    session.controller.begin_frame();
    session.controller.ingest_detections(&req.detections, Instant::now());
    let look_at = session.controller.update_gaze();

    let update = session.controller.snapshot();
    let _ = session.update_tx.send(WsEvent::Update(update.clone()));

    Ok(Json(TickResponse { update, look_at }))
}

/// Feed one gesture tick to a session
async fn post_gestures(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GesturesRequest>,
) -> Result<Json<TickResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    session.controller.ingest_gestures(&req.hands, Instant::now());
    let look_at = session.controller.update_gaze();

    let update = session.controller.snapshot();
    let _ = session.update_tx.send(WsEvent::Update(update.clone()));

    Ok(Json(TickResponse { update, look_at }))
}

/// Switch the session's strategy. Tracking state resets; an in-flight
/// reaction is left to finish on its own.
async fn post_strategy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<StrategyRequest>,
) -> Result<Json<TickResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    session.controller.set_strategy(req.strategy);
    let look_at = session.controller.update_gaze();

    let update = session.controller.snapshot();
    let _ = session.update_tx.send(WsEvent::Update(update.clone()));

    Ok(Json(TickResponse { update, look_at }))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Handle WebSocket connection
async fn handle_websocket(mut socket: WebSocket, mut rx: broadcast::Receiver<WsEvent>) {
    while let Ok(event) = rx.recv().await {
        let json = serde_json::to_string(&event).unwrap_or_default();
        if socket.send(Message::Text(json)).await.is_err() {
            break;
        }
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("session_{:x}", nanos as u64)
}

/// Run the API server
pub async fn run_server(addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("招 Maneki API running on {}", addr);
    println!("  POST /session/new             - Create session");
    println!("  GET  /session/:id             - Get status");
    println!("  POST /session/:id/detections  - Feed detection tick");
    println!("  POST /session/:id/gestures    - Feed gesture tick");
    println!("  POST /session/:id/strategy    - Switch strategy");
    println!("  WS   /ws/:id                  - Live updates");
    println!("  GET  /health                  - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::colors::page;
use crate::error::Error;
use crate::screen::{HostScreen, ScreenSnapshot};

pub const MAX_DIMENSION: u32 = 4096;
pub const MAX_SCALE: f32 = 8.0;
const BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub screen: Arc<HostScreen>,
    pub width: u32,
    pub height: u32,
}

impl AppState {
    pub fn new(screen: HostScreen, width: u32, height: u32) -> Self {
        Self {
            screen: Arc::new(screen),
            width,
            height,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

fn render_failed(err: Error) -> ApiError {
    tracing::error!("Failed to render thermometer: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

#[derive(Debug, Deserialize)]
struct SliderRequest {
    position: i32,
}

#[derive(Debug, Deserialize)]
struct TemperatureRequest {
    value: f32,
}

#[derive(Debug, Default, Deserialize)]
struct RenderQuery {
    width: Option<u32>,
    height: Option<u32>,
    scale: Option<f32>,
}

impl RenderQuery {
    fn size(&self, state: &AppState) -> Result<(u32, u32), ApiError> {
        let width = self.width.unwrap_or(state.width);
        let height = self.height.unwrap_or(state.height);

        for (name, value) in [("width", width), ("height", height)] {
            if value == 0 || value > MAX_DIMENSION {
                return Err(bad_request(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_DIMENSION, value
                )));
            }
        }
        Ok((width, height))
    }

    /// The scaled image must be at least one pixel and fit within `MAX_DIMENSION`.
    fn scale(&self, width: u32, height: u32) -> Result<f32, ApiError> {
        let scale = self.scale.unwrap_or(1.0);
        if !(scale > 0.0 && scale <= MAX_SCALE) {
            return Err(bad_request(format!(
                "scale must be in (0, {}], got {}",
                MAX_SCALE, scale
            )));
        }
        if (width.min(height) as f32 * scale) < 1.0 {
            return Err(bad_request(format!(
                "scale {} shrinks the image below one pixel",
                scale
            )));
        }
        if width.max(height) as f32 * scale > MAX_DIMENSION as f32 {
            return Err(bad_request(format!(
                "scaled image exceeds {} pixels",
                MAX_DIMENSION
            )));
        }
        Ok(scale)
    }
}

#[derive(Template)]
#[template(path = "screen.html")]
struct ScreenTemplate {
    width: u32,
    height: u32,
    position: i32,
    max: i32,
    temperature: String,
    background: &'static str,
    text_primary: &'static str,
    text_secondary: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/state", get(get_state))
        .route("/slider", post(move_slider))
        .route("/temperature", post(set_temperature))
        .route("/thermometer.svg", get(thermometer_svg))
        .route("/thermometer.png", get(thermometer_png))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT)),
        )
}

async fn root(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let snapshot = state.screen.snapshot();
    ScreenTemplate {
        width: state.width,
        height: state.height,
        position: snapshot.position,
        max: state.screen.slider_max(),
        temperature: format!("{:.0}", snapshot.temperature),
        background: page::BACKGROUND,
        text_primary: page::TEXT_PRIMARY,
        text_secondary: page::TEXT_SECONDARY,
    }
    .render()
    .map(Html)
    .map_err(|e| render_failed(Error::Render(format!("Failed to render page: {}", e))))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn get_state(State(state): State<AppState>) -> Json<ScreenSnapshot> {
    Json(state.screen.snapshot())
}

async fn move_slider(
    State(state): State<AppState>,
    Json(request): Json<SliderRequest>,
) -> Json<ScreenSnapshot> {
    state.screen.slide_to(request.position);
    Json(state.screen.snapshot())
}

async fn set_temperature(
    State(state): State<AppState>,
    Json(request): Json<TemperatureRequest>,
) -> Json<ScreenSnapshot> {
    state.screen.set_temperature(request.value);
    tracing::info!(
        requested = request.value,
        stored = state.screen.temperature(),
        "Temperature set"
    );
    Json(state.screen.snapshot())
}

fn image_response(content_type: &'static str, body: impl IntoResponse) -> Response {
    (
        [
            ("Content-Type", content_type),
            ("Cache-Control", "no-cache, no-store, must-revalidate"),
            ("Pragma", "no-cache"),
            ("Expires", "0"),
        ],
        body,
    )
        .into_response()
}

async fn thermometer_svg(
    State(state): State<AppState>,
    Query(query): Query<RenderQuery>,
) -> Result<Response, ApiError> {
    let (width, height) = query.size(&state)?;
    let svg = state
        .screen
        .render_svg(width, height)
        .map_err(render_failed)?;
    Ok(image_response("image/svg+xml", svg))
}

async fn thermometer_png(
    State(state): State<AppState>,
    Query(query): Query<RenderQuery>,
) -> Result<Response, ApiError> {
    let (width, height) = query.size(&state)?;
    let scale = query.scale(width, height)?;

    let png = state
        .screen
        .render_png(width, height, scale)
        .map_err(render_failed)?;
    Ok(image_response("image/png", png))
}

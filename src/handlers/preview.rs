use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::preview::{render_html, CustomPreview, Platform, PreviewFormat, PreviewProfile};
use crate::AppState;

use super::AppError;

// ─── Request types ───────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    platform: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomPreviewRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    platform: Option<String>,
}

// ─── GET /api/preview ────────────────────────────────────────────

pub async fn get_preview(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Option<Query<PreviewQuery>>,
) -> Response {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let platform = query.platform.as_deref().and_then(Platform::parse);
    let profile = profile_for(&state, &headers);

    let format = query
        .format
        .as_deref()
        .map(PreviewFormat::parse)
        .unwrap_or_default();

    match format {
        PreviewFormat::Html => {
            let bundle = profile.complete(platform).rendered_as(format);
            Html(render_html(&bundle)).into_response()
        }
        PreviewFormat::StructuredData => Json(profile.structured_data()).into_response(),
        PreviewFormat::Json => Json(serde_json::json!({
            "success": true,
            "data": profile.complete(platform).rendered_as(format),
        }))
        .into_response(),
    }
}

// ─── POST /api/preview ───────────────────────────────────────────

pub async fn custom_preview(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let raw: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::Internal(format!("unreadable preview body: {e}")))?;
    let req: CustomPreviewRequest = serde_json::from_value(raw)
        .map_err(|e| AppError::BadRequest(format!("invalid preview request: {e}")))?;

    let (title, description) = match (non_blank(req.title), non_blank(req.description)) {
        (Some(t), Some(d)) => (t, d),
        _ => {
            return Err(AppError::BadRequest(
                "Missing required fields: title and description are required".into(),
            ))
        }
    };

    let platform = req.platform.as_deref().and_then(Platform::parse);
    let profile = profile_for(&state, &headers);
    let bundle = profile.complete_from(
        CustomPreview {
            title,
            description,
            image: non_blank(req.image),
            url: non_blank(req.url),
        },
        platform,
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "data": bundle,
    })))
}

// ─── Helpers ─────────────────────────────────────────────────────

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The configured profile, re-rooted at the request's own origin when no
/// public base URL is configured.
fn profile_for(state: &AppState, headers: &HeaderMap) -> PreviewProfile {
    if state.config.public_base_url.is_some() {
        return state.preview.clone();
    }
    match request_origin(headers) {
        Some(origin) => state.preview.with_base_url(origin),
        None => state.preview.clone(),
    }
}

fn request_origin(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?.trim();
    if host.is_empty() {
        return None;
    }
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|p| *p == "http" || *p == "https")
        .unwrap_or("http");
    Some(format!("{proto}://{host}"))
}

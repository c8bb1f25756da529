//! Inbound webhook endpoints, one per source system.
//!
//! Handlers take the raw body so the signature is computed over the exact
//! bytes the sender signed, then gate on size and signature before parsing.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json};
use leadgate_core::models::{Action, AuditRecord, SyncReport};
use leadgate_core::signature::{self, SIGNATURE_HEADER};
use leadgate_core::source::SourceSystem;
use leadgate_core::Error;
use serde::Serialize;

use crate::error::ApiError;
use crate::server::AppState;

#[tracing::instrument(level = "debug", skip_all)]
pub fn router() -> axum::Router {
    axum::Router::new()
        .route("/webhooks/sgcrm", post(sgcrm_webhook))
        .route("/webhooks/smartlead", post(smartlead_webhook))
}

/// Response contract to the webhook sender on success.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub hubspot_contact_id: String,
    pub action: Action,
    pub audit_log: AuditRecord,
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            success: true,
            hubspot_contact_id: report.contact_id,
            action: report.action,
            audit_log: report.audit,
        }
    }
}

#[tracing::instrument(level = "debug", skip_all)]
async fn sgcrm_webhook(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    handle(state, SourceSystem::Sgcrm, headers, body).await
}

#[tracing::instrument(level = "debug", skip_all)]
async fn smartlead_webhook(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    handle(state, SourceSystem::Smartlead, headers, body).await
}

async fn handle(
    state: Arc<AppState>,
    source: SourceSystem,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match handle_inbound(&state, source, &headers, &body).await {
        Ok(report) => (StatusCode::OK, Json(SyncResponse::from(report))).into_response(),
        Err(err) => {
            tracing::warn!(source = %source, error = %err, "webhook rejected");
            err.into_response()
        }
    }
}

async fn handle_inbound(
    state: &AppState,
    source: SourceSystem,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<SyncReport, ApiError> {
    if body.len() > state.max_payload_bytes {
        return Err(Error::PayloadTooLarge.into());
    }

    let provided = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    signature::verify_if_configured(&state.signature, provided, body)?;

    let payload: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| Error::InvalidPayload(format!("invalid json body: {e}")))?;

    Ok(state.engine.process(source, &payload).await?)
}

//! Request handlers for the avatar API.
//!
//! Dispatches a decoded request to the corresponding registry operation
//! and encodes the outcome as a JSON response.

use log::warn;
use serde_json::json;

use crate::error::handlers::{protocol_error_status, registry_error_status};
use crate::error::{ProtocolError, RegistryError};
use crate::protocol::commands::Request;
use crate::protocol::responses::{self, Response};
use crate::registry::AvatarRegistry;

/// Dispatches a decoded avatar API request.
///
/// # Arguments
///
/// * `registry` - The shared avatar registry.
/// * `request` - The decoded request to execute.
/// * `now_ms` - Timestamp to execute it at, from the server's clock.
pub async fn handle_request(
    registry: &AvatarRegistry,
    request: &Request,
    now_ms: u64,
) -> Response {
    match request {
        Request::NewAvatar => {
            let id = registry.create(now_ms).await;
            Response::json(responses::OK, json!({"status": "OK", "id": id}).to_string())
        }
        Request::ListAvatars => {
            let views = registry.list(now_ms).await;
            let body = serde_json::to_string(&views).unwrap_or_else(|e| {
                warn!("Failed to serialize avatar list: {}", e);
                "[]".to_string()
            });
            Response::json(responses::OK, body)
        }
        Request::UpdateAvatar { id, x, y } => {
            match registry.update_position(*id, *x, *y, now_ms).await {
                Ok(()) => Response::json(responses::OK, json!({"status": "OK"}).to_string()),
                Err(e) => registry_error_response(&e),
            }
        }
        Request::Speak { id, text } => match registry.speak(*id, text, now_ms).await {
            Ok(()) => Response::json(responses::OK, json!({"status": "OK"}).to_string()),
            Err(e) => registry_error_response(&e),
        },
    }
}

/// Encodes a registry error as a JSON error response.
fn registry_error_response(err: &RegistryError) -> Response {
    let status = registry_error_status(err);
    Response::json(
        status,
        json!({"error": error_label(status), "message": err.to_string()}).to_string(),
    )
}

/// Encodes a protocol error as a JSON error response.
pub fn protocol_error_response(err: &ProtocolError) -> Response {
    let status = protocol_error_status(err);
    Response::json(
        status,
        json!({"error": error_label(status), "message": err.to_string()}).to_string(),
    )
}

fn error_label(status: u16) -> &'static str {
    match status {
        responses::BAD_REQUEST => "BAD_REQUEST",
        responses::NOT_FOUND => "NOT_FOUND",
        responses::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        _ => "ERROR",
    }
}

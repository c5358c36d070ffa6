//! Bearer-token authentication

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::AppState;

/// Authenticated device stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedDevice {
    pub device_id: Uuid,
    pub token: String,
}

/// Resolve the `Authorization: Bearer <token>` header to a device
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(&request)?.to_string();

    let device = state
        .db
        .get_device_by_token(&token)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Rejected unknown device token on {}", request.uri().path());
            ApiError::Unauthorized("Invalid device token".to_string())
        })?;

    state.db.update_last_seen(device.id).await?;

    request.extensions_mut().insert(AuthenticatedDevice {
        device_id: device.id,
        token,
    });

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request<Body>) -> Result<&str> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/dashboard");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_extracted() {
        let req = request(Some("Bearer abc123"));
        assert_eq!(bearer_token(&req).unwrap(), "abc123");
    }

    #[test]
    fn test_missing_header_rejected() {
        let req = request(None);
        assert!(matches!(bearer_token(&req), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        let req = request(Some("Basic dXNlcjpwYXNz"));
        assert!(matches!(bearer_token(&req), Err(ApiError::Unauthorized(_))));
        let req = request(Some("Bearer "));
        assert!(matches!(bearer_token(&req), Err(ApiError::Unauthorized(_))));
    }
}

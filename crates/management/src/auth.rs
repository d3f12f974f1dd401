//! Bearer token authentication middleware.
//!
//! Development: the token is `zc_dev_{tenant_uuid}`, so the tenant identity
//! is carried in the token itself. Production: replace with JWT validation
//! that resolves the tenant claim the same way.
//!
//! Every handler receives the tenant as an extension; no handler trusts a
//! tenant id from the request body or path.

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::models::ActionResult;

const DEV_TOKEN_PREFIX: &str = "zc_dev_";

/// The authenticated tenant, injected by [`auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantId(pub Uuid);

/// Development token for a tenant.
pub fn dev_token(tenant_id: Uuid) -> String {
    format!("{DEV_TOKEN_PREFIX}{tenant_id}")
}

fn parse_token(value: &str) -> Option<TenantId> {
    let token = value.strip_prefix("Bearer ")?;
    let raw = token.strip_prefix(DEV_TOKEN_PREFIX)?;
    Uuid::parse_str(raw).ok().map(TenantId)
}

/// Rejects the request with 401 unless a valid tenant token is present.
pub async fn auth_middleware(mut req: Request, next: Next) -> Response {
    if req.uri().path().starts_with("/health") {
        return next.run(req).await;
    }

    let tenant = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_token);

    match tenant {
        Some(tenant) => {
            req.extensions_mut().insert(tenant);
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(ActionResult::err("Tenant not identified.")),
        )
            .into_response(),
    }
}

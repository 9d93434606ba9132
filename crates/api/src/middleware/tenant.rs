//! Tenant identity for admin routes.
//!
//! The gateway in front of the API authenticates administrators and forwards
//! the tenant they act for in the `X-Tenant-Id` header.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use rollcall_core::errors::RollcallError;
use uuid::Uuid;

use super::error_handling::AppError;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Extracts the acting tenant. Missing or malformed headers are rejected
/// with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for TenantId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(TENANT_HEADER)
            .ok_or_else(|| RollcallError::Authentication("Missing tenant header".to_string()))?;

        value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map(TenantId)
            .ok_or_else(|| AppError(RollcallError::Authentication("Invalid tenant header".to_string())))
    }
}

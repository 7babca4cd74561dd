//! Owner id extractor.
//!
//! Reads `X-Owner-Id`; requests without it belong to `anonymous`. The id is
//! only recorded on runs, never checked.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::http::error::AppError;

pub const OWNER_HEADER: &str = "x-owner-id";
pub const ANONYMOUS: &str = "anonymous";
const MAX_OWNER_CHARS: usize = 128;

/// Caller identity recorded on created runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for OwnerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(OWNER_HEADER) else {
            return Ok(OwnerId(ANONYMOUS.to_string()));
        };

        let owner = value
            .to_str()
            .map_err(|_| AppError::Validation("Invalid X-Owner-Id header encoding".to_string()))?
            .trim();

        if owner.is_empty() {
            return Ok(OwnerId(ANONYMOUS.to_string()));
        }
        if owner.chars().count() > MAX_OWNER_CHARS {
            return Err(AppError::Validation(format!(
                "X-Owner-Id must be at most {MAX_OWNER_CHARS} characters"
            )));
        }
        Ok(OwnerId(owner.to_string()))
    }
}

pub mod admin;
pub mod balance;
pub mod order;
pub mod public;

use serde::Serialize;
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl Default for SuccessResponse {
    fn default() -> Self {
        Self { success: true }
    }
}

/// Schema validation, surfaced as 422.
pub(crate) fn validate<T: Validate>(value: &T) -> Result<(), AppError> {
    value
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}

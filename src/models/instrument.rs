use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Instrument {
    pub ticker: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InstrumentCreateRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(custom = "crate::models::validate_ticker")]
    pub ticker: String,
}

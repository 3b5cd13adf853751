//! JSON round trip for UI-IR documents.
//!
//! `deserialize(serialize(x)) == x` holds for every validated `x`: timestamps
//! are held at millisecond precision and printed as ISO-8601 with a `Z`
//! suffix, and every map is key-ordered.

use serde_json::Value;
use thiserror::Error;

use crate::schema::UiIr;
use crate::validation::{ValidationError, Validator};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub fn serialize(ui: &UiIr) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(ui)?)
}

/// Parse, then re-validate with the default policy.
pub fn deserialize(text: &str) -> Result<UiIr, CodecError> {
    deserialize_with(&Validator::new(), text)
}

pub fn deserialize_with(validator: &Validator, text: &str) -> Result<UiIr, CodecError> {
    let raw: Value = serde_json::from_str(text)?;
    Ok(validator.validate(&raw)?)
}

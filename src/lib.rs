//! UI-IR Core - Validate, Patch, Lower
//!
//! # The Four Laws
//! 1. Validation Is the Gate: nothing unvalidated reaches patching or codegen
//! 2. Patches Never Mutate Their Input
//! 3. Deterministic Output
//! 4. Every Node Renders

pub mod schema;
pub mod validation;
pub mod codec;
pub mod patch;
pub mod render;
pub mod codegen;
pub mod hashing;
pub mod config;
pub mod sample;

pub use schema::{ComponentType, LayoutNode, NodePatch, Patch, PatchOp, Theme, UiIr};
pub use validation::{
    validate, validate_node, validate_patch, validate_patches, ValidationError, ValidationPolicy,
    ValidationReport, ValidationViolation, Validator, ViolationSeverity,
};
pub use codec::{deserialize, serialize, CodecError};
pub use patch::{apply_patch, apply_patches, PatchError};
pub use render::RenderTable;
pub use codegen::{generate, generate_target, CodeBundle, CodegenError, Framework, GenerateOptions};
pub use hashing::{bundle_digest, canonical_json, document_fingerprint};
pub use config::{ConfigError, CoreConfig};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

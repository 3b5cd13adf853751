//! Fingerprints for documents and bundles
//!
//! Deterministic digests for documents and generated bundles, so callers can
//! compare revisions or confirm that regeneration is byte-identical.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::codegen::CodeBundle;
use crate::schema::UiIr;

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Compact JSON with object keys in sorted order at every depth.
///
/// Goes through `serde_json::Value`, whose object map is key-ordered, so
/// struct field order and map insertion order never leak into the text.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&serde_json::to_value(value)?)
}

/// Content fingerprint of a document. Equal documents hash equally.
pub fn document_fingerprint(ui: &UiIr) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(ui)?.as_bytes()))
}

pub fn file_digests(bundle: &CodeBundle) -> BTreeMap<String, String> {
    bundle
        .files
        .iter()
        .map(|(path, source)| (path.clone(), sha256_hex(source.as_bytes())))
        .collect()
}

/// Single digest over every (path, content) pair plus the entry path.
pub fn bundle_digest(bundle: &CodeBundle) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bundle.framework.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(bundle.entry.as_bytes());
    for (path, source) in &bundle.files {
        hasher.update([0u8]);
        hasher.update(path.as_bytes());
        hasher.update([0u8]);
        hasher.update((source.len() as u64).to_be_bytes());
        hasher.update(source.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{generate, Framework, GenerateOptions};
    use crate::sample::sample_document;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": {"y": 1, "b": 2}});
        assert_eq!(canonical_json(&obj).unwrap(), r#"{"a":2,"m":{"b":2,"y":1},"z":1}"#);
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let ui = sample_document();
        let same = document_fingerprint(&ui.clone()).unwrap();
        assert_eq!(document_fingerprint(&ui).unwrap(), same);

        let mut edited = ui.clone();
        edited.metadata.revision = 2;
        assert_ne!(document_fingerprint(&edited).unwrap(), same);
    }

    #[test]
    fn test_bundle_digest_differs_per_framework() {
        let ui = sample_document();
        let next = generate(&ui, &GenerateOptions::new(Framework::Next));
        let react = generate(&ui, &GenerateOptions::new(Framework::React));
        assert_eq!(bundle_digest(&next), bundle_digest(&next.clone()));
        assert_ne!(bundle_digest(&next), bundle_digest(&react));
        assert_eq!(file_digests(&next).len(), next.files.len());
    }
}

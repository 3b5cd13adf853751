//! Validation System - Rule/Policy Separation
//!
//! Rules walk the raw JSON and produce structured violations, each carrying
//! the offending field path. Policy decides which severities block.
//! Only a document with no blocking violation is decoded into typed form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::schema::{timestamp, LayoutNode, Patch, UiIr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    /// JSONPath-like location, e.g. `$.layoutTree.children[0].type`.
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(actual) = &self.actual {
            write!(f, " (got {})", actual)?;
        }
        Ok(())
    }
}

/// Every blocking violation found in one input, never just the first.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed with {} violation(s): {}", .violations.len(), summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<ValidationViolation>,
}

impl ValidationError {
    pub fn paths(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.path.as_str()).collect()
    }

    fn single(rule: &str, path: &str, message: impl Into<String>) -> Self {
        Self {
            violations: vec![ValidationViolation {
                rule: rule.to_string(),
                severity: ViolationSeverity::Error,
                path: path.to_string(),
                message: message.into(),
                actual: None,
            }],
        }
    }
}

fn summarize(violations: &[ValidationViolation]) -> String {
    violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; ")
}

/// Outcome of checking a raw document without decoding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Warnings are reported and logged but never block.
    #[default]
    Lenient,
    /// Warnings block like errors.
    Strict,
}

/// Validation rule trait - produces violations for a raw document
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, document: &Value) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

/// Full structural check of the document shape, enumerations and bounds.
pub struct DocumentShapeRule;

impl ValidationRule for DocumentShapeRule {
    fn name(&self) -> &'static str { "shape" }

    fn validate(&self, document: &Value) -> Vec<ValidationViolation> {
        let mut walker = ShapeWalker::new(self.name());
        walker.document(document);
        walker.violations
    }
}

/// Node ids are expected to be unique across the tree. Patches resolve
/// duplicates by first pre-order match, so this is a warning by default.
pub struct UniqueIdRule;

impl ValidationRule for UniqueIdRule {
    fn name(&self) -> &'static str { "unique_id" }

    fn validate(&self, document: &Value) -> Vec<ValidationViolation> {
        let mut seen: HashMap<&str, String> = HashMap::new();
        let mut violations = vec![];
        if let Some(root) = document.get("layoutTree") {
            collect_ids(root, "$.layoutTree".to_string(), &mut seen, &mut violations, self.name());
        }
        violations
    }
}

fn collect_ids<'a>(
    node: &'a Value,
    path: String,
    seen: &mut HashMap<&'a str, String>,
    violations: &mut Vec<ValidationViolation>,
    rule: &str,
) {
    if let Some(id) = node.get("id").and_then(Value::as_str) {
        if let Some(first) = seen.get(id) {
            violations.push(ValidationViolation {
                rule: rule.to_string(),
                severity: ViolationSeverity::Warning,
                path: format!("{}.id", path),
                message: format!("duplicate node id, first declared at {}", first),
                actual: Some(id.to_string()),
            });
        } else {
            seen.insert(id, path.clone());
        }
    }
    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for (index, child) in children.iter().enumerate() {
            collect_ids(child, format!("{}.children[{}]", path, index), seen, violations, rule);
        }
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
    policy: ValidationPolicy,
}

impl Validator {
    pub fn new() -> Self {
        Self::with_policy(ValidationPolicy::default())
    }

    pub fn with_policy(policy: ValidationPolicy) -> Self {
        Self {
            rules: vec![Box::new(DocumentShapeRule), Box::new(UniqueIdRule)],
            policy,
        }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Run every rule and apply the failure policy.
    pub fn check(&self, document: &Value) -> ValidationReport {
        let violations: Vec<_> = self.rules.iter().flat_map(|rule| rule.validate(document)).collect();
        let blocking = violations.iter().any(|v| self.blocks(v));
        ValidationReport { valid: !blocking, violations }
    }

    /// Check, then decode into a typed document with every default applied.
    pub fn validate(&self, document: &Value) -> Result<UiIr, ValidationError> {
        let report = self.check(document);
        let (blocking, advisory): (Vec<_>, Vec<_>) =
            report.violations.into_iter().partition(|v| self.blocks(v));

        for warning in &advisory {
            tracing::warn!(rule = %warning.rule, path = %warning.path, "{}", warning.message);
        }
        if !blocking.is_empty() {
            tracing::debug!(violations = blocking.len(), "document rejected");
            return Err(ValidationError { violations: blocking });
        }

        let ui: UiIr = decode(document)?;
        tracing::debug!(id = %ui.id, nodes = ui.layout_tree.node_count(), "document accepted");
        Ok(ui)
    }

    fn blocks(&self, violation: &ValidationViolation) -> bool {
        match violation.severity {
            ViolationSeverity::Error => true,
            ViolationSeverity::Warning => self.policy == ValidationPolicy::Strict,
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a raw document with the default (lenient) policy.
pub fn validate(document: &Value) -> Result<UiIr, ValidationError> {
    Validator::new().validate(document)
}

/// Validate a standalone layout node (and its subtree).
pub fn validate_node(node: &Value) -> Result<LayoutNode, ValidationError> {
    let mut walker = ShapeWalker::new("shape");
    walker.node(node, "$", false);
    walker.finish()?;
    decode(node)
}

pub fn validate_patch(patch: &Value) -> Result<Patch, ValidationError> {
    let mut walker = ShapeWalker::new("shape");
    walker.patch(patch, "$");
    walker.finish()?;
    decode(patch)
}

/// Validate an ordered JSON array of patches, reporting all bad entries.
pub fn validate_patches(patches: &Value) -> Result<Vec<Patch>, ValidationError> {
    let mut walker = ShapeWalker::new("shape");
    match patches.as_array() {
        Some(items) => {
            for (index, item) in items.iter().enumerate() {
                walker.patch(item, &format!("$[{}]", index));
            }
        }
        None => walker.push("$", "expected array of patches", Some(kind_of(patches))),
    }
    walker.finish()?;
    decode(patches)
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, ValidationError> {
    serde_json::from_value(value.clone())
        .map_err(|e| ValidationError::single("decode", "$", e.to_string()))
}

fn kind_of(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}

const COMPONENT_TYPES: &[&str] = &[
    "page", "section", "stack", "grid", "text", "button", "input", "image", "card",
    "table", "list", "listItem", "form", "badge", "nav", "modal", "hero", "chart",
];
const ALIGNMENTS: &[&str] = &["start", "center", "end", "stretch"];
const TRIGGERS: &[&str] = &["onClick", "onSubmit", "onChange", "onMount", "onHover"];
const ACTIONS: &[&str] = &["navigate", "emit", "mutateState", "openModal", "closeModal"];
const EMPHASES: &[&str] = &["default", "primary", "secondary", "danger", "ghost"];
const TONES: &[&str] = &["neutral", "success", "warning", "error", "info"];
const BORDER_STYLES: &[&str] = &["solid", "dashed", "none"];
const TEXT_ALIGNS: &[&str] = &["left", "center", "right"];
const ASSET_KINDS: &[&str] = &["image", "audio", "transcript", "sketch"];
const DATA_SOURCE_TYPES: &[&str] = &["static", "rest", "graphql", "supabase", "airtable", "custom"];
const DOCUMENT_SOURCES: &[&str] = &["sketch", "voice", "mixed"];
const PATCH_OPS: &[&str] = &["replace", "remove", "insert", "update"];

#[derive(Clone, Copy)]
enum Bound {
    Any,
    NonNegative,
    Positive,
    Unit,
}

impl Bound {
    fn admits(self, n: f64) -> bool {
        match self {
            Bound::Any => true,
            Bound::NonNegative => n >= 0.0,
            Bound::Positive => n > 0.0,
            Bound::Unit => (0.0..=1.0).contains(&n),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Bound::Any => "expected number",
            Bound::NonNegative => "expected number >= 0",
            Bound::Positive => "expected number > 0",
            Bound::Unit => "expected number between 0 and 1",
        }
    }
}

/// Walks raw JSON against the UI-IR shape, collecting every violation.
struct ShapeWalker {
    rule: &'static str,
    violations: Vec<ValidationViolation>,
}

impl ShapeWalker {
    fn new(rule: &'static str) -> Self {
        Self { rule, violations: vec![] }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.violations })
        }
    }

    fn push(&mut self, path: &str, message: &str, actual: Option<String>) {
        self.violations.push(ValidationViolation {
            rule: self.rule.to_string(),
            severity: ViolationSeverity::Error,
            path: path.to_string(),
            message: message.to_string(),
            actual,
        });
    }

    fn object<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
        match value.as_object() {
            Some(map) => Some(map),
            None => {
                self.push(path, "expected object", Some(kind_of(value)));
                None
            }
        }
    }

    fn required<'a>(&mut self, map: &'a Map<String, Value>, key: &str, path: &str) -> Option<&'a Value> {
        let value = map.get(key);
        if value.is_none() {
            self.push(&field(path, key), "required field missing", None);
        }
        value
    }

    fn string(&mut self, value: &Value, path: &str) {
        if !value.is_string() {
            self.push(path, "expected string", Some(kind_of(value)));
        }
    }

    fn required_string(&mut self, map: &Map<String, Value>, key: &str, path: &str) {
        if let Some(value) = self.required(map, key, path) {
            self.string(value, &field(path, key));
        }
    }

    fn optional_string(&mut self, map: &Map<String, Value>, key: &str, path: &str) {
        if let Some(value) = map.get(key) {
            self.string(value, &field(path, key));
        }
    }

    fn number(&mut self, value: &Value, path: &str, bound: Bound) {
        match value.as_f64() {
            Some(n) if bound.admits(n) => {}
            Some(_) => self.push(path, bound.describe(), Some(value.to_string())),
            None => self.push(path, bound.describe(), Some(kind_of(value))),
        }
    }

    fn optional_number(&mut self, map: &Map<String, Value>, key: &str, path: &str, bound: Bound) {
        if let Some(value) = map.get(key) {
            self.number(value, &field(path, key), bound);
        }
    }

    fn optional_bool(&mut self, map: &Map<String, Value>, key: &str, path: &str) {
        if let Some(value) = map.get(key) {
            if !value.is_boolean() {
                self.push(&field(path, key), "expected boolean", Some(kind_of(value)));
            }
        }
    }

    fn one_of(&mut self, value: &Value, path: &str, allowed: &[&str]) {
        match value.as_str() {
            Some(s) if allowed.contains(&s) => {}
            Some(s) => self.push(path, &format!("expected one of [{}]", allowed.join(", ")), Some(format!("\"{}\"", s))),
            None => self.push(path, &format!("expected one of [{}]", allowed.join(", ")), Some(kind_of(value))),
        }
    }

    fn required_enum(&mut self, map: &Map<String, Value>, key: &str, path: &str, allowed: &[&str]) {
        if let Some(value) = self.required(map, key, path) {
            self.one_of(value, &field(path, key), allowed);
        }
    }

    fn optional_enum(&mut self, map: &Map<String, Value>, key: &str, path: &str, allowed: &[&str]) {
        if let Some(value) = map.get(key) {
            self.one_of(value, &field(path, key), allowed);
        }
    }

    fn optional_free_object(&mut self, map: &Map<String, Value>, key: &str, path: &str) {
        if let Some(value) = map.get(key) {
            self.object(value, &field(path, key));
        }
    }

    fn string_map(&mut self, map: &Map<String, Value>, key: &str, path: &str) {
        let path = field(path, key);
        if let Some(entries) = map.get(key).and_then(|v| self.object(v, &path)) {
            for (name, value) in entries {
                self.string(value, &field(&path, name));
            }
        }
    }

    fn number_map(&mut self, map: &Map<String, Value>, key: &str, path: &str) {
        let path = field(path, key);
        if let Some(entries) = map.get(key).and_then(|v| self.object(v, &path)) {
            for (name, value) in entries {
                self.number(value, &field(&path, name), Bound::Any);
            }
        }
    }

    fn quad(&mut self, map: &Map<String, Value>, key: &str, path: &str) {
        let Some(value) = map.get(key) else { return };
        let path = field(path, key);
        match value.as_array() {
            Some(items) if items.len() == 4 => {
                for (index, item) in items.iter().enumerate() {
                    self.number(item, &format!("{}[{}]", path, index), Bound::Any);
                }
            }
            Some(items) => self.push(&path, "expected exactly 4 numbers", Some(format!("{} items", items.len()))),
            None => self.push(&path, "expected exactly 4 numbers", Some(kind_of(value))),
        }
    }

    fn non_negative_integer(&mut self, map: &Map<String, Value>, key: &str, path: &str, min: u64) {
        if let Some(value) = map.get(key) {
            match value.as_u64() {
                Some(n) if n >= min => {}
                _ => self.push(&field(path, key), &format!("expected integer >= {}", min), Some(value.to_string())),
            }
        }
    }

    fn array<'a>(&mut self, map: &'a Map<String, Value>, key: &str, path: &str) -> Option<&'a Vec<Value>> {
        let value = map.get(key)?;
        match value.as_array() {
            Some(items) => Some(items),
            None => {
                self.push(&field(path, key), "expected array", Some(kind_of(value)));
                None
            }
        }
    }

    // --- Document ---

    fn document(&mut self, value: &Value) {
        let Some(map) = self.object(value, "$") else { return };
        let path = "$";

        self.required_string(map, "id", path);
        self.optional_string(map, "version", path);
        self.created_at(map, path);
        self.optional_string(map, "locale", path);
        self.optional_string(map, "title", path);
        self.optional_string(map, "description", path);

        if let Some(tree) = self.required(map, "layoutTree", path) {
            self.node(tree, &field(path, "layoutTree"), false);
        }
        if let Some(assets) = self.array(map, "assets", path) {
            for (index, asset) in assets.iter().enumerate() {
                self.asset(asset, &format!("$.assets[{}]", index));
            }
        }
        if let Some(sources) = self.array(map, "dataSources", path) {
            for (index, source) in sources.iter().enumerate() {
                self.data_source(source, &format!("$.dataSources[{}]", index));
            }
        }
        if let Some(theme) = map.get("theme") {
            self.theme(theme, "$.theme");
        }
        if let Some(metadata) = map.get("metadata") {
            self.metadata(metadata, "$.metadata");
        }
    }

    fn created_at(&mut self, map: &Map<String, Value>, path: &str) {
        let Some(value) = map.get("createdAt") else { return };
        let path = field(path, "createdAt");
        let accepted = match value {
            Value::String(text) => timestamp::parse(text).is_some(),
            Value::Number(n) => n.as_i64().and_then(timestamp::from_millis).is_some(),
            _ => false,
        };
        if !accepted {
            self.push(&path, "expected ISO-8601 timestamp or epoch milliseconds", Some(value.to_string()));
        }
    }

    fn asset(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else { return };
        self.required_string(map, "id", path);
        self.required_enum(map, "kind", path, ASSET_KINDS);
        self.required_string(map, "uri", path);
        self.optional_free_object(map, "metadata", path);
    }

    fn data_source(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else { return };
        self.required_string(map, "id", path);
        self.required_string(map, "name", path);
        self.required_enum(map, "type", path, DATA_SOURCE_TYPES);
        if let Some(config) = self.required(map, "config", path) {
            self.object(config, &field(path, "config"));
        }
    }

    fn theme(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else { return };
        self.optional_string(map, "id", path);
        self.optional_string(map, "name", path);

        let Some(tokens) = map.get("tokens") else { return };
        let path = field(path, "tokens");
        let Some(tokens) = self.object(tokens, &path) else { return };
        self.string_map(tokens, "colors", &path);
        self.number_map(tokens, "radii", &path);
        self.number_map(tokens, "spacing", &path);

        let Some(typography) = tokens.get("typography") else { return };
        let path = field(&path, "typography");
        if let Some(typography) = self.object(typography, &path) {
            self.string_map(typography, "fontFamilies", &path);
            self.number_map(typography, "fontSizes", &path);
        }
    }

    fn metadata(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else { return };
        self.optional_enum(map, "source", path, DOCUMENT_SOURCES);
        self.optional_string(map, "author", path);
        if let Some(tags) = self.array(map, "tags", path) {
            for (index, tag) in tags.iter().enumerate() {
                self.string(tag, &format!("{}.tags[{}]", path, index));
            }
        }
        self.non_negative_integer(map, "revision", path, 1);
    }

    // --- Layout nodes ---

    /// `partial` relaxes the required `id`/`type` for patch payloads.
    fn node(&mut self, value: &Value, path: &str, partial: bool) {
        let Some(map) = self.object(value, path) else { return };

        if partial {
            self.optional_string(map, "id", path);
            self.optional_enum(map, "type", path, COMPONENT_TYPES);
        } else {
            self.required_string(map, "id", path);
            self.required_enum(map, "type", path, COMPONENT_TYPES);
        }
        for key in ["name", "role", "text", "placeholder"] {
            self.optional_string(map, key, path);
        }

        if let Some(media) = map.get("media") {
            let media_path = field(path, "media");
            if let Some(media) = self.object(media, &media_path) {
                if media.contains_key("uri") || !media.contains_key("url") {
                    self.required_string(media, "uri", &media_path);
                } else {
                    self.optional_string(media, "url", &media_path);
                }
                if media.contains_key("uri") && media.contains_key("url") {
                    self.push(&field(&media_path, "url"), "conflicts with uri", None);
                }
                self.optional_string(media, "description", &media_path);
            }
        }

        self.string_map(map, "bindings", path);
        if let Some(constraints) = map.get("constraints") {
            self.constraints(constraints, &field(path, "constraints"));
        }
        if let Some(layout) = map.get("layout") {
            self.layout(layout, &field(path, "layout"));
        }
        if let Some(style) = map.get("style") {
            self.style(style, &field(path, "style"));
        }
        if let Some(state) = map.get("state") {
            let state_path = field(path, "state");
            if let Some(state) = self.object(state, &state_path) {
                self.optional_string(state, "name", &state_path);
                self.string_map(state, "bindings", &state_path);
            }
        }
        if let Some(events) = self.array(map, "events", path) {
            for (index, event) in events.iter().enumerate() {
                self.event(event, &format!("{}.events[{}]", path, index));
            }
        }
        if let Some(children) = self.array(map, "children", path) {
            for (index, child) in children.iter().enumerate() {
                self.node(child, &format!("{}.children[{}]", path, index), false);
            }
        }
    }

    fn constraints(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else { return };
        self.optional_number(map, "minWidth", path, Bound::NonNegative);
        self.optional_number(map, "maxWidth", path, Bound::Positive);
        self.optional_number(map, "minHeight", path, Bound::NonNegative);
        self.optional_number(map, "maxHeight", path, Bound::Positive);
        self.optional_enum(map, "horizontalAlign", path, ALIGNMENTS);
        self.optional_enum(map, "verticalAlign", path, ALIGNMENTS);
        self.optional_number(map, "grow", path, Bound::Unit);
        self.optional_number(map, "shrink", path, Bound::Unit);
        self.optional_number(map, "order", path, Bound::Any);
    }

    fn layout(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else { return };
        self.optional_enum(map, "position", path, &["relative", "absolute"]);
        for key in ["x", "y", "width", "height", "gap"] {
            self.optional_number(map, key, path, Bound::Any);
        }
        self.quad(map, "padding", path);
        self.quad(map, "margin", path);
        self.optional_number(map, "columns", path, Bound::Positive);
        self.optional_number(map, "rows", path, Bound::Positive);
        self.optional_enum(map, "direction", path, &["row", "column"]);
        self.optional_bool(map, "wrap", path);
    }

    fn style(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else { return };
        self.optional_string(map, "variant", path);
        self.optional_enum(map, "emphasis", path, EMPHASES);
        self.optional_enum(map, "tone", path, TONES);
        self.optional_string(map, "background", path);
        self.optional_string(map, "foreground", path);
        self.optional_string(map, "shadow", path);

        if let Some(border) = map.get("border") {
            let border_path = field(path, "border");
            if let Some(border) = self.object(border, &border_path) {
                self.optional_string(border, "color", &border_path);
                self.optional_number(border, "radius", &border_path, Bound::Any);
                self.optional_number(border, "width", &border_path, Bound::Any);
                self.optional_enum(border, "style", &border_path, BORDER_STYLES);
            }
        }
        if let Some(typography) = map.get("typography") {
            let typo_path = field(path, "typography");
            if let Some(typography) = self.object(typography, &typo_path) {
                self.optional_string(typography, "fontFamily", &typo_path);
                self.optional_number(typography, "fontSize", &typo_path, Bound::Any);
                self.optional_string(typography, "fontWeight", &typo_path);
                self.optional_number(typography, "letterSpacing", &typo_path, Bound::Any);
                self.optional_number(typography, "lineHeight", &typo_path, Bound::Any);
                self.optional_enum(typography, "textAlign", &typo_path, TEXT_ALIGNS);
            }
        }
    }

    fn event(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else { return };
        self.required_string(map, "id", path);
        self.required_enum(map, "trigger", path, TRIGGERS);
        self.optional_string(map, "description", path);

        let Some(action) = self.required(map, "action", path) else { return };
        let action_path = field(path, "action");
        if let Some(action) = self.object(action, &action_path) {
            self.required_enum(action, "type", &action_path, ACTIONS);
            self.optional_free_object(action, "payload", &action_path);
        }
    }

    // --- Patches ---

    fn patch(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else { return };
        self.required_string(map, "targetId", path);
        self.required_enum(map, "op", path, PATCH_OPS);
        if let Some(payload) = map.get("payload") {
            self.node(payload, &field(path, "payload"), true);
        }
        self.non_negative_integer(map, "position", path, 0);
    }
}

fn field(path: &str, key: &str) -> String {
    format!("{}.{}", path, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "id": "doc",
            "layoutTree": { "id": "root", "type": "page" }
        })
    }

    #[test]
    fn test_minimal_document_gets_defaults() {
        let ui = validate(&minimal()).unwrap();
        assert_eq!(ui.version, "0.1.0");
        assert_eq!(ui.locale, "zh-CN");
        assert_eq!(ui.metadata.revision, 1);
        assert!(ui.metadata.tags.is_empty());
        assert!(ui.layout_tree.children.is_empty());
        assert!(ui.layout_tree.events.is_empty());
        assert_eq!(ui.theme, crate::schema::Theme::baseline());
    }

    #[test]
    fn test_every_violation_is_reported() {
        let raw = json!({
            "id": 7,
            "layoutTree": {
                "id": "root",
                "type": "page",
                "layout": { "padding": [1, 2, 3] },
                "children": [
                    { "id": "a", "type": "carousel" },
                    { "type": "button", "style": { "emphasis": "loud" } }
                ]
            },
            "metadata": { "revision": 0 }
        });

        let err = validate(&raw).unwrap_err();
        let paths = err.paths();
        assert!(paths.contains(&"$.id"));
        assert!(paths.contains(&"$.layoutTree.layout.padding"));
        assert!(paths.contains(&"$.layoutTree.children[0].type"));
        assert!(paths.contains(&"$.layoutTree.children[1].id"));
        assert!(paths.contains(&"$.layoutTree.children[1].style.emphasis"));
        assert!(paths.contains(&"$.metadata.revision"));
        assert_eq!(err.violations.len(), 6);
    }

    #[test]
    fn test_constraint_bounds() {
        let raw = json!({
            "id": "root",
            "type": "stack",
            "constraints": { "minWidth": -1, "maxWidth": 0, "grow": 1.5, "shrink": 0.5 }
        });
        let err = validate_node(&raw).unwrap_err();
        assert_eq!(
            err.paths(),
            ["$.constraints.minWidth", "$.constraints.maxWidth", "$.constraints.grow"]
        );
    }

    #[test]
    fn test_created_at_forms() {
        let mut raw = minimal();
        raw["createdAt"] = json!("2024-05-01T10:00:00Z");
        assert!(validate(&raw).is_ok());

        raw["createdAt"] = json!(1714557600000_i64);
        let ui = validate(&raw).unwrap();
        assert_eq!(timestamp::format(&ui.created_at), "2024-05-01T10:00:00.000Z");

        raw["createdAt"] = json!("not a date");
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.paths(), ["$.createdAt"]);
    }

    #[test]
    fn test_duplicate_ids_warn_unless_strict() {
        let raw = json!({
            "id": "doc",
            "layoutTree": {
                "id": "root",
                "type": "page",
                "children": [{ "id": "x", "type": "text" }, { "id": "x", "type": "text" }]
            }
        });

        assert!(Validator::new().validate(&raw).is_ok());

        let report = Validator::new().check(&raw);
        assert!(report.valid);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].severity, ViolationSeverity::Warning);

        let err = Validator::with_policy(ValidationPolicy::Strict).validate(&raw).unwrap_err();
        assert_eq!(err.paths(), ["$.layoutTree.children[1].id"]);
    }

    #[test]
    fn test_patch_payload_is_partial() {
        let patch = validate_patch(&json!({
            "targetId": "cta",
            "op": "update",
            "payload": { "text": "Go" }
        }))
        .unwrap();
        assert_eq!(patch.payload.unwrap().text.as_deref(), Some("Go"));

        let err = validate_patches(&json!([
            { "targetId": "a", "op": "update" },
            { "targetId": "b", "op": "explode", "position": -1 }
        ]))
        .unwrap_err();
        assert_eq!(err.paths(), ["$[1].op", "$[1].position"]);
    }

    #[test]
    fn test_media_accepts_url_alias() {
        let node = validate_node(&json!({
            "id": "img",
            "type": "image",
            "media": { "url": "https://example.com/a.png" }
        }))
        .unwrap();
        assert_eq!(node.media.unwrap().uri, "https://example.com/a.png");
    }

    #[test]
    fn test_media_with_uri_and_url_is_reported_with_other_violations() {
        let mut raw = minimal();
        raw["layoutTree"]["text"] = json!(5);
        raw["layoutTree"]["media"] = json!({ "uri": "a.png", "url": "b.png" });

        let err = validate(&raw).unwrap_err();
        assert_eq!(err.paths(), ["$.layoutTree.text", "$.layoutTree.media.url"]);
    }
}

//! UI-IR Schema - Typed Document Contracts
//!
//! Every default lives next to the field it fills. Free-form maps are
//! `BTreeMap` so serialization order never depends on insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_VERSION: &str = "0.1.0";
pub const DEFAULT_LOCALE: &str = "zh-CN";
pub const DEFAULT_TITLE: &str = "Generated Prototype";
pub const DEFAULT_THEME_ID: &str = "default";
pub const DEFAULT_THEME_NAME: &str = "Default Theme";

pub type StringMap = BTreeMap<String, String>;
pub type NumberMap = BTreeMap<String, f64>;
pub type JsonObject = serde_json::Map<String, Value>;

/// Closed set of component kinds a layout node can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentType {
    Page,
    Section,
    Stack,
    Grid,
    Text,
    Button,
    Input,
    Image,
    Card,
    Table,
    List,
    ListItem,
    Form,
    Badge,
    Nav,
    Modal,
    Hero,
    Chart,
}

impl ComponentType {
    pub const ALL: [ComponentType; 18] = [
        ComponentType::Page,
        ComponentType::Section,
        ComponentType::Stack,
        ComponentType::Grid,
        ComponentType::Text,
        ComponentType::Button,
        ComponentType::Input,
        ComponentType::Image,
        ComponentType::Card,
        ComponentType::Table,
        ComponentType::List,
        ComponentType::ListItem,
        ComponentType::Form,
        ComponentType::Badge,
        ComponentType::Nav,
        ComponentType::Modal,
        ComponentType::Hero,
        ComponentType::Chart,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Page => "page",
            ComponentType::Section => "section",
            ComponentType::Stack => "stack",
            ComponentType::Grid => "grid",
            ComponentType::Text => "text",
            ComponentType::Button => "button",
            ComponentType::Input => "input",
            ComponentType::Image => "image",
            ComponentType::Card => "card",
            ComponentType::Table => "table",
            ComponentType::List => "list",
            ComponentType::ListItem => "listItem",
            ComponentType::Form => "form",
            ComponentType::Badge => "badge",
            ComponentType::Nav => "nav",
            ComponentType::Modal => "modal",
            ComponentType::Hero => "hero",
            ComponentType::Chart => "chart",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(alias = "url")]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Start,
    Center,
    End,
    Stretch,
}

/// Sizing and alignment hints. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConstraints {
    /// Must be >= 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    /// Must be > 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    /// Must be >= 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
    /// Must be > 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<Align>,
    /// Within [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grow: Option<f64>,
    /// Within [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shrink: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Row,
    Column,
}

/// Geometry and flow. Defaults to an empty layout (all fields unset).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Top, right, bottom, left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<[f64; 4]>,
    /// Top, right, bottom, left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<[f64; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    /// Must be > 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<f64>,
    /// Must be > 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Default,
    Primary,
    Secondary,
    Danger,
    Ghost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Success,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    Solid,
    Dashed,
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Border {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<BorderStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

/// Visual treatment. Defaults to an empty style (all fields unset).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Emphasis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: StringMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTrigger {
    #[serde(rename = "onClick")]
    OnClick,
    #[serde(rename = "onSubmit")]
    OnSubmit,
    #[serde(rename = "onChange")]
    OnChange,
    #[serde(rename = "onMount")]
    OnMount,
    #[serde(rename = "onHover")]
    OnHover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    Navigate,
    Emit,
    MutateState,
    OpenModal,
    CloseModal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAction {
    #[serde(rename = "type")]
    pub kind: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<JsonObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEvent {
    pub id: String,
    pub trigger: EventTrigger,
    pub action: EventAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NodeEvent {
    /// The `href` of a navigate action, if this event carries one.
    pub fn navigation_target(&self) -> Option<&str> {
        if self.action.kind != ActionType::Navigate {
            return None;
        }
        self.action.payload.as_ref()?.get("href")?.as_str()
    }
}

/// One node of the component tree. Owns its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: StringMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<NodeConstraints>,
    #[serde(default)]
    pub layout: NodeLayout,
    #[serde(default)]
    pub style: NodeStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<NodeState>,
    #[serde(default)]
    pub events: Vec<NodeEvent>,
    #[serde(default)]
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>, kind: ComponentType) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            role: None,
            text: None,
            placeholder: None,
            media: None,
            bindings: BTreeMap::new(),
            constraints: None,
            layout: NodeLayout::default(),
            style: NodeStyle::default(),
            state: None,
            events: vec![],
            children: vec![],
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: LayoutNode) -> Self {
        self.children.push(child);
        self
    }

    /// First node in pre-order whose id matches.
    pub fn find(&self, id: &str) -> Option<&LayoutNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// All nodes in pre-order, starting with `self`.
    pub fn flatten(&self) -> Vec<&LayoutNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(LayoutNode::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyTokens {
    #[serde(default)]
    pub font_families: StringMap,
    #[serde(default)]
    pub font_sizes: NumberMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeTokens {
    #[serde(default)]
    pub colors: StringMap,
    #[serde(default)]
    pub radii: NumberMap,
    #[serde(default)]
    pub spacing: NumberMap,
    #[serde(default)]
    pub typography: TypographyTokens,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_theme_id")]
    pub id: String,
    #[serde(default = "default_theme_name")]
    pub name: String,
    #[serde(default)]
    pub tokens: ThemeTokens,
}

fn default_theme_id() -> String { DEFAULT_THEME_ID.to_string() }
fn default_theme_name() -> String { DEFAULT_THEME_NAME.to_string() }

impl Theme {
    /// Token set used when a document carries no theme at all.
    pub fn baseline() -> Self {
        Self {
            id: default_theme_id(),
            name: default_theme_name(),
            tokens: ThemeTokens {
                colors: strings(&[
                    ("primary", "#3b82f6"),
                    ("background", "#f8fafc"),
                    ("foreground", "#0f172a"),
                ]),
                radii: numbers(&[("sm", 4.0), ("md", 8.0), ("lg", 16.0)]),
                spacing: numbers(&[("sm", 8.0), ("md", 16.0), ("lg", 24.0)]),
                typography: TypographyTokens {
                    font_families: strings(&[("body", "Inter, sans-serif")]),
                    font_sizes: numbers(&[("sm", 14.0), ("md", 16.0), ("lg", 20.0)]),
                },
            },
        }
    }
}

pub(crate) fn strings(pairs: &[(&str, &str)]) -> StringMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub(crate) fn numbers(pairs: &[(&str, f64)]) -> NumberMap {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

impl Default for Theme {
    fn default() -> Self {
        Self::baseline()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Audio,
    Transcript,
    Sketch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub kind: AssetKind,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonObject>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceType {
    Static,
    Rest,
    Graphql,
    Supabase,
    Airtable,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DataSourceType,
    pub config: JsonObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    Sketch,
    Voice,
    #[default]
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub source: DocumentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Starts at 1; bumped by callers, never by this crate.
    #[serde(default = "default_revision")]
    pub revision: u64,
}

fn default_revision() -> u64 { 1 }

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            source: DocumentSource::Mixed,
            author: None,
            tags: vec![],
            revision: default_revision(),
        }
    }
}

/// Document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiIr {
    pub id: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(with = "timestamp", default = "timestamp::epoch")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub layout_tree: LayoutNode,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

fn default_version() -> String { DEFAULT_VERSION.to_string() }
fn default_locale() -> String { DEFAULT_LOCALE.to_string() }
fn default_title() -> String { DEFAULT_TITLE.to_string() }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Replace,
    Remove,
    Insert,
    Update,
}

impl PatchOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PatchOp::Replace => "replace",
            PatchOp::Remove => "remove",
            PatchOp::Insert => "insert",
            PatchOp::Update => "update",
        }
    }
}

/// Partial layout node carried by a patch. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ComponentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<NodeConstraints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<NodeLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<NodeState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<NodeEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<LayoutNode>>,
}

impl NodePatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }
}

impl From<LayoutNode> for NodePatch {
    fn from(node: LayoutNode) -> Self {
        Self {
            id: Some(node.id),
            kind: Some(node.kind),
            name: node.name,
            role: node.role,
            text: node.text,
            placeholder: node.placeholder,
            media: node.media,
            bindings: Some(node.bindings),
            constraints: node.constraints,
            layout: Some(node.layout),
            style: Some(node.style),
            state: node.state,
            events: Some(node.events),
            children: Some(node.children),
        }
    }
}

/// One structural edit targeting a node by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub target_id: String,
    pub op: PatchOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<NodePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl Patch {
    pub fn update(target_id: impl Into<String>, payload: NodePatch) -> Self {
        Self { target_id: target_id.into(), op: PatchOp::Update, payload: Some(payload), position: None }
    }

    pub fn replace(target_id: impl Into<String>, payload: NodePatch) -> Self {
        Self { target_id: target_id.into(), op: PatchOp::Replace, payload: Some(payload), position: None }
    }

    pub fn insert(target_id: impl Into<String>, child: LayoutNode, position: Option<usize>) -> Self {
        Self { target_id: target_id.into(), op: PatchOp::Insert, payload: Some(child.into()), position }
    }

    pub fn remove(target_id: impl Into<String>) -> Self {
        Self { target_id: target_id.into(), op: PatchOp::Remove, payload: None, position: None }
    }
}

/// `createdAt` wire format: ISO-8601 text out; text or epoch milliseconds in.
/// Values are truncated to millisecond precision and limited to years
/// 0000..=9999 so the text form round-trips.
pub mod timestamp {
    use chrono::{Datelike, DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) or a
    /// bare date (UTC midnight).
    pub fn parse(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        let parsed = if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            parsed.with_timezone(&Utc).trunc_subsecs(3)
        } else if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
            Utc.from_utc_datetime(&naive).trunc_subsecs(3)
        } else {
            let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
            Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?)
        };
        within_four_digit_years(parsed)
    }

    pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(millis).and_then(within_four_digit_years)
    }

    /// Outside 0000..=9999 chrono prints a signed, wider year that RFC 3339
    /// parsing rejects.
    fn within_four_digit_years(value: DateTime<Utc>) -> Option<DateTime<Utc>> {
        (0..=9999).contains(&value.year()).then_some(value)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }

    struct TimestampVisitor;

    impl<'de> Visitor<'de> for TimestampVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an ISO-8601 timestamp or epoch milliseconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            parse(v).ok_or_else(|| E::custom(format!("invalid timestamp: {v}")))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            from_millis(v).ok_or_else(|| E::custom(format!("timestamp out of range: {v}")))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            let millis = i64::try_from(v).map_err(|_| E::custom("timestamp out of range"))?;
            self.visit_i64(millis)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if !v.is_finite() || v.fract() != 0.0 {
                return Err(E::custom(format!("timestamp must be whole milliseconds: {v}")));
            }
            self.visit_i64(v as i64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_type_names_match_wire_format() {
        for kind in ComponentType::ALL {
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, Value::String(kind.as_str().to_string()));
            assert_eq!(ComponentType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ComponentType::parse("carousel"), None);
    }

    #[test]
    fn timestamps_accept_text_and_millis() {
        let a = timestamp::parse("2024-03-01T08:30:00.123456Z").unwrap();
        assert_eq!(timestamp::format(&a), "2024-03-01T08:30:00.123Z");

        let b = timestamp::from_millis(a.timestamp_millis()).unwrap();
        assert_eq!(a, b);

        let date_only = timestamp::parse("2024-03-01").unwrap();
        assert_eq!(timestamp::format(&date_only), "2024-03-01T00:00:00.000Z");

        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn timestamps_outside_four_digit_years_are_rejected() {
        let last = timestamp::from_millis(253_402_300_799_999).unwrap();
        assert_eq!(timestamp::format(&last), "9999-12-31T23:59:59.999Z");
        assert_eq!(timestamp::parse(&timestamp::format(&last)), Some(last));

        assert!(timestamp::from_millis(253_402_300_800_000).is_none());
        assert!(timestamp::from_millis(-62_167_219_200_001).is_none());
        assert!(timestamp::parse("+10000-01-01T00:00:00.000Z").is_none());
        assert!(timestamp::parse("0000-01-01T00:30:00+01:00").is_none());
    }

    #[test]
    fn find_and_flatten_walk_pre_order() {
        let tree = LayoutNode::new("root", ComponentType::Page)
            .with_child(LayoutNode::new("a", ComponentType::Section).with_child(LayoutNode::new("a1", ComponentType::Text)))
            .with_child(LayoutNode::new("b", ComponentType::Card));

        let ids: Vec<_> = tree.flatten().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["root", "a", "a1", "b"]);
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.find("a1").map(|n| n.kind), Some(ComponentType::Text));
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn navigation_target_reads_href() {
        let event: NodeEvent = serde_json::from_value(serde_json::json!({
            "id": "go",
            "trigger": "onClick",
            "action": { "type": "navigate", "payload": { "href": "/app" } }
        }))
        .unwrap();
        assert_eq!(event.navigation_target(), Some("/app"));
    }
}

//! Render Rules - Node Lowering Contracts
//!
//! `RenderTable` maps each component kind to a rule. Kinds without a rule
//! fall through to the universal fallback, so every valid tree renders.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::schema::{ComponentType, Direction, Emphasis, LayoutNode, Tone};

pub const INDENT: &str = "  ";

/// Markup nests inside `return (` of a component body.
const BASE_DEPTH: usize = 2;

/// Lazily rendered markup of a node's children, plus its nesting depth.
pub struct Children<'a> {
    depth: usize,
    render: &'a dyn Fn() -> String,
}

impl Children<'_> {
    pub fn render(&self) -> String {
        (self.render)()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Line break plus indentation for this node, `extra` levels deeper.
    pub fn line(&self, extra: usize) -> String {
        format!("\n{}", INDENT.repeat(BASE_DEPTH + self.depth + extra))
    }
}

pub type RenderRule = fn(&LayoutNode, &Children<'_>) -> String;

/// Rule registry - maps component kinds to render rules
pub struct RenderTable {
    rules: BTreeMap<ComponentType, RenderRule>,
    fallback: RenderRule,
}

impl RenderTable {
    /// A table with no kind-specific rules; everything uses the fallback.
    pub fn empty() -> Self {
        Self { rules: BTreeMap::new(), fallback: render_fallback }
    }

    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.register(ComponentType::Page, render_page);
        table.register(ComponentType::Hero, render_hero);
        table.register(ComponentType::Section, render_section);
        table.register(ComponentType::Stack, render_stack);
        table.register(ComponentType::Grid, render_grid);
        table.register(ComponentType::Text, render_text);
        table.register(ComponentType::Button, render_button);
        table.register(ComponentType::Input, render_input);
        table.register(ComponentType::Image, render_image);
        table.register(ComponentType::Card, render_card);
        table.register(ComponentType::List, render_list);
        table.register(ComponentType::ListItem, render_list_item);
        table.register(ComponentType::Form, render_form);
        table.register(ComponentType::Badge, render_badge);
        table.register(ComponentType::Nav, render_nav);
        table
    }

    pub fn register(&mut self, kind: ComponentType, rule: RenderRule) {
        self.rules.insert(kind, rule);
    }

    pub fn has_rule(&self, kind: ComponentType) -> bool {
        self.rules.contains_key(&kind)
    }

    pub fn rule_for(&self, kind: ComponentType) -> RenderRule {
        self.rules.get(&kind).copied().unwrap_or(self.fallback)
    }

    /// Render a subtree; the root sits at depth 0.
    pub fn render(&self, node: &LayoutNode) -> String {
        self.render_at(node, 0)
    }

    fn render_at(&self, node: &LayoutNode, depth: usize) -> String {
        let rule = self.rule_for(node.kind);
        let render_children = || {
            node.children
                .iter()
                .map(|child| self.render_at(child, depth + 1))
                .collect::<String>()
        };
        rule(node, &Children { depth, render: &render_children })
    }
}

impl Default for RenderTable {
    fn default() -> Self {
        Self::standard()
    }
}

// --- Escaping ---

/// Escape text placed between JSX tags.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted JSX attribute value.
pub fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

// --- Shared building blocks ---

/// Inline `style={{ ... }}` for the few style fields Tailwind classes don't cover.
fn style_attr(node: &LayoutNode) -> String {
    let style = &node.style;
    let mut props: Vec<String> = vec![];
    if let Some(background) = &style.background {
        props.push(format!("background: {}", js_string(background)));
    }
    if let Some(foreground) = &style.foreground {
        props.push(format!("color: {}", js_string(foreground)));
    }
    if let Some(radius) = style.border.as_ref().and_then(|b| b.radius) {
        props.push(format!("borderRadius: {}", radius));
    }
    if let Some(typography) = &style.typography {
        if let Some(size) = typography.font_size {
            props.push(format!("fontSize: {}", size));
        }
        if let Some(weight) = &typography.font_weight {
            props.push(format!("fontWeight: {}", js_string(weight)));
        }
    }
    if props.is_empty() {
        String::new()
    } else {
        format!(" style={{{{ {} }}}}", props.join(", "))
    }
}

fn gap_class(node: &LayoutNode, default: &str) -> String {
    match node.layout.gap {
        Some(gap) => format!("gap-[{}px]", gap),
        None => default.to_string(),
    }
}

/// An element whose body is optional text followed by its children.
fn container(node: &LayoutNode, children: &Children<'_>, tag: &str, class: &str) -> String {
    let mut body = String::new();
    if let Some(text) = &node.text {
        let _ = write!(body, "{}{}", children.line(1), escape_text(text));
    }
    body.push_str(&children.render());
    element(node, children, tag, class, &body)
}

fn element(node: &LayoutNode, children: &Children<'_>, tag: &str, class: &str, body: &str) -> String {
    let open = format!("<{} className=\"{}\"{}>", tag, class, style_attr(node));
    if body.is_empty() {
        format!("{}{}</{}>", children.line(0), open, tag)
    } else {
        format!("{}{}{}{}</{}>", children.line(0), open, body, children.line(0), tag)
    }
}

/// A single-line element holding only text; children are ignored.
fn leaf(node: &LayoutNode, children: &Children<'_>, tag: &str, class: &str, text: &str) -> String {
    format!(
        "{}<{} className=\"{}\"{}>{}</{}>",
        children.line(0),
        tag,
        class,
        style_attr(node),
        escape_text(text),
        tag
    )
}

fn emphasis_classes(emphasis: Option<Emphasis>) -> &'static str {
    match emphasis {
        Some(Emphasis::Secondary) => "px-6 py-3 rounded-lg bg-slate-800 text-white",
        Some(Emphasis::Danger) => "px-6 py-3 rounded-lg bg-red-600 text-white",
        Some(Emphasis::Ghost) => "px-6 py-3 rounded-lg bg-transparent text-slate-900",
        Some(Emphasis::Default) => "px-6 py-3 rounded-lg border border-slate-300 bg-white text-slate-900",
        Some(Emphasis::Primary) | None => "px-6 py-3 rounded-lg bg-blue-600 text-white",
    }
}

fn tone_classes(tone: Option<Tone>) -> &'static str {
    match tone {
        Some(Tone::Success) => "bg-green-100 text-green-800",
        Some(Tone::Warning) => "bg-amber-100 text-amber-800",
        Some(Tone::Error) => "bg-red-100 text-red-800",
        Some(Tone::Info) => "bg-blue-100 text-blue-800",
        Some(Tone::Neutral) | None => "bg-slate-100 text-slate-800",
    }
}

// --- Rules ---

fn render_page(node: &LayoutNode, children: &Children<'_>) -> String {
    element(node, children, "main", "min-h-screen bg-slate-50 text-slate-900", &children.render())
}

fn render_hero(node: &LayoutNode, children: &Children<'_>) -> String {
    let heading = node.text.as_deref().unwrap_or("Welcome");
    let body = format!(
        "{}<h1 className=\"text-4xl font-bold text-slate-900\">{}</h1>{}",
        children.line(1),
        escape_text(heading),
        children.render()
    );
    element(node, children, "section", "flex flex-col items-center gap-6 py-16", &body)
}

fn render_section(node: &LayoutNode, children: &Children<'_>) -> String {
    let columns = column_count(node, 3);
    let class = format!("grid {} md:grid-cols-{}", gap_class(node, "gap-6"), columns);
    container(node, children, "section", &class)
}

fn render_stack(node: &LayoutNode, children: &Children<'_>) -> String {
    let direction = match node.layout.direction {
        Some(Direction::Row) => "flex-row",
        _ => "flex-col",
    };
    let wrap = if node.layout.wrap == Some(true) { " flex-wrap" } else { "" };
    let class = format!("flex {}{} {}", direction, wrap, gap_class(node, "gap-4"));
    container(node, children, "div", &class)
}

fn render_grid(node: &LayoutNode, children: &Children<'_>) -> String {
    let columns = column_count(node, 2);
    let class = format!("grid grid-cols-{} {}", columns, gap_class(node, "gap-4"));
    container(node, children, "div", &class)
}

/// Fractional column counts round up; there is always at least one column.
fn column_count(node: &LayoutNode, default: u32) -> u32 {
    node.layout.columns.map_or(default, |c| c.ceil().max(1.0) as u32)
}

fn render_text(node: &LayoutNode, children: &Children<'_>) -> String {
    leaf(node, children, "p", "text-base text-slate-700", node.text.as_deref().unwrap_or(""))
}

fn render_button(node: &LayoutNode, children: &Children<'_>) -> String {
    let label = node.text.as_deref().unwrap_or("Button");
    let class = emphasis_classes(node.style.emphasis);
    match node.events.iter().find_map(|e| e.navigation_target()) {
        Some(href) => format!(
            "{}<a href=\"{}\" className=\"{}\"{}>{}</a>",
            children.line(0),
            escape_attr(href),
            class,
            style_attr(node),
            escape_text(label)
        ),
        None => format!(
            "{}<button type=\"button\" className=\"{}\"{}>{}</button>",
            children.line(0),
            class,
            style_attr(node),
            escape_text(label)
        ),
    }
}

fn render_input(node: &LayoutNode, children: &Children<'_>) -> String {
    let placeholder = node.placeholder.as_deref().or(node.text.as_deref()).unwrap_or("");
    format!(
        "{}<input className=\"w-full rounded-lg border border-slate-300 px-4 py-2\" placeholder=\"{}\"{} />",
        children.line(0),
        escape_attr(placeholder),
        style_attr(node)
    )
}

fn render_image(node: &LayoutNode, children: &Children<'_>) -> String {
    let src = node.media.as_ref().map(|m| m.uri.as_str()).unwrap_or("");
    let alt = node
        .media
        .as_ref()
        .and_then(|m| m.description.as_deref())
        .or(node.name.as_deref())
        .unwrap_or("");
    format!(
        "{}<img className=\"max-w-full rounded-lg\" src=\"{}\" alt=\"{}\"{} />",
        children.line(0),
        escape_attr(src),
        escape_attr(alt),
        style_attr(node)
    )
}

fn render_card(node: &LayoutNode, children: &Children<'_>) -> String {
    container(node, children, "div", "rounded-xl border border-slate-200 bg-white p-6 shadow-sm")
}

fn render_list(node: &LayoutNode, children: &Children<'_>) -> String {
    container(node, children, "ul", "flex flex-col gap-2")
}

fn render_list_item(node: &LayoutNode, children: &Children<'_>) -> String {
    container(node, children, "li", "text-slate-700")
}

fn render_form(node: &LayoutNode, children: &Children<'_>) -> String {
    container(node, children, "form", "flex flex-col gap-4")
}

fn render_badge(node: &LayoutNode, children: &Children<'_>) -> String {
    let class = format!("inline-flex rounded-full px-3 py-1 text-xs {}", tone_classes(node.style.tone));
    leaf(node, children, "span", &class, node.text.as_deref().unwrap_or(""))
}

fn render_nav(node: &LayoutNode, children: &Children<'_>) -> String {
    container(node, children, "nav", "flex items-center gap-6")
}

/// Emits the node's text and children for any kind without its own rule.
fn render_fallback(node: &LayoutNode, children: &Children<'_>) -> String {
    let mut body = String::new();
    if let Some(text) = &node.text {
        let _ = write!(body, "{}{}", children.line(1), escape_text(text));
    }
    body.push_str(&children.render());
    let open = format!("<div data-node-type=\"{}\"{}>", node.kind.as_str(), style_attr(node));
    if body.is_empty() {
        format!("{}{}</div>", children.line(0), open)
    } else {
        format!("{}{}{}{}</div>", children.line(0), open, body, children.line(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ActionType, EventAction, EventTrigger, NodeEvent};

    #[test]
    fn test_unmapped_kinds_use_fallback() {
        let table = RenderTable::standard();
        for kind in [ComponentType::Table, ComponentType::Modal, ComponentType::Chart] {
            assert!(!table.has_rule(kind));
        }

        let chart = LayoutNode::new("c", ComponentType::Chart)
            .with_text("Revenue")
            .with_child(LayoutNode::new("t", ComponentType::Text).with_text("Q1"));
        let out = table.render(&chart);
        assert!(out.contains("<div data-node-type=\"chart\">"));
        assert!(out.contains("Revenue"));
        assert!(out.contains("Q1"));
    }

    #[test]
    fn test_empty_table_renders_everything_with_fallback() {
        let table = RenderTable::empty();
        let tree = LayoutNode::new("root", ComponentType::Page)
            .with_child(LayoutNode::new("b", ComponentType::Button).with_text("Go"));
        let out = table.render(&tree);
        assert!(out.contains("data-node-type=\"page\""));
        assert!(out.contains("data-node-type=\"button\""));
        assert!(out.contains("Go"));
    }

    #[test]
    fn test_button_ignores_children() {
        let button = LayoutNode::new("b", ComponentType::Button)
            .with_text("Buy")
            .with_child(LayoutNode::new("hidden", ComponentType::Text).with_text("secret"));
        let out = RenderTable::standard().render(&button);
        assert!(out.contains(">Buy</button>"));
        assert!(!out.contains("secret"));
    }

    #[test]
    fn test_navigate_button_renders_link() {
        let mut button = LayoutNode::new("b", ComponentType::Button).with_text("Open");
        let mut payload = serde_json::Map::new();
        payload.insert("href".into(), "/app".into());
        button.events.push(NodeEvent {
            id: "go".into(),
            trigger: EventTrigger::OnClick,
            action: EventAction { kind: ActionType::Navigate, payload: Some(payload) },
            description: None,
        });
        let out = RenderTable::standard().render(&button);
        assert!(out.contains("<a href=\"/app\""));
    }

    #[test]
    fn test_text_is_escaped() {
        let node = LayoutNode::new("t", ComponentType::Text).with_text("a < b {x}");
        let out = RenderTable::standard().render(&node);
        assert!(out.contains("a &lt; b &#123;x&#125;"));
    }

    #[test]
    fn test_nesting_indents_children() {
        let tree = LayoutNode::new("root", ComponentType::Page)
            .with_child(LayoutNode::new("t", ComponentType::Text).with_text("hi"));
        let out = RenderTable::standard().render(&tree);
        assert_eq!(
            out,
            "\n    <main className=\"min-h-screen bg-slate-50 text-slate-900\">\n      <p className=\"text-base text-slate-700\">hi</p>\n    </main>"
        );
    }

    #[test]
    fn test_fractional_columns_round_up() {
        let table = RenderTable::standard();
        let mut grid = LayoutNode::new("g", ComponentType::Grid);

        grid.layout.columns = Some(0.5);
        assert!(table.render(&grid).contains("grid-cols-1 "));

        grid.layout.columns = Some(2.2);
        assert!(table.render(&grid).contains("grid-cols-3 "));

        let mut section = LayoutNode::new("s", ComponentType::Section);
        section.layout.columns = Some(0.25);
        assert!(table.render(&section).contains("md:grid-cols-1\""));
    }

    #[test]
    fn test_custom_rule_overrides_fallback() {
        fn chart(node: &LayoutNode, children: &Children<'_>) -> String {
            format!("{}<canvas id=\"{}\" />", children.line(0), node.id)
        }
        let mut table = RenderTable::standard();
        table.register(ComponentType::Chart, chart);
        let out = table.render(&LayoutNode::new("sales", ComponentType::Chart));
        assert!(out.contains("<canvas id=\"sales\" />"));
    }
}

//! Built-in demo document: a landing page with a hero, a call-to-action
//! button and three feature cards.

use serde_json::json;

use crate::schema::{
    numbers, strings, timestamp, ActionType, Asset, AssetKind, ComponentType, DataSource,
    DataSourceType, Direction, DocumentMetadata, DocumentSource, Emphasis, EventAction,
    EventTrigger, LayoutNode, NodeEvent, NodeLayout, NodeStyle, TextAlign, Theme, ThemeTokens,
    Typography, TypographyTokens, UiIr,
};

pub fn sample_layout() -> LayoutNode {
    let mut cta = LayoutNode::new("cta", ComponentType::Button).with_text("开始生成");
    cta.style.emphasis = Some(Emphasis::Primary);
    cta.events.push(NodeEvent {
        id: "cta-click".to_string(),
        trigger: EventTrigger::OnClick,
        action: EventAction {
            kind: ActionType::Navigate,
            payload: json!({ "href": "/app" }).as_object().cloned(),
        },
        description: None,
    });

    let mut hero = LayoutNode::new("hero", ComponentType::Hero)
        .with_text("从草图到可运行原型")
        .with_child(cta);
    hero.style.typography = Some(Typography {
        font_size: Some(36.0),
        font_weight: Some("700".to_string()),
        text_align: Some(TextAlign::Center),
        ..Typography::default()
    });

    let mut features = LayoutNode::new("features", ComponentType::Section);
    features.layout = NodeLayout {
        direction: Some(Direction::Row),
        gap: Some(16.0),
        ..NodeLayout::default()
    };
    for index in 1..=3 {
        let mut card = LayoutNode::new(format!("feature-{}", index), ComponentType::Card)
            .with_text("自动解析 UI 组件并生成代码");
        card.style = NodeStyle {
            background: Some("white".to_string()),
            shadow: Some("md".to_string()),
            ..NodeStyle::default()
        };
        features.children.push(card);
    }

    let mut root = LayoutNode::new("root", ComponentType::Page).with_child(hero).with_child(features);
    root.name = Some("LandingPage".to_string());
    root.layout = NodeLayout {
        direction: Some(Direction::Column),
        gap: Some(24.0),
        padding: Some([32.0, 32.0, 32.0, 32.0]),
        ..NodeLayout::default()
    };
    root
}

pub fn sample_document() -> UiIr {
    UiIr {
        id: "demo-project".to_string(),
        version: "0.1.0".to_string(),
        created_at: timestamp::from_millis(1_704_067_200_000).unwrap_or_else(timestamp::epoch),
        locale: "zh-CN".to_string(),
        title: "Prototype Demo".to_string(),
        description: Some("从草图和语音描述生成的演示页面".to_string()),
        layout_tree: sample_layout(),
        assets: vec![
            Asset {
                id: "asset-sketch-1".to_string(),
                kind: AssetKind::Sketch,
                uri: "https://example.com/sketch.png".to_string(),
                metadata: None,
            },
            Asset {
                id: "asset-transcript-1".to_string(),
                kind: AssetKind::Transcript,
                uri: "https://example.com/transcript.txt".to_string(),
                metadata: json!({ "text": "标题写在 Hero 区域，添加一个 CTA 按钮以及三个特性卡片" })
                    .as_object()
                    .cloned(),
            },
        ],
        data_sources: vec![DataSource {
            id: "static-content".to_string(),
            name: "Static content".to_string(),
            kind: DataSourceType::Static,
            config: serde_json::Map::new(),
            sample: Some(json!({
                "features": [
                    { "title": "草图解析", "description": "自动检测按钮、输入框、表格等组件" },
                    { "title": "语音理解", "description": "从语音描述中抽取主题与交互需求" }
                ]
            })),
        }],
        theme: Theme {
            id: "default".to_string(),
            name: "Demo Theme".to_string(),
            tokens: ThemeTokens {
                colors: strings(&[("primary", "#3b82f6"), ("secondary", "#1e293b"), ("accent", "#f97316")]),
                radii: numbers(&[("sm", 4.0), ("md", 8.0), ("lg", 16.0)]),
                spacing: numbers(&[("sm", 8.0), ("md", 16.0), ("lg", 24.0)]),
                typography: TypographyTokens {
                    font_families: strings(&[("body", "Inter, sans-serif"), ("heading", "DM Sans, sans-serif")]),
                    font_sizes: numbers(&[("sm", 14.0), ("md", 16.0), ("lg", 20.0), ("xl", 32.0)]),
                },
            },
        },
        metadata: DocumentMetadata {
            source: DocumentSource::Mixed,
            author: None,
            tags: vec!["demo".to_string(), "landing".to_string()],
            revision: 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_passes_validation() {
        let raw = serde_json::to_value(sample_document()).unwrap();
        let validated = crate::validation::validate(&raw).unwrap();
        assert_eq!(validated, sample_document());
        assert_eq!(validated.layout_tree.node_count(), 7);
    }
}

//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use serde_json::json;
use uiir_core::{
    apply_patch, apply_patches, codec, generate, generate_target, hashing::canonical_json,
    sample::sample_document, validate, validate_patch, CodegenError, ComponentType, Framework,
    GenerateOptions, LayoutNode, NodePatch, Patch, PatchError, PatchOp, UiIr, ValidationPolicy,
    Validator,
};

fn cta_text(ui: &UiIr) -> Option<String> {
    ui.layout_tree.find("cta").and_then(|node| node.text.clone())
}

#[test]
fn invariant_valid_document_round_trips_through_validation() {
    let sample = sample_document();
    let raw = serde_json::to_value(&sample).unwrap();

    let validated = validate(&raw).unwrap();
    assert_eq!(validated, sample);

    let text = codec::serialize(&validated).unwrap();
    assert_eq!(codec::deserialize(&text).unwrap(), sample);
}

#[test]
fn invariant_validation_reports_every_violation() {
    let raw = json!({
        "id": "broken",
        "layoutTree": {
            "id": "root",
            "type": "page",
            "children": [
                { "id": "a", "type": "carousel" },
                { "type": "text" }
            ]
        },
        "theme": { "id": "t", "name": "T", "tokens": { "colors": { "primary": 3 } } }
    });

    let err = validate(&raw).unwrap_err();
    let paths = err.paths();
    assert!(paths.contains(&"$.layoutTree.children[0].type"));
    assert!(paths.contains(&"$.layoutTree.children[1].id"));
    assert!(paths.contains(&"$.theme.tokens.colors.primary"));
}

#[test]
fn invariant_unknown_target_is_a_no_op() {
    let tree = sample_document().layout_tree;
    let patch = Patch::update("missing", NodePatch::text("ignored"));

    let patched = apply_patch(&tree, &patch).unwrap();
    assert_eq!(canonical_json(&patched).unwrap(), canonical_json(&tree).unwrap());
}

#[test]
fn invariant_update_edits_copy_not_original() {
    let original = sample_document();
    let patched = original
        .patched(&[Patch::update("cta", NodePatch::text("立即体验"))])
        .unwrap();

    assert_eq!(cta_text(&patched).as_deref(), Some("立即体验"));
    assert_eq!(cta_text(&original).as_deref(), Some("开始生成"));
    assert_eq!(original, sample_document());
}

#[test]
fn invariant_disjoint_updates_commute() {
    let tree = sample_document().layout_tree;
    let cta = Patch::update("cta", NodePatch::text("立即体验"));
    let hero = Patch::update("hero", NodePatch::text("新标题"));

    let forward = apply_patches(&tree, &[cta.clone(), hero.clone()]).unwrap();
    let backward = apply_patches(&tree, &[hero, cta]).unwrap();
    assert_eq!(forward, backward);
    assert_eq!(forward.find("hero").and_then(|n| n.text.as_deref()), Some("新标题"));
}

#[test]
fn invariant_root_removal_is_rejected() {
    let tree = sample_document().layout_tree;
    let err = apply_patch(&tree, &Patch::remove("root")).unwrap_err();

    assert_eq!(err, PatchError::InvalidRootRemoval { target_id: "root".to_string() });
    assert_eq!(tree, sample_document().layout_tree);
}

#[test]
fn invariant_insert_requires_payload() {
    let tree = sample_document().layout_tree;
    let patch = Patch { target_id: "features".to_string(), op: PatchOp::Insert, payload: None, position: None };

    let err = apply_patch(&tree, &patch).unwrap_err();
    assert_eq!(err, PatchError::MissingPayload { target_id: "features".to_string() });
}

#[test]
fn invariant_failed_batch_leaves_no_partial_state() {
    let original = sample_document();
    let batch = [Patch::update("cta", NodePatch::text("立即体验")), Patch::remove("root")];

    assert!(original.patched(&batch).is_err());
    assert_eq!(cta_text(&original).as_deref(), Some("开始生成"));
}

#[test]
fn invariant_insert_and_remove_keep_sibling_order() {
    let tree = sample_document().layout_tree;
    let extra = LayoutNode::new("feature-0", ComponentType::Card).with_text("新卡片");

    let inserted = apply_patch(&tree, &Patch::insert("features", extra, Some(0))).unwrap();
    let ids: Vec<_> = inserted.find("features").unwrap().children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["feature-0", "feature-1", "feature-2", "feature-3"]);

    let removed = apply_patch(&inserted, &Patch::remove("feature-2")).unwrap();
    let ids: Vec<_> = removed.find("features").unwrap().children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["feature-0", "feature-1", "feature-3"]);
}

#[test]
fn invariant_wire_patch_is_validated_before_apply() {
    let patch = validate_patch(&json!({ "targetId": "cta", "op": "update", "payload": { "text": "立即体验" } })).unwrap();
    assert_eq!(patch.op, PatchOp::Update);

    let err = validate_patch(&json!({ "targetId": "cta", "op": "rename" })).unwrap_err();
    assert_eq!(err.paths(), vec!["$.op"]);
}

#[test]
fn invariant_generation_is_deterministic() {
    let ui = sample_document();
    let options = GenerateOptions::new(Framework::Next);

    let first = generate(&ui, &options);
    let second = generate(&ui, &options);
    assert_eq!(first, second);
    assert_eq!(canonical_json(&first).unwrap(), canonical_json(&second).unwrap());

    assert!(first.files.contains_key("app/page.tsx"));
    assert!(first.files.contains_key("app/layout.tsx"));
    assert!(first.files.contains_key(&first.entry));
    assert_eq!(first.entry, "app/page.tsx");
}

#[test]
fn invariant_every_node_renders() {
    let mut ui = sample_document();
    ui.layout_tree.children.push(LayoutNode::new("chart-1", ComponentType::Chart));

    let bundle = generate_target(&ui, "next").unwrap();
    let page = bundle.entry_source().unwrap();
    assert!(page.contains(r#"data-node-type="chart""#));
    assert!(page.contains("从草图到可运行原型"));
}

#[test]
fn invariant_unsupported_framework_fails_fast() {
    let err = generate_target(&sample_document(), "vue").unwrap_err();
    assert_eq!(err, CodegenError::UnsupportedFramework("vue".to_string()));
}

#[test]
fn invariant_duplicate_ids_block_only_under_strict_policy() {
    let mut ui = sample_document();
    ui.layout_tree.children.push(LayoutNode::new("cta", ComponentType::Text));
    let raw = serde_json::to_value(&ui).unwrap();

    assert!(Validator::with_policy(ValidationPolicy::Lenient).validate(&raw).is_ok());
    assert!(Validator::with_policy(ValidationPolicy::Strict).validate(&raw).is_err());
}

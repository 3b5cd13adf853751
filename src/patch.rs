//! Patch Engine - Immutable Tree Edits
//!
//! A patch is resolved against the first pre-order node whose id matches its
//! target. Failure checks run before any mutation, so a failing patch never
//! leaves a half-edited tree behind.

use thiserror::Error;

use crate::schema::{LayoutNode, NodePatch, Patch, PatchOp, UiIr};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("Cannot remove the root node: {target_id}")]
    InvalidRootRemoval { target_id: String },

    #[error("Insert into {target_id} requires a payload")]
    MissingPayload { target_id: String },

    #[error("Insert into {target_id} requires payload field '{field}'")]
    IncompletePayload { target_id: String, field: &'static str },
}

/// Child-index path from the root to the first pre-order node with `id`.
/// An empty path is the root itself.
pub fn locate(tree: &LayoutNode, id: &str) -> Option<Vec<usize>> {
    if tree.id == id {
        return Some(vec![]);
    }
    tree.children.iter().enumerate().find_map(|(index, child)| {
        locate(child, id).map(|mut path| {
            path.insert(0, index);
            path
        })
    })
}

/// Apply one patch, returning a new tree. The input is never touched.
pub fn apply_patch(tree: &LayoutNode, patch: &Patch) -> Result<LayoutNode, PatchError> {
    let mut next = tree.clone();
    apply_in_place(&mut next, patch)?;
    Ok(next)
}

/// Left fold over `patches`. The first failure aborts the batch and no
/// intermediate tree escapes.
pub fn apply_patches(tree: &LayoutNode, patches: &[Patch]) -> Result<LayoutNode, PatchError> {
    let mut next = tree.clone();
    for (index, patch) in patches.iter().enumerate() {
        if let Err(err) = apply_in_place(&mut next, patch) {
            tracing::debug!(index, error = %err, "patch batch aborted");
            return Err(err);
        }
    }
    Ok(next)
}

/// Apply one patch to an owned tree, moving untouched subtrees rather than
/// copying them. Returns whether a target was found. On error the tree is
/// unchanged.
pub fn apply_in_place(tree: &mut LayoutNode, patch: &Patch) -> Result<bool, PatchError> {
    let Some(path) = locate(tree, &patch.target_id) else {
        tracing::debug!(target_id = %patch.target_id, op = patch.op.as_str(), "patch target not found");
        return Ok(false);
    };

    match patch.op {
        PatchOp::Update | PatchOp::Replace => {
            if let Some(payload) = &patch.payload {
                merge(node_at_mut(tree, &path), payload);
            }
        }
        PatchOp::Insert => {
            let payload = patch.payload.as_ref().ok_or_else(|| PatchError::MissingPayload {
                target_id: patch.target_id.clone(),
            })?;
            let child = node_from_payload(payload, &patch.target_id)?;
            let parent = node_at_mut(tree, &path);
            let index = patch.position.unwrap_or(0).min(parent.children.len());
            parent.children.insert(index, child);
        }
        PatchOp::Remove => {
            let Some((&index, parent_path)) = path.split_last() else {
                return Err(PatchError::InvalidRootRemoval { target_id: patch.target_id.clone() });
            };
            node_at_mut(tree, parent_path).children.remove(index);
        }
    }

    tracing::debug!(target_id = %patch.target_id, op = patch.op.as_str(), depth = path.len(), "patch applied");
    Ok(true)
}

fn node_at_mut<'a>(tree: &'a mut LayoutNode, path: &[usize]) -> &'a mut LayoutNode {
    path.iter().fold(tree, |node, &index| &mut node.children[index])
}

/// Shallow merge: every field present in the payload overwrites the node's.
fn merge(node: &mut LayoutNode, payload: &NodePatch) {
    let payload = payload.clone();
    if let Some(id) = payload.id { node.id = id; }
    if let Some(kind) = payload.kind { node.kind = kind; }
    if payload.name.is_some() { node.name = payload.name; }
    if payload.role.is_some() { node.role = payload.role; }
    if payload.text.is_some() { node.text = payload.text; }
    if payload.placeholder.is_some() { node.placeholder = payload.placeholder; }
    if payload.media.is_some() { node.media = payload.media; }
    if let Some(bindings) = payload.bindings { node.bindings = bindings; }
    if payload.constraints.is_some() { node.constraints = payload.constraints; }
    if let Some(layout) = payload.layout { node.layout = layout; }
    if let Some(style) = payload.style { node.style = style; }
    if payload.state.is_some() { node.state = payload.state; }
    if let Some(events) = payload.events { node.events = events; }
    if let Some(children) = payload.children { node.children = children; }
}

fn node_from_payload(payload: &NodePatch, target_id: &str) -> Result<LayoutNode, PatchError> {
    let incomplete = |field| PatchError::IncompletePayload { target_id: target_id.to_string(), field };
    let id = payload.id.clone().ok_or_else(|| incomplete("id"))?;
    let kind = payload.kind.ok_or_else(|| incomplete("type"))?;

    let mut node = LayoutNode::new(id, kind);
    merge(&mut node, payload);
    Ok(node)
}

impl UiIr {
    /// A new document whose layout tree has `patches` applied. The revision
    /// counter is left for the caller to bump.
    pub fn patched(&self, patches: &[Patch]) -> Result<UiIr, PatchError> {
        let layout_tree = apply_patches(&self.layout_tree, patches)?;
        Ok(UiIr { layout_tree, ..self.clone() })
    }
}

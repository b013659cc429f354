//! Reframe transform
//!
//! Sets the video length everywhere it is duplicated and renames output
//! prefixes to carry the new frame count.
//!
//! | Node | Graph field | UI slot |
//! |---|---|---|
//! | `EmptyHunyuanLatentVideo` | `inputs.length` | `widgets_values[2]` |
//! | `SaveVideo` / `SaveImage` | `inputs.filename_prefix` | `widgets_values[0]` |

use comfyq_doc::{
    find_nodes_of, is_link, FieldPath, NodeRole, QueueDocument, SectionFilter, UiNodeRef,
};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::num::NonZeroU64;

use crate::change::{ChangeSet, FieldIssue, NodeRef};
use crate::error::EditError;
use crate::prefix::rewrite_prefix;

/// Graph input holding the frame count
pub const LENGTH_INPUT: &str = "length";

/// Graph input holding the output prefix
pub const PREFIX_INPUT: &str = "filename_prefix";

/// `widgets_values` slot of the frame count on the latent video node
pub const LENGTH_WIDGET_SLOT: usize = 2;

/// `widgets_values` slot of the prefix on save nodes
pub const PREFIX_WIDGET_SLOT: usize = 0;

/// Validated, strictly positive frame count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameCount(NonZeroU64);

impl FrameCount {
    /// Create from a non-zero count
    #[inline]
    #[must_use]
    pub fn new(frames: u64) -> Option<Self> {
        NonZeroU64::new(frames).map(Self)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<i64> for FrameCount {
    type Error = EditError;

    fn try_from(frames: i64) -> Result<Self, Self::Error> {
        u64::try_from(frames)
            .ok()
            .and_then(Self::new)
            .ok_or(EditError::InvalidFrameCount(frames))
    }
}

impl Display for FrameCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Apply `frames` to every length source and save node in the document
///
/// Visits every section. Fields that are missing, linked, or of the wrong
/// type are skipped with a warning. Applying the same count twice leaves the
/// document as after the first pass.
pub fn reframe(document: &mut QueueDocument, frames: FrameCount) -> ChangeSet {
    let mut changes = ChangeSet::new();
    let types: Vec<&str> = [NodeRole::LengthSource, NodeRole::SaveOutput]
        .into_iter()
        .flat_map(NodeRole::type_names)
        .copied()
        .collect();

    let located = find_nodes_of(document, &types, &SectionFilter::All);
    tracing::info!(
        "reframing {} node(s) to {} frames",
        located.matches.len(),
        frames
    );

    for m in &located.matches {
        let node = NodeRef::graph(&m.scope, &m.graph);
        match NodeRole::of(&m.graph.class_type) {
            Some(NodeRole::LengthSource) => {
                set_length_input(document, &mut changes, &node, m.graph.input_path(LENGTH_INPUT), frames);
                if let Some(ui) = &m.ui {
                    set_length_widget(document, &mut changes, &node, ui, frames);
                }
            }
            Some(NodeRole::SaveOutput) => {
                set_prefix_input(document, &mut changes, &node, m.graph.input_path(PREFIX_INPUT), frames);
                if let Some(ui) = &m.ui {
                    set_prefix_widget(document, &mut changes, &node, ui, frames);
                }
            }
            _ => {}
        }
    }

    for orphan in &located.orphans {
        changes.note_orphan_ui();
        let node = NodeRef::orphan_ui(&orphan.scope, &orphan.ui);
        match NodeRole::of(&orphan.ui.node_type) {
            Some(NodeRole::LengthSource) => set_length_widget(document, &mut changes, &node, &orphan.ui, frames),
            Some(NodeRole::SaveOutput) => set_prefix_widget(document, &mut changes, &node, &orphan.ui, frames),
            _ => {}
        }
    }

    changes
}

fn set_length_input(
    document: &mut QueueDocument,
    changes: &mut ChangeSet,
    node: &NodeRef,
    field: FieldPath,
    frames: FrameCount,
) {
    match document.get(&field) {
        None => changes.warn(node, field, FieldIssue::Missing),
        Some(v) if is_link(v) => changes.warn(node, field, FieldIssue::Linked),
        Some(_) => changes.apply(document, node, field, Value::from(frames.get())),
    }
}

fn set_length_widget(
    document: &mut QueueDocument,
    changes: &mut ChangeSet,
    node: &NodeRef,
    ui: &UiNodeRef,
    frames: FrameCount,
) {
    let field = ui.widget_path(LENGTH_WIDGET_SLOT);
    if document.get(&field).is_none() {
        changes.warn(node, field, FieldIssue::SlotOutOfRange);
        return;
    }
    changes.apply(document, node, field, Value::from(frames.get()));
}

fn set_prefix_input(
    document: &mut QueueDocument,
    changes: &mut ChangeSet,
    node: &NodeRef,
    field: FieldPath,
    frames: FrameCount,
) {
    let rewritten = match document.get(&field) {
        None => return changes.warn(node, field, FieldIssue::Missing),
        Some(v) if is_link(v) => return changes.warn(node, field, FieldIssue::Linked),
        Some(Value::String(prefix)) => rewrite_prefix(prefix, frames.get()),
        Some(_) => return changes.warn(node, field, FieldIssue::NotString),
    };
    changes.apply(document, node, field, Value::String(rewritten));
}

fn set_prefix_widget(
    document: &mut QueueDocument,
    changes: &mut ChangeSet,
    node: &NodeRef,
    ui: &UiNodeRef,
    frames: FrameCount,
) {
    let field = ui.widget_path(PREFIX_WIDGET_SLOT);
    let rewritten = match document.get(&field) {
        None => return changes.warn(node, field, FieldIssue::SlotOutOfRange),
        Some(Value::String(prefix)) => rewrite_prefix(prefix, frames.get()),
        Some(_) => return changes.warn(node, field, FieldIssue::NotString),
    };
    changes.apply(document, node, field, Value::String(rewritten));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_validation() {
        assert_eq!(FrameCount::try_from(145).map(FrameCount::get), Ok(145));
        assert_eq!(FrameCount::try_from(0), Err(EditError::InvalidFrameCount(0)));
        assert_eq!(FrameCount::try_from(-3), Err(EditError::InvalidFrameCount(-3)));
        assert!(FrameCount::new(0).is_none());
    }

    #[test]
    fn frame_count_display() {
        assert_eq!(FrameCount::new(97).unwrap().to_string(), "97");
    }
}

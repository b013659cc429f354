//! Field-level change records
//!
//! Every value a transform writes is recorded as a [`FieldChange`], and every
//! node it had to skip as a [`FieldWarning`]. The resulting [`ChangeSet`] is
//! what a dry run reports, and is identical to what a real run applies.

use comfyq_doc::{FieldPath, GraphNodeRef, JobScope, QueueDocument, UiNodeRef};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

/// Identity of the node a change belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRef {
    /// Owning job
    pub scope: JobScope,
    /// Graph node id, or `ui:<index>` for a UI node without a graph twin
    pub node_id: String,
    /// Declared node type
    pub node_type: String,
}

impl NodeRef {
    /// Reference a graph node
    #[inline]
    #[must_use]
    pub fn graph(scope: &JobScope, node: &GraphNodeRef) -> Self {
        Self {
            scope: scope.clone(),
            node_id: node.id.clone(),
            node_type: node.class_type.clone(),
        }
    }

    /// Reference a UI node that has no graph twin
    #[inline]
    #[must_use]
    pub fn orphan_ui(scope: &JobScope, node: &UiNodeRef) -> Self {
        Self {
            scope: scope.clone(),
            node_id: format!("ui:{}", node.index),
            node_type: node.node_type.clone(),
        }
    }
}

impl Display for NodeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} node {} ({})", self.scope, self.node_id, self.node_type)
    }
}

/// One value written by a transform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    /// Node the field belongs to
    pub node: NodeRef,
    /// Location of the field
    pub field: FieldPath,
    /// Value before the transform
    pub old: Value,
    /// Value after the transform
    pub new: Value,
}

impl FieldChange {
    /// Whether the value actually differs
    #[inline]
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.old != self.new
    }
}

impl Display for FieldChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {} -> {}", self.node, self.field, self.old, self.new)
    }
}

/// Why a field was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldIssue {
    /// Field (or its `inputs` mapping) is absent
    Missing,
    /// Input is wired to another node's output
    Linked,
    /// Expected a string
    NotString,
    /// Expected a non-negative integer
    NotInteger,
    /// `widgets_values` is absent or too short
    SlotOutOfRange,
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Missing => "field missing",
            Self::Linked => "input is linked to another node",
            Self::NotString => "value is not a string",
            Self::NotInteger => "value is not a non-negative integer",
            Self::SlotOutOfRange => "widget slot out of range",
        })
    }
}

/// A node field that was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldWarning {
    /// Node the field belongs to
    pub node: NodeRef,
    /// Location that was expected
    pub field: FieldPath,
    /// Reason
    pub issue: FieldIssue,
}

impl Display for FieldWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}; skipped", self.node, self.field, self.issue)
    }
}

/// Everything a transform did (or would do)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
    warnings: Vec<FieldWarning>,
    orphan_ui: usize,
}

impl ChangeSet {
    /// Empty change set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `new` at `field` and record the change
    ///
    /// If nothing exists at `field` the document is left untouched and a
    /// [`FieldIssue::Missing`] warning is recorded instead.
    pub fn apply(&mut self, document: &mut QueueDocument, node: &NodeRef, field: FieldPath, new: Value) {
        match document.replace(&field, new.clone()) {
            Ok(old) => {
                tracing::debug!("{} {}: {} -> {}", node, field, old, new);
                self.changes.push(FieldChange {
                    node: node.clone(),
                    field,
                    old,
                    new,
                });
            }
            Err(_) => self.warn(node, field, FieldIssue::Missing),
        }
    }

    /// Record a skipped field
    pub fn warn(&mut self, node: &NodeRef, field: FieldPath, issue: FieldIssue) {
        let warning = FieldWarning {
            node: node.clone(),
            field,
            issue,
        };
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Count a UI node that had no graph twin
    #[inline]
    pub fn note_orphan_ui(&mut self) {
        self.orphan_ui += 1;
    }

    /// All recorded writes, in application order
    #[inline]
    #[must_use]
    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    /// Writes that changed a value
    pub fn effective(&self) -> impl Iterator<Item = &FieldChange> {
        self.changes.iter().filter(|c| c.is_effective())
    }

    /// Number of writes that changed a value
    #[inline]
    #[must_use]
    pub fn effective_count(&self) -> usize {
        self.effective().count()
    }

    /// Skipped fields
    #[inline]
    #[must_use]
    pub fn warnings(&self) -> &[FieldWarning] {
        &self.warnings
    }

    /// Distinct nodes that received at least one write
    #[must_use]
    pub fn nodes_touched(&self) -> usize {
        self.changes
            .iter()
            .map(|c| &c.node)
            .collect::<HashSet<_>>()
            .len()
    }

    /// UI nodes without a graph twin that were visited
    #[inline]
    #[must_use]
    pub fn orphan_ui(&self) -> usize {
        self.orphan_ui
    }

    /// True when no value was actually changed
    #[inline]
    #[must_use]
    pub fn is_empty_run(&self) -> bool {
        self.effective().next().is_none()
    }
}

//! Job envelopes and the node records inside them
//!
//! A saved queue stores each job as a tuple
//! `[number, prompt_id, GRAPH, META, outputs...]`. Exports from other tools
//! sometimes use a mapping with `prompt`/`extra_data`, or just the graph
//! mapping itself; all three are accepted here.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};

use crate::path::FieldPath;
use crate::section::Section;

const GRAPH_SLOT: usize = 2;
const META_SLOT: usize = 3;
const PROMPT_ID_SLOT: usize = 1;

/// Identity of one job within the document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JobScope {
    /// Owning section; `None` for the implicit scope
    pub section: Option<Section>,
    /// Position within the section
    pub index: usize,
    /// Prompt id stored in the envelope, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
}

impl JobScope {
    /// The single job of a section-less document
    #[inline]
    #[must_use]
    pub fn implicit() -> Self {
        Self {
            section: None,
            index: 0,
            prompt_id: None,
        }
    }

    /// Job `index` of `section`
    #[inline]
    #[must_use]
    pub fn in_section(section: Section, index: usize) -> Self {
        Self {
            section: Some(section),
            index,
            prompt_id: None,
        }
    }

    /// Attach a prompt id
    #[inline]
    #[must_use]
    pub fn with_prompt_id(mut self, prompt_id: Option<String>) -> Self {
        self.prompt_id = prompt_id;
        self
    }
}

impl Display for JobScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.section {
            Some(section) => write!(f, "{section}[{}]", self.index),
            None => f.write_str("document"),
        }
    }
}

/// Graph node located in a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNodeRef {
    /// Node id (mapping key, `id` field, or sequence index)
    pub id: String,
    /// Declared `class_type`
    pub class_type: String,
    /// Stored order within the graph
    pub position: usize,
    /// Path to the node record
    pub path: FieldPath,
}

impl GraphNodeRef {
    /// Path to one of the node's inputs
    #[inline]
    #[must_use]
    pub fn input_path(&self, name: &str) -> FieldPath {
        self.path.child("inputs").child(name)
    }
}

/// UI mirror node located in a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiNodeRef {
    /// Declared `type`
    pub node_type: String,
    /// Position in `workflow.nodes`
    pub index: usize,
    /// Path to the node record
    pub path: FieldPath,
}

impl UiNodeRef {
    /// Path to a positional widget slot
    #[inline]
    #[must_use]
    pub fn widget_path(&self, slot: usize) -> FieldPath {
        self.path.child("widgets_values").index(slot)
    }
}

/// Borrowed view of one queued job
#[derive(Debug, Clone)]
pub struct JobEnvelope<'a> {
    scope: JobScope,
    graph: Option<(FieldPath, &'a Value)>,
    meta: Option<(FieldPath, &'a Map<String, Value>)>,
}

impl<'a> JobEnvelope<'a> {
    /// Interpret `value` at `path` as a job envelope
    ///
    /// Returns `None` if the value has none of the accepted shapes.
    #[must_use]
    pub fn from_value(scope: JobScope, path: &FieldPath, value: &'a Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::from_tuple(scope, path, items)),
            Value::Object(map) => Some(Self::from_mapping(scope, path, value, map)),
            _ => None,
        }
    }

    fn from_tuple(scope: JobScope, path: &FieldPath, items: &'a [Value]) -> Self {
        let prompt_id = items
            .get(PROMPT_ID_SLOT)
            .and_then(Value::as_str)
            .map(str::to_string);
        let graph = items
            .get(GRAPH_SLOT)
            .filter(|g| g.is_object() || g.is_array())
            .map(|g| (path.index(GRAPH_SLOT), g));
        let meta = items
            .get(META_SLOT)
            .and_then(Value::as_object)
            .map(|m| (path.index(META_SLOT), m));
        Self {
            scope: scope.with_prompt_id(prompt_id),
            graph,
            meta,
        }
    }

    fn from_mapping(
        scope: JobScope,
        path: &FieldPath,
        value: &'a Value,
        map: &'a Map<String, Value>,
    ) -> Self {
        match map.get("prompt").filter(|p| p.is_object() || p.is_array()) {
            Some(prompt) => Self {
                scope,
                graph: Some((path.child("prompt"), prompt)),
                meta: map
                    .get("extra_data")
                    .and_then(Value::as_object)
                    .map(|m| (path.child("extra_data"), m)),
            },
            None => Self {
                scope,
                graph: Some((path.clone(), value)),
                meta: Some((path.clone(), map)),
            },
        }
    }

    /// Job identity
    #[inline]
    #[must_use]
    pub fn scope(&self) -> &JobScope {
        &self.scope
    }

    /// Whether the envelope carries a graph
    #[inline]
    #[must_use]
    pub fn has_graph(&self) -> bool {
        self.graph.is_some()
    }

    /// Graph nodes with a declared type, in stored order
    #[must_use]
    pub fn graph_nodes(&self) -> Vec<GraphNodeRef> {
        let Some((graph_path, graph)) = &self.graph else {
            return Vec::new();
        };

        let entries: Vec<(String, FieldPath, &Value)> = match *graph {
            Value::Object(map) => map
                .iter()
                .map(|(id, node)| (id.clone(), graph_path.child(id.as_str()), node))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, node)| (array_node_id(node, i), graph_path.index(i), node))
                .collect(),
            _ => Vec::new(),
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(position, (id, path, node))| {
                let class_type = node.get("class_type")?.as_str()?;
                Some(GraphNodeRef {
                    id,
                    class_type: class_type.to_string(),
                    position,
                    path,
                })
            })
            .collect()
    }

    /// UI mirror nodes, or `None` when the job has no
    /// `extra_pnginfo.workflow.nodes` sequence
    #[must_use]
    pub fn ui_nodes(&self) -> Option<Vec<UiNodeRef>> {
        let (meta_path, meta) = self.meta.as_ref()?;
        let nodes = meta
            .get("extra_pnginfo")?
            .get("workflow")?
            .get("nodes")?
            .as_array()?;
        let nodes_path = meta_path.extend(&["extra_pnginfo", "workflow", "nodes"]);

        Some(
            nodes
                .iter()
                .enumerate()
                .filter_map(|(index, node)| {
                    let node_type = node.get("type")?.as_str()?;
                    Some(UiNodeRef {
                        node_type: node_type.to_string(),
                        index,
                        path: nodes_path.index(index),
                    })
                })
                .collect(),
        )
    }
}

fn array_node_id(node: &Value, index: usize) -> String {
    match node.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => index.to_string(),
    }
}

/// Check whether an input value is a link to another node's output
///
/// Links are serialized as `[source_node_id, output_slot]`.
#[must_use]
pub fn is_link(value: &Value) -> bool {
    match value.as_array().map(Vec::as_slice) {
        Some([source, slot]) => (source.is_string() || source.is_number()) && slot.is_u64(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: &Value) -> JobEnvelope<'_> {
        let path = FieldPath::root().child("queue_pending").index(0);
        JobEnvelope::from_value(JobScope::in_section(Section::Pending, 0), &path, value).unwrap()
    }

    #[test]
    fn tuple_envelope() {
        let job = json!([
            7,
            "prompt-a",
            {"3": {"class_type": "KSampler", "inputs": {"seed": 1}}, "9": {"inputs": {}}},
            {"extra_pnginfo": {"workflow": {"nodes": [{"type": "KSampler", "widgets_values": [1]}]}}},
            ["9"]
        ]);
        let env = envelope(&job);
        assert_eq!(env.scope().prompt_id.as_deref(), Some("prompt-a"));

        let nodes = env.graph_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "3");
        assert_eq!(nodes[0].path.to_pointer(), "/queue_pending/0/2/3");
        assert_eq!(
            nodes[0].input_path("seed").to_pointer(),
            "/queue_pending/0/2/3/inputs/seed"
        );

        let ui = env.ui_nodes().unwrap();
        assert_eq!(ui.len(), 1);
        assert_eq!(
            ui[0].widget_path(0).to_pointer(),
            "/queue_pending/0/3/extra_pnginfo/workflow/nodes/0/widgets_values/0"
        );
    }

    #[test]
    fn short_tuple_has_no_graph() {
        let job = json!([1, "only-id"]);
        let env = envelope(&job);
        assert!(!env.has_graph());
        assert!(env.graph_nodes().is_empty());
        assert!(env.ui_nodes().is_none());
    }

    #[test]
    fn prompt_mapping_envelope() {
        let job = json!({
            "prompt": {"5": {"class_type": "SaveVideo", "inputs": {}}},
            "extra_data": {"extra_pnginfo": {"workflow": {"nodes": []}}}
        });
        let env = envelope(&job);
        let nodes = env.graph_nodes();
        assert_eq!(nodes[0].path.to_pointer(), "/queue_pending/0/prompt/5");
        assert_eq!(env.ui_nodes(), Some(Vec::new()));
    }

    #[test]
    fn bare_graph_mapping_envelope() {
        let job = json!({
            "1": {"class_type": "KSampler", "inputs": {}},
            "2": {"class_type": "KSampler", "inputs": {}}
        });
        let env = envelope(&job);
        let ids: Vec<_> = env.graph_nodes().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, ["1", "2"]);
        assert!(env.ui_nodes().is_none());
    }

    #[test]
    fn sequence_graph_uses_id_field() {
        let job = json!([0, "p", [
            {"id": 12, "class_type": "KSampler"},
            {"class_type": "SaveImage"}
        ]]);
        let env = envelope(&job);
        let nodes = env.graph_nodes();
        assert_eq!(nodes[0].id, "12");
        assert_eq!(nodes[1].id, "1");
        assert_eq!(nodes[1].position, 1);
    }

    #[test]
    fn scalars_are_not_jobs() {
        let path = FieldPath::root();
        assert!(JobEnvelope::from_value(JobScope::implicit(), &path, &json!(3)).is_none());
    }

    #[test]
    fn link_detection() {
        assert!(is_link(&json!(["4", 0])));
        assert!(is_link(&json!([4, 1])));
        assert!(!is_link(&json!(145)));
        assert!(!is_link(&json!(["a", "b"])));
        assert!(!is_link(&json!([1, 2, 3])));
    }

    #[test]
    fn scope_display() {
        assert_eq!(JobScope::in_section(Section::Running, 2).to_string(), "queue_running[2]");
        assert_eq!(JobScope::implicit().to_string(), "document");
    }
}

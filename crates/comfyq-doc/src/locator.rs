//! Node locator
//!
//! Walks a queue document in a fixed order (sections, then jobs, then graph
//! nodes) and pairs each graph node with its UI mirror twin.
//!
//! # Traversal order
//! 1. `queue_running`, `queue_pending`, `queue_failed` (those present and
//!    admitted by the [`SectionFilter`]), or the implicit scope
//! 2. Jobs in stored order
//! 3. Graph nodes in stored order

use serde::Serialize;
use serde_json::Value;

use crate::document::{Layout, QueueDocument};
use crate::job::{GraphNodeRef, JobEnvelope, JobScope, UiNodeRef};
use crate::path::FieldPath;
use crate::section::SectionFilter;

/// Graph node paired with its UI mirror node (if any)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeMatch {
    /// Job the node belongs to
    pub scope: JobScope,
    /// Executable graph node
    pub graph: GraphNodeRef,
    /// Matching UI node; `None` if the job has no mirror or the ordinal has no twin
    pub ui: Option<UiNodeRef>,
}

/// UI node of a requested type with no graph partner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanUiNode {
    /// Job the node belongs to
    pub scope: JobScope,
    /// The UI node
    pub ui: UiNodeRef,
}

/// Result of a locator pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatedNodes {
    /// Matches in traversal order
    pub matches: Vec<NodeMatch>,
    /// UI nodes left over after ordinal pairing
    pub orphans: Vec<OrphanUiNode>,
}

/// Outcome of pairing one job's nodes of one type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
    /// Graph nodes with their twin, in graph order
    pub pairs: Vec<(GraphNodeRef, Option<UiNodeRef>)>,
    /// UI nodes of the type beyond the graph count
    pub orphans: Vec<UiNodeRef>,
}

/// Pair the Nth graph node of `type_name` with the Nth UI node of `type_name`
///
/// This is the only place the ordinal matching policy lives. Extra graph
/// nodes get `None`; extra UI nodes are returned as orphans.
#[must_use]
pub fn pair_by_ordinal(
    graph_nodes: &[GraphNodeRef],
    ui_nodes: &[UiNodeRef],
    type_name: &str,
) -> Pairing {
    let mut ui_of_type = ui_nodes.iter().filter(|u| u.node_type == type_name);

    let pairs = graph_nodes
        .iter()
        .filter(|g| g.class_type == type_name)
        .map(|g| (g.clone(), ui_of_type.next().cloned()))
        .collect();

    Pairing {
        pairs,
        orphans: ui_of_type.cloned().collect(),
    }
}

/// Every job envelope admitted by `filter`, in traversal order
///
/// Section values that are not sequences, and entries that are not job
/// shapes, are skipped with a warning.
#[must_use]
pub fn jobs<'a>(document: &'a QueueDocument, filter: &SectionFilter) -> Vec<JobEnvelope<'a>> {
    let root = document.root();
    match document.layout() {
        Layout::Implicit => {
            if !filter.includes_implicit() {
                tracing::debug!("document has no queue sections; section filter excludes it");
                return Vec::new();
            }
            match JobEnvelope::from_value(JobScope::implicit(), &FieldPath::root(), root) {
                Some(job) => vec![job],
                None => {
                    tracing::warn!("document root is neither a queue nor a job; nothing to edit");
                    Vec::new()
                }
            }
        }
        Layout::Sectioned(sections) => {
            let mut out = Vec::new();
            for section in sections.into_iter().filter(|s| filter.includes(*s)) {
                let section_path = FieldPath::root().child(section.key());
                let Some(items) = root.get(section.key()).and_then(Value::as_array) else {
                    tracing::warn!("{} is not a list; skipping section", section);
                    continue;
                };
                for (index, item) in items.iter().enumerate() {
                    let scope = JobScope::in_section(section, index);
                    match JobEnvelope::from_value(scope, &section_path.index(index), item) {
                        Some(job) => out.push(job),
                        None => tracing::warn!("{}[{}] is not a job entry; skipping", section, index),
                    }
                }
            }
            out
        }
    }
}

/// Find all nodes of one declared type
#[must_use]
pub fn find_nodes(
    document: &QueueDocument,
    type_name: &str,
    filter: &SectionFilter,
) -> LocatedNodes {
    find_nodes_of(document, &[type_name], filter)
}

/// Find all nodes whose declared type is one of `type_names`
///
/// Within a job, matches of different types are interleaved in graph order.
#[must_use]
pub fn find_nodes_of(
    document: &QueueDocument,
    type_names: &[&str],
    filter: &SectionFilter,
) -> LocatedNodes {
    let mut located = LocatedNodes::default();

    for job in jobs(document, filter) {
        if !job.has_graph() {
            let orphans: Vec<OrphanUiNode> = job
                .ui_nodes()
                .unwrap_or_default()
                .into_iter()
                .filter(|ui| type_names.contains(&ui.node_type.as_str()))
                .map(|ui| OrphanUiNode {
                    scope: job.scope().clone(),
                    ui,
                })
                .collect();
            tracing::warn!(
                "{} has no graph; {} UI node(s) left unpaired",
                job.scope(),
                orphans.len()
            );
            located.orphans.extend(orphans);
            continue;
        }
        let graph_nodes = job.graph_nodes();
        let ui_nodes = job.ui_nodes().unwrap_or_else(|| {
            tracing::debug!("{} has no UI mirror", job.scope());
            Vec::new()
        });

        let mut job_matches = Vec::new();
        for type_name in type_names {
            let pairing = pair_by_ordinal(&graph_nodes, &ui_nodes, type_name);
            let unmatched = pairing.pairs.iter().filter(|(_, ui)| ui.is_none()).count();
            if !ui_nodes.is_empty() && (unmatched > 0 || !pairing.orphans.is_empty()) {
                tracing::warn!(
                    "{}: graph has {} {} node(s), UI mirror has {}; pairing by order",
                    job.scope(),
                    pairing.pairs.len(),
                    type_name,
                    pairing.pairs.len() - unmatched + pairing.orphans.len(),
                );
            }
            job_matches.extend(pairing.pairs.into_iter().map(|(graph, ui)| NodeMatch {
                scope: job.scope().clone(),
                graph,
                ui,
            }));
            located
                .orphans
                .extend(pairing.orphans.into_iter().map(|ui| OrphanUiNode {
                    scope: job.scope().clone(),
                    ui,
                }));
        }
        job_matches.sort_by_key(|m| m.graph.position);
        located.matches.extend(job_matches);
    }

    located
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::Section;

    fn graph(id: &str, class_type: &str, position: usize) -> GraphNodeRef {
        GraphNodeRef {
            id: id.to_string(),
            class_type: class_type.to_string(),
            position,
            path: FieldPath::root().child(id),
        }
    }

    fn ui(node_type: &str, index: usize) -> UiNodeRef {
        UiNodeRef {
            node_type: node_type.to_string(),
            index,
            path: FieldPath::root().index(index),
        }
    }

    #[test]
    fn pairs_by_type_and_ordinal() {
        let g = [graph("3", "KSampler", 0), graph("4", "SaveVideo", 1), graph("7", "KSampler", 2)];
        let u = [ui("SaveVideo", 0), ui("KSampler", 1), ui("KSampler", 2)];

        let pairing = pair_by_ordinal(&g, &u, "KSampler");
        assert_eq!(pairing.pairs.len(), 2);
        assert_eq!(pairing.pairs[0].1.as_ref().map(|u| u.index), Some(1));
        assert_eq!(pairing.pairs[1].1.as_ref().map(|u| u.index), Some(2));
        assert!(pairing.orphans.is_empty());
    }

    #[test]
    fn extra_graph_nodes_have_no_twin() {
        let g = [graph("1", "KSampler", 0), graph("2", "KSampler", 1)];
        let u = [ui("KSampler", 0)];
        let pairing = pair_by_ordinal(&g, &u, "KSampler");
        assert!(pairing.pairs[0].1.is_some());
        assert!(pairing.pairs[1].1.is_none());
    }

    #[test]
    fn extra_ui_nodes_are_orphans() {
        let g = [graph("1", "SaveImage", 0)];
        let u = [ui("SaveImage", 0), ui("SaveImage", 5)];
        let pairing = pair_by_ordinal(&g, &u, "SaveImage");
        assert_eq!(pairing.orphans, vec![ui("SaveImage", 5)]);
    }

    #[test]
    fn implicit_scope_respects_filter() {
        let doc = QueueDocument::new(serde_json::json!({"1": {"class_type": "KSampler"}}));
        assert_eq!(jobs(&doc, &SectionFilter::All).len(), 1);
        let only = SectionFilter::only([Section::Pending]);
        assert!(jobs(&doc, &only).is_empty());
    }
}

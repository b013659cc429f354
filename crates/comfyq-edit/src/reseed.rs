//! Reseed transform

use comfyq_doc::{find_nodes_of, is_link, JobScope, NodeRole, QueueDocument, SectionFilter};
use serde_json::Value;

use crate::change::{ChangeSet, FieldIssue, NodeRef};
use crate::error::EditError;
use crate::seed::SeedSource;

/// Graph input holding a sampler's seed
pub const SEED_INPUT: &str = "seed";

/// Assign a new seed to every sampler admitted by `filter`
///
/// Samplers are visited in traversal order and each one with a usable seed
/// consumes exactly one value from `seeds`. A seed stored as a decimal string
/// counts as usable and is written back as a number. Samplers whose seed is
/// missing, linked, or not a non-negative integer are skipped with a warning
/// and consume nothing. UI mirror nodes are never touched.
///
/// # Errors
/// Returns error if `seeds` is exhausted; the document may then be partially
/// rewritten and must be discarded
pub fn reseed<S>(
    document: &mut QueueDocument,
    seeds: &mut S,
    filter: &SectionFilter,
) -> Result<ChangeSet, EditError>
where
    S: SeedSource + ?Sized,
{
    let mut changes = ChangeSet::new();
    let located = find_nodes_of(document, NodeRole::Sampler.type_names(), filter);
    tracing::info!("reseeding {} sampler node(s)", located.matches.len());

    let mut current: Option<&JobScope> = None;
    for m in &located.matches {
        if current != Some(&m.scope) {
            seeds.begin_job(&m.scope);
            current = Some(&m.scope);
        }

        let node = NodeRef::graph(&m.scope, &m.graph);
        let field = m.graph.input_path(SEED_INPUT);
        let issue = match document.get(&field) {
            None => Some(FieldIssue::Missing),
            Some(v) if is_link(v) => Some(FieldIssue::Linked),
            Some(v) if !is_seed_value(v) => Some(FieldIssue::NotInteger),
            Some(_) => None,
        };
        if let Some(issue) = issue {
            changes.warn(&node, field, issue);
            continue;
        }

        let seed = seeds.next_seed()?;
        changes.apply(document, &node, field, Value::from(seed));
    }

    tracing::info!(
        "{} seed(s) assigned, {} changed",
        changes.changes().len(),
        changes.effective_count()
    );
    Ok(changes)
}

fn is_seed_value(value: &Value) -> bool {
    match value {
        Value::String(text) => text.parse::<u64>().is_ok(),
        other => other.as_u64().is_some(),
    }
}

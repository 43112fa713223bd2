//! Path enumerator.
//!
//! Lists every page path that should be generated ahead of time. Every story
//! gets its public path; stories flagged exclusive additionally get the
//! marked path of their exclusive rendering.

use serde_json::Value;

use crate::catalogue::{Catalogue, CatalogueQuery};
use crate::types::PathEntry;

/// Enumerate the renderable paths under `root`.
///
/// Never fails: a catalogue error or an unexpected response yields an empty
/// set, and every page is then generated on demand instead.
pub async fn enumerate_paths<C: Catalogue + ?Sized>(
    catalogue: &C,
    root: &str,
    language: &str,
) -> Vec<PathEntry> {
    match catalogue.query(&CatalogueQuery::children(root, language)).await {
        Ok(envelope) => {
            let paths = partition_children(&envelope);
            tracing::info!(
                root = %root,
                total = paths.len(),
                restricted = paths.iter().filter(|p| p.is_restricted).count(),
                "Enumerated story paths"
            );
            paths
        }
        Err(e) => {
            tracing::warn!(root = %root, error = %e, "Path enumeration failed, falling back to on-demand generation");
            Vec::new()
        }
    }
}

/// Turn a children response into path entries: all public paths in catalogue
/// order, then the restricted paths in catalogue order.
pub fn partition_children(envelope: &Value) -> Vec<PathEntry> {
    let children = envelope
        .pointer("/data/catalogue/children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let flagged: Vec<(&str, bool)> = children
        .iter()
        .filter_map(|child| {
            let path = child.get("path").and_then(Value::as_str)?;
            let exclusive = child
                .pointer("/isExclusive/content/value")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            Some((path, exclusive))
        })
        .collect();

    let public = flagged.iter().map(|(path, _)| PathEntry::public(*path));
    let restricted = flagged
        .iter()
        .filter(|(_, exclusive)| *exclusive)
        .map(|(path, _)| PathEntry::restricted(path));

    public.chain(restricted).collect()
}

use crate::entities::{categories, materials};
use crate::services::category_tree::CategoryTree;

/// Narrows `materials` to those inside the `selected` category subtree whose
/// title contains `query` (case-insensitive). Input order is preserved.
///
/// Descendants are resolved against the full `categories` set, not only the
/// categories the given materials happen to use.
pub fn filter<'m>(
    materials: &'m [materials::Model],
    categories: &[categories::Model],
    selected: Option<&str>,
    query: &str,
) -> Vec<&'m materials::Model> {
    let allowed = selected.map(|id| CategoryTree::new(categories).descendant_ids(id));
    let needle = query.to_lowercase();

    materials
        .iter()
        .filter(|m| match &allowed {
            None => true,
            Some(ids) => m.category_id.as_ref().is_some_and(|c| ids.contains(c)),
        })
        .filter(|m| needle.is_empty() || m.title.to_lowercase().contains(&needle))
        .collect()
}

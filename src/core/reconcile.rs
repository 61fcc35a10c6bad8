//! Left outer join of element rows onto component rows.

use crate::domain::model::{ComponentKey, ComponentRow, ElementRow, MergedRow, ReconciliationResult};
use std::collections::{HashMap, HashSet};

/// Every element row appears exactly once in `merged`, paired with the first
/// component row sharing its key. Components nobody references are dropped.
pub fn reconcile(elements: &[ElementRow], components: &[ComponentRow]) -> ReconciliationResult {
    let mut first_match: HashMap<&ComponentKey, &ComponentRow> = HashMap::new();
    for component in components {
        first_match.entry(&component.key).or_insert(component);
    }

    let mut merged = Vec::with_capacity(elements.len());
    let mut unmatched = Vec::new();
    let mut reported: HashSet<&ComponentKey> = HashSet::new();

    for element in elements {
        let component = first_match.get(&element.component).copied();
        if component.is_none() && reported.insert(&element.component) {
            unmatched.push(element.component.clone());
        }
        merged.push(MergedRow {
            element: element.clone(),
            component: component.cloned(),
        });
    }

    tracing::info!(
        "Reconciled {} element rows against {} component rows: {} unmatched references",
        elements.len(),
        components.len(),
        unmatched.len()
    );

    ReconciliationResult { merged, unmatched }
}

/// Keys whose component rows disagree on anything but the material breakdown,
/// i.e. distinct catalog records sharing one join key. Only the first of those
/// records is used by [`reconcile`].
pub fn duplicate_keys(components: &[ComponentRow]) -> Vec<ComponentKey> {
    let mut first_record: HashMap<&ComponentKey, &ComponentRow> = HashMap::new();
    let mut duplicates = Vec::new();
    let mut seen: HashSet<&ComponentKey> = HashSet::new();

    for component in components {
        match first_record.get(&component.key) {
            None => {
                first_record.insert(&component.key, component);
            }
            Some(first) if !same_record(first, component) => {
                if seen.insert(&component.key) {
                    tracing::warn!(
                        "Component {} appears as more than one catalog record",
                        component.key
                    );
                    duplicates.push(component.key.clone());
                }
            }
            Some(_) => {}
        }
    }
    duplicates
}

fn same_record(a: &ComponentRow, b: &ComponentRow) -> bool {
    a.category == b.category
        && a.kind == b.kind
        && a.database == b.database
        && a.lci_id == b.lci_id
        && a.functional_unit == b.functional_unit
}

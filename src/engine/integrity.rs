use std::collections::BTreeSet;

use super::registry::Registry;

/// Consistency checks over one channel's registry. Returns human-readable
/// issue descriptions; empty means healthy.
///
/// Child/data length mismatches are reported even though they can occur
/// transiently in a live host (the binding layer attaches elements some time
/// after a data change); this is a debug aid, not an enforcement point.
pub(crate) fn registry_integrity_issues<T>(registry: &Registry<T>) -> Vec<String> {
    let mut issues = Vec::new();
    let mut container_ids = BTreeSet::new();
    let mut element_ids = BTreeSet::new();

    for slot in registry.containers() {
        if !container_ids.insert(slot.id) {
            issues.push(format!("container {:?} attached more than once", slot.id));
        }

        let data_len = slot.data.borrow().len();
        if data_len != slot.children.len() {
            issues.push(format!(
                "container {:?}: {} children vs {} data entries",
                slot.id,
                slot.children.len(),
                data_len
            ));
        }

        let mut nodes = BTreeSet::new();
        for child in &slot.children {
            if !element_ids.insert(child.id) {
                issues.push(format!("element {:?} attached more than once", child.id));
            }
            if !nodes.insert(child.node) {
                issues.push(format!(
                    "container {:?}: node {:?} bound to two elements",
                    slot.id, child.node
                ));
            }
        }
    }

    issues
}

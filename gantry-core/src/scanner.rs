// Namespace-rooted discovery over the component catalog

use crate::catalog::{ComponentEntry, NamespaceEntry};
use crate::Error;
use tracing::{debug, trace};

/// Returns every catalog entry registered at or beneath `root`, in a
/// deterministic order. A root that matches no registered namespace at all
/// cannot be resolved and fails; a resolvable namespace with no components
/// yields an empty set. Nothing is instantiated here.
pub fn scan(root: &str) -> Result<Vec<&'static ComponentEntry>, Error> {
    if !resolves(root) {
        return Err(Error::UnresolvedNamespace(root.to_string()));
    }

    let mut entries: Vec<&'static ComponentEntry> = inventory::iter::<ComponentEntry>
        .into_iter()
        .filter(|entry| in_namespace(entry.namespace, root))
        .collect();
    entries.sort_by_key(|entry| entry.type_name);

    for entry in &entries {
        trace!(component = entry.type_name, role = ?entry.role, "scanned");
    }
    debug!(root, count = entries.len(), "namespace scan complete");
    Ok(entries)
}

/// True when `namespace` is `root` itself or nested beneath it.
fn in_namespace(namespace: &str, root: &str) -> bool {
    namespace == root
        || (namespace.len() > root.len()
            && namespace.starts_with(root)
            && namespace[root.len()..].starts_with("::"))
}

/// A root resolves when any component or declared namespace lives at or
/// beneath it.
fn resolves(root: &str) -> bool {
    inventory::iter::<ComponentEntry>
        .into_iter()
        .any(|entry| in_namespace(entry.namespace, root))
        || inventory::iter::<NamespaceEntry>
            .into_iter()
            .any(|entry| in_namespace(entry.namespace, root))
}

// Application bootstrap: scan, instantiate, inject, route

use crate::container::Container;
use crate::dispatch;
use crate::http::{RequestContext, ResponseSink};
use crate::injector::{inject, InjectionGap};
use crate::routing::RouteTable;
use crate::scanner::scan;
use crate::Error;
use std::collections::HashMap;
use tracing::info;

/// Configuration key naming the namespace to scan for components.
pub const SCAN_ROOT_KEY: &str = "scan_root";

/// A fully wired application: the bean registry and route table, owned as a
/// plain value. Immutable once built, so the transport may dispatch from as
/// many workers as it likes without locking.
pub struct Application {
    container: Container,
    routes: RouteTable,
    injection_gaps: Vec<InjectionGap>,
}

impl Application {
    /// Runs the startup pipeline against `scan_root`: scan the catalog,
    /// build the registry, wire dependencies, build the route table. Each
    /// stage consumes the previous stage's output; any stage failure aborts
    /// startup and nothing is served.
    pub fn bootstrap(scan_root: &str) -> Result<Self, Error> {
        info!(scan_root, "bootstrapping application");

        let entries = scan(scan_root)?;
        let container = Container::build(&entries)?;
        let injection_gaps = inject(&container);
        let routes = RouteTable::build(&entries)?;

        info!(
            beans = container.len(),
            routes = routes.len(),
            injection_gaps = injection_gaps.len(),
            "application initialized"
        );
        Ok(Self {
            container,
            routes,
            injection_gaps,
        })
    }

    /// Bootstraps from a flat settings map, which must name the scan root
    /// under [`SCAN_ROOT_KEY`].
    pub fn bootstrap_from(settings: &HashMap<String, String>) -> Result<Self, Error> {
        let scan_root = settings
            .get(SCAN_ROOT_KEY)
            .ok_or_else(|| Error::Config(format!("missing `{SCAN_ROOT_KEY}`")))?;
        Self::bootstrap(scan_root)
    }

    /// Serves one request: resolves the path against the route table, binds
    /// parameters, and invokes the handler. Writes at most one response to
    /// the sink; per-request faults never escape.
    pub fn dispatch(&self, ctx: &RequestContext, sink: &mut ResponseSink) {
        dispatch::dispatch(&self.container, &self.routes, ctx, sink);
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Injection sites left unwired during startup.
    pub fn injection_gaps(&self) -> &[InjectionGap] {
        &self.injection_gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_scan_root_is_a_config_fault() {
        let settings = HashMap::new();
        let err = Application::bootstrap_from(&settings).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.is_startup_fault());
    }

    #[test]
    fn unresolvable_scan_root_aborts_bootstrap() {
        let err = Application::bootstrap("no::such::namespace").unwrap_err();
        assert!(matches!(err, Error::UnresolvedNamespace(_)));
    }
}

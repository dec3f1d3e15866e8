// Route table construction from controller catalog entries

use crate::catalog::{ComponentEntry, InvokeFn, RouteEntry};
use crate::metadata::{bean_name_for_type, ComponentRole, ParameterDescriptor};
use crate::Error;
use std::collections::HashMap;
use tracing::debug;

/// A routed (bean, method) pair under its normalized path.
#[derive(Clone)]
pub struct Route {
    pub path: String,
    pub bean_name: String,
    pub controller: &'static str,
    pub handler_name: &'static str,
    pub params: Vec<ParameterDescriptor>,
    pub invoke: InvokeFn,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("bean_name", &self.bean_name)
            .field("handler", &self.handler_name)
            .finish()
    }
}

/// Normalized path -> route. Built once during startup, read-only afterwards.
pub struct RouteTable {
    routes: HashMap<String, Route>,
}

impl RouteTable {
    /// Derives one route per routed method of every `Controller` entry:
    /// `normalize("/" + base_path + "/" + method_path)`. Two methods
    /// normalizing to the same path abort the build; a silent overwrite
    /// would shadow one of them until runtime.
    pub fn build(entries: &[&'static ComponentEntry]) -> Result<Self, Error> {
        let mut routes = HashMap::new();

        for component in entries {
            if component.role != ComponentRole::Controller {
                continue;
            }
            let bean_name = bean_name_for_type(component.type_name);

            let mut methods: Vec<&'static RouteEntry> = inventory::iter::<RouteEntry>
                .into_iter()
                .filter(|route| route.owner_type_id == component.type_id)
                .collect();
            methods.sort_by_key(|route| (route.path, route.handler_name));

            for method in methods {
                let path =
                    normalize_path(&format!("/{}/{}", component.base_path, method.path));
                if routes.contains_key(&path) {
                    return Err(Error::DuplicateRoute(path));
                }
                debug!(
                    path = %path,
                    controller = component.type_name,
                    handler = method.handler_name,
                    "route mapped"
                );
                routes.insert(
                    path.clone(),
                    Route {
                        path,
                        bean_name: bean_name.clone(),
                        controller: component.type_name,
                        handler_name: method.handler_name,
                        params: (method.params)(),
                        invoke: method.invoke,
                    },
                );
            }
        }

        Ok(Self { routes })
    }

    /// Exact-match lookup; there is no partial or prefix matching.
    pub fn lookup(&self, path: &str) -> Option<&Route> {
        self.routes.get(path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered paths, unordered.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

/// Collapses every run of `/` into a single separator.
pub fn normalize_path(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut previous_was_separator = false;
    for ch in raw.chars() {
        if ch == '/' {
            if !previous_was_separator {
                normalized.push('/');
            }
            previous_was_separator = true;
        } else {
            normalized.push(ch);
            previous_was_separator = false;
        }
    }
    normalized
}

#![feature(const_type_name)]
// Gantry - a declarative IoC container and request dispatcher for Rust
//
// Components register into a link-time catalog; the bootstrap scans a
// namespace, instantiates and wires beans, builds the route table, and the
// dispatcher serves requests off the frozen tables.

// Re-export core functionality
pub use gantry_core::*;

// Re-export the registration macros explicitly so `gantry::register_*!`
// paths resolve without the glob.
pub use gantry_core::{
    declare_namespace, register_controller, register_inject, register_other, register_route,
    register_service,
};

// Re-export optional crates
#[cfg(feature = "config")]
pub use gantry_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        declare_namespace, register_controller, register_inject, register_other, register_route,
        register_service, Application, ComponentRole, Container, Error, Inject, InjectionGap,
        ParamBinding, ParameterDescriptor, RequestContext, ResponseSink, Route, RouteTable,
        ScalarValue, NOT_FOUND_BODY, SCAN_ROOT_KEY, SERVER_ERROR_PREFIX,
    };

    #[cfg(feature = "config")]
    pub use gantry_config::Settings;
}

#![feature(const_type_name)]
// Core library for the Gantry wiring and dispatch engine
// Components register into a link-time catalog; startup scans, instantiates,
// injects, and routes them; dispatch serves requests off the frozen tables.

#[macro_use]
pub mod catalog;
pub mod metadata;

pub mod application;
pub mod container;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod injector;
pub mod routing;
pub mod scanner;

// Re-export commonly used types
pub use application::{Application, SCAN_ROOT_KEY};
pub use catalog::{
    ApplyFn, BeanHandle, ComponentEntry, ConstructFn, InjectionEntry, InterfaceFacet, InvokeFn,
    NamespaceEntry, RouteEntry,
};
pub use container::Container;
pub use dispatch::{NOT_FOUND_BODY, SERVER_ERROR_PREFIX};
pub use error::Error;
pub use http::{request_path, RequestContext, ResponseSink};
pub use injector::{inject, Inject, InjectionGap};
pub use metadata::{
    bean_name_for_type, ComponentRole, ParamBinding, ParameterDescriptor, ScalarValue,
};
pub use routing::{normalize_path, Route, RouteTable};
pub use scanner::scan;

// The registration macros expand to `$crate::inventory::submit!`.
pub use inventory;

// Link-time component catalog, collected with inventory
//
// Registration macros put one entry per marker here: components, injection
// sites, and routed methods. The scanner, container, injector, and route
// table builder all read the catalog; nothing reads it after startup.

use crate::http::{RequestContext, ResponseSink};
use crate::metadata::{ComponentRole, ParameterDescriptor, ScalarValue};
use crate::Error;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// A managed component instance, shared across the registry and requests.
pub type BeanHandle = Arc<dyn Any + Send + Sync>;

/// Zero-argument constructor for a component.
pub type ConstructFn = fn() -> Result<BeanHandle, Error>;

/// Produces the interface facets a service exposes.
pub type FacetsFn = fn() -> Vec<InterfaceFacet>;

/// Re-wraps a concrete bean as one of its exposed interfaces.
pub type FacetCastFn = fn(&BeanHandle) -> Result<BeanHandle, Error>;

/// Binds a resolved dependency into a bean's injection slot.
pub type ApplyFn = fn(&BeanHandle, &BeanHandle) -> Result<(), Error>;

/// Produces a routed method's parameter descriptors.
pub type ParamsFn = fn() -> Vec<ParameterDescriptor>;

/// Invokes a routed method with pre-bound scalar arguments.
pub type InvokeFn =
    fn(&BeanHandle, &RequestContext, &mut ResponseSink, &[ScalarValue]) -> Result<(), Error>;

/// One interface a service exposes when it carries no explicit bean name.
pub struct InterfaceFacet {
    /// Qualified trait name; doubles as the bean name.
    pub interface_name: &'static str,
    pub cast: FacetCastFn,
}

/// One registered component type.
pub struct ComponentEntry {
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// Module path of the registration site.
    pub namespace: &'static str,
    pub role: ComponentRole,
    /// Explicit bean name, services only.
    pub bean_name: Option<&'static str>,
    /// Route prefix, controllers only.
    pub base_path: &'static str,
    pub facets: FacetsFn,
    pub construct: ConstructFn,
}

inventory::collect!(ComponentEntry);

impl std::fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("type_name", &self.type_name)
            .field("namespace", &self.namespace)
            .field("role", &self.role)
            .field("bean_name", &self.bean_name)
            .field("base_path", &self.base_path)
            .finish()
    }
}

/// A namespace declared without components, so the scanner can tell an empty
/// namespace from an unresolvable one.
pub struct NamespaceEntry {
    pub namespace: &'static str,
}

inventory::collect!(NamespaceEntry);

/// One declared injection slot on a component.
pub struct InjectionEntry {
    pub owner_type_id: TypeId,
    pub owner_type_name: &'static str,
    pub field: &'static str,
    /// Bean name to resolve: the explicit marker value, or the qualified
    /// name of the slot's declared type.
    pub target: &'static str,
    pub apply: ApplyFn,
}

inventory::collect!(InjectionEntry);

impl std::fmt::Debug for InjectionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionEntry")
            .field("owner", &self.owner_type_name)
            .field("field", &self.field)
            .field("target", &self.target)
            .finish()
    }
}

/// One routed method on a controller.
pub struct RouteEntry {
    pub owner_type_id: TypeId,
    pub owner_type_name: &'static str,
    /// Route suffix, appended to the controller's base path.
    pub path: &'static str,
    pub handler_name: &'static str,
    pub params: ParamsFn,
    pub invoke: InvokeFn,
}

inventory::collect!(RouteEntry);

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("owner", &self.owner_type_name)
            .field("path", &self.path)
            .field("handler", &self.handler_name)
            .finish()
    }
}

/// Registers a controller component. The bean name is derived from the type
/// name; routes hang off the base path.
///
/// ```ignore
/// register_controller!(DemoController, base_path: "/demo");
/// ```
#[macro_export]
macro_rules! register_controller {
    ($ty:ty) => {
        $crate::register_controller!($ty, base_path: "");
    };
    ($ty:ty, base_path: $base:expr) => {
        $crate::inventory::submit! {
            $crate::ComponentEntry {
                type_id: ::std::any::TypeId::of::<$ty>(),
                type_name: ::std::any::type_name::<$ty>(),
                namespace: ::std::module_path!(),
                role: $crate::ComponentRole::Controller,
                bean_name: ::std::option::Option::None,
                base_path: $base,
                facets: || ::std::vec::Vec::new(),
                construct: || {
                    ::std::result::Result::Ok(
                        ::std::sync::Arc::new(<$ty as ::std::default::Default>::default())
                            as $crate::BeanHandle,
                    )
                },
            }
        }
    };
}

/// Registers a service component, either under an explicit bean name or once
/// per exposed interface (a `Send + Sync` trait the type implements); in the
/// interface form every entry shares one instance. An optional `construct:`
/// names a `fn() -> Result<T, Error>` used instead of `Default`.
///
/// ```ignore
/// register_service!(GreetingService, implements: [IGreetingService]);
/// register_service!(ClockService, name: "clock");
/// ```
#[macro_export]
macro_rules! register_service {
    ($ty:ty, name: $name:expr) => {
        $crate::register_service!(@entry $ty,
            bean_name: ::std::option::Option::Some($name),
            facets: || ::std::vec::Vec::new(),
            construct: || {
                ::std::result::Result::Ok(
                    ::std::sync::Arc::new(<$ty as ::std::default::Default>::default())
                        as $crate::BeanHandle,
                )
            });
    };
    ($ty:ty, name: $name:expr, construct: $factory:expr) => {
        $crate::register_service!(@entry $ty,
            bean_name: ::std::option::Option::Some($name),
            facets: || ::std::vec::Vec::new(),
            construct: || {
                let instance: $ty = ($factory)()?;
                ::std::result::Result::Ok(::std::sync::Arc::new(instance) as $crate::BeanHandle)
            });
    };
    ($ty:ty, implements: [$($iface:path),+ $(,)?]) => {
        $crate::register_service!(@entry $ty,
            bean_name: ::std::option::Option::None,
            facets: || ::std::vec![
                $($crate::InterfaceFacet {
                    interface_name: $crate::metadata::qualified_name(
                        ::std::any::type_name::<dyn $iface>(),
                    ),
                    cast: |handle| {
                        let concrete = handle
                            .clone()
                            .downcast::<$ty>()
                            .map_err(|_| $crate::Error::Instantiation(::std::format!(
                                "bean is not a {}",
                                ::std::any::type_name::<$ty>(),
                            )))?;
                        let iface: ::std::sync::Arc<dyn $iface> = concrete;
                        ::std::result::Result::Ok(
                            ::std::sync::Arc::new(iface) as $crate::BeanHandle
                        )
                    },
                }),+
            ],
            construct: || {
                ::std::result::Result::Ok(
                    ::std::sync::Arc::new(<$ty as ::std::default::Default>::default())
                        as $crate::BeanHandle,
                )
            });
    };
    ($ty:ty, implements: [$($iface:path),+ $(,)?], construct: $factory:expr) => {
        $crate::register_service!(@entry $ty,
            bean_name: ::std::option::Option::None,
            facets: || ::std::vec![
                $($crate::InterfaceFacet {
                    interface_name: $crate::metadata::qualified_name(
                        ::std::any::type_name::<dyn $iface>(),
                    ),
                    cast: |handle| {
                        let concrete = handle
                            .clone()
                            .downcast::<$ty>()
                            .map_err(|_| $crate::Error::Instantiation(::std::format!(
                                "bean is not a {}",
                                ::std::any::type_name::<$ty>(),
                            )))?;
                        let iface: ::std::sync::Arc<dyn $iface> = concrete;
                        ::std::result::Result::Ok(
                            ::std::sync::Arc::new(iface) as $crate::BeanHandle
                        )
                    },
                }),+
            ],
            construct: || {
                let instance: $ty = ($factory)()?;
                ::std::result::Result::Ok(::std::sync::Arc::new(instance) as $crate::BeanHandle)
            });
    };
    (@entry $ty:ty, bean_name: $name:expr, facets: $facets:expr, construct: $construct:expr) => {
        $crate::inventory::submit! {
            $crate::ComponentEntry {
                type_id: ::std::any::TypeId::of::<$ty>(),
                type_name: ::std::any::type_name::<$ty>(),
                namespace: ::std::module_path!(),
                role: $crate::ComponentRole::Service,
                bean_name: $name,
                base_path: "",
                facets: $facets,
                construct: $construct,
            }
        }
    };
}

/// Registers a type the scanner should see but the container must skip.
#[macro_export]
macro_rules! register_other {
    ($ty:ty) => {
        $crate::inventory::submit! {
            $crate::ComponentEntry {
                type_id: ::std::any::TypeId::of::<$ty>(),
                type_name: ::std::any::type_name::<$ty>(),
                namespace: ::std::module_path!(),
                role: $crate::ComponentRole::Other,
                bean_name: ::std::option::Option::None,
                base_path: "",
                facets: || ::std::vec::Vec::new(),
                construct: || {
                    ::std::result::Result::Err($crate::Error::Instantiation(
                        ::std::format!(
                            "{} has no container role",
                            ::std::any::type_name::<$ty>(),
                        ),
                    ))
                },
            }
        }
    };
}

/// Declares the surrounding module as a scannable namespace even when it
/// registers no components.
#[macro_export]
macro_rules! declare_namespace {
    () => {
        $crate::inventory::submit! {
            $crate::NamespaceEntry {
                namespace: ::std::module_path!(),
            }
        }
    };
}

/// Registers an injection slot. The field must be an
/// [`Inject<T>`](crate::Inject) whose `T` matches the declared type; the
/// target bean name defaults to that type's qualified name, or is given
/// explicitly with `name:`.
///
/// ```ignore
/// register_inject!(DemoController, greeting: dyn IGreetingService);
/// register_inject!(ReportJob, clock: ClockService, name: "clock");
/// ```
#[macro_export]
macro_rules! register_inject {
    ($owner:ty, $field:ident: dyn $iface:path) => {
        $crate::register_inject!($owner, $field: dyn $iface,
            name: $crate::metadata::qualified_name(::std::any::type_name::<dyn $iface>()));
    };
    ($owner:ty, $field:ident: dyn $iface:path, name: $target:expr) => {
        $crate::inventory::submit! {
            $crate::InjectionEntry {
                owner_type_id: ::std::any::TypeId::of::<$owner>(),
                owner_type_name: ::std::any::type_name::<$owner>(),
                field: ::std::stringify!($field),
                target: $target,
                apply: |bean, dep| {
                    let owner = bean
                        .downcast_ref::<$owner>()
                        .ok_or_else(|| $crate::Error::Injection(::std::format!(
                            "bean is not a {}",
                            ::std::any::type_name::<$owner>(),
                        )))?;
                    let dep = dep
                        .downcast_ref::<::std::sync::Arc<dyn $iface>>()
                        .ok_or_else(|| $crate::Error::Injection(::std::format!(
                            "target bean does not expose {}",
                            ::std::any::type_name::<dyn $iface>(),
                        )))?;
                    owner.$field.bind(dep.clone())
                },
            }
        }
    };
    ($owner:ty, $field:ident: $dep:ty) => {
        $crate::register_inject!($owner, $field: $dep,
            name: ::std::any::type_name::<$dep>());
    };
    ($owner:ty, $field:ident: $dep:ty, name: $target:expr) => {
        $crate::inventory::submit! {
            $crate::InjectionEntry {
                owner_type_id: ::std::any::TypeId::of::<$owner>(),
                owner_type_name: ::std::any::type_name::<$owner>(),
                field: ::std::stringify!($field),
                target: $target,
                apply: |bean, dep| {
                    let owner = bean
                        .downcast_ref::<$owner>()
                        .ok_or_else(|| $crate::Error::Injection(::std::format!(
                            "bean is not a {}",
                            ::std::any::type_name::<$owner>(),
                        )))?;
                    let dep = dep
                        .clone()
                        .downcast::<$dep>()
                        .map_err(|_| $crate::Error::Injection(::std::format!(
                            "target bean is not a {}",
                            ::std::any::type_name::<$dep>(),
                        )))?;
                    owner.$field.bind(dep)
                },
            }
        }
    };
}

/// Registers a routed method on a controller. The parameter list describes
/// the method's signature after `&self`, in order: `ctx` binds the request
/// context, `sink` the response sink, `name: str` a `String` from the bag,
/// `name: int` a parsed `i64`.
///
/// ```ignore
/// register_route!(DemoController, add, "/add.json", (ctx, sink, a: int, b: int));
/// ```
#[macro_export]
macro_rules! register_route {
    ($ctrl:ty, $method:ident, $path:expr, ( $( $pname:ident $(: $pkind:ident)? ),* $(,)? )) => {
        $crate::inventory::submit! {
            $crate::RouteEntry {
                owner_type_id: ::std::any::TypeId::of::<$ctrl>(),
                owner_type_name: ::std::any::type_name::<$ctrl>(),
                path: $path,
                handler_name: ::std::stringify!($method),
                params: || ::std::vec![ $( $crate::route_param!($pname $(: $pkind)?) ),* ],
                invoke: |bean, _ctx, _sink, scalars| {
                    let component = bean
                        .downcast_ref::<$ctrl>()
                        .ok_or_else(|| $crate::Error::Dispatch(::std::format!(
                            "bean is not a {}",
                            ::std::any::type_name::<$ctrl>(),
                        )))?;
                    let mut _scalars = scalars.iter();
                    component.$method(
                        $( $crate::route_arg!(_ctx, _sink, _scalars, $pname $(: $pkind)?) ),*
                    )
                },
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! route_param {
    (ctx) => {
        $crate::ParameterDescriptor {
            name: "ctx",
            binding: $crate::ParamBinding::Context,
        }
    };
    (sink) => {
        $crate::ParameterDescriptor {
            name: "sink",
            binding: $crate::ParamBinding::Sink,
        }
    };
    ($name:ident: str) => {
        $crate::ParameterDescriptor {
            name: ::std::stringify!($name),
            binding: $crate::ParamBinding::Str,
        }
    };
    ($name:ident: int) => {
        $crate::ParameterDescriptor {
            name: ::std::stringify!($name),
            binding: $crate::ParamBinding::Int,
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! route_arg {
    ($ctx:ident, $sink:ident, $scalars:ident, ctx) => {
        $ctx
    };
    ($ctx:ident, $sink:ident, $scalars:ident, sink) => {
        &mut *$sink
    };
    ($ctx:ident, $sink:ident, $scalars:ident, $name:ident: str) => {
        match $scalars.next() {
            ::std::option::Option::Some($crate::ScalarValue::Str(value)) => value.clone(),
            other => {
                return ::std::result::Result::Err($crate::Error::Binding(::std::format!(
                    "expected string for `{}`, got {:?}",
                    ::std::stringify!($name),
                    other,
                )))
            }
        }
    };
    ($ctx:ident, $sink:ident, $scalars:ident, $name:ident: int) => {
        match $scalars.next() {
            ::std::option::Option::Some($crate::ScalarValue::Int(value)) => *value,
            other => {
                return ::std::result::Result::Err($crate::Error::Binding(::std::format!(
                    "expected integer for `{}`, got {:?}",
                    ::std::stringify!($name),
                    other,
                )))
            }
        }
    };
}

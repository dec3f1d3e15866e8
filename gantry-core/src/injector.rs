// Dependency injection phase and the write-once injection slot

use crate::catalog::InjectionEntry;
use crate::container::Container;
use crate::metadata::qualified_name;
use crate::Error;
use std::sync::{Arc, OnceLock};
use tracing::{trace, warn};

/// A declared dependency slot. Components hold one per injected field; the
/// injector binds it exactly once after every bean exists. Reading an
/// unbound slot is the deferred missing-dependency fault.
pub struct Inject<T: ?Sized> {
    slot: OnceLock<Arc<T>>,
}

impl<T: ?Sized> Inject<T> {
    pub const fn unbound() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// Binds the slot; a second bind is an injection error.
    pub fn bind(&self, value: Arc<T>) -> Result<(), Error> {
        self.slot.set(value).map_err(|_| {
            Error::Injection(format!(
                "slot of {} already bound",
                qualified_name(std::any::type_name::<T>())
            ))
        })
    }

    pub fn is_bound(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn get(&self) -> Result<&Arc<T>, Error> {
        self.slot.get().ok_or_else(|| {
            Error::MissingDependency(
                qualified_name(std::any::type_name::<T>()).to_string(),
            )
        })
    }
}

impl<T: ?Sized> Default for Inject<T> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<T: ?Sized> std::fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inject")
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// An injection site whose dependency could not be wired. Non-fatal: the
/// slot stays unbound and the fault surfaces when a handler first reads it.
#[derive(Debug, Clone)]
pub struct InjectionGap {
    pub owner: &'static str,
    pub field: &'static str,
    pub target: &'static str,
    pub reason: String,
}

/// Wires every declared injection site of every constructed bean from the
/// registry. Best-effort per field: unresolved or mis-typed targets are
/// reported as gaps, never as build failures. Runs once, after all beans
/// exist, so registration order never matters.
pub fn inject(container: &Container) -> Vec<InjectionGap> {
    let mut gaps = Vec::new();

    for instance in container.instances() {
        let mut sites: Vec<&'static InjectionEntry> = inventory::iter::<InjectionEntry>
            .into_iter()
            .filter(|site| site.owner_type_id == instance.type_id)
            .collect();
        sites.sort_by_key(|site| site.field);

        for site in sites {
            match container.get(site.target) {
                Some(dependency) => match (site.apply)(&instance.handle, dependency) {
                    Ok(()) => {
                        trace!(
                            bean = instance.type_name,
                            field = site.field,
                            target = site.target,
                            "dependency injected"
                        );
                    }
                    Err(e) => {
                        warn!(
                            bean = instance.type_name,
                            field = site.field,
                            target = site.target,
                            error = %e,
                            "injection failed, slot left unbound"
                        );
                        gaps.push(InjectionGap {
                            owner: instance.type_name,
                            field: site.field,
                            target: site.target,
                            reason: e.to_string(),
                        });
                    }
                },
                None => {
                    warn!(
                        bean = instance.type_name,
                        field = site.field,
                        target = site.target,
                        "no bean under target name, slot left unbound"
                    );
                    gaps.push(InjectionGap {
                        owner: instance.type_name,
                        field: site.field,
                        target: site.target,
                        reason: "no bean under target name".to_string(),
                    });
                }
            }
        }
    }

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;

    pub trait Greeter: Send + Sync {
        fn hello(&self) -> String;
    }

    mod wired {
        use super::Greeter;
        use crate::Inject;

        #[derive(Default)]
        pub struct HelloService;

        impl Greeter for HelloService {
            fn hello(&self) -> String {
                "hello".to_string()
            }
        }

        #[derive(Default)]
        pub struct FrontController {
            pub greeter: Inject<dyn Greeter>,
        }

        register_service!(HelloService, implements: [super::Greeter]);
        register_controller!(FrontController, base_path: "/front");
        register_inject!(FrontController, greeter: dyn super::Greeter);

        pub const NS: &str = module_path!();
    }

    mod gappy {
        use super::Greeter;
        use crate::Inject;

        #[derive(Default)]
        pub struct LonelyController {
            pub greeter: Inject<dyn Greeter>,
        }

        register_controller!(LonelyController, base_path: "/lonely");
        register_inject!(LonelyController, greeter: dyn super::Greeter, name: "absentGreeter");

        pub const NS: &str = module_path!();
    }

    fn interface_name() -> String {
        format!("{}::injector::tests::Greeter", env!("CARGO_CRATE_NAME"))
    }

    #[test]
    fn injected_slot_shares_the_registry_instance() {
        let entries = scan(wired::NS).unwrap();
        let container = Container::build(&entries).unwrap();
        let gaps = inject(&container);
        assert!(gaps.is_empty());

        let controller = container
            .bean::<wired::FrontController>("frontController")
            .unwrap();
        let registered = container.facet::<dyn Greeter>(&interface_name()).unwrap();
        let bound = controller.greeter.get().unwrap();
        assert!(Arc::ptr_eq(bound, &registered));
        assert_eq!(bound.hello(), "hello");
    }

    #[test]
    fn missing_target_is_a_gap_not_a_failure() {
        let entries = scan(gappy::NS).unwrap();
        let container = Container::build(&entries).unwrap();
        let gaps = inject(&container);

        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].field, "greeter");
        assert_eq!(gaps[0].target, "absentGreeter");

        let controller = container
            .bean::<gappy::LonelyController>("lonelyController")
            .unwrap();
        assert!(!controller.greeter.is_bound());
        assert!(matches!(
            controller.greeter.get(),
            Err(Error::MissingDependency(_))
        ));
    }

    #[test]
    fn slot_rejects_a_second_bind() {
        let slot: Inject<str> = Inject::unbound();
        slot.bind(Arc::from("one")).unwrap();
        let err = slot.bind(Arc::from("two")).unwrap_err();
        assert!(matches!(err, Error::Injection(_)));
        assert_eq!(slot.get().unwrap().as_ref(), "one");
    }
}

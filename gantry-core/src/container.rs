// Bean registry built from scanned catalog entries

use crate::catalog::{BeanHandle, ComponentEntry};
use crate::metadata::{bean_name_for_type, ComponentRole};
use crate::Error;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// One constructed component, tracked separately from its registry names so
/// the injector visits each instance exactly once.
pub(crate) struct ConstructedBean {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub handle: BeanHandle,
}

/// The bean registry. Built once during startup, read-only afterwards.
pub struct Container {
    beans: HashMap<String, BeanHandle>,
    instances: Vec<ConstructedBean>,
}

impl Container {
    /// Instantiates every `Controller` and `Service` entry and indexes the
    /// instances by derived bean name. Entries with role `Other` are
    /// skipped. Any constructor failure or name collision fails the whole
    /// build; a half-populated registry is never returned.
    pub fn build(entries: &[&'static ComponentEntry]) -> Result<Self, Error> {
        let mut container = Self {
            beans: HashMap::new(),
            instances: Vec::new(),
        };

        for entry in entries {
            match entry.role {
                ComponentRole::Controller => {
                    let handle = construct(entry)?;
                    let name = bean_name_for_type(entry.type_name);
                    container.insert(name, handle.clone())?;
                    container.track(entry, handle);
                }
                ComponentRole::Service => {
                    let handle = construct(entry)?;
                    if let Some(name) = entry.bean_name {
                        container.insert(name.to_string(), handle.clone())?;
                        container.track(entry, handle);
                    } else {
                        let facets = (entry.facets)();
                        if facets.is_empty() {
                            tracing::warn!(
                                component = entry.type_name,
                                "service exposes no name and no interfaces, dropping instance"
                            );
                            continue;
                        }
                        for facet in &facets {
                            let iface_handle = (facet.cast)(&handle)
                                .map_err(|e| instantiation_error(entry.type_name, &e))?;
                            container.insert(facet.interface_name.to_string(), iface_handle)?;
                        }
                        container.track(entry, handle);
                    }
                }
                ComponentRole::Other => {
                    tracing::trace!(component = entry.type_name, "no role marker, skipped");
                }
            }
        }

        tracing::debug!(beans = container.beans.len(), "bean registry built");
        Ok(container)
    }

    fn insert(&mut self, name: String, handle: BeanHandle) -> Result<(), Error> {
        if self.beans.contains_key(&name) {
            return Err(Error::BeanNameConflict(name));
        }
        tracing::trace!(bean = %name, "bean registered");
        self.beans.insert(name, handle);
        Ok(())
    }

    fn track(&mut self, entry: &ComponentEntry, handle: BeanHandle) {
        self.instances.push(ConstructedBean {
            type_id: entry.type_id,
            type_name: entry.type_name,
            handle,
        });
    }

    /// Looks up a bean handle by name.
    pub fn get(&self, name: &str) -> Option<&BeanHandle> {
        self.beans.get(name)
    }

    /// Resolves a bean registered under its concrete type.
    pub fn bean<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.beans
            .get(name)
            .and_then(|handle| handle.clone().downcast::<T>().ok())
    }

    /// Resolves a service facet registered under an interface name.
    pub fn facet<T: ?Sized + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.beans
            .get(name)
            .and_then(|handle| handle.downcast_ref::<Arc<T>>())
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.beans.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }

    /// Registered bean names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.beans.keys().map(String::as_str)
    }

    pub(crate) fn instances(&self) -> &[ConstructedBean] {
        &self.instances
    }
}

fn construct(entry: &ComponentEntry) -> Result<BeanHandle, Error> {
    (entry.construct)().map_err(|e| instantiation_error(entry.type_name, &e))
}

fn instantiation_error(type_name: &str, cause: &Error) -> Error {
    Error::Instantiation(format!("{type_name}: {cause}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;

    pub trait Sound: Send + Sync {
        fn noise(&self) -> &'static str;
    }

    mod zoo {
        use super::Sound;

        #[derive(Default)]
        pub struct EchoController;

        #[derive(Default)]
        pub struct BarkService;

        impl Sound for BarkService {
            fn noise(&self) -> &'static str {
                "bark"
            }
        }

        #[derive(Default)]
        pub struct NamedService;

        #[derive(Default)]
        pub struct Unmarked;

        register_controller!(EchoController, base_path: "/echo");
        register_service!(BarkService, implements: [super::Sound]);
        register_service!(NamedService, name: "namedService");
        register_other!(Unmarked);

        pub const NS: &str = module_path!();
    }

    mod broken {
        #[derive(Default)]
        pub struct FussyService;

        fn refuse() -> Result<FussyService, crate::Error> {
            Err(crate::Error::Dispatch("constructor refused".into()))
        }

        register_service!(FussyService, name: "fussyService", construct: refuse);

        pub const NS: &str = module_path!();
    }

    mod clashing {
        use super::Sound;

        #[derive(Default)]
        pub struct GrowlService;

        #[derive(Default)]
        pub struct HissService;

        impl Sound for GrowlService {
            fn noise(&self) -> &'static str {
                "growl"
            }
        }

        impl Sound for HissService {
            fn noise(&self) -> &'static str {
                "hiss"
            }
        }

        // Both claim the Sound interface name.
        register_service!(GrowlService, implements: [super::Sound]);
        register_service!(HissService, implements: [super::Sound]);

        pub const NS: &str = module_path!();
    }

    #[test]
    fn marked_types_become_beans_and_unmarked_are_skipped() {
        let entries = scan(zoo::NS).unwrap();
        let container = Container::build(&entries).unwrap();

        assert_eq!(container.len(), 3);
        assert!(container.contains("echoController"));
        assert!(container.contains("namedService"));
        assert!(container.contains(&format!(
            "{}::container::tests::Sound",
            env!("CARGO_CRATE_NAME")
        )));
    }

    #[test]
    fn facet_resolves_to_the_interface() {
        let entries = scan(zoo::NS).unwrap();
        let container = Container::build(&entries).unwrap();

        let name = format!("{}::container::tests::Sound", env!("CARGO_CRATE_NAME"));
        let sound = container.facet::<dyn Sound>(&name).unwrap();
        assert_eq!(sound.noise(), "bark");
    }

    #[test]
    fn typed_bean_lookup_downcasts() {
        let entries = scan(zoo::NS).unwrap();
        let container = Container::build(&entries).unwrap();

        assert!(container.bean::<zoo::NamedService>("namedService").is_some());
        assert!(container.bean::<zoo::EchoController>("namedService").is_none());
    }

    #[test]
    fn constructor_failure_fails_the_whole_build() {
        let entries = scan(broken::NS).unwrap();
        let err = Container::build(&entries).unwrap_err();
        match err {
            Error::Instantiation(msg) => assert!(msg.contains("FussyService")),
            other => panic!("expected Instantiation, got {other}"),
        }
    }

    #[test]
    fn bean_name_collision_is_a_startup_fault() {
        // Legacy containers silently kept the last registration; here the
        // collision aborts the build instead.
        let entries = scan(clashing::NS).unwrap();
        let err = Container::build(&entries).unwrap_err();
        assert!(matches!(err, Error::BeanNameConflict(_)));
    }
}

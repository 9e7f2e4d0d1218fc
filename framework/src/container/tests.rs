use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use pretty_assertions::assert_eq;

use super::*;
use crate::{injectable, service, Injectable};

fn same<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// `unwrap_err` without requiring `T: Debug`
fn failure<T: ?Sized>(result: Result<Arc<T>>) -> InjectorError {
    match result {
        Ok(_) => panic!("expected resolution to fail"),
        Err(e) => e,
    }
}

#[service(List, Array)]
trait Collection {
    fn kind(&self) -> &'static str;
}

#[derive(Injectable)]
struct List;

impl Collection for List {
    fn kind(&self) -> &'static str {
        "list"
    }
}

#[derive(Injectable)]
struct Array;

impl Collection for Array {
    fn kind(&self) -> &'static str {
        "array"
    }
}

/// Single constructor taking a `dyn Collection`
struct Shelf {
    items: Arc<dyn Collection>,
}

#[injectable]
impl Shelf {
    pub fn new(items: Arc<dyn Collection>) -> Self {
        Self { items }
    }
}

/// Not constructible: no descriptor anywhere
struct Opaque;

#[test]
fn test_instance_binding_returns_same_object() {
    let injector = Injector::create(|binder| {
        binder.bind::<String>().to_instance("shared".to_string());
    })
    .unwrap();

    let first = injector.get_instance::<String>().unwrap();
    let second = injector.get_instance::<String>().unwrap();
    assert_eq!(*first, "shared");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_singleton_built_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let injector = Injector::create(move |binder| {
        binder
            .bind::<Vec<u32>>()
            .to_provider(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Arc::new(vec![1, 2, 3])
            })
            .as_singleton();
    })
    .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let first = injector.get_instance::<Vec<u32>>().unwrap();
    let second = injector.get_instance::<Vec<u32>>().unwrap();
    let third = injector.get_instance::<Vec<u32>>().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &third));
}

#[test]
fn test_singleton_concurrent_first_access() {
    const THREADS: usize = 8;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let injector = Injector::create(move |binder| {
        binder
            .bind::<Vec<u64>>()
            .to_provider(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                thread::sleep(std::time::Duration::from_millis(10));
                Arc::new(vec![7_u64])
            })
            .as_singleton();
    })
    .unwrap();

    let barrier = &Barrier::new(THREADS);
    let injector = &injector;
    let resolved: Vec<Arc<Vec<u64>>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(move || {
                    barrier.wait();
                    injector.get_instance::<Vec<u64>>().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(resolved.iter().all(|v| Arc::ptr_eq(v, &resolved[0])));
}

#[test]
fn test_alias_shares_singleton_with_concrete_type() {
    let injector = Injector::create(|binder| {
        binder.bind::<dyn Collection>().to::<List>().as_singleton();
    })
    .unwrap();

    let abstract_view = injector.get_instance::<dyn Collection>().unwrap();
    let concrete = injector.get_instance::<List>().unwrap();

    assert_eq!(abstract_view.kind(), "list");
    assert!(same(&abstract_view, &concrete));
    assert!(injector.is_bound::<dyn Collection>(ScopeKey::DEFAULT));
    assert!(injector.is_bound::<List>(ScopeKey::DEFAULT));
}

#[test]
fn test_scopes_override_and_fall_back() {
    let injector = Injector::create(|binder| {
        binder.bind::<dyn Collection>().to::<List>().as_singleton();
        binder.bind::<String>().to_instance("global".to_string());
        binder
            .bind::<dyn Collection>()
            .to::<Array>()
            .for_scope("other")
            .as_singleton();
        binder
            .bind::<Vec<u8>>()
            .for_scope("other")
            .to_instance(vec![1_u8]);
    })
    .unwrap();

    let default = injector.get_instance::<dyn Collection>().unwrap();
    let other = injector.get_instance_in::<dyn Collection>("other").unwrap();
    assert_eq!(default.kind(), "list");
    assert_eq!(other.kind(), "array");
    assert!(!same(&default, &other));

    // Repeated lookups in one scope share the scope's singleton
    let again = injector.get_instance_in::<dyn Collection>("other").unwrap();
    assert!(Arc::ptr_eq(&other, &again));

    // Unbound in "other": the default binding answers
    let global = injector.get_instance::<String>().unwrap();
    let fallback = injector.get_instance_in::<String>("other").unwrap();
    assert!(Arc::ptr_eq(&global, &fallback));

    // Bound only in "other": invisible from sibling scopes and the default
    assert_eq!(*injector.get_instance_in::<Vec<u8>>("other").unwrap(), vec![1_u8]);
    let sibling = failure(injector.get_instance_in::<Vec<u8>>("unrelated"));
    assert!(matches!(sibling, InjectorError::NotConstructible { .. }));
    assert!(matches!(
        failure(injector.get_instance::<Vec<u8>>()),
        InjectorError::NotConstructible { .. }
    ));
    let unrelated = injector.get_instance_in::<dyn Collection>("unrelated").unwrap();
    assert!(same(&unrelated, &default));

    assert_eq!(
        injector.scopes(),
        vec![ScopeKey::DEFAULT, ScopeKey::from("other")]
    );
}

#[test]
fn test_same_provider_type_distinct_per_scope() {
    let injector = Injector::create(|binder| {
        binder
            .bind::<Vec<String>>()
            .to_provider(|cx| Arc::new(vec![cx.scope().to_string()]))
            .as_singleton();
        binder
            .bind::<Vec<String>>()
            .to_provider(|cx| Arc::new(vec![cx.scope().to_string()]))
            .for_scope("request")
            .as_singleton();
    })
    .unwrap();

    let default = injector.get_instance::<Vec<String>>().unwrap();
    let request = injector.get_instance_in::<Vec<String>>("request").unwrap();
    assert_eq!(*default, vec![ScopeKey::DEFAULT.to_string()]);
    assert_eq!(*request, vec!["request".to_string()]);
}

#[test]
fn test_implicit_construction_uses_bindings() {
    let injector = Injector::create(|binder| {
        binder.bind::<dyn Collection>().to::<List>().as_singleton();
    })
    .unwrap();

    let shelf = injector.get_instance::<Shelf>().unwrap();
    let items = injector.get_instance::<dyn Collection>().unwrap();
    assert_eq!(shelf.items.kind(), "list");
    assert!(same(&shelf.items, &items));
    assert!(!injector.is_bound::<Shelf>(ScopeKey::DEFAULT));

    // Implicitly constructed objects are not cached
    let other = injector.get_instance::<Shelf>().unwrap();
    assert!(!Arc::ptr_eq(&shelf, &other));
}

#[test]
fn test_implicit_construction_follows_requested_scope() {
    let injector = Injector::create(|binder| {
        binder.bind::<dyn Collection>().to::<List>().as_singleton();
        binder
            .bind::<dyn Collection>()
            .to::<Array>()
            .for_scope("other")
            .as_singleton();
    })
    .unwrap();

    let shelf = injector.get_instance_in::<Shelf>("other").unwrap();
    assert_eq!(shelf.items.kind(), "array");
}

#[test]
fn test_implicit_construction_failure_is_unresolved() {
    let injector = Injector::create(|_binder| {}).unwrap();

    let err = failure(injector.get_instance::<Shelf>());
    assert!(err.is_unresolved());
    match err {
        InjectorError::Unresolved { source, scope, .. } => {
            assert_eq!(scope, ScopeKey::DEFAULT);
            assert!(matches!(*source, InjectorError::Instantiation { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unconstructible_type_is_not_constructible() {
    let injector = Injector::create(|_binder| {}).unwrap();

    let err = failure(injector.get_instance_in::<Opaque>("request"));
    assert!(matches!(err, InjectorError::NotConstructible { .. }));
    assert!(err.is_unresolved());
    assert!(err.to_string().contains("scope request"));
}

#[test]
fn test_duplicate_binding_in_one_scope_fails() {
    let err = Injector::create(|binder| {
        binder.bind::<dyn Collection>().to::<List>().as_singleton();
        binder.bind::<dyn Collection>().to::<Array>().as_singleton();
    })
    .unwrap_err();
    assert!(matches!(err, InjectorError::DuplicateBinding { .. }));

    // Alias target collides with an explicit binding of the concrete type
    let err = Injector::create(|binder| {
        binder.bind::<List>().as_singleton();
        binder.bind::<dyn Collection>().to::<List>().as_singleton();
    })
    .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_same_type_in_different_scopes_is_allowed() {
    let injector = Injector::create(|binder| {
        binder.bind::<u16>().to_instance(80_u16);
        binder.bind::<u16>().for_scope("admin").to_instance(8080_u16);
    });
    assert!(injector.is_ok());
}

#[test]
fn test_unsupported_bindings_fail_configuration() {
    let err = Injector::create(|binder| {
        binder.bind::<String>();
    })
    .unwrap_err();
    assert!(matches!(err, InjectorError::UnsupportedBinding { .. }));

    let err = Injector::create(|binder| {
        binder.bind::<dyn Collection>().to::<List>();
    })
    .unwrap_err();
    assert!(matches!(err, InjectorError::UnsupportedBinding { .. }));

    let err = Injector::create(|binder| {
        binder
            .bind::<dyn Collection>()
            .to_provider(|_| Arc::new(List) as Arc<dyn Collection>)
            .to::<List>()
            .as_singleton();
    })
    .unwrap_err();
    assert!(matches!(err, InjectorError::UnsupportedBinding { .. }));
}

#[test]
fn test_alias_provider_singleton_shared_under_both_keys() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let injector = Injector::create(move |binder| {
        binder
            .bind::<dyn Collection>()
            .to::<List>()
            .to_provider(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Arc::new(List)
            })
            .as_singleton();
    })
    .unwrap();

    let abstract_ = injector.get_instance::<dyn Collection>().unwrap();
    let concrete = injector.get_instance::<List>().unwrap();
    assert_eq!(abstract_.kind(), "list");
    assert!(same(&abstract_, &concrete));
    assert!(same(&injector.get_instance::<dyn Collection>().unwrap(), &concrete));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(injector.is_bound::<List>(ScopeKey::DEFAULT));
}

#[derive(Injectable)]
struct Lookup {
    #[inject]
    resolver: Arc<dyn Resolver>,
    #[inject]
    injector: Arc<Injector>,
    hits: AtomicUsize,
}

#[test]
fn test_injector_is_injectable() {
    let injector = Injector::create(|binder| {
        binder.bind::<String>().to_instance("found".to_string());
    })
    .unwrap();

    let itself = injector.get_instance::<Injector>().unwrap();
    let resolver = injector.get_instance::<dyn Resolver>().unwrap();
    assert!(Arc::ptr_eq(&itself, &injector));
    assert_eq!(*resolver.get::<String>().unwrap(), "found");
    assert!(same(&resolver, &injector.get_instance::<dyn Resolver>().unwrap()));

    let lookup = injector.get_instance::<Lookup>().unwrap();
    lookup.hits.fetch_add(1, Ordering::SeqCst);
    assert_eq!(*lookup.resolver.get::<String>().unwrap(), "found");
    assert!(Arc::ptr_eq(&lookup.injector, &injector));
    assert_eq!(lookup.hits.load(Ordering::SeqCst), 1);
}

#[derive(Injectable)]
struct HoldsResolver {
    #[inject]
    resolver: Arc<dyn Resolver>,
}

#[derive(Injectable)]
struct HoldsInjector {
    #[inject]
    injector: Arc<Injector>,
}

#[test]
fn test_singleton_holding_resolver_does_not_keep_injector_alive() {
    let injector = Injector::create(|binder| {
        binder.bind::<String>().to_instance("found".to_string());
        binder.bind::<HoldsResolver>().as_singleton();
    })
    .unwrap();

    let held = injector.get_instance::<HoldsResolver>().unwrap();
    assert_eq!(*held.resolver.get::<String>().unwrap(), "found");

    let weak = Arc::downgrade(&injector);
    drop(injector);
    assert!(weak.upgrade().is_none());

    let err = failure(held.resolver.get::<String>());
    assert!(matches!(err, InjectorError::Dropped { .. }));
    assert!(held.resolver.dump().is_empty());
}

#[test]
fn test_singleton_holding_injector_keeps_it_alive() {
    let injector = Injector::create(|binder| {
        binder.bind::<HoldsInjector>().as_singleton();
    })
    .unwrap();

    let held = injector.get_instance::<HoldsInjector>().unwrap();
    assert!(Arc::ptr_eq(&held.injector, &injector));

    // The singleton cache holds the injector, which holds the cache
    let weak = Arc::downgrade(&injector);
    drop(held);
    drop(injector);
    assert!(weak.upgrade().is_some());
}

#[test]
fn test_injector_cannot_be_rebound() {
    let err = Injector::create(|binder| {
        binder.bind::<dyn Resolver>().to_instance(Arc::new(Opaque) as Arc<dyn Resolver>);
    })
    .unwrap_err();
    assert!(matches!(err, InjectorError::DuplicateBinding { .. }));
}

impl Resolver for Opaque {
    fn resolve(&self, scope: &ScopeKey, key: TypeKey) -> Result<Instance> {
        Err(InjectorError::not_constructible(key, scope))
    }

    fn dump(&self) -> Vec<String> {
        Vec::new()
    }
}

#[test]
fn test_provider_returning_nothing_is_null_resolution() {
    let injector = Injector::create(|binder| {
        binder
            .bind::<String>()
            .to_provider(|_| None::<Arc<String>>)
            .as_singleton();
    })
    .unwrap();

    let err = injector.get_instance::<String>().unwrap_err();
    assert!(matches!(err, InjectorError::NullResolution { .. }));
    assert!(!err.is_unresolved());
}

#[test]
fn test_failed_singleton_is_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let injector = Injector::create(move |binder| {
        binder
            .bind::<String>()
            .to_provider(move |_| -> std::result::Result<Arc<String>, String> {
                match counter.fetch_add(1, Ordering::SeqCst) {
                    0 => Err("database not ready".to_string()),
                    _ => Ok(Arc::new("connected".to_string())),
                }
            })
            .as_singleton();
    })
    .unwrap();

    let err = injector.get_instance::<String>().unwrap_err();
    assert!(matches!(err, InjectorError::Instantiation { .. }));

    let first = injector.get_instance::<String>().unwrap();
    let second = injector.get_instance::<String>().unwrap();
    assert_eq!(*first, "connected");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_provider_resolves_in_binding_scope() {
    let injector = Injector::create(|binder| {
        binder.bind::<u16>().to_instance(80_u16);
        binder.bind::<u16>().for_scope("admin").to_instance(8443_u16);
        binder
            .bind::<String>()
            .to_provider(|cx| -> Result<Arc<String>> {
                Ok(Arc::new(format!("port {}", cx.get::<u16>()?)))
            })
            .for_scope("admin")
            .as_singleton();
    })
    .unwrap();

    assert_eq!(*injector.get_instance_in::<String>("admin").unwrap(), "port 8443");
    assert!(injector.get_instance::<String>().is_err());
}

struct Greeting {
    text: String,
}

#[injectable]
impl Greeting {
    pub fn named(name: Arc<String>) -> Self {
        Self {
            text: format!("hello {}", name),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            text: "hello".to_string(),
        }
    }

    #[injectable(skip)]
    pub fn shouting(name: &str) -> Self {
        Self {
            text: format!("HELLO {}", name.to_uppercase()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[test]
fn test_first_declared_constructor_is_used() {
    let constructors = Greeting::constructors();
    let names: Vec<&str> = constructors.iter().map(Constructor::name).collect();
    assert_eq!(names, vec!["Greeting::named", "Greeting::anonymous"]);

    let injector = Injector::create(|binder| {
        binder.bind::<String>().to_instance("weave".to_string());
    })
    .unwrap();
    assert_eq!(injector.get_instance::<Greeting>().unwrap().text(), "hello weave");

    // The first constructor cannot be satisfied; the second is not tried
    let empty = Injector::create(|_binder| {}).unwrap();
    assert!(failure(empty.get_instance::<Greeting>()).is_unresolved());
    assert_eq!(Greeting::shouting("x").text(), "HELLO X");
}

struct Port(u16);

#[injectable]
impl Port {
    pub fn parse(raw: Arc<String>) -> std::result::Result<Self, std::num::ParseIntError> {
        raw.parse().map(Port)
    }
}

#[test]
fn test_fallible_constructor() {
    let good = Injector::create(|binder| {
        binder.bind::<String>().to_instance("8080".to_string());
        binder.bind::<Port>().as_singleton();
    })
    .unwrap();
    assert_eq!(good.get_instance::<Port>().unwrap().0, 8080);

    let bad = Injector::create(|binder| {
        binder.bind::<String>().to_instance("eighty".to_string());
        binder.bind::<Port>().as_singleton();
    })
    .unwrap();
    let err = failure(bad.get_instance::<Port>());
    assert!(matches!(err, InjectorError::Instantiation { .. }));
}

/// Only constructible when registered on the binder
struct Manual {
    label: Arc<String>,
}

impl crate::container::Injectable for Manual {
    fn constructors() -> Vec<Constructor> {
        vec![Constructor::new::<Manual, _>(
            "Manual::new",
            vec![TypeKey::of::<String>()],
            |args| Ok(Manual { label: args.next()? }),
        )]
    }
}

#[test]
fn test_binder_registered_constructor() {
    let unregistered = Injector::create(|binder| {
        binder.bind::<String>().to_instance("local".to_string());
    })
    .unwrap();
    assert!(matches!(
        failure(unregistered.get_instance::<Manual>()),
        InjectorError::NotConstructible { .. }
    ));

    let injector = Injector::create(|binder| {
        binder.bind::<String>().to_instance("local".to_string());
        binder.register::<Manual>();
    })
    .unwrap();
    assert_eq!(*injector.get_instance::<Manual>().unwrap().label, "local");
}

#[test]
fn test_debug_records_resolved_graph() {
    let config = InjectorConfig::new().debug(true);
    let injector = Injector::create_with(config, |binder| {
        binder.bind::<dyn Collection>().to::<List>().as_singleton();
    })
    .unwrap();
    assert!(injector.is_debug());

    injector.get_instance::<Shelf>().unwrap();
    injector.get_instance::<Shelf>().unwrap();

    let records = injector.records();
    let collection = records
        .iter()
        .find(|r| r.requested == TypeKey::of::<dyn Collection>())
        .unwrap();
    assert!(collection.explicit);
    assert_eq!(collection.implementation, TypeKey::of::<List>());

    let shelves: Vec<_> = records
        .iter()
        .filter(|r| r.requested == TypeKey::of::<Shelf>())
        .collect();
    assert_eq!(shelves.len(), 2);
    assert!(!shelves[0].explicit);
    assert_eq!(shelves[0].dependencies, vec![TypeKey::of::<dyn Collection>()]);

    assert_eq!(
        injector.dump(),
        vec![
            "@startuml",
            "hide empty methods",
            "hide empty fields",
            "interface Collection",
            "List .up.|> Collection",
            "Shelf o-down- Collection",
            "@enduml",
        ]
    );
}

#[test]
fn test_records_empty_without_debug() {
    let injector = Injector::create(|binder| {
        binder.bind::<dyn Collection>().to::<List>().as_singleton();
    })
    .unwrap();
    injector.get_instance::<Shelf>().unwrap();

    assert!(!injector.is_debug());
    assert!(injector.records().is_empty());
    assert_eq!(injector.dump().len(), 4);
}

#[test]
fn test_modules_configure_one_injector() {
    fn storage(binder: &mut Binder) {
        binder.bind::<dyn Collection>().to::<Array>().as_singleton();
    }

    let injector = Injector::create(|binder| {
        binder.install(&storage);
        binder.bind::<String>().to_instance("app".to_string());
    })
    .unwrap();

    assert_eq!(injector.get_instance::<Shelf>().unwrap().items.kind(), "array");
}

#[test]
fn test_instance_and_provider_sequences() {
    let injector = Injector::create(|binder| {
        binder.bind::<Vec<String>>().to_instance(Vec::<String>::new());
        binder
            .bind::<Vec<&'static str>>()
            .to_provider(|_| Arc::new(vec!["provider!"]))
            .as_singleton();
    })
    .unwrap();

    assert!(injector.get_instance::<Vec<String>>().unwrap().is_empty());
    assert_eq!(
        *injector.get_instance::<Vec<&'static str>>().unwrap(),
        vec!["provider!"]
    );
}

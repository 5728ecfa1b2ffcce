use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use elif_container::{
    Arguments, Concrete, ConstructorParam, Container, ContainerBuilder, ContainerConfig,
    ContainerError, ErrorKind, Injectable, Instance, ServiceId,
};

#[derive(Debug)]
struct Chicken;

impl Injectable for Chicken {
    fn constructor() -> Vec<ConstructorParam> {
        vec![ConstructorParam::service::<Egg>("egg")]
    }

    fn construct(_args: &Arguments) -> Result<Self, ContainerError> {
        Ok(Chicken)
    }
}

struct Egg;

impl Injectable for Egg {
    fn constructor() -> Vec<ConstructorParam> {
        vec![ConstructorParam::service::<Chicken>("chicken")]
    }

    fn construct(_args: &Arguments) -> Result<Self, ContainerError> {
        Ok(Egg)
    }
}

#[derive(Debug)]
struct Ouroboros;

impl Injectable for Ouroboros {
    fn constructor() -> Vec<ConstructorParam> {
        vec![ConstructorParam::service::<Ouroboros>("tail")]
    }

    fn construct(_args: &Arguments) -> Result<Self, ContainerError> {
        Ok(Ouroboros)
    }
}

#[derive(Debug)]
struct Clock {
    ticks: u64,
}

impl Injectable for Clock {
    fn construct(_args: &Arguments) -> Result<Self, ContainerError> {
        Ok(Clock { ticks: 0 })
    }
}

#[derive(Debug)]
struct Scheduler {
    clock: Arc<Clock>,
}

impl Injectable for Scheduler {
    fn constructor() -> Vec<ConstructorParam> {
        vec![ConstructorParam::service::<Clock>("clock")]
    }

    fn construct(args: &Arguments) -> Result<Self, ContainerError> {
        Ok(Scheduler {
            clock: args.service("clock")?,
        })
    }
}

#[derive(Debug)]
struct Worker;

impl Injectable for Worker {
    fn constructor() -> Vec<ConstructorParam> {
        vec![
            ConstructorParam::service::<Clock>("clock"),
            ConstructorParam::untyped("payload"),
        ]
    }

    fn construct(_args: &Arguments) -> Result<Self, ContainerError> {
        Ok(Worker)
    }
}

fn container() -> Container {
    let container = Container::new();
    container.register::<Chicken>().unwrap();
    container.register::<Egg>().unwrap();
    container.register::<Ouroboros>().unwrap();
    container.register::<Clock>().unwrap();
    container.register::<Scheduler>().unwrap();
    container.register::<Worker>().unwrap();
    container
}

#[test]
fn test_cyclic_constructor_dependencies_fail_fast() {
    let container = container();

    let err = container.make_as::<Chicken>().unwrap_err();
    match err {
        ContainerError::CyclicDependency { path, service } => {
            assert_eq!(service, ServiceId::of::<Chicken>().to_string());
            assert_eq!(path.matches(" -> ").count(), 2);
        }
        other => panic!("expected cyclic dependency, got {:?}", other),
    }

    let err = container.make_as::<Ouroboros>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CyclicDependency);
}

#[test]
fn test_cycles_through_factories_are_detected() {
    let container = container();
    container.bind_factory("ping", |resolver, _| resolver.make("pong")).unwrap();
    container.bind_factory("pong", |resolver, _| resolver.make("ping")).unwrap();

    let err = container.make("ping").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CyclicDependency);
    assert!(err.to_string().contains("ping -> pong -> ping"));
}

#[test]
fn test_cycle_through_bound_abstract() {
    let container = container();
    container
        .bind(ServiceId::of::<Clock>(), Some(Concrete::of::<Scheduler>()), false)
        .unwrap();

    let err = container.make_as::<Scheduler>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CyclicDependency);
}

#[test]
fn test_depth_limit() {
    let container = ContainerBuilder::new()
        .with_config(ContainerConfig {
            max_resolution_depth: 1,
            ..ContainerConfig::default()
        })
        .register::<Clock>()
        .register::<Scheduler>()
        .build()
        .unwrap();

    assert!(container.make_as::<Clock>().is_ok());
    let err = container.make_as::<Scheduler>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionFailed);
    assert!(err.to_string().contains("maximum resolution depth"));
}

#[test]
fn test_factories_see_the_resolution_stack() {
    let container = container();
    container
        .bind_factory("stack.depth", |resolver, _| {
            Ok(Instance::new(resolver.stack().len()))
        })
        .unwrap();
    container
        .bind_factory("outer", |resolver, _| resolver.make("stack.depth"))
        .unwrap();

    assert_eq!(*container.make_typed::<usize>("stack.depth").unwrap(), 1);
    assert_eq!(*container.make_typed::<usize>("outer").unwrap(), 2);
}

#[test]
fn test_transient_factory_delegating_to_its_own_type() {
    let container = container();
    container
        .bind_factory("app.clock", |resolver, _| resolver.make(ServiceId::of::<Clock>()))
        .unwrap();

    let first = container.make("app.clock").unwrap();
    let second = container.make("app.clock").unwrap();
    assert!(first.is::<Clock>());
    assert!(!first.ptr_eq(&second));
    assert!(!container.is_alias(ServiceId::of::<Clock>()));

    let direct = container.make_as::<Clock>().unwrap();
    assert_eq!(direct.ticks, 0);

    let scheduler = container.make_as::<Scheduler>().unwrap();
    assert_eq!(scheduler.clock.ticks, 0);
}

#[test]
fn test_failed_construction_keeps_resolved_dependencies() {
    let container = container();
    container.singleton(ServiceId::of::<Clock>(), None).unwrap();

    let err = container.make_as::<Worker>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingTypeHint);
    assert!(container.resolved(ServiceId::of::<Clock>()));
    assert!(!container.bound(ServiceId::of::<Worker>()));
}

#[test]
fn test_resolving_dependencies_leaves_requesting_binding_alone() {
    let container = container();
    container
        .bind("scheduler", Some(Concrete::of::<Scheduler>()), false)
        .unwrap();

    let first = container.make_typed::<Scheduler>("scheduler").unwrap();
    let second = container.make_typed::<Scheduler>("scheduler").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.clock.ticks, 0);
    assert!(matches!(
        container.make("scheduler").unwrap().downcast::<Clock>(),
        None
    ));
}

#[test]
fn test_bind_if_and_singleton_if_keep_existing() {
    let container = container();
    container
        .bind("clock", Some(Concrete::of::<Clock>()), false)
        .unwrap();
    container
        .bind_if("clock", Some(Concrete::of::<Scheduler>()), true)
        .unwrap();
    container
        .singleton_if("clock", Some(Concrete::of::<Scheduler>()))
        .unwrap();

    assert!(!container.is_shared("clock"));
    assert!(container.make_typed::<Clock>("clock").is_ok());

    container.singleton_if("timer", Some(Concrete::of::<Clock>())).unwrap();
    assert!(container.is_shared("timer"));
}

#[test]
fn test_rebinding_drops_stale_instance() {
    let container = container();
    container
        .singleton("clock", Some(Concrete::of::<Clock>()))
        .unwrap();
    let before = container.make("clock").unwrap();
    assert!(container.resolved("clock"));

    container
        .singleton("clock", Some(Concrete::of::<Clock>()))
        .unwrap();
    assert!(!container.resolved("clock"));

    let after = container.make("clock").unwrap();
    assert!(!before.ptr_eq(&after));
}

#[test]
fn test_fixed_instances_are_returned_unchanged() {
    let container = container();
    let clock = Instance::new(Clock { ticks: 99 });
    container.instance("clock", clock.clone()).unwrap();

    assert!(container.bound("clock"));
    assert!(container.resolved("clock"));
    let resolved = container.make("clock").unwrap();
    assert!(resolved.ptr_eq(&clock));
    assert_eq!(resolved.downcast::<Clock>().unwrap().ticks, 99);
}

#[test]
fn test_bound_resolved_and_has() {
    let container = container();
    container
        .singleton("clock", Some(Concrete::of::<Clock>()))
        .unwrap();
    container.alias("clock", "timer").unwrap();

    assert!(container.bound("clock"));
    assert!(!container.bound("timer"));
    assert!(container.has("timer"));
    assert!(!container.has("calendar"));

    assert!(!container.resolved("timer"));
    container.make("timer").unwrap();
    assert!(container.resolved("timer"));
    assert!(container.resolved("clock"));
}

#[test]
fn test_forget_and_flush() {
    let container = container();
    container
        .singleton("clock", Some(Concrete::of::<Clock>()))
        .unwrap();
    let first = container.make("clock").unwrap();

    container.forget_instance("clock").unwrap();
    assert!(!container.resolved("clock"));
    // the stored instance is still the binding's concrete
    assert!(container.make("clock").unwrap().ptr_eq(&first));

    container.flush().unwrap();
    assert!(!container.bound("clock"));
    assert!(container.bound_ids().unwrap().is_empty());
}

#[test]
fn test_concurrent_singleton_resolution_yields_one_instance() {
    let container = Arc::new(container());
    let constructed = Arc::new(AtomicUsize::new(0));

    let counter = constructed.clone();
    container
        .singleton_factory("clock", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Instance::new(Clock { ticks: 1 }))
        })
        .unwrap();

    let instances: Vec<Instance> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                scope.spawn(move || container.make("clock").unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = &instances[0];
    assert!(instances.iter().all(|instance| instance.ptr_eq(first)));
    assert!(constructed.load(Ordering::SeqCst) >= 1);
    assert!(container.make("clock").unwrap().ptr_eq(first));
}

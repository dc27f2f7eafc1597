//! Coordinator running against a host-owned state container.

use modalkit::store::{reduce, ExternalStore, ModalAction, ModalStore};
use modalkit::{ModalConfig, ModalContext, ModalError, MountedSet, OpenConfig, StateBackend};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

/// Minimal unidirectional-data-flow container: state plus an action log.
#[derive(Default)]
struct HostContainer {
    state: RefCell<Rc<ModalStore>>,
    log: RefCell<Vec<serde_json::Value>>,
}

fn external_context(host: &Rc<HostContainer>) -> ModalContext {
    let writer = Rc::clone(host);
    let reader = Rc::clone(host);
    let store = ExternalStore::new()
        .with_dispatch(move |action: &ModalAction, mounted| {
            writer
                .log
                .borrow_mut()
                .push(serde_json::to_value(action).unwrap_or_default());
            let next = reduce(&writer.state.borrow(), action, mounted);
            *writer.state.borrow_mut() = next;
        })
        .with_snapshot(move || Rc::clone(&*reader.state.borrow()));
    ModalContext::with_backend(ModalConfig::default(), store)
}

#[test]
fn actions_reach_the_host_container() {
    let host = Rc::new(HostContainer::default());
    let ctx = external_context(&host);
    let binding = ctx.mount("m1").unwrap();

    ctx.open("m1", OpenConfig::new().with_data_entry("x", json!(1)))
        .unwrap();
    binding.dismiss().unwrap();
    binding.on_animation_end().unwrap();

    let kinds: Vec<String> = host
        .log
        .borrow()
        .iter()
        .map(|entry| entry["type"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(kinds, ["modal/show", "modal/hide", "modal/remove"]);

    let log = host.log.borrow();
    let first = &log[0];
    assert_eq!(first["payload"]["modalId"], "m1");
    assert_eq!(first["payload"]["data"]["x"], 1);
    assert_eq!(first["payload"]["data"]["__modalConfig"]["disableClose"], false);
    assert!(host.state.borrow().is_empty());
}

#[test]
fn snapshot_reflects_host_state() {
    let host = Rc::new(HostContainer::default());
    let ctx = external_context(&host);
    let _binding = ctx.mount("m1").unwrap();

    ctx.open("m1", OpenConfig::new()).unwrap();
    let snapshot = ctx.snapshot().unwrap();
    assert!(Rc::ptr_eq(&snapshot, &*host.state.borrow()));
    assert!(snapshot.get(&"m1".into()).is_some_and(|s| s.is_open));
}

#[test]
fn missing_functions_are_usage_errors() {
    let ctx = ModalContext::with_backend(ModalConfig::default(), ExternalStore::new());

    assert!(matches!(
        ctx.open("m1", OpenConfig::new()),
        Err(ModalError::DispatchNotInstalled)
    ));
    assert!(matches!(ctx.snapshot(), Err(ModalError::SnapshotNotInstalled)));
    assert!(!ctx.has_open(), "a failed open leaves no lifecycle state");
}

#[test]
fn late_installation_is_honoured() {
    let host = Rc::new(HostContainer::default());
    let store = Rc::new(ExternalStore::new());

    let writer = Rc::clone(&host);
    store.install_dispatch(move |action, mounted| {
        let next = reduce(&writer.state.borrow(), action, mounted);
        *writer.state.borrow_mut() = next;
    });
    let reader = Rc::clone(&host);
    store.install_snapshot(move || Rc::clone(&*reader.state.borrow()));

    let ctx = ModalContext::with_backend(ModalConfig::default(), SharedStore(store));
    ctx.open("m1", OpenConfig::new()).unwrap();
    assert_eq!(host.state.borrow().len(), 1);
}

/// Lets the test keep a handle on the store it hands to the context.
struct SharedStore(Rc<ExternalStore>);

impl StateBackend for SharedStore {
    fn dispatch(&self, action: &ModalAction, mounted: &MountedSet) -> modalkit::Result<()> {
        self.0.dispatch(action, mounted)
    }

    fn snapshot(&self) -> modalkit::Result<Rc<ModalStore>> {
        self.0.snapshot()
    }
}

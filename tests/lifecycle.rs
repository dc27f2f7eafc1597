//! End-to-end lifecycle scenarios driven through bindings, the way a host
//! view layer would drive them.

use futures::executor::block_on;
use futures::FutureExt;
use modalkit::{
    AnimationPhase, LifecycleState, ModalComponent, ModalConfig, ModalContext, ModalId,
    OpenConfig, PURGE_DELAY,
};
use serde_json::json;
use std::rc::Rc;
use std::time::Instant;

struct Alert;
impl ModalComponent for Alert {
    fn name(&self) -> &str {
        "Alert"
    }
}

fn context() -> ModalContext {
    ModalContext::new(ModalConfig::default())
}

#[test]
fn open_close_exit_sequence() {
    let ctx = context();
    ctx.register("m1", Rc::new(Alert), None).unwrap();
    let binding = ctx.mount("m1").unwrap();

    let modal = ctx
        .open("m1", OpenConfig::new().with_data_entry("x", json!(1)))
        .unwrap();
    let state = ctx.modal_state(&ModalId::from("m1")).unwrap().unwrap();
    assert!(state.is_open);
    assert!(!state.delay_open);
    assert_eq!(binding.state().unwrap().data["x"], json!(1));

    ctx.close("m1").unwrap();
    assert_eq!(modal.state().unwrap(), Some(LifecycleState::Closing));

    binding.on_animation_end().unwrap();
    assert_eq!(modal.state().unwrap(), Some(LifecycleState::Closed));
    assert_eq!(block_on(modal.after_closed()), None);
}

#[test]
fn close_before_enter_finishes_delivers_result_once() {
    let ctx = context();
    ctx.register("m1", Rc::new(Alert), None).unwrap();
    let binding = ctx.mount("m1").unwrap();

    let modal = ctx.open("m1", OpenConfig::new()).unwrap();
    modal.close(Some(json!("early"))).unwrap();
    assert!(!modal.after_opened().is_settled());

    binding.on_animation_end().unwrap();
    assert_eq!(block_on(modal.after_closed()), Some(json!("early")));
    // Removal after exit settles the enter promise that never completed.
    assert_eq!(modal.after_opened().peek(), Some(None));

    // A second exit signal and a second close change nothing.
    ctx.notify_closed(modal.modal_id());
    modal.close(Some(json!("late"))).unwrap();
    assert_eq!(block_on(modal.after_closed()), Some(json!("early")));
    assert_eq!(block_on(modal.result()), Some(json!("early")));
}

#[test]
fn after_closed_is_stable_before_and_after_settlement() {
    let ctx = context();
    let binding = ctx.mount("m1").unwrap();
    let modal = ctx.open("m1", OpenConfig::new()).unwrap();

    let before = modal.after_closed();
    modal.close(Some(json!(5))).unwrap();
    binding.on_phase_end(AnimationPhase::Exit).unwrap();
    let after = modal.after_closed();

    assert_eq!(block_on(before), Some(json!(5)));
    assert_eq!(block_on(after), Some(json!(5)));
    assert_eq!(
        block_on(ctx.close("m1").unwrap()),
        Some(json!(5)),
        "closing a closed modal hands back the retained result"
    );
}

#[test]
fn close_all_waits_for_every_exit() {
    let ctx = context();
    let first = ctx.mount("a").unwrap();
    let second = ctx.mount("b").unwrap();
    let a = ctx.open("a", OpenConfig::new()).unwrap();
    let b = ctx.open("b", OpenConfig::new()).unwrap();

    let mut all = Box::pin(ctx.close_all().unwrap());
    assert_eq!(a.result().peek(), Some(None));
    assert_eq!(b.before_closed().peek(), Some(None));

    second.on_animation_end().unwrap();
    assert!(all.as_mut().now_or_never().is_none());

    first.on_animation_end().unwrap();
    assert!(all.as_mut().now_or_never().is_some());
    assert!(ctx.get_open().is_empty());
}

#[test]
fn close_all_keeps_result_of_close_already_in_flight() {
    let ctx = context();
    let first = ctx.mount("a").unwrap();
    let second = ctx.mount("b").unwrap();
    let a = ctx.open("a", OpenConfig::new()).unwrap();
    ctx.open("b", OpenConfig::new()).unwrap();

    a.close(Some(json!("x"))).unwrap();
    assert_eq!(a.state().unwrap(), Some(LifecycleState::Closing));

    let mut all = Box::pin(ctx.close_all().unwrap());
    second.on_animation_end().unwrap();
    assert!(all.as_mut().now_or_never().is_none());

    first.on_animation_end().unwrap();
    assert!(all.as_mut().now_or_never().is_some());
    assert_eq!(a.before_closed().peek(), Some(Some(json!("x"))));
    assert_eq!(a.after_closed().peek(), Some(Some(json!("x"))));
}

#[test]
fn close_all_with_nothing_open_completes() {
    let ctx = context();
    assert!(ctx.close_all().unwrap().now_or_never().is_some());
}

#[test]
fn remove_settles_pending_promises() {
    let ctx = context();
    let _binding = ctx.mount("m1").unwrap();
    let modal = ctx.open("m1", OpenConfig::new()).unwrap();

    ctx.remove("m1").unwrap();

    assert_eq!(modal.after_opened().peek(), Some(None));
    assert_eq!(modal.before_closed().peek(), Some(None));
    assert_eq!(modal.after_closed().peek(), Some(None));
    assert_eq!(modal.result().peek(), Some(None));
    assert_eq!(modal.state().unwrap(), None);
    assert!(ctx.snapshot().unwrap().is_empty());
}

#[test]
fn component_opened_twice_registers_once() {
    let ctx = context();
    let alert: modalkit::ComponentRef = Rc::new(Alert);

    let first = ctx.open(&alert, OpenConfig::new()).unwrap();
    let second = ctx.open(&alert, OpenConfig::new()).unwrap();

    assert_eq!(first.modal_id(), second.modal_id());
    assert_eq!(first.modal_id().as_str(), "_modal_0");
    assert!(ctx.is_registered(first.modal_id()));
    assert_eq!(ctx.resolve_id(&alert).unwrap(), *first.modal_id());

    // Reopening while pending shares the open result.
    first.close(Some(json!("shared"))).unwrap();
    assert_eq!(second.result().peek(), Some(Some(json!("shared"))));
}

#[test]
fn explicit_modal_id_overrides_generated_one() {
    let ctx = context();
    let alert: modalkit::ComponentRef = Rc::new(Alert);

    let modal = ctx
        .open(&alert, OpenConfig::new().modal_id("alert-main"))
        .unwrap();
    assert_eq!(modal.modal_id().as_str(), "alert-main");
    assert!(ctx.is_registered(&ModalId::from("alert-main")));
}

#[test]
fn generated_ids_reset_on_request() {
    let ctx = context();
    let first: modalkit::ComponentRef = Rc::new(Alert);
    let second: modalkit::ComponentRef = Rc::new(Alert);

    assert_eq!(ctx.resolve_id(&first).unwrap().as_str(), "_modal_0");
    assert_eq!(ctx.resolve_id(&second).unwrap().as_str(), "_modal_1");

    ctx.reset_ids();
    assert_eq!(ctx.resolve_id(&second).unwrap().as_str(), "_modal_0");
}

#[test]
fn keep_mounted_modal_stays_rendered_after_exit() {
    let ctx = context();
    ctx.register("m1", Rc::new(Alert), None).unwrap();
    let binding = ctx.mount("m1").unwrap();

    ctx.open("m1", OpenConfig::new().keep_mounted(true)).unwrap();
    binding.close(None).unwrap();
    binding.on_animation_end().unwrap();

    let rendered = ctx.render_list().unwrap();
    assert_eq!(rendered.len(), 1);
    assert!(!rendered[0].state.is_open);
    assert!(rendered[0].state.keep_mounted);
    assert!(ctx.is_registered(&ModalId::from("m1")));
}

#[test]
fn purge_runs_after_delay_unless_reopened() {
    let ctx = context();
    let binding = ctx.mount("m1").unwrap();

    ctx.open("m1", OpenConfig::new()).unwrap();
    binding.dismiss().unwrap();
    binding.on_animation_end().unwrap();
    assert_eq!(ctx.lifecycle_state(&"m1".into()), Some(LifecycleState::Closed));

    let deadline = ctx.next_purge_deadline().unwrap();
    assert!(deadline <= Instant::now() + PURGE_DELAY);
    assert_eq!(ctx.run_due_purges(deadline), 1);
    assert_eq!(ctx.lifecycle_state(&"m1".into()), None);
    assert!(ctx.next_purge_deadline().is_none());
}

#[test]
fn fast_reopen_keeps_new_handle_valid() {
    let ctx = context();
    let binding = ctx.mount("m1").unwrap();

    let first = ctx.open("m1", OpenConfig::new()).unwrap();
    first.close(Some(json!(1))).unwrap();
    binding.on_animation_end().unwrap();

    let second = ctx.open("m1", OpenConfig::new()).unwrap();
    assert_eq!(ctx.run_due_purges(Instant::now() + PURGE_DELAY), 0);

    second.close(Some(json!(2))).unwrap();
    binding.on_animation_end().unwrap();
    assert_eq!(first.after_closed().peek(), Some(Some(json!(1))));
    assert_eq!(second.after_closed().peek(), Some(Some(json!(2))));
}

#[test]
fn independent_contexts_do_not_share_state() {
    let left = context();
    let right = context();
    let _binding = left.mount("m1").unwrap();

    left.open("m1", OpenConfig::new()).unwrap();
    assert!(left.has_open());
    assert!(!right.has_open());
    assert!(right.snapshot().unwrap().is_empty());
}

//! Reducer invariants over arbitrary action sequences.

use modalkit::domain::{ModalData, ModalFlags, ModalId};
use modalkit::store::{reduce, ModalAction, ModalStore, MountedSet};
use proptest::prelude::*;
use serde_json::json;
use std::rc::Rc;

fn arb_id() -> impl Strategy<Value = ModalId> {
    prop::sample::select(vec!["a", "b", "c"]).prop_map(ModalId::from)
}

fn arb_flags() -> impl Strategy<Value = ModalFlags> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(is_open, delay_open, keep_mounted, disable_close)| ModalFlags {
            is_open,
            delay_open,
            keep_mounted,
            disable_close,
        })
}

fn arb_action() -> impl Strategy<Value = ModalAction> {
    prop_oneof![
        (arb_id(), 0i64..5).prop_map(|(id, n)| {
            let mut data = ModalData::new();
            data.insert("n".into(), json!(n));
            ModalAction::show(id, data)
        }),
        arb_id().prop_map(ModalAction::hide),
        arb_id().prop_map(ModalAction::remove),
        (arb_id(), arb_flags()).prop_map(|(id, flags)| ModalAction::set_flags(id, flags)),
    ]
}

fn arb_mounted() -> impl Strategy<Value = MountedSet> {
    prop::collection::vec(arb_id(), 0..3).prop_map(|ids| ids.into_iter().collect::<MountedSet>())
}

proptest! {
    /// Accepted transitions allocate a new state; rejected ones hand back the
    /// same reference. The input is never modified.
    #[test]
    fn reducer_never_mutates_input(
        actions in prop::collection::vec(arb_action(), 1..40),
        mounted in arb_mounted(),
    ) {
        let mut state = Rc::new(ModalStore::new());
        for action in &actions {
            let before = (*state).clone();
            let next = reduce(&state, action, &mounted);

            prop_assert_eq!(&*state, &before);
            if Rc::ptr_eq(&state, &next) {
                prop_assert_eq!(&*next, &before);
            } else {
                prop_assert_ne!(&*next, &before);
            }
            state = next;
        }
    }

    /// A `show` is visible only when the id is mounted, and delayed otherwise.
    #[test]
    fn show_respects_mount_state(
        id in arb_id(),
        mounted in arb_mounted(),
    ) {
        let state = Rc::new(ModalStore::new());
        let next = reduce(&state, &ModalAction::show(id.clone(), ModalData::new()), &mounted);
        let entry = next.get(&id).cloned().unwrap_or_default();

        prop_assert_eq!(entry.is_open, mounted.contains(&id));
        prop_assert_eq!(entry.delay_open, !mounted.contains(&id));
    }

    /// Actions on ids with no entry are no-ops, except `show`.
    #[test]
    fn absent_ids_are_untouched(
        action in arb_action(),
    ) {
        let state = Rc::new(ModalStore::new());
        let next = reduce(&state, &action, &MountedSet::new());
        let is_show = matches!(action, ModalAction::Show(_));
        prop_assert_eq!(Rc::ptr_eq(&state, &next), !is_show);
    }
}

//! Integration tests for the scene store history (meme-core).
//!
//! Covers the undo/redo inverse law, the history cap, selection invalidation
//! and the editing scenario from a fresh classic template.

use meme_core::{
    ImageUpdate, LayerId, LayerKind, SceneStore, Snapshot, Template, TextUpdate, MAX_HISTORY,
};
use proptest::prelude::*;

/// A mutating operation that always records a history entry.
#[derive(Debug, Clone)]
enum Op {
    AddText(String, f32, f32),
    AddImage(f32, f32),
    MoveLastText(f32),
    RemoveFirstImage,
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        ("[a-z]{1,8}", 0.0f32..480.0, 0.0f32..360.0)
            .prop_map(|(text, x, y)| Op::AddText(text, x, y)),
        (0.0f32..480.0, 0.0f32..360.0).prop_map(|(x, y)| Op::AddImage(x, y)),
        (1.0f32..50.0).prop_map(Op::MoveLastText),
        Just(Op::RemoveFirstImage),
        Just(Op::Clear),
    ]
}

/// Apply `op`; returns whether it recorded a history entry.
fn apply(store: &mut SceneStore, op: &Op) -> bool {
    match op {
        Op::AddText(text, x, y) => {
            store.add_text(TextUpdate {
                text: Some(text.clone()),
                x: Some(*x),
                y: Some(*y),
                ..TextUpdate::default()
            });
            true
        }
        Op::AddImage(x, y) => {
            store.add_image(ImageUpdate::position(*x, *y));
            true
        }
        Op::MoveLastText(dx) => match store.texts().last().map(|t| (t.id.clone(), t.x)) {
            Some((id, x)) => store.update_text(&id, &TextUpdate {
                x: Some(x + dx),
                ..TextUpdate::default()
            }),
            None => false,
        },
        Op::RemoveFirstImage => match store.images().first().map(|i| i.id.clone()) {
            Some(id) => store.remove_image(&id),
            None => false,
        },
        Op::Clear => {
            store.clear_canvas();
            true
        }
    }
}

fn scene_of(store: &SceneStore) -> Snapshot {
    Snapshot {
        texts: store.texts().to_vec(),
        images: store.images().to_vec(),
    }
}

proptest! {
    #[test]
    fn prop_undo_all_then_redo_all_is_identity(
        ops in prop::collection::vec(arb_op(), 1..MAX_HISTORY)
    ) {
        let mut store = SceneStore::new(Template::default());
        let mut recorded = 0usize;
        for op in &ops {
            if apply(&mut store, op) {
                recorded += 1;
            }
        }
        let end_state = scene_of(&store);

        for _ in 0..recorded {
            prop_assert!(store.undo());
            prop_assert!(store.selected_element_id().is_none());
        }
        prop_assert!(!store.undo());
        prop_assert_eq!(scene_of(&store), Snapshot::default());

        for _ in 0..recorded {
            prop_assert!(store.redo());
            prop_assert!(store.selected_element_id().is_none());
        }
        prop_assert!(!store.redo());
        prop_assert_eq!(scene_of(&store), end_state);
    }

    #[test]
    fn prop_undo_then_redo_restores_state(
        ops in prop::collection::vec(arb_op(), 1..20)
    ) {
        let mut store = SceneStore::new(Template::default());
        for op in &ops {
            apply(&mut store, op);
        }
        let before = scene_of(&store);
        if store.undo() {
            prop_assert!(store.redo());
        }
        prop_assert_eq!(scene_of(&store), before);
    }
}

#[test]
fn test_history_cap_keeps_most_recent() {
    let mut store = SceneStore::new(Template::default());
    let mut ids = Vec::new();
    for i in 0..60 {
        ids.push(store.add_text(TextUpdate::text(format!("op {i}"))));
    }

    assert!(store.history_len() <= MAX_HISTORY);
    assert_eq!(store.history_len(), MAX_HISTORY);

    // The newest entry holds all 60 texts; the oldest retained one holds 11.
    let counts: Vec<usize> = store.history().entries().map(|s| s.texts.len()).collect();
    assert_eq!(counts.first(), Some(&11));
    assert_eq!(counts.last(), Some(&60));
    assert!(counts.windows(2).all(|w| w[1] == w[0] + 1));

    let mut undos = 0;
    while store.undo() {
        undos += 1;
    }
    assert_eq!(undos, MAX_HISTORY - 1);
    assert_eq!(store.texts().len(), 11);
    assert_eq!(store.texts().last().map(|t| &t.id), ids.get(10));
}

#[test]
fn test_noop_update_keeps_history_length() {
    let mut store = SceneStore::new(Template::default());
    let id = store.add_text(TextUpdate::position(190.0, 150.0));
    let x = store.text(&id).map(|t| t.x).expect("text");
    let len = store.history_len();

    assert!(!store.update_text(&id, &TextUpdate {
        x: Some(x),
        ..TextUpdate::default()
    }));
    assert_eq!(store.history_len(), len);
}

#[test]
fn test_classic_scenario_undo_redo() {
    let classic = Template::by_id("totr-classic").expect("classic");
    let mut store = SceneStore::new(Template::by_id("totr-square").expect("square"));
    store.set_template(classic);
    assert_eq!(store.canvas_size(), (480, 360));

    let id = store.add_text(TextUpdate {
        text: Some("Тотя ❤️".to_string()),
        x: Some(190.0),
        y: Some(150.0),
        font_size: Some(32.0),
        ..TextUpdate::default()
    });
    let original = store.text(&id).cloned().expect("added");

    assert!(store.undo());
    assert!(store.texts().is_empty());

    assert!(store.redo());
    assert_eq!(store.texts(), &[original]);
}

#[test]
fn test_selecting_ghost_then_undo_clears_it() {
    let mut store = SceneStore::default();
    store.add_image(ImageUpdate::src("a.png"));
    store.select_element(Some((LayerId::from("ghost"), LayerKind::Image)));
    store.undo();
    assert!(store.selection().is_none());
}

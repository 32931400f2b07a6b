//! Property tests for ordering and undo/redo over random edit sequences.

use bistro_canvas::{BlockKind, BlockPatch, Canvas, CanvasCommand, DeviceTier, Document};
use proptest::prelude::*;
use serde_json::json;

/// Edit shape with index seeds; resolved against the live document.
#[derive(Clone, Debug)]
enum Op {
    Add(usize, usize),
    Update(usize, bool),
    Style(usize, u8),
    Remove(usize),
    Reorder(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..BlockKind::ALL.len(), 0usize..16).prop_map(|(k, p)| Op::Add(k, p)),
        (0usize..16, any::<bool>()).prop_map(|(i, v)| Op::Update(i, v)),
        (0usize..16, 0u8..4).prop_map(|(i, s)| Op::Style(i, s)),
        (0usize..16).prop_map(Op::Remove),
        (0usize..16, 0usize..16).prop_map(|(s, t)| Op::Reorder(s, t)),
    ]
}

/// Map an `Op` onto a valid command for `doc`, or `None` if the doc is too small.
fn to_command(op: &Op, doc: &Document) -> Option<CanvasCommand> {
    let len = doc.len();
    let pick = |seed: usize| doc.blocks().get(seed % len.max(1)).map(|b| b.id);
    match *op {
        Op::Add(kind, pos) => Some(CanvasCommand::AddBlock {
            kind: BlockKind::ALL[kind],
            position: (pos % (len + 1)) as i64,
        }),
        Op::Update(i, visible) => pick(i).map(|id| CanvasCommand::UpdateBlock {
            id,
            patch: BlockPatch::new().visible(visible),
        }),
        Op::Style(i, size) => pick(i).map(|id| CanvasCommand::SetStyle {
            id,
            tier: DeviceTier::Mobile,
            key: "fontSize".into(),
            value: json!(format!("{}px", 12 + size * 2)),
        }),
        Op::Remove(i) => pick(i).map(|id| CanvasCommand::RemoveBlock { id }),
        Op::Reorder(s, t) if len > 0 => Some(CanvasCommand::ReorderBlocks {
            source: s % len,
            target: t % len,
        }),
        Op::Reorder(..) => None,
    }
}

fn run(ops: &[Op]) -> (Canvas, usize) {
    let mut canvas = Canvas::default();
    let mut recorded = 0;
    for op in ops {
        if let Some(cmd) = to_command(op, canvas.document()) {
            let effect = canvas.dispatch(cmd).expect("generated commands are valid");
            if effect.recorded.is_some() {
                recorded += 1;
            }
        }
    }
    (canvas, recorded)
}

proptest! {
    #[test]
    fn order_stays_dense(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (canvas, _) = run(&ops);
        for (i, block) in canvas.blocks().iter().enumerate() {
            prop_assert_eq!(block.order as usize, i);
        }
    }

    #[test]
    fn undo_then_redo_is_identity(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let (mut canvas, recorded) = run(&ops);
        let after = canvas.document().clone();

        for _ in 0..recorded {
            prop_assert!(canvas.undo());
        }
        prop_assert!(canvas.blocks().is_empty());
        prop_assert!(!canvas.undo());

        for _ in 0..recorded {
            prop_assert!(canvas.redo());
        }
        prop_assert_eq!(canvas.document(), &after);
    }

    #[test]
    fn single_undo_restores_previous_state(
        prefix in prop::collection::vec(op_strategy(), 0..20),
        last in op_strategy(),
    ) {
        let (mut canvas, _) = run(&prefix);
        let before = canvas.document().clone();

        let Some(cmd) = to_command(&last, canvas.document()) else {
            return Ok(());
        };
        let effect = canvas.dispatch(cmd).unwrap();
        if effect.recorded.is_some() {
            prop_assert!(canvas.undo());
        }
        prop_assert_eq!(canvas.document(), &before);
    }

    #[test]
    fn forward_edit_clears_redo(
        ops in prop::collection::vec(op_strategy(), 1..20),
        kind in 0usize..BlockKind::ALL.len(),
    ) {
        let (mut canvas, recorded) = run(&ops);
        prop_assume!(recorded > 0);

        canvas.undo();
        prop_assert!(canvas.history().can_redo());
        canvas.add_block(BlockKind::ALL[kind], 0).unwrap();
        prop_assert!(!canvas.history().can_redo());
    }
}

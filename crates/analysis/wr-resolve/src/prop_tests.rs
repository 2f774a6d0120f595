//! Property tests for the scope stack using proptest.
//!
//! A naive model (a vector of frames, searched back to front) is run next to
//! the real stack over random nesting sequences:
//!
//! 1. Each shadowing diagnostic points at the nearest enclosing binding
//! 2. Bindings of one frame never shadow each other
//! 3. After every exit, lookups agree with the model again

use proptest::prelude::*;
use wr_intern::{Interner, Symbol};
use wr_span::{FileId, FileSpan, Span};

use crate::diagnostic::ResolveDiagnostic;
use crate::scope::{Binding, ScopeStack};
use crate::ty::Ty;

const NAME_POOL: &[&str] = &["a", "b", "c", "d"];

fn arb_frames() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0..NAME_POOL.len(), 0..4), 1..7)
}

/// Model frame entry: (name index, span)
type ModelFrame = Vec<(usize, FileSpan)>;

fn model_lookup(frames: &[ModelFrame], name: usize) -> Option<FileSpan> {
    frames.iter().rev().find_map(|frame| {
        frame
            .iter()
            .rev()
            .find(|(entry, _)| *entry == name)
            .map(|(_, span)| *span)
    })
}

fn span_at(offset: u32) -> FileSpan {
    FileSpan::new(FileId(0), Span::new(offset, offset + 1))
}

fn resolved_span(stack: &ScopeStack, name: Symbol) -> Option<FileSpan> {
    stack
        .resolve(name)
        .binding()
        .map(|id| stack.binding(id).span)
}

proptest! {
    #[test]
    fn shadowing_matches_nearest_enclosing(frames in arb_frames()) {
        let interner = Interner::new();
        let symbols: Vec<Symbol> = NAME_POOL.iter().map(|name| interner.intern(name)).collect();
        let mut stack = ScopeStack::new();
        let mut model: Vec<ModelFrame> = Vec::new();
        let mut handles = Vec::new();
        let mut offset = 0;

        for frame in &frames {
            let mut expected = Vec::new();
            let mut entries = ModelFrame::new();
            let mut bindings = Vec::new();

            for &name in frame {
                let span = span_at(offset);
                offset += 2;
                if let Some(shadowed) = model_lookup(&model, name) {
                    expected.push(ResolveDiagnostic::NameShadowing {
                        name: symbols[name],
                        shadowing: span,
                        shadowed,
                    });
                }
                entries.push((name, span));
                bindings.push(Binding::new(symbols[name], Ty::Unknown, span));
            }

            handles.push(stack.enter_scope(bindings));
            model.push(entries);
            prop_assert_eq!(stack.take_diagnostics(), expected);
        }

        while let Some(handle) = handles.pop() {
            prop_assert!(stack.exit_scope(handle).is_ok());
            model.pop();
            for (idx, &symbol) in symbols.iter().enumerate() {
                prop_assert_eq!(resolved_span(&stack, symbol), model_lookup(&model, idx));
            }
        }

        prop_assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn single_frame_is_silent(names in prop::collection::vec(0..NAME_POOL.len(), 0..8)) {
        let interner = Interner::new();
        let mut stack = ScopeStack::new();
        let bindings: Vec<Binding> = names
            .iter()
            .enumerate()
            .map(|(idx, &name)| {
                Binding::new(interner.intern(NAME_POOL[name]), Ty::Unknown, span_at(idx as u32))
            })
            .collect();

        let handle = stack.enter_scope(bindings);
        prop_assert!(stack.diagnostics().is_empty());
        prop_assert!(stack.exit_scope(handle).is_ok());
    }
}

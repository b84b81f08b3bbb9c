//! Deferred completion signals returned by `animate`.
//!
//! A [`Completion`] settles at most once. Callbacks registered with
//! [`Completion::on_settled`] run synchronously at the moment it settles
//! (or immediately, if it already has). A completion whose tween was
//! cancelled with `stop_animations` never settles; its callbacks are dropped
//! together with the last handle.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// How a completion settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The tween reached full progress
    Finished,
    /// The owning node was destroyed before the tween finished
    Interrupted,
    /// The tween was refused (unknown property, invalid target)
    Rejected,
}

type SettleCallback = Box<dyn FnOnce(Outcome)>;

#[derive(Default)]
struct CompletionState {
    outcome: Option<Outcome>,
    callbacks: Vec<SettleCallback>,
}

/// Shared handle to a one-shot completion signal
#[derive(Clone, Default)]
pub struct Completion {
    state: Rc<RefCell<CompletionState>>,
}

impl Completion {
    /// A completion that has not settled yet
    pub fn pending() -> Self {
        Self::default()
    }

    /// A completion that is already settled
    pub fn settled(outcome: Outcome) -> Self {
        let completion = Self::pending();
        completion.state.borrow_mut().outcome = Some(outcome);
        completion
    }

    /// The outcome, if settled
    pub fn outcome(&self) -> Option<Outcome> {
        self.state.borrow().outcome
    }

    pub fn is_settled(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome() == Some(Outcome::Finished)
    }

    /// Run `f` once this completion settles.
    pub fn on_settled(&self, f: impl FnOnce(Outcome) + 'static) {
        let outcome = {
            let mut state = self.state.borrow_mut();
            match state.outcome {
                Some(outcome) => outcome,
                None => {
                    state.callbacks.push(Box::new(f));
                    return;
                }
            }
        };
        f(outcome);
    }

    /// Settle with `outcome`. Returns false if it had already settled.
    pub(crate) fn settle(&self, outcome: Outcome) -> bool {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            if state.outcome.is_some() {
                return false;
            }
            state.outcome = Some(outcome);
            std::mem::take(&mut state.callbacks)
        };
        for callback in callbacks {
            callback(outcome);
        }
        true
    }

    /// Join several completions: settles once all of them have.
    ///
    /// The joined outcome is `Finished` only if every part finished; otherwise
    /// it is the first non-finished outcome observed. An empty set settles
    /// immediately as `Finished`.
    pub fn all(parts: impl IntoIterator<Item = Completion>) -> Completion {
        let parts: Vec<Completion> = parts.into_iter().collect();
        if parts.is_empty() {
            return Completion::settled(Outcome::Finished);
        }

        let joined = Completion::pending();
        let remaining = Rc::new(Cell::new(parts.len()));
        let worst = Rc::new(Cell::new(Outcome::Finished));

        for part in parts {
            let joined = joined.clone();
            let remaining = remaining.clone();
            let worst = worst.clone();
            part.on_settled(move |outcome| {
                if outcome != Outcome::Finished && worst.get() == Outcome::Finished {
                    worst.set(outcome);
                }
                remaining.set(remaining.get() - 1);
                if remaining.get() == 0 {
                    joined.settle(worst.get());
                }
            });
        }
        joined
    }

    /// Whether both handles refer to the same signal
    pub fn ptr_eq(&self, other: &Completion) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("outcome", &self.outcome())
            .finish()
    }
}

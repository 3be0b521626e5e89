//! Table-driven finite state machines.
//!
//! Every state machine of the crate is described by a table of [`Transition`]s.
//! Each time the machine is fired the table is scanned in declared order and the
//! first row whose source state matches the current state and whose guard
//! holds is taken: its action runs and the machine moves to the row's target
//! state. Several guards can be true at the same time (a timeout and a fresh
//! edge, a short press and inactivity...), so the order of the rows is part of
//! the behavior.
//!
//! ```rust
//! use nec_retina::fsm::{StateMachine, Transition};
//!
//! #[derive(PartialEq, Clone, Copy, Debug)]
//! enum Led { Off, On }
//!
//! struct Blinker { state: Led, toggles: u32 }
//!
//! impl Blinker {
//!     const TRANSITIONS: [Transition<Led, Self>; 2] = [
//!         Transition::new(Led::Off, |_| true, Led::On, Some(|b: &mut Blinker| b.toggles += 1)),
//!         Transition::new(Led::On, |_| true, Led::Off, None),
//!     ];
//! }
//!
//! impl StateMachine for Blinker {
//!     type State = Led;
//!     fn state(&self) -> Led { self.state }
//!     fn set_state(&mut self, state: Led) { self.state = state; }
//! }
//!
//! let mut blinker = Blinker { state: Led::Off, toggles: 0 };
//! assert_eq!(blinker.fire_with(&Blinker::TRANSITIONS), Some(Led::On));
//! assert_eq!(blinker.toggles, 1);
//! ```

use core::fmt;

/// One row of a transition table.
pub struct Transition<S, C> {
    /// State the row applies to.
    pub from: S,
    /// Condition checked against the machine; the row is taken when it holds.
    pub guard: fn(&C) -> bool,
    /// State the machine moves to.
    pub to: S,
    /// Optional output function, run before the state changes.
    pub action: Option<fn(&mut C)>,
}

impl<S, C> Transition<S, C> {
    /// Builds a transition row. `const` so tables can live in associated constants.
    pub const fn new(from: S, guard: fn(&C) -> bool, to: S, action: Option<fn(&mut C)>) -> Self {
        Self {
            from,
            guard,
            to,
            action,
        }
    }
}

impl<S: fmt::Debug, C> fmt::Debug for Transition<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

/// A machine driven by a [`Transition`] table.
pub trait StateMachine: Sized {
    /// The machine's state enumeration.
    type State: Copy + PartialEq;

    /// Current state.
    fn state(&self) -> Self::State;

    /// Overwrites the current state.
    fn set_state(&mut self, state: Self::State);

    /// Takes the first matching row of `table`, if any.
    ///
    /// # Returns
    /// - `Some(state)`: a row fired and the machine is now in `state`
    /// - `None`: no row matched; nothing ran
    fn fire_with(&mut self, table: &[Transition<Self::State, Self>]) -> Option<Self::State> {
        let current = self.state();
        let row = table
            .iter()
            .find(|row| row.from == current && (row.guard)(self))?;
        let next = row.to;
        if let Some(action) = row.action {
            action(self);
        }
        self.set_state(next);
        Some(next)
    }
}

//! Table-driven finite-state machine

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use super::render::RenderSignal;

/// One declared edge: `(from, event, to)`
pub type Transition<S, E> = (S, E, S);

/// Finite-state machine over a static transition table.
///
/// Events without a declared edge from the current state are ignored.
#[derive(Debug, Clone)]
pub struct Machine<S, E> {
    current: S,
    table: HashMap<S, HashMap<E, S>>,
    signal: Option<RenderSignal>,
}

impl<S, E> Machine<S, E>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    pub fn with_transitions(initial: S, transitions: &[Transition<S, E>]) -> Self {
        let mut table: HashMap<S, HashMap<E, S>> = HashMap::new();
        for &(from, event, to) in transitions {
            table.entry(from).or_default().insert(event, to);
        }
        Self {
            current: initial,
            table,
            signal: None,
        }
    }

    /// Raise `signal` on every successful transition
    pub fn with_signal(mut self, signal: RenderSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn attach_signal(&mut self, signal: RenderSignal) {
        self.signal = Some(signal);
    }

    pub fn state(&self) -> S {
        self.current
    }

    pub fn is(&self, state: S) -> bool {
        self.current == state
    }

    /// Apply `event`. Returns the new state, or `None` when there is no
    /// edge for it.
    pub fn emit(&mut self, event: E) -> Option<S> {
        let Some(next) = self
            .table
            .get(&self.current)
            .and_then(|edges| edges.get(&event))
            .copied()
        else {
            tracing::trace!("ignored {:?} in state {:?}", event, self.current);
            return None;
        };
        tracing::trace!("{:?} --{:?}--> {:?}", self.current, event, next);
        self.current = next;
        if let Some(signal) = &self.signal {
            signal.request();
        }
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Step {
        ProfileType,
        BasicInfo,
        Recap,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Nav {
        Next,
        Prev,
    }

    fn steps() -> Machine<Step, Nav> {
        Machine::with_transitions(
            Step::ProfileType,
            &[
                (Step::ProfileType, Nav::Next, Step::BasicInfo),
                (Step::BasicInfo, Nav::Next, Step::Recap),
                (Step::BasicInfo, Nav::Prev, Step::ProfileType),
                (Step::Recap, Nav::Prev, Step::BasicInfo),
            ],
        )
    }

    #[test]
    fn test_initial_state() {
        assert_eq!(steps().state(), Step::ProfileType);
    }

    #[test]
    fn test_follows_declared_edges() {
        let mut m = steps();
        assert_eq!(m.emit(Nav::Next), Some(Step::BasicInfo));
        assert_eq!(m.emit(Nav::Next), Some(Step::Recap));
        assert_eq!(m.emit(Nav::Prev), Some(Step::BasicInfo));
        assert!(m.is(Step::BasicInfo));
    }

    #[test]
    fn test_undeclared_event_leaves_state() {
        let mut m = steps();
        assert_eq!(m.emit(Nav::Prev), None);
        assert_eq!(m.state(), Step::ProfileType);

        m.emit(Nav::Next);
        m.emit(Nav::Next);
        assert_eq!(m.emit(Nav::Next), None);
        assert_eq!(m.state(), Step::Recap);
    }

    #[test]
    fn test_signal_raised_only_on_transition() {
        let signal = RenderSignal::new();
        let mut m = steps().with_signal(signal.clone());

        m.emit(Nav::Prev);
        assert!(!signal.take());

        m.emit(Nav::Next);
        assert!(signal.take());
    }
}

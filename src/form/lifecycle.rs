//! Form, request and loader lifecycles shared by every submitting form

use std::time::{Duration, Instant};

use super::machine::Machine;
use super::render::RenderSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormPhase {
    Idle,
    Submitted,
    Data,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormEvent {
    Submit,
    Valid,
    Invalid,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestPhase {
    Idle,
    Loading,
    Data,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestEvent {
    Start,
    Resolve,
    Reject,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderPhase {
    Off,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderEvent {
    Toggle,
}

fn form_machine() -> Machine<FormPhase, FormEvent> {
    use FormEvent::*;
    use FormPhase::*;
    Machine::with_transitions(
        Idle,
        &[
            (Idle, Submit, Submitted),
            (Submitted, Valid, Data),
            (Submitted, Invalid, Error),
            (Data, Reset, Idle),
            (Data, Submit, Submitted),
            (Error, Reset, Idle),
            (Error, Submit, Submitted),
            (Error, Invalid, Error),
        ],
    )
}

fn request_machine() -> Machine<RequestPhase, RequestEvent> {
    use RequestEvent::*;
    use RequestPhase::*;
    Machine::with_transitions(
        Idle,
        &[
            (Idle, Start, Loading),
            (Loading, Resolve, Data),
            (Loading, Reject, Error),
            (Data, Start, Loading),
            (Error, Start, Loading),
            (Error, Stop, Idle),
        ],
    )
}

fn loader_machine() -> Machine<LoaderPhase, LoaderEvent> {
    Machine::with_transitions(
        LoaderPhase::Off,
        &[
            (LoaderPhase::Off, LoaderEvent::Toggle, LoaderPhase::On),
            (LoaderPhase::On, LoaderEvent::Toggle, LoaderPhase::Off),
        ],
    )
}

/// The three machines a submitting form runs in parallel
#[derive(Debug, Clone)]
pub struct SubmissionMachines {
    pub form: Machine<FormPhase, FormEvent>,
    pub request: Machine<RequestPhase, RequestEvent>,
    pub loader: Machine<LoaderPhase, LoaderEvent>,
    loading_since: Option<Instant>,
    loader_delay: Duration,
}

impl Default for SubmissionMachines {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl SubmissionMachines {
    pub fn new(loader_delay: Duration) -> Self {
        Self {
            form: form_machine(),
            request: request_machine(),
            loader: loader_machine(),
            loading_since: None,
            loader_delay,
        }
    }

    pub fn attach_signal(&mut self, signal: RenderSignal) {
        self.form.attach_signal(signal.clone());
        self.request.attach_signal(signal.clone());
        self.loader.attach_signal(signal);
    }

    pub fn is_loading(&self) -> bool {
        self.request.is(RequestPhase::Loading)
    }

    pub fn loader_visible(&self) -> bool {
        self.loader.is(LoaderPhase::On)
    }

    /// Start a request. Returns false when one is already in flight.
    pub fn start_request(&mut self, now: Instant) -> bool {
        if self.request.emit(RequestEvent::Start).is_none() {
            return false;
        }
        self.loading_since = Some(now);
        true
    }

    pub fn resolve(&mut self) {
        self.request.emit(RequestEvent::Resolve);
        self.settle();
    }

    pub fn reject(&mut self) {
        self.request.emit(RequestEvent::Reject);
        self.settle();
    }

    fn settle(&mut self) {
        self.loading_since = None;
        if self.loader_visible() {
            self.loader.emit(LoaderEvent::Toggle);
        }
    }

    /// Turn the loader on once a request has been loading for longer than
    /// the delay. Returns true when the loader changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.loading_since {
            Some(since)
                if self.is_loading()
                    && !self.loader_visible()
                    && now.saturating_duration_since(since) >= self.loader_delay =>
            {
                self.loader.emit(LoaderEvent::Toggle).is_some()
            }
            _ => false,
        }
    }

    /// Back to idle after a successful submission that clears the form
    pub fn reset(&mut self) {
        self.form.emit(FormEvent::Reset);
        self.request.emit(RequestEvent::Stop);
    }

    /// Submit disabled while a valid submission is pending, or before
    /// anything changed
    pub fn button_disabled(&self, valid: bool, changed: bool) -> bool {
        (self.form.is(FormPhase::Submitted) && valid) || !changed
    }
}

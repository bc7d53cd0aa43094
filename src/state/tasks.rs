//! Background requests owned by mounted components

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use super::upload::{ProbedImage, UploadError};
use super::{ApiMessage, LoginOutcome, Profile, Redirect, RegisteredApp, UploadedImage};
use crate::api::ApiError;

/// A part of the UI that can own in-flight requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Login,
    Signup,
    PasswordReset,
    PasswordResetUpdate,
    Authorize,
    AccountProfile,
    AccountLocation,
    AccountPassword,
    AccountDelete,
    AppList,
    AppRegister,
    AppDelete,
    ProfileType,
    BasicInfo,
    ImageUpload,
    Payment,
    /// Session-wide calls (profile fetch, logout); never unmounted
    Session,
}

/// Result of a background call, tagged by operation
#[derive(Debug)]
pub enum TaskOutcome {
    Login(Result<LoginOutcome, ApiError>),
    Joined(Result<ApiMessage, ApiError>),
    Authorized(Result<Redirect, ApiError>),
    PasswordResetRequested(Result<ApiMessage, ApiError>),
    PasswordResetCompleted(Result<ApiMessage, ApiError>),
    ProfileLoaded(Result<Profile, ApiError>),
    ProfileUpdated(Result<ApiMessage, ApiError>),
    BasicInfoSaved(Result<ApiMessage, ApiError>),
    PasswordUpdated(Result<ApiMessage, ApiError>),
    AccountDeleted(Result<ApiMessage, ApiError>),
    AppsLoaded(Result<Vec<RegisteredApp>, ApiError>),
    AppRegistered(Result<RegisteredApp, ApiError>),
    AppDeleted(Result<ApiMessage, ApiError>),
    ImageProbed(Result<ProbedImage, UploadError>),
    ImageUploaded(Result<UploadedImage, ApiError>),
    PaymentSaved(Result<ApiMessage, ApiError>),
    LoggedOut(Result<(), ApiError>),
}

#[derive(Debug)]
pub struct TaskResult {
    pub owner: ComponentId,
    pub outcome: TaskOutcome,
}

/// Spawns requests on the runtime and collects their results for the UI
/// loop. Each owner gets a cancellation token; cancelling it stops the
/// owner's tasks before they report back.
#[derive(Debug)]
pub struct TaskRunner {
    tx: UnboundedSender<TaskResult>,
    rx: UnboundedReceiver<TaskResult>,
    tokens: HashMap<ComponentId, CancellationToken>,
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRunner {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            tx,
            rx,
            tokens: HashMap::new(),
        }
    }

    pub fn spawn<F>(&mut self, owner: ComponentId, task: F)
    where
        F: Future<Output = TaskOutcome> + Send + 'static,
    {
        let token = self.tokens.entry(owner).or_default().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("task for {:?} cancelled", owner);
                }
                outcome = task => {
                    if tx.send(TaskResult { owner, outcome }).is_err() {
                        tracing::debug!("result for {:?} dropped, receiver gone", owner);
                    }
                }
            }
        });
    }

    /// Cancel every in-flight task of `owner`
    pub fn cancel(&mut self, owner: ComponentId) {
        if let Some(token) = self.tokens.remove(&owner) {
            tracing::debug!("cancelling tasks for {:?}", owner);
            token.cancel();
        }
    }

    pub fn cancel_all<I>(&mut self, owners: I)
    where
        I: IntoIterator<Item = ComponentId>,
    {
        for owner in owners {
            self.cancel(owner);
        }
    }

    #[cfg(test)]
    pub fn has_tasks(&self, owner: ComponentId) -> bool {
        self.tokens.contains_key(&owner)
    }

    pub fn try_recv(&mut self) -> Option<TaskResult> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next result
    #[cfg(test)]
    pub async fn recv(&mut self) -> Option<TaskResult> {
        self.rx.recv().await
    }
}

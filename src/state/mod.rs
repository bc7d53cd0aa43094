//! Application state module

mod app_state;
pub mod countries;
mod forms;
mod notify;
mod pages;
mod tasks;
pub mod upload;

pub use app_state::*;
pub use forms::*;
pub use notify::{NotificationKind, Notifier};
pub use pages::{
    AccountPage, AccountSection, AppsFocus, AppsPage, ProfileNewPage, ProfileStep, ProfileType,
    ResetStage, StepEvent,
};
pub use tasks::{ComponentId, TaskOutcome, TaskResult, TaskRunner};
pub use upload::{ImageTarget, ProbedImage};

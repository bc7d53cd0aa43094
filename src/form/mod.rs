//! Validated multi-field form engine
//!
//! Every screen in the portal instantiates the same pieces with its own
//! field set:
//! - `validator`: field registration and per-field validation
//! - `state`: the values/errors/pristine snapshot the views read
//! - `machine`: table-driven finite-state machines (steps, lifecycles)
//! - `submit`: the validate-all-then-gate submission protocol
//! - `rules`: reusable validation predicates

mod lifecycle;
mod machine;
mod render;
pub mod rules;
mod state;
mod submit;
mod validator;

pub use lifecycle::{FormEvent, SubmissionMachines};
pub use machine::Machine;
pub use render::RenderSignal;
pub use state::{FieldError, FieldValue, FormValues};
pub use submit::{check_required, SubmitCheck};
pub use validator::{FieldOptions, FormValidator};

//! Screen forms built on the validation engine

mod definitions;
mod field;
mod form_state;

pub use field::{FieldKind, FormField};
pub use form_state::{FormKind, FormModel, Submission};

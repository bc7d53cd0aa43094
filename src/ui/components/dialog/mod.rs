//! Dialog components for TUI

mod base;
mod confirm_dialog;
mod error_dialog;
mod form_dialog;
mod secret_dialog;

pub use base::Tone;
pub use confirm_dialog::{render_confirm_dialog, ConfirmPrompt};
pub use error_dialog::render_error_dialog;
pub use form_dialog::render_form_dialog;
pub use secret_dialog::render_app_secret_dialog;

//! Reusable UI components

mod button;
mod dialog;

pub use button::{render_sidebar_button, render_submit_button, ButtonLook, BUTTON_HEIGHT};
pub use dialog::{
    render_app_secret_dialog, render_confirm_dialog, render_error_dialog, render_form_dialog,
    ConfirmPrompt, Tone,
};

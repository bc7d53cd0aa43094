//! Modal for errors that are not tied to a field

use super::base::{render_modal, Modal, Tone};
use ratatui::Frame;

pub fn render_error_dialog(frame: &mut Frame, message: &str) {
    render_modal(
        frame,
        Modal {
            title: "Something went wrong",
            tone: Tone::Danger,
            message,
            extra: Vec::new(),
            keys: &[("Enter/Esc", "dismiss")],
            max_width: 60,
        },
    );
}

//! Platform-specific configuration

use crossterm::event::KeyModifiers;

/// Platform-appropriate modifier for app shortcuts
/// - macOS: SUPER (Cmd key)
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const SHORTCUT_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const SHORTCUT_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Submit shortcut display for form help text
/// Ctrl+S works on all platforms
pub const SUBMIT_SHORTCUT: &str = "^S:submit";

/// Log out shortcut display
/// - macOS: "Cmd+O"
/// - Linux/Windows: "^O"
#[cfg(target_os = "macos")]
pub const LOGOUT_SHORTCUT: &str = "Cmd+O:log out";

#[cfg(not(target_os = "macos"))]
pub const LOGOUT_SHORTCUT: &str = "^O:log out";

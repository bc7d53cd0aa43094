//! Form field input buffers

/// How a field takes and shows its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Input is masked when rendered
    Secret,
    Multiline,
    /// `on` / `off`, flipped with Space
    Toggle,
    /// Filled by an upload, not by typing
    Upload,
}

/// A single input on a form: its label and what the user typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: String,
    pub kind: FieldKind,
    pub placeholder: Option<&'static str>,
}

impl FormField {
    fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: String::new(),
            kind,
            placeholder: None,
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn secret(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Secret)
    }

    pub fn multiline(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Multiline)
    }

    pub fn toggle(name: &str, label: &str) -> Self {
        let mut field = Self::new(name, label, FieldKind::Toggle);
        field.value = "off".to_string();
        field
    }

    pub fn upload(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Upload)
    }

    pub fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn is_multiline(&self) -> bool {
        self.kind == FieldKind::Multiline
    }

    /// Whether typed characters go into the buffer
    pub fn accepts_typing(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::Text | FieldKind::Secret | FieldKind::Multiline
        )
    }

    pub fn as_text(&self) -> &str {
        &self.value
    }

    pub fn set_text(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn push_char(&mut self, c: char) {
        if self.accepts_typing() {
            self.value.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.accepts_typing() {
            self.value.pop();
        }
    }

    /// Flip a toggle between `on` and `off`
    pub fn toggle_value(&mut self) {
        if self.kind == FieldKind::Toggle {
            self.value = if self.value == "on" { "off" } else { "on" }.to_string();
        }
    }

    pub fn clear(&mut self) {
        self.value = match self.kind {
            FieldKind::Toggle => "off".to_string(),
            _ => String::new(),
        };
    }

    /// Text shown in the input box
    pub fn display_value(&self) -> String {
        match self.kind {
            FieldKind::Secret => "•".repeat(self.value.chars().count()),
            FieldKind::Toggle => {
                if self.value == "on" {
                    "[x] yes".to_string()
                } else {
                    "[ ] no".to_string()
                }
            }
            _ => self.value.clone(),
        }
    }
}

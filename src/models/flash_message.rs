#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashKind {
    Info,
    Success,
    Error,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Info => "info",
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        }
    }
}

/// A transient notification banner. Stored per session and consumed on
/// the next page render; the page script dismisses each banner after
/// three seconds with its own timer.
#[derive(Clone, Debug)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn new(kind: FlashKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }

    pub fn kind_class(&self) -> &'static str {
        self.kind.as_str()
    }
}

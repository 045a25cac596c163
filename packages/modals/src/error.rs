use thiserror::Error;

/// Errors surfaced by [`crate::ModalManager`].
///
/// Failures raised by the rendering surface or the dialog primitive are passed
/// through with the slot they happened in; caller callbacks are never caught.
#[derive(Debug, Error)]
pub enum ModalError {
    #[error("rendering surface failed for modal `{id}`: {message}")]
    Surface { id: String, message: String },

    #[error("dialog primitive failed for modal `{id}`: {message}")]
    Dialog { id: String, message: String },

    #[error("element `{0}` not found in mounted modal markup")]
    MissingElement(String),

    #[error("failed to convert detail record: {0}")]
    Record(#[from] serde_json::Error),
}

impl ModalError {
    pub fn surface(id: &str, message: impl Into<String>) -> Self {
        Self::Surface {
            id: id.to_string(),
            message: message.into(),
        }
    }

    pub fn dialog(id: &str, message: impl Into<String>) -> Self {
        Self::Dialog {
            id: id.to_string(),
            message: message.into(),
        }
    }
}

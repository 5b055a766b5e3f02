//! Structured error types for gridview.
//!
//! Most failure modes in the engine are clamped rather than reported (stale
//! indices, oversized frozen sets). The variants below cover the few places
//! where a caller has to learn that something did not happen.

/// All errors that can surface from the grid engine.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// An index was outside the current series bounds.
    #[error("Index {index} out of range (count {count})")]
    OutOfRange { index: u32, count: u32 },

    /// A configuration value could not be honoured.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The content provider failed while producing a cell.
    #[error("Content provider: {0}")]
    ContentProvider(String),

    /// A cooperative cancellation was observed.
    #[error("Operation cancelled")]
    Cancelled,

    /// JSON configuration could not be parsed or written.
    #[error("Config: {0}")]
    Config(#[from] serde_json::Error),

    /// The render surface rejected a draw call.
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::ContentProvider(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::ContentProvider(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

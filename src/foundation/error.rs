/// Convenience result type used across thumbkit.
pub type ThumbResult<T> = Result<T, ThumbError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum ThumbError {
    /// Invalid user-provided template or settings data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An edit-controller action that is not allowed in the current state.
    #[error("edit error: {0}")]
    Edit(String),

    /// Errors while parsing a `visible_when` condition.
    #[error("condition error: {0}")]
    Condition(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ThumbError {
    /// Build a [`ThumbError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ThumbError::Edit`] value.
    pub fn edit(msg: impl Into<String>) -> Self {
        Self::Edit(msg.into())
    }

    /// Build a [`ThumbError::Condition`] value.
    pub fn condition(msg: impl Into<String>) -> Self {
        Self::Condition(msg.into())
    }

    /// Build a [`ThumbError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for ThumbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

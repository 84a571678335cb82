/// Crate-wide result alias.
pub type ReelResult<T> = Result<T, ReelError>;

/// Errors produced by adapters, renderers, collaborators and the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Malformed or incomplete adapter input. Never retried.
    #[error("structure error: {0}")]
    Structure(String),

    /// The input file or URL does not exist.
    #[error("source not found: {0}")]
    SourceNotFound(String),

    /// A TTS/enhancement backend could not be reached. Recoverable.
    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// A scene could not be rendered.
    #[error("render error: {0}")]
    Render(String),

    /// The video encoder failed for one video.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A value violated a model or configuration invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// The run was cancelled between stages.
    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Discriminant of [`ReelError`], used in reports and events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`ReelError::Structure`].
    Structure,
    /// See [`ReelError::SourceNotFound`].
    SourceNotFound,
    /// See [`ReelError::CollaboratorUnavailable`].
    CollaboratorUnavailable,
    /// See [`ReelError::Render`].
    Render,
    /// See [`ReelError::Encoding`].
    Encoding,
    /// See [`ReelError::Validation`].
    Validation,
    /// See [`ReelError::Cancelled`].
    Cancelled,
    /// See [`ReelError::Serde`].
    Serde,
    /// See [`ReelError::Other`].
    Other,
}

impl ReelError {
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }

    pub fn source_not_found(msg: impl Into<String>) -> Self {
        Self::SourceNotFound(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// The error kind, without payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Structure(_) => ErrorKind::Structure,
            Self::SourceNotFound(_) => ErrorKind::SourceNotFound,
            Self::CollaboratorUnavailable(_) => ErrorKind::CollaboratorUnavailable,
            Self::Render(_) => ErrorKind::Render,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Serde(_) => ErrorKind::Serde,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Whether the orchestrator may retry the stage that produced this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CollaboratorUnavailable(_))
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

impl From<serde_yaml::Error> for ReelError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

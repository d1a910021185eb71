use std::fmt;

/// Convenience result type used across lyricreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Compositor stage in which a fatal error occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Loading the background, frame images or audio.
    Load,
    /// Turning frame timestamps into timeline segments.
    Schedule,
    /// Rasterizing output frames.
    Render,
    /// Encoding the silent video stream.
    Encode,
    /// Muxing the fitted audio with the encoded video.
    Mux,
    /// Writing the sidecar metadata document.
    Metadata,
}

impl Stage {
    /// Stable lowercase stage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Schedule => "schedule",
            Self::Render => "render",
            Self::Encode => "encode",
            Self::Mux => "mux",
            Self::Metadata => "metadata",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error taxonomy used by lyricreel APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided configuration or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required input is missing or unusable before work starts.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Fatal failure inside one compositor stage.
    #[error("{stage} stage failed: {message}")]
    Stage {
        /// Stage that failed.
        stage: Stage,
        /// Human-readable failure description.
        message: String,
    },

    /// Failure talking to an external service or tool.
    #[error("adapter error ({adapter}): {message}")]
    Adapter {
        /// Adapter name, e.g. `lrclib` or `yt-dlp`.
        adapter: &'static str,
        /// Human-readable failure description.
        message: String,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`ReelError::Stage`] value.
    pub fn stage(stage: Stage, msg: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: msg.into(),
        }
    }

    /// Build a [`ReelError::Adapter`] value.
    pub fn adapter(adapter: &'static str, msg: impl Into<String>) -> Self {
        Self::Adapter {
            adapter,
            message: msg.into(),
        }
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Stage name when this is a [`ReelError::Stage`].
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ReelError {
    fn from(e: reqwest::Error) -> Self {
        Self::adapter("http", e.to_string())
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

use thiserror::Error;

/// Which of the two remote media operations an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum GenerationError {
    /// Rejected at the boundary, before any remote work starts.
    #[error("{0}")]
    Validation(String),

    /// Non-2xx from a job submit call, with the status and body the API sent back.
    #[error("{kind} generation request failed: HTTP {status}: {body}")]
    Request {
        kind: MediaKind,
        status: u16,
        body: String,
    },

    /// The polling loop exhausted its attempt cap without a result.
    #[error("{kind} generation timed out after {attempts} polling attempts")]
    Timeout { kind: MediaKind, attempts: u32 },

    /// A 2xx submit response that did not carry a task identifier.
    #[error("no task ID in {0} submit response")]
    MissingTaskId(MediaKind),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_error_names_the_media_kind() {
        let e = GenerationError::Timeout {
            kind: MediaKind::Video,
            attempts: 120,
        };
        let msg = e.to_string();
        assert!(msg.contains("video"), "got: {msg}");
        assert!(msg.contains("120"), "got: {msg}");
    }

    #[test]
    fn request_error_carries_status_and_body() {
        let e = GenerationError::Request {
            kind: MediaKind::Image,
            status: 402,
            body: "insufficient credits".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("image"), "got: {msg}");
        assert!(msg.contains("402"), "got: {msg}");
        assert!(msg.contains("insufficient credits"), "got: {msg}");
    }
}

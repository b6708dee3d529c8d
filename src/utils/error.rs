//! Error handling for sync-queue

use thiserror::Error;

/// Main error type for sync-queue
#[derive(Debug, Error)]
pub enum SyncQueueError {
    #[error("Task {0} panicked: {1}")]
    TaskPanicked(String, String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl SyncQueueError {
    /// Build a panic error from the payload caught by `catch_unwind`
    pub fn from_panic(task: &str, payload: Box<dyn std::any::Any + Send>) -> Self {
        Self::TaskPanicked(task.to_string(), panic_message(payload.as_ref()))
    }
}

/// Extract the message from a panic payload
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_panic_str_payload() {
        let err = SyncQueueError::from_panic("upload", Box::new("kaboom"));
        assert_eq!(err.to_string(), "Task upload panicked: kaboom");
    }

    #[test]
    fn test_from_panic_string_payload() {
        let err = SyncQueueError::from_panic("upload", Box::new(String::from("bad state")));
        assert!(matches!(err, SyncQueueError::TaskPanicked(_, ref m) if m == "bad state"));
    }

    #[test]
    fn test_from_panic_unknown_payload() {
        let err = SyncQueueError::from_panic("upload", Box::new(42u32));
        assert!(err.to_string().contains("unknown panic payload"));
    }
}

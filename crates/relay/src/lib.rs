pub mod classify;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod evidence;
pub mod graph;
pub mod metadata;
pub mod metrics;
pub mod routing;
pub mod sinks;
pub mod store;
pub mod testing;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed event: {0}")]
    MalformedEvent(String),
    #[error("Metadata error: {0}")]
    Metadata(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Parameter lookup error for {key}: {message}")]
    ConfigStore { key: String, message: String },
    #[error("Object store error: {0}")]
    ObjectStore(String),
    #[error("Chart error: {0}")]
    Chart(String),
    #[error("Chat error: {0}")]
    Chat(String),
    #[error("Paging error: {0}")]
    Paging(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_context() {
        let err = Error::ConfigStore {
            key: "/service/thing".to_string(),
            message: "throttled".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parameter lookup error for /service/thing: throttled"
        );
        assert_eq!(
            Error::Unsupported("multiple metric queries (got 2)".to_string()).to_string(),
            "Unsupported: multiple metric queries (got 2)"
        );
    }
}

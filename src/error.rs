use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the server's own text when it sent one.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("socket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("config error: {0}")]
    Config(String),

    /// Carries a translation key, see `i18n::t`.
    #[error("{0}")]
    Validation(&'static str),
}

impl Error {
    /// The request never got a real answer from the backend.
    pub fn is_offline(&self) -> bool {
        match self {
            Error::Http(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.status().is_some_and(|s| s.is_server_error())
            }
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_count_as_offline() {
        let err = Error::Api { status: 503, message: "down".into() };
        assert!(err.is_offline());
        assert_eq!(err.to_string(), "down");
    }

    #[test]
    fn rejections_are_not_offline() {
        let err = Error::Api { status: 422, message: "title required".into() };
        assert!(!err.is_offline());
        assert!(!Error::Validation("form.titleRequired").is_offline());
    }
}

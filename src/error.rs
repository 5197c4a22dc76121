use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum JenError {
    #[error("{0}")]
    Config(String),

    #[error("Timed out: {url}")]
    Timeout { url: Url },

    #[error("{code} {reason}: {url}")]
    Status { code: u16, reason: String, url: Url },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Unexpected test report layout: {0}")]
    MalformedReport(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl JenError {
    /// True for the failures a fetch reports to the user: a timeout or a non-2xx status.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Status { .. })
    }

    /// Drops the query string (and fragment) from the URL carried by a fetch failure.
    #[must_use]
    pub fn without_query(self) -> Self {
        match self {
            Self::Timeout { url } => Self::Timeout {
                url: strip_query(url),
            },
            Self::Status { code, reason, url } => Self::Status {
                code,
                reason,
                url: strip_query(url),
            },
            other => other,
        }
    }
}

fn strip_query(mut url: Url) -> Url {
    url.set_query(None);
    url.set_fragment(None);
    url
}

pub type Result<T> = std::result::Result<T, JenError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("http://ci.example.com/job/main/api/json?depth=1&tree=builds").unwrap()
    }

    #[test]
    fn test_timeout_message() {
        let err = JenError::Timeout { url: url() };
        assert_eq!(
            err.to_string(),
            "Timed out: http://ci.example.com/job/main/api/json?depth=1&tree=builds"
        );
    }

    #[test]
    fn test_status_message_without_query() {
        let err = JenError::Status {
            code: 404,
            reason: "Not Found".to_string(),
            url: url(),
        };
        assert_eq!(
            err.without_query().to_string(),
            "404 Not Found: http://ci.example.com/job/main/api/json"
        );
    }

    #[test]
    fn test_fetch_failure_classification() {
        assert!(JenError::Timeout { url: url() }.is_fetch_failure());
        assert!(!JenError::Config("x".to_string()).is_fetch_failure());
        assert!(!JenError::MalformedReport("x".to_string()).is_fetch_failure());
    }

    #[test]
    fn test_without_query_leaves_other_errors_alone() {
        let err = JenError::Config("no base".to_string()).without_query();
        assert_eq!(err.to_string(), "no base");
    }
}

//! Error type for the Library client

/// Failure from a Library API operation.
///
/// `Status` errors are never cached; a repeat call retries the network.
#[derive(Debug)]
pub enum LibraryError {
    /// Non-success status from the metadata API, with the response body.
    Status { status: u16, body: String },
    /// Transport-level failure (DNS, connection, body read).
    Transport(reqwest::Error),
    /// Response body was not valid JSON, or not the expected shape.
    Json(serde_json::Error),
    /// The product tabulation `_links` section has no such member.
    MissingLinks(String),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { status, body } => {
                write!(f, "library API returned {status}: {body}")
            }
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Json(e) => write!(f, "invalid JSON response: {e}"),
            Self::MissingLinks(product) => {
                write!(f, "product tabulation has no '{product}' links")
            }
        }
    }
}

impl std::error::Error for LibraryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_carries_body() {
        let err = LibraryError::Status {
            status: 404,
            body: r#"{"detail":"no such dataset"}"#.to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("404"));
        assert!(msg.contains("no such dataset"));
    }

    #[test]
    fn missing_links_display_names_product() {
        let err = LibraryError::MissingLinks("sdtm".to_string());
        assert!(format!("{err}").contains("'sdtm'"));
    }
}

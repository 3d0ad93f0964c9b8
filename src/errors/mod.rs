use thiserror::Error;

/// Every failure the request client or controller can surface to the user.
///
/// All variants end up in the same error banner; the variant only matters for
/// logging and tests.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Application(String),

    #[error("invalid API url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message() {
        let err = ApiError::Http {
            status: 404,
            message: "ticker not found".into(),
        };
        assert_eq!(err.to_string(), "HTTP error 404: ticker not found");
    }

    #[test]
    fn test_validation_and_application_messages_are_verbatim() {
        assert_eq!(ApiError::Validation("请输入股票代码。".into()).to_string(), "请输入股票代码。");
        assert_eq!(ApiError::Application("no data".into()).to_string(), "no data");
    }
}

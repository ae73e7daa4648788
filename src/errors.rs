use thiserror::Error;

#[derive(Error, Debug)]
pub enum LikersError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Browser not launched")]
    BrowserNotLaunched,

    #[error("Tab creation failed: {0}")]
    TabCreationFailed(String),

    #[error("No active tab")]
    NoActiveTab,

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript execution failed: {0}")]
    JavaScriptFailed(String),

    #[error("Stale element: {0}")]
    StaleElement(String),

    #[error("Result link {text:?} has no link target")]
    MissingLinkTarget { text: String },

    #[error("Pagination aborted after {expansions} expansions; {partial_records} partial records discarded")]
    PaginationAborted {
        expansions: u32,
        partial_records: usize,
    },

    #[error("Browser session error: {0}")]
    SessionError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Selector file error: {0}")]
    SelectorFileError(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LikersError>;

impl LikersError {
    /// Errors raised before a browser is ever launched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LikersError::ConfigurationError(_)
                | LikersError::SelectorFileError(_)
                | LikersError::UrlError(_)
        )
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            e if e.is_configuration() => 2,
            LikersError::PaginationAborted { .. } => 3,
            _ => 1,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, LikersError::StaleElement(_))
    }
}

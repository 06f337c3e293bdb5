use std::fmt;
use thiserror::Error;

/// Which step of a name resolution failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStep {
    Board,
    List,
    CustomField,
}

impl fmt::Display for LookupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            LookupStep::Board => "board",
            LookupStep::List => "list",
            LookupStep::CustomField => "custom field",
        };
        f.write_str(step)
    }
}

/// Main error type for card operations
#[derive(Debug, Error)]
pub enum BoardError {
    /// A local field required by the operation was never set
    #[error("{field} must be set before {operation}")]
    UnsetPrerequisite {
        field: &'static str,
        operation: &'static str,
    },

    /// Caller supplied a value outside an accepted set
    #[error("validation error: {0}")]
    Validation(String),

    /// The collection fetch behind a name lookup was not successful
    #[error("lookup request failed with HTTP {status}: {body}")]
    LookupTransport { status: u16, body: String },

    /// No object in the collection carries the name
    #[error("there are no objects with the name {name:?}")]
    NotFound { name: String },

    /// More than one object in the collection carries the name
    #[error("there are {count} objects with the name {name:?}")]
    AmbiguousName { name: String, count: usize },

    /// A lookup error annotated with the step that produced it
    #[error("{step} lookup failed: {source}")]
    Lookup {
        step: LookupStep,
        #[source]
        source: Box<BoardError>,
    },

    /// Create was called on a card that already has a server ID
    #[error("card {card_id} already exists; create needs a draft")]
    AlreadyPersisted { card_id: String },

    /// A terminal card operation got a non-success HTTP result
    #[error("HTTP {status}: {body}")]
    TransportFailure { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Connection-level failure, no HTTP status was received
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Credentials could not be obtained
    #[error("credentials unavailable: {0}")]
    Credentials(String),

    /// Board or list name was not given and no profile is stored
    #[error("board and list names are both required when no profile is stored")]
    ProfileMissing,
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::MalformedResponse(err.to_string())
    }
}

impl BoardError {
    pub(crate) fn unset(field: &'static str, operation: &'static str) -> Self {
        BoardError::UnsetPrerequisite { field, operation }
    }

    /// Attach lookup step context
    pub fn in_step(self, step: LookupStep) -> Self {
        BoardError::Lookup {
            step,
            source: Box::new(self),
        }
    }

    /// The error underneath any lookup step context
    pub fn root_cause(&self) -> &BoardError {
        match self {
            BoardError::Lookup { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The outermost lookup step, if any
    pub fn step(&self) -> Option<LookupStep> {
        match self {
            BoardError::Lookup { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), BoardError::NotFound { .. })
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self.root_cause(), BoardError::AmbiguousName { .. })
    }

    /// Get the HTTP status code if the error came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self.root_cause() {
            BoardError::LookupTransport { status, .. }
            | BoardError::TransportFailure { status, .. } => Some(*status),
            BoardError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for card operations
pub type Result<T> = std::result::Result<T, BoardError>;

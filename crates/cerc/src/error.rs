use thiserror::Error;

/// Why a single pathway failed validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathwayError {
    #[error("Name is missing")]
    MissingName,
    #[error("Endpoint is missing")]
    MissingEndpoint,
    #[error("Endpoint is invalid: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("Method \"{0}\" is invalid")]
    InvalidMethod(String),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Errors in the response URL template
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),
    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),
    #[error("unmatched '}}' at byte {0}")]
    UnmatchedClose(usize),
}

/// Configuration errors; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("pathway {pathway} invalid: {source}")]
    InvalidPathway {
        pathway: String,
        #[source]
        source: PathwayError,
    },
    #[error("pathway name \"{0}\" is used more than once")]
    DuplicatePathway(String),
    #[error("Address is missing")]
    MissingAddress,
    #[error("response URL template is invalid: {0}")]
    Template(#[from] TemplateError),
}

/// A probe attempt could not be dispatched. Reported as a non-starter.
#[derive(Debug, Error)]
pub enum ProbeSetupError {
    #[error("cannot determine hostname: {0}")]
    Hostname(String),
    #[error("response URL \"{url}\" is invalid: {source}")]
    ResponseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("cannot build request: {0}")]
    Request(#[source] reqwest::Error),
}

/// Errors while bringing the service up
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot build HTTP client for pathway {pathway}: {source}")]
    Client {
        pathway: String,
        #[source]
        source: reqwest::Error,
    },
}

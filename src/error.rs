use thiserror::Error;

/// Failures raised by a release store while listing.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to list {kind} in {scope}: {source}")]
    Kube {
        kind: &'static str,
        scope: String,
        #[source]
        source: kube::Error,
    },

    #[error("invalid label selector: {0}")]
    Selector(#[from] SelectorError),
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum SelectorError {
    #[error("requirement '{0}' has no operator, expected '=', '==' or '!='")]
    MissingOperator(String),

    #[error("requirement '{0}' has an empty key")]
    EmptyKey(String),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("release payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to decompress release payload: {0}")]
    Gzip(#[from] std::io::Error),

    #[error("release payload is not a valid release document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("release data key '{0}' is missing")]
    MissingKey(&'static str),
}

/// Everything that can abort a listing. Nothing is recovered locally.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("release store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid filter pattern: {0}")]
    Filter(#[from] regex::Error),

    #[error("failed to encode output as {format}: {message}")]
    Encoding {
        format: &'static str,
        message: String,
    },
}

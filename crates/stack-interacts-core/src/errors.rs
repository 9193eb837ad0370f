use crate::codec::CodecError;
use crate::rpc::QueryError;
use crate::validation::Rejection;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractsError {
    /// Input refused by the validator. Never raised by the validator itself,
    /// only when a caller lifts a rejection into the wider error type.
    #[error("{0}")]
    ValidationRejected(#[from] Rejection),
    #[error("Cancelled")]
    DispatchCancelled,
    #[error("{message}")]
    DispatchFailed { message: String },
    #[error("{message}")]
    QueryFailed { message: String },
    #[error("unable to encode clarity value: {0}")]
    Codec(#[from] CodecError),
    #[error("wallet not connected")]
    NotSignedIn,
    #[error("you already own \"{name}\", release it before reserving another name")]
    NameAlreadyOwned { name: String },
    #[error("\"{name}\" is already taken")]
    NameTaken { name: String },
    #[error("no username registered for this address")]
    NoNameOwned,
    #[error("{0}")]
    UnexpectedResponse(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<QueryError> for InteractsError {
    fn from(e: QueryError) -> Self {
        InteractsError::QueryFailed { message: e.to_string() }
    }
}

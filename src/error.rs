/// Errors returned by connection and registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("connection with {id} not found")]
    ConnectionNotFound { id: String },

    #[error("connection with {id} has no bandwidth update yet")]
    UninitializedConnection { id: String },
}

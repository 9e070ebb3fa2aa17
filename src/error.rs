use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the generator.
///
/// Every variant indicates a configuration or caller bug; generation should
/// stop rather than emit partial output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown relation kind `{0}`")]
    UnknownRelType(String),

    #[error("unknown template kind `{0}`")]
    UnknownTemplateType(String),

    #[error("unsupported name conflict scope of kind `{0}`")]
    UnsupportedScope(&'static str),

    #[error("unknown template function `{0}`")]
    UnknownFunction(String),

    #[error("invalid arguments to `{func}`: {reason}")]
    InvalidArguments { func: &'static str, reason: String },

    #[error("type `{0}` enables model_to_pb without a model_to_pb configuration")]
    MissingModelToPbConfig(String),

    #[error("{type_name}.{field} could be null and has no wrapper type mapping")]
    UnmappedNullable { type_name: String, field: String },
}

impl Error {
    pub(crate) fn invalid_arguments(func: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArguments {
            func,
            reason: reason.into(),
        }
    }
}

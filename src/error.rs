use thiserror::Error;

/// The broad kind of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    MissingParameter,
    ZeroParameter,
    InvalidParameter,
}

/// A node refused to be constructed from its settings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{parameter} parameter in {node} is an obligatory parameter")]
    MissingParameter {
        node: &'static str,
        parameter: &'static str,
    },
    #[error("{parameter} parameter in {node} must be greater than zero")]
    ZeroParameter {
        node: &'static str,
        parameter: &'static str,
    },
    #[error("invalid settings for {node}: {source}")]
    InvalidParameter {
        node: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            Self::MissingParameter { .. } => ConfigErrorKind::MissingParameter,
            Self::ZeroParameter { .. } => ConfigErrorKind::ZeroParameter,
            Self::InvalidParameter { .. } => ConfigErrorKind::InvalidParameter,
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AddChildError {
    #[error("Attempted to add too many nodes")]
    TooManyNodes,
}

pub type AddChildResult = Result<(), AddChildError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("Node type not found {0:?}")]
    MissingNode(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0} to {1}")]
    AddChild(AddChildError, String),
}

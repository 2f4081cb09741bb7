use crate::core::metadata::GrammarError;
use crate::domain::model::PortKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevsError {
    #[error("Port {name} not found in model {model}")]
    PortNotFound { model: String, name: String },

    #[error("Component {name} not found in coupled model {model}")]
    ComponentNotFound { model: String, name: String },

    #[error(
        "This is not a valid coupling. Ports are {from} and {to}. Please check the provided ports."
    )]
    InvalidCoupling { from: PortKind, to: PortKind },

    #[error("Metadata parsing error: {message}")]
    MetadataParsing {
        message: String,
        #[source]
        source: Option<GrammarError>,
    },

    #[error("Atomic named {name} has duplicated metadata.")]
    DuplicatedAtomic { name: String },

    #[error("Atomic class {name} does not exist in the registry")]
    NonExistingAtomicClass { name: String },

    #[error("Top model must be named \"top\", but is named \"{name}\"")]
    TopModelNotNamedTop { name: String },

    #[error("Bad virtual time values: {message}")]
    BadVirtualTime { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl DevsError {
    /// True for lookup misses (ports, components, atomic kinds).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DevsError::PortNotFound { .. }
                | DevsError::ComponentNotFound { .. }
                | DevsError::NonExistingAtomicClass { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DevsError>;

pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command, OutputFormat};

pub use config::{cli::LocalWorkspace, toml_config::ProjectConfig};
pub use core::{
    atomic_kind::{AtomicKind, AtomicKindBuilder},
    builder::CoupledBuilder,
    display::{diagram_url, DisplayOptions},
    events::{Event, EventValue, VirtualTime},
    metadata::AtomicMetadata,
    registry::AtomicRegistry,
    serializers::{JsonSerializer, MaSerializer},
    simulation::{ExportedSimulation, Simulation, SimulationExporter},
};
pub use domain::model::{Atomic, Coupled, Link, Model, Port, PortKind, PortOwner, PortRef};
pub use utils::error::{DevsError, Result};

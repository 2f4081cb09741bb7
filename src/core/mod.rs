pub mod atomic_kind;
pub mod builder;
pub mod display;
pub mod events;
pub mod metadata;
pub mod registry;
pub mod serializers;
pub mod simulation;
pub mod sources;

pub use crate::domain::model::{Atomic, Coupled, Model, Port, PortKind, PortOwner, PortRef};
pub use crate::domain::ports::{ArtifactStore, AtomicSource, ModelSerializer};
pub use crate::utils::error::Result;

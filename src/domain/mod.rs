// Domain layer: the DEVS model graph and the traits adapters implement.

pub mod model;
pub mod ports;

use crate::core::metadata::AtomicMetadata;
use crate::domain::model::{Atomic, PortOwner};
use crate::utils::error::Result;
use crate::utils::validation::validate_identifier;
use serde::{Deserialize, Serialize};

/// A named atomic model shape. Every instance built from a kind reports the
/// kind's name as its abstract type and starts with the declared ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicKind {
    name: String,
    input_ports: Vec<String>,
    output_ports: Vec<String>,
}

impl AtomicKind {
    pub fn builder() -> AtomicKindBuilder {
        AtomicKindBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_ports(&self) -> &[String] {
        &self.input_ports
    }

    pub fn output_ports(&self) -> &[String] {
        &self.output_ports
    }

    pub fn instantiate(&self, instance_name: impl Into<String>) -> Atomic {
        let mut atomic = Atomic::of_kind(self.name.as_str(), instance_name);
        for port in &self.input_ports {
            atomic.add_inport(port.as_str());
        }
        for port in &self.output_ports {
            atomic.add_outport(port.as_str());
        }
        atomic
    }
}

impl TryFrom<AtomicMetadata> for AtomicKind {
    type Error = crate::utils::error::DevsError;

    fn try_from(metadata: AtomicMetadata) -> Result<Self> {
        let builder = metadata
            .input_ports
            .into_iter()
            .fold(AtomicKindBuilder::new().with_name(metadata.name), |b, port| {
                b.with_input_port(port)
            });
        metadata
            .output_ports
            .into_iter()
            .fold(builder, |b, port| b.with_output_port(port))
            .build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AtomicKindBuilder {
    name: Option<String>,
    input_ports: Vec<String>,
    output_ports: Vec<String>,
}

impl AtomicKindBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_input_port(mut self, name: impl Into<String>) -> Self {
        self.input_ports.push(name.into());
        self
    }

    pub fn with_output_port(mut self, name: impl Into<String>) -> Self {
        self.output_ports.push(name.into());
        self
    }

    pub fn build(self) -> Result<AtomicKind> {
        let name = crate::utils::validation::validate_required_field("name", &self.name)?;
        validate_identifier("name", name)?;
        Ok(AtomicKind {
            name: name.clone(),
            input_ports: self.input_ports,
            output_ports: self.output_ports,
        })
    }
}

//! Diagram renderer projection of a model graph.

use crate::domain::model::{Atomic, Coupled, Link, Model, Port, PortOwner};
use crate::domain::ports::ModelSerializer;
use crate::utils::error::Result;
use serde_json::{json, Value};

/// Every port is rendered with this message type; the graph carries no types.
pub const ANY_MESSAGE_TYPE: &str = "Any";

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn port_to_dict(port: &Port) -> Value {
        json!({
            "name": port.name(),
            "message_type": ANY_MESSAGE_TYPE,
            "kind": port.kind().as_str(),
        })
    }

    fn ports_to_dict(model: &impl PortOwner) -> Value {
        json!({
            "out": model.outports().iter().map(Self::port_to_dict).collect::<Vec<_>>(),
            "in": model.inports().iter().map(Self::port_to_dict).collect::<Vec<_>>(),
        })
    }

    /// EIC entries start at a boundary port, so `from_model` is left out.
    fn eic_to_dict(link: &Link) -> Value {
        let (from, to) = (link.from_port(), link.to_port());
        json!({
            "to_port": to.name(),
            "to_model": to.owner_name(),
            "from_port": from.name(),
        })
    }

    fn ic_to_dict(link: &Link) -> Value {
        let (from, to) = (link.from_port(), link.to_port());
        json!({
            "to_port": to.name(),
            "to_model": to.owner_name(),
            "from_port": from.name(),
            "from_model": from.owner_name(),
        })
    }

    /// EOC entries end at a boundary port, so `to_model` is left out.
    fn eoc_to_dict(link: &Link) -> Value {
        let (from, to) = (link.from_port(), link.to_port());
        json!({
            "to_port": to.name(),
            "from_port": from.name(),
            "from_model": from.owner_name(),
        })
    }

    fn links_to_dict(links: &[Link], entry: fn(&Link) -> Value) -> Value {
        Value::Array(links.iter().map(entry).collect())
    }

    pub fn atomic_to_dict(atomic: &Atomic) -> Value {
        json!({
            "id": atomic.name(),
            "type": "atomic",
            "ports": Self::ports_to_dict(atomic),
        })
    }

    pub fn coupled_to_dict(coupled: &Coupled) -> Value {
        json!({
            "id": coupled.name(),
            "type": "coupled",
            "models": coupled.subcomponents().iter().map(Self::model_to_dict).collect::<Vec<_>>(),
            "ports": Self::ports_to_dict(coupled),
            "eoc": Self::links_to_dict(coupled.eoc(), Self::eoc_to_dict),
            "eic": Self::links_to_dict(coupled.eic(), Self::eic_to_dict),
            "ic": Self::links_to_dict(coupled.ic(), Self::ic_to_dict),
        })
    }

    pub fn model_to_dict(model: &Model) -> Value {
        match model {
            Model::Atomic(atomic) => Self::atomic_to_dict(atomic),
            Model::Coupled(coupled) => Self::coupled_to_dict(coupled),
        }
    }

    pub fn to_json(model: &Model) -> Result<String> {
        Ok(serde_json::to_string(&Self::model_to_dict(model))?)
    }
}

impl ModelSerializer for JsonSerializer {
    fn serialize(&self, model: &Model) -> Result<String> {
        Self::to_json(model)
    }
}

pub mod json;
pub mod ma;

pub use json::JsonSerializer;
pub use ma::MaSerializer;

use crate::domain::model::{Atomic, Coupled, Model};
use crate::utils::error::Result;

impl Model {
    pub fn to_ma(&self) -> String {
        MaSerializer::model_to_ma(self)
    }

    pub fn to_dict(&self) -> serde_json::Value {
        JsonSerializer::model_to_dict(self)
    }

    pub fn to_json(&self) -> Result<String> {
        JsonSerializer::to_json(self)
    }
}

impl Atomic {
    pub fn to_ma(&self) -> String {
        MaSerializer::atomic_to_ma(self)
    }
}

impl Coupled {
    pub fn to_ma(&self) -> String {
        MaSerializer::coupled_to_ma(self)
    }
}

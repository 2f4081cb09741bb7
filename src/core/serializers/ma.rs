//! CD++ `.ma` model definition text.

use crate::domain::model::{Atomic, Coupled, Model, PortOwner};
use crate::domain::ports::ModelSerializer;
use crate::utils::error::Result;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct MaSerializer;

impl MaSerializer {
    pub fn atomic_to_ma(atomic: &Atomic) -> String {
        let mut ma = format!("[{}]\n", atomic.name());
        for (param, value) in atomic.params() {
            let _ = writeln!(ma, "{}: {}", param, value);
        }
        ma
    }

    pub fn coupled_to_ma(coupled: &Coupled) -> String {
        let join = |items: Vec<String>| items.join(" ");
        let mut ma = format!("[{}]\n", coupled.name());
        let _ = writeln!(
            ma,
            "components: {}",
            join(coupled.subcomponents().iter().map(|m| m.to_string()).collect())
        );
        let _ = writeln!(
            ma,
            "out: {}",
            join(coupled.outports().iter().map(|p| p.to_string()).collect())
        );
        let _ = writeln!(
            ma,
            "in: {}",
            join(coupled.inports().iter().map(|p| p.to_string()).collect())
        );
        for link in coupled.links() {
            let _ = writeln!(
                ma,
                "link: {} {}",
                link.from_port().identifier_for(coupled.id()),
                link.to_port().identifier_for(coupled.id())
            );
        }
        for model in coupled.subcomponents() {
            ma.push_str("\n\n");
            ma.push_str(&Self::model_to_ma(model));
        }
        ma
    }

    pub fn model_to_ma(model: &Model) -> String {
        match model {
            Model::Atomic(atomic) => Self::atomic_to_ma(atomic),
            Model::Coupled(coupled) => Self::coupled_to_ma(coupled),
        }
    }
}

impl ModelSerializer for MaSerializer {
    fn serialize(&self, model: &Model) -> Result<String> {
        Ok(Self::model_to_ma(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::atomic_kind::AtomicKind;

    #[test]
    fn test_empty_top_model() {
        let top = Coupled::new("top", vec![]);
        assert_eq!(top.to_ma(), "[top]\ncomponents: \nout: \nin: \n");
    }

    #[test]
    fn test_atomic_params_in_insertion_order() {
        let foco = AtomicKind::builder()
            .with_name("Foco")
            .build()
            .unwrap()
            .instantiate("foco")
            .with_param("mean", 2)
            .with_param("std", 1);
        assert_eq!(foco.to_ma(), "[foco]\nmean: 2\nstd: 1\n");
    }

    #[test]
    fn test_nested_coupled_is_listed_by_name() {
        let inner = Coupled::new("inner", vec![Atomic::new("leaf").into()]);
        let top = Coupled::new("top", vec![inner.into()]);
        assert_eq!(
            top.to_ma(),
            "[top]\ncomponents: inner\nout: \nin: \n\n\n[inner]\ncomponents: leaf@Atomic\nout: \nin: \n\n\n[leaf]\n"
        );
    }
}

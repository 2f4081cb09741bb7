use crate::domain::model::{Coupled, Model, PortOwner, PortRef};
use crate::utils::error::Result;

/// A coupling whose endpoints are resolved when the coupled model is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCoupling {
    pub from: PortRef,
    pub to: PortRef,
}

/// Collects ports, components and couplings for a coupled model.
///
/// Couplings may name boundary ports (`"in"`) or subcomponent ports
/// (`PortRef::Qualified`) that do not exist yet; nothing is resolved or
/// classified until [`CoupledBuilder::build`].
///
/// ```
/// use pringles::core::builder::CoupledBuilder;
/// use pringles::domain::model::{Atomic, PortOwner};
///
/// let mut queue = Atomic::new("queue");
/// queue.add_inport("in").add_outport("out");
///
/// let top = CoupledBuilder::new("top")
///     .inport("incoming_event")
///     .outport("emitted_signal")
///     .coupling("incoming_event", queue.get_port("in")?)
///     .coupling(queue.get_port("out")?, "emitted_signal")
///     .component(queue)
///     .build()?;
/// assert_eq!(top.eic().len(), 1);
/// # Ok::<(), pringles::DevsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CoupledBuilder {
    name: String,
    inports: Vec<String>,
    outports: Vec<String>,
    components: Vec<Model>,
    couplings: Vec<PendingCoupling>,
}

impl CoupledBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inports: Vec::new(),
            outports: Vec::new(),
            components: Vec::new(),
            couplings: Vec::new(),
        }
    }

    pub fn inport(mut self, name: impl Into<String>) -> Self {
        self.inports.push(name.into());
        self
    }

    pub fn outport(mut self, name: impl Into<String>) -> Self {
        self.outports.push(name.into());
        self
    }

    pub fn component(mut self, model: impl Into<Model>) -> Self {
        self.components.push(model.into());
        self
    }

    pub fn coupling(mut self, from: impl Into<PortRef>, to: impl Into<PortRef>) -> Self {
        self.couplings.push(PendingCoupling {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn pending_couplings(&self) -> &[PendingCoupling] {
        &self.couplings
    }

    pub fn build(self) -> Result<Coupled> {
        let mut coupled = Coupled::new(self.name, Vec::new());
        for component in self.components {
            coupled.add_subcomponent(component);
        }
        for name in self.inports {
            coupled.add_inport(name);
        }
        for name in self.outports {
            coupled.add_outport(name);
        }
        for pending in self.couplings {
            coupled.add_coupling(pending.from, pending.to)?;
        }
        Ok(coupled)
    }
}

use crate::utils::error::{DevsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Abstract type name reported by atomics that were not built from a kind.
pub const PLAIN_ATOMIC_KIND: &str = "Atomic";

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a model instance. Ports remember the id of the model that
/// created them, so two models sharing a name are still told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    fn next() -> Self {
        ModelId(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    In,
    Out,
}

impl PortKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortKind::In => "in",
            PortKind::Out => "out",
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKind::In => write!(f, "InPort"),
            PortKind::Out => write!(f, "OutPort"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    name: String,
    kind: PortKind,
    owner: ModelId,
    owner_name: String,
}

impl Port {
    fn new(name: String, kind: PortKind, owner: &ModelCore) -> Self {
        Self {
            name,
            kind,
            owner: owner.id,
            owner_name: owner.name.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PortKind {
        self.kind
    }

    pub fn owner(&self) -> ModelId {
        self.owner
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn is_owned_by(&self, model: ModelId) -> bool {
        self.owner == model
    }

    /// `name` when the port belongs to `model`, `name@owner` otherwise.
    pub fn identifier_for(&self, model: ModelId) -> String {
        if self.is_owned_by(model) {
            self.name.clone()
        } else {
            format!("{}@{}", self.name, self.owner_name)
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CouplingKind {
    /// Coupled model in-port relayed to a subcomponent in-port (EIC).
    ExternalInput,
    /// Subcomponent out-port feeding a subcomponent in-port (IC).
    Internal,
    /// Subcomponent out-port relayed to the coupled model out-port (EOC).
    ExternalOutput,
}

impl CouplingKind {
    pub fn classify(from: PortKind, to: PortKind) -> Result<Self> {
        match (from, to) {
            (PortKind::Out, PortKind::In) => Ok(CouplingKind::Internal),
            (PortKind::In, PortKind::In) => Ok(CouplingKind::ExternalInput),
            (PortKind::Out, PortKind::Out) => Ok(CouplingKind::ExternalOutput),
            (PortKind::In, PortKind::Out) => Err(DevsError::InvalidCoupling { from, to }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    kind: CouplingKind,
    from: Port,
    to: Port,
}

impl Link {
    pub fn new(from: Port, to: Port) -> Result<Self> {
        let kind = CouplingKind::classify(from.kind(), to.kind())?;
        Ok(Self { kind, from, to })
    }

    pub fn kind(&self) -> CouplingKind {
        self.kind
    }

    pub fn from_port(&self) -> &Port {
        &self.from
    }

    pub fn to_port(&self) -> &Port {
        &self.to
    }
}

/// A coupling endpoint before it is resolved to a concrete port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortRef {
    Direct(Port),
    /// A port of the coupled model itself.
    ByName(String),
    /// A port of one of the coupled model's direct subcomponents.
    Qualified { component: String, port: String },
}

impl From<Port> for PortRef {
    fn from(port: Port) -> Self {
        PortRef::Direct(port)
    }
}

impl From<&Port> for PortRef {
    fn from(port: &Port) -> Self {
        PortRef::Direct(port.clone())
    }
}

impl From<&str> for PortRef {
    fn from(name: &str) -> Self {
        PortRef::ByName(name.to_string())
    }
}

impl From<String> for PortRef {
    fn from(name: String) -> Self {
        PortRef::ByName(name)
    }
}

impl FromStr for PortRef {
    type Err = DevsError;

    /// Parses `port` or `port@component`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once('@') {
            Some((port, component)) if !port.is_empty() && !component.is_empty() => {
                Ok(PortRef::Qualified {
                    component: component.to_string(),
                    port: port.to_string(),
                })
            }
            None if !s.is_empty() => Ok(PortRef::ByName(s.to_string())),
            _ => Err(DevsError::InvalidConfigValueError {
                field: "port reference".to_string(),
                value: s.to_string(),
                reason: "expected `port` or `port@component`".to_string(),
            }),
        }
    }
}

/// State shared by atomic and coupled models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCore {
    id: ModelId,
    name: String,
    inports: Vec<Port>,
    outports: Vec<Port>,
}

impl ModelCore {
    fn new(name: impl Into<String>) -> Self {
        Self {
            id: ModelId::next(),
            name: name.into(),
            inports: Vec::new(),
            outports: Vec::new(),
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inports(&self) -> &[Port] {
        &self.inports
    }

    pub fn outports(&self) -> &[Port] {
        &self.outports
    }

    fn push_port(&mut self, name: String, kind: PortKind) {
        let port = Port::new(name, kind, self);
        match kind {
            PortKind::In => self.inports.push(port),
            PortKind::Out => self.outports.push(port),
        }
    }

    fn find_port(&self, name: &str) -> Option<&Port> {
        self.inports
            .iter()
            .chain(self.outports.iter())
            .find(|port| port.name == name)
    }
}

/// Anything that owns ports: atomics, coupled models and the `Model` sum.
pub trait PortOwner {
    fn core(&self) -> &ModelCore;
    fn core_mut(&mut self) -> &mut ModelCore;

    fn id(&self) -> ModelId {
        self.core().id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn inports(&self) -> &[Port] {
        self.core().inports()
    }

    fn outports(&self) -> &[Port] {
        self.core().outports()
    }

    /// Port names are not checked for uniqueness; lookups return the first match.
    fn add_inport(&mut self, name: impl Into<String>) -> &mut Self {
        self.core_mut().push_port(name.into(), PortKind::In);
        self
    }

    fn add_outport(&mut self, name: impl Into<String>) -> &mut Self {
        self.core_mut().push_port(name.into(), PortKind::Out);
        self
    }

    /// In-ports are searched before out-ports.
    fn get_port(&self, name: &str) -> Result<Port> {
        self.core()
            .find_port(name)
            .cloned()
            .ok_or_else(|| DevsError::PortNotFound {
                model: self.name().to_string(),
                name: name.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atomic {
    core: ModelCore,
    kind: String,
    params: Vec<(String, String)>,
}

impl Atomic {
    pub fn new(name: impl Into<String>) -> Self {
        Self::of_kind(PLAIN_ATOMIC_KIND, name)
    }

    pub(crate) fn of_kind(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            core: ModelCore::new(name),
            kind: kind.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.set_param(key, value);
        self
    }

    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: fmt::Display,
    {
        for (key, value) in params {
            self.set_param(key, value);
        }
        self
    }

    /// Overwrites an existing parameter in place, otherwise appends it.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl fmt::Display) -> &mut Self {
        let key = key.into();
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key, value)),
        }
        self
    }

    /// The abstract model name used in `name@Kind` listings.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl PortOwner for Atomic {
    fn core(&self) -> &ModelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModelCore {
        &mut self.core
    }
}

impl fmt::Display for Atomic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.core.name, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupled {
    core: ModelCore,
    subcomponents: Vec<Model>,
    eic: Vec<Link>,
    ic: Vec<Link>,
    eoc: Vec<Link>,
}

impl Coupled {
    pub fn new(name: impl Into<String>, subcomponents: Vec<Model>) -> Self {
        Self {
            core: ModelCore::new(name),
            subcomponents,
            eic: Vec::new(),
            ic: Vec::new(),
            eoc: Vec::new(),
        }
    }

    pub fn subcomponents(&self) -> &[Model] {
        &self.subcomponents
    }

    pub fn subcomponent(&self, name: &str) -> Result<&Model> {
        self.subcomponents
            .iter()
            .find(|model| model.name() == name)
            .ok_or_else(|| DevsError::ComponentNotFound {
                model: self.core.name.clone(),
                name: name.to_string(),
            })
    }

    pub fn subcomponent_mut(&mut self, name: &str) -> Result<&mut Model> {
        let model_name = self.core.name.clone();
        self.subcomponents
            .iter_mut()
            .find(|model| model.name() == name)
            .ok_or(DevsError::ComponentNotFound {
                model: model_name,
                name: name.to_string(),
            })
    }

    pub fn add_subcomponent(&mut self, model: impl Into<Model>) -> &mut Self {
        self.subcomponents.push(model.into());
        self
    }

    pub fn eic(&self) -> &[Link] {
        &self.eic
    }

    pub fn ic(&self) -> &[Link] {
        &self.ic
    }

    pub fn eoc(&self) -> &[Link] {
        &self.eoc
    }

    /// All couplings in rendering order: EIC, then IC, then EOC.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.eic.iter().chain(self.ic.iter()).chain(self.eoc.iter())
    }

    pub fn resolve(&self, port_ref: PortRef) -> Result<Port> {
        match port_ref {
            PortRef::Direct(port) => Ok(port),
            PortRef::ByName(name) => self.get_port(&name),
            PortRef::Qualified { component, port } => self.subcomponent(&component)?.get_port(&port),
        }
    }

    /// Classifies the pair by port kind and stores it in EIC, IC or EOC.
    pub fn add_coupling(
        &mut self,
        from: impl Into<PortRef>,
        to: impl Into<PortRef>,
    ) -> Result<&mut Self> {
        let from = self.resolve(from.into())?;
        let to = self.resolve(to.into())?;
        let link = Link::new(from, to)?;
        tracing::trace!(
            model = %self.core.name,
            kind = ?link.kind(),
            "link {} -> {}",
            link.from_port().identifier_for(self.core.id),
            link.to_port().identifier_for(self.core.id)
        );
        match link.kind() {
            CouplingKind::ExternalInput => self.eic.push(link),
            CouplingKind::Internal => self.ic.push(link),
            CouplingKind::ExternalOutput => self.eoc.push(link),
        }
        Ok(self)
    }
}

impl PortOwner for Coupled {
    fn core(&self) -> &ModelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModelCore {
        &mut self.core
    }
}

impl fmt::Display for Coupled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.core.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Model {
    Atomic(Atomic),
    Coupled(Coupled),
}

impl Model {
    pub fn as_atomic(&self) -> Option<&Atomic> {
        match self {
            Model::Atomic(atomic) => Some(atomic),
            Model::Coupled(_) => None,
        }
    }

    pub fn as_coupled(&self) -> Option<&Coupled> {
        match self {
            Model::Atomic(_) => None,
            Model::Coupled(coupled) => Some(coupled),
        }
    }

    pub fn as_coupled_mut(&mut self) -> Option<&mut Coupled> {
        match self {
            Model::Atomic(_) => None,
            Model::Coupled(coupled) => Some(coupled),
        }
    }
}

impl PortOwner for Model {
    fn core(&self) -> &ModelCore {
        match self {
            Model::Atomic(atomic) => atomic.core(),
            Model::Coupled(coupled) => coupled.core(),
        }
    }

    fn core_mut(&mut self) -> &mut ModelCore {
        match self {
            Model::Atomic(atomic) => atomic.core_mut(),
            Model::Coupled(coupled) => coupled.core_mut(),
        }
    }
}

/// Component listing form: `name@Kind` for atomics, bare name for coupled models.
impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Atomic(atomic) => fmt::Display::fmt(atomic, f),
            Model::Coupled(coupled) => fmt::Display::fmt(coupled, f),
        }
    }
}

impl From<Atomic> for Model {
    fn from(atomic: Atomic) -> Self {
        Model::Atomic(atomic)
    }
}

impl From<Coupled> for Model {
    fn from(coupled: Coupled) -> Self {
        Model::Coupled(coupled)
    }
}

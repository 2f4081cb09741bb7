use crate::core::builder::CoupledBuilder;
use crate::core::display::DisplayOptions;
use crate::core::events::{Event, EventValue, VirtualTime};
use crate::core::registry::AtomicRegistry;
use crate::core::simulation::{Simulation, TOP_MODEL_NAME};
use crate::domain::model::{Atomic, Coupled, Model, PortOwner, PortRef, PLAIN_ATOMIC_KIND};
use crate::utils::error::{DevsError, Result};
use crate::utils::validation::{
    validate_identifier, validate_non_empty_string, validate_path, validate_required_field,
    validate_unique_names, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A project file: one top model, its external events and display flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project: ProjectInfo,
    pub model: ComponentConfig,
    pub events: Option<Vec<EventConfig>>,
    pub display: Option<DisplayOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub description: Option<String>,
    pub models_dir: Option<String>,
    pub working_dir: Option<String>,
    pub duration: Option<String>,
    pub logged_messages: Option<String>,
}

/// An atomic (`kind`) or coupled (`components` / `couplings`) model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub params: Option<toml::Table>,
    #[serde(rename = "in")]
    pub inports: Option<Vec<String>>,
    #[serde(rename = "out")]
    pub outports: Option<Vec<String>>,
    pub components: Option<Vec<ComponentConfig>>,
    /// `[from, to]` pairs of `port` or `port@component`.
    pub couplings: Option<Vec<[String; 2]>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    pub time: String,
    pub port: String,
    pub value: EventValue,
}

impl ComponentConfig {
    pub fn is_coupled(&self) -> bool {
        self.components.is_some() || self.couplings.is_some()
    }

    fn port_names(list: &Option<Vec<String>>) -> impl Iterator<Item = &str> {
        list.iter().flatten().map(String::as_str)
    }

    fn validate_at(&self, path: &str) -> Result<()> {
        if let Some(name) = &self.name {
            validate_identifier(&format!("{}.name", path), name)?;
        }
        for port in Self::port_names(&self.inports).chain(Self::port_names(&self.outports)) {
            validate_identifier(&format!("{}.ports", path), port)?;
        }
        validate_unique_names(&format!("{}.in", path), Self::port_names(&self.inports))?;
        validate_unique_names(&format!("{}.out", path), Self::port_names(&self.outports))?;

        if self.is_coupled() {
            if self.kind.is_some() || self.params.is_some() {
                return Err(DevsError::InvalidConfigValueError {
                    field: format!("{}.kind", path),
                    value: self.kind.clone().unwrap_or_default(),
                    reason: "A coupled model takes no kind or params".to_string(),
                });
            }
            let components = self.components.as_deref().unwrap_or_default();
            for (index, component) in components.iter().enumerate() {
                let child_path = format!("{}.components[{}]", path, index);
                validate_required_field(&format!("{}.name", child_path), &component.name)?;
                component.validate_at(&child_path)?;
            }
            validate_unique_names(
                &format!("{}.components", path),
                components.iter().filter_map(|c| c.name.as_deref()),
            )?;
            for [from, to] in self.couplings.iter().flatten() {
                from.parse::<PortRef>()?;
                to.parse::<PortRef>()?;
            }
        } else if let Some(kind) = &self.kind {
            validate_identifier(&format!("{}.kind", path), kind)?;
        }
        Ok(())
    }

    fn build_model(&self, registry: &AtomicRegistry) -> Result<Model> {
        let name = validate_required_field("component.name", &self.name)?;
        if self.is_coupled() {
            Ok(self.build_coupled(name, registry)?.into())
        } else {
            Ok(self.build_atomic(name, registry)?.into())
        }
    }

    fn build_atomic(&self, name: &str, registry: &AtomicRegistry) -> Result<Atomic> {
        let mut atomic = match self.kind.as_deref() {
            None | Some(PLAIN_ATOMIC_KIND) => Atomic::new(name),
            Some(kind) => registry.instantiate(kind, name)?,
        };
        for port in Self::port_names(&self.inports) {
            atomic.add_inport(port);
        }
        for port in Self::port_names(&self.outports) {
            atomic.add_outport(port);
        }
        for (key, value) in self.params.iter().flatten() {
            match value {
                toml::Value::String(text) => atomic.set_param(key.as_str(), text),
                other => atomic.set_param(key.as_str(), other),
            };
        }
        Ok(atomic)
    }

    fn build_coupled(&self, name: &str, registry: &AtomicRegistry) -> Result<Coupled> {
        let mut builder = CoupledBuilder::new(name);
        for port in Self::port_names(&self.inports) {
            builder = builder.inport(port);
        }
        for port in Self::port_names(&self.outports) {
            builder = builder.outport(port);
        }
        for component in self.components.iter().flatten() {
            builder = builder.component(component.build_model(registry)?);
        }
        for [from, to] in self.couplings.iter().flatten() {
            builder = builder.coupling(from.parse::<PortRef>()?, to.parse::<PortRef>()?);
        }
        builder.build()
    }
}

impl ProjectConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DevsError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DevsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DevsError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("project.name", &self.project.name)?;
        if let Some(dir) = &self.project.models_dir {
            validate_path("project.models_dir", dir)?;
        }
        if let Some(dir) = &self.project.working_dir {
            validate_path("project.working_dir", dir)?;
        }
        self.duration()?;

        let top_name = self.top_model_name();
        if top_name != TOP_MODEL_NAME {
            return Err(DevsError::TopModelNotNamedTop {
                name: top_name.to_string(),
            });
        }
        if self.model.kind.is_some() || self.model.params.is_some() {
            return Err(DevsError::InvalidConfigValueError {
                field: "model.kind".to_string(),
                value: self.model.kind.clone().unwrap_or_default(),
                reason: "The top model is always coupled".to_string(),
            });
        }
        self.model.validate_at("model")?;

        for (index, event) in self.events.iter().flatten().enumerate() {
            let field = format!("events[{}].port", index);
            validate_non_empty_string(&field, &event.port)?;
            event.time.parse::<VirtualTime>()?;
        }
        Ok(())
    }

    pub fn top_model_name(&self) -> &str {
        self.model.name.as_deref().unwrap_or(TOP_MODEL_NAME)
    }

    pub fn models_dir(&self) -> Option<PathBuf> {
        self.project.models_dir.as_ref().map(PathBuf::from)
    }

    pub fn working_dir(&self) -> Option<PathBuf> {
        self.project.working_dir.as_ref().map(PathBuf::from)
    }

    pub fn duration(&self) -> Result<Option<VirtualTime>> {
        self.project
            .duration
            .as_deref()
            .map(str::parse::<VirtualTime>)
            .transpose()
    }

    pub fn display_options(&self) -> DisplayOptions {
        self.display.clone().unwrap_or_default()
    }

    pub fn registry(&self) -> Result<AtomicRegistry> {
        AtomicRegistry::new(self.models_dir(), true)
    }

    pub fn build_top_model(&self, registry: &AtomicRegistry) -> Result<Coupled> {
        self.model.build_coupled(self.top_model_name(), registry)
    }

    pub fn build_events(&self) -> Result<Vec<Event>> {
        self.events
            .iter()
            .flatten()
            .map(|event| -> Result<Event> {
                Ok(Event::on_port_named(
                    event.time.parse()?,
                    event.port.as_str(),
                    event.value.clone(),
                ))
            })
            .collect()
    }

    pub fn build_simulation(&self, registry: &AtomicRegistry) -> Result<Simulation> {
        let mut simulation =
            Simulation::new(self.build_top_model(registry)?)?.with_events(self.build_events()?)?;
        if let Some(duration) = self.duration()? {
            simulation = simulation.with_duration(duration);
        }
        if let Some(messages) = &self.project.logged_messages {
            simulation = simulation.with_logged_messages(messages.as_str());
        }
        Ok(simulation)
    }
}

impl Validate for ProjectConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const QUEUE_PROJECT: &str = r#"
[project]
name = "queue-demo"
duration = "00:01:00:000"

[model]
in = ["incoming_event"]
out = ["emitted_signal"]
couplings = [["out@queue", "emitted_signal"], ["incoming_event", "in@queue"]]

[[model.components]]
name = "queue"
kind = "Queue"
params = { preparation = "0:0:5:0", capacity = 10 }

[[events]]
time = "00:00:10:000"
port = "incoming_event"
value = 1.5

[[events]]
time = "00:00:20:000"
port = "incoming_event"
value = [1.5, 2.3]
"#;

    #[test]
    fn test_parse_and_build_queue_project() {
        let config = ProjectConfig::from_toml_str(QUEUE_PROJECT).unwrap();
        config.validate().unwrap();
        assert_eq!(config.top_model_name(), "top");

        let registry = config.registry().unwrap();
        let top = config.build_top_model(&registry).unwrap();
        assert_eq!(
            top.to_ma(),
            "[top]\ncomponents: queue@Queue\nout: emitted_signal\nin: incoming_event\n\
             link: incoming_event in@queue\nlink: out@queue emitted_signal\n\n\n\
             [queue]\npreparation: 0:0:5:0\ncapacity: 10\n"
        );

        let events = config.build_events().unwrap();
        assert_eq!(events[1].serialize(), "00:00:20:000 incoming_event [1.5,2.3];");
    }

    #[test]
    fn test_build_simulation_from_project() {
        let config = ProjectConfig::from_toml_str(QUEUE_PROJECT).unwrap();
        let registry = config.registry().unwrap();
        let simulation = config.build_simulation(&registry).unwrap();
        assert_eq!(simulation.events().len(), 2);
        assert_eq!(simulation.duration(), Some(VirtualTime::of_minutes(1).unwrap()));
    }

    #[test]
    fn test_nested_coupled_component() {
        let toml_content = r#"
[project]
name = "nested"

[model]
in = ["in"]
couplings = [["in", "in@inner"]]

[[model.components]]
name = "inner"
in = ["in"]
couplings = [["in", "in@leaf"]]

[[model.components.components]]
name = "leaf"
in = ["in"]
"#;
        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        config.validate().unwrap();
        let top = config.build_top_model(&AtomicRegistry::empty()).unwrap();
        let inner = top.subcomponent("inner").unwrap().as_coupled().unwrap();
        assert_eq!(inner.eic().len(), 1);
        assert!(top.to_ma().contains("components: inner\n"));
        assert!(top.to_ma().contains("[leaf]\n"));
    }

    #[test]
    fn test_unknown_kind_fails_build() {
        let toml_content = r#"
[project]
name = "unknown"

[model]
components = [{ name = "x", kind = "Rocket" }]
"#;
        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        let err = config.build_top_model(&AtomicRegistry::empty()).unwrap_err();
        assert!(matches!(err, DevsError::NonExistingAtomicClass { .. }));
    }

    #[test]
    fn test_validation_rejects_non_top_name() {
        let toml_content = r#"
[project]
name = "misnamed"

[model]
name = "root"
components = []
"#;
        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate().unwrap_err(),
            DevsError::TopModelNotNamedTop { .. }
        ));
    }

    #[test]
    fn test_validation_rejects_duplicate_components() {
        let toml_content = r#"
[project]
name = "dups"

[model]
components = [{ name = "a" }, { name = "a" }]
"#;
        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_event_time() {
        let toml_content = r#"
[project]
name = "events"

[model]
in = ["in"]

[[events]]
time = "soon"
port = "in"
value = 1
"#;
        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate().unwrap_err(),
            DevsError::BadVirtualTime { .. }
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PRINGLES_TEST_MODELS_DIR", "/opt/models");

        let toml_content = r#"
[project]
name = "env"
models_dir = "${PRINGLES_TEST_MODELS_DIR}"

[model]
"#;
        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.models_dir(), Some(PathBuf::from("/opt/models")));

        std::env::remove_var("PRINGLES_TEST_MODELS_DIR");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(QUEUE_PROJECT.as_bytes()).unwrap();

        let config = ProjectConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.project.name, "queue-demo");
        assert!(config.display_options().show_port_name);
    }
}

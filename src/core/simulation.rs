use crate::core::events::{serialize_events, Event, VirtualTime};
use crate::core::serializers::MaSerializer;
use crate::domain::model::{Model, PortOwner};
use crate::domain::ports::{ArtifactStore, ModelSerializer};
use crate::utils::error::{DevsError, Result};
use std::path::PathBuf;

pub const TOP_MODEL_NAME: &str = "top";
pub const DEFAULT_LOGGED_MESSAGES: &str = "XY";

pub const MODEL_FILE_NAME: &str = "top_model";
pub const EVENTS_FILE_NAME: &str = "events";
pub const LOGS_FILE_NAME: &str = "logs";
pub const OUTPUT_FILE_NAME: &str = "output";

/// A top model plus everything the engine needs to run it.
#[derive(Debug, Clone)]
pub struct Simulation {
    top_model: Model,
    duration: Option<VirtualTime>,
    events: Vec<Event>,
    use_simulator_logs: bool,
    use_simulator_out: bool,
    logged_messages: String,
}

impl Simulation {
    pub fn new(top_model: impl Into<Model>) -> Result<Self> {
        let top_model = top_model.into();
        if top_model.name() != TOP_MODEL_NAME {
            return Err(DevsError::TopModelNotNamedTop {
                name: top_model.name().to_string(),
            });
        }
        Ok(Self {
            top_model,
            duration: None,
            events: Vec::new(),
            use_simulator_logs: true,
            use_simulator_out: true,
            logged_messages: DEFAULT_LOGGED_MESSAGES.to_string(),
        })
    }

    pub fn with_duration(mut self, duration: VirtualTime) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Every event must target a port of the top model.
    pub fn with_events(mut self, events: Vec<Event>) -> Result<Self> {
        for event in &events {
            self.top_model.get_port(&event.port)?;
        }
        self.events = events;
        Ok(self)
    }

    pub fn with_logs(mut self, enabled: bool) -> Self {
        self.use_simulator_logs = enabled;
        self
    }

    pub fn with_output(mut self, enabled: bool) -> Self {
        self.use_simulator_out = enabled;
        self
    }

    pub fn with_logged_messages(mut self, messages: impl Into<String>) -> Self {
        self.logged_messages = messages.into();
        self
    }

    pub fn top_model(&self) -> &Model {
        &self.top_model
    }

    pub fn duration(&self) -> Option<VirtualTime> {
        self.duration
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// Paths written for one run and the engine arguments that reference them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedSimulation {
    pub model_path: PathBuf,
    pub events_path: Option<PathBuf>,
    pub logs_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub engine_args: Vec<String>,
}

pub struct SimulationExporter<S: ArtifactStore> {
    store: S,
}

impl<S: ArtifactStore> SimulationExporter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn export(&self, simulation: &Simulation) -> Result<ExportedSimulation> {
        let ma = MaSerializer.serialize(simulation.top_model())?;
        let model_path = self.store.write_file(MODEL_FILE_NAME, ma.as_bytes())?;
        tracing::debug!("Model written to {}", model_path.display());

        let mut engine_args = vec![
            format!("-m{}", model_path.display()),
            format!("-L{}", simulation.logged_messages),
        ];
        if let Some(duration) = simulation.duration {
            engine_args.push(format!("-t{}", duration));
        }

        let events_path = if simulation.events.is_empty() {
            None
        } else {
            let path = self
                .store
                .write_file(EVENTS_FILE_NAME, serialize_events(&simulation.events).as_bytes())?;
            tracing::debug!("{} events written to {}", simulation.events.len(), path.display());
            engine_args.push(format!("-e{}", path.display()));
            Some(path)
        };

        let logs_path = simulation.use_simulator_logs.then(|| self.store.path_of(LOGS_FILE_NAME));
        if let Some(path) = &logs_path {
            engine_args.push(format!("-l{}", path.display()));
        }
        let output_path = simulation.use_simulator_out.then(|| self.store.path_of(OUTPUT_FILE_NAME));
        if let Some(path) = &output_path {
            engine_args.push(format!("-o{}", path.display()));
        }

        Ok(ExportedSimulation {
            model_path,
            events_path,
            logs_path,
            output_path,
            engine_args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Atomic, Coupled};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;

    #[derive(Default)]
    struct MockStore {
        files: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl ArtifactStore for MockStore {
        fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
            self.files.borrow_mut().insert(name.to_string(), data.to_vec());
            Ok(self.path_of(name))
        }

        fn path_of(&self, name: &str) -> PathBuf {
            Path::new("/run").join(name)
        }
    }

    fn queue_top() -> Coupled {
        let mut queue = Atomic::new("queue").with_param("preparation", "0:0:5:0");
        queue.add_inport("in").add_outport("out");
        let (queue_in, queue_out) = (queue.get_port("in").unwrap(), queue.get_port("out").unwrap());
        let mut top = Coupled::new("top", vec![queue.into()]);
        top.add_inport("incoming_event").add_outport("emitted_signal");
        top.add_coupling(&queue_out, "emitted_signal")
            .unwrap()
            .add_coupling("incoming_event", &queue_in)
            .unwrap();
        top
    }

    #[test]
    fn test_top_model_must_be_named_top() {
        let err = Simulation::new(Coupled::new("empty_coupled", vec![])).unwrap_err();
        assert!(matches!(err, DevsError::TopModelNotNamedTop { .. }));
    }

    #[test]
    fn test_events_must_target_top_ports() {
        let events = vec![Event::on_port_named(VirtualTime::of_seconds(1).unwrap(), "nowhere", 1.0)];
        let err = Simulation::new(queue_top()).unwrap().with_events(events).unwrap_err();
        assert!(matches!(err, DevsError::PortNotFound { .. }));
    }

    #[test]
    fn test_export_writes_model_and_events() {
        let events = vec![
            Event::on_port_named(VirtualTime::of_seconds(10).unwrap(), "incoming_event", 1.5),
            Event::on_port_named(VirtualTime::of_seconds(20).unwrap(), "incoming_event", 20.0),
        ];
        let simulation = Simulation::new(queue_top())
            .unwrap()
            .with_duration(VirtualTime::of_minutes(1).unwrap())
            .with_events(events)
            .unwrap();

        let exporter = SimulationExporter::new(MockStore::default());
        let exported = exporter.export(&simulation).unwrap();

        assert_eq!(
            exported.engine_args,
            vec![
                "-m/run/top_model",
                "-LXY",
                "-t00:01:00:000",
                "-e/run/events",
                "-l/run/logs",
                "-o/run/output"
            ]
        );
        let files = exporter.store().files.borrow();
        let ma = String::from_utf8(files["top_model"].clone()).unwrap();
        assert!(ma.contains("link: incoming_event in@queue\nlink: out@queue emitted_signal\n"));
        assert_eq!(
            String::from_utf8(files["events"].clone()).unwrap(),
            "00:00:10:000 incoming_event 1.5;\n00:00:20:000 incoming_event 20;\n"
        );
    }

    #[test]
    fn test_export_without_optional_artifacts() {
        let simulation = Simulation::new(queue_top())
            .unwrap()
            .with_logs(false)
            .with_output(false)
            .with_logged_messages("X");
        let exporter = SimulationExporter::new(MockStore::default());
        let exported = exporter.export(&simulation).unwrap();
        assert_eq!(exported.engine_args, vec!["-m/run/top_model", "-LX"]);
        assert!(exported.events_path.is_none());
        assert!(!exporter.store().files.borrow().contains_key("events"));
    }
}

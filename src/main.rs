use anyhow::Context;
use clap::Parser;
use pringles::utils::{logger, validation::Validate};
use pringles::{
    diagram_url, AtomicRegistry, CliConfig, Command, LocalWorkspace, Model, OutputFormat,
    ProjectConfig, SimulationExporter,
};
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting pringles CLI");
    tracing::debug!("CLI config: {:?}", config);

    match config.command {
        Command::Discover { models_dir } => discover(models_dir),
        Command::Render { project, format } => render(&project, format),
        Command::Export {
            project,
            working_dir,
        } => export(&project, working_dir),
        Command::DisplayUrl { project } => display_url(&project),
    }
}

fn load_project(path: &Path) -> anyhow::Result<ProjectConfig> {
    let project = ProjectConfig::from_file(path)
        .with_context(|| format!("Failed to read project file {}", path.display()))?;

    if let Err(e) = project.validate() {
        tracing::error!("❌ Project validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    Ok(project)
}

fn discover(models_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let registry = AtomicRegistry::new(models_dir, true)?;
    for kind in registry.kinds() {
        println!(
            "{}  in: [{}]  out: [{}]",
            kind.name(),
            kind.input_ports().join(", "),
            kind.output_ports().join(", ")
        );
    }
    tracing::info!("{} atomic kinds available", registry.len());
    Ok(())
}

fn render(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let project = load_project(path)?;
    let registry = project.registry()?;
    let top: Model = project.build_top_model(&registry)?.into();

    match format {
        OutputFormat::Ma => print!("{}", top.to_ma()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&top.to_dict())?),
    }
    Ok(())
}

fn export(path: &Path, working_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let project = load_project(path)?;
    let registry = project.registry()?;
    let simulation = project.build_simulation(&registry)?;

    let working_dir = working_dir
        .or_else(|| project.working_dir())
        .unwrap_or_else(|| PathBuf::from("."));
    let workspace = LocalWorkspace::timestamped(&working_dir)?;
    let exporter = SimulationExporter::new(workspace);

    match exporter.export(&simulation) {
        Ok(exported) => {
            tracing::info!("✅ Simulation exported for project {}", project.project.name);
            tracing::info!("📁 Output saved to: {}", exporter.store().output_dir().display());
            println!("{}", exported.engine_args.join(" "));
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Export failed: {}", e);
            Err(e.into())
        }
    }
}

fn display_url(path: &Path) -> anyhow::Result<()> {
    let project = load_project(path)?;
    let registry = project.registry()?;
    let top: Model = project.build_top_model(&registry)?.into();
    println!("{}", diagram_url(&top, &project.display_options())?);
    Ok(())
}

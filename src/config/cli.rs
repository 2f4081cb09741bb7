use crate::domain::ports::ArtifactStore;
use crate::utils::error::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Run artifacts written to a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    output_dir: PathBuf,
}

impl LocalWorkspace {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// A fresh `<working_dir>/<YYYY-MM-DD-HHMMSS>-<nanos>` directory.
    pub fn timestamped(working_dir: &Path) -> Result<Self> {
        let now = Local::now();
        let dir_name = format!(
            "{}-{:09}",
            now.format("%Y-%m-%d-%H%M%S"),
            now.timestamp_subsec_nanos()
        );
        let output_dir = working_dir.join(dir_name);
        fs::create_dir_all(&output_dir)?;
        tracing::debug!("Created output directory {}", output_dir.display());
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ArtifactStore for LocalWorkspace {
    fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let full_path = self.path_of(name);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        Ok(full_path)
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

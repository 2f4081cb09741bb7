use crate::domain::model::Model;
use crate::utils::error::Result;
use std::path::PathBuf;

/// Text of a candidate atomic model source, with a label for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub origin: String,
    pub text: String,
}

pub trait AtomicSource {
    fn describe(&self) -> String;
    fn source_files(&self) -> Result<Vec<SourceFile>>;
}

pub trait ModelSerializer {
    fn serialize(&self, model: &Model) -> Result<String>;
}

pub trait ArtifactStore {
    /// Writes `data` under `name` and returns the full path written.
    fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf>;
    fn path_of(&self, name: &str) -> PathBuf;
}

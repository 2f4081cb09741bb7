use crate::domain::ports::{AtomicSource, SourceFile};
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const SUPPORTED_FILE_EXTENSIONS: [&str; 3] = ["cpp", "hpp", "h"];

/// Atomic descriptors shipped with the crate (CD++ standard models).
const BUILTIN_DESCRIPTORS: [(&str, &str); 4] = [
    ("builtin/cpu.h", include_str!("../../builtin/cpu.h")),
    ("builtin/generator.h", include_str!("../../builtin/generator.h")),
    ("builtin/queue.h", include_str!("../../builtin/queue.h")),
    ("builtin/transducer.h", include_str!("../../builtin/transducer.h")),
];

pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_FILE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Regular files with a supported extension directly inside a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn candidate_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && has_supported_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl AtomicSource for DirectorySource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn source_files(&self) -> Result<Vec<SourceFile>> {
        self.candidate_paths()?
            .into_iter()
            .map(|path| -> Result<SourceFile> {
                let text = fs::read_to_string(&path)?;
                Ok(SourceFile {
                    origin: path.display().to_string(),
                    text,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl AtomicSource for BuiltinSource {
    fn describe(&self) -> String {
        "built-in models".to_string()
    }

    fn source_files(&self) -> Result<Vec<SourceFile>> {
        Ok(BUILTIN_DESCRIPTORS
            .iter()
            .map(|(origin, text)| SourceFile {
                origin: origin.to_string(),
                text: text.to_string(),
            })
            .collect())
    }
}

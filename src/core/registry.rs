use crate::core::atomic_kind::AtomicKind;
use crate::core::metadata;
use crate::core::sources::{BuiltinSource, DirectorySource};
use crate::domain::model::Atomic;
use crate::domain::ports::AtomicSource;
use crate::utils::error::{DevsError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Atomic kinds known to a session, keyed by kind name.
#[derive(Debug, Clone, Default)]
pub struct AtomicRegistry {
    user_models_dir: Option<PathBuf>,
    kinds: HashMap<String, AtomicKind>,
    order: Vec<String>,
}

impl AtomicRegistry {
    /// Builds a registry and, when `autodiscover` is set, runs discovery
    /// over the built-in descriptors and `user_models_dir`.
    pub fn new(user_models_dir: Option<PathBuf>, autodiscover: bool) -> Result<Self> {
        let mut registry = Self {
            user_models_dir,
            ..Self::default()
        };
        if autodiscover {
            registry.discover_atomics()?;
        }
        Ok(registry)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn user_models_dir(&self) -> Option<&Path> {
        self.user_models_dir.as_deref()
    }

    /// Rebuilds the registry from the built-in descriptors and the user
    /// directory, if any. On error the previous contents are kept.
    pub fn discover_atomics(&mut self) -> Result<()> {
        let mut fresh = Self::empty();
        fresh.discover_from(&BuiltinSource)?;
        if let Some(dir) = &self.user_models_dir {
            fresh.discover_from(&DirectorySource::new(dir.clone()))?;
        }

        self.kinds = fresh.kinds;
        self.order = fresh.order;
        tracing::info!("Registered {} atomic kinds", self.order.len());
        Ok(())
    }

    /// Registers every source file of `source` that carries metadata.
    /// Files without metadata are skipped; returns how many kinds were added.
    pub fn discover_from(&mut self, source: &dyn AtomicSource) -> Result<usize> {
        tracing::debug!("Discovering atomics in {}", source.describe());
        let mut added = 0;
        for file in source.source_files()? {
            let discovered = match metadata::extract(&file.text) {
                Ok(discovered) => discovered,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", file.origin, e);
                    continue;
                }
            };
            let kind = AtomicKind::try_from(discovered)?;
            tracing::debug!("Discovered atomic {} in {}", kind.name(), file.origin);
            self.register(kind)?;
            added += 1;
        }
        Ok(added)
    }

    pub fn register(&mut self, kind: AtomicKind) -> Result<()> {
        if self.kinds.contains_key(kind.name()) {
            return Err(DevsError::DuplicatedAtomic {
                name: kind.name().to_string(),
            });
        }
        self.order.push(kind.name().to_string());
        self.kinds.insert(kind.name().to_string(), kind);
        Ok(())
    }

    pub fn get_by_name(&self, name: &str) -> Result<&AtomicKind> {
        self.kinds
            .get(name)
            .ok_or_else(|| DevsError::NonExistingAtomicClass {
                name: name.to_string(),
            })
    }

    pub fn instantiate(&self, kind: &str, instance_name: impl Into<String>) -> Result<Atomic> {
        Ok(self.get_by_name(kind)?.instantiate(instance_name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &AtomicKind> {
        self.order.iter().filter_map(|name| self.kinds.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

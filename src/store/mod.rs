//! The component store gateway.
//!
//! The engine never touches the disk directly; everything it reads or
//! writes goes through [`ComponentStore`]. The trait keeps the core
//! testable (tests substitute an in-memory store) and keeps the on-disk
//! layout in exactly one place, [`LocalComponentStore`]:
//!
//! ```text
//! <root>/recipes/<name>-<version>.yaml
//! <root>/artifacts/<name>/<version>/...
//! ```
//!
//! Recipe persistence is atomic (write to a temporary file, sync,
//! rename) so a crashed batch never leaves a half-written recipe for the
//! rest of the deployment pipeline to trip over.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::{ComponentIdentifier, ReforgeError};
use crate::recipe::{io, Recipe};

/// Trailing suffix that marks a file as sidecar metadata rather than a
/// recipe. Such files are skipped by [`ComponentStore::list_recipes`].
pub const SIDECAR_METADATA_SUFFIX: &str = ".metadata.json";

/// Read/write/delete surface of the component store.
///
/// The engine assumes exclusive write access for the duration of one
/// `process` call; a write through
/// [`save_package_recipe`](Self::save_package_recipe) is visible to any
/// subsequent read in the same call.
pub trait ComponentStore {
    /// Parse every recipe under `dir` (recursively).
    ///
    /// Directories and sidecar-metadata files are skipped. Fails fast on
    /// the first unparseable recipe, naming the offending file.
    fn list_recipes(&self, dir: &Path) -> Result<Vec<(PathBuf, Recipe)>>;

    /// Persist a serialized recipe for `identifier`.
    ///
    /// Idempotent: overwrites any existing recipe for the same
    /// identifier.
    fn save_package_recipe(&self, identifier: &ComponentIdentifier, serialized: &str) -> Result<()>;

    /// Remove the recipe persisted for `identifier`, if any.
    fn delete_component(&self, identifier: &ComponentIdentifier) -> Result<()>;

    /// Directory holding `identifier`'s artifacts. Pure function of the
    /// identifier and the store root; the directory need not exist.
    fn resolve_artifact_directory_path(&self, identifier: &ComponentIdentifier) -> PathBuf;
}

/// Component store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalComponentStore {
    root: PathBuf,
}

impl LocalComponentStore {
    /// A store rooted at `root`. The directory tree is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's recipe directory.
    pub fn recipe_directory(&self) -> PathBuf {
        self.root.join("recipes")
    }

    /// The store's artifact directory.
    pub fn artifact_directory(&self) -> PathBuf {
        self.root.join("artifacts")
    }

    fn recipe_file_path(&self, identifier: &ComponentIdentifier) -> PathBuf {
        self.recipe_directory().join(format!("{identifier}.yaml"))
    }
}

/// Whether a directory entry is a recipe candidate: a regular file whose
/// name does not carry the sidecar-metadata suffix.
fn is_recipe_candidate(path: &Path) -> bool {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => !name.ends_with(SIDECAR_METADATA_SUFFIX),
        None => false,
    }
}

/// Write `content` to `path` atomically: temp file, sync, rename.
fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)
}

impl ComponentStore for LocalComponentStore {
    fn list_recipes(&self, dir: &Path) -> Result<Vec<(PathBuf, Recipe)>> {
        let mut recipes = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                ReforgeError::StoreIo {
                    operation: "walk".to_string(),
                    path,
                    source: e.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            if !is_recipe_candidate(&path) {
                debug!(file = %path.display(), "skipping sidecar metadata");
                continue;
            }
            let recipe = io::parse_file(&path)?;
            recipes.push((path, recipe));
        }
        Ok(recipes)
    }

    fn save_package_recipe(&self, identifier: &ComponentIdentifier, serialized: &str) -> Result<()> {
        let path = self.recipe_file_path(identifier);
        atomic_write(&path, serialized).map_err(|source| ReforgeError::StoreIo {
            operation: "save".to_string(),
            path: path.clone(),
            source,
        })?;
        debug!(recipe = %identifier, file = %path.display(), "recipe persisted");
        Ok(())
    }

    fn delete_component(&self, identifier: &ComponentIdentifier) -> Result<()> {
        let path = self.recipe_file_path(identifier);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ReforgeError::StoreIo {
                operation: "delete".to_string(),
                path,
                source,
            }
            .into()),
        }
    }

    fn resolve_artifact_directory_path(&self, identifier: &ComponentIdentifier) -> PathBuf {
        self.artifact_directory()
            .join(&identifier.name)
            .join(identifier.version.to_string())
    }
}

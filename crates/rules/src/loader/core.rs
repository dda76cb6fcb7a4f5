//! Core [`RuleLoader`] struct: filesystem-backed rule loading with optional hot-reload.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::schema::{RuleDocument, RuleEnvelope};

use super::error::{LoadResult, LoadStatus, Result, RuleError};
use super::watcher::{handle_fs_event, is_rule_file, WatchState};

/// Parse YAML text into a [`RuleDocument`] via two-pass deserialization.
///
/// First pass: deserialize as [`RuleEnvelope`] to read the `kind` field.
/// Second pass: reconstruct and deserialize into the kind-specific type.
/// Location constraints are validated (resource selector, pattern, score).
pub fn parse_document(contents: &str) -> Result<RuleDocument> {
    let envelope: RuleEnvelope = serde_yaml::from_str(contents)?;

    if envelope.metadata.id.is_empty() {
        return Err(RuleError::Validation(
            "metadata.id must not be empty".to_string(),
        ));
    }

    let doc = envelope.parse_full().map_err(|e| {
        RuleError::Validation(format!("failed to parse '{}': {}", envelope.metadata.id, e))
    })?;
    if let RuleDocument::Location(constraint) = &doc {
        constraint.validate()?;
    }
    Ok(doc)
}

/// Filesystem-backed rule loader with optional hot-reload.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` files, deserializes
/// them into [`RuleDocument`] instances via two-pass deserialization, and
/// maintains an in-memory map keyed by document ID.
pub struct RuleLoader {
    /// Root directory containing rule YAML files.
    rules_dir: PathBuf,
    /// Documents, source files and reload counter shared with the watcher.
    pub(super) state: WatchState,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl RuleLoader {
    /// Create a new loader for the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist.
    pub fn new(rules_dir: PathBuf) -> Self {
        if !rules_dir.exists() {
            if let Err(e) = fs::create_dir_all(&rules_dir) {
                warn!(path = %rules_dir.display(), error = %e, "failed to create rules directory");
            }
        }
        Self {
            rules_dir,
            state: WatchState {
                documents: Arc::new(RwLock::new(HashMap::new())),
                sources: Arc::new(RwLock::new(HashMap::new())),
                generation: Arc::new(AtomicU64::new(0)),
            },
            _watcher: None,
        }
    }

    /// Recursively scan the rules directory and load all YAML files.
    ///
    /// Dotfiles (filenames starting with `.`) and non-YAML files are skipped.
    /// Subdirectories are scanned recursively.
    /// Parse errors are reported per-file but do not abort the scan.
    pub fn load_all(&self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        self.scan_dir_recursive(&self.rules_dir, &mut results)?;
        self.state.bump();
        Ok(results)
    }

    fn scan_dir_recursive(&self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        // Deterministic load order; later files win on duplicate ids
        paths.sort();

        for path in paths {
            let is_dotfile = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with('.'));
            if is_dotfile {
                if path.is_file() {
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Skipped {
                            reason: "dotfile".to_string(),
                        },
                    });
                }
                continue;
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            if !is_rule_file(&path) {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            match self.load_file(&path) {
                Ok(doc) => {
                    let doc_id = doc.metadata().id.clone();
                    let kind = doc.kind();
                    info!(doc_id = %doc_id, %kind, path = %path.display(), "loaded rule document");
                    self.state.insert(&path, doc);
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded { doc_id, kind },
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule file");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(())
    }

    /// Parse a single YAML file into a [`RuleDocument`].
    pub fn load_file(&self, path: &Path) -> Result<RuleDocument> {
        let contents = fs::read_to_string(path)?;
        parse_document(&contents)
    }

    /// Start a filesystem watcher with 500ms debounce.
    ///
    /// On file create/modify the document is re-parsed and upserted.
    /// On file delete the document loaded from that file is removed.
    /// Parse errors are logged as warnings; the previous version is kept.
    pub fn watch(&mut self) -> Result<()> {
        let state = self.state.clone();

        let mut watcher = notify::recommended_watcher(move |res: std::result::Result<notify::Event, notify::Error>| {
            match res {
                Ok(event) => handle_fs_event(&event, &state),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            }
        })?;

        watcher.watch(&self.rules_dir, RecursiveMode::Recursive)?;

        let _ = watcher.configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(path = %self.rules_dir.display(), "watching rules directory for changes (recursive)");
        self._watcher = Some(watcher);
        Ok(())
    }

    /// Get the rules directory path.
    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    /// Get the shared documents map containing all document kinds.
    pub fn documents(&self) -> Arc<RwLock<HashMap<String, RuleDocument>>> {
        Arc::clone(&self.state.documents)
    }

    /// Clone of a single document.
    pub fn get(&self, id: &str) -> Option<RuleDocument> {
        self.state
            .documents
            .read()
            .expect("documents lock poisoned")
            .get(id)
            .cloned()
    }

    /// All documents, sorted by id.
    pub fn snapshot(&self) -> Vec<RuleDocument> {
        let guard = self.state.documents.read().expect("documents lock poisoned");
        let mut docs: Vec<_> = guard.values().cloned().collect();
        docs.sort_by(|a, b| a.metadata().id.cmp(&b.metadata().id));
        docs
    }

    /// Counter bumped every time the in-memory set changes.
    ///
    /// Lets a caller that is sleeping between evaluations notice a reload.
    pub fn generation(&self) -> u64 {
        self.state.generation.load(Ordering::SeqCst)
    }

    /// Atomically write a rule document to a YAML file.
    ///
    /// Writes to a `.tmp` file first, then renames to the final path to
    /// avoid partial writes on crash.
    pub fn write_document(&self, doc: &RuleDocument) -> Result<PathBuf> {
        if let RuleDocument::Location(constraint) = doc {
            constraint.validate()?;
        }

        let meta = doc.metadata();
        let final_path = self.rules_dir.join(format!("{}.yml", meta.id));
        let tmp_path = self.rules_dir.join(format!(".{}.tmp", meta.id));

        let yaml = doc.to_yaml()?;
        fs::write(&tmp_path, yaml)?;
        fs::rename(&tmp_path, &final_path)?;

        info!(doc_id = %meta.id, kind = %doc.kind(), path = %final_path.display(), "wrote rule file");

        self.state.insert(&final_path, doc.clone());
        self.state.bump();
        Ok(final_path)
    }

    /// Delete the file a document was loaded from, by document ID.
    ///
    /// Falls back to `<id>.yml` / `<id>.yaml` in the rules directory.
    /// Removes both the file and the in-memory entry.
    pub fn delete_document(&self, id: &str) -> Result<()> {
        let path = self
            .state
            .source_of(id)
            .or_else(|| {
                [format!("{id}.yml"), format!("{id}.yaml")]
                    .into_iter()
                    .map(|name| self.rules_dir.join(name))
                    .find(|p| p.exists())
            })
            .ok_or_else(|| RuleError::Validation(format!("no rule file found for id '{}'", id)))?;

        fs::remove_file(&path)?;
        self.state.remove_path(&path);
        self.state.remove_id(id);
        self.state.bump();

        info!(doc_id = %id, path = %path.display(), "deleted rule document");
        Ok(())
    }
}

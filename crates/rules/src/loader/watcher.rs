//! Filesystem event handler for the notify watcher (hot-reload).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tracing::{info, warn};

use crate::schema::RuleDocument;

use super::core::parse_document;

/// In-memory document set shared between a [`super::RuleLoader`] and its
/// watcher thread.
#[derive(Clone)]
pub(super) struct WatchState {
    pub(super) documents: Arc<RwLock<HashMap<String, RuleDocument>>>,
    /// Which document id each file produced.
    pub(super) sources: Arc<RwLock<HashMap<PathBuf, String>>>,
    pub(super) generation: Arc<AtomicU64>,
}

impl WatchState {
    /// Upsert a document loaded from `path`. If the file previously held a
    /// document with a different id, that document is dropped.
    pub(super) fn insert(&self, path: &Path, doc: RuleDocument) {
        let id = doc.metadata().id.clone();
        let previous = self
            .sources
            .write()
            .expect("sources lock poisoned")
            .insert(path.to_path_buf(), id.clone());

        let mut documents = self.documents.write().expect("documents lock poisoned");
        if let Some(previous) = previous.filter(|prev| *prev != id) {
            documents.remove(&previous);
        }
        documents.insert(id, doc);
    }

    /// Remove the document that was loaded from `path`.
    pub(super) fn remove_path(&self, path: &Path) -> Option<String> {
        let id = self.sources.write().expect("sources lock poisoned").remove(path)?;
        self.documents.write().expect("documents lock poisoned").remove(&id);
        Some(id)
    }

    pub(super) fn remove_id(&self, id: &str) {
        self.sources
            .write()
            .expect("sources lock poisoned")
            .retain(|_, source_id| source_id != id);
        self.documents.write().expect("documents lock poisoned").remove(id);
    }

    pub(super) fn source_of(&self, id: &str) -> Option<PathBuf> {
        self.sources
            .read()
            .expect("sources lock poisoned")
            .iter()
            .find(|(_, source_id)| source_id.as_str() == id)
            .map(|(path, _)| path.clone())
    }

    pub(super) fn bump(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Whether `path` names a YAML rule file (by extension).
pub(super) fn is_rule_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "yml" || e == "yaml")
}

/// Handle a single filesystem event from the notify watcher.
pub(super) fn handle_fs_event(event: &Event, state: &WatchState) {
    for path in &event.paths {
        if !is_rule_file(path) {
            continue;
        }

        // Skip dotfiles (including our .tmp files)
        let is_dotfile = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with('.'));
        if is_dotfile {
            continue;
        }

        match &event.kind {
            EventKind::Create(CreateKind::File)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_)) => reload_file(path, state),
            EventKind::Remove(RemoveKind::File) => remove_file(path, state),
            _ => {}
        }
    }
}

fn reload_file(path: &Path, state: &WatchState) {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        // Renamed away
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            remove_file(path, state);
            return;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file during hot-reload");
            return;
        }
    };

    match parse_document(&contents) {
        Ok(doc) => {
            info!(doc_id = %doc.metadata().id, kind = %doc.kind(), path = %path.display(), "hot-reloaded rule document");
            state.insert(path, doc);
            state.bump();
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to parse rule document during hot-reload, keeping previous version"
            );
        }
    }
}

fn remove_file(path: &Path, state: &WatchState) {
    if let Some(id) = state.remove_path(path) {
        info!(doc_id = %id, path = %path.display(), "removed rule document after file deletion");
        state.bump();
    }
}

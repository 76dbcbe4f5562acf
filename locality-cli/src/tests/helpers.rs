//! Test helpers for source fixtures and an observable destination store.

use super::*;
use crate::import::{StoreBuilder, StoreConfig};
use camino::{Utf8Path, Utf8PathBuf};
use locality_core::test_support::MemoryDocumentStore;
use locality_core::{BatchWriter, CommitError, LocationRecord};
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

/// Hierarchy with one Tunis delegation holding two cities.
pub(super) const LA_MARSA_SOURCE: &str = r#"{
  "fr": { "Tunisie": { "governorates": [
    { "nom": "Tunis", "code": "11", "latitude": 36.8065, "longitude": 10.1815,
      "delegations": [
        { "nom": "La Marsa", "cites": ["Alpha", "Beta"] },
        { "nom": "Carthage", "cites": [] }
      ] }
  ] } }
}"#;

/// Temporary directory with UTF-8 path helpers.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture");
}

/// Source document with `cities` cities in a single delegation.
pub(super) fn source_with_cities(cities: usize) -> String {
    let names: Vec<String> = (0..cities).map(|n| format!("Cité {n:04}")).collect();
    serde_json::json!({
        "fr": { "Tunisie": { "governorates": [{
            "nom": "Sfax",
            "code": 61,
            "latitude": 34.7406,
            "longitude": 10.7603,
            "delegations": [{ "nom": "Sfax Ville", "cites": names }],
        }] } }
    })
    .to_string()
}

/// `BatchWriter` handing batches to a store the test keeps a handle on.
struct SharedStore(Rc<RefCell<MemoryDocumentStore>>);

impl BatchWriter for SharedStore {
    fn commit_batch(&mut self, batch: &[LocationRecord]) -> Result<(), CommitError> {
        self.0.borrow_mut().commit_batch(batch)
    }
}

/// Builder returning a shared in-memory store and remembering the request.
#[derive(Debug, Default)]
pub(super) struct RecordingStoreBuilder {
    store: Rc<RefCell<MemoryDocumentStore>>,
    requested: RefCell<Option<StoreConfig>>,
}

impl RecordingStoreBuilder {
    pub(super) fn failing_at(attempt: usize) -> Self {
        Self {
            store: Rc::new(RefCell::new(MemoryDocumentStore::failing_at(attempt))),
            requested: RefCell::new(None),
        }
    }

    pub(super) fn store(&self) -> std::cell::Ref<'_, MemoryDocumentStore> {
        self.store.borrow()
    }

    pub(super) fn requested(&self) -> Option<StoreConfig> {
        self.requested.borrow().clone()
    }
}

impl StoreBuilder for RecordingStoreBuilder {
    fn build(&self, config: &StoreConfig) -> Result<Box<dyn BatchWriter>, CliError> {
        self.requested.replace(Some(config.clone()));
        Ok(Box::new(SharedStore(Rc::clone(&self.store))))
    }
}

//! Doble en memoria del almacén remoto para los tests del coordinador.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use lira_core::domain::{LibraryDocument, RawLibraryDocument};
use lira_core::ports::{FileLookup, RemoteStore, StoreError};
use serde_json::{Value, json};

#[derive(Default)]
pub struct InMemoryStore {
  files: Mutex<HashMap<String, Value>>,
  active: Mutex<Option<String>>,
  fail_saves: AtomicBool,
  fail_creates: AtomicBool,
  respond_with: Mutex<Option<Value>>,
  saves: AtomicUsize,
  creates: AtomicUsize,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Almacén con un fichero ya existente en `folder/name`.
  pub fn with_file(folder: &str, name: &str, content: Value) -> Self {
    let store = Self::default();
    store.files.lock().unwrap().insert(file_id(folder, name), content);
    store
  }

  pub fn fail_saves(&self, fail: bool) {
    self.fail_saves.store(fail, Ordering::SeqCst);
  }

  pub fn fail_creates(&self, fail: bool) {
    self.fail_creates.store(fail, Ordering::SeqCst);
  }

  /// Hace que el próximo guardado almacene y devuelva `content` en lugar
  /// del documento recibido, como un servidor que reescribe lo que guarda.
  pub fn respond_with(&self, content: Value) {
    *self.respond_with.lock().unwrap() = Some(content);
  }

  pub fn save_count(&self) -> usize {
    self.saves.load(Ordering::SeqCst)
  }

  pub fn create_count(&self) -> usize {
    self.creates.load(Ordering::SeqCst)
  }

  pub fn stored(&self, folder: &str, name: &str) -> Option<Value> {
    self.files.lock().unwrap().get(&file_id(folder, name)).cloned()
  }
}

pub fn file_id(folder: &str, name: &str) -> String {
  format!("{folder}/{name}")
}

fn decode(value: Value) -> Result<RawLibraryDocument, StoreError> {
  serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl RemoteStore for InMemoryStore {
  async fn find_file(&self, file_name: &str, folder_path: &str) -> Result<FileLookup, StoreError> {
    let id = file_id(folder_path, file_name);
    if self.files.lock().unwrap().contains_key(&id) {
      Ok(FileLookup::found(id, folder_path))
    } else {
      Ok(FileLookup::missing())
    }
  }

  async fn load_library_by_id(&self, file_id: &str) -> Result<RawLibraryDocument, StoreError> {
    let content = self.files.lock().unwrap().get(file_id).cloned();
    let content = content.ok_or_else(|| StoreError::NotFound(file_id.to_string()))?;
    *self.active.lock().unwrap() = Some(file_id.to_string());
    decode(content)
  }

  async fn save_library(&self, document: &LibraryDocument) -> Result<RawLibraryDocument, StoreError> {
    self.saves.fetch_add(1, Ordering::SeqCst);
    if self.fail_saves.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable("quota exceeded".into()));
    }
    let id = self.active.lock().unwrap().clone().ok_or(StoreError::NotOpen)?;
    let value = match self.respond_with.lock().unwrap().take() {
      Some(rewritten) => rewritten,
      None => serde_json::to_value(document).map_err(|e| StoreError::Serialization(e.to_string()))?,
    };
    self.files.lock().unwrap().insert(id, value.clone());
    decode(value)
  }

  async fn create_new_library(&self, file_name: &str, folder_path: &str) -> Result<(), StoreError> {
    self.creates.fetch_add(1, Ordering::SeqCst);
    if self.fail_creates.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable("read-only folder".into()));
    }
    let empty = json!({ "artists": [], "version": "1.0" });
    self.files.lock().unwrap().insert(file_id(folder_path, file_name), empty);
    Ok(())
  }
}

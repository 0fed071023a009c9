use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use lira_core::domain::{LibraryDocument, RawLibraryDocument};
use lira_core::ports::{FileLookup, RemoteStore, StoreError};

use crate::io::atomic_write_str;

/// Implementación de `RemoteStore` sobre un directorio local.
///
/// El id de un fichero es su ruta relativa a `root` con `/` como separador
/// (`"Lira/library.json"`). `save_library` sobrescribe el último fichero
/// cargado con `load_library_by_id`.
pub struct FsLibraryStore {
  root: PathBuf,
  active: Mutex<Option<PathBuf>>,
}

impl FsLibraryStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into(), active: Mutex::new(None) }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Fichero que recibirá el próximo `save_library`.
  pub fn active_file(&self) -> Option<PathBuf> {
    self.active.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  fn file_id(file_name: &str, folder_path: &str) -> String {
    let folder = folder_path.trim_matches('/');
    if folder.is_empty() { file_name.to_string() } else { format!("{folder}/{file_name}") }
  }

  /// Traduce un id a ruta absoluta. Solo se aceptan componentes normales:
  /// nada de rutas absolutas ni `..` que salgan de `root`.
  fn resolve(&self, file_id: &str) -> Result<PathBuf, StoreError> {
    let relative = Path::new(file_id);
    let valid = !file_id.is_empty() && relative.components().all(|c| matches!(c, Component::Normal(_)));
    if !valid {
      return Err(StoreError::NotFound(format!("invalid file id: {file_id}")));
    }
    Ok(self.root.join(relative))
  }
}

#[async_trait]
impl RemoteStore for FsLibraryStore {
  async fn find_file(&self, file_name: &str, folder_path: &str) -> Result<FileLookup, StoreError> {
    let id = Self::file_id(file_name, folder_path);
    let path = self.resolve(&id)?;

    let exists = tokio::fs::try_exists(&path).await.map_err(|e| StoreError::Io(e.to_string()))?;
    if !exists {
      return Ok(FileLookup::missing());
    }
    Ok(FileLookup::found(id, folder_path.trim_matches('/')))
  }

  async fn load_library_by_id(&self, file_id: &str) -> Result<RawLibraryDocument, StoreError> {
    let path = self.resolve(file_id)?;

    let content = tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
      ErrorKind::NotFound => StoreError::NotFound(file_id.to_string()),
      _ => StoreError::Io(e.to_string()),
    })?;
    let raw: RawLibraryDocument =
      serde_json::from_str(&content).map_err(|e| StoreError::Serialization(format!("{file_id}: {e}")))?;

    tracing::debug!(?path, artists = raw.artists.len(), "library file loaded");
    *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(path);

    Ok(raw)
  }

  async fn save_library(&self, document: &LibraryDocument) -> Result<RawLibraryDocument, StoreError> {
    let path = self.active_file().ok_or(StoreError::NotOpen)?;
    let content = serde_json::to_string_pretty(document).map_err(|e| StoreError::Serialization(e.to_string()))?;

    write_atomic(path.clone(), content.clone()).await?;
    tracing::debug!(?path, bytes = content.len(), "library file saved");

    serde_json::from_str(&content).map_err(|e| StoreError::Serialization(e.to_string()))
  }

  async fn create_new_library(&self, file_name: &str, folder_path: &str) -> Result<(), StoreError> {
    let path = self.resolve(&Self::file_id(file_name, folder_path))?;

    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await.map_err(|e| StoreError::Io(e.to_string()))?;
    }
    if tokio::fs::try_exists(&path).await.map_err(|e| StoreError::Io(e.to_string()))? {
      tracing::debug!(?path, "library file already exists, not overwriting");
      return Ok(());
    }

    let document = LibraryDocument::empty_at(Utc::now());
    let content = serde_json::to_string_pretty(&document).map_err(|e| StoreError::Serialization(e.to_string()))?;
    write_atomic(path.clone(), content).await?;
    tracing::info!(?path, "new library file created");

    Ok(())
  }
}

async fn write_atomic(path: PathBuf, content: String) -> Result<(), StoreError> {
  tokio::task::spawn_blocking(move || atomic_write_str(&path, &content))
    .await
    .map_err(|e| StoreError::Io(e.to_string()))?
    .map_err(|e| StoreError::Io(e.to_string()))
}

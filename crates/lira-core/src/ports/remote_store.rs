use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{LibraryDocument, RawLibraryDocument};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("file not found: {0}")]
  NotFound(String),

  /// Se intentó guardar sin haber cargado antes ningún fichero.
  #[error("no library file is open")]
  NotOpen,

  #[error("io error: {0}")]
  Io(String),

  #[error("serialization error: {0}")]
  Serialization(String),

  /// Red, sesión caducada, cuota, error del servidor...
  #[error("store unavailable: {0}")]
  Unavailable(String),
}

/// Resultado de buscar el fichero de la biblioteca en el almacén.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLookup {
  pub found: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_location: Option<String>,
}

impl FileLookup {
  pub fn missing() -> Self {
    Self::default()
  }

  pub fn found(file_id: impl Into<String>, current_location: impl Into<String>) -> Self {
    Self { found: true, file_id: Some(file_id.into()), current_location: Some(current_location.into()) }
  }
}

/// Port del almacén remoto donde vive el documento de la biblioteca.
///
/// El contrato es "sobrescribir el fichero entero": `save_library` recibe
/// el documento completo, nunca un diff, y debe ser atómico para quien
/// llama (o se guarda todo o no se guarda nada). Devuelve el documento tal
/// como quedó en el almacén, que es la versión autoritativa.
///
/// Implementaciones posibles:
/// - disco local (`lira-fs`)
/// - almacenamiento en la nube (cliente HTTP)
#[async_trait]
pub trait RemoteStore: Send + Sync {
  async fn find_file(&self, file_name: &str, folder_path: &str) -> Result<FileLookup, StoreError>;

  /// Carga el documento y lo deja como fichero activo para `save_library`.
  async fn load_library_by_id(&self, file_id: &str) -> Result<RawLibraryDocument, StoreError>;

  async fn save_library(&self, document: &LibraryDocument) -> Result<RawLibraryDocument, StoreError>;

  async fn create_new_library(&self, file_name: &str, folder_path: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
  async fn find_file(&self, file_name: &str, folder_path: &str) -> Result<FileLookup, StoreError> {
    (**self).find_file(file_name, folder_path).await
  }

  async fn load_library_by_id(&self, file_id: &str) -> Result<RawLibraryDocument, StoreError> {
    (**self).load_library_by_id(file_id).await
  }

  async fn save_library(&self, document: &LibraryDocument) -> Result<RawLibraryDocument, StoreError> {
    (**self).save_library(document).await
  }

  async fn create_new_library(&self, file_name: &str, folder_path: &str) -> Result<(), StoreError> {
    (**self).create_new_library(file_name, folder_path).await
  }
}

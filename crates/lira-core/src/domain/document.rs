use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::library::Library;

/// Versión que se asigna a documentos que no declaran ninguna.
pub const DEFAULT_VERSION: &str = "1.0";

/// Documento persistido: `{ artists, version, lastUpdated }`.
///
/// `version` se transporta sin interpretar; no hay negociación de esquema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDocument {
  #[serde(flatten)]
  pub library: Library,
  pub version: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_updated: Option<DateTime<Utc>>,
}

impl LibraryDocument {
  pub fn new(library: Library) -> Self {
    Self { library, version: DEFAULT_VERSION.to_string(), last_updated: None }
  }

  /// Documento vacío recién creado, sellado con `now`.
  pub fn empty_at(now: DateTime<Utc>) -> Self {
    Self { last_updated: Some(now), ..Self::default() }
  }
}

impl Default for LibraryDocument {
  fn default() -> Self {
    Self::new(Library::default())
  }
}

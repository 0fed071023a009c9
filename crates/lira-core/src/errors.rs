// crates/lira-core/src/errors.rs
use thiserror::Error;

use crate::ports::StoreError;

/// Error genérico del núcleo de Lira.
///
/// Las capas superiores (backend, UI) deberían mapear este error
/// a mensajes de usuario o logs.
#[derive(Debug, Error)]
pub enum CoreError {
  #[error("not found: {0}")]
  NotFound(#[from] NotFound),

  /// Falló el guardado del documento completo. El estado local no cambió.
  #[error("remote write failed: {0}")]
  RemoteWrite(StoreError),

  /// Falló la búsqueda / carga / creación del fichero remoto.
  #[error("remote read failed: {0}")]
  RemoteRead(StoreError),

  #[error("no remote library is open")]
  NotConnected,
}

/// Qué nivel de la jerarquía faltaba.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
  #[error("artist '{artist}'")]
  Artist { artist: String },

  #[error("album '{album}' of artist '{artist}'")]
  Album { artist: String, album: String },

  #[error("song '{title}' in '{artist}' / '{album}'")]
  Song { artist: String, album: String, title: String },
}

impl NotFound {
  pub fn artist(artist: &str) -> Self {
    NotFound::Artist { artist: artist.to_owned() }
  }

  pub fn album(artist: &str, album: &str) -> Self {
    NotFound::Album { artist: artist.to_owned(), album: album.to_owned() }
  }

  pub fn song(artist: &str, album: &str, title: &str) -> Self {
    NotFound::Song { artist: artist.to_owned(), album: album.to_owned(), title: title.to_owned() }
  }
}

//! Normalizador de documentos.
//!
//! Convierte un [`RawLibraryDocument`] en la forma canónica:
//! - `name` → `title` en álbumes y canciones (sin conservar ambas claves);
//! - `lyrics` siempre texto: arrays de líneas se unen con `\n`, cualquier
//!   otra cosa se convierte en `""`;
//! - marcas de tiempo RFC 3339 a `DateTime<Utc>`.
//!
//! Es idempotente y no modifica su entrada.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::{
  Album, Artist, DEFAULT_VERSION, Library, LibraryDocument, RawAlbum, RawArtist, RawLibraryDocument, RawLyrics,
  RawSong, Song,
};

/// Tipo de dato mal formado que se corrigió al normalizar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
  /// `lyrics` no era ni texto ni lista de textos; quedó vacío.
  MalformedLyrics,
  /// Una marca de tiempo no era RFC 3339; se descartó.
  MalformedTimestamp { field: &'static str },
}

/// Aviso no fatal emitido durante la normalización.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationWarning {
  /// Ruta legible del elemento afectado (`artista / álbum / canción`).
  pub path: String,
  pub kind: WarningKind,
}

impl fmt::Display for NormalizationWarning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      WarningKind::MalformedLyrics => write!(f, "{}: lyrics coerced to empty string", self.path),
      WarningKind::MalformedTimestamp { field } => write!(f, "{}: dropped malformed {field}", self.path),
    }
  }
}

/// Normaliza y devuelve solo la biblioteca.
pub fn normalize(raw: &RawLibraryDocument) -> Library {
  normalize_document(raw).library
}

/// Normaliza el documento completo y registra los avisos con `tracing`.
pub fn normalize_document(raw: &RawLibraryDocument) -> LibraryDocument {
  let (document, warnings) = normalize_with_warnings(raw);
  for warning in &warnings {
    tracing::warn!(%warning, "normalization warning");
  }
  document
}

/// Igual que [`normalize_document`] pero devuelve los avisos en vez de registrarlos.
pub fn normalize_with_warnings(raw: &RawLibraryDocument) -> (LibraryDocument, Vec<NormalizationWarning>) {
  let mut normalizer = Normalizer::default();

  let library = Library { artists: raw.artists.iter().map(|a| normalizer.artist(a)).collect() };
  let last_updated = raw.last_updated.as_ref().and_then(|v| normalizer.timestamp(v, "lastUpdated", "document"));
  let version = raw.version.clone().unwrap_or_else(|| DEFAULT_VERSION.to_string());

  (LibraryDocument { library, version, last_updated }, normalizer.warnings)
}

/// Normaliza un álbum suelto.
pub fn normalize_album(raw: &RawAlbum) -> Album {
  let mut normalizer = Normalizer::default();
  let album = normalizer.album(raw, "");
  normalizer.log();
  album
}

/// Normaliza una canción suelta.
pub fn normalize_song(raw: &RawSong) -> Song {
  let mut normalizer = Normalizer::default();
  let song = normalizer.song(raw, "");
  normalizer.log();
  song
}

#[derive(Default)]
struct Normalizer {
  warnings: Vec<NormalizationWarning>,
}

impl Normalizer {
  fn artist(&mut self, raw: &RawArtist) -> Artist {
    Artist { name: raw.name.clone(), albums: raw.albums.iter().map(|b| self.album(b, &raw.name)).collect() }
  }

  fn album(&mut self, raw: &RawAlbum, artist: &str) -> Album {
    let title = canonical_title(&raw.title, &raw.name);
    let path = join_path(artist, &title);
    let songs = raw.songs.iter().map(|s| self.song(s, &path)).collect();
    Album { title, songs }
  }

  fn song(&mut self, raw: &RawSong, album_path: &str) -> Song {
    let title = canonical_title(&raw.title, &raw.name);
    let path = join_path(album_path, &title);

    let lyrics = match &raw.lyrics {
      None => String::new(),
      Some(RawLyrics::Text(text)) => text.clone(),
      Some(RawLyrics::Lines(lines)) => lines.join("\n"),
      Some(RawLyrics::Other(_)) => {
        self.warn(&path, WarningKind::MalformedLyrics);
        String::new()
      }
    };

    let created_at = raw.created_at.as_ref().and_then(|v| self.timestamp(v, "createdAt", &path));
    let updated_at = raw.updated_at.as_ref().and_then(|v| self.timestamp(v, "updatedAt", &path));

    Song { title, lyrics, created_at, updated_at, fields: raw.fields.clone() }
  }

  fn timestamp(&mut self, value: &Value, field: &'static str, path: &str) -> Option<DateTime<Utc>> {
    let parsed = value.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok()).map(|t| t.with_timezone(&Utc));
    if parsed.is_none() && !value.is_null() {
      self.warn(path, WarningKind::MalformedTimestamp { field });
    }
    parsed
  }

  fn warn(&mut self, path: &str, kind: WarningKind) {
    self.warnings.push(NormalizationWarning { path: path.to_string(), kind });
  }

  fn log(&self) {
    for warning in &self.warnings {
      tracing::warn!(%warning, "normalization warning");
    }
  }
}

/// `title` gana; `name` solo se usa si `title` falta.
fn canonical_title(title: &Option<String>, name: &Option<String>) -> String {
  title.clone().or_else(|| name.clone()).unwrap_or_default()
}

fn join_path(parent: &str, child: &str) -> String {
  if parent.is_empty() { child.to_string() } else { format!("{parent} / {child}") }
}

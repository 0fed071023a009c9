//! Forma "cruda" del documento tal como llega del almacén remoto.
//!
//! Los documentos guardados por versiones antiguas usan `name` o `title`
//! indistintamente en álbumes y canciones, y la letra puede ser un texto o
//! un array de líneas. Estos tipos aceptan todas esas variantes; el
//! normalizador (`engine::normalizer`) las reduce a la forma canónica.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::LibraryDocument;
use super::library::{Album, Artist, Song};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLibraryDocument {
  #[serde(default)]
  pub artists: Vec<RawArtist>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_updated: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArtist {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub albums: Vec<RawAlbum>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAlbum {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default)]
  pub songs: Vec<RawSong>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSong {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lyrics: Option<RawLyrics>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<Value>,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

/// Las tres formas posibles de `lyrics` en un documento crudo.
///
/// El orden de las variantes importa: `serde(untagged)` prueba de arriba
/// abajo, y un array con algún elemento no textual cae en `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLyrics {
  Text(String),
  Lines(Vec<String>),
  Other(Value),
}

impl From<&LibraryDocument> for RawLibraryDocument {
  fn from(doc: &LibraryDocument) -> Self {
    RawLibraryDocument {
      artists: doc.library.artists.iter().map(RawArtist::from).collect(),
      version: Some(doc.version.clone()),
      last_updated: doc.last_updated.map(|t| Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
    }
  }
}

impl From<&Artist> for RawArtist {
  fn from(artist: &Artist) -> Self {
    RawArtist { name: artist.name.clone(), albums: artist.albums.iter().map(RawAlbum::from).collect() }
  }
}

impl From<&Album> for RawAlbum {
  fn from(album: &Album) -> Self {
    RawAlbum { title: Some(album.title.clone()), name: None, songs: album.songs.iter().map(RawSong::from).collect() }
  }
}

impl From<&Song> for RawSong {
  fn from(song: &Song) -> Self {
    let stamp = |t: chrono::DateTime<chrono::Utc>| Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    RawSong {
      title: Some(song.title.clone()),
      name: None,
      lyrics: Some(RawLyrics::Text(song.lyrics.clone())),
      created_at: song.created_at.map(stamp),
      updated_at: song.updated_at.map(stamp),
      fields: song.fields.clone(),
    }
  }
}

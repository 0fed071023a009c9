use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Documento raíz de la biblioteca: artistas → álbumes → canciones.
///
/// Invariantes (las mantiene el motor de mutaciones, no el tipo):
/// - los nombres de artista son únicos (comparación exacta, sensible a mayúsculas);
/// - los títulos de álbum son únicos dentro de un artista;
/// - los títulos de canción **no** lo son: se permiten duplicados dentro de un álbum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
  pub artists: Vec<Artist>,
}

impl Library {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.artists.is_empty()
  }

  /// Número total de canciones en todos los álbumes.
  pub fn song_count(&self) -> usize {
    self.artists.iter().flat_map(|a| &a.albums).map(|b| b.songs.len()).sum()
  }
}

/// Artista. `name` es su clave de identidad dentro de la biblioteca.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
  pub name: String,
  pub albums: Vec<Album>,
}

impl Artist {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), albums: Vec::new() }
  }
}

/// Álbum. `title` es su clave de identidad dentro del artista.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
  pub title: String,
  pub songs: Vec<Song>,
}

impl Album {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), songs: Vec::new() }
  }
}

/// Canción ya normalizada.
///
/// La identidad es posicional: (artista, álbum, título). No hay id opaco,
/// así que cambiar cualquiera de los tres equivale a borrar + insertar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
  pub title: String,

  /// Letra como texto único; las líneas van separadas por `\n`.
  #[serde(default)]
  pub lyrics: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,

  /// Campos libres (`notes`, `chords`, ...). Se conservan tal cual.
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl Song {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), lyrics: String::new(), created_at: None, updated_at: None, fields: Map::new() }
  }

  pub fn field(&self, key: &str) -> Option<&Value> {
    self.fields.get(key)
  }

  pub fn notes(&self) -> Option<&str> {
    self.field("notes").and_then(Value::as_str)
  }
}

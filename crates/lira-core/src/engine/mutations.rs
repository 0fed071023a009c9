//! Motor de mutaciones.
//!
//! Todas las operaciones trabajan sobre `&mut Library` y validan antes de
//! escribir: si devuelven `Err`, la biblioteca queda intacta. Así la misma
//! función sirve para el parche local en sitio y para el camino remoto
//! (clonar, mutar el clon, guardar).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::locator::{album_index, artist_index, song_index};
use crate::domain::{Album, Artist, Library, Song, SongLocation};
use crate::errors::CoreError;

/// Claves con significado propio en una canción; nunca se copian a `fields`.
const RESERVED_KEYS: &[&str] = &["title", "name", "lyrics", "createdAt", "updatedAt"];

/// Petición de cambio sobre la biblioteca.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
  CreateArtist { artist: String },
  CreateAlbum { artist: String, album: String },
  CreateSong { artist: String, album: String, song: SongDraft },
  RenameArtist { from: String, to: String },
  RenameAlbum { artist: String, from: String, to: String },
  UpdateSong { location: SongLocation, patch: SongPatch, target: SongTarget },
  DeleteSong { location: SongLocation },
  DeleteAlbum { artist: String, album: String },
  DeleteArtist { artist: String },
}

impl Mutation {
  /// Nombre corto para logs.
  pub fn kind(&self) -> &'static str {
    match self {
      Mutation::CreateArtist { .. } => "create_artist",
      Mutation::CreateAlbum { .. } => "create_album",
      Mutation::CreateSong { .. } => "create_song",
      Mutation::RenameArtist { .. } => "rename_artist",
      Mutation::RenameAlbum { .. } => "rename_album",
      Mutation::UpdateSong { .. } => "update_song",
      Mutation::DeleteSong { .. } => "delete_song",
      Mutation::DeleteAlbum { .. } => "delete_album",
      Mutation::DeleteArtist { .. } => "delete_artist",
    }
  }
}

/// Datos de una canción nueva.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongDraft {
  pub title: String,
  #[serde(default)]
  pub lyrics: String,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl SongDraft {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), ..Self::default() }
  }

  pub fn lyrics(mut self, lyrics: impl Into<String>) -> Self {
    self.lyrics = lyrics.into();
    self
  }

  pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.fields.insert(key.into(), value.into());
    self
  }

  fn into_song(self, now: DateTime<Utc>) -> Song {
    let mut song = Song::new(self.title);
    song.lyrics = self.lyrics;
    song.created_at = Some(now);
    song.updated_at = Some(now);
    merge_fields(&mut song.fields, self.fields);
    song
  }
}

/// Cambios parciales sobre una canción (merge superficial).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lyrics: Option<String>,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl SongPatch {
  pub fn lyrics(mut self, lyrics: impl Into<String>) -> Self {
    self.lyrics = Some(lyrics.into());
    self
  }

  pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.fields.insert(key.into(), value.into());
    self
  }

  fn merge_into(&self, song: &mut Song) {
    if let Some(lyrics) = &self.lyrics {
      song.lyrics = lyrics.clone();
    }
    merge_fields(&mut song.fields, self.fields.clone());
  }
}

/// Destino de `update_song`. Un campo ausente significa "el mismo que ahora".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongTarget {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub artist: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub album: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
}

impl SongTarget {
  /// Sin cambio de metadatos: solo se aplica el parche.
  pub fn unchanged() -> Self {
    Self::default()
  }

  pub fn to(location: &SongLocation) -> Self {
    Self {
      artist: Some(location.artist.clone()),
      album: Some(location.album.clone()),
      title: Some(location.title.clone()),
    }
  }

  pub fn resolve(&self, from: &SongLocation) -> SongLocation {
    SongLocation {
      artist: self.artist.clone().unwrap_or_else(|| from.artist.clone()),
      album: self.album.clone().unwrap_or_else(|| from.album.clone()),
      title: self.title.clone().unwrap_or_else(|| from.title.clone()),
    }
  }
}

/// Qué se limpió en cascada tras borrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cascade {
  None,
  Album,
  AlbumAndArtist,
}

/// Resultado de aplicar una [`Mutation`]. Lo usa el seguimiento de la
/// selección para reconciliar sin comparar documentos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MutationEffect {
  /// "Ya existe": nada que hacer.
  Unchanged,
  ArtistCreated { artist: String },
  AlbumCreated { artist: String, album: String },
  SongCreated { location: SongLocation },
  ArtistRenamed { from: String, to: String },
  AlbumRenamed { artist: String, from: String, to: String },
  SongPatched { location: SongLocation },
  SongMoved { from: SongLocation, to: SongLocation },
  SongRemoved { location: SongLocation, cascade: Cascade },
  AlbumRemoved { artist: String, album: String, artist_removed: bool },
  ArtistRemoved { artist: String },
}

/// Aplica `mutation` sobre `library`.
pub fn apply(library: &mut Library, mutation: &Mutation, now: DateTime<Utc>) -> Result<MutationEffect, CoreError> {
  let effect = match mutation {
    Mutation::CreateArtist { artist } => create_artist(library, artist),
    Mutation::CreateAlbum { artist, album } => create_album(library, artist, album),
    Mutation::CreateSong { artist, album, song } => create_song(library, artist, album, song.clone(), now),
    Mutation::RenameArtist { from, to } => rename_artist(library, from, to)?,
    Mutation::RenameAlbum { artist, from, to } => rename_album(library, artist, from, to)?,
    Mutation::UpdateSong { location, patch, target } => update_song(library, location, patch, target, now)?,
    Mutation::DeleteSong { location } => delete_song(library, location)?,
    Mutation::DeleteAlbum { artist, album } => delete_album(library, artist, album)?,
    Mutation::DeleteArtist { artist } => delete_artist(library, artist)?,
  };
  Ok(effect)
}

pub fn create_artist(library: &mut Library, artist: &str) -> MutationEffect {
  if artist_index(library, artist).is_ok() {
    return MutationEffect::Unchanged;
  }
  library.artists.push(Artist::new(artist));
  MutationEffect::ArtistCreated { artist: artist.to_owned() }
}

pub fn create_album(library: &mut Library, artist: &str, album: &str) -> MutationEffect {
  if album_index(library, artist, album).is_ok() {
    return MutationEffect::Unchanged;
  }
  let ai = ensure_artist(library, artist);
  ensure_album(&mut library.artists[ai], album);
  MutationEffect::AlbumCreated { artist: artist.to_owned(), album: album.to_owned() }
}

/// No comprueba títulos duplicados: dos canciones con el mismo título en un
/// álbum están permitidas.
pub fn create_song(
  library: &mut Library,
  artist: &str,
  album: &str,
  draft: SongDraft,
  now: DateTime<Utc>,
) -> MutationEffect {
  let location = SongLocation::new(artist, album, &draft.title);
  let ai = ensure_artist(library, artist);
  let bi = ensure_album(&mut library.artists[ai], album);
  library.artists[ai].albums[bi].songs.push(draft.into_song(now));
  MutationEffect::SongCreated { location }
}

/// Renombra en sitio. No fusiona con un artista que ya tenga `to`.
pub fn rename_artist(library: &mut Library, from: &str, to: &str) -> Result<MutationEffect, CoreError> {
  let ai = artist_index(library, from)?;
  if from == to {
    return Ok(MutationEffect::Unchanged);
  }
  library.artists[ai].name = to.to_owned();
  Ok(MutationEffect::ArtistRenamed { from: from.to_owned(), to: to.to_owned() })
}

pub fn rename_album(library: &mut Library, artist: &str, from: &str, to: &str) -> Result<MutationEffect, CoreError> {
  let (ai, bi) = album_index(library, artist, from)?;
  if from == to {
    return Ok(MutationEffect::Unchanged);
  }
  library.artists[ai].albums[bi].title = to.to_owned();
  Ok(MutationEffect::AlbumRenamed { artist: artist.to_owned(), from: from.to_owned(), to: to.to_owned() })
}

/// Parche en sitio o, si cambia artista/álbum/título, borrar + insertar.
///
/// En el caso de movimiento el álbum/artista de origen se quedan aunque
/// queden vacíos; la limpieza en cascada solo ocurre en los borrados.
pub fn update_song(
  library: &mut Library,
  location: &SongLocation,
  patch: &SongPatch,
  target: &SongTarget,
  now: DateTime<Utc>,
) -> Result<MutationEffect, CoreError> {
  let (ai, bi, si) = song_index(library, location)?;
  let destination = target.resolve(location);

  if destination == *location {
    let song = &mut library.artists[ai].albums[bi].songs[si];
    patch.merge_into(song);
    song.updated_at = Some(now);
    return Ok(MutationEffect::SongPatched { location: location.clone() });
  }

  let mut moved = library.artists[ai].albums[bi].songs[si].clone();
  patch.merge_into(&mut moved);
  moved.title = destination.title.clone();
  moved.updated_at = Some(now);

  // `ensure_*` solo añaden al final, así que (ai, bi) siguen siendo válidos.
  let tai = ensure_artist(library, &destination.artist);
  let tbi = ensure_album(&mut library.artists[tai], &destination.album);
  library.artists[tai].albums[tbi].songs.push(moved);
  library.artists[ai].albums[bi].songs.retain(|s| s.title != location.title);

  Ok(MutationEffect::SongMoved { from: location.clone(), to: destination })
}

/// Borra por título y limpia en cascada el álbum y el artista vacíos.
pub fn delete_song(library: &mut Library, location: &SongLocation) -> Result<MutationEffect, CoreError> {
  let (ai, bi, _) = song_index(library, location)?;

  let album = &mut library.artists[ai].albums[bi];
  album.songs.retain(|s| s.title != location.title);
  if !album.songs.is_empty() {
    return Ok(MutationEffect::SongRemoved { location: location.clone(), cascade: Cascade::None });
  }

  // La cascada actúa sobre las posiciones resueltas: puede haber hermanos
  // con el mismo nombre tras un rename y esos no se tocan.
  let artist = &mut library.artists[ai];
  artist.albums.remove(bi);
  if !artist.albums.is_empty() {
    return Ok(MutationEffect::SongRemoved { location: location.clone(), cascade: Cascade::Album });
  }

  library.artists.remove(ai);
  Ok(MutationEffect::SongRemoved { location: location.clone(), cascade: Cascade::AlbumAndArtist })
}

pub fn delete_album(library: &mut Library, artist: &str, album: &str) -> Result<MutationEffect, CoreError> {
  let (ai, _) = album_index(library, artist, album)?;

  let owner = &mut library.artists[ai];
  owner.albums.retain(|b| b.title != album);
  let artist_removed = owner.albums.is_empty();
  if artist_removed {
    library.artists.remove(ai);
  }

  Ok(MutationEffect::AlbumRemoved { artist: artist.to_owned(), album: album.to_owned(), artist_removed })
}

pub fn delete_artist(library: &mut Library, artist: &str) -> Result<MutationEffect, CoreError> {
  artist_index(library, artist)?;
  library.artists.retain(|a| a.name != artist);
  Ok(MutationEffect::ArtistRemoved { artist: artist.to_owned() })
}

fn ensure_artist(library: &mut Library, artist: &str) -> usize {
  match artist_index(library, artist) {
    Ok(ai) => ai,
    Err(_) => {
      library.artists.push(Artist::new(artist));
      library.artists.len() - 1
    }
  }
}

fn ensure_album(artist: &mut Artist, album: &str) -> usize {
  match artist.albums.iter().position(|b| b.title == album) {
    Some(bi) => bi,
    None => {
      artist.albums.push(Album::new(album));
      artist.albums.len() - 1
    }
  }
}

fn merge_fields(target: &mut Map<String, Value>, source: Map<String, Value>) {
  for (key, value) in source {
    if RESERVED_KEYS.contains(&key.as_str()) {
      tracing::debug!(%key, "ignoring reserved key in song fields");
      continue;
    }
    target.insert(key, value);
  }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dirección posicional de una canción: (artista, álbum, título).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongLocation {
  pub artist: String,
  pub album: String,
  pub title: String,
}

impl SongLocation {
  pub fn new(artist: impl Into<String>, album: impl Into<String>, title: impl Into<String>) -> Self {
    Self { artist: artist.into(), album: album.into(), title: title.into() }
  }

  /// `true` si la canción vive dentro de `artist` / `album`.
  pub fn is_in_album(&self, artist: &str, album: &str) -> bool {
    self.artist == artist && self.album == album
  }
}

impl fmt::Display for SongLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} / {} / {}", self.artist, self.album, self.title)
  }
}

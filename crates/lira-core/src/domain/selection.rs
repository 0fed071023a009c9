use serde::{Deserialize, Serialize};

use super::library::Song;
use super::location::SongLocation;

/// Canción seleccionada en la sesión.
///
/// Copia desnormalizada: lleva la canción completa más el nombre del
/// artista y el título del álbum resueltos en el momento de seleccionarla.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedSong {
  pub artist: String,
  pub album: String,
  pub song: Song,
}

impl SelectedSong {
  pub fn location(&self) -> SongLocation {
    SongLocation::new(&self.artist, &self.album, &self.song.title)
  }

  pub fn is_at(&self, location: &SongLocation) -> bool {
    self.artist == location.artist && self.album == location.album && self.song.title == location.title
  }
}

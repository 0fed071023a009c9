//! Seguimiento de la canción seleccionada.

use super::locator::find_location;
use super::mutations::MutationEffect;
use crate::domain::{Library, SelectedSong};

/// Ajusta la selección tras una mutación ya aplicada a `library`.
///
/// Orden de prioridad:
/// 1. se borró la canción, su álbum o su artista → `None`;
/// 2. la canción se movió → apunta al nuevo sitio;
/// 3. se parcheó la canción → copia refrescada;
/// 4. se renombró su artista o álbum → la copia sigue al nuevo nombre;
/// 5. cualquier otra cosa → sin cambios.
pub fn reconcile(selected: Option<SelectedSong>, library: &Library, effect: &MutationEffect) -> Option<SelectedSong> {
  let current = selected?;

  match effect {
    MutationEffect::SongRemoved { location, .. } if current.is_at(location) => None,
    MutationEffect::AlbumRemoved { artist, album, .. } if current.location().is_in_album(artist, album) => None,
    MutationEffect::ArtistRemoved { artist } if current.artist == *artist => None,
    MutationEffect::SongMoved { from, to } if current.is_at(from) => find_location(library, to),
    MutationEffect::SongPatched { location } if current.is_at(location) => find_location(library, location),
    MutationEffect::ArtistRenamed { from, to } if current.artist == *from => {
      Some(SelectedSong { artist: to.clone(), ..current })
    }
    MutationEffect::AlbumRenamed { artist, from, to } if current.location().is_in_album(artist, from) => {
      Some(SelectedSong { album: to.clone(), ..current })
    }
    _ => Some(current),
  }
}

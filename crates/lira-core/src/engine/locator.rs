//! Búsquedas en la jerarquía. Comparación exacta y sensible a mayúsculas;
//! recortar espacios es responsabilidad de quien llama.

use crate::domain::{Album, Artist, Library, SelectedSong, Song, SongLocation};
use crate::errors::NotFound;

pub fn find_artist<'a>(library: &'a Library, artist: &str) -> Option<&'a Artist> {
  library.artists.iter().find(|a| a.name == artist)
}

pub fn find_album<'a>(artist: &'a Artist, album: &str) -> Option<&'a Album> {
  artist.albums.iter().find(|b| b.title == album)
}

pub fn find_song<'a>(album: &'a Album, title: &str) -> Option<&'a Song> {
  album.songs.iter().find(|s| s.title == title)
}

/// Búsqueda compuesta: devuelve la canción ya desnormalizada con su
/// artista y álbum, o `None` si falta cualquier nivel.
pub fn find_song_full(library: &Library, artist: &str, album: &str, title: &str) -> Option<SelectedSong> {
  let found_artist = find_artist(library, artist)?;
  let found_album = find_album(found_artist, album)?;
  let song = find_song(found_album, title)?;

  Some(SelectedSong { artist: found_artist.name.clone(), album: found_album.title.clone(), song: song.clone() })
}

pub fn find_location(library: &Library, location: &SongLocation) -> Option<SelectedSong> {
  find_song_full(library, &location.artist, &location.album, &location.title)
}

pub(crate) fn artist_index(library: &Library, artist: &str) -> Result<usize, NotFound> {
  library.artists.iter().position(|a| a.name == artist).ok_or_else(|| NotFound::artist(artist))
}

pub(crate) fn album_index(library: &Library, artist: &str, album: &str) -> Result<(usize, usize), NotFound> {
  let ai = artist_index(library, artist)?;
  let bi = library.artists[ai]
    .albums
    .iter()
    .position(|b| b.title == album)
    .ok_or_else(|| NotFound::album(artist, album))?;
  Ok((ai, bi))
}

/// Posición (artista, álbum, canción) de la primera canción con ese título.
pub(crate) fn song_index(library: &Library, location: &SongLocation) -> Result<(usize, usize, usize), NotFound> {
  let (ai, bi) = album_index(library, &location.artist, &location.album)?;
  let si = library.artists[ai].albums[bi]
    .songs
    .iter()
    .position(|s| s.title == location.title)
    .ok_or_else(|| NotFound::song(&location.artist, &location.album, &location.title))?;
  Ok((ai, bi, si))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn library() -> Library {
    let mut album = Album::new("OK Computer");
    album.songs.push(Song::new("Airbag"));
    let mut artist = Artist::new("Radiohead");
    artist.albums.push(album);
    Library { artists: vec![artist] }
  }

  #[test]
  fn finds_each_level() {
    let lib = library();
    let artist = find_artist(&lib, "Radiohead").unwrap();
    let album = find_album(artist, "OK Computer").unwrap();

    assert_eq!(find_song(album, "Airbag").map(|s| s.title.as_str()), Some("Airbag"));
  }

  #[test]
  fn matching_is_exact_and_case_sensitive() {
    let lib = library();

    assert!(find_artist(&lib, "radiohead").is_none());
    assert!(find_artist(&lib, " Radiohead").is_none());
    assert!(find_song_full(&lib, "Radiohead", "OK Computer", "airbag").is_none());
  }

  #[test]
  fn full_lookup_resolves_names() {
    let lib = library();
    let selected = find_song_full(&lib, "Radiohead", "OK Computer", "Airbag").unwrap();

    assert_eq!(selected.artist, "Radiohead");
    assert_eq!(selected.album, "OK Computer");
    assert_eq!(selected.song.title, "Airbag");
  }

  #[test]
  fn full_lookup_short_circuits_on_missing_level() {
    let lib = library();

    assert!(find_song_full(&lib, "Blur", "OK Computer", "Airbag").is_none());
    assert!(find_song_full(&lib, "Radiohead", "Kid A", "Airbag").is_none());
  }

  #[test]
  fn index_lookup_reports_missing_level() {
    let lib = library();

    assert_eq!(song_index(&lib, &SongLocation::new("Blur", "X", "Y")), Err(NotFound::artist("Blur")));
    assert_eq!(
      song_index(&lib, &SongLocation::new("Radiohead", "Kid A", "Y")),
      Err(NotFound::album("Radiohead", "Kid A"))
    );
    assert_eq!(song_index(&lib, &SongLocation::new("Radiohead", "OK Computer", "Airbag")), Ok((0, 0, 0)));
  }
}

pub mod document;
pub mod library;
pub mod location;
pub mod raw;
pub mod selection;

pub use document::{DEFAULT_VERSION, LibraryDocument};
pub use library::{Album, Artist, Library, Song};
pub use location::SongLocation;
pub use raw::{RawAlbum, RawArtist, RawLibraryDocument, RawLyrics, RawSong};
pub use selection::SelectedSong;

//! Lógica pura sobre el documento: normalización, búsqueda, mutaciones y
//! reconciliación de la selección. Nada aquí hace I/O.

pub mod locator;
pub mod mutations;
pub mod normalizer;
pub mod selection;

pub use locator::{find_album, find_artist, find_location, find_song, find_song_full};
pub use mutations::{Cascade, Mutation, MutationEffect, SongDraft, SongPatch, SongTarget, apply};
pub use normalizer::{NormalizationWarning, WarningKind, normalize, normalize_document, normalize_with_warnings};
pub use selection::reconcile;

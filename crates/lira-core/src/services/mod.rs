pub mod library_service;

pub use library_service::{LibraryService, MutationPhase, MutationReport};

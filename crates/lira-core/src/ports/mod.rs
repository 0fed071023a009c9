pub mod metadata_search;
pub mod remote_store;

pub use metadata_search::{MetadataSearch, SearchError, SearchSuggestions};
pub use remote_store::{FileLookup, RemoteStore, StoreError};

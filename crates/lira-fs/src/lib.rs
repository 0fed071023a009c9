pub mod io;
pub mod store;

pub use io::atomic_write_str;
pub use store::FsLibraryStore;

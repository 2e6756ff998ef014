// Export of the cached collections to local files.

pub mod export;

pub use export::*;

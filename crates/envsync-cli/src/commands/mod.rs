//! Command implementations

mod archive;
mod sync;

pub use archive::run_archive;
pub use sync::run_sync;

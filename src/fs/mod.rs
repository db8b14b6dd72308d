//! File system operations with transaction support.
//!
//! Provides a write handle whose content reaches its destination atomically
//! on commit, or not at all.

pub mod options;
mod temp;
pub mod transaction;

pub use options::Options;
pub use transaction::SafeFile;

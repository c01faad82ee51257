//! CLI subcommand implementations.

pub mod files;
pub mod phases;
pub mod requirements;
pub mod summary;
pub mod timeline;
pub mod util;
pub mod watch;

//! Command handlers, one module per subcommand.

pub mod check;
pub mod completion;
pub mod duplicates;
pub mod fmt;
pub mod init;
pub mod sha256;
pub mod show;
pub mod version;

//! Command handlers, one module per subcommand.

pub mod checksum;
pub mod completion;
pub mod init;
pub mod render;
pub mod show;
pub mod validate;
pub mod version;

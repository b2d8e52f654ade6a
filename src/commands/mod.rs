pub mod book;
pub mod import;
pub mod profile;
pub mod sticker;

// Re-export all commands
pub use book::*;
pub use import::*;
pub use profile::*;
pub use sticker::*;

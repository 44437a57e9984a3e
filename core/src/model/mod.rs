mod album;
pub use album::*;

// Public library interface for dirsizer-rs
// The CLI and the debug-layout tool share these modules

pub mod error;
pub mod layout;
pub mod render;
pub mod scanner;
pub mod tree;

pub use error::{Result, TreeError};

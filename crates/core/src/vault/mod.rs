//! Memory bank file discovery.

pub mod walker;

pub use walker::{VaultWalker, VaultWalkerError, WalkedFile, to_relative_key};

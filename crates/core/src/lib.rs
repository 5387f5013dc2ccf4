#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Metadata index and search over markdown memory banks.
//!
//! A memory bank is a directory of markdown documents with optional YAML
//! frontmatter. [`index::IndexStore`] keeps a JSON index of their metadata
//! up to date; [`search::SearchEngine`] answers filtered, ranked queries
//! against it.

pub mod config;
pub mod fileio;
pub mod frontmatter;
pub mod index;
pub mod search;
pub mod vault;

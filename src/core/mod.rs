//! Core: types, keys, errors and storage shared by every build target.

pub mod error;
pub mod format;
pub mod keys;
pub mod storage;
pub mod types;

//! Core math modules.

pub mod error;
pub mod grid;
pub mod mixture;
pub mod normal;

//! Utility modules shared across the generator.

pub mod date;
pub mod html;
pub mod mime;

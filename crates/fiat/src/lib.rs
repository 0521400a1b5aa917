pub mod converter;
pub mod format;

mod coerce;
mod lambdas;
mod parse;
mod render;

pub use coerce::{to_boolean, to_integer};
pub use render::render;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("section '{name}' is never closed")]
    UnclosedSection { name: String },

    #[error("closing tag '{name}' has no matching open section")]
    UnmatchedClose { name: String },

    #[error("tag opened at offset {offset} is never closed")]
    UnclosedTag { offset: usize },
}

pub type Result<T> = std::result::Result<T, TemplateError>;

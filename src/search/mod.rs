//! Web search provider module
//!
//! Wraps the external search API behind the [`WebSearch`] trait.

mod brave;
mod traits;

pub use brave::BraveSearch;
pub use traits::WebSearch;

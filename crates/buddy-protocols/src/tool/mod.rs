//! Tool protocol definitions.

mod browser;
mod definition;

pub use browser::*;
pub use definition::*;

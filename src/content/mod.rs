//! Landing page content
//!
//! Compiled-in defaults, the shallow merge policy, and the resolver that
//! combines them with the newest active backend row.

mod defaults;
mod merge;
mod resolver;

pub use defaults::default_content;
pub use resolver::{ContentResolver, NO_ACTIVE_CONTENT};

/// Reserved top-level key for the diagnostic annotation
pub const DEBUG_KEY: &str = "_debug";

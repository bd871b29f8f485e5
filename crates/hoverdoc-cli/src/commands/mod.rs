//! Command implementations for the hoverdoc CLI
//!
//! Each command lives in its own submodule and exposes an `execute` entry
//! point taking already-resolved configuration.

mod annotate;
mod kb;
mod render;
mod tokens;

pub use annotate::execute as annotate_document;
pub use kb::execute as inspect_knowledge_base;
pub use render::execute as render_block;
pub use tokens::execute as show_tokens;

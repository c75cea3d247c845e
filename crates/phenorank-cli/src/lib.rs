//! Pipeline stages behind the `phenorank` binary.
//!
//! Each stage reads its inputs from the project workspace (database,
//! processed directory, raw sources) and returns a summary; printing is left
//! to the caller.

pub mod output;
pub mod pipeline;
pub mod workspace;

pub use workspace::Workspace;

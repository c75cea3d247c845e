//! Canonical relations and the small enums shared across stages.

pub mod association;
pub mod condition;
pub mod feature;
pub mod options;
pub mod tables;

pub use association::Association;
pub use condition::{Condition, ConditionAttribute};
pub use feature::{label_or_id, Feature};
pub use options::{DuplicatePolicy, InheritanceStrategy, MatrixVariant, SourceProfile};
pub use tables::Tables;

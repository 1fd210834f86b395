// Query module - relational operators over in-memory tables
// Reports are written as chains of these: join, group, filter, project, sort, limit
pub mod aggregate;
pub mod join;
pub mod ops;

pub use aggregate::{Aggregate, AggregateFn};
pub use join::JoinKind;
pub use ops::{Projection, SortKey};

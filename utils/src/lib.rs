//! Small helpers shared by crates within the workspace.

pub mod fsutil;
pub mod mpscutil;

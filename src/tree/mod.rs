//! Parent/child forest reconstructed from a [`Catalog`](crate::models::Catalog)

pub mod builder;
pub mod forest;

pub use builder::build;
pub use forest::{Forest, Link, RootReason, TreeNode};

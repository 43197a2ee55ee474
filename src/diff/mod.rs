//! Diff engine - destination mapping and staleness classification

mod compare;
mod mapper;

pub use compare::{compare, compare_tree, MTIME_TOLERANCE};
pub use mapper::PathMapper;

//! Trains a small feed-forward MNIST classifier, freezes the trained
//! parameters into a single binary record, and dumps per-sample artifacts
//! (PNG renders, pixel grids, and a metadata summary) for a handful of
//! fixed test-set indices.

pub mod data;
pub mod export;
pub mod inference;
pub mod model;
pub mod output;
pub mod training;

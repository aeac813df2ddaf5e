//! Value objects

pub mod timestamp;

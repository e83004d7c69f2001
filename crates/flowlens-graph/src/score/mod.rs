//! Pattern tags, validation findings, and the overall confidence score.

pub mod confidence;
pub mod patterns;
pub mod validate;

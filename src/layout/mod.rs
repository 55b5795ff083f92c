/// Measure pass: group roles, wrapped lines and canvas height.
pub mod plan;

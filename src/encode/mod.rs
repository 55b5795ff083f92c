/// PNG serialization.
pub mod png;

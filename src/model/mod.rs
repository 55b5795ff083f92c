/// Wire records, canonical messages and the input validator.
pub mod message;

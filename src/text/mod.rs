/// Fonts and typesetters.
pub mod typeface;
/// Greedy word wrapping.
pub mod wrap;

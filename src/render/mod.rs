/// Backend trait and frame type.
pub mod backend;
/// Layout to draw-op compilation.
pub mod compile;
/// `vello_cpu` execution.
pub mod cpu;
/// Validating entry point.
pub mod pipeline;

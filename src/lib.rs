//! Per-lane dead write elimination for vector values, along with the small SSA IR it runs on.

pub mod dataflow;
pub mod ir;
pub mod vdce;

pub use ir::*;
pub use vdce::*;

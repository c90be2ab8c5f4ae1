//! Rendering
//!
//! Games describe each frame as a list of draw commands; on wasm32 the
//! canvas painter turns that list into Canvas 2D calls.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod frame;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;
pub use frame::{Color, DrawCmd, Frame, TextAlign, colors};

//! CPU raster primitives: the premultiplied canvas, compositing, blur and shape helpers.

pub mod blur;
pub mod canvas;
pub mod composite;
pub mod shapes;

pub use canvas::Canvas;

//! Data types shared by layout, selection and rendering.

mod address;
mod cell;
mod font;
mod geometry;
mod selection;

pub use address::*;
pub use cell::*;
pub use font::*;
pub use geometry::*;
pub use selection::*;

//! Chart file rendering.

pub mod svg;

pub use svg::*;

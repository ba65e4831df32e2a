pub mod squarify;

pub use squarify::{layout, Cell, LayoutConfig, Rect};

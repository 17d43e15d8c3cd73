mod component;
mod order;

pub use component::PlacementEditor;
pub use order::{PlacementRow, sort_rows};

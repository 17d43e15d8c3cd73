pub mod not_found;
pub mod placement;
pub mod visualize;

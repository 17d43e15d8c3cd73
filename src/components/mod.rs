pub mod explorer;
pub mod placement;

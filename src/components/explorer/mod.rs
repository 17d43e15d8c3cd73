mod color;
mod component;
mod config;
mod geometry;
mod graph;
mod history;
mod render;
mod session;
mod types;

pub use component::GraphExplorer;
pub use types::GraphFragment;

use force_graph::SimulationParameters;

use super::types::NodeId;

/// Tunables of the graph explorer.
#[derive(Clone, Debug)]
pub struct ExplorerConfig {
	/// Neighborhood endpoint; `{id}` is replaced by the node handle.
	pub endpoint: String,
	/// Color applied to nodes on the click path.
	pub highlight_color: String,
	/// Seconds a color transition takes.
	pub tween_secs: f64,
	pub node_mass: f32,
	/// Mass given to a node once the user drops it.
	pub pinned_mass: f32,
	/// How far from a node center (screen pixels) a pointer still picks it.
	pub pick_radius: f64,
	pub default_width: f64,
	pub default_height: f64,
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			endpoint: "/visualize/{id}.json".into(),
			highlight_color: "black".into(),
			tween_secs: 2.0,
			node_mass: 10.0,
			pinned_mass: 1000.0,
			pick_radius: 40.0,
			default_width: 800.0,
			default_height: 600.0,
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

impl ExplorerConfig {
	pub fn neighborhood_url(&self, id: &NodeId) -> String {
		self.endpoint.replace("{id}", &id.0)
	}

	pub fn simulation(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info};

use super::config::ExplorerConfig;
use super::geometry::Point;
use super::graph::{GraftStats, LiveGraph};
use super::history::{History, UndoOutcome};
use super::types::{GraphFragment, NodeId};

static GENERATIONS: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	pub fn to_screen(&self, world: Point) -> Point {
		Point::new(world.x * self.k + self.x, world.y * self.k + self.y)
	}

	pub fn to_world(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeId>,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Link shown in the side panel for the last clicked node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeLink {
	pub label: String,
	pub url: Option<String>,
}

/// A neighborhood fetch waiting to be grafted.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpandTicket {
	pub node: NodeId,
	pub url: String,
	/// Generation of the session that issued the ticket.
	pub generation: u64,
	/// Checkpoint taken for this expansion; `None` for the initial load.
	pub checkpoint: Option<u64>,
}

/// Everything one explorer canvas owns: the live graph, its undo history
/// and the pointer session state.
pub struct Session {
	pub config: ExplorerConfig,
	pub graph: LiveGraph,
	pub history: History,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	generation: u64,
	/// Pending expansions by node, with the checkpoint each one took.
	in_flight: HashMap<NodeId, Option<u64>>,
}

impl Session {
	pub fn new(config: ExplorerConfig, width: f64, height: f64) -> Self {
		let graph = LiveGraph::new(config.simulation(), config.node_mass);
		Self {
			config,
			graph,
			history: History::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			animation_running: true,
			generation: GENERATIONS.fetch_add(1, Ordering::Relaxed),
			in_flight: HashMap::new(),
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		self.transform.to_world(sx, sy)
	}

	/// Nearest node within the pick radius of a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let (id, dist) = self.graph.nearest(self.screen_to_graph(sx, sy))?;
		(dist * self.transform.k <= self.config.pick_radius).then_some(id)
	}

	/// Starts a drag on the node under the pointer, or a pan otherwise.
	/// The grabbed node is pinned at once.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> Option<NodeLink> {
		let Some(id) = self.node_at_position(sx, sy) else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
			return None;
		};
		self.graph.set_fixed(&id);
		let link = self.graph.node(&id).map(|info| NodeLink {
			label: info.attrs.label.clone().unwrap_or_default(),
			url: info.attrs.url.clone(),
		});
		self.drag.node = Some(id);
		link
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(id) = &self.drag.node {
			let pos = self.transform.to_world(sx, sy);
			self.graph.set_position(id, pos);
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	/// Ends the pointer session. A dropped node gets the pinned mass.
	pub fn pointer_up(&mut self) {
		if let Some(id) = self.drag.node.take() {
			self.graph.set_fixed(&id);
			self.graph.set_mass(&id, self.config.pinned_mass);
		}
		self.pan.active = false;
	}

	/// Zooms around the pointer.
	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Ticket for the first neighborhood load; no checkpoint is taken.
	pub fn load_root(&mut self, id: NodeId) -> ExpandTicket {
		self.in_flight.insert(id.clone(), None);
		ExpandTicket {
			url: self.config.neighborhood_url(&id),
			node: id,
			generation: self.generation,
			checkpoint: None,
		}
	}

	/// Double-click on the canvas: records the step and returns the fetch to
	/// issue, unless no node is near or that node is already being expanded.
	pub fn double_click(&mut self, sx: f64, sy: f64) -> Option<ExpandTicket> {
		let id = self.node_at_position(sx, sy)?;
		if self.in_flight.contains_key(&id) {
			debug!("expansion of {id} already in flight");
			return None;
		}
		let color = self.graph.node(&id)?.attrs.color;
		self.history.push_click(id.clone());
		self.history.remember_color(&id, color);
		let checkpoint = self.history.checkpoint(&self.graph);
		self.in_flight.insert(id.clone(), Some(checkpoint));
		Some(ExpandTicket {
			url: self.config.neighborhood_url(&id),
			node: id,
			generation: self.generation,
			checkpoint: Some(checkpoint),
		})
	}

	/// Grafts a fetched neighborhood and highlights the click path. Returns
	/// `None` when the ticket belongs to another session or the expansion's
	/// checkpoint was undone meanwhile.
	pub fn finish_expand(
		&mut self,
		ticket: &ExpandTicket,
		fragment: &GraphFragment,
	) -> Option<GraftStats> {
		if ticket.generation != self.generation {
			info!("dropping neighborhood of {}: explorer was reloaded", ticket.node);
			return None;
		}
		self.settle(ticket);
		if let Some(serial) = ticket.checkpoint {
			if !self.history.holds_checkpoint(serial) {
				info!("dropping neighborhood of {}: step was undone", ticket.node);
				return None;
			}
		}
		let stats = self.graph.graft(fragment);
		let (color, secs) = (self.config.highlight_color.clone(), self.config.tween_secs);
		for id in self.history.click_path() {
			self.graph.tween_color(id, Some(color.clone()), secs);
		}
		Some(stats)
	}

	pub fn abandon_expand(&mut self, ticket: &ExpandTicket) {
		if ticket.generation == self.generation {
			self.settle(ticket);
		}
	}

	/// Clears the pending mark, unless a newer expansion of the node owns it.
	fn settle(&mut self, ticket: &ExpandTicket) {
		if self.in_flight.get(&ticket.node) == Some(&ticket.checkpoint) {
			self.in_flight.remove(&ticket.node);
		}
	}

	/// Rolls back one step. Expansions whose checkpoint is gone no longer
	/// block a fresh double-click on their node.
	pub fn undo(&mut self) -> UndoOutcome {
		let outcome = self.history.undo(&mut self.graph, self.config.tween_secs);
		let history = &self.history;
		self.in_flight.retain(|_, checkpoint| {
			checkpoint.is_none_or(|serial| history.holds_checkpoint(serial))
		});
		outcome
	}

	pub fn cleanup(&mut self) -> Vec<NodeId> {
		self.history.cleanup(&mut self.graph, self.config.tween_secs)
	}

	pub fn tick(&mut self, dt: f64) {
		self.graph.tick(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

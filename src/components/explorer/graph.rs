use std::collections::{BTreeMap, HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, Node, NodeData, SimulationParameters};
use log::{debug, warn};

use super::color::ColorTween;
use super::geometry::Point;
use super::types::{EdgeAttrs, GraphFragment, NodeAttrs, NodeId};

const GOLDEN_ANGLE: f64 = PI * (3.0 - 2.236_067_977_499_79);
const SPAWN_DISTANCE: f64 = 60.0;

#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: NodeId,
	pub attrs: NodeAttrs,
	pub tween: Option<ColorTween>,
}

impl NodeInfo {
	/// Fill color for this frame, following any running transition.
	pub fn paint_color(&self) -> Option<String> {
		match &self.tween {
			Some(tween) => tween.current(),
			None => self.attrs.color().map(str::to_owned),
		}
	}
}

/// Borrowed view of a live node handed to visitors.
pub struct LiveNode<'a> {
	pub info: &'a NodeInfo,
	pub pos: Point,
}

/// A node as seen by a prune predicate: its data plus its outgoing edges.
pub struct PruneVisit<'a> {
	pub info: &'a NodeInfo,
	pub fixed: bool,
	pub outgoing: Vec<(&'a NodeId, &'a EdgeAttrs)>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraftStats {
	pub added_nodes: usize,
	pub updated_nodes: usize,
	pub added_edges: usize,
	pub skipped_edges: usize,
}

/// The live graph: node data and physics owned by the force simulation,
/// directed edge data kept alongside keyed by (source, target).
pub struct LiveGraph {
	layout: ForceGraph<NodeInfo, ()>,
	index: HashMap<NodeId, DefaultNodeIdx>,
	edges: BTreeMap<(NodeId, NodeId), EdgeAttrs>,
	node_mass: f32,
	spawned: usize,
}

impl LiveGraph {
	pub fn new(parameters: SimulationParameters, node_mass: f32) -> Self {
		Self {
			layout: ForceGraph::new(parameters),
			index: HashMap::new(),
			edges: BTreeMap::new(),
			node_mass,
			spawned: 0,
		}
	}

	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn contains(&self, id: &NodeId) -> bool {
		self.index.contains_key(id)
	}

	pub fn ids(&self) -> HashSet<NodeId> {
		self.index.keys().cloned().collect()
	}

	fn with_node<R>(&self, id: &NodeId, f: impl FnOnce(&Node<NodeInfo>) -> R) -> Option<R> {
		let idx = *self.index.get(id)?;
		let (mut f, mut out) = (Some(f), None);
		self.layout.visit_nodes(|node| {
			if node.index() == idx {
				if let Some(f) = f.take() {
					out = Some(f(node));
				}
			}
		});
		out
	}

	fn with_node_mut<R>(
		&mut self,
		id: &NodeId,
		f: impl FnOnce(&mut Node<NodeInfo>) -> R,
	) -> Option<R> {
		let idx = *self.index.get(id)?;
		let (mut f, mut out) = (Some(f), None);
		self.layout.visit_nodes_mut(|node| {
			if node.index() == idx {
				if let Some(f) = f.take() {
					out = Some(f(node));
				}
			}
		});
		out
	}

	pub fn node(&self, id: &NodeId) -> Option<NodeInfo> {
		self.with_node(id, |node| node.data.user_data.clone())
	}

	pub fn position(&self, id: &NodeId) -> Option<Point> {
		self.with_node(id, |node| Point::new(node.x() as f64, node.y() as f64))
	}

	#[cfg(test)]
	pub fn is_fixed(&self, id: &NodeId) -> Option<bool> {
		self.with_node(id, |node| node.data.is_anchor)
	}

	#[cfg(test)]
	pub fn mass(&self, id: &NodeId) -> Option<f32> {
		self.with_node(id, |node| node.data.mass)
	}

	pub fn set_position(&mut self, id: &NodeId, pos: Point) -> bool {
		self.with_node_mut(id, |node| {
			node.data.x = pos.x as f32;
			node.data.y = pos.y as f32;
		})
		.is_some()
	}

	/// Pins a node: the simulation stops moving it and cleanup keeps it.
	pub fn set_fixed(&mut self, id: &NodeId) -> bool {
		self.with_node_mut(id, |node| {
			node.data.is_anchor = true;
			node.data.user_data.attrs.fixed = true;
		})
		.is_some()
	}

	pub fn set_mass(&mut self, id: &NodeId, mass: f32) -> bool {
		self.with_node_mut(id, |node| node.data.mass = mass).is_some()
	}

	/// Starts an animated transition from the node's current color.
	pub fn tween_color(&mut self, id: &NodeId, to: Option<String>, secs: f64) -> bool {
		self.with_node_mut(id, |node| {
			let info = &mut node.data.user_data;
			let from = info.paint_color();
			info.tween = Some(ColorTween::new(from, to, secs));
		})
		.is_some()
	}

	pub fn for_each_node(&self, mut f: impl FnMut(LiveNode<'_>)) {
		self.layout.visit_nodes(|node| {
			f(LiveNode {
				info: &node.data.user_data,
				pos: Point::new(node.x() as f64, node.y() as f64),
			})
		});
	}

	pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, &EdgeAttrs)> {
		self.edges.iter().map(|((s, t), attrs)| (s, t, attrs))
	}

	#[cfg(test)]
	pub fn edge(&self, source: &NodeId, target: &NodeId) -> Option<&EdgeAttrs> {
		self.edges.get(&(source.clone(), target.clone()))
	}

	/// Node whose center is closest to `at`, with its distance.
	pub fn nearest(&self, at: Point) -> Option<(NodeId, f64)> {
		let mut best: Option<(NodeId, f64)> = None;
		self.for_each_node(|node| {
			let d = node.pos.distance_sq(at);
			if best.as_ref().is_none_or(|(_, bd)| d < *bd) {
				best = Some((node.info.id.clone(), d));
			}
		});
		best.map(|(id, d)| (id, d.sqrt()))
	}

	fn spawn_point(&mut self, near: Option<Point>) -> Point {
		let n = self.spawned as f64;
		self.spawned += 1;
		let center = near.unwrap_or_default();
		let angle = n * GOLDEN_ANGLE;
		Point::new(
			center.x + SPAWN_DISTANCE * angle.cos(),
			center.y + SPAWN_DISTANCE * angle.sin(),
		)
	}

	fn placed_neighbor(&self, id: &NodeId, fragment: &GraphFragment) -> Option<Point> {
		let outgoing = fragment.edges.get(id).into_iter().flat_map(|t| t.keys());
		let incoming = fragment
			.edges
			.iter()
			.filter(|(_, targets)| targets.contains_key(id))
			.map(|(source, _)| source);
		outgoing
			.chain(incoming)
			.filter(|other| *other != id)
			.find_map(|other| self.position(other))
	}

	/// Unions a fragment into the live graph. Known nodes and edges take the
	/// fragment's attributes; a node that is already fixed stays fixed.
	pub fn graft(&mut self, fragment: &GraphFragment) -> GraftStats {
		let mut stats = GraftStats::default();

		for (id, attrs) in &fragment.nodes {
			let updated = self.with_node_mut(id, |node| {
				let fixed = node.data.is_anchor || attrs.fixed;
				node.data.is_anchor = fixed;
				node.data.user_data.attrs = NodeAttrs { fixed, ..attrs.clone() };
				node.data.user_data.tween = None;
			});
			if updated.is_some() {
				stats.updated_nodes += 1;
				continue;
			}

			let near = self.placed_neighbor(id, fragment);
			let pos = self.spawn_point(near);
			let idx = self.layout.add_node(NodeData {
				x: pos.x as f32,
				y: pos.y as f32,
				mass: self.node_mass,
				is_anchor: attrs.fixed,
				user_data: NodeInfo {
					id: id.clone(),
					attrs: attrs.clone(),
					tween: None,
				},
			});
			self.index.insert(id.clone(), idx);
			stats.added_nodes += 1;
		}

		for (source, targets) in &fragment.edges {
			for (target, attrs) in targets {
				let (Some(&src), Some(&tgt)) = (self.index.get(source), self.index.get(target))
				else {
					warn!("skipping edge {source} -> {target}: endpoint not in graph");
					stats.skipped_edges += 1;
					continue;
				};
				let key = (source.clone(), target.clone());
				if self.edges.insert(key, attrs.clone()).is_none() {
					let reverse = (target.clone(), source.clone());
					if src != tgt && !self.edges.contains_key(&reverse) {
						self.layout.add_edge(src, tgt, EdgeData::default());
					}
					stats.added_edges += 1;
				}
			}
		}

		debug!(
			"graft: +{} nodes, {} updated, +{} edges, {} skipped",
			stats.added_nodes, stats.updated_nodes, stats.added_edges, stats.skipped_edges
		);
		stats
	}

	/// Removes every node for which `remove` returns true, with its incident
	/// edges. Each live node is visited exactly once, in id order.
	pub fn prune(&mut self, mut remove: impl FnMut(&PruneVisit<'_>) -> bool) -> Vec<NodeId> {
		let mut live = BTreeMap::new();
		self.layout.visit_nodes(|node| {
			live.insert(
				node.data.user_data.id.clone(),
				(node.data.user_data.clone(), node.data.is_anchor),
			);
		});

		let mut doomed = Vec::new();
		for (id, (info, fixed)) in live {
			let outgoing = self
				.edges
				.range((id.clone(), NodeId(String::new()))..)
				.take_while(|((s, _), _)| *s == id)
				.map(|((_, t), attrs)| (t, attrs))
				.collect();
			if remove(&PruneVisit { info: &info, fixed, outgoing }) {
				doomed.push(id);
			}
		}

		for id in &doomed {
			if let Some(idx) = self.index.remove(id) {
				self.layout.remove_node(idx);
			}
		}
		let gone: HashSet<&NodeId> = doomed.iter().collect();
		self.edges
			.retain(|(s, t), _| !gone.contains(s) && !gone.contains(t));

		debug!("prune: -{} nodes, {} left", doomed.len(), self.len());
		doomed
	}

	/// Advances the simulation and any running color transitions.
	pub fn tick(&mut self, dt: f64) {
		self.layout.update(dt as f32);
		self.layout.visit_nodes_mut(|node| {
			let info = &mut node.data.user_data;
			if let Some(tween) = info.tween.as_mut() {
				tween.advance(dt);
				if tween.is_done() {
					info.attrs.color = tween.target().map(str::to_owned);
					info.tween = None;
				}
			}
		});
	}
}

#[cfg(test)]
pub(crate) mod fixtures {
	use super::*;

	/// Fragment with labelled nodes and directed edges.
	pub(crate) fn fragment(nodes: &[&str], edges: &[(&str, &str)]) -> GraphFragment {
		let mut fragment = GraphFragment::default();
		for id in nodes {
			fragment.nodes.insert(
				NodeId::from(*id),
				NodeAttrs {
					label: Some(format!("Node {id}")),
					color: Some("#007FFF".into()),
					..Default::default()
				},
			);
		}
		for (s, t) in edges {
			fragment
				.edges
				.entry(NodeId::from(*s))
				.or_default()
				.insert(NodeId::from(*t), EdgeAttrs { directed: true, ..Default::default() });
		}
		fragment
	}
}

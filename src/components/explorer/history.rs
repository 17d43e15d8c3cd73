//! Undo history of graph exploration.
//!
//! Two kinds of entries live on the stack. A checkpoint remembers which nodes
//! were live before an expansion, so undoing it prunes everything added
//! since. A cleanup snapshot remembers the full data of what a cleanup
//! removed, so undoing it grafts that structure back.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use super::graph::{GraftStats, LiveGraph};
use super::types::{GraphFragment, NodeAttrs, NodeId};

#[derive(Clone, Debug, PartialEq)]
pub enum UndoEntry {
	Checkpoint { serial: u64, nodes: HashSet<NodeId> },
	Cleanup(GraphFragment),
}

#[derive(Clone, Debug, PartialEq)]
pub enum UndoOutcome {
	/// Nothing left to undo.
	Empty,
	/// A checkpoint was rolled back.
	Pruned {
		removed: Vec<NodeId>,
		popped: Option<NodeId>,
	},
	/// A cleanup was reverted.
	Restored(GraftStats),
}

#[derive(Debug, Default)]
pub struct History {
	stack: Vec<UndoEntry>,
	click_path: Vec<NodeId>,
	original_colors: HashMap<NodeId, Option<String>>,
	next_serial: u64,
}

impl History {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of entries on the undo stack.
	pub fn depth(&self) -> usize {
		self.stack.len()
	}

	pub fn click_path(&self) -> &[NodeId] {
		&self.click_path
	}

	pub fn push_click(&mut self, id: NodeId) {
		self.click_path.push(id);
	}

	/// Records a node's color before it is first highlighted.
	pub fn remember_color(&mut self, id: &NodeId, color: Option<String>) {
		self.original_colors.entry(id.clone()).or_insert(color);
	}

	pub fn original_color(&self, id: &NodeId) -> Option<&Option<String>> {
		self.original_colors.get(id)
	}

	/// Saves the identity set of the live graph. Returns the checkpoint's
	/// serial, unique for the lifetime of this history.
	pub fn checkpoint(&mut self, graph: &LiveGraph) -> u64 {
		let serial = self.next_serial;
		self.next_serial += 1;
		self.stack.push(UndoEntry::Checkpoint {
			serial,
			nodes: graph.ids(),
		});
		serial
	}

	/// Whether the checkpoint with this serial is still on the stack.
	pub fn holds_checkpoint(&self, serial: u64) -> bool {
		self.stack
			.iter()
			.any(|entry| matches!(entry, UndoEntry::Checkpoint { serial: s, .. } if *s == serial))
	}

	pub fn undo(&mut self, graph: &mut LiveGraph, tween_secs: f64) -> UndoOutcome {
		let Some(entry) = self.stack.pop() else {
			info!("already at oldest state");
			return UndoOutcome::Empty;
		};
		match entry {
			UndoEntry::Cleanup(snapshot) => UndoOutcome::Restored(graph.graft(&snapshot)),
			UndoEntry::Checkpoint { nodes: previous, .. } => {
				let popped = self.click_path.pop();
				let removed =
					graph.prune(|visit| !visit.fixed && !previous.contains(&visit.info.id));
				if let Some(id) = &popped {
					self.unhighlight(graph, id, tween_secs);
				}
				UndoOutcome::Pruned { removed, popped }
			}
		}
	}

	fn unhighlight(&self, graph: &mut LiveGraph, id: &NodeId, tween_secs: f64) {
		if self.click_path.contains(id) {
			return;
		}
		if !graph.contains(id) {
			warn!("no previous state saved for node {id}");
			return;
		}
		if let Some(color) = self.original_color(id) {
			graph.tween_color(id, color.clone(), tween_secs);
		}
	}

	/// Removes every node that is not fixed, saving everything visited so a
	/// later undo can graft it back. Remembered colors are restored on the
	/// nodes that stay.
	pub fn cleanup(&mut self, graph: &mut LiveGraph, tween_secs: f64) -> Vec<NodeId> {
		let mut snapshot = GraphFragment::default();
		let removed = graph.prune(|visit| {
			let info = visit.info;
			let color = match &info.tween {
				Some(tween) => tween.target().map(str::to_owned),
				None => info.attrs.color.clone(),
			};
			snapshot
				.nodes
				.insert(info.id.clone(), NodeAttrs { color, ..info.attrs.clone() });
			let edges = snapshot.edges.entry(info.id.clone()).or_default();
			for (target, attrs) in &visit.outgoing {
				edges.insert((*target).clone(), (*attrs).clone());
			}
			!visit.fixed
		});

		for (id, color) in &self.original_colors {
			if graph.contains(id) {
				graph.tween_color(id, color.clone(), tween_secs);
			}
		}

		debug!(
			"cleanup saved {} nodes, {} edges",
			snapshot.nodes.len(),
			snapshot.edge_count()
		);
		self.stack.push(UndoEntry::Cleanup(snapshot));
		removed
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::explorer::config::ExplorerConfig;
	use crate::components::explorer::graph::fixtures::fragment;

	fn graph() -> LiveGraph {
		let config = ExplorerConfig::default();
		LiveGraph::new(config.simulation(), config.node_mass)
	}

	fn ids(list: &[&str]) -> HashSet<NodeId> {
		list.iter().map(|id| NodeId::from(*id)).collect()
	}

	#[test]
	fn undo_on_empty_stack_is_a_no_op() {
		let mut g = graph();
		g.graft(&fragment(&["a"], &[]));
		let mut history = History::new();
		assert_eq!(history.undo(&mut g, 2.0), UndoOutcome::Empty);
		assert_eq!(g.ids(), ids(&["a"]));
	}

	#[test]
	fn grafts_then_as_many_undos_restore_identity_set() {
		let mut g = graph();
		g.graft(&fragment(&["a", "b"], &[("a", "b")]));
		let start = g.ids();
		let mut history = History::new();

		let steps = [
			fragment(&["b", "c", "d"], &[("b", "c"), ("b", "d")]),
			fragment(&["c", "e"], &[("c", "e")]),
			fragment(&["a", "f", "b"], &[("f", "a")]),
		];
		for (step, clicked) in steps.iter().zip(["b", "c", "a"]) {
			history.push_click(clicked.into());
			history.checkpoint(&g);
			g.graft(step);
		}
		assert_eq!(g.len(), 6);

		for _ in &steps {
			assert!(matches!(history.undo(&mut g, 2.0), UndoOutcome::Pruned { .. }));
		}
		assert_eq!(g.ids(), start);
		assert!(history.click_path().is_empty());
	}

	#[test]
	fn undo_keeps_nodes_pinned_since_checkpoint() {
		let mut g = graph();
		g.graft(&fragment(&["a"], &[]));
		let mut history = History::new();
		history.checkpoint(&g);
		g.graft(&fragment(&["a", "b", "c"], &[("a", "b"), ("a", "c")]));
		g.set_fixed(&"b".into());
		let outcome = history.undo(&mut g, 2.0);
		assert_eq!(
			outcome,
			UndoOutcome::Pruned {
				removed: vec!["c".into()],
				popped: None,
			}
		);
		assert_eq!(g.ids(), ids(&["a", "b"]));
	}

	#[test]
	fn cleanup_then_undo_restores_pruned_structure() {
		let mut g = graph();
		let mut initial = fragment(&["a", "b", "c"], &[("a", "b"), ("c", "a"), ("b", "c")]);
		initial.nodes.get_mut(&NodeId::from("a")).unwrap().fixed = true;
		initial
			.edges
			.get_mut(&NodeId::from("a"))
			.unwrap()
			.get_mut(&NodeId::from("b"))
			.unwrap()
			.label = Some("Depends on".into());
		g.graft(&initial);
		let mut history = History::new();

		let removed = history.cleanup(&mut g, 2.0);
		assert_eq!(removed, vec![NodeId::from("b"), NodeId::from("c")]);
		assert_eq!(g.ids(), ids(&["a"]));
		assert_eq!(g.edges().count(), 0);

		let outcome = history.undo(&mut g, 2.0);
		assert!(matches!(outcome, UndoOutcome::Restored(_)));
		assert_eq!(g.ids(), ids(&["a", "b", "c"]));
		for id in ["b", "c"] {
			let id = NodeId::from(id);
			assert_eq!(g.node(&id).unwrap().attrs, initial.nodes[&id]);
		}
		let restored: Vec<_> = g
			.edges()
			.map(|(s, t, attrs)| (s.0.clone(), t.0.clone(), attrs.clone()))
			.collect();
		let expected: Vec<_> = initial
			.edges
			.iter()
			.flat_map(|(s, targets)| {
				targets
					.iter()
					.map(move |(t, attrs)| (s.0.clone(), t.0.clone(), attrs.clone()))
			})
			.collect();
		assert_eq!(restored, expected);
	}

	#[test]
	fn cleanup_restores_remembered_colors_on_survivors() {
		let mut g = graph();
		let mut initial = fragment(&["a"], &[]);
		initial.nodes.get_mut(&NodeId::from("a")).unwrap().fixed = true;
		g.graft(&initial);
		let mut history = History::new();
		history.remember_color(&"a".into(), Some("#007FFF".into()));
		g.tween_color(&"a".into(), Some("black".into()), 0.0);
		g.tick(0.0);
		assert_eq!(g.node(&"a".into()).unwrap().attrs.color(), Some("black"));

		history.cleanup(&mut g, 0.5);
		g.tick(0.5);
		assert_eq!(g.node(&"a".into()).unwrap().attrs.color(), Some("#007FFF"));
	}

	#[test]
	fn undone_checkpoints_are_no_longer_held() {
		let mut g = graph();
		let mut history = History::new();
		let first = history.checkpoint(&g);
		let second = history.checkpoint(&g);
		assert_ne!(first, second);
		history.undo(&mut g, 2.0);
		assert!(history.holds_checkpoint(first));
		assert!(!history.holds_checkpoint(second));
		let third = history.checkpoint(&g);
		assert_ne!(third, second);
		assert!(!history.holds_checkpoint(second));
	}

	#[test]
	fn remembered_color_is_the_first_one() {
		let mut history = History::new();
		history.remember_color(&"a".into(), Some("#111".into()));
		history.remember_color(&"a".into(), Some("black".into()));
		assert_eq!(history.original_color(&"a".into()), Some(&Some("#111".to_owned())));
	}
}

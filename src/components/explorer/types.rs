use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable external handle of a node.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self(id.to_owned())
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
	Dot,
	#[default]
	#[serde(other)]
	Box,
}

/// Presentation attributes carried by a node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeAttrs {
	pub color: Option<String>,
	pub label: Option<String>,
	pub url: Option<String>,
	#[serde(deserialize_with = "null_as_default")]
	pub shape: Shape,
	#[serde(deserialize_with = "null_as_default")]
	pub fixed: bool,
}

pub const COLOR_NONE: &str = "none";

impl NodeAttrs {
	/// Color to fill with; empty means unset.
	pub fn color(&self) -> Option<&str> {
		self.color.as_deref().filter(|c| !c.is_empty())
	}

	/// Label to draw, if it has any visible characters.
	pub fn visible_label(&self) -> Option<&str> {
		self.label
			.as_deref()
			.filter(|l| !l.chars().all(|c| c == ' ' || c == '\t'))
	}
}

/// Attributes carried by an edge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeAttrs {
	#[serde(deserialize_with = "null_as_default")]
	pub directed: bool,
	pub label: Option<String>,
	#[serde(deserialize_with = "lenient_number")]
	pub weight: Option<f64>,
	pub color: Option<String>,
}

impl EdgeAttrs {
	pub fn weight(&self) -> f64 {
		self.weight.unwrap_or(1.0)
	}

	pub fn trimmed_label(&self) -> Option<&str> {
		self.label.as_deref().map(str::trim).filter(|l| !l.is_empty())
	}

	pub fn color(&self) -> Option<&str> {
		self.color.as_deref().filter(|c| !c.is_empty())
	}
}

/// Accepts a number or a numeric string; everything else reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = serde_json::Value::deserialize(deserializer)?;
	Ok(match value {
		serde_json::Value::Number(n) => n.as_f64(),
		serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
		_ => None,
	}
	.filter(|w| w.is_finite()))
}

/// Reads `null` as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de> + Default,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Subgraph as served by the neighborhood endpoint, and as saved by cleanup.
///
/// `edges` is keyed by source id, then target id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphFragment {
	pub nodes: BTreeMap<NodeId, NodeAttrs>,
	pub edges: BTreeMap<NodeId, BTreeMap<NodeId, EdgeAttrs>>,
}

impl GraphFragment {
	pub fn edge_count(&self) -> usize {
		self.edges.values().map(BTreeMap::len).sum()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_neighborhood_payload() {
		let json = r##"{
			"nodes": {
				"12": {"color": "#00CC00", "label": "Router r1", "fixed": true, "url": "/router/12/"},
				"13": {"color": "", "label": "Port ge-0/0/1", "url": null, "shape": "dot"},
				"14": {"label": "Cable", "shape": "hexagon", "extra": 1}
			},
			"edges": {
				"12": {"13": {"directed": true, "label": "Has"}},
				"14": {"12": {"weight": "2.5", "color": "#f00"}, "13": {"weight": "heavy"}}
			}
		}"##;
		let fragment: GraphFragment = serde_json::from_str(json).unwrap();
		assert_eq!(fragment.nodes.len(), 3);
		assert_eq!(fragment.edge_count(), 3);

		let router = &fragment.nodes[&NodeId::from("12")];
		assert!(router.fixed);
		assert_eq!(router.color(), Some("#00CC00"));
		assert_eq!(router.shape, Shape::Box);

		let port = &fragment.nodes[&NodeId::from("13")];
		assert_eq!(port.color(), None);
		assert_eq!(port.shape, Shape::Dot);
		assert_eq!(port.url, None);

		assert_eq!(fragment.nodes[&NodeId::from("14")].shape, Shape::Box);

		let has = &fragment.edges[&NodeId::from("12")][&NodeId::from("13")];
		assert!(has.directed);
		assert_eq!(has.weight(), 1.0);
		let cable = &fragment.edges[&NodeId::from("14")];
		assert_eq!(cable[&NodeId::from("12")].weight(), 2.5);
		assert_eq!(cable[&NodeId::from("13")].weight, None);
	}

	#[test]
	fn null_fields_read_as_unset() {
		let json = r#"{
			"nodes": {"1": {"shape": null, "fixed": null, "label": null}},
			"edges": {"1": {"2": {"directed": null, "weight": null, "label": null}}}
		}"#;
		let fragment: GraphFragment = serde_json::from_str(json).unwrap();
		let node = &fragment.nodes[&NodeId::from("1")];
		assert_eq!(node.shape, Shape::Box);
		assert!(!node.fixed);
		assert_eq!(node.label, None);
		let edge = &fragment.edges[&NodeId::from("1")][&NodeId::from("2")];
		assert!(!edge.directed);
		assert_eq!(edge.weight(), 1.0);
	}

	#[test]
	fn blank_labels_are_not_drawn() {
		let attrs = NodeAttrs {
			label: Some(" \t ".into()),
			..Default::default()
		};
		assert_eq!(attrs.visible_label(), None);
		let edge = EdgeAttrs {
			label: Some("  uses ".into()),
			..Default::default()
		};
		assert_eq!(edge.trimmed_label(), Some("uses"));
	}
}

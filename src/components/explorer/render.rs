use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::geometry::{NodeBox, Point, intersect_line_box};
use super::session::Session;
use super::types::{COLOR_NONE, NodeId, Shape};

const LABEL_PADDING: f64 = 12.0;
const BOX_HALF_HEIGHT: f64 = 11.0;
const BOX_RADIUS: f64 = 3.0;
const FONT: &str = "12px Helvetica";
const DEFAULT_NODE_FILL: &str = "rgba(0,0,0,.2)";
const TRANSPARENT: &str = "rgba(0,0,0,0)";
const DEFAULT_EDGE_STROKE: &str = "#cccccc";
const LABEL_LIGHT: &str = "white";
const LABEL_DARK: &str = "#333333";

/// Chevron dimensions at the head of a directed edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrowhead {
	pub length: f64,
	pub width: f64,
	pub weight: f64,
}

impl Arrowhead {
	pub fn for_weight(weight: f64) -> Self {
		Self {
			length: 10.0 + weight,
			width: 3.0 + weight,
			weight,
		}
	}
}

/// The drawing operations the explorer needs from a 2D surface.
pub trait Surface {
	fn clear(&self, width: f64, height: f64);
	fn text_width(&self, text: &str) -> f64;
	fn fill_oval(&self, node_box: &NodeBox, color: &str);
	fn fill_round_rect(&self, node_box: &NodeBox, radius: f64, color: &str);
	fn fill_label(&self, text: &str, at: Point, color: &str);
	fn stroke_segment(&self, from: Point, to: Point, width: f64, color: &str);
	/// Chevron with its tip at `head`, pointing along `angle`.
	fn fill_arrowhead(&self, head: Point, angle: f64, arrow: Arrowhead, color: &str);
	/// Black text over a white outline.
	fn outlined_label(&self, text: &str, at: Point);
}

/// Redraws the whole frame.
pub fn render(session: &Session, surface: &impl Surface) {
	surface.clear(session.width, session.height);
	let boxes = draw_nodes(session, surface);
	draw_edges(session, surface, &boxes);
}

fn draw_nodes(session: &Session, surface: &impl Surface) -> HashMap<NodeId, NodeBox> {
	let mut boxes = HashMap::new();
	session.graph.for_each_node(|node| {
		let mut pt = session.transform.to_screen(node.pos);
		let label = node.info.attrs.visible_label();
		let w = surface.text_width(label.unwrap_or_default()) + LABEL_PADDING;
		if label.is_some() {
			// whole pixels keep text crisp
			pt = Point::new(pt.x.floor(), pt.y.floor());
		}

		let color = node.info.paint_color();
		let fill = match color.as_deref() {
			Some(COLOR_NONE) => TRANSPARENT,
			Some(c) => c,
			None => DEFAULT_NODE_FILL,
		};
		let node_box = match node.info.attrs.shape {
			Shape::Dot => {
				let b = NodeBox { x: pt.x - w / 2.0, y: pt.y - w / 2.0, w, h: w };
				surface.fill_oval(&b, fill);
				b
			}
			Shape::Box => {
				let b = NodeBox {
					x: pt.x - w / 2.0,
					y: pt.y - BOX_HALF_HEIGHT,
					w,
					h: 2.0 * BOX_HALF_HEIGHT,
				};
				surface.fill_round_rect(&b, BOX_RADIUS, fill);
				b
			}
		};
		boxes.insert(node.info.id.clone(), node_box);

		if let Some(label) = label {
			let text_color = if color.as_deref() == Some(COLOR_NONE) {
				LABEL_DARK
			} else {
				LABEL_LIGHT
			};
			surface.fill_label(label, Point::new(pt.x, pt.y + 5.0), text_color);
		}
	});
	boxes
}

fn draw_edges(session: &Session, surface: &impl Surface, boxes: &HashMap<NodeId, NodeBox>) {
	for (source, target, attrs) in session.graph.edges() {
		if source == target {
			continue;
		}
		let (Some(src_box), Some(tgt_box)) = (boxes.get(source), boxes.get(target)) else {
			continue;
		};
		let pt1 = center(src_box);
		let pt2 = center(tgt_box);
		let tail = intersect_line_box(pt1, pt2, src_box).unwrap_or(pt1);
		let head = intersect_line_box(tail, pt2, tgt_box).unwrap_or(pt2);

		let weight = attrs.weight();
		let color = attrs.color().unwrap_or(DEFAULT_EDGE_STROKE);
		surface.stroke_segment(tail, head, weight, color);

		if attrs.directed {
			surface.fill_arrowhead(head, tail.angle_to(head), Arrowhead::for_weight(weight), color);
		}
		if let Some(label) = attrs.trimmed_label() {
			surface.outlined_label(label, tail.midpoint(head));
		}
	}
}

fn center(b: &NodeBox) -> Point {
	Point::new(b.x + b.w / 2.0, b.y + b.h / 2.0)
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&self, width: f64, height: f64) {
		self.clear_rect(0.0, 0.0, width, height);
	}

	fn text_width(&self, text: &str) -> f64 {
		self.set_font(FONT);
		self.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
	}

	fn fill_oval(&self, b: &NodeBox, color: &str) {
		self.set_fill_style_str(color);
		self.begin_path();
		let _ = self.ellipse(
			b.x + b.w / 2.0,
			b.y + b.h / 2.0,
			b.w / 2.0,
			b.h / 2.0,
			0.0,
			0.0,
			2.0 * PI,
		);
		self.fill();
	}

	fn fill_round_rect(&self, b: &NodeBox, r: f64, color: &str) {
		let (l, t, rt, bt) = (b.x, b.y, b.x + b.w, b.y + b.h);
		self.set_fill_style_str(color);
		self.begin_path();
		self.move_to(l + r, t);
		self.line_to(rt - r, t);
		self.quadratic_curve_to(rt, t, rt, t + r);
		self.line_to(rt, bt - r);
		self.quadratic_curve_to(rt, bt, rt - r, bt);
		self.line_to(l + r, bt);
		self.quadratic_curve_to(l, bt, l, bt - r);
		self.line_to(l, t + r);
		self.quadratic_curve_to(l, t, l + r, t);
		self.close_path();
		self.fill();
	}

	fn fill_label(&self, text: &str, at: Point, color: &str) {
		self.set_font(FONT);
		self.set_text_align("center");
		self.set_fill_style_str(color);
		let _ = self.fill_text(text, at.x, at.y);
	}

	fn stroke_segment(&self, from: Point, to: Point, width: f64, color: &str) {
		self.save();
		self.begin_path();
		self.set_line_width(width);
		self.set_stroke_style_str(color);
		self.move_to(from.x, from.y);
		self.line_to(to.x, to.y);
		self.stroke();
		self.restore();
	}

	fn fill_arrowhead(&self, head: Point, angle: f64, arrow: Arrowhead, color: &str) {
		let Arrowhead { length, width, weight } = arrow;
		self.save();
		self.set_fill_style_str(color);
		let _ = self.translate(head.x, head.y);
		let _ = self.rotate(angle);
		// cut the line away under the tip
		self.clear_rect(-length / 2.0, -weight / 2.0, length / 2.0, weight);
		self.begin_path();
		self.move_to(-length, width);
		self.line_to(0.0, 0.0);
		self.line_to(-length, -width);
		self.line_to(-length * 0.8, 0.0);
		self.close_path();
		self.fill();
		self.restore();
	}

	fn outlined_label(&self, text: &str, at: Point) {
		self.save();
		self.set_font(FONT);
		self.set_text_align("center");
		self.set_line_width(4.0);
		self.set_stroke_style_str("rgba(255,255,255,1)");
		let _ = self.stroke_text(text, at.x, at.y);
		self.set_fill_style_str("black");
		let _ = self.fill_text(text, at.x, at.y);
		self.restore();
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;
	use crate::components::explorer::config::ExplorerConfig;
	use crate::components::explorer::graph::fixtures::fragment;
	use crate::components::explorer::types::{EdgeAttrs, GraphFragment, NodeAttrs};

	#[derive(Debug, PartialEq)]
	enum Op {
		Clear,
		Oval(NodeBox, String),
		Rect(NodeBox, String),
		Label(String, Point, String),
		Segment(Point, Point, f64, String),
		Arrow(Point, Arrowhead, String),
		Outlined(String, Point),
	}

	/// Records calls; every character is 6 units wide.
	#[derive(Default)]
	struct Recorder(RefCell<Vec<Op>>);

	impl Recorder {
		fn ops(&self) -> std::cell::Ref<'_, Vec<Op>> {
			self.0.borrow()
		}

		fn segments(&self) -> Vec<(Point, Point)> {
			self.ops()
				.iter()
				.filter_map(|op| match op {
					Op::Segment(a, b, ..) => Some((*a, *b)),
					_ => None,
				})
				.collect()
		}
	}

	impl Surface for Recorder {
		fn clear(&self, _: f64, _: f64) {
			self.0.borrow_mut().push(Op::Clear);
		}
		fn text_width(&self, text: &str) -> f64 {
			6.0 * text.chars().count() as f64
		}
		fn fill_oval(&self, b: &NodeBox, color: &str) {
			self.0.borrow_mut().push(Op::Oval(*b, color.into()));
		}
		fn fill_round_rect(&self, b: &NodeBox, _: f64, color: &str) {
			self.0.borrow_mut().push(Op::Rect(*b, color.into()));
		}
		fn fill_label(&self, text: &str, at: Point, color: &str) {
			self.0.borrow_mut().push(Op::Label(text.into(), at, color.into()));
		}
		fn stroke_segment(&self, from: Point, to: Point, width: f64, color: &str) {
			self.0.borrow_mut().push(Op::Segment(from, to, width, color.into()));
		}
		fn fill_arrowhead(&self, head: Point, _: f64, arrow: Arrowhead, color: &str) {
			self.0.borrow_mut().push(Op::Arrow(head, arrow, color.into()));
		}
		fn outlined_label(&self, text: &str, at: Point) {
			self.0.borrow_mut().push(Op::Outlined(text.into(), at));
		}
	}

	fn session(fragment: &GraphFragment, at: &[(&str, f64, f64)]) -> Session {
		let mut session = Session::new(ExplorerConfig::default(), 800.0, 600.0);
		session.graph.graft(fragment);
		for (id, x, y) in at {
			session.graph.set_position(&NodeId::from(*id), Point::new(*x, *y));
		}
		session
	}

	#[test]
	fn self_loops_are_never_drawn() {
		let s = session(
			&fragment(&["a", "b"], &[("a", "a"), ("a", "b"), ("b", "b")]),
			&[("a", 0.0, 0.0), ("b", 200.0, 0.0)],
		);
		let surface = Recorder::default();
		render(&s, &surface);
		assert_eq!(surface.segments().len(), 1);
	}

	#[test]
	fn edges_run_between_box_borders() {
		let s = session(&fragment(&["a", "b"], &[("a", "b")]), &[("a", 0.0, 0.0), ("b", 200.0, 0.0)]);
		let surface = Recorder::default();
		render(&s, &surface);

		// "Node a" is 36 wide plus padding: boxes span x +-24 around centers.
		let (tail, head) = surface.segments()[0];
		assert!(tail.distance_sq(Point::new(424.0, 300.0)) < 1e-9, "{tail:?}");
		assert!(head.distance_sq(Point::new(576.0, 300.0)) < 1e-9, "{head:?}");
		let arrow = surface
			.ops()
			.iter()
			.find_map(|op| match op {
				Op::Arrow(at, arrow, _) => Some((*at, *arrow)),
				_ => None,
			})
			.unwrap();
		assert_eq!(arrow, (head, Arrowhead::for_weight(1.0)));
	}

	#[test]
	fn weight_and_color_shape_the_stroke() {
		let mut f = fragment(&["a", "b"], &[]);
		f.edges.entry("a".into()).or_default().insert(
			"b".into(),
			EdgeAttrs {
				weight: Some(3.0),
				color: Some("#f00".into()),
				label: Some(" uses ".into()),
				..Default::default()
			},
		);
		let s = session(&f, &[("a", 0.0, 0.0), ("b", 0.0, 200.0)]);
		let surface = Recorder::default();
		render(&s, &surface);
		let ops = surface.ops();
		let (tail, head, width, color) = ops
			.iter()
			.find_map(|op| match op {
				Op::Segment(a, b, w, c) => Some((*a, *b, *w, c.clone())),
				_ => None,
			})
			.unwrap();
		assert_eq!((width, color.as_str()), (3.0, "#f00"));
		assert!(!ops.iter().any(|op| matches!(op, Op::Arrow(..))));
		assert!(ops.contains(&Op::Outlined("uses".into(), tail.midpoint(head))));
	}

	#[test]
	fn node_glyphs_follow_shape_and_color() {
		let mut f = GraphFragment::default();
		f.nodes.insert(
			"dot".into(),
			NodeAttrs {
				shape: Shape::Dot,
				label: Some("ab".into()),
				color: Some("none".into()),
				..Default::default()
			},
		);
		f.nodes.insert("plain".into(), NodeAttrs::default());
		let s = session(&f, &[("dot", 10.4, 20.7), ("plain", -100.5, 0.0)]);
		let surface = Recorder::default();
		render(&s, &surface);
		let ops = surface.ops();

		// labelled node snaps to whole pixels; 2 chars -> 12 + 12 wide
		let dot = NodeBox { x: 398.0, y: 308.0, w: 24.0, h: 24.0 };
		assert!(ops.contains(&Op::Oval(dot, TRANSPARENT.into())));
		assert!(ops.contains(&Op::Label("ab".into(), Point::new(410.0, 325.0), LABEL_DARK.into())));

		let plain = NodeBox { x: 293.5, y: 289.0, w: 12.0, h: 22.0 };
		assert!(ops.contains(&Op::Rect(plain, DEFAULT_NODE_FILL.into())));
		assert_eq!(ops.iter().filter(|op| matches!(op, Op::Label(..))).count(), 1);
	}
}

/// A point in screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}

	pub fn angle_to(self, other: Point) -> f64 {
		(other.y - self.y).atan2(other.x - self.x)
	}

	pub fn distance_sq(self, other: Point) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		dx * dx + dy * dy
	}
}

/// Axis-aligned box, origin at the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeBox {
	pub x: f64,
	pub y: f64,
	pub w: f64,
	pub h: f64,
}

impl NodeBox {
	pub fn corners(&self) -> [Point; 4] {
		let (l, t, r, b) = (self.x, self.y, self.x + self.w, self.y + self.h);
		// top-left, top-right, bottom-right, bottom-left
		[
			Point::new(l, t),
			Point::new(r, t),
			Point::new(r, b),
			Point::new(l, b),
		]
	}
}

/// Intersection of segments p1-p2 and p3-p4, if they cross.
pub fn intersect_line_line(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
	let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
	if denom == 0.0 {
		// parallel
		return None;
	}
	let ua = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denom;
	let ub = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / denom;
	if !(0.0..=1.0).contains(&ua) || !(0.0..=1.0).contains(&ub) {
		return None;
	}
	Some(Point::new(p1.x + ua * (p2.x - p1.x), p1.y + ua * (p2.y - p1.y)))
}

/// First crossing of p1-p2 with the box border, testing top, right, bottom
/// and left edges in that order.
pub fn intersect_line_box(p1: Point, p2: Point, node_box: &NodeBox) -> Option<Point> {
	let [tl, tr, br, bl] = node_box.corners();
	[(tl, tr), (tr, br), (br, bl), (bl, tl)]
		.into_iter()
		.find_map(|(a, b)| intersect_line_line(p1, p2, a, b))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn on_border(p: Point, b: &NodeBox) -> bool {
		let eps = 1e-9;
		let inside_x = p.x >= b.x - eps && p.x <= b.x + b.w + eps;
		let inside_y = p.y >= b.y - eps && p.y <= b.y + b.h + eps;
		let on_vertical = (p.x - b.x).abs() < eps || (p.x - (b.x + b.w)).abs() < eps;
		let on_horizontal = (p.y - b.y).abs() < eps || (p.y - (b.y + b.h)).abs() < eps;
		inside_x && inside_y && (on_vertical || on_horizontal)
	}

	#[test]
	fn crossing_segments_meet() {
		let hit = intersect_line_line(
			Point::new(0.0, 0.0),
			Point::new(10.0, 10.0),
			Point::new(0.0, 10.0),
			Point::new(10.0, 0.0),
		);
		assert_eq!(hit, Some(Point::new(5.0, 5.0)));
	}

	#[test]
	fn parallel_segments_never_meet() {
		let hit = intersect_line_line(
			Point::new(0.0, 0.0),
			Point::new(10.0, 0.0),
			Point::new(0.0, 5.0),
			Point::new(10.0, 5.0),
		);
		assert_eq!(hit, None);
	}

	#[test]
	fn segments_that_stop_short_do_not_meet() {
		let hit = intersect_line_line(
			Point::new(0.0, 0.0),
			Point::new(1.0, 1.0),
			Point::new(0.0, 10.0),
			Point::new(10.0, 0.0),
		);
		assert_eq!(hit, None);
	}

	#[test]
	fn line_from_center_leaves_through_border() {
		let b = NodeBox { x: -20.0, y: -11.0, w: 40.0, h: 22.0 };
		let targets = [
			Point::new(100.0, 0.0),
			Point::new(-100.0, 3.0),
			Point::new(7.0, 80.0),
			Point::new(-30.0, -90.0),
			Point::new(64.0, 64.0),
		];
		for target in targets {
			let hit = intersect_line_box(Point::new(0.0, 0.0), target, &b)
				.unwrap_or_else(|| panic!("no border crossing towards {target:?}"));
			assert!(on_border(hit, &b), "{hit:?} not on border of {b:?}");
		}
	}

	#[test]
	fn top_edge_is_tested_first() {
		let b = NodeBox { x: 0.0, y: 0.0, w: 10.0, h: 10.0 };
		// Vertical line through the whole box crosses top and bottom.
		let hit = intersect_line_box(Point::new(5.0, -5.0), Point::new(5.0, 15.0), &b);
		assert_eq!(hit, Some(Point::new(5.0, 0.0)));
	}

	#[test]
	fn segment_outside_box_has_no_crossing() {
		let b = NodeBox { x: 0.0, y: 0.0, w: 10.0, h: 10.0 };
		let hit = intersect_line_box(Point::new(20.0, 20.0), Point::new(30.0, 40.0), &b);
		assert_eq!(hit, None);
	}
}

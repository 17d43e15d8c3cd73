//! CSS color parsing and interpolation for animated node recoloring.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
	pub r: f64,
	pub g: f64,
	pub b: f64,
	pub a: f64,
}

impl Rgba {
	/// Parses the subset of CSS colors the server and the explorer use.
	pub fn parse(css: &str) -> Option<Self> {
		let css = css.trim();
		match css.to_ascii_lowercase().as_str() {
			"black" => return Some(Self::opaque(0.0, 0.0, 0.0)),
			"white" => return Some(Self::opaque(255.0, 255.0, 255.0)),
			"gray" | "grey" => return Some(Self::opaque(128.0, 128.0, 128.0)),
			_ => {}
		}
		if let Some(hex) = css.strip_prefix('#') {
			return Self::parse_hex(hex);
		}
		let (args, has_alpha) = if let Some(rest) = css.strip_prefix("rgba(") {
			(rest.strip_suffix(')')?, true)
		} else if let Some(rest) = css.strip_prefix("rgb(") {
			(rest.strip_suffix(')')?, false)
		} else {
			return None;
		};
		let parts: Vec<f64> = args
			.split(',')
			.map(|p| p.trim().parse::<f64>().ok())
			.collect::<Option<_>>()?;
		match (parts.as_slice(), has_alpha) {
			([r, g, b], false) => Some(Self::opaque(*r, *g, *b)),
			([r, g, b, a], true) => Some(Self { r: *r, g: *g, b: *b, a: *a }),
			_ => None,
		}
	}

	fn parse_hex(hex: &str) -> Option<Self> {
		let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(f64::from);
		match hex.len() {
			3 => {
				let mut it = hex.chars().map(|c| channel(&c.to_string().repeat(2)));
				Some(Self::opaque(it.next()??, it.next()??, it.next()??))
			}
			6 => Some(Self::opaque(
				channel(hex.get(0..2)?)?,
				channel(hex.get(2..4)?)?,
				channel(hex.get(4..6)?)?,
			)),
			_ => None,
		}
	}

	const fn opaque(r: f64, g: f64, b: f64) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub fn lerp(self, to: Rgba, t: f64) -> Rgba {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: f64, b: f64| a + (b - a) * t;
		Rgba {
			r: mix(self.r, to.r),
			g: mix(self.g, to.g),
			b: mix(self.b, to.b),
			a: mix(self.a, to.a),
		}
	}

	pub fn to_css(self) -> String {
		format!(
			"rgba({}, {}, {}, {})",
			self.r.round() as u8,
			self.g.round() as u8,
			self.b.round() as u8,
			(self.a * 1000.0).round() / 1000.0
		)
	}
}

/// An in-progress color transition on a node.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTween {
	from: Option<String>,
	to: Option<String>,
	elapsed: f64,
	duration: f64,
}

impl ColorTween {
	pub fn new(from: Option<String>, to: Option<String>, duration: f64) -> Self {
		Self {
			from,
			to,
			elapsed: 0.0,
			duration: duration.max(0.0),
		}
	}

	pub fn target(&self) -> Option<&str> {
		self.to.as_deref()
	}

	pub fn is_done(&self) -> bool {
		self.elapsed >= self.duration
	}

	pub fn advance(&mut self, dt: f64) {
		self.elapsed = (self.elapsed + dt).min(self.duration);
	}

	/// Color to paint right now. Unparsable ends switch at completion.
	pub fn current(&self) -> Option<String> {
		if self.is_done() {
			return self.to.clone();
		}
		let parse = |c: &Option<String>| c.as_deref().and_then(Rgba::parse);
		match (parse(&self.from), parse(&self.to)) {
			(Some(a), Some(b)) => Some(a.lerp(b, self.elapsed / self.duration).to_css()),
			_ => self.from.clone(),
		}
	}
}

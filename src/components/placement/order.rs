use serde::Deserialize;

/// One placeable record, e.g. equipment mounted in a rack unit.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PlacementRow {
	pub handle_id: String,
	pub label: String,
	pub position: i64,
}

/// Reads the leading integer of an input, the way a browser's `parseInt`
/// would: `" 12U"` is 12, `"U12"` is nothing.
pub fn parse_position(input: &str) -> Option<i64> {
	let s = input.trim_start();
	let sign_len = usize::from(s.starts_with(['+', '-']));
	let digits = s[sign_len..]
		.find(|c: char| !c.is_ascii_digit())
		.map_or(s.len(), |end| sign_len + end);
	if digits == sign_len {
		return None;
	}
	s[..digits].parse().ok()
}

/// Highest position first.
pub fn sort_rows(rows: &mut [PlacementRow]) {
	rows.sort_by(|a, b| b.position.cmp(&a.position));
}

/// Gives a row its new position and moves it in front of the first other
/// row with a lower position, or to the end. Returns false if no such row.
pub fn place(rows: &mut Vec<PlacementRow>, handle_id: &str, position: i64) -> bool {
	let Some(idx) = rows.iter().position(|r| r.handle_id == handle_id) else {
		return false;
	};
	let mut row = rows.remove(idx);
	row.position = position;
	match rows.iter().position(|r| r.position < position) {
		Some(next) => rows.insert(next, row),
		None => rows.push(row),
	}
	true
}

use leptos::prelude::*;
use log::warn;

use crate::components::placement::{PlacementEditor, PlacementRow, sort_rows};

const DATA_ISLAND: &str = "placement-data";

/// Rows the server embedded as JSON in the page.
fn embedded_rows() -> Vec<PlacementRow> {
	let Some(text) = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(DATA_ISLAND))
		.and_then(|el| el.text_content())
	else {
		warn!("no #{DATA_ISLAND} element on page");
		return Vec::new();
	};
	match serde_json::from_str::<Vec<PlacementRow>>(&text) {
		Ok(mut rows) => {
			sort_rows(&mut rows);
			rows
		}
		Err(err) => {
			warn!("bad placement data: {err}");
			Vec::new()
		}
	}
}

/// Reorders equipment by editing positions in place.
#[component]
pub fn Placement() -> impl IntoView {
	view! {
		<h1>"Placement"</h1>
		<PlacementEditor rows=embedded_rows() />
	}
}

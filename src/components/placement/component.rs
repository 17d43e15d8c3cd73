use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};
use web_sys::FocusEvent;

use super::order::{PlacementRow, parse_position, place};
use crate::api;
use crate::error::Result;

/// Where position updates go and how the page exposes its CSRF token.
#[derive(Clone, Debug)]
pub struct PlacementConfig {
	/// `{id}` and `{pos}` are substituted.
	pub endpoint: String,
	pub csrf_selector: String,
}

impl Default for PlacementConfig {
	fn default() -> Self {
		Self {
			endpoint: "node/{id}/position/{pos}".into(),
			csrf_selector: "[name=csrfmiddlewaretoken]".into(),
		}
	}
}

impl PlacementConfig {
	pub fn position_url(&self, handle_id: &str, position: i64) -> String {
		self.endpoint
			.replace("{id}", handle_id)
			.replace("{pos}", &position.to_string())
	}
}

async fn update_position(config: &PlacementConfig, handle_id: &str, position: i64) -> Result<()> {
	let csrf = api::csrf_token(&config.csrf_selector)?;
	api::post_position(&config.position_url(handle_id, position), handle_id, &csrf).await
}

/// Editable list of positions. A row moves only after the server confirmed
/// its new position.
#[component]
pub fn PlacementEditor(
	/// Initial rows, highest position first.
	rows: Vec<PlacementRow>,
	#[prop(default = PlacementConfig::default())] config: PlacementConfig,
) -> impl IntoView {
	let rows = RwSignal::new(rows);
	let config = StoredValue::new(config);

	view! {
		<table class="placement-editor">
			<tbody>
				<For
					each=move || rows.get()
					key=|row: &PlacementRow| row.handle_id.clone()
					children=move |row: PlacementRow| {
						let handle_id = row.handle_id.clone();
						let on_blur = move |ev: FocusEvent| {
							let Some(position) = parse_position(&event_target_value(&ev)) else {
								return;
							};
							let previous = rows
								.with_untracked(|rs| {
									rs.iter().find(|r| r.handle_id == handle_id).map(|r| r.position)
								});
							if previous == Some(position) {
								return;
							}
							let (handle_id, config) = (handle_id.clone(), config.get_value());
							spawn_local(async move {
								match update_position(&config, &handle_id, position).await {
									Ok(()) => {
										info!("moved {handle_id} to position {position}");
										rows.update(|rs| {
											place(rs, &handle_id, position);
										});
									}
									Err(err) => warn!("unable to update node position: {err}"),
								}
							});
						};
						view! {
							<tr>
								<td>
									<input
										type="number"
										class="placement-position"
										value=row.position.to_string()
										on:blur=on_blur
									/>
								</td>
								<td>{row.label}</td>
							</tr>
						}
					}
				/>
			</tbody>
		</table>
	}
}

//! HTTP calls to the inventory server.

use gloo_net::http::{Request, Response};
use log::debug;
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;

use crate::components::explorer::GraphFragment;
use crate::error::{Result, VizError};

fn ensure_ok(url: &str, response: Response) -> Result<Response> {
	if response.ok() {
		Ok(response)
	} else {
		Err(VizError::Status {
			url: url.to_owned(),
			status: response.status(),
		})
	}
}

/// Fetches the neighborhood of a node as a graph fragment.
pub async fn fetch_neighborhood(url: &str) -> Result<GraphFragment> {
	debug!("GET {url}");
	let response = ensure_ok(url, Request::get(url).send().await?)?;
	Ok(response.json::<GraphFragment>().await?)
}

#[derive(Debug, Deserialize)]
struct PositionReply {
	#[serde(default)]
	success: bool,
}

/// Reads the CSRF token the server renders into the page.
pub fn csrf_token(selector: &str) -> Result<String> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(VizError::NoWindow)?;
	document
		.query_selector(selector)
		.ok()
		.flatten()
		.and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
		.map(|input| input.value())
		.ok_or(VizError::MissingCsrfToken)
}

/// Asks the server to store a new position for a record.
pub async fn post_position(url: &str, handle_id: &str, csrf: &str) -> Result<()> {
	debug!("POST {url}");
	let response = Request::post(url)
		.header("Content-Type", "application/x-www-form-urlencoded")
		.header("X-CSRFToken", csrf)
		.send()
		.await?;
	let reply: PositionReply = ensure_ok(url, response)?.json().await?;
	if reply.success {
		Ok(())
	} else {
		Err(VizError::Rejected {
			handle_id: handle_id.to_owned(),
		})
	}
}

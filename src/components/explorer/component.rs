use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::ExplorerConfig;
use super::history::UndoOutcome;
use super::render;
use super::session::{ExpandTicket, NodeLink, Session};
use super::types::NodeId;
use crate::api;

type SharedSession = Rc<RefCell<Option<Session>>>;
type MouseListener = Closure<dyn FnMut(MouseEvent)>;
/// Window-level move and up listeners, so a drag survives leaving the canvas.
type PointerListeners = Rc<RefCell<Option<(MouseListener, MouseListener)>>>;

const MAX_FRAME_SECS: f64 = 0.05;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Fetches a neighborhood and grafts it once it arrives.
fn spawn_expand(session: SharedSession, ticket: ExpandTicket) {
	spawn_local(async move {
		let result = api::fetch_neighborhood(&ticket.url).await;
		let mut guard = session.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};
		match result {
			Ok(fragment) => {
				if let Some(stats) = s.finish_expand(&ticket, &fragment) {
					info!(
						"expanded {}: +{} nodes, +{} edges",
						ticket.node, stats.added_nodes, stats.added_edges
					);
				}
			}
			Err(err) => {
				warn!("could not expand {}: {err}", ticket.node);
				s.abandon_expand(&ticket);
			}
		}
	});
}

/// Canvas explorer of a node's relationship graph. Double-click a node to
/// expand its neighborhood, drag to pin it, undo or clean up exploration.
#[component]
pub fn GraphExplorer(
	/// Handle of the node the graph starts from.
	#[prop(into)]
	root: Signal<String>,
	#[prop(default = ExplorerConfig::default())] config: ExplorerConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let session: SharedSession = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let pointer_cbs: PointerListeners = Rc::new(RefCell::new(None));
	let (clicked, set_clicked) = signal(None::<NodeLink>);
	let (session_init, animate_init, resize_cb_init) =
		(session.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let root_id = root.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("explorer needs a browser window");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((config.default_width, config.default_height))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.filter(|w| *w > 0.0)
						.unwrap_or(config.default_width)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.filter(|h| *h > 0.0)
						.unwrap_or(config.default_height)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};

		let mut fresh = Session::new(config.clone(), w, h);
		let ticket = fresh.load_root(NodeId(root_id));
		*session_init.borrow_mut() = Some(fresh);
		spawn_expand(session_init.clone(), ticket);

		if fullscreen && resize_cb_init.borrow().is_none() {
			let (session_resize, canvas_resize) = (session_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *session_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		if pointer_cbs.borrow().is_none() {
			let (session_mm, session_mu) = (session_init.clone(), session_init.clone());
			let on_move: MouseListener = Closure::new(move |ev: MouseEvent| {
				let Some((x, y)) = pointer(canvas_ref, &ev) else {
					return;
				};
				if let Some(ref mut s) = *session_mm.borrow_mut() {
					s.pointer_move(x, y);
				}
			});
			let on_up: MouseListener = Closure::new(move |_: MouseEvent| {
				if let Some(ref mut s) = *session_mu.borrow_mut() {
					s.pointer_up();
				}
			});
			let _ = window
				.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref());
			let _ =
				window.add_event_listener_with_callback("mouseup", on_up.as_ref().unchecked_ref());
			*pointer_cbs.borrow_mut() = Some((on_move, on_up));
		}

		if animate_init.borrow().is_some() {
			return;
		}
		let (session_anim, animate_inner) = (session_init.clone(), animate_init.clone());
		let last_frame = Rc::new(Cell::new(js_sys::Date::now()));
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = js_sys::Date::now();
			let dt = ((now - last_frame.replace(now)) / 1000.0).clamp(0.0, MAX_FRAME_SECS);
			if let Some(ref mut s) = *session_anim.borrow_mut() {
				if s.animation_running {
					s.tick(dt);
				}
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let session_md = session.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *session_md.borrow_mut() {
			if let Some(link) = s.pointer_down(x, y) {
				set_clicked.set(Some(link));
			}
		}
	};

	let session_dc = session.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let ticket = session_dc
			.borrow_mut()
			.as_mut()
			.and_then(|s| s.double_click(x, y));
		if let Some(ticket) = ticket {
			spawn_expand(session_dc.clone(), ticket);
		}
	};

	let session_wh = session.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *session_wh.borrow_mut() {
			s.zoom(x, y, ev.delta_y());
		}
	};

	let session_undo = session.clone();
	let on_undo = move |_| {
		if let Some(ref mut s) = *session_undo.borrow_mut() {
			match s.undo() {
				UndoOutcome::Empty => {}
				UndoOutcome::Pruned { removed, popped } => info!(
					"undo {}: removed {} nodes, {} steps left",
					popped.map(|id| id.0).unwrap_or_default(),
					removed.len(),
					s.history.depth()
				),
				UndoOutcome::Restored(stats) => info!(
					"undo cleanup: restored {} nodes, {} edges",
					stats.added_nodes, stats.added_edges
				),
			}
		}
	};

	let session_cleanup = session.clone();
	let on_cleanup = move |_| {
		if let Some(ref mut s) = *session_cleanup.borrow_mut() {
			let removed = s.cleanup();
			info!("cleanup removed {} nodes", removed.len());
		}
	};

	view! {
		<div class="graph-explorer">
			<canvas
				node_ref=canvas_ref
				class="graph-explorer-canvas"
				on:mousedown=on_mousedown
				on:dblclick=on_dblclick
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="graph-controls">
				<button class="btn" on:click=on_undo>"Undo"</button>
				<button class="btn" on:click=on_cleanup>"Clean up"</button>
			</div>
			<p id="clicked_node">
				{move || {
					clicked
						.get()
						.map(|link| {
							view! {
								"Go to "
								<a href=link.url.unwrap_or_default()>{link.label}</a>
								"."
							}
						})
				}}
			</p>
		</div>
	}
}

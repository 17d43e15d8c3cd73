use leptos::mount::mount_to_body;
use noclook_viz::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}

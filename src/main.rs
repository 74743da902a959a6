//! Mounts the planning board into the page body.

use leptos::prelude::*;
use planning_canvas::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}

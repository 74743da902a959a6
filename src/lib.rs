//! Planning canvas: a mind-map board whose nodes are placed by a layered
//! graph layout, with a floating markdown editor per node.
//!
//! [`graph`] and [`layout`] are plain Rust and usable off the browser; the
//! Leptos components and routes are wired up here.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
pub mod graph;
pub mod layout;
mod pages;

// Top-Level pages
use crate::pages::not_found::NotFound;
use crate::pages::planning::Planning;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the planning board and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Planning Canvas" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Planning />
			</Routes>
		</Router>
	}
}

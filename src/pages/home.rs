use leptos::prelude::*;
use serde_json::json;

use crate::components::skill_tree::SkillTreeCanvas;
use crate::engine::{GraphInput, ValidationMap};

/// A small clustered tree: four topics, a hub in each, a few cross links.
fn sample_tree() -> GraphInput {
	let value = json!({
		"topic": "Systems Programming",
		"clusters": [
			{ "id": "memory", "label": "Memory", "description": "Ownership, borrowing and what lives where" },
			{ "id": "concurrency", "label": "Concurrency", "description": "Sharing work across threads and tasks" },
			{ "id": "io", "label": "I/O" },
			{ "id": "tooling", "label": "Tooling" },
		],
		"nodes": [
			{ "id": "ownership", "label": "Ownership", "cluster": "memory", "size": "large" },
			{ "id": "borrowing", "label": "Borrowing", "cluster": "memory", "size": "medium" },
			{ "id": "lifetimes", "label": "Lifetimes", "cluster": "memory", "size": "medium" },
			{ "id": "smart-pointers", "label": "Smart\nPointers", "cluster": "memory" },
			{ "id": "unsafe", "label": "Unsafe", "cluster": "memory",
				"description": "Raw pointers and the invariants the compiler can no longer check" },
			{ "id": "threads", "label": "Threads", "cluster": "concurrency", "size": "large" },
			{ "id": "channels", "label": "Channels", "cluster": "concurrency" },
			{ "id": "atomics", "label": "Atomics", "cluster": "concurrency" },
			{ "id": "async", "label": "Async", "cluster": "concurrency", "size": "medium" },
			{ "id": "files", "label": "Files", "cluster": "io", "size": "medium" },
			{ "id": "sockets", "label": "Sockets", "cluster": "io" },
			{ "id": "serialization", "label": "Serialization", "cluster": "io" },
			{ "id": "cargo", "label": "Cargo", "cluster": "tooling", "size": "large" },
			{ "id": "testing", "label": "Testing", "cluster": "tooling" },
			{ "id": "profiling", "label": "Profiling", "cluster": "tooling" },
		],
		"connections": [
			["ownership", "borrowing"],
			["borrowing", "lifetimes"],
			["ownership", "smart-pointers"],
			["smart-pointers", "unsafe"],
			["lifetimes", "unsafe"],
			["ownership", "threads"],
			["threads", "channels"],
			["threads", "atomics"],
			["channels", "async"],
			["async", "sockets"],
			["files", "sockets"],
			["files", "serialization"],
			["cargo", "testing"],
			["cargo", "profiling"],
			["testing", "profiling"],
			["atomics", "unsafe"],
		],
	});
	GraphInput::from_value(value).unwrap_or_default()
}

fn sample_validation() -> ValidationMap {
	serde_json::from_value(json!({
		"ownership": { "tier": "master", "level": 88 },
		"borrowing": { "tier": "expert" },
		"lifetimes": { "tier": "adept", "level": 61 },
		"threads": { "tier": "journeyman" },
		"channels": { "tier": "journeyman", "level": 37 },
		"cargo": { "tier": "grandmaster" },
	}))
	.unwrap_or_default()
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(sample_tree);
	let illuminated: RwSignal<Option<Vec<String>>> = RwSignal::new(None);
	let validated: RwSignal<Option<ValidationMap>> = RwSignal::new(None);

	let light = move |ids: &[&str]| {
		illuminated.set(Some(ids.iter().map(|id| id.to_string()).collect()));
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<SkillTreeCanvas
					data=graph_data
					illuminated=illuminated
					validated=validated
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Skill Tree"</h1>
					<p class="subtitle">
						"Click a skill to focus it. Scroll or pinch to zoom. Drag to pan."
					</p>
					<div class="graph-controls">
						<button on:click=move |_| light(&["ownership", "borrowing", "lifetimes", "unsafe"])>
							"Memory path"
						</button>
						<button on:click=move |_| light(&["threads", "channels", "async", "sockets"])>
							"Async path"
						</button>
						<button on:click=move |_| illuminated.set(None)>"Show all"</button>
						<button on:click=move |_| {
							validated
								.update(|v| {
									*v = match v {
										Some(_) => None,
										None => Some(sample_validation()),
									};
								})
						}>"Toggle assessment"</button>
					</div>
				</div>
			</div>
		</ErrorBoundary>
	}
}

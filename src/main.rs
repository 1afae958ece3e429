use leptos::prelude::*;
use skill_tree_canvas::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}

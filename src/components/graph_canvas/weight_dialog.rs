use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;

use super::component::commit_edit;
use super::controller::{CanvasController, WeightEdit};
use crate::components::playback::PlaybackEngine;
use crate::model::{Graph, GraphMode};

/// Modal for editing one edge weight. Bad input keeps it open.
#[component]
pub fn WeightDialog(
	edit: RwSignal<Option<WeightEdit>>,
	controller: Rc<RefCell<CanvasController>>,
	graph: RwSignal<Graph>,
	#[prop(into)] mode: Signal<GraphMode>,
	engine: RwSignal<PlaybackEngine>,
) -> impl IntoView {
	let controller_input = controller.clone();
	let on_input = move |ev: leptos::ev::Event| {
		let mut c = controller_input.borrow_mut();
		c.set_weight_text(event_target_value(&ev));
		edit.set(c.weight_edit().cloned());
	};

	let controller_save = controller.clone();
	let on_save = move |_| {
		let mode = mode.get_untracked();
		let result = graph.with_untracked(|g| controller_save.borrow_mut().commit_weight_edit(g, mode));
		match result {
			Ok(Some(next)) => commit_edit(graph, engine, &controller_save, mode, next),
			Ok(None) => {}
			Err(err) => warn!("rejected weight input: {err}"),
		}
		edit.set(controller_save.borrow().weight_edit().cloned());
	};

	let controller_cancel = controller.clone();
	let on_cancel = move |_| {
		controller_cancel.borrow_mut().cancel_weight_edit();
		edit.set(None);
	};

	// always mounted; the handlers hold the controller and stay attached
	view! {
		<div
			class="weight-modal-backdrop"
			style:display=move || if edit.with(Option::is_some) { "flex" } else { "none" }
		>
			<div class="weight-modal">
				<h3>{move || edit.with(|e| e.as_ref().map(|e| format!("Edit weight of edge {}", e.edge)))}</h3>
				<input
					type="text"
					class="weight-input"
					prop:value=move || edit.with(|e| e.as_ref().map(|e| e.text.clone()).unwrap_or_default())
					on:input=on_input
				/>
				<p class="weight-error">{move || edit.with(|e| e.as_ref().and_then(|e| e.error.clone()))}</p>
				<div class="weight-modal-actions">
					<button on:click=on_save>"Save"</button>
					<button on:click=on_cancel>"Cancel"</button>
				</div>
			</div>
		</div>
	}
}

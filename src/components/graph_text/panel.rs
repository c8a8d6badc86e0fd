use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlInputElement, Url};

use super::codec::{self, TextNotation};
use super::flat::{self, EXPORT_FILE_NAME};
use super::layout::{CircleLayout, random_graph};
use crate::components::playback::PlaybackEngine;
use crate::model::{Graph, GraphMode};

const LOCKED: &str = "Finish the current run before changing the graph.";

/// Swaps in a graph from outside the canvas. Refused while a run is active.
pub fn replace_graph(graph: RwSignal<Graph>, engine: RwSignal<PlaybackEngine>, next: Graph) -> Result<(), String> {
	if engine.with_untracked(|e| e.locks_editing()) {
		return Err(LOCKED.to_string());
	}
	debug!("graph replaced: {} nodes, {} edges", next.nodes().len(), next.edges().len());
	graph.set(next);
	if !engine.with_untracked(|e| e.highlights().is_empty()) {
		engine.update(|e| e.clear_highlights());
	}
	Ok(())
}

fn download(text: &str, file_name: &str) -> Result<(), JsValue> {
	let parts = js_sys::Array::of1(&JsValue::from_str(text));
	let opts = BlobPropertyBag::new();
	opts.set_type("text/plain;charset=utf-8");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(&url);
	anchor.set_download(file_name);
	anchor.click();
	Url::revoke_object_url(&url)
}

async fn read_file(input: HtmlInputElement) -> Result<Option<String>, JsValue> {
	let Some(file) = input.files().and_then(|files| files.get(0)) else {
		return Ok(None);
	};
	let text = JsFuture::from(file.text()).await?;
	Ok(text.as_string())
}

/// Text notations, file import/export and random graphs.
#[component]
pub fn GraphTextPanel(
	graph: RwSignal<Graph>,
	mode: RwSignal<GraphMode>,
	engine: RwSignal<PlaybackEngine>,
	layout: CircleLayout,
) -> impl IntoView {
	let notation = RwSignal::new(TextNotation::default());
	let text = RwSignal::new(String::new());
	let error: RwSignal<Option<String>> = RwSignal::new(None);
	let file_message: RwSignal<Option<String>> = RwSignal::new(None);

	// regenerate the text whenever the model it shows changes
	Effect::new(move |_| {
		let rendered = graph.with(|g| codec::to_text(g, mode.get(), notation.get()));
		text.set(rendered);
		error.set(None);
	});

	let on_apply = move |_| {
		let parsed = text.with_untracked(|t| codec::parse(t, notation.get_untracked(), mode.get_untracked(), &layout));
		let outcome = parsed
			.map_err(|err| {
				warn!("rejected {} input: {err}", notation.get_untracked());
				err.to_string()
			})
			.and_then(|next| replace_graph(graph, engine, next));
		error.set(outcome.err());
	};

	let on_random = move |_| {
		let next = random_graph(mode.get_untracked(), &layout, js_sys::Math::random);
		info!("generated random graph with {} nodes", next.nodes().len());
		file_message.set(replace_graph(graph, engine, next).err());
	};

	let on_export = move |_| {
		let exported = graph.with_untracked(|g| flat::export(g, mode.get_untracked()));
		let outcome = match exported {
			Ok(body) => download(&body, EXPORT_FILE_NAME).map_err(|err| format!("Download failed: {err:?}")),
			Err(err) => Err(err.to_string()),
		};
		file_message.set(outcome.err());
	};

	let on_import = move |ev: leptos::ev::Event| {
		let Some(input) = ev.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
			return;
		};
		spawn_local(async move {
			let outcome = match read_file(input).await {
				Ok(Some(body)) => flat::import(&body, &layout)
					.map_err(|err| err.to_string())
					.and_then(|(imported_mode, next)| {
						replace_graph(graph, engine, next)?;
						mode.set(imported_mode);
						Ok(())
					}),
				Ok(None) => Ok(()),
				Err(err) => Err(format!("Could not read file: {err:?}")),
			};
			if let Err(message) = &outcome {
				warn!("import failed: {message}");
			}
			file_message.set(outcome.err());
		});
	};

	let locked = move || engine.with(|e| e.locks_editing());

	view! {
		<div class="graph-input-panel">
			<h2 class="graph-input-title">"Text input"</h2>
			<div class="graph-input-mode-group">
				{TextNotation::ALL
					.into_iter()
					.map(|n| {
						view! {
							<label class="graph-input-mode-option">
								<input
									type="radio"
									name="notation"
									prop:checked=move || notation.get() == n
									on:change=move |_| notation.set(n)
								/>
								<span>{n.label()}</span>
							</label>
						}
					})
					.collect_view()}
			</div>
			<textarea
				class="graph-input-textarea"
				rows=12
				prop:value=move || text.get()
				on:input=move |ev| text.set(event_target_value(&ev))
			/>
			<p class="graph-input-error">{move || error.get()}</p>
			<button on:click=on_apply prop:disabled=locked>"Apply to graph"</button>

			<h2 class="graph-input-title">"File"</h2>
			<input type="file" accept=".txt,text/plain" on:change=on_import prop:disabled=locked />
			<button on:click=on_export>"Export graph"</button>
			<button on:click=on_random prop:disabled=locked>"Random graph"</button>
			<p class="graph-input-error">{move || file_message.get()}</p>
		</div>
	}
}

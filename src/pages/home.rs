use leptos::prelude::*;
use log::info;

use crate::components::graph_canvas::GraphCanvas;
use crate::components::graph_text::{CircleLayout, GraphTextPanel, replace_graph};
use crate::components::playback::{Algorithm, AlgorithmClient, AlgorithmPanel, PlaybackEngine};
use crate::config::AppConfig;
use crate::model::{Graph, GraphMode};

/// Graph editor: mode bar, canvas, text sidebar and algorithm panel.
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let layout = CircleLayout::new(config.canvas_width, config.canvas_height);
	let client = AlgorithmClient::new(config.api_base.clone());

	let graph = RwSignal::new(Graph::empty());
	let mode = RwSignal::new(GraphMode::default());
	let engine = RwSignal::new(PlaybackEngine::new());
	let algorithm = RwSignal::new(Algorithm::default());
	let mode_error: RwSignal<Option<String>> = RwSignal::new(None);

	// switching mode rebuilds the edge set for the new mode
	let switch_mode = move |next: GraphMode| {
		if mode.get_untracked() == next {
			return;
		}
		let converted = graph.with_untracked(|g| g.converted_to(next));
		match replace_graph(graph, engine, converted) {
			Ok(()) => {
				info!("graph mode switched to {next}");
				mode.set(next);
				mode_error.set(None);
			}
			Err(message) => mode_error.set(Some(message)),
		}
	};

	view! {
		<div class="graph-editor">
			<aside class="graph-sidebar">
				<GraphTextPanel graph=graph mode=mode engine=engine layout=layout />
			</aside>

			<main class="graph-main">
				<div class="graph-mode-bar">
					{GraphMode::ALL
						.into_iter()
						.map(|m| {
							view! {
								<button
									class="graph-mode-button"
									class:active=move || mode.get() == m
									prop:disabled=move || engine.with(|e| e.locks_editing())
									on:click=move |_| switch_mode(m)
								>
									{m.label()}
								</button>
							}
						})
						.collect_view()}
					<span class="graph-mode-error">{move || mode_error.get()}</span>
				</div>

				<GraphCanvas
					graph=graph
					mode=mode
					engine=engine
					algorithm=algorithm
					width=config.canvas_width
					height=config.canvas_height
				/>
				<p class="graph-hint">
					"Click empty space to add a node. Drag nodes to move them. Double-click two nodes to connect them. "
					"Right-click deletes. Middle-drag pans, scroll zooms."
				</p>
			</main>

			<aside class="graph-algorithms">
				<AlgorithmPanel graph=graph mode=mode engine=engine algorithm=algorithm client=client />
			</aside>
		</div>
	}
}

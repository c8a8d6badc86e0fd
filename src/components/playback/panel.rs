use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use super::client::AlgorithmClient;
use super::engine::{Algorithm, PlaybackEngine, RunState, StepTicket};
use crate::model::{Graph, GraphMode, NodeId};

async fn load_step(client: AlgorithmClient, engine: RwSignal<PlaybackEngine>, ticket: StepTicket) {
	let result = client.fetch_step(&ticket.run_id, ticket.index).await;
	engine.update(|e| {
		e.complete_step(ticket, result);
	});
}

fn spawn_step(client: AlgorithmClient, engine: RwSignal<PlaybackEngine>, ticket: Option<StepTicket>) {
	if let Some(ticket) = ticket {
		spawn_local(load_step(client, engine, ticket));
	}
}

/// Algorithm picker, run controls and status for the current run.
#[component]
pub fn AlgorithmPanel(
	#[prop(into)] graph: Signal<Graph>,
	#[prop(into)] mode: Signal<GraphMode>,
	engine: RwSignal<PlaybackEngine>,
	algorithm: RwSignal<Algorithm>,
	client: AlgorithmClient,
) -> impl IntoView {
	let start_node: RwSignal<Option<NodeId>> = RwSignal::new(None);

	let blocked = move || {
		graph.with(|g| {
			engine.with(|e| {
				e.can_submit(g, mode.get(), algorithm.get())
					.err()
					.map(|err| err.to_string())
			})
		})
	};

	let client_run = client.clone();
	let on_run = move |_| {
		let submitted = graph.with_untracked(|g| {
			engine.try_update(|e| e.submit(g, mode.get_untracked(), algorithm.get_untracked(), start_node.get_untracked()))
		});
		let Some(Ok((ticket, request))) = submitted else {
			return;
		};
		let client = client_run.clone();
		spawn_local(async move {
			let result = client.create_run(&request).await;
			let first = engine.try_update(|e| e.complete_submit(ticket, result)).flatten();
			spawn_step(client, engine, first);
		});
	};

	let client_next = client.clone();
	let on_next = move |_| {
		let ticket = engine.try_update(|e| e.next()).flatten();
		spawn_step(client_next.clone(), engine, ticket);
	};

	let client_prev = client;
	let on_previous = move |_| {
		let ticket = engine.try_update(|e| e.previous()).flatten();
		spawn_step(client_prev.clone(), engine, ticket);
	};

	let on_finish = move |_| engine.update(|e| e.finish());
	let on_dismiss = move |_| engine.update(|e| e.acknowledge_error());

	let node_options = move || {
		graph.with(|g| {
			g.nodes()
				.iter()
				.map(|n| {
					let id = n.id;
					view! {
						<option value=id.to_string() selected=move || start_node.get() == Some(id)>
							{format!("Node {id}")}
						</option>
					}
				})
				.collect_view()
		})
	};

	let is_active = move || engine.with(|e| e.active_run().is_some());
	let is_error = move || engine.with(|e| matches!(e.state(), RunState::Error { .. }));

	view! {
		<div class="algorithm-panel">
			<h2>"Algorithms"</h2>

			<label>
				"Algorithm "
				<select
					prop:value=move || algorithm.get().as_str()
					prop:disabled=move || engine.with(|e| e.locks_editing())
					on:change=move |ev| {
						if let Some(a) = Algorithm::parse(&event_target_value(&ev)) {
							algorithm.set(a);
						}
					}
				>
					{Algorithm::ALL
						.into_iter()
						.map(|a| view! { <option value=a.as_str()>{a.label()}</option> })
						.collect_view()}
				</select>
			</label>

			<label>
				"Start node "
				<select
					prop:disabled=move || engine.with(|e| e.locks_editing())
					on:change=move |ev| start_node.set(event_target_value(&ev).parse().ok())
				>
					<option value="" selected=move || start_node.get().is_none()>"First node"</option>
					{node_options}
				</select>
			</label>

			<div class="algorithm-controls">
				<button on:click=on_run prop:disabled=move || blocked().is_some()>"Run"</button>
				<button on:click=on_previous prop:disabled=move || !engine.with(|e| e.can_go_previous())>"Back"</button>
				<button on:click=on_next prop:disabled=move || !engine.with(|e| e.can_go_next())>"Next"</button>
				<button on:click=on_finish prop:disabled=move || !is_active()>"Finish"</button>
			</div>

			<p class="algorithm-hint">{blocked}</p>
			<p class="algorithm-status">
				{move || engine.with(|e| e.status_line())}
				<span class="loading" style:display=move || if engine.with(|e| e.is_busy()) { "inline" } else { "none" }>
					" loading..."
				</span>
			</p>
			<p class="algorithm-error">{move || engine.with(|e| e.error_message().map(str::to_string))}</p>
			<button class="dismiss" on:click=on_dismiss style:display=move || if is_error() { "inline" } else { "none" }>
				"Dismiss"
			</button>
		</div>
	}
}

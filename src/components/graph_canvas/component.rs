use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::controller::{CanvasController, PointerButton, WeightEdit};
use super::geometry::Point;
use super::render::{self, CanvasMeasure, Frame};
use super::weight_dialog::WeightDialog;
use crate::components::playback::{Algorithm, PlaybackEngine};
use crate::model::{Graph, GraphMode};

/// Commits a controller edit: swaps the graph value, drops the run overlay
/// and forgets interaction state that referenced removed ids.
pub(super) fn commit_edit(
	graph: RwSignal<Graph>,
	engine: RwSignal<PlaybackEngine>,
	controller: &RefCell<CanvasController>,
	mode: GraphMode,
	next: Graph,
) {
	debug!("graph replaced: {} nodes, {} edges", next.nodes().len(), next.edges().len());
	controller.borrow_mut().sync_with(&next, mode);
	graph.set(next);
	if !engine.with_untracked(|e| e.highlights().is_empty()) {
		engine.update(|e| e.clear_highlights());
	}
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// The interactive graph editor surface.
#[component]
pub fn GraphCanvas(
	graph: RwSignal<Graph>,
	#[prop(into)] mode: Signal<GraphMode>,
	engine: RwSignal<PlaybackEngine>,
	#[prop(into)] algorithm: Signal<Algorithm>,
	width: f64,
	height: f64,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let controller: Rc<RefCell<CanvasController>> = Rc::new(RefCell::new(CanvasController::new()));
	let context: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	// mirror of the controller's dialog state for the view
	let weight_edit: RwSignal<Option<WeightEdit>> = RwSignal::new(None);

	let (controller_init, context_init, animate_init) = (controller.clone(), context.clone(), animate.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("canvas has no 2d context");
			return;
		};
		*context_init.borrow_mut() = Some(ctx.clone());

		let (controller_anim, animate_inner) = (controller_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let c = controller_anim.borrow();
			graph.with_untracked(|g| {
				engine.with_untracked(|e| {
					let frame = Frame {
						graph: g,
						mode: mode.get_untracked(),
						transform: c.transform(),
						highlights: e.highlights(),
						pending_source: c.pending_source(),
						algorithm: algorithm.get_untracked(),
						width,
						height,
					};
					render::render(&frame, &ctx);
				})
			});
			if let (Some(cb), Some(window)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let (Some(cb), Some(window)) = (animate_init.borrow().as_ref(), web_sys::window()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// playback freezes structural editing
	let controller_freeze = controller.clone();
	Effect::new(move |_| {
		let locked = engine.with(|e| e.locks_editing());
		controller_freeze.borrow_mut().set_frozen(locked);
		if locked {
			weight_edit.set(None);
		}
	});

	// replacements from outside the canvas (text, import, mode switch)
	let controller_sync = controller.clone();
	Effect::new(move |_| {
		let mode = mode.get();
		graph.with(|g| controller_sync.borrow_mut().sync_with(g, mode));
		weight_edit.set(controller_sync.borrow().weight_edit().cloned());
	});

	let (controller_md, context_md) = (controller.clone(), context.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let (Some(p), Some(ctx)) = (local_point(canvas_ref, &ev), context_md.borrow().clone()) else {
			return;
		};
		let button = PointerButton::from_dom(ev.button());
		if button == PointerButton::Middle {
			ev.prevent_default();
		}
		let next = graph.with_untracked(|g| {
			controller_md
				.borrow_mut()
				.pointer_down(g, mode.get_untracked(), button, p, &CanvasMeasure(&ctx))
		});
		if let Some(next) = next {
			commit_edit(graph, engine, &controller_md, mode.get_untracked(), next);
		}
	};

	let controller_mm = controller.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = local_point(canvas_ref, &ev) else {
			return;
		};
		let next = graph.with_untracked(|g| controller_mm.borrow_mut().pointer_move(g, p));
		if let Some(next) = next {
			commit_edit(graph, engine, &controller_mm, mode.get_untracked(), next);
		}
	};

	let controller_mu = controller.clone();
	let on_mouseup = move |_: MouseEvent| controller_mu.borrow_mut().pointer_up();

	let controller_ml = controller.clone();
	let on_mouseleave = move |_: MouseEvent| controller_ml.borrow_mut().pointer_leave();

	let controller_wh = controller.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(p) = local_point(canvas_ref, &ev) {
			controller_wh.borrow_mut().wheel(p, ev.delta_y());
		}
	};

	let (controller_dc, context_dc) = (controller.clone(), context.clone());
	let on_dblclick = move |ev: MouseEvent| {
		let (Some(p), Some(ctx)) = (local_point(canvas_ref, &ev), context_dc.borrow().clone()) else {
			return;
		};
		let next = graph.with_untracked(|g| {
			controller_dc
				.borrow_mut()
				.double_click(g, mode.get_untracked(), p, &CanvasMeasure(&ctx))
		});
		if let Some(next) = next {
			commit_edit(graph, engine, &controller_dc, mode.get_untracked(), next);
		}
		weight_edit.set(controller_dc.borrow().weight_edit().cloned());
	};

	let controller_cm = controller.clone();
	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some(p) = local_point(canvas_ref, &ev) else {
			return;
		};
		let next = graph.with_untracked(|g| controller_cm.borrow_mut().context_menu(g, p));
		if let Some(next) = next {
			commit_edit(graph, engine, &controller_cm, mode.get_untracked(), next);
		}
	};

	let frozen = move || engine.with(|e| e.locks_editing());

	view! {
		<div class="graph-canvas-container">
			<canvas
				node_ref=canvas_ref
				class="graph-canvas"
				class:disabled=frozen
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:dblclick=on_dblclick
				on:contextmenu=on_contextmenu
				style="display: block; cursor: crosshair;"
			/>
			<WeightDialog edit=weight_edit controller=controller graph=graph mode=mode engine=engine />
		</div>
	}
}

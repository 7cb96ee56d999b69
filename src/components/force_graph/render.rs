use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::binder::{NodeGlyph, Scene};
use super::state::ForceGraphState;

const BACKGROUND: &str = "#ffffff";
const LINK_COLOR: &str = "#999";
const NODE_FILL: &str = "#69b3a2";
const NODE_STROKE: &str = "#333";
const DRAG_STROKE: &str = "#111";
const DELETE_COLOR: &str = "red";

/// Paint one frame from the scene's latest glyph positions.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let viewport = state.viewport();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
	draw_links(&state.scene, ctx);
	draw_nodes(&state.scene, ctx);
}

fn draw_links(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(LINK_COLOR);
	ctx.set_line_width(2.0);
	for link in scene.links() {
		ctx.begin_path();
		ctx.move_to(link.x1, link.y1);
		ctx.line_to(link.x2, link.y2);
		ctx.stroke();
	}
}

fn draw_nodes(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	for glyph in scene.nodes() {
		ctx.set_global_alpha(glyph.opacity());
		draw_node(scene, glyph, ctx);
	}
	ctx.set_global_alpha(1.0);
}

fn draw_node(scene: &Scene, glyph: &NodeGlyph, ctx: &CanvasRenderingContext2d) {
	let view = scene.view();
	let (x, y) = (glyph.x, glyph.y);

	ctx.begin_path();
	let _ = ctx.arc(x, y, view.node_radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(NODE_FILL);
	ctx.fill();
	if glyph.dragging {
		ctx.set_stroke_style_str(DRAG_STROKE);
		ctx.set_line_width(3.0);
	} else {
		ctx.set_stroke_style_str(NODE_STROKE);
		ctx.set_line_width(2.0);
	}
	if glyph.pinned && !glyph.dragging {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(4.0),
			&JsValue::from_f64(3.0),
		));
	}
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str("white");
	ctx.set_font("bold 12px sans-serif");
	let _ = ctx.fill_text(&glyph.label, x, y);

	let (ox, oy) = view.delete_offset;
	ctx.set_fill_style_str(DELETE_COLOR);
	ctx.set_font("bold 16px sans-serif");
	let _ = ctx.fill_text("\u{2715}", x + ox, y + oy);
}

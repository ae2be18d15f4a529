//! Canvas drawing for the force graph.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Links with their arrowheads (world space)
//! 3. Dimmed nodes, then highlighted nodes and the hover ring on top
//! 4. Labels

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::{EdgeLine, ForceGraphState, NodeInfo};
use super::theme::Theme;

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete graph to the canvas.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	let positions = state.positions();
	let mut radii: HashMap<DefaultNodeIdx, f64> = HashMap::with_capacity(positions.len());
	state.graph.visit_nodes(|node| {
		radii.insert(node.index(), scale.node_radius * node.data.user_data.size);
	});

	for edge in &state.edges {
		draw_edge(state, ctx, &scale, theme, edge, &positions, &radii);
	}
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();
}

fn draw_edge(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	edge: &EdgeLine,
	positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	radii: &HashMap<DefaultNodeIdx, f64>,
) {
	let (Some(&(x1, y1)), Some(&(x2, y2))) =
		(positions.get(&edge.source), positions.get(&edge.target))
	else {
		return;
	};
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let r1 = radii.get(&edge.source).copied().unwrap_or(scale.node_radius);
	let r2 = radii.get(&edge.target).copied().unwrap_or(scale.node_radius);
	if dist <= r1 + r2 {
		return;
	}

	let edge_t = smooth_step(state.highlight.edge(edge.source, edge.target));
	let max_t = smooth_step(state.highlight.max());
	let alpha = if edge_t > 0.01 {
		theme.edge.alpha + (1.0 - theme.edge.alpha) * edge_t
	} else {
		theme.edge.alpha + (theme.edge.dimmed_alpha - theme.edge.alpha) * max_t
	};
	let width = scale.edge_line_width * edge.width * (1.0 + 0.4 * edge_t);
	let color = edge.color.with_alpha(alpha * edge.color.a);

	let (ux, uy) = (dx / dist, dy / dist);
	let head = if scale.cull_arrows { 0.0 } else { scale.arrow_size + width };
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(width);
	ctx.begin_path();
	ctx.move_to(x1 + ux * r1, y1 + uy * r1);
	ctx.line_to(x2 - ux * (r2 + head), y2 - uy * (r2 + head));
	ctx.stroke();

	if head > 0.0 {
		ctx.set_fill_style_str(&color.with_alpha(color.a * scale.arrow_alpha).to_css());
		let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
		let (back_x, back_y) = (tip_x - ux * head, tip_y - uy * head);
		let (px, py) = (-uy * head * 0.5, ux * head * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let max_t = smooth_step(state.highlight.max());
	let dim_alpha = 1.0 + (theme.node.dimmed_alpha - 1.0) * max_t;

	// Pass 1: everything outside the highlight
	state.graph.visit_nodes(|node| {
		if state.highlight.node(node.index()) > 0.001 {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		draw_node(ctx, &node.data.user_data, x, y, scale, theme, dim_alpha, 1.0);
		if scale.label_alpha > 0.01 && dim_alpha > 0.5 {
			draw_label(ctx, &node.data.user_data, x, y, scale, theme, dim_alpha * scale.label_alpha);
		}
	});

	// Pass 2: highlighted nodes on top, always labeled
	state.graph.visit_nodes(|node| {
		let node_t = state.highlight.node(node.index());
		if node_t <= 0.001 {
			return;
		}
		let eased = smooth_step(node_t);
		let (x, y) = (node.x() as f64, node.y() as f64);
		let alpha = dim_alpha + (1.0 - dim_alpha) * eased;
		let radius_mult = 1.0 + 0.3 * eased;
		let info = &node.data.user_data;
		draw_node(ctx, info, x, y, scale, theme, alpha, radius_mult);

		if state.highlight.hovered == Some(node.index()) {
			let radius = scale.node_radius * info.size * radius_mult;
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + scale.ring_offset, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.node.ring_color.with_alpha(0.8 * eased).to_css());
			ctx.set_line_width(scale.ring_width);
			ctx.stroke();
		}
		draw_label(ctx, info, x, y, scale, theme, alpha);
	});
}

#[allow(clippy::too_many_arguments)]
fn draw_node(
	ctx: &CanvasRenderingContext2d,
	info: &NodeInfo,
	x: f64,
	y: f64,
	scale: &ScaledValues,
	theme: &Theme,
	alpha: f64,
	radius_mult: f64,
) {
	let radius = scale.node_radius * info.size * radius_mult;
	ctx.set_global_alpha(alpha);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&info.color.to_css());
	ctx.fill();

	if info.placeholder {
		// Endpoints without a node row get a dashed outline.
		let dash = 3.0 / scale.k;
		let pattern = js_sys::Array::of2(&JsValue::from_f64(dash), &JsValue::from_f64(dash));
		let _ = ctx.set_line_dash(&pattern);
		ctx.set_stroke_style_str(&info.color.darken(0.35).to_css());
		ctx.set_line_width(1.5 / scale.k);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	} else if theme.node.border_width > 0.0 {
		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(theme.node.border_width / scale.k);
		ctx.stroke();
	}

	ctx.set_global_alpha(1.0);
}

fn draw_label(
	ctx: &CanvasRenderingContext2d,
	info: &NodeInfo,
	x: f64,
	y: f64,
	scale: &ScaledValues,
	theme: &Theme,
	alpha: f64,
) {
	if info.label.is_empty() {
		return;
	}
	let radius = scale.node_radius * info.size;
	let (lx, ly) = (x + radius + 4.0 / scale.k, y + 3.0 / scale.k);

	ctx.set_global_alpha(alpha.clamp(0.0, 1.0));
	ctx.set_font(&scale.label_font);
	ctx.set_stroke_style_str(&theme.label.halo.to_css());
	ctx.set_line_width(3.0 / scale.k);
	let _ = ctx.stroke_text(&info.label, lx, ly);
	ctx.set_fill_style_str(&theme.label.color.to_css());
	let _ = ctx.fill_text(&info.label, lx, ly);
	ctx.set_global_alpha(1.0);
}

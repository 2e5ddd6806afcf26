//! Per-variant frame drawing.
//!
//! Every variant is a pure function that appends SVG markup for the frame, label and text. The
//! table in [`draw_fn`] is indexed by the wire frame number, so each variant can be exercised in
//! isolation.

use std::fmt::Write as _;

use kurbo::{BezPath, Point, Rect, RoundedRect, Shape};

use crate::foundation::core::Rgba8;
use crate::frame::fonts::{HAND_FAMILIES, LABEL_FAMILIES};
use crate::frame::layout::{StickerLayout, StickerMetrics};
use crate::frame::spec::{FrameSpec, FrameType, TextFill};

const INK: Rgba8 = Rgba8::BLACK;
const PAPER: Rgba8 = Rgba8::WHITE;
const GRADIENT_ID: &str = "label-fill";
const NOTCH: f64 = 8.0;
const BUBBLE_GAP: f64 = 6.0;
const BUBBLE_ARROW: f64 = 10.0;
const PATH_TOLERANCE: f64 = 0.1;

/// Inputs shared by all draw functions.
pub(crate) struct DrawCtx<'a> {
    pub(crate) spec: &'a FrameSpec,
    pub(crate) metrics: &'a StickerMetrics,
    pub(crate) layout: &'a StickerLayout,
}

impl DrawCtx<'_> {
    fn label(&self) -> Rect {
        self.layout.label.unwrap_or(Rect::ZERO)
    }

    fn radius(&self) -> f64 {
        self.metrics.corner_radius
    }

    fn paint_attrs(&self, attr: &str) -> String {
        match &self.spec.text_style.fill {
            TextFill::Solid(c) => format!(
                r#"{attr}="{}" {attr}-opacity="{:.4}""#,
                c.to_hex_rgb(),
                c.opacity()
            ),
            TextFill::Gradient(_) => format!(r#"{attr}="url(#{GRADIENT_ID})""#),
        }
    }
}

type DrawFn = fn(&DrawCtx<'_>, &mut String);

const TABLE: [DrawFn; 9] = [
    draw_bottom_notch,
    draw_bottom_bubble,
    draw_top_notch,
    draw_top_bubble,
    draw_bottom_flat,
    draw_top_flat,
    draw_brackets,
    draw_side_label,
    draw_brackets_bubble,
];

/// Draw function for a variant; `None` for the identity variant.
pub(crate) fn draw_fn(frame_type: FrameType) -> Option<DrawFn> {
    match frame_type {
        FrameType::Plain => None,
        other => Some(TABLE[usize::from(other.number() - 1)]),
    }
}

/// Build the complete SVG document for a non-identity frame (marker area left empty).
pub(crate) fn build_svg(ctx: &DrawCtx<'_>) -> String {
    let (w, h) = (ctx.layout.width, ctx.layout.height);
    let mut out = String::with_capacity(2048);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    write_defs(ctx, &mut out);

    let transparent =
        ctx.spec.transparent_background || ctx.spec.frame_type == FrameType::Brackets;
    if !transparent {
        fill_path(
            &mut out,
            &RoundedRect::from_rect(ctx.layout.bounds(), ctx.radius()).to_path(PATH_TOLERANCE),
            PAPER,
        );
    }

    if let Some(draw) = draw_fn(ctx.spec.frame_type) {
        draw(ctx, &mut out);
    }
    out.push_str("</svg>");
    out
}

fn write_defs(ctx: &DrawCtx<'_>, out: &mut String) {
    let TextFill::Gradient(stops) = &ctx.spec.text_style.fill else {
        return;
    };
    // Sampled across the full sticker width so the same text matches across variants.
    let _ = write!(
        out,
        r#"<defs><linearGradient id="{GRADIENT_ID}" gradientUnits="userSpaceOnUse" x1="0" y1="0" x2="{}" y2="0">"#,
        ctx.layout.width
    );
    let last = (stops.len().max(2) - 1) as f64;
    for (i, c) in stops.iter().enumerate() {
        let _ = write!(
            out,
            r#"<stop offset="{:.4}" stop-color="{}" stop-opacity="{:.4}"/>"#,
            i as f64 / last,
            c.to_hex_rgb(),
            c.opacity()
        );
    }
    out.push_str("</linearGradient></defs>");
}

fn draw_bottom_notch(ctx: &DrawCtx<'_>, out: &mut String) {
    border(ctx, out);
    let label = ctx.label();
    let mut bar = RoundedRect::from_rect(label, ctx.radius()).to_path(PATH_TOLERANCE);
    append(&mut bar, &triangle_up(label.center().x, label.y0, NOTCH));
    fill_path(out, &bar, INK);
    text(ctx, out, label.center(), LABEL_FAMILIES, None);
}

fn draw_bottom_bubble(ctx: &DrawCtx<'_>, out: &mut String) {
    border(ctx, out);
    let label = ctx.label();
    let bubble = Rect::new(label.x0, label.y0 + BUBBLE_GAP, label.x1, label.y1);
    let mut path = RoundedRect::from_rect(bubble, ctx.radius()).to_path(PATH_TOLERANCE);
    append(&mut path, &triangle_up(bubble.center().x, bubble.y0, BUBBLE_ARROW));
    fill_path(out, &path, INK);
    text(ctx, out, bubble.center(), LABEL_FAMILIES, None);
}

fn draw_top_notch(ctx: &DrawCtx<'_>, out: &mut String) {
    border(ctx, out);
    let label = ctx.label();
    let mut bar = RoundedRect::from_rect(label, ctx.radius()).to_path(PATH_TOLERANCE);
    append(&mut bar, &triangle_down(label.center().x, label.y1, NOTCH));
    fill_path(out, &bar, INK);
    text(ctx, out, label.center(), LABEL_FAMILIES, None);
}

fn draw_top_bubble(ctx: &DrawCtx<'_>, out: &mut String) {
    border(ctx, out);
    top_bubble(ctx, out, LABEL_FAMILIES);
}

fn draw_bottom_flat(ctx: &DrawCtx<'_>, out: &mut String) {
    border(ctx, out);
    let label = ctx.label();
    fill_path(
        out,
        &RoundedRect::from_rect(label, ctx.radius()).to_path(PATH_TOLERANCE),
        INK,
    );
    text(ctx, out, label.center(), LABEL_FAMILIES, None);
}

fn draw_top_flat(ctx: &DrawCtx<'_>, out: &mut String) {
    border(ctx, out);
    let label = ctx.label();
    fill_path(
        out,
        &RoundedRect::from_rect(label, ctx.radius()).to_path(PATH_TOLERANCE),
        INK,
    );
    text(ctx, out, label.center(), LABEL_FAMILIES, None);
}

fn draw_brackets(ctx: &DrawCtx<'_>, out: &mut String) {
    brackets(ctx, out);
    let label = ctx.label();
    let anchor = Point::new(label.center().x - label.width() * 0.08, label.center().y);
    text(ctx, out, anchor, HAND_FAMILIES, None);

    // Small hand-drawn arrow curving from the label's right end down into the marker.
    let start = Point::new(label.x0 + label.width() * 0.74, label.y0 + label.height() * 0.55);
    let tip = Point::new(label.x0 + label.width() * 0.84, label.y1 + 12.0);
    let mut arrow = BezPath::new();
    arrow.move_to(start);
    arrow.quad_to(Point::new(tip.x + 14.0, start.y), tip);
    arrow.move_to(Point::new(tip.x - 5.0, tip.y - 7.0));
    arrow.line_to(tip);
    arrow.line_to(Point::new(tip.x + 6.0, tip.y - 6.0));
    let _ = write!(
        out,
        r#"<path d="{}" fill="none" {} stroke-width="2.5" stroke-linecap="round" stroke-linejoin="round"/>"#,
        arrow.to_svg(),
        ctx.paint_attrs("stroke")
    );
}

fn draw_side_label(ctx: &DrawCtx<'_>, out: &mut String) {
    border(ctx, out);
    let label = ctx.label();
    let c = label.center();
    let mut bar = RoundedRect::from_rect(label, ctx.radius()).to_path(PATH_TOLERANCE);
    let mut notch = BezPath::new();
    notch.move_to(Point::new(label.x0, c.y - NOTCH));
    notch.line_to(Point::new(label.x0 - NOTCH, c.y));
    notch.line_to(Point::new(label.x0, c.y + NOTCH));
    notch.close_path();
    append(&mut bar, &notch);
    fill_path(out, &bar, INK);
    text(ctx, out, c, LABEL_FAMILIES, Some(90.0));
}

fn draw_brackets_bubble(ctx: &DrawCtx<'_>, out: &mut String) {
    brackets(ctx, out);
    top_bubble(ctx, out, LABEL_FAMILIES);
}

fn top_bubble(ctx: &DrawCtx<'_>, out: &mut String, families: &str) {
    let label = ctx.label();
    let bubble = Rect::new(label.x0, label.y0, label.x1, label.y1 - BUBBLE_GAP);
    let mut path = RoundedRect::from_rect(bubble, ctx.radius()).to_path(PATH_TOLERANCE);
    append(&mut path, &triangle_down(bubble.center().x, bubble.y1, BUBBLE_ARROW));
    fill_path(out, &path, INK);
    text(ctx, out, bubble.center(), families, None);
}

fn border(ctx: &DrawCtx<'_>, out: &mut String) {
    let bw = f64::from(ctx.metrics.border_width);
    if bw <= 0.0 {
        return;
    }
    let half = bw / 2.0;
    let body = ctx.layout.body.inset(-half);
    let _ = write!(
        out,
        r#"<path d="{}" fill="none" stroke="{}" stroke-width="{bw}"/>"#,
        RoundedRect::from_rect(body, ctx.radius())
            .to_path(PATH_TOLERANCE)
            .to_svg(),
        INK.to_hex_rgb()
    );
}

fn brackets(ctx: &DrawCtx<'_>, out: &mut String) {
    let bw = f64::from(ctx.metrics.border_width).max(2.0);
    let body = ctx.layout.body.inset(-bw / 2.0);
    let arm = body.width() / 5.0;
    let r = ctx.radius().min(arm / 2.0);

    let mut path = BezPath::new();
    // Each corner: arm, rounded elbow, arm. (sx, sy) point the arms into the body.
    let corners = [
        (Point::new(body.x0, body.y0), 1.0, 1.0),
        (Point::new(body.x1, body.y0), -1.0, 1.0),
        (Point::new(body.x1, body.y1), -1.0, -1.0),
        (Point::new(body.x0, body.y1), 1.0, -1.0),
    ];
    for (p, sx, sy) in corners {
        path.move_to(Point::new(p.x, p.y + sy * arm));
        path.line_to(Point::new(p.x, p.y + sy * r));
        path.quad_to(p, Point::new(p.x + sx * r, p.y));
        path.line_to(Point::new(p.x + sx * arm, p.y));
    }
    let _ = write!(
        out,
        r#"<path d="{}" fill="none" stroke="{}" stroke-width="{bw}" stroke-linecap="round"/>"#,
        path.to_svg(),
        INK.to_hex_rgb()
    );
}

fn text(
    ctx: &DrawCtx<'_>,
    out: &mut String,
    at: Point,
    families: &str,
    rotate_deg: Option<f64>,
) {
    if ctx.spec.text_content.is_empty() {
        return;
    }
    let extent = match rotate_deg {
        Some(_) => f64::from(ctx.metrics.label_width),
        None => f64::from(ctx.metrics.label_height),
    };
    let size = (extent * 0.5).max(6.0);
    let weight = if ctx.spec.text_style.bold { "bold" } else { "normal" };
    let style = if ctx.spec.text_style.italic {
        "italic"
    } else {
        "normal"
    };
    let transform = rotate_deg
        .map(|deg| format!(r#" transform="rotate({deg} {:.2} {:.2})""#, at.x, at.y))
        .unwrap_or_default();
    let _ = write!(
        out,
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="central" font-family="{families}" font-size="{size:.2}" font-weight="{weight}" font-style="{style}" {}{transform}>{}</text>"#,
        at.x,
        at.y,
        ctx.paint_attrs("fill"),
        escape_xml(&ctx.spec.text_content)
    );
}

fn fill_path(out: &mut String, path: &BezPath, color: Rgba8) {
    let _ = write!(
        out,
        r#"<path d="{}" fill="{}"/>"#,
        path.to_svg(),
        color.to_hex_rgb()
    );
}

fn append(dst: &mut BezPath, src: &BezPath) {
    for el in src.elements() {
        dst.push(*el);
    }
}

fn triangle_up(cx: f64, base_y: f64, size: f64) -> BezPath {
    let mut p = BezPath::new();
    p.move_to(Point::new(cx - size, base_y));
    p.line_to(Point::new(cx, base_y - size));
    p.line_to(Point::new(cx + size, base_y));
    p.close_path();
    p
}

fn triangle_down(cx: f64, base_y: f64, size: f64) -> BezPath {
    let mut p = BezPath::new();
    p.move_to(Point::new(cx - size, base_y));
    p.line_to(Point::new(cx, base_y + size));
    p.line_to(Point::new(cx + size, base_y));
    p.close_path();
    p
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/frame/variants.rs"]
mod tests;

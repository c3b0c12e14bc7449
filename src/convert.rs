use std::path::{Path, PathBuf};

use crate::drawable;
use crate::error::Vd2SvgError;
use crate::resolve::{Resolver, android_attr};
use crate::svg::{self, SvgElement};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const AAPT_NS: &str = "http://schemas.android.com/aapt";

/// A non-fatal finding collected during conversion: a recognized feature
/// the output intentionally omits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: String,
    pub message: String,
}

/// Per-run conversion state. Id counters and collected defs live here so
/// parallel conversions never share mutable state; the resolver is the one
/// piece shared with nested drawable sub-conversions.
pub(crate) struct RunCtx<'a> {
    pub(crate) resolver: &'a mut Resolver,
    pub(crate) source: Option<PathBuf>,
    pub(crate) warnings: Vec<Warning>,
    defs: Vec<SvgElement>,
    gradient_seq: u32,
    clip_seq: u32,
}

impl<'a> RunCtx<'a> {
    fn new(resolver: &'a mut Resolver, source: Option<&Path>) -> Self {
        RunCtx {
            resolver,
            source: source.map(Path::to_path_buf),
            warnings: Vec::new(),
            defs: Vec::new(),
            gradient_seq: 0,
            clip_seq: 0,
        }
    }

    pub(crate) fn warn(&mut self, kind: &str, message: impl Into<String>) {
        self.warnings.push(Warning {
            kind: kind.to_string(),
            message: message.into(),
        });
    }

    fn next_gradient_id(&mut self) -> String {
        self.gradient_seq += 1;
        format!("Gradient{}", self.gradient_seq)
    }

    fn next_clip_id(&mut self) -> String {
        self.clip_seq += 1;
        format!("Clip{}", self.clip_seq)
    }
}

/// Converts one VectorDrawable or adaptive-icon document to SVG text.
/// `source` is the document's own path when it has one; it anchors
/// relative raster references and error messages.
pub(crate) fn convert_document(
    text: &str,
    source: Option<&Path>,
    resolver: &mut Resolver,
) -> Result<(String, Vec<Warning>), Vd2SvgError> {
    let doc = roxmltree::Document::parse(text).map_err(|err| Vd2SvgError::Xml {
        path: source.map(Path::to_path_buf),
        message: err.to_string(),
    })?;
    let root = doc.root_element();
    let mut ctx = RunCtx::new(resolver, source);
    let mut out = match root.tag_name().name() {
        "vector" => convert_vector(&mut ctx, root)?,
        "adaptive-icon" => convert_adaptive(&mut ctx, root)?,
        other => return Err(Vd2SvgError::NoConverter(other.to_string())),
    };
    if !ctx.defs.is_empty() {
        let mut defs = SvgElement::new("defs");
        for def in ctx.defs.drain(..) {
            defs.push(def);
        }
        out.insert_first(defs);
    }
    Ok((svg::document(&out), ctx.warnings))
}

fn convert_vector(
    ctx: &mut RunCtx,
    root: roxmltree::Node,
) -> Result<SvgElement, Vd2SvgError> {
    let width = require_attr(root, "width")?;
    let height = require_attr(root, "height")?;
    let viewport_w = require_attr(root, "viewportWidth")?;
    let viewport_h = require_attr(root, "viewportHeight")?;

    let mut svg = SvgElement::new("svg");
    svg.set("xmlns", SVG_NS);
    svg.set("width", density_to_px(width));
    svg.set("height", density_to_px(height));
    svg.set("viewBox", format!("0 0 {} {}", viewport_w, viewport_h));
    if let Some(alpha) = android_attr(root, "alpha") {
        svg.set("opacity", alpha);
    }
    if let Some(tint) = android_attr(root, "tint") {
        let mode = android_attr(root, "tintMode").unwrap_or("src_in");
        let filter = tint_filter(ctx, tint, mode)?;
        ctx.defs.push(filter);
        svg.set("filter", "url(#Tint)");
    }
    convert_children(ctx, root, &mut svg)?;
    Ok(svg)
}

/// Dispatches the fixed vector vocabulary. Groups nest, paths emit, and a
/// clip-path registers a def and claims the host container's `clip-path`
/// attribute.
fn convert_children(
    ctx: &mut RunCtx,
    parent: roxmltree::Node,
    host: &mut SvgElement,
) -> Result<(), Vd2SvgError> {
    for child in parent.children().filter(|node| node.is_element()) {
        match child.tag_name().name() {
            "group" => {
                let group = convert_group(ctx, child)?;
                host.push(group);
            }
            "path" => {
                let path = convert_path(ctx, child)?;
                host.push(path);
            }
            "clip-path" => convert_clip(ctx, child, host)?,
            other => return Err(Vd2SvgError::NoConverter(other.to_string())),
        }
    }
    Ok(())
}

/// Android group transforms compose as translate, then scale, then rotate
/// about the pivot, left to right in the emitted transform list. Values are
/// carried textually; omitted ones fill in as 0 (translate, rotation) or 1
/// (scale).
fn convert_group(ctx: &mut RunCtx, node: roxmltree::Node) -> Result<SvgElement, Vd2SvgError> {
    let mut group = SvgElement::new("g");
    let rotation = android_attr(node, "rotation");
    let pivot_x = android_attr(node, "pivotX");
    let pivot_y = android_attr(node, "pivotY");
    let scale_x = android_attr(node, "scaleX");
    let scale_y = android_attr(node, "scaleY");
    let translate_x = android_attr(node, "translateX");
    let translate_y = android_attr(node, "translateY");
    let transformed = [
        rotation,
        pivot_x,
        pivot_y,
        scale_x,
        scale_y,
        translate_x,
        translate_y,
    ]
    .iter()
    .any(Option::is_some);
    if transformed {
        group.set(
            "transform",
            format!(
                "translate({} {}) scale({} {}) rotate({} {} {})",
                translate_x.unwrap_or("0"),
                translate_y.unwrap_or("0"),
                scale_x.unwrap_or("1"),
                scale_y.unwrap_or("1"),
                rotation.unwrap_or("0"),
                pivot_x.unwrap_or("0"),
                pivot_y.unwrap_or("0"),
            ),
        );
    }
    convert_children(ctx, node, &mut group)?;
    Ok(group)
}

fn convert_path(ctx: &mut RunCtx, node: roxmltree::Node) -> Result<SvgElement, Vd2SvgError> {
    let mut path = SvgElement::new("path");
    let data = require_attr(node, "pathData")?;
    path.set("d", data);

    let gradient_fill = path_gradient_fill(ctx, node)?;
    let mut embedded_alpha = None;
    if let Some(url) = gradient_fill {
        path.set("fill", url);
    } else if let Some(raw) = android_attr(node, "fillColor") {
        let color = ctx.resolver.color(raw)?;
        path.set("fill", color.hex);
        embedded_alpha = color.alpha;
    } else {
        path.set("fill", "none");
    }
    // An explicit fillAlpha outranks alpha embedded in the color literal.
    let fill_alpha = android_attr(node, "fillAlpha")
        .map(str::to_string)
        .or(embedded_alpha);
    if let Some(alpha) = fill_alpha {
        path.set("fill-opacity", alpha);
    }

    if let Some(raw) = android_attr(node, "strokeColor") {
        let color = ctx.resolver.color(raw)?;
        path.set("stroke", color.hex);
        let stroke_alpha = android_attr(node, "strokeAlpha")
            .map(str::to_string)
            .or(color.alpha);
        if let Some(alpha) = stroke_alpha {
            path.set("stroke-opacity", alpha);
        }
    }
    if let Some(value) = android_attr(node, "strokeWidth") {
        path.set("stroke-width", value);
    }
    if let Some(value) = android_attr(node, "strokeLineCap") {
        path.set("stroke-linecap", value);
    }
    if let Some(value) = android_attr(node, "strokeLineJoin") {
        path.set("stroke-linejoin", value);
    }
    if let Some(value) = android_attr(node, "strokeMiterLimit") {
        path.set("stroke-miterlimit", value);
    }
    if let Some(value) = android_attr(node, "fillType") {
        let rule = match value {
            "evenOdd" => "evenodd",
            "nonZero" => "nonzero",
            other => other,
        };
        path.set("fill-rule", rule);
    }

    for trim in ["trimPathStart", "trimPathEnd", "trimPathOffset"] {
        if android_attr(node, trim).is_some() {
            ctx.warn("path", format!("{} is not supported and was ignored", trim));
        }
    }
    Ok(path)
}

/// Looks for an aapt-namespaced `<attr name="android:fillColor">` child
/// holding a `<gradient>`. Other aapt attributes are recognized but not
/// convertible, so they warn and drop.
fn path_gradient_fill(
    ctx: &mut RunCtx,
    node: roxmltree::Node,
) -> Result<Option<String>, Vd2SvgError> {
    let mut fill = None;
    for child in node.children().filter(|child| child.is_element()) {
        if !child.has_tag_name((AAPT_NS, "attr")) {
            continue;
        }
        let name = child.attribute("name").unwrap_or("");
        if name != "android:fillColor" {
            ctx.warn(
                "aapt",
                format!("aapt attribute {:?} is not supported and was ignored", name),
            );
            continue;
        }
        let Some(gradient) = child
            .children()
            .find(|node| node.is_element() && node.has_tag_name("gradient"))
        else {
            ctx.warn("aapt", "aapt fillColor without a gradient was ignored");
            continue;
        };
        fill = Some(convert_gradient(ctx, gradient)?);
    }
    Ok(fill)
}

/// Emits a gradient def and returns its url reference. Android gradient
/// geometry is in viewport units, hence gradientUnits="userSpaceOnUse".
fn convert_gradient(
    ctx: &mut RunCtx,
    node: roxmltree::Node,
) -> Result<String, Vd2SvgError> {
    let kind = android_attr(node, "type").unwrap_or("linear");
    let tag = match kind {
        "linear" => "linearGradient",
        "radial" => "radialGradient",
        other => return Err(Vd2SvgError::UnsupportedGradient(other.to_string())),
    };
    let id = ctx.next_gradient_id();
    let mut gradient = SvgElement::new(tag);
    gradient.set("id", &id);
    gradient.set("gradientUnits", "userSpaceOnUse");
    let geometry: &[(&str, &str)] = match kind {
        "linear" => &[
            ("startX", "x1"),
            ("startY", "y1"),
            ("endX", "x2"),
            ("endY", "y2"),
        ],
        _ => &[
            ("centerX", "cx"),
            ("centerY", "cy"),
            ("gradientRadius", "r"),
        ],
    };
    for (android_name, svg_name) in geometry {
        if let Some(value) = android_attr(node, android_name) {
            gradient.set(svg_name, value);
        }
    }
    for unsupported in ["tileMode", "centerColor"] {
        if android_attr(node, unsupported).is_some() {
            ctx.warn(
                "gradient",
                format!("{} is not supported and was ignored", unsupported),
            );
        }
    }

    if let Some(raw) = android_attr(node, "startColor") {
        let stop = gradient_stop(ctx, "0%", raw)?;
        gradient.push(stop);
    }
    // endColor is the platform spelling; stopColor appears in the wild too.
    if let Some(raw) = android_attr(node, "stopColor").or_else(|| android_attr(node, "endColor")) {
        let stop = gradient_stop(ctx, "100%", raw)?;
        gradient.push(stop);
    }
    for item in node
        .children()
        .filter(|child| child.is_element() && child.has_tag_name("item"))
    {
        let offset = require_attr(item, "offset")?;
        let raw = require_attr(item, "color")?;
        let parsed: f64 = offset.parse().map_err(|_| {
            Vd2SvgError::InvalidInput(format!("gradient item offset {:?}", offset))
        })?;
        let stop = gradient_stop(ctx, &percent(parsed), raw)?;
        gradient.push(stop);
    }

    ctx.defs.push(gradient);
    Ok(format!("url(#{})", id))
}

fn gradient_stop(
    ctx: &mut RunCtx,
    offset: &str,
    raw_color: &str,
) -> Result<SvgElement, Vd2SvgError> {
    let color = ctx.resolver.color(raw_color)?;
    let mut stop = SvgElement::new("stop");
    stop.set("offset", offset);
    stop.set("stop-color", color.hex);
    if let Some(alpha) = color.alpha {
        stop.set("stop-opacity", alpha);
    }
    Ok(stop)
}

fn convert_clip(
    ctx: &mut RunCtx,
    node: roxmltree::Node,
    host: &mut SvgElement,
) -> Result<(), Vd2SvgError> {
    let data = require_attr(node, "pathData")?;
    let id = ctx.next_clip_id();
    let mut clip = SvgElement::new("clipPath");
    clip.set("id", &id);
    let mut path = SvgElement::new("path");
    path.set("d", data);
    clip.push(path);
    ctx.defs.push(clip);
    host.set("clip-path", format!("url(#{})", id));
    Ok(())
}

/// Synthesizes the tint as a filter: flood the tint color, then combine
/// with the source graphic. Porter-Duff modes map to feComposite (the
/// dst_* family swaps the inputs); anything else becomes an feBlend.
fn tint_filter(ctx: &mut RunCtx, raw: &str, mode: &str) -> Result<SvgElement, Vd2SvgError> {
    let color = ctx.resolver.color(raw)?;
    let mut filter = SvgElement::new("filter");
    filter.set("id", "Tint");
    let mut flood = SvgElement::new("feFlood");
    flood.set("flood-color", color.hex);
    if let Some(alpha) = color.alpha {
        flood.set("flood-opacity", alpha);
    }
    flood.set("result", "flood");
    filter.push(flood);

    let arithmetic: Option<[&str; 4]> = match mode {
        "add" => Some(["0", "1", "1", "0"]),
        "clear" => Some(["0", "0", "0", "0"]),
        "src" => Some(["0", "1", "0", "0"]),
        "dst" => Some(["0", "0", "1", "0"]),
        _ => None,
    };
    let mut combine = SvgElement::new("feComposite");
    if let Some([k1, k2, k3, k4]) = arithmetic {
        combine.set("in", "flood");
        combine.set("in2", "SourceGraphic");
        combine.set("operator", "arithmetic");
        combine.set("k1", k1);
        combine.set("k2", k2);
        combine.set("k3", k3);
        combine.set("k4", k4);
        filter.push(combine);
        return Ok(filter);
    }
    let operator = match mode {
        "src_over" | "dst_over" => Some("over"),
        "src_in" | "dst_in" => Some("in"),
        "src_out" | "dst_out" => Some("out"),
        "src_atop" | "dst_atop" => Some("atop"),
        "xor" => Some("xor"),
        _ => None,
    };
    if let Some(operator) = operator {
        if mode.starts_with("dst_") {
            combine.set("in", "SourceGraphic");
            combine.set("in2", "flood");
        } else {
            combine.set("in", "flood");
            combine.set("in2", "SourceGraphic");
        }
        combine.set("operator", operator);
        filter.push(combine);
        return Ok(filter);
    }
    let mut blend = SvgElement::new("feBlend");
    blend.set("in", "flood");
    blend.set("in2", "SourceGraphic");
    blend.set("mode", mode);
    filter.push(blend);
    Ok(filter)
}

/// The adaptive-icon shape: a 108x108 viewport, an animated rounded-rect
/// mask, and the background and foreground drawables drifting on slow
/// loops. A stylistic echo of the launcher's parallax, not a simulation.
fn convert_adaptive(
    ctx: &mut RunCtx,
    root: roxmltree::Node,
) -> Result<SvgElement, Vd2SvgError> {
    let mut svg = SvgElement::new("svg");
    svg.set("xmlns", SVG_NS);
    svg.set("xmlns:xlink", XLINK_NS);
    svg.set("width", "108px");
    svg.set("height", "108px");
    svg.set("viewBox", "0 0 108 108");

    let clip_id = ctx.next_clip_id();
    let mut clip = SvgElement::new("clipPath");
    clip.set("id", &clip_id);
    let mut rect = SvgElement::new("rect");
    rect.set("width", "108");
    rect.set("height", "108");
    rect.set("rx", "36");
    let mut pulse = SvgElement::new("animate");
    pulse.set("attributeName", "rx");
    pulse.set("values", "36;36;12;12;36");
    pulse.set("dur", "6s");
    pulse.set("repeatCount", "indefinite");
    rect.push(pulse);
    clip.push(rect);
    ctx.defs.push(clip);

    let mut content = SvgElement::new("g");
    content.set("clip-path", format!("url(#{})", clip_id));
    for (layer_tag, amplitude) in [("background", 4), ("foreground", 8)] {
        let Some(layer) = root
            .children()
            .find(|node| node.is_element() && node.has_tag_name(layer_tag))
        else {
            continue;
        };
        let Some(reference) = android_attr(layer, "drawable") else {
            ctx.warn(
                "adaptive-icon",
                format!("<{}> without a drawable was skipped", layer_tag),
            );
            continue;
        };
        let body = drawable::resolve_drawable(ctx, reference)?;
        content.push(jittered_layer(body, amplitude));
    }
    if root
        .children()
        .any(|node| node.is_element() && node.has_tag_name("monochrome"))
    {
        ctx.warn(
            "adaptive-icon",
            "monochrome layer is not supported and was skipped",
        );
    }
    svg.push(content);
    Ok(svg)
}

fn jittered_layer(body: SvgElement, amplitude: u32) -> SvgElement {
    let mut layer = SvgElement::new("g");
    layer.push(body);
    let mut drift = SvgElement::new("animateTransform");
    drift.set("attributeName", "transform");
    drift.set("type", "translate");
    drift.set(
        "values",
        format!("0 0;{a} {a};0 0", a = amplitude),
    );
    drift.set("dur", "2s");
    drift.set("repeatCount", "indefinite");
    drift.set("additive", "sum");
    layer.push(drift);
    layer
}

fn require_attr<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Result<&'a str, Vd2SvgError> {
    android_attr(node, name).ok_or_else(|| Vd2SvgError::MissingAttribute {
        element: node.tag_name().name().to_string(),
        attribute: name.to_string(),
    })
}

/// Strips Android density suffixes textually and appends px. Unit
/// conversion is deliberately not performed; 24dp means 24 CSS pixels.
fn density_to_px(value: &str) -> String {
    let stripped = value.replace("dip", "").replace("dp", "").replace("sp", "");
    format!("{}px", stripped.trim())
}

fn percent(value: f64) -> String {
    let mut out = format!("{:.4}", value * 100.0);
    while out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
    out.push('%');
    out
}

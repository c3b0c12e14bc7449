use std::fs;
use std::path::Path;

use base64::Engine;

use crate::convert::{self, RunCtx};
use crate::error::Vd2SvgError;
use crate::svg::SvgElement;

/// Resolves an adaptive-icon layer reference into an inline element.
/// `@drawable/name` and `@mipmap/name` locate a resource file: vector XML
/// is converted recursively and embedded as a data URI, anything else is
/// referenced by path. A non-reference value is treated as a color and
/// becomes a full-bleed rect.
pub(crate) fn resolve_drawable(
    ctx: &mut RunCtx,
    reference: &str,
) -> Result<SvgElement, Vd2SvgError> {
    let target = reference
        .strip_prefix("@drawable/")
        .map(|name| ("drawable", name))
        .or_else(|| reference.strip_prefix("@mipmap/").map(|name| ("mipmap", name)));
    let Some((category, name)) = target else {
        return color_rect(ctx, reference);
    };
    let file = ctx
        .resolver
        .find_drawable_file(category, name)
        .ok_or_else(|| Vd2SvgError::MissingDrawable(reference.to_string()))?;
    if file.extension().and_then(|ext| ext.to_str()) == Some("xml") {
        embed_vector(ctx, &file, reference)
    } else {
        Ok(raster_reference(ctx, &file))
    }
}

/// Runs the referenced document through its own conversion (fresh ids and
/// defs, shared resolver) and wraps the result as a base64 data URI. The
/// resolver's drawable stack catches reference cycles.
fn embed_vector(
    ctx: &mut RunCtx,
    file: &Path,
    reference: &str,
) -> Result<SvgElement, Vd2SvgError> {
    ctx.resolver.enter_drawable(file, reference)?;
    let outcome = convert_embedded(ctx, file);
    ctx.resolver.leave_drawable();
    let svg = outcome?;

    let payload = base64::engine::general_purpose::STANDARD.encode(svg.as_bytes());
    let mut image = SvgElement::new("image");
    image.set("width", "108");
    image.set("height", "108");
    image.set("xlink:href", format!("data:image/svg+xml;base64,{}", payload));
    Ok(image)
}

fn convert_embedded(ctx: &mut RunCtx, file: &Path) -> Result<String, Vd2SvgError> {
    let text = fs::read_to_string(file)?;
    let (svg, warnings) = convert::convert_document(&text, Some(file), ctx.resolver)?;
    ctx.warnings.extend(warnings);
    Ok(svg)
}

/// Rasters are referenced, never inlined: relative to the referencing
/// document's directory when the file sits under it, absolute otherwise.
fn raster_reference(ctx: &RunCtx, file: &Path) -> SvgElement {
    let href = match ctx.source.as_deref().and_then(Path::parent) {
        Some(base) => match file.strip_prefix(base) {
            Ok(relative) => relative.display().to_string(),
            Err(_) => file.display().to_string(),
        },
        None => file.display().to_string(),
    };
    let mut image = SvgElement::new("image");
    image.set("width", "108");
    image.set("height", "108");
    image.set("xlink:href", href);
    image
}

fn color_rect(ctx: &mut RunCtx, reference: &str) -> Result<SvgElement, Vd2SvgError> {
    let color = ctx.resolver.color(reference)?;
    let mut rect = SvgElement::new("rect");
    rect.set("width", "108");
    rect.set("height", "108");
    rect.set("fill", color.hex);
    if let Some(alpha) = color.alpha {
        rect.set("fill-opacity", alpha);
    }
    Ok(rect)
}

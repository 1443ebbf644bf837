use std::io::Cursor;

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont};
use anyhow::{bail, Context, Result};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use tracing::warn;

use crate::color::Color;
use crate::palette::{DisplayOptions, Palette};

/// Output raster dimensions. Fixed by the element contract, not derived
/// from the palette.
pub const WIDTH: u32 = 1920;
pub const HEIGHT: u32 = 1080;

const HEX_SCALE: f32 = 42.0;
const NAME_SCALE: f32 = 32.0;

/// Text baselines measured up from the bottom edge. These are literal
/// constants, not proportions of the canvas height.
const HEX_BASELINE_FROM_BOTTOM: u32 = 100;
const NAME_BASELINE_FROM_BOTTOM: u32 = 70;

/// Horizontal bounds `[start, end)` of band `index` out of `count`.
///
/// Integer boundaries `i * WIDTH / count` make the bands seamless: band
/// widths differ by at most one pixel and always sum to exactly `WIDTH`.
pub fn band_bounds(index: usize, count: usize) -> (u32, u32) {
    let w = u64::from(WIDTH);
    let start = (index as u64 * w / count as u64) as u32;
    let end = ((index as u64 + 1) * w / count as u64) as u32;
    (start, end)
}

/// Render the palette as a 1920x1080 raster: one full-height vertical band
/// per entry, with optional hex and name labels near the bottom edge.
///
/// The font is optional. Without one the bands still render and the text
/// overlay is skipped, so a missing font degrades cosmetically rather than
/// failing the render.
pub fn render_palette(
    palette: &Palette,
    options: DisplayOptions,
    font: Option<&FontVec>,
) -> Result<RgbImage> {
    if palette.is_empty() {
        bail!("cannot render an empty palette: at least one color is required");
    }
    if options.any_text() && font.is_none() {
        warn!("no font available, rendering bands without text labels");
    }

    let mut image = RgbImage::new(WIDTH, HEIGHT);
    let count = palette.len();

    for (index, entry) in palette.entries().iter().enumerate() {
        let (start, end) = band_bounds(index, count);
        let fill = Rgb([entry.color.r, entry.color.g, entry.color.b]);
        for x in start..end {
            for y in 0..HEIGHT {
                image.put_pixel(x, y, fill);
            }
        }

        if !options.any_text() {
            continue;
        }
        let Some(font) = font else { continue };

        let text_color = entry.color.contrast_color();
        let center_x = (start + end) as f32 / 2.0;

        if options.show_hex {
            draw_centered(
                &mut image,
                font,
                HEX_SCALE,
                &entry.color.to_hex_upper(),
                center_x,
                HEIGHT - HEX_BASELINE_FROM_BOTTOM,
                text_color,
            );
        }
        if options.show_name {
            draw_centered(
                &mut image,
                font,
                NAME_SCALE,
                &entry.name,
                center_x,
                HEIGHT - NAME_BASELINE_FROM_BOTTOM,
                text_color,
            );
        }
    }

    Ok(image)
}

/// Encode the raster as PNG bytes suitable for the upload sink.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("failed to encode palette image as PNG")?;
    Ok(bytes)
}

/// Draw `text` centered on `center_x` with its baseline at `baseline_y`.
fn draw_centered(
    image: &mut RgbImage,
    font: &FontVec,
    scale: f32,
    text: &str,
    center_x: f32,
    baseline_y: u32,
    color: Color,
) {
    let scale = PxScale::from(scale);
    let width = text_width(font, scale, text);
    let ascent = font.as_scaled(scale).ascent();
    let x = (center_x - width / 2.0).round() as i32;
    let y = (baseline_y as f32 - ascent).round() as i32;
    draw_text_mut(
        image,
        Rgb([color.r, color.g, color.b]),
        x,
        y,
        scale,
        font,
        text,
    );
}

/// Advance width of `text` at `scale`, kerning included.
fn text_width(font: &FontVec, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut previous: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(previous) = previous {
            width += scaled.kern(previous, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

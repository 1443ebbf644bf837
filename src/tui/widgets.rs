use ratatui::prelude::*;
use ratatui::widgets::{Block, Widget};

use crate::color::Color as AppColor;
use crate::palette::{DisplayOptions, Palette};

fn to_color(c: AppColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Foreground matching the raster renderer's contrast rule, so the preview
/// labels flip black/white at the same point the image does.
fn contrast_fg(c: AppColor) -> Color {
    to_color(c.contrast_color())
}

/// A widget that previews the palette as equal-width colored bands with
/// hex and name labels near the bottom, mirroring the rendered image
/// layout. Highlights the currently selected band.
pub struct PaletteStrip<'a> {
    palette: &'a Palette,
    options: DisplayOptions,
    selected: Option<usize>,
}

impl<'a> PaletteStrip<'a> {
    pub fn new(palette: &'a Palette, options: DisplayOptions, selected: Option<usize>) -> Self {
        Self {
            palette,
            options,
            selected,
        }
    }
}

/// Horizontal bounds of band `index` within a strip of `width` cells.
fn band_bounds(index: usize, count: usize, width: u16) -> (u16, u16) {
    let w = u32::from(width);
    let start = (index as u32 * w / count as u32) as u16;
    let end = ((index as u32 + 1) * w / count as u32) as u16;
    (start, end)
}

/// Center `text` within `width` cells, truncating when it does not fit.
fn centered(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{truncated:^width$}")
}

impl Widget for PaletteStrip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title("Palette");
        let inner = block.inner(area);
        block.render(area, buf);

        if self.palette.is_empty() || inner.width == 0 || inner.height == 0 {
            return;
        }

        let count = self.palette.len();
        for (index, entry) in self.palette.entries().iter().enumerate() {
            let (start, end) = band_bounds(index, count, inner.width);
            if start == end {
                continue;
            }
            let band_width = usize::from(end - start);
            let x = inner.x + start;
            let bg = to_color(entry.color);
            let fg = contrast_fg(entry.color);

            let fill = Style::default().bg(bg);
            for y in inner.y..inner.y + inner.height {
                buf.set_string(x, y, " ".repeat(band_width), fill);
            }

            let mut label_style = Style::default().bg(bg).fg(fg);
            if self.selected == Some(index) {
                label_style = label_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                buf.set_string(x, inner.y, centered("[*]", band_width), label_style);
            }

            // Hex above name, both near the bottom, like the raster output.
            if self.options.show_hex && inner.height >= 3 {
                buf.set_string(
                    x,
                    inner.y + inner.height - 2,
                    centered(&entry.color.to_hex_upper(), band_width),
                    label_style,
                );
            }
            if self.options.show_name && inner.height >= 2 {
                buf.set_string(
                    x,
                    inner.y + inner.height - 1,
                    centered(&entry.name, band_width),
                    label_style,
                );
            }
        }
    }
}

use std::path::Path;

use ab_glyph::FontVec;
use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Common system locations probed when no font is given explicitly.
const FALLBACK_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load a TTF/OTF font from `path`.
pub fn load_font(path: &Path) -> Result<FontVec> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read font file: {}", path.display()))?;
    FontVec::try_from_vec(data)
        .with_context(|| format!("not a usable font file: {}", path.display()))
}

/// Resolve the overlay font: an explicit path if given, otherwise the first
/// usable fallback location.
///
/// Returns `None` when nothing loads. The renderer treats that as a
/// cosmetic degradation and draws bands without labels.
pub fn resolve_font(explicit: Option<&Path>) -> Option<FontVec> {
    if let Some(path) = explicit {
        match load_font(path) {
            Ok(font) => return Some(font),
            Err(err) => {
                warn!("{err:#}; falling back to system fonts");
            }
        }
    }
    for candidate in FALLBACK_PATHS {
        let path = Path::new(candidate);
        if !path.exists() {
            continue;
        }
        match load_font(path) {
            Ok(font) => {
                debug!(path = %path.display(), "loaded fallback font");
                return Some(font);
            }
            Err(err) => debug!("{err:#}"),
        }
    }
    warn!("no usable font found; palette text labels will be skipped");
    None
}

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, info, warn};
use plotters::style::{register_font, FontStyle};

pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: [&str; 7] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// The font file chart text is drawn with, or `None` when no font could be registered.
static LOADED_FONT: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Registers a font for chart text and reports whether text can be drawn.
///
/// Registration happens on the first call only; plotters keeps one font per
/// family for the whole process. A later call naming another font keeps the
/// first one and logs a warning.
pub fn ensure_chart_font(configured: Option<&Path>) -> bool {
    let loaded = LOADED_FONT.get_or_init(|| register_first_usable(configured));

    if let Some(requested) = configured {
        if loaded.as_deref() != Some(requested) {
            warn!(
                "chart font {} ignored, charts keep using {}",
                requested.display(),
                loaded.as_deref().map_or("no font".to_string(), |path| path.display().to_string())
            );
        }
    }

    loaded.is_some()
}

fn register_first_usable(configured: Option<&Path>) -> Option<PathBuf> {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(|path| PathBuf::from(*path)));

    for candidate in candidates {
        let Ok(bytes) = fs::read(&candidate) else {
            continue;
        };

        // plotters keeps registered fonts for the life of the process.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                info!("chart font loaded from {}", candidate.display());
                return Some(candidate);
            },
            Err(_) => debug!("unusable font file, path={}", candidate.display()),
        }
    }

    warn!("no usable chart font found, charts are rendered without text");
    None
}

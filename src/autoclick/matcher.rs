//! Template matching against captured frames.

use std::path::Path;

use image::GrayImage;
use imageproc::template_matching::{MatchTemplateMethod, match_template};

use super::error::{ClickerError, ClickerResult};

/// Fixed normalized cross-correlation similarity threshold.
pub const MATCH_THRESHOLD: f32 = 0.7;

/// Load a template image from disk as grayscale. A decode failure is a
/// per-template error; the caller skips the template for the iteration.
pub fn load_template(path: &Path) -> ClickerResult<GrayImage> {
    let img = image::open(path).map_err(|source| ClickerError::TemplateLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_luma8())
}

/// `match_template` panics when the template exceeds the frame, so the size
/// guard runs first and reports the offending template.
pub fn ensure_fits(path: &Path, template: &GrayImage, frame: &GrayImage) -> ClickerResult<()> {
    if template.width() > frame.width() || template.height() > frame.height() {
        return Err(ClickerError::TemplateTooLarge {
            path: path.to_path_buf(),
            template_width: template.width(),
            template_height: template.height(),
            frame_width: frame.width(),
            frame_height: frame.height(),
        });
    }
    Ok(())
}

/// All template-center points scoring at or above `threshold`, in row-major
/// scan order. "No match" is an empty list, never an error. Coordinates are
/// relative to the frame; the caller translates them to screen space.
pub fn find_centers(frame: &GrayImage, template: &GrayImage, threshold: f32) -> Vec<(u32, u32)> {
    let scores = match_template(frame, template, MatchTemplateMethod::CrossCorrelationNormalized);
    let (tw, th) = template.dimensions();

    let mut centers = Vec::new();
    for (x, y, score) in scores.enumerate_pixels() {
        // Scores are f32; an all-black window divides to NaN, which fails
        // the comparison and is correctly treated as no match.
        if score[0] >= threshold {
            centers.push((x + tw / 2, y + th / 2));
        }
    }
    centers
}

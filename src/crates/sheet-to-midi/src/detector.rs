//! Symbol detection on binarized sheet images
//!
//! Every external contour of the inverted binary image becomes one
//! candidate [`Region`]. No shape analysis is attempted: stems, beams and
//! staff lines produce regions just like note heads do.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::{DynamicImage, GrayImage, ImageReader};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{threshold, ThresholdType};
use score_core::Region;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SheetError};

/// Gray level separating ink from paper
pub const BINARY_THRESHOLD: u8 = 127;

/// Order in which detected regions are handed to the sequencer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionOrder {
    /// Order produced by the contour tracer (raster scan of each border's
    /// first pixel). Stable for a given image.
    #[default]
    Detection,
    /// Sorted by bounding-box x, then y
    LeftToRight,
}

impl FromStr for RegionOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "detection" => Ok(RegionOrder::Detection),
            "left-to-right" | "ltr" => Ok(RegionOrder::LeftToRight),
            _ => Err(format!(
                "Invalid region order: {}. Use 'detection' or 'left-to-right'",
                s
            )),
        }
    }
}

impl fmt::Display for RegionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionOrder::Detection => write!(f, "detection"),
            RegionOrder::LeftToRight => write!(f, "left-to-right"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    pub order: RegionOrder,
    /// Regions with a smaller bounding-box area are dropped. 0 keeps everything.
    pub min_area: u64,
}

/// Grayscale the image and invert-threshold it so ink becomes foreground
pub fn binarize(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    threshold(&gray, BINARY_THRESHOLD, ThresholdType::BinaryInverted)
}

/// Surround the image with one pixel of background
///
/// The tracer only reports a component as an outer border when background
/// lies to its left, so ink touching the left edge would otherwise be
/// classified as a hole.
fn with_margin(binary: &GrayImage) -> GrayImage {
    let mut framed = GrayImage::new(binary.width() + 2, binary.height() + 2);
    for (x, y, pixel) in binary.enumerate_pixels() {
        framed.put_pixel(x + 1, y + 1, *pixel);
    }
    framed
}

/// Find the bounding box of every external contour in the image
pub fn detect_regions(image: &DynamicImage, options: &DetectorOptions) -> Vec<Region> {
    let binary = with_margin(&binarize(image));
    let contours = find_contours::<u32>(&binary);
    let total = contours.len();

    // Outer borders nested in a hole belong to an enclosing symbol
    let mut regions: Vec<Region> = contours
        .iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .filter_map(|c| Region::bounding(c.points.iter().map(|p| (p.x - 1, p.y - 1))))
        .filter(|r| r.area() >= options.min_area)
        .collect();

    if options.order == RegionOrder::LeftToRight {
        regions.sort_by_key(|r| (r.x, r.y));
    }

    debug!(
        contours = total,
        regions = regions.len(),
        order = %options.order,
        "detected symbol regions"
    );

    regions
}

/// Decode an image file (format sniffed from its contents) and detect its regions
pub fn detect_regions_in_file(path: &Path, options: &DetectorOptions) -> Result<Vec<Region>> {
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| SheetError::image_decode(&label, e))?
        .decode()
        .map_err(|e| SheetError::image_decode(&label, e))?;

    Ok(detect_regions(&image, options))
}

/// Decode an in-memory image and detect its regions
pub fn detect_regions_in_bytes(bytes: &[u8], options: &DetectorOptions) -> Result<Vec<Region>> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| SheetError::image_decode("uploaded image", e))?;

    Ok(detect_regions(&image, options))
}

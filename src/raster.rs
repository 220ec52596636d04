//! Rasterize labeled grids to RGBA images and write them as PNG.

use image::{ImageBuffer, Rgba, RgbaImage};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::grid::{Cell, LabeledGrid};

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Largest accepted module scale.
pub const MAX_SCALE: u32 = 64;
/// Largest accepted border in pixels.
pub const MAX_BORDER: u32 = 1024;
/// Largest image side in pixels.
pub const MAX_DIMENSION: u32 = 16384;

/// Errors that can occur while rendering or saving an image.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Cannot render an empty grid")]
    EmptyGrid,

    #[error("Module scale must be at least 1")]
    InvalidScale,

    #[error("Image would be too large ({width}x{height} cells, scale {scale}, border {border}); max side is {max} px", max = MAX_DIMENSION)]
    TooLarge {
        width: usize,
        height: usize,
        scale: u32,
        border: u32,
    },

    #[error("Failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Pixel layout for rendered images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    /// Pixels per cell along each axis.
    pub scale: u32,
    /// White margin in pixels around the grid.
    pub border: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1,
            border: 0,
        }
    }
}

/// Render a labeled grid as an image.
///
/// The image is `width * scale + 2 * border` pixels wide and
/// `height * scale + 2 * border` tall, where width is the longest row.
/// Cells past the end of a short row, like unknown cells, stay transparent.
/// Either side exceeding [`MAX_DIMENSION`] is an error.
pub fn render(grid: &LabeledGrid, options: &RasterOptions) -> Result<RgbaImage, RasterError> {
    if options.scale == 0 {
        return Err(RasterError::InvalidScale);
    }
    if grid.is_empty() {
        return Err(RasterError::EmptyGrid);
    }

    let scale = options.scale;
    let border = options.border;
    let too_large = || RasterError::TooLarge {
        width: grid.width(),
        height: grid.height(),
        scale,
        border,
    };
    let img_width = image_side(grid.width(), scale, border).ok_or_else(too_large)?;
    let img_height = image_side(grid.height(), scale, border).ok_or_else(too_large)?;

    let mut img: RgbaImage = ImageBuffer::from_pixel(img_width, img_height, WHITE);

    for (row_idx, row) in grid.rows().iter().enumerate() {
        for col_idx in 0..grid.width() {
            let color = match row.get(col_idx) {
                Some(Cell::Black) => BLACK,
                Some(Cell::White) => WHITE,
                Some(Cell::Unknown) | None => TRANSPARENT,
            };

            let x_start = border + col_idx as u32 * scale;
            let y_start = border + row_idx as u32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(x_start + dx, y_start + dy, color);
                }
            }
        }
    }

    Ok(img)
}

/// `cells * scale + 2 * border`, or `None` past [`MAX_DIMENSION`].
fn image_side(cells: usize, scale: u32, border: u32) -> Option<u32> {
    u32::try_from(cells)
        .ok()?
        .checked_mul(scale)?
        .checked_add(border.checked_mul(2)?)
        .filter(|side| *side <= MAX_DIMENSION)
}

/// Encode `img` as PNG and write it to `path`, creating parent directories.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<(), RasterError> {
    let io_err = |source| RasterError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let file = std::fs::File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    img.write_to(&mut writer, image::ImageFormat::Png)?;
    writer.flush().map_err(io_err)?;
    Ok(())
}

/// Path for a per-block copy of the output image: `<stem>-<fingerprint>.png`
/// next to `base`.
pub fn history_path(base: &Path, fingerprint: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "qr".to_string());
    base.with_file_name(format!("{}-{}.png", stem, fingerprint))
}

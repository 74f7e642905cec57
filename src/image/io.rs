//! Conversions between `image` crate buffers and dicematch rasters.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::OwnedImage;
use crate::util::{DiceMatchError, DiceMatchResult};
use std::path::{Path, PathBuf};

const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

fn is_image_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Lists the `.png`, `.jpg` and `.jpeg` files of `dir` in file-name order.
///
/// Subdirectories and other files are skipped.
pub fn image_paths<P: AsRef<Path>>(dir: P) -> DiceMatchResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let io_err = |err: std::io::Error| DiceMatchError::ImageIo {
        reason: format!("{}: {err}", dir.display()),
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if is_image_file(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Creates an owned image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> DiceMatchResult<OwnedImage> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Opens any supported image file without converting it.
pub fn load_dynamic_image<P: AsRef<Path>>(path: P) -> DiceMatchResult<image::DynamicImage> {
    image::open(path.as_ref()).map_err(|err| DiceMatchError::ImageIo {
        reason: format!("{}: {err}", path.as_ref().display()),
    })
}

/// Loads an image from disk and converts it to a grayscale owned image.
///
/// Three-channel inputs are reduced to luma.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> DiceMatchResult<OwnedImage> {
    let img = load_dynamic_image(path)?;
    owned_from_gray_image(&img.to_luma8())
}

/// Writes any `image` buffer to disk, mapping failures to `ImageIo`.
pub fn save_image<P, I>(img: &I, path: P) -> DiceMatchResult<()>
where
    P: AsRef<Path>,
    I: SaveableImage,
{
    img.save_to(path.as_ref()).map_err(|err| DiceMatchError::ImageIo {
        reason: format!("{}: {err}", path.as_ref().display()),
    })
}

/// Image buffers that `save_image` can write.
pub trait SaveableImage {
    /// Saves the buffer; the format follows the file extension.
    fn save_to(&self, path: &Path) -> image::ImageResult<()>;
}

impl SaveableImage for image::GrayImage {
    fn save_to(&self, path: &Path) -> image::ImageResult<()> {
        self.save(path)
    }
}

impl SaveableImage for image::RgbImage {
    fn save_to(&self, path: &Path) -> image::ImageResult<()> {
        self.save(path)
    }
}

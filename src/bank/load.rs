//! Template library loading from a directory of images.

use crate::bank::TemplateLibrary;
use crate::image::io::{image_paths, load_gray_image};
use crate::template::Template;
use crate::trace::{trace_debug, trace_event};
use crate::util::DiceMatchResult;
use std::path::{Path, PathBuf};

/// Lists the template images of `dir` in file-name order.
pub fn template_paths<P: AsRef<Path>>(dir: P) -> DiceMatchResult<Vec<PathBuf>> {
    image_paths(dir)
}

/// Loads every `.png`, `.jpg` and `.jpeg` file of `dir` as a grayscale
/// template. Files are taken in file-name order and labeled 1..=N.
///
/// A directory without images yields an empty library.
pub fn load_template_dir<P: AsRef<Path>>(dir: P) -> DiceMatchResult<TemplateLibrary> {
    let mut library = TemplateLibrary::default();
    for (idx, path) in template_paths(dir)?.into_iter().enumerate() {
        let img = load_gray_image(&path)?;
        let label = idx as u32 + 1;
        trace_debug!(
            "template_loaded",
            label = label,
            width = img.width(),
            height = img.height()
        );
        library.push(Template::from_owned(img, label)?);
    }
    trace_event!("templates_loaded", count = library.len());
    Ok(library)
}

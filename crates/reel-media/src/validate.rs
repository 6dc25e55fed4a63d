//! Upload validation.
//!
//! Confirms uploaded bytes decode as a supported raster image. Failures are
//! per-file and never abort the batch; the caller surfaces one warning per
//! rejected file.

use image::ImageFormat;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use reel_models::UploadWarning;

/// Validate a single uploaded file: sniff the format, accept only PNG/JPEG,
/// then perform a full decode.
pub fn validate_image(filename: &str, bytes: &[u8]) -> MediaResult<()> {
    let format = image::guess_format(bytes)
        .map_err(|e| MediaError::decode(filename, e.to_string()))?;

    match format {
        ImageFormat::Png | ImageFormat::Jpeg => {}
        other => {
            return Err(MediaError::UnsupportedFormat(format!(
                "{}: {:?} is not an accepted upload type",
                filename, other
            )));
        }
    }

    // Full decode, not just a header parse. A file that decodes here is
    // retained byte-for-byte for the export pipeline.
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| MediaError::decode(filename, e.to_string()))?;

    debug!(filename = filename, "Upload validated");
    Ok(())
}

/// Decode stored bytes into an opaque RGB frame for export.
///
/// This is the pipeline's second decode: upload-time validation already
/// decoded these bytes once, but the export loop decodes again and treats a
/// failure as a per-file skip, never a batch abort.
pub fn decode_frame(filename: &str, bytes: &[u8]) -> MediaResult<image::RgbImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| MediaError::decode(filename, e.to_string()))?;
    Ok(img.to_rgb8())
}

/// Validate a batch of uploads.
///
/// Returns the filenames that decoded successfully, in input order, plus one
/// warning per rejected file. Never fails as a whole: zero survivors is the
/// caller's fatal condition, not this function's.
pub fn validate_batch(files: &[(String, Vec<u8>)]) -> (Vec<String>, Vec<UploadWarning>) {
    let mut accepted = Vec::new();
    let mut warnings = Vec::new();

    for (filename, bytes) in files {
        match validate_image(filename, bytes) {
            Ok(()) => accepted.push(filename.clone()),
            Err(e) => {
                warnings.push(UploadWarning::new(
                    filename.clone(),
                    format!("Skipping {}: not a valid image ({})", filename, e),
                ));
            }
        }
    }

    (accepted, warnings)
}

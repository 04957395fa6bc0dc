//! Screenshot downscaling.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
enum ScreenshotError {
    #[error("not a base64 data URL")]
    NotDataUrl,

    #[error("invalid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Shrink a `data:image/...;base64,` screenshot to at most `max_width`
/// pixels wide, keeping the aspect ratio.
///
/// Images already narrow enough, and anything that fails to decode, are
/// returned unchanged.
pub fn downscale_data_url(data_url: &str, max_width: u32) -> String {
    match try_downscale(data_url, max_width) {
        Ok(Some(scaled)) => scaled,
        Ok(None) => data_url.to_string(),
        Err(e) => {
            warn!("Keeping original screenshot: {}", e);
            data_url.to_string()
        }
    }
}

fn try_downscale(data_url: &str, max_width: u32) -> Result<Option<String>, ScreenshotError> {
    let encoded = data_url
        .strip_prefix("data:image/")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or(ScreenshotError::NotDataUrl)?;

    let bytes = STANDARD.decode(encoded.trim())?;
    let img = image::load_from_memory(&bytes)?;
    let (width, height) = img.dimensions();
    if max_width == 0 || width <= max_width {
        return Ok(None);
    }

    let new_height = ((height as f64) * (max_width as f64) / (width as f64)).round().max(1.0) as u32;
    debug!("Downscaling screenshot {}x{} -> {}x{}", width, height, max_width, new_height);
    let resized = img.resize_exact(max_width, new_height, FilterType::Lanczos3);

    let mut buffer = Cursor::new(Vec::new());
    resized.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(Some(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(buffer.into_inner())
    )))
}

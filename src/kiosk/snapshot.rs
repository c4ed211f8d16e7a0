use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageResult, codecs::jpeg::JpegEncoder, imageops::FilterType};

pub const SNAPSHOT_WIDTH: u32 = 320;
pub const SNAPSHOT_HEIGHT: u32 = 240;
pub const SNAPSHOT_QUALITY: u8 = 80;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Scales a camera frame to the fixed punch-photo size and encodes it as a
/// JPEG data URL, the form stored on the log and sent to the spreadsheet.
pub fn encode(frame: &DynamicImage) -> ImageResult<String> {
    let scaled = frame
        .resize_exact(SNAPSHOT_WIDTH, SNAPSHOT_HEIGHT, FilterType::Triangle)
        .to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, SNAPSHOT_QUALITY).encode_image(&scaled)?;

    Ok(format!("{DATA_URL_PREFIX}{}", STANDARD.encode(jpeg)))
}

/// Decodes an uploaded frame, given either as raw base64 or as a data URL.
pub fn decode_upload(payload: &str) -> anyhow::Result<DynamicImage> {
    let encoded = match payload.split_once(";base64,") {
        Some((_, data)) => data,
        None => payload,
    };
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(image::load_from_memory(&bytes)?)
}

//! Surface snapshots and PNG encoding.

use thiserror::Error;

/// Capture errors.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Surface is empty ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },
    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// An owned copy of the surface pixels, straight (non-premultiplied) RGBA8.
///
/// Taken synchronously so later resizes or strokes cannot affect an
/// in-flight upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSnapshot {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RasterSnapshot {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self { width, height, rgba }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGBA of a single pixel, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.rgba.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Encode a snapshot to PNG bytes.
pub fn encode_png(snapshot: &RasterSnapshot) -> Result<Vec<u8>, CaptureError> {
    if snapshot.is_empty() {
        return Err(CaptureError::EmptySurface {
            width: snapshot.width,
            height: snapshot.height,
        });
    }

    let expected = snapshot.width as usize * snapshot.height as usize * 4;
    if snapshot.rgba.len() != expected {
        return Err(CaptureError::BufferSize {
            expected,
            actual: snapshot.rgba.len(),
        });
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, snapshot.width, snapshot.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&snapshot.rgba)?;
    }

    Ok(png_data)
}

//! Face detector boundary
//!
//! Detection itself (models, inference) lives outside Parla. A detector
//! turns an avatar image into face geometry or a detection error.

use kurbo::{Point, Rect, Size};

use parla_core::{FaceGeometry, ParlaError, ParlaResult};

/// Decoded avatar image, RGBA8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl AvatarImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> ParlaResult<Self> {
        if width == 0 || height == 0 {
            return Err(ParlaError::InvalidImage(format!("empty image {width}x{height}")));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(ParlaError::InvalidImage(format!(
                "expected {expected} RGBA bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Uniform image of one color
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> ParlaResult<Self> {
        let count = width as usize * height as usize;
        Self::new(width, height, rgba.repeat(count))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Produces face geometry for an image
#[allow(async_fn_in_trait)]
pub trait FaceDetector {
    async fn detect(&self, image: &AvatarImage) -> ParlaResult<FaceGeometry>;
}

/// Detector with a fixed answer, for hosts that ship landmarks alongside
/// the image
#[derive(Debug, Clone)]
pub struct StaticDetector {
    result: ParlaResult<FaceGeometry>,
}

impl StaticDetector {
    pub fn found(geometry: FaceGeometry) -> Self {
        Self {
            result: Ok(geometry),
        }
    }

    /// From a face box and the 68 landmark points
    pub fn from_points68(face_box: Rect, points: &[Point]) -> ParlaResult<Self> {
        FaceGeometry::from_points68(face_box, points).map(Self::found)
    }

    pub fn no_face() -> Self {
        Self {
            result: Err(ParlaError::NoFaceFound),
        }
    }

    pub fn failing(error: ParlaError) -> Self {
        Self { result: Err(error) }
    }
}

impl FaceDetector for StaticDetector {
    async fn detect(&self, image: &AvatarImage) -> ParlaResult<FaceGeometry> {
        let geometry = self.result.clone()?;
        let face = geometry.face_box();
        if face.x1 > image.width() as f64 || face.y1 > image.height() as f64 {
            return Err(ParlaError::DetectorFailed(format!(
                "face box {face:?} outside {}x{} image",
                image.width(),
                image.height()
            )));
        }
        Ok(geometry)
    }
}

//! Face Geometry - landmark point-groups of a single detected face
//!
//! Point-groups have a fixed length and fixed meaning per index (mouth
//! point 14 is always the upper lip center). The renderer depends on that
//! schema, so geometry is validated once at construction and read-only
//! afterwards.

use kurbo::{Point, Rect, Size};

use crate::{ParlaError, ParlaResult};

/// Mouth corner on the image-left side
pub const MOUTH_LEFT_CORNER: usize = 0;
/// Mouth corner on the image-right side
pub const MOUTH_RIGHT_CORNER: usize = 6;
/// Upper lip center
pub const MOUTH_UPPER_LIP_CENTER: usize = 14;
/// Lower lip center
pub const MOUTH_LOWER_LIP_CENTER: usize = 18;

/// Number of points in the flat landmark layout
pub const LANDMARK_COUNT: usize = 68;

/// Named landmark point-group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureGroup {
    Mouth,
    LeftEye,
    RightEye,
    LeftEyebrow,
    RightEyebrow,
    Nose,
    Jaw,
}

impl FeatureGroup {
    /// All groups in storage order
    pub fn all() -> &'static [FeatureGroup] {
        &[
            FeatureGroup::Mouth,
            FeatureGroup::LeftEye,
            FeatureGroup::RightEye,
            FeatureGroup::LeftEyebrow,
            FeatureGroup::RightEyebrow,
            FeatureGroup::Nose,
            FeatureGroup::Jaw,
        ]
    }

    /// Fixed number of points in this group
    pub fn expected_len(self) -> usize {
        match self {
            FeatureGroup::Mouth => 20,
            FeatureGroup::LeftEye | FeatureGroup::RightEye => 6,
            FeatureGroup::LeftEyebrow | FeatureGroup::RightEyebrow => 5,
            FeatureGroup::Nose => 9,
            FeatureGroup::Jaw => 17,
        }
    }

    /// Index range of this group inside the flat 68-point layout
    pub fn landmark_range(self) -> std::ops::Range<usize> {
        match self {
            FeatureGroup::Jaw => 0..17,
            FeatureGroup::LeftEyebrow => 17..22,
            FeatureGroup::RightEyebrow => 22..27,
            FeatureGroup::Nose => 27..36,
            FeatureGroup::LeftEye => 36..42,
            FeatureGroup::RightEye => 42..48,
            FeatureGroup::Mouth => 48..68,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Raw detector output, one point list per group
#[derive(Debug, Clone, Default)]
pub struct FaceLandmarks {
    pub mouth: Vec<Point>,
    pub left_eye: Vec<Point>,
    pub right_eye: Vec<Point>,
    pub left_eyebrow: Vec<Point>,
    pub right_eyebrow: Vec<Point>,
    pub nose: Vec<Point>,
    pub jaw: Vec<Point>,
}

impl FaceLandmarks {
    fn into_groups(self) -> [Vec<Point>; 7] {
        [
            self.mouth,
            self.left_eye,
            self.right_eye,
            self.left_eyebrow,
            self.right_eyebrow,
            self.nose,
            self.jaw,
        ]
    }
}

/// Validated geometry of one detected face
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGeometry {
    face_box: Rect,
    groups: [Vec<Point>; 7],
}

impl FaceGeometry {
    /// Validate detector output against the fixed schema
    pub fn new(face_box: Rect, landmarks: FaceLandmarks) -> ParlaResult<Self> {
        if !(face_box.width() > 0.0 && face_box.height() > 0.0) {
            return Err(ParlaError::InvalidFaceBox {
                width: face_box.width(),
                height: face_box.height(),
            });
        }

        let groups = landmarks.into_groups();
        for &group in FeatureGroup::all() {
            let actual = groups[group.slot()].len();
            if actual != group.expected_len() {
                return Err(ParlaError::InvalidLandmarks {
                    group,
                    expected: group.expected_len(),
                    actual,
                });
            }
        }

        Ok(Self { face_box, groups })
    }

    /// Build geometry from a flat 68-point landmark list
    pub fn from_points68(face_box: Rect, points: &[Point]) -> ParlaResult<Self> {
        if points.len() != LANDMARK_COUNT {
            return Err(ParlaError::InvalidLandmarkCount {
                expected: LANDMARK_COUNT,
                actual: points.len(),
            });
        }

        let take = |group: FeatureGroup| points[group.landmark_range()].to_vec();
        let landmarks = FaceLandmarks {
            mouth: take(FeatureGroup::Mouth),
            left_eye: take(FeatureGroup::LeftEye),
            right_eye: take(FeatureGroup::RightEye),
            left_eyebrow: take(FeatureGroup::LeftEyebrow),
            right_eyebrow: take(FeatureGroup::RightEyebrow),
            nose: take(FeatureGroup::Nose),
            jaw: take(FeatureGroup::Jaw),
        };

        Self::new(face_box, landmarks)
    }

    /// Face bounding box in image coordinates
    pub fn face_box(&self) -> Rect {
        self.face_box
    }

    /// Face bounding box size
    pub fn face_size(&self) -> Size {
        self.face_box.size()
    }

    /// Points of a group, in schema order
    pub fn group(&self, group: FeatureGroup) -> &[Point] {
        &self.groups[group.slot()]
    }

    pub fn mouth(&self) -> &[Point] {
        self.group(FeatureGroup::Mouth)
    }

    /// Mean of a group's points
    pub fn centroid(&self, group: FeatureGroup) -> Point {
        let points = self.group(group);
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / n, sy / n)
    }

    /// Bounding width and height of a group
    pub fn extent(&self, group: FeatureGroup) -> Size {
        let points = self.group(group);
        let (min_x, max_x, min_y, max_y) = points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(min_x, max_x, min_y, max_y), p| {
                (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
            },
        );
        Size::new(max_x - min_x, max_y - min_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_geometry, sample_points68};

    #[test]
    fn test_from_points68_groups() {
        let geometry = sample_geometry();

        for &group in FeatureGroup::all() {
            assert_eq!(geometry.group(group).len(), group.expected_len());
        }
        assert_eq!(geometry.face_size(), Size::new(160.0, 170.0));
    }

    #[test]
    fn test_rejects_short_group() {
        let geometry = sample_geometry();
        let landmarks = FaceLandmarks {
            mouth: geometry.mouth()[..12].to_vec(),
            left_eye: geometry.group(FeatureGroup::LeftEye).to_vec(),
            right_eye: geometry.group(FeatureGroup::RightEye).to_vec(),
            left_eyebrow: geometry.group(FeatureGroup::LeftEyebrow).to_vec(),
            right_eyebrow: geometry.group(FeatureGroup::RightEyebrow).to_vec(),
            nose: geometry.group(FeatureGroup::Nose).to_vec(),
            jaw: geometry.group(FeatureGroup::Jaw).to_vec(),
        };

        let err = FaceGeometry::new(geometry.face_box(), landmarks).unwrap_err();
        assert_eq!(
            err,
            ParlaError::InvalidLandmarks {
                group: FeatureGroup::Mouth,
                expected: 20,
                actual: 12,
            }
        );
    }

    #[test]
    fn test_rejects_empty_box() {
        let err = FaceGeometry::from_points68(Rect::new(10.0, 10.0, 10.0, 50.0), &sample_points68())
            .unwrap_err();
        assert!(matches!(err, ParlaError::InvalidFaceBox { .. }));
    }

    #[test]
    fn test_rejects_wrong_landmark_count() {
        let points = sample_points68();
        let err = FaceGeometry::from_points68(Rect::new(0.0, 0.0, 10.0, 10.0), &points[..60])
            .unwrap_err();
        assert_eq!(
            err,
            ParlaError::InvalidLandmarkCount {
                expected: 68,
                actual: 60
            }
        );
    }

    #[test]
    fn test_centroid_and_extent() {
        let geometry = sample_geometry();

        let mouth = geometry.centroid(FeatureGroup::Mouth);
        assert!((mouth.x - 200.0).abs() < 1e-6);
        assert!((mouth.y - 240.0).abs() < 1e-6);

        let eye = geometry.extent(FeatureGroup::LeftEye);
        assert!((eye.width - 24.0).abs() < 1e-6);
        assert!(eye.height > 0.0 && eye.height <= 10.0);
    }
}

/// Confidence score attached to detections, matches and edits.
///
/// Always kept within `0.0..=1.0`; producers clamp before publishing.
pub(crate) type Confidence = f32;

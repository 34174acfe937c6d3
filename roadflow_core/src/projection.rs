//! Projection stage - maps every cleaned sample into the target frame.

use crate::error::PipelineError;
use crate::types::{CleanedSample, TransformedSample};
use roadflow_geo::{FrameTransform, GeoError, GeodeticFrame};
use tracing::{debug, warn};

/// Converts each sample's position with `transform`.
///
/// The mapping is per row with no cross-sample state, so the output has the
/// same cardinality and order as the input. The first failed conversion
/// aborts the stage; coordinates are never passed through unconverted.
pub fn project(
    samples: Vec<CleanedSample>,
    source_frame: GeodeticFrame,
    transform: &dyn FrameTransform,
) -> Result<Vec<TransformedSample>, PipelineError> {
    if transform.source() != source_frame {
        warn!(
            "Transform expects {} input but samples are in {}",
            transform.source(),
            source_frame
        );
        return Err(GeoError::unavailable(source_frame, transform.target()).into());
    }

    debug!(
        "Projecting {} samples {} -> {}",
        samples.len(),
        transform.source(),
        transform.target()
    );

    samples
        .into_iter()
        .map(|sample| -> Result<TransformedSample, PipelineError> {
            let target = transform.convert(sample.position()).map_err(|e| {
                warn!(
                    "Failed to convert {} at {}: {}",
                    sample.vehicle_id, sample.timestamp, e
                );
                e
            })?;
            Ok(TransformedSample::new(sample, target))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LaneId;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use geo::Point;
    use roadflow_geo::TransformRegistry;

    fn cleaned(vid: &str, lon: f64, lat: f64) -> CleanedSample {
        let ts = NaiveDate::from_ymd_opt(2025, 8, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        CleanedSample::new(vid, ts, lon, lat, 30.0, LaneId::L1)
    }

    /// Fails every conversion, standing in for a missing backend.
    struct Unavailable;

    impl FrameTransform for Unavailable {
        fn source(&self) -> GeodeticFrame {
            GeodeticFrame::Wgs84
        }

        fn target(&self) -> GeodeticFrame {
            GeodeticFrame::Cgcs2000
        }

        fn convert(&self, _point: Point<f64>) -> Result<Point<f64>, GeoError> {
            Err(GeoError::unavailable(self.source(), self.target()))
        }
    }

    #[test]
    fn test_projection_preserves_cardinality() {
        let transform = TransformRegistry::default()
            .resolve(GeodeticFrame::Wgs84, GeodeticFrame::Cgcs2000)
            .unwrap();
        let samples = vec![cleaned("V001", 116.31, 39.91), cleaned("V002", 116.38, 39.97)];

        let projected = project(samples, GeodeticFrame::Wgs84, transform.as_ref()).unwrap();

        assert_eq!(projected.len(), 2);
        assert_eq!(projected[1].sample.vehicle_id, "V002");
        assert_abs_diff_eq!(projected[0].target_lon, 116.31, epsilon = 1e-8);
        assert_abs_diff_eq!(projected[0].target_lat, 39.91, epsilon = 1e-8);
    }

    #[test]
    fn test_gcj02_moves_points() {
        let transform = TransformRegistry::default()
            .resolve(GeodeticFrame::Wgs84, GeodeticFrame::Gcj02)
            .unwrap();

        let projected =
            project(vec![cleaned("V001", 116.35, 39.95)], GeodeticFrame::Wgs84, transform.as_ref())
                .unwrap();

        assert!(projected[0].target_lon - 116.35 > 1e-3);
    }

    #[test]
    fn test_unavailable_backend_fails_loudly() {
        let samples = vec![cleaned("V001", 116.35, 39.95)];
        let result = project(samples, GeodeticFrame::Wgs84, &Unavailable);

        assert!(matches!(
            result,
            Err(PipelineError::Transform(GeoError::TransformUnavailable { .. }))
        ));
    }

    #[test]
    fn test_source_frame_mismatch() {
        let transform = TransformRegistry::default()
            .resolve(GeodeticFrame::Wgs84, GeodeticFrame::Cgcs2000)
            .unwrap();

        let result = project(
            vec![cleaned("V001", 116.35, 39.95)],
            GeodeticFrame::Cgcs2000,
            transform.as_ref(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_input() {
        let projected = project(Vec::new(), GeodeticFrame::Wgs84, &Unavailable).unwrap();
        assert!(projected.is_empty());
    }
}

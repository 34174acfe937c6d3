//! roadflow Geodetic Abstraction Layer
//!
//! This crate provides the narrow "convert point frame A → frame B" seam
//! used by the roadflow pipeline, so the projection stage can run against
//! any implementation without knowing how the conversion is performed.
//!
//! # Implementations
//!
//! - [`HelmertTransform`]: rigorous geodetic → ECEF → 7-parameter Helmert →
//!   geodetic conversion between ellipsoid-based frames (WGS84, CGCS2000)
//! - [`Gcj02Transform`]: the published WGS84 → GCJ-02 offset algorithm
//!
//! Pairs without an implementation are reported as
//! [`GeoError::TransformUnavailable`]; coordinates are never passed through
//! unconverted.
//!
//! # Example
//!
//! ```ignore
//! use roadflow_geo::{GeodeticFrame, TransformRegistry};
//! use geo::Point;
//!
//! let registry = TransformRegistry::default();
//! let transform = registry.resolve(GeodeticFrame::Wgs84, GeodeticFrame::Cgcs2000)?;
//! let converted = transform.convert(Point::new(116.35, 39.95))?;
//! ```

mod ellipsoid;
mod error;
mod frame;
mod gcj02;
mod helmert;
mod transform;

pub use ellipsoid::{Ellipsoid, Geodetic};
pub use error::GeoError;
pub use frame::GeodeticFrame;
pub use gcj02::Gcj02Transform;
pub use helmert::{HelmertParams, HelmertTransform};
pub use transform::{FrameTransform, TransformRegistry};

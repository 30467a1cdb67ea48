//! Topology and global numbering for multi-patch spline models
//!
//! Patches are tensor-product spline surfaces or volumes that meet only
//! approximately. [`topology::TopologySet`] finds the corners, edges and
//! faces they share by comparing control points within a tolerance, and
//! [`numbering`] gives every control point of the model a single global
//! index that all patches touching it agree on. [`SplineModel`] ties the
//! two together with property codes and the text streams.

pub mod cli;
pub mod error;
pub mod gno;
pub mod model;
pub mod numbering;
pub mod primitives;
pub mod properties;
pub mod spatial;
pub mod spline;
pub mod splinefile;
pub mod topology;
mod tokens;

pub type P3 = nalgebra::Point3<f64>;
pub type V3 = nalgebra::Vector3<f64>;

pub use error::{Error, Result};
pub use model::{SplineModel, DEFAULT_TOLERANCE};
pub use numbering::{GlobalNumbering, PatchNumber, Scheme, SurfGlobNumber, VolGlobNumber};
pub use properties::{EntityKind, PropertyCode};
pub use spline::{Basis, SplinePatch};
pub use topology::TopologySet;

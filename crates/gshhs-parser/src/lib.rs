//! Shoreline polygon readers.
//!
//! Two sources feed the boundary clipper:
//!
//! - the GSHHS native binary database (`gshhs_{f,h,i,l,c}.b`), decoded with
//!   `nom` from a [`bytes::Bytes`] buffer;
//! - optional user polygons from a YAML or JSON list.
//!
//! Both produce [`gridgen_common::BoundarySet`]s with flattened coordinate
//! arrays, explicit vertex counts and bounding boxes.

pub mod error;
pub mod reader;
pub mod user;

pub use error::{GshhsError, GshhsResult};
pub use reader::{read_gshhs_file, GshhsHeader, GshhsReader, GshhsRecord, DEFAULT_MAX_LEVEL};
pub use user::{parse_user_polygons, read_user_polygons, UserPolygon};

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry helpers for the protest map.
//!
//! [`flatten`] turns polygon and multi-polygon boundaries into the nested
//! `xs`/`ys` arrays the map renderer consumes (holes preserved, non-finite
//! values nulled). [`projection`] moves WGS84 coordinates into Web Mercator
//! so boundaries and protest points share one planar system. [`simplify`]
//! thins projected outlines for lighter output.

pub mod flatten;
pub mod projection;
pub mod simplify;

pub use flatten::{FlattenedGeometries, flatten, flatten_one, sanitize};
pub use projection::{project_boundary, to_web_mercator};
pub use simplify::simplify_boundary;

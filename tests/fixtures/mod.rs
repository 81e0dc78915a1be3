//! Test fixtures for parcel-access.
//!
//! Provides:
//! - Parcel builders (unit square, small metric blocks)
//! - Recording doubles for the presenter, position source and router

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod doubles;
pub mod parcels;

pub use doubles::*;
pub use parcels::*;

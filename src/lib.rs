#![forbid(unsafe_code)]

//! Offline asset pipeline for the Horse runtime.
//!
//! Source assets get stable handles from the [`asset`] registry, are turned
//! into versioned binary artifacts by the [`cook`] pipeline, sealed into one
//! archive by [`pak`], and read back at runtime through the [`vfs`] overlay.

pub mod asset;
pub mod cook;
pub mod io;
pub mod pak;
pub mod path;
pub mod vfs;

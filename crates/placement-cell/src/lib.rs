//! Backend core for a college placement portal.
//!
//! Students register with the placement cell, browse job postings, apply
//! (directly or through an admin-defined application form), and follow their
//! per-job status as interviews are scheduled and completed. The lifecycle
//! logic lives under [`workflows::placement`]; the surrounding modules carry
//! configuration, telemetry, and the top-level error type shared with the
//! hosting service crate.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

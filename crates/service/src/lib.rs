//! Service layer for car records.
//! - `car::repository` is the store seam: one trait, a MongoDB implementation and in-memory doubles.
//! - `car::service` holds the request-independent operations the HTTP handlers call.

pub mod errors;
pub mod car;

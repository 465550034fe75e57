//! Car module: repository (store access) and service (operations used by handlers).

pub mod repository;
pub mod service;

pub use repository::{CarRepository, MongoCarRepository};
pub use service::CarService;

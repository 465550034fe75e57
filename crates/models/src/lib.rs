pub mod errors;
pub mod db;
pub mod car;

pub use car::{Car, CarField, CarFilter, CarUpdate};

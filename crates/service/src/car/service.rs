use std::sync::Arc;

use models::Car;
use tracing::{debug, info, instrument};

use crate::car::repository::CarRepository;
use crate::errors::ServiceError;

/// Car operations independent of the web framework.
///
/// Update and delete succeed even when nothing matched; callers get the
/// submitted car (update) or the deleted count (delete) back.
#[derive(Clone)]
pub struct CarService {
    repo: Arc<dyn CarRepository>,
}

impl CarService {
    pub fn new(repo: Arc<dyn CarRepository>) -> Self { Self { repo } }

    #[instrument(skip(self, car), fields(name = %car.name))]
    pub async fn create(&self, car: Car) -> Result<Car, ServiceError> {
        self.repo.insert_one(&car).await?;
        info!(model = %car.model, "car_created");
        Ok(car)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Car>, ServiceError> {
        let cars = self.repo.find_all().await?;
        debug!(count = cars.len(), "cars_listed");
        Ok(cars)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, name: &str) -> Result<Car, ServiceError> {
        self.repo
            .find_one_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::not_found("car"))
    }

    #[instrument(skip(self, car), fields(new_name = %car.name))]
    pub async fn update(&self, name: &str, car: Car) -> Result<Car, ServiceError> {
        let matched = self.repo.update_one_by_name(name, &car).await?;
        debug!(matched, "car_updated");
        Ok(car)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<u64, ServiceError> {
        let deleted = self.repo.delete_one_by_name(name).await?;
        debug!(deleted, "car_deleted");
        Ok(deleted)
    }
}

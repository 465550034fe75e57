use async_trait::async_trait;
use models::{db::StoreHandle, Car, CarFilter, CarUpdate};
use mongodb::Collection;

use crate::errors::ServiceError;

/// The five primitive store operations the HTTP surface is built on.
///
/// Every `*_by_name` operation acts on the first document in store order whose
/// `name` matches. Update and delete report how many documents they touched.
#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn insert_one(&self, car: &Car) -> Result<(), ServiceError>;
    async fn find_all(&self) -> Result<Vec<Car>, ServiceError>;
    async fn find_one_by_name(&self, name: &str) -> Result<Option<Car>, ServiceError>;
    async fn update_one_by_name(&self, name: &str, car: &Car) -> Result<u64, ServiceError>;
    async fn delete_one_by_name(&self, name: &str) -> Result<u64, ServiceError>;
}

/// MongoDB-backed repository implementation.
#[derive(Clone)]
pub struct MongoCarRepository {
    pub cars: Collection<Car>,
}

impl MongoCarRepository {
    pub fn new(store: &StoreHandle) -> Self {
        Self { cars: store.cars() }
    }
}

#[async_trait]
impl CarRepository for MongoCarRepository {
    async fn insert_one(&self, car: &Car) -> Result<(), ServiceError> {
        self.cars.insert_one(car).await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Car>, ServiceError> {
        let mut cursor = self.cars.find(CarFilter::all().into_document()).await?;
        let mut cars = Vec::new();
        // A single undecodable document fails the whole scan.
        while cursor.advance().await? {
            let car = cursor
                .deserialize_current()
                .map_err(|e| ServiceError::Decode(e.to_string()))?;
            cars.push(car);
        }
        Ok(cars)
    }

    async fn find_one_by_name(&self, name: &str) -> Result<Option<Car>, ServiceError> {
        Ok(self.cars.find_one(CarFilter::name_eq(name).into_document()).await?)
    }

    async fn update_one_by_name(&self, name: &str, car: &Car) -> Result<u64, ServiceError> {
        let res = self
            .cars
            .update_one(CarFilter::name_eq(name).into_document(), CarUpdate::set_all(car).into_document())
            .await?;
        Ok(res.matched_count)
    }

    async fn delete_one_by_name(&self, name: &str) -> Result<u64, ServiceError> {
        let res = self.cars.delete_one(CarFilter::name_eq(name).into_document()).await?;
        Ok(res.deleted_count)
    }
}

/// In-memory repositories for tests and local wiring without a database.
pub mod mock {
    use super::*;
    use tokio::sync::RwLock;

    /// Insertion-ordered store with the same first-match semantics as the real collection.
    #[derive(Default)]
    pub struct MemoryCarRepository {
        cars: RwLock<Vec<Car>>,
    }

    impl MemoryCarRepository {
        pub fn with_cars(cars: Vec<Car>) -> Self {
            Self { cars: RwLock::new(cars) }
        }

        pub async fn snapshot(&self) -> Vec<Car> {
            self.cars.read().await.clone()
        }
    }

    #[async_trait]
    impl CarRepository for MemoryCarRepository {
        async fn insert_one(&self, car: &Car) -> Result<(), ServiceError> {
            self.cars.write().await.push(car.clone());
            Ok(())
        }

        async fn find_all(&self) -> Result<Vec<Car>, ServiceError> {
            Ok(self.snapshot().await)
        }

        async fn find_one_by_name(&self, name: &str) -> Result<Option<Car>, ServiceError> {
            let cars = self.cars.read().await;
            Ok(cars.iter().find(|c| c.name == name).cloned())
        }

        async fn update_one_by_name(&self, name: &str, car: &Car) -> Result<u64, ServiceError> {
            let mut cars = self.cars.write().await;
            match cars.iter_mut().find(|c| c.name == name) {
                Some(existing) => {
                    existing.name = car.name.clone();
                    existing.model = car.model.clone();
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn delete_one_by_name(&self, name: &str) -> Result<u64, ServiceError> {
            let mut cars = self.cars.write().await;
            match cars.iter().position(|c| c.name == name) {
                Some(idx) => {
                    cars.remove(idx);
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    /// Which error a [`FailingCarRepository`] produces.
    #[derive(Clone, Copy, Debug)]
    pub enum Failure {
        Db,
        Decode,
    }

    /// Repository whose every operation fails; `Decode` only affects `find_all`.
    pub struct FailingCarRepository {
        pub failure: Failure,
    }

    impl FailingCarRepository {
        fn err(&self) -> ServiceError {
            ServiceError::Db("connection refused".into())
        }
    }

    #[async_trait]
    impl CarRepository for FailingCarRepository {
        async fn insert_one(&self, _car: &Car) -> Result<(), ServiceError> {
            Err(self.err())
        }

        async fn find_all(&self) -> Result<Vec<Car>, ServiceError> {
            match self.failure {
                Failure::Db => Err(self.err()),
                Failure::Decode => Err(ServiceError::Decode("invalid type: integer `2020`, expected a string".into())),
            }
        }

        async fn find_one_by_name(&self, _name: &str) -> Result<Option<Car>, ServiceError> {
            Err(self.err())
        }

        async fn update_one_by_name(&self, _name: &str, _car: &Car) -> Result<u64, ServiceError> {
            Err(self.err())
        }

        async fn delete_one_by_name(&self, _name: &str) -> Result<u64, ServiceError> {
            Err(self.err())
        }
    }
}

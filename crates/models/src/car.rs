//! The `Car` entity and the typed expressions used to query and patch it.
//!
//! Field names only appear in [`CarField::as_str`]; filters and updates are
//! assembled from the enum so a misspelled key cannot reach the store.

use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

/// A car record. `name` acts as the lookup key but is not enforced unique.
/// Absent fields decode as empty strings, both from request bodies and stored documents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: String,
}

impl Car {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self { name: name.into(), model: model.into() }
    }
}

/// Persisted fields of a [`Car`] document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CarField {
    Name,
    Model,
}

impl CarField {
    pub fn as_str(self) -> &'static str {
        match self {
            CarField::Name => "name",
            CarField::Model => "model",
        }
    }
}

/// Equality filter over car documents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarFilter {
    doc: Document,
}

impl CarFilter {
    /// Matches every document in the collection.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn name_eq(name: &str) -> Self {
        Self::all().and_eq(CarField::Name, name)
    }

    pub fn and_eq(mut self, field: CarField, value: &str) -> Self {
        self.doc.insert(field.as_str(), value);
        self
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}

impl From<CarFilter> for Document {
    fn from(filter: CarFilter) -> Self {
        filter.into_document()
    }
}

/// `$set` patch overwriting the listed fields of the first matched document.
#[derive(Clone, Debug, PartialEq)]
pub struct CarUpdate {
    set: Document,
}

impl CarUpdate {
    /// Overwrite both `name` and `model` with the values from `car`.
    pub fn set_all(car: &Car) -> Self {
        let mut set = Document::new();
        set.insert(CarField::Name.as_str(), car.name.as_str());
        set.insert(CarField::Model.as_str(), car.model.as_str());
        Self { set }
    }

    pub fn into_document(self) -> Document {
        doc! { "$set": self.set }
    }
}

impl From<CarUpdate> for Document {
    fn from(update: CarUpdate) -> Self {
        update.into_document()
    }
}

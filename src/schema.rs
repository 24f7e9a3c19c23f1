//! Canonical field schema for recognized shipping documents.
//!
//! Every recognized document carries the same seven fields. Five are
//! required and fall back to the [`SENTINEL`] when the model could not read
//! them; the two date fields are optional and default to an empty string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for a required field the model could not resolve.
pub const SENTINEL: &str = "-";

/// A canonical document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ProductName,
    Model,
    Specification,
    Manufacturer,
    ProductionDate,
    ShipmentDate,
    BatchNumber,
}

impl Field {
    /// All fields, in canonical order.
    pub const ALL: [Field; 7] = [
        Field::ProductName,
        Field::Model,
        Field::Specification,
        Field::Manufacturer,
        Field::ProductionDate,
        Field::ShipmentDate,
        Field::BatchNumber,
    ];

    /// Fields whose absence invalidates a strict-mode entry.
    pub const REQUIRED: [Field; 5] = [
        Field::ProductName,
        Field::Model,
        Field::Specification,
        Field::Manufacturer,
        Field::BatchNumber,
    ];

    /// Date fields; may be empty.
    pub const OPTIONAL: [Field; 2] = [Field::ProductionDate, Field::ShipmentDate];

    /// The canonical snake_case key used in model replies and serialization.
    pub fn key(self) -> &'static str {
        match self {
            Field::ProductName => "product_name",
            Field::Model => "model",
            Field::Specification => "specification",
            Field::Manufacturer => "manufacturer",
            Field::ProductionDate => "production_date",
            Field::ShipmentDate => "shipment_date",
            Field::BatchNumber => "batch_number",
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, Field::ProductionDate | Field::ShipmentDate)
    }

    /// `"-"` for required fields, `""` for optional ones.
    pub fn default_value(self) -> &'static str {
        if self.is_required() {
            SENTINEL
        } else {
            ""
        }
    }

    /// Look up a field by its canonical key.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Default value for `field`. See [`Field::default_value`].
pub fn default_for(field: Field) -> &'static str {
    field.default_value()
}

/// One recognized document.
///
/// Produced by [`interpret`](crate::pipeline::interpret); consumers only read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub product_name: String,
    pub model: String,
    pub specification: String,
    pub manufacturer: String,
    #[serde(default)]
    pub production_date: String,
    #[serde(default)]
    pub shipment_date: String,
    pub batch_number: String,
}

impl DocumentRecord {
    /// A record with every field at its default.
    pub fn defaults() -> Self {
        Self {
            product_name: SENTINEL.to_string(),
            model: SENTINEL.to_string(),
            specification: SENTINEL.to_string(),
            manufacturer: SENTINEL.to_string(),
            production_date: String::new(),
            shipment_date: String::new(),
            batch_number: SENTINEL.to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::ProductName => &self.product_name,
            Field::Model => &self.model,
            Field::Specification => &self.specification,
            Field::Manufacturer => &self.manufacturer,
            Field::ProductionDate => &self.production_date,
            Field::ShipmentDate => &self.shipment_date,
            Field::BatchNumber => &self.batch_number,
        }
    }

    pub(crate) fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::ProductName => &mut self.product_name,
            Field::Model => &mut self.model,
            Field::Specification => &mut self.specification,
            Field::Manufacturer => &mut self.manufacturer,
            Field::ProductionDate => &mut self.production_date,
            Field::ShipmentDate => &mut self.shipment_date,
            Field::BatchNumber => &mut self.batch_number,
        };
        *slot = value;
    }

    /// Required fields still holding the sentinel.
    pub fn unresolved(&self) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|f| self.get(*f) == SENTINEL)
            .collect()
    }
}

impl Default for DocumentRecord {
    fn default() -> Self {
        Self::defaults()
    }
}

use serde::{Deserialize, Serialize};
use skyport_shared::validation::{require_non_blank, require_positive};
use skyport_shared::ValidationError;
use uuid::Uuid;

/// A seat coordinate. Both axes are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Seat {
    pub row: i32,
    pub seat: i32,
}

impl Seat {
    pub fn new(row: i32, seat: i32) -> Self {
        Self { row, seat }
    }
}

/// An airplane and its cabin geometry. The valid seat space is
/// `[1..=rows] x [1..=seats_in_row]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airplane {
    pub id: Uuid,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    #[serde(rename = "airplane_type")]
    pub airplane_type_id: Uuid,
}

impl Airplane {
    /// Total number of sellable seats.
    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }

    /// Check that a requested seat lies inside this airplane's geometry.
    pub fn validate_seat(&self, row: i32, seat: i32) -> Result<(), ValidationError> {
        check_coordinate("row", row, self.rows)?;
        check_coordinate("seat", seat, self.seats_in_row)
    }
}

fn check_coordinate(field: &str, value: i32, upper: i32) -> Result<(), ValidationError> {
    if !(1..=upper).contains(&value) {
        return Err(ValidationError::new(
            field,
            format!("{} number must be in range [1, {}], got {}", field, upper, value),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirplane {
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    #[serde(rename = "airplane_type")]
    pub airplane_type_id: Uuid,
}

impl NewAirplane {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        require_positive("rows", self.rows)?;
        require_positive("seats_in_row", self.seats_in_row)
    }
}

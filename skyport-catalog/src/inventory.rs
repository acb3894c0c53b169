use std::collections::BTreeSet;

use crate::airplane::{Airplane, Seat};

/// Seat occupancy of one flight: its airplane's capacity plus every seat
/// already ticketed on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatInventory {
    capacity: i64,
    taken: BTreeSet<Seat>,
}

impl SeatInventory {
    pub fn new(airplane: &Airplane, taken: impl IntoIterator<Item = Seat>) -> Self {
        Self {
            capacity: airplane.capacity(),
            taken: taken.into_iter().collect(),
        }
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    pub fn booked(&self) -> i64 {
        self.taken.len() as i64
    }

    /// Capacity minus booked tickets, never negative.
    pub fn tickets_available(&self) -> i64 {
        (self.capacity - self.booked()).max(0)
    }

    /// Taken coordinates ordered by row, then seat.
    pub fn taken_places(&self) -> Vec<Seat> {
        self.taken.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn airplane(rows: i32, seats_in_row: i32) -> Airplane {
        Airplane {
            id: Uuid::new_v4(),
            name: "Test Jet".to_string(),
            rows,
            seats_in_row,
            airplane_type_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_inventory_counts() {
        let inventory = SeatInventory::new(&airplane(5, 5), vec![Seat::new(1, 1), Seat::new(3, 2)]);

        assert_eq!(inventory.capacity(), 25);
        assert_eq!(inventory.booked(), 2);
        assert_eq!(inventory.tickets_available(), 23);
    }

    #[test]
    fn test_taken_places_sorted() {
        let inventory = SeatInventory::new(
            &airplane(10, 6),
            vec![Seat::new(4, 1), Seat::new(1, 6), Seat::new(1, 2)],
        );
        assert_eq!(
            inventory.taken_places(),
            vec![Seat::new(1, 2), Seat::new(1, 6), Seat::new(4, 1)]
        );
    }

    #[test]
    fn test_empty_flight() {
        let inventory = SeatInventory::new(&airplane(2, 2), Vec::new());
        assert_eq!(inventory.tickets_available(), 4);
        assert!(inventory.taken_places().is_empty());
    }
}

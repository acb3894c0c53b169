use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skyport_catalog::Seat;
use skyport_shared::ValidationError;
use uuid::Uuid;

/// A customer's purchase. Owns its tickets; deleting an order deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Fields the caller supplies when opening an order. `created_at` is assigned
/// by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: Uuid,
}

/// A single seat reservation on one flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    #[serde(rename = "order")]
    pub order_id: Uuid,
    #[serde(rename = "flight")]
    pub flight_id: Uuid,
    pub row: i32,
    pub seat: i32,
}

impl Ticket {
    pub fn seat(&self) -> Seat {
        Seat::new(self.row, self.seat)
    }
}

/// An order together with the tickets written in the same transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order: Order,
    pub tickets: Vec<Ticket>,
}

// ============================================================================
// Inbound request
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TicketRequest {
    pub row: i32,
    pub seat: i32,
    #[serde(rename = "flight")]
    pub flight_id: Uuid,
}

impl TicketRequest {
    pub fn seat(&self) -> Seat {
        Seat::new(self.row, self.seat)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub tickets: Vec<TicketRequest>,
}

impl CreateOrderRequest {
    /// Checks that need no store access: at least one ticket, and no seat
    /// requested twice within the same order.
    pub fn validate_shape(&self) -> Result<(), ValidationError> {
        if self.tickets.is_empty() {
            return Err(ValidationError::new("tickets", "must not be empty"));
        }

        let mut seen = HashSet::with_capacity(self.tickets.len());
        for ticket in &self.tickets {
            if !seen.insert((ticket.flight_id, ticket.seat())) {
                return Err(ValidationError::new(
                    "tickets",
                    format!(
                        "seat (row {}, seat {}) on flight {} is requested more than once",
                        ticket.row, ticket.seat, ticket.flight_id
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Distinct flights referenced by the request, in first-seen order.
    pub fn flight_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::new();
        for ticket in &self.tickets {
            if !ids.contains(&ticket.flight_id) {
                ids.push(ticket.flight_id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(flight_id: Uuid, row: i32, seat: i32) -> TicketRequest {
        TicketRequest { row, seat, flight_id }
    }

    #[test]
    fn test_empty_order_rejected() {
        let req = CreateOrderRequest { tickets: vec![] };
        let err = req.validate_shape().unwrap_err();
        assert_eq!(err.field, "tickets");
        assert_eq!(err.message, "must not be empty");
    }

    #[test]
    fn test_duplicate_seat_in_request_rejected() {
        let flight = Uuid::new_v4();
        let req = CreateOrderRequest {
            tickets: vec![ticket(flight, 3, 2), ticket(flight, 3, 2)],
        };
        assert_eq!(req.validate_shape().unwrap_err().field, "tickets");
    }

    #[test]
    fn test_same_seat_on_different_flights_allowed() {
        let req = CreateOrderRequest {
            tickets: vec![ticket(Uuid::new_v4(), 3, 2), ticket(Uuid::new_v4(), 3, 2)],
        };
        assert!(req.validate_shape().is_ok());
        assert_eq!(req.flight_ids().len(), 2);
    }

    #[test]
    fn test_request_deserialization() {
        let flight = Uuid::new_v4();
        let json = format!(
            r#"{{"tickets": [{{"row": 1, "seat": 4, "flight": "{0}"}}, {{"row": 2, "seat": 4, "flight": "{0}"}}]}}"#,
            flight
        );
        let req: CreateOrderRequest = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(req.tickets.len(), 2);
        assert_eq!(req.tickets[1].seat(), Seat::new(2, 4));
        assert_eq!(req.flight_ids(), vec![flight]);
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use skyport_catalog::Airplane;
use skyport_order::{CreateOrderRequest, NewOrder, PlacedOrder, TicketRequest};
use tracing::{info, warn};
use uuid::Uuid;

use crate::repository::{BookingStore, BookingTransaction};
use crate::{CoreError, CoreResult};

/// Places an order and all of its tickets as one unit.
///
/// The request shape is checked before the store is touched. Every seat is
/// checked against its flight's airplane before the first write. Any error
/// after `begin` drops the transaction, which discards the order and every
/// ticket written so far.
#[derive(Clone)]
pub struct OrderPlacement {
    store: Arc<dyn BookingStore>,
}

impl OrderPlacement {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub async fn place(&self, user_id: Uuid, request: &CreateOrderRequest) -> CoreResult<PlacedOrder> {
        if let Err(e) = request.validate_shape() {
            warn!(%user_id, error = %e, "Order request rejected");
            return Err(e.into());
        }

        let mut tx = self.store.begin().await?;

        let written = Self::write(tx.as_mut(), user_id, request).await;
        match written {
            Ok(placed) => {
                tx.commit().await?;
                info!(
                    order_id = %placed.order.id,
                    %user_id,
                    tickets = placed.tickets.len(),
                    "Order placed"
                );
                Ok(placed)
            }
            Err(e) => {
                warn!(%user_id, error = %e, "Order placement rolled back");
                Err(e)
            }
        }
    }

    async fn write(
        tx: &mut dyn BookingTransaction,
        user_id: Uuid,
        request: &CreateOrderRequest,
    ) -> CoreResult<PlacedOrder> {
        let mut airplanes: HashMap<Uuid, Airplane> = HashMap::new();
        for flight_id in request.flight_ids() {
            let flight = tx.get_flight(flight_id).await?;
            let airplane = tx.get_airplane(flight.airplane_id).await?;
            airplanes.insert(flight_id, airplane);
        }

        validate_seats(&request.tickets, &airplanes)?;

        let order = tx.create_order(NewOrder { user_id }).await?;
        let mut tickets = Vec::with_capacity(request.tickets.len());
        for ticket in &request.tickets {
            tickets.push(tx.create_ticket(order.id, ticket).await?);
        }

        Ok(PlacedOrder { order, tickets })
    }
}

/// Every ticket must name a loaded flight and a seat inside its airplane.
fn validate_seats(tickets: &[TicketRequest], airplanes: &HashMap<Uuid, Airplane>) -> CoreResult<()> {
    for ticket in tickets {
        let airplane = airplanes
            .get(&ticket.flight_id)
            .ok_or_else(|| CoreError::not_found("Flight", ticket.flight_id))?;
        airplane.validate_seat(ticket.row, ticket.seat)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use skyport_catalog::{
        NewAirplane, NewAirplaneType, NewAirport, NewCity, NewCountry, NewFlight, NewRoute, Seat,
    };
    use crate::memory::InMemoryStore;
    use crate::repository::{CatalogRepository, OrderRepository};

    async fn seed_flight(store: &InMemoryStore, rows: i32, seats_in_row: i32) -> Uuid {
        let country = store
            .create_country(&NewCountry { name: "Ukraine".to_string() })
            .await
            .unwrap();
        let city = store
            .create_city(&NewCity {
                name: "Kyiv".to_string(),
                country_id: country.id,
            })
            .await
            .unwrap();
        let source = store
            .create_airport(&NewAirport {
                name: "Boryspil".to_string(),
                closest_big_city_id: city.id,
            })
            .await
            .unwrap();
        let destination = store
            .create_airport(&NewAirport {
                name: "Zhuliany".to_string(),
                closest_big_city_id: city.id,
            })
            .await
            .unwrap();
        let route = store
            .create_route(&NewRoute {
                source_id: source.id,
                destination_id: destination.id,
                distance: 30,
            })
            .await
            .unwrap();
        let airplane_type = store
            .create_airplane_type(&NewAirplaneType { name: "Regional".to_string() })
            .await
            .unwrap();
        let airplane = store
            .create_airplane(&NewAirplane {
                name: "ATR 72".to_string(),
                rows,
                seats_in_row,
                airplane_type_id: airplane_type.id,
            })
            .await
            .unwrap();
        let departure = Utc.with_ymd_and_hms(2024, 12, 25, 10, 0, 0).unwrap();
        store
            .create_flight(&NewFlight {
                route_id: route.id,
                airplane_id: airplane.id,
                departure_time: departure,
                arrival_time: departure + chrono::Duration::hours(1),
                crew_ids: vec![],
            })
            .await
            .unwrap()
            .id
    }

    fn request(seats: &[(Uuid, i32, i32)]) -> CreateOrderRequest {
        CreateOrderRequest {
            tickets: seats
                .iter()
                .map(|&(flight_id, row, seat)| TicketRequest { row, seat, flight_id })
                .collect(),
        }
    }

    fn setup() -> (InMemoryStore, OrderPlacement) {
        let store = InMemoryStore::new();
        let placement = OrderPlacement::new(Arc::new(store.clone()));
        (store, placement)
    }

    #[tokio::test]
    async fn test_row_outside_geometry_rejected() {
        let (store, placement) = setup();
        let flight = seed_flight(&store, 10, 6).await;
        let user = Uuid::new_v4();

        let err = placement.place(user, &request(&[(flight, 11, 1)])).await.unwrap_err();
        match err {
            CoreError::Validation(e) => assert_eq!(e.field, "row"),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(store.list_orders(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_order_rejected_before_storage() {
        let (store, placement) = setup();
        store.fail_after_tickets(0);

        let err = placement.place(Uuid::new_v4(), &request(&[])).await.unwrap_err();
        match err {
            CoreError::Validation(e) => {
                assert_eq!(e.field, "tickets");
                assert_eq!(e.message, "must not be empty");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_two_tickets_reduce_availability() {
        let (store, placement) = setup();
        let flight = seed_flight(&store, 5, 5).await;
        let user = Uuid::new_v4();
        let before = store.get_flight(flight).await.unwrap().inventory().tickets_available();

        let placed = placement
            .place(user, &request(&[(flight, 1, 1), (flight, 2, 3)]))
            .await
            .unwrap();
        assert_eq!(placed.tickets.len(), 2);
        assert!(placed.tickets.iter().all(|t| t.order_id == placed.order.id));

        let orders = store.list_orders(user).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].tickets.len(), 2);

        let after = store.get_flight(flight).await.unwrap().inventory().tickets_available();
        assert_eq!(before, 25);
        assert_eq!(after, before - 2);
    }

    #[tokio::test]
    async fn test_invalid_seat_aborts_whole_order() {
        let (store, placement) = setup();
        let flight = seed_flight(&store, 5, 5).await;
        let user = Uuid::new_v4();

        let err = placement
            .place(user, &request(&[(flight, 1, 1), (flight, 2, 6)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ref e) if e.field == "seat"));
        assert!(store.get_flight(flight).await.unwrap().taken.is_empty());
        assert!(store.list_orders(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_flight_is_not_found() {
        let (_store, placement) = setup();
        let err = placement
            .place(Uuid::new_v4(), &request(&[(Uuid::new_v4(), 1, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "Flight", .. }));
    }

    #[test]
    fn test_seat_without_loaded_airplane_is_not_found() {
        let flight_id = Uuid::new_v4();
        let tickets = vec![TicketRequest { row: 1, seat: 1, flight_id }];

        let err = validate_seats(&tickets, &HashMap::new()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "Flight", ref id } if *id == flight_id.to_string()));
    }

    #[tokio::test]
    async fn test_failure_after_k_tickets_leaves_nothing() {
        let (store, placement) = setup();
        let flight = seed_flight(&store, 5, 5).await;
        let user = Uuid::new_v4();
        let seats = [(flight, 1, 1), (flight, 1, 2), (flight, 1, 3), (flight, 1, 4)];

        for k in 0..seats.len() {
            store.fail_after_tickets(k);
            let err = placement.place(user, &request(&seats)).await.unwrap_err();
            assert!(matches!(err, CoreError::Storage(_)), "k = {}", k);
            assert!(store.list_orders(user).await.unwrap().is_empty(), "k = {}", k);
            assert!(store.get_flight(flight).await.unwrap().taken.is_empty(), "k = {}", k);
        }

        store.clear_faults();
        placement.place(user, &request(&seats)).await.unwrap();
        assert_eq!(store.get_flight(flight).await.unwrap().taken.len(), 4);
    }

    #[tokio::test]
    async fn test_seat_already_booked_is_conflict() {
        let (store, placement) = setup();
        let flight = seed_flight(&store, 5, 5).await;

        placement
            .place(Uuid::new_v4(), &request(&[(flight, 3, 2)]))
            .await
            .unwrap();
        let second = Uuid::new_v4();
        let err = placement
            .place(second, &request(&[(flight, 4, 4), (flight, 3, 2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert!(store.list_orders(second).await.unwrap().is_empty());
        assert_eq!(
            store.get_flight(flight).await.unwrap().taken,
            vec![Seat::new(3, 2)]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bookings_of_same_seat() {
        let (store, placement) = setup();
        let flight = seed_flight(&store, 5, 5).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let placement = placement.clone();
            handles.push(tokio::spawn(async move {
                placement
                    .place(Uuid::new_v4(), &request(&[(flight, 3, 2)]))
                    .await
            }));
        }

        let mut won = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(CoreError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(won, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.get_flight(flight).await.unwrap().taken.len(), 1);
    }
}

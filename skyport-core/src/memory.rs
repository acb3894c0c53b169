//! In-process store backing every repository trait. Used by the test suites
//! and by `storage.backend = "memory"` local runs.
//!
//! A booking transaction holds the store lock from `begin` until it is
//! committed or dropped, so concurrent writers are serialized and a seat can
//! only be claimed once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use skyport_catalog::{
    Airplane, AirplaneType, Airport, City, Country, Crew, Flight, NewAirplane, NewAirplaneType,
    NewAirport, NewCity, NewCountry, NewCrew, NewFlight, NewRoute, Route, Seat,
};
use skyport_order::{NewOrder, Order, Ticket, TicketRequest};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::identity::{StoredUser, User, UserUpdate};
use crate::records::{
    AirplaneRecord, AirportRecord, CityRecord, FlightRecord, OrderRecord, RouteRecord,
    TicketRecord,
};
use crate::repository::{
    BookingStore, BookingTransaction, CatalogRepository, OrderRepository, UserRepository,
};
use crate::{CoreError, CoreResult};

const NO_FAULT: usize = usize::MAX;

#[derive(Debug, Default)]
struct State {
    crews: Vec<Crew>,
    countries: Vec<Country>,
    cities: Vec<City>,
    airports: Vec<Airport>,
    routes: Vec<Route>,
    airplane_types: Vec<AirplaneType>,
    airplanes: Vec<Airplane>,
    flights: Vec<Flight>,
    orders: Vec<Order>,
    tickets: Vec<Ticket>,
    users: Vec<StoredUser>,
}

impl State {
    fn country(&self, id: Uuid) -> CoreResult<&Country> {
        self.countries
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::not_found("Country", id))
    }

    fn city(&self, id: Uuid) -> CoreResult<&City> {
        self.cities
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::not_found("City", id))
    }

    fn airport(&self, id: Uuid) -> CoreResult<&Airport> {
        self.airports
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| CoreError::not_found("Airport", id))
    }

    fn route(&self, id: Uuid) -> CoreResult<&Route> {
        self.routes
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| CoreError::not_found("Route", id))
    }

    fn airplane_type(&self, id: Uuid) -> CoreResult<&AirplaneType> {
        self.airplane_types
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found("AirplaneType", id))
    }

    fn airplane(&self, id: Uuid) -> CoreResult<&Airplane> {
        self.airplanes
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| CoreError::not_found("Airplane", id))
    }

    fn crew(&self, id: Uuid) -> CoreResult<&Crew> {
        self.crews
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::not_found("Crew", id))
    }

    fn flight(&self, id: Uuid) -> CoreResult<&Flight> {
        self.flights
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| CoreError::not_found("Flight", id))
    }

    fn user(&self, id: Uuid) -> CoreResult<&StoredUser> {
        self.users
            .iter()
            .find(|u| u.user.id == id)
            .ok_or_else(|| CoreError::not_found("User", id))
    }

    fn route_record(&self, route: &Route) -> CoreResult<RouteRecord> {
        Ok(RouteRecord {
            route: route.clone(),
            source: self.airport(route.source_id)?.clone(),
            destination: self.airport(route.destination_id)?.clone(),
        })
    }

    fn airplane_record(&self, airplane: &Airplane) -> CoreResult<AirplaneRecord> {
        Ok(AirplaneRecord {
            airplane: airplane.clone(),
            airplane_type: self.airplane_type(airplane.airplane_type_id)?.clone(),
        })
    }

    fn flight_record(&self, flight: &Flight) -> CoreResult<FlightRecord> {
        let crew = flight
            .crew_ids
            .iter()
            .map(|id| self.crew(*id).cloned())
            .collect::<CoreResult<Vec<_>>>()?;
        let taken = self
            .tickets
            .iter()
            .filter(|t| t.flight_id == flight.id)
            .map(Ticket::seat)
            .collect();

        Ok(FlightRecord {
            flight: flight.clone(),
            route: self.route_record(self.route(flight.route_id)?)?,
            airplane: self.airplane_record(self.airplane(flight.airplane_id)?)?,
            crew,
            taken,
        })
    }

    fn order_record(&self, order: &Order) -> CoreResult<OrderRecord> {
        let tickets = self
            .tickets
            .iter()
            .filter(|t| t.order_id == order.id)
            .map(|t| {
                Ok(TicketRecord {
                    ticket: t.clone(),
                    flight: self.flight_record(self.flight(t.flight_id)?)?,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(OrderRecord {
            order: order.clone(),
            tickets,
        })
    }

    fn seat_taken(&self, flight_id: Uuid, seat: Seat) -> bool {
        self.tickets
            .iter()
            .any(|t| t.flight_id == flight_id && t.seat() == seat)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    fail_after_tickets: Arc<AtomicUsize>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            fail_after_tickets: Arc::new(AtomicUsize::new(NO_FAULT)),
        }
    }

    /// Makes every subsequent booking transaction fail with a storage error
    /// once it has written `count` tickets. Test hook for rollback behavior.
    pub fn fail_after_tickets(&self, count: usize) {
        self.fail_after_tickets.store(count, Ordering::SeqCst);
    }

    pub fn clear_faults(&self) {
        self.fail_after_tickets.store(NO_FAULT, Ordering::SeqCst);
    }
}

struct MemoryTransaction {
    state: OwnedMutexGuard<State>,
    orders: Vec<Order>,
    tickets: Vec<Ticket>,
    fail_after: usize,
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn begin(&self) -> CoreResult<Box<dyn BookingTransaction>> {
        let state = self.state.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            state,
            orders: Vec::new(),
            tickets: Vec::new(),
            fail_after: self.fail_after_tickets.load(Ordering::SeqCst),
        }))
    }
}

#[async_trait]
impl BookingTransaction for MemoryTransaction {
    async fn get_flight(&mut self, id: Uuid) -> CoreResult<Flight> {
        self.state.flight(id).cloned()
    }

    async fn get_airplane(&mut self, id: Uuid) -> CoreResult<Airplane> {
        self.state.airplane(id).cloned()
    }

    async fn create_order(&mut self, order: NewOrder) -> CoreResult<Order> {
        let order = Order::new(order.user_id);
        self.orders.push(order.clone());
        Ok(order)
    }

    async fn create_ticket(&mut self, order_id: Uuid, ticket: &TicketRequest) -> CoreResult<Ticket> {
        if self.tickets.len() >= self.fail_after {
            return Err(CoreError::Storage(format!(
                "injected failure after {} tickets",
                self.tickets.len()
            )));
        }
        if !self.orders.iter().any(|o| o.id == order_id) {
            return Err(CoreError::not_found("Order", order_id));
        }
        self.state.flight(ticket.flight_id)?;

        let seat = ticket.seat();
        let staged = self
            .tickets
            .iter()
            .any(|t| t.flight_id == ticket.flight_id && t.seat() == seat);
        if staged || self.state.seat_taken(ticket.flight_id, seat) {
            return Err(CoreError::Conflict(format!(
                "seat (row {}, seat {}) on flight {} is already booked",
                seat.row, seat.seat, ticket.flight_id
            )));
        }

        let created = Ticket {
            id: Uuid::new_v4(),
            order_id,
            flight_id: ticket.flight_id,
            row: ticket.row,
            seat: ticket.seat,
        };
        self.tickets.push(created.clone());
        Ok(created)
    }

    async fn commit(self: Box<Self>) -> CoreResult<()> {
        let MemoryTransaction {
            mut state,
            orders,
            tickets,
            ..
        } = *self;
        state.orders.extend(orders);
        state.tickets.extend(tickets);
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn create_crew(&self, crew: &NewCrew) -> CoreResult<Crew> {
        let created = Crew {
            id: Uuid::new_v4(),
            first_name: crew.first_name.trim().to_string(),
            last_name: crew.last_name.trim().to_string(),
        };
        self.state.lock().await.crews.push(created.clone());
        Ok(created)
    }

    async fn list_crews(&self) -> CoreResult<Vec<Crew>> {
        Ok(self.state.lock().await.crews.clone())
    }

    async fn create_country(&self, country: &NewCountry) -> CoreResult<Country> {
        let mut state = self.state.lock().await;
        let name = country.name.trim();
        let key = name.to_lowercase();
        if state.countries.iter().any(|c| c.name.to_lowercase() == key) {
            return Err(CoreError::Conflict(format!("country '{}' already exists", name)));
        }
        let created = Country {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        state.countries.push(created.clone());
        Ok(created)
    }

    async fn list_countries(&self) -> CoreResult<Vec<Country>> {
        Ok(self.state.lock().await.countries.clone())
    }

    async fn create_city(&self, city: &NewCity) -> CoreResult<City> {
        let mut state = self.state.lock().await;
        state.country(city.country_id)?;
        let created = City {
            id: Uuid::new_v4(),
            name: city.name.trim().to_string(),
            country_id: city.country_id,
        };
        state.cities.push(created.clone());
        Ok(created)
    }

    async fn list_cities(&self) -> CoreResult<Vec<CityRecord>> {
        let state = self.state.lock().await;
        state
            .cities
            .iter()
            .map(|city| {
                Ok(CityRecord {
                    city: city.clone(),
                    country: state.country(city.country_id)?.clone(),
                })
            })
            .collect()
    }

    async fn create_airport(&self, airport: &NewAirport) -> CoreResult<Airport> {
        let mut state = self.state.lock().await;
        state.city(airport.closest_big_city_id)?;
        let created = Airport {
            id: Uuid::new_v4(),
            name: airport.name.trim().to_string(),
            closest_big_city_id: airport.closest_big_city_id,
        };
        state.airports.push(created.clone());
        Ok(created)
    }

    async fn list_airports(&self) -> CoreResult<Vec<AirportRecord>> {
        let state = self.state.lock().await;
        state
            .airports
            .iter()
            .map(|airport| {
                Ok(AirportRecord {
                    airport: airport.clone(),
                    city: state.city(airport.closest_big_city_id)?.clone(),
                })
            })
            .collect()
    }

    async fn create_route(&self, route: &NewRoute) -> CoreResult<Route> {
        let mut state = self.state.lock().await;
        state.airport(route.source_id)?;
        state.airport(route.destination_id)?;
        let created = Route {
            id: Uuid::new_v4(),
            source_id: route.source_id,
            destination_id: route.destination_id,
            distance: route.distance,
        };
        state.routes.push(created.clone());
        Ok(created)
    }

    async fn list_routes(&self) -> CoreResult<Vec<RouteRecord>> {
        let state = self.state.lock().await;
        state.routes.iter().map(|r| state.route_record(r)).collect()
    }

    async fn create_airplane_type(&self, airplane_type: &NewAirplaneType) -> CoreResult<AirplaneType> {
        let mut state = self.state.lock().await;
        let name = airplane_type.name.trim();
        let key = name.to_lowercase();
        if state
            .airplane_types
            .iter()
            .any(|t| t.name.to_lowercase() == key)
        {
            return Err(CoreError::Conflict(format!(
                "airplane type '{}' already exists",
                name
            )));
        }
        let created = AirplaneType {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        state.airplane_types.push(created.clone());
        Ok(created)
    }

    async fn list_airplane_types(&self) -> CoreResult<Vec<AirplaneType>> {
        Ok(self.state.lock().await.airplane_types.clone())
    }

    async fn create_airplane(&self, airplane: &NewAirplane) -> CoreResult<Airplane> {
        let mut state = self.state.lock().await;
        state.airplane_type(airplane.airplane_type_id)?;
        let created = Airplane {
            id: Uuid::new_v4(),
            name: airplane.name.trim().to_string(),
            rows: airplane.rows,
            seats_in_row: airplane.seats_in_row,
            airplane_type_id: airplane.airplane_type_id,
        };
        state.airplanes.push(created.clone());
        Ok(created)
    }

    async fn list_airplanes(&self) -> CoreResult<Vec<AirplaneRecord>> {
        let state = self.state.lock().await;
        state
            .airplanes
            .iter()
            .map(|a| state.airplane_record(a))
            .collect()
    }

    async fn create_flight(&self, flight: &NewFlight) -> CoreResult<Flight> {
        let mut state = self.state.lock().await;
        state.route(flight.route_id)?;
        state.airplane(flight.airplane_id)?;
        let crew_ids = flight.distinct_crew();
        for id in &crew_ids {
            state.crew(*id)?;
        }
        let created = Flight {
            id: Uuid::new_v4(),
            route_id: flight.route_id,
            airplane_id: flight.airplane_id,
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
            crew_ids,
        };
        state.flights.push(created.clone());
        Ok(created)
    }

    async fn list_flights(&self) -> CoreResult<Vec<FlightRecord>> {
        let state = self.state.lock().await;
        state.flights.iter().map(|f| state.flight_record(f)).collect()
    }

    async fn get_flight(&self, id: Uuid) -> CoreResult<FlightRecord> {
        let state = self.state.lock().await;
        state.flight_record(state.flight(id)?)
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn list_orders(&self, user_id: Uuid) -> CoreResult<Vec<OrderRecord>> {
        let state = self.state.lock().await;
        state
            .orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .map(|o| state.order_record(o))
            .collect()
    }

    async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> CoreResult<OrderRecord> {
        let state = self.state.lock().await;
        let order = state
            .orders
            .iter()
            .find(|o| o.id == order_id && o.user_id == user_id)
            .ok_or_else(|| CoreError::not_found("Order", order_id))?;
        state.order_record(order)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        is_staff: bool,
    ) -> CoreResult<User> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.user.email == email) {
            return Err(CoreError::Conflict(format!(
                "user with email '{}' already exists",
                email
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            is_staff,
            created_at: Utc::now(),
        };
        state.users.push(StoredUser {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<StoredUser>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.user.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> CoreResult<User> {
        let state = self.state.lock().await;
        Ok(state.user(id)?.user.clone())
    }

    async fn update_user(&self, id: Uuid, update: &UserUpdate) -> CoreResult<User> {
        let mut state = self.state.lock().await;
        let stored = state
            .users
            .iter_mut()
            .find(|u| u.user.id == id)
            .ok_or_else(|| CoreError::not_found("User", id))?;
        if let Some(first_name) = &update.first_name {
            stored.user.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            stored.user.last_name = last_name.clone();
        }
        if let Some(hash) = &update.password_hash {
            stored.password_hash = hash.clone();
        }
        Ok(stored.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();
        {
            let mut tx = store.begin().await.unwrap();
            tx.create_order(NewOrder { user_id: user }).await.unwrap();
        }
        assert!(store.list_orders(user).await.unwrap().is_empty());

        let mut tx = store.begin().await.unwrap();
        tx.create_order(NewOrder { user_id: user }).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.list_orders(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_referential_checks() {
        let store = InMemoryStore::new();
        let err = store
            .create_city(&NewCity {
                name: "Kyiv".to_string(),
                country_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "Country", .. }));

        let mut tx = store.begin().await.unwrap();
        let err = tx.get_flight(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "Flight", .. }));
    }

    #[tokio::test]
    async fn test_unique_names_and_emails() {
        let store = InMemoryStore::new();
        store
            .create_country(&NewCountry { name: "Ukraine".to_string() })
            .await
            .unwrap();
        let err = store
            .create_country(&NewCountry { name: "ukraine".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        store
            .create_airplane_type(&NewAirplaneType { name: "Écureuil".to_string() })
            .await
            .unwrap();
        let err = store
            .create_airplane_type(&NewAirplaneType { name: "ÉCUREUIL".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        store
            .create_user("a@example.com", "hash", "A", "B", false)
            .await
            .unwrap();
        let err = store
            .create_user("a@example.com", "hash", "C", "D", false)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_user_partial() {
        let store = InMemoryStore::new();
        let user = store
            .create_user("pilot@example.com", "old", "Amelia", "Earhart", false)
            .await
            .unwrap();
        let updated = store
            .update_user(
                user.id,
                &UserUpdate {
                    last_name: Some("Putnam".to_string()),
                    password_hash: Some("new".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Amelia");
        assert_eq!(updated.last_name, "Putnam");

        let stored = store.find_by_email("pilot@example.com").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new");
    }
}

use async_trait::async_trait;
use skyport_catalog::{
    Airplane, AirplaneType, Airport, City, Country, Crew, Flight, NewAirplane, NewAirplaneType,
    NewAirport, NewCity, NewCountry, NewCrew, NewFlight, NewRoute, Route,
};
use skyport_order::{NewOrder, Order, Ticket, TicketRequest};
use uuid::Uuid;

use crate::identity::{StoredUser, User, UserUpdate};
use crate::records::{
    AirplaneRecord, AirportRecord, CityRecord, FlightRecord, OrderRecord, RouteRecord,
};
use crate::CoreResult;

/// Entry point for the order write path. Every booking runs inside one
/// transaction obtained from [`BookingStore::begin`].
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn begin(&self) -> CoreResult<Box<dyn BookingTransaction>>;
}

/// A scoped unit of work. Writes become visible only after [`commit`];
/// dropping the handle without committing discards all of them.
///
/// Implementations must reject a ticket whose (flight, row, seat) is already
/// taken with [`CoreError::Conflict`](crate::CoreError::Conflict), including
/// when a concurrent transaction booked it first.
///
/// [`commit`]: BookingTransaction::commit
#[async_trait]
pub trait BookingTransaction: Send {
    async fn get_flight(&mut self, id: Uuid) -> CoreResult<Flight>;

    async fn get_airplane(&mut self, id: Uuid) -> CoreResult<Airplane>;

    async fn create_order(&mut self, order: NewOrder) -> CoreResult<Order>;

    async fn create_ticket(&mut self, order_id: Uuid, ticket: &TicketRequest) -> CoreResult<Ticket>;

    async fn commit(self: Box<Self>) -> CoreResult<()>;
}

/// Reference data and flight scheduling.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_crew(&self, crew: &NewCrew) -> CoreResult<Crew>;
    async fn list_crews(&self) -> CoreResult<Vec<Crew>>;

    async fn create_country(&self, country: &NewCountry) -> CoreResult<Country>;
    async fn list_countries(&self) -> CoreResult<Vec<Country>>;

    async fn create_city(&self, city: &NewCity) -> CoreResult<City>;
    async fn list_cities(&self) -> CoreResult<Vec<CityRecord>>;

    async fn create_airport(&self, airport: &NewAirport) -> CoreResult<Airport>;
    async fn list_airports(&self) -> CoreResult<Vec<AirportRecord>>;

    async fn create_route(&self, route: &NewRoute) -> CoreResult<Route>;
    async fn list_routes(&self) -> CoreResult<Vec<RouteRecord>>;

    async fn create_airplane_type(&self, airplane_type: &NewAirplaneType) -> CoreResult<AirplaneType>;
    async fn list_airplane_types(&self) -> CoreResult<Vec<AirplaneType>>;

    async fn create_airplane(&self, airplane: &NewAirplane) -> CoreResult<Airplane>;
    async fn list_airplanes(&self) -> CoreResult<Vec<AirplaneRecord>>;

    async fn create_flight(&self, flight: &NewFlight) -> CoreResult<Flight>;
    async fn list_flights(&self) -> CoreResult<Vec<FlightRecord>>;
    async fn get_flight(&self, id: Uuid) -> CoreResult<FlightRecord>;
}

/// Read access to placed orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Orders of one user, newest first.
    async fn list_orders(&self, user_id: Uuid) -> CoreResult<Vec<OrderRecord>>;

    async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> CoreResult<OrderRecord>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        is_staff: bool,
    ) -> CoreResult<User>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<StoredUser>>;

    async fn get_user(&self, id: Uuid) -> CoreResult<User>;

    async fn update_user(&self, id: Uuid, update: &UserUpdate) -> CoreResult<User>;
}

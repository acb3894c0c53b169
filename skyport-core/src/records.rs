//! Read-side aggregates: an entity joined with the records it references, as
//! loaded by a repository and consumed by the projections.

use skyport_catalog::{
    Airplane, AirplaneType, Airport, City, Country, Crew, Flight, Route, Seat, SeatInventory,
};
use skyport_order::{Order, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityRecord {
    pub city: City,
    pub country: Country,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportRecord {
    pub airport: Airport,
    pub city: City,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirplaneRecord {
    pub airplane: Airplane,
    pub airplane_type: AirplaneType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub route: Route,
    pub source: Airport,
    pub destination: Airport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightRecord {
    pub flight: Flight,
    pub route: RouteRecord,
    pub airplane: AirplaneRecord,
    pub crew: Vec<Crew>,
    /// Seats ticketed on this flight across all orders.
    pub taken: Vec<Seat>,
}

impl FlightRecord {
    pub fn inventory(&self) -> SeatInventory {
        SeatInventory::new(&self.airplane.airplane, self.taken.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRecord {
    pub ticket: Ticket,
    pub flight: FlightRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub order: Order,
    pub tickets: Vec<TicketRecord>,
}

//! Outbound shaping of stored records.
//!
//! List views reference related records by their human-readable label and
//! carry derived counters. Detail views expand every relation in full.

use chrono::{DateTime, Utc};
use serde::Serialize;
use skyport_catalog::{Crew, Seat};
use skyport_order::{PlacedOrder, Ticket};
use uuid::Uuid;

use crate::records::{
    AirplaneRecord, AirportRecord, CityRecord, FlightRecord, OrderRecord, RouteRecord,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityView {
    pub id: Uuid,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirportView {
    pub id: Uuid,
    pub name: String,
    pub closest_big_city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirplaneView {
    pub id: Uuid,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub airplane_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    pub source: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteView {
    pub id: Uuid,
    pub source: String,
    pub destination: String,
    pub distance: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewView {
    pub id: Uuid,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightListView {
    pub id: Uuid,
    pub route: RouteSummary,
    pub airplane: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub tickets_available: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightDetailView {
    pub id: Uuid,
    pub route: RouteView,
    pub airplane: AirplaneView,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub crew: Vec<CrewView>,
    pub taken_places: Vec<Seat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketListView {
    pub id: Uuid,
    pub row: i32,
    pub seat: i32,
    pub flight: FlightListView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderListView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub tickets: Vec<TicketListView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketView {
    pub id: Uuid,
    pub row: i32,
    pub seat: i32,
    pub flight: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub tickets: Vec<TicketView>,
}

/// Shapes routes, flights and orders for one output context.
pub trait Projector {
    type Route: Serialize;
    type Flight: Serialize;
    type Order: Serialize;

    fn route(&self, record: &RouteRecord) -> Self::Route;
    fn flight(&self, record: &FlightRecord) -> Self::Flight;
    fn order(&self, record: &OrderRecord) -> Self::Order;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListProjector;

#[derive(Debug, Clone, Copy, Default)]
pub struct DetailProjector;

impl Projector for ListProjector {
    type Route = RouteSummary;
    type Flight = FlightListView;
    type Order = OrderListView;

    fn route(&self, record: &RouteRecord) -> RouteSummary {
        RouteSummary {
            source: record.source.name.clone(),
            destination: record.destination.name.clone(),
        }
    }

    fn flight(&self, record: &FlightRecord) -> FlightListView {
        FlightListView {
            id: record.flight.id,
            route: self.route(&record.route),
            airplane: record.airplane.airplane.name.clone(),
            departure_time: record.flight.departure_time,
            arrival_time: record.flight.arrival_time,
            tickets_available: record.inventory().tickets_available(),
        }
    }

    fn order(&self, record: &OrderRecord) -> OrderListView {
        OrderListView {
            id: record.order.id,
            created_at: record.order.created_at,
            tickets: record
                .tickets
                .iter()
                .map(|t| TicketListView {
                    id: t.ticket.id,
                    row: t.ticket.row,
                    seat: t.ticket.seat,
                    flight: self.flight(&t.flight),
                })
                .collect(),
        }
    }
}

impl Projector for DetailProjector {
    type Route = RouteView;
    type Flight = FlightDetailView;
    type Order = OrderView;

    fn route(&self, record: &RouteRecord) -> RouteView {
        RouteView {
            id: record.route.id,
            source: record.source.name.clone(),
            destination: record.destination.name.clone(),
            distance: record.route.distance,
        }
    }

    fn flight(&self, record: &FlightRecord) -> FlightDetailView {
        FlightDetailView {
            id: record.flight.id,
            route: self.route(&record.route),
            airplane: airplane_view(&record.airplane),
            departure_time: record.flight.departure_time,
            arrival_time: record.flight.arrival_time,
            crew: record.crew.iter().map(crew_view).collect(),
            taken_places: record.inventory().taken_places(),
        }
    }

    fn order(&self, record: &OrderRecord) -> OrderView {
        OrderView {
            id: record.order.id,
            created_at: record.order.created_at,
            tickets: record.tickets.iter().map(|t| ticket_view(&t.ticket)).collect(),
        }
    }
}

impl DetailProjector {
    /// Detail view of an order straight from the placement result, with no
    /// further read from the store.
    pub fn placed(&self, placed: &PlacedOrder) -> OrderView {
        OrderView {
            id: placed.order.id,
            created_at: placed.order.created_at,
            tickets: placed.tickets.iter().map(ticket_view).collect(),
        }
    }
}

fn ticket_view(ticket: &Ticket) -> TicketView {
    TicketView {
        id: ticket.id,
        row: ticket.row,
        seat: ticket.seat,
        flight: ticket.flight_id,
    }
}

pub fn city_view(record: &CityRecord) -> CityView {
    CityView {
        id: record.city.id,
        name: record.city.name.clone(),
        country: record.country.name.clone(),
    }
}

pub fn airport_view(record: &AirportRecord) -> AirportView {
    AirportView {
        id: record.airport.id,
        name: record.airport.name.clone(),
        closest_big_city: record.city.name.clone(),
    }
}

pub fn airplane_view(record: &AirplaneRecord) -> AirplaneView {
    AirplaneView {
        id: record.airplane.id,
        name: record.airplane.name.clone(),
        rows: record.airplane.rows,
        seats_in_row: record.airplane.seats_in_row,
        airplane_type: record.airplane_type.name.clone(),
    }
}

pub fn crew_view(crew: &Crew) -> CrewView {
    CrewView {
        id: crew.id,
        full_name: crew.full_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use skyport_catalog::{Airplane, AirplaneType, Airport, Flight, Route};
    use skyport_order::Order;

    use crate::records::TicketRecord;

    fn flight_record(taken: Vec<Seat>) -> FlightRecord {
        let city = Uuid::new_v4();
        let source = Airport {
            id: Uuid::new_v4(),
            name: "Boryspil".to_string(),
            closest_big_city_id: city,
        };
        let destination = Airport {
            id: Uuid::new_v4(),
            name: "Heathrow".to_string(),
            closest_big_city_id: city,
        };
        let route = Route {
            id: Uuid::new_v4(),
            source_id: source.id,
            destination_id: destination.id,
            distance: 2150,
        };
        let airplane_type = AirplaneType {
            id: Uuid::new_v4(),
            name: "Narrow body".to_string(),
        };
        let airplane = Airplane {
            id: Uuid::new_v4(),
            name: "A320".to_string(),
            rows: 5,
            seats_in_row: 5,
            airplane_type_id: airplane_type.id,
        };
        let crew = vec![
            Crew {
                id: Uuid::new_v4(),
                first_name: "Amelia".to_string(),
                last_name: "Earhart".to_string(),
            },
        ];
        let departure = Utc.with_ymd_and_hms(2024, 12, 25, 10, 0, 0).unwrap();
        FlightRecord {
            flight: Flight {
                id: Uuid::new_v4(),
                route_id: route.id,
                airplane_id: airplane.id,
                departure_time: departure,
                arrival_time: departure + chrono::Duration::hours(3),
                crew_ids: crew.iter().map(|c| c.id).collect(),
            },
            route: RouteRecord {
                route,
                source,
                destination,
            },
            airplane: AirplaneRecord {
                airplane,
                airplane_type,
            },
            crew,
            taken,
        }
    }

    #[test]
    fn test_flight_list_view_uses_labels() {
        let record = flight_record(vec![Seat::new(1, 1), Seat::new(2, 3)]);
        let view = ListProjector.flight(&record);

        assert_eq!(view.route.source, "Boryspil");
        assert_eq!(view.route.destination, "Heathrow");
        assert_eq!(view.airplane, "A320");
        assert_eq!(view.tickets_available, 23);
    }

    #[test]
    fn test_flight_detail_view_expands_relations() {
        let record = flight_record(vec![Seat::new(4, 2), Seat::new(1, 5)]);
        let view = DetailProjector.flight(&record);

        assert_eq!(view.route.distance, 2150);
        assert_eq!(view.airplane.airplane_type, "Narrow body");
        assert_eq!(view.crew[0].full_name, "Amelia Earhart");
        assert_eq!(view.taken_places, vec![Seat::new(1, 5), Seat::new(4, 2)]);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["taken_places"][0]["row"], 1);
        assert_eq!(json["taken_places"][0]["seat"], 5);
        assert!(json.get("tickets_available").is_none());
    }

    #[test]
    fn test_projection_is_idempotent() {
        let record = flight_record(vec![Seat::new(3, 2)]);

        assert_eq!(ListProjector.flight(&record), ListProjector.flight(&record));
        assert_eq!(DetailProjector.flight(&record), DetailProjector.flight(&record));
        assert_eq!(
            serde_json::to_string(&DetailProjector.flight(&record)).unwrap(),
            serde_json::to_string(&DetailProjector.flight(&record)).unwrap()
        );
    }

    #[test]
    fn test_order_views() {
        let flight = flight_record(vec![Seat::new(3, 2)]);
        let order = Order::new(Uuid::new_v4());
        let ticket = Ticket {
            id: Uuid::new_v4(),
            order_id: order.id,
            flight_id: flight.flight.id,
            row: 3,
            seat: 2,
        };
        let record = OrderRecord {
            order: order.clone(),
            tickets: vec![TicketRecord {
                ticket: ticket.clone(),
                flight: flight.clone(),
            }],
        };

        let list = ListProjector.order(&record);
        assert_eq!(list.tickets[0].flight.id, flight.flight.id);
        assert_eq!(list.tickets[0].flight.tickets_available, 24);

        let detail = DetailProjector.order(&record);
        assert_eq!(detail.tickets[0].flight, flight.flight.id);
        assert_eq!(detail.created_at, order.created_at);

        let placed = PlacedOrder {
            order,
            tickets: vec![ticket],
        };
        assert_eq!(DetailProjector.placed(&placed), detail);
    }
}

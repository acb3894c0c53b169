use std::collections::HashMap;

use chrono::{DateTime, Utc};
use skyport_catalog::{Airplane, AirplaneType, Airport, Crew, Flight, Route, Seat};
use skyport_core::records::{AirplaneRecord, FlightRecord, RouteRecord};
use skyport_core::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::map_db_error;

const FLIGHT_SELECT: &str = r#"
    SELECT
        f.id, f.route_id, f.airplane_id, f.departure_time, f.arrival_time,
        r.distance,
        r.source_id, s.name AS source_name, s.closest_big_city_id AS source_city_id,
        r.destination_id, d.name AS destination_name, d.closest_big_city_id AS destination_city_id,
        a.name AS airplane_name, a."rows" AS airplane_rows, a.seats_in_row,
        a.airplane_type_id, t.name AS airplane_type_name
    FROM flights f
    JOIN routes r ON r.id = f.route_id
    JOIN airports s ON s.id = r.source_id
    JOIN airports d ON d.id = r.destination_id
    JOIN airplanes a ON a.id = f.airplane_id
    JOIN airplane_types t ON t.id = a.airplane_type_id
"#;

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    route_id: Uuid,
    airplane_id: Uuid,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    distance: i32,
    source_id: Uuid,
    source_name: String,
    source_city_id: Uuid,
    destination_id: Uuid,
    destination_name: String,
    destination_city_id: Uuid,
    airplane_name: String,
    airplane_rows: i32,
    seats_in_row: i32,
    airplane_type_id: Uuid,
    airplane_type_name: String,
}

#[derive(sqlx::FromRow)]
struct CrewRow {
    flight_id: Uuid,
    id: Uuid,
    first_name: String,
    last_name: String,
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    flight_id: Uuid,
    row: i32,
    seat: i32,
}

/// Loads flight aggregates with route, airplane, crew and taken seats.
/// `None` loads every flight ordered by departure.
pub(crate) async fn load_flights(pool: &PgPool, ids: Option<&[Uuid]>) -> CoreResult<Vec<FlightRecord>> {
    let rows: Vec<FlightRow> = match ids {
        Some(ids) => {
            let query = format!("{} WHERE f.id = ANY($1) ORDER BY f.departure_time, f.id", FLIGHT_SELECT);
            sqlx::query_as::<_, FlightRow>(&query)
                .bind(ids)
                .fetch_all(pool)
                .await
        }
        None => {
            let query = format!("{} ORDER BY f.departure_time, f.id", FLIGHT_SELECT);
            sqlx::query_as::<_, FlightRow>(&query).fetch_all(pool).await
        }
    }
    .map_err(|e| map_db_error("load flights", e))?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let flight_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let crew_rows = sqlx::query_as::<_, CrewRow>(
        r#"
        SELECT fc.flight_id, c.id, c.first_name, c.last_name
        FROM flight_crew fc
        JOIN crews c ON c.id = fc.crew_id
        WHERE fc.flight_id = ANY($1)
        ORDER BY fc.position
        "#,
    )
    .bind(&flight_ids)
    .fetch_all(pool)
    .await
    .map_err(|e| map_db_error("load flight crew", e))?;

    let seat_rows = sqlx::query_as::<_, SeatRow>(
        r#"SELECT flight_id, "row", seat FROM tickets WHERE flight_id = ANY($1) ORDER BY "row", seat"#,
    )
    .bind(&flight_ids)
    .fetch_all(pool)
    .await
    .map_err(|e| map_db_error("load taken seats", e))?;

    let mut crews: HashMap<Uuid, Vec<Crew>> = HashMap::new();
    for row in crew_rows {
        crews.entry(row.flight_id).or_default().push(Crew {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
        });
    }

    let mut taken: HashMap<Uuid, Vec<Seat>> = HashMap::new();
    for row in seat_rows {
        taken
            .entry(row.flight_id)
            .or_default()
            .push(Seat::new(row.row, row.seat));
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let crew = crews.remove(&row.id).unwrap_or_default();
            let taken = taken.remove(&row.id).unwrap_or_default();
            assemble(row, crew, taken)
        })
        .collect())
}

fn assemble(row: FlightRow, crew: Vec<Crew>, taken: Vec<Seat>) -> FlightRecord {
    FlightRecord {
        flight: Flight {
            id: row.id,
            route_id: row.route_id,
            airplane_id: row.airplane_id,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            crew_ids: crew.iter().map(|c| c.id).collect(),
        },
        route: RouteRecord {
            route: Route {
                id: row.route_id,
                source_id: row.source_id,
                destination_id: row.destination_id,
                distance: row.distance,
            },
            source: Airport {
                id: row.source_id,
                name: row.source_name,
                closest_big_city_id: row.source_city_id,
            },
            destination: Airport {
                id: row.destination_id,
                name: row.destination_name,
                closest_big_city_id: row.destination_city_id,
            },
        },
        airplane: AirplaneRecord {
            airplane: Airplane {
                id: row.airplane_id,
                name: row.airplane_name,
                rows: row.airplane_rows,
                seats_in_row: row.seats_in_row,
                airplane_type_id: row.airplane_type_id,
            },
            airplane_type: AirplaneType {
                id: row.airplane_type_id,
                name: row.airplane_type_name,
            },
        },
        crew,
        taken,
    }
}

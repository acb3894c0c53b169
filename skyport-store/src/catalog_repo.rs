use async_trait::async_trait;
use skyport_catalog::{
    Airplane, AirplaneType, Airport, City, Country, Crew, Flight, NewAirplane, NewAirplaneType,
    NewAirport, NewCity, NewCountry, NewCrew, NewFlight, NewRoute, Route,
};
use skyport_core::records::{
    AirplaneRecord, AirportRecord, CityRecord, FlightRecord, RouteRecord,
};
use skyport_core::repository::CatalogRepository;
use skyport_core::{CoreError, CoreResult};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::database::map_db_error;
use crate::flight_records::load_flights;

pub struct StoreCatalogRepository {
    pool: PgPool,
}

impl StoreCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CityRow {
    id: Uuid,
    name: String,
    country_id: Uuid,
    country_name: String,
}

#[derive(sqlx::FromRow)]
struct AirportRow {
    id: Uuid,
    name: String,
    city_id: Uuid,
    city_name: String,
    country_id: Uuid,
}

#[derive(sqlx::FromRow)]
struct RouteRow {
    id: Uuid,
    distance: i32,
    source_id: Uuid,
    source_name: String,
    source_city_id: Uuid,
    destination_id: Uuid,
    destination_name: String,
    destination_city_id: Uuid,
}

#[derive(sqlx::FromRow)]
struct AirplaneRow {
    id: Uuid,
    name: String,
    rows: i32,
    seats_in_row: i32,
    airplane_type_id: Uuid,
    airplane_type_name: String,
}

#[async_trait]
impl CatalogRepository for StoreCatalogRepository {
    async fn create_crew(&self, crew: &NewCrew) -> CoreResult<Crew> {
        sqlx::query_as::<_, (Uuid, String, String)>(
            "INSERT INTO crews (id, first_name, last_name) VALUES ($1, $2, $3) RETURNING id, first_name, last_name",
        )
        .bind(Uuid::new_v4())
        .bind(crew.first_name.trim())
        .bind(crew.last_name.trim())
        .fetch_one(&self.pool)
        .await
        .map(|(id, first_name, last_name)| Crew {
            id,
            first_name,
            last_name,
        })
        .map_err(|e| map_db_error("create crew", e))
    }

    async fn list_crews(&self) -> CoreResult<Vec<Crew>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT id, first_name, last_name FROM crews ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list crews", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, first_name, last_name)| Crew {
                id,
                first_name,
                last_name,
            })
            .collect())
    }

    async fn create_country(&self, country: &NewCountry) -> CoreResult<Country> {
        sqlx::query_as::<_, (Uuid, String)>(
            "INSERT INTO countries (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(country.name.trim())
        .fetch_one(&self.pool)
        .await
        .map(|(id, name)| Country { id, name })
        .map_err(|e| map_db_error("create country", e))
    }

    async fn list_countries(&self) -> CoreResult<Vec<Country>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM countries ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("list countries", e))?;

        Ok(rows.into_iter().map(|(id, name)| Country { id, name }).collect())
    }

    async fn create_city(&self, city: &NewCity) -> CoreResult<City> {
        sqlx::query_as::<_, (Uuid, String, Uuid)>(
            "INSERT INTO cities (id, name, country_id) VALUES ($1, $2, $3) RETURNING id, name, country_id",
        )
        .bind(Uuid::new_v4())
        .bind(city.name.trim())
        .bind(city.country_id)
        .fetch_one(&self.pool)
        .await
        .map(|(id, name, country_id)| City {
            id,
            name,
            country_id,
        })
        .map_err(|e| map_db_error("create city", e))
    }

    async fn list_cities(&self) -> CoreResult<Vec<CityRecord>> {
        let rows = sqlx::query_as::<_, CityRow>(
            r#"
            SELECT c.id, c.name, c.country_id, n.name AS country_name
            FROM cities c
            JOIN countries n ON n.id = c.country_id
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list cities", e))?;

        Ok(rows
            .into_iter()
            .map(|row| CityRecord {
                city: City {
                    id: row.id,
                    name: row.name,
                    country_id: row.country_id,
                },
                country: Country {
                    id: row.country_id,
                    name: row.country_name,
                },
            })
            .collect())
    }

    async fn create_airport(&self, airport: &NewAirport) -> CoreResult<Airport> {
        sqlx::query_as::<_, (Uuid, String, Uuid)>(
            r#"
            INSERT INTO airports (id, name, closest_big_city_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, closest_big_city_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(airport.name.trim())
        .bind(airport.closest_big_city_id)
        .fetch_one(&self.pool)
        .await
        .map(|(id, name, closest_big_city_id)| Airport {
            id,
            name,
            closest_big_city_id,
        })
        .map_err(|e| map_db_error("create airport", e))
    }

    async fn list_airports(&self) -> CoreResult<Vec<AirportRecord>> {
        let rows = sqlx::query_as::<_, AirportRow>(
            r#"
            SELECT a.id, a.name, c.id AS city_id, c.name AS city_name, c.country_id
            FROM airports a
            JOIN cities c ON c.id = a.closest_big_city_id
            ORDER BY a.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list airports", e))?;

        Ok(rows
            .into_iter()
            .map(|row| AirportRecord {
                airport: Airport {
                    id: row.id,
                    name: row.name,
                    closest_big_city_id: row.city_id,
                },
                city: City {
                    id: row.city_id,
                    name: row.city_name,
                    country_id: row.country_id,
                },
            })
            .collect())
    }

    async fn create_route(&self, route: &NewRoute) -> CoreResult<Route> {
        sqlx::query_as::<_, (Uuid, Uuid, Uuid, i32)>(
            r#"
            INSERT INTO routes (id, source_id, destination_id, distance)
            VALUES ($1, $2, $3, $4)
            RETURNING id, source_id, destination_id, distance
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(route.source_id)
        .bind(route.destination_id)
        .bind(route.distance)
        .fetch_one(&self.pool)
        .await
        .map(|(id, source_id, destination_id, distance)| Route {
            id,
            source_id,
            destination_id,
            distance,
        })
        .map_err(|e| map_db_error("create route", e))
    }

    async fn list_routes(&self) -> CoreResult<Vec<RouteRecord>> {
        let rows = sqlx::query_as::<_, RouteRow>(
            r#"
            SELECT r.id, r.distance,
                   r.source_id, s.name AS source_name, s.closest_big_city_id AS source_city_id,
                   r.destination_id, d.name AS destination_name, d.closest_big_city_id AS destination_city_id
            FROM routes r
            JOIN airports s ON s.id = r.source_id
            JOIN airports d ON d.id = r.destination_id
            ORDER BY s.name, d.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list routes", e))?;

        Ok(rows
            .into_iter()
            .map(|row| RouteRecord {
                route: Route {
                    id: row.id,
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
            })
            .collect())
    }

    async fn create_airplane_type(&self, airplane_type: &NewAirplaneType) -> CoreResult<AirplaneType> {
        sqlx::query_as::<_, (Uuid, String)>(
            "INSERT INTO airplane_types (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(airplane_type.name.trim())
        .fetch_one(&self.pool)
        .await
        .map(|(id, name)| AirplaneType { id, name })
        .map_err(|e| map_db_error("create airplane type", e))
    }

    async fn list_airplane_types(&self) -> CoreResult<Vec<AirplaneType>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM airplane_types ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("list airplane types", e))?;

        Ok(rows.into_iter().map(|(id, name)| AirplaneType { id, name }).collect())
    }

    async fn create_airplane(&self, airplane: &NewAirplane) -> CoreResult<Airplane> {
        sqlx::query_as::<_, (Uuid, String, i32, i32, Uuid)>(
            r#"
            INSERT INTO airplanes (id, name, "rows", seats_in_row, airplane_type_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, "rows", seats_in_row, airplane_type_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(airplane.name.trim())
        .bind(airplane.rows)
        .bind(airplane.seats_in_row)
        .bind(airplane.airplane_type_id)
        .fetch_one(&self.pool)
        .await
        .map(|(id, name, rows, seats_in_row, airplane_type_id)| Airplane {
            id,
            name,
            rows,
            seats_in_row,
            airplane_type_id,
        })
        .map_err(|e| map_db_error("create airplane", e))
    }

    async fn list_airplanes(&self) -> CoreResult<Vec<AirplaneRecord>> {
        let rows = sqlx::query_as::<_, AirplaneRow>(
            r#"
            SELECT a.id, a.name, a."rows", a.seats_in_row, a.airplane_type_id, t.name AS airplane_type_name
            FROM airplanes a
            JOIN airplane_types t ON t.id = a.airplane_type_id
            ORDER BY a.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list airplanes", e))?;

        Ok(rows
            .into_iter()
            .map(|row| AirplaneRecord {
                airplane: Airplane {
                    id: row.id,
                    name: row.name,
                    rows: row.rows,
                    seats_in_row: row.seats_in_row,
                    airplane_type_id: row.airplane_type_id,
                },
                airplane_type: AirplaneType {
                    id: row.airplane_type_id,
                    name: row.airplane_type_name,
                },
            })
            .collect())
    }

    async fn create_flight(&self, flight: &NewFlight) -> CoreResult<Flight> {
        let id = Uuid::new_v4();
        let crew_ids = flight.distinct_crew();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("begin flight transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO flights (id, route_id, airplane_id, departure_time, arrival_time)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(flight.route_id)
        .bind(flight.airplane_id)
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("create flight", e))?;

        for (position, crew_id) in crew_ids.iter().enumerate() {
            sqlx::query("INSERT INTO flight_crew (flight_id, crew_id, position) VALUES ($1, $2, $3)")
                .bind(id)
                .bind(crew_id)
                .bind(position as i32)
                .execute(&mut *tx)
                .await
                .map_err(|e| match map_db_error("assign crew", e) {
                    CoreError::NotFound { .. } => CoreError::not_found("Crew", crew_id),
                    other => other,
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| map_db_error("commit flight", e))?;

        info!(flight_id = %id, route_id = %flight.route_id, "Flight scheduled");

        Ok(Flight {
            id,
            route_id: flight.route_id,
            airplane_id: flight.airplane_id,
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
            crew_ids,
        })
    }

    async fn list_flights(&self) -> CoreResult<Vec<FlightRecord>> {
        load_flights(&self.pool, None).await
    }

    async fn get_flight(&self, id: Uuid) -> CoreResult<FlightRecord> {
        load_flights(&self.pool, Some(std::slice::from_ref(&id)))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::not_found("Flight", id))
    }
}

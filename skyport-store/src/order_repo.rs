use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skyport_catalog::{Airplane, Flight};
use skyport_core::records::{OrderRecord, TicketRecord};
use skyport_core::repository::{BookingStore, BookingTransaction, OrderRepository};
use skyport_core::{CoreError, CoreResult};
use skyport_order::{NewOrder, Order, Ticket, TicketRequest};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::map_db_error;
use crate::flight_records::load_flights;

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    order_id: Uuid,
    flight_id: Uuid,
    row: i32,
    seat: i32,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        Ticket {
            id: row.id,
            order_id: row.order_id,
            flight_id: row.flight_id,
            row: row.row,
            seat: row.seat,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    route_id: Uuid,
    airplane_id: Uuid,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AirplaneRow {
    id: Uuid,
    name: String,
    rows: i32,
    seats_in_row: i32,
    airplane_type_id: Uuid,
}

impl StoreOrderRepository {
    async fn assemble(&self, orders: Vec<OrderRow>) -> CoreResult<Vec<OrderRecord>> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

        let tickets = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, order_id, flight_id, "row", seat
            FROM tickets
            WHERE order_id = ANY($1)
            ORDER BY "row", seat
            "#,
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list tickets", e))?;

        let mut flight_ids: Vec<Uuid> = tickets.iter().map(|t| t.flight_id).collect();
        flight_ids.sort();
        flight_ids.dedup();
        let flights: HashMap<Uuid, _> = load_flights(&self.pool, Some(&flight_ids))
            .await?
            .into_iter()
            .map(|f| (f.flight.id, f))
            .collect();

        let mut by_order: HashMap<Uuid, Vec<TicketRecord>> = HashMap::new();
        for ticket in tickets {
            let flight = flights
                .get(&ticket.flight_id)
                .cloned()
                .ok_or_else(|| CoreError::not_found("Flight", ticket.flight_id))?;
            by_order.entry(ticket.order_id).or_default().push(TicketRecord {
                ticket: ticket.into(),
                flight,
            });
        }

        Ok(orders
            .into_iter()
            .map(|row| {
                let tickets = by_order.remove(&row.id).unwrap_or_default();
                OrderRecord {
                    order: row.into(),
                    tickets,
                }
            })
            .collect())
    }
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn list_orders(&self, user_id: Uuid) -> CoreResult<Vec<OrderRecord>> {
        let orders = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, created_at FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list orders", e))?;

        self.assemble(orders).await
    }

    async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> CoreResult<OrderRecord> {
        let order = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, created_at FROM orders WHERE id = $1 AND user_id = $2",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("get order", e))?
        .ok_or_else(|| CoreError::not_found("Order", order_id))?;

        self.assemble(vec![order])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::not_found("Order", order_id))
    }
}

#[async_trait]
impl BookingStore for StoreOrderRepository {
    async fn begin(&self) -> CoreResult<Box<dyn BookingTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("begin booking transaction", e))?;
        Ok(Box::new(PgBookingTransaction { tx }))
    }
}

/// Rolled back by sqlx when dropped uncommitted.
pub struct PgBookingTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BookingTransaction for PgBookingTransaction {
    async fn get_flight(&mut self, id: Uuid) -> CoreResult<Flight> {
        let row = sqlx::query_as::<_, FlightRow>(
            "SELECT id, route_id, airplane_id, departure_time, arrival_time FROM flights WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_db_error("get flight", e))?
        .ok_or_else(|| CoreError::not_found("Flight", id))?;

        let crew_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT crew_id FROM flight_crew WHERE flight_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_db_error("get flight crew", e))?;

        Ok(Flight {
            id: row.id,
            route_id: row.route_id,
            airplane_id: row.airplane_id,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            crew_ids,
        })
    }

    async fn get_airplane(&mut self, id: Uuid) -> CoreResult<Airplane> {
        sqlx::query_as::<_, AirplaneRow>(
            r#"SELECT id, name, "rows", seats_in_row, airplane_type_id FROM airplanes WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_db_error("get airplane", e))?
        .map(|row| Airplane {
            id: row.id,
            name: row.name,
            rows: row.rows,
            seats_in_row: row.seats_in_row,
            airplane_type_id: row.airplane_type_id,
        })
        .ok_or_else(|| CoreError::not_found("Airplane", id))
    }

    async fn create_order(&mut self, order: NewOrder) -> CoreResult<Order> {
        sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (id, user_id) VALUES ($1, $2) RETURNING id, user_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(order.user_id)
        .fetch_one(&mut *self.tx)
        .await
        .map(Order::from)
        .map_err(|e| map_db_error("create order", e))
    }

    async fn create_ticket(&mut self, order_id: Uuid, ticket: &TicketRequest) -> CoreResult<Ticket> {
        sqlx::query_as::<_, TicketRow>(
            r#"
            INSERT INTO tickets (id, order_id, flight_id, "row", seat)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, order_id, flight_id, "row", seat
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(ticket.flight_id)
        .bind(ticket.row)
        .bind(ticket.seat)
        .fetch_one(&mut *self.tx)
        .await
        .map(Ticket::from)
        .map_err(|e| match map_db_error("create ticket", e) {
            CoreError::Conflict(_) => CoreError::Conflict(format!(
                "seat (row {}, seat {}) on flight {} is already booked",
                ticket.row, ticket.seat, ticket.flight_id
            )),
            CoreError::NotFound { .. } => CoreError::not_found("Flight", ticket.flight_id),
            other => other,
        })
    }

    async fn commit(self: Box<Self>) -> CoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_db_error("commit booking", e))
    }
}

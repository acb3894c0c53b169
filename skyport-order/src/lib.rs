pub mod models;

pub use models::{CreateOrderRequest, NewOrder, Order, PlacedOrder, Ticket, TicketRequest};

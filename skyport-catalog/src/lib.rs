pub mod reference;
pub mod airplane;
pub mod flight;
pub mod inventory;

pub use reference::{
    Airport, AirplaneType, City, Country, Crew, NewAirport, NewAirplaneType, NewCity, NewCountry,
    NewCrew, NewRoute, Route,
};
pub use airplane::{Airplane, NewAirplane, Seat};
pub use flight::{validate_schedule, Flight, NewFlight};
pub use inventory::SeatInventory;

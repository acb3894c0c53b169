use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skyport_shared::ValidationError;
use uuid::Uuid;

/// A scheduled traversal of a route by an airplane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    #[serde(rename = "route")]
    pub route_id: Uuid,
    #[serde(rename = "airplane")]
    pub airplane_id: Uuid,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    #[serde(rename = "crew")]
    pub crew_ids: Vec<Uuid>,
}

/// Arrival may equal departure but never precede it.
pub fn validate_schedule(
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if arrival_time < departure_time {
        return Err(ValidationError::new(
            "arrival_time",
            "arrival time can not be less than departure time",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFlight {
    #[serde(rename = "route")]
    pub route_id: Uuid,
    #[serde(rename = "airplane")]
    pub airplane_id: Uuid,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    #[serde(rename = "crew", default)]
    pub crew_ids: Vec<Uuid>,
}

impl NewFlight {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_schedule(self.departure_time, self.arrival_time)
    }

    /// Crew ids with duplicates removed, first occurrence wins.
    pub fn distinct_crew(&self) -> Vec<Uuid> {
        let mut seen = Vec::with_capacity(self.crew_ids.len());
        for id in &self.crew_ids {
            if !seen.contains(id) {
                seen.push(*id);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 25, hour, minute, second).unwrap()
    }

    #[test]
    fn test_arrival_before_departure_rejected() {
        let departure = at(10, 0, 0);
        let err = validate_schedule(departure, departure - Duration::seconds(1)).unwrap_err();
        assert_eq!(err.field, "arrival_time");
    }

    #[test]
    fn test_zero_duration_allowed() {
        let departure = at(10, 0, 0);
        assert!(validate_schedule(departure, departure).is_ok());
        assert!(validate_schedule(departure, at(13, 30, 0)).is_ok());
    }

    #[test]
    fn test_new_flight_deserialization() {
        let route = Uuid::new_v4();
        let airplane = Uuid::new_v4();
        let json = format!(
            r#"{{
                "route": "{}",
                "airplane": "{}",
                "departure_time": "2024-12-25T10:00:00Z",
                "arrival_time": "2024-12-25T09:00:00Z"
            }}"#,
            route, airplane
        );
        let flight: NewFlight = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(flight.route_id, route);
        assert!(flight.crew_ids.is_empty());
        assert_eq!(flight.validate().unwrap_err().field, "arrival_time");
    }

    #[test]
    fn test_distinct_crew_keeps_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let flight = NewFlight {
            route_id: Uuid::new_v4(),
            airplane_id: Uuid::new_v4(),
            departure_time: at(8, 0, 0),
            arrival_time: at(9, 0, 0),
            crew_ids: vec![a, b, a],
        };
        assert_eq!(flight.distinct_crew(), vec![a, b]);
    }
}

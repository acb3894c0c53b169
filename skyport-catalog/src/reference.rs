use serde::{Deserialize, Serialize};
use skyport_shared::validation::{require_non_blank, require_positive};
use skyport_shared::ValidationError;
use uuid::Uuid;

// ============================================================================
// Crew
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl Crew {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCrew {
    pub first_name: String,
    pub last_name: String,
}

impl NewCrew {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("first_name", &self.first_name)?;
        require_non_blank("last_name", &self.last_name)
    }
}

// ============================================================================
// Geography
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCountry {
    pub name: String,
}

impl NewCountry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "country")]
    pub country_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCity {
    pub name: String,
    #[serde(rename = "country")]
    pub country_id: Uuid,
}

impl NewCity {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "closest_big_city")]
    pub closest_big_city_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirport {
    pub name: String,
    #[serde(rename = "closest_big_city")]
    pub closest_big_city_id: Uuid,
}

impl NewAirport {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)
    }
}

// ============================================================================
// Routes & airplane types
// ============================================================================

/// A directed connection between two airports. Distance is in kilometres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    #[serde(rename = "source")]
    pub source_id: Uuid,
    #[serde(rename = "destination")]
    pub destination_id: Uuid,
    pub distance: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoute {
    #[serde(rename = "source")]
    pub source_id: Uuid,
    #[serde(rename = "destination")]
    pub destination_id: Uuid,
    pub distance: i32,
}

impl NewRoute {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source_id == self.destination_id {
            return Err(ValidationError::new(
                "destination",
                "destination airport must differ from source airport",
            ));
        }
        require_positive("distance", self.distance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirplaneType {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirplaneType {
    pub name: String,
}

impl NewAirplaneType {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crew_full_name() {
        let crew = Crew {
            id: Uuid::new_v4(),
            first_name: "Amelia".to_string(),
            last_name: "Earhart".to_string(),
        };
        assert_eq!(crew.full_name(), "Amelia Earhart");
    }

    #[test]
    fn test_route_must_connect_two_airports() {
        let airport = Uuid::new_v4();
        let loop_route = NewRoute {
            source_id: airport,
            destination_id: airport,
            distance: 300,
        };
        assert_eq!(loop_route.validate().unwrap_err().field, "destination");

        let zero_distance = NewRoute {
            source_id: airport,
            destination_id: Uuid::new_v4(),
            distance: 0,
        };
        assert_eq!(zero_distance.validate().unwrap_err().field, "distance");
    }

    #[test]
    fn test_city_request_uses_reference_field_names() {
        let country = Uuid::new_v4();
        let json = format!(r#"{{"name": "Kyiv", "country": "{}"}}"#, country);
        let city: NewCity = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(city.country_id, country);
        assert!(city.validate().is_ok());
    }
}

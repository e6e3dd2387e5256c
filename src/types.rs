use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Backend-generated identifier. Platitude may hand out either strings or
/// integers; whichever it sent is sent back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Text(String),
    Number(i64),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Id::Text(s) => f.write_str(s),
            Id::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Id {
        Id::Text(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Id {
        Id::Number(n)
    }
}

/// Body of every 201 response; only the id matters here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Created {
    pub id: Id,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NewVehicle {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPlate<'a> {
    pub code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<&'a Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSighting<'a> {
    pub longitude: f64,
    pub latitude: f64,
    pub timestamp: &'a str,
    pub plate_id: &'a Id,
    pub vehicle_id: Option<&'a Id>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Vehicle {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<serde_json::Value>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Plate {
    pub id: Id,
    pub code: String,
    #[serde(default)]
    pub vehicle_id: Option<Id>,
}

/// Coordinates are kept as the JSON numbers the backend sent so they print
/// back exactly as stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sighting {
    pub id: Id,
    pub plate_id: Id,
    #[serde(default)]
    pub vehicle_id: Option<Id>,
    pub latitude: Number,
    pub longitude: Number,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_keep_their_json_type() {
        let text: Created = serde_json::from_value(json!({"id": "a1b2", "code": "X"})).unwrap();
        assert_eq!(text.id, Id::from("a1b2"));
        let num: Created = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(num.id, Id::Number(42));
        assert_eq!(serde_json::to_value(&num.id).unwrap(), json!(42));
        assert_eq!(num.id.to_string(), "42");
    }

    #[test]
    fn plate_body_omits_absent_vehicle() {
        let body = serde_json::to_value(&NewPlate {
            code: "ABC123",
            vehicle_id: None,
        })
        .unwrap();
        assert_eq!(body, json!({"code": "ABC123"}));
    }

    #[test]
    fn sighting_body_carries_null_vehicle() {
        let plate_id = Id::Number(7);
        let body = serde_json::to_value(&NewSighting {
            longitude: 2.0,
            latitude: 1.0,
            timestamp: "2024-01-01T10:00:00",
            plate_id: &plate_id,
            vehicle_id: None,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "longitude": 2.0,
                "latitude": 1.0,
                "timestamp": "2024-01-01T10:00:00",
                "plate_id": 7,
                "vehicle_id": null
            })
        );
    }

    #[test]
    fn sighting_coordinates_print_as_stored() {
        let s: Sighting = serde_json::from_value(json!({
            "id": 1,
            "plate_id": 2,
            "latitude": 1.0,
            "longitude": -122.4194,
            "timestamp": "2024-03-05T14:30:00"
        }))
        .unwrap();
        assert_eq!(s.latitude.to_string(), "1.0");
        assert_eq!(s.longitude.to_string(), "-122.4194");
        assert_eq!(s.vehicle_id, None);
    }
}

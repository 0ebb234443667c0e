//! Data models for the water-quality service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ---

/// A single water-quality sample from a pond sensor.
///
/// Every measurement is optional: `None` means the parameter was not measured
/// (or arrived in a form that could not be read as a number). It is never
/// silently replaced by zero.
///
/// Rows decode through `sqlx::FromRow`. JSON bodies decode through
/// [`WaterReading::from_fields`], which accepts any object. Output always
/// uses the column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct WaterReading {
    // ---
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    /// Salinity in parts per thousand.
    pub salinity: Option<f64>,

    pub ph: Option<f64>,

    /// Dissolved oxygen in mg/L.
    pub dissolved_oxygen: Option<f64>,

    /// Total ammonia nitrogen in mg/L.
    pub nitrogen: Option<f64>,

    pub hydrogen_sulfide: Option<f64>,

    /// Biochemical oxygen demand in mg/L.
    pub bod: Option<f64>,

    /// Water temperature in °C.
    pub temperature: Option<f64>,

    pub recorded_at: Option<DateTime<Utc>>,
}

impl WaterReading {
    // ---
    /// Build a reading from loosely typed JSON fields. Never fails.
    ///
    /// Each field is looked up under its column name first, then under its
    /// aliases (`dissolvedOxygen`/`oxygen`, `hydrogenSulfide`, `recordedAt`);
    /// the first key holding a usable value wins. Values that cannot be read
    /// become `None`.
    pub fn from_fields(fields: &Map<String, Value>) -> WaterReading {
        // ---
        let measure = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| fields.get(*key).and_then(lenient_number))
        };

        WaterReading {
            id: fields
                .get("id")
                .and_then(Value::as_i64)
                .and_then(|id| i32::try_from(id).ok()),
            salinity: measure(&["salinity"]),
            ph: measure(&["ph"]),
            dissolved_oxygen: measure(&["dissolved_oxygen", "dissolvedOxygen", "oxygen"]),
            nitrogen: measure(&["nitrogen"]),
            hydrogen_sulfide: measure(&["hydrogen_sulfide", "hydrogenSulfide"]),
            bod: measure(&["bod"]),
            temperature: measure(&["temperature"]),
            recorded_at: ["recorded_at", "recordedAt"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(lenient_timestamp)),
        }
    }

    /// True when both readings carry the same measured values.
    ///
    /// Row id and timestamp are ignored: a fresh row with identical numbers
    /// is not a change in water quality.
    pub fn same_measurements(&self, other: &WaterReading) -> bool {
        // ---
        self.salinity == other.salinity
            && self.ph == other.ph
            && self.dissolved_oxygen == other.dissolved_oxygen
            && self.nitrogen == other.nitrogen
            && self.hydrogen_sulfide == other.hydrogen_sulfide
            && self.bod == other.bod
            && self.temperature == other.temperature
    }
}

/// Any JSON object decodes; anything else is an error.
impl<'de> Deserialize<'de> for WaterReading {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Ok(WaterReading::from_fields(&fields))
    }
}

/// Numbers and numeric strings become `Some`; `null`, booleans, containers,
/// unparsable strings and non-finite values become `None`.
fn lenient_number(value: &Value) -> Option<f64> {
    // ---
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

/// RFC 3339 strings only.
fn lenient_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// Full user row, including the password hash. Never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    // ---
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user returned by `GET /member`.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    // ---
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Name and email echoed back after registration.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct NewUser {
    // ---
    pub name: String,
    pub email: String,
}

/// One login/logout record from `login_logs`.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LoginLog {
    // ---
    pub email: String,
    pub login_time: DateTime<Utc>,
    pub status: String,
}

/// Session state stored in `login_logs.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Online,
    Offline,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Online => "online",
            SessionStatus::Offline => "offline",
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> WaterReading {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_numbers_and_numeric_strings() {
        // ---
        let r = decode(json!({ "salinity": 15, "ph": "7.9", "bod": " 12.5 " }));

        assert_eq!(r.salinity, Some(15.0));
        assert_eq!(r.ph, Some(7.9));
        assert_eq!(r.bod, Some(12.5));
        assert_eq!(r.temperature, None);
    }

    #[test]
    fn test_malformed_values_become_unknown() {
        // ---
        let r = decode(json!({
            "salinity": "abc",
            "ph": true,
            "nitrogen": [0.1],
            "bod": { "value": 3 },
            "temperature": null,
        }));

        assert_eq!(r.salinity, None);
        assert_eq!(r.ph, None);
        assert_eq!(r.nitrogen, None);
        assert_eq!(r.bod, None);
        assert_eq!(r.temperature, None);
    }

    #[test]
    fn test_zero_is_not_unknown() {
        // ---
        let r = decode(json!({ "dissolved_oxygen": 0 }));
        assert_eq!(r.dissolved_oxygen, Some(0.0));
    }

    #[test]
    fn test_oxygen_aliases() {
        // ---
        assert_eq!(decode(json!({ "oxygen": 5.5 })).dissolved_oxygen, Some(5.5));
        assert_eq!(
            decode(json!({ "dissolvedOxygen": 6 })).dissolved_oxygen,
            Some(6.0)
        );
        assert_eq!(
            decode(json!({ "hydrogenSulfide": 0.002 })).hydrogen_sulfide,
            Some(0.002)
        );
    }

    #[test]
    fn test_canonical_key_wins_over_alias() {
        // ---
        let r = decode(json!({ "salinity": 15, "oxygen": 5, "dissolved_oxygen": 6 }));
        assert_eq!(r.salinity, Some(15.0));
        assert_eq!(r.dissolved_oxygen, Some(6.0));

        // An unusable canonical value falls back to the alias.
        let r = decode(json!({ "dissolved_oxygen": null, "oxygen": "4.5" }));
        assert_eq!(r.dissolved_oxygen, Some(4.5));
    }

    #[test]
    fn test_bad_id_and_timestamp_are_ignored() {
        // ---
        let r = decode(json!({ "id": "seven", "recorded_at": "yesterday", "ph": 8 }));
        assert_eq!(r.id, None);
        assert_eq!(r.recorded_at, None);
        assert_eq!(r.ph, Some(8.0));

        let r = decode(json!({ "id": 7, "recordedAt": "2024-05-01T06:30:00Z" }));
        assert_eq!(r.id, Some(7));
        assert!(r.recorded_at.is_some());
    }

    #[test]
    fn test_only_objects_decode() {
        // ---
        assert!(serde_json::from_value::<WaterReading>(json!([1, 2])).is_err());
        assert!(serde_json::from_value::<WaterReading>(json!("reading")).is_err());
        assert_eq!(decode(json!({})), WaterReading::default());
    }

    #[test]
    fn test_serializes_canonical_names() {
        // ---
        let r = decode(json!({ "oxygen": 5.0 }));
        let out = serde_json::to_value(&r).unwrap();

        assert_eq!(out["dissolved_oxygen"], json!(5.0));
        assert!(out.get("oxygen").is_none());
        assert!(out.get("id").is_none());
    }

    #[test]
    fn test_same_measurements_ignores_id_and_time() {
        // ---
        let a = WaterReading {
            id: Some(1),
            salinity: Some(15.0),
            ph: Some(8.0),
            recorded_at: Some(Utc::now()),
            ..Default::default()
        };
        let mut b = a.clone();
        b.id = Some(2);
        b.recorded_at = None;
        assert!(a.same_measurements(&b));

        b.ph = Some(8.1);
        assert!(!a.same_measurements(&b));
    }
}

use std::fmt;

use model::FeatureVector;
use serde_json::{Map, Value};

use crate::error::PredictErr;

/// Field names the client application sends.
pub const REQUEST_FIELDS: [&str; 8] = [
    "median_income",
    "housing_median_age",
    "population",
    "latitude",
    "longitude",
    "rooms_per_household",
    "population_per_household",
    "bedrooms_per_room",
];

/// Why a request field could not be turned into a number.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureErr {
    Missing(&'static str),
    NotNumeric { field: &'static str, value: String },
    NonFinite(&'static str),
}

impl fmt::Display for FeatureErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureErr::Missing(field) => write!(f, "missing required field '{field}'"),
            FeatureErr::NotNumeric { field, value } => {
                write!(f, "field '{field}' is not a number: {value}")
            }
            FeatureErr::NonFinite(field) => write!(f, "field '{field}' must be finite"),
        }
    }
}

impl std::error::Error for FeatureErr {}

/// A validated prediction request, every field coerced to a finite float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictRequest {
    pub median_income: f64,
    pub housing_median_age: f64,
    pub population: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub rooms_per_household: f64,
    pub population_per_household: f64,
    /// Bedrooms divided by rooms, a ratio rather than a count.
    pub bedrooms_per_room: f64,
}

impl PredictRequest {
    /// Parses and validates a raw request body.
    ///
    /// # Errors
    /// Returns `PredictErr::MalformedRequest` if the body is empty or not a
    /// non-empty JSON object, `PredictErr::InvalidFeature` if a field is
    /// missing or can't be coerced.
    pub fn from_body(body: &[u8]) -> Result<Self, PredictErr> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(PredictErr::MalformedRequest);
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(obj)) if !obj.is_empty() => Ok(Self::from_object(&obj)?),
            _ => Err(PredictErr::MalformedRequest),
        }
    }

    /// Extracts the eight fields from a decoded JSON object, ignoring extras.
    pub fn from_object(obj: &Map<String, Value>) -> Result<Self, FeatureErr> {
        let field = |name: &'static str| coerce(name, obj.get(name));

        Ok(Self {
            median_income: field("median_income")?,
            housing_median_age: field("housing_median_age")?,
            population: field("population")?,
            latitude: field("latitude")?,
            longitude: field("longitude")?,
            rooms_per_household: field("rooms_per_household")?,
            population_per_household: field("population_per_household")?,
            bedrooms_per_room: field("bedrooms_per_room")?,
        })
    }

    /// Bedrooms per household, recovered from the bedrooms-per-room ratio.
    #[inline]
    pub fn average_bedrooms(&self) -> f64 {
        self.bedrooms_per_room * self.rooms_per_household
    }

    /// Maps the client's fields onto the dataset columns the model was
    /// trained on.
    pub fn to_features(&self) -> FeatureVector {
        FeatureVector {
            med_inc: self.median_income,
            house_age: self.housing_median_age,
            ave_rooms: self.rooms_per_household,
            ave_bedrms: self.average_bedrooms(),
            population: self.population,
            ave_occup: self.population_per_household,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Numbers pass through, strings are parsed, anything else is rejected.
/// An explicit `null` counts as missing.
fn coerce(field: &'static str, value: Option<&Value>) -> Result<f64, FeatureErr> {
    let not_numeric = |v: &Value| FeatureErr::NotNumeric {
        field,
        value: v.to_string(),
    };

    let v = match value {
        None | Some(Value::Null) => return Err(FeatureErr::Missing(field)),
        Some(v @ Value::Number(n)) => n.as_f64().ok_or_else(|| not_numeric(v))?,
        Some(v @ Value::String(s)) => s.trim().parse::<f64>().map_err(|_| not_numeric(v))?,
        Some(v) => return Err(not_numeric(v)),
    };

    if !v.is_finite() {
        return Err(FeatureErr::NonFinite(field));
    }

    Ok(v)
}

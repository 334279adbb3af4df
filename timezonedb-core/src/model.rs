use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use std::fmt;

use crate::error::{Error, Result};

/// Status of an API query. Either OK or FAILED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    Ok,
    Failed,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Ok => "OK",
            ResponseStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated response from the `get-time-zone` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetTimeZoneResponse {
    pub status: ResponseStatus,

    /// Error message reported by the service. Meaningful on failed queries;
    /// blank messages are normalized away.
    pub error_message: Option<String>,

    /// Present exactly when `status` is [`ResponseStatus::Ok`].
    pub result: Option<GetTimeZoneResult>,
}

impl GetTimeZoneResponse {
    /// Whether the API query was successful.
    pub fn is_successful(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

/// Result of a successful `get-time-zone` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetTimeZoneResult {
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub region_name: Option<String>,
    pub city_name: Option<String>,

    /// The looked-up IANA time zone.
    pub time_zone: Tz,

    pub abbreviation: Option<String>,
    pub next_abbreviation: Option<String>,

    /// Offset from UTC.
    pub gmt_offset: TimeDelta,

    /// Whether Daylight Saving Time is in effect. `None` when the service
    /// left the field blank.
    pub dst: Option<bool>,

    /// When the current zone offset started, UTC.
    pub zone_start: Option<DateTime<Utc>>,

    /// When the current zone offset ends, UTC.
    pub zone_end: Option<DateTime<Utc>>,

    /// Current wall-clock time at the looked-up location.
    pub local_time: Option<NaiveDateTime>,

    pub total_page: Option<u32>,
    pub current_page: Option<u32>,
}

/// Lookup request by geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRequest {
    latitude: f64,
    longitude: f64,
}

impl CoordinateRequest {
    /// Latitude must be within [-90, 90] and longitude within [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidRequest(format!(
                "latitude {latitude} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidRequest(format!(
                "longitude {longitude} out of range [-180, 180]"
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for CoordinateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Latitude: {}, Longitude: {}",
            self.latitude, self.longitude
        )
    }
}

/// Lookup request by city and country, with an optional region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityRequest {
    city: String,
    country: String,
    region: Option<String>,
}

impl CityRequest {
    /// City and country are mandatory and must not be blank.
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Result<Self> {
        let city = city.into();
        let country = country.into();

        if city.trim().is_empty() {
            return Err(Error::InvalidRequest("city must not be blank".to_string()));
        }
        if country.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "country must not be blank".to_string(),
            ));
        }

        Ok(Self {
            city,
            country,
            region: None,
        })
    }

    /// Narrow the lookup to a region / state. A blank region means "not
    /// specified" and is left out of the query entirely.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        let region = region.into();
        self.region = if region.trim().is_empty() {
            None
        } else {
            Some(region)
        };
        self
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

impl fmt::Display for CityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}, {}, {}", self.city, region, self.country),
            None => write!(f, "{}, {}", self.city, self.country),
        }
    }
}

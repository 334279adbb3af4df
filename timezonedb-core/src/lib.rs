//! Core library for the TimeZoneDB API client.
//!
//! This crate defines:
//! - The wire-level response payload as the service sends it
//! - The validated domain models (requests, responses)
//! - The translator between the two, with its policy knobs
//! - The async client issuing the `get-time-zone` lookups
//!
//! It is used by `timezonedb-cli`, but can also be reused by other binaries
//! or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod translate;
pub mod wire;

pub use client::{HttpTransport, TimeZoneDbClient, Transport};
pub use config::Config;
pub use error::{Error, Result};
pub use model::{
    CityRequest, CoordinateRequest, GetTimeZoneResponse, GetTimeZoneResult, ResponseStatus,
};
pub use translate::{DstHandling, TimestampFormat, Translator};
pub use wire::GetTimeZoneDto;

// Callers matching on lookup results need these without naming chrono/tz
// versions of their own.
pub use chrono_tz::Tz;
pub use tokio_util::sync::CancellationToken;

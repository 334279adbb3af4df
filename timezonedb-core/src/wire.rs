use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response payload of the `get-time-zone` endpoint, exactly as the server
/// sends it: every field optional, every value a string.
///
/// This layer represents whatever came over the wire, including partial or
/// malformed payloads. Field names are matched case-insensitively and
/// unrecognized fields are ignored; interpretation and validation happen in
/// [`crate::translate::Translator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTimeZoneDto {
    /// Status of the API query. Either OK or FAILED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Error message. Empty if no error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,

    /// Region / state name of the time zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,

    /// IANA identifier of the time zone, e.g. `Europe/Berlin`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_abbreviation: Option<String>,

    /// Offset from UTC, textually encoded (seconds or a clock literal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmt_offset: Option<String>,

    /// Whether DST is in effect. Either "0" (no) or "1" (yes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst: Option<String>,

    /// Unix time in UTC when the current zone offset starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_start: Option<String>,

    /// Unix time in UTC when the current zone offset ends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_end: Option<String>,

    /// Current local time in Unix time. Subtract gmtOffset to get UTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Formatted local time, `Y-m-d H:i:s`. E.g. `2024-07-15 10:16:18`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,

    /// Total pages of the result when it exceeds 25 records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_page: Option<String>,

    /// Current page when navigating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<String>,
}

/// A JSON scalar captured in its string form. The API stringifies every
/// value, but numbers and booleans show up in older captures, so those are
/// rendered rather than rejected.
struct WireValue(String);

impl<'de> Deserialize<'de> for WireValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ScalarVisitor;

        impl Visitor<'_> for ScalarVisitor {
            type Value = WireValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON scalar")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(WireValue(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(WireValue(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(WireValue(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(WireValue(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(WireValue(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(WireValue(if v { "1" } else { "0" }.to_string()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

impl<'de> Deserialize<'de> for GetTimeZoneDto {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DtoVisitor;

        impl<'de> Visitor<'de> for DtoVisitor {
            type Value = GetTimeZoneDto;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a TimeZoneDB response object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut dto = GetTimeZoneDto::default();

                while let Some(key) = map.next_key::<String>()? {
                    let slot = match key.to_ascii_lowercase().as_str() {
                        "status" => &mut dto.status,
                        "errormessage" => &mut dto.error_message,
                        "countrycode" => &mut dto.country_code,
                        "countryname" => &mut dto.country_name,
                        "regionname" => &mut dto.region_name,
                        "cityname" => &mut dto.city_name,
                        "zonename" => &mut dto.zone_name,
                        "abbreviation" => &mut dto.abbreviation,
                        "nextabbreviation" => &mut dto.next_abbreviation,
                        "gmtoffset" => &mut dto.gmt_offset,
                        "dst" => &mut dto.dst,
                        "zonestart" => &mut dto.zone_start,
                        "zoneend" => &mut dto.zone_end,
                        "timestamp" => &mut dto.timestamp,
                        "formatted" => &mut dto.formatted,
                        "totalpage" => &mut dto.total_page,
                        "currentpage" => &mut dto.current_page,
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                            continue;
                        }
                    };
                    *slot = map.next_value::<Option<WireValue>>()?.map(|v| v.0);
                }

                Ok(dto)
            }
        }

        deserializer.deserialize_map(DtoVisitor)
    }
}

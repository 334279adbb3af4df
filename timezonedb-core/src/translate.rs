use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};
use crate::model::{GetTimeZoneResponse, GetTimeZoneResult, ResponseStatus};
use crate::wire::GetTimeZoneDto;

const FORMATTED_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// Which wire field carries the current local time, and how it is encoded.
///
/// The service changed conventions between API revisions, so the active one
/// is configuration rather than a hardcoded guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampFormat {
    /// `timestamp` holds local Unix time (epoch seconds already shifted by
    /// the zone offset). The `formatted` field is ignored.
    #[default]
    EpochSeconds,
    /// `formatted` holds a `Y-m-d H:i:s` local date-time. The `timestamp`
    /// field is ignored.
    FormattedLocal,
}

/// How strictly the `dst` flag is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstHandling {
    /// Absent or blank means "not reported"; any other value is compared
    /// against `"1"`.
    #[default]
    BlankAsAbsent,
    /// Only `"0"` and `"1"` (or blank) are accepted; anything else is a
    /// malformed field.
    Strict,
}

/// Converts between [`GetTimeZoneDto`] and [`GetTimeZoneResponse`].
///
/// Wire-to-domain conversion is all-or-nothing: the first field that fails
/// to parse aborts the whole translation with an error naming that field.
/// Domain-to-wire conversion cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Translator {
    pub timestamp: TimestampFormat,
    pub dst: DstHandling,
}

impl Translator {
    pub fn new(timestamp: TimestampFormat, dst: DstHandling) -> Self {
        Self {
            timestamp,
            dst,
        }
    }

    /// Validate a wire payload into the domain model.
    pub fn to_model(&self, dto: &GetTimeZoneDto) -> Result<GetTimeZoneResponse> {
        let status = match &dto.status {
            None => {
                return Err(Error::MalformedResponse(
                    "status field is absent".to_string(),
                ));
            }
            Some(raw) => match raw.trim().to_uppercase().as_str() {
                "OK" => ResponseStatus::Ok,
                "FAILED" => ResponseStatus::Failed,
                _ => {
                    return Err(Error::MalformedResponse(format!(
                        "unrecognized status {raw:?}"
                    )));
                }
            },
        };

        let error_message = dto
            .error_message
            .clone()
            .filter(|message| !message.trim().is_empty());

        let result = match status {
            ResponseStatus::Ok => Some(self.result_from(dto)?),
            ResponseStatus::Failed => None,
        };

        Ok(GetTimeZoneResponse {
            status,
            error_message,
            result,
        })
    }

    fn result_from(&self, dto: &GetTimeZoneDto) -> Result<GetTimeZoneResult> {
        // zoneName and gmtOffset are required on OK responses; an absent
        // field behaves like an empty string and fails below.
        let zone_name = dto.zone_name.as_deref().unwrap_or_default();
        let time_zone: Tz = zone_name
            .parse()
            .map_err(|_| Error::UnknownTimeZone(zone_name.to_string()))?;

        let raw_offset = dto.gmt_offset.as_deref().unwrap_or_default();
        let gmt_offset = parse_gmt_offset(raw_offset)
            .ok_or_else(|| Error::malformed_field("gmtOffset", raw_offset))?;

        Ok(GetTimeZoneResult {
            country_code: dto.country_code.clone(),
            country_name: dto.country_name.clone(),
            region_name: dto.region_name.clone(),
            city_name: dto.city_name.clone(),
            time_zone,
            abbreviation: dto.abbreviation.clone(),
            next_abbreviation: dto.next_abbreviation.clone(),
            gmt_offset,
            dst: self.parse_dst(dto.dst.as_deref())?,
            zone_start: parse_epoch_instant("zoneStart", dto.zone_start.as_deref())?,
            zone_end: parse_epoch_instant("zoneEnd", dto.zone_end.as_deref())?,
            local_time: self.parse_local_time(dto)?,
            total_page: parse_page("totalPage", dto.total_page.as_deref())?,
            current_page: parse_page("currentPage", dto.current_page.as_deref())?,
        })
    }

    fn parse_dst(&self, value: Option<&str>) -> Result<Option<bool>> {
        let raw = value.unwrap_or_default();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match self.dst {
            DstHandling::BlankAsAbsent => Ok(Some(trimmed == "1")),
            DstHandling::Strict => match trimmed {
                "0" => Ok(Some(false)),
                "1" => Ok(Some(true)),
                _ => Err(Error::malformed_field("dst", raw)),
            },
        }
    }

    fn parse_local_time(&self, dto: &GetTimeZoneDto) -> Result<Option<NaiveDateTime>> {
        match self.timestamp {
            TimestampFormat::EpochSeconds => {
                let Some(raw) = dto.timestamp.as_deref() else {
                    return Ok(None);
                };
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                let seconds: i64 = trimmed
                    .parse()
                    .map_err(|_| Error::malformed_field("timestamp", raw))?;
                DateTime::from_timestamp(seconds, 0)
                    .map(|instant| Some(instant.naive_utc()))
                    .ok_or_else(|| Error::malformed_field("timestamp", raw))
            }
            TimestampFormat::FormattedLocal => {
                let Some(raw) = dto.formatted.as_deref() else {
                    return Ok(None);
                };
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                NaiveDateTime::parse_from_str(trimmed, FORMATTED_PATTERN)
                    .map(Some)
                    .map_err(|_| Error::malformed_field("formatted", raw))
            }
        }
    }

    /// Render a domain response back into its wire form. The inverse of
    /// [`Translator::to_model`] for every losslessly encoded field.
    pub fn to_dto(&self, model: &GetTimeZoneResponse) -> GetTimeZoneDto {
        let result = model.result.as_ref();

        let mut dto = GetTimeZoneDto {
            status: Some(model.status.as_str().to_string()),
            error_message: model.error_message.clone(),
            country_code: result.and_then(|r| r.country_code.clone()),
            country_name: result.and_then(|r| r.country_name.clone()),
            region_name: result.and_then(|r| r.region_name.clone()),
            city_name: result.and_then(|r| r.city_name.clone()),
            zone_name: result.map(|r| r.time_zone.name().to_string()),
            abbreviation: result.and_then(|r| r.abbreviation.clone()),
            next_abbreviation: result.and_then(|r| r.next_abbreviation.clone()),
            gmt_offset: result.map(|r| r.gmt_offset.num_seconds().to_string()),
            dst: result
                .and_then(|r| r.dst)
                .map(|dst| if dst { "1" } else { "0" }.to_string()),
            zone_start: result
                .and_then(|r| r.zone_start)
                .map(|instant| instant.timestamp().to_string()),
            zone_end: result
                .and_then(|r| r.zone_end)
                .map(|instant| instant.timestamp().to_string()),
            timestamp: None,
            formatted: None,
            total_page: result.and_then(|r| r.total_page).map(|p| p.to_string()),
            current_page: result.and_then(|r| r.current_page).map(|p| p.to_string()),
        };

        if let Some(local) = result.and_then(|r| r.local_time) {
            match self.timestamp {
                TimestampFormat::EpochSeconds => {
                    dto.timestamp = Some(local.and_utc().timestamp().to_string());
                }
                TimestampFormat::FormattedLocal => {
                    dto.formatted = Some(local.format(FORMATTED_PATTERN).to_string());
                }
            }
        }

        dto
    }
}

/// Parse the textual UTC offset. Both observed encodings are accepted: a
/// signed integer of seconds (`"3600"`) and a clock literal
/// (`"[-]H:MM[:SS]"`).
fn parse_gmt_offset(raw: &str) -> Option<TimeDelta> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(seconds) = trimmed.parse::<i64>() {
        return Some(TimeDelta::seconds(seconds));
    }

    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut parts = rest.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = match parts.next() {
        Some(part) => part.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some()
        || hours < 0
        || !(0..60).contains(&minutes)
        || !(0..60).contains(&seconds)
    {
        return None;
    }

    let total = hours * 3600 + minutes * 60 + seconds;
    Some(TimeDelta::seconds(if negative { -total } else { total }))
}

fn parse_epoch_instant(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let seconds: i64 = trimmed
        .parse()
        .map_err(|_| Error::malformed_field(field, raw))?;
    DateTime::from_timestamp(seconds, 0)
        .map(Some)
        .ok_or_else(|| Error::malformed_field(field, raw))
}

fn parse_page(field: &'static str, value: Option<&str>) -> Result<Option<u32>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| Error::malformed_field(field, raw))
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use timezonedb_core::{
    CityRequest, Config, CoordinateRequest, GetTimeZoneResponse, GetTimeZoneResult,
    TimeZoneDbClient,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tzdb", version, about = "TimeZoneDB lookup CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the TimeZoneDB API key.
    Configure,

    /// Look up the time zone at a geographic coordinate.
    Coordinate {
        /// Latitude in degrees, within [-90, 90].
        latitude: f64,

        /// Longitude in degrees, within [-180, 180].
        longitude: f64,
    },

    /// Look up the time zone of a city.
    City {
        /// City / place name.
        city: String,

        /// Country name or ISO code.
        country: String,

        /// Optional region / state to narrow the lookup.
        #[arg(long)]
        region: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Coordinate {
                latitude,
                longitude,
            } => {
                let request = CoordinateRequest::new(latitude, longitude)?;
                let response = client_from_config()?
                    .get_time_zone_by_coordinate(&request)
                    .await?;
                print_response(&response);
                Ok(())
            }
            Command::City {
                city,
                country,
                region,
            } => {
                let mut request = CityRequest::new(city, country)?;
                if let Some(region) = region {
                    request = request.with_region(region);
                }
                let response = client_from_config()?.get_time_zone_by_city(&request).await?;
                print_response(&response);
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("TimeZoneDB API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.save()?;

    println!("API key saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn client_from_config() -> anyhow::Result<TimeZoneDbClient> {
    let config = Config::load()?;
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Hint: run `tzdb configure` and enter your API key."
        )
    })?;

    Ok(TimeZoneDbClient::new(api_key)?)
}

fn print_response(response: &GetTimeZoneResponse) {
    if !response.is_successful() {
        let message = response
            .error_message
            .as_deref()
            .unwrap_or("no error message");
        println!("Lookup FAILED: {message}");
        return;
    }

    let Some(result) = &response.result else {
        println!("Lookup OK, but the service returned no result.");
        return;
    };

    println!("Time zone:    {}", result.time_zone);
    println!("UTC offset:   {}", format_offset(result));

    if let Some(abbreviation) = &result.abbreviation {
        println!("Abbreviation: {abbreviation}");
    }
    match result.dst {
        Some(true) => println!("DST:          in effect"),
        Some(false) => println!("DST:          not in effect"),
        None => {}
    }
    if let Some(location) = location_line(result) {
        println!("Location:     {location}");
    }
    if let Some(start) = result.zone_start {
        println!("Offset since: {start}");
    }
    if let Some(end) = result.zone_end {
        println!("Offset until: {end}");
    }
    if let Some(local) = result.local_time {
        println!("Local time:   {local}");
    }
}

fn format_offset(result: &GetTimeZoneResult) -> String {
    let seconds = result.gmt_offset.num_seconds();
    let sign = if seconds < 0 { '-' } else { '+' };
    format!(
        "{}{:02}:{:02}",
        sign,
        seconds.abs() / 3600,
        (seconds.abs() % 3600) / 60
    )
}

fn location_line(result: &GetTimeZoneResult) -> Option<String> {
    let parts: Vec<&str> = [
        result.city_name.as_deref(),
        result.region_name.as_deref(),
        result.country_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

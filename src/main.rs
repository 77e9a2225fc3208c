use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use misty_ui::LookupModel;
use misty_weather::Coordinate;

#[derive(Parser, Debug)]
#[command(name = "misty")]
#[command(about = "Tap a point, get the weather and its heat index danger level")]
struct Args {
    /// Latitude of the tapped point
    #[arg(long, default_value_t = 14.6258, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the tapped point
    #[arg(long, default_value_t = 121.0617, allow_hyphen_values = true)]
    lon: f64,

    /// Turn the heat index warning off for this session
    #[arg(long)]
    no_warning: bool,

    /// Seconds to wait for the lookup to finish
    #[arg(long, default_value_t = 20)]
    timeout: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize core
    misty_core::init()?;

    // Create and initialize application
    let mut app = misty_core::App::new()?;
    app.initialize()?;

    tracing::info!("Misty started");

    if !misty_ui::bridge::initialize_lookup_services(app.config()) {
        anyhow::bail!("Lookup services failed to initialize");
    }
    let runtime = misty_ui::bridge::get_runtime().context("Runtime not available")?;

    let warning_enabled = app.config().warning.enabled && !args.no_warning;
    let mut model =
        LookupModel::from_bridge(warning_enabled).context("Lookup services not ready")?;

    let coordinate = Coordinate::new(args.lat, args.lon);
    model.tap(coordinate);

    let settled = runtime.block_on(model.settle(Duration::from_secs(args.timeout)));
    if !settled {
        println!("Lookup at {} timed out.", coordinate);
    } else if let Some(message) = model.error_message() {
        println!("{}", message);
    } else if let Some(reading) = model.reading() {
        println!("{}", reading.city_name);
        println!("  {}", reading.description);
        println!(
            "  Temperature {:.1}°C (min {:.1}°C, max {:.1}°C)",
            reading.temperature_c, reading.min_temp_c, reading.max_temp_c
        );
        println!("  Feels like  {:.1}°C", reading.feels_like_c);
        println!("  Humidity    {}%", reading.humidity_pct);
        println!("  Pressure    {} hPa", reading.pressure_hpa);
        println!("  Visibility  {:.1} km", reading.visibility_km());
        println!("  Wind        {:.1} m/s", reading.wind_speed_ms);

        if model.should_show_warning() {
            if let Some(info) = model.hazard_info() {
                println!();
                println!("[{}] {}", info.color, info.title);
                println!("  {}", info.explanation);
            }
        }
    }

    // Graceful shutdown
    app.shutdown()?;

    Ok(())
}

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use venuecal::config::EngineConfig;
use venuecal::engine::Engine;
use venuecal::model::{CategoryFilter, NewVenue, VenueQuery};
use venuecal::notify::NotifyHub;

fn seed_venues() -> Vec<NewVenue> {
    vec![
        NewVenue {
            name: "yio chu kang stadium".into(),
            kind: "Stadium".into(),
            location: "East".into(),
            capacity: 1235,
            description: "fitness corner".into(),
        },
        NewVenue {
            name: "LT123".into(),
            kind: "Hall".into(),
            location: "North".into(),
            capacity: 123,
            description: "boring".into(),
        },
        NewVenue {
            name: "Room151".into(),
            kind: "Room".into(),
            location: "South".into(),
            capacity: 50,
            description: "for lessons".into(),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let metrics_port: Option<u16> = std::env::var("VENUECAL_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    venuecal::observability::init(metrics_port)?;

    let config = EngineConfig::from_env();
    info!("venuecal starting");
    info!("  horizon_days: {}", config.horizon_days);
    info!(
        "  query_window: {}..={}",
        config.query_window.min, config.query_window.max
    );
    info!("  metrics: {}", metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    let engine = Engine::new(config, Arc::new(NotifyHub::new()));
    for venue in seed_venues() {
        engine.add_venue(venue).await?;
    }

    let first = engine
        .venue_id_by_name("yio chu kang stadium")
        .await
        .ok_or("seed venue missing")?;
    let availability = engine.availability(first, None).await?;
    let (cap_min, cap_max) = engine.capacity_bounds().await?;
    let large = engine
        .filter_venues(&VenueQuery {
            location: CategoryFilter::parse("All"),
            kind: CategoryFilter::parse("All"),
            cap_min: 100,
            cap_max,
        })
        .await;

    let summary = json!({
        "venues": engine.list_venues().await,
        "kinds": engine.kind_list().await,
        "locations": engine.location_list().await,
        "capacity": { "min": cap_min, "max": cap_max },
        "capacity_at_least_100": large.order,
        "availability": { "venue_id": first, "view": availability },
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

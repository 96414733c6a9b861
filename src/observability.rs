use std::net::SocketAddr;
use std::time::Instant;

/// Gauge: venues in the catalog.
pub const VENUES_ACTIVE: &str = "venuecal_venues_active";

/// Counter: slots reserved.
pub const BOOKINGS_RESERVED_TOTAL: &str = "venuecal_bookings_reserved_total";

/// Counter: slots released (direct release or owner cancellation).
pub const BOOKINGS_RELEASED_TOTAL: &str = "venuecal_bookings_released_total";

/// Counter: reservations rejected because the slot was taken or outside the horizon.
pub const RESERVATION_CONFLICTS_TOTAL: &str = "venuecal_reservation_conflicts_total";

/// Histogram: mutation latency in seconds. Labels: operation.
pub const OPERATION_DURATION_SECONDS: &str = "venuecal_operation_duration_seconds";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

pub(crate) fn record_duration(operation: &'static str, started: Instant) {
    metrics::histogram!(OPERATION_DURATION_SECONDS, "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}

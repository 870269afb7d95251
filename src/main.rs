use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinema_seating::{config::Config, LayoutConfig, PricingTable, SeatStore, SeatTypeFilter};

// Usage: cinema-seating [group_size] [seat_type]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting cinema seating ({})", config.app.environment);

    let mut args = std::env::args().skip(1);
    let group_size: usize = match args.next() {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("group size must be a number, got {raw:?}"))?,
        None => config.allocation.group_size,
    };
    let seat_type: SeatTypeFilter = match args.next() {
        Some(raw) => raw.parse()?,
        None => config.allocation.seat_type,
    };

    // Open the seat map, generating the default hall on first run
    let store = SeatStore::open(
        config.store.path.clone(),
        config.store.autosave,
        LayoutConfig::cinema_default(),
        PricingTable::default(),
    )
    .await
    .context("Failed to open seat map")?;

    let (version, group) = store.recommend(group_size, seat_type).await;
    if group.is_empty() {
        warn!("No suitable seats for a group of {} ({})", group_size, seat_type);
    } else {
        info!("Best seats for a group of {}: {}", group_size, group.labels().join(", "));
    }

    let report = serde_json::json!({
        "version": version,
        "groupSize": group_size,
        "seatType": seat_type,
        "totalPrice": group.total_price(),
        "seats": &group,
        "stats": store.stats().await,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

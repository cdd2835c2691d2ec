#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use motel_desk::{
    config::{database, env, motel},
    core::{
        alerts::expiring_rooms, billing::audit_open_stays, clock::SystemClock, seed::seed_from_config,
        shift::ShiftClock,
    },
    errors::Result,
    sync::{SnapshotStore, Table},
};
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load motel settings and seed inventory
    let config_path = env::config_path();
    let app_config = motel::load_config(&config_path)
        .inspect_err(|e| error!("Failed to load {}: {}", config_path, e))?;
    let settings = app_config.motel.clone();
    let clock = ShiftClock::new(settings.time_zone()?, Arc::new(SystemClock));
    info!("Loaded configuration from {config_path}");

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Seed the inventory declared in config.toml
    let seeded = seed_from_config(&db, &app_config)
        .await
        .inspect_err(|e| error!("Failed to seed inventory: {}", e))?;
    info!("Seeding inserted {} rows.", seeded.total());

    if let Err(e) = env::admin_password() {
        warn!("Rate administration is disabled: {}", e);
    }

    // 6. Check every running stay against its ledger
    let mismatches = audit_open_stays(&db, &clock).await?;
    if mismatches.is_empty() {
        info!("All open stays match their ledgers.");
    }

    let now = clock.now_info();
    info!(
        "Front desk running: turno {} of {}",
        now.shift.label(),
        now.operational_date
    );

    // 7. Keep the table snapshots fresh
    let store = Arc::new(SnapshotStore::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = tokio::spawn(Arc::clone(&store).run_refresher(db.clone(), shutdown_rx));

    // 8. Expiry alerts until Ctrl-C
    let window = chrono::Duration::minutes(settings.expiry_warning_minutes);
    let mut ticker =
        tokio::time::interval(Duration::from_secs(settings.alert_interval_seconds.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let rooms = store.rooms().await;
                for alert in expiring_rooms(&rooms, clock.now(), window) {
                    if alert.is_overdue() {
                        warn!(
                            room_id = alert.room_id,
                            "Room '{}' is {} minutes past check-out",
                            alert.room_name,
                            -alert.minutes_remaining
                        );
                    } else {
                        warn!(
                            room_id = alert.room_id,
                            "Room '{}' checks out in {} minutes",
                            alert.room_name,
                            alert.minutes_remaining
                        );
                    }
                }
                // No push channel in this process: poll rooms once per tick.
                store.invalidate(Table::Rooms);
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Shutdown requested.");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = refresher.await {
        error!("Snapshot refresher ended abnormally: {}", e);
    }
    Ok(())
}

use std::sync::Arc;
use std::time::Duration;

use mdgate_config::GatewayConfig;
use mdgate_ingest::{IngestAdapter, VendorRecord};
use mdgate_writer::Writer;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/mdgate/mdgate.toml".to_string());
    let config = GatewayConfig::load(config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .init();

    let mut writer = Writer::create(&config.region_name, config.symbol_count())?;
    for (id, symbol) in config.symbols.iter().enumerate() {
        writer.write_symbol_dir_entry(id as u32, symbol)?;
    }

    info!(
        region = %config.region_name,
        symbol_count = config.symbol_count(),
        "mdgate: region created"
    );

    let adapter = Arc::new(IngestAdapter::new(writer, &config.symbols, &config.limit_ratio_overrides));

    spawn_heartbeat(Arc::clone(&adapter), Duration::from_millis(config.heartbeat_interval_ms));

    if config.mock_feed {
        run_mock_feed(&adapter, &config.symbols);
    } else {
        info!("mdgate: no live feed wired; running in standby mode");
        loop {
            std::thread::sleep(Duration::from_secs(3600));
        }
    }

    Ok(())
}

/// Updates `heartbeat_ns` at `interval` (§5). Runs for the lifetime of the
/// process; the main thread owns feed ingestion.
fn spawn_heartbeat(adapter: Arc<IngestAdapter>, interval: Duration) {
    std::thread::spawn(move || loop {
        adapter.writer().update_heartbeat(mdgate_abi::clock::now_ns());
        std::thread::sleep(interval);
    });
}

/// `--mock` / `mock_feed` mode (§4 supplement): publishes deterministic
/// canonical payloads on a timer so the writer/reader pair can be
/// exercised without a live vendor feed.
fn run_mock_feed(adapter: &IngestAdapter, symbols: &[String]) {
    info!(symbol_count = symbols.len(), "mdgate: running synthetic feed");
    let mut tick: i64 = 0;
    loop {
        for symbol in symbols {
            tick += 1;
            let record = VendorRecord {
                wind_code: symbol.clone(),
                pre_close_x10000: 100_000,
                last_x10000: 100_000 + tick,
                volume: tick,
                turnover: tick * 100_000,
                ..Default::default()
            };
            let declared_len = std::mem::size_of::<VendorRecord>();
            if let Err(err) = adapter.ingest_tick(&record, declared_len) {
                let hit = adapter.rejected_unknown_symbol() + adapter.rejected_unparseable_symbol();
                if IngestAdapter::should_log_rejection(hit) {
                    debug!(%err, "mdgate: tick rejected");
                }
            }
        }
        std::thread::sleep(Duration::from_millis(200));
    }
}

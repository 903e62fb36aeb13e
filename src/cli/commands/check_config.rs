//! Check-config command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    config.validate()?;

    println!("Configuration OK");
    println!("{:-<50}", "");
    println!("  Database:        {}", config.general.database_path);
    println!("  Media path:      {}", config.general.media_path);
    println!(
        "  Listen address:  {}:{}",
        config.server.bind_address, config.server.port
    );
    println!(
        "  Token TTLs:      access {} min, refresh {} h",
        config.security.access_token_ttl_minutes, config.security.refresh_token_ttl_hours
    );
    println!(
        "  JWT secret:      {}",
        if config.security.jwt_secret.is_empty() {
            "ephemeral (generated at startup)"
        } else {
            "configured"
        }
    );
    println!(
        "  Online window:   {} s",
        config.telemetry.freshness_window_seconds
    );
    println!(
        "  Metrics:         {}",
        if config.observability.metrics_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    let store = Store::new(&config.general.database_path).await?;
    store.ping().await?;
    println!("  Database reachable, migrations applied");

    Ok(())
}

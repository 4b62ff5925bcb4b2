//! `council serve` — Start the HTTP server and web UI.

use council_config::AppConfig;

pub async fn run(
    port_override: Option<u16>,
    host_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }
    if let Some(host) = host_override {
        config.gateway.host = host;
    }

    if !config.has_api_key() {
        return Err(super::ask::missing_key_message().into());
    }

    println!("🧠 Council");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.provider.model);
    println!(
        "   Agents:    {}",
        config
            .agents
            .iter()
            .map(|a| a.role.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    council_gateway::start(config).await?;

    Ok(())
}

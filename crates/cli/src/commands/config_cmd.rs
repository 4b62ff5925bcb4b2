//! `council config` — Configuration management commands.

use council_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    let config = match AppConfig::load().and_then(|c| c.validate().map(|()| c)) {
        Ok(config) => config,
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    };
    println!("   ✅ Config parsed and validated");

    let warnings = warnings(&config);
    if warnings.is_empty() {
        println!("   ✅ All checks passed");
    } else {
        println!();
        for w in &warnings {
            println!("   ⚠️  {w}");
        }
    }

    println!();
    println!("   Provider:  {} ({})", config.provider.name, config.provider.api_url);
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
    println!(
        "   Memory:    {}",
        if config.memory.enabled {
            format!(
                "rolling, {} entries, {} per call",
                config.memory.capacity, config.memory.history_limit
            )
        } else {
            "disabled".to_string()
        }
    );
    println!("   Gateway:   {}:{}", config.gateway.host, config.gateway.port);

    Ok(())
}

/// Non-fatal problems worth pointing out.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if !config.has_api_key() {
        warnings.push("No API key set (set COUNCIL_API_KEY or FIREWORKS_API_KEY)");
    }
    if config.memory.enabled && config.memory.history_limit > config.memory.capacity {
        warnings.push("memory.history_limit exceeds memory.capacity");
    }
    if config.retry.retries > 3 {
        warnings.push("More than 3 retries per call can make runs very slow");
    }

    warnings
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if config.api_key.is_some() {
        config.api_key = Some("[REDACTED]".into());
    }
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", AppConfig::default_toml());
    Ok(())
}

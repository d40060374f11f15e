// # update-ipv6-access-url
//
// Publishes the IPv6 address of one network interface as a custom access
// URL of a Plex media server, replacing the URL a previous run published.
//
// This binary is a thin integration layer:
// 1. Read configuration from environment variables
// 2. Install logging
// 3. Pick the collaborators (interface, discovery client, preferences store)
// 4. Run the updater once and map the outcome to an exit code
//
// ## Configuration
//
// - `V6ACCESS_INTERFACE`: Network interface to read IPv6 addresses from (required)
// - `V6ACCESS_USE`: Which address(es) to publish: first, last, all (default: first)
// - `V6ACCESS_CAPITALIZATION`: Case of the dashed address: lower, upper (default: lower)
// - `V6ACCESS_SERVER_ADDRESS`: Server API address, e.g. `http://127.0.0.1:32400`
// - `V6ACCESS_CONFIG_PATH`: Path to the server's `Preferences.xml`
// - `V6ACCESS_TOKEN`: Access token (required without `V6ACCESS_CONFIG_PATH`)
// - `V6ACCESS_TIMEOUT_SECS`: HTTP timeout in seconds (default: 5)
// - `V6ACCESS_DISCOVERY_URL`: Discovery API base URL (default: `https://plex.tv/api`)
// - `V6ACCESS_DISCOVERY_DOMAIN`: Discovery domain (default: `plex.direct`)
// - `V6ACCESS_MODE`: Set to `dry-run` to log the new value without writing it
// - `V6ACCESS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `V6ACCESS_LOG_COLOR`: Colorize log output (default: off)
//
// With `V6ACCESS_SERVER_ADDRESS` set, preferences are read and written
// through the server's API. Otherwise the preferences file is edited
// directly. When a preferences file is given, its token takes precedence
// over `V6ACCESS_TOKEN`.
//
// ## Example
//
// ```bash
// export V6ACCESS_INTERFACE=eth0
// export V6ACCESS_SERVER_ADDRESS=http://127.0.0.1:32400
// export V6ACCESS_CONFIG_PATH="/var/lib/plexmediaserver/Library/Application Support/Plex Media Server/Preferences.xml"
//
// update-ipv6-access-url
// ```

mod config;

use anyhow::Result;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;
use v6access_core::traits::{AddressSource, PreferencesStore};
use v6access_core::{AccessUrlUpdater, ConfigFileStore, UpdateOutcome};
use v6access_iface::InterfaceAddressSource;
use v6access_plex::PlexApiClient;

use config::Config;

/// Exit codes for different termination scenarios
///
/// - 0: Success
/// - 1: Configuration error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy)]
enum UpdaterExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<UpdaterExitCode> for ExitCode {
    fn from(code: UpdaterExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return UpdaterExitCode::ConfigError.into();
    }

    let log_level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(config.log_color)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return UpdaterExitCode::ConfigError.into();
    }

    debug!("Configuration loaded: {:?}", config);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return UpdaterExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_update(config).await {
            Ok(outcome) => {
                report(&outcome);
                UpdaterExitCode::Success
            }
            Err(e) => {
                error!("Failed to update custom access URLs: {:#}", e);
                UpdaterExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run the updater once
async fn run_update(config: Config) -> Result<UpdateOutcome> {
    let source = InterfaceAddressSource::new(&config.interface);
    let candidates = source.addresses().await?;
    info!(
        "Found {} global IPv6 address(es) on {}: {:?}",
        candidates.len(),
        config.interface,
        candidates
    );

    let file_store = match config.config_path {
        Some(ref path) => {
            info!("Reading preferences file {}", path.display());
            Some(ConfigFileStore::open(path).await?)
        }
        None => None,
    };

    let token = match (&file_store, &config.token) {
        (Some(store), _) => store
            .token()
            .await
            .ok_or_else(|| anyhow::anyhow!("Preferences file has no access token"))?,
        (None, Some(token)) => token.clone(),
        (None, None) => anyhow::bail!("No access token configured"),
    };

    let discovery = PlexApiClient::new(&config.discovery_url, token.clone(), config.timeout())?;

    let store: Box<dyn PreferencesStore> = match (&config.server_address, file_store) {
        (Some(address), _) => Box::new(PlexApiClient::new(address, token, config.timeout())?),
        (None, Some(store)) => Box::new(store),
        (None, None) => anyhow::bail!("No server address or preferences file configured"),
    };
    info!("Using {} preferences store", store.store_name());

    let (updater, mut event_rx) =
        AccessUrlUpdater::new(Box::new(discovery), store, config.updater_config())?;

    let result = updater.run(&candidates).await;

    while let Ok(event) = event_rx.try_recv() {
        debug!("Updater event: {:?}", event);
    }

    Ok(result?)
}

fn report(outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::Updated { .. } => {
            info!("Successfully updated IPv6 custom access URLs");
        }
        UpdateOutcome::Unchanged { .. } => {
            info!("IPv6 custom access URLs already up to date");
        }
        UpdateOutcome::DryRun { previous, proposed } => {
            info!("Dry run: {} -> {}", previous, proposed);
        }
    }
}

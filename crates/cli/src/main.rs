#![forbid(unsafe_code)]

mod cli;
mod commands;

use std::path::Path;
use std::sync::Arc;

use adapters::storage::RedbLagRuleStore;
use anyhow::{Context, Result};
use domain::lag_alert::entity::{LagRuleDraft, LagRuleEdit};
use infrastructure::config::{RegistryConfig, StorageBackend, StorageConfig};
use infrastructure::constants::DEFAULT_CONFIG_PATH;
use infrastructure::logging::init_logging;
use ports::secondary::lag_rule_store::LagRuleStore;
use tracing::info;

use cli::Command;
use commands::{ListArgs, RuleServices};

fn main() -> Result<()> {
    let cli = cli::parse();
    let output = cli.output;

    if matches!(cli.command, Command::Version) {
        println!("lagwatch {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = load_config(&cli.config)?;
    init_logging(
        cli.log_level.unwrap_or(config.logging.level),
        cli.log_format.unwrap_or(config.logging.format),
    )?;

    let store = open_store(&config.storage)?;
    let services = RuleServices::new(store, &config);

    match cli.command {
        Command::Version => Ok(()),

        Command::Create {
            target,
            group,
            topic,
            threshold,
            owner,
        } => {
            let draft = LagRuleDraft {
                cluster: target.cluster,
                group,
                topic,
                lag_threshold: threshold,
                owner,
            };
            commands::cmd_create(&services, &draft, output).map(|_| ())
        }

        Command::List {
            target,
            search,
            offset,
            limit,
            echo,
        } => commands::cmd_list(
            &services,
            ListArgs {
                cluster: target.cluster,
                search,
                offset,
                limit,
                echo,
            },
            output,
        ),

        Command::Show { target, id } => commands::cmd_show(&services, &target.cluster, id, output),

        Command::Update {
            target,
            id,
            threshold,
            owner,
        } => {
            let edit = LagRuleEdit {
                lag_threshold: threshold,
                owner,
            };
            commands::cmd_update(&services, &target.cluster, id, &edit, output)
        }

        Command::Delete { target, id } => commands::cmd_delete(&services, &target.cluster, id),
    }
}

/// Load the config file. A missing file at the default location falls back
/// to built-in defaults; an explicitly named file must exist.
fn load_config(path: &str) -> Result<RegistryConfig> {
    let file = Path::new(path);
    if path == DEFAULT_CONFIG_PATH && !file.exists() {
        return Ok(RegistryConfig::default());
    }
    RegistryConfig::load(file).with_context(|| format!("failed to load config from {path}"))
}

fn open_store(storage: &StorageConfig) -> Result<Arc<dyn LagRuleStore>> {
    match storage.backend {
        StorageBackend::Redb => {
            let path = Path::new(&storage.path);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create storage directory {}", parent.display())
                })?;
            }
            let store = RedbLagRuleStore::open(path)
                .with_context(|| format!("failed to open rule store at {}", storage.path))?;
            info!(backend = %storage.backend, path = %storage.path, "rule store opened");
            Ok(Arc::new(store))
        }
    }
}

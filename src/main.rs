/// skfix
use crate::Error::*;
use clap::{Parser, Subcommand};
use log::{debug, error, info, warn};
use skfix::profiles::ActivationContext;
use skfix::{config, loader, schema, validation, LoadOptions};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Upgrade skaffold configuration files to the latest schema version.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the skaffold configuration file.
    #[arg(short, long, default_value = "skaffold.yaml")]
    filename: String,

    /// Path to the skfix configuration file.
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upgrade the configuration to the latest version and print it to standard output.
    Fix {
        /// Write the upgraded configuration back to the file instead.
        #[arg(long)]
        overwrite: bool,
    },
    /// Print the effective configuration after profiles and defaults are applied.
    Inspect {
        /// Activate a profile by name. Prefix with `-` to keep it from activating automatically.
        #[arg(short, long = "profile")]
        profiles: Vec<String>,

        /// Kubernetes context matched against profile activation.
        #[arg(long)]
        kube_context: Option<String>,

        /// Command name matched against profile activation, e.g. `dev`.
        #[arg(long)]
        command: Option<String>,

        /// Leave unset fields unset.
        #[arg(long)]
        skip_defaults: bool,
    },
    /// List every supported schema version, oldest first.
    Versions,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("filesystem error: {0}")]
    FilesystemError(#[from] std::io::Error),

    #[error("read {path}: {err}")]
    ReadFile { err: std::io::Error, path: String },

    #[error("configuration file: {0}")]
    ConfigParse(#[from] config::Error),

    #[error("{0}")]
    Schema(#[from] schema::Error),

    #[error("{0}")]
    Load(#[from] loader::Error),

    #[error("{0} lossy conversion(s) and fail_on_lossy_sync is set")]
    Lossy(usize),

    #[error("{0} validation error(s)")]
    Invalid(usize),

    #[error("serialize configuration: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Read configuration file from disk and merge it with the
/// `default.toml` [built-in config](../default.toml).
///
/// If a configuration file name is not set explicitly, this function will
/// detect whether a config file with the default file name exists in the
/// working directory. If it does, it is used implicitly.
fn read_config(args: &Cli) -> Result<config::File, Error> {
    const DEFAULT_CONFIG_FILE: &str = "skfix.toml";

    let config_file = match &args.config {
        None => {
            if std::fs::metadata(DEFAULT_CONFIG_FILE)
                .map(|metadata| metadata.is_file())
                .unwrap_or(false)
            {
                Some(DEFAULT_CONFIG_FILE.to_string())
            } else {
                None
            }
        }
        Some(c) => Some(c.clone()),
    };

    Ok(if let Some(config_file) = config_file {
        debug!("using configuration file {config_file}");
        config::File::default_with_user_config_file(&config_file)?
    } else {
        config::File::default()
    })
}

fn main() {
    match run() {
        Ok(_) => std::process::exit(0),
        Err(err) => {
            error!("fatal: {}", err);
            std::process::exit(1)
        }
    }
}

/// Warnings about lossy upgrades are shown unless `RUST_LOG` says otherwise.
fn logger() -> env_logger::Builder {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
}

fn run() -> Result<(), Error> {
    logger().init();

    let args = Cli::parse();
    let cfg_file = read_config(&args)?;

    match args.command {
        Commands::Fix { overwrite } => fix(&args.filename, &cfg_file, overwrite),
        Commands::Inspect {
            profiles,
            kube_context,
            command,
            skip_defaults,
        } => {
            let options = LoadOptions {
                profiles,
                activation: ActivationContext::from_env(kube_context, command),
                defaults: cfg_file.defaults.clone(),
                skip_defaults,
                fail_on_warnings: cfg_file.upgrade.fail_on_lossy_sync,
            };
            let loaded = loader::load(&args.filename, &options)?;
            for warning in &loaded.warnings {
                warn!("{warning}");
            }
            if !loaded.profiles.is_empty() {
                info!("profiles applied: {}", loaded.profiles.join(", "));
            }

            let errors = validation::validate(&loaded.config);
            for err in &errors {
                error!("{err}");
            }
            if !errors.is_empty() {
                return Err(Invalid(errors.len()));
            }
            print!("{}", serde_yaml::to_string(&loaded.config)?);
            Ok(())
        }
        Commands::Versions => {
            for version in schema::SCHEMA_VERSIONS {
                if version.api_version == schema::LATEST {
                    println!("{} (latest)", version.api_version);
                } else {
                    println!("{}", version.api_version);
                }
            }
            Ok(())
        }
    }
}

fn fix(path: &str, cfg_file: &config::File, overwrite: bool) -> Result<(), Error> {
    let bytes = std::fs::read(path).map_err(|err| ReadFile {
        err,
        path: path.to_string(),
    })?;
    let upgraded = schema::parse_and_upgrade(&bytes)?;
    for warning in &upgraded.warnings {
        warn!("{warning}");
    }
    if cfg_file.upgrade.fail_on_lossy_sync && !upgraded.warnings.is_empty() {
        return Err(Lossy(upgraded.warnings.len()));
    }

    let output = serde_yaml::to_string(&upgraded.config)?;
    if !overwrite {
        print!("{output}");
        return Ok(());
    }

    if upgraded.from == schema::LATEST {
        info!("{path} is already at {}", schema::LATEST);
        return Ok(());
    }
    let dir = Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(output.as_bytes())?;
    file.persist(path).map_err(|err| err.error)?;
    info!("{path} upgraded from {} to {}", upgraded.from, schema::LATEST);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_are_logged_by_default() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(logger().build().filter(), log::LevelFilter::Warn);
        }
    }
}

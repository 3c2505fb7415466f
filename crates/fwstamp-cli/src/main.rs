#![deny(unsafe_code)]

//! fwstamp CLI: version stamping and device config materialization for
//! PlatformIO firmware builds.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fwstamp_config::{EmitTarget, EnvOverlay, MaterializeConfig, ToolConfig, VersionConfig};
use fwstamp_core::build_env::{self, BuildEnv};
use fwstamp_core::{GitCli, header, materialize, timestamp, version};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// fwstamp: build-time version headers and device configuration for ESP32 firmware.
#[derive(Debug, Parser)]
#[command(name = "fwstamp", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file, relative to the project directory.
    #[arg(short, long, default_value = "fwstamp.toml", global = true)]
    config: PathBuf,

    /// Firmware project directory.
    #[arg(short = 'C', long, default_value = ".", global = true)]
    project_dir: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve the firmware version and write the version header.
    Version(VersionArgs),

    /// Materialize the device configuration for the selected profile.
    Config(ProfileArgs),

    /// Validate the device configuration without writing it.
    Check(ProfileArgs),

    /// Print the resolved tool configuration as TOML.
    ShowConfig,
}

#[derive(Debug, Args)]
struct VersionArgs {
    /// Bump the patch component of the latest tag.
    #[arg(long)]
    bump: bool,

    /// Use this version verbatim instead of resolving it from tags.
    #[arg(long = "override", value_name = "VERSION")]
    version_override: Option<String>,

    /// Do not create or push a tag for a bumped version.
    #[arg(long)]
    no_tag: bool,

    /// Expose the version to a host build system on stdout.
    #[arg(long, value_enum)]
    emit: Option<EmitArg>,

    /// Print the header to stdout instead of writing it. Nothing is tagged.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct ProfileArgs {
    /// Profile token, e.g. `prod` for `data/config.prod.json`.
    #[arg(long)]
    profile: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmitArg {
    None,
    Platformio,
    Cargo,
}

impl From<EmitArg> for EmitTarget {
    fn from(arg: EmitArg) -> Self {
        match arg {
            EmitArg::None => EmitTarget::None,
            EmitArg::Platformio => EmitTarget::PlatformIo,
            EmitArg::Cargo => EmitTarget::Cargo,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.project_dir.join(&cli.config);
    let loaded = load_config(&config_path).await?;
    let found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();

    init_tracing(cli.verbose, &config.logging.level);
    if !found {
        debug!(path = %config_path.display(), "Config file not found, using defaults");
    }

    config.apply_env(&EnvOverlay::from_process_env());

    match cli.command {
        Commands::Version(args) => {
            apply_version_args(&mut config.version, &args);
            cmd_version(&config.version, &cli.project_dir, args.dry_run).await?
        }
        Commands::Config(args) => {
            apply_profile(&mut config.materialize, args.profile);
            cmd_config(&config.materialize, &cli.project_dir).await?
        }
        Commands::Check(args) => {
            apply_profile(&mut config.materialize, args.profile);
            cmd_check(&config.materialize, &cli.project_dir).await?
        }
        Commands::ShowConfig => cmd_show_config(&config)?,
    }

    Ok(())
}

/// Logs go to stderr; stdout may carry build flags.
fn init_tracing(verbose: u8, configured: &str) {
    let fallback = match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// CLI flags win over the file and the environment.
fn apply_version_args(settings: &mut VersionConfig, args: &VersionArgs) {
    if args.bump {
        settings.bump = true;
    }
    if let Some(value) = args.version_override.as_deref().filter(|v| !v.is_empty()) {
        settings.version_override = Some(value.to_string());
    }
    if args.no_tag {
        settings.push_tags = false;
    }
    if let Some(emit) = args.emit {
        settings.emit = emit.into();
    }
}

fn apply_profile(settings: &mut MaterializeConfig, profile: Option<String>) {
    if let Some(profile) = profile.filter(|p| !p.is_empty()) {
        settings.profile = Some(profile);
    }
}

async fn cmd_version(settings: &VersionConfig, project_dir: &Path, dry_run: bool) -> Result<()> {
    let scm = GitCli::in_dir(project_dir);
    let build_time = timestamp::build_timestamp(settings.timestamp_zone);

    if dry_run {
        let metadata = version::resolve(settings, &scm, build_time).await;
        print!("{}", header::render_header(&metadata));
        return Ok(());
    }

    let mut host = build_env::stdout_env(settings.emit);
    let report = fwstamp_core::stamp(
        settings,
        project_dir,
        &scm,
        build_time,
        host.as_deref_mut().map(|env| env as &mut dyn BuildEnv),
    )
    .await
    .context("failed to write version header")?;

    info!(
        version = %report.metadata.version,
        header = ?report.header,
        tag = ?report.tag,
        "Version stamped"
    );
    Ok(())
}

async fn cmd_config(settings: &MaterializeConfig, project_dir: &Path) -> Result<()> {
    let done = materialize::materialize(settings, project_dir).await?;
    println!(
        "✔ {} created from {}",
        relative(&done.target, project_dir).display(),
        relative(&done.source, project_dir).display()
    );
    Ok(())
}

async fn cmd_check(settings: &MaterializeConfig, project_dir: &Path) -> Result<()> {
    let validated = materialize::check(settings, project_dir).await?;
    println!(
        "✔ {} is valid ({} keys)",
        relative(&validated.source, project_dir).display(),
        validated.document.len()
    );
    Ok(())
}

fn cmd_show_config(config: &ToolConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config).context("failed to serialize configuration")?;
    println!("{toml_str}");
    Ok(())
}

fn relative<'a>(path: &'a Path, base: &Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}

/// `Ok(None)` when the file does not exist; a present but invalid file is an error.
async fn load_config(path: &Path) -> Result<Option<ToolConfig>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }
    let config = ToolConfig::load(path)
        .await
        .with_context(|| format!("invalid configuration file {}", path.display()))?;
    Ok(Some(config))
}

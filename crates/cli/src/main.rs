mod media_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    ferry_config::MetricsConfig,
    ferry_media::MediaPipeline,
    ferry_metrics::MetricsRecorderConfig,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "ferry", about = "Ferry: fetch media into validated local files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching the standard locations.
    #[arg(long, global = true, env = "FERRY_CONFIG")]
    config: Option<PathBuf>,
    /// Images save root (overrides config value).
    #[arg(long, global = true, env = "FERRY_IMAGES_DIR")]
    images_dir: Option<PathBuf>,
    /// Videos save root (overrides config value).
    #[arg(long, global = true, env = "FERRY_VIDEOS_DIR")]
    videos_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve image references (URLs or local paths), in order.
    Images {
        #[arg(required = true)]
        references: Vec<String>,
    },
    /// Resolve a single video reference.
    Video { reference: String },
    /// Store a local file as an uploaded video.
    Upload {
        file: PathBuf,
        /// Name to derive the extension from (defaults to the file name).
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete stored media older than a given age.
    Sweep {
        #[arg(long, value_enum, default_value = "all")]
        kind: media_commands::SweepKind,
        /// Maximum age in hours (defaults to `media.retention_hours`).
        #[arg(long)]
        max_age_hours: Option<u64>,
    },
    /// Print the resolved save roots.
    Paths,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn recorder_config(metrics: &MetricsConfig) -> MetricsRecorderConfig {
    MetricsRecorderConfig {
        enabled: metrics.enabled,
        global_labels: metrics
            .labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "ferry starting");

    let mut config = match cli.config {
        Some(ref path) => ferry_config::load_config(path)?,
        None => ferry_config::discover_and_load(),
    };
    if let Some(dir) = cli.images_dir {
        config.media.images_dir = Some(dir);
    }
    if let Some(dir) = cli.videos_dir {
        config.media.videos_dir = Some(dir);
    }

    let metrics = ferry_metrics::init_metrics(recorder_config(&config.metrics))?;

    let pipeline = MediaPipeline::from_config(&config.media).await?;

    let result = match cli.command {
        Commands::Images { references } => media_commands::images(&pipeline, &references).await,
        Commands::Video { reference } => media_commands::video(&pipeline, &reference).await,
        Commands::Upload { file, name } => {
            media_commands::upload(&pipeline, &file, name.as_deref()).await
        },
        Commands::Sweep {
            kind,
            max_age_hours,
        } => {
            let max_age = media_commands::resolve_max_age(max_age_hours, &config.media)?;
            media_commands::sweep(&pipeline, kind, max_age).await
        },
        Commands::Paths => {
            println!("images: {}", pipeline.images_save_path().display());
            println!("videos: {}", pipeline.videos_save_path().display());
            Ok(())
        },
    };

    let rendered = metrics.render();
    if !rendered.is_empty() {
        eprintln!("{rendered}");
    }

    result
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, clap::CommandFactory};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn images_requires_a_reference() {
        assert!(Cli::try_parse_from(["ferry", "images"]).is_err());
        let cli = Cli::try_parse_from(["ferry", "images", "https://a/b.png", "/tmp/c.jpg"]).unwrap();
        match cli.command {
            Commands::Images { references } => assert_eq!(references.len(), 2),
            _ => panic!("expected images command"),
        }
    }

    #[test]
    fn configured_labels_reach_the_recorder() {
        let mut metrics = MetricsConfig {
            enabled: true,
            ..Default::default()
        };
        metrics.labels.insert("instance".into(), "edge-1".into());

        let recorder = recorder_config(&metrics);

        assert!(recorder.enabled);
        assert_eq!(recorder.global_labels, vec![(
            "instance".to_string(),
            "edge-1".to_string()
        )]);
    }

    #[test]
    fn sweep_defaults_to_both_roots() {
        let cli = Cli::try_parse_from(["ferry", "sweep", "--max-age-hours", "12"]).unwrap();
        match cli.command {
            Commands::Sweep {
                kind,
                max_age_hours,
            } => {
                assert_eq!(kind, media_commands::SweepKind::All);
                assert_eq!(max_age_hours, Some(12));
            },
            _ => panic!("expected sweep command"),
        }
    }
}

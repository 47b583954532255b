use std::{path::Path, time::Duration};

use {
    anyhow::{Context, Result},
    clap::ValueEnum,
    ferry_config::MediaConfig,
    ferry_media::{MediaPipeline, SweepReport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SweepKind {
    Images,
    Videos,
    All,
}

pub async fn images(pipeline: &MediaPipeline, references: &[String]) -> Result<()> {
    for path in pipeline.process_images(references).await? {
        println!("{}", path.display());
    }
    Ok(())
}

pub async fn video(pipeline: &MediaPipeline, reference: &str) -> Result<()> {
    let path = pipeline.process_video(reference).await?;
    println!("{}", path.display());
    Ok(())
}

pub async fn upload(pipeline: &MediaPipeline, file: &Path, name: Option<&str>) -> Result<()> {
    let reader = tokio::fs::File::open(file)
        .await
        .with_context(|| format!("failed to open {}", file.display()))?;
    let name = match name {
        Some(name) => name.to_string(),
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let path = pipeline.save_uploaded_video(reader, &name).await?;
    println!("{}", path.display());
    Ok(())
}

/// `--max-age-hours` wins over the configured retention.
pub fn resolve_max_age(max_age_hours: Option<u64>, media: &MediaConfig) -> Result<Duration> {
    max_age_hours
        .map(|hours| Duration::from_secs(hours.saturating_mul(3600)))
        .or_else(|| media.retention())
        .context("no --max-age-hours given and media.retention_hours is not configured")
}

pub async fn sweep(pipeline: &MediaPipeline, kind: SweepKind, max_age: Duration) -> Result<()> {
    if matches!(kind, SweepKind::Images | SweepKind::All) {
        let report = pipeline.cleanup_old_images(max_age).await?;
        print_report("images", pipeline.images_save_path(), report);
    }
    if matches!(kind, SweepKind::Videos | SweepKind::All) {
        let report = pipeline.cleanup_old_videos(max_age).await?;
        print_report("videos", pipeline.videos_save_path(), report);
    }
    Ok(())
}

fn print_report(label: &str, root: &Path, report: SweepReport) {
    println!(
        "{label}: removed {} file(s) from {} ({} skipped)",
        report.removed,
        root.display(),
        report.skipped
    );
}

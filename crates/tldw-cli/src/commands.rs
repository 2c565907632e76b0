//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use tldw_analysis::{GeminiAnalyzer, MediaAnalyzer};
use tldw_media::{Acquirer, AcquisitionConfig};
use tldw_models::{format_seconds, AcquiredMedia, AnalysisResult, FALLBACK_FILENAME};
use tldw_player::{simulate, PlayerConfig, SkipEngine, SkipStats};

fn print_progress(message: &str) {
    eprintln!("{message}");
}

async fn acquire(reference: &str) -> Result<AcquiredMedia> {
    let config = AcquisitionConfig::from_env();
    info!(
        resolvers = config.resolver_endpoints.len(),
        relays = config.relay_templates.len(),
        "Acquisition config loaded"
    );

    let acquirer = Acquirer::from_config(&config)?;
    let media = acquirer
        .acquire(reference, &print_progress)
        .await
        .with_context(|| format!("could not acquire {reference}"))?;
    Ok(media)
}

pub async fn fetch(reference: &str, output: &Path) -> Result<()> {
    let media = acquire(reference).await?;

    tokio::fs::create_dir_all(output)
        .await
        .with_context(|| format!("could not create {}", output.display()))?;
    let path = output.join(safe_filename(&media.filename));
    tokio::fs::write(&path, &media.bytes)
        .await
        .with_context(|| format!("could not write {}", path.display()))?;

    println!(
        "{} ({} bytes, {})",
        path.display(),
        media.len(),
        media.mime_type
    );
    Ok(())
}

pub async fn analyze(reference: &str, output: Option<PathBuf>) -> Result<()> {
    // Fail on missing credentials before spending time on the download
    let analyzer = GeminiAnalyzer::from_env()?;
    let media = acquire(reference).await?;

    let result = analyzer
        .analyze(&media, &print_progress)
        .await
        .context("analysis failed")?;
    let json = serde_json::to_string_pretty(&result)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("could not write {}", path.display()))?;
            eprintln!(
                "Wrote {} segments to {}",
                result.segments.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub async fn simulate_playback(
    analysis: &Path,
    duration: f64,
    step: f64,
    turbo: bool,
) -> Result<()> {
    let raw = tokio::fs::read_to_string(analysis)
        .await
        .with_context(|| format!("could not read {}", analysis.display()))?;
    let result: AnalysisResult = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not an analysis file", analysis.display()))?;

    if !result.summary.is_empty() {
        println!("{}\n", result.summary);
    }

    let stats = SkipStats::compute(&result.segments, duration);
    let mut engine = SkipEngine::new(PlayerConfig::default(), result.segments);
    if turbo {
        engine.toggle_turbo();
    } else {
        engine.toggle_skip();
    }

    let report = simulate(&mut engine, duration, step)?;

    for jump in &report.jumps {
        println!(
            "{} -> {}  {}",
            format_seconds(jump.from),
            format_seconds(jump.to),
            jump.reason
        );
    }
    println!();
    println!("Mode:            {}", report.mode);
    println!("Jumps:           {}", report.jumps.len());
    println!(
        "Skippable:       {} ({:.1}%)",
        format_seconds(stats.skippable),
        stats.skippable_ratio() * 100.0
    );
    println!("Original length: {}", format_seconds(duration));
    println!("Watch time:      {}", format_seconds(report.wall_seconds));
    println!("Time saved:      {}", format_seconds(report.time_saved()));
    Ok(())
}

/// Keep only the final path component; never write outside the output dir.
fn safe_filename(name: &str) -> String {
    let name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_FILENAME.to_string()
    } else {
        name.to_string()
    }
}

pub fn validate_simulation_args(duration: f64, step: f64) -> Result<()> {
    if !duration.is_finite() || duration <= 0.0 {
        bail!("--duration must be a positive number of seconds");
    }
    if !step.is_finite() || step <= 0.0 {
        bail!("--step must be a positive number of seconds");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("talk.mp4"), "talk.mp4");
        assert_eq!(safe_filename("../../etc/passwd"), "passwd");
        assert_eq!(safe_filename(".."), FALLBACK_FILENAME);
        assert_eq!(safe_filename(""), FALLBACK_FILENAME);
    }

    #[test]
    fn test_validate_simulation_args() {
        assert!(validate_simulation_args(60.0, 0.5).is_ok());
        assert!(validate_simulation_args(0.0, 0.5).is_err());
        assert!(validate_simulation_args(60.0, -1.0).is_err());
    }

    #[tokio::test]
    async fn test_simulate_reads_analysis_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        std::fs::write(
            &path,
            r#"{"summary": "s", "segments": [{"start": "00:10", "end": 20, "reason": "silence"}]}"#,
        )
        .unwrap();

        simulate_playback(&path, 60.0, 1.0, false).await.unwrap();
        assert!(simulate_playback(&dir.path().join("missing.json"), 60.0, 1.0, false)
            .await
            .is_err());
    }
}

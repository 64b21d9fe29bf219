use std::path::Path;

use tsync_media::check_ytdlp;
use tsync_worker::{RunOutcome, WorkerConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!(
        "transcript-sync-selfcheck: work_dir={} worksheet={}",
        config.extractor.work_dir.display(),
        config.worksheet
    );
    ensure_workdir(&config.extractor.work_dir).await?;
    ensure_ytdlp(&config.extractor.binary)?;
    ensure_env_present(&["SHEET_KEY"])?;
    ensure_any_env_present(&[
        "GOOGLE_CREDENTIALS",
        "GOOGLE_APPLICATION_CREDENTIALS",
        "SHEETS_ACCESS_TOKEN",
    ])?;

    if std::env::args().skip(1).any(|a| a == "--with-sheet") {
        let _ = rustls::crypto::ring::default_provider().install_default();
        match tsync_worker::run_from_env(config.with_dry_run(true)).await? {
            RunOutcome::Completed(summary) => println!(
                "transcript-sync-selfcheck: sheet readable, {} rows, {} selectable",
                summary.counts.total_rows, summary.selected
            ),
            RunOutcome::Locked => println!("transcript-sync-selfcheck: run lock held, sheet not checked"),
        }
    }

    println!("transcript-sync-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path.as_ref()).await?;
    Ok(())
}

fn ensure_ytdlp(binary: &Path) -> anyhow::Result<()> {
    let path = check_ytdlp(binary).map_err(|e| anyhow::anyhow!("yt-dlp not available: {}", e))?;

    let output = std::process::Command::new(&path)
        .arg("--version")
        .output()
        .map_err(|e| anyhow::anyhow!("yt-dlp --version failed to start: {}", e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!("yt-dlp --version failed: {:?}", output.status));
    }
    println!(
        "transcript-sync-selfcheck: yt-dlp {}",
        String::from_utf8_lossy(&output.stdout).trim()
    );
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).map(|v| v.trim().is_empty()).unwrap_or(true) {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}

fn ensure_any_env_present(vars: &[&str]) -> anyhow::Result<()> {
    if vars.iter().any(|v| std::env::var(v).is_ok_and(|v| !v.trim().is_empty())) {
        return Ok(());
    }
    Err(anyhow::anyhow!("set one of {}", vars.join(", ")))
}

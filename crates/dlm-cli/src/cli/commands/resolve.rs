//! `dlm resolve` – print a direct link for each path.

use anyhow::{bail, Result};
use dlm_core::{DirectLinkManager, LinkResult, ManagerConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run_resolve(cfg: ManagerConfig, mut paths: Vec<String>, stdin: bool) -> Result<()> {
    if stdin {
        paths.extend(read_stdin_paths().await?);
    }
    if paths.is_empty() {
        bail!("no paths given (pass them as arguments or use --stdin)");
    }

    let results = DirectLinkManager::scoped(cfg, |manager| async move {
        manager.get_direct_link_batch(paths).await
    })
    .await?;

    let failed = report(&results);
    if failed > 0 {
        bail!("{} of {} path(s) could not be resolved", failed, results.len());
    }
    Ok(())
}

/// Prints successes to stdout and failures to stderr; returns the failure count.
fn report(results: &[LinkResult]) -> usize {
    let mut failed = 0;
    for r in results {
        match &r.outcome {
            Ok(link) => println!("{}\t{}", r.request.raw_path, link),
            Err(e) => {
                failed += 1;
                eprintln!("{}\terror: {}", r.request.raw_path, e);
            }
        }
    }
    failed
}

async fn read_stdin_paths() -> Result<Vec<String>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut paths = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches('\r');
        if !line.trim().is_empty() {
            paths.push(line.to_string());
        }
    }
    Ok(paths)
}

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tds_generate::{
    BatchRequest, BatchSummary, Catalog, ClaudeProvider, Orchestrator, OrchestratorConfig,
};
use tds_model::DraftArtifact;
use tds_persistence::{LoadOutcome, MigrationOutcome, StateStore};
use tracing::{info, info_span};

use tds_cli::config::{API_KEY_ENV, CliConfig, api_key_from_env};

use crate::cli::GenerateArgs;
use crate::summary::{print_drafts, print_event, print_status};

/// Everything a command needs: the loaded store and the config file.
pub struct App {
    pub store: Arc<StateStore>,
    pub config: CliConfig,
    pub load: LoadOutcome,
}

pub struct GenerateResult {
    pub summary: BatchSummary,
    pub promoted: Vec<DraftArtifact>,
}

pub fn run_status(app: &App) {
    let state = app.store.snapshot();
    println!("State: {}", app.store.paths().primary.display());
    print_status(&state, &app.load, api_key_from_env().is_some());
}

pub fn run_drafts_list(app: &App) {
    app.store.read(|state| print_drafts(&state.drafts));
}

pub fn run_drafts_clear(app: &App) -> Result<()> {
    let removed = app.store.clear_drafts().context("clear drafts")?;
    println!("Removed {removed} draft(s).");
    Ok(())
}

pub fn run_migrate(app: &App, file: &std::path::Path) -> Result<()> {
    match app
        .store
        .migrate_legacy(file)
        .with_context(|| format!("import {}", file.display()))?
    {
        MigrationOutcome::Imported(import) => {
            println!("Imported {}.", file.display());
            if !import.applied.is_empty() {
                println!("Applied: {}", import.applied.join(", "));
            }
            if !import.rejected.is_empty() {
                println!("Rejected (invalid value): {}", import.rejected.join(", "));
            }
            if !import.ignored.is_empty() {
                println!("Ignored (unknown key): {}", import.ignored.join(", "));
            }
        }
        MigrationOutcome::Skipped => {
            println!("Legacy configuration was already imported; nothing to do.");
        }
    }
    Ok(())
}

pub fn run_reset(app: &App, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("reset deletes all settings and drafts; re-run with --yes to confirm");
    }
    app.store.reset().context("reset state")?;
    println!("State reset to defaults.");
    Ok(())
}

pub fn run_generate(app: &App, args: &GenerateArgs) -> Result<GenerateResult> {
    let span = info_span!("generate", preview = args.preview);
    let _guard = span.enter();

    let api_key =
        api_key_from_env().ok_or_else(|| anyhow!("set {API_KEY_ENV} to generate drafts"))?;
    let provider =
        ClaudeProvider::new(&api_key, app.config.claude.clone()).context("create Claude client")?;
    let catalog = match &app.config.catalog_path {
        Some(path) => Catalog::from_csv_path(path).context("load category catalog")?,
        None => Catalog::builtin(),
    };
    info!(categories = catalog.len(), "catalog ready");

    let mut request = BatchRequest::from_state(&app.store.snapshot());
    if let Some(count) = args.count {
        request = request.with_count(count);
    }
    if let Some(seed) = args.seed {
        request = request.with_seed(seed);
    }
    if args.preview {
        request = request.into_preview();
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    runtime.block_on(async {
        let orchestrator =
            Orchestrator::new(provider, Arc::clone(&app.store), OrchestratorConfig::default())
                .with_catalog(catalog);
        let mut handle = orchestrator.start_batch(request).context("start batch")?;
        println!("Generating {} draft(s)...", handle.total());

        let canceller = handle.canceller();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Cancelling after the current item...");
                canceller.cancel();
            }
        });

        while let Some(event) = handle.next_event().await {
            print_event(&event);
        }
        let summary = handle.finish().await?;
        let promoted = if args.promote {
            orchestrator
                .promote(summary.previews.clone())
                .context("save preview drafts")?
        } else {
            Vec::new()
        };
        Ok::<_, anyhow::Error>(GenerateResult { summary, promoted })
    })
}

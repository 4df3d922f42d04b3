use anyhow::Context;
use clap::Parser;
use std::collections::BTreeSet;
use tabsplit_core::{Action, TabsplitConfig};
use tabsplit_ocr::{OcrBackend, ReceiptSession};
use tracing_subscriber::EnvFilter;

mod args;
mod report;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => TabsplitConfig::load(path)?,
        None => TabsplitConfig::default(),
    };

    #[cfg(feature = "tesseract")]
    let recognizer = tabsplit_ocr::recognizer::tesseract_backend::TesseractRecognizer::new(
        cli.tessdata.clone(),
        &config.ocr.language,
    );
    #[cfg(not(feature = "tesseract"))]
    let recognizer = {
        if !cli.text {
            tracing::warn!("built without an OCR engine; pass --text with a transcribed receipt");
        }
        tabsplit_ocr::UnavailableRecognizer
    };

    run(ReceiptSession::new(recognizer, &config), &cli, &config).await
}

async fn run<R: OcrBackend>(
    session: ReceiptSession<R>,
    cli: &Cli,
    config: &TabsplitConfig,
) -> anyhow::Result<()> {
    for (index, name) in cli.people.iter().enumerate() {
        if index > 0 {
            session.dispatch(Action::AddParticipant).await?;
        }
        session
            .dispatch(Action::RenameParticipant { index, name: name.clone() })
            .await?;
    }

    let path = &cli.receipt;
    let extracted = if cli.text {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        session.submit_text(text).await?
    } else {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        session.submit_image(bytes).await?
    };
    tracing::info!(
        items = extracted.items.len(),
        unmatched = extracted.unmatched_lines,
        "receipt loaded"
    );

    if cli.auto_split {
        session.dispatch(Action::AutoSplitAll).await?;
    }

    // --assign sets exactly the listed sharers, so toggle the difference.
    for spec in &cli.assignments {
        let state = session.snapshot().await;
        let wanted = spec
            .who
            .iter()
            .map(|who| {
                who.resolve(state.participants())
                    .with_context(|| format!("Unknown participant {who:?} for item {}", spec.item + 1))
            })
            .collect::<anyhow::Result<BTreeSet<usize>>>()?;
        let current: BTreeSet<usize> = state.assignments().get(spec.item).collect();
        for &participant in wanted.symmetric_difference(&current) {
            session
                .dispatch(Action::Toggle { item: spec.item, participant })
                .await?;
        }
    }

    let state = session.snapshot().await;
    let totals = session.totals().await?;
    if cli.json {
        let out = serde_json::json!({
            "session": state,
            "extracted": extracted,
            "totals": totals,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let report = report::Report {
            session: &state,
            totals: &totals,
            extracted: &extracted,
            display: &config.display,
        };
        print!("{report}");
    }
    Ok(())
}

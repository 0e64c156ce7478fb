// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Seed the curated mission pool with generated missions.
//!
//! Tops every (goal, tone) combination up to `--per-combo` templates. Combos
//! that are already full are skipped, so rerunning is safe.
//!
//! ```text
//! cargo run --bin seed_pool -- --per-combo 10 --dry-run
//! ```

use anyhow::Context as _;
use clap::Parser;
use futures_util::{stream, StreamExt};
use sassy_coach::{
    db::{FirestoreDb, Store},
    models::{Goal, PoolTemplate, Tone},
    services::{openai, OpenAiClient},
};
use std::time::Duration;

const MAX_CONCURRENT_WRITES: usize = 10;

#[derive(Parser)]
#[command(author, version, about = "Seed the Sassy Coach mission pool")]
struct Cli {
    /// Target number of templates per (goal, tone) combination.
    #[arg(long, default_value_t = 10)]
    per_combo: usize,

    /// Print generated missions instead of writing them.
    #[arg(long)]
    dry_run: bool,

    /// Pause between provider calls, to stay under rate limits.
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,

    #[arg(long, env = "GCP_PROJECT_ID", default_value = "local-dev")]
    project_id: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = openai::DEFAULT_BASE_URL)]
    openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = openai::DEFAULT_MODEL)]
    openai_model: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let db = FirestoreDb::new(&cli.project_id)
        .await
        .context("failed to connect to Firestore")?;
    // Batches are large; give the provider more room than the per-request budget.
    let client = OpenAiClient::new(
        &cli.openai_base_url,
        &cli.openai_api_key,
        &cli.openai_model,
        Duration::from_secs(60),
    )
    .context("failed to build provider client")?;

    let mut total = 0;
    for goal in Goal::ALL {
        for tone in Tone::ALL {
            match seed_combo(&db, &client, goal, tone, &cli).await {
                Ok(inserted) => total += inserted,
                Err(e) => {
                    tracing::error!(%goal, %tone, error = ?e, "Failed to seed combo, skipping");
                }
            }
        }
    }

    tracing::info!(total, dry_run = cli.dry_run, "Pool seeding finished");
    Ok(())
}

/// Fill one combo up to the target. Returns the number of templates written.
async fn seed_combo(
    db: &dyn Store,
    client: &OpenAiClient,
    goal: Goal,
    tone: Tone,
    cli: &Cli,
) -> anyhow::Result<usize> {
    let existing = db.count_pool_templates(goal, tone).await?;
    let needed = cli.per_combo.saturating_sub(existing);
    if needed == 0 {
        tracing::info!(%goal, %tone, existing, "Combo already full, skipping");
        return Ok(0);
    }

    tracing::info!(%goal, %tone, existing, needed, "Generating missions");
    let missions = client.generate_batch(goal, tone, needed).await?;

    let templates: Vec<PoolTemplate> = missions
        .into_iter()
        .take(needed)
        .map(|content| PoolTemplate {
            id: format!("pool-{}-{}-{}", goal, tone, uuid::Uuid::new_v4().simple()),
            goal,
            tone,
            task: content.task,
            motivational_line: content.motivational_line,
            reflection_prompt: content.reflection_prompt,
        })
        .collect();
    let inserted = templates.len();

    if cli.dry_run {
        for template in &templates {
            println!("{}", serde_json::to_string(template)?);
        }
    } else {
        stream::iter(templates)
            .map(|template| async move { db.add_pool_template(&template).await })
            .buffer_unordered(MAX_CONCURRENT_WRITES)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, _>>()?;
    }

    tracing::info!(%goal, %tone, inserted, "Combo seeded");
    tokio::time::sleep(Duration::from_millis(cli.delay_ms)).await;
    Ok(inserted)
}

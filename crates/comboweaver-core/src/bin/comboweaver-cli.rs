use std::{path::PathBuf, time::Duration};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use comboweaver_core::{
    AppConfig, CharacterCatalog, EmbedReadiness, HeadlessBackend, PlaybackPhase, SharePayload,
    TagCategory, TagFilter, Workbench, available_tags, catalog::load_character, filter_parts,
    fixtures::demo_catalog, init_tracing, parse_share_url, share_url,
};

#[derive(Debug, Parser)]
#[command(name = "comboweaver-cli")]
#[command(about = "Headless tools for browsing catalogs, share links and combo playback")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Overrides the discovered comboweaver.config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
struct CatalogSource {
    #[arg(long, default_value = "ryu")]
    character: String,

    /// Use the built-in demo catalog instead of the catalog directory.
    #[arg(long)]
    demo: bool,

    #[arg(long)]
    catalog_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Lists a character's parts, optionally narrowed by tags.
    Catalog {
        #[command(flatten)]
        source: CatalogSource,

        /// `category=value`, e.g. `kind=starter` or `condition=corner`. Repeatable.
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(TagCategory, String)>,
    },
    Share {
        #[command(subcommand)]
        action: ShareAction,
    },
    /// Plays a sequence through the headless backend and prints each transition.
    Simulate {
        #[command(flatten)]
        source: CatalogSource,

        #[arg(long, conflicts_with = "parts")]
        sample: Option<String>,

        #[arg(long, value_delimiter = ',')]
        parts: Vec<String>,

        #[arg(long, default_value_t = 100)]
        step_ms: u64,

        #[arg(long, default_value_t = 120)]
        max_seconds: u64,

        /// Simulated delay before the embedded player SDK reports ready.
        #[arg(long, default_value_t = 0)]
        embed_ready_after_ms: u64,
    },
}

#[derive(Debug, Subcommand)]
enum ShareAction {
    Encode {
        #[arg(long, default_value = "ryu")]
        character: String,

        #[arg(long, value_delimiter = ',', required = true)]
        parts: Vec<String>,

        #[arg(long)]
        base_url: Option<String>,
    },
    Decode {
        url: String,
    },
}

fn parse_tag(raw: &str) -> Result<(TagCategory, String), String> {
    let (category, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected category=value, got {raw}"))?;
    let category = match category.trim() {
        "kind" | "type" => TagCategory::Kind,
        "start_condition" | "start" => TagCategory::StartCondition,
        "condition" => TagCategory::Condition,
        "drive_gauge" | "drive" => TagCategory::DriveGauge,
        "sa_gauge" | "sa" => TagCategory::SaGauge,
        other => return Err(format!("unknown tag category {other}")),
    };
    Ok((category, value.trim().to_string()))
}

fn load_source(source: &CatalogSource, config: &AppConfig) -> anyhow::Result<CharacterCatalog> {
    if source.demo {
        let catalog = demo_catalog();
        if catalog.character() != source.character {
            bail!("demo catalog only contains {}", catalog.character());
        }
        return Ok(catalog);
    }
    let directory = source
        .catalog_dir
        .clone()
        .unwrap_or_else(|| config.paths.catalog_dir.clone());
    load_character(&directory, &source.character)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let log_dir = cli
        .log_dir
        .clone()
        .unwrap_or_else(|| config.paths.logs_dir.clone());
    let _telemetry = init_tracing(&log_dir, &config.diagnostics)?;

    match cli.command {
        Commands::Catalog { source, tags } => {
            let catalog = load_source(&source, &config)?;
            let mut filter = TagFilter::new();
            for (category, value) in &tags {
                filter.toggle(*category, value);
            }
            for part in filter_parts(catalog.parts(), &filter) {
                println!(
                    "{:<10} {:<28} {:>6}  {}",
                    part.id,
                    part.name,
                    part.damage.map(|damage| damage.to_string()).unwrap_or_default(),
                    part.combo_notation
                );
            }
            for (category, values) in available_tags(catalog.parts()) {
                println!("{}: {}", category.label(), values.join(", "));
            }
        }
        Commands::Share { action } => match action {
            ShareAction::Encode {
                character,
                parts,
                base_url,
            } => {
                let base = base_url.unwrap_or_else(|| config.share.base_url.clone());
                let url = share_url(&base, &SharePayload::new(character, parts))?;
                println!("{url}");
            }
            ShareAction::Decode { url } => {
                let payload = parse_share_url(&url)?;
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
        },
        Commands::Simulate {
            source,
            sample,
            parts,
            step_ms,
            max_seconds,
            embed_ready_after_ms,
        } => {
            let catalog = load_source(&source, &config)?;
            let backend = HeadlessBackend::new();
            let mut workbench = Workbench::with_settings(
                catalog,
                backend.clone(),
                EmbedReadiness::new(),
                config.playback.to_playback_config(),
                config.reorder.long_press_delay(),
            );

            if let Some(name) = sample {
                workbench.load_sample(&name)?;
            } else if parts.is_empty() {
                bail!("pass --sample or --parts");
            } else {
                for part_id in &parts {
                    workbench
                        .add_part(part_id)
                        .with_context(|| format!("cannot add {part_id}"))?;
                }
            }

            run_simulation(
                &mut workbench,
                &backend,
                Duration::from_millis(step_ms.max(1)),
                Duration::from_secs(max_seconds),
                Duration::from_millis(embed_ready_after_ms),
            );
            let stats = workbench.stats();
            println!(
                "total damage {} final frame advantage {}",
                stats.total_damage,
                stats
                    .final_frame_advantage
                    .map_or_else(|| "-".to_string(), |advantage| format!("{advantage:+}"))
            );
        }
    }

    Ok(())
}

fn run_simulation(
    workbench: &mut Workbench<HeadlessBackend>,
    backend: &HeadlessBackend,
    step: Duration,
    limit: Duration,
    embed_ready_after: Duration,
) {
    let mut elapsed = Duration::ZERO;
    let mut last = workbench.playback().status();
    workbench.play();

    loop {
        if elapsed >= embed_ready_after && !workbench.playback().readiness().is_ready() {
            println!("{:>8.2}s embed sdk ready", elapsed.as_secs_f64());
            workbench.notify_embed_ready();
        }

        for event in backend.step(step) {
            workbench.handle_media_event(event);
        }
        elapsed += step;

        let status = workbench.playback().status();
        if status != last {
            let entry = status.entry_id.as_deref().unwrap_or("-");
            let stall = status
                .stalled
                .map(|stall| format!(" stalled={stall:?}"))
                .unwrap_or_default();
            println!(
                "{:>8.2}s {:?} index={} entry={entry}{stall}",
                elapsed.as_secs_f64(),
                status.phase,
                status
                    .current_index
                    .map_or_else(|| "-".to_string(), |index| index.to_string()),
            );
            last = status;
        }

        if last.phase == PlaybackPhase::Stopped {
            break;
        }
        if elapsed >= limit {
            println!("{:>8.2}s time limit reached, stopping", elapsed.as_secs_f64());
            workbench.stop();
            break;
        }
    }
}

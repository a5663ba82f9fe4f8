//! Bout CLI
//!
//! Records fencing bouts into the match store and prints per-fencer statistics.

mod render;
mod script;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bout_core::store::{self, JsonFileStore, MatchStore};
use bout_core::{BoutConfig, DrawPolicy, FencerId, FencerSelector, Roster, StatsAggregator};

#[derive(Parser)]
#[command(name = "bout")]
#[command(about = "Record fencing bouts and read fencer statistics", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML config file (falls back to BOUT_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Selects a fencer by exact name or by roster id.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct FencerArgs {
    /// Exact fencer name
    #[arg(long)]
    fencer: Option<String>,

    /// Fencer id as listed by `bout fencers`
    #[arg(long)]
    fencer_id: Option<FencerId>,
}

impl FencerArgs {
    fn selector(&self) -> Result<FencerSelector> {
        match (&self.fencer, self.fencer_id) {
            (_, Some(id)) => Ok(FencerSelector::Id(id)),
            (Some(name), None) if !name.is_empty() => Ok(FencerSelector::name(name.as_str())),
            _ => bail!("--fencer must not be empty"),
        }
    }
}

/// Name to print for a selected fencer.
fn display_name(selector: &FencerSelector, roster: &Roster) -> String {
    match selector {
        FencerSelector::Name(name) => name.clone(),
        FencerSelector::Id(id) => {
            roster.get(*id).map(|f| f.name.clone()).unwrap_or_else(|| id.to_string())
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List every fencer in the store with their id
    Fencers,

    /// Change the roster name behind a fencer id
    Rename {
        #[arg(long)]
        fencer_id: FencerId,

        #[arg(long)]
        name: String,
    },

    /// Statistics for one fencer
    Stats {
        #[command(flatten)]
        fencer: FencerArgs,

        /// Print JSON instead of tables
        #[arg(long, default_value = "false")]
        json: bool,

        /// How drawn bouts count (overrides the config)
        #[arg(long, value_enum)]
        draws: Option<DrawsArg>,
    },

    /// A fencer's bouts, newest first
    History {
        #[command(flatten)]
        fencer: FencerArgs,

        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Every stored bout, newest first
    Matches {
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Touch-by-touch detail of one bout
    Show {
        /// Match id as listed by `bout matches`
        #[arg(long)]
        id: u64,

        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Replay a bout script and store the finished match
    Record {
        /// Bout script JSON file
        #[arg(long)]
        input: PathBuf,
    },

    /// Import legacy match exports
    Import {
        /// Legacy JSON files, merged in the given order
        #[arg(long = "from", required = true, num_args = 1..)]
        from: Vec<PathBuf>,
    },

    /// Delete stored matches
    Clear {
        /// Only remove bouts involving a configured test fencer
        #[arg(long, default_value = "false")]
        test_only: bool,
    },

    /// Write a compressed backup of the store
    Backup {
        #[arg(long)]
        out: PathBuf,
    },

    /// Replace the store with a backup
    Restore {
        #[arg(long = "from")]
        from: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DrawsArg {
    CountAsDefeat,
    Separate,
}

impl From<DrawsArg> for DrawPolicy {
    fn from(arg: DrawsArg) -> Self {
        match arg {
            DrawsArg::CountAsDefeat => DrawPolicy::CountAsDefeat,
            DrawsArg::Separate => DrawPolicy::Separate,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bout_core=info,bout=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = BoutConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let mut store = JsonFileStore::new(&config.store_path);
    tracing::debug!(store = ?store.path(), "using match store");

    match cli.command {
        Commands::Fencers => {
            let snapshot = store.snapshot().context("Failed to read match store")?;
            let roster = Roster::from_fencers(snapshot.fencers);
            let mut rows: BTreeMap<String, Option<FencerId>> =
                bout_core::fencer_names(&snapshot.matches)
                    .into_iter()
                    .map(|name| {
                        let id = roster.lookup(&name);
                        (name, id)
                    })
                    .collect();
            for fencer in roster.fencers() {
                rows.insert(fencer.name.clone(), Some(fencer.id));
            }
            let rows: Vec<_> = rows.into_iter().collect();
            if rows.is_empty() {
                println!("No fencers recorded yet.");
            } else {
                render::fencers_table(&rows).printstd();
            }
        }

        Commands::Rename { fencer_id, name } => {
            if name.is_empty() {
                bail!("--name must not be empty");
            }
            if !store.rename_fencer(fencer_id, &name).context("Failed to rename fencer")? {
                bail!("No fencer {fencer_id}, or the name {name} is already taken");
            }
            println!("✅ Fencer {fencer_id} is now {name}");
        }

        Commands::Stats { fencer, json, draws } => {
            let selector = fencer.selector()?;
            let snapshot = store.snapshot().context("Failed to read match store")?;
            let name = display_name(&selector, &Roster::from_fencers(snapshot.fencers));
            let policy = draws.map(DrawPolicy::from).unwrap_or(config.draw_policy);
            let stats = StatsAggregator::new(policy).aggregate(&snapshot.matches, &selector);

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else if stats.total_matches == 0 {
                println!("No matches found for {name}.");
            } else {
                for table in render::stats_tables(&name, &stats) {
                    table.printstd();
                }
            }
        }

        Commands::History { fencer, json } => {
            let selector = fencer.selector()?;
            let snapshot = store.snapshot().context("Failed to read match store")?;
            let summaries = bout_core::history(&snapshot.matches, &selector);
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if summaries.is_empty() {
                let name = display_name(&selector, &Roster::from_fencers(snapshot.fencers));
                println!("No matches found for {name}.");
            } else {
                render::history_table(&summaries).printstd();
            }
        }

        Commands::Matches { json } => {
            let matches = store.list_matches().context("Failed to read match store")?;
            let rows = bout_core::match_list(&matches);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No matches recorded yet.");
            } else {
                render::matches_table(&rows).printstd();
            }
        }

        Commands::Show { id, json } => {
            let matches = store.list_matches().context("Failed to read match store")?;
            let m = bout_core::find_match(&matches, id).ok_or_else(|| anyhow!("No match with id {id}"))?;
            let touches = bout_core::touch_log(m);
            if json {
                println!("{}", serde_json::to_string_pretty(&touches)?);
            } else {
                let result = match m.winner.side() {
                    Some(side) => format!("winner {}", m.participant(side).name),
                    None => "draw".to_string(),
                };
                println!(
                    "{} {}-{} {} ({}, {})",
                    m.red.name,
                    m.red_score,
                    m.green_score,
                    m.green.name,
                    m.date.format("%Y-%m-%d %H:%M"),
                    result
                );
                if touches.is_empty() {
                    println!("No touches recorded.");
                } else {
                    render::touch_table(&touches).printstd();
                }
            }
        }

        Commands::Record { input } => {
            let (m, revision) = script::record_file(&input, &config, &mut store)?;
            println!(
                "✅ Recorded {} {}-{} {} (revision {revision})",
                m.red.name, m.red_score, m.green_score, m.green.name
            );
        }

        Commands::Import { from } => {
            let mut sources = Vec::new();
            for path in &from {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let value: serde_json::Value = serde_json::from_str(&content)
                    .with_context(|| format!("{} is not JSON", path.display()))?;
                let lists = store::legacy_sources(value)
                    .with_context(|| format!("{} holds no match list", path.display()))?;
                sources.extend(lists);
            }
            let report = store::import_legacy(&mut store, sources).context("Import failed")?;
            println!("✅ Imported {} matches, skipped {} already stored", report.imported, report.skipped);
            if report.duplicates > 0 {
                println!("⚠️  Dropped {} records repeating an earlier id", report.duplicates);
            }
            if report.renumbered > 0 {
                println!("⚠️  Gave new ids to {} records without a numeric id", report.renumbered);
            }
        }

        Commands::Clear { test_only } => {
            let removed = if test_only {
                store::purge_test_matches(&mut store, &config.test_fencers)
            } else {
                store.clear_all()
            }
            .context("Failed to clear matches")?;
            println!("🗑️  Removed {removed} matches");
        }

        Commands::Backup { out } => {
            let archive = store.archive().context("Failed to read match store")?;
            let bytes = store::write_archive(&out, &archive)
                .with_context(|| format!("Failed to write backup {}", out.display()))?;
            println!("✅ Backed up {} matches to {} ({bytes} bytes)", archive.matches.len(), out.display());
        }

        Commands::Restore { from } => {
            let archive = store::read_archive(&from)
                .with_context(|| format!("Failed to read backup {}", from.display()))?;
            let count = archive.matches.len();
            let revision = store.restore_archive(archive).context("Failed to restore match store")?;
            println!("✅ Restored {count} matches (revision {revision})");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_selector(args: &[&str]) -> Result<FencerSelector> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Commands::Stats { fencer, .. } => fencer.selector(),
            _ => bail!("not a stats command"),
        }
    }

    #[test]
    fn test_fencer_name_is_used_verbatim() {
        let selector = stats_selector(&["bout", "stats", "--fencer", " Alice "]).unwrap();
        assert_eq!(selector, FencerSelector::name(" Alice "));
        assert!(stats_selector(&["bout", "stats", "--fencer", ""]).is_err());
    }

    #[test]
    fn test_fencer_id_selects_by_id() {
        let id = FencerId::new();
        let selector = stats_selector(&["bout", "stats", "--fencer-id", &id.to_string()]).unwrap();
        assert_eq!(selector, FencerSelector::Id(id));

        assert!(stats_selector(&["bout", "stats", "--fencer-id", "nope"]).is_err());
        assert!(stats_selector(&["bout", "stats"]).is_err());
        assert!(
            stats_selector(&["bout", "stats", "--fencer", "Alice", "--fencer-id", &id.to_string()])
                .is_err()
        );
    }

    #[test]
    fn test_show_takes_match_id() {
        let cli = Cli::try_parse_from(["bout", "show", "--id", "1709287200000"]).unwrap();
        assert!(matches!(cli.command, Commands::Show { id: 1_709_287_200_000, json: false }));
    }
}

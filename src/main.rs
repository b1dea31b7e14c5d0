//! bayesgpt CLI - LLM-estimated Bayesian belief updates in the terminal
//!
//! Orchestrates the full flow:
//!
//! 1. Configuration: bayesgpt.toml / pyproject.toml, then environment, then flags
//! 2. Estimation: one model call per unique scenario, memoized in the result cache
//! 3. Exploration: edits and drags re-derive the marginal and posterior
//! 4. Rendering: maths table, derivation steps, probability grid and reasoning
//!
//! Design philosophy:
//! - Fail fast with clear error messages
//! - Estimation failures still render (as the zeroed record) with the error shown
//! - `--json` for machine consumers, colored text for people

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};

use bayesgpt::cache::{maintenance, AnyCache, CacheBackend};
use bayesgpt::config::Config;
use bayesgpt::engine::{PanelGroup, ProbabilityField};
use bayesgpt::estimate::Estimator;
use bayesgpt::rendering::ReportRenderer;
use bayesgpt::session::{ExplorerView, Workbench};
use bayesgpt::types::Scenario;

/// Visualize Bayesian belief updates with LLM-estimated probabilities
///
/// bayesgpt asks a model for P(H), P(E|H) and P(E|¬H), derives P(E) and
/// P(H|E) with Bayes' rule, and draws the probability mass as a 2x2 grid.
///
/// Examples:
///   bayesgpt estimate "Steve is a librarian" "Steve is shy and tidy..."
///   bayesgpt explore "..." "..." --set prior=0.6 --drag likelihood=25,75
///   bayesgpt scenarios                 # Previously estimated pairs
///   bayesgpt flush                     # Clear the result cache
#[derive(Parser, Debug)]
#[command(name = "bayesgpt")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory to load bayesgpt.toml / pyproject.toml from
    #[arg(short, long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Cache backend (kv, redb, memory); overrides config
    #[arg(long, global = true)]
    pub cache: Option<CacheBackend>,

    /// Chat model; overrides config and BAYESGPT_MODEL
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Disable colored output
    ///
    /// Useful for piping to files or LLMs that don't handle ANSI escape
    /// codes well.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    ///
    /// Shows progress messages and debug logs (cache hits/misses, requests).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Estimate a hypothesis and evidence and show the result
    Estimate {
        hypothesis: String,
        evidence: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate, then apply edits and show the updated result
    ///
    /// --set and --drag apply in the order given; --reset comes last.
    Explore {
        hypothesis: String,
        evidence: String,

        /// Set an input, e.g. prior=0.6 or alt-likelihood=15%
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        sets: Vec<(ProbabilityField, f64)>,

        /// Resize a panel group, e.g. hypothesis=60,40
        #[arg(long = "drag", value_name = "GROUP=A,B", value_parser = parse_drag)]
        drags: Vec<(PanelGroup, [f64; 2])>,

        /// `sets` and `drags` interleaved as typed; filled by `Cli::parse_ordered`
        #[arg(skip)]
        edits: Vec<ExploreEdit>,

        /// Discard the edits again (shows the estimate)
        #[arg(long)]
        reset: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List previously estimated scenarios from the cache
    Scenarios {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the built-in example scenarios
    Examples,

    /// Delete every cached estimation result
    Flush,

    /// Write a heartbeat to the cache (keeps remote stores warm)
    Heartbeat,

    /// Show the effective configuration (secrets hidden)
    Config,

    /// Run the MCP server over stdio
    Mcp,
}

/// One `explore` edit, in command-line order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExploreEdit {
    Set(ProbabilityField, f64),
    Drag(PanelGroup, [f64; 2]),
}

/// Interleave `--set` and `--drag` values by their position on the command line.
fn ordered_edits(matches: &ArgMatches) -> Vec<ExploreEdit> {
    let mut edits: Vec<(usize, ExploreEdit)> = Vec::new();
    if let (Some(values), Some(indices)) = (
        matches.get_many::<(ProbabilityField, f64)>("sets"),
        matches.indices_of("sets"),
    ) {
        edits.extend(
            indices
                .zip(values)
                .map(|(i, &(field, value))| (i, ExploreEdit::Set(field, value))),
        );
    }
    if let (Some(values), Some(indices)) = (
        matches.get_many::<(PanelGroup, [f64; 2])>("drags"),
        matches.indices_of("drags"),
    ) {
        edits.extend(
            indices
                .zip(values)
                .map(|(i, &(group, sizes))| (i, ExploreEdit::Drag(group, sizes))),
        );
    }
    edits.sort_by_key(|(i, _)| *i);
    edits.into_iter().map(|(_, edit)| edit).collect()
}

/// `field=value`, value optionally in percent.
fn parse_assignment(s: &str) -> Result<(ProbabilityField, f64), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    let field: ProbabilityField = field.trim().parse()?;
    let value = bayesgpt::estimate::parse_probability("value", value)
        .map_err(|e| e.to_string())?;
    Ok((field, value))
}

/// `group=a,b` panel sizes.
fn parse_drag(s: &str) -> Result<(PanelGroup, [f64; 2]), String> {
    let (group, sizes) = s
        .split_once('=')
        .ok_or_else(|| format!("expected GROUP=A,B, got '{}'", s))?;
    let group: PanelGroup = group.trim().parse()?;
    let (a, b) = sizes
        .split_once(',')
        .ok_or_else(|| format!("expected two sizes separated by a comma, got '{}'", sizes))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid panel size '{}'", v.trim()))
    };
    Ok((group, [parse(a)?, parse(b)?]))
}

impl Cli {
    /// Parse like `Cli::parse_from`, additionally recording the order of
    /// `explore` edits.
    fn parse_ordered<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut cli = Self::from_arg_matches(&matches)?;
        if let (Command::Explore { edits, .. }, Some(("explore", sub))) =
            (&mut cli.command, matches.subcommand())
        {
            *edits = ordered_edits(sub);
        }
        Ok(cli)
    }

    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(&self.root)?.with_process_env();
        if let Some(backend) = self.cache {
            config.cache = Some(backend);
        }
        if let Some(ref model) = self.model {
            config.model = model.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_ordered(std::env::args_os()).unwrap_or_else(|e| e.exit());
    bayesgpt::init_logging(cli.verbose);
    let config = cli.load_config()?;

    if cli.verbose {
        eprintln!("{}", config.display_summary());
    }

    let output = run(&cli, &config).await?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

/// Execute one subcommand and return what it prints.
async fn run(cli: &Cli, config: &Config) -> Result<String> {
    let renderer = ReportRenderer::new(!cli.no_color);

    match &cli.command {
        Command::Estimate {
            hypothesis,
            evidence,
            json,
        } => {
            let workbench = Workbench::new(Estimator::from_config(config)?);
            let view = workbench.estimate(hypothesis, evidence).await?;
            format_view(&renderer, &view, *json)
        }

        Command::Explore {
            hypothesis,
            evidence,
            sets,
            drags,
            edits,
            reset,
            json,
        } => {
            // Without recorded positions (plain `parse_from`), sets go before drags
            let edits = if edits.is_empty() {
                sets.iter()
                    .map(|&(field, value)| ExploreEdit::Set(field, value))
                    .chain(drags.iter().map(|&(group, sizes)| ExploreEdit::Drag(group, sizes)))
                    .collect()
            } else {
                edits.clone()
            };

            let workbench = Workbench::new(Estimator::from_config(config)?);
            let mut view = workbench.estimate(hypothesis, evidence).await?;
            for edit in &edits {
                view = match *edit {
                    ExploreEdit::Set(field, value) => workbench.edit(field, value)?,
                    ExploreEdit::Drag(group, sizes) => workbench.drag(group, sizes)?,
                };
            }
            if *reset {
                view = workbench.reset()?;
            }
            if cli.verbose {
                eprintln!("✓ Applied {} edits", edits.len());
            }
            format_view(&renderer, &view, *json)
        }

        Command::Scenarios { json } => {
            let cache = open_cache(config)?;
            let scenarios = maintenance::list_scenarios(&cache).await?;
            if *json {
                return Ok(serde_json::to_string_pretty(&scenarios)?);
            }
            if scenarios.is_empty() {
                return Ok("No cached scenarios. Try `bayesgpt examples`.".to_string());
            }
            Ok(format_scenarios(&renderer, &scenarios))
        }

        Command::Examples => Ok(format_scenarios(&renderer, &Scenario::examples())),

        Command::Flush => {
            let cache = open_cache(config)?;
            let removed = maintenance::flush(&cache).await?;
            Ok(format!("✓ Flushed {} cached results", removed))
        }

        Command::Heartbeat => {
            let cache = open_cache(config)?;
            let at = maintenance::heartbeat(&cache).await?;
            Ok(format!("✓ Heartbeat written ({})", at))
        }

        Command::Config => {
            let mut out = config.display_summary();
            match open_cache(config) {
                Ok(cache) => out.push_str(&format!("\n   Cache status: {}", cache.describe())),
                Err(e) => out.push_str(&format!("\n   Cache status: unavailable ({:#})", e)),
            }
            Ok(out)
        }

        Command::Mcp => {
            bayesgpt::mcp::serve_stdio(config).await?;
            Ok(String::new())
        }
    }
}

fn open_cache(config: &Config) -> Result<AnyCache> {
    AnyCache::from_config(config)
        .with_context(|| format!("Failed to open {} cache", config.cache_backend()))
}

fn format_view(renderer: &ReportRenderer, view: &ExplorerView, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(view)?);
    }

    let mut note = format!("({}", view.source);
    if view.edits > 0 {
        note.push_str(&format!(", {} edits", view.edits));
    }
    note.push(')');
    if let Some(ref error) = view.error {
        note.push_str(&format!(" estimation failed: {}", error));
    }
    Ok(renderer.render(&view.scenario, &view.record, Some(&note)))
}

fn format_scenarios(renderer: &ReportRenderer, scenarios: &[Scenario]) -> String {
    let palette = renderer.palette();
    scenarios
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{} {}\n   {}",
                palette.heading(&format!("{}.", i + 1)),
                s.hypothesis,
                palette.dim(&s.evidence)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

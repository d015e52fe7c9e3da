//! arcana: inspect and validate spell definitions
//!
//! Loads the built-in spell set (or a JSON file), runs the consistency check
//! and prints spells with their per-level numbers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use arcana_core::MAX_SPELL_LEVEL;
use arcana_core::magic::{ClassId, Spell, SpellCatalog, SpellId, SpellType};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Inspect and validate spell definitions
#[derive(Parser, Debug)]
#[command(name = "arcana")]
#[command(author, version, about = "Inspect and validate spell definitions", long_about = None)]
struct Args {
    /// JSON spell definitions to load instead of the built-in set
    #[arg(short = 'c', long = "catalog")]
    catalog: Option<PathBuf>,

    /// Extra spell class accepted by the consistency check (repeatable)
    #[arg(long = "class")]
    classes: Vec<String>,

    /// Default log level; RUST_LOG takes precedence
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every spell, sorted by id
    List {
        /// Only spells of this class
        #[arg(long)]
        class: Option<String>,
    },
    /// Run the consistency check; fails if any spell is flagged
    Check,
    /// Show one spell and its values at every level
    Show {
        /// Spell id
        id: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    let mut catalog = load_catalog(&args)?;
    let mut known_classes = arcana_data::known_classes();
    known_classes.extend(args.classes.iter().map(|c| ClassId::from(c.as_str())));

    match &args.command {
        Command::List { class } => {
            list(&catalog, class.as_deref());
            Ok(())
        }
        Command::Check => check(&mut catalog, &known_classes),
        Command::Show { id } => show(&catalog, id),
    }
}

fn init_logging(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(args: &Args) -> Result<SpellCatalog> {
    match &args.catalog {
        Some(path) => {
            let mut catalog = SpellCatalog::new();
            let report = catalog
                .load_file(path)
                .with_context(|| format!("failed to load spells from {}", path.display()))?;
            for err in &report.errors {
                eprintln!("skipped: {}", err);
            }
            Ok(catalog)
        }
        None => arcana_data::builtin_catalog().context("built-in spell data is malformed"),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn list(catalog: &SpellCatalog, class: Option<&str>) {
    let class = class.map(ClassId::from);
    for spell in catalog.get_all() {
        if class.is_some() && spell.spell_class != class {
            continue;
        }
        println!(
            "{:<20} {:<22} {:<18} {}",
            spell.id.as_str(),
            spell.name,
            spell.effect.to_string(),
            spell.spell_class.as_ref().map_or("-", |c| c.as_str())
        );
    }
}

fn check(catalog: &mut SpellCatalog, known_classes: &[ClassId]) -> Result<()> {
    let issues = catalog.check_consistency(known_classes);
    if issues.is_empty() {
        println!("{} spells, no problems found", catalog.len());
        return Ok(());
    }
    for issue in &issues {
        println!("{}", issue);
    }
    bail!("{} consistency problem(s) in {} spells", issues.len(), catalog.len())
}

fn show(catalog: &SpellCatalog, id: &str) -> Result<()> {
    let template = catalog
        .get(&SpellId::from(id))
        .with_context(|| format!("no spell with id {}", id))?;
    info!(spell = %template.id, src = %template.src, "showing spell");
    print_header(template);
    print_levels(template);
    Ok(())
}

fn print_header(template: &Arc<SpellType>) {
    let spell = Spell::new(template.clone());
    println!("{} ({})", template.name, template.id);
    if !template.description.is_empty() {
        println!("  {}", template.description);
    }
    println!("  effect:     {}", template.effect);
    if !template.effect_str.is_empty() {
        println!("  parameter:  {}", template.effect_str);
    }
    println!("  targets:    {}", spell.enumerate_targets());
    println!("  energy:     {}", template.energy_source);
    println!("  damage:     {}", spell.damage_type_string());
    println!(
        "  class:      {}",
        template.spell_class.as_ref().map_or("-", |c| c.as_str())
    );
    println!("  difficulty: {}", template.difficulty);
    println!("  max level:  {}", template.max_level);
}

fn print_levels(template: &Arc<SpellType>) {
    println!();
    println!(
        "{:>3} {:>8} {:>6} {:>5} {:>4} {:>6} {:>6} {:>6} {:>5}",
        "lvl", "exp", "damage", "range", "aoe", "turns", "pierce", "cost", "moves"
    );
    for level in 0..=template.max_level.clamp(0, MAX_SPELL_LEVEL) {
        let spell = Spell::with_experience(template.clone(), Spell::exp_for_level(level));
        println!(
            "{:>3} {:>8} {:>6} {:>5} {:>4} {:>6} {:>6} {:>6} {:>5}",
            level,
            Spell::exp_for_level(level),
            spell.damage(),
            spell.range(),
            spell.aoe(),
            spell.duration_turns(),
            spell.pierce(),
            template.energy_cost.at(level),
            template.casting_time.at(level)
        );
    }
}

//! Annotate generated schemas with authored documentation.
//!
//! Usage:
//!   schemadoc annotate --schema schema.json --docs docs/schema --out annotated.json --pages pages.json
//!   schemadoc gids --schema schema.json
//!   schemadoc validate --schema annotated.json --file config.json
//!   schemadoc validate --schema annotated.json < config.json

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use schemadoc::schema_loader::{load_json_schema, read_json};
use schemadoc::{AnnotateConfig, DocumentationStore, annotate, find_docs_dir};
use serde_json::Value;
use std::fs;
use std::io::{Read, Write, stdin, stdout};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const ENV_LOG: &str = "SCHEMADOC_LOG";

#[derive(Parser, Debug)]
#[command(name = "schemadoc")]
#[command(about = "Name every node of a generated schema and merge authored documentation into it")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk the schema, merge documentation and write the annotated result.
    Annotate(AnnotateArgs),
    /// Print every GID reachable from the root with its page URL.
    Gids(SchemaArgs),
    /// Validate a JSON document against a schema.
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Schema document to read.
    #[arg(long)]
    schema: PathBuf,
    /// Named type the document root collapses onto.
    #[arg(long)]
    primary_type: Option<String>,
    /// Prefix for generated page URLs.
    #[arg(long)]
    url_prefix: Option<String>,
}

#[derive(Args, Debug)]
struct AnnotateArgs {
    #[command(flatten)]
    common: SchemaArgs,
    /// Documentation directory; discovered when omitted.
    #[arg(long)]
    docs: Option<PathBuf>,
    /// Output path for the annotated schema; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output path for the page registry.
    #[arg(long)]
    pages: Option<PathBuf>,
    /// Base URL internal documentation links are rewritten against.
    #[arg(long)]
    site_url: Option<String>,
    /// Keep structured examples on each node beside the rendered description.
    #[arg(long)]
    keep_structured_examples: bool,
    /// Fail when a documentation record matches no node.
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Schema to validate against.
    #[arg(long)]
    schema: PathBuf,
    /// Input document; reads stdin when omitted.
    #[arg(long)]
    file: Option<PathBuf>,
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Annotate(args) => run_annotate(args),
        Command::Gids(args) => run_gids(args),
        Command::Validate(args) => run_validate(args),
    }
}

fn config_for(args: &SchemaArgs) -> AnnotateConfig {
    let mut config = AnnotateConfig::from_env();
    if let Some(primary) = &args.primary_type {
        config.primary_type = Some(primary.clone());
    }
    if let Some(prefix) = &args.url_prefix {
        config.url_prefix = prefix.clone();
    }
    config
}

fn run_annotate(args: AnnotateArgs) -> Result<()> {
    let mut config = config_for(&args.common);
    if let Some(url) = args.site_url {
        config.site_url = url;
    }
    config.keep_structured_examples = args.keep_structured_examples;

    let docs_dir = match args.docs {
        Some(dir) => dir,
        None => find_docs_dir().context("locating documentation directory")?,
    };
    let store = DocumentationStore::load_dir(&docs_dir)
        .with_context(|| format!("loading documentation from {}", docs_dir.display()))?;
    let document = read_json(&args.common.schema)?;

    let annotated = annotate(&document, &store, &config)
        .with_context(|| format!("annotating {}", args.common.schema.display()))?;

    let orphans = annotated.orphans(&store);
    for gid in &orphans {
        let source = store
            .source(gid)
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        warn!(gid = %gid, source = %source, "documentation record matches no schema node");
    }
    if args.strict && !orphans.is_empty() {
        bail!(
            "{} documentation record(s) match no schema node: {}",
            orphans.len(),
            orphans.join(", ")
        );
    }

    write_json(args.out.as_deref(), &annotated.schema)?;
    if let Some(path) = args.pages {
        let pages = serde_json::to_value(&annotated.pages)?;
        write_json(Some(&path), &pages)?;
        eprintln!("{} pages written to {}", annotated.pages.len(), path.display());
    }
    Ok(())
}

fn run_gids(args: SchemaArgs) -> Result<()> {
    let config = config_for(&args);
    let document = read_json(&args.schema)?;
    let annotated = annotate(&document, &DocumentationStore::default(), &config)
        .with_context(|| format!("walking {}", args.schema.display()))?;

    let mut out = stdout().lock();
    for page in &annotated.pages {
        writeln!(out, "{}\t{}", page.gid, page.url)?;
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let compiled = load_json_schema(&args.schema)?;
    let input = read_input(args.file.as_deref())?;
    compiled
        .validate(&input)
        .context("document failed schema validation")?;
    println!("valid");
    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<Value> {
    if let Some(path) = file {
        return read_json(path);
    }
    let mut buf = String::new();
    stdin()
        .read_to_string(&mut buf)
        .context("reading stdin for input JSON")?;
    serde_json::from_str(&buf).context("parsing input JSON")
}

fn write_json(path: Option<&Path>, value: &Value) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    match path {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            stdout()
                .lock()
                .write_all(json.as_bytes())
                .context("writing to stdout")
        }
    }
}

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kegg_pathway::app::{App, parse_map_tokens, read_map_list};
use kegg_pathway::client::KeggHttpClient;
use kegg_pathway::config::ConfigLoader;
use kegg_pathway::domain::{MapId, OrganismCode};
use kegg_pathway::engine::FetchEngine;
use kegg_pathway::error::KeggError;
use kegg_pathway::output::{JsonOutput, OutputMode, TextOutput};
use kegg_pathway::store::Store;

#[derive(Parser)]
#[command(name = "kegg-pathway")]
#[command(about = "KEGG pathway downloads and keg-to-TSV conversion")]
#[command(version, author)]
struct Cli {
    /// JSON config file (defaults to ./kegg-pathway.json when present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Refresh the local organism table")]
    Update,
    #[command(about = "Download organism keg files (<code>00001.keg.gz)")]
    Get(GetArgs),
    #[command(about = "Extract an organism keg file from the local keg archive")]
    GetLocal(GetLocalArgs),
    #[command(about = "Download pathway pages referenced by a keg file")]
    Html(HtmlArgs),
    #[command(about = "Download pathway pages for a list of map ids")]
    Maps(MapsArgs),
    #[command(about = "Convert a keg file to TSV (file or stdout)")]
    Tsv(TsvArgs),
    #[command(about = "Find a species name or organism code in the local table")]
    Match(MatchArgs),
    #[command(about = "Match a species, download its keg, convert to TSV and fetch its pages")]
    Species(MatchArgs),
}

#[derive(Args)]
struct GetArgs {
    #[arg(required = true)]
    codes: Vec<String>,

    #[arg(long, default_value = ".")]
    outdir: Utf8PathBuf,
}

#[derive(Args)]
struct GetLocalArgs {
    code: String,

    #[arg(long, default_value = ".")]
    outdir: Utf8PathBuf,
}

#[derive(Args)]
struct HtmlArgs {
    /// Keg file, gzip when ending in .gz, `-` for stdin
    keg: String,
    outdir: Utf8PathBuf,

    #[arg(long)]
    overwrite: bool,
}

#[derive(Args)]
struct MapsArgs {
    /// Whitespace-separated file of map ids
    #[arg(long)]
    list: Option<Utf8PathBuf>,

    ids: Vec<String>,

    #[arg(long, default_value = ".")]
    outdir: Utf8PathBuf,

    #[arg(long)]
    overwrite: bool,
}

#[derive(Args)]
struct TsvArgs {
    /// Keg file, gzip when ending in .gz, `-` for stdin
    keg: String,
    /// Output path; stdout when omitted
    output: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct MatchArgs {
    query: String,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kegg) = report.downcast_ref::<KeggError>() {
            return ExitCode::from(map_exit_code(kegg));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &KeggError) -> u8 {
    match error {
        KeggError::OrganismNotFound(_) => 2,
        KeggError::Http(_) | KeggError::Status { .. } | KeggError::IncompleteHtext(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let client = KeggHttpClient::new(config.endpoints.clone(), config.timeout)?;
    let app = App::new(
        Store::new(config.data_dir.clone()),
        client,
        FetchEngine::new(config.concurrency),
    );

    match cli.command {
        Command::Update => {
            let metadata = app.update()?;
            if matches!(output_mode, OutputMode::Json) {
                JsonOutput::print_update(&metadata).into_diagnostic()?;
            }
            Ok(())
        }
        Command::Get(args) => {
            let codes = args
                .codes
                .iter()
                .map(|code| code.parse::<OrganismCode>())
                .collect::<Result<Vec<_>, _>>()?;
            app.get(codes, &args.outdir)?;
            Ok(())
        }
        Command::GetLocal(args) => {
            let code: OrganismCode = args.code.parse()?;
            app.get_local(&code, &args.outdir)?;
            Ok(())
        }
        Command::Html(args) => {
            app.html(&args.keg, &args.outdir, args.overwrite)?;
            Ok(())
        }
        Command::Maps(args) => {
            let mut ids: Vec<MapId> = match &args.list {
                Some(path) => read_map_list(path)?,
                None => Vec::new(),
            };
            ids.extend(parse_map_tokens(args.ids.iter().map(String::as_str)));
            if ids.is_empty() {
                return Err(miette::Report::msg("no map ids given (use --list or ids)"));
            }
            app.maps(ids, &args.outdir, args.overwrite)?;
            Ok(())
        }
        Command::Tsv(args) => {
            app.tsv(&args.keg, args.output.as_deref())?;
            Ok(())
        }
        Command::Match(args) => {
            let record = app.lookup(&args.query)?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_organism(&record).into_diagnostic(),
                OutputMode::Text => TextOutput::print_organism(&record).into_diagnostic(),
            }
        }
        Command::Species(args) => {
            let workdir = Utf8PathBuf::from(".");
            let result = app.species(&args.query, &workdir)?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_species(&result).into_diagnostic(),
                OutputMode::Text => TextOutput::print_organism(&result.organism).into_diagnostic(),
            }
        }
    }
}

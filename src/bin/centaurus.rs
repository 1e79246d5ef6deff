use std::io::IsTerminal;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use centaurus::app::{AddOptions, AddRequest, AddResult, App, ResolveResult};
use centaurus::config::{ConfigLoader, ResolvedConfig};
use centaurus::error::{CentaurusError, ErrorKind};
use centaurus::library::Library;
use centaurus::nfo::render_sidecar;
use centaurus::output::{ConsoleSink, JsonOutput, OutputMode};
use centaurus::tmdb::TmdbHttpClient;
use centaurus::tui::Tui;

#[derive(Parser)]
#[command(name = "centaurus")]
#[command(about = "File a media asset into a per-title folder with a TMDB-backed .nfo sidecar")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default: ./centaurus.json when present).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Library root; overrides the config file.
    #[arg(long, global = true)]
    library: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Resolve a link, write the sidecar and copy the asset into the library")]
    Add(AddArgs),
    #[command(about = "Resolve a link and print the normalized metadata")]
    Resolve(ResolveArgs),
}

#[derive(Args)]
struct AddArgs {
    asset: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    link: String,

    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct ResolveArgs {
    link: String,

    /// Print the rendered .nfo instead of the record.
    #[arg(long)]
    sidecar: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;
    if let Err(report) = run(cli) {
        if let Some(error) = report.downcast_ref::<CentaurusError>() {
            if json {
                let _ = JsonOutput::print_error(error);
            }
            eprintln!("{report:?}");
            return ExitCode::from(map_exit_code(error.kind()));
        }
        eprintln!("{report:?}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::NotFound => 2,
        ErrorKind::ServiceError => 3,
        ErrorKind::ConfigurationError => 4,
        ErrorKind::LinkParseFailure | ErrorKind::InvalidInput => 5,
        ErrorKind::IoError => 1,
    }
}

fn run(cli: Cli) -> miette::Result<()> {
    let output_mode = if cli.non_interactive || cli.json || !std::io::stdout().is_terminal() {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };
    if logs_to_stderr(&cli, output_mode) {
        init_tracing();
    }

    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;
    if let Some(library) = cli.library {
        config.library_root = Utf8PathBuf::from(library);
    }

    match cli.command {
        Some(Commands::Add(args)) => run_add(args, build_app(&config)?, cli.json),
        Some(Commands::Resolve(args)) => run_resolve(args, build_app(&config)?, cli.json),
        None => match output_mode {
            OutputMode::Interactive => {
                let app = build_app(&config)?;
                let mut tui = Tui::new();
                tui.session(|request, sink| app.add(request, AddOptions::default(), sink))
            }
            OutputMode::NonInteractive => Err(miette::Report::msg(
                "command required (try `centaurus --help`)",
            )),
        },
    }
}

/// The form owns the terminal; stderr logging would draw over it.
fn logs_to_stderr(cli: &Cli, output_mode: OutputMode) -> bool {
    cli.command.is_some() || matches!(output_mode, OutputMode::NonInteractive)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_app(config: &ResolvedConfig) -> miette::Result<App<TmdbHttpClient>> {
    let settings = config.tmdb_settings(ConfigLoader::api_key_from_env())?;
    let client = TmdbHttpClient::new(settings)?;
    Ok(App::new(Library::new(config.library_root.clone()), client))
}

fn run_add(args: AddArgs, app: App<TmdbHttpClient>, json: bool) -> miette::Result<()> {
    let request = AddRequest {
        asset: args.asset,
        name: args.name,
        link: args.link,
    };
    let options = AddOptions {
        dry_run: args.dry_run,
    };

    if json {
        let result = app.add(&request, options, &JsonOutput)?;
        JsonOutput::print_add(&result).into_diagnostic()?;
        return Ok(());
    }

    let result = app.add(&request, options, &ConsoleSink)?;
    print_add_summary(&result);
    Ok(())
}

fn run_resolve(args: ResolveArgs, app: App<TmdbHttpClient>, json: bool) -> miette::Result<()> {
    if json {
        let result = app.resolve(&args.link, &JsonOutput)?;
        if args.sidecar {
            println!("{}", render_sidecar(&result.record)?);
        } else {
            JsonOutput::print_resolve(&result).into_diagnostic()?;
        }
        return Ok(());
    }

    let result = app.resolve(&args.link, &ConsoleSink)?;
    if args.sidecar {
        println!("{}", render_sidecar(&result.record)?);
    } else {
        print_record(&result);
    }
    Ok(())
}

fn print_record(result: &ResolveResult) {
    let record = &result.record;
    println!("{} ({})", record.title, record.year);
    println!("  id:      {}", result.identifier);
    println!("  tmdb:    {}", record.tmdb_link());
    if let Some(link) = record.imdb_link() {
        println!("  imdb:    {link}");
    }
    if !record.genres.is_empty() {
        println!("  genres:  {}", record.genres.join(", "));
    }
    println!("  rating:  {}", record.rating);
}

fn print_add_summary(result: &AddResult) {
    let green = "\x1b[32m";
    let cyan = "\x1b[36m";
    let yellow = "\x1b[33m";
    let reset = "\x1b[0m";

    println!(
        "{green}✅ {} ({}) resolved via {}{reset}",
        result.record.title, result.record.year, result.identifier
    );
    match &result.layout {
        Some(layout) => {
            println!("{cyan}   📁 folder:  {}{reset}", layout.root);
            println!("{cyan}   📝 sidecar: {}{reset}", layout.sidecar);
            println!("{cyan}   🎞  asset:   {}{reset}", layout.asset);
        }
        None => {
            println!("{yellow}   dry run, nothing written; sidecar:{reset}");
            println!("{}", result.sidecar);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_comes_from_parsed_args_only() {
        let cli = Cli::try_parse_from([
            "centaurus",
            "add",
            "movie.torrent",
            "--name=--json",
            "--link",
            "https://www.themoviedb.org/movie/27205",
        ])
        .unwrap();
        assert!(!cli.json);
        assert!(matches!(cli.command, Some(Commands::Add(ref args)) if args.name == "--json"));
    }

    #[test]
    fn form_session_keeps_stderr_quiet() {
        let form = Cli::try_parse_from(["centaurus"]).unwrap();
        assert!(!logs_to_stderr(&form, OutputMode::Interactive));
        assert!(logs_to_stderr(&form, OutputMode::NonInteractive));

        let resolve = Cli::try_parse_from(["centaurus", "resolve", "https://www.imdb.com/title/tt1375666"])
            .unwrap();
        assert!(logs_to_stderr(&resolve, OutputMode::Interactive));
    }
}

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use submissions_search::app::{App, EnvironmentReport};
use submissions_search::client::SubmissionsHttpClient;
use submissions_search::config::{ConfigLoader, ConfigOverrides};
use submissions_search::error::SubmissionsError;
use submissions_search::output::{JsonOutput, OutputMode, StderrProgress, TextOutput};
use submissions_search::tui::Tui;

#[derive(Parser)]
#[command(name = "subs-search")]
#[command(about = "Look up samples and specimens in the submissions service")]
#[command(version, author)]
struct Cli {
    /// Print JSON instead of text and never start the interactive view.
    #[arg(long, global = true)]
    non_interactive: bool,

    /// API base URL; overrides SUBMISSIONS_API_URL and the config file.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Search on a Biosample ID, a Specimen ID or a Biospecimen ID")]
    Search(SearchArgs),
    #[command(about = "Show the deployment environment of the API")]
    Env,
}

#[derive(Args)]
struct SearchArgs {
    term: String,

    /// Print every field of each sample, not just the summary.
    #[arg(long)]
    details: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<SubmissionsError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SubmissionsError) -> u8 {
    error.exit_code()
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let resolved = ConfigLoader::resolve(
        cli.config.as_deref(),
        ConfigOverrides {
            base_url: cli.base_url,
        },
    )?;
    let client = SubmissionsHttpClient::new(&resolved)?;
    tracing::debug!(base_url = %client.base_url(), "using submissions API");
    let app = App::new(client);

    match cli.command {
        Some(Commands::Search(args)) => run_search(&app, args, output_mode),
        Some(Commands::Env) => run_env(&app, &resolved.base_url, output_mode),
        None => match output_mode {
            OutputMode::Interactive => {
                let mut tui = Tui::new(app, resolved.base_url);
                tui.run()
            }
            OutputMode::NonInteractive => Err(miette::Report::msg(
                "command required (try `subs-search search --help`)",
            )),
        },
    }
}

fn run_search(
    app: &App<SubmissionsHttpClient>,
    args: SearchArgs,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let report = match output_mode {
        OutputMode::NonInteractive => {
            let report = app.search(&args.term, &JsonOutput)?;
            JsonOutput::print_search(&report)
                .map_err(|err| SubmissionsError::Output(err.to_string()))?;
            report
        }
        OutputMode::Interactive => {
            let report = app.search(&args.term, &StderrProgress)?;
            TextOutput::print_search(&report, args.details)
                .map_err(|err| SubmissionsError::Output(err.to_string()))?;
            report
        }
    };
    // the report is printed either way; an unreachable API still fails the run
    report.ensure_reachable()?;
    Ok(())
}

fn run_env(
    app: &App<SubmissionsHttpClient>,
    base_url: &str,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let environment = match output_mode {
        OutputMode::NonInteractive => app.environment(&JsonOutput),
        OutputMode::Interactive => app.environment(&StderrProgress),
    };
    let report = EnvironmentReport {
        brand: environment.brand(),
        environment: environment.name,
        base_url: base_url.to_string(),
    };
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_environment(&report),
        OutputMode::Interactive => TextOutput::print_environment(&report),
    }
    .into_diagnostic()
}

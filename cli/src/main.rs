mod app;
mod config;
mod test_runner;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use enclaro::{Warning, html, plain};
use report::{AnalysisModule, Report};

use app::AppState;
use config::Config;

const SUBCOMMANDS: &[&str] = &["render", "report", "history", "test", "help"];

/// Global options that take a value, so their value is not mistaken for a file.
const VALUE_OPTIONS: &[&str] = &["--config"];

#[derive(Parser)]
#[command(name = "enclaro", version, about = "Render analysis results to HTML")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render markdown-subset text to HTML
    Render(RenderArgs),

    /// Split an analysis result into sections and render each one
    Report(ReportArgs),

    /// Inspect saved analyses
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Run .test.md fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Input file; `-` or nothing reads stdin
    file: Option<String>,

    /// Detect a pipe table
    #[arg(long)]
    tables: bool,

    /// Dump the block sequence instead of HTML
    #[arg(long)]
    blocks: bool,

    /// Print plain text instead of HTML
    #[arg(long)]
    plain: bool,

    /// Only report rendering warnings (exit 1 if there are any)
    #[arg(long)]
    check: bool,
}

#[derive(clap::Args)]
struct ReportArgs {
    /// Input file; `-` or nothing reads stdin
    file: Option<String>,

    /// Analysis module that produced the result
    #[arg(short, long)]
    module: Option<AnalysisModule>,

    /// Print plain text instead of HTML
    #[arg(long)]
    text: bool,

    /// Save the result to history
    #[arg(long)]
    save: bool,

    /// The text that was analysed, stored with the saved result
    #[arg(long, requires = "save")]
    input: Option<String>,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved analyses, newest first
    List,

    /// Render a saved analysis
    Show {
        id: i64,

        /// Print plain text instead of HTML
        #[arg(long)]
        text: bool,
    },

    /// Delete all saved analyses
    Clear,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    init_logging();

    let args = inject_default_subcommand(std::env::args().collect());
    let cli = Cli::parse_from(&args);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

/// `enclaro file.md` works like `enclaro render file.md`.
fn inject_default_subcommand(mut args: Vec<String>) -> Vec<String> {
    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if VALUE_OPTIONS.contains(&arg.as_str()) {
            i += 2;
            continue;
        }
        if !arg.starts_with('-') || arg == "-" {
            if !SUBCOMMANDS.contains(&arg.as_str()) {
                args.insert(i, "render".to_string());
            }
            return args;
        }
        i += 1;
    }
    args
}

fn run(cli: Cli) -> Result<i32> {
    let config = Config::load(cli.config.as_deref());
    let color_choice = if cli.no_color || !config.color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    match cli.command {
        Command::Render(args) => do_render(args, color_choice),
        Command::Report(args) => do_report(args, config, color_choice),
        Command::History { action } => do_history(action, config),
        Command::Test(args) => {
            let path = Path::new(&args.path);
            if args.list_categories {
                test_runner::list_categories(path);
                return Ok(0);
            }
            Ok(test_runner::run_tests(
                path,
                color_choice == ColorChoice::Never,
                &args.category,
            ))
        }
    }
}

fn read_input(file: Option<&str>) -> Result<(String, String)> {
    match file {
        None | Some("-") => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("cannot read stdin")?;
            Ok(("<stdin>".to_string(), source))
        }
        Some(path) => {
            let source =
                std::fs::read_to_string(path).with_context(|| format!("cannot read '{}'", path))?;
            Ok((path.to_string(), source))
        }
    }
}

fn do_render(args: RenderArgs, color_choice: ColorChoice) -> Result<i32> {
    let (name, source) = read_input(args.file.as_deref())?;

    let mut files = SimpleFiles::new();
    let file_id = files.add(name.clone(), source.clone());

    let parser = enclaro::Parser::new(&source, file_id);
    let parsed = if args.tables {
        parser.parse_tables()
    } else {
        parser.parse()
    };
    tracing::debug!(
        blocks = parsed.document.blocks.len(),
        warnings = parsed.warnings.len(),
        "rendered {}",
        name
    );

    if args.check {
        emit_warnings(&files, &parsed.warnings, color_choice);
        if parsed.warnings.is_empty() {
            eprintln!("ok: {} renders cleanly", name);
            return Ok(0);
        }
        eprintln!("{}: {} warning(s)", name, parsed.warnings.len());
        return Ok(1);
    }

    let mut stdout = io::stdout().lock();
    if args.blocks {
        writeln!(stdout, "{:#?}", parsed.document.blocks)?;
    } else if args.plain {
        writeln!(stdout, "{}", plain::to_plain_text(&parsed.document))?;
    } else {
        writeln!(stdout, "{}", html::to_html(&parsed.document))?;
    }
    Ok(0)
}

fn do_report(args: ReportArgs, config: Config, color_choice: ColorChoice) -> Result<i32> {
    let Some(module) = args.module.or(config.default_module) else {
        bail!("no analysis module given (use --module or set default_module in the config)");
    };
    let (name, source) = read_input(args.file.as_deref())?;

    let mut files = SimpleFiles::new();
    let file_id = files.add(name, source.clone());

    let report = Report::build(&source, module, file_id);
    let warnings: Vec<Warning> = report.warnings().cloned().collect();
    emit_warnings(&files, &warnings, color_choice);

    write_report(&report, args.text)?;

    if args.save {
        let mut state = AppState::load(config)?;
        let id = state
            .history
            .push(module, args.input.as_deref().unwrap_or(""), &source)
            .id;
        state.save_history()?;
        tracing::info!(id, "saved analysis to history");
        eprintln!("saved as {}", id);
    }
    Ok(0)
}

fn do_history(action: HistoryAction, config: Config) -> Result<i32> {
    let mut state = AppState::load(config)?;

    match action {
        HistoryAction::List => {
            if state.history.is_empty() {
                eprintln!("no saved analyses yet");
                return Ok(0);
            }
            let mut stdout = io::stdout().lock();
            for entry in state.history.entries() {
                writeln!(
                    stdout,
                    "{}  {:<17}  {}  \"{}\"",
                    entry.id,
                    entry.module,
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.preview()
                )?;
            }
        }
        HistoryAction::Show { id, text } => {
            let entry = state
                .history
                .get(id)
                .ok_or(report::ReportError::NoSuchEntry(id))?;
            let report = Report::build(&entry.result, entry.module, 0);
            write_report(&report, text)?;
        }
        HistoryAction::Clear => {
            let count = state.history.len();
            state.history.clear();
            state.save_history()?;
            eprintln!("removed {} saved analyses", count);
        }
    }
    Ok(0)
}

fn write_report(report: &Report, text: bool) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if text {
        report::write_text(report, &mut stdout)?;
    } else {
        report::write_html(report, &mut stdout)?;
    }
    Ok(())
}

fn emit_warnings(
    files: &SimpleFiles<String, String>,
    warnings: &[Warning],
    color_choice: ColorChoice,
) {
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for warning in warnings {
        let diagnostic = warning.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_file_implies_render() {
        assert_eq!(
            inject_default_subcommand(args(&["enclaro", "out.md"])),
            args(&["enclaro", "render", "out.md"])
        );
    }

    #[test]
    fn known_subcommand_untouched() {
        let given = args(&["enclaro", "--no-color", "report", "-m", "routine"]);
        assert_eq!(inject_default_subcommand(given.clone()), given);
    }

    #[test]
    fn config_value_is_not_a_file() {
        assert_eq!(
            inject_default_subcommand(args(&["enclaro", "--config", "c.toml", "--tables", "x.md"])),
            args(&["enclaro", "--config", "c.toml", "--tables", "render", "x.md"])
        );
    }

    #[test]
    fn stdin_dash_implies_render() {
        assert_eq!(
            inject_default_subcommand(args(&["enclaro", "-"])),
            args(&["enclaro", "render", "-"])
        );
    }

    #[test]
    fn cli_parses_report_module() {
        let cli = Cli::try_parse_from(["enclaro", "report", "r.md", "--module", "roleplay_feedback"])
            .unwrap();
        match cli.command {
            Command::Report(args) => {
                assert_eq!(args.module, Some(AnalysisModule::RoleplayFeedback));
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn cli_rejects_unknown_module() {
        assert!(Cli::try_parse_from(["enclaro", "report", "--module", "weather"]).is_err());
    }
}

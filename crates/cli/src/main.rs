use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use scplint_core::catalog::ActionCatalog;
use scplint_core::config::{self, Config};
use scplint_core::discovery::discover_policy_files;
use scplint_core::policy::DEFAULT_SIZE_MAX;
use scplint_core::report::{ReportView, RunSummary};
use scplint_core::{analyze_file, AnalyzeOptions};

const SEPARATOR: &str = "-----------------------------------------------------------";

#[derive(Parser, Debug)]
#[command(
    name = "scplint",
    version,
    about = "Validate and optimize AWS Service Control Policies"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lint one SCP file or every *.json file in a directory.
    #[command(visible_alias = "check")]
    Lint {
        /// Path to an SCP file or a directory of SCPs.
        #[arg(short, long)]
        input: PathBuf,

        /// Include every diagnostic message in the report.
        #[arg(short, long)]
        detailed: bool,

        /// Measure policies without whitespace.
        #[arg(short, long)]
        minimize: bool,

        /// Descend into subdirectories of --input.
        #[arg(short, long)]
        recursive: bool,

        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Newline-separated list of known actions (defaults to the bundled list).
        #[arg(long)]
        actions_file: Option<PathBuf>,

        /// Maximum policy size in bytes.
        #[arg(long)]
        size_max: Option<usize>,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the minimized policy after each report.
        #[arg(long)]
        print_minimized: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl From<config::OutputFormat> for OutputFormat {
    fn from(f: config::OutputFormat) -> Self {
        match f {
            config::OutputFormat::Json => OutputFormat::Json,
            config::OutputFormat::Yaml => OutputFormat::Yaml,
        }
    }
}

struct LintArgs {
    input: PathBuf,
    detailed: bool,
    recursive: bool,
    output: OutputFormat,
    actions_file: Option<PathBuf>,
    print_minimized: bool,
    opts: AnalyzeOptions,
}

struct Style {
    bold: &'static str,
    dim: &'static str,
    red: &'static str,
    green: &'static str,
    yellow: &'static str,
    orange: &'static str,
    reset: &'static str,
}

const COLOR: Style = Style {
    bold: "\x1b[1m",
    dim: "\x1b[2m",
    red: "\x1b[31m",
    green: "\x1b[32m",
    yellow: "\x1b[33m",
    orange: "\x1b[38;5;208m",
    reset: "\x1b[0m",
};

const PLAIN: Style = Style {
    bold: "",
    dim: "",
    red: "",
    green: "",
    yellow: "",
    orange: "",
    reset: "",
};

fn style() -> &'static Style {
    if std::env::var_os("NO_COLOR").is_some() {
        &PLAIN
    } else {
        &COLOR
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let res = match cli.cmd {
        Commands::Lint {
            input,
            detailed,
            minimize,
            recursive,
            output,
            actions_file,
            size_max,
            config,
            print_minimized,
        } => {
            let cfg = load_config(config.as_deref());
            let args = LintArgs {
                input,
                detailed: detailed || cfg.detailed.unwrap_or(false),
                recursive: recursive || cfg.recursive.unwrap_or(false),
                output: output
                    .or(cfg.output.map(OutputFormat::from))
                    .unwrap_or(OutputFormat::Json),
                actions_file: actions_file.or(cfg.actions_file),
                print_minimized,
                opts: AnalyzeOptions {
                    minimize: minimize || cfg.minimize.unwrap_or(false),
                    size_max: size_max.or(cfg.size_max).unwrap_or(DEFAULT_SIZE_MAX),
                },
            };
            run_lint(&args)
        }
    };

    match res {
        Ok(code) => code,
        Err(e) => {
            let s = style();
            eprintln!(
                "{}{red}error:{reset} {:#}",
                s.bold,
                e,
                red = s.red,
                reset = s.reset
            );
            ExitCode::from(1)
        }
    }
}

fn print_banner() {
    let s = style();
    eprintln!(
        "\n  {bold}scp{reset}{orange}|{reset}{dim}lint{reset}  {dim}service control policy linter{reset}\n",
        bold = s.bold,
        orange = s.orange,
        dim = s.dim,
        reset = s.reset,
    );
}

fn size_color(size: usize, size_max: usize) -> &'static str {
    let s = style();
    if size > size_max {
        s.red
    } else if size * 10 > size_max * 9 {
        s.yellow
    } else {
        s.green
    }
}

fn count_color(count: usize, color: &'static str) -> &'static str {
    if count == 0 {
        style().dim
    } else {
        color
    }
}

fn print_file_line(view: &ReportView) {
    let s = style();
    let sc = size_color(view.size, view.size_maximum);
    let counts = &view.summary;

    eprintln!(
        "  {bold}{}{reset}  {sc}{}/{} bytes ({}){reset}",
        view.file,
        view.size,
        view.size_maximum,
        view.percent,
        bold = s.bold,
        sc = sc,
        reset = s.reset
    );
    eprintln!(
        "    {ec}{} errors{reset}  {wc}{} warnings{reset}  {dim}{} infos  {} recommendations{reset}",
        counts.errors,
        counts.warnings,
        counts.infos,
        counts.recommendations,
        ec = count_color(counts.errors, s.red),
        wc = count_color(counts.warnings, s.yellow),
        dim = s.dim,
        reset = s.reset
    );
}

fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(p) => Config::load(p).unwrap_or_else(|e| {
            eprintln!(
                "{}{}warning:{} failed to load config {}: {:#}",
                style().bold,
                style().yellow,
                style().reset,
                p.display(),
                e
            );
            Config::default()
        }),
        None => Config::discover().unwrap_or_default(),
    }
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<ActionCatalog> {
    match path {
        Some(p) => ActionCatalog::load(p),
        None => Ok(ActionCatalog::embedded()),
    }
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(value).context("serialize report json")?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => serde_yaml::to_string(value).context("serialize report yaml"),
    }
}

fn run_lint(args: &LintArgs) -> anyhow::Result<ExitCode> {
    let s = style();

    anyhow::ensure!(args.opts.size_max > 0, "--size-max must be greater than zero");
    let catalog = load_catalog(args.actions_file.as_deref())?;
    let files = discover_policy_files(&args.input, args.recursive)?;

    print_banner();
    if files.is_empty() {
        eprintln!(
            "  {yellow}no policy files found in {}{reset}\n",
            args.input.display(),
            yellow = s.yellow,
            reset = s.reset
        );
    }

    let mut views = Vec::with_capacity(files.len());
    let mut failed = 0usize;
    let mut has_errors = false;

    for path in &files {
        let report = match analyze_file(path, &catalog, &args.opts) {
            Ok(report) => report,
            Err(e) => {
                eprintln!(
                    "  {red}error:{reset} {:#}",
                    e,
                    red = s.red,
                    reset = s.reset
                );
                failed += 1;
                continue;
            }
        };

        let view = if args.detailed {
            report.detailed()
        } else {
            report.summary()
        };

        if !views.is_empty() {
            println!("{SEPARATOR}");
        }
        print!("{}", render(&view, args.output)?);
        if args.print_minimized {
            println!("{}", report.policy().minimized_json());
        }

        print_file_line(&view);
        has_errors |= report.has_errors();
        views.push(view);
    }

    if files.len() > 1 {
        println!("{SEPARATOR}");
        print!("{}", render(&RunSummary::from_views(&views), args.output)?);
    }

    eprintln!();
    let exit = if failed > 0 {
        eprintln!(
            "  {red}{bold}FAILED{reset}  {dim}({} of {} file(s) could not be analyzed){reset}",
            failed,
            files.len(),
            red = s.red,
            bold = s.bold,
            dim = s.dim,
            reset = s.reset,
        );
        ExitCode::from(1)
    } else if has_errors {
        eprintln!(
            "  {red}{bold}ERRORS{reset}",
            red = s.red,
            bold = s.bold,
            reset = s.reset
        );
        ExitCode::from(2)
    } else {
        eprintln!(
            "  {green}{bold}PASS{reset}",
            green = s.green,
            bold = s.bold,
            reset = s.reset
        );
        ExitCode::from(0)
    };
    eprintln!();

    Ok(exit)
}

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cookie_localizer::model::config::{CollisionPolicy, LocalizerConfig, MatchMode};
use cookie_localizer::protocol;
use cookie_localizer::services::{batch, config};
use cookie_localizer::BatchReport;

/// Localize cookie-notice JSON into one document per locale
#[derive(Parser, Debug)]
#[command(name = "cookie-localizer")]
#[command(version)]
struct Cli {
    /// Log debug details
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write localized documents for every locale of the translation table
    Localize(LocalizeArgs),
    /// Answer line-delimited JSON requests on stdin
    Serve,
    /// Write a config file holding the default settings
    InitConfig { path: PathBuf },
}

#[derive(Args, Debug)]
struct LocalizeArgs {
    /// Config file; flags given here take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Translation table ({ locale: { token: text } })
    #[arg(long)]
    translations: Option<String>,

    /// Source document with placeholder tokens
    #[arg(long)]
    input: Option<String>,

    /// Directory for pretty-printed output
    #[arg(long)]
    outdir: Option<String>,

    /// Directory for minified output
    #[arg(long, conflicts_with = "no_minified")]
    minout: Option<String>,

    /// Skip minified output
    #[arg(long)]
    no_minified: bool,

    /// Rename column keys to their localized labels
    #[arg(long = "translate-keys", alias = "translate_keys")]
    translate_keys: bool,

    /// Fall back to case-insensitive token matching
    #[arg(long)]
    case_insensitive: bool,

    /// What to do when an output directory path is an existing file
    #[arg(long, value_enum)]
    on_collision: Option<CollisionArg>,

    /// Prefix of output file names
    #[arg(long)]
    file_stem: Option<String>,

    /// Skip the missing/empty token audit
    #[arg(long)]
    no_audit: bool,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json_report: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CollisionArg {
    Fail,
    Fallback,
    Overwrite,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Fail => CollisionPolicy::Fail,
            CollisionArg::Fallback => CollisionPolicy::Fallback,
            CollisionArg::Overwrite => CollisionPolicy::Overwrite,
        }
    }
}

impl LocalizeArgs {
    fn into_config(self) -> Result<(LocalizerConfig, bool)> {
        let mut cfg = match &self.config {
            Some(path) => config::open_config(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => LocalizerConfig::default(),
        };

        if let Some(v) = self.translations {
            cfg.translations = v;
        }
        if let Some(v) = self.input {
            cfg.input = v;
        }
        if let Some(v) = self.outdir {
            cfg.pretty_dir = v;
        }
        if let Some(v) = self.minout {
            cfg.minified_dir = Some(v);
        }
        if self.no_minified {
            cfg.minified_dir = None;
        }
        if self.translate_keys {
            cfg.rename_keys = true;
        }
        if self.case_insensitive {
            cfg.match_mode = MatchMode::CaseInsensitive;
        }
        if let Some(v) = self.on_collision {
            cfg.collision = v.into();
        }
        if let Some(v) = self.file_stem {
            cfg.file_stem = v;
        }
        if self.no_audit {
            cfg.audit = false;
        }

        config::validate(&cfg)?;
        Ok((cfg, self.json_report))
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_summary(report: &BatchReport) {
    println!(
        "Done. Wrote {} pretty files to: {}",
        report.processed,
        report.outputs.pretty.path.display()
    );
    if let Some(min) = &report.outputs.minified {
        println!(
            "Done. Wrote {} minified files to: {}",
            report.processed,
            min.path.display()
        );
    }
    for failed in report.failed() {
        println!(
            "Skipped {}: {}",
            failed.locale,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }
}

fn localize(args: LocalizeArgs) -> Result<ExitCode> {
    let (cfg, json_report) = args.into_config()?;

    info!(
        translations = %cfg.translations,
        input = %cfg.input,
        rename_keys = cfg.rename_keys,
        "localizing"
    );

    let report = batch::run_from_config(&cfg)?;

    if json_report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    info!(
        processed = report.processed,
        skipped = report.skipped,
        "batch finished"
    );
    Ok(ExitCode::SUCCESS)
}

fn init_config(path: &Path) -> Result<ExitCode> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    config::save_config(path, &LocalizerConfig::default())?;
    info!(path = %path.display(), "config written");
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let outcome = match cli.command {
        Command::Localize(args) => localize(args),
        Command::Serve => {
            let stdin = io::stdin();
            protocol::serve(stdin.lock(), io::stdout())
                .map(|()| ExitCode::SUCCESS)
                .context("stdio closed")
        }
        Command::InitConfig { path } => init_config(&path),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

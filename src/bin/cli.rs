use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use droidlint::config::{Config, CONFIG_FILE};
use droidlint::error::LintError;
use droidlint::output::OutputFormat;
use droidlint::rules::builtin::all_detectors;
use droidlint::rules::{IssueRegistry, Severity};
use droidlint::ScanOptions;

#[derive(Parser)]
#[command(
    name = "droidlint",
    about = "Lint checks for Android projects",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check an Android project (or a single file) for issues
    Check {
        /// Path to the project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json, sarif, xml)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Minimum severity to fail (informational, warning, error, fatal)
        #[arg(long)]
        fail_on: Option<String>,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Only check this file (repeatable); whole-project checks are skipped
        #[arg(long = "file")]
        files: Vec<PathBuf>,

        /// Check files on all cores
        #[arg(long)]
        parallel: bool,

        /// Stop starting new files after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List all registered issues
    ListIssues {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Show the full explanation of one issue
    Explain {
        /// Issue id, e.g. HardcodedText
        id: String,
    },

    /// Generate a starter .droidlint.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DROIDLINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            path,
            config,
            format,
            fail_on,
            output,
            files,
            parallel,
            timeout,
        } => {
            let options = CheckArgs {
                path,
                config,
                format,
                fail_on,
                output,
                files,
                parallel,
                timeout,
            };
            cmd_check(options)
        }
        Commands::ListIssues { format } => cmd_list_issues(format),
        Commands::Explain { id } => cmd_explain(id),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

struct CheckArgs {
    path: PathBuf,
    config: Option<PathBuf>,
    format: String,
    fail_on: Option<String>,
    output: Option<PathBuf>,
    files: Vec<PathBuf>,
    parallel: bool,
    timeout: Option<u64>,
}

fn cmd_check(args: CheckArgs) -> Result<i32, LintError> {
    let format = OutputFormat::from_str_lenient(&args.format).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", args.format);
        OutputFormat::Console
    });

    let fail_on = args.fail_on.and_then(|s| {
        let sev = Severity::from_str_lenient(&s);
        if sev.is_none() {
            eprintln!("Warning: unknown severity '{}', using config default", s);
        }
        sev
    });

    let options = ScanOptions {
        config_path: args.config,
        fail_on_override: fail_on,
        files: args.files,
        parallel: args.parallel,
        timeout: args.timeout.map(Duration::from_secs),
    };

    let report = droidlint::scan(&args.path, &options)?;
    if report.timed_out {
        eprintln!("Warning: timeout reached, some files were not checked");
    }
    let rendered = droidlint::render_report(&report, format)?;

    match args.output {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = pass, 1 = findings at or above threshold
    Ok(if report.verdict.pass { 0 } else { 1 })
}

fn builtin_registry() -> Result<IssueRegistry, LintError> {
    let detectors = all_detectors(&Config::default())?;
    IssueRegistry::for_detectors(&detectors)
}

fn cmd_list_issues(format_str: String) -> Result<i32, LintError> {
    let registry = builtin_registry()?;
    let issues = registry.issues();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(issues)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<22} {:<10} {:<4} {:<16} TITLE",
                "ID", "SEVERITY", "PRI", "CATEGORY"
            );
            println!("{}", "-".repeat(90));
            for issue in issues {
                println!(
                    "{:<22} {:<10} {:<4} {:<16} {}{}",
                    issue.id,
                    issue.severity.to_string(),
                    issue.priority,
                    issue.category.to_string(),
                    issue.title,
                    if issue.enabled_by_default { "" } else { " (disabled)" },
                );
            }
        }
    }

    Ok(0)
}

fn cmd_explain(id: String) -> Result<i32, LintError> {
    let registry = builtin_registry()?;
    let Some(issue) = registry.lookup_ignore_case(&id) else {
        eprintln!("Unknown issue id '{}'. Run `droidlint list-issues`.", id);
        return Ok(2);
    };

    println!("{}: {}", issue.id, issue.title);
    println!();
    println!("{}", issue.explanation);
    println!();
    println!("Category: {}", issue.category);
    println!("Severity: {}", issue.severity);
    println!("Priority: {}/10", issue.priority);
    println!("Scope:    {}", issue.scope());
    if !issue.enabled_by_default {
        println!("Disabled by default");
    }
    for url in issue.more_info {
        println!("More info: {}", url);
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, LintError> {
    let path = PathBuf::from(CONFIG_FILE);

    if path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", CONFIG_FILE);
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {}", CONFIG_FILE);

    Ok(0)
}

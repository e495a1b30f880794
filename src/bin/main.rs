// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! CLI tool for Wetwire Observability (wetwire-obs)

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use colored::Colorize;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use std::process::ExitCode;

#[cfg(feature = "cli")]
use wetwire_obs::codegen::{generate_package, generate_source};
#[cfg(feature = "cli")]
use wetwire_obs::config::ProjectConfig;
#[cfg(feature = "cli")]
use wetwire_obs::differ::{diff_paths, DiffOptions};
#[cfg(feature = "cli")]
use wetwire_obs::importer::import_file;
#[cfg(feature = "cli")]
use wetwire_obs::pipeline::{build, BuildMode};
#[cfg(feature = "cli")]
use wetwire_obs::validate::validate;
#[cfg(feature = "cli")]
use wetwire_obs::watch::{watch, WatchCycle, WatchOptions, DEFAULT_DEBOUNCE};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "wetwire-obs")]
#[command(about = "Wetwire Observability: Prometheus, Alertmanager, rules and Grafana dashboards as typed Rust", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Print discovered resources
    List {
        #[arg(default_value = ".")]
        dir: PathBuf,

        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },
    /// Serialize every discovered top-level config
    Build {
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Output directory (default: [build] output in wetwire.toml, else ./build)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// standalone, operator or both
        #[arg(long)]
        mode: Option<BuildMode>,
    },
    /// Run the linter
    Lint {
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Report fixable issues (sources are not modified)
        #[arg(long)]
        fix: bool,

        /// Rule IDs to skip, comma separated
        #[arg(long, value_delimiter = ',')]
        disable: Vec<String>,

        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,
    },
    /// Check build output with promtool, amtool and kubeconform
    Validate {
        /// Build output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        skip_promtool: bool,

        #[arg(long)]
        skip_amtool: bool,

        #[arg(long)]
        skip_kubeconform: bool,

        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,
    },
    /// Compare two files or two source directories
    Diff {
        left: PathBuf,
        right: PathBuf,

        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,

        /// Treat lists as unordered
        #[arg(long)]
        semantic: bool,

        /// Color the text output even when not on a terminal
        #[arg(long)]
        color: bool,
    },
    /// Convert an existing config file into Rust source
    Import {
        file: PathBuf,

        /// A `.rs` file, or a directory to receive a new Cargo package
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Package name (default: derived from the file name)
        #[arg(long)]
        package: Option<String>,
    },
    /// Re-run lint and build whenever sources change
    Watch {
        #[arg(default_value = ".")]
        dir: PathBuf,

        #[arg(long)]
        lint_only: bool,

        /// Quiet period before re-running, e.g. 500ms or 2s
        #[arg(long)]
        debounce: Option<wetwire_obs::Duration>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Serve tools over MCP (JSON-RPC on stdio)
    Mcp,
    /// Show the wetwire.toml in effect
    Config {
        /// Print a commented sample instead
        #[arg(long)]
        sample: bool,

        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ListFormat {
    Table,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TextFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
type CliResult = Result<ExitCode, Box<dyn std::error::Error>>;

#[cfg(feature = "cli")]
fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if cli.no_color || !std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        colored::control::set_override(false);
    }

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "cli")]
fn run(command: Commands) -> CliResult {
    match command {
        Commands::List { dir, format } => cmd_list(&dir, format),
        Commands::Build { dir, output, mode } => cmd_build(&dir, output, mode),
        Commands::Lint {
            dir,
            fix,
            disable,
            format,
        } => cmd_lint(&dir, fix, disable, format),
        Commands::Validate {
            output,
            skip_promtool,
            skip_amtool,
            skip_kubeconform,
            format,
        } => {
            let config = ProjectConfig::discover(Path::new("."))?;
            let mut options = config.validate;
            options.skip_promtool |= skip_promtool;
            options.skip_amtool |= skip_amtool;
            options.skip_kubeconform |= skip_kubeconform;
            let dir = output.unwrap_or(config.build.output);

            let report = validate(&dir, &options)?;
            match format {
                TextFormat::Json => println!("{}", report.to_json()?),
                TextFormat::Text => print!("{}", report.render_text(true)),
            }
            Ok(exit(report.passed()))
        }
        Commands::Diff {
            left,
            right,
            format,
            semantic,
            color,
        } => {
            let config = ProjectConfig::discover(Path::new("."))?;
            let options = DiffOptions {
                ignore_order: semantic || config.diff.ignore_order,
            };
            let result = diff_paths(&left, &right, &options)?;
            match format {
                TextFormat::Json => println!("{}", result.to_json()?),
                TextFormat::Text => {
                    if color || config.diff.color {
                        colored::control::set_override(true);
                    }
                    print!("{}", result.render_text(true));
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Import {
            file,
            output,
            package,
        } => cmd_import(&file, output, package),
        Commands::Watch {
            dir,
            lint_only,
            debounce,
            output,
        } => cmd_watch(&dir, lint_only, debounce, output),
        Commands::Mcp => {
            wetwire_obs::mcp::McpServer::new().run_stdio()?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { sample, dir } => {
            if sample {
                print!("{}", ProjectConfig::sample_toml());
            } else {
                match ProjectConfig::locate(&dir) {
                    Some(path) => eprintln!("{} {}", "#".dimmed(), path.display()),
                    None => eprintln!("{}", "# no wetwire.toml found, showing defaults".dimmed()),
                }
                print!("{}", toml::to_string(&ProjectConfig::discover(&dir)?)?);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(feature = "cli")]
fn exit(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(feature = "cli")]
fn cmd_list(dir: &Path, format: ListFormat) -> CliResult {
    let result = wetwire_obs::discovery::discover(dir)?;
    match format {
        ListFormat::Json => println!("{}", result.to_json()?),
        ListFormat::Table => {
            if result.is_empty() {
                println!("No resources found in {}", dir.display());
            } else {
                print!("{}", result.render_table());
            }
            for err in &result.errors {
                eprintln!("{} {}", "warning:".yellow(), err);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "cli")]
fn cmd_build(dir: &Path, output: Option<PathBuf>, mode: Option<BuildMode>) -> CliResult {
    let config = ProjectConfig::discover(dir)?;
    let mut options = config.build_options();
    if let Some(output) = output {
        options = options.with_output(output);
    }
    if let Some(mode) = mode {
        options = options.with_mode(mode);
    }

    let report = build(dir, &options)?;
    for file in &report.files {
        println!("{} {}", "wrote".green(), file.display());
    }
    for name in &report.fallbacks {
        eprintln!("{} {} could not be loaded, wrote a placeholder", "warning:".yellow(), name);
    }
    for err in &report.errors {
        eprintln!("{} {}", "warning:".yellow(), err);
    }
    if report.files.is_empty() {
        println!("Nothing to build in {}", dir.display());
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "cli")]
fn cmd_lint(dir: &Path, fix: bool, disable: Vec<String>, format: TextFormat) -> CliResult {
    let config = ProjectConfig::discover(dir)?;
    let mut options = config.lint_options().with_disabled(disable);
    if fix {
        options = options.with_fix(true);
    }

    let result = wetwire_obs::lint::lint_all(dir, &options)?;
    match format {
        TextFormat::Json => println!("{}", result.to_json()?),
        TextFormat::Text => print!("{}", result.render_text(true)),
    }
    Ok(exit(!result.has_errors()))
}

#[cfg(feature = "cli")]
fn cmd_import(file: &Path, output: Option<PathBuf>, package: Option<String>) -> CliResult {
    let imported = import_file(file)?;
    for warning in &imported.warnings {
        eprintln!("{} {}", "warning:".yellow(), warning);
    }
    let package = package.unwrap_or_else(|| default_package(file));

    match output {
        None => print!("{}", String::from_utf8_lossy(&generate_source(&imported.config, &package)?)),
        Some(path) if path.extension().is_some_and(|e| e == "rs") => {
            let source = generate_source(&imported.config, &package)?;
            wetwire_obs::output::write_atomic(&path, &source)?;
            println!("{} {}", "wrote".green(), path.display());
        }
        Some(dir) => {
            for path in generate_package(&imported.config, &package, &dir, None)? {
                println!("{} {}", "wrote".green(), path.display());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// `team-alerts.yml` → `team_alerts`
#[cfg(feature = "cli")]
fn default_package(file: &Path) -> String {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => name,
        _ => format!("imported_{}", name),
    }
}

#[cfg(feature = "cli")]
fn cmd_watch(
    dir: &Path,
    lint_only: bool,
    debounce: Option<wetwire_obs::Duration>,
    output: Option<PathBuf>,
) -> CliResult {
    let config = ProjectConfig::discover(dir)?;
    let mut build = config.build_options();
    if let Some(output) = output {
        build = build.with_output(output);
    }
    let options = WatchOptions {
        debounce: debounce.map(Into::into).unwrap_or(DEFAULT_DEBOUNCE),
        lint_only,
        lint: config.lint_options(),
        build,
    };

    let stop = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let s = stop.clone();
    ctrlc::set_handler(move || {
        s.store(true, std::sync::atomic::Ordering::SeqCst);
    })?;

    println!(
        "{} {} (Ctrl-C to stop)",
        "Watching".cyan().bold(),
        dir.display()
    );
    watch(dir, &options, &stop, print_cycle)?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "cli")]
fn print_cycle(cycle: WatchCycle) {
    let stamp = chrono::Local::now().format("%H:%M:%S");
    if cycle.changed.is_empty() {
        println!("{} initial run", format!("[{}]", stamp).dimmed());
    } else {
        println!("{} {} file(s) changed", format!("[{}]", stamp).dimmed(), cycle.changed.len());
    }
    match cycle.lint {
        Ok(result) => print!("{}", result.render_text(true)),
        Err(e) => eprintln!("{} lint: {}", "error:".red().bold(), e),
    }
    match cycle.build {
        Some(Ok(report)) => println!("{} {} file(s)", "built".green(), report.files.len()),
        Some(Err(e)) => eprintln!("{} build: {}", "error:".red().bold(), e),
        None => {}
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features not enabled. Please compile with --features cli");
    std::process::exit(1);
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_package() {
        assert_eq!(default_package(Path::new("conf/team-alerts.yml")), "team_alerts");
        assert_eq!(default_package(Path::new("9.json")), "imported_9");
    }

    #[test]
    fn test_lint_disable_list() {
        let cli = Cli::try_parse_from(["wetwire-obs", "lint", "src", "--disable", "WOB121,WOB084"]).unwrap();
        let Commands::Lint { disable, .. } = cli.command else {
            panic!("expected lint");
        };
        assert_eq!(disable, vec!["WOB121", "WOB084"]);
    }
}

mod config;

use config::Config;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::{control::set_override, Colorize};
use ofxkit_core::discovery::{discover_plugin_dirs, find_all_bundles, platform_arch_dir};
use ofxkit_core::{PluginBinary, PluginBundle, PluginInfo, Severity, StatusCode, SuiteKind};
use serde::Serialize;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

const LONG_ABOUT: &str = r##"
ofxkit is a toolbox for the OpenFX plugin boundary.

It translates the integer status codes OpenFX hosts and plugins exchange,
lists the suites ofxkit has typed accessors for, and finds and inspects
installed .ofx.bundle plugins.

EXAMPLES:
  ofxkit status 9                   Translate a raw status code
  ofxkit status 1 kOfxStatErrMemory Mix integers, symbols and names
  ofxkit suites                     Show the suite catalogue
  ofxkit list                       List bundles in all plugin directories
  ofxkit inspect Blur.ofx.bundle    Show the plugins a bundle exports

CONFIGURATION:
  Settings can be configured via CLI flags, environment variables, or config file.
  Precedence: CLI args > Environment vars > Config file > Defaults

  Setting      | CLI flag       | Env var             | Default
  -------------|----------------|---------------------|---------
  plugin_paths | -              | OFXKIT_PLUGIN_PATHS | []
  no_color     | -C, --no-color | OFXKIT_NO_COLOR     | false
  json         | -j, --json     | OFXKIT_JSON         | false

  OFX_PLUGIN_PATH is searched before plugin_paths, as hosts do.

  Config file location: ofxkit --config-path
  Generate default config: ofxkit --config-init

  Note: NO_COLOR env var is also respected (https://no-color.org/)"##;

#[derive(Parser)]
#[command(name = "ofxkit")]
#[command(version)]
#[command(about = "Translate OpenFX status codes and inspect plugin bundles")]
#[command(long_about = LONG_ABOUT)]
#[command(after_help = "For more information, visit: https://github.com/mjukis-ab/ofxkit")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Output results as JSON (for scripting/piping)
    #[arg(long, short = 'j', global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, short = 'C', global = true)]
    no_color: bool,

    /// Enable verbose logging (use multiple times for more detail)
    ///
    /// -v shows debug messages, -vv shows trace messages.
    /// Useful for seeing which directories and bundles were considered.
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Show config file path
    #[arg(long)]
    config_path: bool,

    /// Generate default config file (see --config-path for location)
    #[arg(long)]
    config_init: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Translate status codes
    ///
    /// Each CODE is an integer (9), a symbol (kOfxStatErrBadHandle) or a
    /// name (bad-handle). Integers outside the standard set are shown as
    /// unknown errors.
    Status {
        #[arg(value_name = "CODE", required = true, allow_negative_numbers = true)]
        codes: Vec<String>,
    },

    /// List the suites ofxkit can resolve
    Suites,

    /// List plugin bundles found in the plugin directories
    List,

    /// Show the plugins exported by a bundle or binary
    ///
    /// Loading a binary runs its initialisers. Only inspect plugins you trust.
    Inspect {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

/// One translated code, as printed by `ofxkit status`.
#[derive(Debug, Serialize)]
struct StatusRow {
    input: String,
    raw: i32,
    symbol: &'static str,
    name: &'static str,
    severity: Severity,
    description: String,
}

impl StatusRow {
    fn new(input: &str, raw: i32, status: StatusCode) -> Self {
        Self {
            input: input.to_string(),
            raw,
            symbol: status.symbol(),
            name: status.name(),
            severity: status.severity(),
            description: status.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SuiteRow {
    name: &'static str,
    version: u32,
    kind: SuiteKind,
    required: bool,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    path: PathBuf,
    binary: PathBuf,
    plugins: Vec<PluginInfo>,
}

fn main() {
    let cli = Cli::parse();

    // Handle --config-path
    if cli.config_path {
        match Config::path() {
            Some(path) => println!("{}", path.display()),
            None => {
                eprintln!(
                    "{}: Cannot determine config directory",
                    "error".red().bold()
                );
                std::process::exit(1);
            }
        }
        return;
    }

    // Handle --config-init
    if cli.config_init {
        match config::init_config() {
            Ok(path) => println!("Created config file: {}", path.display()),
            Err(e) => {
                eprintln!("{}: {}", "error".red().bold(), e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Initialize tracing based on verbosity level (before config loading for logging)
    let level = match cli.verbose {
        0 => LevelFilter::OFF,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    if level != LevelFilter::OFF {
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    // Precedence: CLI args > Environment vars > Config file > Defaults
    let file_config = Config::load();

    if let Some(path) = Config::path() {
        if path.exists() {
            tracing::debug!("Loaded config from: {}", path.display());
        } else {
            tracing::trace!("No config file at: {}", path.display());
        }
    }

    let no_color = if cli.no_color {
        tracing::debug!("no_color = true (from CLI)");
        true
    } else {
        let nc = file_config.no_color();
        if nc {
            let source = if std::env::var("NO_COLOR").is_ok() {
                "env NO_COLOR"
            } else if std::env::var("OFXKIT_NO_COLOR").is_ok() {
                "env OFXKIT_NO_COLOR"
            } else {
                "config file"
            };
            tracing::debug!("no_color = true (from {})", source);
        }
        nc
    };
    if no_color {
        set_override(false);
    }

    let json = if cli.json {
        tracing::debug!("json = true (from CLI)");
        true
    } else {
        file_config.json()
    };

    let Some(command) = cli.command else {
        eprintln!("{}: No command given", "error".red().bold());
        eprintln!("Run {} for more information.", "ofxkit --help".bold());
        std::process::exit(2);
    };

    let ok = match command {
        Command::Status { codes } => cmd_status(&codes, json),
        Command::Suites => cmd_suites(json),
        Command::List => cmd_list(&file_config.plugin_paths(), json),
        Command::Inspect { path } => cmd_inspect(&path, json),
    };

    if !ok {
        std::process::exit(1);
    }
}

/// Interpret a CLI argument as a raw code, a symbol or a name.
fn parse_code(input: &str) -> Result<(i32, StatusCode), String> {
    if let Ok(raw) = input.trim().parse::<i32>() {
        return Ok((raw, StatusCode::from_raw(raw)));
    }
    input
        .parse::<StatusCode>()
        .map(|status| (status.to_raw(), status))
        .map_err(|e| e.to_string())
}

fn severity_colored(severity: Severity) -> colored::ColoredString {
    let label = severity.to_string();
    match severity {
        Severity::Success => label.green(),
        Severity::Recoverable => label.yellow(),
        Severity::Fatal => label.red().bold(),
        Severity::Unknown => label.magenta(),
    }
}

fn print_json<T: Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            true
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            false
        }
    }
}

fn cmd_status(codes: &[String], json: bool) -> bool {
    let mut rows = Vec::with_capacity(codes.len());
    let mut ok = true;

    for input in codes {
        match parse_code(input) {
            Ok((raw, status)) => rows.push(StatusRow::new(input, raw, status)),
            Err(e) => {
                eprintln!("{}: {}", "error".red().bold(), e);
                ok = false;
            }
        }
    }

    if json {
        return print_json(&rows) && ok;
    }

    for row in &rows {
        println!(
            "{:>5}  {:<28} {:<12} {}",
            row.raw,
            row.symbol.bold(),
            severity_colored(row.severity),
            row.description.dimmed()
        );
    }
    ok
}

fn cmd_suites(json: bool) -> bool {
    let rows: Vec<SuiteRow> = SuiteKind::ALL
        .into_iter()
        .map(|kind| SuiteRow {
            name: kind.name(),
            version: kind.version(),
            kind,
            required: kind.is_required(),
        })
        .collect();

    if json {
        return print_json(&rows);
    }

    println!("{}", "Known Suites".bold().underline());
    println!();
    for row in &rows {
        let required = if row.required {
            "required".green()
        } else {
            "optional".dimmed()
        };
        println!("  {} {:<32} v{}  {}", "→".cyan(), row.name.yellow(), row.version, required);
    }
    true
}

fn cmd_list(extra: &[PathBuf], json: bool) -> bool {
    let dirs = discover_plugin_dirs(extra);
    tracing::debug!(count = dirs.len(), "Searching plugin directories");
    let bundles = find_all_bundles(&dirs);

    if json {
        return print_json(&bundles);
    }

    if dirs.is_empty() {
        println!("{}", "(no plugin directories found)".dimmed());
        return true;
    }

    for (dir, group) in group_by_dir(&dirs, &bundles) {
        println!("{} {}", "▶".blue(), dir.display().to_string().green().bold());
        if group.is_empty() {
            println!("  {}", "(no bundles)".dimmed());
        }
        for bundle in group {
            print_bundle(bundle);
        }
    }
    true
}

/// Pair each search directory with its bundles. A bundle under nested
/// search directories is listed once, under the first of them.
fn group_by_dir<'a>(
    dirs: &'a [PathBuf],
    bundles: &'a [PluginBundle],
) -> Vec<(&'a Path, Vec<&'a PluginBundle>)> {
    let mut groups: Vec<(&Path, Vec<&PluginBundle>)> =
        dirs.iter().map(|dir| (dir.as_path(), Vec::new())).collect();
    for bundle in bundles {
        if let Some((_, group)) = groups.iter_mut().find(|(dir, _)| bundle.root.starts_with(dir)) {
            group.push(bundle);
        }
    }
    groups
}

fn print_bundle(bundle: &PluginBundle) {
    match &bundle.binary {
        Some(_) => println!("  {} {}", "→".cyan(), bundle.name.yellow()),
        None => println!(
            "  {} {} {}",
            "→".cyan(),
            bundle.name.yellow(),
            format!("(no {} binary)", platform_arch_dir()).dimmed()
        ),
    }
}

fn cmd_inspect(path: &Path, json: bool) -> bool {
    let loaded = if path.is_dir() {
        match PluginBundle::from_root(path) {
            // SAFETY: the user asked to load this bundle.
            Some(bundle) => unsafe { PluginBinary::open_bundle(&bundle) },
            None => {
                eprintln!(
                    "{}: {} is not an .ofx.bundle directory",
                    "error".red().bold(),
                    path.display()
                );
                return false;
            }
        }
    } else {
        // SAFETY: as above.
        unsafe { PluginBinary::open(path) }
    };

    let report = loaded.and_then(|binary| {
        Ok(InspectReport {
            path: path.to_path_buf(),
            binary: binary.path().to_path_buf(),
            plugins: binary.plugins()?,
        })
    });

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            return false;
        }
    };

    if json {
        return print_json(&report);
    }

    println!("{}", report.binary.display().to_string().bold());
    if report.plugins.is_empty() {
        println!("  {}", "(no plugins exported)".dimmed());
    }
    for plugin in &report.plugins {
        println!(
            "  {} {} {}",
            "→".cyan(),
            plugin.identifier.yellow(),
            format!("v{}", plugin.version()).dimmed()
        );
        println!("      {} v{}", plugin.api, plugin.api_version);
        if !plugin.has_set_host || !plugin.has_main_entry {
            println!("      {}", "missing setHost or mainEntry".red());
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_code_accepts_integers_symbols_and_names() {
        assert_eq!(parse_code("9"), Ok((9, StatusCode::BadHandle)));
        assert_eq!(parse_code("-1"), Ok((-1, StatusCode::UnknownError)));
        assert_eq!(parse_code("4242"), Ok((4242, StatusCode::UnknownError)));
        assert_eq!(parse_code("kOfxStatErrMemory"), Ok((8, StatusCode::OutOfMemory)));
        assert_eq!(parse_code("bad-value"), Ok((11, StatusCode::BadValue)));
        assert!(parse_code("nonsense").is_err());
    }

    #[test]
    fn test_status_row_keeps_raw_input() {
        let row = StatusRow::new("4242", 4242, StatusCode::from_raw(4242));
        assert_eq!(row.raw, 4242);
        assert_eq!(row.symbol, "kOfxStatErrUnknown");
        assert_eq!(row.severity, Severity::Unknown);
    }

    #[test]
    fn test_status_subcommand_accepts_negative_codes() {
        let cli = Cli::try_parse_from(["ofxkit", "status", "-1", "9"]).unwrap();
        match cli.command {
            Some(Command::Status { codes }) => assert_eq!(codes, vec!["-1", "9"]),
            _ => panic!("expected status command"),
        }
    }

    fn bundle(root: &str) -> PluginBundle {
        PluginBundle {
            name: "Blur".to_string(),
            root: PathBuf::from(root),
            binary: None,
        }
    }

    #[test]
    fn test_group_by_dir_lists_nested_bundles_once() {
        let dirs = vec![PathBuf::from("/a"), PathBuf::from("/a/b"), PathBuf::from("/c")];
        let bundles = vec![
            bundle("/a/Blur.ofx.bundle"),
            bundle("/a/b/Sharpen.ofx.bundle"),
            bundle("/c/Grade.ofx.bundle"),
        ];

        let groups = group_by_dir(&dirs, &bundles);
        let roots: Vec<(&Path, Vec<&Path>)> = groups
            .iter()
            .map(|(dir, group)| (*dir, group.iter().map(|b| b.root.as_path()).collect()))
            .collect();
        assert_eq!(
            roots,
            vec![
                (
                    Path::new("/a"),
                    vec![Path::new("/a/Blur.ofx.bundle"), Path::new("/a/b/Sharpen.ofx.bundle")]
                ),
                (Path::new("/a/b"), vec![]),
                (Path::new("/c"), vec![Path::new("/c/Grade.ofx.bundle")]),
            ]
        );
        let listed: usize = groups.iter().map(|(_, group)| group.len()).sum();
        assert_eq!(listed, bundles.len());
    }

    #[test]
    fn test_group_by_dir_does_not_match_name_prefixes() {
        // `/opt/ofx2` is not inside `/opt/ofx`.
        let dirs = vec![PathBuf::from("/opt/ofx"), PathBuf::from("/opt/ofx2")];
        let bundles = vec![bundle("/opt/ofx2/Blur.ofx.bundle")];
        let groups = group_by_dir(&dirs, &bundles);
        assert!(groups[0].1.is_empty());
        assert_eq!(groups[1].1.len(), 1);
    }
}

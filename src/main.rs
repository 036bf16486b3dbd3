//! CLI entry point for `mboxsplit`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mboxsplit::config::Config;
use mboxsplit::i18n;
use mboxsplit::split::{
    self, FileSink, NullSink, OutputLayout, Progress, SplitOptions, SplitStats,
};

#[derive(Parser)]
#[command(name = "mboxsplit", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Source MBOX file [default: inbox.mbox]
    #[arg(short, long, value_name = "FILE")]
    infile: Option<PathBuf>,

    /// Prefix for output filenames [default: split_]
    #[arg(short, long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Directory for output archives [default: .]
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Maximum length of a label in a filename [default: 120]
    #[arg(long, value_name = "N")]
    max_name_length: Option<usize>,

    /// Classify and count messages without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Language (en, es). Defaults to system locale.
    #[arg(long, value_name = "LANG")]
    lang: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

/// Detect language early from --lang arg or system env, before clap processes --help.
fn detect_lang_early() -> i18n::Lang {
    let args: Vec<String> = std::env::args().collect();
    for (i, arg) in args.iter().enumerate() {
        let code = if arg == "--lang" {
            args.get(i + 1).map(String::as_str)
        } else {
            arg.strip_prefix("--lang=")
        };
        if let Some(lang) = code.and_then(i18n::Lang::from_code) {
            return lang;
        }
    }
    i18n::detect_system_lang()
}

/// Build a localized clap Command using i18n strings.
fn build_localized_command() -> clap::Command {
    Cli::command()
        .about(i18n::app_about())
        .long_about(i18n::app_long_about())
        .mut_arg("infile", |a| a.help(i18n::help_infile()))
        .mut_arg("prefix", |a| a.help(i18n::help_prefix()))
        .mut_arg("output_dir", |a| a.help(i18n::help_output_dir()))
        .mut_arg("max_name_length", |a| a.help(i18n::help_max_name_length()))
        .mut_arg("dry_run", |a| a.help(i18n::help_dry_run()))
        .mut_arg("json", |a| a.help(i18n::help_json()))
        .mut_arg("verbose", |a| a.help(i18n::help_verbose()))
        .mut_arg("lang", |a| a.help(i18n::help_lang()))
        .mut_subcommand("completions", |s| s.about(i18n::help_cmd_completions()))
        .mut_subcommand("manpage", |s| s.about(i18n::help_cmd_manpage()))
}

fn main() -> anyhow::Result<()> {
    // Detect language BEFORE clap parsing so --help is localized
    i18n::set_lang(detect_lang_early());

    // Argument errors exit here with status 2, before any file is touched
    let matches = build_localized_command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    match &cli.command {
        Some(Commands::Completions { shell }) => return cmd_completions(*shell),
        Some(Commands::Manpage) => return cmd_manpage(),
        None => {}
    }

    let mut config = mboxsplit::config::load_config()?;
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);
    if let Some(path) = mboxsplit::config::config_file_path().filter(|p| p.exists()) {
        tracing::info!(path = %path.display(), "Loaded config");
    }

    cmd_split(&config, cli.dry_run, cli.json)
}

/// Command-line values win over the config file.
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(ref input) = cli.infile {
        config.split.input = input.clone();
    }
    if let Some(ref prefix) = cli.prefix {
        config.split.prefix = prefix.clone();
    }
    if let Some(ref dir) = cli.output_dir {
        config.split.output_dir = dir.clone();
    }
    if let Some(len) = cli.max_name_length {
        config.split.max_name_length = len;
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = mboxsplit::config::log_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mboxsplit.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mboxsplit", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Split the configured MBOX and print a summary.
fn cmd_split(config: &Config, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let input = &config.split.input;
    let prefix = &config.split.prefix;
    let output_dir = &config.split.output_dir;

    if !input.exists() {
        anyhow::bail!("{}: {}", i18n::err_file_not_found(), input.display());
    }

    let banner = format!(
        "{} - {} {} = {}",
        i18n::msg_processing(),
        input.display(),
        i18n::msg_with_prefix(),
        prefix
    );
    if json {
        eprintln!("{banner}");
    } else {
        println!("{banner}");
    }

    let file_size = std::fs::metadata(input)?.len();
    let pb = ProgressBar::new(file_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{eta}})",
                i18n::msg_reading()
            ))
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let on_progress = |event: Progress| match event {
        Progress::Bytes { read, total } => {
            pb.set_length(total);
            pb.set_position(read);
        }
        // suspend() keeps the line visible even when the bar is hidden
        Progress::Records(n) => pb.suspend(|| eprintln!("{n} {}", i18n::msg_messages_routed())),
    };

    let layout = OutputLayout::new(prefix.clone()).with_max_name_len(config.split.max_name_length);
    let mut options = SplitOptions::new(input.clone(), layout);
    options.progress_interval = config.split.progress_interval;
    options.read_buffer_size = config.performance.read_buffer_size;

    let start = Instant::now();
    let stats = if dry_run {
        split::split_mbox(&options, NullSink, Some(&on_progress))?.0
    } else {
        std::fs::create_dir_all(output_dir)?;
        let sink = FileSink::new(output_dir.clone())
            .with_buffer_size(config.performance.write_buffer_size)
            .protect(input)?;
        split::split_mbox(&options, sink, Some(&on_progress))?.0
    };
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    if json {
        print_stats_json(config, &stats, dry_run, elapsed)?;
    } else {
        print_stats_table(output_dir, &stats, dry_run, elapsed);
    }

    Ok(())
}

/// Print the per-archive summary as a human-readable table.
fn print_stats_table(
    output_dir: &Path,
    stats: &SplitStats,
    dry_run: bool,
    elapsed: std::time::Duration,
) {
    use humansize::{format_size, BINARY};

    println!();
    if dry_run {
        println!("  {}", i18n::msg_dry_run_complete());
    } else {
        println!("  {}", i18n::msg_split_complete());
    }
    println!();
    println!(
        "  {:<50} {:>10} {:>12}",
        i18n::msg_output_file(),
        i18n::msg_messages(),
        i18n::msg_size()
    );
    println!("  {}", "-".repeat(74));

    for (filename, out) in &stats.outputs {
        let shown = output_dir.join(filename);
        let shown = shown.display().to_string();
        let shown: String = shown.chars().take(50).collect();
        println!(
            "  {:<50} {:>10} {:>12}",
            shown,
            out.records,
            format_size(out.bytes, BINARY)
        );
    }

    println!("  {}", "-".repeat(74));
    println!(
        "  {:<50} {:>10} {:>12}",
        i18n::msg_total(),
        stats.total_records,
        format_size(stats.total_bytes, BINARY)
    );
    println!("  {elapsed:.2?}");
    println!();
}

/// Print the summary as JSON.
fn print_stats_json(
    config: &Config,
    stats: &SplitStats,
    dry_run: bool,
    elapsed: std::time::Duration,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "input": config.split.input.to_string_lossy(),
        "prefix": config.split.prefix,
        "output_dir": config.split.output_dir.to_string_lossy(),
        "dry_run": dry_run,
        "elapsed_ms": elapsed.as_millis(),
        "stats": stats,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

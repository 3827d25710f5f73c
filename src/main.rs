//! CLI entry point for `mailstow`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mailstow::extract::{self, FallbackPolicy, Variant};
use mailstow::model::outcome::{OutcomeRecord, RunSummary};
use mailstow::refs::ReferenceSet;
use mailstow::run::RunOptions;
use mailstow::sanitize;
use mailstow::source::{DropDir, MessageFilter, MessageSource};

#[derive(Parser)]
#[command(
    name = "mailstow",
    version,
    about = "File saved emails into per-project folders keyed by subject-line identifiers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a drop folder into the output root
    Run {
        /// Drop folder with saved .eml files (default from config)
        drop: Option<PathBuf>,

        /// Output root for project folders
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reference directory copied into every project folder
        #[arg(long)]
        refs: Option<PathBuf>,

        /// Extraction variant (see `mailstow variants`)
        #[arg(long)]
        variant: Option<String>,

        /// Policy when a named variant finds no identifier:
        /// reject or whole-subject
        #[arg(long)]
        fallback: Option<String>,

        /// Only process messages whose sender contains this text
        #[arg(long, value_name = "TEXT")]
        from: Option<String>,

        /// Only process messages whose subject contains this text
        #[arg(long, value_name = "TEXT")]
        subject: Option<String>,

        /// Decide everything, write nothing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Emit records and summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode one message file and show the extraction decision
    Inspect {
        /// A single .eml file
        file: PathBuf,

        /// Extraction variant to apply
        #[arg(long)]
        variant: Option<String>,
    },
    /// List the extraction variant registry
    Variants,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = mailstow::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Run {
            drop,
            output,
            refs,
            variant,
            fallback,
            from,
            subject,
            dry_run,
            json,
        } => cmd_run(
            &config,
            RunArgs {
                drop,
                output,
                refs,
                variant,
                fallback,
                from,
                subject,
                dry_run,
                json,
            },
        ),
        Commands::Inspect { file, variant } => cmd_inspect(&config, &file, variant.as_deref()),
        Commands::Variants => cmd_variants(),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &mailstow::config::Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = mailstow::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailstow.log");
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

struct RunArgs {
    drop: Option<PathBuf>,
    output: Option<PathBuf>,
    refs: Option<PathBuf>,
    variant: Option<String>,
    fallback: Option<String>,
    from: Option<String>,
    subject: Option<String>,
    dry_run: bool,
    json: bool,
}

/// Process the drop folder.
fn cmd_run(config: &mailstow::config::Config, args: RunArgs) -> anyhow::Result<()> {
    let drop_dir = args.drop.unwrap_or_else(|| config.paths.drop_dir.clone());
    let output_root = args.output.unwrap_or_else(|| config.paths.output_dir.clone());
    let refs_dir = args.refs.unwrap_or_else(|| config.paths.refs_dir.clone());

    let variant_name = args
        .variant
        .unwrap_or_else(|| config.extract.variant.clone());
    let variant = Variant::from_name(&variant_name)?;

    let fallback_name = args
        .fallback
        .unwrap_or_else(|| config.extract.fallback.clone());
    let fallback = FallbackPolicy::from_name(&fallback_name)
        .ok_or_else(|| anyhow::anyhow!("Unknown fallback policy '{fallback_name}'. Supported: reject, whole-subject"))?;

    let filter = MessageFilter {
        sender_contains: args.from,
        subject_contains: args.subject,
    };

    // Fetch the whole batch before any extraction starts
    let source = DropDir::new(&drop_dir);
    let messages = source.fetch()?;
    let messages = filter.apply(messages);

    if messages.is_empty() {
        println!("  No messages to process in {}", drop_dir.display());
        return Ok(());
    }

    let references = ReferenceSet::load(&refs_dir)?;

    let options = RunOptions {
        variant,
        fallback,
        output_root: output_root.clone(),
        dry_run: args.dry_run,
    };

    let pb = ProgressBar::new(messages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Filing [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let records = mailstow::run::run(
        &messages,
        &references,
        &options,
        Some(&|done, _total| {
            pb.set_position(done as u64);
        }),
    )?;

    pb.finish_and_clear();

    if args.json {
        print_records_json(&records, &options)?;
    } else {
        print_records_table(&records, &options, &output_root);
    }

    Ok(())
}

/// Decode one message and show the extraction decision without writing.
fn cmd_inspect(
    config: &mailstow::config::Config,
    file: &Path,
    variant_name: Option<&str>,
) -> anyhow::Result<()> {
    let variant_name = variant_name.unwrap_or(&config.extract.variant);
    let variant = Variant::from_name(variant_name)?;

    let message = mailstow::parser::eml::decode_file(file)?;

    println!();
    println!("  {:<12} {}", "File", file.display());
    println!("  {:<12} {}", "Token", message.token);
    println!("  {:<12} {}", "From", message.sender);
    if let Some(received) = message.received {
        println!("  {:<12} {}", "Date", received.format("%Y-%m-%d %H:%M"));
    }
    println!("  {:<12} {}", "Subject", message.subject);
    for attachment in &message.attachments {
        println!(
            "  {:<12} {} ({} bytes)",
            "Attachment",
            attachment.filename,
            attachment.content.len()
        );
    }
    println!();

    match extract::extract(&message.subject, variant) {
        Some(raw_key) => match sanitize::folder_key(&raw_key) {
            Some(key) => {
                println!("  Variant '{variant}' extracts '{raw_key}'");
                println!("  Folder key: {key}");
            }
            None => {
                println!("  Variant '{variant}' extracts '{raw_key}',");
                println!("  but it sanitizes to nothing: no-match");
            }
        },
        None => {
            println!("  Variant '{variant}': no match");
        }
    }
    println!();

    Ok(())
}

/// List the variant registry.
fn cmd_variants() -> anyhow::Result<()> {
    println!();
    println!("  {:<16} {:<52} example", "name", "rule");
    println!("  {}", "-".repeat(96));
    for variant in Variant::ALL {
        let (subject, key) = variant.example();
        println!(
            "  {:<16} {:<52} {:?} -> {:?}",
            variant.name(),
            variant.description(),
            subject,
            key
        );
    }
    println!();
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailstow", &mut std::io::stdout());
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

/// Print per-message records and the summary as a human-readable table.
fn print_records_table(records: &[OutcomeRecord], options: &RunOptions, output_root: &Path) {
    use humansize::{format_size, BINARY};

    println!();
    for record in records {
        let key = record.folder_key.as_deref().unwrap_or("-");
        let subject: String = record.subject.chars().take(48).collect();
        println!(
            "  {:<12} {:<32} {}",
            record.status.label(),
            key,
            subject
        );
        if let Some(detail) = &record.detail {
            println!("  {:<12} {detail}", "");
        }
    }

    let summary = RunSummary::from_records(records);
    println!();
    if options.dry_run {
        println!("  Dry run: no files were written.");
    }
    println!("  {:<22} {}", "Messages", summary.total());
    println!("  {:<22} {}", "Folders created", summary.created);
    println!("  {:<22} {}", "Folders updated", summary.updated);
    println!("  {:<22} {}", "No match", summary.no_match);
    println!("  {:<22} {}", "Write errors", summary.write_error);
    println!(
        "  {:<22} {}",
        if options.dry_run {
            "Bytes to write"
        } else {
            "Bytes written"
        },
        format_size(summary.bytes_written, BINARY)
    );
    println!("  {:<22} {}", "Output root", output_root.display());
    println!();
}

/// Print records and summary as JSON.
fn print_records_json(records: &[OutcomeRecord], options: &RunOptions) -> anyhow::Result<()> {
    let summary = RunSummary::from_records(records);
    let output = serde_json::json!({
        "dry_run": options.dry_run,
        "variant": options.variant.name(),
        "summary": summary,
        "records": records,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

//! Annuaire CLI - search the alumni directory and contact people
//!
//! # Main Commands
//!
//! ```bash
//! annuaire search --query dupont --pays italie   # Filter the directory
//! annuaire contact row-12 --name .. --email .. --message ..
//! annuaire report row-12 --name .. --email .. --message ..
//! annuaire quota                                 # Messages left today
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! annuaire parse export.csv        # Run ingestion on a local export
//! ```

use annuaire::{
    ContactError, ContactForm, ContactSession, DatasetFetcher, Directory, FileStore, FilterCriteria, HttpRelay,
    MessageKind, OutboundMessageGate, Record, RecordSummary, Settings,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "annuaire")]
#[command(about = "Search the alumni directory and send messages through the association", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the directory
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Read a local export instead of the live sheet
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Send a message to a person
    Contact {
        #[command(flatten)]
        message: MessageArgs,
    },

    /// Report wrong information in a record
    Report {
        #[command(flatten)]
        message: MessageArgs,
    },

    /// Show how many messages can still be sent today
    Quota,

    /// Parse a local export and output records as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Name or city
    #[arg(short, long, default_value = "")]
    query: String,

    /// BAC year
    #[arg(long, default_value = "")]
    bac: String,

    /// Country
    #[arg(long, default_value = "")]
    pays: String,

    #[arg(long, default_value = "")]
    profession: String,

    /// Field of study
    #[arg(long, default_value = "")]
    etudes: String,

    /// Place of birth
    #[arg(long, default_value = "")]
    lieu_naiss: String,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            query: args.query,
            bac: args.bac,
            pays: args.pays,
            profession: args.profession,
            etudes: args.etudes,
            lieu_naiss: args.lieu_naiss,
        }
    }
}

#[derive(Args)]
struct MessageArgs {
    /// Record id as shown by `search` (e.g. row-12)
    id: String,

    /// Your full name
    #[arg(long)]
    name: String,

    /// Your email
    #[arg(long)]
    email: String,

    /// Message text
    #[arg(short, long)]
    message: String,

    /// Read a local export instead of the live sheet
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search { filters, file, format } => {
            cmd_search(&settings, filters.into(), file.as_deref(), format).await
        }

        Commands::Contact { message } => cmd_send(&settings, message, MessageKind::Contact).await,

        Commands::Report { message } => cmd_send(&settings, message, MessageKind::Report).await,

        Commands::Quota => cmd_quota(&settings),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn fetcher(settings: &Settings, file: Option<&Path>) -> DatasetFetcher {
    match file {
        Some(path) => DatasetFetcher::from_file(path),
        None => DatasetFetcher::from_settings(settings),
    }
}

async fn cmd_search(
    settings: &Settings,
    criteria: FilterCriteria,
    file: Option<&Path>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut directory = Directory::new(fetcher(settings, file).fetch().await);
    directory.set_criteria(criteria);

    let visible: Vec<RecordSummary> = directory.visible().into_iter().map(Record::summary).collect();

    match format {
        OutputFormat::Table => {
            eprintln!("🔎 {} résultats trouvés", visible.len());
            if visible.is_empty() {
                eprintln!("   Aucun résultat. Essayez de modifier les filtres de recherche.");
            }
            for card in &visible {
                if card.bac.is_empty() {
                    println!("  {:<10} {}", card.id, card.display_name);
                } else {
                    println!("  {:<10} {} (BAC {})", card.id, card.display_name, card.bac);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&visible)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for card in &visible {
                writer.serialize(card)?;
            }
            writer.flush()?;
        }
    }

    Ok(())
}

async fn cmd_send(settings: &Settings, args: MessageArgs, kind: MessageKind) -> Result<(), Box<dyn std::error::Error>> {
    let directory = Directory::new(fetcher(settings, args.file.as_deref()).fetch().await);
    let record = directory
        .find(&args.id)
        .cloned()
        .ok_or_else(|| format!("Record not found: {}", args.id))?;

    match kind {
        MessageKind::Contact => eprintln!("✉️  Writing to {}", record.display_name()),
        MessageKind::Report => eprintln!("🚩 Reporting an error in {}", record.display_name()),
    }
    eprintln!("   Your message is received by the association secretariat, which forwards it.");

    let gate = OutboundMessageGate::new(FileStore::with_dir(&settings.state_dir), settings);
    let relay = HttpRelay::from_settings(settings);
    let mut session = ContactSession::new(record, kind, gate, relay);

    let form = ContactForm::new(args.name, args.email, args.message);
    match session.submit(&form).await {
        Ok(()) => {
            eprintln!("✅ Message envoyé !");
            eprintln!("   The relay does not confirm delivery; the request left without a network error.");
            let quota = session.quota();
            eprintln!("   {} of {} messages left today", quota.remaining, quota.limit);
            Ok(())
        }
        Err(e @ ContactError::Connection(_)) => {
            eprintln!("   Run the same command again to retry.");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_quota(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let gate = OutboundMessageGate::new(FileStore::with_dir(&settings.state_dir), settings);
    let status = gate.status();

    println!("📊 Messages sent: {}/{}", status.count, status.limit);
    println!("   Remaining: {}", status.remaining);
    if status.count > 0 {
        if let Some(reset) = chrono::DateTime::from_timestamp_millis(status.resets_at) {
            println!("   Window resets at: {}", reset.to_rfc3339());
        }
    }
    Ok(())
}

async fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing export: {}", input.display());

    let records = DatasetFetcher::from_file(input).try_fetch().await?;
    eprintln!("✅ Parsed {} records", records.len());

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)?;

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

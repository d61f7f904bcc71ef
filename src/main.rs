use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use coldreach_pipeline::{
    subject_for, with_signature, CatalogConfig, CatalogSource, ColdMailGenerator, Draft,
    RetrievalConfig, RetrievalPipeline, SenderIdentity, DEFAULT_TOP_K,
};
use coldreach_providers::{
    deliver, CompletionConfig, EmbeddingConfig, EmbeddingProvider, HashEmbedder, HttpPageFetcher,
    MailConfig, OpenAiChat, OpenAiEmbedder, SmtpMailer,
};
use coldreach_schema::{split_skills, JobRecord};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Draft cold emails for job postings, backed by a portfolio catalog
#[derive(Parser, Debug)]
#[command(name = "coldreach")]
#[command(about = "Cold email drafting with portfolio retrieval", long_about = None)]
struct Args {
    /// Portfolio catalog CSV
    #[arg(long, env = "COLDREACH_CATALOG", default_value = "my_portfolio.csv")]
    catalog: PathBuf,

    /// Catalog column holding the tech stack description
    #[arg(long, default_value = coldreach_core::DEFAULT_DESCRIPTOR_COLUMN)]
    descriptor_column: String,

    /// Catalog column holding the portfolio link
    #[arg(long, default_value = coldreach_core::DEFAULT_LINK_COLUMN)]
    link_column: String,

    /// Number of portfolio links per email
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// API key for the chat and embedding endpoints
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, default_value = "")]
    api_key: String,

    /// OpenAI-compatible base URL
    #[arg(long, env = "COLDREACH_BASE_URL", default_value = coldreach_providers::embedder::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "COLDREACH_CHAT_MODEL", default_value = coldreach_providers::completion::DEFAULT_CHAT_MODEL)]
    chat_model: String,

    #[arg(long, env = "COLDREACH_EMBEDDING_MODEL", default_value = coldreach_providers::embedder::DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Embed with the local hashing embedder instead of the remote endpoint
    #[arg(long)]
    offline: bool,

    /// Sender mailbox, also the SMTP login
    #[arg(long, env = "MAIL_ID", default_value = "")]
    mail_id: String,

    /// SMTP password (an app password for Gmail with 2FA)
    #[arg(long, env = "PASSWORD", hide_env_values = true, default_value = "")]
    password: String,

    #[arg(long, default_value = coldreach_providers::mail::DEFAULT_SMTP_HOST)]
    smtp_host: String,

    #[arg(long, default_value_t = coldreach_providers::mail::DEFAULT_SMTP_PORT)]
    smtp_port: u16,

    /// Name used in the email and signature
    #[arg(long)]
    sender_name: Option<String>,

    #[arg(long)]
    sender_title: Option<String>,

    #[arg(long)]
    company: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draft an email for the posting at LINK
    Generate {
        #[arg(long)]
        link: String,

        /// Print the extracted job record as JSON too
        #[arg(long)]
        show_job: bool,
    },
    /// Send an email as-is
    Send {
        #[arg(long)]
        to: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        body: String,
    },
    /// Rank catalog links for a comma-separated skill list
    Retrieve {
        #[arg(long, default_value = "")]
        skills: String,
    },
    /// Interactive session: paste a URL to draft, `send <address>` to mail it
    Chat,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting coldreach v{}", env!("CARGO_PKG_VERSION"));

    match &args.command {
        Command::Generate { link, show_job } => {
            let generator = build_generator(&args)?;
            let draft = generator.generate(link)?;
            if *show_job {
                println!("{}", serde_json::to_string_pretty(&draft.job)?);
            }
            print_draft(&draft, generator.identity());
        }
        Command::Send { to, subject, body } => {
            let mailer = build_mailer(&args)?;
            println!("{}", deliver(&mailer, to, subject, body));
        }
        Command::Retrieve { skills } => {
            let catalog = catalog_config(&args);
            let entries = catalog
                .loader()
                .load_path(&catalog.path)
                .with_context(|| format!("loading catalog {:?}", catalog.path))?;
            let pipeline = RetrievalPipeline::new(build_embedder(&args)?, retrieval_config(&args))?;
            let job = JobRecord {
                skills: split_skills(skills),
                ..Default::default()
            };
            for ranked in pipeline.retrieve_ranked(&job, &entries)? {
                println!("{:.4}\t{}\t{}", ranked.distance, ranked.entry.link, ranked.entry.descriptor);
            }
        }
        Command::Chat => run_chat(&args)?,
    }

    Ok(())
}

fn catalog_config(args: &Args) -> CatalogConfig {
    CatalogConfig {
        path: args.catalog.clone(),
        descriptor_column: args.descriptor_column.clone(),
        link_column: args.link_column.clone(),
    }
}

fn retrieval_config(args: &Args) -> RetrievalConfig {
    RetrievalConfig { top_k: args.top_k }
}

fn identity(args: &Args) -> SenderIdentity {
    let defaults = SenderIdentity::default();
    SenderIdentity {
        name: args.sender_name.clone().unwrap_or(defaults.name),
        title: args.sender_title.clone().unwrap_or(defaults.title),
        company: args.company.clone().unwrap_or(defaults.company),
        pitch: defaults.pitch,
    }
}

fn build_embedder(args: &Args) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    if args.offline {
        info!("Using the offline hashing embedder");
        return Ok(Box::new(HashEmbedder::default()));
    }
    let embedder = OpenAiEmbedder::new(EmbeddingConfig {
        api_key: args.api_key.clone(),
        base_url: args.base_url.clone(),
        model: args.embedding_model.clone(),
        timeout: Duration::from_secs(args.timeout),
        ..Default::default()
    })
    .context("configuring the embedding client (set GOOGLE_API_KEY or pass --offline)")?;
    Ok(Box::new(embedder))
}

type Generator = ColdMailGenerator<HttpPageFetcher, OpenAiChat, Box<dyn EmbeddingProvider>>;

fn build_generator(args: &Args) -> anyhow::Result<Generator> {
    let timeout = Duration::from_secs(args.timeout);
    let fetcher = HttpPageFetcher::new(timeout)?;
    let model = OpenAiChat::new(CompletionConfig {
        api_key: args.api_key.clone(),
        base_url: args.base_url.clone(),
        model: args.chat_model.clone(),
        timeout,
        ..Default::default()
    })
    .context("configuring the chat client (set GOOGLE_API_KEY)")?;
    let pipeline = RetrievalPipeline::new(build_embedder(args)?, retrieval_config(args))?;

    Ok(ColdMailGenerator::new(
        fetcher,
        model,
        pipeline,
        CatalogSource::from(catalog_config(args)),
        identity(args),
    ))
}

fn build_mailer(args: &Args) -> anyhow::Result<SmtpMailer> {
    if args.mail_id.trim().is_empty() || args.password.is_empty() {
        bail!("mail credentials missing: set MAIL_ID and PASSWORD");
    }
    Ok(SmtpMailer::new(MailConfig {
        sender: args.mail_id.clone(),
        password: args.password.clone(),
        smtp_host: args.smtp_host.clone(),
        smtp_port: args.smtp_port,
        timeout: Duration::from_secs(args.timeout),
    }))
}

fn print_draft(draft: &Draft, identity: &SenderIdentity) {
    println!("Subject: {}", draft.subject());
    println!();
    println!("{}", with_signature(&draft.body, identity));
}

fn run_chat(args: &Args) -> anyhow::Result<()> {
    let generator = build_generator(args)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut last: Option<Draft> = None;

    println!("Paste a job posting URL to draft an email. Commands: send <address>, clear, exit");
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();

        match input.split_once(char::is_whitespace).map_or((input, ""), |(c, rest)| (c, rest.trim())) {
            ("", _) => continue,
            ("exit" | "quit", _) => break,
            ("clear", _) => {
                last = None;
                println!("Draft cleared.");
            }
            ("send", address) => {
                let Some(draft) = &last else {
                    println!("No draft yet. Paste a job posting URL first.");
                    continue;
                };
                let receiver = if address.is_empty() {
                    print!("Recipient email: ");
                    io::stdout().flush()?;
                    match lines.next() {
                        Some(line) => line?.trim().to_string(),
                        None => break,
                    }
                } else {
                    address.to_string()
                };
                if receiver.is_empty() {
                    println!("Error: no recipient given");
                    continue;
                }
                match build_mailer(args) {
                    Ok(mailer) => {
                        let body = with_signature(&draft.body, generator.identity());
                        println!("{}", deliver(&mailer, &receiver, &subject_for(&draft.job), &body));
                    }
                    Err(e) => println!("Error: {e:#}"),
                }
            }
            _ if input.starts_with("http://") || input.starts_with("https://") => {
                match generator.generate(input) {
                    Ok(draft) => {
                        print_draft(&draft, generator.identity());
                        last = Some(draft);
                    }
                    Err(e) => println!("Error: {e:#}"),
                }
            }
            _ => println!("Unrecognized input. Paste a URL, or use send <address>, clear, exit"),
        }
    }

    Ok(())
}

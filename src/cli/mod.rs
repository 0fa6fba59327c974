//! Command-line interface for topicbase.
//!
//! Provides commands for browsing sections and topics and for the
//! instructor's create/update/delete workflow.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::{self, Backend};
use crate::core::TopicRepository;
use crate::domain::{Section, Topic, TopicDraft};
use crate::library::render_topic;

/// topicbase - Markdown topic repository for the portal
#[derive(Parser, Debug)]
#[command(name = "topicbase")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the portal sections
    Sections,

    /// List the topics of a section
    List {
        /// Section id (fires, emergency, education, protection)
        section: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the topics of every section
    All {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a single topic
    Show {
        /// Topic number
        topic_number: u32,

        /// Section to look in (all sections if omitted)
        #[arg(short, long)]
        section: Option<String>,

        /// Print the stored document instead of a summary
        #[arg(long, conflicts_with = "json")]
        raw: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Create or update a topic
    Save(SaveArgs),

    /// Delete a topic
    Delete {
        /// Topic number
        #[arg(allow_hyphen_values = true)]
        topic_number: i64,

        /// Section holding the topic
        #[arg(short, long)]
        section: String,
    },

    /// Count stored documents per section
    Stats,

    /// Show resolved configuration (debug)
    Config,
}

/// Draft fields for `save`; flags override values from `--file`
#[derive(Args, Debug, Default)]
pub struct SaveArgs {
    /// YAML or JSON draft file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Topic number
    #[arg(short, long, allow_hyphen_values = true)]
    pub number: Option<i64>,

    /// Title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Section id
    #[arg(short, long)]
    pub section: Option<String>,

    /// Short description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Markdown file with the topic body
    #[arg(short, long)]
    pub body_file: Option<PathBuf>,

    /// Keywords (comma-separated)
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Author
    #[arg(short, long)]
    pub author: Option<String>,

    /// Date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// In-section sort order
    #[arg(short, long, allow_hyphen_values = true)]
    pub order: Option<i64>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Sections => {
                list_sections();
                Ok(())
            }
            Commands::List { section, json } => {
                let section = parse_section(&section)?;
                let topics = repository()?.list_topics(section).await;
                print_topics(&topics, json)
            }
            Commands::All { json } => {
                let topics = repository()?.list_all_topics().await;
                print_topics(&topics, json)
            }
            Commands::Show {
                topic_number,
                section,
                raw,
                json,
            } => {
                let section = section.as_deref().map(parse_section).transpose()?;
                show_topic(&repository()?, topic_number, section, raw, json).await
            }
            Commands::Save(args) => save_topic(&repository()?, args).await,
            Commands::Delete {
                topic_number,
                section,
            } => {
                let section = parse_section(&section)?;
                repository()?.delete_topic(topic_number, section).await?;
                println!("Topic {} deleted from {}", topic_number, section);
                Ok(())
            }
            Commands::Stats => {
                let stats = repository()?.section_stats().await;
                println!("{:<12} {:>9}", "SECTION", "DOCUMENTS");
                println!("{}", "-".repeat(22));
                for entry in stats {
                    println!("{:<12} {:>9}", entry.section.to_string(), entry.documents);
                }
                Ok(())
            }
            Commands::Config => show_config(),
        }
    }
}

/// Repository wired from the global configuration
fn repository() -> Result<TopicRepository> {
    config::config()?.build_repository()
}

fn parse_section(raw: &str) -> Result<Section> {
    raw.parse::<Section>()
        .with_context(|| "Valid sections: fires, emergency, education, protection")
}

/// Print the static section registry
fn list_sections() {
    println!("{:<12} {:<10} {:<16} TITLE", "ID", "NUMBERS", "ICON");
    println!("{}", "-".repeat(70));
    for section in Section::ALL {
        let info = section.info();
        let range = format!("{}-{}", info.id_range.start(), info.id_range.end());
        println!("{:<12} {:<10} {:<16} {}", info.id, range, info.icon, info.title);
    }
}

fn print_topics(topics: &[Topic], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(topics)?);
        return Ok(());
    }

    if topics.is_empty() {
        println!("No topics found");
        return Ok(());
    }

    println!(
        "{:<12} {:>6} {:>6} {:<12} TITLE",
        "SECTION", "NUMBER", "ORDER", "DATE"
    );
    println!("{}", "-".repeat(75));
    for topic in topics {
        println!("{}", topic_row(topic));
    }

    Ok(())
}

fn topic_row(topic: &Topic) -> String {
    format!(
        "{:<12} {:>6} {:>6} {:<12} {}",
        topic.section.to_string(),
        topic.topic_number,
        topic.order,
        topic.date.to_string(),
        topic.title
    )
}

async fn show_topic(
    repo: &TopicRepository,
    topic_number: u32,
    section: Option<Section>,
    raw: bool,
    json: bool,
) -> Result<()> {
    let Some(topic) = repo.get_topic(topic_number, section).await else {
        anyhow::bail!("Topic {} does not exist", topic_number);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&topic)?);
    } else if raw {
        print!("{}", render_topic(&topic));
    } else {
        println!("Topic: {} ({})", topic.topic_number, topic.section);
        println!("Title: {}", topic.title);
        if !topic.description.is_empty() {
            println!("Description: {}", topic.description);
        }
        println!("Date: {}", topic.date);
        println!("Author: {}", topic.author);
        if !topic.keywords.is_empty() {
            println!("Keywords: {}", topic.keywords.join(", "));
        }
        println!("Order: {}", topic.order);
        if let Some(version) = &topic.version {
            println!("Version: {}", version);
        }
        println!("\n{}", topic.body);
    }

    Ok(())
}

/// Load a draft file (YAML is a superset of JSON)
fn load_draft(path: &Path) -> Result<TopicDraft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse draft file: {}", path.display()))
}

/// Combine the draft file with command-line overrides
fn build_draft(args: SaveArgs) -> Result<TopicDraft> {
    let mut draft = match &args.file {
        Some(path) => load_draft(path)?,
        None => TopicDraft::default(),
    };

    if let Some(number) = args.number {
        draft.topic_number = number;
    }
    if let Some(title) = args.title {
        draft.title = title;
    }
    if let Some(section) = args.section {
        draft.section = section;
    }
    if let Some(description) = args.description {
        draft.description = description;
    }
    if let Some(path) = args.body_file {
        draft.body = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read body file: {}", path.display()))?;
    }
    if let Some(keywords) = args.keywords {
        draft.keywords = crate::domain::topic::split_keywords(&keywords);
    }
    if let Some(author) = args.author {
        draft.author = Some(author);
    }
    if let Some(date) = args.date {
        draft.date = Some(date);
    }
    if let Some(order) = args.order {
        draft.order = Some(order);
    }

    Ok(draft)
}

async fn save_topic(repo: &TopicRepository, args: SaveArgs) -> Result<()> {
    let draft = build_draft(args)?;
    let outcome = repo.save_topic(draft).await?;

    println!(
        "Topic {} {} in {}",
        outcome.topic.topic_number, outcome.kind, outcome.topic.section
    );
    if let Some(version) = &outcome.topic.version {
        eprintln!("[version {}]", version);
    }

    Ok(())
}

/// Print the resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("Config file: {}", match &config.config_file {
        Some(path) => path.display().to_string(),
        None => "(none, using defaults)".to_string(),
    });
    println!("Backend: {}", config.backend.name());
    match &config.backend {
        Backend::Fs { dir } => println!("  Directory: {}", dir.display()),
        Backend::Github(github) => {
            println!("  Repository: {}/{}", github.owner, github.repo);
            println!(
                "  Branch: {}",
                github.branch.as_deref().unwrap_or("(default)")
            );
            println!("  API: {}", github.api_base);
            println!(
                "  Token: {}",
                if github.token.is_some() { "set" } else { "not set" }
            );
        }
    }
    println!("Content root: {}", config.content_root);
    println!(
        "Cache: {}",
        if config.cache.enabled {
            format!("enabled (ttl {}s)", config.cache.ttl.as_secs())
        } else {
            "disabled".to_string()
        }
    );
    println!("Request timeout: {}s", config.request_timeout.as_secs());

    Ok(())
}

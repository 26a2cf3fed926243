use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use api_shared::config::core_config_from_env;
use api_shared::{AssociationRes, NormalizeReq, PrepareArticleReq, PrepareArticleRes};
use masthead_core::document::{render_json_str, FormattingRuleset};
use masthead_core::{ArticleService, Slug};

#[derive(Parser)]
#[command(name = "masthead")]
#[command(about = "Masthead editorial tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a stored document (JSON) to HTML
    Render {
        /// Path to the document JSON file
        file: PathBuf,
    },
    /// Normalize a selection into association rows
    Normalize {
        /// author, category or tag
        #[arg(long)]
        kind: String,
        /// Primary identifier (optional)
        #[arg(long)]
        primary: Option<String>,
        /// Selected identifiers, in selection order
        ids: Vec<String>,
    },
    /// Validate an article draft (JSON) and print the prepared article
    Prepare {
        /// Path to the draft JSON file
        file: PathBuf,
    },
    /// Derive a URL slug from a title
    Slug {
        /// Title words
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// List the languages with syntax highlighting
    Languages,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = Arc::new(core_config_from_env()?);
    let service = ArticleService::new(cfg.clone());

    match cli.command {
        Some(Commands::Render { file }) => {
            let text = std::fs::read_to_string(&file)?;
            println!("{}", render_json_str(&text, cfg.max_document_depth()));
        }
        Some(Commands::Normalize { kind, primary, ids }) => {
            let req = NormalizeReq {
                kind,
                selected_ids: ids,
                primary_id: primary,
            };
            let result = req.kind().and_then(|kind| {
                req.selection()?.normalize(kind, cfg.primary_policy())
            });
            match result {
                Ok(rows) => {
                    let rows: Vec<AssociationRes> = rows.iter().map(AssociationRes::from).collect();
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
                Err(e) => {
                    eprintln!("Error normalizing selection: {}", e);
                    process::exit(2);
                }
            }
        }
        Some(Commands::Prepare { file }) => {
            let text = std::fs::read_to_string(&file)?;
            let req: PrepareArticleReq = serde_json::from_str(&text)?;
            match req.into_draft().and_then(|draft| service.prepare(draft)) {
                Ok(article) => {
                    let res = PrepareArticleRes::from(article);
                    println!("{}", serde_json::to_string_pretty(&res)?);
                }
                Err(e) => {
                    eprintln!("Error preparing article: {}", e);
                    process::exit(2);
                }
            }
        }
        Some(Commands::Slug { title }) => match Slug::from_title(title.join(" ")) {
            Ok(slug) => println!("{}", slug),
            Err(e) => {
                eprintln!("Error deriving slug: {}", e);
                process::exit(2);
            }
        },
        Some(Commands::Languages) => {
            for language in FormattingRuleset::global().languages() {
                println!("{}", language);
            }
        }
        None => {
            println!("Use 'masthead --help' for commands");
        }
    }

    Ok(())
}

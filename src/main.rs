//! Twinmark - markdown/rich-view conversion and blog post tooling.
//!
//! # Usage
//!
//! ```bash
//! twinmark render post.md
//! twinmark roundtrip --check post.md
//! twinmark set post.md draft=false tags=rust,web
//! twinmark --content-dir src/content/blog new "Hello World"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;

use twinmark::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use twinmark::frontmatter::{self, FrontmatterChanges};
use twinmark::markdown::{html_to_markdown, render_html, roundtrip};
use twinmark::post::{
    DEFAULT_EXCERPT_LIMIT, DirectoryStore, PostStore, SaveRequest, create_post, make_excerpt,
    save_post,
};

const DEFAULT_CONTENT_DIR: &str = "src/content/blog";

/// Markdown/rich-view conversion and blog post tooling
#[derive(Parser, Debug)]
#[command(name = "twinmark", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory holding posts, relative to the working directory
    #[arg(long, global = true, value_name = "DIR")]
    content_dir: Option<PathBuf>,

    /// Characters kept in excerpts printed by `meta`
    #[arg(long, global = true, value_name = "N")]
    excerpt_limit: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the body of a markdown file to HTML
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Convert an HTML fragment to markdown
    Markdown {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Render a markdown file and convert it back
    Roundtrip {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Fail if a second pass changes the output
        #[arg(long)]
        check: bool,
    },
    /// Print the frontmatter and an excerpt as JSON
    Meta {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Update frontmatter keys in place
    Set {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(value_name = "KEY=VALUE", required = true)]
        assignments: Vec<String>,
    },
    /// Create a new post in the content directory
    New {
        #[arg(value_name = "TITLE")]
        title: Vec<String>,
    },
    /// Apply a JSON save request to a post
    Save {
        /// Post filename inside the content directory
        #[arg(value_name = "FILE")]
        file: String,
        #[arg(value_name = "REQUEST")]
        request: PathBuf,
    },
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to encode JSON")?;
    println!("{out}");
    Ok(())
}

fn parse_assignments(assignments: &[String]) -> Result<FrontmatterChanges> {
    let mut changes = FrontmatterChanges::new();
    for assignment in assignments {
        let Some((key, value)) = assignment.split_once('=') else {
            bail!("Expected KEY=VALUE, got `{assignment}`");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Empty key in `{assignment}`");
        }
        changes.set(key, value);
    }
    Ok(changes)
}

/// Apply `changes` to the frontmatter of `raw`, adding a block if needed.
fn set_frontmatter(raw: &str, changes: &FrontmatterChanges) -> String {
    match frontmatter::split(raw) {
        (Some(fm), body) => {
            let updated = frontmatter::update(fm, changes);
            format!("---\n{updated}\n---\n{body}")
        }
        (None, body) => {
            let created = frontmatter::update("", changes);
            format!("---\n{}\n---\n\n{body}", created.trim_start_matches('\n'))
        }
    }
}

fn run(command: Command, flags: &ConfigFlags) -> Result<()> {
    let content_dir = flags
        .content_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR));
    let content_dir = content_dir.to_string_lossy();

    match command {
        Command::Render { file } => {
            let raw = read_file(&file)?;
            let (_, body) = frontmatter::split(&raw);
            println!("{}", render_html(body));
        }
        Command::Markdown { file } => {
            println!("{}", html_to_markdown(&read_file(&file)?));
        }
        Command::Roundtrip { file, check } => {
            let raw = read_file(&file)?;
            let (_, body) = frontmatter::split(&raw);
            let once = roundtrip(body);
            if check {
                let twice = roundtrip(&once);
                if once != twice {
                    bail!("{} does not round-trip stably", file.display());
                }
            }
            println!("{once}");
        }
        Command::Meta { file } => {
            let raw = read_file(&file)?;
            let (block, body) = frontmatter::parse(&raw);
            let limit = flags.excerpt_limit.unwrap_or(DEFAULT_EXCERPT_LIMIT);
            print_json(
                &serde_json::json!({
                    "hasFrontmatter": frontmatter::has_frontmatter(&raw),
                    "frontmatter": block,
                    "excerpt": make_excerpt(body, limit),
                }),
                flags.pretty,
            )?;
        }
        Command::Set { file, assignments } => {
            let changes = parse_assignments(&assignments)?;
            let raw = read_file(&file)?;
            let updated = set_frontmatter(&raw, &changes);
            fs::write(&file, updated)
                .with_context(|| format!("Failed to write {}", file.display()))?;
        }
        Command::New { title } => {
            let mut store = DirectoryStore::new(".", &content_dir);
            let filename = create_post(&mut store, &title.join(" "), Utc::now())
                .context("Failed to create post")?;
            println!("{}", store.dir().join(filename).display());
        }
        Command::Save { file, request } => {
            let request: SaveRequest = serde_json::from_str(&read_file(&request)?)
                .with_context(|| format!("Invalid save request {}", request.display()))?;
            let mut store = DirectoryStore::new(".", &content_dir);
            let response = save_post(&mut store, &file, &request, Utc::now())
                .with_context(|| format!("Failed to save {file} in {}", store.content_dir()))?;
            print_json(&response, flags.pretty)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    // Initialize logging
    let level = if effective.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Some(command) => run(command, &effective),
        None if cli.save || cli.clear => Ok(()),
        None => bail!("No command given; see --help"),
    }
}

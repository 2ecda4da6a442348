use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use flarum_core::excerpt::DEFAULT_EXCERPT_LENGTH;
use flarum_core::query::{DEFAULT_INCLUDE, DEFAULT_LIMIT};
use flarum_core::render::{render_listing, summarize};
use flarum_core::{DiscussionSummary, RenderOptions, ResourceStore, StreamQuery};
use serde::Serialize;

use crate::fetch::{fetch, FetchOptions, DEFAULT_TIMEOUT_SECS};
use crate::prelude::{eprintln, print, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One <article> block per discussion
    Html,
    /// Pretty-printed discussion summaries
    Json,
    /// Colored terminal listing
    Text,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Forum url, same as the url in the forum's config.php
    #[arg(long = "url", env = "FLARUM_URL")]
    pub base_url: String,

    /// Number of discussions to fetch
    #[arg(short, long, env = "FLARUM_LIMIT", default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    /// Only list discussions with this tag slug
    #[arg(short, long, env = "FLARUM_TAG")]
    pub tag: Option<String>,

    /// Relations to include, comma separated
    #[arg(
        long,
        env = "FLARUM_INCLUDE",
        value_delimiter = ',',
        default_values_t = DEFAULT_INCLUDE.map(String::from)
    )]
    pub include: Vec<String>,

    /// Maximum number of characters in each excerpt
    #[arg(long, env = "FLARUM_EXCERPT_LENGTH", default_value_t = DEFAULT_EXCERPT_LENGTH)]
    pub excerpt_length: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "FLARUM_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

/// JSON output envelope
#[derive(Debug, Serialize, Clone)]
pub struct ListOutput {
    pub forum: String,
    pub tag: Option<String>,
    pub discussions: Vec<DiscussionSummary>,
}

pub fn run(options: ListOptions, global: crate::Global) -> Result<()> {
    let query = build_query(&options)?;

    if global.verbose {
        eprintln!("Fetching {}", query.url());
    }

    let store = list_discussions_data(query.clone(), &fetch_options(&options))?;

    if global.verbose {
        eprintln!(
            "Fetched {} discussions, {} included resources",
            store.discussions().len(),
            store.index().len()
        );
    }

    if options.output.is_some() {
        colored::control::set_override(false);
    }

    let content = format_output(&store, &query, &options)?;
    write_output(&content, options.output.as_deref())
}

/// Validated, immutable query built from the CLI options.
pub fn build_query(options: &ListOptions) -> Result<StreamQuery, Error> {
    validate_base_url(&options.base_url)?;

    let query = StreamQuery::new(&options.base_url)
        .limit(options.limit)
        .include(options.include.iter().map(|name| name.trim()));

    Ok(match &options.tag {
        Some(tag) => query.tag(tag.as_str()),
        None => query,
    })
}

fn validate_base_url(url: &str) -> Result<(), Error> {
    let invalid = |reason: String| Error::InvalidBaseUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(f!("unsupported scheme `{scheme}`"))),
    }
}

fn fetch_options(options: &ListOptions) -> FetchOptions {
    FetchOptions {
        timeout: Duration::from_secs(options.timeout),
    }
}

/// Fetch one page and hand back the indexed result.
pub fn list_discussions_data(query: StreamQuery, options: &FetchOptions) -> Result<ResourceStore> {
    let url = query.url();
    let stream = fetch(query, options).wrap_err_with(|| f!("Failed to fetch {url}"))?;
    Ok(stream.into_store()?)
}

fn render_options(options: &ListOptions) -> RenderOptions {
    RenderOptions {
        excerpt_length: options.excerpt_length,
        ..RenderOptions::default()
    }
}

fn format_output(
    store: &ResourceStore,
    query: &StreamQuery,
    options: &ListOptions,
) -> Result<String> {
    let render = render_options(options);

    match options.format {
        OutputFormat::Html => {
            render_listing(store, &render).wrap_err("Failed to render discussions")
        }
        OutputFormat::Json => {
            let discussions = summarize(store, &render).wrap_err("Failed to render discussions")?;
            format_list_json(&ListOutput {
                forum: query.base_url().to_string(),
                tag: query.tag_value().map(String::from),
                discussions,
            })
        }
        OutputFormat::Text => {
            let discussions = summarize(store, &render).wrap_err("Failed to render discussions")?;
            Ok(format_list_text(&discussions, query))
        }
    }
}

fn format_list_json(output: &ListOutput) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn format_list_text(discussions: &[DiscussionSummary], query: &StreamQuery) -> String {
    let mut result = String::new();

    let heading = match query.tag_value() {
        Some(tag) => f!("DISCUSSIONS TAGGED {}", tag.to_uppercase()),
        None => "LATEST DISCUSSIONS".to_string(),
    };

    result.push_str(&f!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&f!("{}\n", heading.bright_cyan().bold()));
    result.push_str(&f!("{}\n", query.base_url().bright_black()));
    result.push_str(&f!("{}\n", "=".repeat(80).bright_cyan()));

    if discussions.is_empty() {
        result.push_str(&f!("\n{}\n", "No discussions found.".yellow()));
    }

    for (idx, discussion) in discussions.iter().enumerate() {
        result.push_str(&f!(
            "\n{} {}\n",
            f!("[{}]", idx + 1).yellow().bold(),
            discussion.title.white().bold()
        ));
        result.push_str(&f!(
            "    {}: {}\n",
            "URL".green(),
            discussion.url.cyan().underline()
        ));
        result.push_str(&f!(
            "    {}: {} | {}: {}\n",
            "By".green(),
            discussion.author.bright_white(),
            "Started".green(),
            discussion.start_time.bright_black()
        ));
        if !discussion.excerpt.is_empty() {
            result.push_str(&f!("    {}\n", discussion.excerpt));
        }
    }

    result.push('\n');
    result
}

fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content).map_err(|e| Error::Output {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?,
        None => print!("{content}"),
    }

    Ok(())
}

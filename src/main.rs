//! # redscrape CLI
//!
//! Command-line interface for the redscrape library.

use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use std::time::{Duration, Instant};

use clap::Parser as ClapParser;
use tracing::warn;

use redscrape::cli::{Args, Command, LiveArgs, split_targets};
use redscrape::client::{HttpClient, RedditApi, StreamTarget};
use redscrape::config::{ClientConfig, Credentials, ExportConfig, LivestreamConfig};
use redscrape::core::CommentStyle;
use redscrape::format::OutputFormat;
use redscrape::scrapers::{
    CommentsJob, RedditorJob, ScrapeReport, StopReason, SubredditJob, comments, display_item,
    livestream, redditor, subreddit,
};
use redscrape::validation::{TargetKind, validate};
use redscrape::{Result, ScrapeError};

static INIT_TRACING: Once = Once::new();

fn init_tracing_once() {
    INIT_TRACING.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn main() {
    init_tracing_once();
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let total_start = Instant::now();
    let args = <Args as ClapParser>::parse();
    let format: OutputFormat = args.format.into();
    let export = ExportConfig::new().with_root(&args.output_dir);

    println!("📦 redscrape v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let report = match args.command {
        Command::Subreddit {
            subreddits,
            category,
            n_results_or_keywords,
            time_filter,
            rules,
        } => {
            let template = SubredditJob::new(String::new(), category.into(), n_results_or_keywords)
                .with_time_filter(time_filter.map(Into::into))
                .with_rules(rules);
            template.validate()?;
            println!("📖 Category: {}", template.category);
            println!("📄 Format:   {}", format);
            println!("📂 Output:   {}", export.scrape_dir().display());

            let api = connect()?;
            let names = split_targets(&subreddits);
            let checked = validate(&api, &names, TargetKind::Subreddit)?;
            let mut report = ScrapeReport::new();
            report.skip(checked.invalid);
            for name in checked.valid {
                println!("⏳ Scraping r/{}...", name);
                let job = SubredditJob {
                    subreddit: name,
                    ..template.clone()
                };
                report.push(subreddit::run(&api, &job, &export, format)?);
            }
            report
        }
        Command::Redditor {
            redditors,
            n_results,
        } => {
            redditor::check_format(format)?;
            let template = RedditorJob::parse(String::new(), &n_results)?;
            println!("📖 Results:  {} per interaction", template.limit);
            println!("📂 Output:   {}", export.scrape_dir().display());

            let api = connect()?;
            let names = split_targets(&redditors);
            let checked = validate(&api, &names, TargetKind::Redditor)?;
            let mut report = ScrapeReport::new();
            report.skip(checked.invalid);
            for name in checked.valid {
                println!("⏳ Scraping u/{}...", name);
                let job = RedditorJob::new(name, template.limit);
                report.push(redditor::run(&api, &job, &export, format)?);
            }
            report
        }
        Command::Comments {
            urls,
            n_results,
            raw,
        } => {
            let style = if raw {
                CommentStyle::Raw
            } else {
                CommentStyle::Structured
            };
            comments::check_format(style, format)?;
            println!("📖 Style:    {}", style);
            println!("📄 Format:   {}", format);
            println!("📂 Output:   {}", export.scrape_dir().display());

            let api = connect()?;
            let urls = split_targets(&urls);
            let checked = validate(&api, &urls, TargetKind::Submission)?;
            let mut report = ScrapeReport::new();
            report.skip(checked.invalid);
            for url in checked.valid {
                println!("⏳ Scraping comments from {}...", url);
                let job = CommentsJob::new(url, n_results).with_style(style);
                report.push(comments::run(&api, &job, &export, format)?);
            }
            report
        }
        Command::Live(live) => {
            run_livestream(&live, &export)?;
            return Ok(());
        }
    };

    println!();
    println!("✅ Done!");
    println!();
    println!("📊 Summary:");
    for path in &report.written {
        println!("   💾 {}", path.display());
    }
    if !report.skipped.is_empty() {
        println!("   ⏭️  Skipped: {}", report.skipped.join(", "));
    }
    println!("   Total time:  {:.2}s", total_start.elapsed().as_secs_f64());

    Ok(())
}

/// Loads credentials and logs in.
fn connect() -> Result<HttpClient> {
    let credentials = Credentials::from_env()?;
    let client = HttpClient::new(credentials, ClientConfig::default())?;
    let me = client.me()?;
    println!("👤 Logged in as u/{}", me);
    println!();
    Ok(client)
}

fn run_livestream(live: &LiveArgs, export: &ExportConfig) -> Result<()> {
    let target = live
        .target()
        .ok_or_else(|| ScrapeError::invalid_setting("livestream", "pass --subreddit or --redditor"))?;
    let config = LivestreamConfig::new()
        .with_kind(live.kind())
        .with_save(!live.nosave)
        .with_duration(live.duration.map(Duration::from_secs))
        .with_max_polls(live.max_polls);

    println!("📡 Stream:   {} {}", target, config.kind);
    if config.save {
        println!("📂 Output:   {}", export.scrape_dir().display());
    }

    let api = connect()?;
    let kind = match target {
        StreamTarget::Subreddit(_) => TargetKind::Subreddit,
        StreamTarget::Redditor(_) => TargetKind::Redditor,
    };
    validate(&api, &[target.name().to_string()], kind)?;

    println!("⏳ New entries will appear when posted to Reddit. Press Ctrl+C to stop.");
    println!();

    let stop = Arc::new(AtomicBool::new(false));
    let stop_signal = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || stop_signal.store(true, Ordering::SeqCst)) {
        warn!(error = %e, "Ctrl+C handler not installed, interrupting will not save a summary");
    }
    let summary = livestream(&api, &target, &config, export, &stop, |item| {
        println!("{}", display_item(item));
        println!("{}", "-".repeat(30));
    })?;

    println!();
    match summary.stopped_by {
        StopReason::Interrupted => println!("🛑 Livestream ended by user"),
        StopReason::MaxPolls => println!("✅ Livestream ended after {} polls", summary.polls),
        StopReason::Duration => println!("✅ Livestream ended, duration reached"),
    }
    println!();
    println!("📊 Summary:");
    println!("   Polls:    {}", summary.polls);
    println!("   New:      {}", summary.emitted);
    if summary.errors > 0 {
        println!("   Retried:  {} failed polls", summary.errors);
    }
    if let Some(path) = &summary.output {
        println!("   💾 {}", path.display());
    }
    Ok(())
}

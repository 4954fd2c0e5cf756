use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dashboard::config::Config;
use dashboard::models::{MatchRequestInput, UploadedFile};
use dashboard::store::{Cached, CollectionKind, DashboardResourceStore, LoadState};
use dashboard::{Dashboard, MatchClient, StaticTokenProvider, Tab};

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Match resumes against a job and browse your saved results")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Overrides RESUME_API_URL
    #[arg(long)]
    api_url: Option<String>,

    /// Session token; overrides RESUME_API_TOKEN
    #[arg(long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Score resumes against a job description or keyword list
    Match {
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        #[arg(long, conflicts_with = "keywords")]
        description: Option<String>,
        /// Comma separated, e.g. "Python, React, SQL"
        #[arg(long)]
        keywords: Option<String>,
    },
    /// List saved resumes
    Resumes,
    /// Delete a saved resume and show the refreshed list
    DeleteResume { id: String },
    /// Show past job searches and their matches
    History,
    /// Show dashboard statistics
    Stats,
    /// Extract skills and roles from a job description or keyword list
    Analyze {
        #[arg(long, conflicts_with = "keywords")]
        description: Option<String>,
        #[arg(long)]
        keywords: Option<String>,
    },
    /// Wake the backend and report its status
    Ping,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env_with_url(cli.api_url)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let token = cli.token.or(config.api_token);

    info!("Starting dashboard client v{} against {}", env!("CARGO_PKG_VERSION"), config.api_url);

    let client = MatchClient::new(config.api_url)?;
    let dashboard = Dashboard::new(client, Arc::new(StaticTokenProvider::new(token)));

    match cli.command {
        Command::Match {
            files,
            description,
            keywords,
        } => run_match(&dashboard, files, description, keywords).await,
        Command::Resumes => show_tab(&dashboard, Tab::Resumes).await,
        Command::DeleteResume { id } => {
            let store = dashboard.store();
            with_progress(store, CollectionKind::Resumes, dashboard.delete_resume(&id))
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Deleted resume {id}");
            print_resumes(store);
            Ok(())
        }
        Command::History => show_tab(&dashboard, Tab::History).await,
        Command::Stats => show_tab(&dashboard, Tab::Analytics).await,
        Command::Analyze {
            description,
            keywords,
        } => {
            let input = input_from_flags(description, keywords);
            let analysis = dashboard
                .analyze_job(&input)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Skills:   {}", analysis.extracted_skills.join(", "));
            println!("Roles:    {}", analysis.roles.join(", "));
            println!("Keywords: {}", analysis.keywords.join(", "));
            if let Some(experience) = analysis.experience {
                println!("Experience: {experience}");
            }
            Ok(())
        }
        Command::Ping => {
            let status = dashboard
                .ping()
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!(
                "{} ({})",
                status.message.unwrap_or(status.status),
                status.version.unwrap_or_else(|| "unknown version".to_string())
            );
            Ok(())
        }
    }
}

fn input_from_flags(description: Option<String>, keywords: Option<String>) -> MatchRequestInput {
    match keywords {
        Some(raw) => MatchRequestInput::Keywords(raw),
        None => MatchRequestInput::Description(description.unwrap_or_default()),
    }
}

async fn run_match(
    dashboard: &Dashboard,
    paths: Vec<PathBuf>,
    description: Option<String>,
    keywords: Option<String>,
) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = UploadedFile::from_path(path).await?;
        println!("  {} ({})", file.file_name, file.size_display());
        files.push(file);
    }

    let input = input_from_flags(description, keywords);
    let store = dashboard.store();
    let count = with_progress(
        store,
        CollectionKind::MatchResults,
        dashboard.run_match(&input, &files),
    )
    .await
    .map_err(|e| anyhow!(e.user_message()))?;

    if count == 0 {
        println!("No matches returned.");
        return Ok(());
    }
    if let Cached::Loaded(results) = store.match_results() {
        for (rank, result) in results.iter().enumerate() {
            println!("{}. {}  {:.1}%", rank + 1, result.filename, result.score);
            if !result.matched_skills.is_empty() {
                let skills: Vec<&str> = result.matched_skills.iter().map(String::as_str).collect();
                println!("   matched: {}", skills.join(", "));
            }
            if !result.missing_skills.is_empty() {
                let skills: Vec<&str> = result.missing_skills.iter().map(String::as_str).collect();
                println!("   missing: {}", skills.join(", "));
            }
            for key in ["email", "phone"] {
                if let Some(value) = result.extracted_str(key) {
                    println!("   {key}: {value}");
                }
            }
        }
    }
    Ok(())
}

async fn show_tab(dashboard: &Dashboard, tab: Tab) -> Result<()> {
    let store = dashboard.store();
    let watched = tab
        .resources()
        .first()
        .map(|&r| CollectionKind::from(r))
        .unwrap_or(CollectionKind::MatchResults);

    with_progress(store, watched, dashboard.activate_tab(tab))
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    match tab {
        Tab::Resumes => print_resumes(store),
        Tab::History => print_history(store),
        Tab::Analytics => print_stats(store),
        Tab::Match => {}
    }
    Ok(())
}

/// Drives `operation`, printing a one-time notice if the store flags it as slow.
async fn with_progress<F: Future>(
    store: &DashboardResourceStore,
    kind: CollectionKind,
    operation: F,
) -> F::Output {
    tokio::pin!(operation);
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let mut warned = false;
    loop {
        tokio::select! {
            output = &mut operation => return output,
            _ = ticker.tick() => {
                if !warned && store.load_state(kind) == LoadState::SlowWarning {
                    warned = true;
                    eprintln!("Still working... the backend may be waking up from sleep.");
                }
            }
        }
    }
}

fn print_resumes(store: &DashboardResourceStore) {
    let Cached::Loaded(resumes) = store.resumes() else {
        return;
    };
    if resumes.is_empty() {
        println!("No saved resumes yet.");
    }
    for resume in resumes {
        println!("{}  {}", resume.id, resume.filename);
        if let Some(name) = resume.name.filter(|n| !n.is_empty()) {
            println!("   name:  {name}");
        }
        if let Some(email) = resume.email.filter(|e| !e.is_empty()) {
            println!("   email: {email}");
        }
        if !resume.skills.is_empty() {
            println!("   skills: {}", resume.skills.join(", "));
        }
        println!("   uploaded: {}", resume.created_at.format("%Y-%m-%d"));
    }
}

fn print_history(store: &DashboardResourceStore) {
    if let Cached::Loaded(searches) = store.job_searches() {
        println!("Job searches ({}):", searches.len());
        for search in searches {
            println!(
                "  {}  {}  {}",
                search.created_at.format("%Y-%m-%d"),
                search.display_title(),
                search.keywords.join(", ")
            );
        }
    }
    if let Cached::Loaded(matches) = store.match_history() {
        println!("Matches ({}):", matches.len());
        for record in matches {
            let filename = record
                .resume
                .as_ref()
                .map(|r| r.filename.as_str())
                .unwrap_or(record.resume_id.as_str());
            let search = record
                .job_search
                .as_ref()
                .map(|s| s.display_title())
                .unwrap_or(record.job_search_id.as_str());
            println!("  {:>5.1}%  {}  for {}", record.score, filename, search);
        }
    }
}

fn print_stats(store: &DashboardResourceStore) {
    let Cached::Loaded(stats) = store.stats() else {
        return;
    };
    println!("Resumes:        {}", stats.resume_count);
    println!("Job searches:   {}", stats.job_search_count);
    println!("Matches:        {}", stats.match_count);
    println!("Average score:  {}", stats.average_display());
}

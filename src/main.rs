mod config;
mod meta;
mod render;
mod review;
mod source;
mod stage;
mod synth;

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use config::{Config, Paths};
use meta::PostMetadata;
use review::Outcome;
use source::gdocs::GoogleDocs;
use source::oauth::GoogleAuth;
use source::BodySource;
use synth::claude::Claude;
use synth::tmdb::{similar_hint_block, Tmdb};

#[derive(Parser)]
#[command(
    name = "new_post",
    about = "Create a new Reel Refractions post with AI-generated front matter"
)]
struct Cli {
    /// Plain text body file, or a Google Docs URL
    body: String,
    /// Cover / listing image
    cover: PathBuf,
    /// Secondary images: the first is the article hero, the rest go inline
    images: Vec<PathBuf>,
    /// Letterboxd review URL for the post
    #[arg(long)]
    letterboxd: Option<String>,
    /// TMDB movie id, skips the title search
    #[arg(long)]
    tmdb_id: Option<u64>,
    /// Where assembled posts are staged
    #[arg(long, default_value = "staging")]
    staging_dir: PathBuf,
    /// Published content directory, used in the move reminder
    #[arg(long, default_value = "content/posts")]
    content_dir: PathBuf,
    /// Claude model used for front matter
    #[arg(long, default_value = config::DEFAULT_MODEL)]
    model: String,
    /// Google OAuth client secrets (installed app)
    #[arg(long, default_value = "credentials.json")]
    credentials: PathBuf,
    /// Cached Google token
    #[arg(long, default_value = "token.json")]
    token_cache: PathBuf,
    /// Loopback port for the Google consent redirect
    #[arg(long, default_value_t = 8765)]
    oauth_port: u16,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let Cli {
        body: body_arg,
        cover,
        images,
        letterboxd,
        tmdb_id,
        staging_dir,
        content_dir,
        model,
        credentials,
        token_cache,
        oauth_port,
    } = cli;

    // Validate every input before touching the network.
    let source = BodySource::classify(&body_arg)?;
    if let BodySource::Local(path) = &source {
        if !path.is_file() {
            bail!("Body file not found: {}", path.display());
        }
    }
    if !cover.is_file() {
        bail!("Cover image not found: {}", cover.display());
    }
    for image in &images {
        if !image.is_file() {
            bail!("Secondary image not found: {}", image.display());
        }
    }

    let config = Config::from_env(Paths {
        model,
        staging_dir,
        content_dir,
        credentials,
        token_cache,
        oauth_port,
    })?;

    let body = match &source {
        BodySource::Local(path) => source::read_local(path)?,
        BodySource::Remote(id) => {
            println!("\nFetching Google Doc {id}...");
            let auth = GoogleAuth::new(
                &config.paths.credentials,
                &config.paths.token_cache,
                config.paths.oauth_port,
            );
            source::fetch_body(&GoogleDocs::new(auth), id).await?
        }
    };
    if body.trim().is_empty() {
        bail!("Post body is empty");
    }

    let hint = match &config.tmdb_key {
        Some(key) => {
            println!("\nLooking up similar films on TMDB...");
            match Tmdb::new(key) {
                Ok(tmdb) => with_spinner("TMDB", similar_hint_block(&tmdb, &body, tmdb_id)).await,
                Err(e) => {
                    warn!("TMDB unavailable: {e:#}");
                    None
                }
            }
        }
        None => {
            info!("TMDB_API_KEY not set, skipping similar-film hints");
            None
        }
    };

    println!("\nGenerating front matter via Claude API...");
    let claude = Claude::new(&config.anthropic_key, &config.paths.model);
    let mut meta = with_spinner("Claude", synth::synthesize(&claude, &body, hint.as_deref()))
        .await
        .context("Error generating front matter")?;

    let today = Local::now().date_naive();
    let cover_name = file_name(&cover)?;
    let mut secondary_names = images.iter().map(|p| file_name(p)).collect::<Result<Vec<_>>>()?;
    let hero = (!secondary_names.is_empty()).then(|| secondary_names.remove(0));
    let header_for = |m: &PostMetadata| {
        render::render_header(m, &cover_name, today, hero.as_deref(), letterboxd.as_deref())
    };

    let outcome = review::review(&mut meta, &header_for, &mut io::stdin().lock(), &mut io::stdout())?;
    if outcome == Outcome::Cancelled {
        println!("Cancelled.");
        return Ok(ExitCode::FAILURE);
    }

    let document = render::assemble(&header_for(&meta), &render::render_body(&body, &secondary_names));

    let mut files = Vec::with_capacity(images.len() + 1);
    files.push(cover);
    files.extend(images);
    let staged = stage::stage_post(&config.paths.staging_dir, today, &meta.slug, &document, &files)?;
    println!("{}", staged.summary(&config.paths.content_dir));

    Ok(ExitCode::SUCCESS)
}

async fn with_spinner<T>(service: &str, fut: impl Future<Output = T>) -> T {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(format!("Waiting for {service}"));
    pb.enable_steady_tick(Duration::from_millis(120));
    let out = fut.await;
    pb.finish_and_clear();
    out
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Path has no file name: {}", path.display()))
}

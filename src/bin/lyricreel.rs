use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lyricreel::audio::tempo::estimate_tempo;
use lyricreel::lyrics::lrc::parse_lrc;
use lyricreel::pipeline::{Pipeline, Tempo, compose_with_fallback, http_client, render_frames};
use lyricreel::publish::auth::{OAuthClient, TokenStore};
use lyricreel::publish::{PostMeta, Publisher, TikTokPublisher};
use lyricreel::{AppConfig, ComposeJob};

#[derive(Parser, Debug)]
#[command(name = "lyricreel", version)]
struct Cli {
    /// JSON config file; defaults are used when it does not exist.
    #[arg(long, global = true, default_value = "lyricreel.json")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick a track, build its video and publish it when enabled.
    Run,
    /// Compose an MP4 from a folder of rendered frames (requires `ffmpeg` on PATH).
    Compose(ComposeArgs),
    /// Render the title card and lyric frames from an LRC file.
    Frames(FramesArgs),
    /// Estimate the tempo of an audio file.
    Tempo(TempoArgs),
    /// Exchange an OAuth authorization code and store the token.
    Auth(AuthArgs),
    /// Upload a finished video.
    Publish(PublishArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Folder holding `title_card.jpg` and `lyrics_<ts>.jpg` frames.
    #[arg(long)]
    images: PathBuf,

    /// Soundtrack.
    #[arg(long)]
    audio: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    output: PathBuf,

    /// Background image; the configured one when omitted.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Tempo driving the motion; estimated from the audio when omitted and enabled.
    #[arg(long)]
    bpm: Option<f64>,

    #[arg(long, default_value = "Unknown Artist")]
    artist: String,

    #[arg(long, default_value = "Unknown Song")]
    song: String,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// LRC lyrics file.
    #[arg(long)]
    lyrics: PathBuf,

    /// Output folder for the frames.
    #[arg(long)]
    out: PathBuf,

    #[arg(long)]
    artist: String,

    #[arg(long)]
    title: String,
}

#[derive(Parser, Debug)]
struct TempoArgs {
    /// Audio file to analyse.
    audio: PathBuf,
}

#[derive(Parser, Debug)]
struct AuthArgs {
    /// Authorization code from the redirect.
    code: String,
}

#[derive(Parser, Debug)]
struct PublishArgs {
    /// MP4 to upload.
    video: PathBuf,

    /// Post title.
    #[arg(long)]
    title: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("load config '{}'", cli.config.display()))?;

    match cli.cmd {
        Command::Run => cmd_run(cfg).await,
        Command::Compose(args) => cmd_compose(cfg, args).await,
        Command::Frames(args) => cmd_frames(cfg, args).await,
        Command::Tempo(args) => cmd_tempo(cfg, args).await,
        Command::Auth(args) => cmd_auth(cfg, args).await,
        Command::Publish(args) => cmd_publish(cfg, args).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn cmd_run(cfg: AppConfig) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(cfg).context("build pipeline")?;
    let outcome = pipeline.run().await.context("run pipeline")?;

    eprintln!(
        "wrote {} ({:.2}s, {} frames, {:.1} bpm)",
        outcome.report.output.display(),
        outcome.report.stats.duration_secs,
        outcome.report.stats.total_frames,
        outcome.tempo.bpm,
    );
    if let Some(post) = outcome.post {
        eprintln!("post status: {}", post.status);
    }
    Ok(())
}

async fn cmd_compose(cfg: AppConfig, args: ComposeArgs) -> anyhow::Result<()> {
    cfg.validate()?;
    let background = args.background.unwrap_or_else(|| cfg.background.clone());

    let tempo = match args.bpm {
        Some(bpm) => Tempo::resolve(Some(bpm), cfg.default_bpm),
        None if cfg.audio.estimate_tempo => {
            Tempo::resolve(analyse(&args.audio, cfg.audio.tempo_window_secs).await?, cfg.default_bpm)
        }
        None => Tempo::resolve(None, cfg.default_bpm),
    };

    let job = ComposeJob::from_folder(&args.images, background, &args.audio, &args.output)
        .with_context(|| format!("scan frames in '{}'", args.images.display()))?
        .with_bpm(tempo.bpm)
        .with_track(args.artist, args.song);
    let report = compose_with_fallback(cfg, job, tempo).await?;

    eprintln!(
        "wrote {} ({:.2}s, {} frames, {} segments)",
        report.output.display(),
        report.stats.duration_secs,
        report.stats.total_frames,
        report.stats.segments,
    );
    eprintln!("metadata {}", report.metadata.display());
    Ok(())
}

async fn cmd_frames(cfg: AppConfig, args: FramesArgs) -> anyhow::Result<()> {
    cfg.validate()?;
    let text = tokio::fs::read_to_string(&args.lyrics)
        .await
        .with_context(|| format!("read lyrics '{}'", args.lyrics.display()))?;
    let lines = parse_lrc(&text);
    anyhow::ensure!(
        !lines.is_empty(),
        "no timestamped lines in '{}'",
        args.lyrics.display()
    );

    let frames = render_frames(cfg, lines, args.artist, args.title, args.out.clone()).await?;
    eprintln!("wrote {} frames to {}", frames.len(), args.out.display());
    Ok(())
}

async fn cmd_tempo(cfg: AppConfig, args: TempoArgs) -> anyhow::Result<()> {
    match analyse(&args.audio, cfg.audio.tempo_window_secs).await? {
        Some(bpm) => println!("{bpm:.1}"),
        None => anyhow::bail!("no tempo found in '{}'", args.audio.display()),
    }
    Ok(())
}

async fn cmd_auth(cfg: AppConfig, args: AuthArgs) -> anyhow::Result<()> {
    let http = http_client(&cfg.audio.user_agent)?;
    let oauth = OAuthClient::from_config(http, &cfg.publish);
    let mut token = oauth
        .exchange_code(args.code.trim())
        .await
        .context("exchange authorization code")?;
    let store = TokenStore::new(&cfg.publish.token_path);
    store.save(&mut token)?;
    eprintln!("token saved to {}", store.path().display());
    Ok(())
}

async fn cmd_publish(cfg: AppConfig, args: PublishArgs) -> anyhow::Result<()> {
    let http = http_client(&cfg.audio.user_agent)?;
    let publisher = TikTokPublisher::from_config(&http, &cfg.publish)
        .await
        .context("prepare publisher")?;
    let meta = PostMeta {
        title: args.title,
    };
    let status = publisher
        .publish(&args.video, &meta)
        .await
        .with_context(|| format!("publish '{}'", args.video.display()))?;
    eprintln!("post status: {}", status.status);
    Ok(())
}

async fn analyse(audio: &Path, window_secs: f64) -> anyhow::Result<Option<f64>> {
    let audio = audio.to_path_buf();
    let bpm = tokio::task::spawn_blocking(move || estimate_tempo(&audio, window_secs))
        .await
        .context("tempo task")??;
    Ok(bpm)
}

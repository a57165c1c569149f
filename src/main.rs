use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tts_studio::api::HttpApi;
use tts_studio::audio::{self, HttpAudioProbe};
use tts_studio::config::{ClientConfig, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECS};
use tts_studio::store::CatalogStore;
use tts_studio::views::{Choices, CloneView, GeneratorView, SettingsView};

/// Speech generation and voice cloning against an XTTS backend
#[derive(Parser, Debug)]
#[command(name = "tts-studio")]
#[command(author, version, about)]
struct Args {
    /// Backend base URL
    #[arg(long, global = true, env = "API_BASE_URL")]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "API_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List selectable speakers
    Speakers,

    /// List available models
    Models,

    /// Synthesize speech from text
    Generate {
        #[arg(short, long)]
        text: String,

        /// Speaker label or id (defaults to the first available)
        #[arg(short, long)]
        speaker: Option<String>,

        /// Model value (defaults to the first available)
        #[arg(short, long)]
        model: Option<String>,

        /// Save the audio to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Play the audio once it is ready
        #[arg(long)]
        play: bool,
    },

    /// Clone a voice from a sample and speak text with it
    Clone {
        /// Reference sample (wav, mp3 or m4a, at most 10MB)
        #[arg(long)]
        sample: PathBuf,

        #[arg(short, long)]
        text: String,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        play: bool,
    },

    /// Show and edit client settings
    Settings {
        #[arg(long)]
        model: Option<String>,

        /// Vocoder label or value
        #[arg(long)]
        vocoder: Option<String>,
    },

    /// Check that the backend is reachable
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .init();

    let config = config_from_args(&args)?;

    tracing::debug!("Backend: {} (timeout {:?})", config.api_base_url, config.timeout);

    let api = HttpApi::new(&config)?;
    let probe = HttpAudioProbe::new(api.http().clone());

    match args.command {
        Command::Speakers => {
            let mut store = CatalogStore::new();
            store.fetch_speakers(&api).await;
            if let Some(err) = store.error() {
                anyhow::bail!("{}", err);
            }
            match Choices::from_slice(store.speakers(), "No speakers available") {
                Choices::Available(speakers) => {
                    println!("Available speakers:");
                    for s in speakers {
                        println!("  - {} ({})", s.desc, s.name);
                    }
                }
                Choices::Unavailable(msg) => println!("{}", msg),
            }
        }

        Command::Models => {
            let mut store = CatalogStore::new();
            store.fetch_models(&api).await;
            if let Some(err) = store.error() {
                anyhow::bail!("{}", err);
            }
            println!("Available models:");
            for m in store.models() {
                println!("  - {} ({})", m.label, m.value);
            }
        }

        Command::Generate {
            text,
            speaker,
            model,
            output,
            play,
        } => {
            let mut store = CatalogStore::new();
            let mut view = GeneratorView::new();
            view.mount(&mut store, &api).await;
            if let Some(err) = store.error() {
                tracing::warn!("{}", err);
            }
            if let Choices::Unavailable(msg) = view.speaker_choices(&store) {
                anyhow::bail!("{}", msg);
            }
            if let Choices::Unavailable(msg) = view.model_choices(&store) {
                anyhow::bail!("{}", msg);
            }

            if let Some(speaker) = speaker {
                view.select_speaker(speaker);
            }
            if let Some(model) = model {
                view.select_model(model);
            }
            view.set_text(text);

            match view.generate(&store, &api, &probe).await {
                Ok(result) => {
                    println!("✓ Generated {}", result.file_name);
                    println!("  {}", result.audio_url);
                    deliver(&api, &result.audio_url, output.as_deref(), play).await?;
                }
                Err(_) => anyhow::bail!("{}", view.error().unwrap_or("Speech generation failed")),
            }
        }

        Command::Clone {
            sample,
            text,
            output,
            play,
        } => {
            let mut view = CloneView::new();
            if view.choose_sample(&sample).await.is_err() {
                anyhow::bail!("{}", view.error().unwrap_or("Invalid sample"));
            }
            view.set_text(text);

            match view.clone_voice(&api, &probe).await {
                Ok(audio) => {
                    println!("✓ Cloned voice saved on server at {}", audio.file_path);
                    println!("  {}", audio.audio_url);
                    deliver(&api, &audio.audio_url, output.as_deref(), play).await?;
                }
                Err(_) => anyhow::bail!("{}", view.error().unwrap_or("Voice clone failed")),
            }
        }

        Command::Settings { model, vocoder } => {
            let mut view = SettingsView::new(&config);
            if let Some(model) = model {
                view.set_default_model(model);
            }
            if let Some(vocoder) = vocoder {
                view.select_vocoder(&vocoder)?;
            }

            println!("API URL:       {}", view.api_url());
            println!("Default model: {}", view.default_model());
            println!("Vocoder:       {} ({})", view.vocoder().label, view.vocoder().value);
            println!("Available vocoders:");
            for v in view.vocoders() {
                println!("  - {} ({})", v.label, v.value);
            }
            println!("{}", view.save());
        }

        Command::Ping => {
            let mut view = SettingsView::new(&config);
            let outcome = view.test_connection(&api).await;
            println!("{}", view.status().unwrap_or_default());
            outcome?;
        }
    }

    Ok(())
}

/// clap has already merged flags over `API_BASE_URL` / `API_TIMEOUT_SECS`,
/// so the environment is not consulted again here.
fn config_from_args(args: &Args) -> Result<ClientConfig, tts_studio::ClientError> {
    ClientConfig::new(
        args.api_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        Duration::from_secs(args.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    )
}

async fn deliver(api: &HttpApi, url: &str, output: Option<&Path>, play: bool) -> anyhow::Result<()> {
    if let Some(path) = output {
        audio::download(api.http(), url, path).await?;
        println!("✓ Saved to {}", path.display());
    }

    if play {
        play_url(api, url).await?;
    }

    Ok(())
}

#[cfg(feature = "audio-playback")]
async fn play_url(api: &HttpApi, url: &str) -> anyhow::Result<()> {
    let (bytes, _) = audio::fetch_audio(api.http(), url).await?;
    let url = url.to_string();
    tokio::task::spawn_blocking(move || audio::play(&url, bytes)).await??;
    Ok(())
}

#[cfg(not(feature = "audio-playback"))]
async fn play_url(_api: &HttpApi, _url: &str) -> anyhow::Result<()> {
    tracing::warn!("Built without the audio-playback feature; use --output to save the file");
    Ok(())
}

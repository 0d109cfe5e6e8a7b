use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{CaptureSource, ImageCapture, ImageFile};
use image_generation::{
    banner_prompt, decode_data_url, BannerImageGenerator, GeminiConfig, GeminiImageGenerator,
    GenerationRequest, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
use storage::BannerStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "S/")]
    currency_prefix: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one banner image from local photos, without the server.
    Generate {
        #[arg(long)]
        title: String,
        #[arg(long)]
        price: String,
        #[arg(long, default_value = "banner.png")]
        out: PathBuf,
        /// Falls back to GEMINI_API_KEY, then API_KEY.
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Print the prompt sent alongside the photos.
    Prompt {
        #[arg(long)]
        title: String,
        #[arg(long)]
        price: String,
    },
    /// Print the demo banners as JSON.
    DemoBanners,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            title,
            price,
            out,
            api_key,
            model,
            base_url,
            images,
        } => {
            let price = client_core::parse_price(&price)?;
            let api_key = api_key
                .or_else(|| std::env::var("GEMINI_API_KEY").ok())
                .or_else(|| std::env::var("API_KEY").ok())
                .context("no API key: pass --api-key or set GEMINI_API_KEY")?;

            let mut capture = ImageCapture::new();
            for path in &images {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("failed to read '{}'", path.display()))?;
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let file = ImageFile::new(filename, None, bytes);
                if capture.add_files(CaptureSource::Picker, [file]) == 0 {
                    info!(path = %path.display(), "skipping non-image file");
                }
            }
            if capture.is_empty() {
                bail!("none of the given files is an image");
            }
            for file in capture.files() {
                info!(
                    filename = %file.filename,
                    mime_type = %file.effective_mime_type(),
                    "using photo"
                );
            }

            let generator = GeminiImageGenerator::new(GeminiConfig {
                api_key,
                model,
                base_url,
                currency_prefix: cli.currency_prefix,
            })?;
            let image_data = generator
                .generate(GenerationRequest {
                    title,
                    price,
                    images: capture.source_images(),
                })
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message()))?;

            let (mime_type, bytes) =
                decode_data_url(&image_data).context("generator returned an unreadable image")?;
            tokio::fs::write(&out, &bytes)
                .await
                .with_context(|| format!("failed to write '{}'", out.display()))?;
            println!("wrote {} ({mime_type}, {} bytes)", out.display(), bytes.len());
        }
        Command::Prompt { title, price } => {
            let price = client_core::parse_price(&price)?;
            println!("{}", banner_prompt(&title, price, &cli.currency_prefix));
        }
        Command::DemoBanners => {
            let store = BannerStore::with_demo_banners();
            println!("{}", serde_json::to_string_pretty(store.list())?);
        }
    }

    Ok(())
}

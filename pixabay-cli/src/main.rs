//! Pixabay command line client
//!
//! Searches images or videos and downloads image results.
//!
//! The API key is read from `--api-key`, `PIXABAY_API_KEY`, or the
//! `[client]` section of the config file, in that order.

mod logging;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};

use pixabay_client::{
    file_name_from_url, Config, Downloader, ImageApi, ImageSearchParams, SearchParams, SearchVariant, VideoApi,
    VideoSearchParams,
};

/// Largest number of images a single `download` run fetches.
const MAX_DOWNLOADS: u32 = 20;

#[derive(Parser, Debug)]
#[command(name = "pixabay")]
#[command(about = "Search and download Pixabay images and videos", long_about = None)]
struct Cli {
    /// Pixabay API key
    #[arg(long, env = "PIXABAY_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Config file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search images and print the 180px URL of every hit
    Images(ImageArgs),
    /// Search videos and print the medium rendition URL of every hit
    Videos(VideoArgs),
    /// Search images and save the large version of every hit
    Download(DownloadArgs),
}

/// Flags shared by image and video searches.
#[derive(Args, Debug, Default)]
struct SearchArgs {
    /// Free-text query (at most 100 characters)
    #[arg(long, short)]
    query: Option<String>,

    /// Search language (ISO 639-1)
    #[arg(long)]
    lang: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    min_width: Option<u32>,

    #[arg(long)]
    min_height: Option<u32>,

    /// Only Editor's Choice results
    #[arg(long)]
    editors_choice: Option<bool>,

    #[arg(long)]
    safe_search: Option<bool>,

    /// popular or latest
    #[arg(long)]
    order: Option<String>,

    #[arg(long)]
    page: Option<u32>,

    /// Results per page (3 to 100)
    #[arg(long)]
    per_page: Option<u32>,

    /// Extra parameter as KEY=VALUE, resolved with loose key matching
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    params: Vec<(String, Value)>,
}

#[derive(Args, Debug, Default)]
struct ImageFlags {
    /// all, photo, illustration or vector
    #[arg(long)]
    image_type: Option<String>,

    /// all, horizontal or vertical
    #[arg(long)]
    orientation: Option<String>,

    /// Color filter, repeatable
    #[arg(long = "color")]
    colors: Vec<String>,
}

#[derive(Args, Debug)]
struct ImageArgs {
    #[command(flatten)]
    search: SearchArgs,

    #[command(flatten)]
    image: ImageFlags,
}

#[derive(Args, Debug)]
struct VideoArgs {
    #[command(flatten)]
    search: SearchArgs,

    /// all, film or animation
    #[arg(long)]
    video_type: Option<String>,
}

#[derive(Args, Debug)]
struct DownloadArgs {
    /// Existing directory the images are written to
    destination: PathBuf,

    /// Number of images to download (at most 20)
    #[arg(long, default_value_t = MAX_DOWNLOADS)]
    count: u32,

    #[command(flatten)]
    search: SearchArgs,

    #[command(flatten)]
    image: ImageFlags,
}

/// Parse `KEY=VALUE`. The value is read as JSON when possible, so
/// `page=2` is a number and `colors=["red","blue"]` a list; anything else
/// is kept as a string.
fn parse_key_value(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

impl SearchArgs {
    /// Apply the loose `--param` entries, then the typed flags on top.
    fn build<V: SearchVariant>(&self) -> Result<SearchParams<V>> {
        let mut search = SearchParams::<V>::from_map(self.params.iter().map(|(k, v)| (k.as_str(), v.clone())))?;

        if let Some(query) = &self.query {
            search = search.query(query.as_str());
        }
        if let Some(lang) = &self.lang {
            search = search.lang(lang);
        }
        if let Some(category) = &self.category {
            search = search.category(category);
        }
        if let Some(min_width) = self.min_width {
            search = search.min_width(min_width);
        }
        if let Some(min_height) = self.min_height {
            search = search.min_height(min_height);
        }
        if let Some(editors_choice) = self.editors_choice {
            search = search.editors_choice(editors_choice);
        }
        if let Some(safe_search) = self.safe_search {
            search = search.safe_search(safe_search);
        }
        if let Some(order) = &self.order {
            search = search.order(order);
        }
        if let Some(page) = self.page {
            search = search.page(page);
        }
        if let Some(per_page) = self.per_page {
            search = search.per_page(per_page);
        }
        Ok(search)
    }
}

impl ImageFlags {
    fn apply(&self, mut search: ImageSearchParams) -> ImageSearchParams {
        if let Some(image_type) = &self.image_type {
            search = search.image_type(image_type);
        }
        if let Some(orientation) = &self.orientation {
            search = search.orientation(orientation);
        }
        if !self.colors.is_empty() {
            search = search.colors(&self.colors);
        }
        search
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if let Some(format) = &cli.log_format {
        config.logging.format.clone_from(format);
    }
    if cli.api_key.is_some() {
        config.client.api_key.clone_from(&cli.api_key);
    }

    logging::init_logging(&config.logging)?;
    debug!(client = ?config.client, "Configuration loaded");

    match cli.command {
        Command::Images(args) => {
            let search = args.image.apply(args.search.build()?);
            let api = ImageApi::with_config(&config.client)?;
            let page = api.fetch(&search).await?;

            println!("Total: {}, accessible: {}", page.total, page.total_hits);
            for image in page.images() {
                println!("{}", image.url_for_size_180());
            }
        }
        Command::Videos(args) => {
            let mut search: VideoSearchParams = args.search.build()?;
            if let Some(video_type) = &args.video_type {
                search = search.video_type(video_type);
            }
            let api = VideoApi::with_config(&config.client)?;
            let page = api.fetch(&search).await?;

            println!("Total: {}, accessible: {}", page.total, page.total_hits);
            for video in page.videos() {
                println!("{}", video.medium().url);
            }
        }
        Command::Download(args) => {
            if !args.destination.is_dir() {
                bail!(
                    "Supplied destination is not a directory: {}",
                    args.destination.display()
                );
            }
            let count = args.count.min(MAX_DOWNLOADS);
            if count == 0 {
                return Ok(());
            }

            let search = args
                .image
                .apply(args.search.build()?)
                .per_page(count.max(pixabay_client::params::PER_PAGE_MIN as u32));
            let api = ImageApi::with_config(&config.client)?;
            let page = api.fetch(&search).await?;

            let downloader = Downloader::with_config(&config.client)?;
            let images: Vec<_> = page.images().iter().take(count as usize).collect();
            let total = images.len();
            for (i, image) in images.into_iter().enumerate() {
                let name = file_name_from_url(&image.preview_url).unwrap_or_else(|| format!("{}.jpg", image.id));
                println!("{:3} / {:3}, {name}", i + 1, total);
                download_one(&downloader, &image.large_image_url, &args.destination.join(&name)).await?;
            }
            info!(count = total, destination = %args.destination.display(), "Download finished");
        }
    }

    Ok(())
}

/// Load configuration. A config file named on the command line must exist.
fn load_config(path: Option<&str>) -> Result<Config> {
    if let Some(path) = path {
        if !Path::new(path).is_file() {
            bail!("Config file not found: {path}");
        }
    }
    Config::load(path).context("Failed to load configuration")
}

async fn download_one(downloader: &Downloader, url: &str, path: &Path) -> Result<()> {
    downloader
        .download_to(url, path)
        .await
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

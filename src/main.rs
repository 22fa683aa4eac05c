use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};

use feedlet::config::Config;
use feedlet::feed::{self, FeedRecord, FetchOutcome};
use feedlet::storage::FeedStore;

/// Feeds fetched at the same time during `refresh`
const MAX_CONCURRENT_FETCHES: usize = 8;

/// Get the config directory path (~/.config/feedlet/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("feedlet"))
}

#[derive(Parser, Debug)]
#[command(name = "feedlet", about = "Minimal RSS reader")]
struct Args {
    /// Config file (defaults to ~/.config/feedlet/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a local feed document and print what was extracted
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Fetch every configured feed and update the store
    Refresh,
    /// Find the RSS/Atom feed advertised by a web page
    Discover {
        /// Page URL (a direct feed URL is printed back unchanged)
        url: String,
    },
    /// List stored entries
    List {
        /// Only this feed
        url: Option<String>,
    },
    /// Mark an entry (by index) or all entries of a feed as read
    Mark {
        url: String,
        /// Entry index, or "all"
        target: String,
        /// Mark as unread instead
        #[arg(long)]
        unread: bool,
    },
}

/// Which entries a `mark` command applies to.
#[derive(Debug, PartialEq, Eq)]
enum MarkTarget {
    All,
    Index(usize),
}

impl MarkTarget {
    fn parse(raw: &str) -> Result<Self> {
        if raw.eq_ignore_ascii_case("all") {
            return Ok(MarkTarget::All);
        }
        raw.parse()
            .map(MarkTarget::Index)
            .with_context(|| format!("Expected an entry index or \"all\", got '{raw}'"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    run(Args::parse()).await
}

async fn run(args: Args) -> Result<()> {
    // Only `parse` works without HOME or a valid config.
    let settings = || load_settings(args.config.as_deref());
    match args.command {
        Command::Parse { file } => parse_file(&file),
        Command::Refresh => {
            let (config, store_path) = settings()?;
            refresh(&config, &store_path).await
        }
        Command::Discover { url } => {
            let (config, _) = settings()?;
            discover(&config, &url).await
        }
        Command::List { url } => {
            let (_, store_path) = settings()?;
            list(&store_path, url.as_deref())
        }
        Command::Mark {
            url,
            target,
            unread,
        } => {
            let target = MarkTarget::parse(&target)?;
            let (_, store_path) = settings()?;
            mark(&store_path, &url, target, !unread)
        }
    }
}

/// Loads the config and resolves the store path.
///
/// HOME is only consulted for whichever of the two is not given explicitly.
fn load_settings(config_arg: Option<&Path>) -> Result<(Config, PathBuf)> {
    let config_path = match config_arg {
        Some(path) => path.to_path_buf(),
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    let store_path = match &config.store_path {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("feeds.json"),
    };
    Ok((config, store_path))
}

fn parse_file(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read feed file: {}", path.display()))?;
    let record = feed::parse_feed(Some(&content))
        .with_context(|| format!("Failed to parse feed file: {}", path.display()))?;
    print_feed(&record);
    Ok(())
}

async fn refresh(config: &Config, store_path: &Path) -> Result<()> {
    if config.feeds.is_empty() {
        eprintln!("No feeds configured. Add a `feeds = [...]` list to your config.toml.");
        return Ok(());
    }

    let mut store = FeedStore::load(store_path).context("Failed to load feed store")?;
    let client = http_client(config)?;
    let options = config.fetch_options();

    let markers: Vec<(String, Option<String>)> = config
        .feeds
        .iter()
        .map(|url| {
            let marker = store.get(url).and_then(|r| r.last_fetch.clone());
            (url.clone(), marker)
        })
        .collect();

    let results: Vec<_> = stream::iter(markers)
        .map(|(url, marker)| {
            let client = &client;
            let options = &options;
            async move {
                let outcome = feed::fetch_feed(client, &url, marker.as_deref(), options).await;
                (url, outcome)
            }
        })
        .buffer_unordered(MAX_CONCURRENT_FETCHES)
        .collect()
        .await;

    let mut failed = 0;
    for (url, outcome) in results {
        match outcome {
            Ok(FetchOutcome::NotModified) => {
                println!("{url}: not modified");
            }
            Ok(FetchOutcome::Fetched {
                body,
                last_modified,
            }) => match feed::parse_feed(Some(&body)) {
                Ok(mut record) => {
                    record.last_fetch = Some(last_modified.unwrap_or_else(http_date_now));
                    println!("{url}: {} entries", record.entries.len());
                    store.upsert(&url, record);
                }
                Err(e) => {
                    tracing::warn!(feed = %url, error = %e, "Failed to parse feed");
                    eprintln!("{url}: {e}");
                    failed += 1;
                }
            },
            Err(e) => {
                tracing::warn!(feed = %url, error = %e, "Failed to fetch feed");
                eprintln!("{url}: {e}");
                failed += 1;
            }
        }
    }

    store.save(store_path).context("Failed to save feed store")?;
    if failed > 0 {
        eprintln!("{failed} feed(s) failed to refresh");
    }
    Ok(())
}

fn http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .build()
        .context("Failed to build HTTP client")
}

async fn discover(config: &Config, url: &str) -> Result<()> {
    let client = http_client(config)?;
    let feed_url = feed::discover(&client, url, &config.fetch_options())
        .await
        .with_context(|| format!("Failed to discover a feed at {url}"))?;
    println!("{feed_url}");
    Ok(())
}

fn list(store_path: &Path, url: Option<&str>) -> Result<()> {
    let store = FeedStore::load(store_path).context("Failed to load feed store")?;

    let urls: Vec<&str> = match url {
        Some(url) => vec![url],
        None => store.urls().collect(),
    };

    for url in urls {
        let record = store
            .get(url)
            .with_context(|| format!("No stored feed for {url}"))?;
        println!("{url}");
        print_feed(record);
        println!();
    }
    Ok(())
}

fn mark(store_path: &Path, url: &str, target: MarkTarget, read: bool) -> Result<()> {
    let mut store = FeedStore::load(store_path).context("Failed to load feed store")?;
    let record = store
        .get_mut(url)
        .with_context(|| format!("No stored feed for {url}"))?;

    match target {
        MarkTarget::All => record.set_all_read(read),
        MarkTarget::Index(index) => {
            if !record.set_read(index, read) {
                anyhow::bail!(
                    "Entry index {index} out of range ({} entries)",
                    record.entries.len()
                );
            }
        }
    }

    store.save(store_path).context("Failed to save feed store")?;
    Ok(())
}

fn print_feed(record: &FeedRecord) {
    println!("{} <{}>", record.title, record.link);
    println!("{}", record.description);
    println!("{} unread of {}", record.unread_count(), record.entries.len());
    for (index, entry) in record.entries.iter().enumerate() {
        let marker = if entry.read { ' ' } else { '*' };
        println!("{index:>4} {marker} {} ({})", entry.title, entry.pub_date);
        println!("       {}", entry.link);
    }
}

/// Current time as an HTTP-date, used as the marker when a server sends no
/// `Last-Modified` header.
fn http_date_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_target_parse() {
        assert_eq!(MarkTarget::parse("all").unwrap(), MarkTarget::All);
        assert_eq!(MarkTarget::parse("ALL").unwrap(), MarkTarget::All);
        assert_eq!(MarkTarget::parse("3").unwrap(), MarkTarget::Index(3));
        assert!(MarkTarget::parse("-1").is_err());
        assert!(MarkTarget::parse("first").is_err());
    }

    #[test]
    fn test_http_date_format() {
        let date = http_date_now();
        assert!(date.ends_with(" GMT"));
        assert!(chrono::DateTime::parse_from_rfc2822(&date.replace("GMT", "+0000")).is_ok());
    }

    #[tokio::test]
    async fn test_parse_ignores_broken_config() {
        let dir = std::env::temp_dir().join("feedlet_main_test_parse");
        std::fs::create_dir_all(&dir).unwrap();
        let config = dir.join("config.toml");
        std::fs::write(&config, "feeds = [not valid toml").unwrap();
        let feed_file = dir.join("feed.xml");
        std::fs::write(&feed_file, "<rss><channel><title>T</title></channel></rss>").unwrap();

        let config = config.to_str().unwrap();
        let feed_file = feed_file.to_str().unwrap();

        let args =
            Args::try_parse_from(["feedlet", "--config", config, "parse", feed_file]).unwrap();
        assert!(run(args).await.is_ok());

        let args = Args::try_parse_from(["feedlet", "--config", config, "list"]).unwrap();
        assert!(run(args).await.is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_settings_uses_explicit_paths() {
        let dir = std::env::temp_dir().join("feedlet_main_test_settings");
        std::fs::create_dir_all(&dir).unwrap();
        let config = dir.join("config.toml");
        std::fs::write(&config, "store_path = \"/tmp/feedlet_store.json\"\n").unwrap();

        let (_, store_path) = load_settings(Some(&config)).unwrap();
        assert_eq!(store_path, PathBuf::from("/tmp/feedlet_store.json"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_args_parse_discover() {
        let args = Args::try_parse_from(["feedlet", "discover", "https://example.com"]).unwrap();
        assert!(matches!(args.command, Command::Discover { url } if url == "https://example.com"));
    }

    #[test]
    fn test_args_parse_mark() {
        let args = Args::try_parse_from(["feedlet", "mark", "https://a.test/rss", "all", "--unread"])
            .unwrap();
        match args.command {
            Command::Mark { url, target, unread } => {
                assert_eq!(url, "https://a.test/rss");
                assert_eq!(target, "all");
                assert!(unread);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

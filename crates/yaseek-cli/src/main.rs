mod console;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use console::ConsolePrinter;
use dialoguer::{theme::ColorfulTheme, Input};
use std::io;
use std::sync::Arc;
use tracing::{info, warn};
use yaseek_core::{AppConfig, CookieJar, FactMap, ResolverKind};
use yaseek_extract::SchemeExtractor;
use yaseek_scanner::{CrawlOutcome, Crawler, HttpFetcher, PatternHook, Router};
use yaseek_sites::SiteRegistry;

/// Collect public Yandex profile information starting from one identifier.
#[derive(Parser, Debug)]
#[command(name = "yaseek", version, about)]
struct Cli {
    /// Username, login or email to start from (prompted for when omitted)
    identifier: Option<String>,

    /// Field the identifier is filed under
    #[arg(default_value = "username")]
    id_type: String,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,yaseek=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    info!("Starting yaseek v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env().context("failed to load configuration")?;

    let raw = match cli.identifier {
        Some(identifier) => identifier,
        None => prompt_identifier()?,
    };
    let identifier = normalize_identifier(&raw);
    if identifier.is_empty() {
        bail!("identifier must not be empty");
    }

    let registry = SiteRegistry::builtin().context("failed to load site definitions")?;
    let cookies = load_cookies(&config);

    let mut router = Router::new();
    if let Some(pattern) = &config.crawl.username_pattern {
        let hook = PatternHook::new(pattern).context("invalid crawl.username_pattern")?;
        router = router.with_hook(ResolverKind::Username, hook);
    }

    let fetcher = HttpFetcher::new(&config.http).context("failed to set up HTTP client")?;
    let crawler = Crawler::new(
        Arc::new(registry),
        router,
        Arc::new(fetcher),
        Arc::new(SchemeExtractor::new()),
    )
    .with_max_depth(config.crawl.max_depth);

    let seed = FactMap::from_iter([(cli.id_type.as_str(), identifier)]);
    let mut printer = ConsolePrinter::new(io::stdout());
    let report = crawler.crawl(&seed, &cookies, &mut printer).await;

    let profile = report.profile();
    info!(
        fields = profile.len(),
        dispatched = report.dispatched(),
        "merged profile"
    );

    if report.dispatched() == 0 {
        println!(
            "{}",
            format!(
                "Nothing to look up: `{}` is not a supported identifier type or value.",
                cli.id_type
            )
            .yellow()
        );
    }

    if let CrawlOutcome::LimitExceeded { max_depth } = report.outcome {
        println!(
            "{}",
            format!("Stopped after reaching the discovery depth limit ({max_depth}).").yellow()
        );
    }

    Ok(())
}

fn prompt_identifier() -> Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter Yandex username / login / email")
        .interact_text()
        .context("failed to read identifier")
}

/// Cut an email down to its login part.
fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .split_once('@')
        .map_or(trimmed, |(login, _)| login)
        .to_string()
}

fn load_cookies(config: &AppConfig) -> CookieJar {
    let jar = match CookieJar::load(&config.cookies.path, config.cookies.strict) {
        Ok(jar) => jar,
        Err(e) => {
            warn!(error = %e, "continuing without cookies");
            CookieJar::empty()
        }
    };

    if jar.is_empty() {
        println!(
            "{}",
            "Cookies not found, but are required for some sites. Export them in Netscape format to cookies.txt or point YASEEK_COOKIES at the file."
                .yellow()
        );
    } else {
        info!(count = jar.len(), path = %config.cookies.path.display(), "loaded cookies");
    }

    jar
}

use chrono::Utc;
use clap::Parser;
use goal_crawl::classifier::HeuristicClassifier;
use goal_crawl::config::CrawlerSettings;
use goal_crawl::crawlers::resume;
use goal_crawl::utils::session_dir;
use goal_crawl::{Crawl, CrawlError, CrawlOutcome, WebDriverBrowser, close_session};
use std::process::ExitCode;
use std::sync::Arc;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => match CrawlerSettings::from_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                ::log::error!("Failed to load settings: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => CrawlerSettings::default(),
    };
    settings.apply_env();
    args.apply(&mut settings);

    // The classifier is scoped to the crawl's root page
    let (crawl, root_url) = match (&args.resume, &args.url) {
        (Some(dir), _) => match resume::build_from_dir(dir) {
            Ok(Some(state)) => (Crawl::resume(dir, settings.crawl.clone()), state.start_url),
            Ok(None) => {
                eprintln!("{}", CrawlError::ResumeUnavailable(dir.clone()));
                return ExitCode::FAILURE;
            }
            Err(e) => {
                ::log::error!("Failed to read {}: {}", dir.display(), e);
                return ExitCode::FAILURE;
            }
        },
        (None, Some(url)) => {
            let output_dir = session_dir(&settings.output_root, url, Utc::now());
            (Crawl::fresh(url, output_dir, settings.crawl.clone()), url.clone())
        }
        (None, None) => {
            ::log::error!("Either a start URL or --resume is required");
            return ExitCode::FAILURE;
        }
    };

    let classifier = match HeuristicClassifier::new(&root_url, &settings.scope) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            ::log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Note: crawling requires a WebDriver server (e.g., ChromeDriver).");
    let browser = match WebDriverBrowser::connect(&settings.webdriver_url).await {
        Ok(browser) => Arc::new(browser),
        Err(e) => {
            ::log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let output_dir = crawl.output_dir().to_path_buf();
    ::log::info!("Writing snapshots to {}", output_dir.display());

    let outcome = crawl.run(browser.clone(), classifier).await;
    close_session(browser.as_ref(), settings.crawl.session_close_timeout()).await;

    match outcome {
        Ok(CrawlOutcome::Completed(summary)) => {
            println!(
                "Crawled {} pages in {:.2} seconds into {}",
                summary.total_pages,
                summary.duration_ms as f64 / 1000.0,
                output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Ok(CrawlOutcome::AlreadyComplete { output_dir }) => {
            println!("Nothing left to crawl in {}", output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("Crawl aborted: {}", e);
            eprintln!("Crawl aborted: {}", e);
            if output_dir.join("pages").is_dir() {
                eprintln!("Pages crawled so far are kept in {}", output_dir.display());
                eprintln!("Resume with: goal-crawl --resume {}", output_dir.display());
            }
            ExitCode::FAILURE
        }
    }
}

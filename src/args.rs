use clap::Parser;
use goal_crawl::CrawlerSettings;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "goal-crawl")]
#[command(about = "Goal-directed web crawler with resumable on-disk snapshots")]
#[command(version)]
pub struct Args {
    /// Start URL of a fresh crawl
    #[arg(required_unless_present = "resume")]
    pub url: Option<String>,

    /// What the crawl is looking for, handed to the page classifier
    #[arg(short, long)]
    pub goal: Option<String>,

    /// Deepest level to visit (the start page is depth 0)
    #[arg(short = 'd', long)]
    pub max_depth: Option<u32>,

    /// Delay before each link visit, in milliseconds
    #[arg(long)]
    pub sleep_ms: Option<u64>,

    /// Directory under which the crawl's output directory is created
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Resume the interrupted crawl stored in this output directory
    #[arg(long, value_name = "DIR", conflicts_with = "url")]
    pub resume: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// WebDriver endpoint (defaults to WEBDRIVER_URL or http://localhost:4444)
    #[arg(long)]
    pub webdriver_url: Option<String>,
}

impl Args {
    /// Layer command-line overrides over the file settings
    pub fn apply(&self, settings: &mut CrawlerSettings) {
        if let Some(goal) = &self.goal {
            settings.crawl.goal = goal.clone();
        }
        if let Some(max_depth) = self.max_depth {
            settings.crawl.max_depth = max_depth;
        }
        if let Some(sleep_ms) = self.sleep_ms {
            settings.crawl.sleep_ms = sleep_ms;
        }
        if let Some(output) = &self.output {
            settings.output_root = output.clone();
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            settings.webdriver_url = webdriver_url.clone();
        }
    }
}

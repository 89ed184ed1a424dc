pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::PageSource;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "threadline")]
#[command(about = "Summarize discussion threads on Hacker News, Reddit and Quora", long_about = None)]
pub struct Cli {
    /// Load pages in headless Chrome so lazily rendered comments show up
    #[arg(long, global = true, conflicts_with = "html")]
    pub browser: bool,

    /// Read the page from a saved HTML file instead of fetching it
    #[arg(long, global = true, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Summary language (chinese, japanese, korean, quora, english)
    #[arg(long, global = true)]
    pub language: Option<String>,

    /// Summary length (short, medium, long)
    #[arg(long, global = true)]
    pub length: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show what kind of page a URL is
    Info {
        /// Page URL
        url: String,
    },
    /// List the top-level threads of a discussion
    Threads {
        /// Page URL
        url: String,
    },
    /// Summarize one top-level thread
    Thread {
        /// Page URL
        url: String,
        /// Id of the thread's root comment
        id: String,
        /// Print the prompt instead of calling the AI service
        #[arg(long)]
        prompt_only: bool,
        /// Also write the summary panel as HTML to this file
        #[arg(long, value_name = "FILE", conflicts_with = "prompt_only")]
        panel_out: Option<PathBuf>,
    },
    /// Summarize the main post and all of its threads
    Summarize {
        /// Page URL
        url: String,
        /// Print the prompt instead of calling the AI service
        #[arg(long)]
        prompt_only: bool,
        /// Also write the summary panel as HTML to this file
        #[arg(long, value_name = "FILE", conflicts_with = "prompt_only")]
        panel_out: Option<PathBuf>,
    },
    /// Answer JSON requests from stdin, one per line
    Session {
        /// Page URL
        url: String,
    },
}

impl Cli {
    pub fn page_source(&self) -> PageSource {
        match (&self.html, self.browser) {
            (Some(path), _) => PageSource::File(path.clone()),
            (None, true) => PageSource::Chrome,
            (None, false) => PageSource::Http,
        }
    }

    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref language) = self.language {
            config.summary.language = language.clone();
        }
        if let Some(ref length) = self.length {
            config.summary.summary_length = length.clone();
        }
    }
}

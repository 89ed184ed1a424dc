//! # Threadline
//!
//! Discussion-thread summaries for Hacker News, Reddit and Quora.
//!
//! ## Architecture
//!
//! ```text
//! PageLoader → LivePage → SiteAdapter → ContentFormatter → Summarizer → Panel
//! ```
//!
//! - [`page`]: page snapshots, waiting primitives and side-effect drivers
//! - [`sites`]: per-platform extraction into the common thread model
//! - [`formatter`]: turns threads into summarization prompts
//! - [`summarizer`]: the chat-completions client
//! - [`session`]: one page view, its panel and the message protocol
//!
//! ## Quick Start
//!
//! ```bash
//! # What is this page?
//! threadline info https://news.ycombinator.com/item?id=1
//!
//! # List top-level threads, rendering the page in Chrome first
//! threadline --browser threads https://www.reddit.com/r/rust/comments/abc/x/
//!
//! # Print the prompt for one thread without calling the AI service
//! threadline thread https://news.ycombinator.com/item?id=1 2 --prompt-only
//!
//! # Summarize the whole discussion in English
//! threadline --language english summarize https://news.ycombinator.com/item?id=1
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) wires configuration, the page loader
/// and the summarizer together.
pub mod app;

/// Command-line interface using clap.
///
/// - `info <url>` - Page kind, platform and title
/// - `threads <url>` - Top-level threads
/// - `thread <url> <id> [--prompt-only]` - Summarize one thread
/// - `summarize <url> [--prompt-only]` - Summarize the whole discussion
/// - `session <url>` - JSON requests on stdin, responses on stdout
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/threadline/config.toml`:
/// - `[summary]` endpoint, credentials, language and length
/// - `[browser]` headless Chrome settings
pub mod config;

/// Core domain models.
///
/// - [`Comment`](domain::Comment) and [`Thread`](domain::Thread)
/// - [`DiscussionContent`](domain::DiscussionContent): main post plus threads
/// - [`SummaryRecord`](domain::SummaryRecord): a cached summary
pub mod domain;

/// Prompt construction per platform.
pub mod formatter;

/// The document a session reads from.
pub mod page;

/// Page lifecycle, sidebar panel and the request/response protocol.
pub mod session;

/// Site adapters and the host registry.
pub mod sites;

/// Summarization client.
///
/// - [`Summarizer`](summarizer::Summarizer): async trait used by sessions
/// - [`SummaryClient`](summarizer::SummaryClient): OpenAI-style POST over reqwest
pub mod summarizer;

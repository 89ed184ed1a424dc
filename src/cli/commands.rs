use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::app::{AppContext, Result, ThreadlineError};
use crate::domain::Thread;
use crate::formatter::formatter_for;
use crate::session::Session;

const PREVIEW_CHARS: usize = 60;

pub async fn show_info(ctx: &AppContext, url: &str) -> Result<()> {
    let open = ctx.open(url).await?;
    let info = open.session.page_info();

    println!("{}", info.title);
    println!("  platform: {}", open.session.adapter().platform());
    println!("  page:     {}", if info.is_discussion { "discussion" } else { "listing" });
    println!("  url:      {}", info.url);
    println!(
        "  ai:       {}",
        if ctx.config.summary.is_configured() { "configured" } else { "not configured" }
    );
    if info.is_discussion {
        println!(
            "  threads:  {}",
            open.session.adapter().top_level_comments().len()
        );
    }

    open.session.destroy().await;
    Ok(())
}

pub async fn list_threads(ctx: &AppContext, url: &str) -> Result<()> {
    let open = ctx.open(url).await?;
    let adapter = open.session.adapter();

    if !adapter.is_discussion_page() {
        println!("Not a discussion page");
        open.session.destroy().await;
        return Ok(());
    }

    let content = adapter.page_content().await?;
    if content.threads.is_empty() {
        println!("No threads");
    }
    for thread in &content.threads {
        println!("{}", thread_line(thread));
    }

    open.session.destroy().await;
    Ok(())
}

pub async fn summarize_thread(
    ctx: &AppContext,
    url: &str,
    id: &str,
    prompt_only: bool,
    panel_out: Option<&Path>,
) -> Result<()> {
    let open = ctx.open(url).await?;

    if prompt_only {
        println!("{}", thread_prompt(&open.session, id).await?);
    } else {
        let result = open.session.summarize_thread_by_id(id).await;
        report(&open.session, result.map(|_| ()), panel_out).await?;
    }

    open.session.destroy().await;
    Ok(())
}

pub async fn summarize_page(
    ctx: &AppContext,
    url: &str,
    prompt_only: bool,
    panel_out: Option<&Path>,
) -> Result<()> {
    let open = ctx.open(url).await?;

    if prompt_only {
        println!("{}", page_prompt(&open.session).await?);
    } else {
        let result = open.session.summarize_page().await;
        report(&open.session, result.map(|_| ()), panel_out).await?;
    }

    open.session.destroy().await;
    Ok(())
}

/// Answers requests from stdin until it closes.
pub async fn run_session(ctx: &AppContext, url: &str) -> Result<()> {
    let open = ctx.open(url).await?;
    info!("Serving requests for {}", url);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let handled = serve(&open.session, stdin, &mut stdout).await?;
    debug!("Handled {} requests", handled);

    open.session.destroy().await;
    Ok(())
}

/// Writes one JSON response line per non-blank request line.
pub async fn serve<R, W>(session: &Session, input: R, output: &mut W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = session.handle_message(&line).await;
        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        output.write_all(encoded.as_bytes()).await?;
        output.flush().await?;
        handled += 1;
    }
    Ok(handled)
}

/// The exact prompt a thread summary would send.
pub async fn thread_prompt(session: &Session, id: &str) -> Result<String> {
    let adapter = session.adapter();
    let handle = adapter
        .thread_root(id)
        .ok_or_else(|| ThreadlineError::Extraction(format!("No thread contains comment {id}")))?;
    let thread = adapter.parse_comment_thread(&handle).await?;
    Ok(formatter_for(adapter.platform()).format_thread(&thread, &adapter.title()))
}

/// The exact prompt a page summary would send.
pub async fn page_prompt(session: &Session) -> Result<String> {
    let adapter = session.adapter();
    let content = adapter.page_content().await?;
    Ok(formatter_for(adapter.platform()).format_discussion(&content))
}

/// Prints the panel, and also writes its HTML when `panel_out` is given.
async fn report(session: &Session, result: Result<()>, panel_out: Option<&Path>) -> Result<()> {
    match result {
        Ok(()) => {
            let (text, html) = {
                let panel = session.panel();
                (panel.render_text(), panel.render_html())
            };
            print!("{}", text);
            if let Some(path) = panel_out {
                tokio::fs::write(path, html).await?;
                info!("Wrote panel to {}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Err(e)
        }
    }
}

fn thread_line(thread: &Thread) -> String {
    let marker = if thread.is_low_confidence() { "?" } else { " " };
    format!(
        "{} {:<14} {:<20} {:>3} replies  {}",
        marker,
        thread.id,
        thread.root.author,
        thread.reply_count(),
        preview(&thread.root.text)
    )
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

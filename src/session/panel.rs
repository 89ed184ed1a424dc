use std::collections::HashMap;

use html_escape::encode_text;

use crate::domain::SummaryRecord;
use crate::session::markdown::render_markdown;
use crate::sites::AFFORDANCE_LABEL;

/// State of the summarize control on one comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AffordanceState {
    #[default]
    Idle,
    Pending,
    Done,
    Failed,
}

impl AffordanceState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => AFFORDANCE_LABEL,
            Self::Pending => "Summarizing...",
            Self::Done => "TL;DR ✓",
            Self::Failed => "TL;DR (error)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelStatus {
    #[default]
    Idle,
    Loading(String),
    Error(String),
}

#[derive(Debug, Clone)]
struct MainSummary {
    title: String,
    thread_count: usize,
    record: SummaryRecord,
}

/// The sidebar: visibility, status, the main summary and per-thread
/// summaries, plus the summary cache keyed by id.
#[derive(Debug, Default)]
pub struct Panel {
    visible: bool,
    status: PanelStatus,
    main: Option<MainSummary>,
    /// Most recent first, one entry per id.
    threads: Vec<SummaryRecord>,
    cache: HashMap<String, SummaryRecord>,
    affordances: HashMap<String, AffordanceState>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Flips visibility and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn status(&self) -> &PanelStatus {
        &self.status
    }

    pub fn set_loading(&mut self, message: impl Into<String>) {
        self.status = PanelStatus::Loading(message.into());
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = PanelStatus::Error(message.into());
    }

    pub fn set_main(&mut self, title: impl Into<String>, thread_count: usize, record: SummaryRecord) {
        self.cache.insert(record.id.clone(), record.clone());
        self.main = Some(MainSummary {
            title: title.into(),
            thread_count,
            record,
        });
        self.status = PanelStatus::Idle;
    }

    pub fn main_summary(&self) -> Option<&SummaryRecord> {
        self.main.as_ref().map(|m| &m.record)
    }

    /// Adds or replaces a thread summary and moves it to the top.
    pub fn upsert_thread(&mut self, record: SummaryRecord) {
        self.threads.retain(|r| r.id != record.id);
        self.cache.insert(record.id.clone(), record.clone());
        self.threads.insert(0, record);
    }

    pub fn thread_summaries(&self) -> &[SummaryRecord] {
        &self.threads
    }

    pub fn cached(&self, id: &str) -> Option<&SummaryRecord> {
        self.cache.get(id)
    }

    pub fn set_affordance(&mut self, id: &str, state: AffordanceState) {
        self.affordances.insert(id.to_string(), state);
    }

    pub fn affordance(&self, id: &str) -> AffordanceState {
        self.affordances.get(id).copied().unwrap_or_default()
    }

    /// Drops every summary and control state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn render_html(&self) -> String {
        let mut html = String::from(
            "<div class=\"threadline-sidebar\">\n\
             <div class=\"threadline-sidebar-header\"><h2>Discussion Summary</h2></div>\n\
             <div class=\"threadline-sidebar-content\">\n",
        );

        match &self.status {
            PanelStatus::Loading(message) => html.push_str(&format!(
                "<div class=\"threadline-loading\"><p>{}</p></div>\n",
                encode_text(message)
            )),
            PanelStatus::Error(message) => html.push_str(&format!(
                "<div class=\"threadline-error\"><p>{}</p></div>\n",
                encode_text(message)
            )),
            PanelStatus::Idle => {}
        }

        if let Some(main) = &self.main {
            html.push_str(&format!(
                "<div class=\"threadline-summary-card\">\n<h3>{}</h3>\n\
                 <div class=\"threadline-meta\">{} comments in total</div>\n\
                 <div class=\"markdown-body\">\n{}\n</div>\n</div>\n",
                encode_text(&main.title),
                main.thread_count,
                render_markdown(&main.record.summary_text)
            ));
        }

        if !self.threads.is_empty() {
            html.push_str("<h4>Thread Summaries</h4>\n");
            for record in &self.threads {
                html.push_str(&format!(
                    "<div class=\"threadline-thread-summary\" data-thread-id=\"{}\">\n\
                     <span class=\"threadline-thread-author\">{}</span> \
                     <span class=\"threadline-thread-replies\">{} replies</span>\n\
                     <div class=\"markdown-body\">\n{}\n</div>\n</div>\n",
                    html_escape::encode_double_quoted_attribute(&record.id),
                    encode_text(&record.author),
                    record.reply_count,
                    render_markdown(&record.summary_text)
                ));
            }
        }

        html.push_str("</div>\n</div>\n");
        html
    }

    /// Plain text view for terminals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        match &self.status {
            PanelStatus::Loading(message) => out.push_str(&format!("… {message}\n")),
            PanelStatus::Error(message) => out.push_str(&format!("! {message}\n")),
            PanelStatus::Idle => {}
        }
        if let Some(main) = &self.main {
            out.push_str(&format!(
                "== {} ({} comments) ==\n{}\n",
                main.title, main.thread_count, main.record.summary_text
            ));
        }
        for record in &self.threads {
            out.push_str(&format!(
                "\n-- {} {} by {} ({} replies) --\n{}\n",
                record.kind.as_str(),
                record.id,
                record.author,
                record.reply_count,
                record.summary_text
            ));
        }
        out
    }
}

use matcher_core::{
    AppViewModel, IngestStatus, MatchResult, ProgressPhase, ProgressView, SearchPhase, Tab,
    NO_MATCHES_TEXT,
};

use super::constants::PROGRESS_BAR_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Tab strip plus the form of the active tab.
    Form,
    Results,
    Ingest,
    Progress,
}

pub const ALL_SECTIONS: &[Section] = &[
    Section::Form,
    Section::Results,
    Section::Ingest,
    Section::Progress,
];

/// Re-renders sections and yields only the ones whose text changed.
pub struct Renderer {
    sections: &'static [Section],
    last: Vec<Vec<String>>,
}

impl Renderer {
    pub fn new(sections: &'static [Section]) -> Self {
        Self {
            sections,
            last: vec![Vec::new(); sections.len()],
        }
    }

    pub fn frame(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut out = Vec::new();
        for (slot, section) in self.last.iter_mut().zip(self.sections) {
            let lines = render_section(*section, view);
            if lines != *slot {
                out.extend(lines.iter().cloned());
                *slot = lines;
            }
        }
        out
    }
}

pub fn render_section(section: Section, view: &AppViewModel) -> Vec<String> {
    match section {
        Section::Form => render_form(view),
        Section::Results => render_results(view),
        Section::Ingest => render_ingest_status(view),
        Section::Progress => render_progress(&view.progress),
    }
}

fn render_form(view: &AppViewModel) -> Vec<String> {
    let tabs = match view.active_tab {
        Tab::Search => "[ Search Researchers ]   Ingest University",
        Tab::Ingest => "  Search Researchers   [ Ingest University ]",
    };
    let mut lines = vec![tabs.to_string()];
    match view.active_tab {
        Tab::Search => {
            lines.push(format!("  Profile: {}", display_or_dash(&view.profile_text)));
            lines.push(format!("  Max papers: {}", view.limit_label));
            lines.push(format!("  Min similarity: {}", view.score_label));
        }
        Tab::Ingest => {
            lines.push(format!("  University: {}", display_or_dash(&view.university)));
            lines.push(format!("  Directory URL: {}", display_or_dash(&view.dept_url)));
        }
    }
    lines
}

fn render_results(view: &AppViewModel) -> Vec<String> {
    match &view.search.phase {
        SearchPhase::Idle => Vec::new(),
        SearchPhase::Loading => vec!["Searching...".to_string()],
        SearchPhase::NoMatches => vec![NO_MATCHES_TEXT.to_string()],
        SearchPhase::Failed(message) => vec![format!("Error: {message}")],
        SearchPhase::Results => view.search.results.iter().flat_map(render_match).collect(),
    }
}

fn render_match(result: &MatchResult) -> Vec<String> {
    let mut header = format!("* {} | {}", result.professor, result.university);
    if let Some(email) = result.email.as_deref().filter(|email| !email.is_empty()) {
        header.push_str(&format!(" | {email}"));
    }
    header.push_str(&format!("  SCORE {:.2}", result.max_score));

    let mut lines = vec![header];
    for paper in &result.papers {
        let year = paper
            .year
            .map_or_else(|| "n/a".to_string(), |year| year.to_string());
        lines.push(format!("    - {}", paper.title));
        match paper.url.as_deref() {
            Some(url) => lines.push(format!(
                "      Year: {year} | Similarity: {:.4} | {url}",
                paper.score
            )),
            None => lines.push(format!(
                "      Year: {year} | Similarity: {:.4}",
                paper.score
            )),
        }
    }
    lines
}

fn render_ingest_status(view: &AppViewModel) -> Vec<String> {
    match &view.ingest_status {
        IngestStatus::Idle => Vec::new(),
        IngestStatus::Triggering => vec!["Triggering ingestion worker...".to_string()],
        IngestStatus::Queued { job_id } => vec![format!("Successfully queued (job {job_id}).")],
        IngestStatus::Failed(message) => vec![message.clone()],
    }
}

pub fn render_progress(progress: &ProgressView) -> Vec<String> {
    if !progress.is_visible() {
        return Vec::new();
    }
    let mut lines = vec![format!(
        "{} {}%",
        progress_bar(progress.percent),
        progress.percent
    )];
    let processed = progress.processed_faculty;
    let total = progress.total_faculty;
    match progress.phase {
        ProgressPhase::Hidden => {}
        ProgressPhase::Starting => lines.push("Waiting for job status...".to_string()),
        ProgressPhase::Queued | ProgressPhase::Processing => {
            if progress.phase == ProgressPhase::Queued {
                lines.push("Job queued...".to_string());
            } else {
                lines.push(format!("Processing {}...", progress.university));
            }
            lines.push(format!(
                "  Analyzing {processed} of {total} faculty members."
            ));
            lines.push(format!(
                "  {processed} researchers are already indexed and searchable (/partial to search now)."
            ));
        }
        ProgressPhase::Completed => {
            lines.push("Ingestion complete!".to_string());
            lines.push(format!(
                "  All {total} faculty members and their papers have been indexed."
            ));
        }
        ProgressPhase::PartiallyIndexed => {
            lines.push("Ingestion interrupted (partially indexed)".to_string());
            lines.push(format!("  The process hit a snag at {processed}/{total}."));
            lines.push(
                "  Researchers already processed are saved and searchable.".to_string(),
            );
        }
        ProgressPhase::Stalled => {
            lines.push(format!(
                "Lost contact with the job after {} failed status checks.",
                progress.consecutive_failures
            ));
        }
    }
    if let Some(status) = &progress.unrecognized_status {
        lines.push(format!(
            "  Backend reported unknown status {status:?}; still polling."
        ));
    }
    lines
}

fn progress_bar(percent: u32) -> String {
    let clamped = percent.min(100) as usize;
    let filled = clamped * PROGRESS_BAR_WIDTH / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        ".".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

pub const LIMIT_MIN: u32 = 10;
pub const LIMIT_MAX: u32 = 200;
pub const LIMIT_DEFAULT: u32 = 50;
pub const SCORE_PERCENT_MAX: u8 = 100;
pub const SCORE_PERCENT_DEFAULT: u8 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Search,
    Ingest,
}

impl Tab {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "search" => Some(Tab::Search),
            "ingest" => Some(Tab::Ingest),
            _ => None,
        }
    }
}

/// Inputs of the search tab: free text plus the two sliders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    pub profile_text: String,
    limit: u32,
    score_percent: u8,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self::new(LIMIT_DEFAULT, SCORE_PERCENT_DEFAULT)
    }
}

impl SearchForm {
    pub fn new(limit: u32, score_percent: u8) -> Self {
        let mut form = Self {
            profile_text: String::new(),
            limit: LIMIT_DEFAULT,
            score_percent: SCORE_PERCENT_DEFAULT,
        };
        form.set_limit(limit);
        form.set_score_percent(score_percent);
        form
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit.clamp(LIMIT_MIN, LIMIT_MAX);
    }

    pub fn score_percent(&self) -> u8 {
        self.score_percent
    }

    pub fn set_score_percent(&mut self, percent: u8) {
        self.score_percent = percent.min(SCORE_PERCENT_MAX);
    }

    pub fn min_score(&self) -> f64 {
        min_score_from_percent(self.score_percent)
    }

    pub fn limit_label(&self) -> String {
        self.limit.to_string()
    }

    pub fn score_label(&self) -> String {
        format!("{:.2}", self.min_score())
    }
}

/// Slider percentage as a similarity threshold in `[0, 1]`.
///
/// An integer percentage over 100 already has at most two decimals.
pub fn min_score_from_percent(percent: u8) -> f64 {
    f64::from(percent.min(SCORE_PERCENT_MAX)) / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngestForm {
    pub university: String,
    pub dept_url: String,
}

/// Checks the ingest inputs and returns trimmed values, or the alert text.
pub(crate) fn validate_ingest(form: &IngestForm) -> Result<(String, String), String> {
    let university = form.university.trim();
    let dept_url = form.dept_url.trim();
    if university.is_empty() || dept_url.is_empty() {
        return Err("Please provide both University Name and Directory URL.".to_string());
    }
    match url::Url::parse(dept_url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => return Err("Directory URL must be an absolute http(s) URL.".to_string()),
    }
    Ok((university.to_string(), dept_url.to_string()))
}

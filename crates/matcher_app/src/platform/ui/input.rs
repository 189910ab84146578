use matcher_core::{Msg, Tab};

/// One line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Messages(Vec<Msg>),
    Help,
    Quit,
    Invalid(String),
    Empty,
}

pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Invalid("Commands start with '/'; type /help".to_string());
    };
    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        "tab" => match Tab::parse(rest) {
            Some(tab) => messages(vec![Msg::TabSelected(tab)]),
            None => Input::Invalid("Usage: /tab search|ingest".to_string()),
        },
        "profile" => messages(vec![Msg::ProfileTextChanged(rest.to_string())]),
        "limit" => match rest.parse::<u32>() {
            Ok(limit) => messages(vec![Msg::LimitChanged(limit)]),
            Err(_) => Input::Invalid("Usage: /limit <number>".to_string()),
        },
        "score" => match parse_score_percent(rest) {
            Some(percent) => messages(vec![Msg::ScoreThresholdChanged(percent)]),
            None => Input::Invalid("Usage: /score <0-100 | 0.00-1.00>".to_string()),
        },
        "search" => {
            let mut msgs = vec![Msg::TabSelected(Tab::Search)];
            if !rest.is_empty() {
                msgs.push(Msg::ProfileTextChanged(rest.to_string()));
            }
            msgs.push(Msg::SearchClicked);
            messages(msgs)
        }
        "university" => messages(vec![Msg::UniversityChanged(rest.to_string())]),
        "url" => messages(vec![Msg::DeptUrlChanged(rest.to_string())]),
        "ingest" => {
            let mut msgs = vec![Msg::TabSelected(Tab::Ingest)];
            if !rest.is_empty() {
                let Some((university, url)) = rest.split_once('|') else {
                    return Input::Invalid("Usage: /ingest <university> | <url>".to_string());
                };
                msgs.push(Msg::UniversityChanged(university.trim().to_string()));
                msgs.push(Msg::DeptUrlChanged(url.trim().to_string()));
            }
            msgs.push(Msg::IngestClicked);
            messages(msgs)
        }
        "watch" => messages(vec![Msg::TabSelected(Tab::Ingest), Msg::WatchJob(rest.to_string())]),
        "partial" => messages(vec![Msg::SearchPartialResultsClicked]),
        other => Input::Invalid(format!("Unknown command /{other}; type /help")),
    }
}

fn messages(msgs: Vec<Msg>) -> Input {
    Input::Messages(msgs)
}

/// Accepts a whole percentage or a fraction with a decimal point.
fn parse_score_percent(raw: &str) -> Option<u8> {
    if raw.contains('.') {
        let fraction: f64 = raw.parse().ok()?;
        if !(0.0..=1.0).contains(&fraction) {
            return None;
        }
        return Some((fraction * 100.0).round() as u8);
    }
    let percent: u8 = raw.parse().ok()?;
    (percent <= 100).then_some(percent)
}

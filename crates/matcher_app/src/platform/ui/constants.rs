/// Width of the text progress bar, in cells.
pub const PROGRESS_BAR_WIDTH: usize = 30;

pub const PROMPT: &str = "> ";

pub const HELP_TEXT: &str = "\
Commands:
  /tab search|ingest        switch tabs
  /profile <text>           set research interests
  /limit <n>                max papers to search (10-200)
  /score <n>                min similarity, percent (0-100) or 0.xx
  /search [text]            run a search, optionally setting the profile first
  /university <name>        set the university name
  /url <directory url>      set the faculty directory url
  /ingest [name | url]      trigger ingestion, optionally setting both fields
  /watch <job id>           follow an existing ingestion job
  /partial                  jump to search while a job runs
  /help                     show this text
  /quit                     leave";

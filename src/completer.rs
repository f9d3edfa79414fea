use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use reedline::{Completer, Span, Suggestion};

const ACTION_PREFIXES: &[&str] = &[
    "search:",
    "select:",
    "date-from:",
    "date-to:",
    "sort:",
    "page:",
    "reset",
];

const META_COMMANDS: &[&str] = &[":help", ":logs", ":export ", ":clear", ":quit"];

const PAGE_WORDS: &[&str] = &["prev", "next"];

/// Completes action prefixes, meta commands, and column names after
/// `sort:` and `select:`
pub struct ActionCompleter {
    columns: Vec<String>,
    select_columns: Vec<String>,
    matcher: SkimMatcherV2,
}

impl ActionCompleter {
    pub fn new(columns: Vec<String>, select_columns: Vec<String>) -> Self {
        Self {
            columns,
            select_columns,
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Candidates ranked by fuzzy score; an empty partial keeps every candidate
    fn rank<'a>(&self, candidates: impl Iterator<Item = &'a str>, partial: &str) -> Vec<String> {
        if partial.is_empty() {
            return candidates.map(str::to_string).collect();
        }
        let mut scored: Vec<(i64, String)> = candidates
            .filter_map(|c| {
                self.matcher
                    .fuzzy_match(c, partial)
                    .map(|score| (score, c.to_string()))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, c)| c).collect()
    }
}

impl Completer for ActionCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let input = &line[..pos];

        let (values, start, description, append_whitespace) = match input.split_once(':') {
            Some(("sort", partial)) => (
                self.rank(self.columns.iter().map(String::as_str), partial),
                pos - partial.len(),
                "column",
                false,
            ),
            Some(("select", partial)) if !partial.contains('=') => (
                self.rank(self.select_columns.iter().map(String::as_str), partial)
                    .into_iter()
                    .map(|c| format!("{}=", c))
                    .collect(),
                pos - partial.len(),
                "select filter",
                false,
            ),
            Some(("page", partial)) => (
                self.rank(PAGE_WORDS.iter().copied(), partial),
                pos - partial.len(),
                "page",
                false,
            ),
            Some(("", partial)) => (
                self.rank(
                    META_COMMANDS.iter().map(|c| c.trim_start_matches(':')),
                    partial,
                )
                .into_iter()
                .map(|c| format!(":{}", c))
                .collect(),
                0,
                "command",
                false,
            ),
            Some(_) => return Vec::new(),
            None => (
                ACTION_PREFIXES
                    .iter()
                    .filter(|p| p.starts_with(input))
                    .map(|p| p.to_string())
                    .collect(),
                0,
                "action",
                false,
            ),
        };

        values
            .into_iter()
            .map(|value| Suggestion {
                value,
                description: Some(description.to_string()),
                extra: None,
                span: Span { start, end: pos },
                style: None,
                append_whitespace,
            })
            .collect()
    }
}

/// Closed set of log categories and the reply-to-category matching rules
use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Infrastructure,
    Security,
    Database,
    Application,
}

/// Ordered keyword ladder applied when a reply is not an exact category token.
/// Earlier entries win when several keywords occur in the same reply.
const FALLBACK_LADDER: &[(&str, Category)] = &[
    ("database", Category::Database),
    ("security", Category::Security),
    ("infra", Category::Infrastructure),
    ("network", Category::Infrastructure),
    ("system", Category::Infrastructure),
    ("application", Category::Application),
];

static LADDER_MATCHER: Lazy<Option<AhoCorasick>> =
    Lazy::new(|| AhoCorasick::new(FALLBACK_LADDER.iter().map(|(keyword, _)| keyword)).ok());

/// Index of the first ladder rule whose keyword occurs in `text`
fn first_ladder_rule(text: &str) -> Option<usize> {
    match LADDER_MATCHER.as_ref() {
        Some(matcher) => matcher
            .find_overlapping_iter(text)
            .map(|m| m.pattern().as_usize())
            .min(),
        None => scan_ladder(text),
    }
}

/// Rule-by-rule containment check, used if the automaton could not be built
fn scan_ladder(text: &str) -> Option<usize> {
    FALLBACK_LADDER
        .iter()
        .position(|(keyword, _)| text.contains(keyword))
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Infrastructure,
        Category::Security,
        Category::Database,
        Category::Application,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Category assigned when nothing better can be recovered
    pub const DEFAULT: Category = Category::Application;

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Infrastructure => "infrastructure",
            Category::Security => "security",
            Category::Database => "database",
            Category::Application => "application",
        }
    }

    /// Position in `Category::ALL`
    pub fn index(&self) -> usize {
        match self {
            Category::Infrastructure => 0,
            Category::Security => 1,
            Category::Database => 2,
            Category::Application => 3,
        }
    }

    /// Name of the file this category's lines are appended to
    pub fn output_file_name(&self) -> String {
        format!("{}_logs.txt", self.as_str())
    }

    /// Map a normalized (trimmed, lowercased) model reply onto a category.
    ///
    /// An exact token match short-circuits; otherwise the keyword ladder is
    /// consulted in order. Returns `None` when neither recovers a category.
    pub fn match_reply(normalized: &str) -> Option<Category> {
        if let Ok(category) = normalized.parse::<Category>() {
            return Some(category);
        }

        first_ladder_rule(normalized).map(|rule| FALLBACK_LADDER[rule].1)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

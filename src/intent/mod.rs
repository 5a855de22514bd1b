//! Intent Matching
//!
//! Maps a free-text prompt onto one of a few query shapes. Matching is a
//! walk over [`RULES`] in priority order; the first rule that fires decides
//! the [`Intent`]. A prompt no rule recognizes yields [`Intent::Default`],
//! so matching never fails.
//!
//! Keywords are matched as substrings of the ASCII-lowercased prompt. The
//! extracted fragment is the first whitespace-delimited token following the
//! keyword's first occurrence, taken from the prompt as typed.
//!
//! Every column an intent names comes from the table descriptor (or the
//! `"name"` display fallback, which a rule only uses after confirming the
//! table has that column). Prompt text only ever becomes a bound value.

use crate::engine::TableDescriptor;

/// Rows returned by the top-N shape
pub const TOP_N_LIMIT: u32 = 10;

/// Rows returned by every other shape
pub const DEFAULT_LIMIT: u32 = 20;

/// Ranking columns for `top`, highest priority first
pub const RANK_COLUMNS: &[&str] = &["follower_count", "campaign_budget", "budget"];

/// Query shape tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Default,
    NameSearch,
    TopN,
    Filter,
}

impl Shape {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::NameSearch => "name_search",
            Self::TopN => "top_n",
            Self::Filter => "filter",
        }
    }
}

/// Outcome of matching a prompt against a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// First rows in storage order
    Default,
    /// Contains-match on the display column
    NameSearch { column: String, fragment: String },
    /// Highest values of a ranking column
    TopN { column: String },
    /// Contains-match on an attribute column
    Filter { column: String, fragment: String },
}

impl Intent {
    #[must_use]
    pub const fn shape(&self) -> Shape {
        match self {
            Self::Default => Shape::Default,
            Self::NameSearch { .. } => Shape::NameSearch,
            Self::TopN { .. } => Shape::TopN,
            Self::Filter { .. } => Shape::Filter,
        }
    }

    /// Column the statement filters or orders on
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::NameSearch { column, .. } | Self::TopN { column } | Self::Filter { column, .. } => {
                Some(column.as_str())
            }
        }
    }

    /// The bound value: the fragment wrapped as a contains pattern
    #[must_use]
    pub fn parameter(&self) -> Option<String> {
        match self {
            Self::NameSearch { fragment, .. } | Self::Filter { fragment, .. } => {
                Some(format!("%{fragment}%"))
            }
            Self::Default | Self::TopN { .. } => None,
        }
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        match self {
            Self::TopN { .. } => TOP_N_LIMIT,
            _ => DEFAULT_LIMIT,
        }
    }
}

/// A prompt with its case-folded form
///
/// ASCII folding keeps byte offsets identical between the two strings, so
/// a keyword position found in `folded` slices `original` correctly.
#[derive(Debug, Clone)]
pub struct Prompt<'a> {
    original: &'a str,
    folded: String,
}

impl<'a> Prompt<'a> {
    #[must_use]
    pub fn new(original: &'a str) -> Self {
        Self { original, folded: original.to_ascii_lowercase() }
    }

    /// Byte offset just past the first occurrence of `keyword`
    #[must_use]
    pub fn find(&self, keyword: &str) -> Option<usize> {
        self.folded.find(keyword).map(|start| start + keyword.len())
    }

    /// First whitespace-delimited token after `offset`, empty if none
    #[must_use]
    pub fn token_after(&self, offset: usize) -> &'a str {
        self.original[offset..].split_whitespace().next().unwrap_or("")
    }
}

/// How a rule picks the column it needs
#[derive(Debug, Clone, Copy)]
enum Target {
    /// The table's display column, or the `"name"` fallback
    DisplayColumn,
    /// First of these columns the table has
    FirstOf(&'static [&'static str]),
    /// Exactly this column
    Column(&'static str),
}

impl Target {
    fn resolve(self, table: &TableDescriptor) -> Option<String> {
        match self {
            Self::DisplayColumn => {
                let column = table.display_or_default();
                table.has_column(column).then(|| column.to_string())
            }
            Self::FirstOf(candidates) => {
                candidates.iter().find(|c| table.has_column(c)).map(|c| (*c).to_string())
            }
            Self::Column(column) => table.has_column(column).then(|| column.to_string()),
        }
    }
}

/// What happens when a rule's keyword is present but its column is not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnMissingColumn {
    /// Keep evaluating later rules
    NextRule,
    /// Stop and use the default shape
    DefaultShape,
}

/// One entry of the ordered rule list
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Short name for logs and tests
    pub label: &'static str,
    /// Trigger phrases, checked in order; the first one present is used
    keywords: &'static [&'static str],
    target: Target,
    on_missing: OnMissingColumn,
    shape: Shape,
}

impl Rule {
    /// Predicate: offset past the first trigger phrase present in the prompt
    #[must_use]
    pub fn trigger(&self, prompt: &Prompt<'_>) -> Option<usize> {
        self.keywords.iter().find_map(|kw| prompt.find(kw))
    }

    /// Extractor: the literal fragment following the trigger
    #[must_use]
    pub fn extract<'a>(&self, prompt: &Prompt<'a>, offset: usize) -> &'a str {
        prompt.token_after(offset)
    }

    /// Builder: the intent for a resolved column and fragment
    fn build(&self, column: String, fragment: &str) -> Intent {
        match self.shape {
            Shape::Default => Intent::Default,
            Shape::NameSearch => Intent::NameSearch { column, fragment: fragment.to_string() },
            Shape::TopN => Intent::TopN { column },
            Shape::Filter => Intent::Filter { column, fragment: fragment.to_string() },
        }
    }

    /// Evaluate this rule alone; `None` means "try the next rule"
    #[must_use]
    pub fn evaluate(&self, table: &TableDescriptor, prompt: &Prompt<'_>) -> Option<Intent> {
        let offset = self.trigger(prompt)?;

        match self.target.resolve(table) {
            Some(column) => Some(self.build(column, self.extract(prompt, offset))),
            None => match self.on_missing {
                OnMissingColumn::NextRule => None,
                OnMissingColumn::DefaultShape => Some(Intent::Default),
            },
        }
    }
}

const fn filter(label: &'static str, keyword: &'static [&'static str], column: &'static str) -> Rule {
    Rule {
        label,
        keywords: keyword,
        target: Target::Column(column),
        on_missing: OnMissingColumn::NextRule,
        shape: Shape::Filter,
    }
}

/// Rules in priority order
pub const RULES: &[Rule] = &[
    // "with name" precedes "name" so the longer phrase decides the offset
    Rule {
        label: "name",
        keywords: &["with name", "name"],
        target: Target::DisplayColumn,
        on_missing: OnMissingColumn::NextRule,
        shape: Shape::NameSearch,
    },
    Rule {
        label: "top",
        keywords: &["top"],
        target: Target::FirstOf(RANK_COLUMNS),
        on_missing: OnMissingColumn::DefaultShape,
        shape: Shape::TopN,
    },
    filter("platform", &["platform"], "platform"),
    filter("industry", &["industry"], "industry"),
    filter("age", &["age"], "age_range"),
    filter("location", &["location"], "location"),
    filter("status", &["status"], "status"),
];

/// Match `prompt` against `table`
#[must_use]
pub fn match_intent(table: &TableDescriptor, prompt: &str) -> Intent {
    let prompt = Prompt::new(prompt);
    RULES.iter().find_map(|rule| rule.evaluate(table, &prompt)).unwrap_or(Intent::Default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ColumnDescriptor;
    use crate::roles::infer_roles;
    use pretty_assertions::assert_eq;

    fn table(columns: &[(&str, &str)]) -> TableDescriptor {
        infer_roles(TableDescriptor::new(
            "fixture",
            columns.iter().map(|(name, ty)| ColumnDescriptor::new(*name, *ty, None)).collect(),
        ))
    }

    fn rule(label: &str) -> &'static Rule {
        RULES.iter().find(|r| r.label == label).unwrap()
    }

    #[test]
    fn test_top_prefers_follower_count() {
        let t = table(&[("campaign_budget", "numeric"), ("follower_count", "integer")]);
        let intent = match_intent(&t, "show me top");
        assert_eq!(intent, Intent::TopN { column: "follower_count".to_string() });
        assert_eq!(intent.limit(), 10);
        assert_eq!(intent.parameter(), None);
    }

    #[test]
    fn test_top_falls_back_through_rank_columns() {
        let t = table(&[("budget", "numeric"), ("status", "text")]);
        assert_eq!(match_intent(&t, "TOP brands"), Intent::TopN { column: "budget".to_string() });
    }

    #[test]
    fn test_top_without_rank_column_is_default() {
        let t = table(&[("platform", "text")]);
        // "top" consumes the prompt even though "platform" would match
        assert_eq!(match_intent(&t, "top platform tiktok"), Intent::Default);
    }

    #[test]
    fn test_with_name_extracts_fragment() {
        let t = table(&[("id", "integer"), ("name", "text")]);
        let intent = match_intent(&t, "with name john");
        assert_eq!(
            intent,
            Intent::NameSearch { column: "name".to_string(), fragment: "john".to_string() }
        );
        assert_eq!(intent.parameter().as_deref(), Some("%john%"));
        assert_eq!(intent.limit(), 20);
    }

    #[test]
    fn test_with_name_phrase_wins_over_bare_name() {
        let prompt = Prompt::new("brands with name Acme");
        let offset = rule("name").trigger(&prompt).unwrap();
        assert_eq!(rule("name").extract(&prompt, offset), "Acme");
    }

    #[test]
    fn test_name_search_uses_inferred_display_column() {
        let t = table(&[("brand_name", "character varying"), ("industry", "text")]);
        assert_eq!(
            match_intent(&t, "find name nike"),
            Intent::NameSearch { column: "brand_name".to_string(), fragment: "nike".to_string() }
        );
    }

    #[test]
    fn test_name_search_preserves_fragment_case() {
        let t = table(&[("name", "text")]);
        let intent = match_intent(&t, "Name McDonald please");
        assert_eq!(intent.parameter().as_deref(), Some("%McDonald%"));
    }

    #[test]
    fn test_name_without_display_column_tries_later_rules() {
        let t = table(&[("title", "text"), ("status", "text")]);
        assert_eq!(
            match_intent(&t, "name status active"),
            Intent::Filter { column: "status".to_string(), fragment: "active".to_string() }
        );
    }

    #[test]
    fn test_name_keyword_at_end_gives_empty_fragment() {
        let t = table(&[("name", "text")]);
        let intent = match_intent(&t, "sort by name");
        assert_eq!(intent.parameter().as_deref(), Some("%%"));
    }

    #[test]
    fn test_platform_filter() {
        let t = table(&[("platform", "text"), ("handle", "text")]);
        let intent = match_intent(&t, "platform tiktok please");
        assert_eq!(
            intent,
            Intent::Filter { column: "platform".to_string(), fragment: "tiktok".to_string() }
        );
        assert_eq!(intent.parameter().as_deref(), Some("%tiktok%"));
    }

    #[test]
    fn test_age_keyword_targets_age_range() {
        let t = table(&[("age_range", "text"), ("location", "text")]);
        assert_eq!(
            match_intent(&t, "age 18-24"),
            Intent::Filter { column: "age_range".to_string(), fragment: "18-24".to_string() }
        );
    }

    #[test]
    fn test_filter_priority_order() {
        let t = table(&[("industry", "text"), ("location", "text"), ("status", "text")]);
        assert_eq!(
            match_intent(&t, "status active location paris industry retail"),
            Intent::Filter { column: "industry".to_string(), fragment: "retail".to_string() }
        );
    }

    #[test]
    fn test_filter_requires_column() {
        let t = table(&[("location", "text")]);
        assert_eq!(
            match_intent(&t, "platform youtube location berlin"),
            Intent::Filter { column: "location".to_string(), fragment: "berlin".to_string() }
        );
    }

    #[test]
    fn test_unrecognized_prompt_is_default() {
        let t = table(&[("platform", "text"), ("follower_count", "integer")]);
        assert_eq!(match_intent(&t, ""), Intent::Default);
        assert_eq!(match_intent(&t, "show everything"), Intent::Default);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let t = table(&[("industry", "text")]);
        assert_eq!(
            match_intent(&t, "INDUSTRY Fashion"),
            Intent::Filter { column: "industry".to_string(), fragment: "Fashion".to_string() }
        );
    }

    #[test]
    fn test_non_ascii_prompt_slices_on_char_boundaries() {
        let t = table(&[("location", "text")]);
        assert_eq!(
            match_intent(&t, "Überall location Zürich"),
            Intent::Filter { column: "location".to_string(), fragment: "Zürich".to_string() }
        );
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let labels: Vec<_> = RULES.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["name", "top", "platform", "industry", "age", "location", "status"]);
    }

    #[test]
    fn test_each_rule_evaluates_independently() {
        let t = table(&[("status", "text")]);
        let prompt = Prompt::new("status paused");
        assert_eq!(rule("platform").evaluate(&t, &prompt), None);
        assert_eq!(
            rule("status").evaluate(&t, &prompt),
            Some(Intent::Filter { column: "status".to_string(), fragment: "paused".to_string() })
        );
    }
}

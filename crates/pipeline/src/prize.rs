use std::collections::VecDeque;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Rank/position tokens: ordinals ("1st") or ranges ("3-5").
re!(re_rank, r"(?i)\b\d{1,3}(?:st|nd|rd|th)\b|\b\d{1,3}\s*[-–]\s*\d{1,3}\b");
// Monetary amounts: currency symbol/code followed by a number, a
// comma-grouped number, or a bare integer of 3+ digits. Flattened prize
// tables routinely drop the symbol.
re!(re_amount,
    r"(?i)(?:[₹$€£]|\b(?:rs\.?|inr|usd|eur|gbp))\s*\d[\d,]*(?:\.\d+)?|\b\d{1,3}(?:,\d{3})+(?:\.\d+)?\b|\b\d{3,}(?:\.\d+)?\b");
// Non-cash awards, title-cased on output.
re!(re_award, r"(?i)\b(?:trophy|certificate|medal|cash)\b");
// Age-bracket category markers U9 through U20 (optionally dashed).
re!(re_age_bracket, r"^U-?(?:9|1[0-9]|20)$");
// Whitespace/punctuation-delimited tokens for category detection.
re!(re_token, r"[^\s.,;:()\[\]|]+");
// Collapsed table columns: runs of 2+ spaces, space-pipe-space, bare pipes.
re!(re_table_split, r" {2,}|\s\|\s|\|");

const SECTION_START: &[&str] = &["PRIZE STRUCTURE", "PRIZE DISTRIBUTION", "PRIZES", "PRIZE"];
const SECTION_STOP: &[&str] = &[
    "REGISTRATION",
    "ACCOUNT",
    "CONTACT",
    "SCHEDULE",
    "VENUE",
    "INVITATION",
    "ORGANIZER",
    "ORGANISER",
    "IMPORTANT",
    "ELIGIBILITY",
    "RULES",
    "FORMAT",
];
const CATEGORY_KEYWORDS: &[&str] = &[
    "BEST", "FEMALE", "WOMEN", "GIRLS", "BOYS", "VETERAN", "YOUNG", "OLDEST", "UNRATED",
];

/// A recovered label → value association. Ordering reflects appearance order
/// in the source, not semantic rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrizeEntry {
    pub label: String,
    pub value: String,
}

/// Heuristically recover tabular prize/award structure that text extraction
/// flattened, appending annotation blocks to the input. The input text is
/// never modified, only extended; with nothing to recover it is returned
/// unchanged.
pub fn normalize_prizes(text: &str) -> String {
    let mut out = text.to_string();

    let table_lines = recover_table_lines(text);
    if !table_lines.is_empty() {
        out.push_str("\n\n=== NORMALIZED TABLE LINES ===\n\n");
        out.push_str(&table_lines.join("\n"));
        out.push('\n');
    }

    let entries = recover_prize_entries(text);
    if !entries.is_empty() {
        out.push_str("\n\n=== PRIZE ANNOTATIONS ===\n\n");
        for entry in &entries {
            out.push_str(&format!("- {}: {}\n", entry.label, entry.value));
        }
    }

    out
}

// ── Pass 1: generic table recovery ───────────────────────────────────────────

/// Re-join lines whose columns collapsed into spacing or pipes, using a
/// canonical ` | ` delimiter. Lines that do not split into at least two
/// cells are ignored.
pub fn recover_table_lines(text: &str) -> Vec<String> {
    let mut normalized = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = re_table_split()
            .split(line)
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .collect();
        if cells.len() >= 2 {
            normalized.push(cells.join(" | "));
        }
    }

    normalized
}

// ── Pass 2: prize-section recovery ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Rank,
    Amount,
    Award,
    Category,
}

impl TokenClass {
    fn is_label(self) -> bool {
        matches!(self, TokenClass::Rank | TokenClass::Category)
    }

    /// Fallback label for a value that never found a partner.
    fn generic_label(self) -> &'static str {
        match self {
            TokenClass::Amount => "Amount",
            TokenClass::Award => "Award",
            TokenClass::Rank => "Rank",
            TokenClass::Category => "Category",
        }
    }
}

#[derive(Debug)]
struct Token {
    start: usize,
    end: usize,
    class: TokenClass,
    text: String,
}

/// Scan prize sections and pair rank/category labels with amount/award
/// values.
///
/// Labels queue up across lines. A line that yields values drains the label
/// queue against that line's own values, front to front in encounter order;
/// values the line could not place are set aside. At the end of the scan the
/// remaining labels are paired best-effort against the set-aside values,
/// again in encounter order. No pairs means no annotation.
pub fn recover_prize_entries(text: &str) -> Vec<PrizeEntry> {
    let mut capturing = false;
    let mut labels: VecDeque<String> = VecDeque::new();
    let mut leftover_values: VecDeque<(TokenClass, String)> = VecDeque::new();
    let mut pairs: Vec<PrizeEntry> = Vec::new();

    for line in text.lines() {
        let upper = line.to_uppercase();
        if capturing {
            if SECTION_STOP.iter().any(|kw| upper.contains(kw)) {
                capturing = false;
                continue;
            }
        } else if SECTION_START.iter().any(|kw| upper.contains(kw)) {
            capturing = true;
        } else {
            continue;
        }

        let mut line_values: VecDeque<(TokenClass, String)> = VecDeque::new();
        for token in scan_line(line) {
            if token.class.is_label() {
                labels.push_back(token.text);
            } else {
                line_values.push_back((token.class, token.text));
            }
        }
        if !line_values.is_empty() {
            drain_pairs(&mut labels, &mut line_values, &mut pairs);
            leftover_values.extend(line_values);
        }
    }

    // Best-effort tail pairing across the whole section, encounter order.
    drain_pairs(&mut labels, &mut leftover_values, &mut pairs);

    if pairs.is_empty() {
        return Vec::new();
    }
    debug!(
        pairs = pairs.len(),
        unpaired_values = leftover_values.len(),
        "Recovered prize structure"
    );

    // Values that never found a label stay visible under their class name.
    for (class, value) in leftover_values {
        pairs.push(PrizeEntry { label: class.generic_label().to_string(), value });
    }
    pairs
}

fn drain_pairs(
    labels: &mut VecDeque<String>,
    values: &mut VecDeque<(TokenClass, String)>,
    pairs: &mut Vec<PrizeEntry>,
) {
    loop {
        match (labels.pop_front(), values.pop_front()) {
            (Some(label), Some((_, value))) => pairs.push(PrizeEntry { label, value }),
            (Some(label), None) => {
                labels.push_front(label);
                break;
            }
            (None, Some(value)) => {
                values.push_front(value);
                break;
            }
            (None, None) => break,
        }
    }
}

/// Classify the tokens of one line, in positional order. Earlier pattern
/// families claim their spans first: ranks, then amounts, then awards, and
/// finally category keywords among the unclaimed tokens.
fn scan_line(line: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for m in re_rank().find_iter(line) {
        tokens.push(Token {
            start: m.start(),
            end: m.end(),
            class: TokenClass::Rank,
            text: m.as_str().to_string(),
        });
    }
    for m in re_amount().find_iter(line) {
        if overlaps(&tokens, m.start(), m.end()) {
            continue;
        }
        tokens.push(Token {
            start: m.start(),
            end: m.end(),
            class: TokenClass::Amount,
            text: m.as_str().to_string(),
        });
    }
    for m in re_award().find_iter(line) {
        if overlaps(&tokens, m.start(), m.end()) {
            continue;
        }
        tokens.push(Token {
            start: m.start(),
            end: m.end(),
            class: TokenClass::Award,
            text: title_case(m.as_str()),
        });
    }
    for m in re_token().find_iter(line) {
        if overlaps(&tokens, m.start(), m.end()) || !is_category_token(m.as_str()) {
            continue;
        }
        tokens.push(Token {
            start: m.start(),
            end: m.end(),
            class: TokenClass::Category,
            text: m.as_str().to_string(),
        });
    }

    tokens.sort_by_key(|t| t.start);
    tokens
}

fn overlaps(tokens: &[Token], start: usize, end: usize) -> bool {
    tokens.iter().any(|t| t.start < end && start < t.end)
}

fn is_category_token(token: &str) -> bool {
    let upper = token.to_uppercase();
    if upper.contains('+') {
        return true;
    }
    if CATEGORY_KEYWORDS.iter().any(|kw| upper.contains(kw)) {
        return true;
    }
    re_age_bracket().is_match(&upper)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

use std::collections::HashSet;
use std::fmt;

/// Word-mangling rules. Each rule is a pure word -> variants function with
/// its applicability guard built in; a word that fails the guard simply
/// contributes no variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Uppercase the first character; uppercase the last character.
    CapEnds,
    /// Uppercase one character at each position in turn, plus all-uppercase.
    CapAll,
    /// word+word and word+reverse(word). Words shorter than 6 chars only.
    Duplicate,
    /// Capitalize the first character, then duplicate the result.
    CapDupe,
    /// Capitalize first or last character, then reverse.
    CapRev,
    /// Full lowercase.
    LowerAll,
    /// Prepend/append every 1-digit and 2-digit number.
    Numbers,
    /// Append 's'.
    Plural,
    /// Reverse the word.
    Reverse,
    /// Split at the midpoint into two halves. Words longer than 5 chars only.
    Split,
    /// English verb-tense heuristics: -s/-es/-ies, -ed/-ied, -ing.
    /// Best-effort morphology, not authoritative.
    Tense,
    /// Truncate to 4 chars, capitalize, append 2- and 4-digit suffixes with
    /// and without a trailing '!'. Words longer than 4 chars only.
    TruncApp,
    /// Prepend/append year strings (1970-2020 and 2-digit 70-99, 00-20).
    Years,
}

impl Rule {
    /// Every rule, in selection-string order.
    pub const ALL: [Rule; 13] = [
        Rule::CapEnds,
        Rule::CapAll,
        Rule::Duplicate,
        Rule::CapDupe,
        Rule::CapRev,
        Rule::LowerAll,
        Rule::Numbers,
        Rule::Plural,
        Rule::Reverse,
        Rule::Split,
        Rule::Tense,
        Rule::TruncApp,
        Rule::Years,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Rule::CapEnds => "cap_ends",
            Rule::CapAll => "capall",
            Rule::Duplicate => "duplicate",
            Rule::CapDupe => "cap_dupe",
            Rule::CapRev => "cap_rev",
            Rule::LowerAll => "lowerall",
            Rule::Numbers => "numbers",
            Rule::Plural => "plural",
            Rule::Reverse => "reverse",
            Rule::Split => "split",
            Rule::Tense => "tense",
            Rule::TruncApp => "trunc_app",
            Rule::Years => "years",
        }
    }

    /// Single-character code used in rule-selection strings.
    pub fn code(&self) -> char {
        match self {
            Rule::CapEnds => 'c',
            Rule::CapAll => 'C',
            Rule::Duplicate => 'd',
            Rule::CapDupe => 'D',
            Rule::CapRev => 'R',
            Rule::LowerAll => 'l',
            Rule::Numbers => 'n',
            Rule::Plural => 'p',
            Rule::Reverse => 'r',
            Rule::Split => 's',
            Rule::Tense => 't',
            Rule::TruncApp => 'T',
            Rule::Years => 'y',
        }
    }

    pub fn from_code(code: char) -> Option<Rule> {
        Rule::ALL.iter().copied().find(|r| r.code() == code)
    }

    /// Applicability guard. A failed guard means zero variants, never an
    /// error.
    pub fn guard(&self, word: &str) -> bool {
        let len = word.chars().count();
        match self {
            Rule::Duplicate | Rule::CapDupe => len < 6,
            Rule::Split => len > 5,
            Rule::TruncApp => len > 4,
            Rule::Tense => len > 3 && word.chars().all(|c| c.is_alphabetic()),
            _ => true,
        }
    }

    /// Apply the rule to one word, honoring the guard.
    pub fn apply(&self, word: &str) -> Vec<String> {
        if !self.guard(word) {
            return Vec::new();
        }
        match self {
            Rule::CapEnds => vec![cap_first(word), cap_last(word)],
            Rule::CapAll => {
                let len = word.chars().count();
                let mut out: Vec<String> = (0..len).map(|i| cap_at(word, i)).collect();
                out.push(word.to_uppercase());
                out
            }
            Rule::Duplicate => vec![
                format!("{}{}", word, word),
                format!("{}{}", word, reverse(word)),
            ],
            Rule::CapDupe => {
                let capped = cap_first(word);
                vec![format!("{0}{0}", capped)]
            }
            Rule::CapRev => vec![reverse(&cap_first(word)), reverse(&cap_last(word))],
            Rule::LowerAll => vec![word.to_lowercase()],
            Rule::Numbers => {
                let mut out = Vec::with_capacity(220);
                for n in 0..10 {
                    out.push(format!("{}{}", n, word));
                    out.push(format!("{}{}", word, n));
                }
                for n in 0..100 {
                    out.push(format!("{:02}{}", n, word));
                    out.push(format!("{}{:02}", word, n));
                }
                out
            }
            Rule::Plural => vec![format!("{}s", word)],
            Rule::Reverse => vec![reverse(word)],
            Rule::Split => {
                let chars: Vec<char> = word.chars().collect();
                let mid = chars.len() / 2;
                vec![
                    chars[..mid].iter().collect(),
                    chars[mid..].iter().collect(),
                ]
            }
            Rule::Tense => tense_variants(word),
            Rule::TruncApp => {
                let stem: String = word.chars().take(4).collect();
                let stem = cap_first(&stem);
                let mut out = Vec::with_capacity(20200);
                for n in 0..100 {
                    out.push(format!("{}{:02}", stem, n));
                    out.push(format!("{}{:02}!", stem, n));
                }
                for n in 0..10000 {
                    out.push(format!("{}{:04}", stem, n));
                    out.push(format!("{}{:04}!", stem, n));
                }
                out
            }
            Rule::Years => {
                let years = year_strings();
                let mut out = Vec::with_capacity(years.len() * 2);
                for y in &years {
                    out.push(format!("{}{}", y, word));
                    out.push(format!("{}{}", word, y));
                }
                out
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

fn reverse(word: &str) -> String {
    word.chars().rev().collect()
}

/// Uppercase the character at one position, leaving the rest untouched.
fn cap_at(word: &str, idx: usize) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| {
            if i == idx {
                c.to_uppercase().to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}

fn cap_first(word: &str) -> String {
    cap_at(word, 0)
}

fn cap_last(word: &str) -> String {
    let len = word.chars().count();
    if len == 0 {
        return String::new();
    }
    cap_at(word, len - 1)
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Present, past and progressive forms. English morphology approximated:
/// sibilant endings take "es", consonant+y becomes "ies"/"ied", a trailing
/// 'e' is stripped before "ed"/"ing".
fn tense_variants(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    // Guard guarantees at least four characters.
    let last = chars[chars.len() - 1];
    let penult = chars[chars.len() - 2];
    let lower = word.to_lowercase();

    let sibilant = lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh");
    let consonant_y = last.to_ascii_lowercase() == 'y' && !is_vowel(penult);

    let stem: String = chars[..chars.len() - 1].iter().collect();

    let present = if sibilant {
        format!("{}es", word)
    } else if consonant_y {
        format!("{}ies", stem)
    } else {
        format!("{}s", word)
    };

    let past = if last.to_ascii_lowercase() == 'e' {
        format!("{}d", word)
    } else if consonant_y {
        format!("{}ied", stem)
    } else {
        format!("{}ed", word)
    };

    let progressive = if last.to_ascii_lowercase() == 'e' {
        format!("{}ing", stem)
    } else {
        format!("{}ing", word)
    };

    vec![present, past, progressive]
}

fn year_strings() -> Vec<String> {
    let mut years = Vec::with_capacity(102);
    for y in 1970..=2020 {
        years.push(format!("{:04}", y));
    }
    for y in 70..=99 {
        years.push(format!("{:02}", y));
    }
    for y in 0..=20 {
        years.push(format!("{:02}", y));
    }
    years
}

/// The set of rules enabled for a dictionary run. Configured once up front,
/// constant afterward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    enabled: Vec<Rule>,
}

impl RuleSet {
    /// Baseline: no rules, each word is tested verbatim only.
    pub fn baseline() -> Self {
        RuleSet::default()
    }

    pub fn all() -> Self {
        RuleSet {
            enabled: Rule::ALL.to_vec(),
        }
    }

    /// Parse a selection string: one character per rule (see `Rule::code`),
    /// '*' enables everything, '0' is the explicit baseline. Unrecognized
    /// characters are ignored.
    pub fn from_selection(selection: &str) -> Self {
        if selection.contains('*') {
            return RuleSet::all();
        }
        let mut set = RuleSet::baseline();
        for c in selection.chars() {
            if let Some(rule) = Rule::from_code(c) {
                set.enable(rule);
            }
        }
        set
    }

    pub fn enable(&mut self, rule: Rule) {
        if !self.enabled.contains(&rule) {
            self.enabled.push(rule);
        }
    }

    pub fn is_enabled(&self, rule: Rule) -> bool {
        self.enabled.contains(&rule)
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Rule> + '_ {
        self.enabled.iter().copied()
    }

    /// Build the full candidate pool for one word: the word itself plus the
    /// union of every enabled rule's variants, deduplicated.
    pub fn expand(&self, word: &str) -> HashSet<String> {
        let mut pool = HashSet::new();
        pool.insert(word.to_string());
        for rule in self.iter() {
            for variant in rule.apply(word) {
                pool.insert(variant);
            }
        }
        pool
    }
}

//! Static lookup tables: script detection, case folding, question words
//! and the synonym table.

use crate::types::LanguageHint;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Primary script of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Hebrew,
    Latin,
    Mixed,
}

impl Script {
    /// Detect the script from character ranges.
    ///
    /// Any Hebrew-block character together with any Latin letter is `Mixed`;
    /// Hebrew alone is `Hebrew`; everything else is `Latin`.
    pub fn detect(text: &str) -> Self {
        let hebrew = text.chars().any(is_hebrew_char);
        let latin = text.chars().any(is_latin_letter);
        match (hebrew, latin) {
            (true, true) => Self::Mixed,
            (true, false) => Self::Hebrew,
            _ => Self::Latin,
        }
    }

    /// Hebrew and mixed queries are treated as Hebrew/Yiddish-primary.
    pub fn is_hebrew_primary(&self) -> bool {
        matches!(self, Self::Hebrew | Self::Mixed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hebrew => "hebrew",
            Self::Latin => "latin",
            Self::Mixed => "mixed",
        }
    }
}

pub fn is_hebrew_char(c: char) -> bool {
    matches!(c, '\u{0590}'..='\u{05FF}' | '\u{FB1D}'..='\u{FB4F}')
}

fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || (matches!(c, '\u{00C0}'..='\u{024F}') && c.is_alphabetic())
}

/// Hebrew points and cantillation marks (combining characters only).
pub(crate) fn is_hebrew_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0591}'..='\u{05BD}' | '\u{05BF}' | '\u{05C1}'..='\u{05C2}' | '\u{05C4}'..='\u{05C5}' | '\u{05C7}'
    )
}

/// Fold text for case-insensitive comparison: lowercase and drop niqqud.
pub fn fold(text: &str) -> String {
    text.chars()
        .filter(|c| !is_hebrew_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

const LATIN_QUESTION_WORDS: &[&str] = &[
    "what", "what's", "whats", "how", "why", "who", "whom", "whose", "which", "where", "when",
    "explain", "describe", "define", "tell", "show", "give", "please", "can", "could", "would",
];

/// Stripped only inside a run that a question word opened.
const LATIN_FILLER_WORDS: &[&str] = &[
    "is", "are", "was", "were", "does", "do", "did", "me", "us", "you", "about", "the", "a",
    "an", "of", "meaning", "mean", "concept",
];

const HEBREW_QUESTION_WORDS: &[&str] = &[
    // Hebrew
    "מה", "מהו", "מהי", "מהם", "מהן", "מי", "איך", "כיצד", "למה", "מדוע", "היכן", "איפה",
    "מתי", "האם", "הסבר", "תסביר", "הסבירו", "תאר", "פרש", "באר",
    // Yiddish
    "וואס", "וואָס", "ווי", "פארוואס", "פאַרוואָס", "וועלכע", "ווער", "ווען", "וואו", "ערקלער",
    "דערקלער",
];

/// Stripped only inside a run that a question word opened.
const HEBREW_FILLER_WORDS: &[&str] = &[
    // Hebrew
    "הוא", "היא", "זה", "ספר", "לי", "על", "את", "משמעות", "מושג", "המושג", "ענין", "עניין",
    // Yiddish
    "איז", "מיינט", "דער", "די", "דאס",
];

/// Built-in transliterations and translations of corpus-language terms.
const BUILTIN_SYNONYMS: &[(&str, &str)] = &[
    ("bittul", "ביטול"),
    ("bitul", "ביטול"),
    ("bittul hayesh", "ביטול היש"),
    ("bitul hayesh", "ביטול היש"),
    ("self-nullification", "ביטול"),
    ("tzimtzum", "צמצום"),
    ("tsimtsum", "צמצום"),
    ("contraction", "צמצום"),
    ("ahavas yisroel", "אהבת ישראל"),
    ("ahavat yisrael", "אהבת ישראל"),
    ("love of israel", "אהבת ישראל"),
    ("ahavah", "אהבה"),
    ("love", "אהבה"),
    ("yirah", "יראה"),
    ("awe", "יראה"),
    ("yiras shamayim", "יראת שמים"),
    ("fear of heaven", "יראת שמים"),
    ("hiskashrus", "התקשרות"),
    ("hitkashrut", "התקשרות"),
    ("hisbonenus", "התבוננות"),
    ("hitbonenut", "התבוננות"),
    ("contemplation", "התבוננות"),
    ("emunah", "אמונה"),
    ("emuna", "אמונה"),
    ("faith", "אמונה"),
    ("teshuvah", "תשובה"),
    ("teshuva", "תשובה"),
    ("repentance", "תשובה"),
    ("simcha", "שמחה"),
    ("joy", "שמחה"),
    ("yichud", "יחוד"),
    ("unity", "יחוד"),
    ("sefiros", "ספירות"),
    ("sefirot", "ספירות"),
    ("ein sof", "אין סוף"),
    ("or ein sof", "אור אין סוף"),
    ("ohr ein sof", "אור אין סוף"),
    ("mesirus nefesh", "מסירות נפש"),
    ("mesirut nefesh", "מסירות נפש"),
    ("self-sacrifice", "מסירות נפש"),
    ("kabbalas ol", "קבלת עול"),
    ("kabbalat ol", "קבלת עול"),
    ("dirah betachtonim", "דירה בתחתונים"),
    ("dira betachtonim", "דירה בתחתונים"),
    ("chochmah", "חכמה"),
    ("wisdom", "חכמה"),
    ("binah", "בינה"),
    ("daas", "דעת"),
    ("daat", "דעת"),
    ("neshamah", "נשמה"),
    ("neshama", "נשמה"),
    ("soul", "נשמה"),
    ("nefesh", "נפש"),
    ("yechidah", "יחידה"),
    ("avodah", "עבודה"),
    ("avoda", "עבודה"),
    ("tefillah", "תפלה"),
    ("tefilla", "תפלה"),
    ("prayer", "תפלה"),
    ("mitzvos", "מצות"),
    ("mitzvot", "מצות"),
    ("moshiach", "משיח"),
    ("mashiach", "משיח"),
    ("messiah", "משיח"),
    ("geulah", "גאולה"),
    ("redemption", "גאולה"),
    ("chassidus", "חסידות"),
    ("chassidut", "חסידות"),
    ("tanya", "תניא"),
    ("shechinah", "שכינה"),
    ("shechina", "שכינה"),
];

/// Phrase → canonical form, keyed by the folded, single-space-joined phrase.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    entries: HashMap<String, String>,
    max_phrase_tokens: usize,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a mapping. Empty phrases are ignored.
    pub fn insert(&mut self, phrase: &str, canonical: &str) {
        let key = phrase_key(phrase.split_whitespace());
        let canonical = canonical.split_whitespace().collect::<Vec<_>>().join(" ");
        if key.is_empty() || canonical.is_empty() {
            return;
        }
        self.max_phrase_tokens = self.max_phrase_tokens.max(key.split(' ').count());
        self.entries.insert(key, canonical);
    }

    /// Longest-match-first lookup at the start of `tokens`.
    ///
    /// Returns the number of tokens consumed and the canonical replacement.
    pub fn lookup<S: AsRef<str>>(&self, tokens: &[S]) -> Option<(usize, &str)> {
        let longest = self.max_phrase_tokens.min(tokens.len());
        (1..=longest).rev().find_map(|len| {
            let key = phrase_key(tokens[..len].iter().map(|t| t.as_ref()));
            self.entries
                .get(&key)
                .map(|canonical| (len, canonical.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn phrase_key<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.map(fold).collect::<Vec<_>>().join(" ")
}

/// Interrogative and imperative words stripped from the front of a query.
///
/// Filler words (articles, copulas, prepositions, "meaning") are stripped
/// only after a question word, so `the Rebbe` and `ענין הצמצום` stay whole
/// while `what is the meaning of ...` loses its whole prefix.
#[derive(Debug, Clone, Default)]
pub struct QuestionWords {
    hebrew: HashSet<String>,
    latin: HashSet<String>,
    hebrew_fillers: HashSet<String>,
    latin_fillers: HashSet<String>,
}

impl QuestionWords {
    pub fn add_hebrew<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        self.hebrew.extend(words.into_iter().map(fold));
    }

    pub fn add_latin<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        self.latin.extend(words.into_iter().map(fold));
    }

    pub fn add_hebrew_fillers<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        self.hebrew_fillers.extend(words.into_iter().map(fold));
    }

    pub fn add_latin_fillers<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        self.latin_fillers.extend(words.into_iter().map(fold));
    }

    /// Whether `token` is a question word for a query of this script and hint.
    ///
    /// Latin queries consult the Latin set, Hebrew queries the Hebrew-family
    /// set, mixed queries both. A hint adds the set of its language.
    pub fn contains(&self, token: &str, script: Script, hint: Option<LanguageHint>) -> bool {
        self.lookup(&self.hebrew, &self.latin, token, script, hint)
    }

    /// Whether `token` is a filler word, under the same script rules.
    pub fn is_filler(&self, token: &str, script: Script, hint: Option<LanguageHint>) -> bool {
        self.lookup(&self.hebrew_fillers, &self.latin_fillers, token, script, hint)
    }

    /// Length of the question prefix of `tokens`.
    ///
    /// The prefix must open with a question word; it then runs over question
    /// and filler words. A query that does not open with a question word has
    /// no prefix.
    pub fn leading_run<S: AsRef<str>>(
        &self,
        tokens: &[S],
        script: Script,
        hint: Option<LanguageHint>,
    ) -> usize {
        match tokens.first() {
            Some(first) if self.contains(first.as_ref(), script, hint) => tokens
                .iter()
                .take_while(|t| {
                    let t = t.as_ref();
                    self.contains(t, script, hint) || self.is_filler(t, script, hint)
                })
                .count(),
            _ => 0,
        }
    }

    fn lookup(
        &self,
        hebrew: &HashSet<String>,
        latin: &HashSet<String>,
        token: &str,
        script: Script,
        hint: Option<LanguageHint>,
    ) -> bool {
        let folded = fold(token);
        let use_hebrew = script.is_hebrew_primary()
            || matches!(hint, Some(LanguageHint::Hebrew | LanguageHint::Yiddish));
        let use_latin =
            matches!(script, Script::Latin | Script::Mixed) || hint == Some(LanguageHint::English);

        (use_hebrew && hebrew.contains(&folded)) || (use_latin && latin.contains(&folded))
    }
}

/// All static tables the normalizer consults.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub synonyms: SynonymTable,
    pub question_words: QuestionWords,
}

impl Lexicon {
    /// An empty lexicon: no question words, no synonyms.
    pub fn empty() -> Self {
        Self {
            synonyms: SynonymTable::new(),
            question_words: QuestionWords::default(),
        }
    }

    /// The built-in Hebrew/Yiddish/English tables.
    pub fn builtin() -> Self {
        let mut lexicon = Self::empty();
        lexicon
            .question_words
            .add_hebrew(HEBREW_QUESTION_WORDS.iter().copied());
        lexicon
            .question_words
            .add_latin(LATIN_QUESTION_WORDS.iter().copied());
        lexicon
            .question_words
            .add_hebrew_fillers(HEBREW_FILLER_WORDS.iter().copied());
        lexicon
            .question_words
            .add_latin_fillers(LATIN_FILLER_WORDS.iter().copied());
        for (phrase, canonical) in BUILTIN_SYNONYMS {
            lexicon.synonyms.insert(phrase, canonical);
        }
        lexicon
    }

    /// Add user-supplied synonyms and question words on top of this lexicon.
    pub fn extend(
        &mut self,
        synonyms: &HashMap<String, String>,
        hebrew_words: &[String],
        latin_words: &[String],
    ) {
        // Sorted so a later duplicate key resolves the same way every run
        let mut entries: Vec<_> = synonyms.iter().collect();
        entries.sort();
        for (phrase, canonical) in entries {
            self.synonyms.insert(phrase, canonical);
        }
        self.question_words
            .add_hebrew(hebrew_words.iter().map(String::as_str));
        self.question_words
            .add_latin(latin_words.iter().map(String::as_str));
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

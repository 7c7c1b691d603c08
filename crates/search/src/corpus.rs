//! In-memory corpus model.

use crate::lexicon::{fold, is_hebrew_mark};
use sefer_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Source collection a passage belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// A maamar, identified by its opening words (ד״ה)
    Discourse,
    /// Any other work: books, letters, talks
    Treatise,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discourse => "discourse",
            Self::Treatise => "treatise",
        }
    }

    /// Parse a collection name (`discourse`/`maamar`, `treatise`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "discourse" | "discourses" | "maamar" | "maamarim" | "מאמר" | "מאמרים" => {
                Some(Self::Discourse)
            }
            "treatise" | "treatises" | "book" | "books" => Some(Self::Treatise),
            _ => None,
        }
    }
}

/// Restricts a search to part of the corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Collection>,
    /// Substring of the work title or source path; case and niqqud are ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.collection.is_none() && self.work_needle().is_none()
    }

    pub fn matches(&self, passage: &Passage) -> bool {
        if self.collection.is_some_and(|c| c != passage.collection) {
            return false;
        }
        match self.work_needle() {
            None => true,
            Some(needle) => {
                fold(&passage.citation.title).contains(&needle)
                    || passage
                        .citation
                        .source
                        .as_deref()
                        .is_some_and(|source| fold(source).contains(&needle))
            }
        }
    }

    fn work_needle(&self) -> Option<String> {
        self.work
            .as_deref()
            .map(|work| fold(work.trim()))
            .filter(|needle| !needle.is_empty())
    }
}

/// Structured citation metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Citation {
    /// Work title
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Discourse title (ד״ה)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsection: Option<String>,
    /// Source file the passage came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Immutable unit of corpus content.
#[derive(Debug, Clone, Serialize)]
pub struct Passage {
    pub id: String,
    pub collection: Collection,
    pub text: String,
    pub citation: Citation,
    /// Text length in characters
    pub length: usize,
    #[serde(skip)]
    folded: String,
}

impl Passage {
    pub fn new(
        id: impl Into<String>,
        collection: Collection,
        text: impl Into<String>,
        citation: Citation,
    ) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            collection,
            length: text.chars().count(),
            folded: fold(&text),
            text,
            citation,
        }
    }

    /// Case- and niqqud-folded text used for matching.
    pub fn folded_text(&self) -> &str {
        &self.folded
    }

    /// Character offset in `text` where `term` first occurs, compared folded.
    pub fn locate(&self, term: &str) -> Option<usize> {
        let needle = fold(term);
        if needle.is_empty() {
            return None;
        }
        let target = self.folded.find(&needle)?;

        // Walk the raw text, tracking how far into the folded text each letter lands
        let mut folded_offset = 0;
        for (index, c) in self.text.chars().enumerate() {
            if is_hebrew_mark(c) {
                continue;
            }
            if folded_offset >= target {
                return Some(index);
            }
            folded_offset += c.to_lowercase().map(char::len_utf8).sum::<usize>();
        }
        None
    }
}

/// Ordered, read-only sequence of passages with unique ids.
#[derive(Debug, Default)]
pub struct Corpus {
    passages: Vec<Passage>,
    by_id: HashMap<String, usize>,
}

impl Corpus {
    /// Build a corpus, preserving order.
    ///
    /// # Errors
    /// Returns a `Corpus` error on a duplicate passage id.
    pub fn new(passages: Vec<Passage>) -> AppResult<Self> {
        let mut by_id = HashMap::with_capacity(passages.len());
        for (index, passage) in passages.iter().enumerate() {
            if by_id.insert(passage.id.clone(), index).is_some() {
                return Err(AppError::Corpus(format!(
                    "Duplicate passage id: {}",
                    passage.id
                )));
            }
        }
        Ok(Self { passages, by_id })
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn get(&self, id: &str) -> Option<&Passage> {
        self.by_id.get(id).map(|&index| &self.passages[index])
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn stats(&self) -> CorpusStats {
        let mut by_collection = BTreeMap::new();
        let mut works = HashSet::new();
        let mut total_chars = 0;

        for passage in &self.passages {
            *by_collection
                .entry(passage.collection.as_str().to_string())
                .or_insert(0) += 1;
            works.insert(passage.citation.title.as_str());
            total_chars += passage.length;
        }

        CorpusStats {
            passages: self.passages.len(),
            by_collection,
            works: works.len(),
            total_chars,
        }
    }

    /// One entry per work title, in corpus order.
    pub fn works(&self) -> Vec<WorkSummary> {
        let mut works: Vec<WorkSummary> = Vec::new();
        let mut by_title: HashMap<&str, usize> = HashMap::new();

        for passage in &self.passages {
            let title = passage.citation.title.as_str();
            let index = *by_title.entry(title).or_insert_with(|| {
                works.push(WorkSummary {
                    title: title.to_string(),
                    author: passage.citation.author.clone(),
                    collection: passage.collection,
                    source: passage.citation.source.clone(),
                    passages: 0,
                    total_chars: 0,
                });
                works.len() - 1
            });
            works[index].passages += 1;
            works[index].total_chars += passage.length;
        }

        works
    }
}

/// A work in the corpus and how much of it was loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkSummary {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Collection of the work's first passage
    pub collection: Collection,
    /// Source file of the work's first passage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub passages: usize,
    #[serde(rename = "totalChars")]
    pub total_chars: usize,
}

/// Corpus summary for the `corpus` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub passages: usize,
    #[serde(rename = "byCollection")]
    pub by_collection: BTreeMap<String, usize>,
    pub works: usize,
    #[serde(rename = "totalChars")]
    pub total_chars: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(id: &str, collection: Collection, title: &str, text: &str) -> Passage {
        Passage::new(
            id,
            collection,
            text,
            Citation {
                title: title.to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_passage_length_in_chars() {
        let p = passage("a", Collection::Treatise, "תניא", "שָׁלוֹם");
        assert_eq!(p.length, 7);
        assert_eq!(p.folded_text(), "שלום");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Corpus::new(vec![
            passage("a", Collection::Treatise, "t", "x"),
            passage("a", Collection::Treatise, "t", "y"),
        ]);
        assert!(matches!(result, Err(AppError::Corpus(msg)) if msg.contains("a")));
    }

    #[test]
    fn test_lookup_and_order() {
        let corpus = Corpus::new(vec![
            passage("b", Collection::Discourse, "ספר המאמרים", "one"),
            passage("a", Collection::Treatise, "תניא", "two"),
        ])
        .unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.passages()[0].id, "b");
        assert_eq!(corpus.get("a").map(|p| p.text.as_str()), Some("two"));
        assert!(corpus.get("missing").is_none());
    }

    #[test]
    fn test_stats() {
        let corpus = Corpus::new(vec![
            passage("1", Collection::Discourse, "ספר המאמרים", "abc"),
            passage("2", Collection::Discourse, "ספר המאמרים", "de"),
            passage("3", Collection::Treatise, "תניא", "f"),
        ])
        .unwrap();

        let stats = corpus.stats();
        assert_eq!(stats.passages, 3);
        assert_eq!(stats.works, 2);
        assert_eq!(stats.total_chars, 6);
        assert_eq!(stats.by_collection.get("discourse"), Some(&2));
        assert_eq!(stats.by_collection.get("treatise"), Some(&1));
    }

    #[test]
    fn test_works_in_corpus_order() {
        let corpus = Corpus::new(vec![
            passage("1", Collection::Discourse, "ספר המאמרים", "abc"),
            passage("2", Collection::Treatise, "תניא", "f"),
            passage("3", Collection::Discourse, "ספר המאמרים", "de"),
        ])
        .unwrap();

        let works = corpus.works();
        assert_eq!(works.len(), 2);
        assert_eq!(works[0].title, "ספר המאמרים");
        assert_eq!(works[0].passages, 2);
        assert_eq!(works[0].total_chars, 5);
        assert_eq!(works[0].collection, Collection::Discourse);
        assert_eq!(works[1].title, "תניא");
        assert_eq!(works[1].passages, 1);
    }

    #[test]
    fn test_filter_by_collection_and_work() {
        let mut with_source = passage("1", Collection::Discourse, "Sefer HaMaamarim", "x");
        with_source.citation.source = Some("toras-menachem/5712.json".to_string());
        let tanya = passage("2", Collection::Treatise, "תַּנְיָא", "y");

        let discourses = SearchFilter {
            collection: Some(Collection::Discourse),
            ..Default::default()
        };
        assert!(discourses.matches(&with_source));
        assert!(!discourses.matches(&tanya));

        let by_title = SearchFilter {
            work: Some("maamarim".to_string()),
            ..Default::default()
        };
        assert!(by_title.matches(&with_source));
        assert!(!by_title.matches(&tanya));

        // Source path and niqqud-free spelling both match
        let by_source = SearchFilter {
            work: Some("Toras-Menachem".to_string()),
            ..Default::default()
        };
        assert!(by_source.matches(&with_source));
        let unpointed = SearchFilter {
            work: Some("תניא".to_string()),
            ..Default::default()
        };
        assert!(unpointed.matches(&tanya));

        let blank = SearchFilter {
            work: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(blank.is_empty());
        assert!(blank.matches(&tanya));
    }

    #[test]
    fn test_collection_parse() {
        assert_eq!(Collection::parse("Maamarim"), Some(Collection::Discourse));
        assert_eq!(Collection::parse("treatise"), Some(Collection::Treatise));
        assert_eq!(Collection::parse("letters"), None);
    }

    #[test]
    fn test_locate_maps_back_to_raw_text() {
        let p = passage("a", Collection::Treatise, "t", "ענין הַצִּמְצוּם הראשון");
        // The folded match starts at the ה after "ענין "
        assert_eq!(p.locate("הצמצום"), Some(5));
        assert_eq!(p.locate("הראשון"), Some(17));
        assert_eq!(p.locate("חסד"), None);

        let latin = passage("b", Collection::Treatise, "t", "On Bittul HaYesh");
        assert_eq!(latin.locate("bittul"), Some(3));
    }
}

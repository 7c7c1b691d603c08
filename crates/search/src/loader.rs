//! JSON corpus provider.
//!
//! Reads book files of the form
//! `{book_name_he, book_name_en, book_metadata, chunks: [...]}` and turns
//! every chunk into a [`Passage`].

use crate::corpus::{Citation, Collection, Corpus, Passage};
use regex::Regex;
use sefer_core::{AppError, AppResult};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

const UNKNOWN_AUTHOR: &str = "לא ידוע";

/// Path keywords → author, checked in order.
const AUTHOR_KEYWORDS: &[(&[&str], &str)] = &[
    (&["alter rebbe", "admur hazaken"], "אדמו״ר הזקן"),
    (&["mitteler rebbe"], "אדמו״ר האמצעי"),
    (&["tzemach tzedek"], "הצמח צדק"),
    (&["rebbe rayatz"], "אדמו״ר הריי״צ"),
    (&["the rebbe"], "הרבי"),
];

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid HTML tag pattern"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// `ד״ה` (or `ד"ה`) followed by the opening words, up to a `/`.
static DISCOURSE_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"ד["״]ה\s*([^/]+)"#).expect("valid discourse title pattern"));

#[derive(Debug, Deserialize)]
struct BookFile {
    #[serde(default)]
    book_name_he: String,
    #[serde(default)]
    book_name_en: String,
    #[serde(default)]
    book_metadata: BookMetadata,
    #[serde(default)]
    chunks: Vec<ChunkRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct BookMetadata {
    #[serde(default)]
    author_he: String,
    #[serde(default)]
    author_en: String,
}

#[derive(Debug, Deserialize)]
struct ChunkRecord {
    #[serde(default)]
    chunk_id: serde_json::Value,
    #[serde(default)]
    text: String,
    #[serde(default)]
    chunk_title: String,
    #[serde(default)]
    chunk_metadata: ChunkMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkMetadata {
    chunk_title: Option<String>,
    dibbur_hamaschil: Option<String>,
    maamar: Option<String>,
    discourse_title: Option<String>,
}

/// Load every `*.json` book under `root` (or `root` itself if it is a file).
///
/// Files are read in sorted path order so passage order is stable.
///
/// # Errors
/// Returns a `Corpus` error if `root` does not exist. Unreadable or
/// malformed files are skipped with a warning.
pub fn load_corpus(root: &Path) -> AppResult<Corpus> {
    if !root.exists() {
        return Err(AppError::Corpus(format!(
            "Corpus path not found: {:?}",
            root
        )));
    }

    let mut passages = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut files_loaded = 0usize;
    let mut files_skipped = 0usize;

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .ok()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(entry.file_name()))
            .to_string_lossy()
            .replace('\\', "/");

        match load_book(path, &relative) {
            Ok(book) => {
                files_loaded += 1;
                for passage in book {
                    if seen_ids.insert(passage.id.clone()) {
                        passages.push(passage);
                    } else {
                        tracing::warn!("Skipping duplicate passage id: {}", passage.id);
                    }
                }
            }
            Err(e) => {
                files_skipped += 1;
                tracing::warn!("Skipping corpus file {:?}: {}", path, e);
            }
        }
    }

    tracing::info!(
        "Loaded corpus: {} passages from {} files ({} skipped)",
        passages.len(),
        files_loaded,
        files_skipped
    );

    Corpus::new(passages)
}

/// Parse one book file into passages.
fn load_book(path: &Path, relative: &str) -> AppResult<Vec<Passage>> {
    let content = std::fs::read_to_string(path)?;
    let book: BookFile = serde_json::from_str(&content)?;

    let title = book_title(&book, path);
    let author = infer_author(&path.to_string_lossy(), &book.book_metadata);

    let passages = book
        .chunks
        .into_iter()
        .enumerate()
        .filter_map(|(position, chunk)| {
            let text = clean_html(&chunk.text);
            if text.is_empty() {
                return None;
            }

            let chunk_id = match &chunk.chunk_id {
                serde_json::Value::String(s) if !s.is_empty() => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                _ => position.to_string(),
            };

            let section = Some(chunk.chunk_title.trim())
                .filter(|s| !s.is_empty())
                .or_else(|| chunk.chunk_metadata.chunk_title.as_deref().map(str::trim))
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            let subsection = discourse_title(&chunk.chunk_metadata, section.as_deref());
            let collection = if subsection.is_some() {
                Collection::Discourse
            } else {
                Collection::Treatise
            };

            Some(Passage::new(
                format!("{}#{}", relative, chunk_id),
                collection,
                text,
                Citation {
                    title: title.clone(),
                    author: Some(author.clone()),
                    section,
                    subsection,
                    source: Some(relative.to_string()),
                },
            ))
        })
        .collect();

    Ok(passages)
}

fn book_title(book: &BookFile, path: &Path) -> String {
    let he = book.book_name_he.trim();
    let en = book.book_name_en.trim();
    match (he.is_empty(), en.is_empty()) {
        (false, false) => format!("{} / {}", he, en),
        (false, true) => he.to_string(),
        (true, false) => en.to_string(),
        (true, true) => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Author from path keywords, then book metadata.
fn infer_author(path: &str, metadata: &BookMetadata) -> String {
    let lowered = path.to_lowercase();
    AUTHOR_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, author)| author.to_string())
        .or_else(|| Some(metadata.author_he.trim()).filter(|s| !s.is_empty()).map(str::to_string))
        .or_else(|| Some(metadata.author_en.trim()).filter(|s| !s.is_empty()).map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

/// Discourse opening words, without the `ד״ה` prefix.
fn discourse_title(metadata: &ChunkMetadata, section: Option<&str>) -> Option<String> {
    let from_metadata = [
        &metadata.dibbur_hamaschil,
        &metadata.maamar,
        &metadata.discourse_title,
    ]
    .into_iter()
    .flatten()
    .map(|value| strip_discourse_prefix(value))
    .find(|value| !value.is_empty());

    from_metadata.or_else(|| {
        let title = section?;
        let captures = DISCOURSE_TITLE_RE.captures(title)?;
        let words = captures.get(1)?.as_str().trim();
        (!words.is_empty()).then(|| words.to_string())
    })
}

fn strip_discourse_prefix(value: &str) -> String {
    let value = value.trim();
    ["ד״ה", "ד\"ה"]
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix))
        .unwrap_or(value)
        .trim()
        .to_string()
}

/// Strip HTML tags and collapse whitespace.
pub fn clean_html(text: &str) -> String {
    let without_tags = HTML_TAG_RE.replace_all(text, " ");
    WHITESPACE_RE
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

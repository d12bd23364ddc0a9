//! Verse splitting and verse pagination
//!
//! A verse is a blank-line separated block of lyrics. Text without blank lines
//! is split per line instead, so every line becomes its own verse.

/// Split lyrics into verses
///
/// Separators are kept exactly: empty text yields one empty verse, and a
/// trailing blank line yields a trailing empty verse.
pub fn split_verses(lyrics: &str) -> Vec<String> {
    let verses: Vec<&str> = lyrics.split("\n\n").collect();
    let verses = if verses.len() == 1 {
        lyrics.split('\n').collect()
    } else {
        verses
    };

    verses.into_iter().map(str::to_string).collect()
}

/// Requested slice of the verse list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseWindow {
    /// 1-indexed page, always >= 1
    pub page: usize,
    /// Verses per page, always >= 1
    pub limit: usize,
}

impl VerseWindow {
    /// Window for the raw `page`/`limit` query values
    ///
    /// Returns `None` when neither was supplied (empty counts as not
    /// supplied), meaning "every verse". Once either is present, a missing,
    /// unparsable or non-positive value falls back to 1.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Option<Self> {
        let page = page.filter(|v| !v.is_empty());
        let limit = limit.filter(|v| !v.is_empty());
        if page.is_none() && limit.is_none() {
            return None;
        }

        let parse = |raw: Option<&str>| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v >= 1)
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(1)
        };

        Some(Self {
            page: parse(page),
            limit: parse(limit),
        })
    }

    /// Apply the window; a start past the end gives an empty page
    pub fn apply(&self, verses: Vec<String>) -> Vec<String> {
        let start = (self.page - 1).saturating_mul(self.limit);
        if start >= verses.len() {
            return Vec::new();
        }
        let end = start.saturating_add(self.limit).min(verses.len());

        verses.into_iter().skip(start).take(end - start).collect()
    }
}

/// Split and optionally window lyrics in one step
pub fn paginate_lyrics(lyrics: &str, window: Option<VerseWindow>) -> Vec<String> {
    let verses = split_verses(lyrics);
    match window {
        Some(window) => window.apply(verses),
        None => verses,
    }
}

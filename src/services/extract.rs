// src/services/extract.rs

//! Post extraction from profile-page markup.
//!
//! Post rows and the author section are located with CSS selectors; pieces
//! the markup only exposes as loose text (the "from ..." client span) are
//! matched with regular expressions over the row's HTML. Fragment text is
//! cleaned before it reaches a record: anchors are reduced to their bare
//! URL, remaining tags stripped, character references unescaped.

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Author, PostRecord};

/// Prefix of a post row's `id` attribute; the numeric record id follows.
const ID_ATTR_PREFIX: &str = "status_";

/// Extracts post records from one fetched profile page.
pub struct PostExtractor {
    post_row: Selector,
    content: Selector,
    author_name: Selector,
    author_handle: Selector,
    source: Regex,
    anchor: Regex,
    tag: Regex,
}

impl PostExtractor {
    /// Compile the selector and pattern set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            post_row: Self::parse_selector("li.hentry.status")?,
            content: Self::parse_selector("span.entry-content")?,
            author_name: Self::parse_selector("span.fn")?,
            author_handle: Self::parse_selector(r#"meta[name="page-user-screen_name"]"#)?,
            source: Self::parse_regex(r"(?s)<span>from (.*?)</span>")?,
            anchor: Self::parse_regex(r#"(?s)<a href="(https?://[^"]*)"[^>]*>.*?</a>"#)?,
            tag: Self::parse_regex(r"<[^>]*>")?,
        })
    }

    /// Extract all post records from `page`.
    ///
    /// The page presents newest posts first; the result is reversed so
    /// callers deliver in natural chronological order. Every record is
    /// stamped with `observed_at`. A page without an author section is a
    /// parse error; a page with zero post rows is an empty result.
    pub fn extract(&self, page: &str, observed_at: DateTime<Utc>) -> Result<Vec<PostRecord>> {
        let document = Html::parse_document(page);
        let author = self.extract_author(&document)?;

        let mut records = Vec::new();
        for row in document.select(&self.post_row) {
            records.push(self.extract_post(&row, &author, observed_at)?);
        }

        records.reverse();
        Ok(records)
    }

    /// The author section is read once per page; every record shares it.
    fn extract_author(&self, document: &Html) -> Result<Author> {
        let display_name = document
            .select(&self.author_name)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .ok_or_else(|| AppError::parse("author display name (span.fn) not found"))?;

        let handle = document
            .select(&self.author_handle)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(str::to_string)
            .ok_or_else(|| AppError::parse("page-user-screen_name meta tag not found"))?;

        Ok(Author {
            display_name,
            handle,
        })
    }

    fn extract_post(
        &self,
        row: &ElementRef<'_>,
        author: &Author,
        observed_at: DateTime<Utc>,
    ) -> Result<PostRecord> {
        let id = row
            .value()
            .attr("id")
            .and_then(|attr| attr.strip_prefix(ID_ATTR_PREFIX))
            .and_then(|digits| digits.parse::<u64>().ok())
            .ok_or_else(|| AppError::parse("post row has no numeric status id"))?;

        let content = row
            .select(&self.content)
            .next()
            .map(|el| el.inner_html())
            .ok_or_else(|| AppError::parse(format!("post {id}: entry content not found")))?;

        let row_html = row.html();
        let source_client = self
            .source
            .captures(&row_html)
            .and_then(|caps| caps.get(1))
            .map(|m| self.strip_tags(m.as_str()))
            .ok_or_else(|| AppError::parse(format!("post {id}: source client not found")))?;

        Ok(PostRecord {
            id,
            text: self.clean_text(&content),
            source_client,
            author: author.clone(),
            observed_at,
        })
    }

    /// Reduce an HTML fragment to plain post text.
    fn clean_text(&self, fragment: &str) -> String {
        let bare_links = self.anchor.replace_all(fragment, "$1");
        self.strip_tags(&bare_links)
    }

    /// Drop every tag, then unescape character references.
    fn strip_tags(&self, fragment: &str) -> String {
        let stripped = self.tag.replace_all(fragment, "");
        html_escape::decode_html_entities(&stripped).trim().to_string()
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::pattern(s, format!("{e:?}")))
    }

    fn parse_regex(s: &str) -> Result<Regex> {
        Regex::new(s).map_err(|e| AppError::pattern(s, e))
    }
}

use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::classify::SectionCatalog;
use super::entities::EntityExtractor;
use super::types::Section;
use crate::config::StructuringConfig;

/// Header shapes recognized on a single trimmed line. Group 1 is the title.
static HEADER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Markdown: "## Title"
        Regex::new(r"^#+\s+(.+)$").unwrap(),
        // Numbered: "3. Title" / "3 Title"
        Regex::new(r"^(\d+\.?\s+.+)$").unwrap(),
        // All caps: "SECURITY MODEL"
        Regex::new(r"^([A-Z][A-Z\s]+)$").unwrap(),
    ]
});

/// Setext underline following a title line.
static UNDERLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[=-]{3,}$").unwrap());

static LEADING_NUMBERING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.?\s*").unwrap());
static LEADING_MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[#*-]+\s*").unwrap());

/// Produces candidate sections from normalized text with three independent
/// strategies. Overlap between strategies is expected; the reconciler resolves it.
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    catalog: Arc<SectionCatalog>,
    entities: EntityExtractor,
    config: StructuringConfig,
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new(
            SectionCatalog::standard(),
            EntityExtractor::default(),
            StructuringConfig::default(),
        )
    }
}

impl SectionExtractor {
    pub fn new(
        catalog: Arc<SectionCatalog>,
        entities: EntityExtractor,
        config: StructuringConfig,
    ) -> Self {
        Self {
            catalog,
            entities,
            config,
        }
    }

    /// Header, keyword and chunk sections concatenated in that order.
    pub fn extract(&self, text: &str) -> Vec<Section> {
        let by_headers = self.extract_by_headers(text);
        let by_keywords = self.extract_by_keywords(text);
        let by_chunks = self.extract_by_chunks(text);

        tracing::debug!(
            headers = by_headers.len(),
            keywords = by_keywords.len(),
            chunks = by_chunks.len(),
            "Candidate sections extracted"
        );

        let mut sections = by_headers;
        sections.extend(by_keywords);
        sections.extend(by_chunks);
        sections
    }

    /// Sections delimited by header lines. Text before the first header and
    /// headers with an empty body produce nothing.
    pub fn extract_by_headers(&self, text: &str) -> Vec<Section> {
        let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
        let mut sections = Vec::new();
        let mut title: Option<&str> = None;
        let mut body: Vec<&str> = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            let underlined =
                !line.is_empty() && lines.get(i + 1).is_some_and(|next| UNDERLINE.is_match(next));
            let heading = header_title(line).or(underlined.then_some(line));

            match heading {
                Some(heading) => {
                    if let Some(prev) = title {
                        sections.extend(self.header_section(prev, &body));
                    }
                    title = Some(heading);
                    body.clear();
                    if underlined {
                        i += 1;
                    }
                }
                None => {
                    if title.is_some() {
                        body.push(line);
                    }
                }
            }
            i += 1;
        }

        if let Some(prev) = title {
            sections.extend(self.header_section(prev, &body));
        }
        sections
    }

    fn header_section(&self, title: &str, body: &[&str]) -> Option<Section> {
        let content = body.join("\n").trim().to_string();
        if content.is_empty() {
            return None;
        }
        Some(Section {
            title: title.to_string(),
            section_type: self.catalog.classify(title, &content),
            confidence: self.config.header_confidence,
            entities: self.entities.extract_terms(&content),
            content,
        })
    }

    /// One section per required type: every line matching one of the type's
    /// keywords contributes itself plus a symmetric context window.
    pub fn extract_by_keywords(&self, text: &str) -> Vec<Section> {
        let lines: Vec<&str> = text.split('\n').collect();
        let window = self.config.context_window;
        let mut sections = Vec::new();

        for rule in self.catalog.rules() {
            let mut related: Vec<&str> = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                if rule.matches_line(line) {
                    let start = i.saturating_sub(window);
                    let end = (i + window + 1).min(lines.len());
                    related.extend_from_slice(&lines[start..end]);
                }
            }

            if related.is_empty() {
                continue;
            }
            let content = related.join("\n");
            sections.push(Section {
                title: format!("Extracted {}", rule.section_type.label()),
                section_type: rule.section_type,
                confidence: self.config.keyword_confidence,
                entities: self.entities.extract_terms(&content),
                content,
            });
        }
        sections
    }

    /// Sections from paragraph-packed chunks. Short chunks are dropped but
    /// still count toward the positional fallback title.
    pub fn extract_by_chunks(&self, text: &str) -> Vec<Section> {
        self.split_into_chunks(text)
            .into_iter()
            .enumerate()
            .filter(|(_, chunk)| chunk.trim().chars().count() >= self.config.min_chunk_chars)
            .map(|(i, chunk)| Section {
                title: self
                    .chunk_title(&chunk)
                    .unwrap_or_else(|| format!("Section {}", i + 1)),
                section_type: self.catalog.classify("", &chunk),
                confidence: self.config.chunk_confidence,
                entities: self.entities.extract_terms(&chunk),
                content: chunk,
            })
            .collect()
    }

    /// Pack consecutive paragraphs into chunks while the accumulated length
    /// stays under the configured chunk size. A single oversized paragraph
    /// becomes its own chunk.
    pub fn split_into_chunks(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0usize;

        for paragraph in text.split("\n\n") {
            let paragraph_chars = paragraph.chars().count();
            if current_chars + paragraph_chars < self.config.chunk_size {
                current.push_str(paragraph);
                current.push_str("\n\n");
                current_chars += paragraph_chars + 2;
            } else {
                if !current.is_empty() {
                    chunks.push(current.trim().to_string());
                }
                current = format!("{paragraph}\n\n");
                current_chars = paragraph_chars + 2;
            }
        }

        if !current.is_empty() {
            chunks.push(current.trim().to_string());
        }
        chunks
    }

    /// First line of usable title length, with numbering and markdown
    /// prefixes stripped.
    pub fn chunk_title(&self, chunk: &str) -> Option<String> {
        chunk.split('\n').map(str::trim).find_map(|line| {
            let len = line.chars().count();
            if len <= self.config.title_min_chars || len >= self.config.title_max_chars {
                return None;
            }
            let cleaned = LEADING_NUMBERING.replace(line, "");
            let cleaned = LEADING_MARKUP.replace(&cleaned, "");
            (cleaned.chars().count() > 5).then(|| cleaned.into_owned())
        })
    }
}

fn header_title(line: &str) -> Option<&str> {
    HEADER_PATTERNS
        .iter()
        .find_map(|p| p.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

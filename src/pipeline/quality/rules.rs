use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::pipeline::structuring::CatalogError;

/// Domain vocabulary and pattern tables the metric checks read from.
///
/// Built once and shared; substitute a custom instance to score against a
/// different vocabulary.
#[derive(Debug)]
pub struct QualityRules {
    vocabulary: Vec<String>,
    known_terms: HashSet<String>,
    keyword_patterns: Vec<Regex>,
    protocol_patterns: Vec<Regex>,
    unit_patterns: Vec<Regex>,
    phrases: PhrasePatterns,
}

/// Weight of each domain category in the domain-coverage score.
const KEYWORD_WEIGHT: f64 = 0.4;
const PROTOCOL_WEIGHT: f64 = 0.3;
const UNIT_WEIGHT: f64 = 0.3;

/// Each pattern is expected to appear about this many times in a thorough artifact.
const EXPECTED_HITS_PER_PATTERN: usize = 2;

static STANDARD_RULES: LazyLock<Arc<QualityRules>> = LazyLock::new(|| {
    let vocabulary = [
        "gNodeB",
        "5G NR",
        "5GC",
        "AMF",
        "SMF",
        "UPF",
        "NGAP",
        "NAS",
        "RRC",
        "PDCP",
        "RLC",
        "MAC",
        "PHY",
        "beamforming",
        "MIMO",
        "carrier aggregation",
        "network slicing",
        "latency",
        "URLLC",
    ];
    let protocols = [
        // Interfaces
        r"\b(?:N[1-9]\d?|Xn|F1|E1|NG|S1|X2)\b",
        // Protocols
        r"\b(?:NGAP|NAS|RRC|PDCP|RLC|GTP|SCTP)\b",
        // Frequency ranges
        r"\b(?:FR1|FR2|sub-?6|mmWave)\b",
        // Architecture modes
        r"\b(?:NSA|SA|EN-DC)\b",
    ];
    let units = [
        r"\d+\.?\d*\s*(?:MHz|GHz|kHz)",
        r"\d+\.?\d*\s*(?:Mbps|Gbps|kbps)",
        r"\d+\.?\d*\s*(?:ms|μs|ns)",
        r"\d+\.?\d*\s*(?:dB|dBm|dBi)",
        r"\d+\.?\d*\s*(?:%|percent)",
    ];
    let rules = QualityRules::new(
        vocabulary.iter().map(|s| s.to_string()).collect(),
        protocols.iter().map(|s| s.to_string()).collect(),
        units.iter().map(|s| s.to_string()).collect(),
    )
    .expect("built-in quality rules must be valid");
    Arc::new(rules)
});

impl QualityRules {
    /// Build rule tables from a known-term vocabulary plus protocol and unit
    /// regex sources. All matching is case-insensitive.
    pub fn new(
        vocabulary: Vec<String>,
        protocol_patterns: Vec<String>,
        unit_patterns: Vec<String>,
    ) -> Result<Self, CatalogError> {
        if vocabulary.is_empty() {
            return Err(CatalogError::Empty("vocabulary".into()));
        }
        if protocol_patterns.is_empty() {
            return Err(CatalogError::Empty("protocol patterns".into()));
        }
        if unit_patterns.is_empty() {
            return Err(CatalogError::Empty("unit patterns".into()));
        }

        let keyword_patterns = vocabulary
            .iter()
            .map(|term| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))))
            .collect::<Result<Vec<_>, _>>()?;
        let protocol_patterns = compile_insensitive(&protocol_patterns)?;
        let unit_patterns = compile_insensitive(&unit_patterns)?;
        let known_terms = vocabulary.iter().map(|t| t.to_lowercase()).collect();

        Ok(Self {
            vocabulary,
            known_terms,
            keyword_patterns,
            protocol_patterns,
            unit_patterns,
            phrases: PhrasePatterns::compile(&PhraseTables::default())?,
        })
    }

    /// Copy of these rules with the phrase and measurement tables replaced.
    pub fn with_phrases(&self, tables: &PhraseTables) -> Result<Self, CatalogError> {
        Ok(Self {
            vocabulary: self.vocabulary.clone(),
            known_terms: self.known_terms.clone(),
            keyword_patterns: self.keyword_patterns.clone(),
            protocol_patterns: self.protocol_patterns.clone(),
            unit_patterns: self.unit_patterns.clone(),
            phrases: PhrasePatterns::compile(tables)?,
        })
    }

    pub fn phrases(&self) -> &PhrasePatterns {
        &self.phrases
    }

    /// The built-in 5G rule tables, shared process-wide.
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD_RULES)
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Case-insensitive vocabulary membership.
    pub fn is_known_term(&self, term: &str) -> bool {
        self.known_terms.contains(&term.to_lowercase())
    }

    /// Total matches of every keyword, protocol and unit pattern.
    pub fn technical_detail_count(&self, text: &str) -> usize {
        self.categories()
            .iter()
            .map(|(patterns, _)| count_matches(patterns, text))
            .sum()
    }

    /// Weighted density of domain vocabulary in `text`, in [0, 1].
    pub fn domain_coverage(&self, text: &str) -> f64 {
        self.categories()
            .iter()
            .map(|(patterns, weight)| {
                let expected = patterns.len() * EXPECTED_HITS_PER_PATTERN;
                ratio(count_matches(patterns, text), expected) * weight
            })
            .sum()
    }

    fn categories(&self) -> [(&[Regex], f64); 3] {
        [
            (self.keyword_patterns.as_slice(), KEYWORD_WEIGHT),
            (self.protocol_patterns.as_slice(), PROTOCOL_WEIGHT),
            (self.unit_patterns.as_slice(), UNIT_WEIGHT),
        ]
    }
}

fn compile_insensitive(sources: &[String]) -> Result<Vec<Regex>, regex::Error> {
    sources
        .iter()
        .map(|src| Regex::new(&format!("(?i){src}")))
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Phrase and measurement tables
// ═══════════════════════════════════════════════════════════

/// Regex and word-list sources for the lexical checks. Regex sources match
/// case-insensitively except `acronym`. Measurement sources capture the
/// numeric value first and the unit second (`reliability_claim` captures only
/// the value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseTables {
    /// Section names a complete prompt announces ("context", "task").
    pub section_markers: Vec<String>,
    pub good_practices: Vec<String>,
    /// Vague imperatives and discouraged shortcuts.
    pub problematic: Vec<String>,
    /// Named outputs, scored by compatibility.
    pub named_deliverables: Vec<String>,
    /// Concrete outcomes, scored by actionability.
    pub deliverables: Vec<String>,
    pub imperative_verbs: Vec<String>,
    pub action_verbs: Vec<String>,
    pub constraint_indicators: Vec<String>,
    pub implementation_words: Vec<String>,
    pub example_markers: Vec<String>,
    /// Band names that cannot both describe one deployment.
    pub band_conflicts: Vec<(String, String)>,
    pub acronym: String,
    pub latency_value: String,
    pub latency_claim: String,
    pub bandwidth_value: String,
    pub frequency_value: String,
    pub reliability_claim: String,
}

impl Default for PhraseTables {
    fn default() -> Self {
        Self {
            section_markers: strings(&["context", "requirements", "constraints", "task"]),
            good_practices: strings(&[
                r"implement\s+\w+",
                r"create\s+(?:function|class|module)",
                r"following\s+(?:pattern|convention)",
                r"with\s+(?:error handling|logging)",
                r"test\s+(?:coverage|cases)",
            ]),
            problematic: strings(&[
                r"just\s+(?:write|create|make)",
                r"somehow\s+(?:implement|handle)",
                r"(?:quick|simple|easy)\s+(?:fix|solution)",
                r"without\s+(?:any|much)\s+(?:documentation|comments)",
            ]),
            named_deliverables: strings(&[
                r"(?:function|class|module)\s+(?:named|called)\s+\w+",
                r"(?:return|output)\s+(?:a|an)\s+\w+",
                r"(?:should|must|will)\s+(?:implement|provide|handle)",
            ]),
            deliverables: strings(&[
                r"(?:create|implement|build)\s+(?:a|an)\s+\w+",
                r"(?:function|class|module|component)\s+(?:that|which)",
                r"(?:should|must|will)\s+(?:return|provide|handle)",
            ]),
            imperative_verbs: strings(&[
                "create", "implement", "build", "design", "develop", "write", "generate",
            ]),
            action_verbs: strings(&[
                "implement",
                "create",
                "develop",
                "build",
                "design",
                "write",
                "generate",
                "construct",
                "establish",
                "define",
                "configure",
            ]),
            constraint_indicators: strings(&["following", "adhering to", "according to", "based on"]),
            implementation_words: strings(&[
                "function",
                "class",
                "method",
                "variable",
                "parameter",
                "return",
            ]),
            example_markers: strings(&["example", "for instance", "such as"]),
            band_conflicts: vec![("FR1".into(), "mmWave".into())],
            acronym: r"\b[A-Z]{2,}\b".into(),
            // Lowercase `us` only: "3 US regions" is not a latency.
            latency_value: r"(\d+\.?\d*)\s*(ms|milliseconds?|μs|(?-i:us)|microseconds?)\b".into(),
            latency_claim: r"(?:latency|delay).*?(\d+\.?\d*)\s*(ms|μs)".into(),
            bandwidth_value: r"(\d+\.?\d*)\s*(Mbps|Gbps)".into(),
            frequency_value: r"(\d+\.?\d*)\s*(MHz|GHz)".into(),
            reliability_claim: r"reliability.*?(\d+\.?\d*)\s*%".into(),
        }
    }
}

/// A section name with its heading, `name ... :` and line-start forms.
#[derive(Debug)]
pub struct SectionMarker {
    pub name: String,
    pub patterns: Vec<Regex>,
}

impl SectionMarker {
    pub fn is_present(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Two band names whose joint mention is contradictory.
#[derive(Debug)]
pub struct BandConflict {
    pub first: String,
    pub second: String,
    first_pattern: Regex,
    second_pattern: Regex,
}

impl BandConflict {
    pub fn is_present(&self, text: &str) -> bool {
        self.first_pattern.is_match(text) && self.second_pattern.is_match(text)
    }
}

/// Compiled form of [`PhraseTables`]. Word lists are lowercased.
#[derive(Debug)]
pub struct PhrasePatterns {
    pub section_markers: Vec<SectionMarker>,
    pub good_practices: Vec<Regex>,
    pub problematic: Vec<Regex>,
    pub named_deliverables: Vec<Regex>,
    pub deliverables: Vec<Regex>,
    pub imperative_verbs: Vec<String>,
    pub action_verbs: Vec<String>,
    pub constraint_indicators: Vec<String>,
    pub implementation_words: Vec<String>,
    pub example_markers: Vec<Regex>,
    pub band_conflicts: Vec<BandConflict>,
    pub acronym: Regex,
    pub latency_value: Regex,
    pub latency_claim: Regex,
    pub bandwidth_value: Regex,
    pub frequency_value: Regex,
    pub reliability_claim: Regex,
}

impl PhrasePatterns {
    pub fn compile(tables: &PhraseTables) -> Result<Self, CatalogError> {
        let section_markers = tables
            .section_markers
            .iter()
            .map(|name| -> Result<SectionMarker, regex::Error> {
                let m = regex::escape(name);
                Ok(SectionMarker {
                    name: name.clone(),
                    patterns: vec![
                        Regex::new(&format!(r"(?im)#{{1,6}}\s*{m}"))?,
                        Regex::new(&format!(r"(?i)\b{m}\b.*:"))?,
                        Regex::new(&format!(r"(?im)^{m}"))?,
                    ],
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let band_conflicts = tables
            .band_conflicts
            .iter()
            .map(|(first, second)| -> Result<BandConflict, regex::Error> {
                Ok(BandConflict {
                    first: first.clone(),
                    second: second.clone(),
                    first_pattern: literal_word(first)?,
                    second_pattern: literal_word(second)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            section_markers,
            good_practices: compile_insensitive(&tables.good_practices)?,
            problematic: compile_insensitive(&tables.problematic)?,
            named_deliverables: compile_insensitive(&tables.named_deliverables)?,
            deliverables: compile_insensitive(&tables.deliverables)?,
            imperative_verbs: lowercased(&tables.imperative_verbs),
            action_verbs: lowercased(&tables.action_verbs),
            constraint_indicators: lowercased(&tables.constraint_indicators),
            implementation_words: lowercased(&tables.implementation_words),
            example_markers: compile_insensitive(&tables.example_markers)?,
            band_conflicts,
            acronym: Regex::new(&tables.acronym)?,
            latency_value: measurement("latency_value", &tables.latency_value, 2)?,
            latency_claim: measurement("latency_claim", &tables.latency_claim, 2)?,
            bandwidth_value: measurement("bandwidth_value", &tables.bandwidth_value, 2)?,
            frequency_value: measurement("frequency_value", &tables.frequency_value, 2)?,
            reliability_claim: measurement("reliability_claim", &tables.reliability_claim, 1)?,
        })
    }
}

/// Case-insensitive measurement pattern with at least `groups` captures.
fn measurement(name: &str, source: &str, groups: usize) -> Result<Regex, CatalogError> {
    let pattern = Regex::new(&format!("(?i){source}"))?;
    if pattern.captures_len() <= groups {
        return Err(CatalogError::MissingCaptures(name.to_string()));
    }
    Ok(pattern)
}

fn literal_word(word: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word)))
}

fn lowercased(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════
// Lexical helpers shared by the metric checks
// ═══════════════════════════════════════════════════════════

/// `found / expected`, capped at 1.0. Zero expected yields 0.0.
pub fn ratio(found: usize, expected: usize) -> f64 {
    if expected == 0 {
        return 0.0;
    }
    (found as f64 / expected as f64).min(1.0)
}

/// Sum of non-overlapping matches of every pattern.
pub fn count_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().map(|p| p.find_iter(text).count()).sum()
}

/// Number of patterns matching at least once.
pub fn count_present(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().filter(|p| p.is_match(text)).count()
}

/// Number of words occurring as substrings of the lowercased text.
pub fn count_words_present(words: &[String], lowered: &str) -> usize {
    words.iter().filter(|w| lowered.contains(w.as_str())).count()
}

/// Render a ratio as a percentage with two decimals ("42.50%").
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

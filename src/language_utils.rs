/*!
 * Language utilities.
 *
 * ISO 639-1 / 639-2 code handling (through isolang) and the per-language
 * profiles that name the tokenizer model and the gender→article mapping.
 */

use anyhow::{anyhow, Result};
use isolang::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::nlp::Gender;

/// ISO 639-2/B codes that differ from their 639-2/T counterpart
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(bibliographic, _)| *bibliographic == code)
        .map(|(_, terminological)| *terminological)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 if Language::from_639_1(&normalized_code).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&normalized_code).is_some() => Ok(LanguageCodeType::Part2T),
        3 if part2b_to_part2t(&normalized_code).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    let part2t = match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code).map(|lang| lang.to_639_3().to_string()),
        3 if Language::from_639_3(&normalized_code).is_some() => Some(normalized_code.clone()),
        3 => part2b_to_part2t(&normalized_code).map(str::to_string),
        _ => None,
    };

    part2t.ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible.
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang.to_639_1().map(str::to_string).unwrap_or(part2t))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Tokenizer model and articles for one source language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// ISO 639-1 code, e.g. "de"
    pub code: String,

    /// Model directory name, e.g. "de_core_news_sm"
    pub model: String,

    /// Definite article per grammatical gender
    #[serde(default)]
    pub articles: BTreeMap<Gender, String>,
}

impl LanguageProfile {
    pub fn new(code: impl Into<String>, model: impl Into<String>, articles: &[(Gender, &str)]) -> Self {
        Self {
            code: code.into(),
            model: model.into(),
            articles: articles
                .iter()
                .map(|(gender, article)| (*gender, article.to_string()))
                .collect(),
        }
    }

    pub fn german() -> Self {
        Self::new(
            "de",
            "de_core_news_sm",
            &[(Gender::Masc, "der"), (Gender::Fem, "die"), (Gender::Neut, "das")],
        )
    }

    pub fn french() -> Self {
        Self::new("fr", "fr_core_news_sm", &[(Gender::Masc, "le"), (Gender::Fem, "la")])
    }

    pub fn spanish() -> Self {
        Self::new("es", "es_core_news_sm", &[(Gender::Masc, "el"), (Gender::Fem, "la")])
    }

    /// Built-in profiles
    pub fn defaults() -> Vec<Self> {
        vec![Self::german(), Self::french(), Self::spanish()]
    }

    /// Article for a gender, if the language has one
    pub fn article_for(&self, gender: Gender) -> Option<&str> {
        self.articles.get(&gender).map(String::as_str)
    }
}

/// Find the profile for a language code, accepting any ISO 639 spelling
pub fn find_profile<'a>(profiles: &'a [LanguageProfile], code: &str) -> Option<&'a LanguageProfile> {
    profiles
        .iter()
        .find(|profile| language_codes_match(&profile.code, code))
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse part-of-speech tag (Universal POS tag set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    Noun,
    Propn,
    Verb,
    Aux,
    Adj,
    Adv,
    Pron,
    Det,
    Adp,
    Num,
    Cconj,
    Sconj,
    Part,
    Intj,
    Punct,
    Sym,
    X,
}

impl PartOfSpeech {
    /// Tags that count towards the vocabulary table
    pub fn is_content_word(&self) -> bool {
        matches!(self, Self::Noun | Self::Verb | Self::Adj | Self::Adv)
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Noun => "NOUN",
            Self::Propn => "PROPN",
            Self::Verb => "VERB",
            Self::Aux => "AUX",
            Self::Adj => "ADJ",
            Self::Adv => "ADV",
            Self::Pron => "PRON",
            Self::Det => "DET",
            Self::Adp => "ADP",
            Self::Num => "NUM",
            Self::Cconj => "CCONJ",
            Self::Sconj => "SCONJ",
            Self::Part => "PART",
            Self::Intj => "INTJ",
            Self::Punct => "PUNCT",
            Self::Sym => "SYM",
            Self::X => "X",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for PartOfSpeech {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NOUN" => Ok(Self::Noun),
            "PROPN" => Ok(Self::Propn),
            "VERB" => Ok(Self::Verb),
            "AUX" => Ok(Self::Aux),
            "ADJ" => Ok(Self::Adj),
            "ADV" => Ok(Self::Adv),
            "PRON" => Ok(Self::Pron),
            "DET" => Ok(Self::Det),
            "ADP" => Ok(Self::Adp),
            "NUM" => Ok(Self::Num),
            "CCONJ" | "CONJ" => Ok(Self::Cconj),
            "SCONJ" => Ok(Self::Sconj),
            "PART" => Ok(Self::Part),
            "INTJ" => Ok(Self::Intj),
            "PUNCT" => Ok(Self::Punct),
            "SYM" => Ok(Self::Sym),
            "X" => Ok(Self::X),
            other => Err(format!("unknown part-of-speech tag: {}", other)),
        }
    }
}

/// Grammatical gender reported by the morphology of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    Masc,
    Fem,
    Neut,
}

impl Gender {
    /// Parse a morphological gender value ("Masc", "Fem", "Neut")
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "masc" | "m" | "masculine" => Some(Self::Masc),
            "fem" | "f" | "feminine" => Some(Self::Fem),
            "neut" | "n" | "neuter" => Some(Self::Neut),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Masc => "Masc",
            Self::Fem => "Fem",
            Self::Neut => "Neut",
        };
        f.write_str(name)
    }
}

/// A single analyzed token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Raw surface form
    pub text: String,
    /// Base form as reported by the model (not necessarily lowercase)
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub is_alpha: bool,
    pub is_stop: bool,
    pub gender: Option<Gender>,
}

impl Token {
    pub fn new(text: impl Into<String>, lemma: impl Into<String>, pos: PartOfSpeech) -> Self {
        let text = text.into();
        let is_alpha = !text.is_empty() && text.chars().all(char::is_alphabetic);
        Self {
            text,
            lemma: lemma.into(),
            pos,
            is_alpha,
            is_stop: false,
            gender: None,
        }
    }

    pub fn stop(mut self) -> Self {
        self.is_stop = true;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }
}

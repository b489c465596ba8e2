use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StudioError;

/// Suggested prompts the contributor can read aloud while recording.
pub const PROMPT_PHRASES: &[&str] = &[
    "سلام",
    "ممنون",
    "بیر",
    "ایکی",
    "اوچ",
    "آت",
    "قویون",
    "من قاشقایام",
    "سن نئجه‌سین؟",
    "بو دیل بیزیم دیلیمیز",
];

/// Allowed range for the speaker age field.
pub const SPEAKER_AGE_MIN: u8 = 1;
pub const SPEAKER_AGE_MAX: u8 = 120;

/// Qashqai regional variants a recording can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Amaleh,
    Dareshuri,
    Farsimadan,
    Kashkuli,
    Sheshboluki,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::Amaleh,
        Dialect::Dareshuri,
        Dialect::Farsimadan,
        Dialect::Kashkuli,
        Dialect::Sheshboluki,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Amaleh => "amaleh",
            Dialect::Dareshuri => "dareshuri",
            Dialect::Farsimadan => "farsimadan",
            Dialect::Kashkuli => "kashkuli",
            Dialect::Sheshboluki => "sheshboluki",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| StudioError::ValidationRejected(format!("unknown dialect: {s}")))
    }
}

/// Content type of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Greeting,
    Story,
    Song,
    Word,
    Phrase,
    Conversation,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Greeting,
        Category::Story,
        Category::Song,
        Category::Word,
        Category::Phrase,
        Category::Conversation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Greeting => "greeting",
            Category::Story => "story",
            Category::Song => "song",
            Category::Word => "word",
            Category::Phrase => "phrase",
            Category::Conversation => "conversation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| StudioError::ValidationRejected(format!("unknown category: {s}")))
    }
}

/// Translation languages offered alongside a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    De,
    Fa,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::De, Language::Fa];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
            Language::Fa => "fa",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.code() == s.to_ascii_lowercase())
            .ok_or_else(|| StudioError::ValidationRejected(format!("unknown language code: {s}")))
    }
}

/// Descriptive metadata attached to one recording.
///
/// No field is required to confirm a save; empty strings mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub speaker_name: String,
    pub speaker_age: Option<u8>,
    pub dialect: Option<Dialect>,
    pub category: Option<Category>,
    /// Free text in the target script (right-to-left welcome).
    pub transcription: String,
    pub translations: BTreeMap<Language, String>,
}

/// A single-field edit coming from the metadata form.
#[derive(Debug, Clone)]
pub enum MetadataPatch {
    SpeakerName(String),
    SpeakerAge(u8),
    ClearSpeakerAge,
    Dialect(Dialect),
    ClearDialect,
    Category(Category),
    ClearCategory,
    Transcription(String),
    Translation(Language, String),
}

impl Metadata {
    /// Apply one form edit.
    ///
    /// An out-of-range speaker age is rejected without mutating anything;
    /// the last valid value stays in place. Dialect, category and language
    /// are closed enumerations, so they are valid by construction.
    pub fn apply(&mut self, patch: MetadataPatch) -> Result<(), StudioError> {
        match patch {
            MetadataPatch::SpeakerName(name) => self.speaker_name = name,
            MetadataPatch::SpeakerAge(age) => {
                if !(SPEAKER_AGE_MIN..=SPEAKER_AGE_MAX).contains(&age) {
                    return Err(StudioError::ValidationRejected(format!(
                        "speaker age must be between {SPEAKER_AGE_MIN} and {SPEAKER_AGE_MAX}, got {age}"
                    )));
                }
                self.speaker_age = Some(age);
            }
            MetadataPatch::ClearSpeakerAge => self.speaker_age = None,
            MetadataPatch::Dialect(dialect) => self.dialect = Some(dialect),
            MetadataPatch::ClearDialect => self.dialect = None,
            MetadataPatch::Category(category) => self.category = Some(category),
            MetadataPatch::ClearCategory => self.category = None,
            MetadataPatch::Transcription(text) => self.transcription = text,
            MetadataPatch::Translation(lang, text) => {
                if text.is_empty() {
                    self.translations.remove(&lang);
                } else {
                    self.translations.insert(lang, text);
                }
            }
        }
        Ok(())
    }
}

/*!
 * Speaker and tier tables.
 *
 * Both tables keep declaration order and index their records by id. Optional
 * attributes are read into explicit empty values so every record has the same
 * shape regardless of what the transcript declares.
 */

use log::{debug, warn};
use std::collections::HashMap;

use crate::document::{Document, XmlElement};
use crate::errors::ConversionError;

/// A speaker from the speaker table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Speaker {
    pub id: String,
    pub abbreviation: String,
    /// First languages, in declaration order, duplicates kept
    pub l1: Vec<String>,
    /// Second languages, in declaration order, duplicates kept
    pub l2: Vec<String>,
    /// Languages used in the recording, in declaration order, duplicates kept
    pub languages_used: Vec<String>,
    /// Empty when unspecified
    pub sex: String,
}

/// A tier declaration from the body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tier {
    pub id: String,
    /// Single-letter category: `t`ranscription, `d`escription, `a`nnotation, ...
    pub tier_type: String,
    pub display_name: String,
    /// E.g. `v` (verbal) or `nv` (non-verbal)
    pub category: String,
    /// `None` for speaker-independent tiers
    pub speaker_id: Option<String>,
    /// Position among the body's `<tier>` elements
    pub position: usize,
}

/// Ordered table of records indexed by id
#[derive(Debug, Clone)]
pub struct Table<T> {
    records: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Table<T> {
    /// Insert a record; returns false and keeps the existing one on duplicate ids
    pub fn insert(&mut self, id: String, record: T) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.records.len());
        self.records.push(record);
        true
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }
}

pub type SpeakerTable = Table<Speaker>;
pub type TierTable = Table<Tier>;

/// Build the speaker table from the document's `<speakertable>`
pub fn extract_speakers(document: &Document) -> Result<SpeakerTable, ConversionError> {
    let section = document.speaker_table()?;
    let mut table = SpeakerTable::default();

    for element in section.children_named("speaker") {
        let Some(id) = element.attr("id").filter(|id| !id.is_empty()) else {
            warn!("Ignoring speaker without id");
            continue;
        };
        let speaker = read_speaker(id, element);
        if !table.insert(id.to_string(), speaker) {
            warn!("Duplicate speaker id '{}', keeping the first declaration", id);
        }
    }

    debug!("Speaker table: {} speakers", table.len());
    Ok(table)
}

fn read_speaker(id: &str, element: &XmlElement) -> Speaker {
    let mut speaker = Speaker {
        id: id.to_string(),
        ..Speaker::default()
    };

    for child in &element.children {
        match child.name.as_str() {
            "abbreviation" => speaker.abbreviation = child.text.trim().to_string(),
            "sex" => speaker.sex = child.attr("value").unwrap_or_default().to_string(),
            "l1" => read_languages(child, &mut speaker.l1),
            "l2" => read_languages(child, &mut speaker.l2),
            "languages-used" => read_languages(child, &mut speaker.languages_used),
            _ => {}
        }
    }

    speaker
}

// @reads: `<language lang=".."/>` children, or the container's own text
fn read_languages(container: &XmlElement, target: &mut Vec<String>) {
    let mut found_language_element = false;
    for language in container.children_named("language") {
        found_language_element = true;
        match language.attr("lang").map(str::trim).filter(|l| !l.is_empty()) {
            Some(lang) => target.push(lang.to_string()),
            None => {
                let text = language.text.trim();
                if !text.is_empty() {
                    target.push(text.to_string());
                }
            }
        }
    }

    if !found_language_element {
        let text = container.text.trim();
        if !text.is_empty() {
            target.push(text.to_string());
        }
    }
}

/// Build the tier table from the `<tier>` elements of the body
pub fn extract_tiers(document: &Document) -> Result<TierTable, ConversionError> {
    let body = document.body()?;
    let mut table = TierTable::default();

    for (position, element) in body.children_named("tier").enumerate() {
        let Some(id) = element.attr("id").filter(|id| !id.is_empty()) else {
            warn!("Tier without id; its events cannot be resolved");
            continue;
        };
        let tier = Tier {
            id: id.to_string(),
            tier_type: element.attr("type").unwrap_or_default().to_string(),
            display_name: element.attr("display-name").unwrap_or_default().to_string(),
            category: element.attr("category").unwrap_or_default().to_string(),
            speaker_id: element
                .attr("speaker")
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            position,
        };
        if !table.insert(id.to_string(), tier) {
            warn!("Duplicate tier id '{}', its events cannot be resolved", id);
        }
    }

    debug!("Tier table: {} tiers", table.len());
    Ok(table)
}

/*!
 * Joins events with their tier and speaker metadata.
 *
 * The join is lazy: records are produced one at a time, in the order the
 * events appear in the document, and the iterator is consumed once by the
 * writer.
 */

use log::warn;

use crate::app_config::UnresolvedTierPolicy;
use crate::errors::ConversionError;
use crate::metadata::{Speaker, SpeakerTable, Tier, TierTable};
use crate::timeline::{Event, Timeline};

/// One output row: an event with its tier and speaker denormalised onto it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedRecord {
    pub tier_id: String,
    pub tier_type: String,
    pub display_name: String,
    pub category: String,
    pub speaker_id: String,
    pub abbreviation: String,
    pub l1: Vec<String>,
    pub l2: Vec<String>,
    pub languages_used: Vec<String>,
    pub sex: String,
    pub start_ms: Option<u64>,
    pub end_ms: Option<u64>,
    pub text: String,
}

impl FlattenedRecord {
    fn with_tier(mut self, tier: &Tier) -> Self {
        self.tier_type = tier.tier_type.clone();
        self.display_name = tier.display_name.clone();
        self.category = tier.category.clone();
        self
    }

    fn with_speaker(mut self, speaker: &Speaker) -> Self {
        self.speaker_id = speaker.id.clone();
        self.abbreviation = speaker.abbreviation.clone();
        self.l1 = speaker.l1.clone();
        self.l2 = speaker.l2.clone();
        self.languages_used = speaker.languages_used.clone();
        self.sex = speaker.sex.clone();
        self
    }
}

/// Lookup tables an event is resolved against
#[derive(Debug, Clone, Copy)]
pub struct JoinContext<'a> {
    pub speakers: &'a SpeakerTable,
    pub tiers: &'a TierTable,
    pub timeline: &'a Timeline,
    pub policy: UnresolvedTierPolicy,
}

impl<'a> JoinContext<'a> {
    /// Resolve one event; `None` when the policy drops it.
    /// An event resolves only against the tier element that encloses it, so
    /// events of a later tier repeating an id stay unresolved.
    pub fn resolve(&self, event: &Event) -> Option<FlattenedRecord> {
        let tier = event
            .tier_id
            .as_deref()
            .and_then(|id| self.tiers.get(id))
            .filter(|tier| tier.position == event.tier_position);

        let mut record = FlattenedRecord {
            start_ms: self.event_time(event, event.start.as_deref(), "start"),
            end_ms: self.event_time(event, event.end.as_deref(), "end"),
            text: event.text.clone(),
            ..FlattenedRecord::default()
        };

        let Some(tier) = tier else {
            let unresolved = ConversionError::UnresolvedReference {
                tier_id: event.tier_id.clone().unwrap_or_default(),
                event_index: event.index,
            };
            return match self.policy {
                UnresolvedTierPolicy::Skip => {
                    warn!("{}; skipping it", unresolved);
                    None
                }
                UnresolvedTierPolicy::Blank => {
                    warn!("{}; tier and speaker columns left blank", unresolved);
                    Some(record)
                }
            };
        };

        record.tier_id = tier.id.clone();
        record = record.with_tier(tier);
        if let Some(speaker) = tier.speaker_id.as_deref().and_then(|id| self.speakers.get(id)) {
            record = record.with_speaker(speaker);
        }

        if let (Some(start), Some(end)) = (record.start_ms, record.end_ms) {
            if start > end {
                warn!(
                    "Event #{} on tier '{}' ends before it starts ({} > {})",
                    event.index, record.tier_id, start, end
                );
            }
        }

        Some(record)
    }

    fn event_time(&self, event: &Event, point: Option<&str>, which: &str) -> Option<u64> {
        let Some(point) = point else {
            warn!("Event #{} has no {} point", event.index, which);
            return None;
        };
        if !self.timeline.contains(point) {
            warn!("Event #{} has unknown {} point '{}'", event.index, which, point);
            return None;
        }
        self.timeline.millis(point)
    }
}

/// Produce one record per event, in event order, following `context.policy`
/// for events whose tier is unknown
pub fn join_events<'a>(
    events: &'a [Event],
    context: JoinContext<'a>,
) -> impl Iterator<Item = FlattenedRecord> + 'a {
    events.iter().filter_map(move |event| context.resolve(event))
}

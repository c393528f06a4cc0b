use log::{debug, warn};
use std::collections::HashMap;

use crate::app_config::TimeUnit;
use crate::document::Document;
use crate::errors::ConversionError;

// @module: Common timeline and event extraction

// @const: ud-information attribute naming the timeline unit
pub const TIME_UNIT_ATTRIBUTE: &str = "time-unit";

// @struct: One timed annotation unit on a tier
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    // @field: Zero-based position in document order
    pub index: usize,

    // @field: Id of the enclosing tier, `None` when the tier has no id
    pub tier_id: Option<String>,

    // @field: Position of the enclosing tier among the body's tiers
    pub tier_position: usize,

    // @field: Timeline point id of the start
    pub start: Option<String>,

    // @field: Timeline point id of the end
    pub end: Option<String>,

    // @field: Event text, may be empty
    pub text: String,
}

/// Timeline points resolved to values in the document's unit
#[derive(Debug, Clone)]
pub struct Timeline {
    unit: TimeUnit,
    points: HashMap<String, Option<f64>>,
}

impl Timeline {
    /// Build a timeline from `(id, time)` pairs in timeline order.
    /// Untimed points are interpolated between their timed neighbours.
    pub fn from_points(unit: TimeUnit, points: Vec<(String, Option<f64>)>) -> Self {
        let values = interpolate(points.iter().map(|(_, t)| *t).collect());
        let points = points
            .into_iter()
            .zip(values)
            .map(|((id, _), value)| (id, value))
            .collect();
        Self { unit, points }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.points.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Time of a point in whole milliseconds, rounded to nearest
    pub fn millis(&self, id: &str) -> Option<u64> {
        let value = (*self.points.get(id)?)?;
        Some((value * self.unit.millis_factor()).round() as u64)
    }
}

// @fills: Gaps between timed points linearly, by position
fn interpolate(mut values: Vec<Option<f64>>) -> Vec<Option<f64>> {
    let mut previous: Option<(usize, f64)> = None;
    let mut i = 0;
    while i < values.len() {
        match values[i] {
            Some(v) => {
                previous = Some((i, v));
                i += 1;
            }
            None => {
                let next = values[i..]
                    .iter()
                    .enumerate()
                    .find_map(|(offset, v)| v.map(|v| (i + offset, v)));
                let (Some((p_idx, p_val)), Some((n_idx, n_val))) = (previous, next) else {
                    // Open end: leave unresolved up to the next timed point
                    i = next.map(|(n_idx, _)| n_idx).unwrap_or(values.len());
                    continue;
                };
                let span = (n_idx - p_idx) as f64;
                for (j, slot) in values.iter_mut().enumerate().take(n_idx).skip(i) {
                    let fraction = (j - p_idx) as f64 / span;
                    *slot = Some(p_val + (n_val - p_val) * fraction);
                }
                i = n_idx;
            }
        }
    }
    values
}

/// Unit declared in the head's user-defined meta information, if any
pub fn declared_time_unit(document: &Document) -> Option<TimeUnit> {
    let meta = document.root.find_descendant("ud-meta-information")?;
    let declaration = meta
        .children_named("ud-information")
        .find(|info| info.attr("attribute-name") == Some(TIME_UNIT_ATTRIBUTE))?;

    let value = declaration.text.trim();
    let unit = TimeUnit::from_declaration(value);
    if unit.is_none() {
        warn!("Unknown time unit '{}' declared, using the default", value);
    }
    unit
}

/// Read the `<common-timeline>` into a `Timeline`
pub fn extract_timeline(document: &Document, default_unit: TimeUnit) -> Result<Timeline, ConversionError> {
    let section = document.common_timeline()?;
    let unit = declared_time_unit(document).unwrap_or(default_unit);

    let mut points = Vec::new();
    for tli in section.children_named("tli") {
        let Some(id) = tli.attr("id").filter(|id| !id.is_empty()) else {
            warn!("Ignoring timeline point without id");
            continue;
        };
        let time = tli.attr("time").and_then(|raw| parse_time_value(id, raw));
        points.push((id.to_string(), time));
    }

    debug!("Timeline: {} points, unit {:?}", points.len(), unit);
    Ok(Timeline::from_points(unit, points))
}

fn parse_time_value(id: &str, raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => {
            warn!("Timeline point '{}' has invalid time '{}', treating it as untimed", id, raw);
            None
        }
    }
}

/// Collect all events of all tiers, in document order
pub fn extract_events(document: &Document) -> Result<Vec<Event>, ConversionError> {
    let body = document.body()?;
    let mut events = Vec::new();

    for (tier_position, tier) in body.children_named("tier").enumerate() {
        let tier_id = tier
            .attr("id")
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        for child in &tier.children {
            if child.name != "event" {
                warn!(
                    "Unexpected <{}> in tier '{}', ignoring it",
                    child.name,
                    tier_id.as_deref().unwrap_or_default()
                );
                continue;
            }
            events.push(Event {
                index: events.len(),
                tier_id: tier_id.clone(),
                tier_position,
                start: child.attr("start").map(str::to_string),
                end: child.attr("end").map(str::to_string),
                text: child.text.clone(),
            });
        }
    }

    debug!("Extracted {} events", events.len());
    Ok(events)
}

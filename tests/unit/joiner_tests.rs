/*!
 * Tests for joining events with tier and speaker metadata
 */

use exbtsv::app_config::{TimeUnit, UnresolvedTierPolicy};
use exbtsv::document::Document;
use exbtsv::joiner::{join_events, FlattenedRecord, JoinContext};
use exbtsv::metadata::{extract_speakers, extract_tiers};
use exbtsv::timeline::{extract_events, extract_timeline};
use crate::common;

fn join(doc: &Document, policy: UnresolvedTierPolicy) -> (usize, Vec<FlattenedRecord>) {
    let speakers = extract_speakers(doc).unwrap();
    let tiers = extract_tiers(doc).unwrap();
    let timeline = extract_timeline(doc, TimeUnit::Seconds).unwrap();
    let events = extract_events(doc).unwrap();
    let context = JoinContext {
        speakers: &speakers,
        tiers: &tiers,
        timeline: &timeline,
        policy,
    };
    let records = join_events(&events, context).collect();
    (events.len(), records)
}

/// Test that every event yields one record with its tier's metadata
#[test]
fn test_join_events_withSampleDocument_shouldProduceOneRecordPerEvent() {
    let doc = common::parse(common::SAMPLE_EXB);
    let (event_count, records) = join(&doc, UnresolvedTierPolicy::Blank);

    assert_eq!(event_count, 5);
    assert_eq!(records.len(), 5);

    let first = &records[0];
    assert_eq!(first.tier_id, "TIE0");
    assert_eq!(first.tier_type, "t");
    assert_eq!(first.display_name, "AN [v]");
    assert_eq!(first.category, "v");
    assert_eq!(first.speaker_id, "SPK0");
    assert_eq!(first.abbreviation, "AN");
    assert_eq!(first.l1, vec!["en", "de"]);
    assert_eq!(first.languages_used, vec!["deu", "eng"]);
    assert_eq!(first.sex, "f");
    assert_eq!(first.start_ms, Some(0));
    assert_eq!(first.end_ms, Some(1500));
    assert_eq!(first.text, "Hallo zusammen. ");
}

/// Test that speaker metadata is repeated on every row of a tier
#[test]
fn test_join_events_withSeveralEventsPerTier_shouldDenormalizeSpeaker() {
    let doc = common::parse(common::SAMPLE_EXB);
    let (_, records) = join(&doc, UnresolvedTierPolicy::Blank);

    assert_eq!(records[0].speaker_id, records[1].speaker_id);
    assert_eq!(records[0].l1, records[1].l1);
    assert_eq!(records[2].speaker_id, "SPK1");
}

/// Test that a tier without speaker leaves all speaker fields empty
#[test]
fn test_join_events_withSpeakerlessTier_shouldLeaveSpeakerFieldsEmpty() {
    let doc = common::parse(common::SAMPLE_EXB);
    let (_, records) = join(&doc, UnresolvedTierPolicy::Blank);

    for record in &records[3..] {
        assert_eq!(record.tier_id, "TIE2");
        assert_eq!(record.category, "nv");
        assert_eq!(record.speaker_id, "");
        assert_eq!(record.abbreviation, "");
        assert!(record.l1.is_empty());
        assert!(record.l2.is_empty());
        assert!(record.languages_used.is_empty());
        assert_eq!(record.sex, "");
    }
    assert_eq!(records[3].end_ms, Some(3125));
}

/// Test that a speaker id missing from the speaker table is not an error
#[test]
fn test_join_events_withUnknownSpeaker_shouldLeaveSpeakerFieldsEmpty() {
    let doc = common::parse(
        r#"<basic-transcription><head><speakertable/></head>
           <basic-body><common-timeline><tli id="T0" time="0"/><tli id="T1" time="1"/></common-timeline>
             <tier id="A" speaker="SPK9" type="t" category="v" display-name="ghost">
               <event start="T0" end="T1">boo</event>
             </tier>
           </basic-body></basic-transcription>"#,
    );
    let (_, records) = join(&doc, UnresolvedTierPolicy::Skip);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].display_name, "ghost");
    assert_eq!(records[0].speaker_id, "");
}

/// Test the skip policy drops events of undeclared tiers
#[test]
fn test_join_events_withSkipPolicy_shouldDropUnresolvedEvents() {
    let doc = common::parse(common::UNRESOLVED_TIER_EXB);
    let (event_count, records) = join(&doc, UnresolvedTierPolicy::Skip);

    assert_eq!(event_count, 3);
    assert_eq!(records.len(), 2);
    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
}

/// Test the blank policy keeps events of undeclared tiers with empty metadata
#[test]
fn test_join_events_withBlankPolicy_shouldKeepUnresolvedEvents() {
    let doc = common::parse(common::UNRESOLVED_TIER_EXB);
    let (event_count, records) = join(&doc, UnresolvedTierPolicy::Blank);

    assert_eq!(records.len(), event_count);
    let orphan = &records[1];
    assert_eq!(orphan.text, "lost");
    assert_eq!(orphan.tier_id, "");
    assert_eq!(orphan.tier_type, "");
    assert_eq!(orphan.display_name, "");
    assert_eq!(orphan.category, "");
    assert_eq!(orphan.speaker_id, "");
    assert_eq!(orphan.sex, "");
    assert_eq!(orphan.start_ms, Some(1000));
    assert_eq!(orphan.end_ms, Some(2000));
}

/// Test that unknown timeline points give empty times, not a failure
#[test]
fn test_join_events_withUnknownTimePoint_shouldLeaveTimeEmpty() {
    let doc = common::parse(
        r#"<basic-transcription><head><speakertable/></head>
           <basic-body><common-timeline><tli id="T0" time="0.5"/></common-timeline>
             <tier id="A" type="t"><event start="T0" end="T7">x</event><event>y</event></tier>
           </basic-body></basic-transcription>"#,
    );
    let (_, records) = join(&doc, UnresolvedTierPolicy::Blank);

    assert_eq!(records[0].start_ms, Some(500));
    assert_eq!(records[0].end_ms, None);
    assert_eq!(records[1].start_ms, None);
    assert_eq!(records[1].end_ms, None);
}

/// Test that start never exceeds end for well-formed timing
#[test]
fn test_join_events_withSampleDocument_shouldHaveStartBeforeEnd() {
    let doc = common::parse(common::SAMPLE_EXB);
    let (_, records) = join(&doc, UnresolvedTierPolicy::Blank);

    for record in &records {
        assert!(record.start_ms.unwrap() <= record.end_ms.unwrap());
    }
}

/// Test that events of a repeated tier id do not borrow the first tier's metadata
#[test]
fn test_join_events_withDuplicateTierId_shouldTreatLaterTierAsUnresolved() {
    let doc = common::parse(common::DUPLICATE_TIER_EXB);

    let (event_count, records) = join(&doc, UnresolvedTierPolicy::Blank);
    assert_eq!(records.len(), event_count);
    assert_eq!(records[0].tier_id, "A");
    assert_eq!(records[0].display_name, "first");
    assert_eq!(records[0].speaker_id, "SPK0");

    let later = &records[1];
    assert_eq!(later.text, "y");
    assert_eq!(later.tier_id, "");
    assert_eq!(later.tier_type, "");
    assert_eq!(later.display_name, "");
    assert_eq!(later.category, "");
    assert_eq!(later.speaker_id, "");
    assert_eq!(later.start_ms, Some(0));

    let (_, records) = join(&doc, UnresolvedTierPolicy::Skip);
    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["x"]);
}

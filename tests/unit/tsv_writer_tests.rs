/*!
 * Tests for table rendering
 */

use exbtsv::app_config::LanguageCodeStyle;
use exbtsv::joiner::FlattenedRecord;
use exbtsv::tsv_writer::{render_table, write_records, write_table_file, CellFormat, COLUMNS};
use exbtsv::ConversionError;
use crate::common;

fn sample_record() -> FlattenedRecord {
    FlattenedRecord {
        tier_id: "TIE0".to_string(),
        tier_type: "t".to_string(),
        display_name: "AN [v]".to_string(),
        category: "v".to_string(),
        speaker_id: "SPK0".to_string(),
        abbreviation: "AN".to_string(),
        l1: vec!["en".to_string(), "de".to_string()],
        l2: Vec::new(),
        languages_used: vec!["ger".to_string()],
        sex: "f".to_string(),
        start_ms: Some(0),
        end_ms: Some(1500),
        text: "Hallo".to_string(),
    }
}

/// Test the header row and column order
#[test]
fn test_write_records_withNoRecords_shouldWriteHeaderOnly() {
    let mut buffer = Vec::new();
    let count = write_records(&mut buffer, Vec::new(), &CellFormat::default()).unwrap();

    assert_eq!(count, 0);
    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        "Tier-ID\tType\tDisplay-Name\tCategory\tSpeaker-ID\tAbbreviation\tL1\tL2\tLanguages-Used\tSex\tStart\tEnd\tString\n"
    );
    assert_eq!(COLUMNS.len(), 13);
}

/// Test that multi-valued cells are joined in one cell
#[test]
fn test_render_table_withTwoL1Values_shouldJoinWithComma() {
    let (content, count) = render_table(vec![sample_record()], &CellFormat::default());

    assert_eq!(count, 1);
    let rows = common::table_rows(&content);
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[1],
        vec!["TIE0", "t", "AN [v]", "v", "SPK0", "AN", "en,de", "", "ger", "f", "0", "1500", "Hallo"]
    );
}

/// Test a custom list separator and language normalisation
#[test]
fn test_render_table_withCustomFormat_shouldApplyIt() {
    let format = CellFormat {
        list_separator: "_".to_string(),
        missing_value: "NA".to_string(),
        language_codes: LanguageCodeStyle::Part2t,
    };
    let (content, _) = render_table(vec![sample_record()], &format);
    let rows = common::table_rows(&content);

    assert_eq!(rows[1][6], "eng_deu");
    assert_eq!(rows[1][7], "NA");
    assert_eq!(rows[1][8], "deu");
}

/// Test that embedded tabs and newlines never break the row layout
#[test]
fn test_render_table_withTabsAndNewlinesInText_shouldStayOnOneLine() {
    let mut record = sample_record();
    record.text = "one\ttwo\nthree\r\nfour".to_string();
    record.display_name = "bad\tname".to_string();

    let (content, _) = render_table(vec![record], &CellFormat::default());
    let rows = common::table_rows(&content);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].len(), 13);
    assert_eq!(rows[1][2], "bad name");
    assert_eq!(rows[1][12], "one two three four");
}

/// Test that missing times render as the missing value
#[test]
fn test_render_table_withoutTimes_shouldLeaveTimeCellsEmpty() {
    let mut record = sample_record();
    record.start_ms = None;
    record.end_ms = None;

    let (content, _) = render_table(vec![record], &CellFormat::default());
    let rows = common::table_rows(&content);
    assert_eq!(rows[1][10], "");
    assert_eq!(rows[1][11], "");
}

/// Test writing into an existing directory
#[test]
fn test_write_table_file_withWritableDir_shouldCreateFile() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out.tsv");

    write_table_file(&path, b"header\n")?;
    assert_eq!(std::fs::read_to_string(&path)?, "header\n");

    // Overwrites in place
    write_table_file(&path, b"other\n")?;
    assert_eq!(std::fs::read_to_string(&path)?, "other\n");
    Ok(())
}

/// Test that an unwritable destination is a write error
#[test]
fn test_write_table_file_withMissingDir_shouldReturnWriteError() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("does-not-exist").join("out.tsv");

    match write_table_file(&path, b"x") {
        Err(ConversionError::Write { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("expected write error, got {:?}", other),
    }
    Ok(())
}

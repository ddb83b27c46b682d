//! Viewer integration tests over JSONL files on disk

use std::collections::BTreeSet;

use rad_core::JsonlFile;
use rad_viewer::{highlight, Action, Filters, TokenStyle, ViewerState};

const REPORTS: &str = r#"{"sentences": [["There", "is", "a", "right", "pleural", "effusion", "."], ["No", "pneumothorax", "."]], "ner": [[[3, 4, "Anatomy::definitely present"], [5, 5, "Observation::definitely present"]], [[8, 8, "Observation::definitely absent"]]], "relations": [[[5, 5, 3, 4, "located_at"]], []]}
{"tokens": ["Heart", "size", "is", "normal"], "ner": [[0, 0, "Anatomy::definitely present"]], "relations": []}
"#;

fn open() -> (tempfile::TempDir, JsonlFile) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports.jsonl");
    std::fs::write(&path, REPORTS).unwrap();
    let file = JsonlFile::open(&path).unwrap();
    (dir, file)
}

#[test]
fn test_open_and_highlight_nested_record() {
    let (_dir, file) = open();
    assert_eq!(file.len(), 2);

    let state = ViewerState::new(file, 0, Filters::default()).unwrap();
    let tokens = state.highlighted();
    assert_eq!(tokens.len(), 10);
    assert_eq!(tokens[8].text, "pneumothorax");
    assert!(matches!(tokens[8].style, TokenStyle::Span(_)));
    assert_eq!(state.record().relations.len(), 1);
}

#[test]
fn test_markup_report_follows_state() {
    let (_dir, file) = open();
    let mut state = ViewerState::new(file, 0, Filters::default()).unwrap();
    state.apply(Action::ToggleSelectAll);
    state.apply(Action::ToggleObservation);

    let report = highlight::markup_report(
        state.record(),
        &state.filters,
        state.selected_relations(),
    );
    assert!(report.contains(
        "There is a [underline on yellow]right[/underline on yellow] [underline on yellow]pleural[/underline on yellow] [underline on yellow]effusion[/underline on yellow] . No pneumothorax ."
    ));
    assert!(report.contains("[x] located_at: ⟦effusion⟧ → ⟦right pleural⟧"));
}

#[test]
fn test_start_at_later_record() {
    let (_dir, file) = open();
    let state = ViewerState::new(file, 1, Filters::default()).unwrap();
    let markup = highlight::to_markup(&state.highlighted());
    assert_eq!(markup, "[green]Heart[/green] size is normal");

    let report = highlight::markup_report(state.record(), &state.filters, &BTreeSet::new());
    assert!(report.contains("No relations found"));
}

#[test]
fn test_out_of_range_start_record() {
    let (_dir, file) = open();
    assert!(ViewerState::new(file, 5, Filters::default()).is_err());
}

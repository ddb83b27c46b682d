use std::collections::BTreeSet;

use rad_core::{AnnotatedRecord, JsonlFile, RadError, Result};

use crate::highlight::{self, Filters, StyledToken};
use crate::Action;

/// Which panel receives `Up`/`Down`/`Space`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Filters,
    Relations,
}

/// Rows of the filter panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRow {
    Anatomy,
    Observation,
}

impl FilterRow {
    const ALL: [FilterRow; 2] = [FilterRow::Anatomy, FilterRow::Observation];
}

/// Everything the viewer shows, plus the cursor positions.
///
/// The relations panel has one extra row at the top for "Select All", so
/// `relation_cursor == 0` is that checkbox and `relation_cursor == i + 1`
/// is relation `i`.
pub struct ViewerState {
    file: JsonlFile,
    index: usize,
    record: AnnotatedRecord,
    pub filters: Filters,
    selected: BTreeSet<usize>,
    select_all: bool,
    pub focus: Focus,
    filter_cursor: usize,
    relation_cursor: usize,
    status: Option<String>,
    pub exit: bool,
}

impl ViewerState {
    /// Open `file` at record `index`
    pub fn new(file: JsonlFile, index: usize, filters: Filters) -> Result<Self> {
        if file.is_empty() {
            return Err(RadError::InvalidInput(format!(
                "{} contains no records",
                file.path().display()
            )));
        }
        let record = file.record(index)?;

        Ok(Self {
            file,
            index,
            record,
            filters,
            selected: BTreeSet::new(),
            select_all: false,
            focus: Focus::default(),
            filter_cursor: 0,
            relation_cursor: 0,
            status: None,
            exit: false,
        })
    }

    pub fn file(&self) -> &JsonlFile {
        &self.file
    }

    pub fn record(&self) -> &AnnotatedRecord {
        &self.record
    }

    /// 0-based index of the displayed record
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn selected_relations(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    pub fn select_all(&self) -> bool {
        self.select_all
    }

    pub fn filter_cursor(&self) -> FilterRow {
        FilterRow::ALL[self.filter_cursor]
    }

    pub fn relation_cursor(&self) -> usize {
        self.relation_cursor
    }

    /// Last error or notice, shown in the footer
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Current tokens with styles for the active filters and selection
    pub fn highlighted(&self) -> Vec<StyledToken<'_>> {
        highlight::highlight(&self.record, &self.filters, &self.selected)
    }

    pub fn toggle_anatomy(&mut self) {
        self.filters.show_anatomy = !self.filters.show_anatomy;
    }

    pub fn toggle_observation(&mut self) {
        self.filters.show_observation = !self.filters.show_observation;
    }

    /// Flip the checkbox of relation `index`; out-of-range indices are ignored
    pub fn toggle_relation(&mut self, index: usize) {
        if index >= self.record.relations.len() {
            return;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
    }

    /// "Select All": check every relation, or clear the selection
    pub fn set_select_all(&mut self, value: bool) {
        self.select_all = value;
        self.selected = if value {
            (0..self.record.relations.len()).collect()
        } else {
            BTreeSet::new()
        };
    }

    pub fn move_up(&mut self) {
        match self.focus {
            Focus::Filters => self.filter_cursor = self.filter_cursor.saturating_sub(1),
            Focus::Relations => self.relation_cursor = self.relation_cursor.saturating_sub(1),
        }
    }

    pub fn move_down(&mut self) {
        match self.focus {
            Focus::Filters => {
                self.filter_cursor = (self.filter_cursor + 1).min(FilterRow::ALL.len() - 1);
            }
            Focus::Relations => {
                // "Select All" plus one row per relation
                let last = self.record.relations.len();
                self.relation_cursor = (self.relation_cursor + 1).min(last);
            }
        }
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Filters if !self.record.relations.is_empty() => Focus::Relations,
            _ => Focus::Filters,
        };
    }

    /// Toggle whichever checkbox the cursor is on
    pub fn toggle_focused(&mut self) {
        match self.focus {
            Focus::Filters => match self.filter_cursor() {
                FilterRow::Anatomy => self.toggle_anatomy(),
                FilterRow::Observation => self.toggle_observation(),
            },
            Focus::Relations => match self.relation_cursor {
                0 => self.set_select_all(!self.select_all),
                row => self.toggle_relation(row - 1),
            },
        }
    }

    pub fn next_record(&mut self) {
        if self.index + 1 < self.file.len() {
            self.load(self.index + 1);
        }
    }

    pub fn previous_record(&mut self) {
        if self.index > 0 {
            self.load(self.index - 1);
        }
    }

    /// Switch to record `index`. On a parse error the current record stays
    /// on screen and the error goes to the status line.
    pub fn load(&mut self, index: usize) {
        match self.file.record(index) {
            Ok(record) => {
                tracing::debug!(index, "loaded record");
                self.record = record;
                self.index = index;
                self.selected.clear();
                self.select_all = false;
                self.relation_cursor = 0;
                if self.record.relations.is_empty() {
                    self.focus = Focus::Filters;
                }
                self.status = None;
            }
            Err(e) => {
                tracing::debug!(index, error = %e, "failed to load record");
                self.status = Some(e.to_string());
            }
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.exit = true,
            Action::SwitchFocus => self.switch_focus(),
            Action::Up => self.move_up(),
            Action::Down => self.move_down(),
            Action::Toggle => self.toggle_focused(),
            Action::ToggleAnatomy => self.toggle_anatomy(),
            Action::ToggleObservation => self.toggle_observation(),
            Action::ToggleSelectAll => self.set_select_all(!self.select_all),
            Action::NextRecord => self.next_record(),
            Action::PreviousRecord => self.previous_record(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::TokenStyle;

    const DATA: &str = concat!(
        r#"{"tokens": ["Left", "lung", "nodule"], "ner": [[0, 1, "Anatomy::definitely present"], [2, 2, "Observation::uncertain"]], "relations": [[2, 2, 0, 1, "located_at"], [0, 0, 1, 1, "modify"]]}"#,
        "\n",
        r#"{"tokens": ["Normal"], "ner": []}"#,
        "\n",
        "{broken\n",
    );

    fn state() -> ViewerState {
        let file = JsonlFile::from_contents("test.jsonl", DATA);
        ViewerState::new(file, 0, Filters::default()).unwrap()
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = JsonlFile::from_contents("empty.jsonl", "\n\n");
        assert!(ViewerState::new(file, 0, Filters::default()).is_err());
    }

    #[test]
    fn test_toggle_filters_recomputes_highlight() {
        let mut state = state();
        assert_eq!(state.highlighted()[0].style, TokenStyle::Span(crate::SpanColor::Green));

        state.apply(Action::ToggleAnatomy);
        assert!(!state.filters.show_anatomy);
        assert_eq!(state.highlighted()[0].style, TokenStyle::Plain);

        state.apply(Action::ToggleAnatomy);
        assert_eq!(state.highlighted()[0].style, TokenStyle::Span(crate::SpanColor::Green));
    }

    #[test]
    fn test_relation_selection() {
        let mut state = state();
        state.toggle_relation(1);
        assert_eq!(state.selected_relations(), &BTreeSet::from([1]));
        state.toggle_relation(1);
        assert!(state.selected_relations().is_empty());

        state.toggle_relation(5);
        assert!(state.selected_relations().is_empty());
    }

    #[test]
    fn test_select_all() {
        let mut state = state();
        state.apply(Action::ToggleSelectAll);
        assert!(state.select_all());
        assert_eq!(state.selected_relations(), &BTreeSet::from([0, 1]));
        assert!(state
            .highlighted()
            .iter()
            .all(|t| t.style == TokenStyle::Selected));

        state.apply(Action::ToggleSelectAll);
        assert!(state.selected_relations().is_empty());
    }

    #[test]
    fn test_cursor_navigation_and_toggle() {
        let mut state = state();
        state.apply(Action::Down);
        assert_eq!(state.filter_cursor(), FilterRow::Observation);
        state.apply(Action::Down);
        assert_eq!(state.filter_cursor(), FilterRow::Observation);
        state.apply(Action::Toggle);
        assert!(!state.filters.show_observation);

        state.apply(Action::SwitchFocus);
        assert_eq!(state.focus, Focus::Relations);
        state.apply(Action::Toggle);
        assert!(state.select_all());

        state.apply(Action::Down);
        state.apply(Action::Down);
        state.apply(Action::Down);
        assert_eq!(state.relation_cursor(), 2);
        state.apply(Action::Toggle);
        assert_eq!(state.selected_relations(), &BTreeSet::from([0]));
    }

    #[test]
    fn test_record_navigation() {
        let mut state = state();
        state.set_select_all(true);
        state.apply(Action::SwitchFocus);

        state.apply(Action::NextRecord);
        assert_eq!(state.index(), 1);
        assert_eq!(state.record().tokens, vec!["Normal"]);
        assert!(state.selected_relations().is_empty());
        assert!(!state.select_all());
        assert_eq!(state.focus, Focus::Filters);

        state.apply(Action::NextRecord);
        assert_eq!(state.index(), 1);
        assert!(state.status().is_some_and(|s| s.contains("line 3")));

        state.apply(Action::PreviousRecord);
        assert_eq!(state.index(), 0);
        assert!(state.status().is_none());
        state.apply(Action::PreviousRecord);
        assert_eq!(state.index(), 0);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_malformed_record_reported_in_status_only() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        let mut state = state();
        state.apply(Action::NextRecord);
        tracing::subscriber::with_default(subscriber, || state.apply(Action::NextRecord));

        assert!(state.status().is_some_and(|s| s.contains("line 3")));
        assert!(captured.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_focus_stays_on_filters_without_relations() {
        let file = JsonlFile::from_contents("one.jsonl", r#"{"tokens": ["x"]}"#);
        let mut state = ViewerState::new(file, 0, Filters::default()).unwrap();
        state.apply(Action::SwitchFocus);
        assert_eq!(state.focus, Focus::Filters);
    }

    #[test]
    fn test_quit() {
        let mut state = state();
        state.apply(Action::Quit);
        assert!(state.exit);
    }
}

//! Main application widget for the viewer.

use ratatui::{prelude::*, widgets::StatefulWidget};

use crate::ViewerState;

use super::{relation_rows, LegendPanel, RelationsPanel, TextPanel, LEGEND_ROWS};

const HELP: &str =
    "q quit | Tab focus | ↑↓ move | Space toggle | a/o filters | s select all | n/p record";

/// Top-level layout: header, legend, text, relations, footer
pub struct ViewerApp {}

impl StatefulWidget for &ViewerApp {
    type State = ViewerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let vertical = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(LEGEND_ROWS + 2),
            Constraint::Min(3),
            Constraint::Length(relation_rows(state) + 2),
            Constraint::Length(1),
        ]);
        let [header_area, legend_area, text_area, relations_area, footer_area] =
            vertical.areas(area);

        let horizontal = Layout::horizontal([Constraint::Min(0), Constraint::Length(20)]);
        let [file_area, title_area] = horizontal.areas(header_area);

        let file_name = state
            .file()
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Line::raw(format!(
            "{file_name}  record {}/{}",
            state.index() + 1,
            state.file().len()
        ))
        .render(file_area, buf);
        "NER Viewer".bold().render(title_area, buf);

        LegendPanel {}.render(legend_area, buf, state);
        TextPanel {}.render(text_area, buf, state);
        RelationsPanel {}.render(relations_area, buf, state);

        match state.status() {
            Some(status) => Line::raw(status.to_string())
                .style(Style::new().fg(Color::Red))
                .render(footer_area, buf),
            None => Line::raw(HELP).centered().render(footer_area, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, Filters};
    use rad_core::JsonlFile;

    fn rendered(state: &mut ViewerState) -> Vec<String> {
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        ViewerApp {}.render(area, &mut buf, state);

        buf.content()
            .chunks(usize::from(area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn contains(lines: &[String], needle: &str) -> bool {
        lines.iter().any(|line| line.contains(needle))
    }

    fn state(data: &str) -> ViewerState {
        ViewerState::new(JsonlFile::from_contents("reports.jsonl", data), 0, Filters::default())
            .unwrap()
    }

    #[test]
    fn test_renders_panels() {
        let mut state = state(
            r#"{"tokens": ["Mild", "cardiomegaly"], "ner": [[1, 1, "Observation::definitely present"]], "relations": [[0, 0, 1, 1, "modify"]]}"#,
        );
        let lines = rendered(&mut state);

        assert!(contains(&lines, "reports.jsonl  record 1/1"));
        assert!(contains(&lines, "Legend"));
        assert!(contains(&lines, "Anatomy Present"));
        assert!(contains(&lines, "[x] Show Anatomy"));
        assert!(contains(&lines, "Text with NER Annotations"));
        assert!(contains(&lines, "Mild cardiomegaly"));
        assert!(contains(&lines, "Relations (1)"));
        assert!(contains(&lines, "[ ] Select All"));
        assert!(contains(&lines, "q quit"));
    }

    #[test]
    fn test_renders_filter_and_selection_changes() {
        let mut state = state(
            r#"{"tokens": ["Mild", "cardiomegaly"], "relations": [[0, 0, 1, 1, "modify"]]}"#,
        );
        state.apply(Action::ToggleObservation);
        state.apply(Action::ToggleSelectAll);
        let lines = rendered(&mut state);

        assert!(contains(&lines, "[ ] Show Observation"));
        assert!(contains(&lines, "[x] Select All"));
    }

    #[test]
    fn test_renders_empty_relations() {
        let mut state = state(r#"{"tokens": ["Normal", "study"]}"#);
        let lines = rendered(&mut state);
        assert!(contains(&lines, "Relations (0)"));
        assert!(contains(&lines, "No relations found"));
    }
}

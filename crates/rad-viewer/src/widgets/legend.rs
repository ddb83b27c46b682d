use ratatui::{
    prelude::*,
    widgets::{Paragraph, StatefulWidget},
};

use crate::{FilterRow, Focus, ViewerState, LEGEND, SWATCH};

use super::{checkbox, panel};

/// Rows drawn by [`LegendPanel`], borders excluded
pub const LEGEND_ROWS: u16 = LEGEND.len() as u16 + 3;

/// Color legend followed by the category filter checkboxes
pub struct LegendPanel {}

impl StatefulWidget for &LegendPanel {
    type State = ViewerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let focused = state.focus == Focus::Filters;

        let mut lines: Vec<Line> = LEGEND
            .iter()
            .map(|(label, color)| {
                Line::from(vec![
                    Span::styled(SWATCH, Style::new().fg(color.color())),
                    Span::raw(format!(" {label}")),
                ])
            })
            .collect();

        lines.push(Line::raw("Filters:"));
        lines.push(checkbox(
            "Show Anatomy",
            state.filters.show_anatomy,
            focused && state.filter_cursor() == FilterRow::Anatomy,
        ));
        lines.push(checkbox(
            "Show Observation",
            state.filters.show_observation,
            focused && state.filter_cursor() == FilterRow::Observation,
        ));

        Paragraph::new(lines)
            .block(panel("Legend", focused))
            .render(area, buf);
    }
}

use ratatui::{
    prelude::*,
    widgets::{Paragraph, StatefulWidget},
};

use crate::{highlight, Focus, ViewerState};

use super::{checkbox, panel};

/// Most relation rows shown before the panel scrolls
pub const MAX_RELATION_ROWS: u16 = 10;

/// Rows the relations panel wants, borders excluded
pub fn relation_rows(state: &ViewerState) -> u16 {
    // "Select All" plus one row per relation, or the empty notice
    let rows = state.record().relations.len() + 1;
    u16::try_from(rows)
        .unwrap_or(u16::MAX)
        .min(MAX_RELATION_ROWS)
}

/// "Select All" and one checkbox per relation
pub struct RelationsPanel {}

impl StatefulWidget for &RelationsPanel {
    type State = ViewerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let record = state.record();
        let focused = state.focus == Focus::Relations;
        let title = format!("Relations ({})", record.relations.len());

        let lines: Vec<Line> = if record.relations.is_empty() {
            vec![Line::raw("No relations found")]
        } else {
            let cursor = state.relation_cursor();
            let select_all = checkbox("Select All", state.select_all(), focused && cursor == 0);

            std::iter::once(select_all)
                .chain(record.relations.iter().enumerate().map(|(i, relation)| {
                    checkbox(
                        highlight::describe_relation(record, relation),
                        state.selected_relations().contains(&i),
                        focused && cursor == i + 1,
                    )
                }))
                .collect()
        };

        // keep the cursor row inside the visible window
        let visible = usize::from(area.height.saturating_sub(2)).max(1);
        let offset = state.relation_cursor().saturating_sub(visible - 1);

        Paragraph::new(lines)
            .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0))
            .block(panel(title, focused))
            .render(area, buf);
    }
}

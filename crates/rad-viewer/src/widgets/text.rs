use ratatui::{
    prelude::*,
    widgets::{Paragraph, StatefulWidget, Wrap},
};

use crate::{highlight, ViewerState};

use super::panel;

/// The record's tokens with NER highlighting
pub struct TextPanel {}

impl StatefulWidget for &TextPanel {
    type State = ViewerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let tokens = state.highlighted();

        Paragraph::new(highlight::to_line(&tokens))
            .wrap(Wrap { trim: false })
            .block(panel("Text with NER Annotations", false))
            .render(area, buf);
    }
}

//! UI widgets for the viewer.
//!
//! Each panel is a [`StatefulWidget`](ratatui::widgets::StatefulWidget) over
//! [`ViewerState`](crate::ViewerState); [`ViewerApp`] lays them out.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Block,
};

mod app;
pub use app::*;

mod legend;
pub use legend::*;

mod relations;
pub use relations::*;

mod text;
pub use text::*;

fn checkbox<'a>(label: impl Into<String>, checked: bool, focused: bool) -> Line<'a> {
    let mark = if checked { "[x] " } else { "[ ] " };
    let line = Line::from(vec![Span::raw(mark), Span::raw(label.into())]);
    if focused {
        line.style(Style::new().add_modifier(Modifier::REVERSED))
    } else {
        line
    }
}

fn panel<'a>(title: impl Into<Line<'a>>, focused: bool) -> Block<'a> {
    let border = if focused {
        Style::new().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::bordered().title(title).border_style(border)
}

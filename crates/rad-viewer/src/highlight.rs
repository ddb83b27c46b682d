//! Span highlighting
//!
//! Maps NER spans and selected relations onto per-token styles. Everything
//! here is recomputed from scratch on each call, so the viewer can call it
//! on every frame after any filter or selection change.

use std::collections::BTreeSet;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use rad_core::{AnnotatedRecord, Assertion, Category, EntityLabel, Relation};

/// Colors used for entity spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanColor {
    Green,
    Blue,
    Red,
    Yellow,
}

impl SpanColor {
    /// Color for a label. Labels outside the known set are yellow.
    pub fn for_label(label: &EntityLabel) -> Self {
        match (label.category, label.assertion) {
            (Category::Anatomy, Assertion::DefinitelyPresent) => Self::Green,
            (Category::Observation, Assertion::DefinitelyPresent) => Self::Blue,
            (Category::Anatomy | Category::Observation, Assertion::DefinitelyAbsent) => Self::Red,
            _ => Self::Yellow,
        }
    }

    /// Markup name of the color
    pub fn name(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Yellow => "yellow",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Green => Color::Green,
            Self::Blue => Color::Blue,
            Self::Red => Color::Red,
            Self::Yellow => Color::Yellow,
        }
    }
}

/// Legend entries in display order
pub const LEGEND: [(&str, SpanColor); 4] = [
    ("Anatomy Present", SpanColor::Green),
    ("Observation Present", SpanColor::Blue),
    ("Definitely Absent", SpanColor::Red),
    ("Uncertain/Other", SpanColor::Yellow),
];

/// Legend swatch character
pub const SWATCH: &str = "■";

const SELECTED_MARKUP: &str = "underline on yellow";

/// Category visibility toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filters {
    pub show_anatomy: bool,
    pub show_observation: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            show_anatomy: true,
            show_observation: true,
        }
    }
}

impl Filters {
    /// Whether spans with this label are colored
    pub fn allows(&self, label: &EntityLabel) -> bool {
        if label.mentions(Category::Anatomy) && !self.show_anatomy {
            return false;
        }
        if label.mentions(Category::Observation) && !self.show_observation {
            return false;
        }
        true
    }
}

/// How a single token is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStyle {
    Plain,
    Span(SpanColor),
    /// Part of a selected relation; wins over span colors
    Selected,
}

impl TokenStyle {
    pub fn style(&self) -> Style {
        match self {
            Self::Plain => Style::default(),
            Self::Span(color) => Style::new().fg(color.color()),
            Self::Selected => Style::new()
                .bg(Color::Yellow)
                .add_modifier(Modifier::UNDERLINED),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledToken<'a> {
    pub text: &'a str,
    pub style: TokenStyle,
}

/// Style every token of `record`.
///
/// Spans cover `start..=end`; a later span overwrites an earlier one.
/// Relation indices in `selected` that are out of range are ignored.
pub fn highlight<'a>(
    record: &'a AnnotatedRecord,
    filters: &Filters,
    selected: &BTreeSet<usize>,
) -> Vec<StyledToken<'a>> {
    let len = record.tokens.len();
    let mut styles = vec![TokenStyle::Plain; len];

    for span in record.ner.iter().filter(|s| filters.allows(&s.label)) {
        let color = SpanColor::for_label(&span.label);
        for idx in span.tokens_within(len) {
            styles[idx] = TokenStyle::Span(color);
        }
    }

    let selected_spans = selected
        .iter()
        .filter_map(|&i| record.relations.get(i))
        .filter_map(Relation::as_span);
    for relation in selected_spans {
        for idx in relation.tokens_within(len) {
            styles[idx] = TokenStyle::Selected;
        }
    }

    record
        .tokens
        .iter()
        .zip(styles)
        .map(|(text, style)| StyledToken { text, style })
        .collect()
}

/// Tokens joined by single spaces, as a styled line
pub fn to_line<'a>(tokens: &[StyledToken<'a>]) -> Line<'a> {
    let mut spans = Vec::with_capacity(tokens.len() * 2);
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(token.text, token.style.style()));
    }
    Line::from(spans)
}

/// Tokens joined by single spaces, in console markup
/// (`[green]lung[/green]`)
pub fn to_markup(tokens: &[StyledToken<'_>]) -> String {
    tokens
        .iter()
        .map(|token| match token.style {
            TokenStyle::Plain => token.text.to_string(),
            TokenStyle::Span(color) => {
                let tag = color.name();
                format!("[{tag}]{}[/{tag}]", token.text)
            }
            TokenStyle::Selected => {
                format!("[{SELECTED_MARKUP}]{}[/{SELECTED_MARKUP}]", token.text)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Legend entries in console markup
pub fn legend_markup() -> Vec<String> {
    LEGEND
        .iter()
        .map(|(label, color)| {
            let tag = color.name();
            format!("[{tag}]{SWATCH}[/{tag}] {label}")
        })
        .collect()
}

/// Human-readable relation: `type: ⟦head tokens⟧ → ⟦tail tokens⟧`.
/// An argument with no tokens in range shows its `start:end` indices inside
/// a single pair of brackets (`⟦40:41⟧`), the same brackets used for tokens.
pub fn describe_relation(record: &AnnotatedRecord, relation: &Relation) -> String {
    match relation {
        Relation::Span(span) => {
            let argument = |(start, end): (usize, usize)| {
                let tokens = record.token_slice(start, end);
                if tokens.is_empty() {
                    format!("{start}:{end}")
                } else {
                    tokens.join(" ")
                }
            };
            format!(
                "{}: ⟦{}⟧ → ⟦{}⟧",
                span.relation_type,
                argument(span.head),
                argument(span.tail)
            )
        }
        Relation::Raw(value) => value.to_string(),
    }
}

/// Non-interactive rendering of a record: legend, highlighted text, and
/// the relation list
pub fn markup_report(
    record: &AnnotatedRecord,
    filters: &Filters,
    selected: &BTreeSet<usize>,
) -> String {
    let mut out = String::from("Legend:\n");
    for line in legend_markup() {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str("\nText with NER Annotations:\n");
    out.push_str(&to_markup(&highlight(record, filters, selected)));
    out.push('\n');

    out.push_str(&format!("\nRelations ({}):\n", record.relations.len()));
    if record.relations.is_empty() {
        out.push_str("No relations found\n");
    }
    for (i, relation) in record.relations.iter().enumerate() {
        let mark = if selected.contains(&i) { "x" } else { " " };
        out.push_str(&format!("[{mark}] {}\n", describe_relation(record, relation)));
    }
    out
}

// Token sequence panel
//
// One fixed-width slot per token, aligned with the line plot's time axis.
// The aggregate activation over the selected cells drives the slot
// backgrounds; the brush is shown reversed and the zero-brush underlined.

use super::{contrast_fg, to_color};
use crate::select::Rgb;
use crate::surface::{RenderOptions, TokenSequenceModel, TokenSequenceSurface};
use crate::util::fit_width;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct TokenSequencePanel {
    model: TokenSequenceModel,
    backgrounds: Option<Vec<Rgb>>,
    options: RenderOptions,
}

impl TokenSequencePanel {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            model: TokenSequenceModel::default(),
            backgrounds: None,
            options,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = self.options.cell_width as usize;
        let spans: Vec<Span> = self
            .model
            .words
            .iter()
            .enumerate()
            .map(|(t, word)| {
                let mut style = Style::default();
                if let Some(colors) = &self.backgrounds {
                    if let Some(&rgb) = colors.get(t) {
                        style = style.bg(to_color(rgb)).fg(contrast_fg(rgb));
                    }
                }
                if in_range(t, self.model.word_brush) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                if in_range(t, self.model.word_brush_zero) {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                Span::styled(fit_width(word, width), style)
            })
            .collect();

        let title = format!(
            " Tokens {} {} ",
            range_label("brush", self.model.word_brush),
            range_label("zero", self.model.word_brush_zero),
        );
        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
    }
}

fn in_range(t: usize, range: Option<(i64, i64)>) -> bool {
    range.is_some_and(|(lo, hi)| (t as i64) >= lo && (t as i64) < hi)
}

fn range_label(name: &str, range: Option<(i64, i64)>) -> String {
    match range {
        Some((lo, hi)) => format!("{name}:[{lo},{hi})"),
        None => format!("{name}:-"),
    }
}

impl TokenSequenceSurface for TokenSequencePanel {
    fn update(&mut self, model: TokenSequenceModel) {
        self.model = model;
    }

    fn set_word_backgrounds(&mut self, colors: Option<Vec<Rgb>>) {
        self.backgrounds = colors;
    }

    fn update_options(&mut self, options: &RenderOptions, _re_render: bool) {
        self.options = *options;
    }
}

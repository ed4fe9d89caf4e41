//! UI Components for the terminal dashboard

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Sparkline, Wrap};
use ratatui::Frame;

use super::state::{Column, Selector};
use crate::histogram::Histogram;

/// Header with the page title and key help
pub struct HeaderPanel;

impl HeaderPanel {
    pub fn render(frame: &mut Frame, area: Rect) {
        let lines = vec![Line::from(vec![
            Span::styled(
                " Use the selectors below to choose a gene and describe a variant. ",
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                "←/→ column  ↑/↓ move  Enter select  Del clear  q quit",
                Style::default().fg(Color::DarkGray),
            ),
        ])];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Folding Energies ")
            .border_style(Style::default().fg(Color::Blue));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// One cascading selector column
pub struct SelectorPanel;

impl SelectorPanel {
    pub fn render<T: Clone>(
        frame: &mut Frame,
        area: Rect,
        column: Column,
        selector: &Selector<T>,
        focused: bool,
    ) {
        let border = if focused { Color::Cyan } else { Color::Blue };
        let current = selector.label().unwrap_or(column.placeholder());

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {}: {} ", column.title(), current))
            .border_style(Style::default().fg(border));

        let selected = selector.selected_index();
        let items: Vec<ListItem> = selector
            .options()
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let (mark, style) = if Some(i) == selected {
                    ("✓ ", Style::default().fg(Color::Green))
                } else {
                    ("  ", Style::default().fg(Color::White))
                };
                ListItem::new(Span::styled(format!("{}{}", mark, option.label), style))
            })
            .collect();

        let mut state = ListState::default();
        if focused && !items.is_empty() {
            state.select(Some(selector.cursor()));
        }

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_stateful_widget(list, area, &mut state);
    }
}

/// Histogram drawn as a sparkline over the fixed ΔΔG axis
pub struct HistogramPanel;

impl HistogramPanel {
    pub fn render(frame: &mut Frame, area: Rect, histogram: &Histogram) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", histogram.title))
            .border_style(Style::default().fg(Color::Blue));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Bars
                Constraint::Length(1), // Median marker
                Constraint::Length(1), // Axis
            ])
            .split(inner);

        let width = inner.width as usize;
        let data = histogram.rebin(width);
        let sparkline = Sparkline::default()
            .data(&data)
            .style(Style::default().fg(Color::Cyan));
        frame.render_widget(sparkline, rows[0]);

        frame.render_widget(
            Paragraph::new(marker_line(histogram, width)).style(Style::default().fg(Color::Red)),
            rows[1],
        );
        frame.render_widget(
            Paragraph::new(axis_line(histogram, width)).style(Style::default().fg(Color::Gray)),
            rows[2],
        );
    }
}

/// Interpretive text for the selected variant
pub struct SummaryPanel;

impl SummaryPanel {
    pub fn render(frame: &mut Frame, area: Rect, text: Option<&str>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Summary ")
            .border_style(Style::default().fg(Color::Blue));

        let paragraph = Paragraph::new(text.unwrap_or(""))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

/// Log panel showing scrollable history
pub struct LogPanel;

impl LogPanel {
    pub fn render(frame: &mut Frame, area: Rect, entries: &[String]) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Activity ")
            .border_style(Style::default().fg(Color::Blue));

        // Calculate how many items we can show
        let visible_height = area.height.saturating_sub(2) as usize; // -2 for borders
        let start = entries.len().saturating_sub(visible_height);

        let items: Vec<ListItem> = entries[start..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if i == entries.len() - start - 1 {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Span::styled(format!(" {}", entry), style))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

/// `▲` under the marker position followed by its label
pub fn marker_line(histogram: &Histogram, width: usize) -> String {
    let (Some(col), Some(marker)) = (histogram.marker_column(width), &histogram.marker) else {
        return String::new();
    };
    let mut line = " ".repeat(col);
    line.push('▲');
    let label = format!(" {}", marker.label);
    if col + 1 + label.chars().count() <= width {
        line.push_str(&label);
    } else {
        // not enough room on the right, put the label before the arrow
        let start = col.saturating_sub(marker.label.chars().count() + 1);
        line = format!("{}{} ▲", " ".repeat(start), marker.label);
    }
    line
}

/// Axis labels for the domain ends and zero
pub fn axis_line(histogram: &Histogram, width: usize) -> String {
    let min = format!("{}", histogram.min);
    let max = format!("{}", histogram.max);
    if width < min.len() + max.len() + 1 {
        return String::new();
    }

    let mut cells: Vec<char> = vec![' '; width];
    for (i, c) in min.chars().enumerate() {
        cells[i] = c;
    }
    for (i, c) in max.chars().enumerate() {
        cells[width - max.len() + i] = c;
    }

    if histogram.min < 0.0 && histogram.max > 0.0 {
        let zero = ((0.0 - histogram.min) / (histogram.max - histogram.min) * width as f64) as usize;
        if zero > min.len() && zero < width - max.len() - 1 {
            cells[zero] = '0';
        }
    }

    cells.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::{Marker, DDG_MAX, DDG_MIN, GENE_BINS};

    #[test]
    fn test_axis_line() {
        let hist = Histogram::empty("g", DDG_MIN, DDG_MAX, GENE_BINS);
        let line = axis_line(&hist, 110);
        assert_eq!(line.chars().count(), 110);
        assert!(line.starts_with("-10"));
        assert!(line.ends_with("100"));
        assert_eq!(line.chars().nth(10), Some('0'));
        assert_eq!(axis_line(&hist, 4), "");
    }

    #[test]
    fn test_marker_line() {
        let hist = Histogram::empty("g", DDG_MIN, DDG_MAX, GENE_BINS)
            .with_marker(Some(Marker::median(0.6)));
        let line = marker_line(&hist, 110);
        assert_eq!(line.find('▲'), Some(10));
        assert!(line.contains("Variant median: 0.60 kcal/mol"));

        let unmarked = Histogram::empty("g", DDG_MIN, DDG_MAX, GENE_BINS);
        assert_eq!(marker_line(&unmarked, 110), "");
    }

    #[test]
    fn test_marker_label_flips_near_right_edge() {
        let hist = Histogram::empty("g", DDG_MIN, DDG_MAX, GENE_BINS)
            .with_marker(Some(Marker::median(95.0)));
        let line = marker_line(&hist, 110);
        assert!(line.ends_with("kcal/mol ▲"));
    }
}

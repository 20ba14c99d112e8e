use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, widgets::*};
use unicode_width::UnicodeWidthStr;

use crate::error::Result;
use crate::portfolio::view::{format_amount, ChangeClass, Summary};
use crate::portfolio::{Holding, QuoteCache};
use crate::ui::TerminalGuard;

fn change_color(class: ChangeClass) -> Color {
    match class {
        ChangeClass::Up => Color::Green,
        ChangeClass::Down => Color::Red,
        ChangeClass::Flat => Color::Gray,
    }
}

struct TableRow {
    symbol: String,
    name: String,
    quantity: u32,
    price: Option<f64>,
    valuation: Option<f64>,
    change_percent: Option<f64>,
}

/// One row per holding, in holdings order; symbols without a cached quote
/// still get a row with placeholder cells.
fn build_rows(holdings: &[Holding], cache: &QuoteCache) -> Vec<TableRow> {
    holdings
        .iter()
        .map(|holding| {
            let quote = cache.get(&holding.symbol);
            let price = quote.and_then(|q| q.price);
            TableRow {
                symbol: holding.symbol.clone(),
                name: quote.map_or_else(|| "-".to_string(), |q| q.name.clone()),
                quantity: holding.quantity,
                price,
                valuation: price.map(|p| p * holding.quantity as f64),
                change_percent: quote.map(|q| q.change_percent),
            }
        })
        .collect()
}

/// Interactive holdings table with a valuation summary footer.
///
/// Up/Down scroll, `q`, Esc, or Ctrl-C closes.
pub fn run_holdings_table(
    holdings: &[Holding],
    cache: &QuoteCache,
    summary: &Summary,
) -> Result<()> {
    let rows_data = build_rows(holdings, cache);
    let name_width = rows_data
        .iter()
        .map(|row| row.name.width())
        .max()
        .unwrap_or(4)
        .clamp(4, 30) as u16;

    let mut guard = TerminalGuard::new()?;
    let mut offset: usize = 0;

    loop {
        let mut capacity: usize = 1;

        guard.terminal_mut().draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(2)])
                .split(frame.size());
            let table_area = chunks[0];
            let footer_area = chunks[1];

            capacity = (table_area.height.saturating_sub(3) as usize).max(1);
            let max_offset = rows_data.len().saturating_sub(capacity);
            offset = offset.min(max_offset);

            let visible_end = (offset + capacity).min(rows_data.len());
            let body = rows_data[offset..visible_end].iter().map(|row| {
                let change_cell = match row.change_percent {
                    Some(change) => Cell::from(format!("{change:+.2}%"))
                        .style(Style::default().fg(change_color(ChangeClass::of(change)))),
                    None => Cell::from("-").style(Style::default().fg(Color::DarkGray)),
                };
                Row::new(vec![
                    Cell::from(row.symbol.clone()),
                    Cell::from(row.name.clone()),
                    Cell::from(row.quantity.to_string()),
                    Cell::from(
                        row.price
                            .map_or_else(|| "-".to_string(), |p| format!("{p:.2}")),
                    ),
                    Cell::from(row.valuation.map_or_else(|| "-".to_string(), format_amount)),
                    change_cell,
                ])
            });

            let table = Table::new(
                body,
                [
                    Constraint::Length(8),
                    Constraint::Length(name_width),
                    Constraint::Length(8),
                    Constraint::Length(10),
                    Constraint::Length(14),
                    Constraint::Length(9),
                ],
            )
            .header(
                Row::new(vec!["Symbol", "Name", "Qty", "Price", "Value", "Change"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Portfolio ({} holdings)", rows_data.len())),
            );
            frame.render_widget(table, table_area);

            let summary_line = Line::from(vec![
                Span::raw(format!("Total: {}  ", format_amount(summary.total_valuation))),
                Span::styled(
                    format!(
                        "{} ({:+.2}%)",
                        format_amount(summary.total_change_amount),
                        summary.total_change_percent
                    ),
                    Style::default().fg(change_color(ChangeClass::of(
                        summary.total_change_percent,
                    ))),
                ),
            ]);
            let footer = Paragraph::new(vec![
                summary_line,
                Line::from(Span::styled(
                    "Up/Down scroll | q quit",
                    Style::default().fg(Color::DarkGray),
                )),
            ]);
            frame.render_widget(footer, footer_area);
        })?;

        if event::poll(Duration::from_millis(150))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Up => offset = offset.saturating_sub(1),
                    KeyCode::Down => offset = offset.saturating_add(1),
                    KeyCode::PageUp => offset = offset.saturating_sub(capacity),
                    KeyCode::PageDown => offset = offset.saturating_add(capacity),
                    _ => {}
                }
            }
        }
    }

    guard.restore()?;
    Ok(())
}

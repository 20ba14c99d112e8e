use std::sync::Arc;
use std::time::Duration;

use crossterm::event;
use ratatui::{prelude::*, widgets::*};
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::fetch::{RefreshProgress, RefreshReport};
use crate::ui::{centered_rect, TerminalGuard};

/// Show a progress gauge while a refresh task runs to completion.
///
/// There is no cancel path: once a cycle starts, every claimed symbol runs to
/// completion, so keys are drained and ignored until the task settles.
pub async fn run_refresh_progress(
    progress: Arc<RefreshProgress>,
    handle: JoinHandle<RefreshReport>,
) -> Result<RefreshReport> {
    let mut guard = TerminalGuard::new()?;

    loop {
        let completed = progress.completed();
        let total = progress.total();
        let ratio = progress.ratio();

        guard.terminal_mut().draw(|frame| {
            let area = centered_rect(60, 20, frame.size());
            frame.render_widget(Clear, area);

            let block = Block::default()
                .borders(Borders::ALL)
                .title("Refreshing quotes...");
            let inner = block.inner(area);
            frame.render_widget(block, area);

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Length(1)])
                .split(inner);

            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(Color::Cyan))
                .ratio(ratio)
                .label(format!("{} / {}", completed.min(total), total));
            frame.render_widget(gauge, chunks[0]);

            frame.render_widget(
                Paragraph::new("Fetching market data, please wait")
                    .style(Style::default().fg(Color::Gray))
                    .alignment(Alignment::Center),
                chunks[1],
            );
        })?;

        if handle.is_finished() {
            break;
        }

        // Drain input so keypresses do not pile up for the next screen.
        if event::poll(Duration::from_millis(50))? {
            let _ = event::read()?;
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let report = handle.await?;
    guard.restore()?;
    Ok(report)
}

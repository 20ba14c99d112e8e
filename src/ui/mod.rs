use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub mod progress;
pub mod table;
pub mod terminal;

pub use progress::run_refresh_progress;
pub use table::run_holdings_table;
pub use terminal::TerminalGuard;

/// Centered sub-rectangle sized as a percentage of the surrounding area.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{BarChart, Block, Borders, Cell, Clear, Gauge, List, ListItem, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::{Project, ProjectStats, upcoming_deadlines};
use crate::ui::centered_rect;

const CALENDAR_ROWS: usize = 8;

// Selection and popup state of the dashboard screen. The projects themselves
// live on the board and are passed in on every render.
pub struct DashboardState {
    table_state: TableState,
    show_delete_confirmation: bool,
}

pub enum DashboardAction {
    Quit,
    NewProject,
    ShowClients,
    ToggleFinish(i64),
    DeleteProject(i64),
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            table_state: TableState::default(),
            show_delete_confirmation: false,
        }
    }

    /// Keep the selection on a row that exists after the list changed
    pub fn sync(&mut self, len: usize) {
        let selected = match (self.table_state.selected(), len) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.table_state.select(selected);
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_id(&self, projects: &[Project]) -> Option<i64> {
        self.table_state
            .selected()
            .and_then(|i| projects.get(i))
            .map(|p| p.id)
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }
}

pub fn render_dashboard<B: Backend>(
    frame: &mut Frame<B>,
    state: &mut DashboardState,
    projects: &[Project],
    today: NaiveDate,
) {
    state.sync(projects.len());

    let size = frame.size();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(12),
            Constraint::Min(5),
            Constraint::Length(3),
        ].as_ref())
        .split(size);
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(rows[0]);

    render_calendar(frame, panels[0], projects, today);
    render_charts(frame, panels[1], projects);
    render_table(frame, rows[1], state, projects);

    let buttons_text = if state.selected_id(projects).is_some() {
        "<N> New Project | <F> Toggle Finished | <D> Delete | <C> Clients | <Q> Quit"
    } else {
        "<N> New Project | <C> Clients | <Q> Quit"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, rows[2]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn render_calendar<B: Backend>(frame: &mut Frame<B>, area: Rect, projects: &[Project], today: NaiveDate) {
    let items: Vec<ListItem> = upcoming_deadlines(projects, today, CALENDAR_ROWS)
        .into_iter()
        .map(|deadline| {
            let (when, color) = match deadline.days_left {
                d if d < 0 => (format!("{} days late", -d), Color::Red),
                0 => ("today".to_string(), Color::Yellow),
                d => (format!("in {} days", d), Color::Green),
            };
            ListItem::new(Spans::from(vec![
                Span::raw(deadline.date.format("%Y-%m-%d").to_string()),
                Span::raw("  "),
                Span::raw(deadline.project.title.clone()),
                Span::raw("  "),
                Span::styled(when, Style::default().fg(color)),
            ]))
        })
        .collect();

    let calendar = List::new(items)
        .block(Block::default().title("Upcoming Deadlines").borders(Borders::ALL));
    frame.render_widget(calendar, area);
}

fn render_charts<B: Backend>(frame: &mut Frame<B>, area: Rect, projects: &[Project]) {
    let stats = ProjectStats::from_projects(projects);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(3),
        ].as_ref())
        .split(area);

    let labels: Vec<String> = projects
        .iter()
        .map(|p| p.title.chars().take(6).collect())
        .collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(projects)
        .map(|(label, p)| (label.as_str(), p.achievements.clamp(0.0, 100.0).round() as u64))
        .collect();

    let progress = BarChart::default()
        .block(Block::default().title("Progress %").borders(Borders::ALL))
        .data(&data)
        .max(100)
        .bar_width(6)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(progress, chunks[0]);

    let completion = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio(stats.completion_ratio())
        .label(gauge_label(&stats));
    frame.render_widget(completion, chunks[1]);
}

fn gauge_label(stats: &ProjectStats) -> String {
    format!(
        "{}/{} finished, {} open | {:.2} total | {:.2} outstanding | {:.0}% avg",
        stats.finished,
        stats.total,
        stats.open,
        stats.total_price,
        stats.open_price,
        stats.average_achievements
    )
}

fn render_table<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &mut DashboardState, projects: &[Project]) {
    let header = Row::new(vec!["Title", "Deadline", "Person", "Client", "Progress", "Price", "Done"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = projects
        .iter()
        .map(|project| {
            let style = if project.finished {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(project.title.clone()),
                Cell::from(project.deadline.clone()),
                Cell::from(project.person.clone()),
                Cell::from(project.client.clone()),
                Cell::from(format!("{:.0}%", project.achievements)),
                Cell::from(format!("{:.2}", project.price)),
                Cell::from(if project.finished { "yes" } else { "no" }),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Projects").borders(Borders::ALL))
        .widths(&[
            Constraint::Percentage(24),
            Constraint::Percentage(12),
            Constraint::Percentage(14),
            Constraint::Percentage(16),
            Constraint::Percentage(10),
            Constraint::Percentage(14),
            Constraint::Percentage(8),
        ])
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(table, area, &mut state.table_state);
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this project?"),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

pub fn handle_key(state: &mut DashboardState, projects: &[Project], key: KeyCode) -> Option<DashboardAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.toggle_delete_confirmation();
                return state.selected_id(projects).map(DashboardAction::DeleteProject);
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => state.toggle_delete_confirmation(),
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(DashboardAction::Quit),
        KeyCode::Char('n') => return Some(DashboardAction::NewProject),
        KeyCode::Char('c') => return Some(DashboardAction::ShowClients),
        KeyCode::Char('f') => return state.selected_id(projects).map(DashboardAction::ToggleFinish),
        KeyCode::Char('d') => {
            if state.selected_id(projects).is_some() {
                state.toggle_delete_confirmation();
            }
        }
        KeyCode::Down => state.next(projects.len()),
        KeyCode::Up => state.previous(projects.len()),
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut DashboardState, projects: &[Project]) -> Result<Option<DashboardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, projects, key.code));
    }
    Ok(None)
}

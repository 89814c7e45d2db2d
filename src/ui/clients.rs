use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::ClientSummary;

// Represents the state of the clients screen
pub struct ClientsState {
    table_state: TableState,
}

pub enum ClientAction {
    Back,
}

impl ClientsState {
    pub fn new() -> Self {
        Self {
            table_state: TableState::default(),
        }
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
}

pub fn render_clients<B: Backend>(frame: &mut Frame<B>, state: &mut ClientsState, clients: &[ClientSummary]) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    let header = Row::new(vec!["Client", "Contact", "Projects"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = clients
        .iter()
        .map(|client| {
            let contact = if client.contact.is_empty() {
                "-".to_string()
            } else {
                client.contact.clone()
            };
            Row::new(vec![client.name.clone(), contact, client.project_count.to_string()])
        })
        .collect();

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Clients").borders(Borders::ALL))
        .widths(&[
            Constraint::Percentage(40),
            Constraint::Percentage(45),
            Constraint::Percentage(15),
        ])
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(table, chunks[0], &mut state.table_state);

    let buttons = Paragraph::new("<Up/Down> Browse | <Esc> Back")
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[1]);
}

pub fn handle_key(state: &mut ClientsState, len: usize, key: KeyCode) -> Option<ClientAction> {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(ClientAction::Back),
        KeyCode::Down => state.next(len),
        KeyCode::Up => state.previous(len),
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut ClientsState, len: usize) -> Result<Option<ClientAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, len, key.code));
    }
    Ok(None)
}

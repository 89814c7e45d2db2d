use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::models::NewProject;
use crate::ui::centered_rect;
use crate::ui::components::date_input::DateInputState;

pub enum ProjectWizardAction {
    Cancel,
    Save(NewProject),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ProjectField {
    Title,
    Description,
    Deadline,
    Person,
    Client,
    Contact,
    Achievements,
    Price,
}

const FIELDS: [ProjectField; 8] = [
    ProjectField::Title,
    ProjectField::Description,
    ProjectField::Deadline,
    ProjectField::Person,
    ProjectField::Client,
    ProjectField::Contact,
    ProjectField::Achievements,
    ProjectField::Price,
];

impl ProjectField {
    fn label(self) -> &'static str {
        match self {
            ProjectField::Title => "Title *",
            ProjectField::Description => "Description",
            ProjectField::Deadline => "Deadline *",
            ProjectField::Person => "Person *",
            ProjectField::Client => "Client",
            ProjectField::Contact => "Contact",
            ProjectField::Achievements => "Progress %",
            ProjectField::Price => "Price",
        }
    }

    fn index(self) -> usize {
        FIELDS.iter().position(|f| *f == self).unwrap_or(0)
    }
}

pub struct ProjectWizardState {
    pub current_field: ProjectField,
    pub editing: bool,
    title: String,
    description: String,
    deadline: Option<NaiveDate>,
    deadline_state: DateInputState,
    person: String,
    client: String,
    contact: String,
    achievements: String,
    price: String,
    alert: Option<String>,
}

impl ProjectWizardState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            current_field: ProjectField::Title,
            editing: false,
            title: String::new(),
            description: String::new(),
            deadline: None,
            deadline_state: DateInputState::new(today),
            person: String::new(),
            client: String::new(),
            contact: String::new(),
            achievements: String::new(),
            price: String::new(),
            alert: None,
        }
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.current_field == ProjectField::Deadline {
            self.deadline_state.toggle_editing();
            if !self.editing {
                self.deadline = Some(self.deadline_state.date);
            }
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = FIELDS[(self.current_field.index() + 1) % FIELDS.len()];
    }

    pub fn previous_field(&mut self) {
        self.current_field = FIELDS[(self.current_field.index() + FIELDS.len() - 1) % FIELDS.len()];
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let text = match self.current_field {
            ProjectField::Deadline => {
                self.deadline_state.handle_input(key);
                return;
            }
            ProjectField::Achievements => {
                match key {
                    KeyCode::Char(c) if c.is_ascii_digit() => {
                        let candidate = format!("{}{}", self.achievements, c);
                        if candidate.parse::<u32>().is_ok_and(|v| v <= 100) {
                            self.achievements = candidate;
                        }
                    }
                    KeyCode::Backspace => {
                        self.achievements.pop();
                    }
                    _ => {}
                }
                return;
            }
            ProjectField::Price => {
                match key {
                    KeyCode::Char(c) if c.is_ascii_digit() => self.price.push(c),
                    KeyCode::Char('.') if !self.price.contains('.') => self.price.push('.'),
                    KeyCode::Backspace => {
                        self.price.pop();
                    }
                    _ => {}
                }
                return;
            }
            ProjectField::Title => &mut self.title,
            ProjectField::Description => &mut self.description,
            ProjectField::Person => &mut self.person,
            ProjectField::Client => &mut self.client,
            ProjectField::Contact => &mut self.contact,
        };

        match key {
            KeyCode::Char(c) => text.push(c),
            KeyCode::Backspace => {
                text.pop();
            }
            _ => {}
        }
    }

    /// The create request for the form, or the alert to show instead
    pub fn to_new_project(&self) -> Result<NewProject, String> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.deadline.is_none() {
            missing.push("deadline");
        }
        if self.person.trim().is_empty() {
            missing.push("person");
        }
        if !missing.is_empty() {
            return Err(format!("Please fill in: {}", missing.join(", ")));
        }

        let price = match self.price.as_str() {
            "" => None,
            raw => Some(raw.parse::<f64>().map_err(|_| "Price must be a number".to_string())?),
        };
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        Ok(NewProject {
            title: Some(self.title.trim().to_string()),
            description: non_empty(&self.description),
            deadline: self.deadline.map(|d| d.format("%Y-%m-%d").to_string()),
            person: Some(self.person.trim().to_string()),
            client: non_empty(self.client.trim()),
            contact: non_empty(self.contact.trim()),
            achievements: self.achievements.parse().ok(),
            price,
            finished: None,
        })
    }

    fn display_value(&self, field: ProjectField) -> String {
        match field {
            ProjectField::Title => self.title.clone(),
            ProjectField::Description => self.description.clone(),
            ProjectField::Deadline => {
                if self.editing && self.current_field == ProjectField::Deadline {
                    self.deadline_state.display()
                } else {
                    match self.deadline {
                        Some(date) => date.format("%Y-%m-%d").to_string(),
                        None => "Not set".to_string(),
                    }
                }
            }
            ProjectField::Person => self.person.clone(),
            ProjectField::Client => self.client.clone(),
            ProjectField::Contact => self.contact.clone(),
            ProjectField::Achievements => self.achievements.clone(),
            ProjectField::Price => self.price.clone(),
        }
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("New Project")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = if state.editing {
        match state.current_field {
            ProjectField::Deadline => "Enter - Save field | Left/Right - Switch date part",
            _ => "Enter - Save field | Esc - Stop editing",
        }
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save project | Esc - Cancel"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    if let Some(message) = state.alert() {
        render_alert(f, message);
    }
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &ProjectWizardState, area: Rect) {
    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|&field| {
            let selected = field == state.current_field;
            let value = state.display_value(field);

            let content = if selected && state.editing {
                let value = if field == ProjectField::Deadline {
                    value
                } else {
                    format!("{}|", value)
                };
                Spans::from(vec![
                    Span::styled(format!("{}: ", field.label()), Style::default().fg(Color::Yellow)),
                    Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
                ])
            } else {
                let style = if selected {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Spans::from(vec![
                    Span::styled(format!("{}: ", field.label()), style),
                    Span::raw(value),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Project Details"));
    f.render_widget(form, area);
}

fn render_alert<B: Backend>(f: &mut Frame<B>, message: &str) {
    let area = centered_rect(50, 20, f.size());
    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(message.to_string()),
        Spans::from(""),
        Spans::from("Press any key"),
    ])
    .block(Block::default().title("Cannot Save").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Red));

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

pub fn handle_key(state: &mut ProjectWizardState, key: KeyCode) -> Option<ProjectWizardAction> {
    if state.alert.take().is_some() {
        return None;
    }

    match key {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(ProjectWizardAction::Cancel);
            }
        }
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => match state.to_new_project() {
            Ok(project) => return Some(ProjectWizardAction::Save(project)),
            Err(message) => state.alert = Some(message),
        },
        _ if state.editing => state.edit_current_field(key),
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut ProjectWizardState) -> Result<Option<ProjectWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 20).unwrap()
    }

    fn type_text(state: &mut ProjectWizardState, text: &str) {
        handle_key(state, KeyCode::Enter);
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
        handle_key(state, KeyCode::Enter);
    }

    fn go_to(state: &mut ProjectWizardState, field: ProjectField) {
        while state.current_field != field {
            handle_key(state, KeyCode::Down);
        }
    }

    #[test]
    fn saving_an_incomplete_form_raises_an_alert() {
        let mut state = ProjectWizardState::new(today());
        type_text(&mut state, "Website");

        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert_eq!(state.alert(), Some("Please fill in: deadline, person"));

        // any key dismisses the alert without acting
        assert!(handle_key(&mut state, KeyCode::Esc).is_none());
        assert_eq!(state.alert(), None);
    }

    #[test]
    fn complete_form_becomes_a_create_request() {
        let mut state = ProjectWizardState::new(today());
        type_text(&mut state, "Website");

        go_to(&mut state, ProjectField::Deadline);
        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Right);
        handle_key(&mut state, KeyCode::Char('1'));
        handle_key(&mut state, KeyCode::Char('2'));
        handle_key(&mut state, KeyCode::Right);
        handle_key(&mut state, KeyCode::Char('0'));
        handle_key(&mut state, KeyCode::Char('1'));
        handle_key(&mut state, KeyCode::Enter);

        go_to(&mut state, ProjectField::Person);
        type_text(&mut state, "Alice");
        go_to(&mut state, ProjectField::Client);
        type_text(&mut state, "Acme");
        go_to(&mut state, ProjectField::Achievements);
        type_text(&mut state, "1005");
        go_to(&mut state, ProjectField::Price);
        type_text(&mut state, "12.5.0");

        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(ProjectWizardAction::Save(project)) => {
                assert_eq!(
                    project,
                    NewProject {
                        title: Some("Website".into()),
                        deadline: Some("2024-12-01".into()),
                        person: Some("Alice".into()),
                        client: Some("Acme".into()),
                        achievements: Some(100.0),
                        price: Some(12.50),
                        ..Default::default()
                    }
                );
            }
            _ => panic!("expected the form to save"),
        }
    }

    #[test]
    fn escape_cancels_only_when_not_editing() {
        let mut state = ProjectWizardState::new(today());
        handle_key(&mut state, KeyCode::Enter);
        assert!(handle_key(&mut state, KeyCode::Esc).is_none());
        assert!(!state.editing);
        assert!(matches!(handle_key(&mut state, KeyCode::Esc), Some(ProjectWizardAction::Cancel)));
    }

    #[test]
    fn field_navigation_wraps() {
        let mut state = ProjectWizardState::new(today());
        handle_key(&mut state, KeyCode::Up);
        assert_eq!(state.current_field, ProjectField::Price);
        handle_key(&mut state, KeyCode::Down);
        assert_eq!(state.current_field, ProjectField::Title);
    }
}

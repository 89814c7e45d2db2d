use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

/// Which segment of a `YYYY-MM-DD` date is being typed
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

impl DatePart {
    fn width(self) -> usize {
        match self {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        }
    }

    fn previous(self) -> Self {
        match self {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        }
    }
}

/// Segmented date entry: digits fill the current part, Left/Right move
/// between parts. A part is applied once all its digits are typed and only
/// if the resulting date exists.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    buffer: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            buffer: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        self.date_part = DatePart::Year;
        self.buffer.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                if self.buffer.len() == self.date_part.width() {
                    self.apply_buffer();
                    self.buffer.clear();
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Right => {
                self.date_part = self.date_part.next();
                self.buffer.clear();
            }
            KeyCode::Left => {
                self.date_part = self.date_part.previous();
                self.buffer.clear();
            }
            _ => {}
        }
    }

    fn apply_buffer(&mut self) {
        let Ok(value) = self.buffer.parse::<u32>() else {
            return;
        };
        let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());

        let candidate = match self.date_part {
            DatePart::Year if (1900..=2100).contains(&value) => NaiveDate::from_ymd_opt(value as i32, month, day),
            DatePart::Month => NaiveDate::from_ymd_opt(year, value, day),
            DatePart::Day => NaiveDate::from_ymd_opt(year, month, value),
            _ => None,
        };
        if let Some(date) = candidate {
            self.date = date;
        }
    }

    pub fn value(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// The date with the part being edited shown in brackets
    pub fn display(&self) -> String {
        if !self.editing {
            return self.value();
        }

        let pending = if self.buffer.is_empty() {
            match self.date_part {
                DatePart::Year => "YYYY".to_string(),
                DatePart::Month => "MM".to_string(),
                DatePart::Day => "DD".to_string(),
            }
        } else {
            self.buffer.clone()
        };

        let year = format!("{:04}", self.date.year());
        let month = format!("{:02}", self.date.month());
        let day = format!("{:02}", self.date.day());
        match self.date_part {
            DatePart::Year => format!("{year}[{pending}]-{month}-{day}"),
            DatePart::Month => format!("{year}-{month}[{pending}]-{day}"),
            DatePart::Day => format!("{year}-{month}-{day}[{pending}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(state: &mut DateInputState, keys: &str) {
        for c in keys.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    fn editing(date: NaiveDate) -> DateInputState {
        let mut state = DateInputState::new(date);
        state.toggle_editing();
        state
    }

    #[test]
    fn typing_each_part_sets_the_date() {
        let mut state = editing(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        typed(&mut state, "2025");
        state.handle_input(KeyCode::Right);
        typed(&mut state, "03");
        state.handle_input(KeyCode::Right);
        typed(&mut state, "31");
        assert_eq!(state.value(), "2025-03-31");
    }

    #[test]
    fn impossible_dates_are_ignored() {
        let mut state = editing(NaiveDate::from_ymd_opt(2023, 2, 10).unwrap());
        state.handle_input(KeyCode::Left);
        typed(&mut state, "30");
        assert_eq!(state.value(), "2023-02-10");

        state.handle_input(KeyCode::Left);
        state.handle_input(KeyCode::Left);
        typed(&mut state, "1800");
        assert_eq!(state.value(), "2023-02-10");
    }

    #[test]
    fn display_brackets_the_active_part() {
        let mut state = editing(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(state.display(), "2024[YYYY]-06-01");
        state.handle_input(KeyCode::Right);
        typed(&mut state, "1");
        assert_eq!(state.display(), "2024-06[1]-01");

        state.toggle_editing();
        assert_eq!(state.display(), "2024-06-01");
    }

    #[test]
    fn keys_are_ignored_unless_editing() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        typed(&mut state, "1999");
        assert_eq!(state.value(), "2024-06-01");
    }
}

use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

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
}

/// Segment-by-segment editor for an optional date (YYYY-MM-DD).
pub struct DateInputState {
    pub date: Option<NaiveDate>,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_date_input: String,
    fallback: NaiveDate,
}

impl DateInputState {
    /// `fallback` seeds the segments when editing starts on an empty date.
    pub fn new(date: Option<NaiveDate>, fallback: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            current_date_input: String::new(),
            fallback,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            if self.date.is_none() {
                self.date = Some(self.fallback);
            }
            self.date_part = DatePart::Year;
        }
        self.current_date_input.clear();
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.current_date_input.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.current_date_input.push(c);
                if self.current_date_input.len() == self.date_part.width() {
                    self.apply_segment();
                    self.current_date_input.clear();
                }
            }
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Delete => {
                self.date = None;
                self.editing = false;
                self.current_date_input.clear();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    // Out-of-range segments (month 13, Feb 30, ...) are dropped.
    fn apply_segment(&mut self) {
        let Some(date) = self.date else { return };
        let Ok(value) = self.current_date_input.parse::<u32>() else { return };

        let updated = match self.date_part {
            DatePart::Year if (1900..=2100).contains(&value) => date.with_year(value as i32),
            DatePart::Month => date.with_month(value),
            DatePart::Day => date.with_day(value),
            DatePart::Year => None,
        };

        if let Some(updated) = updated {
            self.date = Some(updated);
        }
    }

    pub fn get_display_string(&self) -> String {
        let Some(date) = self.date else {
            return String::new();
        };
        if !self.editing {
            return date.format("%Y-%m-%d").to_string();
        }

        let current_input = if !self.current_date_input.is_empty() {
            format!("[{}]", self.current_date_input)
        } else {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        };

        let (year, month, day) = (date.year(), date.month(), date.day());
        match self.date_part {
            DatePart::Year => format!("{}{}-{:02}-{:02}", year, current_input, month, day),
            DatePart::Month => format!("{}-{:02}{}-{:02}", year, month, current_input, day),
            DatePart::Day => format!("{}-{:02}-{:02}{}", year, month, day, current_input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn type_digits(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn editing_an_empty_date_starts_from_the_fallback() {
        let mut state = DateInputState::new(None, date(2025, 3, 3));
        assert_eq!(state.get_display_string(), "");

        state.toggle_editing();
        assert_eq!(state.date, Some(date(2025, 3, 3)));
    }

    #[test]
    fn segments_are_typed_in_order() {
        let mut state = DateInputState::new(None, date(2025, 3, 3));
        state.toggle_editing();

        type_digits(&mut state, "2026");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "04");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "15");
        state.toggle_editing();

        assert_eq!(state.date, Some(date(2026, 4, 15)));
        assert_eq!(state.get_display_string(), "2026-04-15");
    }

    #[test]
    fn invalid_day_is_ignored() {
        let mut state = DateInputState::new(Some(date(2025, 2, 10)), date(2025, 1, 1));
        state.toggle_editing();
        state.handle_input(KeyCode::Left);

        type_digits(&mut state, "30");

        assert_eq!(state.date, Some(date(2025, 2, 10)));
    }

    #[test]
    fn delete_clears_the_date() {
        let mut state = DateInputState::new(Some(date(2025, 2, 10)), date(2025, 1, 1));
        state.toggle_editing();
        state.handle_input(KeyCode::Delete);

        assert_eq!(state.date, None);
        assert!(!state.editing);
    }

    #[test]
    fn display_marks_the_segment_being_edited() {
        let mut state = DateInputState::new(Some(date(2025, 2, 10)), date(2025, 1, 1));
        state.toggle_editing();
        state.next_date_part();
        assert_eq!(state.get_display_string(), "2025-02[MM]-10");

        state.handle_input(KeyCode::Char('1'));
        assert_eq!(state.get_display_string(), "2025-02[1]-10");
    }
}

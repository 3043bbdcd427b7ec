pub mod date_input;

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Applies a keystroke to a free-text field.
pub fn edit_text(value: &mut String, key: KeyCode) {
    match key {
        KeyCode::Char(c) => value.push(c),
        KeyCode::Backspace => {
            value.pop();
        }
        _ => {}
    }
}

/// Applies a keystroke to a numeric field; only digits and one '.' get through.
pub fn edit_number(value: &mut String, key: KeyCode) {
    match key {
        KeyCode::Char(c) if c.is_ascii_digit() => value.push(c),
        KeyCode::Char('.') if !value.contains('.') => value.push('.'),
        KeyCode::Backspace => {
            value.pop();
        }
        _ => {}
    }
}

pub fn render_error<B: Backend>(frame: &mut Frame<B>, size: Rect, error: &str) {
    render_popup(frame, size, "Error", error, "Press any key to continue", Color::Red);
}

pub fn render_notice<B: Backend>(frame: &mut Frame<B>, size: Rect, title: &str, message: &str) {
    render_popup(frame, size, title, message, "Press any key to continue", Color::Green);
}

pub fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect, noun: &str) {
    let question = format!("Are you sure you want to delete this {}?", noun);
    render_popup(frame, size, "Confirm Delete", &question, "<Y> Yes  <N> No", Color::White);
}

fn render_popup<B: Backend>(
    frame: &mut Frame<B>,
    size: Rect,
    title: &str,
    message: &str,
    hint: &str,
    color: Color,
) {
    let popup_area = centered_rect(60, 25, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(message.to_string()),
        Spans::from(""),
        Spans::from(hint.to_string()),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().title(title.to_string()).borders(Borders::ALL))
    .style(Style::default().fg(color).bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_fields_accept_one_decimal_point() {
        let mut value = String::new();
        for key in ['1', 'x', '2', '.', '5', '.', '0'] {
            edit_number(&mut value, KeyCode::Char(key));
        }
        assert_eq!(value, "12.50");

        edit_number(&mut value, KeyCode::Backspace);
        assert_eq!(value, "12.5");
    }

    #[test]
    fn text_fields_take_any_character() {
        let mut value = "Ac".to_string();
        edit_text(&mut value, KeyCode::Char('m'));
        edit_text(&mut value, KeyCode::Char('e'));
        edit_text(&mut value, KeyCode::Enter);
        assert_eq!(value, "Acme");
    }
}

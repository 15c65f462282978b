use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::time::Duration;

use crate::app::{App, Screen};

/// Poll for keyboard events with timeout
pub fn poll_event(timeout_ms: u64) -> anyhow::Result<Option<Event>> {
    if event::poll(Duration::from_millis(timeout_ms))? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_event(app: &mut App, event: Event) {
    let Event::Key(key) = event else {
        // Resize is handled by ratatui
        return;
    };
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Any key dismisses the message popup
    if app.message.take().is_some() {
        return;
    }

    match app.screen {
        Screen::NewTenant => handle_new_tenant(app, key.code),
        Screen::AccessDialog => handle_access_dialog(app, key.code),
        _ => {
            if !handle_navigation(app, key.code) {
                handle_screen(app, key.code);
            }
        }
    }
}

/// Keys that work on every list or page screen. Returns whether the key was used.
fn handle_navigation(app: &mut App, code: KeyCode) -> bool {
    let target = match code {
        KeyCode::Char('1') => Screen::Overview,
        KeyCode::Char('2') => Screen::Identities,
        KeyCode::Char('3') => Screen::Devices,
        KeyCode::Char('4') => Screen::Cloud,
        KeyCode::Char('5') => Screen::Widgets,
        KeyCode::Char('t') => Screen::Tenants,
        KeyCode::Char('a') => Screen::Access,
        KeyCode::Char('l') => Screen::AuditLog,
        KeyCode::Char('n') => {
            app.open_new_tenant();
            return true;
        }
        KeyCode::Char('r') => {
            app.refresh();
            return true;
        }
        KeyCode::Char('q') => {
            app.quit();
            return true;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.cursor_up();
            return true;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.cursor_down();
            return true;
        }
        KeyCode::Esc | KeyCode::Backspace => {
            app.go_back();
            return true;
        }
        _ => return false,
    };

    if target != app.screen {
        app.open(target);
    }
    true
}

fn handle_screen(app: &mut App, code: KeyCode) {
    match (app.screen, code) {
        (Screen::Tenants, KeyCode::Enter) => app.select_tenant(),
        (Screen::Widgets, KeyCode::Enter | KeyCode::Char(' ')) => app.toggle_selected_widget(),
        (Screen::Access, KeyCode::Enter) => app.open_access_dialog(),
        _ => {}
    }
}

fn handle_access_dialog(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
        KeyCode::Char(' ') => app.toggle_dialog_tenant(),
        KeyCode::Enter => app.save_access(),
        KeyCode::Esc => app.go_back(),
        _ => {}
    }
}

fn handle_new_tenant(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Tab | KeyCode::Down => app.form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form.prev_field(),
        KeyCode::Char(c) => app.form.push(c),
        KeyCode::Backspace => app.form.pop(),
        KeyCode::Enter => app.submit_new_tenant(),
        KeyCode::Esc => app.go_back(),
        _ => {}
    }
}

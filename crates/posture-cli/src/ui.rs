use posture_core::classify::{score_trend, RiskLevel, ScoreGrade};
use posture_core::{AnalystCommentary, EvaluatedMethod, PhishResistance, ScoreCategory};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Gauge, List, ListItem, ListState,
        Paragraph, Row, Table, TableState, Wrap,
    },
    Frame,
};

use crate::app::{App, Screen};
use crate::form::Field;
use crate::sync::Notice;
use crate::theme::Theme;

const PAGES: [(char, Screen); 5] = [
    ('1', Screen::Overview),
    ('2', Screen::Identities),
    ('3', Screen::Devices),
    ('4', Screen::Cloud),
    ('5', Screen::Widgets),
];

pub fn render(frame: &mut Frame, app: &App) {
    let theme = Theme::default();
    let area = frame.area();

    let tenant = app
        .store
        .tenants
        .selected_tenant()
        .map(|t| format!(" · {}", t.name))
        .unwrap_or_default();
    let loading = if app.screen.resources().iter().any(|r| app.store.is_loading(*r)) {
        " · loading…"
    } else {
        ""
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(format!(" 🛡 Posture{} · {}{} ", tenant, app.screen.title(), loading))
        .title_style(theme.title);
    frame.render_widget(block, area);

    let failure = app.store.first_error(app.screen.resources());
    let layout = Layout::default()
        .constraints([
            Constraint::Length(1),                                    // Page tabs
            Constraint::Length(if failure.is_some() { 3 } else { 0 }), // Error banner
            Constraint::Min(5),                                       // Body
            Constraint::Length(1),                                    // Footer
        ])
        .split(inner_rect(area, 1));

    render_tabs(frame, app, layout[0], &theme);
    if let Some((resource, message)) = failure {
        render_error_banner(frame, resource.label(), message, layout[1], &theme);
    }

    let body = layout[2];
    match app.screen {
        Screen::Tenants => render_tenants(frame, app, body, &theme),
        Screen::Overview => render_overview(frame, app, body, &theme),
        Screen::Identities => render_identities(frame, app, body, &theme),
        Screen::Devices => render_devices(frame, app, body, &theme),
        Screen::Cloud => render_cloud(frame, app, body, &theme),
        Screen::Widgets => render_widgets(frame, app, body, &theme),
        Screen::Access => render_access(frame, app, body, &theme),
        Screen::AccessDialog => {
            render_access(frame, app, body, &theme);
            render_access_dialog(frame, app, &theme);
        }
        Screen::NewTenant => render_new_tenant(frame, app, body, &theme),
        Screen::AuditLog => render_audit_log(frame, app, body, &theme),
    }

    render_footer(frame, app.screen, layout[3], &theme);

    if let Some(notice) = &app.message {
        render_message(frame, notice, &theme);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let mut spans = Vec::new();
    for (key, screen) in PAGES {
        let style = if app.screen == screen { theme.selected } else { theme.normal };
        spans.push(Span::styled(format!(" {} ", key), theme.key_hint));
        spans.push(Span::styled(format!("{} ", screen.title()), style));
    }
    spans.push(Span::raw("   "));
    for (key, screen) in [('t', Screen::Tenants), ('a', Screen::Access), ('l', Screen::AuditLog)] {
        let style = if app.screen == screen { theme.selected } else { theme.muted };
        spans.push(Span::styled(format!(" {} ", key), theme.key_hint));
        spans.push(Span::styled(format!("{} ", screen.title()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Shown above the page body while one of its resources is failed; stale data stays below.
fn render_error_banner(frame: &mut Frame, what: &str, message: &str, area: Rect, theme: &Theme) {
    let banner = Paragraph::new(vec![
        Line::from(Span::styled(format!("Could not load {}", what), theme.danger)),
        Line::from(vec![
            Span::styled(message.to_string(), theme.normal),
            Span::styled("  (r to retry)", theme.muted),
        ]),
    ])
    .block(Block::default().borders(Borders::LEFT).border_style(theme.danger));
    frame.render_widget(banner, area);
}

fn render_footer(frame: &mut Frame, screen: Screen, area: Rect, theme: &Theme) {
    let hints: &[(&str, &str)] = match screen {
        Screen::Tenants => &[
            ("↑/↓", "Navigate"),
            ("Enter", "Select"),
            ("n", "New tenant"),
            ("q", "Quit"),
        ],
        Screen::Widgets => &[
            ("↑/↓", "Navigate"),
            ("Space", "Toggle"),
            ("r", "Refresh"),
            ("Esc", "Back"),
        ],
        Screen::Access => &[("↑/↓", "Navigate"), ("Enter", "Edit access"), ("Esc", "Back")],
        Screen::AccessDialog => &[
            ("↑/↓", "Navigate"),
            ("Space", "Toggle"),
            ("Enter", "Save"),
            ("Esc", "Cancel"),
        ],
        Screen::NewTenant => &[("Tab", "Next field"), ("Enter", "Create"), ("Esc", "Cancel")],
        _ => &[("1-5", "Pages"), ("r", "Refresh"), ("Esc", "Back"), ("q", "Quit")],
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), theme.key_hint));
        spans.push(Span::styled(label.to_string(), theme.muted));
        spans.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

fn placeholder(frame: &mut Frame, text: &str, area: Rect, theme: &Theme) {
    let p = Paragraph::new(text.to_string())
        .style(theme.muted)
        .alignment(Alignment::Center);
    frame.render_widget(p, area);
}

fn titled<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(title)
        .title_style(theme.title)
}

fn render_tenants(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let tenants = &app.store.tenants.tenants;
    if tenants.is_empty() {
        let msg = if app.store.is_loading(posture_core::state::Resource::Tenants) {
            "Loading..."
        } else {
            "(No tenants yet, press n to create one)"
        };
        placeholder(frame, msg, area, theme);
        return;
    }

    let items: Vec<ListItem> = tenants
        .iter()
        .map(|t| {
            let marker = if app.store.tenants.selected.as_deref() == Some(t.id.as_str()) {
                "● "
            } else {
                "  "
            };
            let connection = if t.is_connected() {
                Span::styled("M365 connected", theme.success)
            } else {
                Span::styled("M365 not connected", theme.warning)
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{}{:<30} {:<28} ", marker, t.name, t.domain)),
                connection,
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(theme.selected)
        .highlight_symbol("▸ ");
    let mut state = ListState::default().with_selected(Some(app.tenant_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_overview(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let layout = Layout::default()
        .constraints([
            Constraint::Length(4), // Secure score gauge
            Constraint::Min(8),    // History chart
            Constraint::Length(6), // Category scores
        ])
        .split(area);

    let scores = &app.store.scores;
    match scores.current() {
        Some(current) => {
            let grade = ScoreGrade::from_percentage(current.percentage);
            let ratio = if current.percentage.is_finite() {
                (current.percentage / 100.0).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut label = format!("{:.1}% · {}", current.percentage, grade.description());
            if let Some(comparative) = current.comparative {
                label.push_str(&format!(" · similar orgs {:.1}%", comparative));
            }
            let series: Vec<f64> = scores.secure_scores.iter().map(|e| e.percentage).collect();
            if let Some(trend) = score_trend(&series) {
                label.push_str(&format!(" · {:+.1} since last month", trend));
            }

            let gauge = Gauge::default()
                .block(titled(" Secure Score ", theme))
                .gauge_style(theme.tone(grade.tone()))
                .ratio(ratio)
                .label(label);
            frame.render_widget(gauge, layout[0]);
        }
        None => placeholder(frame, "No secure score yet", layout[0], theme),
    }

    if scores.history.is_empty() {
        placeholder(frame, "(No score history)", layout[1], theme);
    } else {
        let bars: Vec<Bar> = scores
            .history
            .iter()
            .map(|entry| {
                let grade = ScoreGrade::from_percentage(entry.percentage);
                Bar::default()
                    .value(entry.percentage.max(0.0).round() as u64)
                    .text_value(format!("{:.0}", entry.percentage))
                    .label(Line::from(entry.month.clone()))
                    .style(theme.tone(grade.tone()))
            })
            .collect();
        let chart = BarChart::default()
            .block(titled(" Score history ", theme))
            .data(BarGroup::default().bars(&bars))
            .max(100)
            .bar_width(5)
            .bar_gap(1);
        frame.render_widget(chart, layout[1]);
    }

    let rows: Vec<Row> = ScoreCategory::all()
        .iter()
        .map(|category| match scores.categories.get(category) {
            Some(score) => {
                let grade = ScoreGrade::from_percentage(score.percentage);
                let risk = RiskLevel::from_score(score.percentage);
                Row::new(vec![
                    Cell::from(category.to_string()),
                    Cell::from(format!("{:.1}%", score.percentage)).style(theme.tone(grade.tone())),
                    Cell::from(format!("{:.1}%", 100.0 - score.percentage)),
                    Cell::from(risk.label()).style(theme.tone(risk.tone())),
                ])
            }
            None => Row::new(vec![
                Cell::from(category.to_string()),
                Cell::from("-"),
                Cell::from("-"),
                Cell::from(""),
            ])
            .style(theme.muted),
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Min(8),
        ],
    )
    .header(Row::new(vec!["Category", "Score", "Risk", "Level"]).style(theme.title))
    .block(titled(" Categories ", theme));
    frame.render_widget(table, layout[2]);
}

fn render_identities(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let identities = &app.store.identities;
    let columns =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).split(area);
    let left = Layout::vertical([Constraint::Length(10), Constraint::Min(4)]).split(columns[0]);
    let right = Layout::vertical([Constraint::Min(6), Constraint::Length(8)]).split(columns[1]);

    let mfa = &identities.mfa;
    let bars = [
        Bar::default()
            .value(mfa.recommendation_count() as u64)
            .label(Line::from("Recommendations"))
            .style(theme.warning),
        Bar::default()
            .value(mfa.correct_count() as u64)
            .label(Line::from("Correct"))
            .style(theme.success),
    ];
    let chart = BarChart::default()
        .block(titled(" Phish-resistant MFA ", theme))
        .data(BarGroup::default().bars(&bars))
        .bar_width(15)
        .bar_gap(2);
    frame.render_widget(chart, left[0]);

    let buckets: [(&str, &Vec<EvaluatedMethod>); 3] = [
        ("Enable", &mfa.to_enable),
        ("Disable", &mfa.to_disable),
        ("Enhance", &mfa.enhance),
    ];
    let rows: Vec<Row> = buckets
        .iter()
        .flat_map(|(bucket, methods)| {
            methods.iter().map(move |m| {
                let resistance = match m.is_phish_resistant {
                    PhishResistance::Yes => theme.success,
                    PhishResistance::Partial => theme.warning,
                    PhishResistance::No => theme.danger,
                };
                Row::new(vec![
                    Cell::from(*bucket),
                    Cell::from(m.display_name.clone()),
                    Cell::from(m.is_phish_resistant.label()).style(resistance),
                ])
            })
        })
        .collect();
    let methods = Table::new(
        rows,
        [Constraint::Length(8), Constraint::Min(12), Constraint::Length(26)],
    )
    .header(Row::new(vec!["Action", "Method", "Resistance"]).style(theme.title))
    .block(titled(" Methods to action ", theme));
    frame.render_widget(methods, left[1]);

    let people: Vec<Row> = identities
        .people
        .iter()
        .map(|p| {
            let mfa = if p.mfa_registered {
                Cell::from("yes").style(theme.success)
            } else {
                Cell::from("no").style(theme.danger)
            };
            Row::new(vec![
                Cell::from(p.display_name.clone()),
                Cell::from(p.user_principal_name.clone()),
                mfa,
                Cell::from(if p.is_admin { "admin" } else { "" }),
            ])
        })
        .collect();
    let without_mfa = identities.people_without_mfa();
    let title = format!(" People ({} without MFA) ", without_mfa);
    let table = Table::new(
        people,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(45),
            Constraint::Length(5),
            Constraint::Length(6),
        ],
    )
    .header(Row::new(vec!["Name", "UPN", "MFA", "Role"]).style(theme.title))
    .block(titled(&title, theme));
    frame.render_widget(table, right[0]);

    render_commentary(frame, identities.commentary.as_ref(), right[1], theme);
}

fn render_devices(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let devices = &app.store.devices;
    let layout = Layout::vertical([Constraint::Min(6), Constraint::Length(8)]).split(area);

    let rows: Vec<Row> = devices
        .unencrypted_devices
        .iter()
        .map(|d| {
            let compliance = if d.is_compliant() { theme.success } else { theme.danger };
            Row::new(vec![
                Cell::from(d.device_name.clone()),
                Cell::from(d.owner.clone()),
                Cell::from(d.operating_system.clone()),
                Cell::from(d.os_version.clone().unwrap_or_default()),
                Cell::from(d.compliance_state.clone()).style(compliance),
                Cell::from(
                    d.last_sync
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".into()),
                ),
            ])
        })
        .collect();

    let title = format!(
        " Unencrypted devices ({} non-compliant) ",
        devices.non_compliant_count()
    );
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(22),
            Constraint::Percentage(22),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Min(16),
        ],
    )
    .header(
        Row::new(vec!["Device", "Owner", "OS", "Version", "Compliance", "Last sync"])
            .style(theme.title),
    )
    .block(titled(&title, theme));
    frame.render_widget(table, layout[0]);

    render_commentary(frame, devices.commentary.as_ref(), layout[1], theme);
}

fn render_cloud(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let cloud = &app.store.cloud;
    let layout = Layout::vertical([Constraint::Min(6), Constraint::Length(8)]).split(area);

    let rows: Vec<Row> = cloud
        .findings
        .iter()
        .map(|f| {
            let severity = match f.severity.to_ascii_lowercase().as_str() {
                "high" | "critical" => theme.danger,
                "medium" => theme.warning,
                _ => theme.normal,
            };
            Row::new(vec![
                Cell::from(f.name.clone()),
                Cell::from(f.status.clone()),
                Cell::from(f.severity.clone()).style(severity),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Min(20), Constraint::Length(16), Constraint::Length(10)],
    )
    .header(Row::new(vec!["Finding", "Status", "Severity"]).style(theme.title))
    .block(titled(" Cloud & app findings ", theme));
    frame.render_widget(table, layout[0]);

    render_commentary(frame, cloud.commentary.as_ref(), layout[1], theme);
}

fn render_commentary(
    frame: &mut Frame,
    commentary: Option<&AnalystCommentary>,
    area: Rect,
    theme: &Theme,
) {
    let block = titled(" Analyst commentary ", theme);
    let Some(commentary) = commentary else {
        frame.render_widget(
            Paragraph::new("(No commentary)").style(theme.muted).block(block),
            area,
        );
        return;
    };

    let mut lines = vec![
        Line::from(commentary.latest.comment.clone()),
        Line::from(Span::styled(
            format!("{} · {}", commentary.latest.author, commentary.latest.date),
            theme.muted,
        )),
    ];
    for previous in commentary.previous.iter().rev() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}  ", previous.date), theme.muted),
            Span::raw(previous.note.clone()),
        ]));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_widgets(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let widgets = &app.store.tenants.widgets;
    if widgets.is_empty() {
        placeholder(frame, "(No manual widgets)", area, theme);
        return;
    }

    let items: Vec<ListItem> = widgets
        .iter()
        .map(|w| {
            let (check, style) = if w.enabled {
                ("[x]", theme.success)
            } else {
                ("[ ]", theme.muted)
            };
            let updated = match (&w.updated_by, &w.updated_at) {
                (Some(by), Some(at)) => format!("  {} · {}", by, at.format("%Y-%m-%d")),
                (Some(by), None) => format!("  {}", by),
                _ => String::new(),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", check), style),
                Span::raw(w.title.clone()),
                Span::styled(updated, theme.muted),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(theme.selected)
        .highlight_symbol("▸ ");
    let mut state = ListState::default().with_selected(Some(app.widget_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_access(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let users = &app.store.access.users;
    if users.is_empty() {
        placeholder(frame, "(No users)", area, theme);
        return;
    }

    let rows: Vec<Row> = users
        .iter()
        .map(|u| {
            Row::new(vec![
                Cell::from(u.display_name.clone()),
                Cell::from(u.email.clone()),
                Cell::from(u.tenant_ids.len().to_string()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [Constraint::Percentage(35), Constraint::Percentage(45), Constraint::Length(8)],
    )
    .header(Row::new(vec!["User", "Email", "Tenants"]).style(theme.title))
    .row_highlight_style(theme.selected);
    let mut state = TableState::default().with_selected(Some(app.user_index));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_access_dialog(frame: &mut Frame, app: &App, theme: &Theme) {
    let Some(draft) = &app.access_draft else {
        return;
    };
    let tenants = &app.store.tenants.tenants;
    let height = (tenants.len() as u16 + 4).min(frame.area().height.saturating_sub(2));
    let area = center_rect(frame.area(), 60, height);
    frame.render_widget(Clear, area);

    let name = app
        .store
        .access
        .users
        .iter()
        .find(|u| u.id == draft.user_id)
        .map(|u| u.display_name.as_str())
        .unwrap_or(draft.user_id.as_str());
    let dirty = if draft.is_dirty() { " *" } else { "" };
    let title = format!(" Tenants for {}{} ", name, dirty);

    let items: Vec<ListItem> = tenants
        .iter()
        .map(|t| {
            let check = if draft.is_selected(&t.id) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{} {} ({})", check, t.name, t.domain))
        })
        .collect();
    let list = List::new(items)
        .block(titled(&title, theme))
        .highlight_style(theme.selected);
    let mut state = ListState::default().with_selected(Some(app.dialog_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_new_tenant(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let constraints = Field::all().map(|_| Constraint::Length(3));
    let rows = Layout::vertical(constraints).split(center_rect(area, 70, 12));

    for (i, field) in Field::all().into_iter().enumerate() {
        let focused = app.form.focused() == field;
        let border = if focused { theme.title } else { theme.border };
        let cursor = if focused { "▏" } else { "" };
        let input = Paragraph::new(format!("{}{}", app.form.display(field), cursor)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" {} ", field.label())),
        );
        frame.render_widget(input, rows[i]);
    }
}

fn render_audit_log(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let entries = &app.store.audit.entries;
    if entries.is_empty() {
        placeholder(frame, "(No audit entries)", area, theme);
        return;
    }

    let rows: Vec<Row> = entries
        .iter()
        .map(|e| {
            Row::new(vec![
                Cell::from(e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                Cell::from(e.actor.clone()),
                Cell::from(e.action.clone()),
                Cell::from(e.tenant_id.clone().unwrap_or_default()),
                Cell::from(e.target.clone().unwrap_or_default()),
                Cell::from(e.detail.clone().unwrap_or_default()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(19),
            Constraint::Length(18),
            Constraint::Length(22),
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["Time", "Actor", "Action", "Tenant", "Target", "Detail"]).style(theme.title),
    )
    .row_highlight_style(theme.selected);
    let mut state = TableState::default().with_selected(Some(app.audit_index));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_message(frame: &mut Frame, notice: &Notice, theme: &Theme) {
    let area = center_rect(frame.area(), 60, 8);
    frame.render_widget(Clear, area);

    let (style, title) = if notice.is_error {
        (theme.danger, " ❌ Error ")
    } else {
        (theme.success, " ✅ Done ")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
        .title_style(style);

    let text = Paragraph::new(vec![
        Line::raw(""),
        Line::raw(notice.message.as_str()),
        Line::raw(""),
        Line::from(Span::styled("Press any key to continue", theme.muted)),
    ])
    .block(block)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    frame.render_widget(text, area);
}

// Helper: shrink rect by margin
fn inner_rect(area: Rect, margin: u16) -> Rect {
    Rect {
        x: area.x + margin,
        y: area.y + margin,
        width: area.width.saturating_sub(margin * 2),
        height: area.height.saturating_sub(margin * 2),
    }
}

// Helper: center a popup
fn center_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x.min(100)) / 100) as u16;
    let height = height.min(area.height);
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    Rect {
        x: area.x + x,
        y: area.y + y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture_core::MockPostureApi;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_center_rect_fits_small_area() {
        let area = Rect::new(0, 0, 20, 5);
        let popup = center_rect(area, 50, 8);
        assert_eq!(popup.height, 5);
        assert_eq!(popup.width, 10);
    }

    #[test]
    fn test_center_rect_on_wide_area() {
        let area = Rect::new(0, 0, 2000, 50);
        let popup = center_rect(area, 60, 10);
        assert_eq!(popup.width, 1200);
        assert_eq!(popup.x, 400);
        assert_eq!(popup.y, 20);

        let popup = center_rect(Rect::new(5, 0, 40, 10), 150, 4);
        assert_eq!(popup.width, 40);
        assert_eq!(popup.x, 5);
    }

    #[tokio::test]
    async fn test_failed_resource_shows_banner() {
        use posture_core::state::{Completion, Resource};

        let mut app = App::new(Arc::new(MockPostureApi::new()), None);
        let generation = app.store.begin(Resource::Tenants);
        app.store.complete(Completion::failure(
            Resource::Tenants,
            generation,
            "Failed to load (HTTP 503)",
        ));

        let text = screen_text(&app);
        assert!(text.contains("Could not load tenants"));
        assert!(text.contains("Failed to load (HTTP 503)"));
    }

    #[tokio::test]
    async fn test_message_popup_renders() {
        let mut app = App::new(Arc::new(MockPostureApi::new()), None);
        app.message = Some(Notice::info("Access saved for Ada"));

        assert!(screen_text(&app).contains("Access saved for Ada"));
    }
}

use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Local};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use vroad_terminal::directory::{
    filter_feves, filter_heroes, filter_players, filter_techniques, filter_tokens,
};
use vroad_terminal::export;
use vroad_terminal::provider::spawn_provider;
use vroad_terminal::sheets::Domain;
use vroad_terminal::state::{
    apply_delta, AppState, Delta, InputMode, LoadState, ProviderCommand,
};
use vroad_terminal::text::normalize_label;
use vroad_terminal::thresholds::{classify, StatKey};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.input_mode == InputMode::Search {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.state.input_mode = InputMode::Normal,
                KeyCode::Backspace => self.state.search_pop(),
                KeyCode::Char(ch) => self.state.search_push(ch),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(ch @ '1'..='8') => {
                let idx = ch as usize - '1' as usize;
                self.state.domain = Domain::ALL[idx];
                self.state.clamp_cursor();
            }
            KeyCode::Tab => self.switch_domain(1),
            KeyCode::BackTab => self.switch_domain(Domain::ALL.len() - 1),
            KeyCode::Char('/') => self.state.input_mode = InputMode::Search,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter => self.state.focus_selected(),
            KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else {
                    self.state.clear_focus();
                }
            }
            KeyCode::Char('m') => self.state.show_more(),
            KeyCode::Char('e') => self.state.cycle_primary_category(),
            KeyCode::Char('c') => self.state.cycle_secondary_category(),
            KeyCode::Char('s') => {
                if self.state.domain == Domain::Players {
                    self.state.cycle_player_sort();
                }
            }
            KeyCode::Char('f') => {
                if self.state.domain == Domain::Players {
                    self.state.cycle_player_min_focus();
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.state.adjust_min(5.0),
            KeyCode::Char('-') => self.state.adjust_min(-5.0),
            KeyCode::Char('x') => self.export_current(),
            KeyCode::Char('R') => self.request_revalidate(),
            KeyCode::Char('o') => self.request_focused_image(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn switch_domain(&mut self, step: usize) {
        let pos = Domain::ALL
            .iter()
            .position(|d| *d == self.state.domain)
            .unwrap_or(0);
        self.state.domain = Domain::ALL[(pos + step) % Domain::ALL.len()];
        self.state.clamp_cursor();
    }

    fn export_current(&mut self) {
        let filename = format!(
            "vroad_{}_{}.xlsx",
            self.state.domain.key(),
            Local::now().format("%Y%m%d_%H%M%S")
        );
        match export::export_directory(Path::new(&filename), &self.state) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] exported {} rows to {}",
                report.rows,
                report.path.display()
            )),
            Err(err) => self.state.push_log(format!("[WARN] export failed: {err}")),
        }
    }

    fn request_revalidate(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] revalidation unavailable");
            return;
        };
        if tx.send(ProviderCommand::Revalidate).is_err() {
            self.state.push_log("[WARN] revalidation request failed");
        } else {
            self.state.push_log("[INFO] revalidation requested");
        }
    }

    fn request_focused_image(&mut self) {
        let focused = self.state.focused_id().map(str::to_string);
        let Some(id) = focused else {
            self.state.push_log("[INFO] focus a record first (Enter)");
            return;
        };
        let target = match self.state.domain {
            Domain::Tokens => self
                .state
                .tokens
                .iter()
                .find(|t| t.id == id)
                .and_then(|t| t.image_url.clone().map(|src| (t.name.clone(), src))),
            Domain::Players => self
                .state
                .players
                .iter()
                .find(|p| p.id == id)
                .and_then(|p| p.image.clone().map(|src| (p.name.clone(), src))),
            _ => None,
        };
        let Some((name, src)) = target else {
            self.state.push_log("[INFO] no image for this record");
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] image fetch unavailable");
            return;
        };
        if tx.send(ProviderCommand::FetchImage { name, src }).is_err() {
            self.state.push_log("[WARN] image request failed");
        } else {
            self.state.push_log("[INFO] image download requested");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_directory(frame, chunks[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.focused_id().is_some() {
        render_focus_overlay(frame, frame.size(), &app.state);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let tabs = Domain::ALL
        .iter()
        .enumerate()
        .map(|(idx, domain)| {
            if *domain == state.domain {
                format!("[{} {}]", idx + 1, domain.label())
            } else {
                format!(" {} {} ", idx + 1, domain.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let updated = state
        .fetched_at
        .get(&state.domain)
        .map(|at| format!(" | maj {}", format_clock(*at)))
        .unwrap_or_default();

    format!(
        "VICTORY ROAD TERMINAL  {tabs}\n{} | {} résultats{}{}",
        filter_summary(state),
        state.filtered_len(),
        updated,
        if state.input_mode == InputMode::Search {
            " | SAISIE"
        } else {
            ""
        }
    )
}

fn format_clock(at: SystemTime) -> String {
    let local: DateTime<Local> = at.into();
    local.format("%H:%M").to_string()
}

fn filter_summary(state: &AppState) -> String {
    let all = "Tous".to_string();
    let query = state.query();
    let query = if query.is_empty() { "—" } else { query };
    match state.domain {
        Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
            let dir = state.technique_dir(state.domain).expect("technique dir");
            let mut parts = vec![
                format!("Recherche: {query}"),
                format!("Élément: {}", dir.filter.element.clone().unwrap_or_else(|| all.clone())),
                format!("Min: {}", dir.filter.min_power),
            ];
            if state.domain == Domain::Shots {
                parts.push(format!(
                    "Type: {}",
                    dir.filter.shot_type.clone().unwrap_or(all)
                ));
            }
            parts.join(" | ")
        }
        Domain::Tokens => format!(
            "Recherche: {query} | Couleur: {} | Lieu: {}",
            state.dir_tokens.filter.color.clone().unwrap_or_else(|| all.clone()),
            state.dir_tokens.filter.location.clone().unwrap_or(all)
        ),
        Domain::Feves => format!(
            "Recherche: {query} | Couleur: {}",
            state.dir_feves.filter.color.clone().unwrap_or(all)
        ),
        Domain::Heroes => format!(
            "Recherche: {query} | Style: {} | Couleur: {}",
            state.dir_heroes.filter.style.clone().unwrap_or_else(|| all.clone()),
            state.dir_heroes.filter.color.clone().unwrap_or(all)
        ),
        Domain::Players => {
            let f = &state.dir_players.filter;
            format!(
                "Recherche: {query} | Pos: {} | Élément: {} | Tri: {} | Min {}: {}",
                f.position.clone().unwrap_or_else(|| all.clone()),
                f.element.clone().unwrap_or(all),
                f.sort.label(),
                state.player_min_focus.label(),
                state.player_min_focus.get(&f.min_stats)
            )
        }
    }
}

fn footer_text(state: &AppState) -> String {
    if state.input_mode == InputMode::Search {
        return "Tape pour filtrer | Entrée/Échap Terminer".to_string();
    }
    let mut hints = vec![
        "1-8/Tab Onglet",
        "/ Recherche",
        "j/k Naviguer",
        "Entrée Focus",
        "e Filtre",
    ];
    match state.domain {
        Domain::Shots | Domain::Tokens | Domain::Heroes => hints.push("c Filtre 2"),
        Domain::Players => {
            hints.push("c Position");
            hints.push("s Tri");
            hints.push("f Stat min");
        }
        _ => {}
    }
    match state.domain {
        Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots
        | Domain::Players => hints.push("+/- Seuil"),
        _ => {}
    }
    hints.extend(["m Voir plus", "x Export", "R Revalider", "? Aide", "q Quitter"]);

    let remaining = state.filtered_len().saturating_sub(state.visible_len());
    let mut line = hints.join(" | ");
    if remaining > 0 {
        line.push_str(&format!("  ({remaining} restants)"));
    }
    line
}

fn element_color(element: &str) -> Color {
    let folded = normalize_label(element);
    if folded.contains("feu") || folded.contains("fire") {
        Color::Red
    } else if folded.contains("vent") || folded.contains("wind") || folded.contains("air") {
        Color::Cyan
    } else if folded.contains("foudre") || folded.contains("lightning") {
        Color::Yellow
    } else if folded.contains("foret") || folded.contains("wood") || folded.contains("forest") {
        Color::Green
    } else if folded.contains("mont") || folded.contains("terre") || folded.contains("earth") {
        Color::LightYellow
    } else if folded.contains("neant") || folded.contains("void") {
        Color::Magenta
    } else {
        Color::Gray
    }
}

type RowCell = (String, Style);

fn render_directory(frame: &mut Frame, area: Rect, state: &AppState) {
    match state.load.get(&state.domain) {
        Some(LoadState::Loading) => {
            let msg = Paragraph::new("Chargement de la feuille…")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(msg, area);
            return;
        }
        Some(LoadState::Failed(error)) => {
            let msg = Paragraph::new(format!(
                "Impossible de récupérer cette feuille.\n{error}\nR pour réessayer."
            ))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
            frame.render_widget(msg, area);
            return;
        }
        _ => {}
    }

    let widths = domain_widths(state.domain);
    let header = domain_header(state.domain);
    let rows = domain_rows(state);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    render_row(
        frame,
        sections[0],
        &widths,
        &header
            .iter()
            .map(|h| (h.to_string(), Style::default().add_modifier(Modifier::BOLD)))
            .collect::<Vec<_>>(),
        Style::default(),
    );

    let list_area = sections[1];
    if rows.is_empty() {
        let msg = Paragraph::new("Rien ne correspond à ces filtres.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(msg, list_area);
        return;
    }

    let dimmed = state.focused_id().is_some();
    let fit = list_area.height as usize;
    if fit == 0 {
        return;
    }
    let (start, end) = visible_range(state.cursor(), rows.len(), fit);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = idx == state.cursor() && !dimmed;
        let base = if dimmed {
            Style::default().fg(Color::DarkGray)
        } else if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(base), row_area);
        }
        render_row(frame, row_area, &widths, &rows[idx], base);
    }
}

fn render_row(frame: &mut Frame, area: Rect, widths: &[Constraint], cells: &[RowCell], base: Style) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.to_vec())
        .split(area);
    for (col, (text, style)) in cols.iter().zip(cells.iter()) {
        let merged = if base.bg.is_some() || base.fg == Some(Color::DarkGray) {
            base
        } else {
            *style
        };
        let paragraph = Paragraph::new(text.as_str()).style(merged);
        frame.render_widget(paragraph, *col);
    }
}

fn domain_widths(domain: Domain) -> Vec<Constraint> {
    match domain {
        Domain::Offensive | Domain::Defensive | Domain::Keeper => vec![
            Constraint::Min(22),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Min(24),
            Constraint::Length(10),
        ],
        Domain::Shots => vec![
            Constraint::Min(22),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Min(20),
            Constraint::Length(10),
        ],
        Domain::Tokens => vec![
            Constraint::Min(24),
            Constraint::Length(9),
            Constraint::Min(24),
            Constraint::Min(18),
        ],
        Domain::Feves => vec![
            Constraint::Min(20),
            Constraint::Length(9),
            Constraint::Min(24),
            Constraint::Min(24),
        ],
        Domain::Heroes => vec![
            Constraint::Min(20),
            Constraint::Length(9),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
        Domain::Players => {
            let mut widths = vec![
                Constraint::Min(20),
                Constraint::Length(5),
                Constraint::Length(10),
            ];
            widths.extend(std::iter::repeat(Constraint::Length(6)).take(StatKey::ALL.len()));
            widths
        }
    }
}

fn domain_header(domain: Domain) -> Vec<&'static str> {
    match domain {
        Domain::Offensive => vec!["Technique", "Élément", "OFF", "Blocage", "Emplacement", "Prix"],
        Domain::Defensive | Domain::Keeper => {
            vec!["Technique", "Élément", "DEF", "Blocage", "Emplacement", "Prix"]
        }
        Domain::Shots => vec!["Technique", "Élément", "OFF", "Type", "Emplacement", "Prix"],
        Domain::Tokens => vec!["Token", "Couleur", "Emplacement", "PNJ"],
        Domain::Feves => vec!["Fève", "Couleur", "Obtention", "Astuce"],
        Domain::Heroes => vec!["Héros", "Couleur", "Constellation", "Style", "Passifs"],
        Domain::Players => {
            let mut header = vec!["Joueur", "Pos", "Élément"];
            header.extend(["FRA", "CON", "PRE", "PHY", "AGI", "INT", "TEC"]);
            header
        }
    }
}

fn domain_rows(state: &AppState) -> Vec<Vec<RowCell>> {
    let plain = Style::default();
    match state.domain {
        Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
            let dir = state.technique_dir(state.domain).expect("technique dir");
            let filtered = filter_techniques(state.technique_records(state.domain), &dir.filter);
            filtered
                .iter()
                .take(dir.pager.visible)
                .map(|tech| {
                    let fourth = if state.domain == Domain::Shots {
                        tech.shot_type.clone().unwrap_or_default()
                    } else {
                        tech.shot_block.clone()
                    };
                    vec![
                        (tech.name_fr.clone(), plain),
                        (
                            tech.element.clone(),
                            Style::default().fg(element_color(&tech.element)),
                        ),
                        (format_number(tech.power), plain),
                        (fourth, plain),
                        (tech.location.clone(), plain),
                        (tech.price.clone(), plain),
                    ]
                })
                .collect()
        }
        Domain::Tokens => filter_tokens(&state.tokens, &state.dir_tokens.filter)
            .iter()
            .take(state.dir_tokens.pager.visible)
            .map(|token| {
                vec![
                    (token.name.clone(), plain),
                    (token.color.clone(), plain),
                    (token.location.clone(), plain),
                    (token.npc.clone(), plain),
                ]
            })
            .collect(),
        Domain::Feves => filter_feves(&state.feves, &state.dir_feves.filter)
            .iter()
            .take(state.dir_feves.pager.visible)
            .map(|feve| {
                vec![
                    (feve.name.clone(), plain),
                    (feve.color.clone(), plain),
                    (feve.obtention.clone(), plain),
                    (feve.astuce.clone(), plain),
                ]
            })
            .collect(),
        Domain::Heroes => filter_heroes(&state.heroes, &state.dir_heroes.filter)
            .iter()
            .take(state.dir_heroes.pager.visible)
            .map(|hero| {
                vec![
                    (hero.name.clone(), plain),
                    (hero.color.clone(), plain),
                    (hero.constellation.clone(), plain),
                    (hero.style.clone(), plain),
                    (hero.passives.len().to_string(), plain),
                ]
            })
            .collect(),
        Domain::Players => filter_players(&state.players, &state.dir_players.filter)
            .iter()
            .take(state.dir_players.pager.visible)
            .map(|player| {
                let mut row = vec![
                    (player.name.clone(), plain),
                    (player.position.clone(), plain),
                    (
                        player.element.clone(),
                        Style::default().fg(element_color(&player.element)),
                    ),
                ];
                for key in StatKey::ALL {
                    let value = key.get(&player.stats);
                    let tier = classify(value, state.thresholds.cuts(key));
                    row.push((format_number(value), Style::default().fg(tier.color())));
                }
                row
            })
            .collect(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

fn render_focus_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(id) = state.focused_id() else {
        return;
    };
    let Some(lines) = focus_lines(state, id) else {
        return;
    };

    let popup = centered_rect(70, 70, area);
    frame.render_widget(Clear, popup);
    let body = Paragraph::new(lines)
        .block(
            Block::default()
                .title("Focus (Échap pour fermer)")
                .borders(Borders::ALL),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(body, popup);
}

fn focus_lines(state: &AppState, id: &str) -> Option<Vec<Line<'static>>> {
    let strong = Style::default().add_modifier(Modifier::BOLD);
    match state.domain {
        Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
            let tech = state
                .technique_records(state.domain)
                .iter()
                .find(|t| t.id == id)?;
            let mut lines = vec![
                Line::styled(tech.name_fr.clone(), strong),
                Line::raw(format!("{} • {}", tech.name_en, tech.name_jp)),
                Line::styled(
                    format!("Élément: {}", tech.element),
                    Style::default().fg(element_color(&tech.element)),
                ),
                Line::raw(format!("{}: {}", tech.kind.power_label(), format_number(tech.power))),
                Line::raw(format!("Blocage de tir: {}", tech.shot_block)),
            ];
            if let Some(shot_type) = &tech.shot_type {
                lines.push(Line::raw(format!("Type de tir: {shot_type}")));
            }
            lines.push(Line::raw(format!("Emplacement: {}", tech.location)));
            lines.push(Line::raw(format!("Prix: {}", tech.price)));
            if !tech.tags.is_empty() {
                let tags = tech
                    .tags
                    .iter()
                    .map(|tag| tag.label())
                    .collect::<Vec<_>>()
                    .join(" · ");
                lines.push(Line::styled(tags, Style::default().fg(Color::DarkGray)));
            }
            Some(lines)
        }
        Domain::Tokens => {
            let token = state.tokens.iter().find(|t| t.id == id)?;
            let mut lines = vec![
                Line::styled(token.name.clone(), strong),
                Line::raw(format!("Couleur: {}", token.color)),
                Line::raw(format!("Emplacement: {}", token.location)),
                Line::raw(format!("PNJ: {}", token.npc)),
            ];
            match &token.image_url {
                Some(url) => {
                    lines.push(Line::raw(format!("Image: {url}")));
                    lines.push(Line::styled(
                        "o pour télécharger l'image".to_string(),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                None => lines.push(Line::raw("Image: —".to_string())),
            }
            Some(lines)
        }
        Domain::Feves => {
            let feve = state.feves.iter().find(|f| f.id == id)?;
            Some(vec![
                Line::styled(feve.name.clone(), strong),
                Line::raw(format!("Couleur: {}", feve.color)),
                Line::raw(format!("Obtention: {}", feve.obtention)),
                Line::raw(format!("Astuce: {}", feve.astuce)),
            ])
        }
        Domain::Heroes => {
            let hero = state.heroes.iter().find(|h| h.id == id)?;
            let mut lines = vec![
                Line::styled(hero.name.clone(), strong),
                Line::raw(format!(
                    "Couleur: {} | Constellation: {} | Style: {}",
                    hero.color, hero.constellation, hero.style
                )),
                Line::raw(String::new()),
                Line::styled("Passifs:".to_string(), strong),
            ];
            if hero.passives.is_empty() {
                lines.push(Line::raw("— aucun passif listé".to_string()));
            }
            for passive in &hero.passives {
                lines.push(Line::raw(format!("• {passive}")));
            }
            Some(lines)
        }
        Domain::Players => {
            let player = state.players.iter().find(|p| p.id == id)?;
            let mut lines = vec![
                Line::styled(player.name.clone(), strong),
                Line::raw(format!("Position: {}", player.position)),
                Line::styled(
                    format!("Élément: {}", player.element),
                    Style::default().fg(element_color(&player.element)),
                ),
                Line::raw(String::new()),
            ];
            for key in StatKey::ALL {
                let value = key.get(&player.stats);
                let tier = classify(value, state.thresholds.cuts(key));
                lines.push(Line::styled(
                    format!("{:<14} {:>5}  [{}]", key.label(), format_number(value), tier.label()),
                    Style::default().fg(tier.color()),
                ));
            }
            match &player.image {
                Some(url) => {
                    lines.push(Line::raw(String::new()));
                    lines.push(Line::raw(format!("Image: {url}")));
                    lines.push(Line::styled(
                        "o pour télécharger l'image".to_string(),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                None => {}
            }
            Some(lines)
        }
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "Aucun message".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Victory Road Terminal - Aide",
        "",
        "Global:",
        "  1-8 / Tab     Changer de répertoire",
        "  /             Recherche (Entrée/Échap pour finir)",
        "  j/k ou ↑/↓    Naviguer",
        "  Entrée        Focus sur la fiche",
        "  Échap         Fermer le focus",
        "  m             Voir plus de résultats",
        "  x             Exporter la vue en XLSX",
        "  R             Purger le cache et recharger",
        "  o             Télécharger l'image (focus token/joueur)",
        "  q             Quitter",
        "",
        "Filtres:",
        "  e             Élément / couleur / style",
        "  c             Second filtre (type, lieu, position…)",
        "  +/-           Seuil minimal",
        "  s             Tri joueurs | f stat ciblée",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Aide").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

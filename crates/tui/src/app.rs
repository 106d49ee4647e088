use std::{io, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use chimix_core::{
    catalog::{CatalogService, GamePage, HttpTransport, Origin, PageQuery},
    library::{Annotation, Command, FetchRequest, Library},
    models::{Game, GameStatus},
    view::SortSpec,
    Mode as CatalogMode,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{debug, info, warn};

use crate::form::{Field, FormTarget, GameForm};

const TICK_RATE: Duration = Duration::from_millis(250);
const SCREENSHOT_PREVIEW: usize = 6;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

impl Theme {
    fn status_color(&self, status: GameStatus) -> Color {
        match status {
            GameStatus::NotStarted => self.muted,
            GameStatus::Playing => self.accent,
            GameStatus::Completed => self.success,
            GameStatus::OnHold => self.warning,
            GameStatus::Dropped => self.danger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

#[derive(Debug, Clone)]
struct DetailsModal {
    game_id: u64,
    screenshots: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
enum Modal {
    Details(DetailsModal),
    Form(GameForm),
    ConfirmDelete { id: u64, title: String },
}

enum AppEvent {
    Input(Event),
    Tick,
    PageLoaded {
        request: FetchRequest,
        page: GamePage,
    },
    ScreenshotsLoaded {
        id: u64,
        urls: Vec<String>,
    },
}

/// Terminal front end over the catalog service and library.
pub struct ChimixApp {
    service: Arc<CatalogService<HttpTransport>>,
    library: Library,
    state: UiState,
    modal: Option<Modal>,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl ChimixApp {
    pub fn new(service: Arc<CatalogService<HttpTransport>>) -> Self {
        let library = Library::new(service.page_size());
        Self {
            service,
            library,
            state: UiState::default(),
            modal: None,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        let request = self.library.initial_load();
        self.dispatch(request);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                if let Err(err) = self.handle_key(key) {
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => true,
            Some(AppEvent::PageLoaded { request, page }) => {
                let count = page.games.len();
                let origin = page.origin.clone();
                if self.library.receive(&request, page) {
                    info!(ticket = request.ticket, count, "Page loaded");
                    self.state.cursor = 0;
                    self.state.offset = 0;
                    let message = match origin {
                        Origin::Live => format!("Loaded {count} games"),
                        Origin::Demo => format!("Loaded {count} demo games"),
                        Origin::Fallback { .. } => format!("Showing {count} fallback games"),
                    };
                    self.state.set_status(message);
                }
                true
            }
            Some(AppEvent::ScreenshotsLoaded { id, urls }) => {
                if let Some(Modal::Details(details)) = self.modal.as_mut() {
                    if details.game_id == id {
                        details.screenshots = Some(urls);
                    }
                }
                true
            }
            None => false,
        }
    }

    fn dispatch(&mut self, request: FetchRequest) {
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        self.state
            .set_status(format!("Loading {} page {}...", query_label(&request.query), request.page));
        debug!(ticket = request.ticket, page = request.page, "Dispatching catalog fetch");
        let service = Arc::clone(&self.service);
        spawn(async move {
            let page = service.load(&request.query, request.page).await;
            if tx.send(AppEvent::PageLoaded { request, page }).await.is_err() {
                warn!("UI closed before catalog page arrived");
            }
        });
    }

    fn load_screenshots(&mut self, id: u64) {
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        let service = Arc::clone(&self.service);
        spawn(async move {
            let urls = service.screenshots(id).await;
            let _ = tx.send(AppEvent::ScreenshotsLoaded { id, urls }).await;
        });
    }

    fn apply(&mut self, command: Command) {
        match self.library.apply(command) {
            Ok(Some(request)) => self.dispatch(request),
            Ok(None) => {}
            Err(err) => self.state.set_status(format!("Error: {err}")),
        }
        let len = self.library.visible().len();
        self.state.clamp_cursor(len);
    }

    fn selected(&self) -> Option<&Game> {
        self.library.visible().get(self.state.cursor).copied()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return Ok(());
        }
        match self.modal.take() {
            Some(Modal::Form(form)) => self.handle_form_key(form, key),
            Some(Modal::ConfirmDelete { id, title }) => {
                self.handle_confirm_key(id, title, key);
                Ok(())
            }
            Some(Modal::Details(details)) => {
                if !matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.modal = Some(Modal::Details(details));
                }
                Ok(())
            }
            None => match self.state.mode {
                Mode::Search => {
                    self.handle_search_key(key);
                    Ok(())
                }
                Mode::Browse => self.handle_browse_key(key),
            },
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let mut term = self.library.filters().search.clone();
        match key.code {
            KeyCode::Esc => {
                self.state.mode = Mode::Browse;
                self.state.set_status("Search closed".to_string());
                return;
            }
            KeyCode::Enter => {
                self.state.mode = Mode::Browse;
                self.apply(Command::SubmitSearch);
                return;
            }
            KeyCode::Backspace => {
                term.pop();
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    term.push(c);
                }
            }
            _ => return,
        }
        self.apply(Command::SetSearchTerm(term));
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<()> {
        let len = self.library.visible().len();
        let page = self.library.pager().page;
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1, len),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1, len),
            KeyCode::Home => self.state.move_to(0, len),
            KeyCode::End => self.state.move_to(len.saturating_sub(1), len),
            KeyCode::PageDown => self.state.move_cursor(self.state.list_height as isize, len),
            KeyCode::PageUp => self.state.move_cursor(-(self.state.list_height as isize), len),
            KeyCode::Char('/') => {
                self.state.mode = Mode::Search;
                self.state
                    .set_status("Type to filter, Enter searches the catalog".to_string());
            }
            KeyCode::Char('g') => {
                let next = next_facet(&self.library.genre_facets(), self.library.filters().genre.as_ref());
                self.apply(Command::SelectGenre(next));
            }
            KeyCode::Char('s') => {
                let next = next_facet(&GameStatus::ALL, self.library.filters().status.as_ref());
                self.apply(Command::SelectStatus(next));
            }
            KeyCode::Char('c') => {
                if self.library.filters().is_active() {
                    self.apply(Command::SetSearchTerm(String::new()));
                    self.apply(Command::SelectGenre(None));
                    self.apply(Command::SelectStatus(None));
                    self.state.set_status("Filters cleared".to_string());
                } else {
                    self.state.set_status("No filters to clear".to_string());
                }
            }
            KeyCode::Char('o') => {
                let key = self.library.sort().key.next();
                self.apply(Command::SortBy(key));
            }
            KeyCode::Char('r') => self.apply(Command::ToggleSortOrder),
            KeyCode::Char('n') | KeyCode::Right => self.apply(Command::GoToPage(page + 1)),
            KeyCode::Char('p') | KeyCode::Left => {
                self.apply(Command::GoToPage(page.saturating_sub(1)))
            }
            KeyCode::Char('P') => self.apply(Command::ResetToPopular),
            KeyCode::Char('R') => self.apply(Command::ShowRecent),
            KeyCode::Char('a') => self.modal = Some(Modal::Form(GameForm::add())),
            KeyCode::Char('e') => {
                if let Some(game) = self.selected() {
                    self.modal = Some(Modal::Form(GameForm::edit(game)));
                }
            }
            KeyCode::Char('d') => {
                if let Some(game) = self.selected() {
                    self.modal = Some(Modal::ConfirmDelete {
                        id: game.id,
                        title: game.title.clone(),
                    });
                }
            }
            KeyCode::Char('t') => {
                if let Some(game) = self.selected() {
                    let annotation = Annotation::Status(game.status.next());
                    let id = game.id;
                    self.apply(Command::Annotate { id, annotation });
                }
            }
            KeyCode::Char('+') | KeyCode::Char('-') => {
                if let Some(game) = self.selected() {
                    let hours = if key.code == KeyCode::Char('+') {
                        game.hours_played.saturating_add(1)
                    } else {
                        game.hours_played.saturating_sub(1)
                    };
                    let id = game.id;
                    self.apply(Command::Annotate {
                        id,
                        annotation: Annotation::HoursPlayed(hours),
                    });
                }
            }
            KeyCode::Char(']') | KeyCode::Char('[') => {
                if let Some(game) = self.selected() {
                    let rating = if key.code == KeyCode::Char(']') {
                        game.personal_rating.saturating_add(1).min(10)
                    } else {
                        game.personal_rating.saturating_sub(1)
                    };
                    let id = game.id;
                    self.apply(Command::Annotate {
                        id,
                        annotation: Annotation::PersonalRating(rating),
                    });
                }
            }
            KeyCode::Enter => {
                if let Some(game) = self.selected() {
                    let id = game.id;
                    self.modal = Some(Modal::Details(DetailsModal {
                        game_id: id,
                        screenshots: None,
                    }));
                    self.load_screenshots(id);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_form_key(&mut self, mut form: GameForm, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.state.set_status(format!("{} cancelled", form.title()));
                return Ok(());
            }
            KeyCode::Enter => {
                let draft = match form.to_draft() {
                    Ok(draft) => draft,
                    Err(err) => {
                        self.state.set_status(format!("Error: {err}"));
                        self.modal = Some(Modal::Form(form));
                        return Ok(());
                    }
                };
                let command = match form.target {
                    FormTarget::Add => Command::Add(draft),
                    FormTarget::Edit(id) => Command::Update { id, draft },
                };
                match self.library.apply(command) {
                    Ok(_) => {
                        self.state.set_status(format!("{} saved", form.title()));
                        let len = self.library.visible().len();
                        self.state.clamp_cursor(len);
                    }
                    Err(err) => {
                        self.state.set_status(format!("Error: {err}"));
                        self.modal = Some(Modal::Form(form));
                    }
                }
                return Ok(());
            }
            KeyCode::Tab | KeyCode::Down => form.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => form.move_focus(-1),
            _ if form.focused() == Field::Status => {
                if matches!(key.code, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) {
                    form.cycle_status();
                }
            }
            code => {
                let plain = key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT;
                if let Some(input) = form.focused_input_mut() {
                    match code {
                        KeyCode::Left => input.move_cursor(-1),
                        KeyCode::Right => input.move_cursor(1),
                        KeyCode::Home => input.move_home(),
                        KeyCode::End => input.move_end(),
                        KeyCode::Backspace => input.backspace(),
                        KeyCode::Delete => input.delete(),
                        KeyCode::Char(ch) if plain => input.insert(ch),
                        _ => {}
                    }
                }
            }
        }
        self.modal = Some(Modal::Form(form));
        Ok(())
    }

    fn handle_confirm_key(&mut self, id: u64, title: String, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.apply(Command::Delete(id));
                self.state.set_status(format!("Deleted {title}"));
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.state.set_status("Delete cancelled".to_string());
            }
            _ => self.modal = Some(Modal::ConfirmDelete { id, title }),
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(4)])
            .split(size);
        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[0]);

        self.render_game_list(frame, body_chunks[0]);
        self.render_game_info(frame, body_chunks[1]);
        self.render_status(frame, chunks[1]);

        match &self.modal {
            Some(Modal::Details(details)) => self.render_details_modal(frame, details),
            Some(Modal::Form(form)) => self.render_form_modal(frame, form),
            Some(Modal::ConfirmDelete { title, .. }) => self.render_confirm_modal(frame, title),
            None => {}
        }
    }

    fn render_game_list(&mut self, frame: &mut Frame, area: Rect) {
        self.state.list_height = area.height.saturating_sub(2) as usize;
        let visible = self.library.visible();
        self.state.clamp_cursor(visible.len());
        self.state.ensure_cursor_visible(visible.len());

        let end = (self.state.offset + self.state.list_height).min(visible.len());
        let window = &visible[self.state.offset.min(end)..end];
        let mut list_state = ListState::default();
        if !window.is_empty() {
            list_state.select(Some(self.state.cursor.saturating_sub(self.state.offset)));
        }

        let items: Vec<ListItem> = window
            .iter()
            .enumerate()
            .map(|(idx, game)| {
                let is_selected = self.state.cursor == self.state.offset + idx;
                let marker = if is_selected {
                    Span::styled(
                        "▶ ",
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw("  ")
                };
                ListItem::new(Line::from(vec![
                    marker,
                    Span::styled(
                        game.title.clone(),
                        Style::default()
                            .fg(self.theme.primary_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(" · {:.1} · {}", game.rating, game.genre),
                        Style::default().fg(self.theme.muted),
                    ),
                ]))
            })
            .collect();

        let title = format!("Games ({}/{})", visible.len(), self.library.games().len());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_game_info(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Game Details");
        let Some(game) = self.selected() else {
            let message = if self.library.is_loading() {
                "Loading games..."
            } else {
                "No games match the current filters"
            };
            frame.render_widget(Paragraph::new(message).block(block), area);
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                game.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} · {}", game.developer, game.publisher),
                Style::default().fg(self.theme.muted),
            )),
            Line::from(format!("Genres: {}", game.genre_list().join(", "))),
            Line::from(format!("Platforms: {}", game.platform_list().join(", "))),
            Line::from(format!(
                "Released: {}",
                if game.release_date.is_empty() {
                    "Unknown"
                } else {
                    game.release_date.as_str()
                }
            )),
            Line::from(format!("Rating: {:.1}", game.rating)),
        ];
        if game.metacritic > 0 {
            lines.push(Line::from(format!("Metacritic: {}", game.metacritic)));
        }
        lines.push(Line::from(vec![
            Span::raw("Status: "),
            Span::styled(
                game.status.label(),
                Style::default().fg(self.theme.status_color(game.status)),
            ),
            Span::raw(format!(
                "  Hours: {}  My rating: {}/10",
                game.hours_played, game.personal_rating
            )),
        ]));
        if !game.website_url.is_empty() {
            let label = if game.links_to_steam() { "Steam" } else { "Website" };
            lines.push(Line::from(format!("{label}: {}", game.website_url)));
        }
        if !game.notes.is_empty() {
            lines.push(Line::from(format!("Notes: {}", game.notes)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(game.description.clone()));

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = if self.state.mode == Mode::Search {
            format!("Search: {}", self.library.filters().search)
        } else {
            self.state.status.clone()
        };

        let pager = self.library.pager();
        let mode = match self.service.mode() {
            CatalogMode::Live => Span::styled("LIVE", Style::default().fg(self.theme.success)),
            CatalogMode::Demo => Span::styled("DEMO", Style::default().fg(self.theme.warning)),
        };
        let mut secondary = vec![
            mode,
            Span::raw(format!(
                "  {} page {}/{}  Sort: {}",
                query_label(&pager.query),
                pager.page,
                pager.total_pages,
                sort_label(self.library.sort())
            )),
        ];
        let filters = self.library.filters();
        if let Some(genre) = &filters.genre {
            secondary.push(Span::raw(format!("  Genre: {genre}")));
        }
        if let Some(status) = filters.status {
            secondary.push(Span::raw(format!("  Status: {status}")));
        }
        if filters.is_active() {
            secondary.push(Span::raw(format!(
                "  Showing {}/{} (c clears)",
                self.library.visible().len(),
                self.library.games().len()
            )));
        }
        if let Some(advisory) = self.library.advisory() {
            secondary.push(Span::styled(
                format!("  {advisory}"),
                Style::default().fg(self.theme.warning),
            ));
        }

        let paragraph = Paragraph::new(vec![Line::from(primary), Line::from(secondary)])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_details_modal(&self, frame: &mut Frame, details: &DetailsModal) {
        let Some(game) = self.library.find(details.game_id) else {
            return;
        };
        let area = centered_rect(80, 22, frame.size());
        frame.render_widget(Clear, area);

        let mut lines = vec![
            Line::from(Span::styled(
                game.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("Cover: {}", game.image_url)),
            Line::from(format!("Ratings: {}", game.ratings_count)),
            Line::from(""),
            Line::from(game.description.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Screenshots",
                Style::default().fg(self.theme.accent),
            )),
        ];
        match &details.screenshots {
            None => lines.push(Line::from("Loading screenshots...")),
            Some(urls) if urls.is_empty() => lines.push(Line::from("No screenshots available")),
            Some(urls) => lines.extend(
                urls.iter()
                    .take(SCREENSHOT_PREVIEW)
                    .map(|url| Line::from(format!("  {url}"))),
            ),
        }

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Details · Esc to close"),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_form_modal(&self, frame: &mut Frame, form: &GameForm) {
        let height = Field::ALL.len() as u16 + 4;
        let area = centered_rect(70, height, frame.size());
        frame.render_widget(Clear, area);

        let mut lines: Vec<Line> = Field::ALL
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let focused = idx == form.focus_index();
                let label_style = if focused {
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(self.theme.muted)
                };
                let value = match field {
                    Field::Status => format!("< {} >", form.status()),
                    other => form.input(*other).value().to_string(),
                };
                Line::from(vec![
                    Span::styled(format!("{:<28}", field.label()), label_style),
                    Span::raw(value),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" save  "),
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" next field  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]));

        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(form.title()));
        frame.render_widget(paragraph, area);

        let field = form.focused();
        if field != Field::Status {
            let cursor_x = (area.x + 1 + 28 + form.input(field).cursor() as u16)
                .min(area.x + area.width.saturating_sub(2));
            let cursor_y = area.y + 1 + form.focus_index() as u16;
            frame.set_cursor(cursor_x, cursor_y);
        }
    }

    fn render_confirm_modal(&self, frame: &mut Frame, title: &str) {
        let area = centered_rect(50, 6, frame.size());
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(vec![
            Line::from(format!("Delete \"{title}\"?")),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" delete  "),
                Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" keep"),
            ]),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm")
                .border_style(Style::default().fg(self.theme.danger)),
        )
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    cursor: usize,
    offset: usize,
    list_height: usize,
    status: String,
    mode: Mode,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            cursor: 0,
            offset: 0,
            list_height: 1,
            status: "Ready".to_string(),
            mode: Mode::Browse,
            should_quit: false,
        }
    }
}

impl UiState {
    fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + delta).clamp(0, len as isize - 1) as usize;
        self.ensure_cursor_visible(len);
    }

    fn move_to(&mut self, index: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.cursor = index.min(len - 1);
        self.ensure_cursor_visible(len);
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    fn ensure_cursor_visible(&mut self, len: usize) {
        if len == 0 || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
        self.offset = self.offset.min(len.saturating_sub(height));
    }
}

/// Next entry after `current`, cycling through `None` once past the end.
fn next_facet<T: Clone + PartialEq>(facets: &[T], current: Option<&T>) -> Option<T> {
    match current {
        None => facets.first().cloned(),
        Some(current) => facets
            .iter()
            .position(|facet| facet == current)
            .and_then(|idx| facets.get(idx + 1))
            .cloned(),
    }
}

fn query_label(query: &PageQuery) -> String {
    match query {
        PageQuery::Popular => "Popular".to_string(),
        PageQuery::Recent => "Recent".to_string(),
        PageQuery::Search(term) => format!("Search \"{term}\""),
    }
}

fn sort_label(sort: SortSpec) -> String {
    format!("{} {}", sort.key.label(), sort.order.arrow())
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

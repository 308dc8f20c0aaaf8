use std::{
    fs::File,
    io::{self},
    path::Path,
    sync::Mutex,
    thread::sleep,
    time::Duration,
};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    ExecutableCommand,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Flex, Layout, Margin, Rect},
    style::{Color, Style, Stylize},
    widgets::{Block, BorderType, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use tui_big_text::{BigText, PixelSize};

mod ai;
mod clock;
mod config;
mod error;
mod game;
mod game_theme;
mod helpers;
mod input;
mod network;
mod physics;
mod session;
mod state;

use crate::{
    ai::ComputerAI,
    clock::FrameClock,
    config::Cli,
    error::PongError,
    game::{Game, GameType},
    game_theme::GameTheme,
    helpers::centered_rect_with_percentage,
    network::{new_session_id, MqttLink, OfflineLink},
    session::{Role, Session},
};

const SESSION_ID_MAX_LEN: usize = 16;
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 20;

#[derive(Debug)]
struct MainMenu {
    options: Vec<&'static str>,
    selected: usize,
}

#[derive(Debug, PartialEq)]
enum AppScreen {
    MainMenu,
    JoinInput,
    Game,
    Settings,
}

const MAIN_MENU_OPTIONS: [&str; 5] = [
    "Play vs. AI",
    "Host Online Game",
    "Join Online Game",
    "Settings",
    "Exit",
];

const SETTINGS_ROWS: usize = 3; // 0: difficulty, 1: theme, 2: back

struct App {
    cli: Cli,
    exit: bool,
    main_menu: MainMenu,
    current_game: Option<Game>,
    screen: AppScreen,
    id_input: String,
    /// Last failure shown under the menu, e.g. an unreachable broker.
    status: Option<String>,
    final_score: Option<String>,
    clock: FrameClock,
    // Settings
    difficulty: f32,
    selected_theme: GameTheme,
    settings_selected: usize,
}

impl App {
    fn new(cli: Cli) -> Self {
        let main_menu = MainMenu {
            options: MAIN_MENU_OPTIONS.to_vec(),
            selected: 0,
        };

        Self {
            exit: false,
            main_menu,
            current_game: None,
            screen: AppScreen::MainMenu,
            id_input: String::new(),
            status: None,
            final_score: None,
            clock: FrameClock::new(cli.fps),
            difficulty: ComputerAI::new(cli.difficulty).difficulty(),
            selected_theme: cli.theme,
            settings_selected: 0,
            cli,
        }
    }

    /// Honours `--host` / `--join` by skipping straight to the game screen.
    fn open_initial_screen(&mut self) {
        if let Some(session_id) = self.cli.join.clone() {
            self.join_game(session_id);
        } else if self.cli.host {
            self.host_game();
        }
    }

    fn play_vs_ai(&mut self) {
        let session = Session::host(
            ComputerAI::new(self.difficulty),
            self.cli.rng(),
            Box::new(OfflineLink),
        );
        self.enter_game(GameType::AgainstAi, session);
    }

    fn host_game(&mut self) {
        let session_id = new_session_id();
        match MqttLink::connect(&self.cli.network(&session_id), Role::Host) {
            Ok(link) => {
                tracing::info!(%session_id, "hosting session");
                let session = Session::host(
                    ComputerAI::new(self.difficulty),
                    self.cli.rng(),
                    Box::new(link),
                );
                self.enter_game(GameType::Hosting { session_id }, session);
            }
            Err(e) => self.report(e),
        }
    }

    fn join_game(&mut self, session_id: String) {
        match MqttLink::connect(&self.cli.network(&session_id), Role::Client) {
            Ok(link) => {
                tracing::info!(%session_id, "joining session");
                let session = Session::client(Box::new(link));
                self.enter_game(GameType::Joining { session_id }, session);
            }
            Err(e) => self.report(e),
        }
    }

    fn enter_game(&mut self, game_type: GameType, session: Session) {
        self.status = None;
        self.current_game = Some(Game::new(game_type, session, self.selected_theme));
        self.clock = FrameClock::new(self.cli.fps);
        self.screen = AppScreen::Game;
    }

    fn leave_game(&mut self) {
        if let Some(game) = self.current_game.take() {
            self.final_score = Some(game.session().score_line());
        }
        self.screen = AppScreen::MainMenu;
    }

    fn report(&mut self, error: PongError) {
        tracing::error!(error = %error, "could not open peer link");
        self.status = Some(error.to_string());
        self.screen = AppScreen::MainMenu;
    }

    pub fn run(&mut self, mut terminal: DefaultTerminal) -> io::Result<()> {
        let mut last_size: u8 = 0; // 0 -> too small | 1 -> normal

        while !self.exit {
            let size = terminal.size()?;
            if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
                if last_size == 1 {
                    sleep(Duration::from_millis(100));
                    last_size = 0;
                }
                self.handle_events()?;
                terminal.draw(|frame| self.show_terminal_resize_warning(frame))?;
                continue;
            }
            last_size = 1;

            match self.screen {
                AppScreen::MainMenu => {
                    self.handle_events()?;
                    terminal.draw(|frame| self.draw(frame))?;
                }
                AppScreen::JoinInput => {
                    self.handle_join_input_events()?;
                    terminal.draw(|frame| self.draw_join_input(frame))?;
                }
                AppScreen::Game => match self.current_game.as_mut() {
                    Some(game) => {
                        let continue_game = game.game_loop(&mut self.clock)?;
                        if continue_game {
                            terminal.draw(|frame| game.draw(frame))?;
                        } else {
                            self.leave_game();
                        }
                    }
                    None => {
                        self.screen = AppScreen::MainMenu;
                    }
                },
                AppScreen::Settings => {
                    self.handle_settings_events()?;
                    terminal.draw(|frame| self.draw_settings(frame))?;
                }
            }
        }

        Ok(())
    }

    fn show_terminal_resize_warning(&mut self, frame: &mut Frame) {
        let colors = self.selected_theme.colors();
        let area = frame.area();
        let popup_area = centered_rect_with_percentage(60, 20, area.width, area.height);
        let popup = Paragraph::new("Terminal too small!\nPlease resize.")
            .block(
                Block::default()
                    .title("Warning")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Thick),
            )
            .style(Style::default().fg(colors.ball))
            .alignment(Alignment::Center);
        frame.render_widget(popup, popup_area);
    }

    fn draw(&mut self, frame: &mut Frame) {
        let vertical_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(10),
                Constraint::Length(13),
                Constraint::Max(3),
            ])
            .flex(Flex::Center)
            .split(frame.area());

        let big_text = BigText::builder()
            .pixel_size(PixelSize::Sextant)
            .style(Style::new().blue())
            .lines(vec![
                "".into(),
                "peer".cyan().into(),
                "PONG".white().into(),
            ])
            .alignment(Alignment::Center)
            .build();
        frame.render_widget(big_text, vertical_layout[0]);

        let options_block_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(40)])
            .flex(Flex::Center)
            .split(vertical_layout[1]);
        frame.render_widget(
            Block::default()
                .style(Style::default().fg(Color::Cyan))
                .borders(Borders::ALL)
                .border_type(BorderType::Double),
            options_block_layout[0],
        );

        let inner_options_layout = options_block_layout[0].inner(Margin::new(1, 1));
        let option_constraints = vec![Constraint::Max(1); self.main_menu.options.len() * 2];
        let option_areas = Layout::vertical(option_constraints)
            .flex(Flex::Center)
            .split(inner_options_layout);

        for (i, &option) in self.main_menu.options.iter().enumerate() {
            let style = if i == self.main_menu.selected {
                Style::default().fg(Color::White).bold().italic()
            } else {
                Style::default().fg(Color::Green).bold()
            };
            let option_widget = Paragraph::new(option)
                .style(style)
                .alignment(Alignment::Center);
            frame.render_widget(option_widget, option_areas[i * 2]);
        }

        let footer = match (&self.status, &self.final_score) {
            (Some(status), _) => Paragraph::new(status.as_str()).style(Style::default().fg(Color::Red)),
            (None, Some(score)) => Paragraph::new(format!("Last game: {score}"))
                .style(Style::default().fg(Color::Gray)),
            (None, None) => Paragraph::new(""),
        };
        frame.render_widget(footer.alignment(Alignment::Center), vertical_layout[2]);
    }

    fn draw_join_input(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = centered_rect_with_percentage(60, 20, area.width, area.height);
        let input = format!(
            "Enter the session id shared by the host:\n> {}",
            self.id_input
        );
        let popup = Paragraph::new(input)
            .block(
                Block::default()
                    .title("Join Online Game")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Thick),
            )
            .style(Style::default().fg(Color::Green))
            .alignment(Alignment::Center);
        frame.render_widget(popup, popup_area);
    }

    fn handle_events(&mut self) -> io::Result<()> {
        // Non-blocking event polling with short timeout
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    self.handle_menu_key(key_event.code);
                }
            }
        }
        Ok(())
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        let last = self.main_menu.options.len() - 1;
        match code {
            KeyCode::Char('q') => self.exit(),
            KeyCode::Up => {
                self.main_menu.selected = if self.main_menu.selected > 0 {
                    self.main_menu.selected - 1
                } else {
                    last
                };
            }
            KeyCode::Down => {
                self.main_menu.selected = if self.main_menu.selected < last {
                    self.main_menu.selected + 1
                } else {
                    0
                };
            }
            KeyCode::Enter => match self.main_menu.selected {
                0 => self.play_vs_ai(),
                1 => self.host_game(),
                2 => {
                    self.id_input.clear();
                    self.screen = AppScreen::JoinInput;
                }
                3 => {
                    self.settings_selected = 0;
                    self.screen = AppScreen::Settings;
                }
                4 => self.exit(),
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_join_input_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    self.handle_join_input_key(key_event.code);
                }
            }
        }
        Ok(())
    }

    fn handle_join_input_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                let session_id = self.id_input.trim().to_string();
                if !session_id.is_empty() {
                    self.join_game(session_id);
                }
            }
            KeyCode::Esc => {
                self.screen = AppScreen::MainMenu;
            }
            KeyCode::Backspace => {
                self.id_input.pop();
            }
            KeyCode::Char(c) => {
                if self.id_input.len() < SESSION_ID_MAX_LEN && c.is_ascii_alphanumeric() {
                    self.id_input.push(c);
                }
            }
            _ => {}
        }
    }

    // --- Settings Screen ---
    fn draw_settings(&mut self, frame: &mut Frame) {
        let colors = self.selected_theme.colors();
        let area = frame.area();
        let settings = [
            format!("AI Difficulty: {:.1}", self.difficulty),
            format!("Theme: {}", self.selected_theme.name()),
            "Back".to_string(),
        ];

        let [settings_area] = Layout::horizontal([Constraint::Percentage(50)])
            .flex(Flex::Center)
            .areas(area);
        let [settings_block_area, preview_area] =
            Layout::vertical([Constraint::Length(9), Constraint::Length(3)])
                .flex(Flex::Center)
                .areas(settings_area);
        let settings_block = Block::default()
            .title("Settings")
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .style(Style::default().fg(colors.accent));
        frame.render_widget(settings_block, settings_block_area);

        let line_height = 2;
        let total_height = settings.len() * line_height;
        let start_y = settings_block_area.y
            + (settings_block_area
                .height
                .saturating_sub(total_height as u16)
                / 2);
        for (i, s) in settings.iter().enumerate() {
            let para = if i == self.settings_selected {
                Paragraph::new(format!("> {} <", s))
                    .style(Style::default().fg(Color::White).bold())
            } else {
                Paragraph::new(format!("  {}  ", s)).style(Style::default().fg(colors.text))
            };
            let line_area = Rect {
                x: settings_block_area.x + 2,
                y: start_y + (i * line_height) as u16,
                width: settings_block_area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(para.alignment(Alignment::Center), line_area);
        }

        let preview_colors = [
            colors.field,
            colors.paddle,
            colors.ball,
            colors.net,
            colors.text,
            colors.accent,
            colors.border,
        ];
        let color_bar_width = preview_area.width.saturating_sub(4);
        let color_block_width = color_bar_width / preview_colors.len() as u16;
        for (i, color) in preview_colors.iter().enumerate() {
            let color_rect = Rect {
                x: preview_area.x + 2 + (i as u16) * color_block_width,
                y: preview_area.y + 1,
                width: color_block_width.max(1),
                height: 1,
            };
            frame.render_widget(
                Paragraph::new("").style(Style::default().bg(*color)),
                color_rect,
            );
        }
    }

    fn handle_settings_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    self.handle_settings_key(key_event.code);
                }
            }
        }
        Ok(())
    }

    fn handle_settings_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => {
                self.settings_selected = (self.settings_selected + SETTINGS_ROWS - 1) % SETTINGS_ROWS;
            }
            KeyCode::Down => {
                self.settings_selected = (self.settings_selected + 1) % SETTINGS_ROWS;
            }
            KeyCode::Left => match self.settings_selected {
                0 => self.difficulty = (self.difficulty - 0.1).clamp(0.0, 1.0),
                1 => self.selected_theme = self.selected_theme.previous(),
                _ => {}
            },
            KeyCode::Right => match self.settings_selected {
                0 => self.difficulty = (self.difficulty + 0.1).clamp(0.0, 1.0),
                1 => self.selected_theme = self.selected_theme.next(),
                _ => {}
            },
            KeyCode::Enter if self.settings_selected == SETTINGS_ROWS - 1 => {
                self.screen = AppScreen::MainMenu;
            }
            KeyCode::Esc => {
                self.screen = AppScreen::MainMenu;
            }
            _ => {}
        }
    }

    fn exit(&mut self) {
        self.exit = true;
    }
}

/// Logs go to a file because the terminal belongs to the UI.
fn init_tracing(log_file: &Path) -> anyhow::Result<()> {
    let file = File::create(log_file)
        .with_context(|| format!("cannot create log file {}", log_file.display()))?;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(%info, "panic");
        previous(info);
    }));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(&cli.log_file)?;

    let mut app = App::new(cli);
    app.open_initial_screen();

    let terminal = ratatui::init();
    let mut stdout = io::stdout();
    stdout.execute(event::EnableMouseCapture)?;

    let app_result = app.run(terminal);

    stdout.lock().execute(event::DisableMouseCapture)?;
    ratatui::restore();

    if let Some(game) = app.current_game.take() {
        app.final_score = Some(game.session().score_line());
    }
    match &app_result {
        Ok(()) => {
            println!("Thanks for playing peer-pong!");
            if let Some(score) = &app.final_score {
                println!("Final Score: {score}");
            }
        }
        Err(e) => tracing::error!(error = %e, "game loop failed"),
    }

    app_result.context("game loop failed")
}

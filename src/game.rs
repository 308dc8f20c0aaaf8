use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Context, Line, Painter, Shape},
        Block, BorderType, Borders, Clear, Paragraph,
    },
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::{
    clock::FrameClock,
    game_theme::GameTheme,
    helpers::{blend, centered_rect, trail_opacity},
    input::{nudged_pointer, pointer_to_field_y},
    session::{Phase, Role, Session},
    state::{SimState, BALL_SIZE, FIELD_HEIGHT, FIELD_WIDTH, PADDLE_HEIGHT, PADDLE_WIDTH},
};

/// Dash and gap length of the centre line, in field units.
const NET_DASH: f32 = 10.0;
const NET_GAP: f32 = 15.0;

#[derive(Debug, Clone, PartialEq)]
pub enum GameType {
    AgainstAi,
    Hosting { session_id: String },
    Joining { session_id: String },
}

pub struct Game {
    game_type: GameType,
    session: Session,
    theme: GameTheme,
    /// Inner area of the last drawn play field, used to map the pointer.
    field_area: Rect,
    should_exit: bool,
}

impl Game {
    pub fn new(game_type: GameType, session: Session, theme: GameTheme) -> Self {
        Self {
            game_type,
            session,
            theme,
            field_area: Rect::default(),
            should_exit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_exit = true,
            KeyCode::Enter | KeyCode::Char(' ') => {
                // clients start when the host answers
                if self.session.role() == Role::Host {
                    self.session.start();
                }
            }
            KeyCode::Up | KeyCode::Char('w') => {
                let pointer = nudged_pointer(self.session.local_paddle(), -1.0);
                self.session.pointer_moved(pointer);
            }
            KeyCode::Down | KeyCode::Char('s') => {
                let pointer = nudged_pointer(self.session.local_paddle(), 1.0);
                self.session.pointer_moved(pointer);
            }
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        match mouse_event.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                if let Some(y) =
                    pointer_to_field_y(mouse_event.column, mouse_event.row, self.field_area)
                {
                    self.session.pointer_moved(y);
                }
            }
            _ => {}
        }
    }

    /// Handles input until the next frame is due.
    fn handle_events(&mut self, clock: &FrameClock) -> io::Result<()> {
        while event::poll(clock.remaining())? {
            match event::read()? {
                Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    self.handle_key_event(key_event)
                }
                _ => {}
            }
            if self.should_exit {
                break;
            }
        }
        Ok(())
    }

    /// Waits for the next frame, then runs one tick. Returns false once the
    /// player leaves the game.
    pub fn game_loop(&mut self, clock: &mut FrameClock) -> io::Result<bool> {
        self.handle_events(clock)?;
        if self.should_exit {
            return Ok(false);
        }
        clock.advance();

        self.session.pump_link();
        self.session.tick();

        Ok(true)
    }

    fn draw_field(&mut self, frame: &mut Frame, area: Rect) {
        let colors = self.theme.colors();
        let block = Block::default()
            .title(self.get_block_title(area.width))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .style(Style::default().fg(colors.border));
        self.field_area = block.inner(area);

        let state = self.session.state();
        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::HalfBlock)
            .background_color(colors.field)
            .x_bounds([0.0, FIELD_WIDTH as f64])
            .y_bounds([0.0, FIELD_HEIGHT as f64])
            .paint(|ctx| paint_field(ctx, state, self.theme));
        frame.render_widget(canvas, area);
    }

    fn draw_lobby(&self, frame: &mut Frame, area: Rect) {
        let colors = self.theme.colors();
        let text = match (&self.game_type, self.session.phase()) {
            (_, Phase::Running) => return,
            (GameType::AgainstAi, Phase::Idle) => {
                "\nMove the left paddle with the mouse or ↑/↓.\n\n[Enter] Start  [Esc] Quit\n"
                    .to_string()
            }
            (GameType::Hosting { session_id }, Phase::Idle) => {
                let peer = if self.session.peer_connected() {
                    "Opponent connected."
                } else {
                    "Waiting for an opponent; the computer plays until one joins."
                };
                format!(
                    "\nShare this to invite a player:\n\npeer-pong --join {session_id}\n\n{peer}\n\n[Enter] Start  [Esc] Quit\n"
                )
            }
            (GameType::Joining { session_id }, Phase::Idle) => {
                format!("\nConnecting to session {session_id}...\n\n[Esc] Cancel\n")
            }
        };

        let popup_area = centered_rect(64, 12, area.width, area.height);
        frame.render_widget(Clear, popup_area);
        let popup = Paragraph::new(text)
            .block(
                Block::default()
                    .title("peer-pong")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .style(Style::default().fg(colors.accent))
                    .title_alignment(Alignment::Center),
            )
            .style(Style::default().fg(colors.text))
            .alignment(Alignment::Center);
        frame.render_widget(popup, popup_area);
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let colors = self.theme.colors();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(3), // score
                Constraint::Fill(1),   // play field
                Constraint::Length(3), // controls
            ])
            .split(area);

        let score = BigText::builder()
            .pixel_size(PixelSize::Sextant)
            .style(Style::default().fg(colors.text))
            .lines(vec![self.session.score_line().into()])
            .alignment(Alignment::Center)
            .build();
        frame.render_widget(score, layout[0]);

        self.draw_field(frame, layout[1]);

        let controls_text = match self.session.role() {
            Role::Host => " Mouse or ↑/↓ = left paddle  |  Enter = start  |  Esc = quit ",
            Role::Client => " Mouse or ↑/↓ = right paddle  |  Esc = quit ",
        };
        let controls = Paragraph::new(controls_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .style(Style::default().fg(colors.border)),
            )
            .style(Style::default().fg(colors.text))
            .alignment(Alignment::Center);
        frame.render_widget(controls, layout[2]);

        self.draw_lobby(frame, area);
    }

    fn get_block_title(&self, width: u16) -> String {
        let (left, right) = match (&self.game_type, self.session.peer_connected()) {
            (GameType::AgainstAi, _) => ("You", "Computer"),
            (GameType::Hosting { .. }, true) => ("You", "Guest"),
            (GameType::Hosting { .. }, false) => ("You", "Computer"),
            (GameType::Joining { .. }, true) => ("Host", "You"),
            (GameType::Joining { .. }, false) => ("Host", "You (offline)"),
        };
        let score = self.session.score_line();

        let used = left.len() + score.len() + right.len() + 6; // spaces + separators
        let dashes = (width as usize).saturating_sub(used) / 4;

        format!(
            " {} {} {} {} {} ",
            left,
            "─".repeat(dashes),
            score,
            "─".repeat(dashes),
            right,
        )
    }
}

fn paint_field(ctx: &mut Context, state: &SimState, theme: GameTheme) {
    let colors = theme.colors();

    let mut y = 0.0;
    while y < FIELD_HEIGHT {
        let end = (y + NET_DASH).min(FIELD_HEIGHT);
        ctx.draw(&Line::new(
            (FIELD_WIDTH / 2.0) as f64,
            flip(y),
            (FIELD_WIDTH / 2.0) as f64,
            flip(end),
            colors.net,
        ));
        y += NET_DASH + NET_GAP;
    }
    ctx.layer();

    ctx.draw(&FilledRect::new(0.0, state.player_paddle, PADDLE_WIDTH, PADDLE_HEIGHT, colors.paddle));
    ctx.draw(&FilledRect::new(
        FIELD_WIDTH - PADDLE_WIDTH,
        state.ai_paddle,
        PADDLE_WIDTH,
        PADDLE_HEIGHT,
        colors.paddle,
    ));

    let len = state.trail.len();
    for (i, point) in state.trail.iter().enumerate() {
        let color = blend(colors.ball, colors.field, trail_opacity(i, len));
        ctx.draw(&FilledRect::new(point.x, point.y, BALL_SIZE, BALL_SIZE, color));
    }

    ctx.draw(&FilledRect::new(state.ball.x, state.ball.y, BALL_SIZE, BALL_SIZE, colors.ball));
}

/// Field y (down) to canvas y (up).
fn flip(y: f32) -> f64 {
    (FIELD_HEIGHT - y) as f64
}

/// Solid rectangle in field coordinates, clipped to the field.
struct FilledRect {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
    color: Color,
}

impl FilledRect {
    fn new(x: f32, y: f32, width: f32, height: f32, color: Color) -> Self {
        Self {
            left: x as f64,
            top: y as f64,
            right: (x + width) as f64,
            bottom: (y + height) as f64,
            color,
        }
    }
}

impl Shape for FilledRect {
    fn draw(&self, painter: &mut Painter) {
        let (w, h) = (FIELD_WIDTH as f64, FIELD_HEIGHT as f64);
        if self.right < 0.0 || self.left > w || self.bottom < 0.0 || self.top > h {
            return;
        }
        let left = self.left.clamp(0.0, w);
        let right = self.right.clamp(0.0, w);
        let top = h - self.top.clamp(0.0, h);
        let bottom = h - self.bottom.clamp(0.0, h);

        let (Some((x0, y0)), Some((x1, y1))) =
            (painter.get_point(left, top), painter.get_point(right, bottom))
        else {
            return;
        };
        for x in x0..=x1 {
            for y in y0..=y1 {
                painter.paint(x, y, self.color);
            }
        }
    }
}

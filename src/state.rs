use std::{collections::VecDeque, fmt};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Logical play field. Everything below is measured in field units, with the
/// origin at the top-left corner and y growing downwards.
pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 400.0;

pub const PADDLE_WIDTH: f32 = 15.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
pub const PADDLE_SPEED: f32 = 8.0;

pub const BALL_SIZE: f32 = 15.0;
pub const BALL_SPEED: f32 = 5.0;
/// Extra horizontal speed gained on every paddle hit (compounding).
pub const BALL_ACCELERATION: f32 = 0.2;
/// Vertical speed per unit of offset between ball centre and paddle centre.
pub const STEERING_FACTOR: f32 = 0.2;

pub const TRAIL_LENGTH: usize = 10;

/// Highest legal top edge for a paddle.
pub const PADDLE_MAX_Y: f32 = FIELD_HEIGHT - PADDLE_HEIGHT;

pub fn clamp_paddle(y: f32) -> f32 {
    if y.is_nan() {
        return 0.0;
    }
    y.clamp(0.0, PADDLE_MAX_Y)
}

pub fn centered_paddle() -> f32 {
    PADDLE_MAX_Y / 2.0
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    /// Top-left corner of the ball square.
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Ball {
    /// A motionless ball in the middle of the field.
    pub fn centered() -> Self {
        Self {
            x: FIELD_WIDTH / 2.0,
            y: FIELD_HEIGHT / 2.0,
            vx: 0.0,
            vy: 0.0,
        }
    }

    /// Ball in the middle of the field heading left or right at `BALL_SPEED`
    /// with a random vertical component in `[-BALL_SPEED, BALL_SPEED]`.
    pub fn serve<R: Rng>(rng: &mut R) -> Self {
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        Self {
            vx: direction * BALL_SPEED,
            vy: rng.random_range(-1.0_f32..=1.0) * BALL_SPEED,
            ..Self::centered()
        }
    }

    pub fn position(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    pub fn center_y(&self) -> f32 {
        self.y + BALL_SIZE / 2.0
    }
}

/// Bounded FIFO of past ball positions, oldest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trail {
    points: VecDeque<Point>,
}

impl Trail {
    pub fn push(&mut self, point: Point) {
        self.points.push_back(point);
        while self.points.len() > TRAIL_LENGTH {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.points.iter().copied().collect()
    }

    /// Rebuilds the trail from a received list, keeping only the newest
    /// `TRAIL_LENGTH` points.
    pub fn replace_with(&mut self, points: impl IntoIterator<Item = Point>) {
        self.points.clear();
        for point in points {
            self.push(point);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scores {
    /// Left paddle.
    pub player: u32,
    /// Right paddle (the AI, or the remote peer when one is connected).
    pub ai: u32,
}

impl fmt::Display for Scores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.player, self.ai)
    }
}

/// Which side of the field let the ball through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Ball left through the left edge; the right paddle scores.
    Left,
    /// Ball left through the right edge; the left paddle scores.
    Right,
}

/// Everything the host simulates and the client mirrors.
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub ball: Ball,
    /// Top edge of the left paddle.
    pub player_paddle: f32,
    /// Top edge of the right paddle.
    pub ai_paddle: f32,
    pub scores: Scores,
    pub trail: Trail,
}

impl Default for SimState {
    fn default() -> Self {
        Self::new()
    }
}

impl SimState {
    pub fn new() -> Self {
        Self {
            ball: Ball::centered(),
            player_paddle: centered_paddle(),
            ai_paddle: centered_paddle(),
            scores: Scores::default(),
            trail: Trail::default(),
        }
    }

    pub fn set_player_paddle(&mut self, y: f32) {
        self.player_paddle = clamp_paddle(y);
    }

    pub fn set_ai_paddle(&mut self, y: f32) {
        self.ai_paddle = clamp_paddle(y);
    }

    /// Credits the goal to the opposite side, re-serves and wipes the trail.
    pub fn award<R: Rng>(&mut self, goal: Goal, rng: &mut R) {
        match goal {
            Goal::Left => self.scores.ai += 1,
            Goal::Right => self.scores.player += 1,
        }
        self.ball = Ball::serve(rng);
        self.trail.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn trail_evicts_oldest_beyond_capacity() {
        let mut trail = Trail::default();
        for i in 0..(TRAIL_LENGTH + 5) {
            trail.push(Point {
                x: i as f32,
                y: 0.0,
            });
        }
        assert_eq!(trail.len(), TRAIL_LENGTH);
        assert_eq!(trail.iter().next().map(|p| p.x), Some(5.0));
        assert_eq!(trail.iter().last().map(|p| p.x), Some((TRAIL_LENGTH + 4) as f32));
    }

    #[test]
    fn replace_with_keeps_newest_points() {
        let mut trail = Trail::default();
        trail.replace_with((0..25).map(|i| Point { x: i as f32, y: 1.0 }));
        assert_eq!(trail.len(), TRAIL_LENGTH);
        assert_eq!(trail.iter().next().map(|p| p.x), Some(15.0));
    }

    #[test]
    fn paddles_are_clamped_to_the_field() {
        let mut state = SimState::new();
        state.set_player_paddle(-40.0);
        state.set_ai_paddle(FIELD_HEIGHT);
        assert_eq!(state.player_paddle, 0.0);
        assert_eq!(state.ai_paddle, PADDLE_MAX_Y);
        assert_eq!(clamp_paddle(f32::NAN), 0.0);
    }

    #[test]
    fn serve_uses_fixed_horizontal_speed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let ball = Ball::serve(&mut rng);
            assert_eq!(ball.vx.abs(), BALL_SPEED);
            assert!(ball.vy.abs() <= BALL_SPEED);
            assert_eq!((ball.x, ball.y), (FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0));
        }
    }

    #[test]
    fn award_credits_the_opposite_side() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = SimState::new();
        state.trail.push(Point::default());

        state.award(Goal::Left, &mut rng);
        assert_eq!(state.scores, Scores { player: 0, ai: 1 });
        assert!(state.trail.is_empty());

        state.award(Goal::Right, &mut rng);
        assert_eq!(state.scores.to_string(), "1 : 1");
    }
}

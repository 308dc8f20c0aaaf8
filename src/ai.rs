use crate::state::{SimState, PADDLE_HEIGHT, PADDLE_SPEED};

pub const DEFAULT_DIFFICULTY: f32 = 0.7;

/// Drives the right paddle when nobody is connected to play it.
///
/// Tracking is purely reactive: every tick the paddle centre moves toward the
/// ball centre by at most `PADDLE_SPEED * difficulty`. Nothing is predicted,
/// so a low difficulty shows up as visible lag behind the ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputerAI {
    difficulty: f32,
}

impl Default for ComputerAI {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl ComputerAI {
    pub fn new(difficulty: f32) -> Self {
        let difficulty = if difficulty.is_nan() {
            DEFAULT_DIFFICULTY
        } else {
            difficulty.clamp(0.0, 1.0)
        };
        Self { difficulty }
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    pub fn reaction_speed(&self) -> f32 {
        PADDLE_SPEED * self.difficulty
    }

    pub fn update(&self, state: &mut SimState) {
        let paddle_center = state.ai_paddle + PADDLE_HEIGHT / 2.0;
        let distance = state.ball.center_y() - paddle_center;
        if distance == 0.0 {
            return;
        }

        let step = distance.abs().min(self.reaction_speed());
        state.set_ai_paddle(state.ai_paddle + step.copysign(distance));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Ball, BALL_SIZE, PADDLE_MAX_Y};

    fn ball_at(y: f32) -> Ball {
        Ball {
            x: 400.0,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    fn paddle_center(state: &SimState) -> f32 {
        state.ai_paddle + PADDLE_HEIGHT / 2.0
    }

    #[test]
    fn difficulty_is_clamped() {
        assert_eq!(ComputerAI::new(3.0).difficulty(), 1.0);
        assert_eq!(ComputerAI::new(-1.0).difficulty(), 0.0);
        assert_eq!(ComputerAI::new(f32::NAN).difficulty(), DEFAULT_DIFFICULTY);
    }

    #[test]
    fn moves_at_most_reaction_speed_per_tick() {
        let ai = ComputerAI::new(0.5);
        let mut state = SimState::new();
        state.ball = ball_at(20.0);
        let before = state.ai_paddle;

        ai.update(&mut state);

        assert_eq!(before - state.ai_paddle, PADDLE_SPEED * 0.5);
    }

    #[test]
    fn never_overshoots_the_ball() {
        let ai = ComputerAI::new(1.0);
        let mut state = SimState::new();
        let target = paddle_center(&state) + 3.0;
        state.ball = ball_at(target - BALL_SIZE / 2.0);

        ai.update(&mut state);

        assert_eq!(paddle_center(&state), target);
        ai.update(&mut state);
        assert_eq!(paddle_center(&state), target);
    }

    #[test]
    fn converges_on_a_still_ball() {
        let ai = ComputerAI::new(1.0);
        let mut state = SimState::new();
        state.ai_paddle = 0.0;
        state.ball = ball_at(250.0);
        let target = state.ball.center_y();

        let ticks = ((target - paddle_center(&state)) / PADDLE_SPEED).ceil() as usize;
        for _ in 0..ticks {
            ai.update(&mut state);
        }

        assert_eq!(paddle_center(&state), target);
    }

    #[test]
    fn lower_difficulty_lags_further_behind() {
        let mut sharp = SimState::new();
        sharp.ai_paddle = 0.0;
        sharp.ball = ball_at(300.0);
        let mut sluggish = sharp.clone();

        for _ in 0..10 {
            ComputerAI::new(1.0).update(&mut sharp);
            ComputerAI::new(0.3).update(&mut sluggish);
        }

        assert!(sluggish.ai_paddle < sharp.ai_paddle);
    }

    #[test]
    fn stays_inside_the_field() {
        let ai = ComputerAI::new(1.0);
        let mut state = SimState::new();
        state.ball = ball_at(0.0);
        for _ in 0..100 {
            ai.update(&mut state);
            assert!(state.ai_paddle >= 0.0);
        }
        assert_eq!(state.ai_paddle, 0.0);

        state.ball = ball_at(400.0);
        for _ in 0..100 {
            ai.update(&mut state);
            assert!(state.ai_paddle <= PADDLE_MAX_Y);
        }
        assert_eq!(state.ai_paddle, PADDLE_MAX_Y);
    }
}

use rand::Rng;

use crate::state::{
    Ball, Goal, SimState, BALL_ACCELERATION, BALL_SIZE, FIELD_HEIGHT, FIELD_WIDTH,
    PADDLE_HEIGHT, PADDLE_WIDTH, STEERING_FACTOR,
};

/// Advances the ball by one tick.
///
/// Displacement is a fixed `velocity` per call, regardless of how much wall
/// time passed since the previous frame. Returns the goal scored this tick, if
/// any; the state has already been re-served when that happens.
pub fn step<R: Rng>(state: &mut SimState, rng: &mut R) -> Option<Goal> {
    state.trail.push(state.ball.position());

    let ball = &mut state.ball;
    ball.x += ball.vx;
    ball.y += ball.vy;

    bounce_off_walls(ball);

    // left paddle; a ball already past the edge stays there and scores
    if ball.vx < 0.0 && ball.x < PADDLE_WIDTH && overlaps_paddle(ball, state.player_paddle) {
        deflect(ball, state.player_paddle);
        if ball.x >= 0.0 {
            ball.x = PADDLE_WIDTH;
        }
    }

    // right paddle
    let right_face = FIELD_WIDTH - PADDLE_WIDTH - BALL_SIZE;
    if ball.vx > 0.0 && ball.x > right_face && overlaps_paddle(ball, state.ai_paddle) {
        deflect(ball, state.ai_paddle);
        if ball.x <= FIELD_WIDTH {
            ball.x = right_face;
        }
    }

    let goal = if ball.x < 0.0 {
        Some(Goal::Left)
    } else if ball.x > FIELD_WIDTH {
        Some(Goal::Right)
    } else {
        None
    };

    if let Some(goal) = goal {
        state.award(goal, rng);
        tracing::debug!(?goal, scores = %state.scores, "goal");
    }

    goal
}

fn bounce_off_walls(ball: &mut Ball) {
    let floor = FIELD_HEIGHT - BALL_SIZE;
    if ball.y < 0.0 || ball.y > floor {
        ball.vy = -ball.vy;
        ball.y = if ball.y < 0.0 { 0.0 } else { floor };
    }
}

fn overlaps_paddle(ball: &Ball, paddle_y: f32) -> bool {
    ball.y + BALL_SIZE > paddle_y && ball.y < paddle_y + PADDLE_HEIGHT
}

/// Sends the ball back faster, steering it by where it met the paddle.
fn deflect(ball: &mut Ball, paddle_y: f32) {
    ball.vx = -ball.vx * (1.0 + BALL_ACCELERATION);
    let offset = ball.center_y() - (paddle_y + PADDLE_HEIGHT / 2.0);
    ball.vy = offset * STEERING_FACTOR;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Point, BALL_SPEED, PADDLE_MAX_Y, TRAIL_LENGTH};
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn state_with_ball(x: f32, y: f32, vx: f32, vy: f32) -> SimState {
        SimState {
            ball: Ball { x, y, vx, vy },
            ..SimState::new()
        }
    }

    #[test]
    fn moves_by_velocity_each_tick() {
        let mut state = state_with_ball(300.0, 200.0, 5.0, -2.0);
        assert_eq!(step(&mut state, &mut rng()), None);
        assert_eq!((state.ball.x, state.ball.y), (305.0, 198.0));
    }

    #[test]
    fn top_wall_flips_vertical_velocity_and_clamps() {
        let mut state = state_with_ball(300.0, 2.0, 5.0, -4.0);
        step(&mut state, &mut rng());
        assert_eq!(state.ball.y, 0.0);
        assert_eq!(state.ball.vy, 4.0);
    }

    #[test]
    fn bottom_wall_flips_vertical_velocity_and_clamps() {
        let floor = FIELD_HEIGHT - BALL_SIZE;
        let mut state = state_with_ball(300.0, floor - 1.0, 5.0, 3.0);
        step(&mut state, &mut rng());
        assert_eq!(state.ball.y, floor);
        assert_eq!(state.ball.vy, -3.0);
    }

    #[test]
    fn ball_already_past_top_is_pulled_back() {
        let mut state = state_with_ball(300.0, -3.0, 5.0, -1.0);
        step(&mut state, &mut rng());
        assert_eq!(state.ball.y, 0.0);
        assert!(state.ball.vy > 0.0);
    }

    #[test]
    fn left_paddle_returns_ball_faster() {
        let paddle = 150.0;
        let mut state = state_with_ball(18.0, paddle + 40.0, -BALL_SPEED, 0.0);
        state.player_paddle = paddle;

        step(&mut state, &mut rng());

        assert_eq!(state.ball.vx, BALL_SPEED * (1.0 + BALL_ACCELERATION));
        assert_eq!(state.ball.x, PADDLE_WIDTH);
    }

    #[test]
    fn right_paddle_returns_ball_faster() {
        let paddle = 50.0;
        let start = FIELD_WIDTH - PADDLE_WIDTH - BALL_SIZE - 2.0;
        let mut state = state_with_ball(start, paddle + 10.0, BALL_SPEED, 0.0);
        state.ai_paddle = paddle;

        step(&mut state, &mut rng());

        assert_eq!(state.ball.vx, -BALL_SPEED * (1.0 + BALL_ACCELERATION));
    }

    #[test]
    fn hit_offset_steers_the_return() {
        let paddle = 100.0;
        // ball centre 30 units below paddle centre after the move
        let y = paddle + PADDLE_HEIGHT / 2.0 + 30.0 - BALL_SIZE / 2.0;
        let mut state = state_with_ball(16.0, y, -5.0, 0.0);
        state.player_paddle = paddle;

        step(&mut state, &mut rng());

        assert!((state.ball.vy - 30.0 * STEERING_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn speed_grows_on_every_consecutive_hit() {
        let paddle = PADDLE_MAX_Y / 2.0;
        let mut state = SimState::new();
        state.player_paddle = paddle;
        let mut speed = BALL_SPEED;

        for _ in 0..6 {
            state.ball = Ball {
                x: PADDLE_WIDTH + speed - 1.0,
                y: paddle + PADDLE_HEIGHT / 2.0 - BALL_SIZE / 2.0,
                vx: -speed,
                vy: 0.0,
            };
            assert_eq!(step(&mut state, &mut rng()), None);
            let returned = state.ball.vx;
            assert!(returned > speed, "{returned} should exceed {speed}");
            speed = returned;
        }
    }

    #[test]
    fn ball_moving_away_is_not_deflected() {
        let paddle = 150.0;
        let mut state = state_with_ball(5.0, paddle + 40.0, 6.0, 0.0);
        state.player_paddle = paddle;

        step(&mut state, &mut rng());

        assert_eq!(state.ball.vx, 6.0);
    }

    #[test]
    fn missing_on_the_left_scores_for_the_right_paddle() {
        let mut state = state_with_ball(2.0, 10.0, -5.0, 0.0);
        state.player_paddle = PADDLE_MAX_Y;
        state.trail.push(Point { x: 1.0, y: 1.0 });

        assert_eq!(step(&mut state, &mut rng()), Some(Goal::Left));

        assert_eq!(state.scores.ai, 1);
        assert_eq!(state.scores.player, 0);
        assert_eq!(state.ball.x, FIELD_WIDTH / 2.0);
        assert_eq!(state.ball.y, FIELD_HEIGHT / 2.0);
        assert_eq!(state.ball.vx.abs(), BALL_SPEED);
        assert!(state.trail.is_empty());
    }

    #[test]
    fn missing_on_the_right_scores_for_the_left_paddle() {
        let mut state = state_with_ball(FIELD_WIDTH - 1.0, 10.0, 5.0, 0.0);
        state.ai_paddle = PADDLE_MAX_Y;

        assert_eq!(step(&mut state, &mut rng()), Some(Goal::Right));
        assert_eq!(state.scores.player, 1);
        assert!(state.trail.is_empty());
    }

    #[test]
    fn fast_ball_past_the_left_edge_scores_despite_the_paddle() {
        let mut state = state_with_ball(10.0, 190.0, -20.0, 0.0);
        state.player_paddle = 150.0;

        assert_eq!(step(&mut state, &mut rng()), Some(Goal::Left));
        assert_eq!(state.scores.ai, 1);
        assert_eq!(state.ball.x, FIELD_WIDTH / 2.0);
    }

    #[test]
    fn fast_ball_past_the_right_edge_scores_despite_the_paddle() {
        let mut state = state_with_ball(FIELD_WIDTH - 10.0, 190.0, 20.0, 0.0);
        state.ai_paddle = 150.0;

        assert_eq!(step(&mut state, &mut rng()), Some(Goal::Right));
        assert_eq!(state.scores.player, 1);
        assert_eq!(state.ball.x, FIELD_WIDTH / 2.0);
    }

    #[test]
    fn trail_records_pre_move_positions_up_to_capacity() {
        let mut state = state_with_ball(200.0, 200.0, 1.0, 0.0);
        for tick in 0..(TRAIL_LENGTH * 2) {
            let before = state.ball.position();
            step(&mut state, &mut rng());
            assert!(state.trail.len() <= TRAIL_LENGTH);
            assert_eq!(state.trail.iter().last(), Some(&before), "tick {tick}");
        }
        assert_eq!(state.trail.len(), TRAIL_LENGTH);
    }

    #[test]
    fn long_rally_keeps_invariants() {
        let mut rng = rng();
        let mut state = SimState::new();
        state.ball = Ball::serve(&mut rng);
        for _ in 0..5_000 {
            let goal = step(&mut state, &mut rng);
            assert!(state.trail.len() <= TRAIL_LENGTH);
            if goal.is_some() {
                assert!(state.trail.is_empty());
            }
            assert!(state.ball.y >= 0.0 && state.ball.y <= FIELD_HEIGHT - BALL_SIZE);
        }
    }
}

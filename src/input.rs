use ratatui::layout::Rect;

use crate::state::{clamp_paddle, FIELD_HEIGHT, PADDLE_HEIGHT};

/// How far one Up/Down key press moves the pointer target.
pub const KEY_NUDGE: f32 = PADDLE_HEIGHT / 4.0;

/// Paddle top edge that centres the paddle on the pointer, kept on the field.
pub fn paddle_target(pointer_y: f32) -> f32 {
    clamp_paddle(pointer_y - PADDLE_HEIGHT / 2.0)
}

/// Maps a terminal cell to a field y coordinate, or `None` when the cell is
/// outside the drawn play field. Each row maps to its vertical middle.
pub fn pointer_to_field_y(column: u16, row: u16, field: Rect) -> Option<f32> {
    if field.height == 0
        || column < field.x
        || column >= field.x + field.width
        || row < field.y
        || row >= field.y + field.height
    {
        return None;
    }

    let offset = (row - field.y) as f32 + 0.5;
    Some(offset / field.height as f32 * FIELD_HEIGHT)
}

/// Pointer position equivalent to nudging the paddle at `paddle_y` by one key
/// press. `direction` is negative for up.
pub fn nudged_pointer(paddle_y: f32, direction: f32) -> f32 {
    paddle_y + PADDLE_HEIGHT / 2.0 + direction.signum() * KEY_NUDGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PADDLE_MAX_Y;

    #[test]
    fn target_centres_paddle_on_pointer() {
        assert_eq!(paddle_target(200.0), 150.0);
    }

    #[test]
    fn target_is_clamped_to_field() {
        assert_eq!(paddle_target(10.0), 0.0);
        assert_eq!(paddle_target(FIELD_HEIGHT + 50.0), PADDLE_MAX_Y);
    }

    #[test]
    fn rows_map_across_the_field_height() {
        let field = Rect::new(10, 5, 80, 20);
        assert_eq!(pointer_to_field_y(20, 5, field), Some(0.5 / 20.0 * FIELD_HEIGHT));
        assert_eq!(pointer_to_field_y(20, 24, field), Some(19.5 / 20.0 * FIELD_HEIGHT));
    }

    #[test]
    fn pointer_outside_field_is_ignored() {
        let field = Rect::new(10, 5, 80, 20);
        assert_eq!(pointer_to_field_y(9, 10, field), None);
        assert_eq!(pointer_to_field_y(90, 10, field), None);
        assert_eq!(pointer_to_field_y(20, 4, field), None);
        assert_eq!(pointer_to_field_y(20, 25, field), None);
        assert_eq!(pointer_to_field_y(0, 0, Rect::default()), None);
    }

    #[test]
    fn nudge_moves_a_quarter_paddle() {
        let paddle = 100.0;
        assert_eq!(paddle_target(nudged_pointer(paddle, -1.0)), paddle - KEY_NUDGE);
        assert_eq!(paddle_target(nudged_pointer(paddle, 1.0)), paddle + KEY_NUDGE);
    }
}

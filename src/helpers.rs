use ratatui::{layout::Rect, style::Color};

pub fn centered_rect_with_percentage(percent_x: u16, percent_y: u16, cols: u16, rows: u16) -> Rect {
    let width = percent_of(cols, percent_x);
    let height = std::cmp::min(std::cmp::max(percent_of(rows, percent_y), 5), rows);
    Rect::new((cols - width) / 2, (rows - height) / 2, width, height)
}

fn percent_of(value: u16, percent: u16) -> u16 {
    (u32::from(value) * u32::from(percent.min(100)) / 100) as u16
}

pub fn centered_rect(width: u16, height: u16, cols: u16, rows: u16) -> Rect {
    let actual_width = std::cmp::min(width, cols);
    let actual_height = std::cmp::min(height, rows);
    Rect::new(
        (cols - actual_width) / 2,
        (rows - actual_height) / 2,
        actual_width,
        actual_height,
    )
}

/// `color` drawn at `opacity` over `backdrop`. Non-RGB colours are treated as
/// white on black.
pub fn blend(color: Color, backdrop: Color, opacity: f32) -> Color {
    let (r, g, b) = rgb(color, (255, 255, 255));
    let (br, bg, bb) = rgb(backdrop, (0, 0, 0));
    let a = opacity.clamp(0.0, 1.0);
    let mix = |fg: u8, bg: u8| (bg as f32 + (fg as f32 - bg as f32) * a).round() as u8;
    Color::Rgb(mix(r, br), mix(g, bg), mix(b, bb))
}

fn rgb(color: Color, fallback: (u8, u8, u8)) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::White => (255, 255, 255),
        _ => fallback,
    }
}

/// Opacity of trail point `index` (0 = oldest) in a trail of `len` points.
pub fn trail_opacity(index: usize, len: usize) -> f32 {
    if len == 0 {
        return 0.0;
    }
    (index + 1) as f32 / len as f32 * 0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside_small_terminals() {
        assert_eq!(centered_rect(100, 40, 60, 20), Rect::new(0, 0, 60, 20));
        assert_eq!(centered_rect(20, 10, 60, 20), Rect::new(20, 5, 20, 10));
    }

    #[test]
    fn percentage_rect_handles_very_wide_terminals() {
        assert_eq!(
            centered_rect_with_percentage(60, 20, 2000, 500),
            Rect::new(400, 200, 1200, 100)
        );
        assert_eq!(
            centered_rect_with_percentage(40, 20, 60, 20),
            Rect::new(18, 7, 24, 5)
        );
    }

    #[test]
    fn blend_interpolates_between_backdrop_and_colour() {
        let white = Color::Rgb(255, 255, 255);
        let black = Color::Rgb(0, 0, 0);
        assert_eq!(blend(white, black, 1.0), white);
        assert_eq!(blend(white, black, 0.0), black);
        assert_eq!(blend(white, black, 0.5), Color::Rgb(128, 128, 128));
    }

    #[test]
    fn newest_trail_point_is_most_opaque() {
        assert_eq!(trail_opacity(9, 10), 0.7);
        assert!(trail_opacity(0, 10) < trail_opacity(5, 10));
        assert_eq!(trail_opacity(0, 0), 0.0);
    }
}

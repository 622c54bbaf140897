use sierpinski_engine::paint::Color;

/// Fixed cyclic color palette. Level `l` under offset `o` uses entry
/// `(o + l) % len`.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Blue, green, red, teal, purple, olive, fuchsia, aqua, yellow, maroon.
    pub fn classic() -> Self {
        Self {
            colors: vec![
                Color::rgb(0.0, 0.0, 1.0),
                Color::rgb(0.0, 1.0, 0.0),
                Color::rgb(1.0, 0.0, 0.0),
                Color::rgb(0.0, 0.5, 0.5),
                Color::rgb(0.5, 0.0, 0.5),
                Color::rgb(0.5, 0.5, 0.0),
                Color::rgb(1.0, 0.0, 1.0),
                Color::rgb(0.0, 1.0, 1.0),
                Color::rgb(1.0, 1.0, 0.0),
                Color::rgb(0.5, 0.0, 0.0),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Color of `level` when the palette is rotated by `offset`.
    ///
    /// Returns black for an empty palette.
    pub fn color(&self, offset: usize, level: usize) -> Color {
        if self.colors.is_empty() {
            return Color::BLACK;
        }
        self.colors[(offset + level) % self.colors.len()]
    }

    /// Colors for levels `0..count` under `offset`, in draw order.
    pub fn rotation(&self, offset: usize, count: usize) -> Vec<Color> {
        (0..count).map(|level| self.color(offset, level)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_has_ten_entries() {
        assert_eq!(Palette::classic().len(), 10);
    }

    #[test]
    fn color_follows_offset_plus_level() {
        let p = Palette::classic();
        assert_eq!(p.color(0, 0), Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(p.color(2, 1), Color::rgb(0.0, 0.5, 0.5));
        assert_eq!(p.color(0, 2), p.color(2, 0));
    }

    #[test]
    fn color_wraps_past_the_end() {
        let p = Palette::classic();
        assert_eq!(p.color(9, 1), p.color(0, 0));
        assert_eq!(p.color(7, 10), p.color(7, 0));
        assert_eq!(p.color(9, 0), Color::rgb(0.5, 0.0, 0.0));
    }

    #[test]
    fn rotation_lists_levels_in_order() {
        let p = Palette::classic();
        let colors = p.rotation(8, 3);
        assert_eq!(colors, vec![p.color(8, 0), p.color(9, 0), p.color(0, 0)]);
    }

    #[test]
    fn empty_palette_falls_back_to_black() {
        let p = Palette { colors: Vec::new() };
        assert_eq!(p.color(3, 4), Color::BLACK);
    }
}

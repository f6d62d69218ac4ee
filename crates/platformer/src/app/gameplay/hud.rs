use tracing::debug;

use super::config::HudConfig;

pub(crate) trait ScoreSink {
    fn award_coin(&mut self);
    fn award_score(&mut self, value: u32);
}

pub(crate) const PANEL_ROWS: i32 = 5;
pub(crate) const PANEL_COLS: i32 = 50;

const FONT_WHITE: u16 = 11;
const FONT_YELLOW: u16 = 22;

#[derive(Debug, Clone, Copy)]
struct CounterLayout {
    row: i32,
    col: i32,
    width: usize,
    font_base: u16,
}

const LIVES: CounterLayout = CounterLayout {
    row: 3,
    col: 12,
    width: 2,
    font_base: FONT_YELLOW,
};
const TIME: CounterLayout = CounterLayout {
    row: 3,
    col: 28,
    width: 3,
    font_base: FONT_YELLOW,
};
const COINS: CounterLayout = CounterLayout {
    row: 2,
    col: 36,
    width: 3,
    font_base: FONT_WHITE,
};
const SCORE: CounterLayout = CounterLayout {
    row: 3,
    col: 34,
    width: 5,
    font_base: FONT_WHITE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HudPanel {
    cells: Vec<Option<u16>>,
}

impl HudPanel {
    fn new() -> Self {
        Self {
            cells: vec![None; (PANEL_ROWS * PANEL_COLS) as usize],
        }
    }

    #[cfg(test)]
    pub(crate) fn glyph_at(&self, row: i32, col: i32) -> Option<u16> {
        self.offset(row, col).and_then(|offset| self.cells[offset])
    }

    fn put(&mut self, row: i32, col: i32, glyph: Option<u16>) {
        if let Some(offset) = self.offset(row, col) {
            self.cells[offset] = glyph;
        }
    }

    fn offset(&self, row: i32, col: i32) -> Option<usize> {
        if !(0..PANEL_ROWS).contains(&row) || !(0..PANEL_COLS).contains(&col) {
            return None;
        }
        Some((row * PANEL_COLS + col) as usize)
    }

    fn print(&mut self, layout: CounterLayout, value: u32) {
        let text = format!("{value:>width$}", width = layout.width);
        let skip = text.len().saturating_sub(layout.width);
        for (offset, character) in text.chars().skip(skip).enumerate() {
            let glyph = character
                .to_digit(10)
                .map(|digit| layout.font_base + digit as u16);
            self.put(layout.row, layout.col + offset as i32, glyph);
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Hud {
    lives: u32,
    time: u32,
    coins: u32,
    score: u32,
    frames_per_time_unit: u32,
    frame_count: u32,
    panel: HudPanel,
}

impl Hud {
    pub(crate) fn new(config: &HudConfig) -> Self {
        let mut hud = Self {
            lives: config.lives,
            time: config.time,
            coins: 0,
            score: 0,
            frames_per_time_unit: config.frames_per_time_unit.max(1),
            frame_count: 0,
            panel: HudPanel::new(),
        };
        hud.panel.print(LIVES, hud.lives);
        hud.panel.print(TIME, hud.time);
        hud.panel.print(COINS, hud.coins);
        hud.panel.print(SCORE, hud.score);
        hud
    }

    pub(crate) fn tick(&mut self) {
        self.frame_count = self.frame_count.wrapping_add(1);
        if self.frame_count % self.frames_per_time_unit == 0 && self.time > 0 {
            self.time -= 1;
            self.panel.print(TIME, self.time);
        }
    }

    pub(crate) fn lives(&self) -> u32 {
        self.lives
    }

    pub(crate) fn time(&self) -> u32 {
        self.time
    }

    pub(crate) fn coins(&self) -> u32 {
        self.coins
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    #[cfg(test)]
    pub(crate) fn panel(&self) -> &HudPanel {
        &self.panel
    }
}

impl ScoreSink for Hud {
    fn award_coin(&mut self) {
        self.coins = self.coins.saturating_add(1);
        self.panel.print(COINS, self.coins);
        debug!(coins = self.coins, "coin_awarded");
    }

    fn award_score(&mut self, value: u32) {
        self.score = self.score.saturating_add(value);
        self.panel.print(SCORE, self.score);
        debug!(value, score = self.score, "score_awarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(panel: &HudPanel, layout: CounterLayout) -> String {
        (0..layout.width as i32)
            .map(|offset| match panel.glyph_at(layout.row, layout.col + offset) {
                Some(glyph) => char::from_digit(u32::from(glyph - layout.font_base), 10)
                    .expect("digit glyph"),
                None => ' ',
            })
            .collect()
    }

    #[test]
    fn new_prints_initial_counters() {
        let hud = Hud::new(&HudConfig::default());
        assert_eq!(row_text(hud.panel(), LIVES), " 5");
        assert_eq!(row_text(hud.panel(), TIME), "255");
        assert_eq!(row_text(hud.panel(), COINS), "  0");
        assert_eq!(row_text(hud.panel(), SCORE), "    0");
    }

    #[test]
    fn digits_use_counter_font() {
        let hud = Hud::new(&HudConfig::default());
        assert_eq!(hud.panel().glyph_at(3, 13), Some(FONT_YELLOW + 5));
        assert_eq!(hud.panel().glyph_at(2, 38), Some(FONT_WHITE));
        assert_eq!(hud.panel().glyph_at(3, 12), None);
    }

    #[test]
    fn time_counts_down_every_unit_and_stops_at_zero() {
        let mut hud = Hud::new(&HudConfig {
            lives: 5,
            time: 2,
            frames_per_time_unit: 3,
        });
        for _ in 0..2 {
            hud.tick();
        }
        assert_eq!(hud.time(), 2);
        hud.tick();
        assert_eq!(hud.time(), 1);
        for _ in 0..30 {
            hud.tick();
        }
        assert_eq!(hud.time(), 0);
        assert_eq!(row_text(hud.panel(), TIME), "  0");
    }

    #[test]
    fn awards_update_counters_and_panel() {
        let mut hud = Hud::new(&HudConfig::default());
        hud.award_coin();
        hud.award_coin();
        hud.award_score(10);
        hud.award_score(250);

        assert_eq!(hud.coins(), 2);
        assert_eq!(hud.score(), 260);
        assert_eq!(row_text(hud.panel(), COINS), "  2");
        assert_eq!(row_text(hud.panel(), SCORE), "  260");
    }

    #[test]
    fn oversized_value_keeps_lowest_digits() {
        let mut panel = HudPanel::new();
        panel.print(LIVES, 123);
        assert_eq!(row_text(&panel, LIVES), "23");
    }
}

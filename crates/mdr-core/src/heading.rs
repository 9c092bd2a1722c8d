/// Hierarchical heading counters.
///
/// Observing a heading of level `L` increments counter `L` and resets all
/// deeper ones. The rendered label joins the counters with `.` after
/// dropping trailing zeros, so skipped levels show as `0` components.
#[derive(Debug, Clone, Default)]
pub struct HeadingNumbering {
    levels: [usize; 6],
}

impl HeadingNumbering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heading. `level` is clamped into `1..=6`.
    pub fn observe(&mut self, level: u8) {
        let idx = usize::from(level.clamp(1, 6)) - 1;
        self.levels[idx] += 1;
        for deeper in &mut self.levels[idx + 1..] {
            *deeper = 0;
        }
    }

    /// Label for the most recently observed heading, e.g. `1.2.1`.
    pub fn render(&self) -> String {
        let end = self
            .levels
            .iter()
            .rposition(|&n| n != 0)
            .map_or(0, |i| i + 1);

        self.levels[..end]
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

use serde::Serialize;

/// Which automatic trims were applied to a well.
///
/// Stored as two independent bits: break trimming (1) and linear range
/// trimming (2), so `Both` is 3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    #[default]
    None,
    BreakTrimmed,
    RangeTrimmed,
    Both,
}

impl Adjustment {
    const BREAK_BIT: u8 = 1;
    const RANGE_BIT: u8 = 2;

    pub fn bits(self) -> u8 {
        match self {
            Adjustment::None => 0,
            Adjustment::BreakTrimmed => Self::BREAK_BIT,
            Adjustment::RangeTrimmed => Self::RANGE_BIT,
            Adjustment::Both => Self::BREAK_BIT | Self::RANGE_BIT,
        }
    }

    pub fn from_bits(bits: u8) -> Self {
        match bits & (Self::BREAK_BIT | Self::RANGE_BIT) {
            0 => Adjustment::None,
            1 => Adjustment::BreakTrimmed,
            2 => Adjustment::RangeTrimmed,
            _ => Adjustment::Both,
        }
    }

    pub fn mark_break_trimmed(&mut self) {
        *self = Self::from_bits(self.bits() | Self::BREAK_BIT);
    }

    pub fn mark_range_trimmed(&mut self) {
        *self = Self::from_bits(self.bits() | Self::RANGE_BIT);
    }

    pub fn break_trimmed(self) -> bool {
        self.bits() & Self::BREAK_BIT != 0
    }

    pub fn range_trimmed(self) -> bool {
        self.bits() & Self::RANGE_BIT != 0
    }

    pub fn label(self) -> &'static str {
        match self {
            Adjustment::None => "none",
            Adjustment::BreakTrimmed => "break",
            Adjustment::RangeTrimmed => "range",
            Adjustment::Both => "break + range",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_accumulate_independently() {
        let mut adj = Adjustment::default();
        assert_eq!(adj.bits(), 0);

        adj.mark_range_trimmed();
        assert_eq!(adj, Adjustment::RangeTrimmed);
        assert!(!adj.break_trimmed());

        adj.mark_break_trimmed();
        assert_eq!(adj, Adjustment::Both);
        assert_eq!(adj.bits(), 3);

        adj.mark_break_trimmed();
        assert_eq!(adj, Adjustment::Both);
    }

    #[test]
    fn from_bits_round_trips() {
        for bits in 0..4 {
            assert_eq!(Adjustment::from_bits(bits).bits(), bits);
        }
    }
}

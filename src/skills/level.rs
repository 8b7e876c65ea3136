//! Global agent experience and level.

use serde::{Deserialize, Serialize};

/// XP needed per level: `next_level_xp = level × XP_PER_LEVEL`.
pub const XP_PER_LEVEL: u64 = 1_000;

/// The agent's overall level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentLevel {
    pub level: u32,
    pub xp: u64,
    pub next_level_xp: u64,
}

impl Default for AgentLevel {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            next_level_xp: XP_PER_LEVEL,
        }
    }
}

/// Levels crossed by one award, reported once however many there are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelGain {
    pub from: u32,
    pub to: u32,
}

impl LevelGain {
    pub fn levels(&self) -> u32 {
        self.to - self.from
    }
}

impl AgentLevel {
    /// Add XP. Overflow carries into as many levels as it covers.
    ///
    /// `None` when no threshold was crossed.
    pub fn award(&mut self, amount: u64) -> Option<LevelGain> {
        let from = self.level;
        self.xp = self.xp.saturating_add(amount);
        while self.xp >= self.next_level_xp {
            self.xp -= self.next_level_xp;
            self.level = self.level.saturating_add(1);
            self.next_level_xp = u64::from(self.level).saturating_mul(XP_PER_LEVEL);
        }
        (self.level > from).then_some(LevelGain { from, to: self.level })
    }

    /// Repair a loaded record so the at-rest invariant holds.
    pub fn normalized(mut self) -> Self {
        self.level = self.level.max(1);
        self.next_level_xp = u64::from(self.level) * XP_PER_LEVEL;
        let carry = std::mem::take(&mut self.xp);
        self.award(carry);
        self
    }

    /// Progress towards the next level in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        self.xp as f64 / self.next_level_xp as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_without_level_up() {
        let mut level = AgentLevel::default();
        assert_eq!(level.award(999), None);
        assert_eq!((level.level, level.xp, level.next_level_xp), (1, 999, 1000));
    }

    #[test]
    fn test_overflow_carries() {
        let mut level = AgentLevel::default();
        assert_eq!(level.award(1_250), Some(LevelGain { from: 1, to: 2 }));
        assert_eq!((level.level, level.xp, level.next_level_xp), (2, 250, 2000));
    }

    #[test]
    fn test_multi_level_award_resolves_fully() {
        // 1000 (L1→2) + 2000 (L2→3) + 500 carried
        let mut level = AgentLevel::default();
        let gain = level.award(3_500).unwrap();
        assert_eq!((gain.from, gain.to, gain.levels()), (1, 3, 2));
        assert_eq!((level.level, level.xp, level.next_level_xp), (3, 500, 3000));
    }

    #[test]
    fn test_normalized_repairs_overflowing_record() {
        let loaded = AgentLevel {
            level: 0,
            xp: 1_500,
            next_level_xp: 7,
        };
        let fixed = loaded.normalized();
        assert_eq!((fixed.level, fixed.xp, fixed.next_level_xp), (2, 500, 2000));
    }

    #[test]
    fn test_normalized_huge_xp_keeps_invariant() {
        let loaded = AgentLevel {
            level: 1,
            xp: u64::MAX,
            next_level_xp: 1,
        };
        let fixed = loaded.normalized();
        assert!(fixed.level > 1);
        assert!(fixed.xp < fixed.next_level_xp);
    }
}

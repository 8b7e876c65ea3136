//! Per-skill leveled progress counters.

use serde::{Deserialize, Serialize};

/// Growth factor applied to `xp_required` on each level-up, as a ratio.
const XP_GROWTH_NUM: u64 = 3;
const XP_GROWTH_DEN: u64 = 2;

/// Highest `max_level` accepted from persisted records.
pub const MAX_SKILL_LEVEL: u32 = 100;

/// One leveled capability of the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub level: u32,
    pub max_level: u32,
    pub current_xp: u64,
    pub xp_required: u64,
    pub icon: String,
}

impl Skill {
    /// A fresh level-1 skill needing 100 XP, capped at level 10.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            level: 1,
            max_level: 10,
            current_xp: 0,
            xp_required: 100,
            icon: icon.into(),
        }
    }

    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level.max(1);
        self
    }

    pub fn with_xp_required(mut self, xp_required: u64) -> Self {
        self.xp_required = xp_required.max(1);
        self
    }

    pub fn is_maxed(&self) -> bool {
        self.level >= self.max_level
    }

    /// Add XP, carrying overflow through as many level-ups as it covers.
    ///
    /// Returns every level reached, in order. At max level the remaining XP
    /// is clamped below `xp_required`.
    pub fn apply_xp(&mut self, amount: u64) -> Vec<u32> {
        let mut reached = Vec::new();
        self.current_xp = self.current_xp.saturating_add(amount);

        while self.current_xp >= self.xp_required && self.level < self.max_level {
            self.current_xp -= self.xp_required;
            self.level += 1;
            self.xp_required = grown(self.xp_required);
            reached.push(self.level);
        }

        if self.is_maxed() {
            self.current_xp = self.current_xp.min(self.xp_required.saturating_sub(1));
        }
        reached
    }

    /// Repair a loaded record so the at-rest invariant holds.
    ///
    /// `max_level` is capped at [`MAX_SKILL_LEVEL`] so a corrupt record can
    /// never drive an unbounded leveling loop.
    pub fn repaired(mut self) -> Self {
        self.max_level = self.max_level.clamp(1, MAX_SKILL_LEVEL);
        self.level = self.level.clamp(1, self.max_level);
        self.xp_required = self.xp_required.max(1);
        self.apply_xp(0);
        self
    }
}

/// Next requirement after a level-up. Saturates instead of overflowing.
fn grown(xp_required: u64) -> u64 {
    xp_required
        .checked_mul(XP_GROWTH_NUM)
        .map_or(u64::MAX, |v| v / XP_GROWTH_DEN)
        .max(1)
}

/// Result of one award against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAward {
    pub skill_id: String,
    pub skill_name: String,
    pub amount: u64,
    /// Levels reached by this award, in order. Empty when no level-up happened.
    pub levels_reached: Vec<u32>,
}

impl SkillAward {
    pub fn leveled_up(&self) -> bool {
        !self.levels_reached.is_empty()
    }
}

/// The agent's skill catalog with progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLedger {
    skills: Vec<Skill>,
}

impl Default for SkillLedger {
    fn default() -> Self {
        Self::new(default_skills())
    }
}

impl SkillLedger {
    pub fn new(skills: Vec<Skill>) -> Self {
        Self { skills }
    }

    pub fn all(&self) -> &[Skill] {
        &self.skills
    }

    pub fn get(&self, skill_id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == skill_id)
    }

    /// Award XP to a skill. `None` if the id is unknown.
    pub fn award(&mut self, skill_id: &str, amount: u64) -> Option<SkillAward> {
        let skill = self.skills.iter_mut().find(|s| s.id == skill_id)?;
        let levels_reached = skill.apply_xp(amount);
        Some(SkillAward {
            skill_id: skill.id.clone(),
            skill_name: skill.name.clone(),
            amount,
            levels_reached,
        })
    }
}

/// Skills every new agent starts with.
pub fn default_skills() -> Vec<Skill> {
    vec![
        Skill::new(
            "sk-1",
            "Data Analysis",
            "Reads figures and reports to surface trends",
            "chart",
        ),
        Skill::new(
            "sk-2",
            "Creative Synthesis",
            "Turns loose ideas into drafts and designs",
            "sparkles",
        ),
        Skill::new(
            "sk-3",
            "Contextual Memory",
            "Keeps long conversations coherent",
            "brain",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Skill {
        Skill::new("sk-1", "Data Analysis", "", "chart")
    }

    #[test]
    fn test_single_level_up() {
        let mut skill = fresh();
        assert_eq!(skill.apply_xp(120), vec![2]);
        assert_eq!((skill.level, skill.current_xp, skill.xp_required), (2, 20, 150));
    }

    #[test]
    fn test_award_250_reaches_level_three_exactly() {
        // 100 consumed to reach level 2, remaining 150 exactly meets the 150 boundary.
        let mut skill = fresh();
        assert_eq!(skill.apply_xp(250), vec![2, 3]);
        assert_eq!((skill.level, skill.current_xp, skill.xp_required), (3, 0, 225));
    }

    #[test]
    fn test_bulk_award_matches_sequential_awards() {
        let mut bulk = fresh();
        bulk.apply_xp(1_000);

        let mut stepwise = fresh();
        for _ in 0..100 {
            stepwise.apply_xp(10);
        }
        assert_eq!(bulk, stepwise);
    }

    #[test]
    fn test_xp_required_floors_growth() {
        let mut skill = fresh().with_xp_required(101);
        skill.apply_xp(101);
        assert_eq!(skill.xp_required, 151);
    }

    #[test]
    fn test_max_level_clamps_below_requirement() {
        let mut skill = fresh().with_max_level(3);
        skill.apply_xp(10_000);
        assert_eq!(skill.level, 3);
        assert!(skill.current_xp < skill.xp_required);

        let reached = skill.apply_xp(10_000);
        assert!(reached.is_empty());
        assert_eq!(skill.level, 3);
        assert!(skill.current_xp < skill.xp_required);
    }

    #[test]
    fn test_growth_saturates_on_huge_requirement() {
        let mut skill = fresh().with_max_level(5).with_xp_required(10_000_000_000_000_000_000);
        skill.current_xp = u64::MAX;
        assert_eq!(skill.apply_xp(0), vec![2]);
        assert_eq!(skill.xp_required, u64::MAX);
        assert!(skill.current_xp < skill.xp_required);
    }

    #[test]
    fn test_repaired_caps_corrupt_record() {
        let loaded = Skill {
            level: 0,
            max_level: u32::MAX,
            current_xp: u64::MAX,
            xp_required: 0,
            ..fresh()
        };
        let skill = loaded.repaired();
        assert_eq!(skill.max_level, MAX_SKILL_LEVEL);
        assert!(skill.level <= MAX_SKILL_LEVEL);
        assert!(skill.current_xp < skill.xp_required);
    }

    #[test]
    fn test_ledger_unknown_skill() {
        let mut ledger = SkillLedger::default();
        assert!(ledger.award("sk-404", 10).is_none());
        let award = ledger.award("sk-2", 100).unwrap();
        assert!(award.leveled_up());
        assert_eq!(award.skill_name, "Creative Synthesis");
    }
}

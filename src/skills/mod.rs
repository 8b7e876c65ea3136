//! Skill progression: per-skill ledger, global agent level, and keyword
//! triggers that feed them.
//!
//! ```text
//! text ──► triggers ──► SkillLedger ──(level × 100 per level-up)──► AgentLevel
//!                                                     direct awards ──┘
//! ```

pub mod ledger;
pub mod level;
pub mod triggers;

pub use ledger::{default_skills, Skill, SkillAward, SkillLedger, MAX_SKILL_LEVEL};
pub use level::{AgentLevel, LevelGain, XP_PER_LEVEL};
pub use triggers::{skill_triggers, SkillTriggerPolicy, TriggeredAward};

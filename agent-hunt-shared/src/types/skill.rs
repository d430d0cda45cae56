use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The primary skill an agent is listed under.
///
/// `Other` listings carry a free-text detail on the agent itself.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Skill {
    Trading,
    Research,
    Automation,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSkill(pub String);

impl fmt::Display for UnknownSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown skill: {}", self.0)
    }
}

impl std::error::Error for UnknownSkill {}

impl Skill {
    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::Trading => "TRADING",
            Skill::Research => "RESEARCH",
            Skill::Automation => "AUTOMATION",
            Skill::Other => "OTHER",
        }
    }

    /// Whether listings with this skill must carry an `other_skill_detail`.
    pub fn requires_detail(&self) -> bool {
        matches!(self, Skill::Other)
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Skill {
    type Err = UnknownSkill;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRADING" => Ok(Skill::Trading),
            "RESEARCH" => Ok(Skill::Research),
            "AUTOMATION" => Ok(Skill::Automation),
            "OTHER" => Ok(Skill::Other),
            _ => Err(UnknownSkill(s.to_string())),
        }
    }
}

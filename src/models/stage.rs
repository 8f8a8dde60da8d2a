use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stage names treated as terminal: entering one cancels scheduled
/// follow-ups and never schedules new ones.
pub const TERMINAL_STAGE_NAMES: [&str; 2] = ["hired", "not interested"];

/// Name of the locked, always-first stage seeded for every owner.
pub const INTAKE_STAGE_NAME: &str = "Intake";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Stage {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub position: i32,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        is_terminal_name(&self.name)
    }
}

pub fn is_terminal_name(name: &str) -> bool {
    let name = name.trim();
    TERMINAL_STAGE_NAMES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_names_are_case_insensitive() {
        assert!(is_terminal_name("Hired"));
        assert!(is_terminal_name("HIRED"));
        assert!(is_terminal_name("not interested"));
        assert!(is_terminal_name("Not Interested"));
        assert!(!is_terminal_name("Interview"));
        assert!(!is_terminal_name("Intake"));
    }
}

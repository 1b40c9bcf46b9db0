// Factions and target validity

use serde::{Deserialize, Serialize};

use crate::engine::physics::EntityId;

/// Faction tag carried by every character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Player,
    Enemy,
    /// Nobody targets neutrals; the dead end up here
    Neutral,
}

impl Team {
    pub fn is_hostile_to(self, other: Team) -> bool {
        matches!(
            (self, other),
            (Team::Player, Team::Enemy) | (Team::Enemy, Team::Player)
        )
    }
}

/// Whether `holder` may lock onto or execute `other`
pub fn is_valid_target(
    holder: EntityId,
    holder_team: Team,
    other: EntityId,
    other_team: Team,
) -> bool {
    holder != other && holder_team.is_hostile_to(other_team)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposing_teams_are_valid() {
        assert!(is_valid_target(0, Team::Player, 1, Team::Enemy));
        assert!(is_valid_target(1, Team::Enemy, 0, Team::Player));
    }

    #[test]
    fn test_same_team_and_self_are_invalid() {
        assert!(!is_valid_target(0, Team::Enemy, 1, Team::Enemy));
        assert!(!is_valid_target(0, Team::Player, 0, Team::Enemy));
    }

    #[test]
    fn test_neutral_is_never_valid() {
        for team in [Team::Player, Team::Enemy, Team::Neutral] {
            assert!(!is_valid_target(0, team, 1, Team::Neutral));
            assert!(!is_valid_target(0, Team::Neutral, 1, team));
        }
    }
}

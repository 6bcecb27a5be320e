use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{UserRole, UserSession};
use crate::error::ApiError;

/// Which slice of a member's data a request touches. Trainers see workout
/// data, nutritionists see diet data, and either assigned coach may read the
/// member's general data (profile, weight, check-ins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    Diet,
    Workout,
    General,
}

impl Discipline {
    pub const ALL: [Discipline; 3] = [Discipline::Diet, Discipline::Workout, Discipline::General];

    pub fn as_str(&self) -> &'static str {
        match self {
            Discipline::Diet => "diet",
            Discipline::Workout => "workout",
            Discipline::General => "general",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "diet" => Some(Discipline::Diet),
            "workout" => Some(Discipline::Workout),
            "general" => Some(Discipline::General),
            _ => None,
        }
    }
}

/// Snapshot of the assignment rows linking a requester to a target member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentState {
    pub trainer_of_member: bool,
    pub nutritionist_of_member: bool,
}

/// The central authorization decision. Pure so every (role, assignment-state)
/// combination can be tested without a database.
pub fn access_granted(
    role: UserRole,
    is_self: bool,
    assignments: AssignmentState,
    discipline: Discipline,
) -> bool {
    if is_self {
        return true;
    }

    match role {
        UserRole::Admin => true,
        UserRole::Trainer => {
            matches!(discipline, Discipline::Workout | Discipline::General)
                && assignments.trainer_of_member
        }
        UserRole::Nutritionist => {
            matches!(discipline, Discipline::Diet | Discipline::General)
                && assignments.nutritionist_of_member
        }
        UserRole::Member => false,
    }
}

/// The disciplines a requester may read on a member. Unfiltered list reads
/// must be restricted to this set so an assigned trainer never sees the
/// nutritionist's thread. Empty means no access at all.
pub fn visible_disciplines(
    role: UserRole,
    is_self: bool,
    assignments: AssignmentState,
) -> Vec<Discipline> {
    Discipline::ALL
        .into_iter()
        .filter(|discipline| access_granted(role, is_self, assignments, *discipline))
        .collect()
}

/// DB-backed wrapper around [`access_granted`]. Assignment rows are fetched
/// fresh on every call since assignments can change between requests.
#[derive(Debug, Clone)]
pub struct AccessControl {
    db: PgPool,
}

impl AccessControl {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Authorize `session` to touch `member_id`'s data for `discipline`.
    /// Runs before any existence check so a denial reveals nothing about
    /// whether the member exists.
    pub async fn authorize(
        &self,
        session: &UserSession,
        member_id: Uuid,
        discipline: Discipline,
    ) -> Result<(), ApiError> {
        let is_self = session.user_id == member_id;

        // Self and admin never need an assignment lookup.
        let assignments = if is_self || session.role == UserRole::Admin {
            AssignmentState::default()
        } else {
            self.assignment_state(session.user_id, member_id).await?
        };

        if access_granted(session.role, is_self, assignments, discipline) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    /// Authorize an unfiltered list read and return the disciplines the
    /// requester may see, denying outright when the set is empty.
    pub async fn authorize_visible(
        &self,
        session: &UserSession,
        member_id: Uuid,
    ) -> Result<Vec<Discipline>, ApiError> {
        let is_self = session.user_id == member_id;

        let assignments = if is_self || session.role == UserRole::Admin {
            AssignmentState::default()
        } else {
            self.assignment_state(session.user_id, member_id).await?
        };

        let visible = visible_disciplines(session.role, is_self, assignments);
        if visible.is_empty() {
            return Err(ApiError::Forbidden);
        }
        Ok(visible)
    }

    /// Authorize a write to member-owned, append-only data: the member
    /// themselves or an admin, never a coach.
    pub fn authorize_owner_write(
        &self,
        session: &UserSession,
        member_id: Uuid,
    ) -> Result<(), ApiError> {
        if session.user_id == member_id || session.role == UserRole::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    async fn assignment_state(
        &self,
        requester_id: Uuid,
        member_id: Uuid,
    ) -> Result<AssignmentState, ApiError> {
        let trainer_of_member = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM trainer_assignments WHERE member_id = $1 AND trainer_id = $2)",
        )
        .bind(member_id)
        .bind(requester_id)
        .fetch_one(&self.db)
        .await?;

        let nutritionist_of_member = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM nutritionist_assignments WHERE member_id = $1 AND nutritionist_id = $2)",
        )
        .bind(member_id)
        .bind(requester_id)
        .fetch_one(&self.db)
        .await?;

        Ok(AssignmentState {
            trainer_of_member,
            nutritionist_of_member,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_DISCIPLINES: [Discipline; 3] = Discipline::ALL;

    fn assigned_trainer() -> AssignmentState {
        AssignmentState {
            trainer_of_member: true,
            nutritionist_of_member: false,
        }
    }

    fn assigned_nutritionist() -> AssignmentState {
        AssignmentState {
            trainer_of_member: false,
            nutritionist_of_member: true,
        }
    }

    #[test]
    fn member_accesses_own_data_in_every_discipline() {
        for discipline in ALL_DISCIPLINES {
            assert!(access_granted(
                UserRole::Member,
                true,
                AssignmentState::default(),
                discipline
            ));
        }
    }

    #[test]
    fn member_never_accesses_another_members_data() {
        for discipline in ALL_DISCIPLINES {
            assert!(!access_granted(
                UserRole::Member,
                false,
                AssignmentState::default(),
                discipline
            ));
            // Stale assignment rows pointing at a member account change nothing.
            assert!(!access_granted(
                UserRole::Member,
                false,
                AssignmentState {
                    trainer_of_member: true,
                    nutritionist_of_member: true
                },
                discipline
            ));
        }
    }

    #[test]
    fn admin_accesses_everything() {
        for discipline in ALL_DISCIPLINES {
            assert!(access_granted(
                UserRole::Admin,
                false,
                AssignmentState::default(),
                discipline
            ));
        }
    }

    #[test]
    fn assigned_trainer_gets_workout_and_general_only() {
        assert!(access_granted(
            UserRole::Trainer,
            false,
            assigned_trainer(),
            Discipline::Workout
        ));
        assert!(access_granted(
            UserRole::Trainer,
            false,
            assigned_trainer(),
            Discipline::General
        ));
        assert!(!access_granted(
            UserRole::Trainer,
            false,
            assigned_trainer(),
            Discipline::Diet
        ));
    }

    #[test]
    fn unassigned_trainer_denied_everywhere() {
        for discipline in ALL_DISCIPLINES {
            assert!(!access_granted(
                UserRole::Trainer,
                false,
                AssignmentState::default(),
                discipline
            ));
        }
    }

    #[test]
    fn assigned_nutritionist_gets_diet_and_general_only() {
        assert!(access_granted(
            UserRole::Nutritionist,
            false,
            assigned_nutritionist(),
            Discipline::Diet
        ));
        assert!(access_granted(
            UserRole::Nutritionist,
            false,
            assigned_nutritionist(),
            Discipline::General
        ));
        assert!(!access_granted(
            UserRole::Nutritionist,
            false,
            assigned_nutritionist(),
            Discipline::Workout
        ));
    }

    #[test]
    fn cross_discipline_assignment_does_not_leak() {
        // A trainer assignment does not grant a nutritionist anything and
        // vice versa.
        assert!(!access_granted(
            UserRole::Nutritionist,
            false,
            assigned_trainer(),
            Discipline::Diet
        ));
        assert!(!access_granted(
            UserRole::Trainer,
            false,
            assigned_nutritionist(),
            Discipline::Workout
        ));
    }

    #[test]
    fn visible_disciplines_match_the_assignment() {
        assert_eq!(
            visible_disciplines(UserRole::Trainer, false, assigned_trainer()),
            vec![Discipline::Workout, Discipline::General]
        );
        assert_eq!(
            visible_disciplines(UserRole::Nutritionist, false, assigned_nutritionist()),
            vec![Discipline::Diet, Discipline::General]
        );
        assert_eq!(
            visible_disciplines(UserRole::Member, true, AssignmentState::default()),
            ALL_DISCIPLINES.to_vec()
        );
        assert!(
            visible_disciplines(UserRole::Trainer, false, AssignmentState::default()).is_empty()
        );
    }

    #[test]
    fn discipline_round_trips_through_strings() {
        for discipline in ALL_DISCIPLINES {
            assert_eq!(Discipline::from_str(discipline.as_str()), Some(discipline));
        }
        assert_eq!(Discipline::from_str("pilates"), None);
    }
}

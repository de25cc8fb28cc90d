//! # Lead Access Policy
//!
//! The single authorization module every handler consults. Lead visibility
//! and deal write rules live here as one rule table instead of being
//! re-derived per endpoint.
//!
//! Callers must resolve existence first: a missing lead is reported
//! not-found before this predicate ever runs, so a non-existent lead never
//! produces a forbidden response.

use uuid::Uuid;

use crate::models::Role;
use crate::models::user::Model as UserModel;

/// The requesting user, reduced to the fields the policy consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub team_id: Option<Uuid>,
}

impl From<&UserModel> for Actor {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id,
            role: user.role,
            team_id: user.team_id,
        }
    }
}

/// Ownership facts about a lead, with the owner's team already resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeadOwnership {
    pub owner_user_id: Option<Uuid>,
    pub owner_team_id: Option<Uuid>,
}

impl LeadOwnership {
    /// Build the ownership view from a lead's owner column and the owner row,
    /// when one exists.
    pub fn resolve(owner_user_id: Option<Uuid>, owner: Option<&UserModel>) -> Self {
        Self {
            owner_user_id,
            owner_team_id: owner.and_then(|user| user.team_id),
        }
    }
}

/// Read-path rule table, evaluated in order, first match wins:
///
/// | role                | condition                                           |
/// |---------------------|-----------------------------------------------------|
/// | admin / super_admin | always                                              |
/// | manager             | has team AND (lead unowned OR owner in same team)   |
/// | sales               | owns the lead                                       |
/// | marketing           | owns the lead                                       |
pub fn can_access_lead(actor: &Actor, lead: &LeadOwnership) -> bool {
    match actor.role {
        Role::Admin | Role::SuperAdmin => true,
        Role::Manager => match actor.team_id {
            Some(team_id) => {
                lead.owner_user_id.is_none() || lead.owner_team_id == Some(team_id)
            }
            None => false,
        },
        Role::Sales | Role::Marketing => lead.owner_user_id == Some(actor.id),
    }
}

/// Write-path variant for deleting a deal. Distinct from the read rule:
/// sales (and marketing, which mirrors it) must have CREATED the deal,
/// regardless of who owns the underlying lead. Managers fall back to the
/// lead read rule.
pub fn can_delete_deal(actor: &Actor, deal_created_by: Uuid, lead: &LeadOwnership) -> bool {
    match actor.role {
        Role::Admin | Role::SuperAdmin => true,
        Role::Manager => can_access_lead(actor, lead),
        Role::Sales | Role::Marketing => deal_created_by == actor.id,
    }
}

/// Query scope for list endpoints, derived from the same rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadScope {
    /// Admins see everything.
    All,
    /// Managers see unowned leads plus leads owned by members of this team.
    TeamOrUnowned(Uuid),
    /// Sales and marketing see leads they own.
    OwnedBy(Uuid),
    /// A manager with no team sees nothing.
    Nothing,
}

pub fn lead_scope(actor: &Actor) -> LeadScope {
    match actor.role {
        Role::Admin | Role::SuperAdmin => LeadScope::All,
        Role::Manager => match actor.team_id {
            Some(team_id) => LeadScope::TeamOrUnowned(team_id),
            None => LeadScope::Nothing,
        },
        Role::Sales | Role::Marketing => LeadScope::OwnedBy(actor.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, team_id: Option<Uuid>) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
            team_id,
        }
    }

    fn owned_by(owner: Uuid, team: Option<Uuid>) -> LeadOwnership {
        LeadOwnership {
            owner_user_id: Some(owner),
            owner_team_id: team,
        }
    }

    const UNOWNED: LeadOwnership = LeadOwnership {
        owner_user_id: None,
        owner_team_id: None,
    };

    #[test]
    fn admins_always_pass() {
        for role in [Role::Admin, Role::SuperAdmin] {
            let actor = actor(role, None);
            assert!(can_access_lead(&actor, &UNOWNED));
            assert!(can_access_lead(
                &actor,
                &owned_by(Uuid::new_v4(), Some(Uuid::new_v4()))
            ));
        }
    }

    #[test]
    fn sales_access_iff_owner() {
        let sales = actor(Role::Sales, None);

        assert!(can_access_lead(&sales, &owned_by(sales.id, None)));
        assert!(!can_access_lead(&sales, &owned_by(Uuid::new_v4(), None)));
        // Unowned leads are not visible to sales
        assert!(!can_access_lead(&sales, &UNOWNED));
    }

    #[test]
    fn marketing_mirrors_sales() {
        let marketing = actor(Role::Marketing, Some(Uuid::new_v4()));

        assert!(can_access_lead(&marketing, &owned_by(marketing.id, None)));
        assert!(!can_access_lead(&marketing, &owned_by(Uuid::new_v4(), None)));
        assert!(!can_access_lead(&marketing, &UNOWNED));
    }

    #[test]
    fn manager_needs_team_and_co_membership() {
        let team = Uuid::new_v4();
        let manager = actor(Role::Manager, Some(team));

        // Unowned lead is visible
        assert!(can_access_lead(&manager, &UNOWNED));
        // Owner in the same team is visible
        assert!(can_access_lead(
            &manager,
            &owned_by(Uuid::new_v4(), Some(team))
        ));
        // Owner in another team is not
        assert!(!can_access_lead(
            &manager,
            &owned_by(Uuid::new_v4(), Some(Uuid::new_v4()))
        ));
        // Owner without any team is not co-member
        assert!(!can_access_lead(&manager, &owned_by(Uuid::new_v4(), None)));
    }

    #[test]
    fn manager_without_team_sees_nothing() {
        let manager = actor(Role::Manager, None);

        assert!(!can_access_lead(&manager, &UNOWNED));
        assert!(!can_access_lead(
            &manager,
            &owned_by(Uuid::new_v4(), Some(Uuid::new_v4()))
        ));
        assert!(!can_access_lead(&manager, &owned_by(manager.id, None)));
        assert_eq!(lead_scope(&manager), LeadScope::Nothing);
    }

    #[test]
    fn deal_delete_is_creator_only_for_sales() {
        let sales = actor(Role::Sales, None);
        let lead = owned_by(sales.id, None);

        // Owning the lead is not enough; the deal must be theirs
        assert!(!can_delete_deal(&sales, Uuid::new_v4(), &lead));
        assert!(can_delete_deal(&sales, sales.id, &lead));
    }

    #[test]
    fn deal_delete_marketing_mirrors_sales() {
        let marketing = actor(Role::Marketing, None);

        assert!(can_delete_deal(&marketing, marketing.id, &UNOWNED));
        assert!(!can_delete_deal(&marketing, Uuid::new_v4(), &UNOWNED));
    }

    #[test]
    fn deal_delete_manager_follows_lead_rule() {
        let team = Uuid::new_v4();
        let manager = actor(Role::Manager, Some(team));
        let creator = Uuid::new_v4();

        assert!(can_delete_deal(
            &manager,
            creator,
            &owned_by(Uuid::new_v4(), Some(team))
        ));
        assert!(!can_delete_deal(
            &manager,
            creator,
            &owned_by(Uuid::new_v4(), Some(Uuid::new_v4()))
        ));
    }

    #[test]
    fn deal_delete_admin_always_passes() {
        let admin = actor(Role::Admin, None);
        assert!(can_delete_deal(&admin, Uuid::new_v4(), &UNOWNED));
    }

    #[test]
    fn scopes_match_rule_table() {
        let team = Uuid::new_v4();

        assert_eq!(lead_scope(&actor(Role::Admin, None)), LeadScope::All);
        assert_eq!(lead_scope(&actor(Role::SuperAdmin, Some(team))), LeadScope::All);
        assert_eq!(
            lead_scope(&actor(Role::Manager, Some(team))),
            LeadScope::TeamOrUnowned(team)
        );

        let sales = actor(Role::Sales, None);
        assert_eq!(lead_scope(&sales), LeadScope::OwnedBy(sales.id));

        let marketing = actor(Role::Marketing, Some(team));
        assert_eq!(lead_scope(&marketing), LeadScope::OwnedBy(marketing.id));
    }
}

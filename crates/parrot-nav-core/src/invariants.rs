use super::state::NavState;
use super::state::Role;
use super::state::SpaceId;
use super::state::TabClass;
use super::state::TabId;
use super::state::UrlProjection;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("personal tab {tab} is scoped to space {space}")]
    PersonalTabScoped { tab: TabId, space: SpaceId },
    #[error("admin-only tab {tab} is scoped to space {space}")]
    AdminTabScoped { tab: TabId, space: SpaceId },
    #[error("role {role} reached admin-only tab {tab}")]
    RoleEscalation { role: Role, tab: TabId },
    #[error("selected company {selected:?} diverged from current space {current:?}")]
    CompanyMirrorDiverged {
        current: Option<SpaceId>,
        selected: Option<SpaceId>,
    },
    #[error("url shows {shown:?} but state projects {expected:?}")]
    UrlOutOfSync {
        shown: UrlProjection,
        expected: UrlProjection,
    },
}

/// Checks the settled-state guarantees tab-content components rely on.
/// Nothing is required of the URL until one has been observed or pushed.
pub fn check_invariants(state: &NavState) -> Result<(), InvariantViolation> {
    let nav = &state.nav;
    let tab = nav.active_tab;

    if let Some(space) = nav.current_space_id.as_ref() {
        match tab.class() {
            TabClass::Personal => {
                return Err(InvariantViolation::PersonalTabScoped {
                    tab,
                    space: space.clone(),
                });
            }
            TabClass::AdminOnly if tab != TabId::Admin => {
                return Err(InvariantViolation::AdminTabScoped {
                    tab,
                    space: space.clone(),
                });
            }
            _ => {}
        }
    }

    if let Some(session) = state.session() {
        if !session.role.can_access(tab, nav.current_space_id.as_ref()) {
            return Err(InvariantViolation::RoleEscalation {
                role: session.role,
                tab,
            });
        }
    }

    if nav.selected_company != nav.current_space_id {
        return Err(InvariantViolation::CompanyMirrorDiverged {
            current: nav.current_space_id.clone(),
            selected: nav.selected_company.clone(),
        });
    }

    if let Some(shown) = state.location.as_ref() {
        let expected = nav.projection();
        if shown != &expected {
            return Err(InvariantViolation::UrlOutOfSync {
                shown: shown.clone(),
                expected,
            });
        }
    }

    Ok(())
}

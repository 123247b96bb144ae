use pretty_assertions::assert_eq;

pub(super) use super::reduce;
pub(super) use crate::actions::NavAction;
pub(super) use crate::invariants::check_invariants;
pub(super) use crate::query::ObservedQuery;
pub(super) use crate::reducer::NavEffect;
pub(super) use crate::state::LogLevel;
pub(super) use crate::state::NavSettings;
pub(super) use crate::state::NavState;
pub(super) use crate::state::NavigationMode;
pub(super) use crate::state::NavigationState;
pub(super) use crate::state::Role;
pub(super) use crate::state::Session;
pub(super) use crate::state::SessionStatus;
pub(super) use crate::state::SpaceId;
pub(super) use crate::state::TabId;

mod tab_requests;

fn space(raw: &str) -> SpaceId {
    SpaceId::parse(raw).expect("space id")
}

fn session(role: Role, company: Option<&str>) -> Session {
    Session {
        user_id: format!("{role}-1"),
        role,
        company_id: company.map(space),
    }
}

fn state_for(role: Role, company: Option<&str>) -> NavState {
    NavState::with_session(session(role, company))
}

/// Puts the state where a previous navigation has fully settled.
fn settle(state: &mut NavState, tab: TabId, space_id: Option<&str>) {
    state.nav = NavigationState::scoped(tab, space_id.map(space));
    state.location = Some(state.nav.projection());
    state.intents.clear();
}

fn navigations(effects: &[NavEffect]) -> Vec<(NavigationMode, String)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            NavEffect::Navigate { mode, url, .. } => Some((*mode, url.clone())),
            NavEffect::RedirectToSignIn => None,
        })
        .collect()
}

fn single_navigation(effects: &[NavEffect]) -> (NavigationMode, String) {
    let navs = navigations(effects);
    assert_eq!(navs.len(), 1, "expected exactly one navigation: {effects:?}");
    navs.into_iter().next().expect("navigation")
}

/// Feeds every emitted URL back as the router would, returning whatever the
/// echoes produce.
fn echo(state: &mut NavState, effects: &[NavEffect]) -> Vec<NavEffect> {
    navigations(effects)
        .into_iter()
        .flat_map(|(_, url)| reduce(state, NavAction::observe(&url)))
        .collect()
}

fn assert_nav(state: &NavState, tab: TabId, space_id: Option<&str>) {
    assert_eq!(state.nav, NavigationState::scoped(tab, space_id.map(space)));
    assert_eq!(check_invariants(state), Ok(()));
}

fn logged(state: &NavState, level: LogLevel) -> bool {
    state.logs.iter().any(|entry| entry.level == level)
}

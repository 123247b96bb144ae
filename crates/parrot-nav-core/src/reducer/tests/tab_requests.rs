use super::*;
use pretty_assertions::assert_eq;

#[test]
fn personal_tab_clears_space_and_pushes() {
    let mut state = state_for(Role::User, Some("s1"));
    settle(&mut state, TabId::Projects, Some("s1"));

    let effects = reduce(&mut state, NavAction::select_tab(TabId::UserSettings));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Push, "?tab=user-settings".to_string())
    );
    assert_nav(&state, TabId::UserSettings, None);
}

#[test]
fn unauthorized_admin_tab_redirects_home_with_warning() {
    let mut state = state_for(Role::User, Some("s1"));
    settle(&mut state, TabId::Projects, Some("s1"));

    let effects = reduce(&mut state, NavAction::select_tab(TabId::Companies));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Replace, "?tab=dashboard&space=s1".to_string())
    );
    assert_nav(&state, TabId::Dashboard, Some("s1"));
    assert!(logged(&state, LogLevel::Warn));
}

#[test]
fn unauthorized_tab_without_home_space_lands_on_personal_dashboard() {
    let mut state = state_for(Role::Internal, None);
    settle(&mut state, TabId::Forms, None);

    let effects = reduce(&mut state, NavAction::select_tab(TabId::Spaces));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Replace, "?tab=user-dashboard".to_string())
    );
    assert_nav(&state, TabId::UserDashboard, None);
}

#[test]
fn admin_tab_keeps_current_space() {
    let mut state = state_for(Role::Admin, None);
    settle(&mut state, TabId::Projects, Some("s1"));

    let effects = reduce(&mut state, NavAction::select_tab(TabId::Admin));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Push, "?tab=admin&space=s1".to_string())
    );
    assert_nav(&state, TabId::Admin, Some("s1"));
}

#[test]
fn other_admin_tabs_clear_current_space() {
    let mut state = state_for(Role::Admin, None);
    settle(&mut state, TabId::Projects, Some("s1"));

    let effects = reduce(&mut state, NavAction::select_tab(TabId::ProjectOverview));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Push, "?tab=project-overview".to_string())
    );
    assert_nav(&state, TabId::ProjectOverview, None);
}

#[test]
fn manager_without_space_cannot_open_admin_tab() {
    let mut state = state_for(Role::Manager, Some("s2"));
    settle(&mut state, TabId::UserDashboard, None);

    let effects = reduce(&mut state, NavAction::select_tab(TabId::Admin));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Replace, "?tab=dashboard&space=s2".to_string())
    );
    assert_nav(&state, TabId::Dashboard, Some("s2"));
}

#[test]
fn manager_never_reaches_companies_even_inside_a_space() {
    let mut state = state_for(Role::Manager, Some("s2"));
    settle(&mut state, TabId::Projects, Some("s3"));

    reduce(&mut state, NavAction::select_tab(TabId::Companies));

    assert_nav(&state, TabId::Dashboard, Some("s2"));
}

#[test]
fn forms_for_admin_without_space_stays_unscoped() {
    let mut state = state_for(Role::Admin, None);
    settle(&mut state, TabId::Spaces, None);

    let effects = reduce(&mut state, NavAction::select_tab(TabId::Forms));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Push, "?tab=forms".to_string())
    );
    assert_nav(&state, TabId::Forms, None);
}

#[test]
fn space_required_tab_adopts_home_space_for_non_admin() {
    let mut state = state_for(Role::Internal, Some("s4"));
    settle(&mut state, TabId::UserDashboard, None);

    let effects = reduce(&mut state, NavAction::select_tab(TabId::Documents));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Push, "?tab=documents&space=s4".to_string())
    );
    assert_nav(&state, TabId::Documents, Some("s4"));
}

#[test]
fn space_required_tab_without_space_sends_admin_to_picker() {
    let mut state = state_for(Role::Admin, None);
    settle(&mut state, TabId::Reports, None);

    let effects = reduce(&mut state, NavAction::select_tab(TabId::CompanyCalendars));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Replace, "?tab=spaces".to_string())
    );
    assert_nav(&state, TabId::Spaces, None);
}

#[test]
fn space_required_tab_without_any_space_sends_user_home() {
    let mut state = state_for(Role::User, None);
    settle(&mut state, TabId::UserSettings, None);

    reduce(&mut state, NavAction::select_tab(TabId::Services));

    assert_nav(&state, TabId::UserDashboard, None);
}

#[test]
fn settings_keeps_current_space() {
    let mut state = state_for(Role::Manager, Some("s2"));
    settle(&mut state, TabId::Projects, Some("s3"));

    let effects = reduce(&mut state, NavAction::select_tab(TabId::Settings));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Push, "?tab=settings&space=s3".to_string())
    );
    assert_nav(&state, TabId::Settings, Some("s3"));
}

#[test]
fn settings_without_space_sends_admin_to_picker() {
    let mut state = state_for(Role::Admin, None);
    settle(&mut state, TabId::Companies, None);

    reduce(&mut state, NavAction::select_tab(TabId::Settings));

    assert_nav(&state, TabId::Spaces, None);
}

#[test]
fn reports_run_without_a_space() {
    let mut state = state_for(Role::Admin, None);
    settle(&mut state, TabId::Projects, Some("s1"));

    let effects = reduce(&mut state, NavAction::select_tab(TabId::Reports));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Push, "?tab=reports".to_string())
    );
    assert_nav(&state, TabId::Reports, None);
}

#[test]
fn other_tabs_carry_the_current_space() {
    let mut state = state_for(Role::User, Some("s1"));
    settle(&mut state, TabId::Projects, Some("s1"));

    let effects = reduce(&mut state, NavAction::select_tab(TabId::Services));

    assert_eq!(
        single_navigation(&effects),
        (NavigationMode::Push, "?tab=services&space=s1".to_string())
    );
    assert_nav(&state, TabId::Services, Some("s1"));
}

#[test]
fn selecting_the_current_tab_is_a_no_op() {
    let mut state = state_for(Role::User, Some("s1"));
    settle(&mut state, TabId::Projects, Some("s1"));

    let effects = reduce(&mut state, NavAction::select_tab(TabId::Projects));

    assert!(effects.is_empty());
    assert_eq!(state.generation, 0);
}

#[test]
fn every_tab_commit_records_a_pending_intent() {
    let mut state = state_for(Role::Admin, None);
    settle(&mut state, TabId::Spaces, None);

    reduce(&mut state, NavAction::select_tab(TabId::Companies));
    reduce(&mut state, NavAction::select_tab(TabId::Debug));

    assert_eq!(state.intents.len(), 2);
    assert_eq!(state.generation, 2);
    assert_eq!(
        state.intents.newest().map(|intent| intent.projection.tab),
        Some(TabId::Debug)
    );
}

use super::actions::NavAction;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::query::render_projection;
use super::query::ObservedQuery;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::NavState;
use super::state::NavigationMode;
use super::state::NavigationState;
use super::state::PendingIntent;
use super::state::Session;
use super::state::SessionStatus;
use super::state::SpaceId;
use super::state::TabClass;
use super::state::TabId;
use super::state::UrlProjection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEffect {
    Navigate {
        mode: NavigationMode,
        url: String,
        projection: UrlProjection,
        generation: u64,
    },
    RedirectToSignIn,
}

pub fn reduce(state: &mut NavState, action: NavAction) -> Vec<NavEffect> {
    match action {
        NavAction::User(user) => reduce_user(state, user),
        NavAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn reduce_user(state: &mut NavState, action: UserAction) -> Vec<NavEffect> {
    let Some(session) = state.session().cloned() else {
        state.log(
            LogLevel::Debug,
            LogSource::User,
            None,
            "session not ready; ignoring navigation request",
        );
        return Vec::new();
    };

    match action {
        UserAction::SelectTab(tab) => request_tab_change(state, &session, tab),
        UserAction::SelectSpace(space) => request_space_change(state, &session, space),
    }
}

fn reduce_runtime(state: &mut NavState, action: RuntimeAction) -> Vec<NavEffect> {
    match action {
        RuntimeAction::ObserveUrl(query) => {
            let Some(session) = state.session().cloned() else {
                state.log(
                    LogLevel::Debug,
                    LogSource::Url,
                    None,
                    "session not ready; deferring url reconciliation",
                );
                return Vec::new();
            };
            reconcile_from_url(state, &session, &query)
        }
        RuntimeAction::SessionChanged(status) => apply_session(state, status),
    }
}

fn apply_session(state: &mut NavState, status: SessionStatus) -> Vec<NavEffect> {
    match status {
        SessionStatus::Loading => {
            state.session = SessionStatus::Loading;
            Vec::new()
        }
        SessionStatus::Unauthenticated => {
            let already_signed_out = matches!(state.session, SessionStatus::Unauthenticated);
            state.session = SessionStatus::Unauthenticated;
            state.reset_navigation();
            if already_signed_out {
                return Vec::new();
            }
            state.log(
                LogLevel::Info,
                LogSource::Session,
                None,
                "no session; redirecting to sign-in",
            );
            vec![NavEffect::RedirectToSignIn]
        }
        SessionStatus::Authenticated(session) => {
            if state.session().is_some_and(|current| current != &session) {
                state.reset_navigation();
                state.log(
                    LogLevel::Info,
                    LogSource::Session,
                    Some(session.user_id.as_str()),
                    "session changed; navigation reset",
                );
            }
            state.log(
                LogLevel::Debug,
                LogSource::Session,
                Some(session.user_id.as_str()),
                format!("signed in as {}", session.role),
            );
            state.session = SessionStatus::Authenticated(session);
            Vec::new()
        }
    }
}

fn request_tab_change(state: &mut NavState, session: &Session, tab: TabId) -> Vec<NavEffect> {
    let current_space = state.nav.current_space_id.clone();

    if !session.role.can_access(tab, current_space.as_ref()) {
        state.log(
            LogLevel::Warn,
            LogSource::User,
            Some(tab.as_str()),
            format!("{} may not open {tab}; redirecting home", session.role),
        );
        return commit(
            state,
            home_view(session),
            NavigationMode::Replace,
            LogSource::User,
        );
    }

    let placement = place_tab(session, tab, current_space);
    let mode = match placement.redirect {
        Some(reason) => {
            state.log(
                LogLevel::Info,
                LogSource::User,
                Some(tab.as_str()),
                format!("redirecting to {}: {reason}", placement.nav.active_tab),
            );
            NavigationMode::Replace
        }
        None => NavigationMode::Push,
    };
    commit(state, placement.nav, mode, LogSource::User)
}

fn request_space_change(
    state: &mut NavState,
    session: &Session,
    requested: Option<String>,
) -> Vec<NavEffect> {
    let Some(raw) = requested else {
        return exit_space(state, session);
    };

    match SpaceId::parse(&raw) {
        Ok(space) => commit(
            state,
            NavigationState::scoped(TabId::Dashboard, Some(space)),
            NavigationMode::Replace,
            LogSource::User,
        ),
        Err(err) => {
            state.log(
                LogLevel::Error,
                LogSource::User,
                Some(raw.as_str()),
                format!("rejected space change: {err}"),
            );
            Vec::new()
        }
    }
}

fn exit_space(state: &mut NavState, session: &Session) -> Vec<NavEffect> {
    if !session.role.is_admin() {
        state.log(
            LogLevel::Warn,
            LogSource::User,
            None,
            format!("{} cannot leave their space; returning home", session.role),
        );
        return commit(
            state,
            home_view(session),
            NavigationMode::Replace,
            LogSource::User,
        );
    }

    // An admin tab commit still waiting for its echo owns the URL; only the
    // space is dropped so the two navigations do not compete.
    let in_flight_admin_tab = state
        .intents
        .newest()
        .map(|intent| intent.projection.tab)
        .filter(|tab| tab.class() == TabClass::AdminOnly);
    let next = match in_flight_admin_tab {
        Some(tab) => {
            state.log(
                LogLevel::Debug,
                LogSource::User,
                Some(tab.as_str()),
                "admin tab transition in flight; clearing space only",
            );
            NavigationState::scoped(tab, None)
        }
        None => NavigationState::scoped(TabId::Spaces, None),
    };
    commit(state, next, NavigationMode::Replace, LogSource::User)
}

fn reconcile_from_url(
    state: &mut NavState,
    session: &Session,
    query: &ObservedQuery,
) -> Vec<NavEffect> {
    let observed_tab = interpret_tab(state, query);
    let observed_space = interpret_space(state, query);
    let observed = observed_tab.map(|tab| UrlProjection {
        tab,
        space: observed_space.clone(),
    });

    let canonical = observed.as_ref().is_some_and(|projection| {
        shows_canonical_params(query, projection, state.settings.legacy_company_param)
    });

    if let Some(projection) = observed.as_ref().filter(|_| canonical) {
        if let Some(generation) = state.intents.take_echo(projection) {
            state.log(
                LogLevel::Trace,
                LogSource::Url,
                Some(projection.tab.as_str()),
                format!("echo of generation {generation}"),
            );
            return Vec::new();
        }
    }

    if !state.intents.is_empty() {
        let superseded = state.intents.len();
        state.intents.clear();
        state.log(
            LogLevel::Debug,
            LogSource::Url,
            None,
            format!("external navigation supersedes {superseded} pending intent(s)"),
        );
    }
    // A URL that needs rewriting does not count as shown, so the commit
    // below always replaces it.
    state.location = observed.clone().filter(|_| canonical);

    let role = session.role;
    let placement = match observed_tab {
        Some(tab) if !role.can_access(tab, observed_space.as_ref()) => {
            state.log(
                LogLevel::Warn,
                LogSource::Url,
                Some(tab.as_str()),
                format!("{role} may not open {tab}; redirecting"),
            );
            Placement::redirect(TabId::UserDashboard, None, "unauthorized tab")
        }
        Some(TabId::Dashboard) if observed_space.is_none() && !role.is_admin() => {
            Placement::redirect(TabId::UserDashboard, None, "dashboard without a space")
        }
        None if !role.has_space_access() => {
            Placement::redirect(TabId::UserDashboard, None, "no tab requested")
        }
        Some(TabId::UserDashboard) if observed_space.is_some() && !role.has_space_access() => {
            Placement::redirect(TabId::UserDashboard, None, "stray space on personal dashboard")
        }
        Some(TabId::Spaces) if observed_space.is_some() => Placement::redirect(
            TabId::Dashboard,
            observed_space.clone(),
            "space picker linked with a space",
        ),
        _ => {
            let tab = observed_tab.unwrap_or_else(|| role.default_tab(observed_space.is_some()));
            place_tab(session, tab, observed_space.clone())
        }
    };

    let next = placement.nav;
    if canonical && observed.as_ref() == Some(&next.projection()) {
        if state.nav != next {
            state.log(
                LogLevel::Info,
                LogSource::Url,
                Some(next.active_tab.as_str()),
                "adopted external navigation",
            );
            state.nav = next;
        }
        return Vec::new();
    }

    if let Some(reason) = placement.redirect {
        state.log(
            LogLevel::Info,
            LogSource::Url,
            Some(next.active_tab.as_str()),
            format!("canonicalizing url: {reason}"),
        );
    } else if !canonical && observed.is_some() {
        state.log(
            LogLevel::Info,
            LogSource::Url,
            Some(next.active_tab.as_str()),
            "canonicalizing url: space parameters not in canonical form",
        );
    }
    commit(state, next, NavigationMode::Replace, LogSource::Url)
}

fn interpret_tab(state: &mut NavState, query: &ObservedQuery) -> Option<TabId> {
    let raw = query.tab.as_deref()?;
    if raw.trim().is_empty() {
        return None;
    }
    match raw.parse::<TabId>() {
        Ok(tab) => Some(tab),
        Err(err) => {
            state.log(
                LogLevel::Warn,
                LogSource::Url,
                Some(raw),
                format!("{err}; falling back to default tab"),
            );
            None
        }
    }
}

/// Whether the raw `space`/`company` parameters are exactly what
/// `render_projection` writes for `projection`.
fn shows_canonical_params(
    query: &ObservedQuery,
    projection: &UrlProjection,
    legacy: bool,
) -> bool {
    let param_is = |raw: Option<&str>, expected: Option<&SpaceId>| match (raw, expected) {
        (None, None) => true,
        (Some(raw), Some(expected)) => raw == expected.as_str(),
        _ => false,
    };
    let company = projection.space.as_ref().filter(|_| legacy);
    param_is(query.space.as_deref(), projection.space.as_ref())
        && param_is(query.company.as_deref(), company)
}

/// `space` wins over the legacy `company` alias; blank values are dropped.
fn interpret_space(state: &mut NavState, query: &ObservedQuery) -> Option<SpaceId> {
    let mut rejected = None;
    for raw in [query.space.as_deref(), query.company.as_deref()]
        .into_iter()
        .flatten()
    {
        match SpaceId::parse(raw) {
            Ok(space) => return Some(space),
            Err(err) => rejected = Some(err),
        }
    }
    if let Some(err) = rejected {
        state.log(
            LogLevel::Error,
            LogSource::Url,
            None,
            format!("ignoring space parameter: {err}"),
        );
    }
    None
}

struct Placement {
    nav: NavigationState,
    redirect: Option<&'static str>,
}

impl Placement {
    fn at(tab: TabId, space: Option<SpaceId>) -> Self {
        Self {
            nav: NavigationState::scoped(tab, space),
            redirect: None,
        }
    }

    fn redirect(tab: TabId, space: Option<SpaceId>, reason: &'static str) -> Self {
        Self {
            nav: NavigationState::scoped(tab, space),
            redirect: Some(reason),
        }
    }
}

/// Where `tab` lands given the space in view. Access has already been
/// checked by the caller.
fn place_tab(session: &Session, tab: TabId, space: Option<SpaceId>) -> Placement {
    match tab.class() {
        TabClass::Personal => Placement::at(tab, None),
        TabClass::AdminOnly if tab == TabId::Admin => Placement::at(tab, space),
        TabClass::AdminOnly => Placement::at(tab, None),
        TabClass::SpaceOptional if tab == TabId::Reports => Placement::at(tab, None),
        _ if space.is_some() => Placement::at(tab, space),
        TabClass::SpaceOptional => Placement::at(tab, adoptable_home(session)),
        TabClass::SpaceRequired => match adoptable_home(session) {
            Some(home) => Placement::at(tab, Some(home)),
            None if session.role.is_admin() => {
                Placement::redirect(TabId::Spaces, None, "pick a space first")
            }
            None => Placement::redirect(TabId::UserDashboard, None, "no home space"),
        },
    }
}

fn adoptable_home(session: &Session) -> Option<SpaceId> {
    if session.role.is_admin() {
        return None;
    }
    session.company_id.clone()
}

fn home_view(session: &Session) -> NavigationState {
    match session.company_id.clone() {
        Some(home) => NavigationState::scoped(TabId::Dashboard, Some(home)),
        None => NavigationState::scoped(TabId::UserDashboard, None),
    }
}

/// Applies `next` and emits a single navigation, unless state and URL are
/// already there.
fn commit(
    state: &mut NavState,
    next: NavigationState,
    mode: NavigationMode,
    source: LogSource,
) -> Vec<NavEffect> {
    let projection = next.projection();
    if state.nav == next && state.location.as_ref() == Some(&projection) {
        return Vec::new();
    }

    state.generation = state.generation.saturating_add(1);
    let generation = state.generation;
    state.intents.record(PendingIntent {
        generation,
        projection: projection.clone(),
    });
    state.location = Some(projection.clone());
    state.nav = next;

    let url = render_projection(&projection, state.settings.legacy_company_param);
    state.log(
        LogLevel::Debug,
        source,
        Some(projection.tab.as_str()),
        format!("{mode} {url}"),
    );
    vec![NavEffect::Navigate {
        mode,
        url,
        projection,
        generation,
    }]
}

#[cfg(test)]
mod tests;

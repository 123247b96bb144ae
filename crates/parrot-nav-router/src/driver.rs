use parrot_nav_core::reduce;
use parrot_nav_core::NavAction;
use parrot_nav_core::NavConfig;
use parrot_nav_core::NavEffect;
use parrot_nav_core::NavSettings;
use parrot_nav_core::NavState;
use parrot_nav_core::NavigationMode;
use parrot_nav_core::RuntimeAction;
use parrot_nav_core::SessionStatus;

use crate::contracts::Router;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    #[error("navigation did not settle after {rounds} echo round(s); router shows {url:?}")]
    LoopDetected { rounds: usize, url: String },
}

/// Runs the reducer against a live router: every navigation it emits is
/// applied and the resulting URL is fed back as an observation.
#[derive(Debug)]
pub struct NavigationDriver<R: Router> {
    state: NavState,
    router: R,
    max_echo_rounds: usize,
}

impl<R: Router> NavigationDriver<R> {
    pub fn new(state: NavState, router: R, max_echo_rounds: usize) -> Self {
        Self {
            state,
            router,
            max_echo_rounds,
        }
    }

    pub fn from_config(config: &NavConfig, router: R) -> Self {
        Self::new(
            NavState::new(NavSettings::from(config)),
            router,
            config.driver.max_echo_rounds,
        )
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Reduces `action` and settles the router. Returns every effect the
    /// reducer emitted along the way, echoes included.
    pub fn dispatch(&mut self, action: NavAction) -> Result<Vec<NavEffect>, DriverError> {
        let signed_in = matches!(
            &action,
            NavAction::Runtime(RuntimeAction::SessionChanged(SessionStatus::Authenticated(_)))
        );
        let mut effects = reduce(&mut self.state, action);
        if signed_in {
            // URL observations are deferred until a session exists.
            effects.extend(self.observe_current());
        }
        self.settle(effects)
    }

    /// Navigation typed into the address bar or followed from a link.
    pub fn open(&mut self, url: &str) -> Result<Vec<NavEffect>, DriverError> {
        self.router.push(url);
        let effects = self.observe_current();
        self.settle(effects)
    }

    /// Browser back button. Does nothing at the start of history.
    pub fn back(&mut self) -> Result<Vec<NavEffect>, DriverError> {
        if self.router.back().is_none() {
            return Ok(Vec::new());
        }
        let effects = self.observe_current();
        self.settle(effects)
    }

    pub fn forward(&mut self) -> Result<Vec<NavEffect>, DriverError> {
        if self.router.forward().is_none() {
            return Ok(Vec::new());
        }
        let effects = self.observe_current();
        self.settle(effects)
    }

    fn observe_current(&mut self) -> Vec<NavEffect> {
        let action = NavAction::observe(self.router.current().unwrap_or_default());
        reduce(&mut self.state, action)
    }

    fn settle(&mut self, mut pending: Vec<NavEffect>) -> Result<Vec<NavEffect>, DriverError> {
        let mut emitted = Vec::new();
        let mut rounds = 0;

        while !pending.is_empty() {
            if rounds == self.max_echo_rounds {
                let url = self.router.current().unwrap_or_default().to_string();
                tracing::error!(rounds, url = %url, "navigation loop detected");
                return Err(DriverError::LoopDetected { rounds, url });
            }
            rounds += 1;

            let mut echoes = Vec::new();
            for effect in pending.drain(..) {
                if let NavEffect::Navigate {
                    mode,
                    url,
                    generation,
                    ..
                } = &effect
                {
                    tracing::debug!(%mode, url = %url, generation, "router navigation");
                    match mode {
                        NavigationMode::Push => self.router.push(url),
                        NavigationMode::Replace => self.router.replace(url),
                    }
                    echoes.extend(self.observe_current());
                }
                emitted.push(effect);
            }
            pending = echoes;
        }
        Ok(emitted)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::DriverError;
    use super::NavigationDriver;
    use crate::contracts::Router;
    use crate::contracts::RouterOp;
    use crate::memory::MemoryRouter;
    use parrot_nav_core::check_invariants;
    use parrot_nav_core::NavAction;
    use parrot_nav_core::NavEffect;
    use parrot_nav_core::NavSettings;
    use parrot_nav_core::NavState;
    use parrot_nav_core::Role;
    use parrot_nav_core::Session;
    use parrot_nav_core::SessionStatus;
    use parrot_nav_core::SpaceId;
    use parrot_nav_core::TabId;

    fn session(role: Role, company: Option<&str>) -> Session {
        Session {
            user_id: format!("{}-1", role.as_str()),
            role,
            company_id: company.map(|raw| SpaceId::parse(raw).expect("space")),
        }
    }

    fn signed_in(
        role: Role,
        company: Option<&str>,
        router: MemoryRouter,
    ) -> NavigationDriver<MemoryRouter> {
        let mut driver = NavigationDriver::new(NavState::new(NavSettings::default()), router, 4);
        driver
            .dispatch(NavAction::session(SessionStatus::Authenticated(session(
                role, company,
            ))))
            .expect("sign in settles");
        driver
    }

    fn replace(url: &str) -> RouterOp {
        RouterOp::Replace(url.to_string())
    }

    fn push(url: &str) -> RouterOp {
        RouterOp::Push(url.to_string())
    }

    fn assert_at(driver: &NavigationDriver<MemoryRouter>, tab: TabId, space: Option<&str>) {
        let view = driver.state().view();
        assert_eq!(view.active_tab, tab);
        assert_eq!(view.space.map(SpaceId::as_str), space);
        assert_eq!(check_invariants(driver.state()), Ok(()));
    }

    /// Router that drops the query string, so no URL ever matches state.
    struct LossyRouter {
        ops: usize,
    }

    impl Router for LossyRouter {
        fn push(&mut self, _url: &str) {
            self.ops += 1;
        }

        fn replace(&mut self, _url: &str) {
            self.ops += 1;
        }

        fn current(&self) -> Option<&str> {
            Some("/dashboard")
        }

        fn back(&mut self) -> Option<&str> {
            None
        }

        fn forward(&mut self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn cold_start_canonicalizes_url_for_admin() {
        let driver = signed_in(Role::Admin, None, MemoryRouter::new());
        assert_at(&driver, TabId::Spaces, None);
        assert_eq!(driver.router().ops(), [replace("?tab=spaces")]);
        assert!(driver.state().intents.is_empty());
    }

    #[test]
    fn admin_tab_in_space_settles_with_one_push() {
        let mut driver = signed_in(Role::Admin, None, MemoryRouter::new());
        driver
            .dispatch(NavAction::select_space("space-3"))
            .expect("space settles");
        let effects = driver
            .dispatch(NavAction::select_tab(TabId::Admin))
            .expect("tab settles");

        assert_eq!(effects.len(), 1);
        assert_at(&driver, TabId::Admin, Some("space-3"));
        assert_eq!(
            driver.router().ops(),
            [
                replace("?tab=spaces"),
                replace("?tab=dashboard&space=space-3"),
                push("?tab=admin&space=space-3"),
            ]
        );
    }

    #[test]
    fn back_and_forward_are_adopted_without_navigation() {
        let mut driver = signed_in(Role::Admin, None, MemoryRouter::new());
        driver
            .dispatch(NavAction::select_space("space-3"))
            .expect("space settles");
        driver
            .dispatch(NavAction::select_tab(TabId::Admin))
            .expect("tab settles");

        assert_eq!(driver.back().expect("back settles"), Vec::new());
        assert_at(&driver, TabId::Dashboard, Some("space-3"));

        assert_eq!(driver.forward().expect("forward settles"), Vec::new());
        assert_at(&driver, TabId::Admin, Some("space-3"));

        assert_eq!(driver.forward().expect("no forward entry"), Vec::new());
        assert_eq!(driver.router().ops().len(), 5);
    }

    #[test]
    fn deep_link_is_resolved_once_the_session_arrives() {
        let router = MemoryRouter::at("/dashboard?tab=forms");
        let driver = signed_in(Role::User, Some("space-5"), router);

        assert_at(&driver, TabId::Forms, Some("space-5"));
        assert_eq!(driver.router().ops(), [replace("?tab=forms&space=space-5")]);
        assert_eq!(driver.router().history().len(), 1);
    }

    #[test]
    fn forbidden_link_is_replaced_in_history() {
        let mut driver = signed_in(Role::User, None, MemoryRouter::new());
        driver.open("?tab=debug").expect("link settles");

        assert_at(&driver, TabId::UserDashboard, None);
        assert_eq!(driver.router().current(), Some("?tab=user-dashboard"));
        assert_eq!(
            driver.router().ops()[1..].to_vec(),
            vec![push("?tab=debug"), replace("?tab=user-dashboard")]
        );
    }

    #[test]
    fn legacy_company_links_are_rewritten_to_canonical_urls() {
        let mut driver = signed_in(Role::Admin, None, MemoryRouter::new());

        let effects = driver
            .open("?tab=projects&space=s1&company=s2")
            .expect("link settles");
        assert_eq!(effects.len(), 1);
        assert_eq!(driver.router().current(), Some("?tab=projects&space=s1"));
        assert_at(&driver, TabId::Projects, Some("s1"));

        driver.open("?tab=projects&company=s2").expect("link settles");
        assert_eq!(driver.router().current(), Some("?tab=projects&space=s2"));
        assert_at(&driver, TabId::Projects, Some("s2"));
        assert_eq!(
            driver.router().ops().last().map(RouterOp::label),
            Some("replace")
        );
    }

    #[test]
    fn sign_out_is_reported_without_touching_the_router() {
        let mut driver = signed_in(Role::Manager, Some("space-2"), MemoryRouter::new());
        let ops_before = driver.router().ops().len();
        let effects = driver
            .dispatch(NavAction::session(SessionStatus::Unauthenticated))
            .expect("sign out settles");

        assert_eq!(effects, vec![NavEffect::RedirectToSignIn]);
        assert_eq!(driver.router().ops().len(), ops_before);
        assert_eq!(driver.state().session(), None);
    }

    #[test]
    fn router_that_never_echoes_is_reported_as_a_loop() {
        let mut driver = NavigationDriver::new(
            NavState::new(NavSettings::default()),
            LossyRouter { ops: 0 },
            3,
        );
        let err = driver
            .dispatch(NavAction::session(SessionStatus::Authenticated(session(
                Role::User,
                None,
            ))))
            .expect_err("lossy router loops");

        assert_eq!(
            err,
            DriverError::LoopDetected {
                rounds: 3,
                url: "/dashboard".to_string(),
            }
        );
        assert_eq!(driver.router().ops, 3);
    }
}

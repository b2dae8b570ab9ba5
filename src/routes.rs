use crate::session::{Session, SessionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Calculator,
    History,
    Identity,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::Register => write!(f, "register"),
            Self::Calculator => write!(f, "calculator"),
            Self::History => write!(f, "history"),
            Self::Identity => write!(f, "identity"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(View),
    /// Neutral placeholder while the startup probe is unresolved.
    Placeholder,
    /// Replacing navigation: the abandoned destination must not grow
    /// history, or the back button loops.
    RedirectReplace(View),
}

/// Admission for views that require an authenticated session.
/// Checking yields a placeholder rather than a redirect, so an
/// about-to-be-authenticated user is not bounced to the login view.
pub fn private_route(session: &Session, view: View) -> RouteDecision {
    match session.status {
        SessionStatus::Checking => RouteDecision::Placeholder,
        SessionStatus::Anonymous => RouteDecision::RedirectReplace(View::Login),
        SessionStatus::Authenticated => RouteDecision::Render(view),
    }
}

/// Admission for views that only make sense logged out.
pub fn public_route(session: &Session, view: View) -> RouteDecision {
    match session.status {
        SessionStatus::Checking => RouteDecision::Placeholder,
        SessionStatus::Authenticated => RouteDecision::RedirectReplace(View::Calculator),
        SessionStatus::Anonymous => RouteDecision::Render(view),
    }
}

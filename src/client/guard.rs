//! Route guard: admits or redirects navigation based on the persisted session

use super::session::SessionContext;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
/// Where a login without a usable `redirect` lands
pub const DEFAULT_LANDING: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Admit,
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    public_paths: Vec<String>,
    login_path: String,
    default_landing: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            public_paths: vec!["/".to_string(), LOGIN_PATH.to_string(), REGISTER_PATH.to_string()],
            login_path: LOGIN_PATH.to_string(),
            default_landing: DEFAULT_LANDING.to_string(),
        }
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// A same-origin absolute path: `/x` but not `//host` or `/\host`
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(|c| c.is_control())
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path = strip_query(path);
        self.public_paths.iter().any(|p| p == path)
    }

    /// Decides whether `path` may render for the current session
    pub fn check(&self, path: &str, session: &SessionContext) -> Navigation {
        if self.is_public(path) || session.is_authenticated() {
            Navigation::Admit
        } else {
            Navigation::Redirect(self.login_redirect(path))
        }
    }

    /// `/login?redirect=<path>`, keeping the requested path for after sign-in
    pub fn login_redirect(&self, original_path: &str) -> String {
        if !is_local_path(original_path) || self.is_public(original_path) {
            return self.login_path.clone();
        }
        format!(
            "{}?redirect={}",
            self.login_path,
            urlencoding::encode(original_path)
        )
    }

    /// Where to go after a successful login, given the `redirect` query value.
    ///
    /// Anything that isn't a local path falls back to the default landing so
    /// the parameter can't be used to bounce users to another site.
    pub fn post_login_target(&self, redirect_param: Option<&str>) -> String {
        redirect_param
            .and_then(|raw| urlencoding::decode(raw).ok())
            .map(|decoded| decoded.into_owned())
            .filter(|path| is_local_path(path) && strip_query(path) != self.login_path)
            .unwrap_or_else(|| self.default_landing.clone())
    }

    /// Extracts the raw `redirect` value from a login URL or query string
    pub fn redirect_param(url: &str) -> Option<&str> {
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or(url);
        let query = query.split('#').next().unwrap_or(query);
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "redirect")
            .map(|(_, value)| value)
    }
}

//! Navigation seam between the client and whatever presents it.

use std::sync::Mutex;

/// Application routes
pub mod routes {
    pub const LOGIN: &str = "/login";
    pub const SIGNUP: &str = "/signup";
    pub const DASHBOARD: &str = "/dashboard";
    pub const TRANSACTIONS: &str = "/transactions";
    pub const ANALYTICS: &str = "/analytics";
    pub const SETTINGS: &str = "/settings";
}

/// Login and signup pages
pub fn is_auth_page(path: &str) -> bool {
    path.starts_with(routes::LOGIN) || path.starts_with(routes::SIGNUP)
}

/// Something that knows the current route and can change it
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

/// Navigator that records every navigation in order
#[derive(Debug)]
pub struct RouteHistory {
    entries: Mutex<Vec<String>>,
}

impl RouteHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: Mutex::new(vec![initial.to_string()]),
        }
    }

    /// Every path visited, starting with the initial one
    pub fn history(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Paths navigated to after construction
    pub fn navigations(&self) -> Vec<String> {
        self.entries.lock().unwrap().iter().skip(1).cloned().collect()
    }
}

impl Navigator for RouteHistory {
    fn current_path(&self) -> String {
        self.entries
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    fn navigate(&self, path: &str) {
        self.entries.lock().unwrap().push(path.to_string());
    }
}

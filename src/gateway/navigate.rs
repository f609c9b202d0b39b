use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use log::{debug, info};

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Outside the authenticated area, where a login is required.
    Login,
    /// Inside the authenticated area.
    Home,
}

pub trait Navigator: Send + Sync {
    /// Moves to `to`. Navigating to the current location is a no-op and
    /// returns false.
    fn navigate(&self, to: Location) -> bool;

    fn current(&self) -> Location;
}

/// Tracks where the console currently is.
pub struct Router {
    location: Mutex<Location>,
    redirects: AtomicUsize,
}

impl Router {
    pub fn new(location: Location) -> Self {
        Self {
            location: Mutex::new(location),
            redirects: AtomicUsize::new(0),
        }
    }

    /// Starts inside the authenticated area only when a session is present.
    pub fn for_session(session: &Session) -> Self {
        if session.is_authenticated() {
            Self::new(Location::Home)
        } else {
            Self::new(Location::Login)
        }
    }

    /// Number of effective moves to [`Location::Login`].
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for Router {
    fn navigate(&self, to: Location) -> bool {
        let mut location = match self.location.lock() {
            Ok(location) => location,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *location == to {
            debug!("Already at {to:?}, skip navigation");
            return false;
        }

        *location = to;
        if to == Location::Login {
            self.redirects.fetch_add(1, Ordering::SeqCst);
            info!("Redirected to login");
        }
        true
    }

    fn current(&self) -> Location {
        match self.location.lock() {
            Ok(location) => *location,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_navigate_is_idempotent() {
        let router = Router::new(Location::Home);
        assert!(router.navigate(Location::Login));
        assert!(!router.navigate(Location::Login));
        assert_eq!(router.current(), Location::Login);
        assert_eq!(router.redirects(), 1);

        assert!(router.navigate(Location::Home));
        assert!(router.navigate(Location::Login));
        assert_eq!(router.redirects(), 2);
    }

    #[test]
    fn test_concurrent_redirects() {
        let router = Arc::new(Router::new(Location::Home));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let router = Arc::clone(&router);
                std::thread::spawn(move || router.navigate(Location::Login))
            })
            .collect();

        let moved = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|moved| *moved)
            .count();
        assert_eq!(moved, 1);
        assert_eq!(router.redirects(), 1);
    }
}

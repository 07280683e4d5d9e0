//! Gate for the protected command tree.
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    RedirectToLogin,
}

/// Synchronous check over ambient session state. The token is not verified
/// with the backend; a persisted token is trusted until a call fails.
pub fn check(session: &SessionStore) -> Access {
    if session.is_authenticated() {
        Access::Granted
    } else {
        Access::RedirectToLogin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn follows_the_session_lifecycle() {
        let td = tempdir().unwrap();
        let session = SessionStore::open(td.path()).unwrap();
        assert_eq!(check(&session), Access::RedirectToLogin);

        session.store("tok", &json!({ "id": 1 })).unwrap();
        assert_eq!(check(&session), Access::Granted);

        session.clear();
        assert_eq!(check(&session), Access::RedirectToLogin);
    }
}

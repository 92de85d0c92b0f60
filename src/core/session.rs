// Who's logged in.
//
// The user id lives in the store's preference table under the app namespace,
// so it survives restarts. Absent means nobody is logged in.

use crate::db::Database;
use crate::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub const SESSION_NAMESPACE: &str = "tododemo";
pub const USER_ID_KEY: &str = "userId";

#[derive(Clone)]
pub struct Session {
    db: Arc<Database>,
}

impl Session {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The logged-in user, if any
    ///
    /// A value that isn't an integer counts as no session rather than an error.
    pub async fn current_user_id(&self) -> Result<Option<i64>> {
        let raw = self
            .db
            .get_preference(SESSION_NAMESPACE, USER_ID_KEY)
            .await?;

        Ok(raw.and_then(|value| match value.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(value = %value, "ignoring malformed session user id");
                None
            }
        }))
    }

    pub async fn login(&self, user_id: i64) -> Result<()> {
        self.db
            .set_preference(SESSION_NAMESPACE, USER_ID_KEY, &user_id.to_string())
            .await?;
        info!(user_id, "logged in");
        Ok(())
    }

    // Safe to call with nobody logged in
    pub async fn logout(&self) -> Result<()> {
        self.db
            .remove_preference(SESSION_NAMESPACE, USER_ID_KEY)
            .await?;
        info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (Session, Arc<Database>) {
        let db = Arc::new(Database::new_test().await.unwrap());
        (Session::new(Arc::clone(&db)), db)
    }

    #[tokio::test]
    async fn test_no_session_by_default() {
        let (session, _db) = setup().await;
        assert_eq!(session.current_user_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_logout() {
        let (session, _db) = setup().await;

        session.login(7).await.unwrap();
        assert_eq!(session.current_user_id().await.unwrap(), Some(7));

        session.logout().await.unwrap();
        assert_eq!(session.current_user_id().await.unwrap(), None);

        // Second logout is a no-op
        tokio_test::assert_ok!(session.logout().await);
    }

    #[tokio::test]
    async fn test_malformed_user_id_is_absent() {
        let (session, db) = setup().await;

        db.set_preference(SESSION_NAMESPACE, USER_ID_KEY, "not-a-number")
            .await
            .unwrap();
        assert_eq!(session.current_user_id().await.unwrap(), None);
    }
}

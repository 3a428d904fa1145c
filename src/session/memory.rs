use crate::session::{Session, SessionStore};
use std::collections::HashMap;

#[derive(Default, Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: HashMap<String, Session>,
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, key: &str) -> Option<Session> {
        self.sessions.get(key).cloned()
    }

    async fn save(&mut self, key: &str, session: Session) {
        self.sessions.insert(key.to_string(), session);
    }
}

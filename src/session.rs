use crate::models::UserSnapshot;
use uuid::Uuid;

/// Session-scoped identity of the signed-in user.
///
/// The store denormalizes this snapshot into every post and comment it
/// creates; the session itself is owned by the embedding application's
/// authentication layer.
#[derive(Debug, Clone)]
pub struct Session {
    user: UserSnapshot,
}

impl Session {
    pub fn new(user: UserSnapshot) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &UserSnapshot {
        &self.user
    }

    pub fn user_id(&self) -> Uuid {
        self.user.user_id
    }
}

use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// A friendship row is stored once under its sorted pair, so the same
/// record is addressable no matter which member looks it up.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendshipEntity {
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub can_message: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub fn ordered_pair(user_id_a: Uuid, user_id_b: Uuid) -> (Uuid, Uuid) {
    if user_id_a <= user_id_b {
        (user_id_a, user_id_b)
    } else {
        (user_id_b, user_id_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_pair_ignores_argument_order() {
        let a = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let b = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        assert_eq!(ordered_pair(a, b), ordered_pair(b, a));
        let (first, second) = ordered_pair(a, b);
        assert!(first <= second);
    }
}

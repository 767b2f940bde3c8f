use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a session record stays in a user's session set before the
/// login-time pruning pass drops it. Matches the default token ttl.
pub const SESSION_LIFETIME_MINUTES: i64 = 120;

/// One issued bearer token together with the instant it was signed.
/// A user's session set is a `Vec<SessionToken>` in issuance order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionToken {
    pub token: String,
    pub signed_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn new(token: String, signed_at: DateTime<Utc>) -> Self {
        Self { token, signed_at }
    }
}

/// Removes every record signed longer than the session lifetime before `now`,
/// preserving the order of the survivors.
///
/// This runs only as a side effect of a login; there is no background sweep.
/// Stale records left behind for a user who never logs in again still fail
/// the token signature's own expiry check at request time.
pub fn prune_session_set(session_set: Vec<SessionToken>, now: DateTime<Utc>) -> Vec<SessionToken> {
    let lifetime = Duration::minutes(SESSION_LIFETIME_MINUTES);
    session_set
        .into_iter()
        .filter(|record| now - record.signed_at < lifetime)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(label: &str, signed_at: DateTime<Utc>) -> SessionToken {
        SessionToken::new(label.to_string(), signed_at)
    }

    #[test]
    fn test_prune_keeps_fresh_drops_stale() {
        let now = Utc::now();
        let set = vec![
            record("t1", now - Duration::minutes(10)),
            record("t2", now - Duration::hours(3)),
            record("t3", now - Duration::minutes(1)),
        ];

        let pruned = prune_session_set(set, now);

        assert_eq!(pruned.len(), 2);
        assert_eq!(pruned[0].token, "t1");
        assert_eq!(pruned[1].token, "t3");
    }

    #[rstest]
    #[case::just_inside(Duration::minutes(119), true)]
    #[case::exactly_at_boundary(Duration::minutes(120), false)]
    #[case::well_past(Duration::hours(5), false)]
    fn test_prune_boundary(#[case] age: Duration, #[case] kept: bool) {
        let now = Utc::now();
        let pruned = prune_session_set(vec![record("t", now - age)], now);
        assert_eq!(!pruned.is_empty(), kept);
    }

    #[test]
    fn test_prune_empty_set() {
        assert!(prune_session_set(Vec::new(), Utc::now()).is_empty());
    }

    #[test]
    fn test_prune_preserves_issuance_order() {
        let now = Utc::now();
        let set = vec![
            record("oldest", now - Duration::minutes(90)),
            record("middle", now - Duration::minutes(60)),
            record("newest", now - Duration::minutes(30)),
        ];

        let pruned = prune_session_set(set, now);
        let order: Vec<&str> = pruned.iter().map(|r| r.token.as_str()).collect();
        assert_eq!(order, vec!["oldest", "middle", "newest"]);
    }
}

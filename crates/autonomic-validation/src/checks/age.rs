use chrono::{DateTime, Utc};

use autonomic_core::config::ValidationPolicy;
use autonomic_core::RejectionReason;

/// Reject candidates pending for longer than `max_candidate_age_secs`.
/// A zero limit disables the check.
pub fn check_age(
    pending_since: DateTime<Utc>,
    now: DateTime<Utc>,
    policy: &ValidationPolicy,
) -> Option<RejectionReason> {
    if policy.max_candidate_age_secs == 0 {
        return None;
    }
    let age = now - pending_since;
    (age > policy.max_candidate_age()).then_some(RejectionReason::Expired {
        age_secs: age.num_seconds(),
        max_age_secs: policy.max_candidate_age_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expires_strictly_after_limit() {
        let policy = ValidationPolicy {
            max_candidate_age_secs: 60,
            ..ValidationPolicy::default()
        };
        let t0 = Utc::now();
        assert!(check_age(t0, t0 + Duration::seconds(60), &policy).is_none());
        assert!(check_age(t0, t0 + Duration::seconds(61), &policy).is_some());

        let disabled = ValidationPolicy {
            max_candidate_age_secs: 0,
            ..ValidationPolicy::default()
        };
        assert!(check_age(t0, t0 + Duration::days(400), &disabled).is_none());
    }

    #[test]
    fn limit_beyond_duration_range_never_expires() {
        let policy = ValidationPolicy {
            max_candidate_age_secs: u64::MAX,
            ..ValidationPolicy::default()
        };
        let t0 = Utc::now();
        assert!(check_age(t0, t0 + Duration::days(365 * 200), &policy).is_none());
    }
}

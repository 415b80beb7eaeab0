use chrono::{DateTime, Utc};

/// Per-user, per-target re-notification rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CooldownPolicy {
    pub cooldown_seconds: u64,
}

impl CooldownPolicy {
    pub fn new(cooldown_seconds: u64) -> Self {
        Self { cooldown_seconds }
    }

    /// Eligible when there is no prior notification, or when the whole
    /// seconds elapsed since it reach the cooldown.
    pub fn is_eligible(&self, last_notified: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(last) = last_notified else {
            return true;
        };
        if self.cooldown_seconds == 0 {
            return true;
        }
        let elapsed = (now - last).num_seconds();
        elapsed >= 0 && elapsed as u64 >= self.cooldown_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn no_history_is_always_eligible() {
        assert!(CooldownPolicy::new(3600).is_eligible(None, t0()));
    }

    #[test]
    fn exact_boundary_is_eligible() {
        let p = CooldownPolicy::new(3600);
        assert!(p.is_eligible(Some(t0()), t0() + Duration::seconds(3600)));
        assert!(!p.is_eligible(Some(t0()), t0() + Duration::seconds(3599)));
    }

    #[test]
    fn elapsed_is_truncated_to_whole_seconds() {
        let p = CooldownPolicy::new(10);
        let almost = t0() + Duration::milliseconds(9_999);
        assert!(!p.is_eligible(Some(t0()), almost));
    }

    #[test]
    fn zero_cooldown_always_notifies() {
        let p = CooldownPolicy::new(0);
        assert!(p.is_eligible(Some(t0()), t0()));
    }
}

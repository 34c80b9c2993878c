use chrono::{DateTime, Duration, Utc};

pub const MONTHLY_PERIOD_DAYS: i64 = 30;
pub const YEARLY_PERIOD_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanType {
    Monthly,
    Yearly,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Monthly => "monthly",
            PlanType::Yearly => "yearly",
        }
    }

    /// `month` maps to monthly; every other known recurring interval is
    /// billed yearly. An absent interval means the provider payload was
    /// unexpected and the plan cannot be determined.
    pub fn from_interval(interval: Option<&str>) -> Option<Self> {
        match interval {
            Some("month") => Some(PlanType::Monthly),
            Some(_) => Some(PlanType::Yearly),
            None => None,
        }
    }
}

/// Plan period boundaries are computed from our own clock, not the
/// provider's timestamps, to avoid clock-skew and proration artifacts.
/// The provider's period end is used only when the plan type could not
/// be determined at all.
pub fn compute_period(
    plan: Option<PlanType>,
    provider_period_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
    match plan {
        Some(PlanType::Monthly) => (now, Some(now + Duration::days(MONTHLY_PERIOD_DAYS))),
        Some(PlanType::Yearly) => (now, Some(now + Duration::days(YEARLY_PERIOD_DAYS))),
        None => (now, provider_period_end),
    }
}

use chrono::{DateTime, Utc};

use super::rules::RuleVersion;

/// Picks the single rule version in force at `at` from scope-filtered
/// candidates.
///
/// Keeps active candidates whose effective-from does not exceed `at`, then
/// takes the one with the greatest effective-from; ties break toward the
/// highest rule id, i.e. the most recently created version. Returns `None`
/// when nothing is in force, which callers read as "no surcharge" rather
/// than an error.
pub fn resolve_in_force<R: RuleVersion>(
    candidates: impl IntoIterator<Item = R>,
    at: DateTime<Utc>,
) -> Option<R> {
    candidates
        .into_iter()
        .filter(|rule| rule.active() && rule.effective_from() <= at)
        .max_by(|a, b| {
            a.effective_from()
                .cmp(&b.effective_from())
                .then_with(|| a.id().cmp(&b.id()))
        })
}

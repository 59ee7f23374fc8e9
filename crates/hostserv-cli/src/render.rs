//! Reply text printed by the `hostserv` commands.

use hostserv_vhost::{Assignment, Clearance, HostPattern, MatchScope, VhostError, VhostMatch};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

/// Width the listing pads account and nickname names to.
const NAME_WIDTH: usize = 30;

pub(crate) fn assigned(assignment: &Assignment) -> String {
    format!(
        "Assigned vhost {} to all nicks in account {}.",
        assignment.host(),
        assignment.account()
    )
}

pub(crate) fn cleared(clearance: &Clearance) -> String {
    format!("Deleted all vhosts for {}.", clearance.account())
}

pub(crate) fn failure(error: &VhostError) -> String {
    match error {
        VhostError::NoSuchTarget { target } => format!("{target} is not registered."),
        VhostError::InvalidHostname { reason, .. } => reason.to_string(),
    }
}

pub(crate) fn listing_line(entry: &VhostMatch, now: OffsetDateTime) -> String {
    let mut line = format!(
        "- {:<width$} {}",
        entry.display_name(),
        entry.host(),
        width = NAME_WIDTH
    );
    if entry.scope() == MatchScope::Nickname {
        return line;
    }
    let Some(provenance) = entry.provenance() else {
        return line;
    };

    line.push_str(" assigned");
    if let Some(assigned_at) = provenance.assigned_at() {
        let stamp = assigned_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| assigned_at.unix_timestamp().to_string());
        line.push_str(&format!(" on {stamp} ({} ago)", time_ago(now - assigned_at)));
    }
    if let Some(assigner) = provenance.assigner() {
        line.push_str(&format!(" by {assigner}"));
    }
    line
}

pub(crate) fn listing_summary(matches: usize, pattern: &HostPattern) -> String {
    match matches {
        0 => format!("No vhosts matched pattern {pattern}"),
        1 => format!("1 match for pattern {pattern}"),
        n => format!("{n} matches for pattern {pattern}"),
    }
}

/// Formats an elapsed time using its two most significant units.
///
/// Negative durations, from clocks that moved backwards, render as `0s`.
pub(crate) fn time_ago(elapsed: Duration) -> String {
    let clamped = elapsed.max(Duration::ZERO);
    let days = clamped.whole_days();
    let hours = (clamped - Duration::days(days)).whole_hours();
    let minutes = (clamped - Duration::days(days) - Duration::hours(hours)).whole_minutes();
    let seconds = (clamped
        - Duration::days(days)
        - Duration::hours(hours)
        - Duration::minutes(minutes))
    .whole_seconds();

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use hostserv_vhost::{
        AccountVhost, MemoryDirectory, MemoryVhostStore, Provenance, Rejection, VhostStore,
    };
    use rstest::rstest;
    use time::macros::datetime;

    use super::*;

    #[rstest]
    #[case::seconds(Duration::seconds(42), "42s")]
    #[case::minutes(Duration::seconds(125), "2m 5s")]
    #[case::hours(Duration::minutes(185), "3h 5m")]
    #[case::days(Duration::hours(50), "2d 2h")]
    #[case::future(Duration::seconds(-5), "0s")]
    fn formats_elapsed_time(#[case] elapsed: Duration, #[case] expected: &str) {
        assert_eq!(time_ago(elapsed), expected);
    }

    #[rstest]
    #[case::none(0, "No vhosts matched pattern *.net")]
    #[case::one(1, "1 match for pattern *.net")]
    #[case::many(3, "3 matches for pattern *.net")]
    fn summarises_listing(#[case] matches: usize, #[case] expected: &str) {
        assert_eq!(listing_summary(matches, &HostPattern::new("*.net")), expected);
    }

    #[rstest]
    #[case::unknown(
        VhostError::NoSuchTarget { target: "carol".into() },
        "carol is not registered."
    )]
    #[case::invalid(
        VhostError::InvalidHostname { host: "nodots".into(), reason: Rejection::MissingSeparator },
        "vhost must contain a '.', ':' or '/'"
    )]
    fn failure_replies(#[case] error: VhostError, #[case] expected: &str) {
        assert_eq!(failure(&error), expected);
    }

    fn listed(vhost: AccountVhost) -> Vec<VhostMatch> {
        let mut directory = MemoryDirectory::new();
        directory.register_account("alice").expect("register alice");
        directory
            .register_nickname("alice", "alice2")
            .expect("register alice2");
        let store = MemoryVhostStore::new();
        store.store_account_vhost(&hostserv_vhost::AccountName::new("alice"), vhost);
        store.set_nickname_vhost("alice2", "special.example.net");
        hostserv_vhost::VhostEngine::new(directory, store)
            .list_vhosts("*")
            .collect()
    }

    #[test]
    fn account_line_includes_provenance() {
        let entries = listed(AccountVhost::new(
            "staff.example.net",
            Provenance::recorded(datetime!(2024-03-01 12:00 UTC), "oper"),
        ));
        let now = datetime!(2024-03-01 15:30 UTC);

        let lines: Vec<String> = entries.iter().map(|e| listing_line(e, now)).collect();
        assert_eq!(
            lines,
            [
                format!(
                    "- {:<30} staff.example.net assigned on 2024-03-01T12:00:00Z (3h 30m ago) by oper",
                    "alice"
                ),
                format!("- {:<30} special.example.net", "alice2"),
            ]
        );
    }

    #[test]
    fn account_line_without_provenance_is_bare() {
        let entries = listed(AccountVhost::new("legacy.example.net", Provenance::default()));
        let line = entries
            .first()
            .map(|e| listing_line(e, OffsetDateTime::UNIX_EPOCH))
            .expect("account listed");
        assert_eq!(line, format!("- {:<30} legacy.example.net", "alice"));
    }

    #[test]
    fn assigner_without_timestamp_is_reported() {
        let entries = listed(AccountVhost::new(
            "legacy.example.net",
            Provenance::from_parts(None, Some("oldoper".into())),
        ));
        let line = entries
            .first()
            .map(|e| listing_line(e, OffsetDateTime::UNIX_EPOCH))
            .expect("account listed");
        assert!(line.ends_with("legacy.example.net assigned by oldoper"), "{line}");
    }
}

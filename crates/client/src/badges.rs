//! Navigation badge counters.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::api::{ApiClient, InvitationStatus, TournamentInvitation};
use crate::session::Session;

/// Permission required to see matches awaiting verification.
pub const VERIFY_PERMISSION: &str = "matches_can_verify";

/// Counts shown next to menu entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Badges {
    pub pending_verifications: usize,
    pub pending_invitations: usize,
    pub unseen_reports: u64,
}

impl Badges {
    /// Load every counter. A counter whose request fails reads as zero.
    pub async fn load(api: &ApiClient, session: &Session) -> Self {
        let mut badges = Self::default();

        if session.has_permission(VERIFY_PERMISSION).await {
            match api.pending_verifications().await {
                Ok(matches) => badges.pending_verifications = matches.len(),
                Err(e) => tracing::warn!("failed to load pending verifications: {}", e),
            }
        }

        match api.my_invitations().await {
            Ok(invitations) => badges.pending_invitations = count_pending_invitations(&invitations, Utc::now()),
            Err(e) => tracing::warn!("failed to load pending invitations: {}", e),
        }

        match api.unseen_reports_count().await {
            Ok(count) => badges.unseen_reports = count.unseen_count,
            Err(e) => tracing::warn!("failed to load unseen reports count: {}", e),
        }

        badges
    }

    pub fn total(&self) -> u64 {
        self.pending_verifications as u64 + self.pending_invitations as u64 + self.unseen_reports
    }
}

/// Invitations still pending and not yet expired at `now`.
///
/// An unparseable `expires_at` counts as expired.
pub fn count_pending_invitations(invitations: &[TournamentInvitation], now: DateTime<Utc>) -> usize {
    invitations
        .iter()
        .filter(|inv| inv.status == InvitationStatus::Pending)
        .filter(|inv| parse_timestamp(&inv.expires_at).is_some_and(|expires| expires > now))
        .count()
}

/// RFC 3339, or a naive timestamp taken as UTC (the API omits the offset).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use chrono::TimeZone;
    use std::time::Duration;

    fn invitation(status: InvitationStatus, expires_at: &str) -> TournamentInvitation {
        TournamentInvitation {
            id: 1,
            tournament_id: 2,
            user_id: 3,
            invited_by: 4,
            status,
            invited_at: "2024-05-01T10:00:00".into(),
            responded_at: None,
            expires_at: expires_at.into(),
        }
    }

    #[test]
    fn test_count_pending_invitations() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let invitations = vec![
            invitation(InvitationStatus::Pending, "2024-05-11T00:00:00"),
            invitation(InvitationStatus::Pending, "2024-05-12T00:00:00.123456Z"),
            invitation(InvitationStatus::Pending, "2024-05-09T00:00:00"),
            invitation(InvitationStatus::Accepted, "2024-06-01T00:00:00"),
            invitation(InvitationStatus::Pending, "soon"),
        ];
        assert_eq!(count_pending_invitations(&invitations, now), 2);
    }

    #[test]
    fn test_parse_timestamp_offset() {
        let ts = parse_timestamp("2024-05-10T14:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_total() {
        let badges = Badges { pending_verifications: 2, pending_invitations: 1, unseen_reports: 4 };
        assert_eq!(badges.total(), 7);
    }

    #[tokio::test]
    async fn test_load_unreachable_api_is_zero() {
        let config = FetchConfig { timeout: Duration::from_millis(500), ..Default::default() };
        let api = ApiClient::new("http://127.0.0.1:9/api", &config).unwrap();
        let session = Session::new(api.clone());
        assert_eq!(Badges::load(&api, &session).await, Badges::default());
    }
}

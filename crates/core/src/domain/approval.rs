use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{Entity, EntityId, EntityKind, EntityStatus};
use crate::selection::DialogMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Only `pending -> approved` and `pending -> rejected` exist.
    pub fn can_transition_to(&self, next: ApprovalStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, ApprovalStatus::Approved) | (Self::Pending, ApprovalStatus::Rejected)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalKind {
    Business,
    Distributor,
    Deal,
}

/// What was submitted for review, discriminated by `kind`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApprovalPayload {
    Business { business_name: String, category: String, city: String },
    Distributor { applicant_name: String, organization: String, region: String },
    Deal { business_name: String, offer_title: String, coupon_code: Option<String> },
}

impl ApprovalPayload {
    pub fn kind(&self) -> ApprovalKind {
        match self {
            Self::Business { .. } => ApprovalKind::Business,
            Self::Distributor { .. } => ApprovalKind::Distributor,
            Self::Deal { .. } => ApprovalKind::Deal,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::Business { business_name, .. } => business_name.clone(),
            Self::Distributor { applicant_name, organization, .. } => {
                format!("{applicant_name} ({organization})")
            }
            Self::Deal { business_name, offer_title, .. } => {
                format!("{offer_title} at {business_name}")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalItem {
    pub id: EntityId,
    pub status: ApprovalStatus,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    pub payload: ApprovalPayload,
    pub rejection_reason: Option<String>,
}

impl ApprovalItem {
    pub fn pending(
        id: impl Into<String>,
        submitted_by: impl Into<String>,
        payload: ApprovalPayload,
    ) -> Self {
        Self {
            id: EntityId(id.into()),
            status: ApprovalStatus::Pending,
            submitted_by: submitted_by.into(),
            submitted_at: Utc::now(),
            payload,
            rejection_reason: None,
        }
    }

    pub fn kind(&self) -> ApprovalKind {
        self.payload.kind()
    }
}

impl Entity for ApprovalItem {
    /// Submissions are reviewed, never edited.
    type Patch = ();

    const KIND: EntityKind = EntityKind::Approval;
    const SUPPORTED_MODES: &'static [DialogMode] =
        &[DialogMode::View, DialogMode::Approve, DialogMode::Reject];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.payload.title()
    }

    fn apply_patch(&mut self, _patch: &()) {}

    fn apply_status(&mut self, status: &EntityStatus) -> bool {
        let next = match status {
            EntityStatus::Approved => ApprovalStatus::Approved,
            EntityStatus::Rejected { .. } => ApprovalStatus::Rejected,
            EntityStatus::Suspended => return false,
        };
        if !self.status.can_transition_to(next) {
            return false;
        }

        self.status = next;
        if let EntityStatus::Rejected { reason } = status {
            self.rejection_reason = reason.clone();
        }
        true
    }

    fn approval_status(&self) -> Option<ApprovalStatus> {
        Some(self.status)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::entity::{Entity, EntityStatus};

    use super::{ApprovalItem, ApprovalKind, ApprovalPayload, ApprovalStatus};

    fn deal() -> ApprovalItem {
        ApprovalItem::pending(
            "appr-1",
            "dist-2",
            ApprovalPayload::Deal {
                business_name: "Blue Door Bakery".to_owned(),
                offer_title: "2-for-1 croissants".to_owned(),
                coupon_code: Some("BAKE2".to_owned()),
            },
        )
    }

    #[test]
    fn kind_is_derived_from_payload() {
        assert_eq!(deal().kind(), ApprovalKind::Deal);
        assert_eq!(deal().label(), "2-for-1 croissants at Blue Door Bakery");
    }

    #[test]
    fn only_pending_items_move() {
        assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Approved));
        assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Rejected));
        assert!(!ApprovalStatus::Approved.can_transition_to(ApprovalStatus::Rejected));
        assert!(!ApprovalStatus::Rejected.can_transition_to(ApprovalStatus::Pending));
        assert!(!ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Pending));
    }

    #[test]
    fn rejection_records_reason_and_is_final() {
        let mut item = deal();

        assert!(item.apply_status(&EntityStatus::Rejected {
            reason: Some("expired coupon".to_owned())
        }));
        assert_eq!(item.status, ApprovalStatus::Rejected);
        assert_eq!(item.rejection_reason.as_deref(), Some("expired coupon"));
        assert!(!item.apply_status(&EntityStatus::Approved));
        assert_eq!(item.status, ApprovalStatus::Rejected);
    }

    #[test]
    fn payload_serializes_with_kind_tag() {
        let json = serde_json::to_value(&deal().payload).expect("serialize payload");
        assert_eq!(json["kind"], "deal");
        assert_eq!(json["coupon_code"], "BAKE2");
    }
}

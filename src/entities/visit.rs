//! Visit log entity - one record per store visit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::EntityId;

/// How the visit fits in the relationship with the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    Initial,
    #[default]
    FirstVisit,
    FollowUp,
    Revisit,
}

impl std::fmt::Display for VisitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisitType::Initial => write!(f, "initial"),
            VisitType::FirstVisit => write!(f, "first_visit"),
            VisitType::FollowUp => write!(f, "follow_up"),
            VisitType::Revisit => write!(f, "revisit"),
        }
    }
}

impl std::str::FromStr for VisitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "initial" => Ok(VisitType::Initial),
            "first_visit" | "first-visit" => Ok(VisitType::FirstVisit),
            "follow_up" | "follow-up" => Ok(VisitType::FollowUp),
            "revisit" => Ok(VisitType::Revisit),
            _ => Err(format!("Unknown visit type: {}", s)),
        }
    }
}

/// Outcome flags for a visit; several may apply at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Pending,
    Completed,
    Cancelled,
    Visited,
    OpenedAccount,
    NoInterest,
    FollowUpRequired,
    RejectedVisit,
    ClosedDown,
    ExCustomer,
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisitStatus::Pending => write!(f, "pending"),
            VisitStatus::Completed => write!(f, "completed"),
            VisitStatus::Cancelled => write!(f, "cancelled"),
            VisitStatus::Visited => write!(f, "visited"),
            VisitStatus::OpenedAccount => write!(f, "opened_account"),
            VisitStatus::NoInterest => write!(f, "no_interest"),
            VisitStatus::FollowUpRequired => write!(f, "follow_up_required"),
            VisitStatus::RejectedVisit => write!(f, "rejected_visit"),
            VisitStatus::ClosedDown => write!(f, "closed_down"),
            VisitStatus::ExCustomer => write!(f, "ex_customer"),
        }
    }
}

impl std::str::FromStr for VisitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(VisitStatus::Pending),
            "completed" => Ok(VisitStatus::Completed),
            "cancelled" => Ok(VisitStatus::Cancelled),
            "visited" => Ok(VisitStatus::Visited),
            "opened_account" => Ok(VisitStatus::OpenedAccount),
            "no_interest" => Ok(VisitStatus::NoInterest),
            "follow_up_required" => Ok(VisitStatus::FollowUpRequired),
            "rejected_visit" => Ok(VisitStatus::RejectedVisit),
            "closed_down" => Ok(VisitStatus::ClosedDown),
            "ex_customer" => Ok(VisitStatus::ExCustomer),
            _ => Err(format!("Unknown visit status: {}", s)),
        }
    }
}

/// Estimated sales potential recorded during the visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PotentialLevel {
    High,
    #[default]
    Medium,
    Low,
    Na,
}

impl std::fmt::Display for PotentialLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PotentialLevel::High => write!(f, "high"),
            PotentialLevel::Medium => write!(f, "medium"),
            PotentialLevel::Low => write!(f, "low"),
            PotentialLevel::Na => write!(f, "na"),
        }
    }
}

impl std::str::FromStr for PotentialLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(PotentialLevel::High),
            "medium" => Ok(PotentialLevel::Medium),
            "low" => Ok(PotentialLevel::Low),
            "na" | "n/a" => Ok(PotentialLevel::Na),
            _ => Err(format!("Unknown potential level: {}", s)),
        }
    }
}

/// A logged visit to a store
///
/// `store_id` is a loose reference: imports that only carry a store name may
/// produce visits without one, and display falls back to `store_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitLog {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<EntityId>,
    /// Denormalized snapshot of the store name at logging time
    pub store_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub user_name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub visit_type: VisitType,
    #[serde(default)]
    pub visit_status: Vec<VisitStatus>,
    #[serde(default)]
    pub potential_level: PotentialLevel,
    /// Multi-line free text, line breaks preserved
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub next_steps: String,
    #[serde(default)]
    pub products_promoted: Vec<String>,
    /// Only set when `opened_account` is among the statuses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_opened_date: Option<DateTime<Utc>>,
}

impl VisitLog {
    pub fn new(store_name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(crate::core::identity::EntityPrefix::Visit),
            store_id: None,
            store_name: store_name.into(),
            user_id: None,
            user_name: String::new(),
            date,
            visit_type: VisitType::default(),
            visit_status: Vec::new(),
            potential_level: PotentialLevel::default(),
            notes: String::new(),
            next_steps: String::new(),
            products_promoted: Vec::new(),
            account_opened_date: None,
        }
    }

    pub fn opened_account(&self) -> bool {
        self.visit_status.contains(&VisitStatus::OpenedAccount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_tokens_roundtrip() {
        for status in [
            VisitStatus::Pending,
            VisitStatus::Completed,
            VisitStatus::OpenedAccount,
            VisitStatus::ExCustomer,
            VisitStatus::FollowUpRequired,
        ] {
            let token = status.to_string();
            let parsed: VisitStatus = token.parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_visit_yaml_roundtrip_preserves_multiline_notes() {
        let mut visit = VisitLog::new(
            "Pet Paradise",
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
        );
        visit.notes = "Discussed new product lines\nCustomer wants bulk pricing".to_string();
        visit.visit_status = vec![VisitStatus::Visited, VisitStatus::OpenedAccount];
        visit.products_promoted = vec!["EVFA PRO".to_string(), "EVFA Cap".to_string()];

        let yaml = serde_yml::to_string(&visit).unwrap();
        let back: VisitLog = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(back.notes, visit.notes);
        assert_eq!(back.visit_status, visit.visit_status);
        assert_eq!(back.products_promoted, visit.products_promoted);
        assert!(back.opened_account());
    }
}

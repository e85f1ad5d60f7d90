use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::schema::{ticket_comments, tickets, users};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "customer")]
    Customer,
    #[serde(rename = "support_agent")]
    SupportAgent,
    #[serde(rename = "manager")]
    Manager,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "vendor")]
    Vendor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::SupportAgent => "support_agent",
            Self::Manager => "manager",
            Self::Admin => "admin",
            Self::Vendor => "vendor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Self::Customer),
            "support_agent" => Some(Self::SupportAgent),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            "vendor" => Some(Self::Vendor),
            _ => None,
        }
    }

    /// Staff roles see internal notes and may mutate ticket workflow fields.
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager | Self::SupportAgent)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    #[serde(rename = "Open")]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Closed")]
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(Self::Open),
            "In Progress" => Some(Self::InProgress),
            "Closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketPriority {
    #[serde(rename = "Low")]
    Low,
    #[serde(rename = "Medium")]
    Medium,
    #[serde(rename = "High")]
    High,
}

impl TicketPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketCategory {
    #[serde(rename = "Technical")]
    Technical,
    #[serde(rename = "Billing")]
    Billing,
    #[serde(rename = "General")]
    General,
    #[serde(rename = "Feature Request")]
    FeatureRequest,
}

impl TicketCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "Technical",
            Self::Billing => "Billing",
            Self::General => "General",
            Self::FeatureRequest => "Feature Request",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Technical" => Some(Self::Technical),
            "Billing" => Some(Self::Billing),
            "General" => Some(Self::General),
            "Feature Request" => Some(Self::FeatureRequest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub email_verified: bool,
    pub is_active: bool,
    pub otp: Option<String>,
    pub otp_expires: Option<DateTime<Utc>>,
    pub invite_token: Option<String>,
    pub invite_expires: Option<DateTime<Utc>>,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub assigned_department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> UserRole {
        UserRole::parse(&self.role).unwrap_or(UserRole::Customer)
    }

    pub fn is_staff(&self) -> bool {
        self.role().is_staff()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn otp_is_valid(&self, now: DateTime<Utc>) -> bool {
        self.otp.is_some() && self.otp_expires.map_or(false, |exp| exp > now)
    }

    pub fn reset_token_is_valid(&self, now: DateTime<Utc>) -> bool {
        self.password_reset_token.is_some()
            && self.password_reset_expires.map_or(false, |exp| exp > now)
    }

    pub fn invite_is_valid(&self, now: DateTime<Utc>) -> bool {
        self.invite_token.is_some() && self.invite_expires.map_or(false, |exp| exp > now)
    }
}

/// User as exposed over the API. Credentials and one-shot tokens never leave
/// the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub email_verified: bool,
    pub is_active: bool,
    pub assigned_department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            email_verified: user.email_verified,
            is_active: user.is_active,
            assigned_department: user.assigned_department.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Abbreviated user embedded in ticket and comment payloads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = tickets)]
pub struct Ticket {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub category: String,
    pub department: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = ticket_comments)]
pub struct TicketComment {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub is_internal: bool,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "x".into(),
            role: "customer".into(),
            email_verified: false,
            is_active: true,
            otp: None,
            otp_expires: None,
            invite_token: None,
            invite_expires: None,
            password_reset_token: None,
            password_reset_expires: None,
            assigned_department: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn staff_roles() {
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Manager.is_staff());
        assert!(UserRole::SupportAgent.is_staff());
        assert!(!UserRole::Customer.is_staff());
        assert!(!UserRole::Vendor.is_staff());
    }

    #[test]
    fn enum_wire_strings_round_trip() {
        for role in ["customer", "support_agent", "manager", "admin", "vendor"] {
            assert_eq!(UserRole::parse(role).unwrap().as_str(), role);
        }
        for status in ["Open", "In Progress", "Closed"] {
            assert_eq!(TicketStatus::parse(status).unwrap().as_str(), status);
        }
        for category in ["Technical", "Billing", "General", "Feature Request"] {
            assert_eq!(TicketCategory::parse(category).unwrap().as_str(), category);
        }
        assert!(TicketStatus::parse("open").is_none());
        assert!(TicketPriority::parse("Urgent").is_none());
    }

    #[test]
    fn otp_validity_window() {
        let now = Utc::now();
        let mut user = sample_user();
        assert!(!user.otp_is_valid(now));

        user.otp = Some("1234".into());
        user.otp_expires = Some(now + Duration::minutes(10));
        assert!(user.otp_is_valid(now));
        assert!(!user.otp_is_valid(now + Duration::minutes(11)));

        user.otp = None;
        assert!(!user.otp_is_valid(now));
    }

    #[test]
    fn reset_and_invite_token_expiry() {
        let now = Utc::now();
        let mut user = sample_user();
        user.password_reset_token = Some("hash".into());
        user.password_reset_expires = Some(now - Duration::seconds(1));
        assert!(!user.reset_token_is_valid(now));

        user.password_reset_expires = Some(now + Duration::minutes(10));
        assert!(user.reset_token_is_valid(now));

        user.invite_token = Some("tok".into());
        user.invite_expires = Some(now + Duration::days(7));
        assert!(user.invite_is_valid(now));
        assert!(!user.invite_is_valid(now + Duration::days(8)));
    }

    #[test]
    fn public_user_omits_credentials() {
        let mut user = sample_user();
        user.otp = Some("9999".into());
        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
        let body = json.to_string();
        assert!(!body.contains("password"));
        assert!(!body.contains("otp"));
        assert!(!body.contains("9999"));
        assert_eq!(json["firstName"], "Ada");
    }
}

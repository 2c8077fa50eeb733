use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Response envelope used by every successful endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub message: String,
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            message: "OK".to_string(),
            data,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            message: "CREATED".to_string(),
            data,
        }
    }
}

/// The two daily toothbrushing windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckinKind {
    Morning,
    Evening,
}

impl CheckinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckinKind::Morning => "morning",
            CheckinKind::Evening => "evening",
        }
    }
}

impl fmt::Display for CheckinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(CheckinKind::Morning),
            "evening" => Ok(CheckinKind::Evening),
            other => Err(format!("unknown check-in kind: {}", other)),
        }
    }
}

/// Direction of a point ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointEntryKind {
    /// Accrual from a successful check-in.
    In,
    /// Penalty applied by the daily settlement.
    Out,
    /// Spent on a reward redemption.
    Redeem,
}

impl PointEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointEntryKind::In => "in",
            PointEntryKind::Out => "out",
            PointEntryKind::Redeem => "redeem",
        }
    }
}

impl FromStr for PointEntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(PointEntryKind::In),
            "out" => Ok(PointEntryKind::Out),
            "redeem" => Ok(PointEntryKind::Redeem),
            other => Err(format!("unknown point entry kind: {}", other)),
        }
    }
}

/// A stored check-in, timestamps rendered in the application timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinDto {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: CheckinKind,
    pub checkin_at: DateTime<FixedOffset>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// Snapshot of the check-in that triggered a point entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinSnapshotDto {
    pub checkin_at: DateTime<FixedOffset>,
    #[serde(rename = "type")]
    pub kind: CheckinKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointHistoryDto {
    pub id: String,
    pub user_id: String,
    pub point: i64,
    #[serde(rename = "type")]
    pub kind: PointEntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin: Option<CheckinSnapshotDto>,
    pub created_at: DateTime<FixedOffset>,
}

/// Body of POST /checkin. The kind arrives as a raw string so the handler
/// can reject it with a stable code instead of a serde parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCheckinRequest {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body of POST /admin/checkin. Admins may backdate, hence the date field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheckinRequest {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Calendar day (YYYY-MM-DD) the check-in should be recorded on.
    pub date: String,
}

/// Morning/evening completion for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStatusDto {
    pub date: NaiveDate,
    pub morning: bool,
    pub evening: bool,
}

/// One day of the weekly statistic; `completed` is the number of windows
/// fulfilled that day (0, 1 or 2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekDayStatusDto {
    pub date: NaiveDate,
    pub completed: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsecutiveCheckinDto {
    pub day: i64,
    pub last_break: Option<DateTime<FixedOffset>>,
    pub consecutive_day_record: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinSummaryDto {
    pub total_point: i64,
    pub consecutive_check_in_day: i64,
    pub check_in_percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionReportDto {
    pub average_check_in_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryDto {
    pub user_id: String,
    pub name: String,
    pub total_point: i64,
    pub consecutive_day: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub point: i64,
    pub stock: i64,
    pub is_available: bool,
    pub photo: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// Body of POST /admin/rewards. Every field required on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRewardRequest {
    pub name: String,
    pub description: String,
    pub point: i64,
    pub stock: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Body of PUT /admin/rewards/:id. Partial update, absent fields untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRewardRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub point: Option<i64>,
    pub stock: Option<i64>,
    pub is_available: Option<bool>,
    pub photo: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Reward fields echoed inside a redemption history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardSummaryDto {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionDto {
    pub id: String,
    pub reward: RewardSummaryDto,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    /// "L" or "P", as stored by the profile subsystem.
    pub sex: Option<String>,
    pub parent_name: Option<String>,
    pub province_id: Option<String>,
    pub city_id: Option<String>,
    pub district_id: Option<String>,
    pub subdistrict_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<String>,
    pub parent_name: Option<String>,
    pub province_id: Option<String>,
    pub city_id: Option<String>,
    pub district_id: Option<String>,
    pub subdistrict_id: Option<String>,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkin_kind_round_trips_through_strings() {
        assert_eq!("morning".parse::<CheckinKind>(), Ok(CheckinKind::Morning));
        assert_eq!("evening".parse::<CheckinKind>(), Ok(CheckinKind::Evening));
        assert!("noon".parse::<CheckinKind>().is_err());
        assert_eq!(CheckinKind::Morning.as_str(), "morning");
    }

    #[test]
    fn create_checkin_request_uses_the_wire_field_name() {
        let req: CreateCheckinRequest = serde_json::from_str(r#"{"type":"morning"}"#).unwrap();
        assert_eq!(req.kind, "morning");
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = CheckinSummaryDto {
            total_point: 120,
            consecutive_check_in_day: 4,
            check_in_percentage: 33,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("totalPoint"));
        assert!(json.contains("consecutiveCheckInDay"));
        assert!(json.contains("checkInPercentage"));
    }
}

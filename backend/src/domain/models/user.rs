//! Minimal user profile: the identity anchor plus the address fields the
//! regional report aggregates over.

use chrono::{DateTime, NaiveDate, Utc};
use shared::UserDto;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    HealthCare,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::HealthCare => "health_care",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "health_care" => Ok(Role::HealthCare),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Administrative-region level a report can aggregate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionType {
    Province,
    City,
    District,
    Subdistrict,
}

impl RegionType {
    /// Column holding the matching region id on the users table.
    pub fn column(&self) -> &'static str {
        match self {
            RegionType::Province => "province_id",
            RegionType::City => "city_id",
            RegionType::District => "district_id",
            RegionType::Subdistrict => "subdistrict_id",
        }
    }
}

impl FromStr for RegionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "province" => Ok(RegionType::Province),
            "city" => Ok(RegionType::City),
            "district" => Ok(RegionType::District),
            // Legacy path literal kept for wire compatibility with deployed
            // clients; it selects the subdistrict level.
            "subString" => Ok(RegionType::Subdistrict),
            other => Err(format!("unknown region type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<String>,
    pub parent_name: Option<String>,
    pub province_id: Option<String>,
    pub city_id: Option<String>,
    pub district_id: Option<String>,
    pub subdistrict_id: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            birth_date: None,
            sex: None,
            parent_name: None,
            province_id: None,
            city_id: None,
            district_id: None,
            subdistrict_id: None,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_dto(&self) -> UserDto {
        UserDto {
            id: self.id.clone(),
            name: self.name.clone(),
            birth_date: self.birth_date,
            sex: self.sex.clone(),
            parent_name: self.parent_name.clone(),
            province_id: self.province_id.clone(),
            city_id: self.city_id.clone(),
            district_id: self.district_id.clone(),
            subdistrict_id: self.subdistrict_id.clone(),
            role: self.role.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_type_accepts_the_legacy_subdistrict_literal() {
        assert_eq!("subString".parse::<RegionType>(), Ok(RegionType::Subdistrict));
        assert!("subdistrict".parse::<RegionType>().is_err());
    }

    #[test]
    fn region_type_maps_to_user_columns() {
        assert_eq!(RegionType::Province.column(), "province_id");
        assert_eq!(RegionType::Subdistrict.column(), "subdistrict_id");
    }
}

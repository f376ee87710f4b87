use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_SOLD: &str = "sold";
pub const STATUS_INACTIVE: &str = "inactive";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Invalid listing status: {0}")]
    InvalidListingStatus(String),
}

/// Lifecycle flag stored with every listing and item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Sold,
    Inactive,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => STATUS_ACTIVE,
            ListingStatus::Sold => STATUS_SOLD,
            ListingStatus::Inactive => STATUS_INACTIVE,
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_ACTIVE => Ok(ListingStatus::Active),
            STATUS_SOLD => Ok(ListingStatus::Sold),
            STATUS_INACTIVE => Ok(ListingStatus::Inactive),
            _ => Err(DbError::InvalidListingStatus(s.to_string())),
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for ListingStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for ListingStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let text = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(text.parse::<ListingStatus>()?)
    }
}

impl sqlx::Encode<'_, sqlx::Sqlite> for ListingStatus {
    fn encode_by_ref(&self, args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'_>>) -> sqlx::encode::IsNull {
        args.push(sqlx::sqlite::SqliteArgumentValue::Text(self.as_str().into()));
        sqlx::encode::IsNull::No
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_status() {
        assert_eq!("active".parse::<ListingStatus>().unwrap(), ListingStatus::Active);
        assert_eq!("sold".parse::<ListingStatus>().unwrap(), ListingStatus::Sold);
        assert_eq!("inactive".parse::<ListingStatus>().unwrap(), ListingStatus::Inactive);
        assert!("removed".parse::<ListingStatus>().is_err());
        assert_eq!(ListingStatus::default(), ListingStatus::Active);
    }
}

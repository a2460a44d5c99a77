//! Enumerated classifications stored alongside catalog and profile rows.

use serde::{Deserialize, Serialize};

/// Customer account tier, deciding which price column applies.
///
/// Customers without a profile (or not logged in) are retail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "account_tier", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AccountTier {
    #[default]
    Retail,
    Contractor,
    Wholesale,
}

impl AccountTier {
    /// Whether this tier gets a price column other than the base price.
    #[must_use]
    pub const fn has_special_pricing(&self) -> bool {
        !matches!(self, Self::Retail)
    }

    /// Short notice shown next to the order summary, if any.
    #[must_use]
    pub const fn pricing_notice(&self) -> Option<&'static str> {
        match self {
            Self::Retail => None,
            Self::Contractor => Some("Contractor pricing applied"),
            Self::Wholesale => Some("Wholesale pricing applied"),
        }
    }
}

impl std::fmt::Display for AccountTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retail => write!(f, "retail"),
            Self::Contractor => write!(f, "contractor"),
            Self::Wholesale => write!(f, "wholesale"),
        }
    }
}

impl std::str::FromStr for AccountTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "retail" => Ok(Self::Retail),
            "contractor" => Ok(Self::Contractor),
            "wholesale" => Ok(Self::Wholesale),
            _ => Err(format!("invalid account tier: {s}")),
        }
    }
}

/// Vehicle dispatched for a delivery group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "vehicle_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    /// Palletised loads: pavers, block, stone veneer.
    Flatbed,
    /// Bulk loads: rock, gravel, soil, mulch.
    DumpTruck,
    /// Everything that fits a box truck or van.
    #[default]
    Standard,
}

impl VehicleType {
    /// Badge label, e.g. `DUMP TRUCK`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Flatbed => "FLATBED",
            Self::DumpTruck => "DUMP TRUCK",
            Self::Standard => "STANDARD",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flatbed => write!(f, "flatbed"),
            Self::DumpTruck => write!(f, "dump_truck"),
            Self::Standard => write!(f, "standard"),
        }
    }
}

impl std::str::FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flatbed" => Ok(Self::Flatbed),
            "dump_truck" => Ok(Self::DumpTruck),
            "standard" => Ok(Self::Standard),
            _ => Err(format!("invalid vehicle type: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_account_tier_round_trips_through_str() {
        for tier in [
            AccountTier::Retail,
            AccountTier::Contractor,
            AccountTier::Wholesale,
        ] {
            assert_eq!(tier.to_string().parse::<AccountTier>().unwrap(), tier);
        }
        assert!("vip".parse::<AccountTier>().is_err());
    }

    #[test]
    fn test_account_tier_default_is_retail() {
        assert_eq!(AccountTier::default(), AccountTier::Retail);
        assert_eq!(AccountTier::Retail.pricing_notice(), None);
        assert!(AccountTier::Wholesale.has_special_pricing());
    }

    #[test]
    fn test_vehicle_type_serde_matches_store_values() {
        let json = serde_json::to_string(&VehicleType::DumpTruck).unwrap();
        assert_eq!(json, "\"dump_truck\"");
        assert_eq!("dump_truck".parse::<VehicleType>().unwrap(), VehicleType::DumpTruck);
        assert_eq!(VehicleType::DumpTruck.label(), "DUMP TRUCK");
    }
}

//! Error types for the rules engine.
//!
//! Lookup failures are always surfaced: a failed category or group lookup is
//! never turned into a zero delivery fee, and no partial totals are returned.

use core::fmt;

use landscape_supply_core::{ProductId, QuantityError};
use thiserror::Error;

use crate::db::RepositoryError;

/// Which batch lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStage {
    Products,
    Categories,
    DeliveryGroups,
    ZipRestrictions,
    AccountTier,
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Products => write!(f, "product"),
            Self::Categories => write!(f, "category"),
            Self::DeliveryGroups => write!(f, "delivery group"),
            Self::ZipRestrictions => write!(f, "zip restriction"),
            Self::AccountTier => write!(f, "account tier"),
        }
    }
}

/// Errors produced while pricing a cart.
#[derive(Debug, Error)]
pub enum PricingError {
    /// A batch lookup against the catalog store failed.
    #[error("{stage} lookup failed: {source}")]
    Lookup {
        stage: LookupStage,
        #[source]
        source: RepositoryError,
    },

    /// Category or delivery-group data could not be loaded, so no delivery
    /// fee is known. Callers must retry before showing checkout totals.
    #[error("delivery fee calculation failed: {0}")]
    DeliveryFeeUnavailable(#[source] RepositoryError),

    /// A cart line references a product the store does not return.
    #[error("cart references unknown product {0}")]
    MissingProduct(ProductId),

    /// Raw cart input carried a zero, negative or oversized quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),
}

impl PricingError {
    /// Wrap a store error for the given lookup stage.
    ///
    /// Category and delivery-group failures become
    /// [`PricingError::DeliveryFeeUnavailable`].
    #[must_use]
    pub fn lookup(stage: LookupStage, source: RepositoryError) -> Self {
        match stage {
            LookupStage::Categories | LookupStage::DeliveryGroups => {
                Self::DeliveryFeeUnavailable(source)
            }
            _ => Self::Lookup { stage, source },
        }
    }

    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Lookup { source, .. } | Self::DeliveryFeeUnavailable(source) => {
                source.is_transient()
            }
            Self::MissingProduct(_) | Self::InvalidQuantity(_) => false,
        }
    }
}

/// Result type alias for `PricingError`.
pub type Result<T> = std::result::Result<T, PricingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_stages_map_to_fee_unavailable() {
        let err = PricingError::lookup(
            LookupStage::DeliveryGroups,
            RepositoryError::Unavailable("timeout".to_string()),
        );
        assert!(matches!(err, PricingError::DeliveryFeeUnavailable(_)));
        assert_eq!(err.to_string(), "delivery fee calculation failed: store unavailable: timeout");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_product_stage_keeps_stage() {
        let err = PricingError::lookup(
            LookupStage::Products,
            RepositoryError::DataCorruption("negative price".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "product lookup failed: data corruption: negative price"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_missing_product_is_not_retryable() {
        let err = PricingError::MissingProduct(ProductId::new(uuid::Uuid::nil()));
        assert!(!err.is_retryable());
    }
}

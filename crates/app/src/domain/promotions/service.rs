//! Promotions service.

use async_trait::async_trait;
use flacon::promotions::Promotion;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::domain::promotions::{
    data::NewPromotion,
    errors::PromotionsServiceError,
    records::PromotionRecord,
    repository::MemPromotionsRepository,
};

#[derive(Debug, Clone, Default)]
pub struct MemPromotionsService {
    repository: MemPromotionsRepository,
}

impl MemPromotionsService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            repository: MemPromotionsRepository::new(),
        }
    }
}

#[async_trait]
impl PromotionsService for MemPromotionsService {
    async fn create_promotion(
        &self,
        promotion: NewPromotion,
        now: Timestamp,
    ) -> Result<PromotionRecord, PromotionsServiceError> {
        let record = PromotionRecord {
            code: promotion.code.to_ascii_uppercase(),
            discount: promotion.discount,
            min_order_total: promotion.min_order_total,
            starts_at: promotion.starts_at,
            ends_at: promotion.ends_at,
            created_at: now,
        };

        if !self.repository.insert(record.clone()).await {
            return Err(PromotionsServiceError::AlreadyExists);
        }

        info!(code = %record.code, "created promotion");

        Ok(record)
    }

    async fn get_promotion(&self, code: &str) -> Result<PromotionRecord, PromotionsServiceError> {
        self.repository
            .get(&code.to_ascii_uppercase())
            .await
            .ok_or(PromotionsServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// Registers a promotion rule under its (case-insensitive) code.
    async fn create_promotion(
        &self,
        promotion: NewPromotion,
        now: Timestamp,
    ) -> Result<PromotionRecord, PromotionsServiceError>;

    /// Looks a promotion up by code.
    async fn get_promotion(&self, code: &str) -> Result<PromotionRecord, PromotionsServiceError>;
}

/// A promotion code resolved against the registry.
#[derive(Debug, Clone)]
pub enum ResolvedPromotion {
    /// No code was supplied.
    None,
    /// The code mapped to a stored rule.
    Rule(Promotion),
    /// Nothing is registered under the code; pricing proceeds without a
    /// discount and reports the code as inapplicable.
    Unknown(String),
}

/// Resolves an optional promotion code into a rule for the pricing engine.
pub async fn resolve_promotion(
    promotions: &dyn PromotionsService,
    code: Option<&str>,
) -> ResolvedPromotion {
    match code {
        None => ResolvedPromotion::None,
        Some(code) => match promotions.get_promotion(code).await {
            Ok(record) => ResolvedPromotion::Rule(record.to_rule()),
            Err(PromotionsServiceError::NotFound | PromotionsServiceError::AlreadyExists) => {
                ResolvedPromotion::Unknown(code.to_ascii_uppercase())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use flacon::promotions::DiscountKind;
    use rust_decimal::dec;
    use testresult::TestResult;

    use super::*;

    fn new_promotion(code: &str) -> TestResult<NewPromotion> {
        Ok(NewPromotion {
            code: code.to_string(),
            discount: DiscountKind::Percentage(dec!(10)),
            min_order_total: 0,
            starts_at: "2026-01-01T00:00:00Z".parse()?,
            ends_at: "2027-01-01T00:00:00Z".parse()?,
        })
    }

    fn now() -> TestResult<Timestamp> {
        Ok("2026-06-01T00:00:00Z".parse()?)
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() -> TestResult {
        let service = MemPromotionsService::new();

        service
            .create_promotion(new_promotion("save10")?, now()?)
            .await?;

        let record = service.get_promotion("SaVe10").await?;

        assert_eq!(record.code, "SAVE10");

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_code_returns_already_exists() -> TestResult {
        let service = MemPromotionsService::new();

        service
            .create_promotion(new_promotion("SAVE10")?, now()?)
            .await?;

        let result = service
            .create_promotion(new_promotion("save10")?, now()?)
            .await;

        assert!(
            matches!(result, Err(PromotionsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_code_returns_not_found() {
        let service = MemPromotionsService::new();

        let result = service.get_promotion("NOPE").await;

        assert!(
            matches!(result, Err(PromotionsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn resolve_promotion_distinguishes_unknown_codes() -> TestResult {
        let service = MemPromotionsService::new();

        service
            .create_promotion(new_promotion("SAVE10")?, now()?)
            .await?;

        assert!(matches!(
            resolve_promotion(&service, None).await,
            ResolvedPromotion::None
        ));

        assert!(matches!(
            resolve_promotion(&service, Some("save10")).await,
            ResolvedPromotion::Rule(_)
        ));

        let resolved = resolve_promotion(&service, Some("gone")).await;

        assert!(
            matches!(resolved, ResolvedPromotion::Unknown(ref code) if code == "GONE"),
            "expected Unknown(GONE), got {resolved:?}"
        );

        Ok(())
    }
}

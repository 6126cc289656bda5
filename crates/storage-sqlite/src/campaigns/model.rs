//! Database models for campaigns.

use chrono::Utc;
use diesel::prelude::*;

use adsync_core::campaigns::{Campaign, CampaignUpsert, MetricsSnapshot};
use adsync_core::errors::{DatabaseError, Error};
use adsync_platforms::{Budget, BudgetKind, CampaignObjective, CampaignStatus, Platform};

use crate::utils::{
    format_date, format_datetime, parse_date_opt, parse_datetime, parse_decimal,
};

/// Database model for campaigns.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::campaigns)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CampaignDB {
    pub id: String,
    pub user_id: String,
    pub platform: String,
    pub platform_campaign_id: String,
    pub name: String,
    pub status: String,
    pub objective: String,
    pub budget_amount: String,
    pub budget_currency: String,
    pub budget_kind: String,
    pub targeting: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub metrics_date: Option<String>,
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: f64,
    pub spend: String,
    pub revenue: String,
    pub metrics_currency: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl CampaignDB {
    pub fn from_upsert(upsert: &CampaignUpsert) -> Self {
        let c = &upsert.campaign;
        Self {
            id: c.id.clone(),
            user_id: upsert.user_id.clone(),
            platform: c.platform.as_str().to_string(),
            platform_campaign_id: c.platform_campaign_id.clone(),
            name: c.name.clone(),
            status: c.status.as_str().to_string(),
            objective: c.objective.as_str().to_string(),
            budget_amount: c.budget.amount.to_string(),
            budget_currency: c.budget.currency.clone(),
            budget_kind: match c.budget.kind {
                BudgetKind::Daily => "daily".to_string(),
                BudgetKind::Lifetime => "lifetime".to_string(),
            },
            targeting: match &c.targeting {
                serde_json::Value::Null => None,
                value => Some(value.to_string()),
            },
            start_date: c.start_date.map(format_date),
            end_date: c.end_date.map(format_date),
            metrics_date: None,
            impressions: 0,
            clicks: 0,
            conversions: 0.0,
            spend: "0".to_string(),
            revenue: "0".to_string(),
            metrics_currency: None,
            created_at: format_datetime(c.created_at),
            updated_at: format_datetime(Utc::now()),
        }
    }

    pub fn into_domain(self) -> adsync_core::Result<Campaign> {
        let platform: Platform = self.platform.parse().map_err(|e: String| {
            Error::Database(DatabaseError::Internal(e))
        })?;

        let metrics = parse_date_opt(self.metrics_date.as_deref()).map(|date| MetricsSnapshot {
            date,
            impressions: self.impressions.max(0) as u64,
            clicks: self.clicks.max(0) as u64,
            conversions: self.conversions,
            spend: parse_decimal(&self.spend),
            revenue: parse_decimal(&self.revenue),
            currency: self
                .metrics_currency
                .clone()
                .unwrap_or_else(|| self.budget_currency.clone()),
        });

        Ok(Campaign {
            id: self.id,
            user_id: self.user_id,
            platform,
            platform_campaign_id: self.platform_campaign_id,
            name: self.name,
            status: CampaignStatus::from_storage(&self.status),
            objective: CampaignObjective::from_storage(&self.objective),
            budget: Budget {
                amount: parse_decimal(&self.budget_amount),
                currency: self.budget_currency,
                kind: match self.budget_kind.as_str() {
                    "lifetime" => BudgetKind::Lifetime,
                    _ => BudgetKind::Daily,
                },
            },
            targeting: self
                .targeting
                .as_deref()
                .and_then(|t| serde_json::from_str(t).ok())
                .unwrap_or(serde_json::Value::Null),
            start_date: parse_date_opt(self.start_date.as_deref()),
            end_date: parse_date_opt(self.end_date.as_deref()),
            metrics,
            created_at: parse_datetime(&self.created_at),
            updated_at: parse_datetime(&self.updated_at),
        })
    }
}

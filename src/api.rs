// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed catalogue of backend operations.
//!
//! Every method returns the backend's `{success, data, message}` envelope as
//! sent; errors from the gateway pass through untouched.

use crate::error::{ApiError, ApiResult};
use crate::gateway::{Gateway, ParsedResponse};
use crate::models::{
    Category, CategoryUpdate, Credential, EntryType, Goal, GoalStatus, GoalUpdate, NewCategory,
    NewGoal, NewTransaction, Pagination, RegisterRequest, Transaction, TransactionQuery,
    TransactionUpdate, User,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    /// `data` of a successful envelope. A `success: false` envelope or a
    /// missing payload is reported with the server's message.
    pub fn into_data(self) -> Result<T, String> {
        let fallback = || crate::error::GENERIC_REQUEST_MESSAGE.to_string();
        if !self.success {
            return Err(self.message.unwrap_or_else(fallback));
        }
        self.data.ok_or_else(|| self.message.unwrap_or_else(fallback))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub tokens: Credential,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserPayload {
    pub user: User,
}

pub struct ApiClient {
    gateway: Arc<Gateway>,
}

fn decode<T: DeserializeOwned>(resp: ParsedResponse) -> ApiResult<ApiResponse<T>> {
    let status = resp.status;
    serde_json::from_value(resp.body).map_err(|e| ApiError::Malformed {
        status,
        message: format!("Unexpected response from server: {}", e),
    })
}

fn to_body<T: Serialize>(payload: &T) -> ApiResult<Value> {
    serde_json::to_value(payload).map_err(|e| ApiError::Malformed {
        status: 0,
        message: format!("Failed to encode request: {}", e),
    })
}

fn date_params(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> [(&'static str, Option<String>); 2] {
    [
        ("startDate", start.map(|d| d.to_string())),
        ("endDate", end.map(|d| d.to_string())),
    ]
}

impl ApiClient {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    // ----- auth -----

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<ApiResponse<AuthPayload>> {
        let resp = self
            .gateway
            .post(
                "/auth/login",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        let envelope: ApiResponse<AuthPayload> = decode(resp)?;
        self.store_tokens(&envelope);
        Ok(envelope)
    }

    pub async fn register(&self, req: &RegisterRequest) -> ApiResult<ApiResponse<AuthPayload>> {
        let resp = self.gateway.post("/auth/register", Some(to_body(req)?)).await?;
        let envelope: ApiResponse<AuthPayload> = decode(resp)?;
        self.store_tokens(&envelope);
        Ok(envelope)
    }

    /// Tells the server on a best-effort basis, then always drops the local credential.
    pub async fn logout(&self) -> ApiResult<()> {
        if let Err(e) = self.gateway.post("/auth/logout", None).await {
            warn!(error = %e, "server-side logout failed; clearing local credential anyway");
        }
        self.gateway.tokens().clear();
        info!("logged out");
        Ok(())
    }

    pub async fn get_current_user(&self) -> ApiResult<ApiResponse<UserPayload>> {
        decode(self.gateway.get("/auth/me", &[]).await?)
    }

    fn store_tokens(&self, envelope: &ApiResponse<AuthPayload>) {
        if !envelope.success {
            return;
        }
        if let Some(payload) = &envelope.data {
            self.gateway.tokens().set(
                &payload.tokens.access_token,
                payload.tokens.refresh_token.as_deref(),
            );
        }
    }

    // ----- categories -----

    pub async fn get_categories(
        &self,
        kind: Option<EntryType>,
    ) -> ApiResult<ApiResponse<Vec<Category>>> {
        let params = [("type", kind.map(|k| k.as_str().to_string()))];
        decode(self.gateway.get("/categories", &params).await?)
    }

    pub async fn create_category(&self, input: &NewCategory) -> ApiResult<ApiResponse<Category>> {
        decode(self.gateway.post("/categories", Some(to_body(input)?)).await?)
    }

    pub async fn update_category(
        &self,
        id: &str,
        input: &CategoryUpdate,
    ) -> ApiResult<ApiResponse<Category>> {
        let path = format!("/categories/{}", id);
        decode(self.gateway.put(&path, Some(to_body(input)?)).await?)
    }

    pub async fn delete_category(&self, id: &str) -> ApiResult<ApiResponse<Value>> {
        decode(self.gateway.delete(&format!("/categories/{}", id)).await?)
    }

    // ----- transactions -----

    pub async fn get_transactions(
        &self,
        query: &TransactionQuery,
    ) -> ApiResult<ApiResponse<Vec<Transaction>>> {
        decode(self.gateway.get("/transactions", &query.params()).await?)
    }

    pub async fn get_transaction(&self, id: &str) -> ApiResult<ApiResponse<Transaction>> {
        decode(self.gateway.get(&format!("/transactions/{}", id), &[]).await?)
    }

    pub async fn create_transaction(
        &self,
        input: &NewTransaction,
    ) -> ApiResult<ApiResponse<Transaction>> {
        decode(self.gateway.post("/transactions", Some(to_body(input)?)).await?)
    }

    pub async fn update_transaction(
        &self,
        id: &str,
        input: &TransactionUpdate,
    ) -> ApiResult<ApiResponse<Transaction>> {
        let path = format!("/transactions/{}", id);
        decode(self.gateway.put(&path, Some(to_body(input)?)).await?)
    }

    pub async fn delete_transaction(&self, id: &str) -> ApiResult<ApiResponse<Value>> {
        decode(self.gateway.delete(&format!("/transactions/{}", id)).await?)
    }

    // ----- goals -----

    pub async fn get_goals(&self, status: Option<GoalStatus>) -> ApiResult<ApiResponse<Vec<Goal>>> {
        let params = [("status", status.map(|s| s.as_str().to_string()))];
        decode(self.gateway.get("/goals", &params).await?)
    }

    pub async fn create_goal(&self, input: &NewGoal) -> ApiResult<ApiResponse<Goal>> {
        decode(self.gateway.post("/goals", Some(to_body(input)?)).await?)
    }

    pub async fn update_goal(&self, id: &str, input: &GoalUpdate) -> ApiResult<ApiResponse<Goal>> {
        let path = format!("/goals/{}", id);
        decode(self.gateway.put(&path, Some(to_body(input)?)).await?)
    }

    /// Adds `amount` to the goal's current amount server-side.
    pub async fn contribute_to_goal(
        &self,
        id: &str,
        amount: Decimal,
    ) -> ApiResult<ApiResponse<Goal>> {
        let path = format!("/goals/{}/progress", id);
        let body = json!({ "amount": rust_decimal::prelude::ToPrimitive::to_f64(&amount) });
        decode(self.gateway.patch(&path, Some(body)).await?)
    }

    pub async fn delete_goal(&self, id: &str) -> ApiResult<ApiResponse<Value>> {
        decode(self.gateway.delete(&format!("/goals/{}", id)).await?)
    }

    // ----- dashboard aggregates -----

    pub async fn get_overview(&self, period: Option<&str>) -> ApiResult<ApiResponse<Value>> {
        let params = [("period", period.map(str::to_string))];
        decode(self.gateway.get("/dashboard/overview", &params).await?)
    }

    pub async fn get_stats(&self) -> ApiResult<ApiResponse<Value>> {
        decode(self.gateway.get("/dashboard/stats", &[]).await?)
    }

    pub async fn get_expenses_by_category(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> ApiResult<ApiResponse<Value>> {
        let params = date_params(start, end);
        decode(self.gateway.get("/dashboard/expenses-by-category", &params).await?)
    }

    pub async fn get_income_over_time(&self, months: Option<u32>) -> ApiResult<ApiResponse<Value>> {
        let params = [("months", months.map(|m| m.to_string()))];
        decode(self.gateway.get("/dashboard/income-over-time", &params).await?)
    }

    pub async fn get_category_budget_comparison(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> ApiResult<ApiResponse<Value>> {
        let params = date_params(start, end);
        decode(
            self.gateway
                .get("/dashboard/category-budget-comparison", &params)
                .await?,
        )
    }

    pub async fn get_goals_progress(&self) -> ApiResult<ApiResponse<Value>> {
        decode(self.gateway.get("/dashboard/goals-progress", &[]).await?)
    }
}

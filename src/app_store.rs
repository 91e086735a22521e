// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client-side copy of the user's categories, transactions, goals and
//! dashboard aggregates.
//!
//! All changes go through [`reduce`], a pure function of the previous state
//! and an [`AppAction`]. Collections sit behind `Arc`s: a transition that does
//! not touch a collection hands back the very same allocation, which is how
//! readers can tell a failed mutation left the data alone.
//!
//! Loads are guarded by a per-collection sequence number. Each load takes a
//! fresh number when it starts; a settlement whose number is no longer the
//! latest for its collection is dropped, so a slow stale response can never
//! overwrite the result of a request issued after it.

use crate::api::{ApiClient, ApiResponse};
use crate::error::{ActionFailure, ApiResult};
use crate::models::{
    Category, CategoryUpdate, EntryType, Goal, GoalStatus, GoalUpdate, Keyed, NewCategory,
    NewGoal, NewTransaction, Pagination, Transaction, TransactionQuery, TransactionUpdate,
};
use crate::notifications::{NewNotification, NotificationQueue};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Categories,
    Transactions,
    Goals,
    Dashboard,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 4] = [
        CollectionKey::Categories,
        CollectionKey::Transactions,
        CollectionKey::Goals,
        CollectionKey::Dashboard,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CollectionKey::Categories => "categories",
            CollectionKey::Transactions => "transactions",
            CollectionKey::Goals => "goals",
            CollectionKey::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per collection key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerCollection<T> {
    pub categories: T,
    pub transactions: T,
    pub goals: T,
    pub dashboard: T,
}

impl<T: Copy> PerCollection<T> {
    pub fn get(&self, key: CollectionKey) -> T {
        match key {
            CollectionKey::Categories => self.categories,
            CollectionKey::Transactions => self.transactions,
            CollectionKey::Goals => self.goals,
            CollectionKey::Dashboard => self.dashboard,
        }
    }

    fn set(&mut self, key: CollectionKey, value: T) {
        match key {
            CollectionKey::Categories => self.categories = value,
            CollectionKey::Transactions => self.transactions = value,
            CollectionKey::Goals => self.goals = value,
            CollectionKey::Dashboard => self.dashboard = value,
        }
    }
}

pub type LoadingState = PerCollection<bool>;
pub type Freshness = PerCollection<Option<DateTime<Utc>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub overview: Value,
    pub stats: Value,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub categories: Arc<Vec<Category>>,
    pub transactions: Arc<Vec<Transaction>>,
    pub goals: Arc<Vec<Goal>>,
    pub dashboard: Option<Arc<DashboardData>>,
    pub pagination: Option<Pagination>,
    pub loading: LoadingState,
    /// Last successful load or mutation per collection. Refetch policy is the caller's.
    pub last_updated: Freshness,
    pub error: Option<String>,
    latest_load: PerCollection<u64>,
}

impl AppState {
    /// Sequence number of the most recently issued load for `key`.
    pub fn latest_load(&self, key: CollectionKey) -> u64 {
        self.latest_load.get(key)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// A server-acknowledged entity headed for one of the collections.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Category(Category),
    Transaction(Transaction),
    Goal(Goal),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadedData {
    Categories(Vec<Category>),
    Transactions {
        items: Vec<Transaction>,
        pagination: Option<Pagination>,
    },
    Goals(Vec<Goal>),
    Dashboard(DashboardData),
}

impl LoadedData {
    pub fn key(&self) -> CollectionKey {
        match self {
            LoadedData::Categories(_) => CollectionKey::Categories,
            LoadedData::Transactions { .. } => CollectionKey::Transactions,
            LoadedData::Goals(_) => CollectionKey::Goals,
            LoadedData::Dashboard(_) => CollectionKey::Dashboard,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    LoadStarted {
        key: CollectionKey,
        seq: u64,
    },
    LoadSucceeded {
        seq: u64,
        data: LoadedData,
        at: DateTime<Utc>,
    },
    LoadFailed {
        key: CollectionKey,
        seq: u64,
        message: String,
    },
    Created {
        record: Record,
        at: DateTime<Utc>,
    },
    /// Replaces the entry with the same id, or appends when it is not known locally.
    Updated {
        record: Record,
        at: DateTime<Utc>,
    },
    Deleted {
        key: CollectionKey,
        id: String,
        at: DateTime<Utc>,
    },
    MutationFailed {
        message: String,
    },
    ClearError,
}

pub fn reduce(state: &AppState, action: AppAction) -> AppState {
    let mut next = state.clone();
    match action {
        AppAction::LoadStarted { key, seq } => {
            if seq > next.latest_load.get(key) {
                next.latest_load.set(key, seq);
            }
            next.loading.set(key, true);
        }
        AppAction::LoadSucceeded { seq, data, at } => {
            let key = data.key();
            if seq != state.latest_load.get(key) {
                return next;
            }
            match data {
                LoadedData::Categories(items) => next.categories = Arc::new(dedup(items)),
                LoadedData::Transactions { items, pagination } => {
                    next.transactions = Arc::new(dedup(items));
                    next.pagination = pagination;
                }
                LoadedData::Goals(items) => next.goals = Arc::new(dedup(items)),
                LoadedData::Dashboard(data) => next.dashboard = Some(Arc::new(data)),
            }
            next.loading.set(key, false);
            next.last_updated.set(key, Some(at));
            next.error = None;
        }
        AppAction::LoadFailed { key, seq, message } => {
            if seq != state.latest_load.get(key) {
                return next;
            }
            next.loading.set(key, false);
            next.error = Some(message);
        }
        AppAction::Created { record, at } | AppAction::Updated { record, at } => {
            let key = match record {
                Record::Category(c) => {
                    next.categories = upsert(&state.categories, c);
                    CollectionKey::Categories
                }
                Record::Transaction(t) => {
                    next.transactions = upsert(&state.transactions, t);
                    CollectionKey::Transactions
                }
                Record::Goal(g) => {
                    next.goals = upsert(&state.goals, g);
                    CollectionKey::Goals
                }
            };
            next.last_updated.set(key, Some(at));
            next.error = None;
        }
        AppAction::Deleted { key, id, at } => {
            match key {
                CollectionKey::Categories => next.categories = remove(&state.categories, &id),
                CollectionKey::Transactions => {
                    next.transactions = remove(&state.transactions, &id)
                }
                CollectionKey::Goals => next.goals = remove(&state.goals, &id),
                CollectionKey::Dashboard => {}
            }
            next.last_updated.set(key, Some(at));
            next.error = None;
        }
        AppAction::MutationFailed { message } => next.error = Some(message),
        AppAction::ClearError => next.error = None,
    }
    next
}

fn upsert<T: Keyed + Clone>(list: &Arc<Vec<T>>, item: T) -> Arc<Vec<T>> {
    let mut items = list.as_ref().clone();
    match items.iter().position(|x| x.id() == item.id()) {
        Some(i) => items[i] = item,
        None => items.push(item),
    }
    Arc::new(items)
}

fn remove<T: Keyed + Clone>(list: &Arc<Vec<T>>, id: &str) -> Arc<Vec<T>> {
    if !list.iter().any(|x| x.id() == id) {
        return Arc::clone(list);
    }
    Arc::new(list.iter().filter(|x| x.id() != id).cloned().collect())
}

/// Keep the first position of each id with the last value seen for it.
fn dedup<T: Keyed>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        match out.iter().position(|x| x.id() == item.id()) {
            Some(i) => out[i] = item,
            None => out.push(item),
        }
    }
    out
}

fn envelope<T>(
    result: ApiResult<ApiResponse<T>>,
) -> Result<(T, Option<Pagination>), ActionFailure> {
    let envelope = result.map_err(ActionFailure::from)?;
    let pagination = envelope.pagination.clone();
    let data = envelope.into_data().map_err(ActionFailure::new)?;
    Ok((data, pagination))
}

pub struct AppStore {
    api: Arc<ApiClient>,
    notifications: NotificationQueue,
    state: watch::Sender<Arc<AppState>>,
    next_seq: AtomicU64,
}

impl AppStore {
    pub fn new(api: Arc<ApiClient>, notifications: NotificationQueue) -> Self {
        let (state, _) = watch::channel(Arc::new(AppState::default()));
        Self {
            api,
            notifications,
            state,
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.state.subscribe()
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn clear_error(&self) {
        self.dispatch(AppAction::ClearError);
    }

    fn dispatch(&self, action: AppAction) {
        self.state
            .send_modify(|current| *current = Arc::new(reduce(current, action)));
    }

    fn begin_load(&self, key: CollectionKey) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%key, seq, "load started");
        self.dispatch(AppAction::LoadStarted { key, seq });
        seq
    }

    fn settle_load(
        &self,
        key: CollectionKey,
        seq: u64,
        outcome: Result<LoadedData, ActionFailure>,
    ) -> Result<(), ActionFailure> {
        let current = self.state.borrow().latest_load(key) == seq;
        match outcome {
            Ok(data) => {
                if !current {
                    debug!(%key, seq, "discarding superseded load result");
                }
                self.dispatch(AppAction::LoadSucceeded {
                    seq,
                    data,
                    at: Utc::now(),
                });
                Ok(())
            }
            Err(failure) => {
                if current {
                    warn!(%key, error = %failure, "load failed");
                    self.dispatch(AppAction::LoadFailed {
                        key,
                        seq,
                        message: failure.message.clone(),
                    });
                    self.notifications.add(
                        NewNotification::error(failure.message.clone())
                            .with_title(format!("Failed to load {}", key.label())),
                    );
                } else {
                    debug!(%key, seq, "discarding superseded load failure");
                }
                Err(failure)
            }
        }
    }

    /// Unwrap a mutation response, recording the failure when there is one.
    fn acknowledged<T>(
        &self,
        result: ApiResult<ApiResponse<T>>,
        failure_title: &str,
    ) -> Result<Option<T>, ActionFailure> {
        let outcome = match result {
            Ok(env) if env.success => Ok(env.data),
            Ok(env) => Err(ActionFailure::new(
                env.message
                    .unwrap_or_else(|| crate::error::GENERIC_REQUEST_MESSAGE.to_string()),
            )),
            Err(e) => Err(ActionFailure::from(&e)),
        };
        if let Err(failure) = &outcome {
            self.record_failure(failure, failure_title);
        }
        outcome
    }

    fn record_failure(&self, failure: &ActionFailure, title: &str) {
        warn!(error = %failure, "{}", title);
        self.dispatch(AppAction::MutationFailed {
            message: failure.message.clone(),
        });
        self.notifications
            .add(NewNotification::error(failure.message.clone()).with_title(title));
    }

    /// Like [`Self::acknowledged`] for endpoints that must echo the entity back.
    fn returned<T>(
        &self,
        result: ApiResult<ApiResponse<T>>,
        failure_title: &str,
    ) -> Result<T, ActionFailure> {
        match self.acknowledged(result, failure_title)? {
            Some(data) => Ok(data),
            None => {
                let failure = ActionFailure::new(crate::error::GENERIC_REQUEST_MESSAGE);
                self.record_failure(&failure, failure_title);
                Err(failure)
            }
        }
    }

    fn notify_success(&self, message: String) {
        self.notifications.add(NewNotification::success(message));
    }

    // ----- categories -----

    #[instrument(skip(self))]
    pub async fn load_categories(&self, kind: Option<EntryType>) -> Result<(), ActionFailure> {
        let seq = self.begin_load(CollectionKey::Categories);
        let outcome = envelope(self.api.get_categories(kind).await)
            .map(|(items, _)| LoadedData::Categories(items));
        self.settle_load(CollectionKey::Categories, seq, outcome)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: &NewCategory) -> Result<Category, ActionFailure> {
        let category = self.returned(
            self.api.create_category(input).await,
            "Could not create category",
        )?;
        info!(id = %category.id, "category created");
        self.dispatch(AppAction::Created {
            record: Record::Category(category.clone()),
            at: Utc::now(),
        });
        self.notify_success(format!("Category \"{}\" created", category.name));
        Ok(category)
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: &str,
        input: &CategoryUpdate,
    ) -> Result<Category, ActionFailure> {
        let category = self.returned(
            self.api.update_category(id, input).await,
            "Could not update category",
        )?;
        self.dispatch(AppAction::Updated {
            record: Record::Category(category.clone()),
            at: Utc::now(),
        });
        self.notify_success(format!("Category \"{}\" updated", category.name));
        Ok(category)
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &str) -> Result<(), ActionFailure> {
        self.acknowledged(
            self.api.delete_category(id).await,
            "Could not delete category",
        )?;
        self.dispatch(AppAction::Deleted {
            key: CollectionKey::Categories,
            id: id.to_string(),
            at: Utc::now(),
        });
        self.notify_success("Category deleted".to_string());
        Ok(())
    }

    // ----- transactions -----

    #[instrument(skip(self, query))]
    pub async fn load_transactions(&self, query: &TransactionQuery) -> Result<(), ActionFailure> {
        let seq = self.begin_load(CollectionKey::Transactions);
        let outcome = envelope(self.api.get_transactions(query).await)
            .map(|(items, pagination)| LoadedData::Transactions { items, pagination });
        self.settle_load(CollectionKey::Transactions, seq, outcome)
    }

    /// Every page matching `query`, merged and stored as a single load.
    #[instrument(skip(self, query))]
    pub async fn load_all_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<(), ActionFailure> {
        let seq = self.begin_load(CollectionKey::Transactions);
        let outcome = self
            .fetch_pages(query)
            .await
            .map(|(items, pagination)| LoadedData::Transactions { items, pagination });
        self.settle_load(CollectionKey::Transactions, seq, outcome)
    }

    async fn fetch_pages(
        &self,
        query: &TransactionQuery,
    ) -> Result<(Vec<Transaction>, Option<Pagination>), ActionFailure> {
        let mut query = query.clone();
        let mut page = query.page.unwrap_or(1);
        let mut items = Vec::new();
        loop {
            query.page = Some(page);
            let (batch, pagination) = envelope(self.api.get_transactions(&query).await)?;
            let fetched = batch.len();
            items.extend(batch);
            match pagination {
                Some(p) if page < p.pages && fetched > 0 => {
                    debug!(page, pages = p.pages, "fetching next transaction page");
                    page += 1;
                }
                last => return Ok((items, last)),
            }
        }
    }

    #[instrument(skip(self, input), fields(amount = %input.amount, kind = %input.kind))]
    pub async fn create_transaction(
        &self,
        input: &NewTransaction,
    ) -> Result<Transaction, ActionFailure> {
        let tx = self.returned(
            self.api.create_transaction(input).await,
            "Could not add transaction",
        )?;
        info!(id = %tx.id, "transaction created");
        self.dispatch(AppAction::Created {
            record: Record::Transaction(tx.clone()),
            at: Utc::now(),
        });
        self.notify_success("Transaction added successfully".to_string());
        Ok(tx)
    }

    #[instrument(skip(self, input))]
    pub async fn update_transaction(
        &self,
        id: &str,
        input: &TransactionUpdate,
    ) -> Result<Transaction, ActionFailure> {
        let tx = self.returned(
            self.api.update_transaction(id, input).await,
            "Could not update transaction",
        )?;
        self.dispatch(AppAction::Updated {
            record: Record::Transaction(tx.clone()),
            at: Utc::now(),
        });
        self.notify_success("Transaction updated successfully".to_string());
        Ok(tx)
    }

    #[instrument(skip(self))]
    pub async fn delete_transaction(&self, id: &str) -> Result<(), ActionFailure> {
        self.acknowledged(
            self.api.delete_transaction(id).await,
            "Could not delete transaction",
        )?;
        self.dispatch(AppAction::Deleted {
            key: CollectionKey::Transactions,
            id: id.to_string(),
            at: Utc::now(),
        });
        self.notify_success("Transaction deleted".to_string());
        Ok(())
    }

    // ----- goals -----

    #[instrument(skip(self))]
    pub async fn load_goals(&self, status: Option<GoalStatus>) -> Result<(), ActionFailure> {
        let seq = self.begin_load(CollectionKey::Goals);
        let outcome =
            envelope(self.api.get_goals(status).await).map(|(items, _)| LoadedData::Goals(items));
        self.settle_load(CollectionKey::Goals, seq, outcome)
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_goal(&self, input: &NewGoal) -> Result<Goal, ActionFailure> {
        let goal = self.returned(self.api.create_goal(input).await, "Could not create goal")?;
        info!(id = %goal.id, "goal created");
        self.dispatch(AppAction::Created {
            record: Record::Goal(goal.clone()),
            at: Utc::now(),
        });
        self.notify_success(format!("Goal \"{}\" created", goal.title));
        Ok(goal)
    }

    #[instrument(skip(self, input))]
    pub async fn update_goal(&self, id: &str, input: &GoalUpdate) -> Result<Goal, ActionFailure> {
        let goal = self.returned(
            self.api.update_goal(id, input).await,
            "Could not update goal",
        )?;
        self.dispatch(AppAction::Updated {
            record: Record::Goal(goal.clone()),
            at: Utc::now(),
        });
        self.notify_success(format!("Goal \"{}\" updated", goal.title));
        Ok(goal)
    }

    #[instrument(skip(self))]
    pub async fn contribute_to_goal(
        &self,
        id: &str,
        amount: Decimal,
    ) -> Result<Goal, ActionFailure> {
        if amount <= Decimal::ZERO {
            let failure =
                ActionFailure::invalid_field("amount", "Amount must be greater than zero.");
            self.record_failure(&failure, "Could not update goal progress");
            return Err(failure);
        }
        let goal = self.returned(
            self.api.contribute_to_goal(id, amount).await,
            "Could not update goal progress",
        )?;
        self.dispatch(AppAction::Updated {
            record: Record::Goal(goal.clone()),
            at: Utc::now(),
        });
        self.notify_success(format!("Added {} to \"{}\"", amount, goal.title));
        Ok(goal)
    }

    #[instrument(skip(self))]
    pub async fn delete_goal(&self, id: &str) -> Result<(), ActionFailure> {
        self.acknowledged(self.api.delete_goal(id).await, "Could not delete goal")?;
        self.dispatch(AppAction::Deleted {
            key: CollectionKey::Goals,
            id: id.to_string(),
            at: Utc::now(),
        });
        self.notify_success("Goal deleted".to_string());
        Ok(())
    }

    // ----- dashboard -----

    /// Fetch overview and stats together; both must succeed for the snapshot to change.
    #[instrument(skip(self))]
    pub async fn load_dashboard(&self, period: Option<&str>) -> Result<(), ActionFailure> {
        let seq = self.begin_load(CollectionKey::Dashboard);
        let (overview, stats) = tokio::join!(self.api.get_overview(period), self.api.get_stats());
        let outcome = envelope(overview).and_then(|(overview, _)| {
            envelope(stats).map(|(stats, _)| LoadedData::Dashboard(DashboardData { overview, stats }))
        });
        self.settle_load(CollectionKey::Dashboard, seq, outcome)
    }

    /// Re-fetch every collection. Returns the first failure, after all loads settle.
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) -> Result<(), ActionFailure> {
        let query = TransactionQuery::default();
        let (categories, transactions, goals, dashboard) = tokio::join!(
            self.load_categories(None),
            self.load_transactions(&query),
            self.load_goals(None),
            self.load_dashboard(None),
        );
        categories.and(transactions).and(goals).and(dashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryType;
    use chrono::TimeZone;

    fn cat(id: &str, name: &str) -> Category {
        Category {
            id: id.into(),
            name: name.into(),
            kind: EntryType::Expense,
            color: "#000".into(),
            icon: "tag".into(),
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn loaded(state: &AppState, seq: u64, items: Vec<Category>) -> AppState {
        let started = reduce(
            state,
            AppAction::LoadStarted {
                key: CollectionKey::Categories,
                seq,
            },
        );
        reduce(
            &started,
            AppAction::LoadSucceeded {
                seq,
                data: LoadedData::Categories(items),
                at: at(),
            },
        )
    }

    #[test]
    fn mutation_sequences_keep_ids_unique() {
        let mut state = loaded(&AppState::default(), 1, vec![cat("a", "A"), cat("b", "B")]);
        let actions = vec![
            AppAction::Created {
                record: Record::Category(cat("c", "C")),
                at: at(),
            },
            AppAction::Created {
                record: Record::Category(cat("a", "A again")),
                at: at(),
            },
            AppAction::Updated {
                record: Record::Category(cat("z", "unknown locally")),
                at: at(),
            },
            AppAction::Updated {
                record: Record::Category(cat("b", "B2")),
                at: at(),
            },
            AppAction::Deleted {
                key: CollectionKey::Categories,
                id: "c".into(),
                at: at(),
            },
            AppAction::Deleted {
                key: CollectionKey::Categories,
                id: "c".into(),
                at: at(),
            },
        ];
        for action in actions {
            state = reduce(&state, action);
            let mut ids: Vec<&str> = state.categories.iter().map(|c| c.id.as_str()).collect();
            let before = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), before);
        }
        let names: Vec<&str> = state.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A again", "B2", "unknown locally"]);
    }

    #[test]
    fn superseded_load_result_is_ignored() {
        let s1 = reduce(
            &AppState::default(),
            AppAction::LoadStarted {
                key: CollectionKey::Categories,
                seq: 1,
            },
        );
        let s2 = reduce(
            &s1,
            AppAction::LoadStarted {
                key: CollectionKey::Categories,
                seq: 2,
            },
        );
        let newer = reduce(
            &s2,
            AppAction::LoadSucceeded {
                seq: 2,
                data: LoadedData::Categories(vec![cat("new", "New")]),
                at: at(),
            },
        );
        let after_stale = reduce(
            &newer,
            AppAction::LoadSucceeded {
                seq: 1,
                data: LoadedData::Categories(vec![cat("old", "Old")]),
                at: at(),
            },
        );
        assert_eq!(after_stale.categories[0].id, "new");
        assert!(!after_stale.loading.categories);

        let stale_failure = reduce(
            &after_stale,
            AppAction::LoadFailed {
                key: CollectionKey::Categories,
                seq: 1,
                message: "late".into(),
            },
        );
        assert!(stale_failure.error.is_none());
    }

    #[test]
    fn failures_leave_collections_untouched() {
        let state = loaded(&AppState::default(), 1, vec![cat("a", "A")]);
        let failed = reduce(
            &state,
            AppAction::MutationFailed {
                message: "nope".into(),
            },
        );
        assert!(Arc::ptr_eq(&state.categories, &failed.categories));
        assert_eq!(failed.error.as_deref(), Some("nope"));

        let restarted = reduce(
            &failed,
            AppAction::LoadStarted {
                key: CollectionKey::Categories,
                seq: 2,
            },
        );
        let load_failed = reduce(
            &restarted,
            AppAction::LoadFailed {
                key: CollectionKey::Categories,
                seq: 2,
                message: "offline".into(),
            },
        );
        assert!(Arc::ptr_eq(&state.categories, &load_failed.categories));
        assert!(!load_failed.loading.categories);
        assert_eq!(load_failed.last_updated.categories, Some(at()));
    }

    #[test]
    fn success_clears_error_and_stamps_freshness() {
        let failed = reduce(
            &AppState::default(),
            AppAction::MutationFailed {
                message: "x".into(),
            },
        );
        let created = reduce(
            &failed,
            AppAction::Created {
                record: Record::Category(cat("a", "A")),
                at: at(),
            },
        );
        assert!(created.error.is_none());
        assert_eq!(created.last_updated.categories, Some(at()));
        assert_eq!(created.last_updated.goals, None);
    }
}

//! Per-resource containers holding `{items, loading, error}`.
//!
//! Containers own their data. Service failures never escape: they are
//! translated with [`handle_api_error`] and stored in `error`.

use crate::error::{handle_api_error, Result};
use crate::services::{BudgetService, CategoryService, TransactionService};
use async_trait::async_trait;
use fintrack_core::validation::ensure_category_deletable;
use fintrack_core::{
    Budget, BudgetAnalysis, BudgetForm, BudgetId, BudgetUpdate, Category, CategoryForm,
    CategoryId, CategoryUpdate, Transaction, TransactionFilters, TransactionForm, TransactionId,
    TransactionStats, TransactionUpdate,
};
use std::future::Future;
use tracing::debug;

/// Where newly created items go in the local collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Prepend,
    Append,
}

/// CRUD surface a [`ResourceCollection`] drives
#[async_trait]
pub trait ResourceApi: Send + Sync {
    type Item: Clone + Send + Sync;
    type Id: PartialEq + Send + Sync;
    type Create: Send + Sync;
    type Update: Send + Sync;
    /// List parameters; changing them triggers a refetch
    type Query: Clone + PartialEq + Default + Send + Sync;

    const INSERTION: Insertion;

    fn id_of(item: &Self::Item) -> &Self::Id;

    async fn list(&self, query: &Self::Query) -> Result<Vec<Self::Item>>;
    async fn create(&self, form: &Self::Create) -> Result<Self::Item>;
    async fn update(&self, id: &Self::Id, update: &Self::Update) -> Result<Self::Item>;
    async fn delete(&self, id: &Self::Id) -> Result<()>;
}

#[async_trait]
impl ResourceApi for TransactionService {
    type Item = Transaction;
    type Id = TransactionId;
    type Create = TransactionForm;
    type Update = TransactionUpdate;
    type Query = TransactionFilters;

    const INSERTION: Insertion = Insertion::Prepend;

    fn id_of(item: &Transaction) -> &TransactionId {
        &item.id
    }

    async fn list(&self, query: &TransactionFilters) -> Result<Vec<Transaction>> {
        TransactionService::list(self, query).await
    }

    async fn create(&self, form: &TransactionForm) -> Result<Transaction> {
        TransactionService::create(self, form).await
    }

    async fn update(&self, id: &TransactionId, update: &TransactionUpdate) -> Result<Transaction> {
        TransactionService::update(self, id, update).await
    }

    async fn delete(&self, id: &TransactionId) -> Result<()> {
        TransactionService::delete(self, id).await
    }
}

#[async_trait]
impl ResourceApi for CategoryService {
    type Item = Category;
    type Id = CategoryId;
    type Create = CategoryForm;
    type Update = CategoryUpdate;
    type Query = ();

    const INSERTION: Insertion = Insertion::Append;

    fn id_of(item: &Category) -> &CategoryId {
        &item.id
    }

    async fn list(&self, _query: &()) -> Result<Vec<Category>> {
        CategoryService::list(self).await
    }

    async fn create(&self, form: &CategoryForm) -> Result<Category> {
        CategoryService::create(self, form).await
    }

    async fn update(&self, id: &CategoryId, update: &CategoryUpdate) -> Result<Category> {
        CategoryService::update(self, id, update).await
    }

    async fn delete(&self, id: &CategoryId) -> Result<()> {
        CategoryService::delete(self, id).await
    }
}

#[async_trait]
impl ResourceApi for BudgetService {
    type Item = Budget;
    type Id = BudgetId;
    type Create = BudgetForm;
    type Update = BudgetUpdate;
    type Query = ();

    const INSERTION: Insertion = Insertion::Append;

    fn id_of(item: &Budget) -> &BudgetId {
        &item.id
    }

    async fn list(&self, _query: &()) -> Result<Vec<Budget>> {
        BudgetService::list(self).await
    }

    async fn create(&self, form: &BudgetForm) -> Result<Budget> {
        BudgetService::create(self, form).await
    }

    async fn update(&self, id: &BudgetId, update: &BudgetUpdate) -> Result<Budget> {
        BudgetService::update(self, id, update).await
    }

    async fn delete(&self, id: &BudgetId) -> Result<()> {
        BudgetService::delete(self, id).await
    }
}

/// A fetched collection with its loading and error state
pub struct ResourceCollection<A: ResourceApi> {
    api: A,
    query: A::Query,
    items: Vec<A::Item>,
    loading: bool,
    error: Option<String>,
    loaded: bool,
}

pub type TransactionsStore = ResourceCollection<TransactionService>;
pub type CategoriesStore = ResourceCollection<CategoryService>;
pub type BudgetsStore = ResourceCollection<BudgetService>;

impl<A: ResourceApi> ResourceCollection<A> {
    /// Empty container; `loading` until the first fetch completes
    pub fn new(api: A) -> Self {
        Self::with_query(api, A::Query::default())
    }

    pub fn with_query(api: A, query: A::Query) -> Self {
        Self {
            api,
            query,
            items: Vec::new(),
            loading: true,
            error: None,
            loaded: false,
        }
    }

    pub fn items(&self) -> &[A::Item] {
        &self.items
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn query(&self) -> &A::Query {
        &self.query
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch unless a fetch has already been made
    pub async fn ensure_loaded(&mut self) {
        if !self.loaded {
            self.fetch().await;
        }
    }

    /// Replace the query and refetch if it changed
    pub async fn set_query(&mut self, query: A::Query) {
        if query != self.query || !self.loaded {
            self.query = query;
            self.fetch().await;
        }
    }

    /// Reload the collection. On failure the old items are kept.
    pub async fn fetch(&mut self) {
        self.loading = true;
        self.error = None;
        match self.api.list(&self.query).await {
            Ok(items) => {
                debug!(count = items.len(), "Fetched collection");
                self.items = items;
            }
            Err(e) => self.error = Some(handle_api_error(&e)),
        }
        self.loaded = true;
        self.loading = false;
    }

    pub async fn refresh(&mut self) {
        self.fetch().await;
    }

    pub async fn create(&mut self, form: &A::Create) -> Option<A::Item> {
        match self.api.create(form).await {
            Ok(item) => {
                match A::INSERTION {
                    Insertion::Prepend => self.items.insert(0, item.clone()),
                    Insertion::Append => self.items.push(item.clone()),
                }
                Some(item)
            }
            Err(e) => {
                self.error = Some(handle_api_error(&e));
                None
            }
        }
    }

    pub async fn update(&mut self, id: &A::Id, update: &A::Update) -> Option<A::Item> {
        match self.api.update(id, update).await {
            Ok(item) => {
                if let Some(slot) = self.items.iter_mut().find(|i| A::id_of(i) == id) {
                    *slot = item.clone();
                }
                Some(item)
            }
            Err(e) => {
                self.error = Some(handle_api_error(&e));
                None
            }
        }
    }

    pub async fn delete(&mut self, id: &A::Id) -> bool {
        match self.api.delete(id).await {
            Ok(()) => {
                self.items.retain(|i| A::id_of(i) != id);
                true
            }
            Err(e) => {
                self.error = Some(handle_api_error(&e));
                false
            }
        }
    }
}

impl CategoriesStore {
    /// Delete unless only the minimum number of categories remain.
    ///
    /// A refusal is stored in `error` without calling the server.
    pub async fn delete_keeping_minimum(&mut self, id: &CategoryId) -> bool {
        if let Err(e) = ensure_category_deletable(self.items.len()) {
            self.error = Some(e.to_string());
            return false;
        }
        self.delete(id).await
    }
}

/// A single fetched value with its loading and error state
#[derive(Debug, Clone)]
pub struct Loadable<T> {
    value: Option<T>,
    loading: bool,
    error: Option<String>,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self {
            value: None,
            loading: true,
            error: None,
        }
    }
}

impl<T> Loadable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Run `fetch`, keeping the previous value on failure
    pub async fn load<F>(&mut self, fetch: F)
    where
        F: Future<Output = Result<T>>,
    {
        self.loading = true;
        self.error = None;
        match fetch.await {
            Ok(value) => self.value = Some(value),
            Err(e) => self.error = Some(handle_api_error(&e)),
        }
        self.loading = false;
    }

    /// Nothing to fetch
    pub fn skip(&mut self) {
        self.loading = false;
    }

    async fn load_keyed<K, F, Fut>(key: Option<K>, fetch: F) -> Self
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut state = Self::new();
        match key {
            Some(key) => state.load(fetch(key)).await,
            None => state.skip(),
        }
        state
    }
}

pub async fn load_transaction(
    service: &TransactionService,
    id: Option<&TransactionId>,
) -> Loadable<Transaction> {
    Loadable::load_keyed(id, |id| service.get(id)).await
}

pub async fn load_category(
    service: &CategoryService,
    id: Option<&CategoryId>,
) -> Loadable<Category> {
    Loadable::load_keyed(id, |id| service.get(id)).await
}

pub async fn load_budget(service: &BudgetService, id: Option<&BudgetId>) -> Loadable<Budget> {
    Loadable::load_keyed(id, |id| service.get(id)).await
}

pub async fn load_budget_analysis(
    service: &BudgetService,
    id: Option<&BudgetId>,
) -> Loadable<BudgetAnalysis> {
    Loadable::load_keyed(id, |id| service.analysis(id)).await
}

pub async fn load_transaction_stats(
    service: &TransactionService,
    period: Option<&str>,
) -> Loadable<TransactionStats> {
    let mut state = Loadable::new();
    state.load(service.stats(period)).await;
    state
}

pub async fn load_recent_transactions(
    service: &TransactionService,
    limit: usize,
) -> Loadable<Vec<Transaction>> {
    let mut state = Loadable::new();
    state.load(service.recent(limit)).await;
    state
}

pub async fn load_active_budgets(service: &BudgetService) -> Loadable<Vec<Budget>> {
    let mut state = Loadable::new();
    state.load(service.active()).await;
    state
}

/// Name search; a blank query yields an empty list without a request
pub async fn search_categories(service: &CategoryService, query: &str) -> Loadable<Vec<Category>> {
    let mut state = Loadable::new();
    if query.trim().is_empty() {
        state.value = Some(Vec::new());
        state.skip();
    } else {
        state.load(service.search(query)).await;
    }
    state
}

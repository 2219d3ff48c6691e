//! Generic list/detail controller for one resource: paginated, filtered fetch; debounced search;
//! create/update/delete applied to the held page without refetching.

use crate::config::ResolvedResource;
use crate::context::{AuthContext, Notifier};
use crate::controller::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::error::ClientError;
use crate::item::ResourceItem;
use crate::query::list_query;
use crate::response::{decode_item, decode_list};
use crate::service::{FormPayload, HttpApi, RequestValidator, ResourceApi, UploadPipeline, Uploader};
use crate::state::{FilterState, ListState};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// Capabilities shared by every controller of a session.
#[derive(Clone)]
pub struct ControllerContext {
    pub api: Arc<dyn ResourceApi>,
    pub uploader: Arc<dyn Uploader>,
    pub auth: Arc<dyn AuthContext>,
    pub notifier: Arc<dyn Notifier>,
}

impl ControllerContext {
    /// One `HttpApi` serves both the resource endpoints and `/upload`.
    pub fn http(api: HttpApi, auth: Arc<dyn AuthContext>, notifier: Arc<dyn Notifier>) -> Self {
        let api = Arc::new(api);
        ControllerContext {
            api: api.clone(),
            uploader: api,
            auth,
            notifier,
        }
    }
}

/// Cheap to clone; clones drive the same list.
#[derive(Clone)]
pub struct ListController {
    inner: Arc<Inner>,
}

struct Inner {
    resource: Arc<ResolvedResource>,
    ctx: ControllerContext,
    uploads: UploadPipeline,
    state: RwLock<ListState>,
    filters: RwLock<FilterState>,
    /// Raw search input; the filter only changes when the debounce fires.
    search_input: RwLock<String>,
    search: Debouncer,
    /// Sequence number of the latest issued list fetch.
    generation: AtomicU64,
    loads_in_flight: AtomicUsize,
    mutations_in_flight: AtomicUsize,
}

impl Inner {
    fn state(&self) -> RwLockReadGuard<'_, ListState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, ListState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn filters_mut(&self) -> RwLockWriteGuard<'_, FilterState> {
        self.filters.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counts one in-flight request; released on drop so a cancelled future still settles.
struct InFlight<'a> {
    inner: &'a Inner,
    load: bool,
}

impl<'a> InFlight<'a> {
    fn load(inner: &'a Inner) -> Self {
        inner.loads_in_flight.fetch_add(1, Ordering::SeqCst);
        inner.state_mut().loading = true;
        InFlight { inner, load: true }
    }

    fn mutation(inner: &'a Inner) -> Self {
        inner.mutations_in_flight.fetch_add(1, Ordering::SeqCst);
        InFlight { inner, load: false }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.load {
            let left = self.inner.loads_in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            self.inner.state_mut().loading = left > 0;
        } else {
            self.inner.mutations_in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl ListController {
    pub fn new(resource: Arc<ResolvedResource>, ctx: ControllerContext, page_size: u32) -> Self {
        let uploads = UploadPipeline::new(ctx.uploader.clone());
        ListController {
            inner: Arc::new(Inner {
                resource,
                ctx,
                uploads,
                state: RwLock::new(ListState::new(page_size.max(1))),
                filters: RwLock::new(FilterState::new()),
                search_input: RwLock::new(String::new()),
                search: Debouncer::new(SEARCH_DEBOUNCE),
                generation: AtomicU64::new(0),
                loads_in_flight: AtomicUsize::new(0),
                mutations_in_flight: AtomicUsize::new(0),
            }),
        }
    }

    pub fn resource(&self) -> &ResolvedResource {
        &self.inner.resource
    }

    /// Snapshot of the held page.
    pub fn state(&self) -> ListState {
        self.inner.state().clone()
    }

    pub fn filters(&self) -> FilterState {
        self.inner.filters.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Last value given to `set_search_term`, debounced or not.
    pub fn search_input(&self) -> String {
        self.inner.search_input.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Any fetch or mutation in flight.
    pub fn is_busy(&self) -> bool {
        self.inner.loads_in_flight.load(Ordering::SeqCst) > 0 || self.inner.mutations_in_flight.load(Ordering::SeqCst) > 0
    }

    fn token(&self) -> Option<String> {
        self.inner.ctx.auth.token()
    }

    fn require(&self, operation: &str) -> Result<(), ClientError> {
        if self.inner.resource.allows(operation) {
            Ok(())
        } else {
            Err(ClientError::validation(format!(
                "{} not allowed on {}",
                operation, self.inner.resource.path_segment
            )))
        }
    }

    /// Fetch the current page with the current filters and replace the held items.
    /// Only the response to the most recently issued fetch is applied; older ones are dropped.
    /// On failure the held items stay and `ListState::error` is set.
    pub async fn load(&self) -> Result<ListState, ClientError> {
        self.require("list")?;
        let inner = &*self.inner;
        let resource = &inner.resource;
        let seq = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = {
            let st = inner.state();
            let filters = inner.filters.read().unwrap_or_else(PoisonError::into_inner);
            list_query(resource, st.page, st.page_size, &filters)
        };

        let flight = InFlight::load(inner);
        let token = self.token();
        let result = inner
            .ctx
            .api
            .list(&resource.path_segment, &query, token.as_deref())
            .await
            .and_then(|body| decode_list(body, &resource.list_key));
        drop(flight);

        if inner.generation.load(Ordering::SeqCst) != seq {
            tracing::debug!(resource = %resource.path_segment, seq, "discarding stale list response");
            return Ok(self.state());
        }

        let mut st = inner.state_mut();
        match result {
            Ok(page) => {
                tracing::debug!(resource = %resource.path_segment, rows = page.items.len(), total = page.total, "list loaded");
                st.replace_page(page);
                Ok(st.clone())
            }
            Err(e) => {
                tracing::warn!(resource = %resource.path_segment, error = %e, "list fetch failed");
                st.error = Some(format!("Failed to fetch {}.", resource.collection_name()));
                Err(e)
            }
        }
    }

    /// Go to `page` (1-based) and refetch.
    pub async fn set_page(&self, page: u32) -> Result<ListState, ClientError> {
        if page == 0 {
            return Err(ClientError::validation("page starts at 1"));
        }
        self.inner.state_mut().page = page;
        self.load().await
    }

    /// Change the page size; a different size goes back to page 1. Refetches.
    pub async fn set_page_size(&self, page_size: u32) -> Result<ListState, ClientError> {
        if page_size == 0 {
            return Err(ClientError::validation("page size must be positive"));
        }
        {
            let mut st = self.inner.state_mut();
            if st.page_size != page_size {
                st.page_size = page_size;
                st.page = 1;
            }
        }
        self.load().await
    }

    /// Set or clear one filter immediately and refetch at the current page.
    pub async fn set_filter(&self, key: &str, value: Option<Value>) -> Result<ListState, ClientError> {
        self.inner.filters_mut().set(key, value);
        self.load().await
    }

    /// Free-text search, debounced. When the debounced term differs from the applied one, the
    /// search filter is updated, the page resets to 1 and the list is refetched once.
    /// Must be called inside a tokio runtime.
    pub fn set_search_term(&self, term: &str) {
        *self.inner.search_input.write().unwrap_or_else(PoisonError::into_inner) = term.to_string();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let term = term.trim().to_string();
        self.inner.search.call(async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let controller = ListController { inner };
            controller.apply_search(term).await;
        });
    }

    /// Wait until a pending debounced search has been applied (and its refetch settled).
    pub async fn flush_search(&self) {
        self.inner.search.flush().await;
    }

    async fn apply_search(&self, term: String) {
        let Some(param) = self.inner.resource.search_param.clone() else {
            tracing::debug!(resource = %self.inner.resource.path_segment, "resource has no search param");
            return;
        };
        let value = if term.is_empty() { None } else { Some(Value::String(term)) };
        let changed = self.inner.filters_mut().set(&param, value);
        if !changed {
            return;
        }
        self.inner.state_mut().page = 1;
        // Failure is already recorded in the list state.
        let _ = self.load().await;
    }

    /// GET `{resource}/{id}` for a detail view. Held state is not touched.
    pub async fn read(&self, id: i64) -> Result<ResourceItem, ClientError> {
        self.require("read")?;
        let _flight = InFlight::mutation(&self.inner);
        let token = self.token();
        let body = self
            .inner
            .ctx
            .api
            .read(&self.inner.resource.path_segment, id, token.as_deref())
            .await?;
        decode_item(body)
    }

    /// Upload files, validate, POST, and append the created item to the held page.
    pub async fn create(&self, form: FormPayload) -> Result<ResourceItem, ClientError> {
        let label = self.inner.resource.label.clone();
        let result = self.try_create(form).await;
        match &result {
            Ok(item) => {
                tracing::info!(resource = %self.inner.resource.path_segment, id = item.id(), "created");
                self.inner.ctx.notifier.success(&format!("{} added", label));
            }
            Err(e) => {
                tracing::warn!(resource = %self.inner.resource.path_segment, error = %e, "create failed");
                self.inner
                    .ctx
                    .notifier
                    .error(&format!("Failed to add {}: {}", label, e.user_message()));
            }
        }
        result
    }

    async fn try_create(&self, form: FormPayload) -> Result<ResourceItem, ClientError> {
        self.require("create")?;
        let inner = &*self.inner;
        let _flight = InFlight::mutation(inner);
        let prepared = inner.uploads.prepare(form, &inner.resource)?;
        RequestValidator::validate_prepared(&prepared, &inner.resource, false)?;
        let token = self.token();
        let body = inner.uploads.upload(prepared, token.as_deref()).await?;
        RequestValidator::validate(&body, &inner.resource)?;
        let created = inner
            .ctx
            .api
            .create(&inner.resource.path_segment, &body, token.as_deref())
            .await?;
        let item = decode_item(created)?;
        inner.state_mut().push(item.clone());
        Ok(item)
    }

    /// Upload files, validate, PATCH, and shallow-merge the sent fields into the held item.
    pub async fn update(&self, id: i64, form: FormPayload) -> Result<(), ClientError> {
        let label = self.inner.resource.label.clone();
        let result = self.try_update(id, form).await;
        match &result {
            Ok(()) => {
                tracing::info!(resource = %self.inner.resource.path_segment, id, "updated");
                self.inner.ctx.notifier.success(&format!("{} updated", label));
            }
            Err(e) => {
                tracing::warn!(resource = %self.inner.resource.path_segment, id, error = %e, "update failed");
                self.inner
                    .ctx
                    .notifier
                    .error(&format!("Failed to save {}: {}", label, e.user_message()));
            }
        }
        result
    }

    async fn try_update(&self, id: i64, form: FormPayload) -> Result<(), ClientError> {
        self.require("update")?;
        let inner = &*self.inner;
        let _flight = InFlight::mutation(inner);
        let prepared = inner.uploads.prepare(form, &inner.resource)?;
        RequestValidator::validate_prepared(&prepared, &inner.resource, true)?;
        let token = self.token();
        let body = inner.uploads.upload(prepared, token.as_deref()).await?;
        RequestValidator::validate_partial(&body, &inner.resource)?;
        inner
            .ctx
            .api
            .update(&inner.resource.path_segment, id, &body, token.as_deref())
            .await?;
        if !inner.state_mut().merge(id, &body) {
            tracing::debug!(resource = %inner.resource.path_segment, id, "updated item not on the held page");
        }
        Ok(())
    }

    /// DELETE `{resource}/{id}` and drop the item from the held page. Asking the user for
    /// confirmation is up to the caller.
    pub async fn remove(&self, id: i64) -> Result<(), ClientError> {
        let label = self.inner.resource.label.clone();
        let result = self.try_remove(id).await;
        match &result {
            Ok(()) => {
                tracing::info!(resource = %self.inner.resource.path_segment, id, "deleted");
                self.inner.ctx.notifier.success(&format!("{} deleted", label));
            }
            Err(e) => {
                tracing::warn!(resource = %self.inner.resource.path_segment, id, error = %e, "delete failed");
                self.inner
                    .ctx
                    .notifier
                    .error(&format!("Failed to delete {}: {}", label, e.user_message()));
            }
        }
        result
    }

    async fn try_remove(&self, id: i64) -> Result<(), ClientError> {
        self.require("delete")?;
        let inner = &*self.inner;
        let _flight = InFlight::mutation(inner);
        let token = self.token();
        inner
            .ctx
            .api
            .delete(&inner.resource.path_segment, id, token.as_deref())
            .await?;
        inner.state_mut().remove(id);
        Ok(())
    }
}

//! Incremental option list for pickers (e.g. products while editing a discount).

use crate::config::ResolvedResource;
use crate::controller::list::ControllerContext;
use crate::error::ClientError;
use crate::item::ResourceItem;
use crate::query::{page_query, ListQuery};
use crate::response::{decode_list, page_count};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

pub const OPTION_PAGE_SIZE: u32 = 10;

#[derive(Debug)]
struct Cursor {
    next_page: u32,
    total_pages: Option<u64>,
    seen: HashSet<i64>,
    options: Vec<ResourceItem>,
}

/// Accumulates pages of a resource into one id-deduplicated list, independently of any
/// `ListController` on the same resource.
pub struct OptionLoader {
    resource: Arc<ResolvedResource>,
    ctx: ControllerContext,
    page_size: u32,
    cursor: Mutex<Cursor>,
    /// One fetch at a time so two callers never request the same page.
    fetch: tokio::sync::Mutex<()>,
}

impl OptionLoader {
    pub fn new(resource: Arc<ResolvedResource>, ctx: ControllerContext) -> Self {
        OptionLoader {
            resource,
            ctx,
            page_size: OPTION_PAGE_SIZE,
            cursor: Mutex::new(Cursor {
                next_page: 1,
                total_pages: None,
                seen: HashSet::new(),
                options: Vec::new(),
            }),
            fetch: tokio::sync::Mutex::new(()),
        }
    }

    fn cursor(&self) -> std::sync::MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn options(&self) -> Vec<ResourceItem> {
        self.cursor().options.clone()
    }

    /// Unknown until the first page arrives.
    pub fn total_pages(&self) -> Option<u64> {
        self.cursor().total_pages
    }

    pub fn has_more(&self) -> bool {
        let c = self.cursor();
        c.total_pages.map_or(true, |t| u64::from(c.next_page) <= t)
    }

    /// Fetch the next page and append its unseen items. Returns how many were appended.
    /// Past the last page this is a no-op without a request. A failed fetch leaves the cursor
    /// where it was.
    pub async fn load_more(&self) -> Result<usize, ClientError> {
        let _one = self.fetch.lock().await;
        if !self.has_more() {
            return Ok(0);
        }
        let page = self.cursor().next_page;
        let query = if self.resource.paginated {
            page_query(page, self.page_size)
        } else {
            ListQuery::default()
        };
        let token = self.ctx.auth.token();
        let body = self
            .ctx
            .api
            .list(&self.resource.path_segment, &query, token.as_deref())
            .await?;
        let fetched = decode_list(body, &self.resource.list_key)?;

        let mut c = self.cursor();
        let total_pages = fetched
            .total_pages
            .unwrap_or_else(|| page_count(fetched.total, self.page_size));
        c.total_pages = Some(total_pages);
        c.next_page = page + 1;
        let mut appended = 0;
        for item in fetched.items {
            if c.seen.insert(item.id()) {
                c.options.push(item);
                appended += 1;
            }
        }
        tracing::debug!(resource = %self.resource.path_segment, page, total_pages, appended, "options page loaded");
        Ok(appended)
    }
}

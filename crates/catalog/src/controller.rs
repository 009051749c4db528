// crates/catalog/src/controller.rs
//! Collection state controller
//!
//! The controller owns the [`CollectionView`] and the active [`BookQuery`].
//! Query intents update the query and re-fetch through the gateway: the
//! search term goes through the debouncer, everything else fetches at once.
//! Create, update and delete go straight to the gateway and splice the
//! returned book into the current page instead of re-fetching it.
//!
//! Every fetch is stamped with a sequence number and the query it was issued
//! for. A response is applied only if it is still the latest fetch and the
//! query has not changed since, so a slow response can never overwrite a
//! newer one.

use crate::view::{CollectionView, DialogKind};
use libris_config::{CatalogConfig, Config};
use libris_core::{
    Book, BookDraft, BookId, BookQuery, CatalogError, CatalogResult, Category, SortField,
    SortSpec, Validator, DEFAULT_PAGE_SIZE,
};
use libris_network::{BookGateway, HttpBookGateway};
use libris_resilience::{Debouncer, DEFAULT_QUIET_WINDOW};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;

/// Debounce channel for the search box
const SEARCH_CHANNEL: &str = "search";

/// Controller settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Books per page
    pub page_size: u32,
    /// Quiet window before a typed search term is fetched
    pub search_debounce: Duration,
}

impl ControllerConfig {
    pub fn from_catalog_config(catalog: &CatalogConfig) -> Self {
        Self {
            page_size: catalog.page_size,
            search_debounce: catalog.search_debounce(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_QUIET_WINDOW,
        }
    }
}

/// Why a fetch was issued; picks the failure message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncReason {
    Load,
    Search,
    Filter,
    Sort,
    Paginate,
}

impl SyncReason {
    fn failure_phrase(self) -> &'static str {
        match self {
            SyncReason::Load => "Failed to load books",
            SyncReason::Search => "Failed to search books",
            SyncReason::Filter => "Failed to filter books",
            SyncReason::Sort => "Failed to sort books",
            SyncReason::Paginate => "Failed to load page",
        }
    }
}

/// Identifies one issued fetch
#[derive(Debug)]
struct FetchTicket {
    seq: u64,
    query: BookQuery,
}

#[derive(Debug)]
struct Shared {
    view: CollectionView,
    /// Sequence number of the most recently issued fetch
    issued: u64,
    /// Fetches sent whose response has not come back yet
    in_flight: usize,
    /// Bumped on every update; orders publication
    revision: u64,
}

struct Inner {
    gateway: Arc<dyn BookGateway>,
    config: ControllerConfig,
    state: Mutex<Shared>,
    debouncer: Debouncer,
    notifier: watch::Sender<CollectionView>,
    /// Revision of the view last handed to the notifier
    published: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutates the shared state and publishes the view if it changed.
    ///
    /// The state lock is released before publishing, so a subscriber holding
    /// a borrowed view can still take a snapshot. Must not be called with
    /// the lock already held.
    fn update<R>(&self, f: impl FnOnce(&mut Shared) -> R) -> R {
        let (result, revision, view) = {
            let mut shared = self.lock();
            let result = f(&mut shared);
            shared.revision += 1;
            (result, shared.revision, shared.view.clone())
        };

        self.notifier.send_if_modified(|published| {
            // Writers race to here once the lock is gone; older views lose
            if revision <= self.published.load(Ordering::Acquire) {
                return false;
            }
            self.published.store(revision, Ordering::Release);
            if *published == view {
                false
            } else {
                *published = view;
                true
            }
        });
        result
    }

    fn snapshot(&self) -> CollectionView {
        self.lock().view.clone()
    }

    /// Fetches the current query and applies the page if it is still wanted
    async fn synchronize(&self, reason: SyncReason) {
        let ticket = self.update(|s| {
            s.issued += 1;
            s.in_flight += 1;
            s.view.loading = true;
            s.view.error = None;
            FetchTicket {
                seq: s.issued,
                query: s.view.query.clone(),
            }
        });

        log::debug!(
            "Fetch #{} ({:?}): page {} of {:?}",
            ticket.seq,
            reason,
            ticket.query.page(),
            ticket.query
        );
        let result = self.gateway.fetch_page(&ticket.query).await;

        self.update(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            if ticket.seq != s.issued || ticket.query != s.view.query {
                log::debug!("Dropping stale response for fetch #{}", ticket.seq);
                if s.in_flight == 0 {
                    s.view.loading = false;
                }
                return;
            }

            s.view.loading = false;
            match result {
                Ok(page) => {
                    s.view.items = page.books;
                    s.view.total = page.total;
                }
                Err(e) => {
                    log::warn!("{}: {}", reason.failure_phrase(), e);
                    s.view.error = Some(format!("{}: {}", reason.failure_phrase(), e.user_message()));
                }
            }
        });
    }

    /// Records a mutation failure on the view and hands the error back
    fn fail(&self, phrase: &str, error: CatalogError) -> CatalogError {
        log::warn!("{}: {}", phrase, error);
        let message = format!("{}: {}", phrase, error.user_message());
        self.update(|s| s.view.error = Some(message));
        error
    }
}

/// Clears the busy flag when a mutation ends, however it ends
struct MutationGuard<'a> {
    inner: &'a Inner,
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.inner.update(|s| s.view.busy = false);
    }
}

/// Owns the collection view and keeps it in sync with the remote catalog.
///
/// Cloning is cheap; clones share the same state. Pending debounced
/// searches are cancelled when the last clone is dropped or on
/// [`shutdown`](Self::shutdown).
#[derive(Clone)]
pub struct CatalogController {
    inner: Arc<Inner>,
}

impl CatalogController {
    /// Creates a controller with the default query. Nothing is fetched
    /// until [`load`](Self::load) is called.
    pub fn new(gateway: Arc<dyn BookGateway>, config: ControllerConfig) -> Self {
        let view = CollectionView::new(BookQuery::new(config.page_size));
        let (notifier, _) = watch::channel(view.clone());

        Self {
            inner: Arc::new(Inner {
                gateway,
                config,
                state: Mutex::new(Shared {
                    view,
                    issued: 0,
                    in_flight: 0,
                    revision: 0,
                }),
                debouncer: Debouncer::new(),
                notifier,
                published: AtomicU64::new(0),
            }),
        }
    }

    /// Builds an HTTP-backed controller from loaded configuration
    pub fn from_config(config: &Config) -> CatalogResult<Self> {
        let gateway = HttpBookGateway::from_config(&config.api)?;
        Ok(Self::new(
            Arc::new(gateway),
            ControllerConfig::from_catalog_config(&config.catalog),
        ))
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Copy of the current view
    pub fn snapshot(&self) -> CollectionView {
        self.inner.snapshot()
    }

    /// Current query
    pub fn query(&self) -> BookQuery {
        self.inner.lock().view.query.clone()
    }

    /// Receives a new snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<CollectionView> {
        self.inner.notifier.subscribe()
    }

    /// True while a typed search term is waiting out its quiet window
    pub fn is_search_pending(&self) -> bool {
        self.inner.debouncer.is_pending(SEARCH_CHANNEL)
    }

    /// Fetches the current query. Always issues a request, so it doubles
    /// as the retry after an error.
    pub async fn load(&self) {
        self.inner.debouncer.cancel(SEARCH_CHANNEL);
        self.inner.synchronize(SyncReason::Load).await;
    }

    /// Same as [`load`](Self::load)
    pub async fn refresh(&self) {
        self.load().await;
    }

    /// Updates the search term and schedules a debounced fetch.
    ///
    /// An unchanged term (after trimming) does nothing. Clearing the term
    /// fetches without waiting for the quiet window.
    pub fn set_search_term(&self, raw: &str) {
        let term = BookQuery::normalize_term(raw);
        let changed = self.inner.update(|s| {
            if s.view.query.term() == term.as_deref() {
                return false;
            }
            s.view.query = s.view.query.with_term(raw);
            true
        });
        if !changed {
            return;
        }

        let delay = if term.is_some() {
            self.inner.config.search_debounce
        } else {
            Duration::ZERO
        };

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let scheduled = self.inner.debouncer.schedule(SEARCH_CHANNEL, delay, async move {
            if let Some(inner) = weak.upgrade() {
                inner.synchronize(SyncReason::Search).await;
            }
        });

        if let Err(e) = scheduled {
            log::warn!("Failed to schedule search: {}", e);
            self.inner.update(|s| {
                s.view.loading = false;
                s.view.error = Some(format!("Failed to search books: {}", e));
            });
        }
    }

    /// Filters by category (`None` shows all) and returns to page 1
    pub async fn set_category(&self, category: Option<Category>) {
        self.apply_query(SyncReason::Filter, |view| {
            view.query.with_category(category)
        })
        .await;
    }

    /// Sorts by `field` and returns to page 1.
    ///
    /// An explicit direction always wins. Without one, choosing the current
    /// field flips its direction and choosing a new field sorts ascending.
    pub async fn set_sort(&self, field: SortField, descending: Option<bool>) {
        self.apply_query(SyncReason::Sort, |view| {
            let current = view.query.sort();
            let sort = match descending {
                Some(descending) => SortSpec { field, descending },
                None if current.field == field => current.toggled(),
                None => SortSpec::ascending(field),
            };
            view.query.with_sort(sort)
        })
        .await;
    }

    /// Moves to page `page`, clamped to `[1, last page]`
    pub async fn set_page(&self, page: u32) {
        self.apply_query(SyncReason::Paginate, |view| {
            let page = view.query.clamp_page(page, view.total);
            view.query.with_page(page)
        })
        .await;
    }

    pub async fn next_page(&self) {
        let current = self.query().page();
        self.set_page(current.saturating_add(1)).await;
    }

    pub async fn previous_page(&self) {
        let current = self.query().page();
        self.set_page(current.saturating_sub(1)).await;
    }

    /// Replaces the query and fetches immediately, unless nothing changed
    async fn apply_query<F>(&self, reason: SyncReason, next: F)
    where
        F: FnOnce(&CollectionView) -> BookQuery,
    {
        let changed = self.inner.update(|s| {
            let query = next(&s.view);
            if query == s.view.query {
                return false;
            }
            s.view.query = query;
            true
        });
        if !changed {
            log::trace!("{:?} intent left the query unchanged", reason);
            return;
        }

        // The immediate fetch already carries the pending term
        self.inner.debouncer.cancel(SEARCH_CHANNEL);
        self.inner.synchronize(reason).await;
    }

    pub fn open_add_dialog(&self) {
        self.inner.update(|s| s.view.add_open = true);
    }

    pub fn open_edit_dialog(&self, book: Book) {
        self.inner.update(|s| {
            s.view.selected = Some(book);
            s.view.edit_open = true;
        });
    }

    /// Opens the delete confirmation for a book on the current page
    pub fn open_delete_dialog(&self, id: BookId) {
        self.inner.update(|s| {
            s.view.selected = s.view.find(id).cloned();
            s.view.delete_open = true;
        });
    }

    pub fn close_dialog(&self, kind: DialogKind) {
        self.inner.update(|s| match kind {
            DialogKind::Add => s.view.add_open = false,
            DialogKind::Edit => {
                s.view.edit_open = false;
                s.view.selected = None;
            }
            DialogKind::Delete => {
                s.view.delete_open = false;
                s.view.selected = None;
            }
        });
    }

    pub fn clear_error(&self) {
        self.inner.update(|s| s.view.error = None);
    }

    /// Cancels any pending debounced search.
    ///
    /// With no fetch left in flight the view stops showing as loading.
    pub fn shutdown(&self) {
        self.inner.debouncer.cancel_all();
        self.inner.update(|s| {
            if s.in_flight == 0 {
                s.view.loading = false;
            }
        });
        log::debug!("Catalog controller shut down");
    }

    fn begin_mutation(&self) -> CatalogResult<MutationGuard<'_>> {
        let acquired = self.inner.update(|s| {
            if s.view.busy {
                false
            } else {
                s.view.busy = true;
                true
            }
        });

        if acquired {
            Ok(MutationGuard { inner: &self.inner })
        } else {
            Err(CatalogError::Busy)
        }
    }

    /// Creates a book and appends it to the current page.
    ///
    /// The error is also returned so the caller can keep the dialog open.
    pub async fn create(&self, draft: BookDraft) -> CatalogResult<Book> {
        const PHRASE: &str = "Failed to create book";

        if let Err(errors) = draft.validate() {
            return Err(self.inner.fail(PHRASE, CatalogError::InvalidDraft(errors)));
        }
        let _guard = self.begin_mutation()?;

        let book = match self.inner.gateway.create(&draft).await {
            Ok(book) => book,
            Err(e) => return Err(self.inner.fail(PHRASE, e)),
        };

        log::info!("Created book {} '{}'", book.id, book.title);
        self.inner.update(|s| {
            s.view.items.push(book.clone());
            s.view.total += 1;
            s.view.add_open = false;
            s.view.error = None;
        });
        Ok(book)
    }

    /// Updates a book and replaces it in the current page
    pub async fn update(&self, id: BookId, draft: BookDraft) -> CatalogResult<Book> {
        const PHRASE: &str = "Failed to update book";

        if let Err(errors) = draft.validate() {
            return Err(self.inner.fail(PHRASE, CatalogError::InvalidDraft(errors)));
        }
        let _guard = self.begin_mutation()?;

        let book = match self.inner.gateway.update(id, &draft).await {
            Ok(book) => book,
            Err(e) => return Err(self.inner.fail(PHRASE, e)),
        };

        log::info!("Updated book {}", id);
        self.inner.update(|s| {
            if let Some(slot) = s.view.items.iter_mut().find(|b| b.id == id) {
                *slot = book.clone();
            }
            s.view.edit_open = false;
            s.view.selected = None;
            s.view.error = None;
        });
        Ok(book)
    }

    /// Deletes a book and removes it from the current page.
    ///
    /// A book the server no longer has counts as deleted.
    pub async fn delete(&self, id: BookId) -> CatalogResult<()> {
        let _guard = self.begin_mutation()?;

        let server_had_it = match self.inner.gateway.remove(id).await {
            Ok(()) => {
                log::info!("Deleted book {}", id);
                true
            }
            Err(e) if e.is_not_found() => {
                log::info!("Book {} was already deleted", id);
                false
            }
            Err(e) => return Err(self.inner.fail("Failed to delete book", e)),
        };

        self.inner.update(|s| {
            let before = s.view.items.len();
            s.view.items.retain(|b| b.id != id);
            let was_listed = s.view.items.len() < before;

            if server_had_it || was_listed {
                s.view.total = s.view.total.saturating_sub(1);
            }
            s.view.delete_open = false;
            s.view.selected = None;
            s.view.error = None;
        });
        Ok(())
    }

    /// Fetches one book and refreshes its copy on the current page.
    ///
    /// Failures are returned but not recorded on the view.
    pub async fn fetch_book(&self, id: BookId) -> CatalogResult<Book> {
        let book = self.inner.gateway.fetch_one(id).await?;

        self.inner.update(|s| {
            if let Some(slot) = s.view.items.iter_mut().find(|b| b.id == id) {
                *slot = book.clone();
            }
        });
        Ok(book)
    }
}

impl std::fmt::Debug for CatalogController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogController")
            .field("config", &self.inner.config)
            .field("view", &self.inner.snapshot())
            .finish()
    }
}

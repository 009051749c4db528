// crates/catalog/tests/support/mod.rs
//! In-memory gateway with scripted latency and failures
#![allow(dead_code)]

use async_trait::async_trait;
use libris_catalog::{CatalogController, ControllerConfig};
use libris_core::{
    Book, BookDraft, BookId, BookPage, BookQuery, CatalogError, CatalogResult, Category,
    SortField,
};
use libris_network::BookGateway;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A failure the fake should answer with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Transport,
    Server(u16),
    Rejected(&'static str),
}

impl Failure {
    fn to_error(&self) -> CatalogError {
        match self {
            Failure::Transport => CatalogError::transport_message("connection refused"),
            Failure::Server(status) => CatalogError::Server {
                status: *status,
                message: "internal error".to_string(),
            },
            Failure::Rejected(message) => CatalogError::Validation {
                message: message.to_string(),
            },
        }
    }
}

#[derive(Default)]
struct FakeState {
    books: Vec<Book>,
    next_id: i64,
    fetches: Vec<BookQuery>,
    fetch_delays: VecDeque<Duration>,
    fetch_failure: Option<Failure>,
    mutation_failure: Option<Failure>,
    mutation_delay: Duration,
    creates: usize,
    updates: usize,
    removes: usize,
}

/// Remote catalog stand-in that filters, sorts and paginates like the server
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
}

const SEED: [(&str, &str, i32, &str); 25] = [
    ("Dune", "Frank Herbert", 1965, "Science Fiction"),
    ("Dune Messiah", "Frank Herbert", 1969, "Science Fiction"),
    ("Neuromancer", "William Gibson", 1984, "Science Fiction"),
    ("Foundation", "Isaac Asimov", 1951, "Science Fiction"),
    ("Hyperion", "Dan Simmons", 1989, "Science Fiction"),
    ("Solaris", "Stanislaw Lem", 1961, "Science Fiction"),
    ("The Hobbit", "J.R.R. Tolkien", 1937, "Fantasy"),
    ("A Wizard of Earthsea", "Ursula K. Le Guin", 1968, "Fantasy"),
    ("The Name of the Wind", "Patrick Rothfuss", 2007, "Fantasy"),
    ("Mistborn", "Brandon Sanderson", 2006, "Fantasy"),
    ("The Last Unicorn", "Peter S. Beagle", 1968, "Fantasy"),
    ("Emma", "Jane Austen", 1815, "Classic"),
    ("Middlemarch", "George Eliot", 1871, "Classic"),
    ("Moby-Dick", "Herman Melville", 1851, "Classic"),
    ("Jane Eyre", "Charlotte Bronte", 1847, "Classic"),
    ("Great Expectations", "Charles Dickens", 1861, "Classic"),
    ("Dracula", "Bram Stoker", 1897, "Horror"),
    ("Frankenstein", "Mary Shelley", 1818, "Horror"),
    ("The Shining", "Stephen King", 1977, "Horror"),
    ("The Haunting of Hill House", "Shirley Jackson", 1959, "Horror"),
    ("The Hound of the Baskervilles", "Arthur Conan Doyle", 1902, "Mystery"),
    ("Gaudy Night", "Dorothy L. Sayers", 1935, "Mystery"),
    ("The Moonstone", "Wilkie Collins", 1868, "Mystery"),
    ("Rebecca", "Daphne du Maurier", 1938, "Mystery"),
    ("The Big Sleep", "Raymond Chandler", 1939, "Mystery"),
];

impl FakeGateway {
    /// Empty catalog
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Catalog with 25 books over five categories
    pub fn seeded() -> Arc<Self> {
        let fake = Self::default();
        {
            let mut state = fake.lock();
            for (title, author, year, category) in SEED {
                state.next_id += 1;
                let id = BookId::new(state.next_id);
                state.books.push(Book::from_draft(
                    id,
                    BookDraft::new(title, author, year, Category::new(category)),
                ));
            }
        }
        Arc::new(fake)
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Delay for the next fetch not yet issued; later fetches get the next entry
    pub fn push_fetch_delay(&self, delay: Duration) {
        self.lock().fetch_delays.push_back(delay);
    }

    pub fn fail_fetches(&self, failure: Option<Failure>) {
        self.lock().fetch_failure = failure;
    }

    pub fn fail_mutations(&self, failure: Option<Failure>) {
        self.lock().mutation_failure = failure;
    }

    pub fn set_mutation_delay(&self, delay: Duration) {
        self.lock().mutation_delay = delay;
    }

    pub fn fetch_count(&self) -> usize {
        self.lock().fetches.len()
    }

    pub fn last_fetch(&self) -> Option<BookQuery> {
        self.lock().fetches.last().cloned()
    }

    pub fn create_count(&self) -> usize {
        self.lock().creates
    }

    pub fn update_count(&self) -> usize {
        self.lock().updates
    }

    pub fn remove_count(&self) -> usize {
        self.lock().removes
    }

    pub fn book(&self, id: BookId) -> Option<Book> {
        self.lock().books.iter().find(|b| b.id == id).cloned()
    }

    /// Simulates another client deleting a book
    pub fn delete_on_server(&self, id: BookId) {
        self.lock().books.retain(|b| b.id != id);
    }

    /// Simulates another client renaming a book
    pub fn rename_on_server(&self, id: BookId, title: &str) {
        if let Some(book) = self.lock().books.iter_mut().find(|b| b.id == id) {
            book.title = title.to_string();
        }
    }

    /// What the server would answer for `query`, without recording a fetch
    pub fn expected_page(&self, query: &BookQuery) -> BookPage {
        let state = self.lock();
        page_for(&state.books, query)
    }

    /// Applies the mutation delay and scripted failure shared by all writes
    async fn before_mutation(&self) -> CatalogResult<()> {
        let (delay, failure) = {
            let state = self.lock();
            (state.mutation_delay, state.mutation_failure.clone())
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

fn page_for(books: &[Book], query: &BookQuery) -> BookPage {
    let term = query.term().map(str::to_lowercase);
    let mut matches: Vec<Book> = books
        .iter()
        .filter(|b| {
            term.as_ref()
                .is_none_or(|t| b.title.to_lowercase().contains(t.as_str()))
        })
        .filter(|b| query.category().is_none_or(|c| &b.category == c))
        .cloned()
        .collect();

    let sort = query.sort();
    match sort.field {
        SortField::Title => matches.sort_by_key(|b| b.title.to_lowercase()),
        SortField::Author => matches.sort_by_key(|b| b.author.to_lowercase()),
        SortField::Year => matches.sort_by_key(|b| b.published_year),
    }
    if sort.descending {
        matches.reverse();
    }

    let total = matches.len() as u64;
    let size = query.page_size() as usize;
    let skip = (query.page() as usize - 1) * size;
    BookPage {
        books: matches.into_iter().skip(skip).take(size).collect(),
        total,
    }
}

#[async_trait]
impl BookGateway for FakeGateway {
    async fn fetch_page(&self, query: &BookQuery) -> CatalogResult<BookPage> {
        let (delay, failure) = {
            let mut state = self.lock();
            state.fetches.push(query.clone());
            (
                state.fetch_delays.pop_front().unwrap_or_default(),
                state.fetch_failure.clone(),
            )
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = failure {
            return Err(failure.to_error());
        }

        Ok(self.expected_page(query))
    }

    async fn fetch_one(&self, id: BookId) -> CatalogResult<Book> {
        if let Some(failure) = self.lock().fetch_failure.clone() {
            return Err(failure.to_error());
        }
        self.book(id).ok_or(CatalogError::NotFound { id })
    }

    async fn create(&self, draft: &BookDraft) -> CatalogResult<Book> {
        self.lock().creates += 1;
        self.before_mutation().await?;

        let mut state = self.lock();
        state.next_id += 1;
        let book = Book::from_draft(BookId::new(state.next_id), draft.clone());
        state.books.push(book.clone());
        Ok(book)
    }

    async fn update(&self, id: BookId, draft: &BookDraft) -> CatalogResult<Book> {
        self.lock().updates += 1;
        self.before_mutation().await?;

        let mut state = self.lock();
        let slot = state
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(CatalogError::NotFound { id })?;
        *slot = Book::from_draft(id, draft.clone());
        Ok(slot.clone())
    }

    async fn remove(&self, id: BookId) -> CatalogResult<()> {
        self.lock().removes += 1;
        self.before_mutation().await?;

        let mut state = self.lock();
        let before = state.books.len();
        state.books.retain(|b| b.id != id);
        if state.books.len() == before {
            Err(CatalogError::NotFound { id })
        } else {
            Ok(())
        }
    }
}

pub const WINDOW: Duration = Duration::from_millis(300);

/// Controller over `fake` with page size 10 and a 300ms search window
pub fn controller(fake: &Arc<FakeGateway>) -> CatalogController {
    let _ = env_logger::builder().is_test(true).try_init();
    CatalogController::new(fake.clone(), ControllerConfig::default())
}

pub fn draft(title: &str) -> BookDraft {
    BookDraft::new(title, "Test Author", 2001, Category::new("Fiction"))
}

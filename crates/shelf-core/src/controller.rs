//! Inventory controller
//!
//! Owns the loaded book set, the search/filter/page state and the record
//! editor, and sequences every remote call.
//!
//! Mutations invalidate the cache: after any successful create, update or
//! delete the whole set is reloaded from the store. Nothing is patched
//! locally, so the store stays the single source of truth.

use tracing::{error, info, warn};

use crate::editor::{DraftOverrides, RecordEditor, SaveTarget, Submission};
use crate::models::{Book, Genre, Status};
use crate::store::{BookStore, StoreError, StoreResult};
use crate::validate::ValidationErrors;

/// Rows per page
pub const PAGE_SIZE: usize = 10;

/// Active search and filter selections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Case-insensitive substring of title or author
    pub search: String,
    pub genre: Option<Genre>,
    pub status: Option<Status>,
}

impl Filters {
    /// Whether any filter narrows the set
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.genre.is_some() || self.status.is_some()
    }

    pub fn matches(&self, book: &Book) -> bool {
        let term = self.search.to_lowercase();
        let matches_search = book.title().to_lowercase().contains(&term)
            || book.author().to_lowercase().contains(&term);
        let matches_genre = self.genre.map_or(true, |g| g == book.genre());
        let matches_status = self.status.map_or(true, |s| s == book.status());

        matches_search && matches_genre && matches_status
    }
}

/// Books matching `filters`, in their original order
pub fn apply_filters<'a>(books: &'a [Book], filters: &Filters) -> Vec<&'a Book> {
    books.iter().filter(|book| filters.matches(book)).collect()
}

/// Number of pages needed for `total` rows
pub fn page_count(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Rows shown on 1-based `page`
pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    if start >= items.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// Result of submitting the editor
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The editor was not open
    NotOpen,
    /// The draft failed validation; nothing was sent
    Invalid(ValidationErrors),
    /// Saved and reloaded; the editor is closed
    Saved { id: String },
    /// The store refused or could not be reached; the editor is reopened
    SaveFailed(StoreError),
}

/// Top-level inventory state
pub struct InventoryController<S> {
    store: S,
    books: Vec<Book>,
    filters: Filters,
    page: usize,
    loading: bool,
    editor: RecordEditor,
}

impl<S: BookStore> InventoryController<S> {
    /// Create a controller with an empty set; call [`refresh`](Self::refresh) to load
    pub fn new(store: S) -> Self {
        Self {
            store,
            books: Vec::new(),
            filters: Filters::default(),
            page: 1,
            loading: false,
            editor: RecordEditor::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reload the full set from the store
    ///
    /// On failure the previous set stays in place. The loading flag is
    /// cleared either way.
    pub async fn refresh(&mut self) -> StoreResult<()> {
        self.loading = true;
        let result = self.store.list().await;
        self.loading = false;

        match result {
            Ok(books) => {
                info!("Loaded {} books", books.len());
                self.books = books;
                self.clamp_page();
                Ok(())
            }
            Err(e) => {
                error!("Failed to fetch books: {}", e);
                Err(e)
            }
        }
    }

    /// Persist a validated draft, then reload
    ///
    /// Returns the id of the saved book. If the store call fails, the
    /// editor is reopened with the submitted values so nothing typed is lost.
    pub async fn save(&mut self, submission: Submission) -> StoreResult<String> {
        let result = match &submission.target {
            SaveTarget::Create => self.store.create(&submission.fields).await.map(|book| {
                info!("Added book {} '{}'", book.id, book.title());
                book.id
            }),
            SaveTarget::Update(id) => self.store.update(id, &submission.fields).await.map(|()| {
                info!("Updated book {}", id);
                id.clone()
            }),
        };

        let id = match result {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to save book: {}", e);
                self.editor.restore(submission);
                return Err(e);
            }
        };

        // A failed reload is logged by refresh; the save itself went through.
        let _ = self.refresh().await;
        self.editor.cancel();
        Ok(id)
    }

    /// Delete a book by id, then reload
    pub async fn remove(&mut self, id: &str) -> StoreResult<()> {
        if let Err(e) = self.store.delete(id).await {
            if e.is_not_found() {
                warn!("Book {} was already deleted", id);
            } else {
                error!("Failed to delete book: {}", e);
            }
            return Err(e);
        }

        info!("Deleted book {}", id);
        let _ = self.refresh().await;
        Ok(())
    }

    /// Open the editor for the book `id`, or for a new book when `None`
    ///
    /// Returns false when `id` is not in the loaded set.
    pub fn open_editor(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) => match self.books.iter().find(|b| b.id == id) {
                Some(book) => {
                    self.editor.open(Some(book));
                    true
                }
                None => {
                    warn!("Cannot edit unknown book {}", id);
                    false
                }
            },
            None => {
                self.editor.open(None);
                true
            }
        }
    }

    pub fn cancel_editor(&mut self) {
        self.editor.cancel();
    }

    /// Validate the editor's draft and save it
    pub async fn submit_editor(&mut self) -> SubmitOutcome {
        self.submit_editor_with(DraftOverrides::default()).await
    }

    /// Apply `overrides` to the editor's draft, then validate and save
    pub async fn submit_editor_with(&mut self, overrides: DraftOverrides) -> SubmitOutcome {
        match self.editor.submit_with(overrides) {
            None => SubmitOutcome::NotOpen,
            Some(Err(errors)) => SubmitOutcome::Invalid(errors),
            Some(Ok(submission)) => match self.save(submission).await {
                Ok(id) => SubmitOutcome::Saved { id },
                Err(e) => SubmitOutcome::SaveFailed(e),
            },
        }
    }

    pub fn editor(&self) -> &RecordEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut RecordEditor {
        &mut self.editor
    }

    /// Every loaded book, in store order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Loading state as seen between calls
    ///
    /// `refresh` holds `&mut self` while the flag is raised, so this reads
    /// `false` whenever it can be called. A front end that shows progress
    /// during a reload keeps its own flag around the await.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.filters.search = term.into();
        self.page = 1;
    }

    pub fn set_genre_filter(&mut self, genre: Option<Genre>) {
        self.filters.genre = genre;
        self.page = 1;
    }

    pub fn set_status_filter(&mut self, status: Option<Status>) {
        self.filters.status = status;
        self.page = 1;
    }

    /// Step the genre filter: all -> each genre -> all
    pub fn cycle_genre_filter(&mut self) {
        let next = match self.filters.genre {
            None => Some(Genre::ALL[0]),
            Some(g) if g == Genre::ALL[Genre::ALL.len() - 1] => None,
            Some(g) => Some(g.next()),
        };
        self.set_genre_filter(next);
    }

    /// Step the status filter: all -> each status -> all
    pub fn cycle_status_filter(&mut self) {
        let next = match self.filters.status {
            None => Some(Status::ALL[0]),
            Some(s) if s == Status::ALL[Status::ALL.len() - 1] => None,
            Some(s) => Some(s.next()),
        };
        self.set_status_filter(next);
    }

    pub fn clear_filters(&mut self) {
        self.filters = Filters::default();
        self.page = 1;
    }

    /// Books matching the current filters
    pub fn filtered(&self) -> Vec<&Book> {
        apply_filters(&self.books, &self.filters)
    }

    /// Current 1-based page
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        page_count(self.filtered().len())
    }

    /// Books on the current page
    pub fn visible_page(&self) -> Vec<&Book> {
        page_slice(&self.filtered(), self.page).to_vec()
    }

    /// Go to page `n`, clamped to the available pages
    pub fn change_page(&mut self, n: usize) {
        let last = self.page_count().max(1);
        self.page = n.clamp(1, last);
    }

    pub fn next_page(&mut self) {
        self.change_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.change_page(self.page.saturating_sub(1));
    }

    fn clamp_page(&mut self) {
        self.change_page(self.page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookFields;
    use crate::store::MemoryBookStore;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn fields(title: &str, author: &str, genre: Genre, status: Status) -> BookFields {
        BookFields {
            title: title.to_string(),
            author: author.to_string(),
            genre,
            year: 1990,
            status,
        }
    }

    fn library() -> Vec<Book> {
        vec![
            Book::new("1", fields("Dune", "Frank Herbert", Genre::SciFi, Status::Available)),
            Book::new("2", fields("Emma", "Jane Austen", Genre::Fiction, Status::Issued)),
            Book::new("3", fields("The Hobbit", "J.R.R. Tolkien", Genre::Fantasy, Status::Available)),
            Book::new("4", fields("Cosmos", "Carl Sagan", Genre::NonFiction, Status::Issued)),
            Book::new("5", fields("Dune Messiah", "Frank Herbert", Genre::SciFi, Status::Issued)),
        ]
    }

    fn numbered(n: usize) -> Vec<Book> {
        (1..=n)
            .map(|i| {
                Book::new(
                    i.to_string(),
                    fields(&format!("Book {}", i), "Author", Genre::Fiction, Status::Available),
                )
            })
            .collect()
    }

    async fn loaded(books: Vec<Book>) -> InventoryController<MemoryBookStore> {
        let mut controller = InventoryController::new(MemoryBookStore::with_books(books));
        controller.refresh().await.unwrap();
        controller
    }

    /// Memory store that can be switched into a failing state
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryBookStore,
        down: AtomicBool,
    }

    impl FlakyStore {
        fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::SeqCst);
        }

        fn check(&self, method: &'static str) -> StoreResult<()> {
            if self.down.load(Ordering::SeqCst) {
                return Err(StoreError::Status {
                    method,
                    url: "http://test/books".to_string(),
                    status: 503,
                });
            }
            Ok(())
        }
    }

    impl BookStore for FlakyStore {
        async fn list(&self) -> StoreResult<Vec<Book>> {
            self.check("GET")?;
            self.inner.list().await
        }

        async fn create(&self, fields: &BookFields) -> StoreResult<Book> {
            self.check("POST")?;
            self.inner.create(fields).await
        }

        async fn update(&self, id: &str, fields: &BookFields) -> StoreResult<()> {
            self.check("PUT")?;
            self.inner.update(id, fields).await
        }

        async fn delete(&self, id: &str) -> StoreResult<()> {
            self.check("DELETE")?;
            self.inner.delete(id).await
        }
    }

    #[test]
    fn test_no_filters_is_identity() {
        let books = library();
        let filtered = apply_filters(&books, &Filters::default());
        assert_eq!(filtered.len(), books.len());
        assert!(filtered.iter().zip(books.iter()).all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let books = library();
        for term in ["dun", "DUN", "Dune"] {
            let filters = Filters {
                search: term.to_string(),
                ..Default::default()
            };
            let ids: Vec<&str> = apply_filters(&books, &filters)
                .iter()
                .map(|b| b.id.as_str())
                .collect();
            assert_eq!(ids, vec!["1", "5"], "term {:?}", term);
        }
    }

    #[test]
    fn test_search_matches_author() {
        let books = library();
        let filters = Filters {
            search: "austen".to_string(),
            ..Default::default()
        };
        let found = apply_filters(&books, &filters);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title(), "Emma");
    }

    #[test]
    fn test_filters_combine() {
        let books = library();
        let filters = Filters {
            search: "herbert".to_string(),
            genre: Some(Genre::SciFi),
            status: Some(Status::Issued),
        };
        let found = apply_filters(&books, &filters);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "5");
        assert!(filters.is_active());
        assert!(!Filters::default().is_active());
    }

    #[test]
    fn test_page_math() {
        assert_eq!(page_count(0), 0);
        assert_eq!(page_count(10), 1);
        assert_eq!(page_count(23), 3);

        let items: Vec<usize> = (0..23).collect();
        assert_eq!(page_slice(&items, 1).len(), 10);
        assert_eq!(page_slice(&items, 3), &[20, 21, 22]);
        assert!(page_slice(&items, 4).is_empty());
    }

    #[tokio::test]
    async fn test_pagination_of_23_books() {
        let mut controller = loaded(numbered(23)).await;
        assert_eq!(controller.page_count(), 3);

        controller.change_page(3);
        let visible = controller.visible_page();
        assert_eq!(visible.len(), 3);
        assert_eq!(visible[0].title(), "Book 21");
    }

    #[tokio::test]
    async fn test_change_page_is_bounded() {
        let mut controller = loaded(numbered(23)).await;
        controller.change_page(9);
        assert_eq!(controller.page(), 3);
        controller.change_page(0);
        assert_eq!(controller.page(), 1);

        controller.prev_page();
        assert_eq!(controller.page(), 1);
        controller.next_page();
        controller.next_page();
        controller.next_page();
        assert_eq!(controller.page(), 3);
    }

    #[tokio::test]
    async fn test_filter_changes_reset_page() {
        let mut controller = loaded(numbered(23)).await;

        controller.change_page(3);
        controller.set_genre_filter(Some(Genre::Fiction));
        assert_eq!(controller.page(), 1);

        controller.change_page(3);
        controller.set_status_filter(Some(Status::Available));
        assert_eq!(controller.page(), 1);

        controller.change_page(2);
        controller.set_search_term("book");
        assert_eq!(controller.page(), 1);

        controller.change_page(2);
        controller.clear_filters();
        assert_eq!(controller.page(), 1);
    }

    #[tokio::test]
    async fn test_filtering_does_not_mutate_set() {
        let mut controller = loaded(library()).await;
        controller.set_search_term("zzz");
        assert!(controller.visible_page().is_empty());
        assert_eq!(controller.page_count(), 0);
        assert_eq!(controller.books().len(), 5);
    }

    #[tokio::test]
    async fn test_cycle_filters() {
        let mut controller = loaded(library()).await;

        let mut seen = Vec::new();
        for _ in 0..5 {
            controller.cycle_genre_filter();
            seen.push(controller.filters().genre);
        }
        assert_eq!(
            seen,
            vec![
                Some(Genre::Fiction),
                Some(Genre::NonFiction),
                Some(Genre::Fantasy),
                Some(Genre::SciFi),
                None
            ]
        );

        controller.cycle_status_filter();
        assert_eq!(controller.filters().status, Some(Status::Available));
        controller.cycle_status_filter();
        assert_eq!(controller.filters().status, Some(Status::Issued));
        controller.cycle_status_filter();
        assert_eq!(controller.filters().status, None);
    }

    #[tokio::test]
    async fn test_create_through_editor_reloads() {
        let mut controller = loaded(Vec::new()).await;

        assert!(controller.open_editor(None));
        {
            let draft = controller.editor_mut().draft_mut();
            draft.title = " Dune ".to_string();
            draft.author = "Herbert".to_string();
            draft.genre = Some(Genre::SciFi);
            draft.year = "1965".to_string();
            draft.status = Some(Status::Available);
        }

        let outcome = controller.submit_editor().await;
        assert!(matches!(outcome, SubmitOutcome::Saved { .. }));
        assert!(!controller.editor().is_open());

        let books = controller.books();
        assert_eq!(books.len(), 1);
        assert!(!books[0].id.is_empty());
        assert_eq!(books[0].title(), "Dune");
        assert_eq!(books[0].year(), 1965);
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_sent() {
        let mut controller = loaded(Vec::new()).await;
        controller.open_editor(None);

        let outcome = controller.submit_editor().await;
        assert!(matches!(outcome, SubmitOutcome::Invalid(ref e) if e.len() == 5));
        assert!(controller.editor().is_open());
        assert!(controller.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_update_status_keeps_other_fields() {
        let mut controller = loaded(library()).await;

        assert!(controller.open_editor(Some("1")));
        controller.editor_mut().draft_mut().status = Some(Status::Issued);
        let outcome = controller.submit_editor().await;
        assert!(matches!(outcome, SubmitOutcome::Saved { .. }));

        let book = controller.book("1").unwrap();
        assert_eq!(book.status(), Status::Issued);
        assert_eq!(book.title(), "Dune");
        assert_eq!(book.author(), "Frank Herbert");
        assert_eq!(book.genre(), Genre::SciFi);
    }

    #[tokio::test]
    async fn test_open_editor_unknown_id() {
        let mut controller = loaded(library()).await;
        assert!(!controller.open_editor(Some("missing")));
        assert!(!controller.editor().is_open());
    }

    #[tokio::test]
    async fn test_remove_reloads() {
        let mut controller = loaded(library()).await;
        controller.remove("2").await.unwrap();

        assert!(controller.book("2").is_none());
        assert_eq!(controller.books().len(), 4);
    }

    #[tokio::test]
    async fn test_duplicate_remove_is_not_found() {
        let mut controller = loaded(library()).await;
        controller.remove("2").await.unwrap();

        let err = controller.remove("2").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(controller.books().len(), 4);
    }

    #[tokio::test]
    async fn test_remove_clamps_page() {
        let mut controller = loaded(numbered(11)).await;
        controller.change_page(2);
        controller.remove("11").await.unwrap();
        assert_eq!(controller.page_count(), 1);
        assert_eq!(controller.page(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_set() {
        let store = FlakyStore::default();
        store.inner.create(&fields("Dune", "Herbert", Genre::SciFi, Status::Available)).await.unwrap();

        let mut controller = InventoryController::new(store);
        controller.refresh().await.unwrap();
        assert_eq!(controller.books().len(), 1);
        assert!(!controller.is_loading());

        controller.store().set_down(true);
        assert!(controller.refresh().await.is_err());

        assert_eq!(controller.books().len(), 1);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_failed_save_restores_editor() {
        let mut controller = InventoryController::new(FlakyStore::default());
        controller.refresh().await.unwrap();

        controller.open_editor(None);
        {
            let draft = controller.editor_mut().draft_mut();
            draft.title = "Dune".to_string();
            draft.author = "Herbert".to_string();
            draft.genre = Some(Genre::SciFi);
            draft.year = "1965".to_string();
            draft.status = Some(Status::Available);
        }

        controller.store().set_down(true);
        let outcome = controller.submit_editor().await;
        assert!(matches!(outcome, SubmitOutcome::SaveFailed(ref e) if e.is_network()));
        assert!(controller.editor().is_open());
        assert_eq!(controller.editor().draft().title, "Dune");
        assert!(controller.books().is_empty());

        controller.store().set_down(false);
        let outcome = controller.submit_editor().await;
        assert!(matches!(outcome, SubmitOutcome::Saved { .. }));
        assert_eq!(controller.books().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_remove_leaves_set() {
        let store = FlakyStore::default();
        let book = store
            .inner
            .create(&fields("Dune", "Herbert", Genre::SciFi, Status::Available))
            .await
            .unwrap();
        let mut controller = InventoryController::new(store);
        controller.refresh().await.unwrap();

        controller.store().set_down(true);
        assert!(controller.remove(&book.id).await.is_err());
        assert_eq!(controller.books().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_with_overrides_returns_id() {
        let mut controller = loaded(library()).await;

        assert!(controller.open_editor(Some("4")));
        let outcome = controller
            .submit_editor_with(DraftOverrides {
                status: Some(Status::Available),
                ..Default::default()
            })
            .await;
        assert!(matches!(outcome, SubmitOutcome::Saved { ref id } if id == "4"));
        assert_eq!(controller.book("4").unwrap().status(), Status::Available);
    }

    #[tokio::test]
    async fn test_submit_when_closed() {
        let mut controller = loaded(Vec::new()).await;
        assert!(matches!(controller.submit_editor().await, SubmitOutcome::NotOpen));
    }
}

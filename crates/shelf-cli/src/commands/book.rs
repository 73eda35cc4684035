//! Book command handlers
//!
//! Each command drives the same controller the TUI uses: load the
//! collection, mutate through the editor, reload.

use anyhow::{anyhow, bail, Context, Result};

use shelf_core::{BookStore, DraftOverrides, Genre, InventoryController, Status, SubmitOutcome};

use crate::output::{Output, PageView};

/// Search and filter options for `shelf list`
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub genre: Option<Genre>,
    pub status: Option<Status>,
    pub page: usize,
}

/// List one page of books matching the query
pub async fn list<S: BookStore>(
    inventory: &mut InventoryController<S>,
    query: ListQuery,
    output: &Output,
) -> Result<()> {
    inventory
        .refresh()
        .await
        .context("Failed to load books")?;

    apply_query(inventory, query);

    let filtered = inventory.filtered();
    let visible = inventory.visible_page();
    output.print_page(&PageView {
        books: &visible,
        page: inventory.page(),
        page_count: inventory.page_count(),
        total: filtered.len(),
    });
    Ok(())
}

/// Add a new book
pub async fn add<S: BookStore>(
    inventory: &mut InventoryController<S>,
    fields: DraftOverrides,
    output: &Output,
) -> Result<()> {
    inventory.open_editor(None);
    let id = submit(inventory, fields, output).await?;

    output.success(&format!("Added book: {}", id));
    if let Some(book) = inventory.book(&id) {
        output.print_book(book);
    }
    Ok(())
}

/// Edit a book, replacing only the given fields
pub async fn edit<S: BookStore>(
    inventory: &mut InventoryController<S>,
    id: String,
    changes: DraftOverrides,
    output: &Output,
) -> Result<()> {
    inventory
        .refresh()
        .await
        .context("Failed to load books")?;

    if !inventory.open_editor(Some(&id)) {
        bail!("Book not found: {}", id);
    }
    let id = submit(inventory, changes, output).await?;

    output.success(&format!("Updated book: {}", id));
    if let Some(book) = inventory.book(&id) {
        output.print_book(book);
    }
    Ok(())
}

/// Delete a book by id
pub async fn delete<S: BookStore>(
    inventory: &mut InventoryController<S>,
    id: String,
    output: &Output,
) -> Result<()> {
    inventory.remove(&id).await.map_err(|e| {
        if e.is_not_found() {
            anyhow!("Book not found: {}", id)
        } else {
            anyhow!(e).context("Failed to delete book")
        }
    })?;

    output.success(&format!("Deleted book: {}", id));
    Ok(())
}

/// Narrow the controller to the query's filters and page
fn apply_query<S: BookStore>(inventory: &mut InventoryController<S>, query: ListQuery) {
    if let Some(term) = query.search {
        inventory.set_search_term(term);
    }
    inventory.set_genre_filter(query.genre);
    inventory.set_status_filter(query.status);
    inventory.change_page(query.page);
}

/// Submit the open editor with `overrides`, returning the saved id
async fn submit<S: BookStore>(
    inventory: &mut InventoryController<S>,
    overrides: DraftOverrides,
    output: &Output,
) -> Result<String> {
    match inventory.submit_editor_with(overrides).await {
        SubmitOutcome::Saved { id } => Ok(id),
        SubmitOutcome::Invalid(errors) => {
            output.print_validation_errors(&errors);
            inventory.cancel_editor();
            bail!("Invalid book ({} field(s) rejected)", errors.len());
        }
        SubmitOutcome::SaveFailed(e) => {
            inventory.cancel_editor();
            if let Some(hint) = e.recovery_suggestion() {
                if !output.is_quiet() {
                    eprintln!("⚠ {}", hint);
                }
            }
            Err(anyhow!(e).context("Failed to save book"))
        }
        SubmitOutcome::NotOpen => bail!("Editor is not open"),
    }
}

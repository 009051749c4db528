// crates/network/src/wire.rs
//! Query-string encoding for the combined list endpoint

use libris_core::BookQuery;

/// Encodes a query as `/books/combined` parameters.
///
/// `title` and `category` are only present when the query filters on them.
pub fn query_params(query: &BookQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page().to_string()),
        ("page_size", query.page_size().to_string()),
    ];

    if let Some(term) = query.term() {
        params.push(("title", term.to_string()));
    }
    if let Some(category) = query.category() {
        params.push(("category", category.as_str().to_string()));
    }

    let sort = query.sort();
    params.push(("sort_by", sort.field.as_str().to_string()));
    params.push(("desc", sort.descending.to_string()));
    params
}

//! Generic paginated data table
//!
//! The table is a renderer: rows come from one upstream page, paging is
//! done by the server, while search and sort only touch the rows already on
//! screen. Every control is a link or form that carries the list state in
//! the query string.

use crate::pagination::{PageItem, PageRequest, Pagination, PAGE_SIZES};
use serde::Serialize;
use std::cmp::Ordering;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(d) if d.eq_ignore_ascii_case("desc") => SortDir::Desc,
            _ => SortDir::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    fn flipped(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub key: String,
    pub dir: SortDir,
}

/// List state carried in the query string of a list page
#[derive(Debug, Clone)]
pub struct ListState {
    pub base: String,
    pub request: PageRequest,
    pub search: Option<String>,
    pub sort: Option<Sort>,
}

impl ListState {
    pub fn new(base: impl Into<String>, request: PageRequest) -> Self {
        Self {
            base: base.into(),
            request,
            search: None,
            sort: None,
        }
    }

    pub fn search(mut self, search: Option<&str>) -> Self {
        self.search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self
    }

    pub fn sort(mut self, key: Option<&str>, dir: Option<&str>) -> Self {
        self.sort = key.filter(|k| !k.is_empty()).map(|k| Sort {
            key: k.to_string(),
            dir: SortDir::parse(dir),
        });
        self
    }

    /// URL of the list itself
    pub fn href(&self) -> String {
        self.href_with(self.request, &[])
    }

    /// URL of the list with one extra query pair (`new=1`, `edit=<id>`)
    pub fn href_extra(&self, key: &str, value: &str) -> String {
        self.href_with(self.request, &[(key, value)])
    }

    /// URL of a mutation endpoint that redirects back to this page
    pub fn action_href(&self, suffix: &str) -> String {
        let query = self.query(self.request, self.sort.as_ref(), &[]);
        format!("{}{}?{}", self.base, suffix, query)
    }

    fn href_with(&self, request: PageRequest, extra: &[(&str, &str)]) -> String {
        self.href_full(request, self.sort.as_ref(), extra)
    }

    fn href_full(&self, request: PageRequest, sort: Option<&Sort>, extra: &[(&str, &str)]) -> String {
        format!("{}?{}", self.base, self.query(request, sort, extra))
    }

    fn query(&self, request: PageRequest, sort: Option<&Sort>, extra: &[(&str, &str)]) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("page", &request.page.to_string())
            .append_pair("limit", &request.limit.to_string());
        if let Some(search) = &self.search {
            query.append_pair("q", search);
        }
        if let Some(sort) = sort {
            query
                .append_pair("sort", &sort.key)
                .append_pair("dir", sort.dir.as_str());
        }
        for (k, v) in extra {
            query.append_pair(k, v);
        }
        query.finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
}

impl Column {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: true,
        }
    }

    pub const fn unsortable(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: false,
        }
    }
}

/// A rendered row: record id plus display cells in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub cells: Vec<String>,
}

/// Entry of the per-row action dropdown
#[derive(Debug, Clone, Serialize)]
pub struct RowAction {
    pub label: String,
    pub href: String,
    /// `get` renders a link, `post` a one-button form
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<String>,
    pub danger: bool,
}

impl RowAction {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            method: "get",
            confirm: None,
            danger: false,
        }
    }

    pub fn destructive(label: impl Into<String>, href: impl Into<String>, confirm: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            method: "post",
            confirm: Some(confirm.into()),
            danger: true,
        }
    }
}

pub struct DataTable {
    columns: Vec<Column>,
    rows: Vec<Row>,
    selectable: bool,
}

impl DataTable {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            selectable: false,
        }
    }

    /// Show selection checkboxes and the bulk-delete bar
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Rows of the current page after local search and sort
    pub fn visible_rows(&self, search: Option<&str>, sort: Option<&Sort>) -> Vec<&Row> {
        let needle = search.map(str::to_lowercase);
        let mut rows: Vec<&Row> = self
            .rows
            .iter()
            .filter(|row| match &needle {
                Some(needle) => row.cells.iter().any(|c| c.to_lowercase().contains(needle)),
                None => true,
            })
            .collect();

        if let Some(sort) = sort {
            if let Some(idx) = self
                .columns
                .iter()
                .position(|c| c.sortable && c.key == sort.key)
            {
                rows.sort_by(|a, b| {
                    let ord = compare_cells(&a.cells[idx], &b.cells[idx]);
                    match sort.dir {
                        SortDir::Asc => ord,
                        SortDir::Desc => ord.reverse(),
                    }
                });
            }
        }

        rows
    }

    pub fn view<F>(&self, state: &ListState, pagination: &Pagination, actions: F) -> TableView
    where
        F: Fn(&Row) -> Vec<RowAction>,
    {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let current = state.sort.as_ref().filter(|s| s.key == column.key);
                let next_dir = current.map(|s| s.dir.flipped()).unwrap_or(SortDir::Asc);
                let next = Sort {
                    key: column.key.to_string(),
                    dir: next_dir,
                };
                ColumnView {
                    key: column.key,
                    label: column.label,
                    sortable: column.sortable,
                    sort_href: column
                        .sortable
                        .then(|| state.href_full(state.request, Some(&next), &[])),
                    sorted: current.map(|s| s.dir.as_str()),
                }
            })
            .collect();

        let visible = self.visible_rows(state.search.as_deref(), state.sort.as_ref());
        let rows: Vec<RowView> = visible
            .into_iter()
            .map(|row| RowView {
                id: row.id.clone(),
                cells: row.cells.clone(),
                actions: actions(row),
            })
            .collect();

        TableView {
            columns,
            empty: rows.is_empty(),
            filtered: state.search.is_some(),
            matched: rows.len(),
            rows,
            selectable: self.selectable,
            colspan: self.columns.len() + 1 + usize::from(self.selectable),
            search: state.search.clone().unwrap_or_default(),
            search_action: state.base.clone(),
            limit: state.request.limit,
            sort_key: state.sort.as_ref().map(|s| s.key.clone()),
            sort_dir: state.sort.as_ref().map(|s| s.dir.as_str()),
            bulk_delete_action: state.action_href("/bulk-delete"),
            pagination: PaginationView::build(pagination, state),
        }
    }
}

/// Numbers compare numerically, everything else case-insensitively
fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

#[derive(Debug, Serialize)]
pub struct ColumnView {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
    pub sort_href: Option<String>,
    pub sorted: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct RowView {
    pub id: String,
    pub cells: Vec<String>,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Serialize)]
pub struct TableView {
    pub columns: Vec<ColumnView>,
    pub rows: Vec<RowView>,
    pub empty: bool,
    pub filtered: bool,
    pub matched: usize,
    pub selectable: bool,
    pub colspan: usize,
    pub search: String,
    pub search_action: String,
    pub limit: u32,
    pub sort_key: Option<String>,
    pub sort_dir: Option<&'static str>,
    pub bulk_delete_action: String,
    pub pagination: PaginationView,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PageLink {
    pub number: Option<u32>,
    pub href: Option<String>,
    pub active: bool,
    pub ellipsis: bool,
}

#[derive(Debug, Serialize)]
pub struct PageSizeOption {
    pub value: u32,
    pub href: String,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct PaginationView {
    pub items: Vec<PageLink>,
    pub show_entry: u64,
    pub end_entry: u64,
    pub total: u64,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub sizes: Vec<PageSizeOption>,
}

impl PaginationView {
    pub fn build(pagination: &Pagination, state: &ListState) -> Self {
        let request = state.request;

        let items = pagination
            .items()
            .into_iter()
            .map(|item| match item {
                PageItem::Page(n) => PageLink {
                    number: Some(n),
                    href: Some(state.href_with(request.with_page(n), &[])),
                    active: n == pagination.page,
                    ellipsis: false,
                },
                PageItem::Ellipsis => PageLink {
                    number: None,
                    href: None,
                    active: false,
                    ellipsis: true,
                },
            })
            .collect();

        let sizes = PAGE_SIZES
            .iter()
            .map(|&value| PageSizeOption {
                value,
                href: state.href_with(request.with_limit(value), &[]),
                selected: value == request.limit,
            })
            .collect();

        Self {
            items,
            show_entry: pagination.show_entry(),
            end_entry: pagination.end_entry(),
            total: pagination.total,
            prev_href: pagination
                .has_prev()
                .then(|| state.href_with(request.with_page(pagination.page - 1), &[])),
            next_href: pagination
                .has_next()
                .then(|| state.href_with(request.with_page(pagination.page + 1), &[])),
            sizes,
        }
    }
}

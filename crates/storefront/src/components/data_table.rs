//! Data table component for the admin panels.
//!
//! Lists are fetched whole from the API; search, sorting and pagination all
//! happen here, in memory, and the result is handed to the template as plain
//! strings.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::Deserialize;

use hoopshop_core::filter::filter_by_name;
use hoopshop_core::{Brand, Category, Named, Product};

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZES: [usize; 5] = [5, 10, 20, 30, 50];

/// Page size used when none (or an unsupported one) is requested.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Column definition for a data table.
#[derive(Debug, Clone)]
pub struct TableColumn {
    /// Key used in `?sort=` and by [`GridRow::cell`].
    pub key: &'static str,
    /// Header label.
    pub label: &'static str,
    pub sortable: bool,
}

impl TableColumn {
    /// Create a new sortable column.
    #[must_use]
    pub const fn sortable(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: true,
        }
    }

    /// Create a new non-sortable column.
    #[must_use]
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: false,
        }
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone)]
pub struct DataTableConfig {
    /// Unique table identifier, also the dashboard section name.
    pub table_id: &'static str,
    pub columns: Vec<TableColumn>,
    pub search_placeholder: &'static str,
    pub empty_title: &'static str,
}

impl DataTableConfig {
    #[must_use]
    pub const fn new(table_id: &'static str) -> Self {
        Self {
            table_id,
            columns: Vec::new(),
            search_placeholder: "Search...",
            empty_title: "No items found",
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub const fn search_placeholder(mut self, placeholder: &'static str) -> Self {
        self.search_placeholder = placeholder;
        self
    }

    #[must_use]
    pub const fn empty_title(mut self, title: &'static str) -> Self {
        self.empty_title = title;
        self
    }

    /// The column `key` if it is declared and sortable.
    fn sortable_column(&self, key: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.sortable && c.key == key)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    /// Parse `?dir=`; anything but `desc` is ascending.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(d) if d.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Comparable cell value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Number(Decimal),
    Text(String),
}

impl SortValue {
    fn text(s: &str) -> Self {
        Self::Text(s.to_lowercase())
    }
}

/// A record the data table can show.
pub trait GridRow: Named {
    /// Identifier used by the edit and delete actions.
    fn row_id(&self) -> String;
    /// Display text for the column `key`.
    fn cell(&self, key: &str) -> String;
    /// Sort value for the column `key`.
    fn sort_value(&self, key: &str) -> SortValue;
}

impl GridRow for Product {
    fn row_id(&self) -> String {
        self.id.to_string()
    }

    fn cell(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            "category" => self.category_label().to_string(),
            "brand" => self.brand_label().to_string(),
            "price" => self.price.to_string(),
            "stock" => self.stock.to_string(),
            _ => String::new(),
        }
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "price" => SortValue::Number(self.price.amount()),
            "stock" => SortValue::Number(Decimal::from(self.stock)),
            other => SortValue::text(&self.cell(other)),
        }
    }
}

impl GridRow for Category {
    fn row_id(&self) -> String {
        self.id.to_string()
    }

    fn cell(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            "description" => self.description.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn sort_value(&self, key: &str) -> SortValue {
        SortValue::text(&self.cell(key))
    }
}

impl GridRow for Brand {
    fn row_id(&self) -> String {
        self.id.to_string()
    }

    fn cell(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            "description" => self.description.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn sort_value(&self, key: &str) -> SortValue {
        SortValue::text(&self.cell(key))
    }
}

/// Grid controls taken from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub size: Option<usize>,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: String,
    pub cells: Vec<String>,
}

/// Header cell with the link that sorts by it.
#[derive(Debug, Clone)]
pub struct HeaderView {
    pub label: &'static str,
    pub sort_href: Option<String>,
    /// `asc`/`desc` when the table is currently sorted by this column.
    pub active_dir: Option<&'static str>,
}

/// Everything the table template needs.
#[derive(Debug, Clone)]
pub struct GridView {
    pub config: DataTableConfig,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub search: String,
    /// Rows matching the search, across all pages.
    pub filtered: usize,
    /// Rows before search.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub sort: Option<String>,
    pub dir: SortDir,
    base_path: String,
    section: String,
}

impl GridView {
    /// Search, sort and paginate `items`.
    #[must_use]
    pub fn build<T: GridRow>(
        items: &[T],
        config: DataTableConfig,
        params: &GridParams,
        base_path: &str,
    ) -> Self {
        let search = params.search.clone().unwrap_or_default();
        let mut matched = filter_by_name(items, &search);

        let dir = SortDir::from_param(params.dir.as_deref());
        let sort = params
            .sort
            .as_deref()
            .and_then(|key| config.sortable_column(key))
            .map(|c| c.key);
        if let Some(key) = sort {
            matched.sort_by(|a, b| {
                let ord: Ordering = a.sort_value(key).cmp(&b.sort_value(key));
                match dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            });
        }

        let page_size = params
            .size
            .filter(|s| PAGE_SIZES.contains(s))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let filtered = matched.len();
        let page_count = filtered.div_ceil(page_size).max(1);
        let page = params.page.unwrap_or(1).clamp(1, page_count);

        let rows = matched
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .map(|item| RowView {
                id: item.row_id(),
                cells: config.columns.iter().map(|c| item.cell(c.key)).collect(),
            })
            .collect();

        let mut view = Self {
            headers: Vec::new(),
            rows,
            search,
            filtered,
            total: items.len(),
            page,
            page_count,
            page_size,
            sort: sort.map(String::from),
            dir,
            base_path: base_path.to_string(),
            section: config.table_id.to_string(),
            config,
        };
        view.headers = view.build_headers();
        view
    }

    fn build_headers(&self) -> Vec<HeaderView> {
        self.config
            .columns
            .iter()
            .map(|c| {
                let active = self.sort.as_deref() == Some(c.key);
                let next_dir = if active { self.dir.toggle() } else { SortDir::Asc };
                HeaderView {
                    label: c.label,
                    sort_href: c
                        .sortable
                        .then(|| self.href_with(Some(c.key), next_dir, 1, self.page_size)),
                    active_dir: active.then(|| self.dir.as_str()),
                }
            })
            .collect()
    }

    fn href_with(&self, sort: Option<&str>, dir: SortDir, page: usize, size: usize) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("section", &self.section);
        if !self.search.is_empty() {
            query.append_pair("search", &self.search);
        }
        if let Some(sort) = sort {
            query.append_pair("sort", sort);
            query.append_pair("dir", dir.as_str());
        }
        query.append_pair("page", &page.to_string());
        query.append_pair("size", &size.to_string());
        format!("{}?{}", self.base_path, query.finish())
    }

    /// Link to `page`, keeping search, sort and size.
    #[must_use]
    pub fn page_href(&self, page: usize) -> String {
        self.href_with(self.sort.as_deref(), self.dir, page, self.page_size)
    }

    /// Link switching to `size` rows per page (back to page 1).
    #[must_use]
    pub fn size_href(&self, size: usize) -> String {
        self.href_with(self.sort.as_deref(), self.dir, 1, size)
    }

    #[must_use]
    pub const fn prev_page(&self) -> Option<usize> {
        if self.page > 1 { Some(self.page - 1) } else { None }
    }

    #[must_use]
    pub const fn next_page(&self) -> Option<usize> {
        if self.page < self.page_count {
            Some(self.page + 1)
        } else {
            None
        }
    }

    #[must_use]
    pub fn prev_href(&self) -> Option<String> {
        self.prev_page().map(|p| self.page_href(p))
    }

    #[must_use]
    pub fn next_href(&self) -> Option<String> {
        self.next_page().map(|p| self.page_href(p))
    }

    #[must_use]
    pub const fn page_sizes(&self) -> &'static [usize] {
        &PAGE_SIZES
    }

    /// Rows-per-page switcher entries.
    #[must_use]
    pub fn size_links(&self) -> Vec<SizeLink> {
        self.page_sizes()
            .iter()
            .map(|&size| SizeLink {
                size,
                href: self.size_href(size),
                active: size == self.page_size,
            })
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Entry in the rows-per-page switcher.
#[derive(Debug, Clone)]
pub struct SizeLink {
    pub size: usize,
    pub href: String,
    pub active: bool,
}

/// Products panel table.
#[must_use]
pub fn products_table_config() -> DataTableConfig {
    DataTableConfig::new("products")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::sortable("category", "Category"))
        .column(TableColumn::sortable("brand", "Brand"))
        .column(TableColumn::sortable("price", "Price"))
        .column(TableColumn::sortable("stock", "Stock"))
        .search_placeholder("Search products...")
        .empty_title("No products found")
}

/// Categories panel table.
#[must_use]
pub fn categories_table_config() -> DataTableConfig {
    DataTableConfig::new("categories")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::new("description", "Description"))
        .search_placeholder("Search categories...")
        .empty_title("No categories found")
}

/// Brands panel table.
#[must_use]
pub fn brands_table_config() -> DataTableConfig {
    DataTableConfig::new("brands")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::new("description", "Description"))
        .search_placeholder("Search brands...")
        .empty_title("No brands found")
}

//! Admin back-office: products, categories and brands.
//!
//! Every panel follows the same cycle: fetch the list, show it in the data
//! table, open a modal form for create or edit, submit, and the API client
//! drops its cached list so the redirect shows fresh data.

pub mod brands;
pub mod categories;
pub mod form;
mod named;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hoopshop_core::{Brand, Category, paths};

use crate::api::ApiError;
use crate::components::data_table::{
    DataTableConfig, GridParams, GridRow, GridView, brands_table_config, categories_table_config,
    products_table_config,
};
use crate::filters;
use crate::middleware::{Flash, RequireAdmin, set_flash};
use crate::models::CurrentUser;
use crate::routes::{LOAD_ERROR_MESSAGE, PageContext};
use crate::state::AppState;

use self::form::ModalView;

/// Dashboard sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Products,
    Categories,
    Brands,
}

impl Section {
    pub const ALL: [Self; 3] = [Self::Products, Self::Categories, Self::Brands];

    /// Parse `?section=`; unknown values fall back to products.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("categories") => Self::Categories,
            Some("brands") => Self::Brands,
            _ => Self::Products,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Brands => "brands",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::Categories => "Categories",
            Self::Brands => "Brands",
        }
    }

    /// Dashboard URL for this section.
    #[must_use]
    pub fn href(self) -> String {
        format!("{}?section={}", paths::ADMIN_DASHBOARD, self.as_str())
    }

    /// Where the create form posts.
    #[must_use]
    pub fn collection_path(self) -> String {
        format!("/admin/{}", self.as_str())
    }

    /// Where the edit form for `id` posts.
    #[must_use]
    pub fn item_path(self, id: &str) -> String {
        format!("/admin/{}/{id}", self.as_str())
    }
}

/// Sidebar entry.
#[derive(Debug, Clone)]
pub struct SectionLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// What the panel body shows.
#[derive(Debug, Clone)]
pub enum PanelState {
    /// The list could not be fetched.
    Error(String),
    /// The API returned no records.
    Empty,
    List(GridView),
}

impl PanelState {
    fn from_result<T: GridRow>(
        result: &Result<Vec<T>, ApiError>,
        config: DataTableConfig,
        params: &GridParams,
    ) -> Self {
        match result {
            Err(_) => Self::Error(LOAD_ERROR_MESSAGE.to_string()),
            Ok(items) if items.is_empty() => Self::Empty,
            Ok(items) => Self::List(GridView::build(items, config, params, paths::ADMIN_DASHBOARD)),
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub const fn grid(&self) -> Option<&GridView> {
        match self {
            Self::List(grid) => Some(grid),
            _ => None,
        }
    }
}

/// Which modal, if any, to open.
#[derive(Debug, Clone)]
pub enum ModalRequest {
    None,
    New,
    Edit(String),
    /// A submitted form coming back with errors.
    Prefilled(ModalView),
}

/// Dashboard query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub section: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
    /// `new` opens the create form.
    pub modal: Option<String>,
    /// Opens the edit form for this id.
    pub edit: Option<String>,
}

impl DashboardQuery {
    fn grid_params(&self) -> GridParams {
        GridParams {
            search: self.search.clone(),
            sort: self.sort.clone(),
            dir: self.dir.clone(),
            page: self.page,
            size: self.size,
        }
    }

    fn modal_request(&self) -> ModalRequest {
        if let Some(id) = self.edit.as_deref().filter(|id| !id.is_empty()) {
            ModalRequest::Edit(id.to_string())
        } else if self.modal.as_deref() == Some("new") {
            ModalRequest::New
        } else {
            ModalRequest::None
        }
    }
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub section: Section,
    pub sections: Vec<SectionLink>,
    pub panel: PanelState,
    pub modal: Option<ModalView>,
    pub new_href: String,
}

impl DashboardTemplate {
    /// Link that opens the edit modal for a row.
    #[must_use]
    pub fn edit_href(&self, id: &str) -> String {
        format!("{}&edit={id}", self.section.href())
    }

    /// Delete form action for a row.
    #[must_use]
    pub fn delete_action(&self, id: &str) -> String {
        format!("{}/delete", self.section.item_path(id))
    }
}

/// Admin dashboard page.
#[instrument(skip(state, session, admin), fields(admin_id = %admin.id()))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let section = Section::from_param(query.section.as_deref());
    render_dashboard(
        &state,
        &session,
        &admin,
        section,
        &query.grid_params(),
        query.modal_request(),
    )
    .await
    .into_response()
}

/// Fetch the section's list and render the dashboard around it.
pub(crate) async fn render_dashboard(
    state: &AppState,
    session: &Session,
    admin: &CurrentUser,
    section: Section,
    params: &GridParams,
    modal: ModalRequest,
) -> DashboardTemplate {
    let api = state.api();
    let (panel, modal) = match section {
        Section::Products => {
            let products = api.list_products().await;
            log_load_error(&products, section);
            let panel = PanelState::from_result(&products, products_table_config(), params);
            let modal = match modal {
                ModalRequest::None => None,
                ModalRequest::Prefilled(view) => Some(view),
                request => {
                    let (categories, brands) = reference_lists(state).await;
                    products::modal_for(
                        &request,
                        products.as_deref().unwrap_or_default(),
                        &categories,
                        &brands,
                    )
                }
            };
            (panel, modal)
        }
        Section::Categories => {
            let categories = api.list_categories().await;
            log_load_error(&categories, section);
            let panel = PanelState::from_result(&categories, categories_table_config(), params);
            let modal = categories::modal_for(modal, categories.as_deref().unwrap_or_default());
            (panel, modal)
        }
        Section::Brands => {
            let brands = api.list_brands().await;
            log_load_error(&brands, section);
            let panel = PanelState::from_result(&brands, brands_table_config(), params);
            let modal = brands::modal_for(modal, brands.as_deref().unwrap_or_default());
            (panel, modal)
        }
    };

    DashboardTemplate {
        page: PageContext::load(session, Some(admin)).await,
        section,
        sections: Section::ALL
            .iter()
            .map(|s| SectionLink {
                label: s.label(),
                href: s.href(),
                active: *s == section,
            })
            .collect(),
        panel,
        modal,
        new_href: format!("{}&modal=new", section.href()),
    }
}

fn log_load_error<T>(result: &Result<T, ApiError>, section: Section) {
    if let Err(e) = result {
        tracing::error!(error = %e, section = section.as_str(), "Failed to load admin list");
    }
}

/// Category and brand lists for the product form's selects.
///
/// Failures give empty lists; the form still opens.
pub(crate) async fn reference_lists(state: &AppState) -> (Vec<Category>, Vec<Brand>) {
    let (categories, brands) =
        tokio::join!(state.api().list_categories(), state.api().list_brands());
    let categories = categories.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories for product form");
        Vec::new()
    });
    let brands = brands.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load brands for product form");
        Vec::new()
    });
    (categories, brands)
}

/// Re-render the dashboard with a form that needs fixing.
pub(crate) async fn rerender_with_modal(
    state: &AppState,
    session: &Session,
    admin: &CurrentUser,
    section: Section,
    modal: ModalView,
    status: StatusCode,
) -> Response {
    let template = render_dashboard(
        state,
        session,
        admin,
        section,
        &GridParams::default(),
        ModalRequest::Prefilled(modal),
    )
    .await;
    (status, template).into_response()
}

/// Flash the outcome of a mutation and go back to the section.
pub(crate) async fn redirect_with_flash(session: &Session, section: Section, flash: Flash) -> Response {
    if let Err(e) = set_flash(session, flash).await {
        tracing::error!(error = %e, "Failed to store flash notice");
    }
    Redirect::to(&section.href()).into_response()
}

/// Status for a form the API refused: its own 4xx verdicts are the user's to fix.
pub(crate) const fn api_failure_status(err: &ApiError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::BAD_GATEWAY
    }
}

/// Find a record by the id string from `?edit=`.
pub(crate) fn find_by_id<'a, T: GridRow>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.row_id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_from_param() {
        assert_eq!(Section::from_param(None), Section::Products);
        assert_eq!(Section::from_param(Some("brands")), Section::Brands);
        assert_eq!(Section::from_param(Some("categories")), Section::Categories);
        assert_eq!(Section::from_param(Some("orders")), Section::Products);
    }

    #[test]
    fn test_section_paths() {
        assert_eq!(Section::Brands.href(), "/admin/dashboard?section=brands");
        assert_eq!(Section::Categories.collection_path(), "/admin/categories");
        assert_eq!(Section::Products.item_path("9"), "/admin/products/9");
    }

    #[test]
    fn test_modal_request() {
        let query = DashboardQuery {
            modal: Some("new".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.modal_request(), ModalRequest::New));

        let query = DashboardQuery {
            modal: Some("new".to_string()),
            edit: Some("4".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.modal_request(), ModalRequest::Edit(id) if id == "4"));

        assert!(matches!(
            DashboardQuery::default().modal_request(),
            ModalRequest::None
        ));
    }

    #[test]
    fn test_panel_state_from_result() {
        let params = GridParams::default();
        let err: Result<Vec<Brand>, ApiError> = Err(ApiError::RateLimited(1));
        let panel = PanelState::from_result(&err, brands_table_config(), &params);
        assert_eq!(panel.error(), Some(LOAD_ERROR_MESSAGE));

        let empty: Result<Vec<Brand>, ApiError> = Ok(Vec::new());
        assert!(PanelState::from_result(&empty, brands_table_config(), &params).is_empty());
    }
}

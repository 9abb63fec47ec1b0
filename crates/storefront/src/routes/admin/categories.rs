//! Category panel handlers.

use axum::{
    Form,
    extract::{Path, State},
    response::Response,
};
use tower_sessions::Session;
use tracing::instrument;

use hoopshop_core::{Category, CategoryId, CategoryInput};

use super::form::{ModalView, NameForm};
use super::named::{NamedPanel, Target, trimmed};
use super::{ModalRequest, Section};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const PANEL: NamedPanel = NamedPanel {
    section: Section::Categories,
    label: "Category",
    noun: "category",
};

fn to_form(category: &Category) -> NameForm {
    let input = CategoryInput::from(category);
    NameForm {
        name: input.name,
        description: input.description,
    }
}

fn to_input(form: &NameForm) -> CategoryInput {
    let (name, description) = trimmed(form);
    CategoryInput { name, description }
}

/// The modal the dashboard should open, if any.
pub(super) fn modal_for(request: ModalRequest, categories: &[Category]) -> Option<ModalView> {
    PANEL.modal_for(request, categories, to_form)
}

/// Create a category.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.id()))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<NameForm>,
) -> Response {
    let api = state.api();
    let input = to_input(&form);
    PANEL
        .save(&state, &session, &admin, Target::New, &form, input, |input| async move {
            api.create_category(&input).await
        })
        .await
}

/// Update a category.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.id()))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
    Form(form): Form<NameForm>,
) -> Response {
    let api = state.api();
    let input = to_input(&form);
    let target = Target::Edit(id.to_string());
    PANEL
        .save(&state, &session, &admin, target, &form, input, |input| async move {
            api.update_category(id, &input).await
        })
        .await
}

/// Delete a category.
#[instrument(skip(state, session, admin), fields(admin_id = %admin.id()))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Response {
    PANEL.deleted(&session, state.api().delete_category(id).await).await
}

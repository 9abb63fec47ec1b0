//! Brand panel handlers.

use axum::{
    Form,
    extract::{Path, State},
    response::Response,
};
use tower_sessions::Session;
use tracing::instrument;

use hoopshop_core::{Brand, BrandId, BrandInput};

use super::form::{ModalView, NameForm};
use super::named::{NamedPanel, Target, trimmed};
use super::{ModalRequest, Section};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const PANEL: NamedPanel = NamedPanel {
    section: Section::Brands,
    label: "Brand",
    noun: "brand",
};

fn to_form(brand: &Brand) -> NameForm {
    let input = BrandInput::from(brand);
    NameForm {
        name: input.name,
        description: input.description,
    }
}

fn to_input(form: &NameForm) -> BrandInput {
    let (name, description) = trimmed(form);
    BrandInput { name, description }
}

/// The modal the dashboard should open, if any.
pub(super) fn modal_for(request: ModalRequest, brands: &[Brand]) -> Option<ModalView> {
    PANEL.modal_for(request, brands, to_form)
}

/// Create a brand.
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
            api.create_brand(&input).await
        })
        .await
}

/// Update a brand.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.id()))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BrandId>,
    Form(form): Form<NameForm>,
) -> Response {
    let api = state.api();
    let input = to_input(&form);
    let target = Target::Edit(id.to_string());
    PANEL
        .save(&state, &session, &admin, target, &form, input, |input| async move {
            api.update_brand(id, &input).await
        })
        .await
}

/// Delete a brand.
#[instrument(skip(state, session, admin), fields(admin_id = %admin.id()))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BrandId>,
) -> Response {
    PANEL.deleted(&session, state.api().delete_brand(id).await).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_modal_is_blank() {
        let modal = modal_for(ModalRequest::New, &[]).unwrap();
        assert_eq!(modal.title, "New Brand");
        assert_eq!(modal.action, "/admin/brands");
        assert!(modal.fields.iter().all(|f| f.value.is_empty()));
    }

    #[test]
    fn test_input_is_trimmed() {
        let input = to_input(&NameForm {
            name: "  Molten ".to_string(),
            description: String::new(),
        });
        assert_eq!(input.name, "Molten");
    }
}

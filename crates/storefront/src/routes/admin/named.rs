//! Shared handling for the name/description panels (categories and brands).

use std::future::Future;

use axum::{http::StatusCode, response::Response};
use tower_sessions::Session;

use hoopshop_core::Validate;

use super::form::{ModalView, NameForm, name_fields};
use super::{
    ModalRequest, Section, api_failure_status, find_by_id, redirect_with_flash,
    rerender_with_modal,
};
use crate::api::ApiError;
use crate::components::data_table::GridRow;
use crate::middleware::Flash;
use crate::models::CurrentUser;
use crate::state::AppState;

/// One name/description resource.
pub(super) struct NamedPanel {
    pub section: Section,
    /// Capitalised, for titles and flashes ("Category").
    pub label: &'static str,
    /// Lower-case, for error text ("category").
    pub noun: &'static str,
}

/// Which modal a save came from.
pub(super) enum Target {
    New,
    Edit(String),
}

impl NamedPanel {
    fn modal(&self, target: &Target, form: &NameForm) -> ModalView {
        let (title, action, submit_label) = match target {
            Target::New => (
                format!("New {}", self.label),
                self.section.collection_path(),
                "Create",
            ),
            Target::Edit(id) => (
                format!("Edit {}", self.label),
                self.section.item_path(id),
                "Save",
            ),
        };
        ModalView {
            title,
            action,
            submit_label,
            close_href: self.section.href(),
            fields: name_fields(form),
            form_error: None,
        }
    }

    /// The modal the dashboard should open, if any.
    pub fn modal_for<T: GridRow>(
        &self,
        request: ModalRequest,
        records: &[T],
        to_form: impl Fn(&T) -> NameForm,
    ) -> Option<ModalView> {
        match request {
            ModalRequest::None => None,
            ModalRequest::New => Some(self.modal(&Target::New, &NameForm::default())),
            ModalRequest::Edit(id) => find_by_id(records, &id)
                .map(|record| self.modal(&Target::Edit(id.clone()), &to_form(record))),
            ModalRequest::Prefilled(view) => Some(view),
        }
    }

    /// Validate, send to the API, then redirect or re-open the modal.
    #[allow(clippy::too_many_arguments)]
    pub async fn save<I, F, Fut>(
        &self,
        state: &AppState,
        session: &Session,
        admin: &CurrentUser,
        target: Target,
        form: &NameForm,
        input: I,
        call: F,
    ) -> Response
    where
        I: Validate,
        F: FnOnce(I) -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        let verb = match target {
            Target::New => "created",
            Target::Edit(_) => "updated",
        };
        if let Err(errors) = input.validate() {
            let view = self.modal(&target, form).with_errors(&errors);
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return rerender_with_modal(state, session, admin, self.section, view, status).await;
        }

        match call(input).await {
            Ok(()) => {
                let flash = Flash::success(format!("{} {verb}", self.label));
                redirect_with_flash(session, self.section, flash).await
            }
            Err(e) => {
                tracing::warn!(error = %e, resource = self.noun, "Save failed");
                let fallback = format!("Failed to save {}", self.noun);
                let view = self
                    .modal(&target, form)
                    .with_form_error(e.server_message().unwrap_or(&fallback));
                let status = api_failure_status(&e);
                rerender_with_modal(state, session, admin, self.section, view, status).await
            }
        }
    }

    /// Flash the outcome of a delete and go back to the panel.
    pub async fn deleted(&self, session: &Session, result: Result<(), ApiError>) -> Response {
        let flash = match result {
            Ok(()) => Flash::success(format!("{} deleted", self.label)),
            Err(e) => {
                tracing::warn!(error = %e, resource = self.noun, "Delete failed");
                let fallback = format!("Failed to delete {}", self.noun);
                Flash::error(e.server_message().unwrap_or(&fallback).to_string())
            }
        };
        redirect_with_flash(session, self.section, flash).await
    }
}

/// Trimmed name and description from the form.
pub(super) fn trimmed(form: &NameForm) -> (String, String) {
    (
        form.name.trim().to_string(),
        form.description.trim().to_string(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PANEL: NamedPanel = NamedPanel {
        section: Section::Brands,
        label: "Brand",
        noun: "brand",
    };

    #[test]
    fn test_new_and_edit_modals() {
        let form = NameForm {
            name: "Molten".to_string(),
            description: String::new(),
        };
        let new = PANEL.modal(&Target::New, &form);
        assert_eq!(new.title, "New Brand");
        assert_eq!(new.action, "/admin/brands");
        assert_eq!(new.submit_label, "Create");

        let edit = PANEL.modal(&Target::Edit("7".to_string()), &form);
        assert_eq!(edit.title, "Edit Brand");
        assert_eq!(edit.action, "/admin/brands/7");
        assert_eq!(edit.fields[0].value, "Molten");
    }

    #[test]
    fn test_trimmed() {
        let form = NameForm {
            name: "  Socks ".to_string(),
            description: " warm ".to_string(),
        };
        assert_eq!(trimmed(&form), ("Socks".to_string(), "warm".to_string()));
    }
}

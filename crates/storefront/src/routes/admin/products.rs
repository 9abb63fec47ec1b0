//! Product panel handlers.

use std::str::FromStr;

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hoopshop_core::{
    Brand, BrandId, Category, CategoryId, Price, Product, ProductId, ProductInput, Validate,
    ValidationErrors,
};

use super::form::{FieldView, ModalView, brand_choices, category_choices};
use super::{
    ModalRequest, Section, api_failure_status, find_by_id, redirect_with_flash,
    reference_lists, rerender_with_modal,
};
use crate::middleware::{Flash, RequireAdmin};
use crate::models::CurrentUser;
use crate::state::AppState;

const SECTION: Section = Section::Products;

/// Submitted product form. Numbers arrive as text and are parsed here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub brand_id: String,
}

impl ProductForm {
    fn from_product(product: &Product) -> Self {
        let input = ProductInput::from_product(product);
        Self {
            name: input.name,
            description: input.description,
            image: input.image,
            price: input.price.amount().to_string(),
            stock: input.stock.to_string(),
            category_id: input.category_id.to_string(),
            brand_id: input.brand_id.to_string(),
        }
    }

    /// Parse and validate into the API body.
    ///
    /// Parse problems and rule violations are reported together, one message
    /// per field.
    fn parse(&self) -> Result<ProductInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let price = match Decimal::from_str(self.price.trim()) {
            Ok(amount) => Price::new(amount),
            Err(_) => {
                if !self.price.trim().is_empty() {
                    errors.add("price", "Price must be a number");
                }
                Price::ZERO
            }
        };
        let stock = match self.stock.trim() {
            "" => 0,
            raw => raw.parse::<i32>().unwrap_or_else(|_| {
                errors.add("stock", "Stock must be a whole number");
                0
            }),
        };
        let category_id = CategoryId::from_str(&self.category_id).unwrap_or_else(|_| {
            errors.add("category_id", "Category is required");
            CategoryId::new(0)
        });
        let brand_id = BrandId::from_str(&self.brand_id).unwrap_or_else(|_| {
            errors.add("brand_id", "Brand is required");
            BrandId::new(0)
        });

        let input = ProductInput {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            image: self.image.trim().to_string(),
            price,
            stock,
            category_id,
            brand_id,
        };

        if let Err(rule_errors) = input.validate() {
            for e in rule_errors.iter() {
                if errors.get(e.field).is_none() {
                    errors.add(e.field, e.message.clone());
                }
            }
        }
        errors.into_result().map(|()| input)
    }
}

fn modal(
    title: &str,
    action: String,
    submit_label: &'static str,
    form: &ProductForm,
    categories: &[Category],
    brands: &[Brand],
) -> ModalView {
    ModalView {
        title: title.to_string(),
        action,
        submit_label,
        close_href: SECTION.href(),
        fields: vec![
            FieldView::text("name", "Name", &form.name),
            FieldView::textarea("description", "Description", &form.description),
            FieldView::text("image", "Image URL", &form.image),
            FieldView::number("price", "Price", &form.price, "0.01"),
            FieldView::number("stock", "Stock", &form.stock, "1"),
            FieldView::select(
                "category_id",
                "Category",
                &form.category_id,
                category_choices(categories),
            ),
            FieldView::select("brand_id", "Brand", &form.brand_id, brand_choices(brands)),
        ],
        form_error: None,
    }
}

fn new_modal(form: &ProductForm, categories: &[Category], brands: &[Brand]) -> ModalView {
    modal(
        "New Product",
        SECTION.collection_path(),
        "Create",
        form,
        categories,
        brands,
    )
}

fn edit_modal(id: &str, form: &ProductForm, categories: &[Category], brands: &[Brand]) -> ModalView {
    modal(
        "Edit Product",
        SECTION.item_path(id),
        "Save",
        form,
        categories,
        brands,
    )
}

/// The modal the dashboard should open, if any.
pub(super) fn modal_for(
    request: &ModalRequest,
    products: &[Product],
    categories: &[Category],
    brands: &[Brand],
) -> Option<ModalView> {
    match request {
        ModalRequest::None => None,
        ModalRequest::New => Some(new_modal(&ProductForm::default(), categories, brands)),
        ModalRequest::Edit(id) => find_by_id(products, id)
            .map(|p| edit_modal(id, &ProductForm::from_product(p), categories, brands)),
        ModalRequest::Prefilled(view) => Some(view.clone()),
    }
}

/// Re-render with the submitted values and their errors.
async fn reject(
    state: &AppState,
    session: &Session,
    admin: &CurrentUser,
    edit_id: Option<&str>,
    form: &ProductForm,
    problem: Result<ValidationErrors, String>,
    status: StatusCode,
) -> Response {
    let (categories, brands) = reference_lists(state).await;
    let view = match edit_id {
        Some(id) => edit_modal(id, form, &categories, &brands),
        None => new_modal(form, &categories, &brands),
    };
    let view = match problem {
        Ok(errors) => view.with_errors(&errors),
        Err(message) => view.with_form_error(message),
    };
    rerender_with_modal(state, session, admin, SECTION, view, status).await
}

/// Create a product.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.id()))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Response {
    let input = match form.parse() {
        Ok(input) => input,
        Err(errors) => {
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return reject(&state, &session, &admin, None, &form, Ok(errors), status).await;
        }
    };

    match state.api().create_product(&input).await {
        Ok(()) => redirect_with_flash(&session, SECTION, Flash::success("Product created")).await,
        Err(e) => {
            tracing::warn!(error = %e, "Create product failed");
            let message = e.server_message().unwrap_or("Failed to save product").to_string();
            let status = api_failure_status(&e);
            reject(&state, &session, &admin, None, &form, Err(message), status).await
        }
    }
}

/// Update a product.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.id()))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Response {
    let id_str = id.to_string();
    let input = match form.parse() {
        Ok(input) => input,
        Err(errors) => {
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return reject(&state, &session, &admin, Some(&id_str), &form, Ok(errors), status)
                .await;
        }
    };

    match state.api().update_product(id, &input).await {
        Ok(()) => redirect_with_flash(&session, SECTION, Flash::success("Product updated")).await,
        Err(e) => {
            tracing::warn!(error = %e, "Update product failed");
            let message = e.server_message().unwrap_or("Failed to save product").to_string();
            let status = api_failure_status(&e);
            reject(&state, &session, &admin, Some(&id_str), &form, Err(message), status).await
        }
    }
}

/// Delete a product.
#[instrument(skip(state, session, admin), fields(admin_id = %admin.id()))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Response {
    let flash = match state.api().delete_product(id).await {
        Ok(()) => Flash::success("Product deleted"),
        Err(e) => {
            tracing::warn!(error = %e, "Delete product failed");
            Flash::error(e.server_message().unwrap_or("Failed to delete product").to_string())
        }
    };
    redirect_with_flash(&session, SECTION, flash).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "Pro Hoop".to_string(),
            description: String::new(),
            image: String::new(),
            price: "249.99".to_string(),
            stock: "4".to_string(),
            category_id: "2".to_string(),
            brand_id: "1".to_string(),
        }
    }

    #[test]
    fn test_parse_valid_form() {
        let input = form().parse().unwrap();
        assert_eq!(input.price, Price::from_cents(24999));
        assert_eq!(input.stock, 4);
        assert_eq!(input.category_id, CategoryId::new(2));
    }

    #[test]
    fn test_parse_reports_rule_messages() {
        let errors = ProductForm {
            name: "  ".to_string(),
            price: "0".to_string(),
            stock: "-3".to_string(),
            ..form()
        }
        .parse()
        .unwrap_err();

        assert_eq!(errors.get("name"), Some("Product name is required"));
        assert_eq!(errors.get("price"), Some("Price must be greater than 0"));
        assert_eq!(errors.get("stock"), Some("Stock cannot be negative"));
    }

    #[test]
    fn test_parse_reports_one_message_per_field() {
        let errors = ProductForm {
            price: "abc".to_string(),
            category_id: String::new(),
            ..form()
        }
        .parse()
        .unwrap_err();

        assert_eq!(errors.get("price"), Some("Price must be a number"));
        assert_eq!(errors.get("category_id"), Some("Category is required"));
        assert_eq!(errors.iter().filter(|e| e.field == "price").count(), 1);
    }

    #[test]
    fn test_empty_price_is_not_positive() {
        let errors = ProductForm {
            price: String::new(),
            ..form()
        }
        .parse()
        .unwrap_err();
        assert_eq!(errors.get("price"), Some("Price must be greater than 0"));
    }
}

//! Modal form model shared by the admin panels.
//!
//! The template renders any [`ModalView`] field by field, so each panel only
//! describes its fields.

use serde::Deserialize;

use hoopshop_core::{Brand, Category, ValidationErrors};

/// One form control.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    /// `text`, `textarea`, `number` or `select`.
    pub input: &'static str,
    pub value: String,
    pub step: Option<&'static str>,
    pub options: Vec<SelectOption>,
    pub error: Option<String>,
}

impl FieldView {
    fn new(name: &'static str, label: &'static str, input: &'static str, value: &str) -> Self {
        Self {
            name,
            label,
            input,
            value: value.to_string(),
            step: None,
            options: Vec::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn text(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(name, label, "text", value)
    }

    #[must_use]
    pub fn textarea(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(name, label, "textarea", value)
    }

    #[must_use]
    pub fn number(name: &'static str, label: &'static str, value: &str, step: &'static str) -> Self {
        Self {
            step: Some(step),
            ..Self::new(name, label, "number", value)
        }
    }

    /// A select whose current `value` is marked selected.
    #[must_use]
    pub fn select(
        name: &'static str,
        label: &'static str,
        value: &str,
        choices: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let options = choices
            .into_iter()
            .map(|(option_value, text)| SelectOption {
                selected: option_value == value,
                value: option_value,
                text,
            })
            .collect();
        Self {
            options,
            ..Self::new(name, label, "select", value)
        }
    }

    #[must_use]
    pub fn is_textarea(&self) -> bool {
        self.input == "textarea"
    }

    #[must_use]
    pub fn is_select(&self) -> bool {
        self.input == "select"
    }
}

/// `<option>` in a select field.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
    pub selected: bool,
}

/// A create or edit form shown over the panel.
#[derive(Debug, Clone)]
pub struct ModalView {
    pub title: String,
    /// Form `action`.
    pub action: String,
    pub submit_label: &'static str,
    /// Where the close button goes.
    pub close_href: String,
    pub fields: Vec<FieldView>,
    /// Error not tied to one field (the API refused the save).
    pub form_error: Option<String>,
}

impl ModalView {
    /// Attach field messages.
    #[must_use]
    pub fn with_errors(mut self, errors: &ValidationErrors) -> Self {
        for field in &mut self.fields {
            field.error = errors.get(field.name).map(String::from);
        }
        self
    }

    #[must_use]
    pub fn with_form_error(mut self, message: impl Into<String>) -> Self {
        self.form_error = Some(message.into());
        self
    }
}

/// Submitted name/description form, used by categories and brands.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Fields of the name/description form.
#[must_use]
pub fn name_fields(form: &NameForm) -> Vec<FieldView> {
    vec![
        FieldView::text("name", "Name", &form.name),
        FieldView::textarea("description", "Description", &form.description),
    ]
}

/// `(id, name)` pairs for a category select.
pub fn category_choices(categories: &[Category]) -> impl Iterator<Item = (String, String)> + '_ {
    categories.iter().map(|c| (c.id.to_string(), c.name.clone()))
}

/// `(id, name)` pairs for a brand select.
pub fn brand_choices(brands: &[Brand]) -> impl Iterator<Item = (String, String)> + '_ {
    brands.iter().map(|b| (b.id.to_string(), b.name.clone()))
}

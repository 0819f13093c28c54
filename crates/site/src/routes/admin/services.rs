//! Admin service management: list, create, edit, delete.
//!
//! Services carry no image, so the forms are plain urlencoded posts. The
//! icon picker offers a curated subset of the glyph set; anything else
//! submitted decodes to the generic fallback.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::instrument;

use allin_catalog::CatalogError;
use allin_core::{Collection, IconKey, ItemId, Service, ServiceDraft};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::state::AppState;

use super::{MessageQuery, mapped};

/// Icon choices offered by the service form, as (key, label) pairs.
const ICON_CHOICES: &[(&str, &str)] = &[
    ("palette", "Design"),
    ("video", "Video"),
    ("megaphone", "Marketing"),
    ("printer", "Printing"),
    ("briefcase", "Business"),
    ("camera", "Photography"),
    ("wrench", "Services"),
    ("globe", "Web"),
    ("crown", "Premium"),
];

/// One option in the icon picker.
pub struct IconChoice {
    pub key: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// The picker options with the current key marked.
fn icon_choices(selected: &str) -> Vec<IconChoice> {
    ICON_CHOICES
        .iter()
        .copied()
        .map(|(key, label)| IconChoice {
            key,
            label,
            selected: key == selected,
        })
        .collect()
}

/// Service list page.
#[derive(Template, WebTemplate)]
#[template(path = "admin/services.html")]
pub struct ServiceListTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    pub services: Vec<Service>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Service form page, shared by create and edit.
#[derive(Template, WebTemplate)]
#[template(path = "admin/service_form.html")]
pub struct ServiceFormTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    /// Where the form posts to.
    pub action: String,
    pub heading: &'static str,
    pub error: Option<String>,
    pub title: String,
    pub description: String,
    /// Picker options with the current key marked.
    pub choices: Vec<IconChoice>,
}

/// Delete confirmation page.
#[derive(Template, WebTemplate)]
#[template(path = "admin/service_delete.html")]
pub struct ServiceDeleteTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    pub service: Service,
}

/// Service form fields.
#[derive(Debug, Deserialize)]
pub struct ServiceForm {
    pub title: String,
    pub description: String,
    pub icon: String,
}

impl ServiceForm {
    fn draft(&self) -> ServiceDraft {
        ServiceDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            icon: IconKey::parse_or_default(&self.icon),
        }
    }

    /// Re-render the form with an error, keeping what the admin typed.
    fn into_error_form(
        self,
        admin: CurrentUser,
        demo: bool,
        action: String,
        heading: &'static str,
        error: String,
    ) -> ServiceFormTemplate {
        ServiceFormTemplate {
            user: Some(admin),
            demo,
            action,
            heading,
            error: Some(error),
            choices: icon_choices(&self.icon),
            title: self.title,
            description: self.description,
        }
    }
}

/// Display the service list.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    ServiceListTemplate {
        demo: state.is_demo(),
        services: state.repository().services().await,
        user: Some(admin),
        error: mapped(query.error),
        success: mapped(query.success),
    }
}

/// Display the empty service form.
#[instrument(skip_all)]
pub async fn new_form(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> impl IntoResponse {
    ServiceFormTemplate {
        user: Some(admin),
        demo: state.is_demo(),
        action: "/admin/services".to_owned(),
        heading: "New Service",
        error: None,
        title: String::new(),
        description: String::new(),
        choices: icon_choices(Collection::Services.default_icon().as_str()),
    }
}

/// Handle service creation.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<ServiceForm>,
) -> Result<Response> {
    let demo = state.is_demo();
    let draft = form.draft();

    if let Err(error) = draft.validate() {
        let page = form.into_error_form(
            admin,
            demo,
            "/admin/services".to_owned(),
            "New Service",
            error.to_string(),
        );
        return Ok(page.into_response());
    }

    match state.repository().create_service(draft).await {
        Ok(service) => {
            add_breadcrumb(
                "catalog",
                "Created service",
                Some(&[("id", service.id.as_str())]),
            );
            Ok(Redirect::to("/admin/services?success=created").into_response())
        }
        Err(CatalogError::Validation(error)) => {
            let page = form.into_error_form(
                admin,
                demo,
                "/admin/services".to_owned(),
                "New Service",
                error.to_string(),
            );
            Ok(page.into_response())
        }
        Err(error) => Err(error.into()),
    }
}

/// Display the edit form, prefilled from the current snapshot.
#[instrument(skip_all, fields(id = %id))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Response {
    let services = state.repository().services().await;
    let Some(service) = services.into_iter().find(|s| s.id.as_str() == id) else {
        return Redirect::to("/admin/services?error=missing").into_response();
    };

    ServiceFormTemplate {
        user: Some(admin),
        demo: state.is_demo(),
        action: format!("/admin/services/{}", service.id),
        heading: "Edit Service",
        error: None,
        choices: icon_choices(service.icon.as_str()),
        title: service.title,
        description: service.description,
    }
    .into_response()
}

/// Handle a service update.
#[instrument(skip_all, fields(id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<ServiceForm>,
) -> Result<Response> {
    let demo = state.is_demo();
    let action = format!("/admin/services/{id}");
    let draft = form.draft();

    if let Err(error) = draft.validate() {
        let page = form.into_error_form(admin, demo, action, "Edit Service", error.to_string());
        return Ok(page.into_response());
    }

    let item_id = ItemId::from(id);
    match state.repository().update_service(&item_id, draft).await {
        Ok(()) => {
            add_breadcrumb(
                "catalog",
                "Updated service",
                Some(&[("id", item_id.as_str())]),
            );
            Ok(Redirect::to("/admin/services?success=updated").into_response())
        }
        Err(error) if error.is_not_found() => {
            Ok(Redirect::to("/admin/services?error=missing").into_response())
        }
        Err(CatalogError::Validation(error)) => {
            let page = form.into_error_form(admin, demo, action, "Edit Service", error.to_string());
            Ok(page.into_response())
        }
        Err(error) => Err(error.into()),
    }
}

/// Display the delete confirmation page.
#[instrument(skip_all, fields(id = %id))]
pub async fn delete_confirm(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Response {
    let services = state.repository().services().await;
    let Some(service) = services.into_iter().find(|s| s.id.as_str() == id) else {
        return Redirect::to("/admin/services?error=missing").into_response();
    };

    ServiceDeleteTemplate {
        user: Some(admin),
        demo: state.is_demo(),
        service,
    }
    .into_response()
}

/// Handle a confirmed delete.
#[instrument(skip_all, fields(id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response> {
    let item_id = ItemId::from(id);
    match state.repository().delete_service(&item_id).await {
        Ok(()) => {
            add_breadcrumb(
                "catalog",
                "Deleted service",
                Some(&[("id", item_id.as_str())]),
            );
            Ok(Redirect::to("/admin/services?success=deleted").into_response())
        }
        Err(error) if error.is_not_found() => {
            Ok(Redirect::to("/admin/services?error=missing").into_response())
        }
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_choices_are_known_keys() {
        for (key, _label) in ICON_CHOICES {
            assert!(
                IconKey::parse(key).is_some(),
                "icon choice {key} is not a known glyph key"
            );
        }
    }

    #[test]
    fn test_form_draft_falls_back_to_generic_icon() {
        let form = ServiceForm {
            title: "Video Production".to_owned(),
            description: "Full-service shoots".to_owned(),
            icon: "sparkles".to_owned(),
        };
        assert_eq!(form.draft().icon, IconKey::Package);
    }

    #[test]
    fn test_icon_choices_mark_the_current_key() {
        let choices = icon_choices("camera");
        let selected: Vec<_> = choices.iter().filter(|c| c.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.first().map(|c| c.key), Some("camera"));

        // A stored key outside the picker leaves nothing marked.
        assert!(icon_choices("tshirt").iter().all(|c| !c.selected));
    }

    #[test]
    fn test_new_form_default_is_a_picker_option() {
        let default = Collection::Services.default_icon().as_str();
        assert!(ICON_CHOICES.iter().any(|(key, _)| *key == default));
    }
}

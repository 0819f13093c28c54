//! Admin product management: list, create, edit, delete.
//!
//! Product forms are multipart because of the image upload. Create requires
//! an image; edit keeps the stored one unless a new file is chosen. All
//! checks run before the upload is sent to storage, so a rejected form
//! never leaves an orphaned object behind.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::multipart::{Field, Multipart};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use bytes::Bytes;
use tracing::instrument;

use allin_catalog::CatalogError;
use allin_core::{Collection, IconKey, ItemId, Product, ProductDraft, ValidationError};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::state::AppState;

use super::{MessageQuery, mapped};

/// Upload size cap enforced before anything reaches storage.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Product list page.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products.html")]
pub struct ProductListTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    pub products: Vec<Product>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Product form page, shared by create and edit.
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_form.html")]
pub struct ProductFormTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    /// Where the form posts to.
    pub action: String,
    pub heading: &'static str,
    /// `true` on edit: the image field is optional there.
    pub editing: bool,
    pub error: Option<String>,
    pub name: String,
    pub description: String,
    pub price: String,
    /// Icon key carried through a hidden input.
    pub icon: String,
    /// Stored image URL, shown as the current image on edit.
    pub image: Option<String>,
}

/// Delete confirmation page.
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_delete.html")]
pub struct ProductDeleteTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    pub product: Product,
}

/// Display the product list.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    ProductListTemplate {
        demo: state.is_demo(),
        products: state.repository().products().await,
        user: Some(admin),
        error: mapped(query.error),
        success: mapped(query.success),
    }
}

/// Display the empty product form.
#[instrument(skip_all)]
pub async fn new_form(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> impl IntoResponse {
    ProductFormTemplate {
        user: Some(admin),
        demo: state.is_demo(),
        action: "/admin/products".to_owned(),
        heading: "New Product",
        editing: false,
        error: None,
        name: String::new(),
        description: String::new(),
        price: String::new(),
        icon: IconKey::Package.as_str().to_owned(),
        image: None,
    }
}

/// Handle product creation.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Response> {
    let mut form = read_product_form(multipart).await?;
    let demo = state.is_demo();

    let Some(upload) = form.upload.take() else {
        let page = form.into_create_error(admin, demo, &ValidationError::MissingImage);
        return Ok(page.into_response());
    };
    if let Err(error) = check_upload(&upload) {
        return Ok(form.into_create_error(admin, demo, &error).into_response());
    }

    // Text fields are checked before the image is uploaded.
    let mut draft = form.draft();
    if let Err(error) = draft.validate_for_update() {
        return Ok(form.into_create_error(admin, demo, &error).into_response());
    }

    let url = state
        .repository()
        .upload_image(
            Collection::Products,
            &upload.filename,
            &upload.content_type,
            upload.bytes,
        )
        .await?;
    draft.image = Some(url);

    match state.repository().create_product(draft).await {
        Ok(product) => {
            add_breadcrumb(
                "catalog",
                "Created product",
                Some(&[("id", product.id.as_str())]),
            );
            Ok(Redirect::to("/admin/products?success=created").into_response())
        }
        Err(CatalogError::Validation(error)) => {
            Ok(form.into_create_error(admin, demo, &error).into_response())
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
    let products = state.repository().products().await;
    let Some(product) = products.into_iter().find(|p| p.id.as_str() == id) else {
        return Redirect::to("/admin/products?error=missing").into_response();
    };

    ProductFormTemplate {
        user: Some(admin),
        demo: state.is_demo(),
        action: format!("/admin/products/{}", product.id),
        heading: "Edit Product",
        editing: true,
        error: None,
        name: product.name,
        description: product.description,
        price: product.price,
        icon: product.icon.as_str().to_owned(),
        image: product.image,
    }
    .into_response()
}

/// Handle a product update.
///
/// When no new file is chosen the draft omits the image and the store
/// merge keeps the URL the document already has.
#[instrument(skip_all, fields(id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let mut form = read_product_form(multipart).await?;
    let demo = state.is_demo();

    if let Some(upload) = &form.upload {
        if let Err(error) = check_upload(upload) {
            return Ok(form.into_edit_error(admin, demo, &id, &error).into_response());
        }
    }

    let mut draft = form.draft();
    if let Err(error) = draft.validate_for_update() {
        return Ok(form.into_edit_error(admin, demo, &id, &error).into_response());
    }

    if let Some(upload) = form.upload.take() {
        let url = state
            .repository()
            .upload_image(
                Collection::Products,
                &upload.filename,
                &upload.content_type,
                upload.bytes,
            )
            .await?;
        draft.image = Some(url);
    }

    let item_id = ItemId::from(id);
    match state.repository().update_product(&item_id, draft).await {
        Ok(()) => {
            add_breadcrumb(
                "catalog",
                "Updated product",
                Some(&[("id", item_id.as_str())]),
            );
            Ok(Redirect::to("/admin/products?success=updated").into_response())
        }
        Err(error) if error.is_not_found() => {
            Ok(Redirect::to("/admin/products?error=missing").into_response())
        }
        Err(CatalogError::Validation(error)) => {
            let page = form.into_edit_error(admin, demo, item_id.as_str(), &error);
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
    let products = state.repository().products().await;
    let Some(product) = products.into_iter().find(|p| p.id.as_str() == id) else {
        return Redirect::to("/admin/products?error=missing").into_response();
    };

    ProductDeleteTemplate {
        user: Some(admin),
        demo: state.is_demo(),
        product,
    }
    .into_response()
}

/// Handle a confirmed delete.
///
/// The image URL comes from the current snapshot, not from the form, so a
/// tampered request cannot point the cleanup at someone else's object.
#[instrument(skip_all, fields(id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response> {
    let products = state.repository().products().await;
    let Some(product) = products.into_iter().find(|p| p.id.as_str() == id) else {
        return Ok(Redirect::to("/admin/products?error=missing").into_response());
    };

    match state
        .repository()
        .delete_product(&product.id, product.image.as_deref())
        .await
    {
        Ok(()) => {
            add_breadcrumb(
                "catalog",
                "Deleted product",
                Some(&[("id", product.id.as_str())]),
            );
            Ok(Redirect::to("/admin/products?success=deleted").into_response())
        }
        Err(error) if error.is_not_found() => {
            Ok(Redirect::to("/admin/products?error=missing").into_response())
        }
        Err(error) => Err(error.into()),
    }
}

// ============================================================================
// Multipart form plumbing
// ============================================================================

/// An uploaded file taken from the multipart form.
#[derive(Clone)]
struct Upload {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

/// Parsed product form fields.
#[derive(Default)]
struct ProductFormData {
    name: String,
    description: String,
    price: String,
    icon: String,
    upload: Option<Upload>,
}

impl ProductFormData {
    /// The draft these fields describe, without an image URL yet.
    fn draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.clone(),
            icon: IconKey::parse_or_default(&self.icon),
            image: None,
        }
    }

    /// Re-render the create form with an error, keeping what was typed.
    fn into_create_error(
        self,
        admin: CurrentUser,
        demo: bool,
        error: &ValidationError,
    ) -> ProductFormTemplate {
        self.into_error_form(
            admin,
            demo,
            "/admin/products".to_owned(),
            "New Product",
            false,
            error,
        )
    }

    /// Re-render the edit form with an error, keeping what was typed.
    fn into_edit_error(
        self,
        admin: CurrentUser,
        demo: bool,
        id: &str,
        error: &ValidationError,
    ) -> ProductFormTemplate {
        self.into_error_form(
            admin,
            demo,
            format!("/admin/products/{id}"),
            "Edit Product",
            true,
            error,
        )
    }

    fn into_error_form(
        self,
        admin: CurrentUser,
        demo: bool,
        action: String,
        heading: &'static str,
        editing: bool,
        error: &ValidationError,
    ) -> ProductFormTemplate {
        ProductFormTemplate {
            user: Some(admin),
            demo,
            action,
            heading,
            editing,
            error: Some(error.to_string()),
            name: self.name,
            description: self.description,
            price: self.price,
            icon: self.icon,
            image: None,
        }
    }
}

/// Read the multipart product form.
///
/// A file input with no file chosen arrives as an empty part and counts as
/// no upload. Unknown fields are skipped.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductFormData> {
    let mut form = ProductFormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed form: {e}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        match name.as_str() {
            "name" => form.name = text_field(field).await?,
            "description" => form.description = text_field(field).await?,
            "price" => form.price = text_field(field).await?,
            "icon" => form.icon = text_field(field).await?,
            "image" => {
                let filename = field.file_name().unwrap_or("upload").to_owned();
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("malformed form: {e}")))?;
                if !bytes.is_empty() {
                    form.upload = Some(Upload {
                        filename,
                        content_type,
                        bytes,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn text_field(field: Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed form: {e}")))
}

/// Check the upload's declared type and size against the form contract.
fn check_upload(upload: &Upload) -> std::result::Result<(), ValidationError> {
    if !upload.content_type.starts_with("image/") {
        return Err(ValidationError::NotAnImage);
    }
    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge {
            max_bytes: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, len: usize) -> Upload {
        Upload {
            filename: "photo.png".to_owned(),
            content_type: content_type.to_owned(),
            bytes: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn test_check_upload_accepts_images() {
        assert!(check_upload(&upload("image/png", 1024)).is_ok());
        assert!(check_upload(&upload("image/jpeg", MAX_IMAGE_BYTES)).is_ok());
    }

    #[test]
    fn test_check_upload_rejects_non_images() {
        assert!(matches!(
            check_upload(&upload("application/pdf", 1024)),
            Err(ValidationError::NotAnImage)
        ));
        assert!(matches!(
            check_upload(&upload("", 1024)),
            Err(ValidationError::NotAnImage)
        ));
    }

    #[test]
    fn test_check_upload_rejects_oversized_images() {
        assert!(matches!(
            check_upload(&upload("image/png", MAX_IMAGE_BYTES + 1)),
            Err(ValidationError::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn test_form_draft_falls_back_to_generic_icon() {
        let form = ProductFormData {
            name: "Mug".to_owned(),
            description: "Branded mug".to_owned(),
            price: "RWF 8,000".to_owned(),
            icon: "not-a-glyph".to_owned(),
            upload: None,
        };
        assert_eq!(form.draft().icon, IconKey::Package);
    }
}

//! Product listing, creation and media upload.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use shopfront_core::{NewProduct, Product};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::normalize::{normalize_collection, normalize_product, single_record, uploaded_file_url};
use crate::retry::{is_retriable, retry_with_backoff};
use crate::types::DataEnvelope;

/// Content type the created record is attached to during upload.
const PRODUCT_REF: &str = "api::product.product";
/// Media field of the product content type.
const IMAGE_FIELD: &str = "image";

/// An image read from disk, ready to be attached to a product.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

impl ImageUpload {
    /// Reads an image file and guesses its MIME type from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Media`] if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = std::fs::read(path).map_err(|source| ApiError::Media {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self {
            mime: guess_image_mime(&file_name),
            file_name,
            bytes,
        })
    }
}

impl ApiClient {
    /// Lists all products with their media populated, normalized.
    /// Retried on transient errors.
    ///
    /// # Errors
    ///
    /// - [`ApiError::FetchFailed`] on any non-2xx status or transport failure.
    /// - [`ApiError::InvalidResponseFormat`] if the body has no `data` array.
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint("api/products");
        let body = retry_with_backoff(self.retry, is_retriable, || {
            let url = url.clone();
            async move {
                self.send_json(self.client.get(url).query(&[("populate", "*")]))
                    .await
            }
        })
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "product list fetch failed");
            ApiError::FetchFailed {
                resource: "products",
                status: e.status(),
            }
        })?;

        let products = normalize_collection(&body, &self.base_url)?;
        tracing::debug!(count = products.len(), "fetched products");
        Ok(products)
    }

    /// Creates a product entry and returns it normalized. The new record has
    /// the placeholder image until media is attached.
    ///
    /// # Errors
    ///
    /// - [`ApiError::ProductCreationFailed`] on any non-2xx status or transport failure.
    /// - [`ApiError::InvalidResponseFormat`] if the created record has no id.
    pub async fn create_product(
        &self,
        token: &str,
        product: &NewProduct,
    ) -> Result<Product, ApiError> {
        let request = self
            .client
            .post(self.endpoint("api/products"))
            .bearer_auth(token)
            .json(&DataEnvelope { data: product });

        let body = self.send_json(request).await.map_err(|e| {
            tracing::warn!(error = %e, "create product failed");
            ApiError::ProductCreationFailed { status: e.status() }
        })?;

        let created = normalize_product(single_record(&body), &self.base_url).ok_or_else(|| {
            ApiError::InvalidResponseFormat {
                context: "created product has no id".to_string(),
            }
        })?;
        tracing::info!(product_id = created.id, name = %created.name, "product created");
        Ok(created)
    }

    /// Attaches an image to an existing product's media field and returns the
    /// resolved image URL, if the upload response carried one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PartialUploadFailure`] on any non-2xx status or
    /// transport failure; the product record itself is left in place.
    pub async fn upload_product_image(
        &self,
        token: &str,
        product_id: i64,
        image: ImageUpload,
    ) -> Result<Option<String>, ApiError> {
        let upload_failed = |status| ApiError::PartialUploadFailure { product_id, status };

        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.mime)
            .map_err(|e| {
                tracing::warn!(error = %e, "invalid image MIME type");
                upload_failed(None)
            })?;
        let form = Form::new()
            .part("files", part)
            .text("ref", PRODUCT_REF)
            .text("refId", product_id.to_string())
            .text("field", IMAGE_FIELD);

        let request = self
            .client
            .post(self.endpoint("api/upload"))
            .bearer_auth(token)
            .multipart(form);

        let body = self.send_json(request).await.map_err(|e| {
            tracing::warn!(product_id, error = %e, "image upload failed after product creation");
            upload_failed(e.status())
        })?;
        Ok(uploaded_file_url(&body, &self.base_url))
    }

    /// Creates a product and, when `image` is given, attaches it.
    ///
    /// The image is read before anything is sent so a bad path never leaves
    /// an orphan record. If creation succeeds but the upload fails, the record
    /// stays and [`ApiError::PartialUploadFailure`] is returned.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Media`] if the image file cannot be read.
    /// - [`ApiError::ProductCreationFailed`] / [`ApiError::InvalidResponseFormat`]
    ///   from [`ApiClient::create_product`].
    /// - [`ApiError::PartialUploadFailure`] from [`ApiClient::upload_product_image`].
    pub async fn upload_product(
        &self,
        token: &str,
        product: &NewProduct,
        image: Option<&Path>,
    ) -> Result<Product, ApiError> {
        let image = image.map(ImageUpload::from_path).transpose()?;

        let mut created = self.create_product(token, product).await?;
        let Some(image) = image else {
            return Ok(created);
        };

        if let Some(url) = self.upload_product_image(token, created.id, image).await? {
            created.image = url;
        }
        Ok(created)
    }
}

fn guess_image_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

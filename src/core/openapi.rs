use utoipa::{Modify, OpenApi};

use crate::features::documents::{
    dtos as documents_dtos, handlers as documents_handlers, models as documents_models,
};
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Documents
        documents_handlers::upload_document,
        documents_handlers::get_document_status,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            // Documents
            documents_models::DocumentStatus,
            documents_dtos::UploadDocumentDto,
            documents_dtos::UploadDocumentResponseDto,
            documents_dtos::DocumentStatusResponseDto,
        )
    ),
    tags(
        (name = "documents", description = "KYC document upload and verification status"),
    ),
    info(
        title = "KYC Documents API",
        version = "0.1.0",
        description = "Upload identity documents and follow their verification",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

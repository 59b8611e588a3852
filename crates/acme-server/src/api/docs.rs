//! OpenAPI document served at `/docs/v1/swagger.json`

use axum::Json;
use utoipa::{
    openapi::{
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
        OpenApi as OpenApiDocument,
    },
    Modify, OpenApi,
};

use crate::api::health::{HealthEntry, HealthReport, HealthStatus};
use crate::error::ErrorResponse;
use crate::features::authentication::{self, AuthenticationResponseDto, LoginRequestDto, TokenDto};
use crate::features::books::{self, BookDto, CreateBookCommand, UpdateBookCommand};
use crate::features::management;
use crate::features::shared::{PagedRequestDto, PagingDataDto, SortDirection};

/// Name of the bearer security scheme referenced by protected paths
pub const BEARER_SCHEME: &str = "bearer";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ACME Web API",
        version = "v1",
        description = "Book catalogue with JWT authentication and schema management"
    ),
    paths(
        authentication::routes::authenticate,
        books::routes::search_books,
        books::routes::get_book,
        books::routes::create_book,
        books::routes::update_book,
        books::routes::delete_book,
        management::routes::assert_migrations,
        management::routes::migrate,
        crate::api::health::healthz,
    ),
    components(schemas(
        BookDto,
        CreateBookCommand,
        UpdateBookCommand,
        PagedRequestDto,
        PagingDataDto,
        SortDirection,
        LoginRequestDto,
        AuthenticationResponseDto,
        TokenDto,
        ErrorResponse,
        HealthReport,
        HealthEntry,
        HealthStatus,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Bearer token issuance"),
        (name = "books", description = "Book catalogue"),
        (name = "application-management", description = "Migrations and seeding"),
        (name = "health", description = "Liveness and readiness")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut OpenApiDocument) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Paste the accessToken returned by /api/v1/authentication"))
                    .build(),
            ),
        );
    }
}

pub async fn openapi_document() -> Json<OpenApiDocument> {
    Json(ApiDoc::openapi())
}

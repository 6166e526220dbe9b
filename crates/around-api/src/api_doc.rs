use crate::error::ErrorResponse;
use crate::handlers;
use around_core::models::{CreatedPost, Location, PostResponse};
use around_core::MediaKind;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Around API",
        description = "Location-tagged media posts with geo search and face clustering"
    ),
    paths(
        handlers::post_create::create_post,
        handlers::search::search_posts,
        handlers::cluster::cluster_posts,
        handlers::health::health_check,
    ),
    components(schemas(
        PostResponse,
        Location,
        MediaKind,
        CreatedPost,
        ErrorResponse,
        handlers::post_create::CreatePostForm,
        handlers::health::HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "posts", description = "Create and query posts"),
        (name = "health", description = "Liveness and index connectivity")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

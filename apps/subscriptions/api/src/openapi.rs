use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Subscriptions API",
        version = "0.1.0",
        description = "Manage user subscriptions to online services and report their cost over a period"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/v1/subscriptions", api = domain_subscriptions::ApiDoc)
    )
)]
pub struct ApiDoc;

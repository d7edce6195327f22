use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::dto::{
    CreateSubscriptionRequest, ListSubscriptionsQuery, PaginatedResponse, SubscriptionResponse,
    TotalCostQuery, TotalCostResponse, UpdateSubscriptionRequest,
};
use crate::error::SubscriptionResult;
use crate::repository::SubscriptionRepository;
use crate::service::SubscriptionService;

pub const TAG: &str = "subscriptions";

/// OpenAPI documentation for Subscriptions API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_subscriptions,
        create_subscription,
        get_subscription,
        update_subscription,
        delete_subscription,
        total_cost,
    ),
    components(
        schemas(
            SubscriptionResponse,
            CreateSubscriptionRequest,
            UpdateSubscriptionRequest,
            PaginatedResponse<SubscriptionResponse>,
            TotalCostResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Subscription management and cost reporting")
    )
)]
pub struct ApiDoc;

/// Create the subscription router with all HTTP endpoints
pub fn router<R: SubscriptionRepository + 'static>(service: SubscriptionService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_subscriptions).post(create_subscription))
        .route("/total-cost", get(total_cost))
        .route(
            "/{id}",
            get(get_subscription)
                .put(update_subscription)
                .delete(delete_subscription),
        )
        .with_state(shared_service)
}

/// List subscriptions with optional filters, sorting and pagination
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ListSubscriptionsQuery),
    responses(
        (status = 200, description = "Page of subscriptions", body = PaginatedResponse<SubscriptionResponse>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_subscriptions<R: SubscriptionRepository>(
    State(service): State<Arc<SubscriptionService<R>>>,
    Query(query): Query<ListSubscriptionsQuery>,
) -> SubscriptionResult<Json<PaginatedResponse<SubscriptionResponse>>> {
    let (filter, pagination) = query.into_parts()?;
    let page = service.list_subscriptions(filter, pagination).await?;
    Ok(Json(page.map(SubscriptionResponse::from).into()))
}

/// Create a new subscription
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_subscription<R: SubscriptionRepository>(
    State(service): State<Arc<SubscriptionService<R>>>,
    ValidatedJson(request): ValidatedJson<CreateSubscriptionRequest>,
) -> SubscriptionResult<impl IntoResponse> {
    let subscription = service.create_subscription(request.into_domain()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::from(subscription)),
    ))
}

/// Get a subscription by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Subscription ID")
    ),
    responses(
        (status = 200, description = "Subscription found", body = SubscriptionResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_subscription<R: SubscriptionRepository>(
    State(service): State<Arc<SubscriptionService<R>>>,
    UuidPath(id): UuidPath,
) -> SubscriptionResult<Json<SubscriptionResponse>> {
    let subscription = service.get_subscription(id).await?;
    Ok(Json(subscription.into()))
}

/// Replace a subscription
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Subscription ID")
    ),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = SubscriptionResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_subscription<R: SubscriptionRepository>(
    State(service): State<Arc<SubscriptionService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(request): ValidatedJson<UpdateSubscriptionRequest>,
) -> SubscriptionResult<Json<SubscriptionResponse>> {
    let subscription = service
        .update_subscription(id, request.into_domain()?)
        .await?;
    Ok(Json(subscription.into()))
}

/// Delete a subscription. Unknown IDs also return 204.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Subscription ID")
    ),
    responses(
        (status = 204, description = "Subscription deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_subscription<R: SubscriptionRepository>(
    State(service): State<Arc<SubscriptionService<R>>>,
    UuidPath(id): UuidPath,
) -> SubscriptionResult<StatusCode> {
    service.delete_subscription(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Total cost of matching subscriptions over a period
#[utoipa::path(
    get,
    path = "/total-cost",
    tag = TAG,
    params(TotalCostQuery),
    responses(
        (status = 200, description = "Prorated total over the period", body = TotalCostResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn total_cost<R: SubscriptionRepository>(
    State(service): State<Arc<SubscriptionService<R>>>,
    Query(query): Query<TotalCostQuery>,
) -> SubscriptionResult<Json<TotalCostResponse>> {
    let total = service.total_cost(query.into_filter()?).await?;
    Ok(Json(TotalCostResponse { total }))
}

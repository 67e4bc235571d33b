use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::auth::{authorize, Principal};

use super::domain::{JobId, Role, UserId};
use super::engine::MatchError;
use super::service::{MatchingService, MatchingServiceError};
use super::stores::{ApplicationStore, JobCatalog, ShortlistStore, UserDirectory, WriteOutcome};

/// Uniform response envelope used by every route, including the matcher
/// route. Failures carry `success: false` and omit `data`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub(crate) fn envelope_ok<T: Serialize>(message: &str, data: T) -> Response {
    (
        StatusCode::OK,
        Json(ApiEnvelope {
            success: true,
            message: message.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

pub(crate) fn envelope_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiEnvelope::<()> {
            success: false,
            message: message.into(),
            data: None,
        }),
    )
        .into_response()
}

/// Router builder exposing the matcher, swipe session, shortlist, and
/// application endpoints. Authentication middleware is layered on by the
/// binary (see the api service), which inserts the [`Principal`] extension.
pub fn matching_router<C, U, S, A>(service: Arc<MatchingService<C, U, S, A>>) -> Router
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/matcher/recommend-jobs",
            get(recommend_handler::<C, U, S, A>),
        )
        .route(
            "/api/v1/swipe/session",
            post(start_session_handler::<C, U, S, A>).get(session_view_handler::<C, U, S, A>),
        )
        .route("/api/v1/swipe/skip", post(skip_handler::<C, U, S, A>))
        .route(
            "/api/v1/swipe/shortlist",
            post(shortlist_swipe_handler::<C, U, S, A>),
        )
        .route(
            "/api/v1/shortlist/jobs",
            get(shortlist_jobs_handler::<C, U, S, A>),
        )
        .route(
            "/api/v1/shortlist/:job_id",
            post(shortlist_add_handler::<C, U, S, A>)
                .delete(shortlist_remove_handler::<C, U, S, A>),
        )
        .route(
            "/api/v1/applications",
            get(applications_handler::<C, U, S, A>),
        )
        .route(
            "/api/v1/applications/:job_id",
            post(application_submit_handler::<C, U, S, A>)
                .delete(application_withdraw_handler::<C, U, S, A>),
        )
        .with_state(service)
}

fn service_error_response(err: MatchingServiceError) -> Response {
    match err {
        MatchingServiceError::Match(MatchError::UnknownUser(user)) => envelope_error(
            StatusCode::NOT_FOUND,
            format!("user {user} does not exist"),
        ),
        MatchingServiceError::Match(err @ MatchError::NotJobSeeker { .. }) => {
            envelope_error(StatusCode::BAD_REQUEST, err.to_string())
        }
        MatchingServiceError::Match(MatchError::Upstream(inner))
        | MatchingServiceError::Store(inner) => {
            error!(error = %inner, "collaborator store failure");
            envelope_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream service unavailable, please retry",
            )
        }
        MatchingServiceError::NoSession(user) => envelope_error(
            StatusCode::NOT_FOUND,
            format!("no swipe session exists for user {user}"),
        ),
        err @ MatchingServiceError::SessionNotReady { .. } => {
            envelope_error(StatusCode::CONFLICT, err.to_string())
        }
        MatchingServiceError::UnknownJob(job) => envelope_error(
            StatusCode::NOT_FOUND,
            format!("job {job} does not exist"),
        ),
        err @ MatchingServiceError::ApplicationsClosed { .. } => {
            envelope_error(StatusCode::BAD_REQUEST, err.to_string())
        }
    }
}

fn write_outcome_payload(job: &JobId, outcome: WriteOutcome) -> serde_json::Value {
    json!({ "job_id": job, "outcome": outcome })
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendQuery {
    pub(crate) uid: Option<String>,
}

pub(crate) async fn recommend_handler<C, U, S, A>(
    State(service): State<Arc<MatchingService<C, U, S, A>>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<RecommendQuery>,
) -> Response
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    if let Err(err) = authorize(&[Role::JobSeeker, Role::Admin], &principal) {
        return err.into_response();
    }

    let target = match query.uid {
        Some(uid) if uid != principal.user_id.0 => {
            // Reading someone else's recommendations is an admin capability.
            if let Err(err) = authorize(&[Role::Admin], &principal) {
                return err.into_response();
            }
            UserId(uid)
        }
        _ => principal.user_id.clone(),
    };

    let today = Local::now().date_naive();
    match service.recommend(&target, today) {
        Ok(batch) => envelope_ok(
            "recommendations generated",
            json!({ "recommended_jobs": batch.jobs }),
        ),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn start_session_handler<C, U, S, A>(
    State(service): State<Arc<MatchingService<C, U, S, A>>>,
    Extension(principal): Extension<Principal>,
) -> Response
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    if let Err(err) = authorize(&[Role::JobSeeker], &principal) {
        return err.into_response();
    }

    let today = Local::now().date_naive();
    match service.start_session(&principal.user_id, today) {
        Ok(view) => envelope_ok("swipe session started", view),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn session_view_handler<C, U, S, A>(
    State(service): State<Arc<MatchingService<C, U, S, A>>>,
    Extension(principal): Extension<Principal>,
) -> Response
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    if let Err(err) = authorize(&[Role::JobSeeker], &principal) {
        return err.into_response();
    }

    match service.session_view(&principal.user_id) {
        Ok(view) => envelope_ok("swipe session state", view),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn skip_handler<C, U, S, A>(
    State(service): State<Arc<MatchingService<C, U, S, A>>>,
    Extension(principal): Extension<Principal>,
) -> Response
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    if let Err(err) = authorize(&[Role::JobSeeker], &principal) {
        return err.into_response();
    }

    match service.skip(&principal.user_id) {
        Ok(view) => envelope_ok("job skipped", view),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn shortlist_swipe_handler<C, U, S, A>(
    State(service): State<Arc<MatchingService<C, U, S, A>>>,
    Extension(principal): Extension<Principal>,
) -> Response
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    if let Err(err) = authorize(&[Role::JobSeeker], &principal) {
        return err.into_response();
    }

    match service.shortlist_presented(&principal.user_id) {
        Ok(view) => envelope_ok("job shortlisted", view),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn shortlist_jobs_handler<C, U, S, A>(
    State(service): State<Arc<MatchingService<C, U, S, A>>>,
    Extension(principal): Extension<Principal>,
) -> Response
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    if let Err(err) = authorize(&[Role::JobSeeker], &principal) {
        return err.into_response();
    }

    match service.shortlisted_jobs(&principal.user_id) {
        Ok(jobs) => envelope_ok("shortlisted jobs", json!({ "jobs": jobs })),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn shortlist_add_handler<C, U, S, A>(
    State(service): State<Arc<MatchingService<C, U, S, A>>>,
    Extension(principal): Extension<Principal>,
    Path(job_id): Path<String>,
) -> Response
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    if let Err(err) = authorize(&[Role::JobSeeker], &principal) {
        return err.into_response();
    }

    let job = JobId(job_id);
    match service.add_to_shortlist(&principal.user_id, &job) {
        Ok(outcome) => {
            let message = match outcome {
                WriteOutcome::Applied => "job added to shortlist",
                WriteOutcome::NoOp => "job already shortlisted",
            };
            envelope_ok(message, write_outcome_payload(&job, outcome))
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn shortlist_remove_handler<C, U, S, A>(
    State(service): State<Arc<MatchingService<C, U, S, A>>>,
    Extension(principal): Extension<Principal>,
    Path(job_id): Path<String>,
) -> Response
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    if let Err(err) = authorize(&[Role::JobSeeker], &principal) {
        return err.into_response();
    }

    let job = JobId(job_id);
    match service.remove_from_shortlist(&principal.user_id, &job) {
        Ok(outcome) => {
            let message = match outcome {
                WriteOutcome::Applied => "job removed from shortlist",
                WriteOutcome::NoOp => "job was not shortlisted",
            };
            envelope_ok(message, write_outcome_payload(&job, outcome))
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn applications_handler<C, U, S, A>(
    State(service): State<Arc<MatchingService<C, U, S, A>>>,
    Extension(principal): Extension<Principal>,
) -> Response
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    if let Err(err) = authorize(&[Role::JobSeeker], &principal) {
        return err.into_response();
    }

    match service.applications_for(&principal.user_id) {
        Ok(applications) => envelope_ok(
            "applications for user",
            json!({ "applications": applications }),
        ),
        Err(err) => service_error_response(err),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplicationRequest {
    #[serde(default)]
    pub(crate) cover_letter: Option<String>,
    #[serde(default)]
    pub(crate) answers: Vec<String>,
}

pub(crate) async fn application_submit_handler<C, U, S, A>(
    State(service): State<Arc<MatchingService<C, U, S, A>>>,
    Extension(principal): Extension<Principal>,
    Path(job_id): Path<String>,
    Json(request): Json<ApplicationRequest>,
) -> Response
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    if let Err(err) = authorize(&[Role::JobSeeker], &principal) {
        return err.into_response();
    }

    let job = JobId(job_id);
    let today = Local::now().date_naive();
    match service.submit_application(
        &principal.user_id,
        &job,
        today,
        request.cover_letter,
        request.answers,
    ) {
        Ok(outcome) => {
            let message = match outcome {
                WriteOutcome::Applied => "application submitted",
                WriteOutcome::NoOp => "application already on file",
            };
            envelope_ok(message, write_outcome_payload(&job, outcome))
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn application_withdraw_handler<C, U, S, A>(
    State(service): State<Arc<MatchingService<C, U, S, A>>>,
    Extension(principal): Extension<Principal>,
    Path(job_id): Path<String>,
) -> Response
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    if let Err(err) = authorize(&[Role::JobSeeker], &principal) {
        return err.into_response();
    }

    let job = JobId(job_id);
    match service.withdraw_application(&principal.user_id, &job) {
        Ok(outcome) => {
            let message = match outcome {
                WriteOutcome::Applied => "application withdrawn",
                WriteOutcome::NoOp => "no active application to withdraw",
            };
            envelope_ok(message, write_outcome_payload(&job, outcome))
        }
        Err(err) => service_error_response(err),
    }
}

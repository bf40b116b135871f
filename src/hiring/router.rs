//! HTTP surface for the hiring workflow.
//!
//! Public routes cover the job board and the multipart apply endpoint; every
//! other route resolves a bearer token before touching the service layer.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::intake::scanner::VirusScanner;
use crate::intake::spam::resolve_client_ip;
use crate::intake::upload::{UploadField, ATTACHMENT_MAX_BYTES};

use super::domain::{
    ApplicantId, EventId, InterviewId, JobId, JobStatus, NotificationId, OfferId, OfferStatus,
    Stage, UserId,
};
use super::repository::{
    ApplicantFilter, HiringRepository, InterviewFilter, JobFilter, OfferFilter, Page,
};
use super::service::{
    ApplicationForm, ApplicantPatch, EventPatch, HiringService, IncomingFile, InterviewPatch,
    JobPatch, NewEvent, NewInterview, NewJob, NewOffer, NewUser, OfferPatch, UserPatch,
};

/// Room for the largest attachment plus multipart framing.
const BODY_LIMIT: usize = ATTACHMENT_MAX_BYTES + 1024 * 1024;

type Ctx<R, S> = State<Arc<HiringService<R, S>>>;

/// Router builder for the full API surface.
pub fn hiring_router<R, S>(service: Arc<HiringService<R, S>>) -> Router
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(list_jobs::<R, S>).post(create_job::<R, S>),
        )
        .route(
            "/api/v1/jobs/:id",
            get(get_job::<R, S>)
                .patch(update_job::<R, S>)
                .delete(delete_job::<R, S>),
        )
        .route("/api/v1/jobs/:id/apply", post(apply::<R, S>))
        .route("/api/v1/applicants", get(list_applicants::<R, S>))
        .route(
            "/api/v1/applicants/:id",
            get(get_applicant::<R, S>)
                .patch(update_applicant::<R, S>)
                .delete(delete_applicant::<R, S>),
        )
        .route("/api/v1/applicants/:id/stage", patch(advance_stage::<R, S>))
        .route(
            "/api/v1/applicants/:id/notes",
            get(list_notes::<R, S>).post(add_note::<R, S>),
        )
        .route(
            "/api/v1/offers",
            get(list_offers::<R, S>).post(create_offer::<R, S>),
        )
        .route(
            "/api/v1/offers/:id",
            get(get_offer::<R, S>)
                .patch(update_offer::<R, S>)
                .delete(delete_offer::<R, S>),
        )
        .route("/api/v1/offers/:id/status", patch(update_offer_status::<R, S>))
        .route("/api/v1/offers/:id/letter", post(attach_offer_letter::<R, S>))
        .route(
            "/api/v1/interviews",
            get(list_interviews::<R, S>).post(create_interview::<R, S>),
        )
        .route(
            "/api/v1/interviews/:id",
            get(get_interview::<R, S>)
                .patch(update_interview::<R, S>)
                .delete(delete_interview::<R, S>),
        )
        .route(
            "/api/v1/events",
            get(list_events::<R, S>).post(create_event::<R, S>),
        )
        .route(
            "/api/v1/events/:id",
            get(get_event::<R, S>)
                .patch(update_event::<R, S>)
                .delete(delete_event::<R, S>),
        )
        .route(
            "/api/v1/users",
            get(list_users::<R, S>).post(create_user::<R, S>),
        )
        .route(
            "/api/v1/users/:id",
            patch(update_user::<R, S>).delete(delete_user::<R, S>),
        )
        .route("/api/v1/settings", get(list_settings::<R, S>))
        .route(
            "/api/v1/settings/:key",
            get(get_setting::<R, S>).put(put_setting::<R, S>),
        )
        .route("/api/v1/activity", get(list_activity::<R, S>))
        .route("/api/v1/notifications", get(list_notifications::<R, S>))
        .route(
            "/api/v1/notifications/read-all",
            post(mark_all_notifications_read::<R, S>),
        )
        .route(
            "/api/v1/notifications/:id/read",
            post(mark_notification_read::<R, S>),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(service)
}

// ---- jobs ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
    status: Option<JobStatus>,
    search: Option<String>,
}

async fn list_jobs<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let staff = service.authenticate(&headers).is_ok();
    let mut filter = JobFilter {
        status: query.status,
        search: query.search,
    };
    // Anonymous visitors only ever see the public board.
    if !staff {
        filter.status = Some(JobStatus::Open);
    }
    let page = Page::new(query.page, query.per_page);
    Ok(Json(service.list_jobs(&filter, page)?))
}

async fn get_job<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let job = service.get_job(JobId(id))?;
    if job.status == JobStatus::Closed && service.authenticate(&headers).is_err() {
        return Err(ApiError::NotFound("job"));
    }
    Ok(Json(job))
}

async fn create_job<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Json(body): Json<NewJob>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    let job = service.create_job(&actor, body)?;
    Ok((StatusCode::CREATED, Json(job)))
}

async fn update_job<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<JobPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.update_job(&actor, JobId(id), body)?))
}

async fn delete_job<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    service.delete_job(&actor, JobId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- public intake ----

async fn apply<R, S>(
    State(service): Ctx<R, S>,
    connect: Option<ConnectInfo<SocketAddr>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let mut form = ApplicationForm::default();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::field("body", err.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(upload_field) = UploadField::from_name(&name) {
            if upload_field == UploadField::OfferLetter {
                return Err(ApiError::field(name, "Unexpected file field"));
            }
            let original_name = field.file_name().unwrap_or("upload").to_string();
            let declared_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ApiError::field(name.clone(), err.to_string()))?;
            files.push(IncomingFile {
                field: upload_field,
                original_name,
                declared_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        if field.file_name().is_some() {
            return Err(ApiError::field(name, "Unexpected file field"));
        }

        let value = field
            .text()
            .await
            .map_err(|err| ApiError::field(name.clone(), err.to_string()))?;
        match name.as_str() {
            "firstName" => form.first_name = value,
            "lastName" => form.last_name = value,
            "email" => form.email = value,
            "phone" => form.phone = Some(value),
            "coverLetter" => form.cover_letter = Some(value),
            "website" => form.website = Some(value),
            "eventId" => form.event_id = value.parse::<Uuid>().ok().map(EventId),
            _ => {}
        }
    }

    let client_ip = resolve_client_ip(&headers, connect.map(|ConnectInfo(addr)| addr));
    let applicant = service
        .submit_application(JobId(id), form, files, client_ip)
        .await?;

    // The public response stays deliberately terse; the spam verdict and
    // pipeline details are internal.
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": applicant.id, "status": "received" })),
    ))
}

// ---- applicants ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicantListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
    job_id: Option<Uuid>,
    stage: Option<Stage>,
    spam: Option<bool>,
}

async fn list_applicants<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Query(query): Query<ApplicantListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    let filter = ApplicantFilter {
        job_id: query.job_id.map(JobId),
        stage: query.stage,
        spam: query.spam,
    };
    let page = Page::new(query.page, query.per_page);
    Ok(Json(service.list_applicants(&actor, &filter, page)?))
}

async fn get_applicant<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.get_applicant(&actor, ApplicantId(id))?))
}

async fn update_applicant<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<ApplicantPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.update_applicant(&actor, ApplicantId(id), body)?))
}

async fn delete_applicant<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    service.delete_applicant(&actor, ApplicantId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct StagePatch {
    stage: Stage,
}

async fn advance_stage<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<StagePatch>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.advance_stage(&actor, ApplicantId(id), body.stage)?))
}

#[derive(Debug, Deserialize)]
struct NewNote {
    body: String,
}

async fn add_note<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<NewNote>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    let note = service.add_note(&actor, ApplicantId(id), &body.body)?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn list_notes<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.list_notes(&actor, ApplicantId(id))?))
}

// ---- offers ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfferListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
    applicant_id: Option<Uuid>,
    status: Option<OfferStatus>,
}

async fn list_offers<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Query(query): Query<OfferListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    let filter = OfferFilter {
        applicant_id: query.applicant_id.map(ApplicantId),
        status: query.status,
    };
    let page = Page::new(query.page, query.per_page);
    Ok(Json(service.list_offers(&actor, &filter, page)?))
}

async fn create_offer<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Json(body): Json<NewOffer>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    let offer = service.create_offer(&actor, body)?;
    Ok((StatusCode::CREATED, Json(offer)))
}

async fn get_offer<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.get_offer(&actor, OfferId(id))?))
}

async fn update_offer<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<OfferPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.update_offer(&actor, OfferId(id), body)?))
}

async fn delete_offer<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    service.delete_offer(&actor, OfferId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct OfferStatusPatch {
    status: OfferStatus,
}

async fn update_offer_status<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<OfferStatusPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.update_offer_status(&actor, OfferId(id), body.status)?))
}

async fn attach_offer_letter<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::field("body", err.to_string()))?
    {
        if field.name() != Some(UploadField::OfferLetter.wire_name()) {
            continue;
        }
        let original_name = field.file_name().unwrap_or("letter").to_string();
        let declared_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::field("offerLetter", err.to_string()))?;
        let file = IncomingFile {
            field: UploadField::OfferLetter,
            original_name,
            declared_type,
            bytes: bytes.to_vec(),
        };
        let offer = service.attach_offer_letter(&actor, OfferId(id), file).await?;
        return Ok(Json(offer));
    }

    Err(ApiError::field("offerLetter", "A letter file is required"))
}

// ---- interviews ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InterviewListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
    applicant_id: Option<Uuid>,
}

async fn list_interviews<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Query(query): Query<InterviewListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    let filter = InterviewFilter {
        applicant_id: query.applicant_id.map(ApplicantId),
    };
    let page = Page::new(query.page, query.per_page);
    Ok(Json(service.list_interviews(&actor, &filter, page)?))
}

async fn create_interview<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Json(body): Json<NewInterview>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    let interview = service.create_interview(&actor, body)?;
    Ok((StatusCode::CREATED, Json(interview)))
}

async fn get_interview<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.get_interview(&actor, InterviewId(id))?))
}

async fn update_interview<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<InterviewPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.update_interview(&actor, InterviewId(id), body)?))
}

async fn delete_interview<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    service.delete_interview(&actor, InterviewId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- events ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
}

async fn list_events<R, S>(
    State(service): Ctx<R, S>,
    Query(query): Query<EventListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let page = Page::new(query.page, query.per_page);
    Ok(Json(service.list_events(page)?))
}

async fn create_event<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Json(body): Json<NewEvent>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    let event = service.create_event(&actor, body)?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_event<R, S>(
    State(service): Ctx<R, S>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    Ok(Json(service.get_event(EventId(id))?))
}

async fn update_event<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<EventPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.update_event(&actor, EventId(id), body)?))
}

async fn delete_event<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    service.delete_event(&actor, EventId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- users ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
}

async fn list_users<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    let page = Page::new(query.page, query.per_page);
    Ok(Json(service.list_users(&actor, page)?))
}

async fn create_user<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    let user = service.create_user(&actor, body)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<UserPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.update_user(&actor, UserId(id), body)?))
}

async fn delete_user<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    service.delete_user(&actor, UserId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- settings ----

#[derive(Debug, Deserialize)]
struct SettingBody {
    value: String,
}

async fn list_settings<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.list_settings(&actor)?))
}

async fn get_setting<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.get_setting(&actor, &key)?))
}

async fn put_setting<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Json(body): Json<SettingBody>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.put_setting(&actor, key, body.value)?))
}

// ---- activity & notifications ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
}

async fn list_activity<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Query(query): Query<ActivityListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    let page = Page::new(query.page, query.per_page);
    Ok(Json(service.list_activity(&actor, page)?))
}

async fn list_notifications<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    Ok(Json(service.my_notifications(&actor)?))
}

async fn mark_notification_read<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    service.mark_notification_read(&actor, NotificationId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_all_notifications_read<R, S>(
    State(service): Ctx<R, S>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    let actor = service.authenticate(&headers)?;
    service.mark_all_notifications_read(&actor)?;
    Ok(StatusCode::NO_CONTENT)
}

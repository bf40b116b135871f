//! Service composing the repository, spam heuristic, sanitizer, and upload
//! pipeline behind the HTTP surface.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::intake::sanitizer::{sanitize_rich_text, strip_html};
use crate::intake::scanner::VirusScanner;
use crate::intake::spam::{SpamCheckInput, SpamFilter, SpamVerdict};
use crate::intake::upload::{StoredUpload, UploadError, UploadField, UploadValidator};

use super::auth;
use super::domain::{
    ActivityEntry, Applicant, ApplicantId, Event, EventId, Interview, InterviewId, Job, JobId,
    JobStatus, Note, NoteAuthor, NoteId, Notification, NotificationId, Offer, OfferId,
    OfferStatus, Role, SiteSetting, Stage, User, UserId,
};
use super::repository::{
    ApplicantFilter, HiringRepository, InterviewFilter, JobFilter, OfferFilter, Page, PageOf,
};

/// Text fields of a public application submission, already parsed from the
/// multipart form.
#[derive(Debug, Clone, Default)]
pub struct ApplicationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cover_letter: Option<String>,
    /// Honeypot field; any non-empty value marks the submission as spam.
    pub website: Option<String>,
    pub event_id: Option<EventId>,
}

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub field: UploadField,
    pub original_name: String,
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub department: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub title: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOffer {
    pub applicant_id: ApplicantId,
    pub salary: u64,
    pub currency: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPatch {
    pub salary: Option<u64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInterview {
    pub applicant_id: ApplicantId,
    pub scheduled_at: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub participants: Vec<UserId>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewPatch {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub participants: Option<Vec<UserId>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// Orchestrates intake and CRUD over the storage trait. Generic over the
/// repository and scanner so tests can swap either side out.
pub struct HiringService<R, S> {
    repository: Arc<R>,
    uploads: UploadValidator<S>,
    spam: SpamFilter,
}

impl<R, S> HiringService<R, S>
where
    R: HiringRepository + 'static,
    S: VirusScanner + 'static,
{
    pub fn new(repository: Arc<R>, scanner: Arc<S>, upload_root: PathBuf) -> Self {
        Self {
            repository,
            uploads: UploadValidator::new(scanner, upload_root),
            spam: SpamFilter,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn uploads(&self) -> &UploadValidator<S> {
        &self.uploads
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<User, ApiError> {
        auth::authenticate(self.repository.as_ref(), headers)
    }

    // ---- public intake ----

    /// Full intake pipeline: field validation, spam heuristic, sanitization,
    /// upload validation and storage, persistence, notifications.
    pub async fn submit_application(
        &self,
        job_id: JobId,
        form: ApplicationForm,
        files: Vec<IncomingFile>,
        client_ip: Option<IpAddr>,
    ) -> Result<Applicant, ApiError> {
        let job = self
            .repository
            .fetch_job(&job_id)?
            .ok_or(ApiError::NotFound("job"))?;
        if job.status == JobStatus::Closed {
            return Err(ApiError::Conflict("job is no longer accepting applications".to_string()));
        }

        let mut field_errors = BTreeMap::new();
        if form.first_name.trim().is_empty() {
            field_errors.insert("firstName".to_string(), "First name is required".to_string());
        }
        if form.last_name.trim().is_empty() {
            field_errors.insert("lastName".to_string(), "Last name is required".to_string());
        }
        if form.email.trim().is_empty() || !form.email.contains('@') {
            field_errors.insert("email".to_string(), "A valid email is required".to_string());
        }
        if !field_errors.is_empty() {
            return Err(ApiError::Validation {
                fields: field_errors,
            });
        }

        let verdict = self.spam.evaluate(
            SpamCheckInput {
                first_name: &form.first_name,
                last_name: &form.last_name,
                email: &form.email,
                cover_letter: form.cover_letter.as_deref(),
                honeypot: form.website.as_deref(),
            },
            client_ip,
        );

        let stored = self.store_uploads(files).await?;

        let applicant = Applicant {
            id: ApplicantId::random(),
            job_id,
            first_name: strip_html(form.first_name.trim()),
            last_name: strip_html(form.last_name.trim()),
            email: strip_html(form.email.trim()),
            phone: form.phone.as_deref().map(|phone| strip_html(phone.trim())),
            cover_letter: form.cover_letter.as_deref().map(sanitize_rich_text),
            resume_path: stored_path(&stored, UploadField::Resume),
            portfolio_path: stored_path(&stored, UploadField::Portfolio),
            stage: if form.event_id.is_some() {
                Stage::FairIntake
            } else {
                Stage::New
            },
            spam: verdict.spam,
            spam_reasons: verdict.reasons.iter().map(|r| r.to_string()).collect(),
            client_ip: verdict.client_ip,
            event_id: form.event_id,
            created_at: Utc::now(),
        };

        let applicant = self.repository.insert_applicant(applicant)?;
        self.record_activity(
            "public",
            "applicant.submitted",
            &format!("applicant:{}", applicant.id.0),
            &format!(
                "{} {} applied for {}",
                applicant.first_name, applicant.last_name, job.title
            ),
        )?;

        if applicant.spam {
            info!(
                applicant = %applicant.id.0,
                reasons = ?applicant.spam_reasons,
                "submission flagged as spam"
            );
        } else {
            self.notify_staff(&format!(
                "New applicant {} {} for {}",
                applicant.first_name, applicant.last_name, job.title
            ))?;
        }

        Ok(applicant)
    }

    /// Run the heuristic without persisting anything, for the CLI.
    pub fn spam_verdict(
        &self,
        input: SpamCheckInput<'_>,
        client_ip: Option<IpAddr>,
    ) -> SpamVerdict {
        self.spam.evaluate(input, client_ip)
    }

    async fn store_uploads(
        &self,
        files: Vec<IncomingFile>,
    ) -> Result<Vec<StoredUpload>, ApiError> {
        let mut stored = Vec::new();
        let mut rejections = BTreeMap::new();

        for file in &files {
            match self
                .uploads
                .validate_and_store(
                    file.field,
                    &file.original_name,
                    file.declared_type.as_deref(),
                    &file.bytes,
                )
                .await
            {
                Ok(upload) => stored.push(upload),
                Err(UploadError::Rejected(rejection)) => {
                    rejections
                        .insert(file.field.wire_name().to_string(), rejection.to_string());
                }
                Err(UploadError::Io(err)) => {
                    self.uploads.discard(&stored).await;
                    return Err(ApiError::Internal(err.to_string()));
                }
            }
        }

        if rejections.is_empty() {
            Ok(stored)
        } else {
            // A single bad file fails the whole submission.
            self.uploads.discard(&stored).await;
            Err(ApiError::Validation { fields: rejections })
        }
    }

    // ---- jobs ----

    pub fn create_job(&self, actor: &User, new: NewJob) -> Result<Job, ApiError> {
        auth::require_manage(actor)?;
        let job = Job {
            id: JobId::random(),
            title: strip_html(new.title.trim()),
            department: strip_html(new.department.trim()),
            location: strip_html(new.location.trim()),
            description: sanitize_rich_text(&new.description),
            status: JobStatus::Open,
            created_at: Utc::now(),
        };
        if job.title.is_empty() {
            return Err(ApiError::field("title", "Title is required"));
        }
        let job = self.repository.insert_job(job)?;
        self.record_activity(
            &actor.email,
            "job.created",
            &format!("job:{}", job.id.0),
            &job.title,
        )?;
        Ok(job)
    }

    pub fn update_job(&self, actor: &User, id: JobId, patch: JobPatch) -> Result<Job, ApiError> {
        auth::require_manage(actor)?;
        let mut job = self
            .repository
            .fetch_job(&id)?
            .ok_or(ApiError::NotFound("job"))?;
        if let Some(title) = patch.title {
            job.title = strip_html(title.trim());
        }
        if let Some(department) = patch.department {
            job.department = strip_html(department.trim());
        }
        if let Some(location) = patch.location {
            job.location = strip_html(location.trim());
        }
        if let Some(description) = patch.description {
            job.description = sanitize_rich_text(&description);
        }
        if let Some(status) = patch.status {
            job.status = status;
        }
        Ok(self.repository.update_job(job)?)
    }

    /// Jobs with applicants cannot be removed, only closed.
    pub fn delete_job(&self, actor: &User, id: JobId) -> Result<(), ApiError> {
        auth::require_manage(actor)?;
        if self.repository.count_applicants_for_job(&id)? > 0 {
            return Err(ApiError::Conflict(
                "job still has applicants; close it instead".to_string(),
            ));
        }
        Ok(self.repository.delete_job(&id)?)
    }

    pub fn get_job(&self, id: JobId) -> Result<Job, ApiError> {
        self.repository
            .fetch_job(&id)?
            .ok_or(ApiError::NotFound("job"))
    }

    pub fn list_jobs(&self, filter: &JobFilter, page: Page) -> Result<PageOf<Job>, ApiError> {
        Ok(self.repository.list_jobs(filter, page)?)
    }

    // ---- applicants ----

    pub fn get_applicant(&self, actor: &User, id: ApplicantId) -> Result<Applicant, ApiError> {
        let _ = actor;
        self.repository
            .fetch_applicant(&id)?
            .ok_or(ApiError::NotFound("applicant"))
    }

    pub fn list_applicants(
        &self,
        actor: &User,
        filter: &ApplicantFilter,
        page: Page,
    ) -> Result<PageOf<Applicant>, ApiError> {
        let _ = actor;
        Ok(self.repository.list_applicants(filter, page)?)
    }

    pub fn update_applicant(
        &self,
        actor: &User,
        id: ApplicantId,
        patch: ApplicantPatch,
    ) -> Result<Applicant, ApiError> {
        auth::require_manage(actor)?;
        let mut applicant = self
            .repository
            .fetch_applicant(&id)?
            .ok_or(ApiError::NotFound("applicant"))?;
        if let Some(first_name) = patch.first_name {
            applicant.first_name = strip_html(first_name.trim());
        }
        if let Some(last_name) = patch.last_name {
            applicant.last_name = strip_html(last_name.trim());
        }
        if let Some(email) = patch.email {
            applicant.email = strip_html(email.trim());
        }
        if let Some(phone) = patch.phone {
            applicant.phone = Some(strip_html(phone.trim()));
        }
        Ok(self.repository.update_applicant(applicant)?)
    }

    pub fn delete_applicant(&self, actor: &User, id: ApplicantId) -> Result<(), ApiError> {
        auth::require_manage(actor)?;
        Ok(self.repository.delete_applicant(&id)?)
    }

    pub fn advance_stage(
        &self,
        actor: &User,
        id: ApplicantId,
        stage: Stage,
    ) -> Result<Applicant, ApiError> {
        auth::require_manage(actor)?;
        let mut applicant = self
            .repository
            .fetch_applicant(&id)?
            .ok_or(ApiError::NotFound("applicant"))?;
        let previous = applicant.stage;
        applicant.stage = stage;
        let applicant = self.repository.update_applicant(applicant)?;
        self.record_activity(
            &actor.email,
            "applicant.stage_changed",
            &format!("applicant:{}", applicant.id.0),
            &format!("{} -> {}", previous.label(), stage.label()),
        )?;
        Ok(applicant)
    }

    // ---- notes ----

    pub fn add_note(
        &self,
        actor: &User,
        applicant_id: ApplicantId,
        body: &str,
    ) -> Result<Note, ApiError> {
        // Reviewers may leave notes; no manage check here.
        self.repository
            .fetch_applicant(&applicant_id)?
            .ok_or(ApiError::NotFound("applicant"))?;
        let body = sanitize_rich_text(body);
        if body.trim().is_empty() {
            return Err(ApiError::field("body", "Note body is required"));
        }
        let note = Note {
            id: NoteId::random(),
            applicant_id,
            author: NoteAuthor::User(actor.id),
            body,
            created_at: Utc::now(),
        };
        Ok(self.repository.insert_note(note)?)
    }

    pub fn list_notes(
        &self,
        actor: &User,
        applicant_id: ApplicantId,
    ) -> Result<Vec<Note>, ApiError> {
        let _ = actor;
        self.repository
            .fetch_applicant(&applicant_id)?
            .ok_or(ApiError::NotFound("applicant"))?;
        Ok(self.repository.list_notes_for_applicant(&applicant_id)?)
    }

    // ---- offers ----

    pub fn create_offer(&self, actor: &User, new: NewOffer) -> Result<Offer, ApiError> {
        auth::require_manage(actor)?;
        self.repository
            .fetch_applicant(&new.applicant_id)?
            .ok_or(ApiError::NotFound("applicant"))?;
        let now = Utc::now();
        let offer = Offer {
            id: OfferId::random(),
            applicant_id: new.applicant_id,
            salary: new.salary,
            currency: new.currency,
            status: OfferStatus::Draft,
            letter_path: None,
            created_at: now,
            updated_at: now,
        };
        Ok(self.repository.insert_offer(offer)?)
    }

    pub fn update_offer(
        &self,
        actor: &User,
        id: OfferId,
        patch: OfferPatch,
    ) -> Result<Offer, ApiError> {
        auth::require_manage(actor)?;
        let mut offer = self
            .repository
            .fetch_offer(&id)?
            .ok_or(ApiError::NotFound("offer"))?;
        if let Some(salary) = patch.salary {
            offer.salary = salary;
        }
        if let Some(currency) = patch.currency {
            offer.currency = currency;
        }
        offer.updated_at = Utc::now();
        Ok(self.repository.update_offer(offer)?)
    }

    /// Status transition. Accepting an offer while the applicant sits at the
    /// `offer` stage advances them to `hired` and leaves a system note.
    pub fn update_offer_status(
        &self,
        actor: &User,
        id: OfferId,
        status: OfferStatus,
    ) -> Result<Offer, ApiError> {
        auth::require_manage(actor)?;
        let mut offer = self
            .repository
            .fetch_offer(&id)?
            .ok_or(ApiError::NotFound("offer"))?;
        offer.status = status;
        offer.updated_at = Utc::now();
        let offer = self.repository.update_offer(offer)?;

        if status == OfferStatus::Accepted {
            if let Some(mut applicant) = self.repository.fetch_applicant(&offer.applicant_id)? {
                if applicant.stage == Stage::Offer {
                    applicant.stage = Stage::Hired;
                    let applicant = self.repository.update_applicant(applicant)?;
                    self.repository.insert_note(Note {
                        id: NoteId::random(),
                        applicant_id: applicant.id,
                        author: NoteAuthor::System,
                        body: "Offer accepted. Applicant marked as hired.".to_string(),
                        created_at: Utc::now(),
                    })?;
                    self.record_activity(
                        &actor.email,
                        "offer.accepted",
                        &format!("applicant:{}", applicant.id.0),
                        "stage advanced to hired",
                    )?;
                }
            }
        }

        Ok(offer)
    }

    pub async fn attach_offer_letter(
        &self,
        actor: &User,
        id: OfferId,
        file: IncomingFile,
    ) -> Result<Offer, ApiError> {
        auth::require_manage(actor)?;
        let mut offer = self
            .repository
            .fetch_offer(&id)?
            .ok_or(ApiError::NotFound("offer"))?;

        let stored = match self
            .uploads
            .validate_and_store(
                UploadField::OfferLetter,
                &file.original_name,
                file.declared_type.as_deref(),
                &file.bytes,
            )
            .await
        {
            Ok(stored) => stored,
            Err(UploadError::Rejected(rejection)) => {
                return Err(ApiError::field(
                    UploadField::OfferLetter.wire_name(),
                    rejection.to_string(),
                ))
            }
            Err(UploadError::Io(err)) => return Err(ApiError::Internal(err.to_string())),
        };

        offer.letter_path = Some(stored.path.to_string_lossy().into_owned());
        offer.updated_at = Utc::now();
        Ok(self.repository.update_offer(offer)?)
    }

    pub fn delete_offer(&self, actor: &User, id: OfferId) -> Result<(), ApiError> {
        auth::require_manage(actor)?;
        Ok(self.repository.delete_offer(&id)?)
    }

    pub fn get_offer(&self, actor: &User, id: OfferId) -> Result<Offer, ApiError> {
        let _ = actor;
        self.repository
            .fetch_offer(&id)?
            .ok_or(ApiError::NotFound("offer"))
    }

    pub fn list_offers(
        &self,
        actor: &User,
        filter: &OfferFilter,
        page: Page,
    ) -> Result<PageOf<Offer>, ApiError> {
        let _ = actor;
        Ok(self.repository.list_offers(filter, page)?)
    }

    // ---- interviews ----

    pub fn create_interview(&self, actor: &User, new: NewInterview) -> Result<Interview, ApiError> {
        auth::require_manage(actor)?;
        self.repository
            .fetch_applicant(&new.applicant_id)?
            .ok_or(ApiError::NotFound("applicant"))?;
        let interview = Interview {
            id: InterviewId::random(),
            applicant_id: new.applicant_id,
            scheduled_at: new.scheduled_at,
            location: strip_html(new.location.trim()),
            participants: new.participants,
            notes: new.notes.as_deref().map(sanitize_rich_text),
            created_at: Utc::now(),
        };
        Ok(self.repository.insert_interview(interview)?)
    }

    pub fn update_interview(
        &self,
        actor: &User,
        id: InterviewId,
        patch: InterviewPatch,
    ) -> Result<Interview, ApiError> {
        auth::require_manage(actor)?;
        let mut interview = self
            .repository
            .fetch_interview(&id)?
            .ok_or(ApiError::NotFound("interview"))?;
        if let Some(scheduled_at) = patch.scheduled_at {
            interview.scheduled_at = scheduled_at;
        }
        if let Some(location) = patch.location {
            interview.location = strip_html(location.trim());
        }
        if let Some(participants) = patch.participants {
            interview.participants = participants;
        }
        if let Some(notes) = patch.notes {
            interview.notes = Some(sanitize_rich_text(&notes));
        }
        Ok(self.repository.update_interview(interview)?)
    }

    pub fn delete_interview(&self, actor: &User, id: InterviewId) -> Result<(), ApiError> {
        auth::require_manage(actor)?;
        Ok(self.repository.delete_interview(&id)?)
    }

    pub fn get_interview(&self, actor: &User, id: InterviewId) -> Result<Interview, ApiError> {
        let _ = actor;
        self.repository
            .fetch_interview(&id)?
            .ok_or(ApiError::NotFound("interview"))
    }

    pub fn list_interviews(
        &self,
        actor: &User,
        filter: &InterviewFilter,
        page: Page,
    ) -> Result<PageOf<Interview>, ApiError> {
        let _ = actor;
        Ok(self.repository.list_interviews(filter, page)?)
    }

    // ---- events ----

    pub fn create_event(&self, actor: &User, new: NewEvent) -> Result<Event, ApiError> {
        auth::require_manage(actor)?;
        let event = Event {
            id: EventId::random(),
            name: strip_html(new.name.trim()),
            date: new.date,
            location: strip_html(new.location.trim()),
            description: sanitize_rich_text(&new.description),
            created_at: Utc::now(),
        };
        if event.name.is_empty() {
            return Err(ApiError::field("name", "Event name is required"));
        }
        Ok(self.repository.insert_event(event)?)
    }

    pub fn update_event(
        &self,
        actor: &User,
        id: EventId,
        patch: EventPatch,
    ) -> Result<Event, ApiError> {
        auth::require_manage(actor)?;
        let mut event = self
            .repository
            .fetch_event(&id)?
            .ok_or(ApiError::NotFound("event"))?;
        if let Some(name) = patch.name {
            event.name = strip_html(name.trim());
        }
        if let Some(date) = patch.date {
            event.date = date;
        }
        if let Some(location) = patch.location {
            event.location = strip_html(location.trim());
        }
        if let Some(description) = patch.description {
            event.description = sanitize_rich_text(&description);
        }
        Ok(self.repository.update_event(event)?)
    }

    pub fn delete_event(&self, actor: &User, id: EventId) -> Result<(), ApiError> {
        auth::require_manage(actor)?;
        Ok(self.repository.delete_event(&id)?)
    }

    pub fn get_event(&self, id: EventId) -> Result<Event, ApiError> {
        self.repository
            .fetch_event(&id)?
            .ok_or(ApiError::NotFound("event"))
    }

    pub fn list_events(&self, page: Page) -> Result<PageOf<Event>, ApiError> {
        Ok(self.repository.list_events(page)?)
    }

    // ---- users ----

    pub fn create_user(&self, actor: &User, new: NewUser) -> Result<User, ApiError> {
        auth::require_admin(actor)?;
        let user = User {
            id: UserId::random(),
            name: strip_html(new.name.trim()),
            email: strip_html(new.email.trim()),
            role: new.role,
            token: uuid::Uuid::new_v4().to_string(),
            active: true,
            created_at: Utc::now(),
        };
        if user.email.is_empty() || !user.email.contains('@') {
            return Err(ApiError::field("email", "A valid email is required"));
        }
        Ok(self.repository.insert_user(user)?)
    }

    pub fn update_user(
        &self,
        actor: &User,
        id: UserId,
        patch: UserPatch,
    ) -> Result<User, ApiError> {
        auth::require_admin(actor)?;
        let mut user = self
            .repository
            .fetch_user(&id)?
            .ok_or(ApiError::NotFound("user"))?;
        if let Some(name) = patch.name {
            user.name = strip_html(name.trim());
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(active) = patch.active {
            user.active = active;
        }
        Ok(self.repository.update_user(user)?)
    }

    pub fn delete_user(&self, actor: &User, id: UserId) -> Result<(), ApiError> {
        auth::require_admin(actor)?;
        if actor.id == id {
            return Err(ApiError::Conflict("cannot delete your own account".to_string()));
        }
        Ok(self.repository.delete_user(&id)?)
    }

    pub fn list_users(&self, actor: &User, page: Page) -> Result<PageOf<User>, ApiError> {
        auth::require_admin(actor)?;
        Ok(self.repository.list_users(page)?)
    }

    // ---- settings ----

    pub fn put_setting(
        &self,
        actor: &User,
        key: String,
        value: String,
    ) -> Result<SiteSetting, ApiError> {
        auth::require_admin(actor)?;
        Ok(self.repository.put_setting(SiteSetting {
            key,
            value,
            updated_at: Utc::now(),
        })?)
    }

    pub fn get_setting(&self, actor: &User, key: &str) -> Result<SiteSetting, ApiError> {
        let _ = actor;
        self.repository
            .get_setting(key)?
            .ok_or(ApiError::NotFound("setting"))
    }

    pub fn list_settings(&self, actor: &User) -> Result<Vec<SiteSetting>, ApiError> {
        auth::require_admin(actor)?;
        Ok(self.repository.list_settings()?)
    }

    // ---- activity & notifications ----

    pub fn list_activity(
        &self,
        actor: &User,
        page: Page,
    ) -> Result<PageOf<ActivityEntry>, ApiError> {
        auth::require_manage(actor)?;
        Ok(self.repository.list_activity(page)?)
    }

    pub fn my_notifications(&self, actor: &User) -> Result<Vec<Notification>, ApiError> {
        Ok(self.repository.list_notifications_for_user(&actor.id)?)
    }

    pub fn mark_notification_read(
        &self,
        actor: &User,
        id: NotificationId,
    ) -> Result<(), ApiError> {
        Ok(self.repository.mark_notification_read(&id, &actor.id)?)
    }

    pub fn mark_all_notifications_read(&self, actor: &User) -> Result<(), ApiError> {
        Ok(self.repository.mark_all_notifications_read(&actor.id)?)
    }

    fn notify_staff(&self, message: &str) -> Result<(), ApiError> {
        let mut page = 1;
        loop {
            let batch = self
                .repository
                .list_users(Page::new(Some(page), Some(Page::MAX_PER_PAGE)))?;
            if batch.items.is_empty() {
                break;
            }
            let seen = page as usize * Page::MAX_PER_PAGE as usize;
            for user in batch.items {
                if user.active && user.role.can_manage() {
                    self.repository.insert_notification(Notification {
                        id: NotificationId::random(),
                        user_id: user.id,
                        message: message.to_string(),
                        read: false,
                        created_at: Utc::now(),
                    })?;
                }
            }
            if seen >= batch.total {
                break;
            }
            page += 1;
        }
        Ok(())
    }

    fn record_activity(
        &self,
        actor: &str,
        action: &str,
        subject: &str,
        detail: &str,
    ) -> Result<(), ApiError> {
        Ok(self.repository.append_activity(ActivityEntry {
            id: uuid::Uuid::new_v4(),
            actor: actor.to_string(),
            action: action.to_string(),
            subject: subject.to_string(),
            detail: detail.to_string(),
            created_at: Utc::now(),
        })?)
    }
}

fn stored_path(stored: &[StoredUpload], field: UploadField) -> Option<String> {
    stored
        .iter()
        .find(|upload| upload.field == field)
        .map(|upload| upload.path.to_string_lossy().into_owned())
}

//! Storage abstraction in front of whatever relational store backs the
//! service, so the workflow layer can be exercised in isolation.

use serde::Serialize;

use super::domain::{
    ActivityEntry, Applicant, ApplicantId, Event, EventId, Interview, InterviewId, Job, JobId,
    JobStatus, Note, Notification, NotificationId, Offer, OfferId, OfferStatus, SiteSetting,
    Stage, User, UserId,
};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// 1-based pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    pub const DEFAULT_PER_PAGE: u32 = 25;
    pub const MAX_PER_PAGE: u32 = 100;

    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE);
        Self { page, per_page }
    }

    pub fn offset(self) -> usize {
        (self.page as usize - 1) * self.per_page as usize
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total before paging.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOf<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
}

impl<T> PageOf<T> {
    /// Cut the requested window out of a fully filtered result set.
    pub fn slice(all: Vec<T>, page: Page) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(page.offset())
            .take(page.per_page as usize)
            .collect();
        Self {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicantFilter {
    pub job_id: Option<JobId>,
    pub stage: Option<Stage>,
    pub spam: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct OfferFilter {
    pub applicant_id: Option<ApplicantId>,
    pub status: Option<OfferStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct InterviewFilter {
    pub applicant_id: Option<ApplicantId>,
}

/// CRUD surface over every hiring entity. Insert conflicts on an existing id,
/// update and delete miss with `NotFound`, lists return newest first.
pub trait HiringRepository: Send + Sync {
    // Users
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    fn update_user(&self, user: User) -> Result<User, RepositoryError>;
    fn delete_user(&self, id: &UserId) -> Result<(), RepositoryError>;
    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn find_user_by_token(&self, token: &str) -> Result<Option<User>, RepositoryError>;
    fn list_users(&self, page: Page) -> Result<PageOf<User>, RepositoryError>;

    // Jobs
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn delete_job(&self, id: &JobId) -> Result<(), RepositoryError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    fn list_jobs(&self, filter: &JobFilter, page: Page) -> Result<PageOf<Job>, RepositoryError>;

    // Applicants
    fn insert_applicant(&self, applicant: Applicant) -> Result<Applicant, RepositoryError>;
    fn update_applicant(&self, applicant: Applicant) -> Result<Applicant, RepositoryError>;
    fn delete_applicant(&self, id: &ApplicantId) -> Result<(), RepositoryError>;
    fn fetch_applicant(&self, id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError>;
    fn list_applicants(
        &self,
        filter: &ApplicantFilter,
        page: Page,
    ) -> Result<PageOf<Applicant>, RepositoryError>;
    fn count_applicants_for_job(&self, id: &JobId) -> Result<usize, RepositoryError>;

    // Offers
    fn insert_offer(&self, offer: Offer) -> Result<Offer, RepositoryError>;
    fn update_offer(&self, offer: Offer) -> Result<Offer, RepositoryError>;
    fn delete_offer(&self, id: &OfferId) -> Result<(), RepositoryError>;
    fn fetch_offer(&self, id: &OfferId) -> Result<Option<Offer>, RepositoryError>;
    fn list_offers(
        &self,
        filter: &OfferFilter,
        page: Page,
    ) -> Result<PageOf<Offer>, RepositoryError>;

    // Interviews
    fn insert_interview(&self, interview: Interview) -> Result<Interview, RepositoryError>;
    fn update_interview(&self, interview: Interview) -> Result<Interview, RepositoryError>;
    fn delete_interview(&self, id: &InterviewId) -> Result<(), RepositoryError>;
    fn fetch_interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError>;
    fn list_interviews(
        &self,
        filter: &InterviewFilter,
        page: Page,
    ) -> Result<PageOf<Interview>, RepositoryError>;

    // Events
    fn insert_event(&self, event: Event) -> Result<Event, RepositoryError>;
    fn update_event(&self, event: Event) -> Result<Event, RepositoryError>;
    fn delete_event(&self, id: &EventId) -> Result<(), RepositoryError>;
    fn fetch_event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError>;
    fn list_events(&self, page: Page) -> Result<PageOf<Event>, RepositoryError>;

    // Notes
    fn insert_note(&self, note: Note) -> Result<Note, RepositoryError>;
    fn list_notes_for_applicant(&self, id: &ApplicantId) -> Result<Vec<Note>, RepositoryError>;

    // Notifications
    fn insert_notification(
        &self,
        notification: Notification,
    ) -> Result<Notification, RepositoryError>;
    fn list_notifications_for_user(
        &self,
        id: &UserId,
    ) -> Result<Vec<Notification>, RepositoryError>;
    fn mark_notification_read(
        &self,
        id: &NotificationId,
        user: &UserId,
    ) -> Result<(), RepositoryError>;
    fn mark_all_notifications_read(&self, user: &UserId) -> Result<(), RepositoryError>;

    // Activity log
    fn append_activity(&self, entry: ActivityEntry) -> Result<(), RepositoryError>;
    fn list_activity(&self, page: Page) -> Result<PageOf<ActivityEntry>, RepositoryError>;

    // Site settings
    fn put_setting(&self, setting: SiteSetting) -> Result<SiteSetting, RepositoryError>;
    fn get_setting(&self, key: &str) -> Result<Option<SiteSetting>, RepositoryError>;
    fn list_settings(&self) -> Result<Vec<SiteSetting>, RepositoryError>;
}

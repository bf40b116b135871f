//! In-memory [`HiringRepository`] used by the server binary and the tests.
//! Stands in for the relational store, which is an external collaborator.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    ActivityEntry, Applicant, ApplicantId, Event, EventId, Interview, InterviewId, Job, JobId,
    Note, NoteId, Notification, NotificationId, Offer, OfferId, SiteSetting, User, UserId,
};
use super::repository::{
    ApplicantFilter, HiringRepository, InterviewFilter, JobFilter, OfferFilter, Page, PageOf,
    RepositoryError,
};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    jobs: HashMap<JobId, Job>,
    applicants: HashMap<ApplicantId, Applicant>,
    offers: HashMap<OfferId, Offer>,
    interviews: HashMap<InterviewId, Interview>,
    events: HashMap<EventId, Event>,
    notes: HashMap<NoteId, Note>,
    notifications: HashMap<NotificationId, Notification>,
    activity: Vec<ActivityEntry>,
    settings: BTreeMap<String, SiteSetting>,
}

#[derive(Default)]
pub struct InMemoryHiringRepository {
    tables: Mutex<Tables>,
}

impl InMemoryHiringRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

fn newest_first<T, F>(mut items: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

impl HiringRepository for InMemoryHiringRepository {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.users.contains_key(&user.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn update_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound);
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn delete_user(&self, id: &UserId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.users.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    fn find_user_by_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|user| user.active && user.token == token)
            .cloned())
    }

    fn list_users(&self, page: Page) -> Result<PageOf<User>, RepositoryError> {
        let users = self.lock()?.users.values().cloned().collect();
        Ok(PageOf::slice(
            newest_first(users, |user: &User| user.created_at),
            page,
        ))
    }

    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    fn update_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.jobs.contains_key(&job.id) {
            return Err(RepositoryError::NotFound);
        }
        tables.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    fn delete_job(&self, id: &JobId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.jobs.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.lock()?.jobs.get(id).cloned())
    }

    fn list_jobs(&self, filter: &JobFilter, page: Page) -> Result<PageOf<Job>, RepositoryError> {
        let search = filter.search.as_ref().map(|s| s.to_ascii_lowercase());
        let jobs: Vec<Job> = self
            .lock()?
            .jobs
            .values()
            .filter(|job| filter.status.map_or(true, |status| job.status == status))
            .filter(|job| {
                search
                    .as_ref()
                    .map_or(true, |needle| job.title.to_ascii_lowercase().contains(needle))
            })
            .cloned()
            .collect();
        Ok(PageOf::slice(
            newest_first(jobs, |job: &Job| job.created_at),
            page,
        ))
    }

    fn insert_applicant(&self, applicant: Applicant) -> Result<Applicant, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.applicants.contains_key(&applicant.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.applicants.insert(applicant.id, applicant.clone());
        Ok(applicant)
    }

    fn update_applicant(&self, applicant: Applicant) -> Result<Applicant, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.applicants.contains_key(&applicant.id) {
            return Err(RepositoryError::NotFound);
        }
        tables.applicants.insert(applicant.id, applicant.clone());
        Ok(applicant)
    }

    fn delete_applicant(&self, id: &ApplicantId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables
            .applicants
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn fetch_applicant(&self, id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError> {
        Ok(self.lock()?.applicants.get(id).cloned())
    }

    fn list_applicants(
        &self,
        filter: &ApplicantFilter,
        page: Page,
    ) -> Result<PageOf<Applicant>, RepositoryError> {
        let applicants: Vec<Applicant> = self
            .lock()?
            .applicants
            .values()
            .filter(|applicant| filter.job_id.map_or(true, |id| applicant.job_id == id))
            .filter(|applicant| filter.stage.map_or(true, |stage| applicant.stage == stage))
            .filter(|applicant| filter.spam.map_or(true, |spam| applicant.spam == spam))
            .cloned()
            .collect();
        Ok(PageOf::slice(
            newest_first(applicants, |applicant: &Applicant| applicant.created_at),
            page,
        ))
    }

    fn count_applicants_for_job(&self, id: &JobId) -> Result<usize, RepositoryError> {
        Ok(self
            .lock()?
            .applicants
            .values()
            .filter(|applicant| applicant.job_id == *id)
            .count())
    }

    fn insert_offer(&self, offer: Offer) -> Result<Offer, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.offers.contains_key(&offer.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.offers.insert(offer.id, offer.clone());
        Ok(offer)
    }

    fn update_offer(&self, offer: Offer) -> Result<Offer, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.offers.contains_key(&offer.id) {
            return Err(RepositoryError::NotFound);
        }
        tables.offers.insert(offer.id, offer.clone());
        Ok(offer)
    }

    fn delete_offer(&self, id: &OfferId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.offers.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn fetch_offer(&self, id: &OfferId) -> Result<Option<Offer>, RepositoryError> {
        Ok(self.lock()?.offers.get(id).cloned())
    }

    fn list_offers(
        &self,
        filter: &OfferFilter,
        page: Page,
    ) -> Result<PageOf<Offer>, RepositoryError> {
        let offers: Vec<Offer> = self
            .lock()?
            .offers
            .values()
            .filter(|offer| filter.applicant_id.map_or(true, |id| offer.applicant_id == id))
            .filter(|offer| filter.status.map_or(true, |status| offer.status == status))
            .cloned()
            .collect();
        Ok(PageOf::slice(
            newest_first(offers, |offer: &Offer| offer.created_at),
            page,
        ))
    }

    fn insert_interview(&self, interview: Interview) -> Result<Interview, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.interviews.contains_key(&interview.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.interviews.insert(interview.id, interview.clone());
        Ok(interview)
    }

    fn update_interview(&self, interview: Interview) -> Result<Interview, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.interviews.contains_key(&interview.id) {
            return Err(RepositoryError::NotFound);
        }
        tables.interviews.insert(interview.id, interview.clone());
        Ok(interview)
    }

    fn delete_interview(&self, id: &InterviewId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables
            .interviews
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn fetch_interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        Ok(self.lock()?.interviews.get(id).cloned())
    }

    fn list_interviews(
        &self,
        filter: &InterviewFilter,
        page: Page,
    ) -> Result<PageOf<Interview>, RepositoryError> {
        let interviews: Vec<Interview> = self
            .lock()?
            .interviews
            .values()
            .filter(|interview| {
                filter
                    .applicant_id
                    .map_or(true, |id| interview.applicant_id == id)
            })
            .cloned()
            .collect();
        Ok(PageOf::slice(
            newest_first(interviews, |interview: &Interview| interview.created_at),
            page,
        ))
    }

    fn insert_event(&self, event: Event) -> Result<Event, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.events.contains_key(&event.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    fn update_event(&self, event: Event) -> Result<Event, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.events.contains_key(&event.id) {
            return Err(RepositoryError::NotFound);
        }
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    fn delete_event(&self, id: &EventId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.events.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn fetch_event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Ok(self.lock()?.events.get(id).cloned())
    }

    fn list_events(&self, page: Page) -> Result<PageOf<Event>, RepositoryError> {
        let events = self.lock()?.events.values().cloned().collect();
        Ok(PageOf::slice(
            newest_first(events, |event: &Event| event.created_at),
            page,
        ))
    }

    fn insert_note(&self, note: Note) -> Result<Note, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.notes.contains_key(&note.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.notes.insert(note.id, note.clone());
        Ok(note)
    }

    fn list_notes_for_applicant(&self, id: &ApplicantId) -> Result<Vec<Note>, RepositoryError> {
        let notes: Vec<Note> = self
            .lock()?
            .notes
            .values()
            .filter(|note| note.applicant_id == *id)
            .cloned()
            .collect();
        Ok(newest_first(notes, |note: &Note| note.created_at))
    }

    fn insert_notification(
        &self,
        notification: Notification,
    ) -> Result<Notification, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.notifications.contains_key(&notification.id) {
            return Err(RepositoryError::Conflict);
        }
        tables
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    fn list_notifications_for_user(
        &self,
        id: &UserId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let notifications: Vec<Notification> = self
            .lock()?
            .notifications
            .values()
            .filter(|notification| notification.user_id == *id)
            .cloned()
            .collect();
        Ok(newest_first(
            notifications,
            |notification: &Notification| notification.created_at,
        ))
    }

    fn mark_notification_read(
        &self,
        id: &NotificationId,
        user: &UserId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        match tables.notifications.get_mut(id) {
            Some(notification) if notification.user_id == *user => {
                notification.read = true;
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    fn mark_all_notifications_read(&self, user: &UserId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        for notification in tables.notifications.values_mut() {
            if notification.user_id == *user {
                notification.read = true;
            }
        }
        Ok(())
    }

    fn append_activity(&self, entry: ActivityEntry) -> Result<(), RepositoryError> {
        self.lock()?.activity.push(entry);
        Ok(())
    }

    fn list_activity(&self, page: Page) -> Result<PageOf<ActivityEntry>, RepositoryError> {
        let mut entries = self.lock()?.activity.clone();
        entries.reverse();
        Ok(PageOf::slice(entries, page))
    }

    fn put_setting(&self, setting: SiteSetting) -> Result<SiteSetting, RepositoryError> {
        self.lock()?
            .settings
            .insert(setting.key.clone(), setting.clone());
        Ok(setting)
    }

    fn get_setting(&self, key: &str) -> Result<Option<SiteSetting>, RepositoryError> {
        Ok(self.lock()?.settings.get(key).cloned())
    }

    fn list_settings(&self) -> Result<Vec<SiteSetting>, RepositoryError> {
        Ok(self.lock()?.settings.values().cloned().collect())
    }
}

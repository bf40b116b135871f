use std::future::Future;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};
use chrono::Utc;
use tempfile::TempDir;

use crate::hiring::domain::{Job, JobId, JobStatus, Role, User, UserId};
use crate::hiring::memory::InMemoryHiringRepository;
use crate::hiring::repository::HiringRepository;
use crate::hiring::service::{ApplicationForm, HiringService, IncomingFile};
use crate::intake::scanner::{ScanOutcome, VirusScanner};
use crate::intake::upload::UploadField;

pub(super) const ADMIN_TOKEN: &str = "tok-admin";
pub(super) const RECRUITER_TOKEN: &str = "tok-recruiter";
pub(super) const REVIEWER_TOKEN: &str = "tok-reviewer";

/// Scanner returning the same outcome for every file.
pub(super) struct StaticScanner(pub(super) ScanOutcome);

impl VirusScanner for StaticScanner {
    fn scan(&self, _bytes: &[u8]) -> impl Future<Output = ScanOutcome> + Send {
        let outcome = self.0.clone();
        async move { outcome }
    }
}

pub(super) type TestService = HiringService<InMemoryHiringRepository, StaticScanner>;

pub(super) struct Fixture {
    pub(super) service: Arc<TestService>,
    pub(super) job: Job,
    pub(super) admin: User,
    pub(super) recruiter: User,
    pub(super) reviewer: User,
    // Holds the upload root alive for the test's duration.
    #[allow(dead_code)]
    pub(super) upload_dir: TempDir,
}

fn seed_user(repository: &InMemoryHiringRepository, name: &str, role: Role, token: &str) -> User {
    repository
        .insert_user(User {
            id: UserId::random(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
            token: token.to_string(),
            active: true,
            created_at: Utc::now(),
        })
        .expect("seed user")
}

pub(super) async fn fixture() -> Fixture {
    fixture_with_scanner(ScanOutcome::Clean).await
}

pub(super) async fn fixture_with_scanner(outcome: ScanOutcome) -> Fixture {
    let upload_dir = tempfile::tempdir().expect("tempdir");
    let repository = Arc::new(InMemoryHiringRepository::new());

    let admin = seed_user(&repository, "Avery", Role::Admin, ADMIN_TOKEN);
    let recruiter = seed_user(&repository, "Riley", Role::Recruiter, RECRUITER_TOKEN);
    let reviewer = seed_user(&repository, "Vic", Role::Reviewer, REVIEWER_TOKEN);

    let job = repository
        .insert_job(Job {
            id: JobId::random(),
            title: "Backend Engineer".to_string(),
            department: "Engineering".to_string(),
            location: "Remote".to_string(),
            description: "<p>Build services.</p>".to_string(),
            status: JobStatus::Open,
            created_at: Utc::now(),
        })
        .expect("seed job");

    let service = Arc::new(HiringService::new(
        repository,
        Arc::new(StaticScanner(outcome)),
        upload_dir.path().to_path_buf(),
    ));
    service
        .uploads()
        .ensure_directories()
        .await
        .expect("upload dirs");

    Fixture {
        service,
        job,
        admin,
        recruiter,
        reviewer,
        upload_dir,
    }
}

pub(super) fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
    );
    headers
}

pub(super) fn form() -> ApplicationForm {
    ApplicationForm {
        first_name: "Dana".to_string(),
        last_name: "Smith".to_string(),
        email: "dana@example.com".to_string(),
        phone: Some("+1 555 0100".to_string()),
        cover_letter: Some("I enjoy building reliable services.".to_string()),
        website: None,
        event_id: None,
    }
}

pub(super) fn pdf_resume() -> IncomingFile {
    IncomingFile {
        field: UploadField::Resume,
        original_name: "resume.pdf".to_string(),
        declared_type: Some("application/pdf".to_string()),
        bytes: b"%PDF-1.7 test document".to_vec(),
    }
}

pub(super) fn gif_resume() -> IncomingFile {
    IncomingFile {
        field: UploadField::Resume,
        original_name: "resume.gif".to_string(),
        declared_type: Some("image/gif".to_string()),
        bytes: b"GIF89a tiny".to_vec(),
    }
}

//! End-to-end checks of the public intake pipeline: multipart parsing, spam
//! flagging, upload validation, and virus-scan fail-open, all driven through
//! the HTTP router.

mod common {
    use std::future::Future;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::Router;
    use chrono::Utc;
    use tempfile::TempDir;

    use hiredesk::hiring::domain::{Job, JobId, JobStatus, Role, User, UserId};
    use hiredesk::hiring::repository::HiringRepository;
    use hiredesk::hiring::{hiring_router, HiringService, InMemoryHiringRepository};
    use hiredesk::intake::scanner::{ScanOutcome, VirusScanner};

    pub(super) const BOUNDARY: &str = "----intake-pipeline-boundary";

    pub(super) struct StaticScanner(pub(super) ScanOutcome);

    impl VirusScanner for StaticScanner {
        fn scan(&self, _bytes: &[u8]) -> impl Future<Output = ScanOutcome> + Send {
            let outcome = self.0.clone();
            async move { outcome }
        }
    }

    pub(super) struct Harness {
        pub(super) router: Router,
        pub(super) service: Arc<HiringService<InMemoryHiringRepository, StaticScanner>>,
        pub(super) job: Job,
        pub(super) admin: User,
        #[allow(dead_code)]
        pub(super) upload_dir: TempDir,
    }

    pub(super) async fn harness(outcome: ScanOutcome) -> Harness {
        let upload_dir = tempfile::tempdir().expect("tempdir");
        let repository = Arc::new(InMemoryHiringRepository::new());

        let admin = repository
            .insert_user(User {
                id: UserId::random(),
                name: "Avery".to_string(),
                email: "avery@example.com".to_string(),
                role: Role::Admin,
                token: "tok-admin".to_string(),
                active: true,
                created_at: Utc::now(),
            })
            .expect("seed admin");

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

        Harness {
            router: hiring_router(service.clone()),
            service,
            job,
            admin,
            upload_dir,
        }
    }

    pub(super) fn multipart_body(
        fields: &[(&str, &str)],
        files: &[(&str, &str, &str, &[u8])],
    ) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        for (name, filename, content_type, bytes) in files {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    pub(super) fn apply_request(
        job: JobId,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &str, &[u8])],
    ) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/jobs/{}/apply", job.0))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields, files)))
            .expect("request")
    }

    pub(super) fn applicant_fields<'a>() -> Vec<(&'a str, &'a str)> {
        vec![
            ("firstName", "Dana"),
            ("lastName", "Smith"),
            ("email", "dana@example.com"),
            ("coverLetter", "I enjoy building reliable services."),
        ]
    }

    pub(super) fn stored_upload_count(root: &std::path::Path) -> usize {
        ["resumes", "portfolios", "offers"]
            .iter()
            .map(|category| {
                std::fs::read_dir(root.join(category))
                    .map(|entries| entries.count())
                    .unwrap_or(0)
            })
            .sum()
    }
}

use common::*;

use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

use hiredesk::hiring::repository::{ApplicantFilter, HiringRepository, Page};
use hiredesk::intake::scanner::ScanOutcome;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn clean_application_lands_on_disk_and_notifies_staff() {
    let harness = harness(ScanOutcome::Clean).await;

    let response = harness
        .router
        .clone()
        .oneshot(apply_request(
            harness.job.id,
            &applicant_fields(),
            &[("resume", "cv.pdf", "application/pdf", b"%PDF-1.7 resume body")],
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("received"));

    assert_eq!(stored_upload_count(harness.upload_dir.path()), 1);

    let repo = harness.service.repository();
    let applicants = repo
        .list_applicants(&ApplicantFilter::default(), Page::default())
        .expect("list applicants");
    assert_eq!(applicants.total, 1);
    let applicant = &applicants.items[0];
    assert!(!applicant.spam);
    assert!(applicant
        .resume_path
        .as_deref()
        .is_some_and(|path| path.ends_with(".pdf")));

    let inbox = repo
        .list_notifications_for_user(&harness.admin.id)
        .expect("inbox");
    assert_eq!(inbox.len(), 1);
}

#[tokio::test]
async fn honeypot_submission_is_flagged_and_kept_quiet() {
    let harness = harness(ScanOutcome::Clean).await;

    let mut fields = applicant_fields();
    fields.push(("website", "https://spam.example"));

    let response = harness
        .router
        .clone()
        .oneshot(apply_request(harness.job.id, &fields, &[]))
        .await
        .expect("response");

    // The bot still sees a success; the record is flagged internally.
    assert_eq!(response.status(), StatusCode::CREATED);

    let repo = harness.service.repository();
    let flagged = repo
        .list_applicants(
            &ApplicantFilter {
                spam: Some(true),
                ..ApplicantFilter::default()
            },
            Page::default(),
        )
        .expect("list flagged");
    assert_eq!(flagged.total, 1);
    assert!(flagged.items[0]
        .spam_reasons
        .iter()
        .any(|reason| reason == "Honeypot field was filled"));

    assert!(repo
        .list_notifications_for_user(&harness.admin.id)
        .expect("inbox")
        .is_empty());
}

#[tokio::test]
async fn disallowed_resume_type_rejects_and_cleans_up() {
    let harness = harness(ScanOutcome::Clean).await;

    let response = harness
        .router
        .clone()
        .oneshot(apply_request(
            harness.job.id,
            &applicant_fields(),
            &[("resume", "cv.gif", "image/gif", b"GIF89a not a resume")],
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["fields"]["resume"],
        json!("File type \"image/gif\" is not allowed")
    );

    // Nothing persisted, nothing left on disk.
    assert_eq!(stored_upload_count(harness.upload_dir.path()), 0);
    let applicants = harness
        .service
        .repository()
        .list_applicants(&ApplicantFilter::default(), Page::default())
        .expect("list applicants");
    assert_eq!(applicants.total, 0);
}

#[tokio::test]
async fn scanner_outage_fails_open() {
    let harness = harness(ScanOutcome::Skipped("daemon unavailable".to_string())).await;

    let response = harness
        .router
        .clone()
        .oneshot(apply_request(
            harness.job.id,
            &applicant_fields(),
            &[("resume", "cv.pdf", "application/pdf", b"%PDF-1.7 resume body")],
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(stored_upload_count(harness.upload_dir.path()), 1);
}

#[tokio::test]
async fn infected_upload_is_rejected() {
    let harness = harness(ScanOutcome::Infected("Eicar-Test-Signature".to_string())).await;

    let response = harness
        .router
        .clone()
        .oneshot(apply_request(
            harness.job.id,
            &applicant_fields(),
            &[("resume", "cv.pdf", "application/pdf", b"%PDF-1.7 resume body")],
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stored_upload_count(harness.upload_dir.path()), 0);
}

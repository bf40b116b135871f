use super::common::*;

use chrono::Utc;

use crate::error::ApiError;
use crate::hiring::domain::{EventId, JobStatus, NoteAuthor, Role, Stage, User, UserId};
use crate::hiring::repository::{ApplicantFilter, HiringRepository, Page};
use crate::hiring::service::{JobPatch, NewOffer, OfferPatch};
use crate::intake::scanner::ScanOutcome;
use crate::intake::spam::REASON_HONEYPOT;
use crate::intake::upload::UPLOAD_CATEGORIES;

use crate::hiring::domain::OfferStatus;

fn stored_upload_count(fixture: &Fixture) -> usize {
    UPLOAD_CATEGORIES
        .iter()
        .map(|category| {
            std::fs::read_dir(fixture.upload_dir.path().join(category))
                .map(|entries| entries.count())
                .unwrap_or(0)
        })
        .sum()
}

#[tokio::test]
async fn clean_submission_is_stored_and_staff_notified() {
    let fx = fixture().await;

    let applicant = fx
        .service
        .submit_application(fx.job.id, form(), vec![pdf_resume()], None)
        .await
        .expect("submission accepted");

    assert_eq!(applicant.stage, Stage::New);
    assert!(!applicant.spam);
    assert!(applicant.resume_path.is_some());
    assert_eq!(stored_upload_count(&fx), 1);

    // Managing staff are notified; reviewers are not.
    let repo = fx.service.repository();
    assert_eq!(
        repo.list_notifications_for_user(&fx.admin.id)
            .expect("admin inbox")
            .len(),
        1
    );
    assert_eq!(
        repo.list_notifications_for_user(&fx.recruiter.id)
            .expect("recruiter inbox")
            .len(),
        1
    );
    assert!(repo
        .list_notifications_for_user(&fx.reviewer.id)
        .expect("reviewer inbox")
        .is_empty());
}

#[tokio::test]
async fn staff_beyond_the_first_listing_page_are_notified() {
    let fx = fixture().await;

    // Push the roster past a single listing page.
    for n in 0..105 {
        fx.service
            .repository()
            .insert_user(User {
                id: UserId::random(),
                name: format!("Recruiter {n}"),
                email: format!("recruiter{n}@example.com"),
                role: Role::Recruiter,
                token: format!("tok-extra-{n}"),
                active: true,
                created_at: Utc::now(),
            })
            .expect("seed extra recruiter");
    }

    fx.service
        .submit_application(fx.job.id, form(), vec![], None)
        .await
        .expect("submission");

    // The fixture admin was created first, so the newest-first listing puts
    // them past the first page; they still get the notification.
    let inbox = fx
        .service
        .repository()
        .list_notifications_for_user(&fx.admin.id)
        .expect("admin inbox");
    assert_eq!(inbox.len(), 1);
}

#[tokio::test]
async fn honeypot_submission_is_flagged_not_rejected() {
    let fx = fixture().await;

    let mut spammy = form();
    spammy.website = Some("https://spam.example".to_string());

    let applicant = fx
        .service
        .submit_application(fx.job.id, spammy, vec![], None)
        .await
        .expect("flagged submissions still persist");

    assert!(applicant.spam);
    assert!(applicant
        .spam_reasons
        .iter()
        .any(|reason| reason == REASON_HONEYPOT));

    // Flagged submissions generate no notifications.
    let repo = fx.service.repository();
    assert!(repo
        .list_notifications_for_user(&fx.admin.id)
        .expect("admin inbox")
        .is_empty());

    // But they are queryable through the spam filter.
    let flagged = fx
        .service
        .list_applicants(
            &fx.recruiter,
            &ApplicantFilter {
                job_id: Some(fx.job.id),
                stage: None,
                spam: Some(true),
            },
            Page::default(),
        )
        .expect("list flagged");
    assert_eq!(flagged.total, 1);
}

#[tokio::test]
async fn event_sourced_applicants_enter_fair_intake() {
    let fx = fixture().await;

    let mut sourced = form();
    sourced.event_id = Some(EventId::random());

    let applicant = fx
        .service
        .submit_application(fx.job.id, sourced, vec![], None)
        .await
        .expect("submission accepted");

    assert_eq!(applicant.stage, Stage::FairIntake);
}

#[tokio::test]
async fn closed_job_refuses_submissions() {
    let fx = fixture().await;
    fx.service
        .update_job(
            &fx.recruiter,
            fx.job.id,
            JobPatch {
                status: Some(JobStatus::Closed),
                ..JobPatch::default()
            },
        )
        .expect("close job");

    let err = fx
        .service
        .submit_application(fx.job.id, form(), vec![], None)
        .await
        .expect_err("closed job rejects");
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn blank_required_fields_are_reported_together() {
    let fx = fixture().await;

    let err = fx
        .service
        .submit_application(fx.job.id, crate::hiring::service::ApplicationForm::default(), vec![], None)
        .await
        .expect_err("empty form rejected");

    match err {
        ApiError::Validation { fields } => {
            assert!(fields.contains_key("firstName"));
            assert!(fields.contains_key("lastName"));
            assert!(fields.contains_key("email"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn disallowed_resume_type_fails_the_submission() {
    let fx = fixture().await;

    let err = fx
        .service
        .submit_application(fx.job.id, form(), vec![gif_resume()], None)
        .await
        .expect_err("gif resume rejected");

    match err {
        ApiError::Validation { fields } => {
            assert_eq!(
                fields.get("resume").map(String::as_str),
                Some("File type \"image/gif\" is not allowed")
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    // Nothing lingers on disk and nothing was persisted.
    assert_eq!(stored_upload_count(&fx), 0);
    let applicants = fx
        .service
        .list_applicants(&fx.recruiter, &ApplicantFilter::default(), Page::default())
        .expect("list");
    assert_eq!(applicants.total, 0);
}

#[tokio::test]
async fn infected_upload_is_rejected_when_scanner_reports_found() {
    let fx = fixture_with_scanner(ScanOutcome::Infected("Eicar-Test-Signature".to_string())).await;

    let err = fx
        .service
        .submit_application(fx.job.id, form(), vec![pdf_resume()], None)
        .await
        .expect_err("infected upload rejected");
    assert!(matches!(err, ApiError::Validation { .. }));
    assert_eq!(stored_upload_count(&fx), 0);
}

#[tokio::test]
async fn scanner_outage_does_not_block_submissions() {
    let fx = fixture_with_scanner(ScanOutcome::Skipped("daemon unavailable".to_string())).await;

    let applicant = fx
        .service
        .submit_application(fx.job.id, form(), vec![pdf_resume()], None)
        .await
        .expect("fail-open accepts the upload");
    assert!(applicant.resume_path.is_some());
    assert_eq!(stored_upload_count(&fx), 1);
}

#[tokio::test]
async fn accepted_offer_hires_the_applicant() {
    let fx = fixture().await;

    let applicant = fx
        .service
        .submit_application(fx.job.id, form(), vec![], None)
        .await
        .expect("submission");
    fx.service
        .advance_stage(&fx.recruiter, applicant.id, Stage::Offer)
        .expect("advance to offer");

    let offer = fx
        .service
        .create_offer(
            &fx.recruiter,
            NewOffer {
                applicant_id: applicant.id,
                salary: 95_000,
                currency: "EUR".to_string(),
            },
        )
        .expect("create offer");
    assert_eq!(offer.status, OfferStatus::Draft);

    let offer = fx
        .service
        .update_offer_status(&fx.recruiter, offer.id, OfferStatus::Accepted)
        .expect("accept offer");
    assert_eq!(offer.status, OfferStatus::Accepted);

    let applicant = fx
        .service
        .get_applicant(&fx.recruiter, applicant.id)
        .expect("reload applicant");
    assert_eq!(applicant.stage, Stage::Hired);

    let notes = fx
        .service
        .list_notes(&fx.recruiter, applicant.id)
        .expect("notes");
    assert!(notes
        .iter()
        .any(|note| note.author == NoteAuthor::System
            && note.body == "Offer accepted. Applicant marked as hired."));
}

#[tokio::test]
async fn accepting_an_offer_twice_does_not_duplicate_the_note() {
    let fx = fixture().await;

    let applicant = fx
        .service
        .submit_application(fx.job.id, form(), vec![], None)
        .await
        .expect("submission");
    fx.service
        .advance_stage(&fx.recruiter, applicant.id, Stage::Offer)
        .expect("advance");
    let offer = fx
        .service
        .create_offer(
            &fx.recruiter,
            NewOffer {
                applicant_id: applicant.id,
                salary: 90_000,
                currency: "EUR".to_string(),
            },
        )
        .expect("offer");

    fx.service
        .update_offer_status(&fx.recruiter, offer.id, OfferStatus::Accepted)
        .expect("first accept");
    fx.service
        .update_offer_status(&fx.recruiter, offer.id, OfferStatus::Accepted)
        .expect("second accept");

    let notes = fx
        .service
        .list_notes(&fx.recruiter, applicant.id)
        .expect("notes");
    let hired_notes = notes
        .iter()
        .filter(|note| note.author == NoteAuthor::System)
        .count();
    assert_eq!(hired_notes, 1);
}

#[tokio::test]
async fn reviewers_can_note_but_not_manage() {
    let fx = fixture().await;

    let applicant = fx
        .service
        .submit_application(fx.job.id, form(), vec![], None)
        .await
        .expect("submission");

    // Notes are rich text: formatting survives, everything else is dropped.
    let note = fx
        .service
        .add_note(
            &fx.reviewer,
            applicant.id,
            "<b>Strong</b> portfolio<script>alert(1)</script>",
        )
        .expect("reviewers leave notes");
    assert_eq!(note.body, "<b>Strong</b> portfolio");

    let err = fx
        .service
        .advance_stage(&fx.reviewer, applicant.id, Stage::Screening)
        .expect_err("reviewers cannot move stages");
    assert!(matches!(err, ApiError::Forbidden));

    let err = fx
        .service
        .update_offer(&fx.reviewer, crate::hiring::domain::OfferId::random(), OfferPatch::default())
        .expect_err("reviewers cannot touch offers");
    assert!(matches!(err, ApiError::Forbidden));
}

#[tokio::test]
async fn jobs_with_applicants_cannot_be_deleted() {
    let fx = fixture().await;

    fx.service
        .submit_application(fx.job.id, form(), vec![], None)
        .await
        .expect("submission");

    let err = fx
        .service
        .delete_job(&fx.admin, fx.job.id)
        .expect_err("delete refused");
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let fx = fixture().await;

    let err = fx
        .service
        .delete_user(&fx.admin, fx.admin.id)
        .expect_err("self-delete refused");
    assert!(matches!(err, ApiError::Conflict(_)));

    fx.service
        .delete_user(&fx.admin, fx.reviewer.id)
        .expect("deleting another account works");
}

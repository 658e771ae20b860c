//! Tests for report services.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockNotifier, MockReportRepository, MockUpvoteRepository, MockUserRepository,
    ReportRepositoryError, UpvoteState,
};
use crate::domain::{ErrorCode, GeoPoint, Jurisdiction, Role, User};
use crate::test_support::{fixture_clock, fixture_timestamp, user_with_role};

type Service = ReportService<MockReportRepository, MockUserRepository, MockUpvoteRepository>;

struct Mocks {
    reports: MockReportRepository,
    users: MockUserRepository,
    upvotes: MockUpvoteRepository,
    notifier: MockNotifier,
}

impl Mocks {
    fn into_service(self) -> Service {
        ReportService::new(
            Arc::new(self.reports),
            Arc::new(self.users),
            Arc::new(self.upvotes),
            Arc::new(self.notifier),
            fixture_clock(),
        )
    }
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        reports: MockReportRepository::new(),
        users: MockUserRepository::new(),
        upvotes: MockUpvoteRepository::new(),
        notifier: MockNotifier::new(),
    }
}

fn stored_report(author: &UserId, municipality: &str) -> Report {
    let input = NewReport::new(
        "Broken street light",
        "The light at the junction has been out for a week.",
        GeoPoint::new(27.7, 85.3).expect("coordinates"),
        Jurisdiction::new(municipality, "1").expect("jurisdiction"),
        vec!["uploads/light.jpg".to_owned()],
    )
    .expect("valid report");
    Report::submit(ReportId::random(), author.clone(), input, fixture_timestamp())
}

fn actor_for(user: &User) -> Actor {
    Actor::new(user.id().clone(), user.role())
}

fn expect_account(users: &mut MockUserRepository, user: User) {
    users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(user)));
}

#[rstest]
#[tokio::test]
async fn create_report_persists_a_pending_report(mut mocks: Mocks) {
    mocks.reports.expect_insert().times(1).return_once(|_| Ok(()));
    let author = Actor::new(UserId::random(), Role::User);
    let input = NewReport::new(
        "Pothole",
        "Deep pothole on ring road",
        GeoPoint::new(27.7, 85.3).expect("coordinates"),
        Jurisdiction::new("Kathmandu", "5").expect("jurisdiction"),
        Vec::new(),
    )
    .expect("valid report");

    let report = mocks
        .into_service()
        .create_report(&author, input)
        .await
        .expect("report created");

    assert_eq!(report.author, author.id);
    assert_eq!(report.status, ContentStatus::Pending);
    assert_eq!(report.created_at, fixture_timestamp());
}

#[rstest]
#[tokio::test]
async fn staff_status_change_notifies_author(mut mocks: Mocks) {
    let staff = user_with_role(Role::Municipality, "staff@kathmandu.gov.np");
    let author = UserId::random();
    let report = stored_report(&author, "Kathmandu");
    let id = report.id;

    mocks
        .reports
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(report)));
    expect_account(&mut mocks.users, staff.clone());
    mocks
        .reports
        .expect_update_status()
        .withf(|_, status, _| *status == ContentStatus::InProgress)
        .times(1)
        .return_once(|_, _, _| Ok(true));
    let expected_author = author.clone();
    mocks
        .notifier
        .expect_publish()
        .withf(move |event| {
            matches!(
                event,
                CivicEvent::ReportStatusChanged { author, from: ContentStatus::Pending, to: ContentStatus::InProgress, .. }
                    if *author == expected_author
            )
        })
        .times(1)
        .return_const(());

    let updated = mocks
        .into_service()
        .update_report_status(&actor_for(&staff), id, ContentStatus::InProgress)
        .await
        .expect("status updated");

    assert_eq!(updated.status, ContentStatus::InProgress);
}

#[rstest]
#[tokio::test]
async fn unchanged_status_is_a_silent_no_op(mut mocks: Mocks) {
    let admin = user_with_role(Role::Admin, "admin@communityfix.np");
    let report = stored_report(&UserId::random(), "Lalitpur");
    let id = report.id;

    mocks
        .reports
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(report)));
    expect_account(&mut mocks.users, admin.clone());
    mocks.reports.expect_update_status().times(0);
    mocks.notifier.expect_publish().times(0);

    let unchanged = mocks
        .into_service()
        .update_report_status(&actor_for(&admin), id, ContentStatus::Pending)
        .await
        .expect("no-op succeeds");

    assert_eq!(unchanged.status, ContentStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn staff_cannot_triage_other_municipalities(mut mocks: Mocks) {
    let staff = user_with_role(Role::Municipality, "staff@kathmandu.gov.np");
    let report = stored_report(&UserId::random(), "Bhaktapur");
    let id = report.id;

    mocks
        .reports
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(report)));
    expect_account(&mut mocks.users, staff.clone());
    mocks.reports.expect_update_status().times(0);

    let error = mocks
        .into_service()
        .update_report_status(&actor_for(&staff), id, ContentStatus::Completed)
        .await
        .expect_err("foreign municipality");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn citizens_cannot_change_status(mocks: Mocks) {
    let citizen = Actor::new(UserId::random(), Role::User);

    let error = mocks
        .into_service()
        .update_report_status(&citizen, ReportId::random(), ContentStatus::Completed)
        .await
        .expect_err("citizen rejected");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn only_author_or_admin_may_delete(mut mocks: Mocks) {
    let report = stored_report(&UserId::random(), "Kathmandu");
    let id = report.id;
    mocks
        .reports
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(report)));
    mocks.reports.expect_delete().times(0);

    let error = mocks
        .into_service()
        .delete_report(&Actor::new(UserId::random(), Role::Municipality), id)
        .await
        .expect_err("stranger rejected");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn author_deletes_own_report(mut mocks: Mocks) {
    let author = UserId::random();
    let report = stored_report(&author, "Kathmandu");
    let id = report.id;
    mocks
        .reports
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(report)));
    mocks.reports.expect_delete().times(1).return_once(|_| Ok(true));

    mocks
        .into_service()
        .delete_report(&Actor::new(author, Role::User), id)
        .await
        .expect("author may delete");
}

#[rstest]
#[tokio::test]
async fn get_report_reports_viewer_upvote(mut mocks: Mocks) {
    let report = stored_report(&UserId::random(), "Kathmandu");
    let id = report.id;
    mocks
        .reports
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(report)));
    mocks.upvotes.expect_status().times(1).return_once(|_, _| {
        Ok(UpvoteState {
            count: 3,
            has_upvoted: true,
        })
    });

    let detail = mocks
        .into_service()
        .get_report(Some(UserId::random()), id)
        .await
        .expect("report found");

    assert!(detail.has_user_upvoted);
}

#[rstest]
#[tokio::test]
async fn anonymous_viewers_skip_upvote_lookup(mut mocks: Mocks) {
    let report = stored_report(&UserId::random(), "Kathmandu");
    let id = report.id;
    mocks
        .reports
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(report)));
    mocks.upvotes.expect_status().times(0);

    let detail = mocks
        .into_service()
        .get_report(None, id)
        .await
        .expect("report found");

    assert!(!detail.has_user_upvoted);
}

#[rstest]
#[tokio::test]
async fn missing_report_is_not_found(mut mocks: Mocks) {
    mocks
        .reports
        .expect_find_by_id()
        .return_once(|_| Ok(None));

    let error = mocks
        .into_service()
        .get_report(None, ReportId::random())
        .await
        .expect_err("missing report");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Report not found.");
}

#[rstest]
#[tokio::test]
async fn connection_errors_map_to_service_unavailable(mut mocks: Mocks) {
    mocks
        .reports
        .expect_list()
        .return_once(|_| Err(ReportRepositoryError::connection("refused")));

    let error = mocks
        .into_service()
        .list_reports(ContentFilter::default())
        .await
        .expect_err("connection refused");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

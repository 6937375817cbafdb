//! Integration tests for `SqliteStore` against an in-memory database.

use jangter_core::{
  merchant::{Coordinates, NewMerchant},
  report::{ClosureSignal, ReportStatus},
  review::NewReview,
  store::{DirectoryStore, MerchantQuery, MerchantSort},
  submission::{NewSubmission, SubmissionStatus},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn submission(proposer: Uuid) -> NewSubmission {
  NewSubmission {
    proposer_id: proposer,
    name:        "Halmoni Kimbap".into(),
    address:     "서울 종로구 관철동 1-1".into(),
    category:    Some("분식".into()),
    note:        Some("cash register by the door".into()),
    coords:      None,
  }
}

fn review(merchant_id: Uuid, author: Uuid, rating: u8, voucher_ok: bool) -> NewReview {
  NewReview {
    merchant_id,
    author_id: author,
    content: "paid with a paper voucher, no fuss".into(),
    rating,
    voucher_ok,
    voucher_type: None,
    min_spend: None,
    image_url: None,
  }
}

/// Drive a pending submission across the threshold with `n` fresh users.
async fn confirm_n(s: &SqliteStore, submission_id: Uuid, n: u32) -> Vec<Uuid> {
  let mut users = Vec::new();
  for _ in 0..n {
    let user = Uuid::new_v4();
    s.confirm(user, submission_id).await.unwrap();
    users.push(user);
  }
  users
}

// ─── Policy ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stores_default_to_a_threshold_of_five() {
  let s = store().await;
  assert_eq!(s.quorum().threshold, 5);
}

#[tokio::test]
async fn custom_policy_changes_the_promotion_point() {
  use jangter_core::quorum::QuorumPolicy;

  let s = SqliteStore::open_in_memory_with_policy(QuorumPolicy::new(2))
    .await
    .unwrap();
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();

  let first = s.confirm(Uuid::new_v4(), sub.submission_id).await.unwrap();
  assert!(!first.approved);

  let second = s.confirm(Uuid::new_v4(), sub.submission_id).await.unwrap();
  assert!(second.approved);
  assert_eq!(second.confirmations, 2);
}

// ─── Submissions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_and_get() {
  let s = store().await;

  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();
  assert_eq!(sub.status, SubmissionStatus::Pending);

  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched.submission_id, sub.submission_id);
  assert_eq!(fetched.name, "Halmoni Kimbap");
  assert_eq!(fetched.status, SubmissionStatus::Pending);
  assert!(fetched.coords.is_none());
}

#[tokio::test]
async fn get_submission_missing_returns_none() {
  let s = store().await;
  assert!(s.get_submission(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_submissions_filtered_by_status() {
  let s = store().await;
  let a = s.submit(submission(Uuid::new_v4())).await.unwrap();
  let b = s.submit(submission(Uuid::new_v4())).await.unwrap();
  s.reject_submission(b.submission_id).await.unwrap();

  let pending = s
    .list_submissions(Some(SubmissionStatus::Pending))
    .await
    .unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].submission_id, a.submission_id);

  let all = s.list_submissions(None).await.unwrap();
  assert_eq!(all.len(), 2);
}

// ─── Quorum evaluator ────────────────────────────────────────────────────────

#[tokio::test]
async fn four_confirmations_keep_submission_pending() {
  let s = store().await;
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();

  for i in 0..4 {
    let outcome = s.confirm(Uuid::new_v4(), sub.submission_id).await.unwrap();
    assert!(!outcome.approved);
    assert_eq!(outcome.confirmations, i + 1);
  }

  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, SubmissionStatus::Pending);

  // No merchant was created.
  let page = s.search_merchants(MerchantQuery::default()).await.unwrap();
  assert_eq!(page.total, 0);
}

#[tokio::test]
async fn fifth_confirmation_promotes() {
  let s = store().await;
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();

  confirm_n(&s, sub.submission_id, 4).await;
  let outcome = s.confirm(Uuid::new_v4(), sub.submission_id).await.unwrap();
  assert!(outcome.approved);
  assert_eq!(outcome.confirmations, 5);

  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, SubmissionStatus::Approved);

  // Exactly one merchant, carrying the submission's fields and the
  // ungeocoded sentinel (the submission had no coordinates).
  let page = s.search_merchants(MerchantQuery::default()).await.unwrap();
  assert_eq!(page.total, 1);
  let merchant = &page.merchants[0].merchant;
  assert_eq!(merchant.name, "Halmoni Kimbap");
  assert_eq!(merchant.address, "서울 종로구 관철동 1-1");
  assert_eq!(merchant.category.as_deref(), Some("분식"));
  assert!(merchant.coords.is_ungeocoded());
}

#[tokio::test]
async fn promotion_uses_submission_coordinates_when_present() {
  let s = store().await;
  let mut input = submission(Uuid::new_v4());
  input.coords = Some(Coordinates { lat: 37.5665, lng: 126.978 });
  let sub = s.submit(input).await.unwrap();

  confirm_n(&s, sub.submission_id, 5).await;

  let page = s.search_merchants(MerchantQuery::default()).await.unwrap();
  let merchant = &page.merchants[0].merchant;
  assert_eq!(merchant.coords, Coordinates { lat: 37.5665, lng: 126.978 });
  assert!(!merchant.coords.is_ungeocoded());
}

#[tokio::test]
async fn confirm_unknown_submission_errors() {
  let s = store().await;
  let err = s.confirm(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::SubmissionNotFound(_)));
}

#[tokio::test]
async fn confirm_after_promotion_is_rejected() {
  let s = store().await;
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();
  confirm_n(&s, sub.submission_id, 5).await;

  let err = s.confirm(Uuid::new_v4(), sub.submission_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::SubmissionNotPending(_)));
}

#[tokio::test]
async fn duplicate_confirmation_errors_and_leaves_count() {
  let s = store().await;
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();
  let user = Uuid::new_v4();

  s.confirm(user, sub.submission_id).await.unwrap();
  let err = s.confirm(user, sub.submission_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateConfirmation { .. }));

  let tallies = s
    .confirmation_tallies(vec![sub.submission_id], None)
    .await
    .unwrap();
  assert_eq!(tallies[0].confirmations, 1);
}

#[tokio::test]
async fn self_confirmation_is_rejected_server_side() {
  let s = store().await;
  let proposer = Uuid::new_v4();
  let sub = s.submit(submission(proposer)).await.unwrap();

  let err = s.confirm(proposer, sub.submission_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::SelfConfirmation(_)));

  // The proposer never ends up with a recorded vote.
  let tallies = s
    .confirmation_tallies(vec![sub.submission_id], Some(proposer))
    .await
    .unwrap();
  assert_eq!(tallies[0].confirmations, 0);
  assert!(!tallies[0].viewer_confirmed);
}

#[tokio::test]
async fn unconfirm_removes_the_vote() {
  let s = store().await;
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();
  let user = Uuid::new_v4();

  s.confirm(user, sub.submission_id).await.unwrap();
  s.unconfirm(user, sub.submission_id).await.unwrap();

  let tallies = s
    .confirmation_tallies(vec![sub.submission_id], Some(user))
    .await
    .unwrap();
  assert_eq!(tallies[0].confirmations, 0);
  assert!(!tallies[0].viewer_confirmed);

  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, SubmissionStatus::Pending);

  // The same user can vote again afterwards.
  let outcome = s.confirm(user, sub.submission_id).await.unwrap();
  assert_eq!(outcome.confirmations, 1);
}

#[tokio::test]
async fn unconfirm_without_a_vote_is_a_noop() {
  let s = store().await;
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();

  s.unconfirm(Uuid::new_v4(), sub.submission_id).await.unwrap();

  let tallies = s
    .confirmation_tallies(vec![sub.submission_id], None)
    .await
    .unwrap();
  assert_eq!(tallies[0].confirmations, 0);
}

#[tokio::test]
async fn unconfirm_after_promotion_is_rejected() {
  let s = store().await;
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();
  let users = confirm_n(&s, sub.submission_id, 5).await;

  let err = s.unconfirm(users[0], sub.submission_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::SubmissionNotPending(_)));
}

#[tokio::test]
async fn confirmation_tallies_mark_the_viewer() {
  let s = store().await;
  let sub_a = s.submit(submission(Uuid::new_v4())).await.unwrap();
  let sub_b = s.submit(submission(Uuid::new_v4())).await.unwrap();
  let viewer = Uuid::new_v4();

  s.confirm(viewer, sub_a.submission_id).await.unwrap();
  s.confirm(Uuid::new_v4(), sub_a.submission_id).await.unwrap();

  let tallies = s
    .confirmation_tallies(
      vec![sub_a.submission_id, sub_b.submission_id],
      Some(viewer),
    )
    .await
    .unwrap();

  assert_eq!(tallies[0].confirmations, 2);
  assert!(tallies[0].viewer_confirmed);
  assert_eq!(tallies[1].confirmations, 0);
  assert!(!tallies[1].viewer_confirmed);
}

// ─── Administrative overrides ────────────────────────────────────────────────

#[tokio::test]
async fn admin_approval_promotes_once() {
  let s = store().await;
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();

  let merchant = s.approve_submission(sub.submission_id).await.unwrap();
  assert_eq!(merchant.name, "Halmoni Kimbap");
  assert!(merchant.coords.is_ungeocoded());

  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, SubmissionStatus::Approved);

  let err = s.approve_submission(sub.submission_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::SubmissionNotPending(_)));

  let page = s.search_merchants(MerchantQuery::default()).await.unwrap();
  assert_eq!(page.total, 1);
}

#[tokio::test]
async fn rejection_is_terminal_and_creates_no_merchant() {
  let s = store().await;
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();

  s.reject_submission(sub.submission_id).await.unwrap();

  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, SubmissionStatus::Rejected);

  let err = s.confirm(Uuid::new_v4(), sub.submission_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::SubmissionNotPending(_)));

  let page = s.search_merchants(MerchantQuery::default()).await.unwrap();
  assert_eq!(page.total, 0);
}

#[tokio::test]
async fn deleting_a_submission_cascades_its_confirmations() {
  let s = store().await;
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();
  confirm_n(&s, sub.submission_id, 3).await;

  s.delete_submission(sub.submission_id).await.unwrap();

  assert!(s.get_submission(sub.submission_id).await.unwrap().is_none());
  let tallies = s
    .confirmation_tallies(vec![sub.submission_id], None)
    .await
    .unwrap();
  assert_eq!(tallies[0].confirmations, 0);
}

#[tokio::test]
async fn delete_unknown_submission_errors() {
  let s = store().await;
  let err = s.delete_submission(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::SubmissionNotFound(_)));
}

#[tokio::test]
async fn reconcile_approves_pending_submissions_already_in_directory() {
  let s = store().await;

  // A directory entry exists with the same name and address as a pending
  // submission — the footprint of a half-completed promotion.
  s.add_merchant(NewMerchant {
    name:     "Halmoni Kimbap".into(),
    address:  "서울 종로구 관철동 1-1".into(),
    category: Some("분식".into()),
    coords:   None,
  })
  .await
  .unwrap();
  let sub = s.submit(submission(Uuid::new_v4())).await.unwrap();

  let fixed = s.reconcile_submissions().await.unwrap();
  assert_eq!(fixed, vec![sub.submission_id]);

  let fetched = s.get_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, SubmissionStatus::Approved);

  // No second merchant was created.
  let page = s.search_merchants(MerchantQuery::default()).await.unwrap();
  assert_eq!(page.total, 1);
}

#[tokio::test]
async fn reconcile_with_nothing_to_fix_returns_empty() {
  let s = store().await;
  s.submit(submission(Uuid::new_v4())).await.unwrap();
  assert!(s.reconcile_submissions().await.unwrap().is_empty());
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

async fn merchant_fixture(s: &SqliteStore) -> Uuid {
  s.add_merchant(NewMerchant {
    name:     "Sujebi House".into(),
    address:  "부산 중구 남포동 2-3".into(),
    category: Some("한식".into()),
    coords:   Some(Coordinates { lat: 35.0988, lng: 129.0303 }),
  })
  .await
  .unwrap()
  .merchant_id
}

#[tokio::test]
async fn add_review_and_list_newest_first() {
  let s = store().await;
  let merchant = merchant_fixture(&s).await;

  let first = s.add_review(review(merchant, Uuid::new_v4(), 5, true)).await.unwrap();
  let second = s.add_review(review(merchant, Uuid::new_v4(), 3, false)).await.unwrap();

  let reviews = s.list_reviews(merchant).await.unwrap();
  assert_eq!(reviews.len(), 2);
  let ids: Vec<_> = reviews.iter().map(|r| r.review_id).collect();
  assert!(ids.contains(&first.review_id));
  assert!(ids.contains(&second.review_id));
}

#[tokio::test]
async fn review_stats_aggregate_rating_and_usability() {
  let s = store().await;
  let merchant = merchant_fixture(&s).await;

  s.add_review(review(merchant, Uuid::new_v4(), 5, true)).await.unwrap();
  s.add_review(review(merchant, Uuid::new_v4(), 4, true)).await.unwrap();
  s.add_review(review(merchant, Uuid::new_v4(), 3, false)).await.unwrap();

  let stats = s.review_stats(merchant).await.unwrap();
  assert_eq!(stats.review_count, 3);
  assert_eq!(stats.average_rating, Some(4.0));
  assert_eq!(stats.usable_percent, Some(67));
}

#[tokio::test]
async fn review_stats_for_unreviewed_merchant_are_empty() {
  let s = store().await;
  let merchant = merchant_fixture(&s).await;

  let stats = s.review_stats(merchant).await.unwrap();
  assert_eq!(stats.review_count, 0);
  assert!(stats.average_rating.is_none());
  assert!(stats.usable_percent.is_none());
}

#[tokio::test]
async fn out_of_range_rating_is_rejected_before_writing() {
  let s = store().await;
  let merchant = merchant_fixture(&s).await;

  let err = s
    .add_review(review(merchant, Uuid::new_v4(), 6, true))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(jangter_core::Error::InvalidRating(6))
  ));
  assert!(s.list_reviews(merchant).await.unwrap().is_empty());
}

#[tokio::test]
async fn review_for_unknown_merchant_errors() {
  let s = store().await;
  let err = s
    .add_review(review(Uuid::new_v4(), Uuid::new_v4(), 4, true))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::MerchantNotFound(_)));
}

#[tokio::test]
async fn only_the_author_can_delete_a_review() {
  let s = store().await;
  let merchant = merchant_fixture(&s).await;
  let author = Uuid::new_v4();
  let stranger = Uuid::new_v4();

  let rev = s.add_review(review(merchant, author, 4, true)).await.unwrap();

  let err = s.delete_review(rev.review_id, stranger).await.unwrap_err();
  assert!(matches!(err, crate::Error::NotReviewAuthor(_)));
  assert_eq!(s.list_reviews(merchant).await.unwrap().len(), 1);

  s.delete_review(rev.review_id, author).await.unwrap();
  assert!(s.list_reviews(merchant).await.unwrap().is_empty());
}

// ─── Review likes ────────────────────────────────────────────────────────────

#[tokio::test]
async fn like_unlike_roundtrip() {
  let s = store().await;
  let merchant = merchant_fixture(&s).await;
  let rev = s.add_review(review(merchant, Uuid::new_v4(), 4, true)).await.unwrap();
  let user = Uuid::new_v4();

  s.like_review(user, rev.review_id).await.unwrap();

  let tallies = s.like_tallies(vec![rev.review_id], Some(user)).await.unwrap();
  assert_eq!(tallies[0].likes, 1);
  assert!(tallies[0].viewer_liked);

  let err = s.like_review(user, rev.review_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateLike { .. }));

  s.unlike_review(user, rev.review_id).await.unwrap();
  // A second unlike is a no-op.
  s.unlike_review(user, rev.review_id).await.unwrap();

  let tallies = s.like_tallies(vec![rev.review_id], Some(user)).await.unwrap();
  assert_eq!(tallies[0].likes, 0);
  assert!(!tallies[0].viewer_liked);
}

#[tokio::test]
async fn like_unknown_review_errors() {
  let s = store().await;
  let err = s.like_review(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::ReviewNotFound(_)));
}

// ─── Favorites ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn favorite_roundtrip() {
  let s = store().await;
  let merchant = merchant_fixture(&s).await;
  let user = Uuid::new_v4();

  assert!(!s.is_favorite(user, merchant).await.unwrap());

  s.add_favorite(user, merchant).await.unwrap();
  assert!(s.is_favorite(user, merchant).await.unwrap());

  let favorites = s.list_favorites(user).await.unwrap();
  assert_eq!(favorites.len(), 1);
  assert_eq!(favorites[0].merchant_id, merchant);

  let err = s.add_favorite(user, merchant).await.unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateFavorite { .. }));

  s.remove_favorite(user, merchant).await.unwrap();
  // Removing again changes nothing.
  s.remove_favorite(user, merchant).await.unwrap();
  assert!(!s.is_favorite(user, merchant).await.unwrap());
}

#[tokio::test]
async fn favorite_unknown_merchant_errors() {
  let s = store().await;
  let err = s.add_favorite(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::MerchantNotFound(_)));
}

// ─── Closure reports ─────────────────────────────────────────────────────────

#[tokio::test]
async fn one_report_per_user_per_merchant() {
  let s = store().await;
  let merchant = merchant_fixture(&s).await;
  let reporter = Uuid::new_v4();

  s.report_closure(reporter, merchant, ReportStatus::Closed).await.unwrap();
  let err = s
    .report_closure(reporter, merchant, ReportStatus::Open)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateReport { .. }));

  assert_eq!(s.recent_reports(merchant).await.unwrap().len(), 1);
}

#[tokio::test]
async fn three_closed_reports_classify_as_suspected_closed() {
  let s = store().await;
  let merchant = merchant_fixture(&s).await;

  for _ in 0..2 {
    s.report_closure(Uuid::new_v4(), merchant, ReportStatus::Closed)
      .await
      .unwrap();
  }
  let recent = s.recent_reports(merchant).await.unwrap();
  assert_eq!(ClosureSignal::classify(&recent), ClosureSignal::Reported { count: 2 });

  s.report_closure(Uuid::new_v4(), merchant, ReportStatus::Closed)
    .await
    .unwrap();
  let recent = s.recent_reports(merchant).await.unwrap();
  assert_eq!(ClosureSignal::classify(&recent), ClosureSignal::SuspectedClosed);

  // A fourth report does not change the terminal display tier.
  s.report_closure(Uuid::new_v4(), merchant, ReportStatus::Closed)
    .await
    .unwrap();
  let recent = s.recent_reports(merchant).await.unwrap();
  assert_eq!(ClosureSignal::classify(&recent), ClosureSignal::SuspectedClosed);
}

#[tokio::test]
async fn recent_reports_are_capped_at_the_window() {
  let s = store().await;
  let merchant = merchant_fixture(&s).await;

  for _ in 0..7 {
    s.report_closure(Uuid::new_v4(), merchant, ReportStatus::Open)
      .await
      .unwrap();
  }

  assert_eq!(s.recent_reports(merchant).await.unwrap().len(), 5);
}

#[tokio::test]
async fn report_unknown_merchant_errors() {
  let s = store().await;
  let err = s
    .report_closure(Uuid::new_v4(), Uuid::new_v4(), ReportStatus::Closed)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::MerchantNotFound(_)));
}

// ─── Search ──────────────────────────────────────────────────────────────────

async fn seed_directory(s: &SqliteStore) -> (Uuid, Uuid) {
  let seoul = s
    .add_merchant(NewMerchant {
      name:     "Gwangjang Bindaetteok".into(),
      address:  "서울 종로구 예지동 6-1".into(),
      category: Some("전".into()),
      coords:   None,
    })
    .await
    .unwrap()
    .merchant_id;
  let busan = s
    .add_merchant(NewMerchant {
      name:     "Jagalchi Hoetjip".into(),
      address:  "부산 중구 남포동 37-1".into(),
      category: Some("회".into()),
      coords:   None,
    })
    .await
    .unwrap()
    .merchant_id;
  (seoul, busan)
}

#[tokio::test]
async fn search_by_text_matches_name_and_address() {
  let s = store().await;
  let (seoul, _) = seed_directory(&s).await;

  let page = s
    .search_merchants(MerchantQuery {
      text: Some("Bindaetteok".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.merchants[0].merchant.merchant_id, seoul);

  let page = s
    .search_merchants(MerchantQuery {
      text: Some("남포동".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.total, 1);
}

#[tokio::test]
async fn search_by_region_prefix() {
  let s = store().await;
  let (_, busan) = seed_directory(&s).await;

  let page = s
    .search_merchants(MerchantQuery {
      region: Some("부산".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.merchants[0].merchant.merchant_id, busan);
}

#[tokio::test]
async fn payment_filters_exclude_unverified_merchants() {
  let s = store().await;
  seed_directory(&s).await;

  // Freshly promoted merchants carry no verified payment flags, so a
  // paper-only filter matches nothing until the batch job fills them in.
  let page = s
    .search_merchants(MerchantQuery { paper: true, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.total, 0);
}

#[tokio::test]
async fn search_sorts_by_review_count_by_default() {
  let s = store().await;
  let (seoul, busan) = seed_directory(&s).await;

  s.add_review(review(busan, Uuid::new_v4(), 5, true)).await.unwrap();
  s.add_review(review(busan, Uuid::new_v4(), 4, true)).await.unwrap();
  s.add_review(review(seoul, Uuid::new_v4(), 3, false)).await.unwrap();

  let page = s.search_merchants(MerchantQuery::default()).await.unwrap();
  assert_eq!(page.merchants[0].merchant.merchant_id, busan);
  assert_eq!(page.merchants[0].stats.review_count, 2);
  assert_eq!(page.merchants[1].merchant.merchant_id, seoul);
}

#[tokio::test]
async fn search_sorts_by_name_when_asked() {
  let s = store().await;
  seed_directory(&s).await;

  let page = s
    .search_merchants(MerchantQuery {
      sort: MerchantSort::Name,
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.merchants[0].merchant.name, "Gwangjang Bindaetteok");
  assert_eq!(page.merchants[1].merchant.name, "Jagalchi Hoetjip");
}

#[tokio::test]
async fn search_pagination_reports_the_filtered_total() {
  let s = store().await;
  seed_directory(&s).await;

  let page = s
    .search_merchants(MerchantQuery {
      limit: Some(1),
      offset: Some(0),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.total, 2);
  assert_eq!(page.merchants.len(), 1);

  let second = s
    .search_merchants(MerchantQuery {
      limit: Some(1),
      offset: Some(1),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(second.merchants.len(), 1);
  assert_ne!(
    page.merchants[0].merchant.merchant_id,
    second.merchants[0].merchant.merchant_id
  );
}

#[tokio::test]
async fn search_surfaces_the_closure_signal() {
  let s = store().await;
  let (seoul, _) = seed_directory(&s).await;

  for _ in 0..3 {
    s.report_closure(Uuid::new_v4(), seoul, ReportStatus::Closed)
      .await
      .unwrap();
  }

  let page = s.search_merchants(MerchantQuery::default()).await.unwrap();
  let flagged = page
    .merchants
    .iter()
    .find(|m| m.merchant.merchant_id == seoul)
    .unwrap();
  assert_eq!(flagged.closure, ClosureSignal::SuspectedClosed);
}

//! Store invariants checked against a live Postgres. Run with
//! `cargo test -- --ignored` and `DATABASE_URL` pointing at a scratch server.
use std::str::FromStr;

use sqlx::types::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    accountdb::{AccountExt, NewClient, NewWorker},
    db::DBClient,
    missiondb::{MissionExt, NewMission, TransitionOutcome},
    paymentdb::{PaymentExt, PaymentUpdate},
    ratingdb::{NewRating, RatingExt, SubmittedRating},
};
use crate::models::{
    accountmodel::{ClientType, PartyRole, Principal, CLIENT_FALLBACK_NAME},
    missionmodel::*,
    paymentmodel::PaymentStatus,
};

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

async fn worker(db: &DBClient, email: &str) -> Uuid {
    db.save_worker(NewWorker {
        first_name: "Alex",
        last_name: "Chen",
        age: 19,
        email,
        password_hash: "not-a-real-hash",
        phone: None,
        photo_url: None,
        bio: None,
        location_lat: None,
        location_lng: None,
        skills: &[],
    })
    .await
    .unwrap()
    .id
}

async fn client(db: &DBClient, email: &str, company_name: Option<&str>) -> Uuid {
    db.save_client(NewClient {
        user_type: if company_name.is_some() { ClientType::Company } else { ClientType::Individual },
        company_name,
        email,
        password_hash: "not-a-real-hash",
        phone: None,
        photo_url: None,
        billing_info: None,
    })
    .await
    .unwrap()
    .id
}

async fn mission(db: &DBClient, client_id: Uuid, category: MissionCategory, price: &str) -> Mission {
    let price = dec(price);
    db.create_mission(NewMission {
        client_id,
        title: "Promener mon chien",
        description: "Promenade de 45 minutes",
        category,
        estimated_duration: "45 mins",
        price: &price,
        location: Some("Paris 1er"),
        location_lat: None,
        location_lng: None,
        is_remote: false,
        required_skills: &[],
    })
    .await
    .unwrap()
}

#[sqlx::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn concurrent_accepts_produce_exactly_one_assignment(pool: PgPool) {
    let db = DBClient::new(pool);
    let owner = client(&db, "owner@quicktask.com", None).await;
    let first = worker(&db, "w1@quicktask.com").await;
    let second = worker(&db, "w2@quicktask.com").await;
    let posted = mission(&db, owner, MissionCategory::Pets, "15").await;

    let (a, b) = tokio::join!(
        db.accept_mission(posted.id, first),
        db.accept_mission(posted.id, second)
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let applied = outcomes
        .iter()
        .filter(|o| matches!(o, TransitionOutcome::Applied(_)))
        .count();
    let rejected = outcomes
        .iter()
        .filter(|o| {
            matches!(
                o,
                TransitionOutcome::AlreadyAssigned
                    | TransitionOutcome::MissionConflict(MissionStatus::Assigned)
            )
        })
        .count();

    assert_eq!(applied, 1);
    assert_eq!(rejected, 1);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM mission_assignments WHERE mission_id = $1")
            .bind(posted.id)
            .fetch_one(&db.pool)
            .await
            .unwrap();
    assert_eq!(count, 1);

    let stored = db.get_mission(posted.id).await.unwrap().unwrap();
    assert_eq!(stored.status, MissionStatus::Assigned);
}

#[sqlx::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn accept_on_non_open_mission_changes_nothing(pool: PgPool) {
    let db = DBClient::new(pool);
    let owner = client(&db, "owner@quicktask.com", None).await;
    let worker_id = worker(&db, "w1@quicktask.com").await;
    let posted = mission(&db, owner, MissionCategory::Garden, "30").await;

    assert!(matches!(
        db.cancel_mission(posted.id, owner).await.unwrap(),
        TransitionOutcome::Applied(_)
    ));

    assert!(matches!(
        db.accept_mission(posted.id, worker_id).await.unwrap(),
        TransitionOutcome::MissionConflict(MissionStatus::Cancelled)
    ));
    assert!(db.get_assignment_by_mission(posted.id).await.unwrap().is_none());

    assert!(matches!(
        db.accept_mission(Uuid::new_v4(), worker_id).await.unwrap(),
        TransitionOutcome::MissionNotFound
    ));
}

async fn assignment_count(db: &DBClient, mission_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM mission_assignments WHERE mission_id = $1")
        .bind(mission_id)
        .fetch_one(&db.pool)
        .await
        .unwrap()
}

#[sqlx::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn accept_on_assigned_mission_keeps_the_first_worker(pool: PgPool) {
    let db = DBClient::new(pool);
    let owner = client(&db, "owner@quicktask.com", None).await;
    let first = worker(&db, "w1@quicktask.com").await;
    let second = worker(&db, "w2@quicktask.com").await;
    let posted = mission(&db, owner, MissionCategory::Pets, "15").await;

    assert!(matches!(
        db.accept_mission(posted.id, first).await.unwrap(),
        TransitionOutcome::Applied(_)
    ));

    for worker_id in [second, first] {
        assert!(matches!(
            db.accept_mission(posted.id, worker_id).await.unwrap(),
            TransitionOutcome::MissionConflict(MissionStatus::Assigned)
        ));
    }

    assert_eq!(assignment_count(&db, posted.id).await, 1);
    let assignment = db.get_assignment_by_mission(posted.id).await.unwrap().unwrap();
    assert_eq!(assignment.worker_id, first);
    assert_eq!(assignment.status, AssignmentStatus::Assigned);
}

#[sqlx::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn accept_on_completed_mission_changes_nothing(pool: PgPool) {
    let db = DBClient::new(pool);
    let owner = client(&db, "owner@quicktask.com", None).await;
    let first = worker(&db, "w1@quicktask.com").await;
    let second = worker(&db, "w2@quicktask.com").await;
    let posted = mission(&db, owner, MissionCategory::Cleaning, "20").await;

    db.accept_mission(posted.id, first).await.unwrap();
    assert!(matches!(
        db.complete_mission(posted.id, first, &dec("0.15"), "stripe").await.unwrap(),
        TransitionOutcome::Applied(_)
    ));

    assert!(matches!(
        db.accept_mission(posted.id, second).await.unwrap(),
        TransitionOutcome::MissionConflict(MissionStatus::Completed)
    ));

    assert_eq!(assignment_count(&db, posted.id).await, 1);
    let assignment = db.get_assignment_by_mission(posted.id).await.unwrap().unwrap();
    assert_eq!(assignment.worker_id, first);
    assert_eq!(assignment.status, AssignmentStatus::Completed);
    assert_eq!(
        db.get_mission(posted.id).await.unwrap().unwrap().status,
        MissionStatus::Completed
    );
}

#[sqlx::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn completion_mirrors_status_and_creates_one_payment(pool: PgPool) {
    let db = DBClient::new(pool);
    let owner = client(&db, "owner@quicktask.com", Some("Tech Startup")).await;
    let worker_id = worker(&db, "w1@quicktask.com").await;
    let stranger = worker(&db, "w2@quicktask.com").await;
    let posted = mission(&db, owner, MissionCategory::Digital, "33.33").await;
    let rate = dec("0.15");

    assert!(matches!(
        db.complete_mission(posted.id, worker_id, &rate, "stripe").await.unwrap(),
        TransitionOutcome::AssignmentNotFound
    ));

    db.accept_mission(posted.id, worker_id).await.unwrap();

    assert!(matches!(
        db.complete_mission(posted.id, stranger, &rate, "stripe").await.unwrap(),
        TransitionOutcome::NotAssignee(id) if id == worker_id
    ));

    let TransitionOutcome::Applied(started) = db.start_mission(posted.id, worker_id).await.unwrap() else {
        panic!("start should apply");
    };
    assert_eq!(started.mission.status, MissionStatus::InProgress);
    assert_eq!(started.assignment.status, AssignmentStatus::InProgress);

    let TransitionOutcome::Applied(completed) =
        db.complete_mission(posted.id, worker_id, &rate, "stripe").await.unwrap()
    else {
        panic!("completion should apply");
    };

    assert_eq!(completed.mission.status, MissionStatus::Completed);
    assert_eq!(completed.assignment.status, AssignmentStatus::Completed);
    assert!(completed.assignment.completed_at.is_some());
    assert_eq!(completed.payment.status, PaymentStatus::Pending);
    assert_eq!(completed.payment.amount_total, dec("33.33"));
    assert_eq!(completed.payment.platform_fee, dec("5.00"));
    assert_eq!(completed.payment.amount_to_worker, dec("28.33"));

    let stored_worker = db.get_worker(worker_id).await.unwrap().unwrap();
    assert_eq!(stored_worker.completed_missions, 1);

    assert!(matches!(
        db.complete_mission(posted.id, worker_id, &rate, "stripe").await.unwrap(),
        TransitionOutcome::AssignmentConflict(AssignmentStatus::Completed)
    ));
    assert_eq!(db.get_payments_by_worker(worker_id).await.unwrap().len(), 1);
    assert_eq!(db.get_worker(worker_id).await.unwrap().unwrap().completed_missions, 1);
}

#[sqlx::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn payment_settlement_follows_its_edges(pool: PgPool) {
    let db = DBClient::new(pool);
    let owner = client(&db, "owner@quicktask.com", None).await;
    let other = client(&db, "other@quicktask.com", None).await;
    let worker_id = worker(&db, "w1@quicktask.com").await;
    let posted = mission(&db, owner, MissionCategory::Moving, "45.50").await;

    db.accept_mission(posted.id, worker_id).await.unwrap();
    db.complete_mission(posted.id, worker_id, &dec("0.15"), "stripe")
        .await
        .unwrap();
    let payment = db.get_payments_by_client(owner).await.unwrap().remove(0);
    assert_eq!(payment.mission_id, posted.id);
    assert_eq!(db.get_payment(payment.id).await.unwrap(), Some(payment.clone()));

    assert!(matches!(
        db.update_payment_status(payment.id, other, PaymentStatus::Held, None).await.unwrap(),
        PaymentUpdate::NotOwner
    ));
    assert!(matches!(
        db.update_payment_status(payment.id, owner, PaymentStatus::Released, None).await.unwrap(),
        PaymentUpdate::InvalidTransition(PaymentStatus::Pending)
    ));

    let PaymentUpdate::Applied(held) = db
        .update_payment_status(payment.id, owner, PaymentStatus::Held, Some("pi_123"))
        .await
        .unwrap()
    else {
        panic!("pending -> held should apply");
    };
    assert_eq!(held.status, PaymentStatus::Held);
    assert_eq!(held.transaction_id.as_deref(), Some("pi_123"));

    let PaymentUpdate::Applied(released) = db
        .update_payment_status(payment.id, owner, PaymentStatus::Released, None)
        .await
        .unwrap()
    else {
        panic!("held -> released should apply");
    };
    assert_eq!(released.transaction_id.as_deref(), Some("pi_123"));
}

#[sqlx::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn worker_rating_is_the_mean_of_everything_received(pool: PgPool) {
    let db = DBClient::new(pool);
    let owner = client(&db, "owner@quicktask.com", None).await;
    let worker_id = worker(&db, "w1@quicktask.com").await;
    let posted = mission(&db, owner, MissionCategory::Cleaning, "20").await;

    assert_eq!(db.find_party(worker_id).await.unwrap(), Some(PartyRole::Worker));
    assert_eq!(db.find_party(owner).await.unwrap(), Some(PartyRole::Client));
    assert_eq!(db.find_party(Uuid::new_v4()).await.unwrap(), None);

    let mut last = None;
    for stars in [5, 3, 4] {
        last = db
            .submit_rating(NewRating {
                mission_id: posted.id,
                rater: Principal::Client(owner),
                rated: Principal::Worker(worker_id),
                stars,
                comment: None,
            })
            .await
            .unwrap()
            .aggregate;
    }
    assert_eq!(last.map(|a| a.mean()), Some(4.0));
    assert_eq!(db.get_worker(worker_id).await.unwrap().unwrap().rating, 4.0);

    db.submit_rating(NewRating {
        mission_id: posted.id,
        rater: Principal::Client(owner),
        rated: Principal::Worker(worker_id),
        stars: 2,
        comment: Some("En retard"),
    })
    .await
    .unwrap();
    assert_eq!(db.get_worker(worker_id).await.unwrap().unwrap().rating, 3.5);

    let client_rating = db
        .submit_rating(NewRating {
            mission_id: posted.id,
            rater: Principal::Worker(worker_id),
            rated: Principal::Client(owner),
            stars: 5,
            comment: None,
        })
        .await
        .unwrap();
    assert!(client_rating.aggregate.is_none());

    assert_eq!(db.get_ratings_for_user(worker_id).await.unwrap().len(), 4);
    assert_eq!(db.get_ratings_for_mission(posted.id).await.unwrap().len(), 5);
}

async fn rate_worker(
    db: &DBClient,
    mission_id: Uuid,
    rater: Uuid,
    worker_id: Uuid,
    stars: i32,
) -> Result<SubmittedRating, sqlx::Error> {
    db.submit_rating(NewRating {
        mission_id,
        rater: Principal::Client(rater),
        rated: Principal::Worker(worker_id),
        stars,
        comment: None,
    })
    .await
}

#[sqlx::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn concurrent_ratings_of_one_worker_are_all_counted(pool: PgPool) {
    let db = DBClient::new(pool);
    let first = client(&db, "c1@quicktask.com", None).await;
    let second = client(&db, "c2@quicktask.com", None).await;
    let third = client(&db, "c3@quicktask.com", None).await;
    let fourth = client(&db, "c4@quicktask.com", None).await;
    let worker_id = worker(&db, "w1@quicktask.com").await;
    let posted = mission(&db, first, MissionCategory::Pets, "15").await;

    let (a, b, c, d) = tokio::join!(
        rate_worker(&db, posted.id, first, worker_id, 5),
        rate_worker(&db, posted.id, second, worker_id, 3),
        rate_worker(&db, posted.id, third, worker_id, 4),
        rate_worker(&db, posted.id, fourth, worker_id, 2)
    );
    for submitted in [a, b, c, d] {
        assert!(submitted.unwrap().aggregate.is_some());
    }

    assert_eq!(db.get_ratings_for_user(worker_id).await.unwrap().len(), 4);
    assert_eq!(db.get_worker(worker_id).await.unwrap().unwrap().rating, 3.5);
}

#[sqlx::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn listing_filters_and_joins_client_summary(pool: PgPool) {
    let db = DBClient::new(pool);
    let company = client(&db, "company@quicktask.com", Some("Tech Startup")).await;
    let person = client(&db, "person@quicktask.com", None).await;

    let pets = mission(&db, company, MissionCategory::Pets, "15").await;
    let garden = mission(&db, person, MissionCategory::Garden, "30").await;
    let digital = mission(&db, person, MissionCategory::Digital, "80").await;
    db.cancel_mission(digital.id, person).await.unwrap();

    let all = db.list_missions(&MissionFilter::default(), CLIENT_FALLBACK_NAME).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].mission.id, digital.id);

    let open = MissionFilter {
        status: Some(MissionStatus::Open),
        category: None,
    };
    let listed = db.list_missions(&open, CLIENT_FALLBACK_NAME).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|m| open.matches(&m.mission)));

    let open_pets = MissionFilter {
        status: Some(MissionStatus::Open),
        category: Some(MissionCategory::Pets),
    };
    let listed = db.list_missions(&open_pets, CLIENT_FALLBACK_NAME).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].mission.id, pets.id);
    assert_eq!(listed[0].client.name, "Tech Startup");

    let detail = db
        .get_mission_with_client(garden.id, CLIENT_FALLBACK_NAME)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.client.name, CLIENT_FALLBACK_NAME);
    assert_eq!(detail.client.email, "person@quicktask.com");

    // Reads do not change anything.
    let again = db.list_missions(&MissionFilter::default(), CLIENT_FALLBACK_NAME).await.unwrap();
    assert_eq!(
        again.iter().map(|m| m.mission.id).collect::<Vec<_>>(),
        all.iter().map(|m| m.mission.id).collect::<Vec<_>>()
    );

    let owned = db.get_missions_by_client(person).await.unwrap();
    assert_eq!(owned.iter().map(|m| m.id).collect::<Vec<_>>(), vec![digital.id, garden.id]);
}

#[sqlx::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn worker_assignments_embed_their_mission(pool: PgPool) {
    let db = DBClient::new(pool);
    let owner = client(&db, "owner@quicktask.com", None).await;
    let worker_id = worker(&db, "w1@quicktask.com").await;
    let first = mission(&db, owner, MissionCategory::Pets, "15").await;
    let second = mission(&db, owner, MissionCategory::Handyman, "60").await;

    db.accept_mission(first.id, worker_id).await.unwrap();
    db.accept_mission(second.id, worker_id).await.unwrap();

    let assignments = db.get_assignments_by_worker(worker_id).await.unwrap();
    assert_eq!(assignments.len(), 2);
    assert_eq!(assignments[0].assignment.mission_id, second.id);
    assert_eq!(
        assignments[0].mission.as_ref().map(|m| m.status),
        Some(MissionStatus::Assigned)
    );
    assert!(db.get_assignments_by_worker(Uuid::new_v4()).await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn sessions_round_trip_and_expire(pool: PgPool) {
    let db = DBClient::new(pool);
    let worker_id = worker(&db, "w1@quicktask.com").await;

    let live = db
        .create_session(Principal::Worker(worker_id), chrono::Utc::now() + chrono::Duration::hours(1))
        .await
        .unwrap();
    let stale = db
        .create_session(Principal::Worker(worker_id), chrono::Utc::now() - chrono::Duration::hours(1))
        .await
        .unwrap();

    let fetched = db.get_session(live.id).await.unwrap().unwrap();
    assert_eq!(fetched.principal(), Some(Principal::Worker(worker_id)));

    assert_eq!(db.delete_expired_sessions().await.unwrap(), 1);
    assert!(db.get_session(stale.id).await.unwrap().is_none());

    assert_eq!(db.delete_session(live.id).await.unwrap(), 1);
    assert_eq!(db.delete_session(live.id).await.unwrap(), 0);
}

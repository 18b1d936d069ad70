mod helpers;

use chrono::{Duration, Utc};
use evenly_backend::error::AppError;
use evenly_backend::models::*;
use evenly_backend::services::group_service::GroupUpdate;
use evenly_backend::store::Table;
use evenly_backend::AppState;
use helpers::*;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_register_and_lookup() {
    let app = TestApp::new();
    let alice = app.user("Alice@Example.com", "Alice").await;

    assert_eq!(alice.email, "alice@example.com");
    assert_eq!(alice.credit_score, None);

    let by_email = assert_ok!(app.state.users.get_by_email("ALICE@example.com").await);
    assert_eq!(by_email.id, alice.id);

    let by_firebase = assert_ok!(
        app.state
            .users
            .get_by_firebase_id(Some(&alice.firebase_id))
            .await
    );
    assert_eq!(by_firebase.id, alice.id);

    let all = assert_ok!(app.state.users.list_all(Some(10)).await);
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_list_all_limit_keeps_oldest() {
    let app = TestApp::new();
    let now = Utc::now();

    for (email, days_ago) in [("new@example.com", 1), ("old@example.com", 30), ("mid@example.com", 10)] {
        let mut user = User::new(email.to_string(), firebase_id(email), None);
        user.date_joined = now - Duration::days(days_ago);
        assert_ok!(app.user_repo.create(&user).await);
    }

    let oldest = assert_ok!(app.state.users.list_all(Some(2)).await);
    let emails: Vec<&str> = oldest.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["old@example.com", "mid@example.com"]);
}

#[tokio::test]
async fn test_register_duplicate_is_conflict() {
    let app = TestApp::new();
    app.user("alice@example.com", "Alice").await;

    let err = assert_err!(
        app.state
            .users
            .register(Some("alice@example.com"), Some("another-firebase-id"), None)
            .await
    );
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_register_requires_fields() {
    let app = TestApp::new();

    let err = assert_err!(app.state.users.register(None, Some("fb"), None).await);
    assert!(matches!(err, AppError::Validation(_)));

    let err = assert_err!(
        app.state
            .users
            .register(Some("bob@example.com"), Some("  "), None)
            .await
    );
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_update_name() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;

    let updated = assert_ok!(
        app.state
            .users
            .update_name(Some(&alice.firebase_id), Some("Alice Liddell"))
            .await
    );
    assert_eq!(updated.name.as_deref(), Some("Alice Liddell"));

    let err = assert_err!(
        app.state
            .users
            .update_name(Some("unknown"), Some("Nobody"))
            .await
    );
    assert!(err.is_not_found());
}

// ---------------------------------------------------------------------------
// Friends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_friend_request_lifecycle() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;
    let friends = &app.state.friends;

    let sent = assert_ok!(
        friends
            .send_request(Some("alice@example.com"), Some("bob@example.com"))
            .await
    );
    assert_eq!(sent.from_user, alice.id);
    assert_eq!(sent.to_user, bob.id);
    assert!(!sent.request_completed);

    // Sending again returns the same request
    let again = assert_ok!(
        friends
            .send_request(Some("alice@example.com"), Some("bob@example.com"))
            .await
    );
    assert_eq!(again.id, sent.id);

    let incoming = assert_ok!(friends.incoming(Some("bob@example.com")).await);
    assert_eq!(incoming.len(), 1);
    let outgoing = assert_ok!(friends.outgoing(Some("alice@example.com")).await);
    assert_eq!(outgoing.len(), 1);

    let accepted = assert_ok!(
        friends
            .accept(Some("alice@example.com"), Some("bob@example.com"))
            .await
    );
    assert!(accepted.request_completed);

    let bobs_friends = assert_ok!(friends.friends(Some("bob@example.com")).await);
    assert_eq!(bobs_friends.len(), 1);
    assert_eq!(bobs_friends[0].id, alice.id);

    let completed = assert_ok!(
        friends
            .requests_for(Some("alice@example.com"), Some("completed"))
            .await
    );
    assert_eq!(completed.len(), 1);
    let pending = assert_ok!(
        friends
            .requests_for(Some("alice@example.com"), Some("pending"))
            .await
    );
    assert!(pending.is_empty());

    // Nothing left to accept
    let err = assert_err!(
        friends
            .accept(Some("alice@example.com"), Some("bob@example.com"))
            .await
    );
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_friend_request_errors() {
    let app = TestApp::new();
    app.user("alice@example.com", "Alice").await;
    app.user("bob@example.com", "Bob").await;
    let friends = &app.state.friends;

    let err = assert_err!(
        friends
            .send_request(Some("alice@example.com"), Some("alice@example.com"))
            .await
    );
    assert!(matches!(err, AppError::Validation(_)));

    let err = assert_err!(
        friends
            .send_request(Some("alice@example.com"), Some("ghost@example.com"))
            .await
    );
    assert!(err.is_not_found());

    let err = assert_err!(
        friends
            .requests_for(Some("alice@example.com"), Some("bogus"))
            .await
    );
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_reject_deletes_request() {
    let app = TestApp::new();
    app.user("alice@example.com", "Alice").await;
    app.user("bob@example.com", "Bob").await;
    let friends = &app.state.friends;

    assert_ok!(
        friends
            .send_request(Some("alice@example.com"), Some("bob@example.com"))
            .await
    );
    assert_ok!(
        friends
            .reject(Some("alice@example.com"), Some("bob@example.com"))
            .await
    );

    assert_eq!(app.store.len(&app.names.get(Table::FriendRequests)).await, 0);
    let incoming = assert_ok!(friends.incoming(Some("bob@example.com")).await);
    assert!(incoming.is_empty());
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_group_creation_adds_creator_as_member() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let groups = &app.state.groups;

    let group = assert_ok!(
        groups
            .create_group(Some("Trip"), Some("Lisbon"), Some(&alice.firebase_id), Some(dec(500)))
            .await
    );
    assert_eq!(group.created_by, alice.id);
    assert_eq!(group.total_budget, Some(dec(500)));

    let members = assert_ok!(groups.members(group.id).await);
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, alice.id);

    let mine = assert_ok!(groups.user_groups(Some(&alice.firebase_id)).await);
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].group.id, group.id);

    let created = assert_ok!(groups.groups_created_by(Some(&alice.firebase_id)).await);
    assert_eq!(created.len(), 1);
}

#[tokio::test]
async fn test_group_membership_rules() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;
    let carol = app.user("carol@example.com", "Carol").await;
    let groups = &app.state.groups;

    let group = assert_ok!(
        groups
            .create_group(Some("Flat"), None, Some(&alice.firebase_id), None)
            .await
    );

    // Outsiders cannot add members
    let err = assert_err!(
        groups
            .add_member(group.id, Some(&carol.firebase_id), Some("bob@example.com"))
            .await
    );
    assert!(matches!(err, AppError::Forbidden(_)));

    let member = assert_ok!(
        groups
            .add_member(group.id, Some(&alice.firebase_id), Some("bob@example.com"))
            .await
    );
    assert_eq!(member.user_id, bob.id);

    let err = assert_err!(
        groups
            .add_member(group.id, Some(&alice.firebase_id), Some("bob@example.com"))
            .await
    );
    assert!(matches!(err, AppError::Conflict(_)));

    // Members may leave on their own
    assert_ok!(
        groups
            .remove_member(group.id, Some(&bob.firebase_id), Some("bob@example.com"))
            .await
    );
    let err = assert_err!(
        groups
            .remove_member(group.id, Some(&alice.firebase_id), Some("bob@example.com"))
            .await
    );
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_group_update_and_delete_are_creator_only() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;
    let groups = &app.state.groups;

    let group = assert_ok!(
        groups
            .create_group(Some("Flat"), None, Some(&alice.firebase_id), None)
            .await
    );
    assert_ok!(
        groups
            .add_member(group.id, Some(&alice.firebase_id), Some("bob@example.com"))
            .await
    );

    let err = assert_err!(
        groups
            .update_group(
                group.id,
                Some(&bob.firebase_id),
                GroupUpdate {
                    name: Some("Mine now".to_string()),
                    ..GroupUpdate::default()
                },
            )
            .await
    );
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = assert_err!(
        groups
            .update_group(group.id, Some(&alice.firebase_id), GroupUpdate::default())
            .await
    );
    assert!(matches!(err, AppError::Validation(_)));

    let updated = assert_ok!(
        groups
            .update_group(
                group.id,
                Some(&alice.firebase_id),
                GroupUpdate {
                    name: Some("Flat 2B".to_string()),
                    total_budget: Some(dec(1200)),
                    ..GroupUpdate::default()
                },
            )
            .await
    );
    assert_eq!(updated.name, "Flat 2B");
    assert_eq!(updated.total_budget, Some(dec(1200)));

    let err = assert_err!(groups.delete_group(group.id, Some(&bob.firebase_id)).await);
    assert!(matches!(err, AppError::Forbidden(_)));

    assert_ok!(groups.delete_group(group.id, Some(&alice.firebase_id)).await);
    assert_eq!(app.store.len(&app.names.get(Table::GroupMemberships)).await, 0);
    let err = assert_err!(groups.get_group(group.id).await);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_group_notification() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;

    let group = assert_ok!(
        app.state
            .groups
            .create_group(Some("Ski week"), None, Some(&alice.firebase_id), None)
            .await
    );
    let notification = assert_ok!(
        app.state
            .groups
            .notify_added(Some("bob@example.com"), Some(group.id))
            .await
    );
    assert_eq!(notification.user_id, bob.id);
    assert_eq!(notification.message, "You have been added to a new group: Ski week");

    let unprocessed = assert_ok!(
        app.state
            .notifications
            .unprocessed(Some(&bob.firebase_id))
            .await
    );
    assert_eq!(unprocessed.len(), 1);

    let processed = assert_ok!(app.state.notifications.mark_processed(notification.id).await);
    assert!(processed.processed);

    let unprocessed = assert_ok!(
        app.state
            .notifications
            .unprocessed(Some(&bob.firebase_id))
            .await
    );
    assert!(unprocessed.is_empty());

    let err = assert_err!(app.state.notifications.mark_processed(missing_id()).await);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_notification_insert() {
    let app = TestApp::new();
    let bob = app.user("bob@example.com", "Bob").await;

    let inserted = assert_ok!(app.state.notifications.insert(bob.id, "Hello").await);
    assert!(!inserted.processed);

    let err = assert_err!(app.state.notifications.insert(bob.id, "   ").await);
    assert!(matches!(err, AppError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Expenses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_expense_skips_unknown_split_users() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;

    let created = assert_ok!(
        app.state
            .expenses
            .create_expense(evenly_backend::services::expense_service::NewExpense {
                title: Some("Dinner".to_string()),
                total_amount: Some(dec(90)),
                firebase_id: Some(alice.firebase_id.clone()),
                splits: vec![
                    evenly_backend::services::expense_service::SplitInput {
                        user_email: Some("bob@example.com".to_string()),
                        amount_owed: Some(dec(30)),
                    },
                    evenly_backend::services::expense_service::SplitInput {
                        user_email: Some("ghost@example.com".to_string()),
                        amount_owed: Some(dec(30)),
                    },
                    evenly_backend::services::expense_service::SplitInput {
                        user_email: None,
                        amount_owed: Some(dec(30)),
                    },
                ],
                ..Default::default()
            })
            .await
    );

    assert_eq!(created.splits.len(), 1);
    assert_eq!(created.splits[0].user_id, bob.id);
    assert_eq!(created.splits[0].state(), PaymentState::Unrequested);
}

#[tokio::test]
async fn test_create_expense_validation() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let expenses = &app.state.expenses;

    let err = assert_err!(
        expenses
            .create_expense(evenly_backend::services::expense_service::NewExpense {
                title: Some("Free lunch".to_string()),
                total_amount: Some(dec(0)),
                firebase_id: Some(alice.firebase_id.clone()),
                ..Default::default()
            })
            .await
    );
    assert!(matches!(err, AppError::Validation(_)));

    let err = assert_err!(
        expenses
            .create_expense(evenly_backend::services::expense_service::NewExpense {
                title: Some("Lunch".to_string()),
                total_amount: Some(dec(10)),
                firebase_id: Some(alice.firebase_id.clone()),
                group_id: Some(missing_id()),
                ..Default::default()
            })
            .await
    );
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_group_expense_decrements_budget() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    app.user("bob@example.com", "Bob").await;

    let group = assert_ok!(
        app.state
            .groups
            .create_group(Some("Trip"), None, Some(&alice.firebase_id), Some(dec(500)))
            .await
    );

    assert_ok!(
        app.state
            .expenses
            .create_expense(evenly_backend::services::expense_service::NewExpense {
                title: Some("Hotel".to_string()),
                total_amount: Some(dec(120)),
                firebase_id: Some(alice.firebase_id.clone()),
                group_id: Some(group.id),
                due_date: Some("2026-11-01".to_string()),
                splits: vec![evenly_backend::services::expense_service::SplitInput {
                    user_email: Some("bob@example.com".to_string()),
                    amount_owed: Some(dec(60)),
                }],
                ..Default::default()
            })
            .await
    );

    let details = assert_ok!(app.state.groups.get_group(group.id).await);
    assert_eq!(details.group.total_budget, Some(dec(380)));

    let group_expenses = assert_ok!(app.state.expenses.group_expenses(group.id).await);
    assert_eq!(group_expenses.len(), 1);
    assert!(group_expenses[0].expense.due_date.is_some());
}

#[tokio::test]
async fn test_expense_creator_only_operations() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;
    app.user("carol@example.com", "Carol").await;
    let (expense, _) = app.expense(&alice, "Groceries", dec(40), &[(&bob, dec(20))]).await;
    let expenses = &app.state.expenses;

    let err = assert_err!(
        expenses
            .add_split(expense.id, Some(&bob.firebase_id), Some("carol@example.com"), Some(dec(10)))
            .await
    );
    assert!(matches!(err, AppError::Forbidden(_)));

    let split = assert_ok!(
        expenses
            .add_split(expense.id, Some(&alice.firebase_id), Some("carol@example.com"), Some(dec(10)))
            .await
    );
    assert_eq!(split.expense_id, expense.id);

    let err = assert_err!(
        expenses
            .update_expense(
                expense.id,
                Some(&alice.firebase_id),
                evenly_backend::services::expense_service::ExpenseUpdate::default(),
            )
            .await
    );
    assert!(matches!(err, AppError::Validation(_)));

    let updated = assert_ok!(
        expenses
            .update_expense(
                expense.id,
                Some(&alice.firebase_id),
                evenly_backend::services::expense_service::ExpenseUpdate {
                    title: Some("Weekly groceries".to_string()),
                    ..Default::default()
                },
            )
            .await
    );
    assert_eq!(updated.title, "Weekly groceries");

    let err = assert_err!(expenses.delete_expense(expense.id, Some(&bob.firebase_id)).await);
    assert!(matches!(err, AppError::Forbidden(_)));

    assert_ok!(expenses.delete_expense(expense.id, Some(&alice.firebase_id)).await);
    assert_eq!(app.store.len(&app.names.get(Table::Splits)).await, 0);
    let err = assert_err!(expenses.get_expense(expense.id).await);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_dashboard_totals() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;

    app.expense(&alice, "Dinner", dec(100), &[(&bob, dec(50))]).await;
    app.expense(&bob, "Taxi", dec(30), &[(&alice, dec(15))]).await;

    let dashboard = assert_ok!(app.state.expenses.dashboard(alice.id).await);
    assert_eq!(dashboard.lent.total_amount, dec(100));
    assert_eq!(dashboard.lent.expenses.len(), 1);
    assert_eq!(dashboard.owed.total_amount, dec(15));
    assert_eq!(dashboard.owed.splits.len(), 1);
    assert_eq!(dashboard.net.total_amount, dec(85));

    let owed = &dashboard.owed.splits[0];
    assert_eq!(owed.expense.title, "Taxi");
    assert_eq!(owed.expense.lender.as_ref().map(|l| l.id), Some(bob.id));

    let all = assert_ok!(app.state.expenses.user_expenses(alice.id).await);
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_expense_without_splits_counts_as_open() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;

    app.expense(&alice, "Solo", dec(10), &[]).await;

    let lent = assert_ok!(app.state.expenses.lent_expenses(alice.id).await);
    assert_eq!(lent.len(), 1);
    assert!(!lent[0].is_fully_paid());
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_payment_happy_path_refreshes_credit_score() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;
    let (expense, splits) = app.expense(&alice, "Dinner", dec(60), &[(&bob, dec(30))]).await;
    let split = &splits[0];
    let payments = &app.state.payments;

    let requested = assert_ok!(payments.request_payment(split.id, Some(&bob.firebase_id)).await);
    assert_eq!(requested.state(), PaymentState::Requested);

    let pending = assert_ok!(payments.pending_requests(Some(&alice.firebase_id)).await);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].debtor.id, bob.id);
    assert_eq!(pending[0].expense.id, expense.id);

    let confirmed = assert_ok!(payments.confirm_payment(split.id, Some(&alice.firebase_id)).await);
    assert_eq!(confirmed.state(), PaymentState::Confirmed);

    let pending = assert_ok!(payments.pending_requests(Some(&alice.firebase_id)).await);
    assert!(pending.is_empty());

    let score = assert_ok!(app.state.credit_scores.get_user_credit_score(bob.id).await);
    let score = score.credit_score.expect("score set after confirmation");
    assert!((MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&score));

    // Fully paid expenses drop off the lender's open list
    let lent = assert_ok!(app.state.expenses.lent_expenses(alice.id).await);
    assert!(lent.is_empty());
}

#[tokio::test]
async fn test_payment_identity_checks() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;
    let carol = app.user("carol@example.com", "Carol").await;
    let (_, splits) = app.expense(&alice, "Dinner", dec(60), &[(&bob, dec(30))]).await;
    let split = &splits[0];
    let payments = &app.state.payments;

    // Only the debtor requests
    let err = assert_err!(payments.request_payment(split.id, Some(&alice.firebase_id)).await);
    assert!(matches!(err, AppError::Forbidden(_)));

    assert_ok!(payments.request_payment(split.id, Some(&bob.firebase_id)).await);

    // Only the lender confirms or rejects
    let err = assert_err!(payments.confirm_payment(split.id, Some(&bob.firebase_id)).await);
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = assert_err!(payments.reject_payment(split.id, Some(&carol.firebase_id)).await);
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = assert_err!(payments.request_payment(missing_id(), Some(&bob.firebase_id)).await);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_payment_state_conflicts() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;
    let (_, splits) = app.expense(&alice, "Dinner", dec(60), &[(&bob, dec(30))]).await;
    let split = &splits[0];
    let payments = &app.state.payments;

    // Cannot confirm or reject before a request
    let err = assert_err!(payments.confirm_payment(split.id, Some(&alice.firebase_id)).await);
    assert!(matches!(err, AppError::Conflict(_)));
    let err = assert_err!(payments.reject_payment(split.id, Some(&alice.firebase_id)).await);
    assert!(matches!(err, AppError::Conflict(_)));

    assert_ok!(payments.request_payment(split.id, Some(&bob.firebase_id)).await);
    let err = assert_err!(payments.request_payment(split.id, Some(&bob.firebase_id)).await);
    assert!(matches!(err, AppError::Conflict(_)));

    // Reject sends the split back to unrequested
    let rejected = assert_ok!(payments.reject_payment(split.id, Some(&alice.firebase_id)).await);
    assert_eq!(rejected.state(), PaymentState::Unrequested);
    assert_eq!(rejected.paid_request, None);

    assert_ok!(payments.request_payment(split.id, Some(&bob.firebase_id)).await);
    assert_ok!(payments.confirm_payment(split.id, Some(&alice.firebase_id)).await);

    let err = assert_err!(payments.request_payment(split.id, Some(&bob.firebase_id)).await);
    assert!(matches!(err, AppError::Conflict(_)));
    let err = assert_err!(payments.confirm_payment(split.id, Some(&alice.firebase_id)).await);
    assert!(matches!(err, AppError::Conflict(_)));
}

// ---------------------------------------------------------------------------
// Credit scores
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_credit_score_without_history() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;

    let score = assert_ok!(
        app.state
            .credit_scores
            .calculate_user_credit_score(alice.id)
            .await
    );
    assert_eq!(score, None);

    let update = assert_ok!(app.state.credit_scores.update_user_credit_score(alice.id).await);
    assert_eq!(update.credit_score, None);
    assert_eq!(update.message, "No payment history");

    let err = assert_err!(app.state.credit_scores.update_user_credit_score(missing_id()).await);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_on_time_history_maxes_payment_history_factor() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;

    let due = Utc::now() - Duration::days(20);
    for days_late in [0, 3, 7] {
        app.settled_split(&alice, &bob, dec(25), Some(due), Some(due + Duration::days(days_late)))
            .await;
    }

    let breakdown = assert_ok!(app.state.credit_scores.calculate_breakdown(bob.id).await)
        .expect("history present");
    assert_eq!(breakdown.payment_history, 100.0);
    assert!((MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&breakdown.credit_score));
}

#[tokio::test]
async fn test_late_history_scores_lower() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let punctual = app.user("bob@example.com", "Bob").await;
    let late = app.user("carol@example.com", "Carol").await;

    let due = Utc::now() - Duration::days(60);
    for _ in 0..3 {
        app.settled_split(&alice, &punctual, dec(25), Some(due), Some(due + Duration::days(1)))
            .await;
        app.settled_split(&alice, &late, dec(25), Some(due), Some(due + Duration::days(40)))
            .await;
    }

    let punctual_score = assert_ok!(
        app.state
            .credit_scores
            .calculate_user_credit_score(punctual.id)
            .await
    )
    .expect("history present");
    let late_score = assert_ok!(
        app.state
            .credit_scores
            .calculate_user_credit_score(late.id)
            .await
    )
    .expect("history present");

    assert!(punctual_score > late_score);
}

#[tokio::test]
async fn test_batch_update_summary_counts() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;
    app.user("carol@example.com", "Carol").await;

    let due = Utc::now() - Duration::days(10);
    app.settled_split(&alice, &bob, dec(40), Some(due), Some(due)).await;

    let summary = assert_ok!(app.state.credit_scores.update_all_credit_scores().await);
    assert_eq!(summary.total_users, 3);
    assert_eq!(summary.failed_users, 0);
    assert_eq!(summary.users_with_scores, 1);
    assert_eq!(summary.users_without_history, 2);
    assert_eq!(
        summary.updated_users,
        summary.users_with_scores + summary.users_without_history
    );
    assert_eq!(summary.updated_users + summary.failed_users, summary.total_users);

    let leaderboard = assert_ok!(app.state.credit_scores.leaderboard(None).await);
    assert_eq!(leaderboard.total_users, 1);
    assert_eq!(leaderboard.leaderboard[0].rank, 1);
    assert_eq!(leaderboard.leaderboard[0].user_id, bob.id);

    let stats = assert_ok!(app.state.credit_scores.stats().await);
    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.users_with_scores, 1);
    assert_eq!(stats.users_without_scores, 2);
    assert!(stats.average_score.is_some());
}

#[tokio::test]
async fn test_batch_update_counts_failed_users() {
    let app = TestApp::new();
    let alice = app.user("alice@example.com", "Alice").await;
    let bob = app.user("bob@example.com", "Bob").await;
    let carol = app.user("carol@example.com", "Carol").await;

    let due = Utc::now() - Duration::days(10);
    app.settled_split(&alice, &bob, dec(40), Some(due), Some(due)).await;
    app.settled_split(&alice, &carol, dec(25), Some(due), Some(due)).await;

    let store = Arc::new(FailingUpdates::new(app.store.clone(), carol.id));
    let state = AppState::new(store, &app.names);

    let summary = assert_ok!(state.credit_scores.update_all_credit_scores().await);
    assert_eq!(summary.total_users, 3);
    assert_eq!(summary.failed_users, 1);
    assert_eq!(summary.users_with_scores, 1);
    assert_eq!(summary.users_without_history, 1);
    assert_eq!(
        summary.updated_users,
        summary.users_with_scores + summary.users_without_history
    );
    assert_eq!(summary.updated_users + summary.failed_users, summary.total_users);

    let bob_row = assert_ok!(app.user_repo.find_by_id(bob.id).await).expect("bob exists");
    assert!(bob_row.credit_score.is_some());
    let carol_row = assert_ok!(app.user_repo.find_by_id(carol.id).await).expect("carol exists");
    assert!(carol_row.credit_score.is_none());
}

#[tokio::test]
async fn test_prefixed_tables_are_isolated() {
    let staging = TestApp::with_config(evenly_backend::StoreConfig::for_environment("staging"));
    staging.user("alice@example.com", "Alice").await;

    assert_eq!(staging.store.len("staging_users").await, 1);
    assert_eq!(staging.store.len("users").await, 0);
}

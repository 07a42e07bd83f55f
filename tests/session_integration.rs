//! Integration tests for executing example criteria through a session.

mod common;

use std::sync::Arc;

use common::{Account, Unregistered, User, registry, user_id};
use exemplar::prelude::*;

async fn seeded() -> Controller<InMemorySession> {
    let controller = Controller::new(InMemorySession::new(Arc::new(registry())));

    for (site, rank, name, money) in [
        ("hk", 1, "woody", 100),
        ("hk", 2, "buzz", 250),
        ("eu", 1, "jessie", 100),
    ] {
        controller
            .insert(User {
                id: Some(user_id(site, rank, Some(name))),
                money: Some(money),
                age: 30,
                active: true,
                ..Default::default()
            })
            .await
            .unwrap();
    }

    controller
        .insert(Account {
            username: Some("alice".into()),
            password: Some("secret".into()),
            logins: 3,
            ..Default::default()
        })
        .await
        .unwrap();

    controller
}

fn names(users: &[User]) -> Vec<String> {
    let mut names: Vec<_> = users
        .iter()
        .filter_map(|u| u.id.as_ref().and_then(|id| id.name.clone()))
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_search_by_composite_key_part() {
    let controller = seeded().await;
    let searcher = controller.searcher(SearchMode::ByNonNullFields);

    let example = User {
        id: Some(user_id("hk", 0, None)),
        ..Default::default()
    };
    let found = controller.search(&searcher, Some(&example)).await.unwrap();
    assert_eq!(names(&found), vec!["buzz", "woody"]);
}

#[tokio::test]
async fn test_search_ignores_booleans_and_defaults() {
    let controller = seeded().await;
    let searcher = controller.searcher(SearchMode::ByNonNullFields);

    // `active: false` and `age: 0` would match nothing if they were predicates.
    let example = User {
        money: Some(100),
        ..Default::default()
    };
    let found = controller.search(&searcher, Some(&example)).await.unwrap();
    assert_eq!(names(&found), vec!["jessie", "woody"]);
}

#[tokio::test]
async fn test_search_with_exclusions() {
    let controller = seeded().await;
    let example = User {
        id: Some(user_id("eu", 2, None)),
        ..Default::default()
    };

    let strict = controller.searcher(SearchMode::ByNonNullFields);
    assert!(controller.search(&strict, Some(&example)).await.unwrap().is_empty());

    let relaxed = controller.searcher(SearchMode::ByNonNullFields).exclude("id.rank");
    let found = controller.search(&relaxed, Some(&example)).await.unwrap();
    assert_eq!(names(&found), vec!["jessie"]);
}

#[tokio::test]
async fn test_search_without_example_lists_everything() {
    let controller = seeded().await;
    let searcher = controller.searcher(SearchMode::ByNonNullFields);

    let all = controller.search(&searcher, None::<&User>).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(controller.list::<User>().await.unwrap().len(), 3);
    assert_eq!(controller.list::<Account>().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_by_single_identifier() {
    let controller = seeded().await;
    let searcher = controller.searcher(SearchMode::ByNonNullFields).exclude("password");

    let example = Account {
        username: Some("alice".into()),
        password: Some("wrong".into()),
        ..Default::default()
    };
    let found = controller.search(&searcher, Some(&example)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].logins, 3);
}

#[tokio::test]
async fn test_get_and_save() {
    let controller = seeded().await;

    let mut alice: Account = controller.get("alice").await.unwrap().unwrap();
    alice.email = Some("alice@example.com".into());
    controller.save(alice).await.unwrap();

    let searcher = controller.searcher(SearchMode::ByNonNullFields);
    let example = Account {
        email: Some("alice@example.com".into()),
        ..Default::default()
    };
    let found = controller.search(&searcher, Some(&example)).await.unwrap();
    assert_eq!(found[0].username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_get_by_composite_key() {
    let controller = seeded().await;
    let key = ComponentValue::new(common::user_id_descriptor(), user_id("hk", 2, Some("buzz")));

    let buzz: Option<User> = controller.get(key).await.unwrap();
    assert_eq!(buzz.and_then(|u| u.money), Some(250));
}

#[tokio::test]
async fn test_record_errors() {
    let controller = seeded().await;

    let duplicate = Account {
        username: Some("alice".into()),
        ..Default::default()
    };
    let err = controller.insert(duplicate).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateRecord);

    let missing = Account {
        username: Some("bob".into()),
        ..Default::default()
    };
    let err = controller.save(missing).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RecordNotFound);
}

#[tokio::test]
async fn test_unregistered_search_fails() {
    let controller = seeded().await;
    let searcher = controller.searcher(SearchMode::ByNonNullFields);

    let err = controller
        .search(&searcher, Some(&Unregistered { name: "x".into() }))
        .await
        .unwrap_err();
    assert!(err.is_metadata_unavailable());

    let err = controller.list::<Unregistered>().await.unwrap_err();
    assert!(err.is_metadata_unavailable());
}

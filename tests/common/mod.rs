//! Shared entity fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use exemplar::prelude::*;

/// Composite key of [`User`].
#[derive(Debug, Clone, PartialEq)]
pub struct UserId {
    pub site: String,
    pub rank: i32,
    pub name: Option<String>,
}

/// Entity keyed by a composite identifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct User {
    pub id: Option<UserId>,
    pub money: Option<i64>,
    pub age: i32,
    pub active: bool,
    pub nickname: Option<String>,
    pub role: Option<i64>,
}

/// Entity keyed by a single scalar identifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Account {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub logins: i32,
    pub balance: f64,
    pub verified: Option<bool>,
    pub initial: char,
    pub tags: Option<Vec<String>>,
}

/// Entity whose identifier is itself an association.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub owner: Option<String>,
    pub bio: Option<String>,
}

/// Entity that is never registered.
#[derive(Debug, Clone, PartialEq)]
pub struct Unregistered {
    pub name: String,
}

pub fn user_id(site: &str, rank: i32, name: Option<&str>) -> UserId {
    UserId {
        site: site.into(),
        rank,
        name: name.map(str::to_string),
    }
}

pub fn user_id_descriptor() -> Arc<ComponentDescriptor> {
    ComponentDescriptor::builder::<UserId>("UserId")
        .field("site", |k: &UserId| Some(Value::from(k.site.as_str())))
        .field("rank", |k: &UserId| Some(Value::from(k.rank)))
        .field("name", |k: &UserId| k.name.clone().map(Value::from))
        .build()
        .unwrap()
}

pub fn registry() -> MappingRegistry {
    MappingRegistry::builder()
        .register(
            EntityMapping::<User>::new("User")
                .composite_id("id", user_id_descriptor(), |u: &User| u.id.clone())
                .property(Column::scalar("money", ScalarType::Long), |u: &User| {
                    u.money.map(Value::from)
                })
                .property(Column::scalar("age", ScalarType::Int).not_null(), |u: &User| {
                    Some(Value::from(u.age))
                })
                .property(Column::scalar("active", ScalarType::Boolean).not_null(), |u: &User| {
                    Some(Value::from(u.active))
                })
                .property(Column::scalar("nickname", ScalarType::String), |u: &User| {
                    u.nickname.clone().map(Value::from)
                })
                .property(Column::association("role", "Role"), |u: &User| {
                    u.role.map(Value::reference)
                }),
        )
        .unwrap()
        .register(
            EntityMapping::<Account>::new("Account")
                .id("username", ScalarType::String, |a: &Account| {
                    a.username.clone().map(Value::from)
                })
                .property(Column::scalar("password", ScalarType::String), |a: &Account| {
                    a.password.clone().map(Value::from)
                })
                .property(Column::scalar("email", ScalarType::String), |a: &Account| {
                    a.email.clone().map(Value::from)
                })
                .property(Column::scalar("logins", ScalarType::Int).not_null(), |a: &Account| {
                    Some(Value::from(a.logins))
                })
                .property(Column::scalar("balance", ScalarType::Double).not_null(), |a: &Account| {
                    Some(Value::from(a.balance))
                })
                .property(Column::scalar("verified", ScalarType::Boolean), |a: &Account| {
                    a.verified.map(Value::from)
                })
                .property(Column::scalar("initial", ScalarType::Char).not_null(), |a: &Account| {
                    Some(Value::from(a.initial))
                })
                .property(Column::collection("tags", "String"), |a: &Account| {
                    a.tags.clone().map(Value::from)
                }),
        )
        .unwrap()
        .register(
            EntityMapping::<Profile>::new("Profile")
                .identifier("owner", TypeKind::Association("Account".into()), |p: &Profile| {
                    p.owner.clone().map(Value::reference)
                })
                .property(Column::scalar("bio", ScalarType::String), |p: &Profile| {
                    p.bio.clone().map(Value::from)
                }),
        )
        .unwrap()
        .build()
}

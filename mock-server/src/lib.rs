//! In-memory stand-in for a placeholder REST API serving posts, comments,
//! todos and users.
//!
//! # Design
//! The dataset is generated deterministically at startup and never mutated.
//! Write endpoints follow placeholder-API semantics: the request payload is
//! echoed back (merged with the stored record for PATCH, stamped with a new
//! id for POST) but nothing is persisted, so concurrent tests against one
//! server never observe each other's writes.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::net::TcpListener;

pub const USER_COUNT: u32 = 10;
pub const POSTS_PER_USER: u32 = 10;
pub const COMMENTS_PER_POST: u32 = 5;
pub const TODOS_PER_USER: u32 = 20;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: u32,
    pub id: u32,
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub post_id: u32,
    pub id: u32,
    pub name: String,
    pub email: String,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: u32,
    pub id: u32,
    pub title: String,
    pub completed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Geo,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub username: String,
    pub email: String,
    pub address: Address,
    pub phone: String,
    pub website: String,
    pub company: Company,
}

const WORDS: &[&str] = &[
    "sunt", "aut", "facere", "repellat", "provident", "occaecati", "excepturi", "optio",
    "reprehenderit", "qui", "est", "esse", "dolorem", "ea", "molestias", "quasi", "exercitationem",
    "nesciunt", "magnam", "voluptate", "eum", "rerum", "veniam", "quia", "ullam", "odio",
];

const NAMES: &[(&str, &str)] = &[
    ("Leanne Graham", "Bret"),
    ("Ervin Howell", "Antonette"),
    ("Clementine Bauch", "Samantha"),
    ("Patricia Lebsack", "Karianne"),
    ("Chelsey Dietrich", "Kamren"),
    ("Dennis Schulist", "Leopoldo_Corkery"),
    ("Kurtis Weissnat", "Elwyn.Skiles"),
    ("Nicholas Runolfsdottir", "Maxime_Nienow"),
    ("Glenna Reichert", "Delphine"),
    ("Clementina DuBuque", "Moriah.Stanton"),
];

/// Deterministic phrase of `len` words starting at `seed` in the word list.
fn phrase(seed: u32, len: usize) -> String {
    (0..len)
        .map(|i| WORDS[(seed as usize * 7 + i * 3) % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

/// The complete read-only dataset served by the mock.
#[derive(Debug)]
pub struct Fixtures {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub todos: Vec<Todo>,
    pub users: Vec<User>,
}

impl Fixtures {
    pub fn generate() -> Self {
        let users = (1..=USER_COUNT)
            .map(|id| {
                let (name, username) = NAMES[(id as usize - 1) % NAMES.len()];
                User {
                    id,
                    name: name.to_string(),
                    username: username.to_string(),
                    email: format!("{}@example.org", username.to_lowercase()),
                    address: Address {
                        street: format!("{} Street", phrase(id, 1)),
                        suite: format!("Apt. {}", 100 + id),
                        city: format!("{}ville", phrase(id + 3, 1)),
                        zipcode: format!("{:05}-{:04}", 92998 - id, 3874 + id),
                        geo: Geo {
                            lat: format!("-{}.{:04}", 30 + id, 1000 + id),
                            lng: format!("{}.{:04}", 80 + id, 2000 + id),
                        },
                    },
                    phone: format!("1-770-736-{:04}", 8031 + id),
                    website: format!("{}.example.org", username.to_lowercase()),
                    company: Company {
                        name: format!("{} Group", name.split(' ').next().unwrap_or(name)),
                        catch_phrase: phrase(id + 11, 4),
                        bs: phrase(id + 17, 3),
                    },
                }
            })
            .collect();

        let posts: Vec<Post> = (1..=USER_COUNT * POSTS_PER_USER)
            .map(|id| Post {
                user_id: (id - 1) / POSTS_PER_USER + 1,
                id,
                title: phrase(id, 6),
                body: format!("{}\n{}", phrase(id + 1, 12), phrase(id + 2, 10)),
            })
            .collect();

        let comments = posts
            .iter()
            .flat_map(|post| {
                (0..COMMENTS_PER_POST).map(move |n| {
                    let id = (post.id - 1) * COMMENTS_PER_POST + n + 1;
                    Comment {
                        post_id: post.id,
                        id,
                        name: phrase(id + 5, 4),
                        email: format!("commenter{id}@example.net"),
                        body: phrase(id + 9, 14),
                    }
                })
            })
            .collect();

        let todos = (1..=USER_COUNT * TODOS_PER_USER)
            .map(|id| Todo {
                user_id: (id - 1) / TODOS_PER_USER + 1,
                id,
                title: phrase(id + 13, 5),
                completed: id % 3 == 0,
            })
            .collect();

        Self {
            posts,
            comments,
            todos,
            users,
        }
    }

    fn post(&self, id: u32) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }
}

pub type Db = Arc<Fixtures>;

#[derive(Deserialize)]
pub struct ByUser {
    #[serde(rename = "userId")]
    pub user_id: Option<u32>,
}

pub fn app() -> Router {
    let db: Db = Arc::new(Fixtures::generate());
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post)
                .put(replace_post)
                .patch(patch_post)
                .delete(delete_post),
        )
        .route("/posts/{id}/comments", get(list_post_comments))
        .route("/todos", get(list_todos))
        .route("/todos/{id}", get(get_todo))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_posts(State(db): State<Db>, Query(filter): Query<ByUser>) -> Json<Vec<Post>> {
    Json(
        db.posts
            .iter()
            .filter(|p| filter.user_id.map_or(true, |u| p.user_id == u))
            .cloned()
            .collect(),
    )
}

async fn get_post(State(db): State<Db>, Path(id): Path<u32>) -> Result<Json<Post>, StatusCode> {
    db.post(id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn create_post(
    State(db): State<Db>,
    Json(mut input): Json<Map<String, Value>>,
) -> (StatusCode, Json<Map<String, Value>>) {
    input.insert("id".to_string(), Value::from(db.posts.len() + 1));
    (StatusCode::CREATED, Json(input))
}

async fn replace_post(
    State(db): State<Db>,
    Path(id): Path<u32>,
    Json(mut input): Json<Map<String, Value>>,
) -> Result<Json<Map<String, Value>>, StatusCode> {
    db.post(id).ok_or(StatusCode::NOT_FOUND)?;
    input.insert("id".to_string(), Value::from(id));
    Ok(Json(input))
}

async fn patch_post(
    State(db): State<Db>,
    Path(id): Path<u32>,
    Json(input): Json<Map<String, Value>>,
) -> Result<Json<Value>, StatusCode> {
    let post = db.post(id).ok_or(StatusCode::NOT_FOUND)?;
    let mut merged = serde_json::to_value(post).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if let Value::Object(fields) = &mut merged {
        for (key, value) in input {
            if key != "id" {
                fields.insert(key, value);
            }
        }
    }
    Ok(Json(merged))
}

/// Placeholder APIs acknowledge every delete with `200 {}`.
async fn delete_post(Path(_id): Path<u32>) -> Json<Value> {
    Json(Value::Object(Map::new()))
}

async fn list_post_comments(
    State(db): State<Db>,
    Path(id): Path<u32>,
) -> Json<Vec<Comment>> {
    Json(db.comments.iter().filter(|c| c.post_id == id).cloned().collect())
}

async fn list_todos(State(db): State<Db>, Query(filter): Query<ByUser>) -> Json<Vec<Todo>> {
    Json(
        db.todos
            .iter()
            .filter(|t| filter.user_id.map_or(true, |u| t.user_id == u))
            .cloned()
            .collect(),
    )
}

async fn get_todo(State(db): State<Db>, Path(id): Path<u32>) -> Result<Json<Todo>, StatusCode> {
    db.todos
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    Json(db.users.clone())
}

async fn get_user(State(db): State<Db>, Path(id): Path<u32>) -> Result<Json<User>, StatusCode> {
    db.users
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

//! `/todos` endpoints against the mock server.

mod common;

use api_harness::{expect_eq, expect_that, Todo};
use common::Harness;

#[tokio::test]
async fn todos_api() {
    let harness = Harness::start().await;
    let suite = harness.suite("TodosApiTests");

    suite
        .run_test("list_returns_every_todo", async {
            let response = suite.todos()?.list().await?;
            suite.assert_status(&response, 200)?;

            let todos: Vec<Todo> = suite.decode_response(&response)?;
            expect_eq("todo count", 200, todos.len())?;
            expect_that(
                "todo titles",
                todos.iter().all(|t| !t.title.is_empty()),
                "non-empty",
                todos.iter().filter(|t| t.title.is_empty()).count(),
            )
        })
        .await;

    suite
        .run_test("get_by_id_returns_single_todo", async {
            let response = suite.todos()?.get_by_id(3).await?;
            suite.assert_status(&response, 200)?;

            let todo: Todo = suite.decode_response(&response)?;
            expect_eq("todo.id", 3, todo.id)?;
            expect_eq("todo.userId", 1, todo.user_id)?;
            expect_eq("todo.completed", true, todo.completed)
        })
        .await;

    suite
        .run_test("list_by_user_filters_on_user_id", async {
            let response = suite.todos()?.list_by_user(2).await?;
            suite.assert_status(&response, 200)?;

            let todos: Vec<Todo> = suite.decode_response(&response)?;
            expect_eq("todo count", 20, todos.len())?;
            expect_that(
                "todo userIds",
                todos.iter().all(|t| t.user_id == 2),
                "2",
                todos.iter().map(|t| t.user_id).collect::<Vec<_>>(),
            )?;
            // ids 21..=40, every third completed
            let completed = todos.iter().filter(|t| t.completed).count();
            expect_eq("completed count", 7, completed)
        })
        .await;

    suite
        .run_test("unknown_todo_is_404", async {
            let response = suite.todos()?.get_by_id(201).await?;
            suite.assert_status(&response, 404)
        })
        .await;

    let report = suite.teardown();
    assert_eq!(report.results.len(), 4);
    report.assert_all_passed();
}

#[tokio::test]
async fn unknown_user_has_no_todos() {
    let harness = Harness::start().await;
    let suite = harness.suite("TodosApiTests");

    suite
        .run_test("unknown_user_has_no_todos", async {
            let response = suite.todos()?.list_by_user(999).await?;
            suite.assert_status(&response, 200)?;
            let todos: Vec<Todo> = suite.decode_response(&response)?;
            expect_that("todos", todos.is_empty(), "empty", todos.len())
        })
        .await;

    suite.teardown().assert_all_passed();
}

//! Smoke tests against the API configured in `appsettings.toml`.
//!
//! Skipped unless `HARNESS_LIVE=1`; they need network access.

use std::sync::Arc;

use api_harness::{expect_eq, expect_that, Configuration, Post, ResponseAssertions, Suite, User};

fn live_enabled() -> bool {
    std::env::var("HARNESS_LIVE").is_ok_and(|value| value == "1")
}

#[tokio::test]
async fn live_smoke() {
    if !live_enabled() {
        eprintln!("skipping live tests; set HARNESS_LIVE=1 to run them");
        return;
    }

    let config = Arc::new(Configuration::load().unwrap());
    let suite = Suite::setup("LiveSmokeTests", config).unwrap();

    suite
        .run_test("posts_list", async {
            let response = suite.posts()?.list().await?;
            suite.assert_status(&response, 200)?;
            response.expect_json()?;
            let posts: Vec<Post> = suite.decode_response(&response)?;
            expect_eq("post count", 100, posts.len())
        })
        .await;

    suite
        .run_test("first_user", async {
            let response = suite.users()?.get_by_id(1).await?;
            suite.assert_status(&response, 200)?;
            let user: User = suite.decode_response(&response)?;
            expect_eq("user.name", "Leanne Graham", user.name.as_str())?;
            expect_that("user.address", user.address.is_some(), "present", &user.address)
        })
        .await;

    let report = suite.teardown();
    println!("{report}");
    report.assert_all_passed();
}

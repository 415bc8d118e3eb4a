use serde_json::json;

use crate::common::{TestApp, TestUser, routes};

/// A finished match with the owner, Ali and Veli on the roster.
struct PlayedMatch {
    owner: TestUser,
    ali: TestUser,
    veli: TestUser,
    game: i32,
}

async fn played_match(app: &TestApp) -> PlayedMatch {
    let owner = app.create_admin("kaptan@example.com").await;
    let ali = app.create_player("ali@example.com").await;
    let veli = app.create_player("veli@example.com").await;
    let org = app.create_organization(&owner, "Salı").await;
    app.add_member(org, &owner, &ali).await;
    app.add_member(org, &owner, &veli).await;
    let game = app.create_match(&owner, org, "2026-10-22").await;
    for id in [owner.id, ali.id, veli.id] {
        app.add_to_roster(game, &owner, id).await;
    }
    app.record_score(game, &owner, 5, 4).await;
    PlayedMatch {
        owner,
        ali,
        veli,
        game,
    }
}

mod rating_creation {
    use super::*;

    #[tokio::test]
    async fn rostered_player_can_rate_a_teammate() {
        let app = TestApp::spawn().await;
        let m = played_match(&app).await;

        let res = app
            .post_with_token(
                &routes::ratings(m.game),
                &json!({"rated_user_id": m.veli.id, "rating": 4, "comment": "  İyi pas  "}),
                &m.ali.token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["rater_id"], m.ali.id);
        assert_eq!(res.body["rated_user_id"], m.veli.id);
        assert_eq!(res.body["rating"], 4);
        assert_eq!(res.body["comment"], "İyi pas");
    }

    #[tokio::test]
    async fn players_cannot_rate_themselves() {
        let app = TestApp::spawn().await;
        let m = played_match(&app).await;

        let res = app
            .post_with_token(
                &routes::ratings(m.game),
                &json!({"rated_user_id": m.ali.id, "rating": 5}),
                &m.ali.token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn rating_must_be_between_one_and_five() {
        let app = TestApp::spawn().await;
        let m = played_match(&app).await;

        for rating in [0, 6] {
            let res = app
                .post_with_token(
                    &routes::ratings(m.game),
                    &json!({"rated_user_id": m.veli.id, "rating": rating}),
                    &m.ali.token,
                )
                .await;

            assert_eq!(res.status, 400, "rating {rating} was accepted");
        }
    }

    #[tokio::test]
    async fn same_player_cannot_be_rated_twice_by_one_rater() {
        let app = TestApp::spawn().await;
        let m = played_match(&app).await;
        let body = json!({"rated_user_id": m.veli.id, "rating": 3});

        let first = app
            .post_with_token(&routes::ratings(m.game), &body, &m.ali.token)
            .await;
        assert_eq!(first.status, 201);

        let res = app
            .post_with_token(&routes::ratings(m.game), &body, &m.ali.token)
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn only_rostered_players_take_part_in_ratings() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let ali = app.create_player("ali@example.com").await;
        let bench = app.create_player("yedek@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        app.add_member(org, &owner, &ali).await;
        app.add_member(org, &owner, &bench).await;
        let game = app.create_match(&owner, org, "2026-10-22").await;
        app.add_to_roster(game, &owner, ali.id).await;
        app.record_score(game, &owner, 1, 0).await;

        let from_bench = app
            .post_with_token(
                &routes::ratings(game),
                &json!({"rated_user_id": ali.id, "rating": 5}),
                &bench.token,
            )
            .await;
        assert_eq!(from_bench.status, 400);

        let of_bench = app
            .post_with_token(
                &routes::ratings(game),
                &json!({"rated_user_id": bench.id, "rating": 5}),
                &ali.token,
            )
            .await;
        assert_eq!(of_bench.status, 400);
    }

    #[tokio::test]
    async fn upcoming_match_cannot_be_rated() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let ali = app.create_player("ali@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        app.add_member(org, &owner, &ali).await;
        let game = app.create_match(&owner, org, "2026-10-22").await;
        app.add_to_roster(game, &owner, ali.id).await;
        app.add_to_roster(game, &owner, owner.id).await;

        let res = app
            .post_with_token(
                &routes::ratings(game),
                &json!({"rated_user_id": owner.id, "rating": 5}),
                &ali.token,
            )
            .await;

        assert_eq!(res.status, 400);
    }
}

mod rating_summary {
    use super::*;

    async fn rate(app: &TestApp, game: i32, rater: &TestUser, rated: i32, rating: i32) {
        let res = app
            .post_with_token(
                &routes::ratings(game),
                &json!({"rated_user_id": rated, "rating": rating}),
                &rater.token,
            )
            .await;
        assert_eq!(res.status, 201, "rating failed: {}", res.text);
    }

    #[tokio::test]
    async fn summary_averages_ratings_best_first() {
        let app = TestApp::spawn().await;
        let m = played_match(&app).await;
        rate(&app, m.game, &m.owner, m.veli.id, 5).await;
        rate(&app, m.game, &m.ali, m.veli.id, 4).await;
        rate(&app, m.game, &m.owner, m.ali.id, 3).await;

        let res = app.get_with_token(&routes::ratings(m.game), &m.veli.token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["ratings"].as_array().unwrap().len(), 3);
        let summary = res.body["summary"].as_array().unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0]["user_id"], m.veli.id);
        assert_eq!(summary[0]["average"], 4.5);
        assert_eq!(summary[0]["count"], 2);
        assert_eq!(summary[1]["user_id"], m.ali.id);
        assert_eq!(summary[1]["average"], 3.0);
    }
}

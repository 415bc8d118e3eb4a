use serde_json::json;

use crate::common::{TestApp, routes};

mod score_recording {
    use super::*;

    #[tokio::test]
    async fn recording_a_score_finishes_the_match() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let ali = app.create_player("ali@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        app.add_member(org, &owner, &ali).await;
        let game = app.create_match(&owner, org, "2026-10-22").await;

        let res = app
            .put_with_token(
                &routes::score(game),
                &json!({
                    "home_score": 3,
                    "away_score": 2,
                    "home_scorers": [
                        {"user_id": ali.id, "name": "Ali", "goals": 2},
                        {"name": "Misafir", "goals": 1},
                    ],
                }),
                &owner.token,
            )
            .await;

        assert_eq!(res.status, 200, "score failed: {}", res.text);
        assert_eq!(res.body["home_score"], 3);
        assert_eq!(res.body["home_scorers"][0]["goals"], 2);
        assert_eq!(res.body["away_scorers"].as_array().unwrap().len(), 0);

        let detail = app.get_with_token(&routes::game(game), &ali.token).await;
        assert_eq!(detail.body["status"], "FINISHED");

        let score = app.get_with_token(&routes::score(game), &ali.token).await;
        assert_eq!(score.status, 200);
        assert_eq!(score.body["away_score"], 2);
    }

    #[tokio::test]
    async fn scoring_a_draft_match_finishes_it() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        let draft = app
            .post_with_token(
                &routes::org_matches(org),
                &json!({
                    "title": "Taslak",
                    "date": "2026-10-22",
                    "time": "21:00",
                    "venue": "Moda",
                    "capacity": 10,
                    "status": "DRAFT",
                }),
                &owner.token,
            )
            .await;
        assert_eq!(draft.status, 201);

        app.record_score(draft.id(), &owner, 1, 1).await;

        let detail = app.get_with_token(&routes::game(draft.id()), &owner.token).await;
        assert_eq!(detail.body["status"], "FINISHED");
    }

    #[tokio::test]
    async fn correcting_a_score_overwrites_it() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        let game = app.create_match(&owner, org, "2026-10-22").await;
        app.record_score(game, &owner, 3, 2).await;

        app.record_score(game, &owner, 4, 4).await;

        let score = app.get_with_token(&routes::score(game), &owner.token).await;
        assert_eq!(score.body["home_score"], 4);
        assert_eq!(score.body["away_score"], 4);
    }

    #[tokio::test]
    async fn scorers_cannot_outnumber_the_goals() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        let game = app.create_match(&owner, org, "2026-10-22").await;

        let res = app
            .put_with_token(
                &routes::score(game),
                &json!({
                    "home_score": 1,
                    "away_score": 0,
                    "home_scorers": [{"name": "Ali", "goals": 2}],
                }),
                &owner.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn negative_score_is_rejected() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        let game = app.create_match(&owner, org, "2026-10-22").await;

        let res = app
            .put_with_token(
                &routes::score(game),
                &json!({"home_score": -1, "away_score": 0}),
                &owner.token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn member_cannot_record_a_score() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let ali = app.create_player("ali@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        app.add_member(org, &owner, &ali).await;
        let game = app.create_match(&owner, org, "2026-10-22").await;

        let res = app
            .put_with_token(
                &routes::score(game),
                &json!({"home_score": 1, "away_score": 0}),
                &ali.token,
            )
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn missing_score_is_not_found() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        let game = app.create_match(&owner, org, "2026-10-22").await;

        let res = app.get_with_token(&routes::score(game), &owner.token).await;

        assert_eq!(res.status, 404);
    }
}

mod publishing {
    use super::*;

    #[tokio::test]
    async fn match_cannot_be_published_without_a_score() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        let game = app.create_match(&owner, org, "2026-10-22").await;

        let res = app
            .post_with_token(&routes::publish(game), &json!({}), &owner.token)
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn scored_match_can_be_published_and_stays_published() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        let game = app.create_match(&owner, org, "2026-10-22").await;
        app.record_score(game, &owner, 2, 1).await;

        let res = app
            .post_with_token(&routes::publish(game), &json!({}), &owner.token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "PUBLISHED");

        // A later correction keeps the match published.
        app.record_score(game, &owner, 2, 2).await;
        let detail = app.get_with_token(&routes::game(game), &owner.token).await;
        assert_eq!(detail.body["status"], "PUBLISHED");
    }
}

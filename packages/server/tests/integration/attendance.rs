use serde_json::json;

use crate::common::{TestApp, routes};

mod attendance_answers {
    use super::*;

    #[tokio::test]
    async fn unanswered_roster_players_are_pending() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let ali = app.create_player("ali@example.com").await;
        let veli = app.create_player("veli@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        app.add_member(org, &owner, &ali).await;
        app.add_member(org, &owner, &veli).await;
        let game = app.create_match(&owner, org, "2026-10-22").await;
        app.add_to_roster(game, &owner, ali.id).await;
        app.add_to_roster(game, &owner, veli.id).await;

        let answer = app
            .put_with_token(
                &routes::attendance(game),
                &json!({"status": "ACCEPTED"}),
                &ali.token,
            )
            .await;
        assert_eq!(answer.status, 200);
        assert_eq!(answer.body["status"], "ACCEPTED");
        assert!(answer.body["responded_at"].is_string());

        let res = app.get_with_token(&routes::attendance(game), &owner.token).await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["user_id"], ali.id);
        assert_eq!(items[0]["status"], "ACCEPTED");
        assert_eq!(items[1]["user_id"], veli.id);
        assert_eq!(items[1]["status"], "PENDING");
        assert!(items[1]["responded_at"].is_null());
    }

    #[tokio::test]
    async fn answering_again_overwrites_the_previous_answer() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let ali = app.create_player("ali@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        app.add_member(org, &owner, &ali).await;
        let game = app.create_match(&owner, org, "2026-10-22").await;

        for status in ["ACCEPTED", "DECLINED"] {
            let res = app
                .put_with_token(&routes::attendance(game), &json!({"status": status}), &ali.token)
                .await;
            assert_eq!(res.status, 200);
        }

        let res = app.get_with_token(&routes::attendance(game), &ali.token).await;
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["status"], "DECLINED");
        assert_eq!(items[0]["name"], "ali");
    }

    #[tokio::test]
    async fn pending_is_not_a_valid_answer() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        let game = app.create_match(&owner, org, "2026-10-22").await;

        let res = app
            .put_with_token(
                &routes::attendance(game),
                &json!({"status": "PENDING"}),
                &owner.token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn outsider_cannot_answer() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let outsider = app.create_player("veli@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        let game = app.create_match(&owner, org, "2026-10-22").await;

        let res = app
            .put_with_token(
                &routes::attendance(game),
                &json!({"status": "ACCEPTED"}),
                &outsider.token,
            )
            .await;

        assert_eq!(res.status, 403);
    }
}

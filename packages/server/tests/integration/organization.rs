use ::common::Plan;
use serde_json::json;

use crate::common::{TestApp, routes};

mod organization_creation {
    use super::*;

    #[tokio::test]
    async fn admin_can_create_a_free_organization() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("kaptan@example.com").await;

        let res = app
            .post_with_token(
                routes::ORGANIZATIONS,
                &json!({"name": "Salı Futbolu", "description": "Her salı 21:00"}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["name"], "Salı Futbolu");
        assert_eq!(res.body["owner_id"], admin.id);
        assert_eq!(res.body["plan"], "FREE");
        assert_eq!(res.body["max_players"], 10);
    }

    #[tokio::test]
    async fn player_cannot_create_an_organization() {
        let app = TestApp::spawn().await;
        let player = app.create_player("ali@example.com").await;

        let res = app
            .post_with_token(
                routes::ORGANIZATIONS,
                &json!({"name": "Salı Futbolu"}),
                &player.token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn free_admin_cannot_open_a_premium_organization() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("kaptan@example.com").await;

        let res = app
            .post_with_token(
                routes::ORGANIZATIONS,
                &json!({"name": "Salı Futbolu", "plan": "PREMIUM"}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PLAN_LIMIT_REACHED");
    }

    #[tokio::test]
    async fn premium_admin_gets_premium_organizations_by_default() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("kaptan@example.com").await;
        app.set_plan(admin.id, Plan::Premium).await;

        let res = app
            .post_with_token(
                routes::ORGANIZATIONS,
                &json!({"name": "Salı Futbolu"}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["plan"], "PREMIUM");
        assert_eq!(res.body["max_players"], Plan::Premium.max_players());
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("kaptan@example.com").await;

        let res = app
            .post_with_token(routes::ORGANIZATIONS, &json!({"name": "  "}), &admin.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod organization_listing {
    use super::*;

    #[tokio::test]
    async fn list_contains_owned_and_approved_organizations_only() {
        let app = TestApp::spawn().await;
        let owner_a = app.create_admin("a@example.com").await;
        let owner_b = app.create_admin("b@example.com").await;
        let player = app.create_player("ali@example.com").await;

        let approved = app.create_organization(&owner_a, "Salı").await;
        let pending = app.create_organization(&owner_b, "Çarşamba").await;
        app.add_member(approved, &owner_a, &player).await;
        let join = app
            .post_with_token(&routes::join(pending), &json!({}), &player.token)
            .await;
        assert_eq!(join.status, 201);

        let res = app.get_with_token(routes::ORGANIZATIONS, &player.token).await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], approved);
        assert_eq!(items[0]["is_owner"], false);
        assert_eq!(items[0]["member_role"], "MEMBER");

        let owner_view = app.get_with_token(routes::ORGANIZATIONS, &owner_a.token).await;
        let items = owner_view.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["is_owner"], true);
        assert!(items[0]["member_role"].is_null());
    }

    #[tokio::test]
    async fn outsider_sees_not_found_for_an_organization() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let outsider = app.create_player("veli@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;

        let res = app
            .get_with_token(&routes::organization(org), &outsider.token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn listing_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ORGANIZATIONS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}

mod organization_update {
    use super::*;

    #[tokio::test]
    async fn owner_can_rename_and_clear_the_description() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;

        let res = app
            .patch_with_token(
                &routes::organization(org),
                &json!({"name": "Salı Akşamı", "description": null}),
                &owner.token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "Salı Akşamı");
        assert!(res.body["description"].is_null());
    }

    #[tokio::test]
    async fn approved_member_cannot_update_the_organization() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let player = app.create_player("ali@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        app.add_member(org, &owner, &player).await;

        let res = app
            .patch_with_token(
                &routes::organization(org),
                &json!({"name": "Bizim Takım"}),
                &player.token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod organization_deletion {
    use super::*;

    #[tokio::test]
    async fn deleting_an_organization_removes_its_matches() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let player = app.create_player("ali@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        app.add_member(org, &owner, &player).await;
        let game = app.create_match(&owner, org, "2026-10-22").await;
        app.add_to_roster(game, &owner, player.id).await;

        let res = app
            .delete_with_token(&routes::organization(org), &owner.token)
            .await;
        assert_eq!(res.status, 204);

        let gone = app.get_with_token(&routes::game(game), &owner.token).await;
        assert_eq!(gone.status, 404);

        let list = app.get_with_token(routes::ORGANIZATIONS, &player.token).await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn member_cannot_delete_the_organization() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let player = app.create_player("ali@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        app.add_member(org, &owner, &player).await;

        let res = app
            .delete_with_token(&routes::organization(org), &player.token)
            .await;

        assert_eq!(res.status, 403);
    }
}

use serde_json::{Value, json};

use crate::common::{TestApp, routes};

const APPROVED_CARD: &str = "5528790000000008";
const INSUFFICIENT_FUNDS_CARD: &str = "4111111111111129";

fn checkout_body(number: &str) -> Value {
    json!({
        "plan": "PREMIUM",
        "card": {
            "holder_name": "Ali Yılmaz",
            "number": number,
            "expire_month": "12",
            "expire_year": "2030",
            "cvc": "123",
        },
    })
}

mod plans {
    use super::*;

    #[tokio::test]
    async fn plans_are_public() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::PLANS).await;

        assert_eq!(res.status, 200);
        let plans = res.body.as_array().unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0]["plan"], "FREE");
        assert_eq!(plans[0]["max_players"], 10);
        assert_eq!(plans[0]["max_matches_per_week"], 1);
        assert_eq!(plans[0]["price_minor"], 0);
        assert_eq!(plans[1]["plan"], "PREMIUM");
        assert!(plans[1]["max_matches_per_week"].is_null());
        assert_eq!(plans[1]["currency"], "TRY");
    }
}

mod checkout {
    use super::*;

    #[tokio::test]
    async fn successful_payment_upgrades_the_account_and_its_organizations() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let org = app.create_organization(&owner, "Salı").await;
        app.create_match(&owner, org, "2026-10-22").await;

        let res = app
            .post_with_token(routes::CHECKOUT, &checkout_body(APPROVED_CARD), &owner.token)
            .await;

        assert_eq!(res.status, 200, "checkout failed: {}", res.text);
        assert_eq!(res.body["payment"]["status"], "SUCCESS");
        assert!(res.body["payment"]["provider_payment_id"].is_string());
        assert_eq!(res.body["user"]["plan"], "PREMIUM");
        assert_eq!(res.body["upgraded_organizations"], 1);

        let detail = app.get_with_token(&routes::organization(org), &owner.token).await;
        assert_eq!(detail.body["plan"], "PREMIUM");
        assert_eq!(detail.body["max_players"], 9999);

        // The weekly limit no longer applies.
        app.create_match(&owner, org, "2026-10-23").await;
    }

    #[tokio::test]
    async fn declined_card_is_recorded_and_changes_nothing() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;

        let res = app
            .post_with_token(
                routes::CHECKOUT,
                &checkout_body(INSUFFICIENT_FUNDS_CARD),
                &owner.token,
            )
            .await;

        assert_eq!(res.status, 402);
        assert_eq!(res.body["code"], "PAYMENT_FAILED");
        assert_eq!(res.body["message"], "Insufficient funds");

        let me = app.get_with_token(routes::ME, &owner.token).await;
        assert_eq!(me.body["plan"], "FREE");

        let payments = app.get_with_token(routes::PAYMENTS, &owner.token).await;
        assert_eq!(payments.status, 200);
        let rows = payments.body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["status"], "FAILURE");
        assert_eq!(rows[0]["error_message"], "Insufficient funds");
        assert_eq!(rows[0]["amount_minor"], 29_900);
    }

    #[tokio::test]
    async fn buying_the_current_plan_again_is_a_conflict() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let first = app
            .post_with_token(routes::CHECKOUT, &checkout_body(APPROVED_CARD), &owner.token)
            .await;
        assert_eq!(first.status, 200);

        let res = app
            .post_with_token(routes::CHECKOUT, &checkout_body(APPROVED_CARD), &owner.token)
            .await;

        assert_eq!(res.status, 409);

        let payments = app.get_with_token(routes::PAYMENTS, &owner.token).await;
        assert_eq!(payments.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn simultaneous_checkouts_charge_only_once() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let body = checkout_body(APPROVED_CARD);

        let (first, second) = tokio::join!(
            app.post_with_token(routes::CHECKOUT, &body, &owner.token),
            app.post_with_token(routes::CHECKOUT, &body, &owner.token),
        );

        let mut statuses = [first.status, second.status];
        statuses.sort_unstable();
        assert_eq!(statuses, [200, 409]);

        let payments = app.get_with_token(routes::PAYMENTS, &owner.token).await;
        let rows = payments.body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["status"], "SUCCESS");
    }

    #[tokio::test]
    async fn card_failing_the_checksum_is_rejected_before_charging() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;

        let res = app
            .post_with_token(
                routes::CHECKOUT,
                &checkout_body("5528790000000009"),
                &owner.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let payments = app.get_with_token(routes::PAYMENTS, &owner.token).await;
        assert_eq!(payments.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn free_plan_cannot_be_bought() {
        let app = TestApp::spawn().await;
        let owner = app.create_admin("kaptan@example.com").await;
        let mut body = checkout_body(APPROVED_CARD);
        body["plan"] = json!("FREE");

        let res = app.post_with_token(routes::CHECKOUT, &body, &owner.token).await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn checkout_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::CHECKOUT, &checkout_body(APPROVED_CARD))
            .await;

        assert_eq!(res.status, 401);
    }
}

#![allow(clippy::unwrap_used, clippy::float_cmp)]

mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::{TestApp, delivery};

#[tokio::test]
async fn health_and_public_catalog() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let wig = app.product("Body Wave Lace Front", 189.0).await;
    app.product("Pixie Cut", 79.0).await;

    let (status, body) = app.get("/products?max_price=100", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Pixie Cut"]);

    let (status, body) = app.get(&format!("/products/{}", wig.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 189.0);
    assert!(body["images"].as_array().unwrap().is_empty());

    let (status, _) = app.get("/products/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/categories", None).await;
    assert_eq!(body, json!(["lace-front"]));
}

#[tokio::test]
async fn auth_guards_routes() {
    let app = TestApp::spawn().await;
    let token = app.register("ada@example.com").await;

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "ADA@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["role"], "customer");
    assert!(body["profile"].get("password_hash").is_none());

    let (status, _) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "ada@example.com", "password": "nope-nope" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/auth/register",
            None,
            json!({ "email": "ada@example.com", "password": "password123", "full_name": "Ada" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.get("/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/cart", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .put("/me", Some(&token), json!({ "city": "Lagos" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Lagos");

    let (status, _) = app.get("/admin/report", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let admin = app.admin_token().await;
    let (status, _) = app.get("/admin/report", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cart_and_favorites_sync_on_login() {
    let app = TestApp::spawn().await;
    let first = app.product("Deep Wave", 120.0).await;
    let second = app.product("Kinky Curly", 95.0).await;
    let token = app.register("bea@example.com").await;

    let (status, body) = app
        .post(
            "/cart/items",
            Some(&token),
            json!({ "product_id": first.id, "quantity": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item_count"], 2);

    let (status, body) = app
        .post(
            "/cart/items",
            Some(&token),
            json!({ "product_id": first.id, "quantity": 7 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item_count"], 5);

    let (status, _) = app
        .post(
            "/cart/items",
            Some(&token),
            json!({ "product_id": first.id, "quantity": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Device cart: more of the first product, and one of the second
    let (status, body) = app
        .post(
            "/cart/sync",
            Some(&token),
            json!({ "items": [
                { "product_id": first.id, "quantity": 3 },
                { "product_id": second.id, "quantity": 1 },
                { "product_id": 4242, "quantity": 1 }
            ] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["item_count"], 6);
    assert_eq!(body["subtotal"], 695.0);

    let (status, body) = app
        .put(
            &format!("/cart/items/{}", first.id),
            Some(&token),
            json!({ "quantity": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .post(&format!("/favorites/{}", first.id), Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorite"], true);

    let (status, body) = app
        .get(&format!("/favorites/{}", first.id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorite"], true);
    let (_, body) = app
        .get(&format!("/favorites/{}", second.id), Some(&token))
        .await;
    assert_eq!(body["favorite"], false);

    let (_, body) = app
        .post(
            "/favorites/sync",
            Some(&token),
            json!({ "product_ids": [first.id, second.id] }),
        )
        .await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = app
        .delete(&format!("/favorites/{}", second.id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.get("/favorites", Some(&token)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.delete("/cart", Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.get("/cart", Some(&token)).await;
    assert_eq!(body["item_count"], 0);
}

#[tokio::test]
async fn checkout_pays_and_reconciles_into_an_order() {
    let app = TestApp::spawn().await;
    let wig = app.product("Straight Bob", 100.0).await;
    let token = app.register("cleo@example.com").await;
    let admin = app.admin_token().await;

    let (status, _) = app
        .post("/checkout/quote", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.post(
        "/cart/items",
        Some(&token),
        json!({ "product_id": wig.id, "quantity": 1 }),
    )
    .await;

    let (status, quote) = app
        .post("/checkout/quote", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["subtotal_cents"], 10_000);
    assert_eq!(quote["delivery_fee_cents"], 750);
    assert_eq!(quote["total_cents"], 10_750);

    let (status, body) = app
        .post(
            "/checkout/session",
            Some(&token),
            json!({ "delivery": { "full_name": "Cleo", "email": "bad", "phone": "1", "address": "", "city": "", "postal_code": "" } }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "email");

    let (status, start) = app
        .post(
            "/checkout/session",
            Some(&token),
            json!({ "delivery": delivery() }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = start["session_id"].as_str().unwrap().to_string();
    assert!(start["payment_url"].as_str().unwrap().contains(&session_id));

    let (status, _) = app
        .post(
            "/checkout/reconcile",
            Some(&token),
            json!({ "session_id": session_id }),
        )
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);

    app.gateway.mark_paid(&session_id).await.unwrap();
    let (status, confirmation) = app
        .post(
            "/checkout/reconcile",
            Some(&token),
            json!({ "session_id": session_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmation["order"]["status"], "processing");
    assert_eq!(confirmation["order"]["payment_status"], "paid");
    assert_eq!(confirmation["order"]["total"], 107.5);
    assert_eq!(confirmation["items"][0]["product_name"], "Straight Bob");
    let order_id = confirmation["order"]["id"].as_i64().unwrap();

    // Reloading the confirmation page does not create a second order
    let (_, again) = app
        .post(
            "/checkout/reconcile",
            Some(&token),
            json!({ "session_id": session_id }),
        )
        .await;
    assert_eq!(again["order"]["id"], order_id);

    let (_, cart) = app.get("/cart", Some(&token)).await;
    assert_eq!(cart["item_count"], 0);

    let (_, orders) = app.get("/orders", Some(&token)).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let other = app.register("dee@example.com").await;
    let (status, _) = app.get(&format!("/orders/{order_id}"), Some(&other)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .put(
            &format!("/admin/orders/{order_id}/status"),
            Some(&admin),
            json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    let (status, _) = app
        .put(
            &format!("/admin/orders/{order_id}/status"),
            Some(&admin),
            json!({ "status": "pending" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, report) = app.get("/admin/report", Some(&admin)).await;
    assert_eq!(report["revenue"], 107.5);
    assert_eq!(report["paid_orders"], 1);
    assert_eq!(report["customers"], 2);
}

#[tokio::test]
async fn admin_manages_catalog_and_promotions() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let (status, product) = app
        .post(
            "/admin/products",
            Some(&admin),
            json!({ "name": "Water Wave", "price": 140.0, "category": "lace-front" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_i64().unwrap();

    let (status, image) = app
        .post(
            &format!("/admin/products/{product_id}/images"),
            Some(&admin),
            json!({ "url": "https://cdn.test/ww.jpg" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let image_id = image["id"].as_i64().unwrap();

    let (status, updated) = app
        .put(
            &format!("/admin/products/{product_id}"),
            Some(&admin),
            json!({ "price": 120.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 120.0);

    let (status, _) = app
        .delete(
            &format!("/admin/products/{product_id}/images/{image_id}"),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let now = chrono::Utc::now();
    let (status, promo) = app
        .post(
            "/admin/promotions",
            Some(&admin),
            json!({
                "code": "launch",
                "discount_percent": 20.0,
                "starts_at": now - chrono::Duration::days(1),
                "ends_at": now + chrono::Duration::days(7)
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(promo["code"], "LAUNCH");
    assert_eq!(promo["is_active"], false);
    let promo_id = promo["id"].as_i64().unwrap();

    let token = app.register("eve@example.com").await;
    app.post(
        "/cart/items",
        Some(&token),
        json!({ "product_id": product_id, "quantity": 1 }),
    )
    .await;
    let (status, _) = app
        .post(
            "/checkout/quote",
            Some(&token),
            json!({ "promotion_code": "launch" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put(
            &format!("/admin/promotions/{promo_id}/activation"),
            Some(&admin),
            json!({ "is_active": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, quote) = app
        .post(
            "/checkout/quote",
            Some(&token),
            json!({ "promotion_code": "launch" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["discount_cents"], 2_400);
    assert_eq!(quote["subtotal_cents"], 9_600);
    assert_eq!(quote["delivery_fee_cents"], 750);

    let (_, customers) = app.get("/admin/customers", Some(&admin)).await;
    assert_eq!(customers.as_array().unwrap().len(), 1);
    let customer_id = customers[0]["id"].as_i64().unwrap();
    let (_, summary) = app
        .get(&format!("/admin/customers/{customer_id}"), Some(&admin))
        .await;
    assert_eq!(summary["order_count"], 0);

    let (status, _) = app
        .delete(&format!("/admin/products/{product_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/products/{product_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .delete(&format!("/admin/promotions/{promo_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

use actix_web::{test::init_service, web};
use anyhow::Result;
use givebox::create_web_app;
use serde_json::json;
use util::create_test_state;

mod util;

const ADMIN_PATHS: [&str; 5] = [
    "/api/admin/stats",
    "/api/admin/donations",
    "/api/admin/users",
    "/api/admin/administrators",
    "/api/admin/daily",
];

#[actix_rt::test]
async fn gate() -> Result<()> {
    let state = create_test_state().await?;
    let app = init_service(create_web_app(web::Data::new(state))).await;
    let (donor, _id) = util::signup(&app, "Donor", "donor@test.com", "user").await?;
    let (admin, _id) = util::signup(&app, "Admin", "admin@test.com", "admin").await?;

    for path in ADMIN_PATHS {
        let (val, status) = util::get(&app, path).await?;
        assert_eq!(status, 401, "{}", path);
        assert_eq!(val["error"], json!(true));

        let (val, status) = util::auth_get(&app, path, &donor).await?;
        assert_eq!(status, 403, "{}", path);
        assert_eq!(val["message"], json!("Admin access denied"));

        let (_val, status) = util::auth_get(&app, path, &admin).await?;
        assert_eq!(status, 200, "{}", path);
    }
    Ok(())
}

#[actix_rt::test]
async fn stats() -> Result<()> {
    let state = create_test_state().await?;
    let app = init_service(create_web_app(web::Data::new(state))).await;
    let (admin, _id) = util::signup(&app, "Admin", "admin@test.com", "admin").await?;

    let (val, _status) = util::auth_get(&app, "/api/admin/stats", &admin).await?;
    assert_eq!(
        val,
        json!({"totalUsers": 0, "totalDonations": 0, "totalAmount": 0})
    );

    let (alice, _id) = util::signup(&app, "Alice", "alice@test.com", "user").await?;
    let (bob, _id) = util::signup(&app, "Bob", "bob@test.com", "user").await?;

    let order = util::create_order(&app, &alice, 500).await?;
    util::pay(&app, &alice, &order).await?;
    let order = util::create_order(&app, &bob, 1500).await?;
    util::pay(&app, &bob, &order).await?;
    util::create_order(&app, &alice, 100).await?;
    let order = util::create_order(&app, &bob, 700).await?;
    util::auth_post(
        &app,
        "/api/payment/verify",
        &bob,
        json!({
            "gatewayOrderRef": order,
            "gatewayPaymentRef": "pay_x",
            "signature": "00",
        }),
    )
    .await?;
    // administrator owned donations are not counted
    let order = util::create_order(&app, &admin, 9000).await?;
    util::pay(&app, &admin, &order).await?;

    let (val, status) = util::auth_get(&app, "/api/admin/stats", &admin).await?;
    assert_eq!(status, 200);
    assert_eq!(val["totalUsers"], json!(2));
    assert_eq!(val["totalDonations"], json!(2));
    assert_eq!(val["totalAmount"], json!(2000));
    Ok(())
}

#[actix_rt::test]
async fn donations() -> Result<()> {
    let state = create_test_state().await?;
    let app = init_service(create_web_app(web::Data::new(state))).await;
    let (admin, _id) = util::signup(&app, "Admin", "admin@test.com", "admin").await?;
    let (alice, alice_id) = util::signup(&app, "Alice", "alice@test.com", "user").await?;
    let (bob, bob_id) = util::signup(&app, "Bob", "bob@test.com", "user").await?;

    let first = util::create_order(&app, &alice, 500).await?;
    util::pay(&app, &alice, &first).await?;
    let second = util::create_order(&app, &bob, 100).await?;
    util::create_order(&app, &admin, 300).await?;

    let (val, status) = util::auth_get(&app, "/api/admin/donations", &admin).await?;
    assert_eq!(status, 200);
    let list = val.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["gatewayOrderRef"], json!(second));
    assert_eq!(list[0]["status"], json!("pending"));
    assert_eq!(list[0]["userId"].as_i64(), Some(bob_id));
    assert_eq!(list[0]["user"]["name"], json!("Bob"));
    assert_eq!(list[0]["user"]["email"], json!("bob@test.com"));
    assert_eq!(list[1]["gatewayOrderRef"], json!(first));
    assert_eq!(list[1]["status"], json!("success"));
    assert_eq!(list[1]["user"]["id"].as_i64(), Some(alice_id));
    assert!(list[1]["user"].get("password").is_none());

    let (val, _status) = util::auth_get(&app, "/api/admin/donations?limit=1&offset=1", &admin).await?;
    let list = val.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["gatewayOrderRef"], json!(first));
    Ok(())
}

#[actix_rt::test]
async fn users() -> Result<()> {
    let state = create_test_state().await?;
    let app = init_service(create_web_app(web::Data::new(state))).await;
    let (admin, admin_id) = util::signup(&app, "Admin", "admin@test.com", "admin").await?;
    util::signup(&app, "Alice", "alice@test.com", "user").await?;
    let (_bob, bob_id) = util::signup(&app, "Bob", "bob@test.com", "user").await?;

    let (val, status) = util::auth_get(&app, "/api/admin/users", &admin).await?;
    assert_eq!(status, 200);
    let list = val.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"].as_i64(), Some(bob_id));
    assert_eq!(list[1]["email"], json!("alice@test.com"));
    assert!(list.iter().all(|u| u["role"] == json!("user")));
    assert!(list.iter().all(|u| u.get("password").is_none()));

    let (val, status) = util::auth_get(&app, "/api/admin/administrators", &admin).await?;
    assert_eq!(status, 200);
    let list = val.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"].as_i64(), Some(admin_id));
    assert_eq!(list[0]["role"], json!("admin"));
    Ok(())
}

#[actix_rt::test]
async fn daily() -> Result<()> {
    let state = create_test_state().await?;
    let app = init_service(create_web_app(web::Data::new(state))).await;
    let (admin, _id) = util::signup(&app, "Admin", "admin@test.com", "admin").await?;
    let (alice, _id) = util::signup(&app, "Alice", "alice@test.com", "user").await?;

    let order = util::create_order(&app, &alice, 500).await?;
    util::pay(&app, &alice, &order).await?;
    let order = util::create_order(&app, &alice, 1500).await?;
    util::pay(&app, &alice, &order).await?;
    util::create_order(&app, &alice, 100).await?;

    let (val, status) = util::auth_get(&app, "/api/admin/daily", &admin).await?;
    assert_eq!(status, 200);
    let list = val.as_array().unwrap();
    assert_eq!(list.len(), 7);
    let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let last = &list[6];
    // the orders above may straddle midnight
    if last["date"] == json!(today) && last["count"] == json!(2) {
        assert_eq!(last["amount"], json!(2000));
    }
    assert_eq!(list.iter().map(|d| d["count"].as_u64().unwrap()).sum::<u64>(), 2);
    assert_eq!(
        list.iter().map(|d| d["amount"].as_i64().unwrap()).sum::<i64>(),
        2000
    );

    let (val, _status) = util::auth_get(&app, "/api/admin/daily?days=30", &admin).await?;
    assert_eq!(val.as_array().unwrap().len(), 30);
    let (_val, status) = util::auth_get(&app, "/api/admin/daily?days=abc", &admin).await?;
    assert_eq!(status, 400);
    Ok(())
}

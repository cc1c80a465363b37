use anyhow::Result;
use payment_gateway::{Error, Gateway, Local, OrderRequest};

fn request(amount: u64) -> OrderRequest {
    OrderRequest {
        amount,
        currency: "INR".to_owned(),
        receipt: "receipt_1".to_owned(),
    }
}

#[tokio::test]
async fn create_order() -> Result<()> {
    let gateway = Local::new("secret");
    let order = gateway.create_order(request(50_000)).await?;
    assert!(order.id.starts_with("order_"));
    assert_eq!(order.id.len(), "order_".len() + 14);
    assert_eq!(order.amount, 50_000);
    assert_eq!(order.currency, "INR");
    assert_eq!(order.receipt.as_deref(), Some("receipt_1"));

    let other = gateway.create_order(request(50_000)).await?;
    assert_ne!(order.id, other.id);
    Ok(())
}

#[tokio::test]
async fn reject_zero_amount() -> Result<()> {
    let gateway = Local::new("secret");
    let res = gateway.create_order(request(0)).await;
    assert!(matches!(res, Err(Error::Rejected { status: 400, .. })));
    Ok(())
}

#[tokio::test]
async fn callback_signature() -> Result<()> {
    let gateway = Local::new("secret");
    let order = gateway.create_order(request(100)).await?;
    let payment_id = gateway.payment_id();
    assert!(payment_id.starts_with("pay_"));

    let sig = gateway.sign(&order.id, &payment_id);
    assert!(gateway.verify_signature(&order.id, &payment_id, &sig));
    assert!(!Local::new("other").verify_signature(&order.id, &payment_id, &sig));
    assert!(!gateway.verify_signature(&order.id, "pay_other", &sig));
    Ok(())
}

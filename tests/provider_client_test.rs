//! Provider HTTP client against a mock server: request signing, price-list
//! decoding and the rate-limit escape hatch.

use bigdecimal::BigDecimal;
use mockito::Matcher;
use serde_json::json;

use topup_core::ports::TopupProvider;
use topup_core::provider::{DigiflazzClient, ProviderError, ProviderStatus};
use topup_core::signature::md5_hex;

fn client(server: &mockito::ServerGuard) -> DigiflazzClient {
    DigiflazzClient::new(server.url(), "hermes".into(), "sekret".into())
}

#[tokio::test]
async fn transaction_call_is_signed_with_the_ref_id() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/transaction")
        .match_body(Matcher::PartialJson(json!({
            "username": "hermes",
            "buyer_sku_code": "ML-100",
            "customer_no": "123456789",
            "ref_id": "HRM-000001-INV",
            "sign": md5_hex("hermessekretHRM-000001-INV"),
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": {
                    "ref_id": "HRM-000001-INV",
                    "status": "Sukses",
                    "sn": "SN-12345",
                    "message": "Sukses",
                    "price": 13500,
                    "rc": "00"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let receipt = client(&server)
        .create_transaction("ML-100", "123456789", "HRM-000001-INV")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(receipt.status, ProviderStatus::Success);
    assert_eq!(receipt.sn.as_deref(), Some("SN-12345"));
    assert_eq!(receipt.price, Some(13_500));
}

#[tokio::test]
async fn pending_transaction_with_empty_serial_has_no_sn() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/transaction")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": {
                    "ref_id": "HRM-000002-INV",
                    "status": "Pending",
                    "sn": "",
                    "message": "Sedang diproses"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let receipt = client(&server)
        .create_transaction("ML-100", "123456789", "HRM-000002-INV")
        .await
        .unwrap();

    assert_eq!(receipt.status, ProviderStatus::Pending);
    assert_eq!(receipt.sn, None);
}

#[tokio::test]
async fn price_list_decodes_entries() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/price-list")
        .match_body(Matcher::PartialJson(json!({
            "cmd": "prepaid",
            "username": "hermes",
            "sign": md5_hex("hermessekretpricelist"),
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": [
                    {
                        "brand": "Mobile Legends",
                        "buyer_sku_code": "ML-100",
                        "product_name": "100 Diamonds",
                        "price": 13500,
                        "buyer_product_status": true,
                        "seller_product_status": true
                    },
                    {
                        "brand": "Free Fire",
                        "buyer_sku_code": "FF-50",
                        "product_name": "50 Diamonds",
                        "price": 7000,
                        "buyer_product_status": true,
                        "seller_product_status": false
                    }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let entries = client(&server).price_list().await.unwrap();

    mock.assert_async().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].buyer_sku_code, "ML-100");
    assert!(entries[0].seller_product_status);
    assert!(!entries[1].seller_product_status);
}

#[tokio::test]
async fn price_list_rc_83_maps_to_rate_limited() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/price-list")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": {
                    "rc": "83",
                    "message": "Too many requests"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = client(&server).price_list().await.unwrap_err();
    assert!(matches!(err, ProviderError::RateLimited(_)));
}

#[tokio::test]
async fn balance_reads_the_deposit_field() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/cek-saldo")
        .match_body(Matcher::PartialJson(json!({
            "cmd": "deposit",
            "username": "hermes",
            "sign": md5_hex("hermessekretdepo"),
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": {"deposit": 250000}}).to_string())
        .create_async()
        .await;

    let deposit = client(&server).balance().await.unwrap();

    mock.assert_async().await;
    assert_eq!(deposit, BigDecimal::from(250_000));
}

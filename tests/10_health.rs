mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let res = common::send(common::jwt_app(), common::get("/health")).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_the_service_without_a_session() -> Result<()> {
    let res = common::send(common::jwt_app(), common::get("/")).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["session_provider"], "jwt");
    assert!(res.body["data"]["endpoints"]["organization"].is_string());
    Ok(())
}

#[tokio::test]
async fn sign_in_page_is_public() -> Result<()> {
    let res = common::send(common::jwt_app(), common::get("/auth/sign-in")).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["page"], "sign-in");
    assert_eq!(res.body["data"]["dev_sign_in"], true);
    Ok(())
}

mod common;

use nocturne_core::TestApp;

#[tokio::test]
async fn test_serves_pages_over_tcp() {
    let app = TestApp::new(common::manifest()).await;
    let res = app.client.get(&app.url("/")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    assert!(res.body.contains("<p>Hello!</p>"));
}

#[tokio::test]
async fn test_redirect_uses_host_header() {
    let app = TestApp::new(common::manifest()).await;
    let res = app.client.get(&app.url("/pages/fresh/")).await;
    assert_eq!(res.status, 307);
    assert_eq!(
        res.header("location"),
        Some(format!("http://{}/pages/fresh", app.addr).as_str())
    );
}

#[tokio::test]
async fn test_connection_info_reaches_handler() {
    let app = TestApp::new(common::manifest()).await;
    let res = app.client.get(&app.url("/connInfo")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "127.0.0.1");
}

#[tokio::test]
async fn test_not_found_over_tcp() {
    let app = TestApp::new(common::manifest()).await;
    let res = app.client.get(&app.url("/api/xyz")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body, "404 not found: /api/xyz");
}

#[tokio::test]
async fn test_post_body_over_tcp() {
    let app = TestApp::new(common::manifest()).await;
    let res = app.client.post(&app.url("/api/echo"), "hello").await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "hello");
}

#[tokio::test]
async fn test_static_revalidation_over_tcp() {
    let app = TestApp::new(common::manifest()).await;
    let res = app.client.get(&app.url("/foo.txt")).await;
    assert_eq!(res.status, 200);
    let etag = res.header("etag").unwrap().to_string();

    let res = app
        .client
        .get_with_headers(&app.url("/foo.txt"), &[("if-none-match", &etag)])
        .await;
    assert_eq!(res.status, 304);
}

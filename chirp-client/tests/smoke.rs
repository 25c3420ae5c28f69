use std::time::{SystemTime, UNIX_EPOCH};

use chirp_client::{ChirpClient, ChirpClientError};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

fn base_url() -> String {
    std::env::var("CHIRP_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
}

#[tokio::test]
#[ignore = "requires running chirp-server"]
async fn http_smoke_flow() {
    let mut client = ChirpClient::new(base_url()).expect("client");

    let suffix = unique_suffix();
    let username = format!("user_{suffix}");
    let email = format!("{suffix}@example.com");
    let password = "pw123";

    let register = client
        .register(&username, &email, password)
        .await
        .expect("register must succeed");
    assert!(!register.token.is_empty());
    assert_eq!(register.username, username);

    let login = client
        .login(&email, password)
        .await
        .expect("login by email must succeed");
    assert_eq!(login.username, username);

    let created = client
        .create_post("hello")
        .await
        .expect("create_post must succeed");
    assert_eq!(created.username, username);
    assert!(!created.edited);

    let listed = client.list_posts().await.expect("list_posts must succeed");
    assert_eq!(listed.first().map(|post| post.id), Some(created.id));

    let updated = client
        .update_post(created.id, "hi")
        .await
        .expect("update_post must succeed");
    assert!(updated.edited);
    assert_eq!(updated.created_at, created.created_at);

    let mut other = ChirpClient::new(base_url()).expect("client");
    other
        .register(&format!("other_{suffix}"), &format!("other_{suffix}@example.com"), password)
        .await
        .expect("second register must succeed");
    let forbidden = other.delete_post(created.id).await;
    assert!(matches!(forbidden, Err(ChirpClientError::Forbidden)));

    client
        .delete_post(created.id)
        .await
        .expect("delete_post must succeed");
    let after_delete = client.get_post(created.id).await;
    assert!(matches!(after_delete, Err(ChirpClientError::NotFound)));

    client.logout().await.expect("logout must succeed");
    let after_logout = client.create_post("late").await;
    assert!(matches!(after_logout, Err(ChirpClientError::Unauthorized)));
}

#[tokio::test]
#[ignore = "requires running chirp-server with ADMIN_PASSWORD set"]
async fn admin_smoke_flow() {
    let admin_password =
        std::env::var("CHIRP_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let mut client = ChirpClient::new(base_url()).expect("client");

    let suffix = unique_suffix();
    let username = format!("doomed_{suffix}");
    client
        .register(&username, &format!("doomed_{suffix}@example.com"), "pw123")
        .await
        .expect("register must succeed");
    client.create_post("bye").await.expect("create_post must succeed");

    let wrong = client.admin_stats("definitely-wrong").await;
    assert!(matches!(wrong, Err(ChirpClientError::Unauthorized)));

    let users = client
        .admin_list_users(&admin_password)
        .await
        .expect("admin_list_users must succeed");
    let id = users
        .iter()
        .find(|user| user.username == username)
        .map(|user| user.id)
        .expect("registered user is listed");

    let action = client
        .admin_delete_user(&admin_password, id)
        .await
        .expect("admin_delete_user must succeed");
    assert_eq!(action.removed.users, 1);
    assert_eq!(action.removed.posts, 1);
    assert_eq!(action.removed.sessions, 1);

    let after = client.create_post("ghost").await;
    assert!(matches!(after, Err(ChirpClientError::Unauthorized)));
}

//! ACL lifecycle against the live mock gateway.
//!
//! Starts the mock server on a random port, then drives every `AclClient`
//! operation over real HTTP through the default ureq transport.

use std::net::SocketAddr;

use acl_core::{AclError, AclFilter, AclRequest, AdminClient, Config, Consumer};

fn start_server(admin_token: Option<String>) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, admin_token).await
        })
        .unwrap();
    });

    addr
}

/// Consumers are managed outside the ACL client, so tests create them directly.
fn create_consumer(addr: SocketAddr, username: &str, token: Option<&str>) -> Consumer {
    let mut request = ureq::post(format!("http://{addr}/consumers")).content_type("application/json");
    if let Some(token) = token {
        request = request.header("Kong-Admin-Token", token);
    }
    let mut response = request
        .send(format!(r#"{{"username":"{username}"}}"#).as_bytes())
        .expect("create consumer");
    let body = response.body_mut().read_to_string().unwrap();
    serde_json::from_str(&body).unwrap()
}

#[test]
fn acl_lifecycle() {
    let addr = start_server(None);
    let admin = AdminClient::new(Config::new(&format!("http://{addr}")));
    let acls = admin.acls();

    // Step 1: list, should be empty.
    let page = acls.list().unwrap();
    assert!(page.results.is_empty(), "expected empty list");

    // Step 2: create a consumer and add it to two groups.
    let alice = create_consumer(addr, "alice", None);
    let admins = acls.create(&alice.id, &AclRequest::new("admins")).unwrap();
    let readers = acls.create(&alice.id, &AclRequest::new("readers")).unwrap();
    let admins_id = admins.id.clone().unwrap();
    assert_eq!(admins.group.as_deref(), Some("admins"));
    assert_eq!(admins.consumer_id.as_deref(), Some(alice.id.as_str()));
    assert!(admins.created_at.is_some());

    // Step 3: the owning consumer round-trips.
    let owner = acls.get_consumer_by_acl_id(&admins_id).unwrap().unwrap();
    assert_eq!(owner.id, alice.id);
    assert_eq!(owner.username.as_deref(), Some("alice"));

    // Step 4: get by id.
    let fetched = acls.get_by_id(&admins_id).unwrap().unwrap();
    assert_eq!(fetched, admins);

    // Step 5: a second consumer, then filters.
    let bob = create_consumer(addr, "bob", None);
    acls.create(&bob.id, &AclRequest::new("admins")).unwrap();

    let all = acls.list().unwrap();
    assert_eq!(all.total, 3);

    let by_consumer = acls
        .list_filtered(Some(&AclFilter::by_consumer_id(&alice.id)))
        .unwrap();
    assert_eq!(by_consumer.results.len(), 2);

    let by_id = acls.list_filtered(Some(&AclFilter::by_id(&admins_id))).unwrap();
    assert_eq!(by_id.results, vec![admins.clone()]);

    let for_bob = acls.get_acls_for_consumer(&bob.id).unwrap();
    assert_eq!(for_bob.results.len(), 1);

    // Step 6: duplicate membership is accepted over HTTP but creates nothing.
    let err = acls.create(&alice.id, &AclRequest::new("admins")).unwrap_err();
    match err {
        AclError::CreationFailed(body) => assert!(body.contains("UNIQUE violation")),
        other => panic!("expected CreationFailed, got {other:?}"),
    }

    // Step 7: delete, by id and by name.
    acls.delete_by_id(&admins_id).unwrap();
    acls.delete_by_name(readers.id.as_deref().unwrap()).unwrap();

    // Step 8: lookups after delete are empty, not errors.
    assert!(acls.get_consumer_by_acl_id(&admins_id).unwrap().is_none());
    assert!(acls.get_by_id(&admins_id).unwrap().is_none());
    let remaining = acls.get_acls_for_consumer(&alice.id).unwrap();
    assert!(remaining.results.is_empty());
}

#[test]
fn create_for_unknown_consumer_is_creation_failure() {
    let addr = start_server(None);
    let acls = AdminClient::new(Config::new(&format!("http://{addr}"))).acls();

    let err = acls.create("no-such-consumer", &AclRequest::new("admins")).unwrap_err();
    assert!(matches!(&err, AclError::CreationFailed(body) if body.contains("Not found")));
}

#[test]
fn admin_token_is_required_and_sent() {
    let addr = start_server(Some("s3cret".to_string()));

    let anonymous = AdminClient::new(Config::new(&format!("http://{addr}"))).acls();
    let err = anonymous.list().unwrap_err();
    match err {
        AclError::Unauthorized(body) => assert!(body.contains("Invalid credentials")),
        other => panic!("expected Unauthorized, got {other:?}"),
    }

    let config = Config::new(&format!("http://{addr}")).with_admin_token("s3cret");
    let authorized = AdminClient::new(config).acls();
    let carol = create_consumer(addr, "carol", Some("s3cret"));
    let acl = authorized.create(&carol.id, &AclRequest::new("ops")).unwrap();
    let owner = authorized
        .get_consumer_by_acl_id(acl.id.as_deref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(owner.id, carol.id);
}

#[test]
fn handles_are_shareable_across_threads() {
    let addr = start_server(None);
    let acls = AdminClient::new(Config::new(&format!("http://{addr}"))).acls();
    let dave = create_consumer(addr, "dave", None);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let acls = acls.clone();
            let consumer_id = dave.id.clone();
            std::thread::spawn(move || acls.create(&consumer_id, &AclRequest::new(&format!("group-{i}"))))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(acls.get_acls_for_consumer(&dave.id).unwrap().results.len(), 4);
}

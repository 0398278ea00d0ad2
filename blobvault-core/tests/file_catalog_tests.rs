mod support;

use blobvault_core::blob_store::BlobStoreClient;
use blobvault_core::file_catalog::{FileCatalog, open_share_link};
use blobvault_core::{BlobId, ErrorKind};
use std::sync::Arc;
use support::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog(server: &MockServer) -> FileCatalog {
    let config = test_config(server);
    let store = Arc::new(BlobStoreClient::new(&config).unwrap());
    FileCatalog::new(store, config.share_base_url)
}

#[tokio::test]
async fn upload_records_file() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(newly_created("F1", "0xfile")))
        .mount(&server)
        .await;

    let mut catalog = catalog(&server);
    let record = catalog
        .upload_file("cat.jpg", "image/jpeg", b"\xff\xd8\xff")
        .await
        .unwrap();

    assert_eq!(record.blob_id, BlobId::new("F1"));
    assert!(record.is_image);
    assert_eq!(record.blob_url, format!("{}/v1/F1", server.uri()));
    assert_eq!(record.object_url, "https://explorer.test/object/0xfile");
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get(&BlobId::new("F1")), Some(&record));
}

#[tokio::test]
async fn non_image_media_type() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(newly_created("F2", "0xdoc")))
        .mount(&server)
        .await;

    let mut catalog = catalog(&server);
    let record = catalog
        .upload_file("report.pdf", "application/pdf", b"%PDF")
        .await
        .unwrap();
    assert!(!record.is_image);
}

#[tokio::test]
async fn reupload_of_same_content_refreshes_entry() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(newly_created("F1", "0xfile")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(already_certified("F1", "TxF1")))
        .mount(&server)
        .await;

    let mut catalog = catalog(&server);
    catalog.upload_file("a.txt", "text/plain", b"same").await.unwrap();
    let second = catalog.upload_file("b.txt", "text/plain", b"same").await.unwrap();

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.records()[0], second);
    assert_eq!(catalog.records()[0].file_name, "b.txt");
    assert_eq!(catalog.records()[0].object_url, "https://explorer.test/tx/TxF1");
}

#[tokio::test]
async fn failed_upload_leaves_catalog_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/store"))
        .respond_with(ResponseTemplate::new(413).set_body_string("too large"))
        .mount(&server)
        .await;

    let mut catalog = catalog(&server);
    let err = catalog
        .upload_file("huge.bin", "application/octet-stream", b"xx")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UploadFailed);
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn share_link_opens_without_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(newly_created("F1", "0xfile")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/F1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let mut catalog = catalog(&server);
    let record = catalog.upload_file("hello.txt", "text/plain", b"hello").await.unwrap();
    let link = catalog.share_link(&record).unwrap();
    assert!(link.starts_with("https://app.test/filedownload?file="));

    let store = BlobStoreClient::new(&test_config(&server)).unwrap();
    let shared = open_share_link(&store, &link).await.unwrap();
    assert_eq!(shared.record, record);
    assert_eq!(shared.data, b"hello");

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests
            .iter()
            .all(|r| !r.url.path().starts_with("/api/")),
        "share links must not touch the gateway"
    );
}

#[tokio::test]
async fn expired_blob_behind_share_link_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let record = blobvault_core::FileRecord {
        file_name: "old.txt".into(),
        blob_id: BlobId::new("gone"),
        media_type: "text/plain".into(),
        blob_url: format!("{}/v1/gone", server.uri()),
        object_url: "https://explorer.test/object/0x0".into(),
        is_image: false,
    };
    let link = blobvault_core::share::share_link("https://app.test", &record).unwrap();

    let store = BlobStoreClient::new(&test_config(&server)).unwrap();
    let err = open_share_link(&store, &link).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

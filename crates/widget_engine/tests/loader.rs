use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use widget_engine::{HttpModuleFetcher, ModuleLoader};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn loader_for(uri: &str) -> ModuleLoader {
    let fetcher = HttpModuleFetcher::new(uri).expect("module fetcher");
    ModuleLoader::new(Arc::new(fetcher))
}

#[tokio::test]
async fn concurrent_loads_share_one_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prompt-bar.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(100))
                .set_body_string("export {}"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let loader = loader_for(&server.uri());
    let loads = join_all((0..8).map(|_| loader.load("prompt-bar.js"))).await;

    let first = loads[0].as_ref().expect("load ok").clone();
    for load in &loads {
        let module = load.as_ref().expect("load ok");
        // Every caller gets the same resolved instance, not a copy.
        assert!(Arc::ptr_eq(&first, module));
    }
    assert_eq!(first.bytes.as_ref(), b"export {}" as &[u8]);
}

#[tokio::test]
async fn resolved_key_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prompt-bar.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("export {}"))
        .expect(1)
        .mount(&server)
        .await;

    let loader = loader_for(&server.uri());
    let first = loader.load("prompt-bar.js").await.expect("load ok");
    let second = loader.load("prompt-bar.js").await.expect("load ok");

    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn failed_load_leaves_key_absent_for_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prompt-bar.js"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prompt-bar.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("export {}"))
        .mount(&server)
        .await;

    let loader = loader_for(&server.uri());
    let err = loader.load("prompt-bar.js").await.unwrap_err();
    assert_eq!(err.key, "prompt-bar.js");

    // The key was not poisoned: a deliberate retry succeeds.
    let module = loader.load("prompt-bar.js").await.expect("retry ok");
    assert_eq!(module.bytes.as_ref(), b"export {}" as &[u8]);
}

#[tokio::test]
async fn load_chain_aborts_on_dependency_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/runtime.js"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prompt-bar.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("export {}"))
        .expect(0)
        .mount(&server)
        .await;

    let loader = loader_for(&server.uri());
    let err = loader
        .load_chain(&["runtime.js", "prompt-bar.js"])
        .await
        .unwrap_err();

    // The dependent fetch is never issued once the dependency fails.
    assert_eq!(err.key, "runtime.js");
}

#[tokio::test]
async fn load_chain_resolves_dependency_before_dependent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/runtime.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("runtime"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prompt-bar.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("component"))
        .mount(&server)
        .await;

    let loader = loader_for(&server.uri());
    let modules = loader
        .load_chain(&["runtime.js", "prompt-bar.js"])
        .await
        .expect("chain ok");

    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0].key, "runtime.js");
    assert_eq!(modules[1].key, "prompt-bar.js");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), "/runtime.js");
    assert_eq!(requests[1].url.path(), "/prompt-bar.js");
}

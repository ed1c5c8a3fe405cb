//! End-to-end calls through the sync and async workflow clients.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::time::Duration;

use callkit::AsyncClient;
use callkit::Client;
use callkit::ClientConfig;
use callkit::ClientError;
use callkit::Transport;
use callkit::TransportError;
use callkit::mock::FnTransport;
use callkit::mock::ScriptedTransport;
use callkit::workflow::*;
use dispatch::Dispatcher;
use dispatch::DispatcherConfig;
use dispatch::Outcome;
use dispatch::State;
use dispatch::SubmitError;
use wirepack::Document;

const LONG: Duration = Duration::from_secs(10);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config() -> anyhow::Result<ClientConfig> {
    Ok(ClientConfig::new("http://localhost:8080")?.target_prefix(SERVICE))
}

fn encode(entries: Vec<(&str, Document)>) -> anyhow::Result<Vec<u8>> {
    let map: BTreeMap<String, Document> = entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    Ok(Document::Map(map).to_bytes()?)
}

fn text(v: &str) -> Document {
    Document::String(v.to_string())
}

fn domain(name: &str, status: &str) -> Document {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), text(name));
    fields.insert("status".to_string(), text(status));
    Document::Map(fields)
}

fn sync_client(transport: impl Transport) -> anyhow::Result<WorkflowClient> {
    init_tracing();
    Ok(WorkflowClient::new(Client::new(config()?, Arc::new(transport))))
}

fn async_client(transport: impl Transport, workers: usize) -> anyhow::Result<WorkflowAsyncClient> {
    init_tracing();
    let dispatcher = Arc::new(Dispatcher::new(DispatcherConfig::new().workers(workers))?);
    let client = Client::new(config()?, Arc::new(transport));
    Ok(WorkflowAsyncClient::new(AsyncClient::new(client, dispatcher)))
}

// ============================================================================
//  SYNC CLIENT
// ============================================================================

#[test]
fn describe_domain_round_trip() -> anyhow::Result<()> {
    let reply = encode(vec![
        ("domainInfo", domain("orders", "REGISTERED")),
        ("historyDistribution", text("Random")),
    ])?;
    let transport = FnTransport::new(move |request: &http::Request<Vec<u8>>| {
        if request.method() != http::Method::GET || request.uri().path() != "/domains/orders" {
            return Err(TransportError::Io(format!("unexpected route {}", request.uri())));
        }
        Ok(http::Response::new(reply.clone()))
    });

    let detail = sync_client(transport)?.describe_domain(&DescribeDomainInput { name: Some("orders".into()) })?;
    assert_eq!(detail.info.name, "orders");
    assert_eq!(detail.info.status, RegistrationStatus::Registered);
    assert_eq!(detail.history_distribution, Some(Distribution::Random));
    Ok(())
}

#[test]
fn service_errors_carry_code_and_message() -> anyhow::Result<()> {
    let body = encode(vec![("code", text("UnknownResourceFault")), ("message", text("no such domain"))])?;
    let client = sync_client(ScriptedTransport::new().reply(400, body).reply(503, Vec::new()))?;
    let input = DeprecateDomainInput { name: Some("gone".into()) };

    match client.deprecate_domain(&input) {
        Err(ClientError::Service { status, code, message }) => {
            assert_eq!(status, http::StatusCode::BAD_REQUEST);
            assert_eq!(code, "UnknownResourceFault");
            assert_eq!(message, "no such domain");
        }
        other => anyhow::bail!("unexpected result {:?}", other),
    }

    // an unreadable error body falls back to the status
    match client.deprecate_domain(&input) {
        Err(ClientError::Service { code, message, .. }) => {
            assert_eq!(code, "Unknown");
            assert_eq!(message, "Service Unavailable");
        }
        other => anyhow::bail!("unexpected result {:?}", other),
    }
    Ok(())
}

#[test]
fn transport_failures_propagate() -> anyhow::Result<()> {
    let client = sync_client(ScriptedTransport::new().fail(TransportError::Timeout))?;
    let result = client.list_domains(&ListDomainsInput::default());
    assert!(matches!(result, Err(ClientError::Transport(TransportError::Timeout))));
    Ok(())
}

#[test]
fn requests_reach_the_transport_in_order() -> anyhow::Result<()> {
    init_tracing();
    let transport = Arc::new(ScriptedTransport::new().reply(200, Vec::new()).reply(200, Vec::new()));
    let client = WorkflowClient::new(Client::new(config()?, transport.clone()));

    client.register_domain(&RegisterDomainInput { name: Some("a".into()), ..Default::default() })?;
    client.deprecate_domain(&DeprecateDomainInput { name: Some("a".into()) })?;

    let paths: Vec<String> = transport.requests().iter().map(|r| r.uri().path().to_string()).collect();
    assert_eq!(paths, vec!["/domains", "/domains/a/deprecate"]);
    Ok(())
}

// ============================================================================
//  ASYNC CLIENT
// ============================================================================

#[test]
fn async_call_notifies_callback_once() -> anyhow::Result<()> {
    let reply = encode(vec![
        ("domainInfos", Document::List(vec![domain("a", "REGISTERED"), domain("b", "DEPRECATED")])),
        ("nextPageToken", text("page-2")),
    ])?;
    let client = async_client(ScriptedTransport::new().reply(200, reply), 2)?;

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (calls_cb, seen_cb) = (calls.clone(), seen.clone());
    let handle = client.list_domains_async_with(ListDomainsInput::default(), move |outcome| {
        calls_cb.fetch_add(1, Ordering::SeqCst);
        if let Outcome::Succeeded(infos) = outcome {
            if let Ok(mut seen) = seen_cb.lock() {
                seen.extend(infos.domain_infos.iter().map(|d| d.name.clone()));
            }
        }
    })?;

    let infos = match handle.wait() {
        Outcome::Succeeded(infos) => infos,
        other => anyhow::bail!("unexpected outcome {:?}", other),
    };
    assert_eq!(infos.next_page_token.as_deref(), Some("page-2"));
    assert_eq!(infos.domain_infos.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    Ok(())
}

#[test]
fn async_failure_is_the_sync_error() -> anyhow::Result<()> {
    let body = encode(vec![("code", text("LimitExceededFault")), ("message", text("slow down"))])?;
    let client = async_client(ScriptedTransport::new().reply(429, body), 1)?;

    let input = CountPendingActivityTasksInput {
        domain: Some("orders".into()),
        task_list: Some(TaskList { name: Some("default".into()) }),
    };
    match client.count_pending_activity_tasks_async(input)?.wait() {
        Outcome::Failed(error) => assert_eq!(error.service_code(), Some("LimitExceededFault")),
        other => anyhow::bail!("unexpected outcome {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn async_call_can_be_awaited() -> anyhow::Result<()> {
    let reply = encode(vec![("count", Document::Int(3)), ("truncated", Document::Bool(true))])?;
    let client = async_client(ScriptedTransport::new().reply(200, reply), 1)?;

    let input = CountPendingActivityTasksInput { domain: Some("orders".into()), task_list: None };
    let outcome = tokio::time::timeout(LONG, client.count_pending_activity_tasks_async(input)?.outcome()).await?;
    assert_eq!(outcome.into_result().ok(), Some(PendingTaskCount { count: 3, truncated: true }));
    Ok(())
}

#[test]
fn shutdown_cancels_waiting_calls() -> anyhow::Result<()> {
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let started_tx = Mutex::new(started_tx);
    let release_rx = Mutex::new(release_rx);
    let transport = FnTransport::new(move |_: &http::Request<Vec<u8>>| {
        if let Ok(started) = started_tx.lock() {
            let _ = started.send(());
        }
        if let Ok(release) = release_rx.lock() {
            let _ = release.recv_timeout(LONG);
        }
        Ok(http::Response::new(Vec::new()))
    });
    let client = async_client(transport, 1)?;

    let running = client.deprecate_domain_async(DeprecateDomainInput { name: Some("a".into()) })?;
    started_rx.recv_timeout(LONG)?;

    let cancelled = Arc::new(AtomicUsize::new(0));
    let mut waiting = Vec::new();
    for name in ["b", "c"] {
        let cancelled = cancelled.clone();
        waiting.push(client.deprecate_domain_async_with(
            DeprecateDomainInput { name: Some(name.into()) },
            move |outcome| {
                if outcome.state() == State::Cancelled {
                    cancelled.fetch_add(1, Ordering::SeqCst);
                }
            },
        )?);
    }

    assert_eq!(client.shutdown(), 2);
    for handle in waiting {
        assert_eq!(handle.state(), State::Cancelled);
        assert!(matches!(handle.wait(), Outcome::Cancelled));
    }
    assert_eq!(cancelled.load(Ordering::SeqCst), 2);

    assert!(matches!(
        client.describe_domain_async(DescribeDomainInput { name: Some("d".into()) }),
        Err(ClientError::Submit(SubmitError::ShutDown))
    ));

    release_tx.send(())?;
    assert!(matches!(running.wait(), Outcome::Succeeded(())));
    Ok(())
}

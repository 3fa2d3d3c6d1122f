use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use servicevisor::{
    InitServiceFn, Logger, ManualClock, RuntimeError, ServiceContext, ServiceError, ServiceFn,
    ServiceRef, Status, StatusUpdate, Supervisor, SupervisorBuilder, SupervisorConfig,
    report_transient_error,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

fn start_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_000)
}

/// Supervisor running in the background, with every listener snapshot recorded.
struct Harness {
    clock: Arc<ManualClock>,
    token: CancellationToken,
    snapshots: mpsc::UnboundedReceiver<Vec<StatusUpdate>>,
    run: JoinHandle<Result<(), RuntimeError>>,
}

impl Harness {
    fn start(services: Vec<Option<ServiceRef>>) -> Self {
        Self::start_with(services, |b| b)
    }

    fn start_with(
        services: Vec<Option<ServiceRef>>,
        configure: impl FnOnce(SupervisorBuilder) -> SupervisorBuilder,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(start_time()));
        let (tx, snapshots) = mpsc::unbounded_channel();

        let builder = Supervisor::builder(SupervisorConfig::default())
            .with_services(services)
            .with_clock(clock.clone())
            .with_listener(move |snapshot: &[StatusUpdate]| {
                let _ = tx.send(snapshot.to_vec());
            });
        let mut sup = configure(builder).build();

        let token = CancellationToken::new();
        let run = tokio::spawn({
            let token = token.clone();
            async move { sup.run(token).await }
        });

        Self {
            clock,
            token,
            snapshots,
            run,
        }
    }

    async fn next(&mut self) -> Vec<StatusUpdate> {
        timeout(WAIT, self.snapshots.recv())
            .await
            .expect("timed out waiting for a snapshot")
            .expect("supervisor dropped its listeners")
    }

    /// Asserts the statuses of the next snapshot.
    async fn expect(&mut self, want: &[Status]) -> Vec<StatusUpdate> {
        let snapshot = self.next().await;
        assert_eq!(statuses(&snapshot), want);
        snapshot
    }

    async fn wait_for(&mut self, pred: impl Fn(&[StatusUpdate]) -> bool) -> Vec<StatusUpdate> {
        loop {
            let snapshot = self.next().await;
            if pred(&snapshot) {
                return snapshot;
            }
        }
    }

    fn tick(&self) {
        assert_eq!(self.clock.tick(), 1, "supervisor ticker must be listening");
    }

    /// Cancels the run, waits for it, and returns the snapshots published meanwhile.
    async fn shutdown(self) -> (Result<(), RuntimeError>, Vec<Vec<StatusUpdate>>) {
        let Harness {
            token,
            run,
            mut snapshots,
            ..
        } = self;

        token.cancel();
        let res = timeout(WAIT, run)
            .await
            .expect("run must return after cancellation")
            .expect("run task panicked");

        let mut rest = Vec::new();
        while let Ok(snapshot) = snapshots.try_recv() {
            rest.push(snapshot);
        }
        (res, rest)
    }
}

fn statuses(snapshot: &[StatusUpdate]) -> Vec<Status> {
    snapshot.iter().map(|u| u.status).collect()
}

fn until_cancelled(name: &'static str) -> ServiceRef {
    ServiceFn::arc(name, |ctx: ServiceContext| async move {
        ctx.cancelled().await;
        Ok::<(), ServiceError>(())
    })
}

#[tokio::test]
async fn empty_supervisor_returns_on_cancel() {
    let mut sup = Supervisor::new(SupervisorConfig::default(), Vec::new());
    assert!(sup.is_empty());

    let token = CancellationToken::new();
    token.cancel();
    let res = timeout(WAIT, sup.run(token)).await.expect("run must return");
    assert!(res.is_ok());
}

#[tokio::test]
async fn single_service_runs_then_stops_on_cancel() {
    let mut h = Harness::start(vec![Some(until_cancelled("worker"))]);

    let first = h.expect(&[Status::Idle]).await;
    assert_eq!(first[0].service_id, 0);
    assert_eq!(&*first[0].service_name, "worker");
    assert_eq!(first[0].time, start_time());

    h.expect(&[Status::Running]).await;

    let (res, rest) = h.shutdown().await;
    assert!(res.is_ok());
    let last = rest.last().expect("final snapshot");
    assert_eq!(statuses(last), vec![Status::Stopped]);
    assert!(last[0].error.is_none());
}

#[tokio::test]
async fn empty_entries_are_skipped_and_snapshots_keep_their_length() {
    let services = vec![
        None,
        Some(until_cancelled("a")),
        None,
        Some(until_cancelled("b")),
    ];
    let mut h = Harness::start(services);

    let snapshot = h
        .wait_for(|s| s.iter().all(|u| u.status == Status::Running))
        .await;
    let names: Vec<&str> = snapshot.iter().map(|u| &*u.service_name).collect();
    assert_eq!(names, vec!["a", "b"]);
    for (idx, update) in snapshot.iter().enumerate() {
        assert_eq!(update.service_id, idx);
    }

    let (_, rest) = h.shutdown().await;
    assert!(rest.iter().all(|s| s.len() == 2));
}

#[tokio::test]
async fn services_reports_registry_identity() {
    let init: ServiceRef = InitServiceFn::arc(
        "init",
        |_ctx: ServiceContext| async { Ok::<(), ServiceError>(()) },
        |_ctx: ServiceContext| async { Ok::<(), ServiceError>(()) },
    );
    let sup = Supervisor::new(
        SupervisorConfig::default(),
        vec![Some(until_cancelled("plain")), None, Some(init)],
    );

    assert_eq!(sup.len(), 2);
    let infos = sup.services();
    assert_eq!((infos[0].id, &*infos[0].name, infos[0].initializes), (0, "plain", false));
    assert_eq!((infos[1].id, &*infos[1].name, infos[1].initializes), (1, "init", true));
}

#[tokio::test]
async fn failed_service_is_relaunched_on_tick() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let svc: ServiceRef = ServiceFn::arc("flaky", {
        let attempts = Arc::clone(&attempts);
        move |ctx: ServiceContext| {
            let attempts = Arc::clone(&attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    return Err::<(), _>(ServiceError::fail("boom"));
                }
                ctx.cancelled().await;
                Err(ServiceError::fail("shutting down"))
            }
        }
    });
    let mut h = Harness::start(vec![Some(svc)]);

    h.expect(&[Status::Idle]).await;
    h.expect(&[Status::Running]).await;
    let failed = h.expect(&[Status::Error]).await;
    assert_eq!(failed[0].error, Some(ServiceError::fail("boom")));

    h.clock.advance(Duration::from_secs(1));
    h.tick();
    let relaunched = h.expect(&[Status::Idle]).await;
    assert_eq!(relaunched[0].time, start_time() + Duration::from_secs(1));
    assert!(relaunched[0].error.is_none());
    h.expect(&[Status::Running]).await;

    let (res, rest) = h.shutdown().await;
    assert!(res.is_ok());
    let last = rest.last().expect("final snapshot");
    assert_eq!(statuses(last), vec![Status::Error]);
    assert_eq!(last[0].error, Some(ServiceError::fail("shutting down")));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn panicking_service_is_contained_and_relaunched() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let svc: ServiceRef = ServiceFn::arc("faulty", {
        let attempts = Arc::clone(&attempts);
        move |ctx: ServiceContext| {
            let attempts = Arc::clone(&attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("kaboom");
                }
                ctx.cancelled().await;
                Ok::<(), ServiceError>(())
            }
        }
    });
    let mut h = Harness::start(vec![Some(svc)]);

    h.expect(&[Status::Idle]).await;
    h.expect(&[Status::Running]).await;
    let crashed = h.expect(&[Status::Panic]).await;
    match &crashed[0].error {
        Some(ServiceError::Panic { message, .. }) => assert_eq!(message, "kaboom"),
        other => panic!("expected a panic error, got {other:?}"),
    }

    h.tick();
    h.expect(&[Status::Idle]).await;
    h.expect(&[Status::Running]).await;

    let (res, rest) = h.shutdown().await;
    assert!(res.is_ok());
    assert_eq!(statuses(rest.last().expect("final snapshot")), vec![Status::Stopped]);
}

#[tokio::test]
async fn initialization_failure_never_reaches_running() {
    let runs = Arc::new(AtomicUsize::new(0));
    let svc: ServiceRef = InitServiceFn::arc(
        "db",
        |_ctx: ServiceContext| async { Err::<(), _>(ServiceError::fail("no route to host")) },
        {
            let runs = Arc::clone(&runs);
            move |_ctx: ServiceContext| {
                runs.fetch_add(1, Ordering::SeqCst);
                async { Ok::<(), ServiceError>(()) }
            }
        },
    );
    let mut h = Harness::start(vec![Some(svc)]);

    h.expect(&[Status::Idle]).await;
    h.expect(&[Status::Initializing]).await;
    let failed = h.expect(&[Status::Error]).await;
    assert_eq!(failed[0].error, Some(ServiceError::fail("no route to host")));

    let (res, _) = h.shutdown().await;
    assert!(res.is_ok());
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_service_is_relaunched_on_every_tick() {
    let runs = Arc::new(AtomicUsize::new(0));
    let svc: ServiceRef = ServiceFn::arc("broken", {
        let runs = Arc::clone(&runs);
        move |_ctx: ServiceContext| {
            runs.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ServiceError::fail("always")) }
        }
    });
    let mut h = Harness::start(vec![Some(svc)]);

    h.expect(&[Status::Idle]).await;
    h.expect(&[Status::Running]).await;
    h.expect(&[Status::Error]).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    for round in 2..=6 {
        h.tick();
        h.expect(&[Status::Idle]).await;
        h.expect(&[Status::Running]).await;
        let failed = h.expect(&[Status::Error]).await;
        assert_eq!(failed[0].error, Some(ServiceError::fail("always")));
        assert_eq!(runs.load(Ordering::SeqCst), round);
    }

    let (res, _) = h.shutdown().await;
    assert!(res.is_ok());
}

#[tokio::test]
async fn failed_initialization_is_retried_on_every_tick() {
    let inits = Arc::new(AtomicUsize::new(0));
    let runs = Arc::new(AtomicUsize::new(0));
    let svc: ServiceRef = InitServiceFn::arc(
        "db",
        {
            let inits = Arc::clone(&inits);
            move |_ctx: ServiceContext| {
                inits.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(ServiceError::fail("no route to host")) }
            }
        },
        {
            let runs = Arc::clone(&runs);
            move |_ctx: ServiceContext| {
                runs.fetch_add(1, Ordering::SeqCst);
                async { Ok::<(), ServiceError>(()) }
            }
        },
    );
    let mut h = Harness::start(vec![Some(svc)]);

    for round in 1..=4 {
        if round > 1 {
            h.tick();
        }
        h.expect(&[Status::Idle]).await;
        h.expect(&[Status::Initializing]).await;
        h.expect(&[Status::Error]).await;
        assert_eq!(inits.load(Ordering::SeqCst), round);
    }

    let (res, _) = h.shutdown().await;
    assert!(res.is_ok());
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn late_report_from_finished_cycle_is_rejected() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let (late_tx, mut late_rx) = mpsc::unbounded_channel();
    let svc: ServiceRef = ServiceFn::arc("leaky", {
        let attempts = Arc::clone(&attempts);
        move |ctx: ServiceContext| {
            let attempts = Arc::clone(&attempts);
            let late_tx = late_tx.clone();
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    // Detached work keeps the context past the end of the cycle.
                    let detached = ctx.clone();
                    tokio::spawn(async move {
                        detached.cancelled().await;
                        let res = detached
                            .report_transient_error(Some(ServiceError::fail("late")))
                            .await;
                        let _ = late_tx.send(res);
                    });
                    return Err::<(), _>(ServiceError::fail("boom"));
                }
                ctx.cancelled().await;
                Ok(())
            }
        }
    });
    let mut h = Harness::start(vec![Some(svc)]);

    h.expect(&[Status::Idle]).await;
    h.expect(&[Status::Running]).await;
    h.expect(&[Status::Error]).await;

    let late = timeout(WAIT, late_rx.recv())
        .await
        .expect("timed out waiting for the late report")
        .expect("late report dropped");
    assert!(matches!(late, Err(RuntimeError::Canceled)), "{late:?}");

    // Still terminal, so the next tick relaunches it.
    h.tick();
    h.expect(&[Status::Idle]).await;
    h.expect(&[Status::Running]).await;

    let (res, rest) = h.shutdown().await;
    assert!(res.is_ok());
    assert_eq!(statuses(rest.last().expect("final snapshot")), vec![Status::Stopped]);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn transient_errors_are_reported_without_stopping() {
    let svc: ServiceRef = ServiceFn::arc("cache", |ctx: ServiceContext| async move {
        ctx.report_transient_error(Some(ServiceError::fail("backend slow")))
            .await
            .map_err(ServiceError::fail)?;
        report_transient_error(&ctx, None)
            .await
            .map_err(ServiceError::fail)?;
        ctx.cancelled().await;
        Ok::<(), ServiceError>(())
    });
    let mut h = Harness::start(vec![Some(svc)]);

    h.expect(&[Status::Idle]).await;
    h.expect(&[Status::Running]).await;
    let degraded = h.expect(&[Status::TransientError]).await;
    assert!(degraded[0].is_alive());
    assert_eq!(degraded[0].error, Some(ServiceError::fail("backend slow")));
    let recovered = h.expect(&[Status::Running]).await;
    assert!(recovered[0].error.is_none());

    // Alive services are never relaunched.
    h.tick();

    let (res, rest) = h.shutdown().await;
    assert!(res.is_ok());
    assert_eq!(rest.len(), 1);
    assert_eq!(statuses(&rest[0]), vec![Status::Stopped]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_services_share_one_status_channel() {
    const N: usize = 10;
    let (rendezvous, mut arrivals) = mpsc::channel::<usize>(1);
    let services = (0..N)
        .map(|i| {
            let rendezvous = rendezvous.clone();
            Some(ServiceFn::arc(format!("svc-{i}"), move |ctx: ServiceContext| {
                let rendezvous = rendezvous.clone();
                async move {
                    let _ = rendezvous.send(i).await;
                    ctx.cancelled().await;
                    Ok::<(), ServiceError>(())
                }
            }) as ServiceRef)
        })
        .collect();
    drop(rendezvous);
    let mut h = Harness::start(services);

    let first = h.next().await;
    assert_eq!(statuses(&first), vec![Status::Idle; N]);

    let mut seen = Vec::with_capacity(N);
    while seen.len() < N {
        let id = timeout(WAIT, arrivals.recv())
            .await
            .expect("timed out waiting for a service")
            .expect("rendezvous closed");
        seen.push(id);
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..N).collect::<Vec<_>>());

    h.wait_for(|s| s.iter().all(|u| u.status == Status::Running))
        .await;

    let (res, rest) = h.shutdown().await;
    assert!(res.is_ok());
    assert!(rest.iter().all(|s| s.len() == N));
    let last = rest.last().expect("final snapshot");
    assert_eq!(statuses(last), vec![Status::Stopped; N]);
    for (idx, update) in last.iter().enumerate() {
        assert_eq!(update.service_id, idx);
        assert_eq!(&*update.service_name, format!("svc-{idx}"));
    }
}

#[tokio::test]
async fn shutdown_waits_for_every_service() {
    const N: usize = 3;
    let finished = Arc::new(AtomicUsize::new(0));
    let services = (0..N)
        .map(|i| {
            let finished = Arc::clone(&finished);
            Some(ServiceFn::arc(format!("slow-{i}"), move |ctx: ServiceContext| {
                let finished = Arc::clone(&finished);
                async move {
                    ctx.cancelled().await;
                    tokio::time::sleep(Duration::from_millis(20 * (i as u64 + 1))).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), ServiceError>(())
                }
            }) as ServiceRef)
        })
        .collect();
    let mut h = Harness::start(services);

    h.wait_for(|s| s.iter().all(|u| u.status == Status::Running))
        .await;

    let (res, rest) = h.shutdown().await;
    assert!(res.is_ok());
    assert_eq!(finished.load(Ordering::SeqCst), N);
    assert_eq!(statuses(rest.last().expect("final snapshot")), vec![Status::Stopped; N]);
}

#[tokio::test]
async fn no_relaunch_after_cancellation() {
    let runs = Arc::new(AtomicUsize::new(0));
    let svc: ServiceRef = ServiceFn::arc("broken", {
        let runs = Arc::clone(&runs);
        move |_ctx: ServiceContext| {
            runs.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ServiceError::fail("always")) }
        }
    });
    let mut h = Harness::start(vec![Some(svc)]);
    h.wait_for(|s| s[0].status == Status::Error).await;

    h.token.cancel();
    // May race with the loop noticing cancellation; either way nothing is relaunched.
    h.clock.tick();

    let (res, rest) = h.shutdown().await;
    assert!(res.is_ok());
    assert!(rest.iter().all(|s| s[0].status == Status::Error));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn run_returns_ok_even_when_services_fail() {
    let svc: ServiceRef = ServiceFn::arc("broken", |_ctx: ServiceContext| async {
        Err::<(), _>(ServiceError::fail("always"))
    });
    let mut h = Harness::start(vec![Some(svc)]);
    h.wait_for(|s| s[0].status == Status::Error).await;

    let (res, _) = h.shutdown().await;
    assert!(res.is_ok(), "failures are only visible through listeners");
}

#[tokio::test]
async fn listeners_are_called_in_registration_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut h = Harness::start_with(vec![Some(until_cancelled("worker"))], |b| {
        let first = Arc::clone(&calls);
        let second = Arc::clone(&calls);
        b.with_listener(move |_: &[StatusUpdate]| first.lock().unwrap().push("first"))
            .with_listener(move |_: &[StatusUpdate]| second.lock().unwrap().push("second"))
    });
    h.expect(&[Status::Idle]).await;
    h.expect(&[Status::Running]).await;
    let (res, _) = h.shutdown().await;
    assert!(res.is_ok());

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 6);
    for pair in calls.chunks(2) {
        assert_eq!(pair, ["first", "second"]);
    }
}

#[derive(Default)]
struct RecordingLogger {
    debug: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl Logger for RecordingLogger {
    fn debug(&self, args: fmt::Arguments<'_>) {
        self.debug.lock().unwrap().push(args.to_string());
    }

    fn warning(&self, args: fmt::Arguments<'_>) {
        self.warnings.lock().unwrap().push(args.to_string());
    }
}

#[tokio::test]
async fn logger_sees_updates_and_restarts() {
    let logger = Arc::new(RecordingLogger::default());
    let saw_logger = Arc::new(AtomicBool::new(false));
    let svc: ServiceRef = ServiceFn::arc("flaky", {
        let saw_logger = Arc::clone(&saw_logger);
        move |ctx: ServiceContext| {
            let saw_logger = Arc::clone(&saw_logger);
            async move {
                let bound = ctx.logger().is_some()
                    && ctx.service_name() == Some("flaky")
                    && ctx.service_id() == Some(0);
                saw_logger.store(bound, Ordering::SeqCst);
                Err::<(), _>(ServiceError::fail("boom"))
            }
        }
    });
    let mut h = Harness::start_with(vec![Some(svc)], {
        let logger = Arc::clone(&logger);
        |b| b.with_logger(logger)
    });

    h.wait_for(|s| s[0].status == Status::Error).await;
    h.tick();
    h.expect(&[Status::Idle]).await;
    let (res, _) = h.shutdown().await;
    assert!(res.is_ok());

    assert!(saw_logger.load(Ordering::SeqCst));
    let warnings = logger.warnings.lock().unwrap();
    assert!(
        warnings.iter().any(|w| w.starts_with("restarting service flaky")),
        "{warnings:?}"
    );
    let debug = logger.debug.lock().unwrap();
    assert!(debug.iter().any(|d| d.starts_with("received update:")));
}

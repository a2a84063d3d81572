//! IndicatorService end to end: real controller tasks, the real timer
//! service and a recording output driver.  Timing checks use generous
//! bounds so they hold on a loaded CI host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::{Duration, Instant};

use blinkfsm::app::commands::{IndicatorCommand, Preset};
use blinkfsm::app::ports::OutputDriver;
use blinkfsm::app::service::IndicatorService;
use blinkfsm::config::{IndicatorConfig, SystemConfig};
use blinkfsm::error::Error;
use blinkfsm::events::ActuatorId;
use blinkfsm::mailbox::MAILBOX_DEPTH;

use crate::mock_hw::{OutputLog, RecordingDriver, edges_for};

fn start(config: &SystemConfig) -> (IndicatorService, OutputLog) {
    let log: OutputLog = Arc::new(Mutex::new(Vec::new()));
    let service = IndicatorService::start(config, |_, _| {
        Ok(RecordingDriver { log: log.clone() })
    })
    .unwrap();
    (service, log)
}

fn wait_until(within: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn default_board_has_four_named_indicators() {
    let (service, _log) = start(&SystemConfig::default());
    assert_eq!(service.len(), 4);
    let names: Vec<_> = service.ids().map(|id| service.name(id).unwrap()).collect();
    assert_eq!(names, ["LED1", "LED2", "LED3", "LED4"]);
    assert_eq!(service.name(ActuatorId(4)), None);
}

#[test]
fn init_then_solid_on() {
    let (service, log) = start(&SystemConfig::default());
    let led = ActuatorId(0);
    service.init(led);
    service.set_solid(led, true);

    assert!(wait_until(Duration::from_secs(2), || edges_for(&log, led).len() == 2));
    let edges: Vec<bool> = edges_for(&log, led).into_iter().map(|(on, _)| on).collect();
    assert_eq!(edges, [false, true]);
}

#[test]
fn pulse_toggles_through_real_timers() {
    let (service, log) = start(&SystemConfig::default());
    let led = ActuatorId(2);
    service.init(led);
    service.pulse(led, 20, 40);

    // init off, then on/off/on/off...
    assert!(wait_until(Duration::from_secs(3), || edges_for(&log, led).len() >= 6));
    let edges = edges_for(&log, led);
    for pair in edges.windows(2) {
        assert_ne!(pair[0].0, pair[1].0, "output must alternate");
    }
    // The first on phase lasts at least its programmed 20 ms.
    assert!(edges[2].1.duration_since(edges[1].1) >= Duration::from_millis(20));
}

#[test]
fn heartbeat_pauses_between_cycles() {
    let (service, log) = start(&SystemConfig::default());
    let led = ActuatorId(3);
    service.init(led);
    service.pattern(led, 2, 20, 30, 300);

    // off(init), on, off, on, off, [delay], on
    assert!(wait_until(Duration::from_secs(3), || edges_for(&log, led).len() >= 6));
    let edges = edges_for(&log, led);
    let second_off = edges[4].1;
    let restart = edges[5].1;
    assert!(edges[5].0);
    assert!(restart.duration_since(second_off) >= Duration::from_millis(300 + 30));
}

#[test]
fn requests_before_init_are_rejected() {
    let (service, log) = start(&SystemConfig::default());
    let led = ActuatorId(1);
    service.set_solid(led, true);
    service.preset(led, Preset::Fast);
    assert_eq!(service.rejected(), 2);

    sleep(Duration::from_millis(50));
    assert!(edges_for(&log, led).is_empty());
}

#[test]
fn unknown_ids_are_rejected() {
    let (service, _log) = start(&SystemConfig::default());
    service.init(ActuatorId(9));
    service.set_solid(ActuatorId(200), false);
    assert_eq!(service.rejected(), 2);
    assert_eq!(service.dropped_posts(ActuatorId(9)), 0);
}

#[test]
fn startup_commands_run_after_init_all() {
    let (service, log) = start(&SystemConfig::default());
    service.init_all();
    service.apply_startup(&SystemConfig::default());

    // LED1 starts solid on: off from init, then on.
    let led1 = ActuatorId(0);
    assert!(wait_until(Duration::from_secs(2), || edges_for(&log, led1).len() >= 2));
    sleep(Duration::from_millis(100));
    let edges: Vec<bool> = edges_for(&log, led1).into_iter().map(|(on, _)| on).collect();
    assert_eq!(edges, [false, true]);

    // LED3 (fast blink) is toggling.
    assert!(wait_until(Duration::from_secs(3), || edges_for(&log, ActuatorId(2)).len() >= 3));
}

#[test]
fn flood_overflows_mailbox_without_blocking() {
    let mut config = SystemConfig::default();
    config.indicators.truncate(1);
    // The driver stalls so the controller cannot drain the mailbox.
    let gate = Arc::new(Mutex::new(()));
    let held = gate.lock().unwrap();
    let log: OutputLog = Arc::new(Mutex::new(Vec::new()));
    let service = IndicatorService::start(&config, {
        let gate = gate.clone();
        let log = log.clone();
        move |_, _| {
            Ok(GatedDriver {
                gate: gate.clone(),
                inner: RecordingDriver { log: log.clone() },
            })
        }
    })
    .unwrap();

    let led = ActuatorId(0);
    service.init(led);
    // Let the controller pick up Init and block inside the driver.
    sleep(Duration::from_millis(50));
    for _ in 0..MAILBOX_DEPTH + 3 {
        service.set_solid(led, true);
    }
    assert_eq!(service.dropped_posts(led), 3);

    drop(held);
    assert!(wait_until(Duration::from_secs(2), || !edges_for(&log, led).is_empty()));
}

#[test]
fn apply_accepts_config_commands() {
    let (service, log) = start(&SystemConfig::default());
    let led = ActuatorId(1);
    service.init(led);
    service.apply(led, IndicatorCommand::On);
    service.apply(led, IndicatorCommand::Off);
    assert!(wait_until(Duration::from_secs(2), || edges_for(&log, led).len() == 3));
}

#[test]
fn invalid_config_fails_to_start() {
    let mut config = SystemConfig::default();
    config.indicators.clear();
    let err = IndicatorService::start(&config, |_, _| {
        Ok(RecordingDriver {
            log: Arc::new(Mutex::new(Vec::new())),
        })
    })
    .err();
    assert_eq!(err, Some(Error::Config("no indicators configured")));
}

#[test]
fn driver_factory_errors_abort_start() {
    let mut config = SystemConfig::default();
    config.indicators.truncate(2);
    config.indicators[1] = IndicatorConfig {
        name: "bad".try_into().unwrap(),
        gpio: 40,
        active_low: false,
        startup: None,
    };
    let err = IndicatorService::start(&config, |_, ind| {
        if ind.gpio == 40 {
            Err(Error::Init("gpio output"))
        } else {
            Ok(RecordingDriver {
                log: Arc::new(Mutex::new(Vec::new())),
            })
        }
    })
    .err();
    assert_eq!(err, Some(Error::Init("gpio output")));
}

#[test]
fn failed_start_releases_drivers_already_built() {
    let built = Arc::new(AtomicUsize::new(0));
    let dropped = Arc::new(AtomicUsize::new(0));
    let err = IndicatorService::start(&SystemConfig::default(), |id, _| {
        if id == ActuatorId(3) {
            return Err(Error::Init("gpio output"));
        }
        built.fetch_add(1, Ordering::SeqCst);
        Ok(CountingDriver {
            dropped: dropped.clone(),
        })
    })
    .err();

    assert_eq!(err, Some(Error::Init("gpio output")));
    assert_eq!(built.load(Ordering::SeqCst), 3);
    // No controller task outlives the failed start.
    sleep(Duration::from_millis(50));
    assert_eq!(dropped.load(Ordering::SeqCst), 3);
}

struct CountingDriver {
    dropped: Arc<AtomicUsize>,
}

impl OutputDriver for CountingDriver {
    fn set_output(&mut self, _id: ActuatorId, _on: bool) {}
}

impl Drop for CountingDriver {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

struct GatedDriver {
    gate: Arc<Mutex<()>>,
    inner: RecordingDriver,
}

impl OutputDriver for GatedDriver {
    fn set_output(&mut self, id: ActuatorId, on: bool) {
        let _pass = self.gate.lock().unwrap();
        self.inner.set_output(id, on);
    }
}

use ppsim_core::kernel::Tophat;
use ppsim_core::model::Model;
use ppsim_core::processes::{Consume, Death, Immigration};
use ppsim_core::simulator::Simulator;
use ppsim_core::writers::Writer;
use std::cell::RefCell;
use std::io;
use std::rc::Rc;

/// S1 - a population governed only by a constant per-point death rate goes
/// extinct in finite time, and the simulator halts on zero propensity.
#[test]
fn pure_death_reaches_extinction() {
    let mut model = Model::new();
    model.add1(Box::new(Death::new(1, 1.0))).unwrap();
    model.finalize();

    let mut sim = Simulator::new(model, 10.0, 1);
    sim.fill(1, 1.0).unwrap(); // area = 100, density 1 => ~100 points

    sim.run(20.0).unwrap();

    assert_eq!(sim.state().total_count(), 0);
    assert!(sim.state().stats.time <= 20.0);
    assert!(sim.halt_reason().contains("propensity"));
}

/// S2 - immigration balanced against density-independent death settles into
/// a steady state whose time-averaged population matches rate*area/death_rate.
#[test]
fn immigration_death_reaches_steady_state() {
    let mut model = Model::new();
    model.add0(Box::new(Immigration::new(1, 1.0))).unwrap();
    model.add1(Box::new(Death::new(1, 1.0))).unwrap();
    model.finalize();

    let mut sim = Simulator::new(model, 10.0, 7);
    sim.fill(1, 1.0).unwrap(); // seed near the expected equilibrium of 100

    // Long warmup and measurement windows: the time-averaged estimator's
    // variance shrinks with measured time (roughly one independent sample
    // per point lifetime, ~1 time unit here), so a wide window is what
    // keeps a single-seed run inside +-10% instead of being flaky.
    let warmup_events: u64 = 10_000;
    let total_events: u64 = 410_000;
    sim.add_halting_condition(move |state| state.stats.total_events >= total_events);

    let mut weighted_sum = 0.0;
    let mut measured_time = 0.0;
    while !sim.is_done() {
        let events_before = sim.state().stats.total_events;
        let tau = sim.step().unwrap();
        if events_before >= warmup_events {
            weighted_sum += tau * sim.state().count(1) as f64;
            measured_time += tau;
        }
    }

    let mean = weighted_sum / measured_time;
    assert!(
        (mean - 100.0).abs() / 100.0 < 0.10,
        "expected mean count within 10% of 100, got {mean}"
    );
}

/// S5 - the consume tracker's live configuration count always equals the
/// number of ordered (consumer, resource) pairs within the kernel's radius.
#[test]
fn consume_configuration_count_matches_brute_force() {
    let mut model = Model::new();
    model.add0(Box::new(Immigration::new(1, 0.5))).unwrap();
    model.add1(Box::new(Death::new(1, 0.2))).unwrap();
    model
        .add2(Box::new(Consume::new(1, 0, Box::new(Tophat::new(1.0, 1.0)))))
        .unwrap();
    model.finalize();

    let mut sim = Simulator::new(model, 10.0, 3);
    sim.fill(0, 2.0).unwrap();
    sim.fill(1, 0.5).unwrap();

    for _ in 0..200 {
        if sim.is_done() {
            break;
        }
        sim.step().unwrap();

        let state = sim.state();
        let consumers: Vec<_> = state.enumerate().into_iter().filter(|h| h.entity == 1).collect();
        let resources: Vec<_> = state.enumerate().into_iter().filter(|h| h.entity == 0).collect();

        let mut expected = 0i64;
        for &p in &consumers {
            for &q in &resources {
                let d = state.point(p).torus_squared_distance(state.point(q), state.u());
                if d <= 1.0 {
                    expected += 1;
                }
            }
        }

        let actual = sim.model().tracker(2).configuration_count().unwrap();
        assert_eq!(actual, expected);
    }
}

struct RecordingWriter {
    log: Rc<RefCell<Vec<(usize, f64)>>>,
}

impl Writer for RecordingWriter {
    fn start(&mut self, _state: &ppsim_core::state::SimulationState) -> io::Result<()> {
        Ok(())
    }

    fn process_activated(
        &mut self,
        _state: &ppsim_core::state::SimulationState,
        tau: f64,
        process_id: usize,
    ) -> io::Result<()> {
        self.log.borrow_mut().push((process_id, tau));
        Ok(())
    }

    fn end(&mut self, _state: &ppsim_core::state::SimulationState) -> io::Result<()> {
        Ok(())
    }
}

fn build_model() -> Model {
    let mut model = Model::new();
    model.add0(Box::new(Immigration::new(1, 1.0))).unwrap();
    model.add1(Box::new(Death::new(1, 1.0))).unwrap();
    model
        .add2(Box::new(Consume::new(1, 0, Box::new(Tophat::new(1.0, 1.0)))))
        .unwrap();
    model.finalize();
    model
}

/// S6 - two runs built from identical seed, model and initial state produce
/// identical (process, tau) event streams.
#[test]
fn identical_seed_produces_identical_event_stream() {
    let log_a = Rc::new(RefCell::new(Vec::new()));
    let mut sim_a = Simulator::new(build_model(), 10.0, 99);
    sim_a.fill(0, 2.0).unwrap();
    sim_a.fill(1, 0.5).unwrap();
    sim_a.add_halting_condition(|state| state.stats.total_events >= 500);
    sim_a.add_writer(Box::new(RecordingWriter { log: log_a.clone() }));
    sim_a.run(f64::INFINITY).unwrap();

    let log_b = Rc::new(RefCell::new(Vec::new()));
    let mut sim_b = Simulator::new(build_model(), 10.0, 99);
    sim_b.fill(0, 2.0).unwrap();
    sim_b.fill(1, 0.5).unwrap();
    sim_b.add_halting_condition(|state| state.stats.total_events >= 500);
    sim_b.add_writer(Box::new(RecordingWriter { log: log_b.clone() }));
    sim_b.run(f64::INFINITY).unwrap();

    assert_eq!(*log_a.borrow(), *log_b.borrow());
}

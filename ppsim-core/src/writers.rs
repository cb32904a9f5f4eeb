use crate::state::SimulationState;
use std::io::{self, Write};

/// Observes a running simulation. `start`/`end` bracket a `run`; between
/// them, `process_activated` fires after every step.
pub trait Writer {
    fn start(&mut self, state: &SimulationState) -> io::Result<()>;
    fn process_activated(&mut self, state: &SimulationState, tau: f64, process_id: usize) -> io::Result<()>;
    fn end(&mut self, state: &SimulationState) -> io::Result<()>;
}

/// Dumps every point's entity and coordinate at a fixed time interval.
///
/// Line format: `time total_events (entity x y)*`.
pub struct SnapshotWriter<W: Write> {
    out: W,
    delta: f64,
    accumulated: f64,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(out: W, delta: f64) -> Self {
        SnapshotWriter {
            out,
            delta,
            accumulated: 0.0,
        }
    }

    fn write_state(&mut self, state: &SimulationState) -> io::Result<()> {
        write!(self.out, "{} {}", state.stats.time, state.stats.total_events)?;
        for handle in state.enumerate() {
            let p = state.point(handle);
            write!(self.out, " {} {} {}", p.entity(), p.coord().x(), p.coord().y())?;
        }
        writeln!(self.out)
    }
}

impl<W: Write> Writer for SnapshotWriter<W> {
    fn start(&mut self, state: &SimulationState) -> io::Result<()> {
        self.write_state(state)
    }

    fn process_activated(&mut self, state: &SimulationState, tau: f64, _process_id: usize) -> io::Result<()> {
        self.accumulated += tau;
        if self.accumulated >= self.delta {
            self.write_state(state)?;
            self.accumulated = 0.0;
        }
        Ok(())
    }

    fn end(&mut self, state: &SimulationState) -> io::Result<()> {
        self.write_state(state)
    }
}

/// Dumps per-entity point counts at a fixed time interval.
///
/// Header: `time\tevents\t0\t1\t...\tE`; one data row per emission.
pub struct DensityWriter<W: Write> {
    out: W,
    delta: f64,
    accumulated: f64,
}

impl<W: Write> DensityWriter<W> {
    pub fn new(out: W, delta: f64) -> Self {
        DensityWriter {
            out,
            delta,
            accumulated: 0.0,
        }
    }

    fn write_state(&mut self, state: &SimulationState) -> io::Result<()> {
        write!(self.out, "{}\t{}", state.stats.time, state.stats.total_events)?;
        for entity in 0..=state.max_entity_id() {
            write!(self.out, "\t{}", state.count(entity))?;
        }
        writeln!(self.out)
    }
}

impl<W: Write> Writer for DensityWriter<W> {
    fn start(&mut self, state: &SimulationState) -> io::Result<()> {
        write!(self.out, "time\tevents")?;
        for entity in 0..=state.max_entity_id() {
            write!(self.out, "\t{entity}")?;
        }
        writeln!(self.out)?;
        self.write_state(state)
    }

    fn process_activated(&mut self, state: &SimulationState, tau: f64, _process_id: usize) -> io::Result<()> {
        self.accumulated += tau;
        if self.accumulated >= self.delta {
            self.write_state(state)?;
            self.accumulated = 0.0;
        }
        Ok(())
    }

    fn end(&mut self, state: &SimulationState) -> io::Result<()> {
        self.write_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::EntityId;

    #[test]
    fn density_writer_header_lists_every_entity() {
        let state = SimulationState::new(10.0, 2, 1, 1);
        let mut buf = Vec::new();
        {
            let mut w = DensityWriter::new(&mut buf, 1.0);
            w.start(&state).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, "time\tevents\t0\t1\t2");
    }

    #[test]
    fn snapshot_writer_emits_one_line_per_call() {
        let mut state = SimulationState::new(10.0, 1, 1, 1);
        let p = state.new_point(crate::coord::Coord::new(1.0, 1.0), 0 as EntityId);
        state.add(p);
        let mut buf = Vec::new();
        {
            let mut w = SnapshotWriter::new(&mut buf, 1.0);
            w.start(&state).unwrap();
            w.end(&state).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}

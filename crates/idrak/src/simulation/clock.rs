//! Simulation Clock
//!
//! A background ticker owned by one session. While the simulation is running
//! and not paused it emits a `ClockTick` every period; the session applies the
//! tick to its own `SimulationState`. Any change of running, paused or speed
//! restarts the interval from scratch.

use std::time::Duration;

use idrak_types::{SimulationState, Speed};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// The fields of a simulation that control the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockParams {
    pub running: bool,
    pub paused: bool,
    pub speed: Speed,
}

impl ClockParams {
    pub fn from_simulation(simulation: Option<&SimulationState>) -> Self {
        simulation
            .map(|s| Self {
                running: s.is_running,
                paused: s.is_paused,
                speed: s.speed,
            })
            .unwrap_or_default()
    }

    pub fn is_ticking(&self) -> bool {
        self.running && !self.paused
    }
}

/// One elapsed clock period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick;

/// Handle to a running clock task. Dropping it stops the task.
pub struct SimulationClock {
    params_tx: watch::Sender<ClockParams>,
    task: JoinHandle<()>,
}

impl SimulationClock {
    /// Spawn a stopped clock that sends ticks on `ticks`
    pub fn spawn(period: Duration, ticks: mpsc::Sender<ClockTick>) -> Self {
        let (params_tx, params_rx) = watch::channel(ClockParams::default());
        let task = tokio::spawn(run_clock(period, params_rx, ticks));
        Self { params_tx, task }
    }

    /// Update the clock parameters. Returns whether they changed.
    pub fn update(&self, params: ClockParams) -> bool {
        self.params_tx.send_if_modified(|current| {
            if *current == params {
                false
            } else {
                *current = params;
                true
            }
        })
    }

    pub fn params(&self) -> ClockParams {
        *self.params_tx.borrow()
    }
}

impl Drop for SimulationClock {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_clock(
    period: Duration,
    mut params_rx: watch::Receiver<ClockParams>,
    ticks: mpsc::Sender<ClockTick>,
) {
    loop {
        let params = *params_rx.borrow_and_update();

        if !params.is_ticking() {
            trace!("Clock idle");
            if params_rx.changed().await.is_err() {
                break;
            }
            continue;
        }

        debug!(speed = params.speed.factor(), "Clock (re)started");
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if ticks.send(ClockTick).await.is_err() {
                        return;
                    }
                }
                changed = params_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::Receiver<ClockTick>) -> usize {
        let mut n = 0;
        while rx.try_recv().is_ok() {
            n += 1;
        }
        n
    }

    fn running(speed: Speed) -> ClockParams {
        ClockParams {
            running: true,
            paused: false,
            speed,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_clock_ticks_every_period() {
        let (tx, mut rx) = mpsc::channel(16);
        let clock = SimulationClock::spawn(Duration::from_secs(1), tx);
        assert!(clock.update(running(Speed::X2)));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(drain(&mut rx), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_and_paused_clock_is_silent() {
        let (tx, mut rx) = mpsc::channel(16);
        let clock = SimulationClock::spawn(Duration::from_secs(1), tx);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(drain(&mut rx), 0);

        clock.update(ClockParams {
            running: true,
            paused: true,
            speed: Speed::X1,
        });
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(drain(&mut rx), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_change_restarts_interval() {
        let (tx, mut rx) = mpsc::channel(16);
        let clock = SimulationClock::spawn(Duration::from_secs(1), tx);
        clock.update(running(Speed::X1));

        tokio::time::sleep(Duration::from_millis(1700)).await;
        assert_eq!(drain(&mut rx), 1);

        // The next tick is a full period after the change, not at 2s
        clock.update(running(Speed::X4));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(drain(&mut rx), 0);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(drain(&mut rx), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_reports_changes_only() {
        let (tx, _rx) = mpsc::channel(16);
        let clock = SimulationClock::spawn(Duration::from_secs(1), tx);
        assert!(!clock.update(ClockParams::default()));
        assert!(clock.update(running(Speed::X1)));
        assert!(!clock.update(running(Speed::X1)));
        assert_eq!(clock.params(), running(Speed::X1));
    }

    #[test]
    fn test_params_from_simulation() {
        assert!(!ClockParams::from_simulation(None).is_ticking());
        let sim = SimulationState::started("Drill", None);
        let params = ClockParams::from_simulation(Some(&sim));
        assert!(params.is_ticking());
        assert_eq!(params.speed, Speed::X1);
    }
}

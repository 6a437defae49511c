use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::action::clock::Clock;
use crate::bridge::{BridgeClient, CommandOutput};
use crate::error::BridgeError;
use crate::screen::screen_model::Point;

#[derive(Debug, Default)]
struct ScriptState {
    dumps: VecDeque<String>,
    last_dump: Option<String>,
    taps: Vec<Point>,
    swipes: Vec<(Point, Point)>,
    reads: usize,
    fail_taps: bool,
    fail_dump: bool,
}

/// In-memory bridge that replays a queue of UI dumps.
///
/// Each `cat` of the dump file pops the next queued tree; once the queue is
/// drained the last tree keeps being served. Taps and swipes are recorded and
/// succeed unless configured otherwise.
#[derive(Debug, Default)]
pub struct ScriptedBridge {
    state: Mutex<ScriptState>,
}

impl ScriptedBridge {
    pub fn new<I, S>(dumps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bridge = Self::default();
        bridge.push_dumps(dumps);
        bridge
    }

    pub fn push_dumps<I, S>(&self, dumps: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.lock();
        state.dumps.extend(dumps.into_iter().map(Into::into));
    }

    pub fn fail_taps(&self, fail: bool) {
        self.lock().fail_taps = fail;
    }

    pub fn fail_dump(&self, fail: bool) {
        self.lock().fail_dump = fail;
    }

    pub fn taps(&self) -> Vec<Point> {
        self.lock().taps.clone()
    }

    pub fn swipes(&self) -> usize {
        self.lock().swipes.len()
    }

    /// Start and end point of every recorded swipe.
    pub fn swipe_paths(&self) -> Vec<(Point, Point)> {
        self.lock().swipes.clone()
    }

    /// How many dump read-backs were served.
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        // A poisoned script only means an earlier test assertion panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl BridgeClient for ScriptedBridge {
    fn execute(&self, _device_id: &str, argv: &[String]) -> Result<CommandOutput, BridgeError> {
        let mut state = self.lock();
        let args: Vec<&str> = argv.iter().map(String::as_str).collect();

        match args.as_slice() {
            ["shell", "uiautomator", "dump", path] => {
                if state.fail_dump {
                    return Ok(CommandOutput::failed(1, "ERROR: null root node returned by UiTestAutomationBridge."));
                }
                Ok(CommandOutput::ok(format!("UI hierchary dumped to: {path}\n")))
            }
            ["shell", "cat", _] => {
                state.reads += 1;
                if let Some(next) = state.dumps.pop_front() {
                    state.last_dump = Some(next);
                }
                match &state.last_dump {
                    Some(dump) => Ok(CommandOutput::ok(dump.clone())),
                    None => Ok(CommandOutput::failed(1, "No such file or directory")),
                }
            }
            ["shell", "input", "tap", x, y] => {
                if state.fail_taps {
                    return Ok(CommandOutput::failed(255, "error: device offline"));
                }
                let point = Point::new(x.parse().unwrap_or(-1), y.parse().unwrap_or(-1));
                state.taps.push(point);
                Ok(CommandOutput::ok(""))
            }
            ["shell", "input", "swipe", x1, y1, x2, y2, _ms] => {
                let coord = |v: &str| v.parse::<i32>().unwrap_or(-1);
                let path = (
                    Point::new(coord(*x1), coord(*y1)),
                    Point::new(coord(*x2), coord(*y2)),
                );
                state.swipes.push(path);
                Ok(CommandOutput::ok(""))
            }
            _ => Ok(CommandOutput::failed(1, format!("unscripted command: {}", argv.join(" ")))),
        }
    }
}

/// Virtual clock: `sleep` advances time instantly.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

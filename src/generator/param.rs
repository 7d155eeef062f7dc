use super::{FrameClock, GeneratorState, SignalGenerator};

/// Smallest value an exponential ramp may target
///
/// Exponential curves cannot reach zero, so "silence" is this floor instead.
pub const SILENCE_FLOOR: f32 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParamEvent {
    SetValue {
        time: f64,
        value: f32,
    },
    ExponentialRamp {
        end_time: f64,
        value: f32,
    },
    SetTarget {
        time: f64,
        target: f32,
        time_constant: f64,
    },
}

impl ParamEvent {
    fn time(&self) -> f64 {
        match *self {
            ParamEvent::SetValue { time, .. } => time,
            ParamEvent::ExponentialRamp { end_time, .. } => end_time,
            ParamEvent::SetTarget { time, .. } => time,
        }
    }
}

/// An automatable parameter on the audio clock
///
/// Holds a static value plus a time-ordered list of automation events:
/// 1. set: jump to a value at a time
/// 2. exponential ramp: glide geometrically from the previous event to a value,
///    arriving at the ramp's end time
/// 3. set target: decay from the current value toward a target with a time constant
///
/// Events are evaluated lazily with [`AudioParam::value_at`], so a parameter can be
/// automated arbitrarily far into the future.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioParam {
    value: f32,
    events: Vec<ParamEvent>,
}

impl AudioParam {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            events: Vec::new(),
        }
    }

    /// Static value, used before the first automation event
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    fn insert(&mut self, event: ParamEvent) {
        // Keep insertion order among events at the same time
        let index = self
            .events
            .iter()
            .position(|e| e.time() > event.time())
            .unwrap_or(self.events.len());
        self.events.insert(index, event);
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(ParamEvent::SetValue { time, value });
        self
    }

    /// Glide exponentially from the previous event's value, reaching `value` at `end_time`
    ///
    /// A target at or below zero is replaced by [`SILENCE_FLOOR`].
    pub fn exponential_ramp_to_value_at_time(&mut self, value: f32, end_time: f64) -> &mut Self {
        let value = if value > 0.0 {
            value
        } else {
            log::warn!(
                "exponential ramp target {} is not positive, using {}",
                value,
                SILENCE_FLOOR
            );
            SILENCE_FLOOR
        };
        self.insert(ParamEvent::ExponentialRamp { end_time, value });
        self
    }

    /// Starting at `start_time`, approach `target` with the given time constant (seconds)
    pub fn set_target_at_time(
        &mut self,
        target: f32,
        start_time: f64,
        time_constant: f64,
    ) -> &mut Self {
        self.insert(ParamEvent::SetTarget {
            time: start_time,
            target,
            time_constant: time_constant.max(f64::EPSILON),
        });
        self
    }

    /// Remove every event scheduled at or after `from_time`
    pub fn cancel_scheduled_values(&mut self, from_time: f64) -> &mut Self {
        self.events.retain(|event| event.time() < from_time);
        self
    }

    /// Value of the parameter at clock time `time`
    pub fn value_at(&self, time: f64) -> f32 {
        let mut value = self.value;
        let mut last_time = 0.0f64;

        for (i, event) in self.events.iter().enumerate() {
            match *event {
                ParamEvent::SetValue { time: at, value: v } => {
                    if at > time {
                        break;
                    }
                    value = v;
                    last_time = at;
                }
                ParamEvent::ExponentialRamp {
                    end_time,
                    value: target,
                } => {
                    if time >= end_time {
                        value = target;
                        last_time = end_time;
                        continue;
                    }
                    return exponential_interpolate(value, target, last_time, end_time, time);
                }
                ParamEvent::SetTarget {
                    time: at,
                    target,
                    time_constant,
                } => {
                    if at > time {
                        break;
                    }
                    // A set-target curve runs until the next event takes over
                    match self.events.get(i + 1).map(ParamEvent::time) {
                        Some(next) if next <= time => {
                            value = approach(value, target, next - at, time_constant);
                            last_time = next;
                        }
                        _ => return approach(value, target, time - at, time_constant),
                    }
                }
            }
        }

        value
    }

    /// Write the parameter's per-sample values for one frame
    pub fn fill(&self, buffer: &mut [f32], clock: FrameClock) {
        if self.events.is_empty() {
            buffer.fill(self.value);
            return;
        }
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample = self.value_at(clock.time_at(i));
        }
    }
}

fn exponential_interpolate(from: f32, to: f32, start: f64, end: f64, time: f64) -> f32 {
    if end <= start {
        return to;
    }
    if from <= 0.0 || to <= 0.0 {
        // No geometric path between these values, hold until the ramp ends
        return from;
    }
    let progress = ((time - start) / (end - start)).clamp(0.0, 1.0) as f32;
    from * (to / from).powf(progress)
}

fn approach(from: f32, target: f32, elapsed: f64, time_constant: f64) -> f32 {
    let decay = (-elapsed / time_constant).exp() as f32;
    target + (from - target) * decay
}

/// Renders an [`AudioParam`]'s automation as a signal over a time window
///
/// Useful for inspecting envelopes and pitch glides.
pub struct ParamCurve {
    param: AudioParam,
    end_time: f64,
    completed: bool,
}

impl ParamCurve {
    /// # Arguments
    /// * `param` - Parameter to render
    /// * `end_time` - Clock time after which the curve completes
    pub fn new(param: AudioParam, end_time: f64) -> Self {
        Self {
            param,
            end_time,
            completed: false,
        }
    }

    pub fn param(&self) -> &AudioParam {
        &self.param
    }
}

impl SignalGenerator for ParamCurve {
    fn process(&mut self, buffer: &mut [f32], clock: FrameClock) -> GeneratorState {
        for (i, sample) in buffer.iter_mut().enumerate() {
            let time = clock.time_at(i);
            *sample = if time < self.end_time {
                self.param.value_at(time)
            } else {
                self.completed = true;
                0.0
            };
        }

        if clock.time_at(buffer.len()) >= self.end_time {
            self.completed = true;
        }

        if self.completed {
            GeneratorState::Complete
        } else {
            GeneratorState::Running
        }
    }

    fn is_complete(&self) -> bool {
        self.completed
    }
}

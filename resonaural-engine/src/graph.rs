//! The fixed two-channel binaural graph.
//!
//! ```text
//! osc(L) → lowpass → panner(-1) ┐
//!                               ├→ gain → out (L, R)
//! osc(R) → lowpass → panner(+1) ┘
//! ```
//!
//! The topology never changes: two [`Channel`]s indexed by [`Side`] and one
//! shared [`Gain`]. The graph keeps its own audio clock (frames rendered),
//! which is what frequency ramps are scheduled against.
//!
//! Disposal consumes the graph, so nothing can touch it afterwards.

use resonaural_core::filters::SvfTpt;

use crate::nodes::{FreqParam, Gain, Osc, StereoPanner};

/// Which ear a channel feeds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    #[inline]
    fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    /// Pan position of the binaural layout: full left or full right.
    #[inline]
    pub fn home_pan(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Per-graph filter settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GraphSettings {
    pub filter_cutoff_hz: f32,
    pub filter_q: f32,
}

/// One ear: oscillator → lowpass → panner.
#[derive(Clone, Debug)]
pub struct Channel {
    osc: Osc,
    freq: FreqParam,
    filter: SvfTpt,
    panner: StereoPanner,
}

impl Channel {
    fn new(side: Side, freq_hz: f32, settings: GraphSettings, sr: f32) -> Self {
        Self {
            osc: Osc::new(),
            freq: FreqParam::new(freq_hz),
            filter: SvfTpt::new(settings.filter_cutoff_hz, settings.filter_q, sr),
            panner: StereoPanner::new(side.home_pan()),
        }
    }

    #[inline] pub fn pan(&self) -> f32 { self.panner.pan() }
    #[inline] pub fn cutoff_hz(&self) -> f32 { self.filter.cutoff_hz() }
    #[inline] pub fn is_running(&self) -> bool { self.osc.is_running() }

    #[inline]
    fn next(&mut self, t: f64, sr: f32) -> (f32, f32) {
        let hz = self.freq.value_at(t);
        let x = self.osc.next(hz, sr);
        self.panner.process(self.filter.process_lp(x))
    }
}

/// Two channels, a shared gain and an audio clock.
#[derive(Clone, Debug)]
pub struct AudioGraph {
    sr: f32,
    frames: u64,
    channels: [Channel; 2],
    gain: Gain,
}

impl AudioGraph {
    /// Build the graph with the given oscillator frequencies. Gain starts at 0
    /// and oscillators are stopped until [`start`](Self::start).
    pub fn new(sr: f32, left_hz: f32, right_hz: f32, settings: GraphSettings) -> Self {
        let sr = sr.max(1.0);
        Self {
            sr,
            frames: 0,
            channels: [
                Channel::new(Side::Left, left_hz, settings, sr),
                Channel::new(Side::Right, right_hz, settings, sr),
            ],
            gain: Gain::new(0.0),
        }
    }

    pub fn start(&mut self) {
        for ch in &mut self.channels {
            ch.osc.start();
        }
    }

    /// Halt both oscillators and hand back the final frame count.
    pub fn dispose(mut self) -> u64 {
        for ch in &mut self.channels {
            ch.osc.stop();
        }
        self.frames
    }

    #[inline] pub fn sample_rate(&self) -> f32 { self.sr }

    /// Current audio time in seconds.
    #[inline]
    pub fn now(&self) -> f64 {
        self.frames as f64 / f64::from(self.sr)
    }

    #[inline]
    pub fn channel(&self, side: Side) -> &Channel {
        &self.channels[side.index()]
    }

    /// Frequency of `side` at the current audio time.
    #[inline]
    pub fn frequency(&self, side: Side) -> f32 {
        self.channel(side).freq.value_at(self.now())
    }

    /// Instantaneous frequency set; picked up by the next rendered frame.
    #[inline]
    pub fn set_frequency(&mut self, side: Side, hz: f32) {
        self.channels[side.index()].freq.set(hz);
    }

    /// Layer an exponential glide of `delta_hz` over `duration_s` on both channels,
    /// starting from whatever each channel is producing now.
    pub fn ramp_frequencies(&mut self, delta_hz: f32, duration_s: f64) {
        let now = self.now();
        for ch in &mut self.channels {
            ch.freq.ramp_by(delta_hz, now, duration_s);
        }
    }

    #[inline]
    pub fn set_pan(&mut self, side: Side, pan: f32) {
        self.channels[side.index()].panner.set_pan(pan);
    }

    #[inline]
    pub fn pan(&self, side: Side) -> f32 {
        self.channel(side).pan()
    }

    #[inline] pub fn set_gain(&mut self, g: f32) { self.gain.set(g); }
    #[inline] pub fn gain(&self) -> f32 { self.gain.value() }

    /// Render one stereo frame and advance the audio clock.
    #[inline]
    pub fn render_frame(&mut self) -> (f32, f32) {
        let t = self.now();
        let sr = self.sr;
        let (ll, lr) = self.channels[0].next(t, sr);
        let (rl, rr) = self.channels[1].next(t, sr);
        self.frames += 1;

        let l = self.gain.apply(ll + rl).clamp(-1.0, 1.0);
        let r = self.gain.apply(lr + rr).clamp(-1.0, 1.0);

        // Keep the ramp lists short: fold anything that has landed.
        if self.frames % 64 == 0 {
            let t = self.now();
            for ch in &mut self.channels {
                ch.freq.settle(t);
            }
        }
        (l, r)
    }

    /// Render into an interleaved buffer of `channels` channels.
    ///
    /// Mono devices get `(L + R) / 2`; channels beyond the first two are
    /// filled with silence.
    pub fn render_interleaved<T: Copy>(&mut self, out: &mut [T], channels: usize, conv: impl Fn(f32) -> T) {
        if channels == 0 {
            return;
        }
        for frame in out.chunks_mut(channels) {
            let (l, r) = self.render_frame();
            match frame {
                [mono] => *mono = conv(0.5 * (l + r)),
                [fl, fr, rest @ ..] => {
                    *fl = conv(l);
                    *fr = conv(r);
                    for s in rest {
                        *s = conv(0.0);
                    }
                }
                [] => {}
            }
        }
    }

    /// Advance the audio clock by `frames` without producing output.
    pub fn advance(&mut self, frames: u64) {
        self.frames += frames;
        let t = self.now();
        for ch in &mut self.channels {
            ch.freq.settle(t);
        }
    }
}

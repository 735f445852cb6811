//! C ABI wrapper for the Resonaural engine.
//!
//! The host owns the audio device and pulls interleaved f32 frames with
//! [`resonaural_render_interleaved_f32`]. The smoothing loop is not run on a
//! background thread here: call [`resonaural_tick`] at display rate.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handle type: `ResonauralEngine` (heap-allocated; you own/delete it).
//! - Strings are NUL-terminated UTF-8.
//! - Status codes: `0` ok, `-1` null/invalid argument, `-2` unknown state,
//!   `-3` device/engine error, `-4` malformed payload.
//!
//! Threading
//! - `resonaural_render_interleaved_f32` may be called from the host audio
//!   thread while the other calls come from a control thread. Rendering only
//!   takes the session lock; control calls are serialized by a second lock
//!   around the engine and take the session lock inside it.
//! - `resonaural_destroy` must not race with any other call on the handle.

use std::ffi::{c_char, CStr};
use std::sync::{Mutex, MutexGuard, PoisonError};

use resonaural_engine::session::SharedSession;
use resonaural_engine::{BinauralEngine, EngineConfig, EngineError, OfflineBackend, ResonancePayload};
use tracing::warn;

pub const RESONAURAL_OK: i32 = 0;
pub const RESONAURAL_ERR_ARG: i32 = -1;
pub const RESONAURAL_ERR_STATE: i32 = -2;
pub const RESONAURAL_ERR_ENGINE: i32 = -3;
pub const RESONAURAL_ERR_PAYLOAD: i32 = -4;

/// Opaque engine wrapper we hand to C.
///
/// Only ever reached through shared references: the engine sits behind a
/// mutex and the render path goes through `session` alone.
pub struct ResonauralEngine {
    inner: Mutex<BinauralEngine<OfflineBackend>>,
    session: SharedSession,
}

impl ResonauralEngine {
    fn new(sample_rate: u32) -> Self {
        let engine = BinauralEngine::new(OfflineBackend::new(sample_rate), EngineConfig::manual());
        let session = engine.session();
        Self { inner: Mutex::new(engine), session }
    }

    fn engine(&self) -> MutexGuard<'_, BinauralEngine<OfflineBackend>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Flat snapshot for C hosts. `state`: 0 delta, 1 theta, 2 alpha, 3 gamma.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ResonauralSnapshot {
    pub state: u32,
    pub left_frequency: f32,
    pub right_frequency: f32,
    pub intensity: f32,
    pub is_active: u8,
}

fn status(err: &EngineError) -> i32 {
    match err {
        EngineError::InvalidState { .. } => RESONAURAL_ERR_STATE,
        EngineError::Payload { .. } => RESONAURAL_ERR_PAYLOAD,
        _ => RESONAURAL_ERR_ENGINE,
    }
}

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

// --- Creation / destruction -------------------------------------------------------

/// Create an engine rendering at `sample_rate`. Call `resonaural_init` before use.
#[no_mangle]
pub extern "C" fn resonaural_create(sample_rate: u32) -> *mut ResonauralEngine {
    Box::into_raw(Box::new(ResonauralEngine::new(sample_rate)))
}

/// Destroy an engine previously returned by `resonaural_create`. Stops it first.
///
/// # Safety
/// `engine` must be null or a pointer from `resonaural_create` not yet destroyed.
#[no_mangle]
pub unsafe extern "C" fn resonaural_destroy(engine: *mut ResonauralEngine) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

// --- Lifecycle --------------------------------------------------------------------

/// Start a session. Idempotent.
///
/// # Safety
/// `engine` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn resonaural_init(engine: *mut ResonauralEngine) -> i32 {
    let Some(e) = engine.as_ref() else { return RESONAURAL_ERR_ARG };
    let result = e.engine().init();
    match result {
        Ok(()) => RESONAURAL_OK,
        Err(err) => {
            warn!("resonaural_init failed: {err}");
            status(&err)
        }
    }
}

/// End the session and release the device. Idempotent.
///
/// # Safety
/// `engine` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn resonaural_stop(engine: *mut ResonauralEngine) {
    if let Some(e) = engine.as_ref() {
        e.engine().stop();
    }
}

// --- Control ----------------------------------------------------------------------

/// Switch brainwave state by name (`"delta"`, `"theta"`, `"alpha"`, `"gamma"`).
///
/// # Safety
/// `engine` must be null or a live handle; `name` null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn resonaural_set_state(
    engine: *mut ResonauralEngine,
    name: *const c_char,
    intensity: f32,
) -> i32 {
    let (Some(e), Some(name)) = (engine.as_ref(), str_arg(name)) else { return RESONAURAL_ERR_ARG };
    let result = e.engine().set_brainwave_state_named(name, intensity);
    match result {
        Ok(()) => RESONAURAL_OK,
        Err(err) => status(&err),
    }
}

/// Set the target output intensity (clamped to 0..1).
///
/// # Safety
/// `engine` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn resonaural_set_intensity(engine: *mut ResonauralEngine, target: f32) {
    if let Some(e) = engine.as_ref() {
        e.engine().set_intensity(target);
    }
}

/// Fire a `"draw"` or `"full"` trigger; anything else is ignored.
///
/// # Safety
/// `engine` must be null or a live handle; `kind` null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn resonaural_trigger(engine: *mut ResonauralEngine, kind: *const c_char) -> i32 {
    let (Some(e), Some(kind)) = (engine.as_ref(), str_arg(kind)) else { return RESONAURAL_ERR_ARG };
    e.engine().trigger_event(kind);
    RESONAURAL_OK
}

/// Apply a resonance payload given as JSON text.
///
/// # Safety
/// `engine` must be null or a live handle; `json` null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn resonaural_update_from_resonance_json(
    engine: *mut ResonauralEngine,
    json: *const c_char,
) -> i32 {
    let (Some(e), Some(json)) = (engine.as_ref(), str_arg(json)) else { return RESONAURAL_ERR_ARG };
    match ResonancePayload::from_json(json) {
        Ok(payload) => {
            e.engine().update_from_resonance(&payload);
            RESONAURAL_OK
        }
        Err(err) => {
            warn!("rejected resonance payload: {err}");
            status(&err)
        }
    }
}

/// Ramp both channels by `delta_hz` over `duration_s` seconds.
///
/// # Safety
/// `engine` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn resonaural_modulate_frequency(
    engine: *mut ResonauralEngine,
    delta_hz: f32,
    duration_s: f64,
) {
    if let Some(e) = engine.as_ref() {
        e.engine().modulate_frequency(delta_hz, duration_s);
    }
}

/// Reposition the stereo image: left pans to `-x`, right to `x` (x in -1..1).
///
/// # Safety
/// `engine` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn resonaural_set_spatial_position(engine: *mut ResonauralEngine, x: f32) {
    if let Some(e) = engine.as_ref() {
        e.engine().set_spatial_position(x);
    }
}

/// Restore the hard left/right split.
///
/// # Safety
/// `engine` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn resonaural_reset_spatial_position(engine: *mut ResonauralEngine) {
    if let Some(e) = engine.as_ref() {
        e.engine().reset_spatial_position();
    }
}

/// One step of the smoothing loop. Returns the new intensity, or -1 when inactive.
///
/// # Safety
/// `engine` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn resonaural_tick(engine: *mut ResonauralEngine) -> f32 {
    engine.as_ref().and_then(|e| e.engine().tick()).unwrap_or(-1.0)
}

/// Write the current snapshot into `out`.
///
/// # Safety
/// `engine` must be null or a live handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn resonaural_snapshot(
    engine: *const ResonauralEngine,
    out: *mut ResonauralSnapshot,
) -> i32 {
    let (Some(e), Some(out)) = (engine.as_ref(), out.as_mut()) else { return RESONAURAL_ERR_ARG };
    let snap = e.engine().snapshot();
    *out = ResonauralSnapshot {
        state: snap.state as u32,
        left_frequency: snap.left_frequency,
        right_frequency: snap.right_frequency,
        intensity: snap.intensity,
        is_active: u8::from(snap.is_active),
    };
    RESONAURAL_OK
}

// --- Rendering -------------------------------------------------------------------

/// Render `frames` of audio into an interleaved f32 buffer with `channels` channels.
/// Channel 0 is left, 1 is right; mono gets the downmix, extra channels silence.
///
/// Returns the number of frames rendered (0 on error). An inactive engine
/// renders silence.
///
/// # Safety
/// `engine` must be null or a live handle; `out_interleaved` must hold
/// `frames * channels` floats.
#[no_mangle]
pub unsafe extern "C" fn resonaural_render_interleaved_f32(
    engine: *mut ResonauralEngine,
    out_interleaved: *mut f32,
    frames: u32,
    channels: u32,
) -> u32 {
    if engine.is_null() || out_interleaved.is_null() || frames == 0 || channels == 0 {
        return 0;
    }
    let e = &*engine;
    let ch = channels as usize;
    let out = std::slice::from_raw_parts_mut(out_interleaved, frames as usize * ch);
    e.session.render(out, ch, |s| s);
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn cs(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    #[test]
    fn null_handles_are_rejected() {
        unsafe {
            assert_eq!(resonaural_init(std::ptr::null_mut()), RESONAURAL_ERR_ARG);
            assert_eq!(resonaural_tick(std::ptr::null_mut()), -1.0);
            let mut buf = [0.0f32; 4];
            assert_eq!(resonaural_render_interleaved_f32(std::ptr::null_mut(), buf.as_mut_ptr(), 2, 2), 0);
            resonaural_destroy(std::ptr::null_mut());
        }
    }

    #[test]
    fn state_and_snapshot_round_trip() {
        unsafe {
            let e = resonaural_create(48_000);
            assert_eq!(resonaural_init(e), RESONAURAL_OK);
            assert_eq!(resonaural_set_state(e, cs("theta").as_ptr(), 1.0), RESONAURAL_OK);
            assert_eq!(resonaural_set_state(e, cs("beta").as_ptr(), 1.0), RESONAURAL_ERR_STATE);

            let mut snap = ResonauralSnapshot::default();
            assert_eq!(resonaural_snapshot(e, &mut snap), RESONAURAL_OK);
            assert_eq!(snap.state, 1);
            assert_eq!(snap.left_frequency, 396.0);
            assert_eq!(snap.right_frequency, 401.0);
            assert_eq!(snap.is_active, 1);

            resonaural_stop(e);
            resonaural_snapshot(e, &mut snap);
            assert_eq!(snap.is_active, 0);
            resonaural_destroy(e);
        }
    }

    #[test]
    fn payload_json_is_parsed() {
        unsafe {
            let e = resonaural_create(48_000);
            resonaural_init(e);
            let ok = cs(r#"{"resonance_frequency":0.9}"#);
            assert_eq!(resonaural_update_from_resonance_json(e, ok.as_ptr()), RESONAURAL_OK);
            let mut snap = ResonauralSnapshot::default();
            resonaural_snapshot(e, &mut snap);
            assert_eq!(snap.state, 3);

            let bad = cs("{not json");
            assert_eq!(resonaural_update_from_resonance_json(e, bad.as_ptr()), RESONAURAL_ERR_PAYLOAD);
            resonaural_destroy(e);
        }
    }

    #[test]
    fn render_is_silent_until_ticked_up() {
        unsafe {
            let e = resonaural_create(48_000);
            let mut buf = vec![1.0f32; 256 * 2];
            // Not initialised yet: silence.
            assert_eq!(resonaural_render_interleaved_f32(e, buf.as_mut_ptr(), 256, 2), 256);
            assert!(buf.iter().all(|s| *s == 0.0));

            resonaural_init(e);
            resonaural_set_intensity(e, 1.0);
            for _ in 0..30 {
                resonaural_tick(e);
            }
            resonaural_render_interleaved_f32(e, buf.as_mut_ptr(), 256, 2);
            assert!(buf.iter().any(|s| s.abs() > 1e-3));
            resonaural_destroy(e);
        }
    }

    #[test]
    fn handle_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResonauralEngine>();
    }

    #[test]
    fn render_thread_alongside_init_stop() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let e = resonaural_create(48_000);
        let addr = e as usize;
        let done = Arc::new(AtomicBool::new(false));
        let render_done = Arc::clone(&done);
        let renderer = std::thread::spawn(move || {
            let mut buf = vec![0.0f32; 128 * 2];
            let mut calls = 0u32;
            while !render_done.load(Ordering::Acquire) {
                let n = unsafe {
                    resonaural_render_interleaved_f32(addr as *mut ResonauralEngine, buf.as_mut_ptr(), 128, 2)
                };
                assert_eq!(n, 128);
                assert!(buf.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
                calls += 1;
            }
            calls
        });

        unsafe {
            for _ in 0..500 {
                assert_eq!(resonaural_init(e), RESONAURAL_OK);
                resonaural_set_intensity(e, 1.0);
                resonaural_tick(e);
                resonaural_stop(e);
            }
        }
        done.store(true, Ordering::Release);
        assert!(renderer.join().unwrap() > 0);
        unsafe { resonaural_destroy(e) };
    }

    #[test]
    fn trigger_raises_target() {
        unsafe {
            let e = resonaural_create(44_100);
            resonaural_init(e);
            assert_eq!(resonaural_trigger(e, cs("full").as_ptr()), RESONAURAL_OK);
            assert!(resonaural_tick(e) > 0.0);
            resonaural_destroy(e);
        }
    }
}

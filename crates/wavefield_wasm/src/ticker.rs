//! `requestAnimationFrame`-backed ticker.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wavefield_core::traits::Ticker;

struct FrameLoop {
    active: Cell<bool>,
    request_id: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl FrameLoop {
    fn request(&self) -> Result<(), JsValue> {
        if self.request_id.get().is_some() {
            return Ok(());
        }
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Ok(());
        };
        let id = window.request_animation_frame(callback.as_ref().unchecked_ref())?;
        self.request_id.set(Some(id));
        Ok(())
    }

    fn cancel(&self) {
        if let Some(id) = self.request_id.take() {
            if let Some(window) = web_sys::window() {
                if let Err(err) = window.cancel_animation_frame(id) {
                    log::warn!("cancelAnimationFrame failed: {err:?}");
                }
            }
        }
    }
}

/// Calls `frame(timestamp_ms)` once per display refresh while started.
pub(crate) struct AnimationFrameTicker {
    state: Rc<FrameLoop>,
}

impl AnimationFrameTicker {
    /// Created stopped; call `start` to schedule the first frame.
    pub(crate) fn new(mut frame: impl FnMut(f64) + 'static) -> Self {
        let state = Rc::new(FrameLoop {
            active: Cell::new(false),
            request_id: Cell::new(None),
            callback: RefCell::new(None),
        });

        // The closure holds a weak handle so dropping the ticker frees it.
        let weak = Rc::downgrade(&state);
        let closure = Closure::wrap(Box::new(move |now_ms: f64| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.request_id.set(None);
            if !state.active.get() {
                return;
            }
            frame(now_ms);
            // The frame may have stopped us.
            if state.active.get() {
                if let Err(err) = state.request() {
                    log::error!("requestAnimationFrame failed: {err:?}");
                    state.active.set(false);
                }
            }
        }) as Box<dyn FnMut(f64)>);
        *state.callback.borrow_mut() = Some(closure);

        Self { state }
    }
}

impl Ticker for AnimationFrameTicker {
    fn start(&mut self) {
        if self.state.active.replace(true) {
            return;
        }
        if let Err(err) = self.state.request() {
            log::error!("requestAnimationFrame failed: {err:?}");
            self.state.active.set(false);
        }
    }

    fn stop(&mut self) {
        self.state.active.set(false);
        self.state.cancel();
    }

    fn is_active(&self) -> bool {
        self.state.active.get()
    }
}

impl Drop for AnimationFrameTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

use crate::capture::{EdgeCapture, EdgeSource};
use core::cell::RefCell;
use critical_section::Mutex;

/// Used to initialize the global static `EdgeCapture` for use with
/// `critical_section`.
///
/// # Returns
/// * A disabled, empty capture behind a mutex
///
/// # Example
/// ```rust
/// use core::cell::RefCell;
/// use critical_section::Mutex;
/// use nec_retina::capture::EdgeCapture;
/// use nec_retina::timer::global_edge_capture_init;
///
/// static EDGE_CAPTURE: Mutex<RefCell<EdgeCapture>> = global_edge_capture_init();
/// ```
pub const fn global_edge_capture_init() -> Mutex<RefCell<EdgeCapture>> {
    Mutex::new(RefCell::new(EdgeCapture::new()))
}

/// Records an edge from the receiver line interrupt.
///
/// # Arguments
/// * The global static `EdgeCapture`
/// * The value of the 10 µs receive timer
/// * The line level after the edge
///
/// # Returns
/// * `true` if the edge was stored
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn EXTI15_10() {
///     let tick = TIM3::counter();
///     let _ = global_edge_capture_record(&EDGE_CAPTURE, tick, ir_pin.is_high());
/// }
/// ```
pub fn global_edge_capture_record(
    global_capture: &'static Mutex<RefCell<EdgeCapture>>,
    tick: u16,
    level_high: bool,
) -> bool {
    critical_section::with(|cs| global_capture.borrow(cs).borrow_mut().record(tick, level_high))
}

/// The global capture seen from the main loop.
///
/// Every call takes a short critical section. [`with_edges`](EdgeSource::with_edges)
/// and [`take_edges`](EdgeSource::take_edges) work on a snapshot so the
/// interrupt is never held off while decoding. `take_edges` copies and clears
/// inside one critical section.
impl EdgeSource for &Mutex<RefCell<EdgeCapture>> {
    fn num_edges(&self) -> usize {
        critical_section::with(|cs| self.borrow(cs).borrow().num_edges())
    }

    fn with_edges<R, F: FnOnce(&[u16]) -> R>(&self, f: F) -> R {
        let snapshot = critical_section::with(|cs| self.borrow(cs).borrow().clone());
        f(snapshot.edges())
    }

    fn take_edges<R, F: FnOnce(&[u16]) -> R>(&mut self, f: F) -> R {
        let snapshot = critical_section::with(|cs| {
            let mut capture = self.borrow(cs).borrow_mut();
            let snapshot = capture.clone();
            capture.clear();
            snapshot
        });
        f(snapshot.edges())
    }

    fn clear(&mut self) {
        critical_section::with(|cs| self.borrow(cs).borrow_mut().clear());
    }

    fn enable(&mut self, enabled: bool) {
        critical_section::with(|cs| self.borrow(cs).borrow_mut().enable(enabled));
    }

    fn start_timer(&mut self) {
        critical_section::with(|cs| self.borrow(cs).borrow_mut().start_timer());
    }

    fn stop_timer(&mut self) {
        critical_section::with(|cs| self.borrow(cs).borrow_mut().stop_timer());
    }
}

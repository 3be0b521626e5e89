/// Declares a static global `EDGE_CAPTURE` protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton `EDGE_CAPTURE` suitable for use in
/// interrupt-based environments, where the receiver line interrupt records
/// edges and the main loop hands `&EDGE_CAPTURE` to a
/// [`NecReceiver`](crate::receiver::NecReceiver).
///
/// # Example
/// ```rust
/// nec_retina::init_edge_capture!();
///
/// let receiver = nec_retina::receiver::NecReceiver::new(&EDGE_CAPTURE);
/// ```
#[macro_export]
macro_rules! init_edge_capture {
    () => {
        pub static EDGE_CAPTURE: $crate::critical_section::Mutex<
            core::cell::RefCell<$crate::capture::EdgeCapture>,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(
            $crate::capture::EdgeCapture::new(),
        ));
    };
}

/// Records an edge into the global `EDGE_CAPTURE`.
///
/// Intended to be invoked from the interrupt of the receiver line, on both
/// edges. Evaluates to `true` if the edge was stored.
///
/// # Arguments
/// - `$tick`: value of the 10 µs receive timer (`u16`)
/// - `$level_high`: line level after the edge
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn EXTI15_10() {
///     record_edge!(TIM3::counter(), ir_pin.is_high());
/// }
/// ```
///
/// # Notes
/// - This macro assumes `EDGE_CAPTURE` was declared with `init_edge_capture!`.
/// - Edges are silently dropped until the receiver is enabled.
#[macro_export]
macro_rules! record_edge {
    ( $tick:expr, $level_high:expr ) => {
        $crate::critical_section::with(|cs| {
            EDGE_CAPTURE
                .borrow(cs)
                .borrow_mut()
                .record($tick, $level_high)
        })
    };
}

/// Declares a static global `SYMBOL_TICKER` counting transmit symbol ticks.
///
/// # Example
/// ```rust
/// nec_retina::init_symbol_ticker!();
///
/// // `&SYMBOL_TICKER` implements `SymbolTimer`.
/// let timer = &SYMBOL_TICKER;
/// ```
#[macro_export]
macro_rules! init_symbol_ticker {
    () => {
        pub static SYMBOL_TICKER: $crate::timer::SymbolTicker = $crate::timer::SymbolTicker::new();
    };
}

/// Advances the global `SYMBOL_TICKER` by one tick.
///
/// Call it from a timer interrupt firing every 56.25 µs.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM1_UP_TIM10() {
///     tick_symbol_timer!();
/// }
/// ```
///
/// # Notes
/// - This macro assumes `SYMBOL_TICKER` was declared with `init_symbol_ticker!`.
/// - Ticks are ignored while no frame is being sent.
#[macro_export]
macro_rules! tick_symbol_timer {
    () => {
        SYMBOL_TICKER.tick();
    };
}

#[cfg(test)]
mod tests {
    use crate::capture::EdgeSource;
    use crate::transmitter::SymbolTimer;

    crate::init_edge_capture!();
    crate::init_symbol_ticker!();

    #[test]
    fn test_edge_capture_macros() {
        assert!(!crate::record_edge!(5, false));

        let mut source = &EDGE_CAPTURE;
        source.start_timer();
        source.enable(true);
        assert!(crate::record_edge!(5, false));
        assert!(crate::record_edge!(9, true));
        assert!(!crate::record_edge!(11, true));
        assert_eq!(source.with_edges(|edges| edges.to_vec()), vec![5, 9]);
    }

    #[test]
    fn test_symbol_ticker_macros() {
        let mut timer = &SYMBOL_TICKER;
        timer.start();
        for _ in 0..3 {
            crate::tick_symbol_timer!();
        }
        assert_eq!(timer.ticks(), 3);
        timer.stop();
    }
}

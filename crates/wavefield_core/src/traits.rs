/// A frame scheduler that repeatedly invokes a per-frame closure while active.
///
/// Implementations own the closure; the animation clock's Running/Paused
/// transitions map onto `start`/`stop`.
pub trait Ticker {
    /// Begins (or resumes) scheduling frames. Idempotent.
    fn start(&mut self);

    /// Cancels any pending frame. Idempotent.
    fn stop(&mut self);

    fn is_active(&self) -> bool;

    /// Starts or stops so that scheduling matches `running`.
    fn follow(&mut self, running: bool) {
        if running {
            self.start();
        } else {
            self.stop();
        }
    }
}

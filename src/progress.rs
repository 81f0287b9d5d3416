/// Progress reporting for a harvest run. Frontends implement this to surface
/// status to users; the library never prints.
pub trait Progress: Send {
    /// Called before leaf records are processed, with how many there are
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes
    fn log(&mut self, _msg: &str) {}

    /// Called each time a row is committed, with the running count
    fn item_done(&mut self, _done: usize, _total: usize) {}

    /// Called once every row is committed
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// A value slot that caches writes made before the embedded editor is ready.
///
/// `write` either hands the value back for immediate application or keeps it
/// as pending. `flush` takes the pending value exactly once. The slot also
/// remembers the last written value so reads stay consistent with what the
/// host asked for, applied or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredProperty<T> {
    current: Option<T>,
    pending: Option<T>,
}

impl<T> Default for DeferredProperty<T> {
    fn default() -> Self {
        DeferredProperty {
            current: None,
            pending: None,
        }
    }
}

impl<T: Clone> DeferredProperty<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot whose initial value is already in effect (nothing pending).
    pub fn with_value(value: T) -> Self {
        DeferredProperty {
            current: Some(value),
            pending: None,
        }
    }

    /// Record a write. Returns the value to apply now when `ready`, otherwise
    /// caches it (replacing any older pending value) and returns `None`.
    pub fn write(&mut self, value: T, ready: bool) -> Option<T> {
        self.current = Some(value.clone());
        if ready {
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Take the pending value, if any. A second flush returns `None`.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Remember a value without scheduling it for application.
    pub fn store(&mut self, value: T) {
        self.current = Some(value);
    }

    pub fn get(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_before_ready_is_cached() {
        let mut slot = DeferredProperty::new();
        assert_eq!(slot.write("vs".to_string(), false), None);
        assert_eq!(slot.pending().map(String::as_str), Some("vs"));
        assert_eq!(slot.get().map(String::as_str), Some("vs"));
    }

    #[test]
    fn last_write_wins_and_flushes_once() {
        let mut slot = DeferredProperty::new();
        slot.write(1, false);
        slot.write(2, false);
        slot.write(3, false);
        assert_eq!(slot.flush(), Some(3));
        assert_eq!(slot.flush(), None);
        assert_eq!(slot.get(), Some(&3));
    }

    #[test]
    fn write_when_ready_returns_value_and_drops_stale_pending() {
        let mut slot = DeferredProperty::with_value("a");
        slot.write("b", false);
        assert_eq!(slot.write("c", true), Some("c"));
        assert!(!slot.is_pending());
        assert_eq!(slot.flush(), None);
    }

    #[test]
    fn store_does_not_schedule() {
        let mut slot = DeferredProperty::new();
        slot.store(7);
        assert_eq!(slot.get(), Some(&7));
        assert!(!slot.is_pending());
    }

    #[test]
    fn clear_resets_everything() {
        let mut slot = DeferredProperty::with_value(1);
        slot.write(2, false);
        slot.clear();
        assert_eq!(slot.get(), None);
        assert_eq!(slot.flush(), None);
    }
}

//! Caller-side coalescing of generation requests.
//!
//! Tree and row generation run to completion. While one request is in
//! flight, newer requests replace each other in a single pending slot; when
//! the running one completes the latest pending request runs next. Each
//! submission gets a generation number so a result computed from stale
//! input can be recognised and dropped.

/// Single-outstanding request coalescer.
///
/// # Example
///
/// ```
/// use formtree::Coalescer;
///
/// let mut queue = Coalescer::new();
/// let (first, _) = queue.submit("a").unwrap();
/// assert!(queue.submit("b").is_none());
/// assert!(queue.submit("c").is_none());
///
/// // "b" was superseded by "c" while "a" ran.
/// let (next, request) = queue.complete().unwrap();
/// assert_eq!(request, "c");
/// assert!(!queue.is_current(first));
/// assert!(queue.is_current(next));
/// assert!(queue.complete().is_none());
/// ```
#[derive(Debug)]
pub struct Coalescer<T> {
    in_flight: bool,
    pending: Option<(u64, T)>,
    generation: u64,
}

impl<T> Default for Coalescer<T> {
    fn default() -> Self {
        Self {
            in_flight: false,
            pending: None,
            generation: 0,
        }
    }
}

impl<T> Coalescer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a request. Returns it with its generation if nothing is in
    /// flight; otherwise parks it, replacing any parked request.
    pub fn submit(&mut self, request: T) -> Option<(u64, T)> {
        self.generation += 1;
        if self.in_flight {
            if self.pending.is_some() {
                tracing::trace!(generation = self.generation, "replacing pending request");
            }
            self.pending = Some((self.generation, request));
            None
        } else {
            self.in_flight = true;
            Some((self.generation, request))
        }
    }

    /// Mark the running request done and hand out the parked one, if any.
    pub fn complete(&mut self) -> Option<(u64, T)> {
        let next = self.pending.take();
        self.in_flight = next.is_some();
        next
    }

    /// Check if a result of `generation` reflects the latest submission.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn is_idle(&self) -> bool {
        !self.in_flight
    }
}

//! "Latest request wins" bookkeeping for async loads.

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct LatestRequest {
    issued: u64,
    closed: bool,
}

impl LatestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// A result may be applied only if it answers the newest request and the
    /// owning view is still open.
    pub fn accepts(&self, ticket: Ticket) -> bool {
        !self.closed && ticket.0 == self.issued
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Issue for a view that is being shown again. Tickets from earlier
    /// visits stay stale.
    pub fn reopen(&mut self) -> Ticket {
        self.closed = false;
        self.issue()
    }

    /// Forget everything in flight without closing.
    pub fn invalidate(&mut self) {
        self.issued += 1;
    }
}

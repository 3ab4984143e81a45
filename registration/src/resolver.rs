//! On-chain registration check for a format-valid referral candidate.
//!
//! States: `NotChecked → Checking → Registered | NotRegistered`.
//!
//! Lookups are never cancelled. Each one carries a [`LookupTicket`]; a result
//! is applied only if its ticket is the latest issued AND its address still
//! equals the current form input. Anything else is a stale response and is
//! dropped.

use asty_types::{addresses_match, Address, NEUTRAL_ADDRESS};

/// Registration status of the current candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    NotChecked,
    Checking,
    Registered,
    NotRegistered,
}

/// Identifies one issued lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket {
    pub id: u64,
    pub address: Address,
}

/// Result of feeding a lookup outcome into the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The ticket was superseded; nothing changed.
    Stale,
    Registered,
    NotRegistered,
    /// The lookup failed; the candidate stays unverified.
    Inconclusive,
}

#[derive(Debug)]
pub struct RegistrationResolver {
    state: ResolverState,
    candidate: Option<Address>,
    latest: Option<LookupTicket>,
    next_id: u64,
}

impl Default for RegistrationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationResolver {
    pub fn new() -> Self {
        Self {
            state: ResolverState::NotChecked,
            candidate: None,
            latest: None,
            next_id: 1,
        }
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// The candidate currently being (or last) checked.
    pub fn candidate(&self) -> Option<Address> {
        self.candidate
    }

    /// Start checking `address`, superseding any in-flight lookup.
    pub fn begin(&mut self, address: Address) -> LookupTicket {
        let ticket = LookupTicket {
            id: self.next_id,
            address,
        };
        self.next_id += 1;
        self.candidate = Some(address);
        self.latest = Some(ticket);
        self.state = ResolverState::Checking;
        tracing::debug!(id = ticket.id, %address, "referral lookup issued");
        ticket
    }

    /// Forget the candidate (input cleared or invalid). In-flight lookups
    /// become stale.
    pub fn reset(&mut self) {
        self.candidate = None;
        self.latest = None;
        self.state = ResolverState::NotChecked;
    }

    /// Apply a lookup outcome. `registered` is `None` when the lookup failed.
    pub fn complete(&mut self, ticket: LookupTicket, registered: Option<bool>, current_input: &str) -> Resolution {
        if !self.is_current(&ticket, current_input) {
            tracing::debug!(id = ticket.id, address = %ticket.address, "discarding stale referral lookup");
            return Resolution::Stale;
        }
        self.latest = None;
        match registered {
            Some(true) => {
                self.state = ResolverState::Registered;
                Resolution::Registered
            }
            Some(false) => {
                self.state = ResolverState::NotRegistered;
                Resolution::NotRegistered
            }
            None => {
                self.state = ResolverState::NotChecked;
                Resolution::Inconclusive
            }
        }
    }

    /// The referral to submit: the candidate when it is verified registered
    /// and still matches the form input, the neutral address otherwise.
    pub fn effective_referral(&self, current_input: &str) -> Address {
        match (self.state, self.candidate) {
            (ResolverState::Registered, Some(candidate))
                if addresses_match(&candidate.to_string(), current_input) =>
            {
                candidate
            }
            _ => NEUTRAL_ADDRESS,
        }
    }

    fn is_current(&self, ticket: &LookupTicket, current_input: &str) -> bool {
        self.latest.as_ref() == Some(ticket) && addresses_match(&ticket.address.to_string(), current_input)
    }
}

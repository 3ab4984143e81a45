//! Nullable UI — records which surfaces the flow asked for.

use std::sync::Mutex;

use asty_registration::{PaymentConfig, RegistrationUi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    OpenPaymentDialog(Box<PaymentConfig>),
    ClosePaymentDialog,
    Celebrate,
    OpenWelcome,
}

pub struct NullUi {
    events: Mutex<Vec<UiEvent>>,
}

impl NullUi {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Get all recorded events (for assertions).
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    /// The configuration of the most recently opened payment dialog.
    pub fn last_payment_config(&self) -> Option<PaymentConfig> {
        self.events.lock().unwrap().iter().rev().find_map(|event| match event {
            UiEvent::OpenPaymentDialog(config) => Some((**config).clone()),
            _ => None,
        })
    }

    pub fn count(&self, predicate: impl Fn(&UiEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|event| predicate(event)).count()
    }

    pub fn reset(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Default for NullUi {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationUi for NullUi {
    fn open_payment_dialog(&self, config: &PaymentConfig) {
        self.record(UiEvent::OpenPaymentDialog(Box::new(config.clone())));
    }

    fn close_payment_dialog(&self) {
        self.record(UiEvent::ClosePaymentDialog);
    }

    fn celebrate(&self) {
        self.record(UiEvent::Celebrate);
    }

    fn open_welcome(&self) {
        self.record(UiEvent::OpenWelcome);
    }
}

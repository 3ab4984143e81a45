//! Port for the surfaces the registration flow drives.

use crate::PaymentConfig;

/// UI surfaces owned by the rendering layer.
pub trait RegistrationUi: Send + Sync {
    fn open_payment_dialog(&self, config: &PaymentConfig);
    fn close_payment_dialog(&self);
    /// Celebratory effect; only requested when reduced motion is off.
    fn celebrate(&self);
    fn open_welcome(&self);
}

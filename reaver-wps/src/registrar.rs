//! Registrar seam
//!
//! The WPS registration protocol itself runs in an external library;
//! the scheduler only needs to hand it the next PIN to present and to
//! withdraw the previous one. The trait keeps that boundary mockable.

use reaver_core::Result;

use crate::pins::PinScheduler;

pub trait Registrar {
    /// Withdraw whatever PIN is currently registered.
    fn invalidate_pin(&mut self) -> Result<()>;

    /// Register `pin` for the next protocol run.
    fn add_pin(&mut self, pin: &str) -> Result<()>;
}

/// Swap the registrar over to the scheduler's current candidate and
/// return it.
pub fn build_next_pin<R: Registrar + ?Sized>(
    scheduler: &PinScheduler,
    registrar: &mut R,
) -> Result<String> {
    registrar.invalidate_pin()?;
    let pin = scheduler.current_pin();
    registrar.add_pin(&pin)?;
    Ok(pin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reaver_core::TargetConfig;

    #[derive(Default)]
    struct MockRegistrar {
        invalidated: usize,
        pins: Vec<String>,
    }

    impl Registrar for MockRegistrar {
        fn invalidate_pin(&mut self) -> Result<()> {
            self.invalidated += 1;
            Ok(())
        }

        fn add_pin(&mut self, pin: &str) -> Result<()> {
            self.pins.push(pin.to_string());
            Ok(())
        }
    }

    #[test]
    fn invalidates_then_registers_current_candidate() {
        let mut s = PinScheduler::generate(&TargetConfig::default());
        let mut reg = MockRegistrar::default();

        let pin = build_next_pin(&s, &mut reg).unwrap();
        assert_eq!(reg.invalidated, 1);
        assert_eq!(reg.pins, vec![pin.clone()]);

        s.advance_p1();
        let next = build_next_pin(&s, &mut reg).unwrap();
        assert_ne!(pin, next);
        assert_eq!(reg.invalidated, 2);
    }
}

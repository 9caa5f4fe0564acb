//! Test-only access token.
//!
//! Test introspection APIs take a [`TestContext`], which can only be obtained
//! from a [`Glean`] running in testing mode. Holding one is the proof that the
//! caller is allowed to drain the dispatcher and read stored values.

use crate::core::{GleanError, Result};
use crate::glean::Glean;
use tracing::trace;

/// Proof that a Glean instance runs in testing mode.
#[derive(Debug)]
pub struct TestContext {
    instance_id: u64,
}

impl TestContext {
    /// Obtain a token for `glean`. Fails with [`GleanError::NotInTestingMode`]
    /// unless the instance was configured with `testing_mode`.
    pub fn acquire(glean: &Glean) -> Result<Self> {
        if !glean.config().testing_mode {
            return Err(GleanError::NotInTestingMode);
        }
        Ok(Self {
            instance_id: glean.instance_id(),
        })
    }

    /// Fail with [`GleanError::ForeignTestContext`] if this token was issued
    /// for another instance.
    pub(crate) fn check(&self, glean: &Glean) -> Result<()> {
        if self.instance_id != glean.instance_id() {
            return Err(GleanError::ForeignTestContext);
        }
        Ok(())
    }

    /// Check the token, then block until every previously launched task of
    /// `glean`'s dispatcher has run.
    pub(crate) fn drain(&self, glean: &Glean) -> Result<()> {
        self.check(glean)?;
        trace!(instance = self.instance_id, "Draining dispatcher for test query");
        glean.dispatcher().block_on_queue()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigBuilder;

    fn glean(testing_mode: bool) -> Glean {
        let config = ConfigBuilder::new().testing_mode(testing_mode).build().unwrap();
        Glean::in_memory(config).unwrap()
    }

    #[test]
    fn test_acquire_requires_testing_mode() {
        assert!(matches!(
            TestContext::acquire(&glean(false)),
            Err(GleanError::NotInTestingMode)
        ));
        assert!(TestContext::acquire(&glean(true)).is_ok());
    }

    #[test]
    fn test_token_is_bound_to_its_instance() {
        let first = glean(true);
        let second = glean(true);
        let ctx = TestContext::acquire(&first).unwrap();

        assert!(ctx.check(&first).is_ok());
        assert!(matches!(ctx.drain(&second), Err(GleanError::ForeignTestContext)));
    }
}

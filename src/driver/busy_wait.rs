use embedded_hal::delay::DelayNs;

use crate::{bus::DisplayBus, driver::Hd44780Device, CharacterDisplayError};

/// Strategy for waiting until the controller is ready to accept the next instruction or data
/// byte. Every gated write runs it first and aborts with its error without touching the bus.
/// The default is `PollingBusyWait`; a platform can substitute its own implementation, for
/// example one that sleeps on an interrupt, as long as it returns `Ok(())` only once the busy
/// flag is clear and `CharacterDisplayError::Timeout` when it gives up.
pub trait BusyWaitStrategy<BUS, DELAY>
where
    BUS: DisplayBus,
    DELAY: DelayNs,
{
    fn wait_for_busy_flag_clear(
        &mut self,
        device: &mut Hd44780Device<BUS, DELAY>,
    ) -> Result<(), CharacterDisplayError<BUS::Error>>;
}

/// Polls the busy flag once per tick until it clears or the timeout budget is spent, which
/// takes at most `timeout_ms / tick_ms` polls, rounded up.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollingBusyWait {
    timeout_ms: u32,
    tick_ms: u32,
}

impl PollingBusyWait {
    pub const DEFAULT_TIMEOUT_MS: u32 = 100;
    pub const DEFAULT_TICK_MS: u32 = 1;

    /// Create a polling strategy. A `tick_ms` of zero is raised to 1 ms and a `timeout_ms`
    /// below one tick is raised to one tick, so the busy flag is always polled at least once.
    pub const fn new(timeout_ms: u32, tick_ms: u32) -> Self {
        let tick_ms = if tick_ms == 0 { 1 } else { tick_ms };
        Self {
            timeout_ms: if timeout_ms < tick_ms { tick_ms } else { timeout_ms },
            tick_ms,
        }
    }

    pub const fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub const fn tick_ms(&self) -> u32 {
        self.tick_ms
    }

    /// Maximum number of status reads before giving up.
    pub const fn max_polls(&self) -> u32 {
        self.timeout_ms.div_ceil(self.tick_ms)
    }
}

impl Default for PollingBusyWait {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT_MS, Self::DEFAULT_TICK_MS)
    }
}

impl<BUS, DELAY> BusyWaitStrategy<BUS, DELAY> for PollingBusyWait
where
    BUS: DisplayBus,
    DELAY: DelayNs,
{
    fn wait_for_busy_flag_clear(
        &mut self,
        device: &mut Hd44780Device<BUS, DELAY>,
    ) -> Result<(), CharacterDisplayError<BUS::Error>> {
        let mut remaining_ms = self.timeout_ms;
        while remaining_ms > 0 {
            if !device.is_busy()? {
                return Ok(());
            }
            device.delay_ms(self.tick_ms);
            remaining_ms = remaining_ms.saturating_sub(self.tick_ms);
        }
        #[cfg(feature = "defmt")]
        defmt::warn!("Busy flag still set after {} ms", self.timeout_ms);
        Err(CharacterDisplayError::Timeout)
    }
}

//! The fixed, nine-member action alphabet invoked by the driver's exit and
//! entry phases.

/// An exit- or entry-phase action the driver hands to the injected
/// [`crate::ActionPolicy`].
///
/// `AcReturn` and `Error` are declared members of the alphabet that no
/// shipped transition table currently produces (spec §9's open
/// questions) - they are kept reachable rather than special-cased away,
/// see `src/driver.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortAction {
    /// No action.
    None,
    /// Unwind back to the caller; the driver short-circuits after this.
    AcReturn,
    /// Physically move an item out of the source slot.
    SourceMove,
    /// Physically move an item into the sink slot.
    SinkMove,
    /// Wake a source waiting for room to fill.
    NotifySource,
    /// Wake a sink waiting for an item to drain.
    NotifySink,
    /// Block the source until room is available, releasing the mutex.
    SourceWait,
    /// Block the sink until an item is available, releasing the mutex.
    SinkWait,
    /// Declared but never tabulated; reaching it is a fatal logic fault.
    Error,
}

impl PortAction {
    /// The stable diagnostic name used in trace lines (spec §6).
    pub const fn name(self) -> &'static str {
        match self {
            PortAction::None => "none",
            PortAction::AcReturn => "ac_return",
            PortAction::SourceMove => "source_move",
            PortAction::SinkMove => "sink_move",
            PortAction::NotifySource => "notify_source",
            PortAction::NotifySink => "notify_sink",
            PortAction::SourceWait => "source_wait",
            PortAction::SinkWait => "sink_wait",
            PortAction::Error => "error",
        }
    }
}

impl core::fmt::Display for PortAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

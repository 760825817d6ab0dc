//! Hardware seams driven by the correction loop.

/// Energizes the coils for an electrical step position.
///
/// Waveform synthesis and current-to-duty conversion live behind this trait.
pub trait CoilDriver {
    /// Hold the rotor at electrical microstep `step`.
    fn drive_coils(&mut self, step: i64);
}

impl<D: CoilDriver + ?Sized> CoilDriver for &mut D {
    fn drive_coils(&mut self, step: i64) {
        (**self).drive_coils(step)
    }
}

/// Periodic timer whose interrupt performs one step.
pub trait StepTimer {
    /// (Re)arm the timer at `hz` interrupts per second.
    fn start(&mut self, hz: u32);

    /// Stop the timer; a pending interrupt may still fire once.
    fn pause(&mut self);
}

impl<T: StepTimer + ?Sized> StepTimer for &mut T {
    fn start(&mut self, hz: u32) {
        (**self).start(hz)
    }

    fn pause(&mut self) {
        (**self).pause()
    }
}

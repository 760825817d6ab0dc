//! Nested interrupt masking.
//!
//! A single [`CriticalSection`] guards every piece of state shared between the
//! foreground context and the motion interrupts. Entering is counted so that a
//! routine calling another guarded routine never unmasks interrupts early:
//! only the outermost guard masks on entry and unmasks on release.

use core::sync::atomic::{AtomicU32, Ordering};

/// Masks and unmasks the interrupt sources that touch shared motion state.
pub trait InterruptMask {
    /// Prevent the motion interrupts from running.
    fn mask(&self);

    /// Allow the motion interrupts to run again.
    fn unmask(&self);
}

impl<M: InterruptMask + ?Sized> InterruptMask for &M {
    fn mask(&self) {
        (**self).mask();
    }

    fn unmask(&self) {
        (**self).unmask();
    }
}

/// Mask for hosts without interrupts (simulation and tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInterrupts;

impl InterruptMask for NoInterrupts {
    #[inline]
    fn mask(&self) {}

    #[inline]
    fn unmask(&self) {}
}

/// Re-entrant critical section with a depth counter.
#[derive(Debug)]
pub struct CriticalSection<M: InterruptMask> {
    /// Number of live guards.
    depth: AtomicU32,
    mask: M,
}

impl<M: InterruptMask> CriticalSection<M> {
    /// Create an unlocked critical section around an interrupt mask.
    pub const fn new(mask: M) -> Self {
        Self {
            depth: AtomicU32::new(0),
            mask,
        }
    }

    /// Enter the critical section; interrupts stay masked until the guard drops.
    pub fn enter(&self) -> CriticalGuard<'_, M> {
        // Load/store only: an interrupt preempting between the two restores
        // the depth before it returns, so no compare-and-swap is needed.
        let depth = self.depth.load(Ordering::Acquire);
        if depth == 0 {
            self.mask.mask();
        }
        self.depth.store(depth + 1, Ordering::Release);
        CriticalGuard { section: self }
    }

    /// Run `f` inside the critical section.
    pub fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter();
        f()
    }

    /// Current nesting depth (0 when interrupts are unmasked).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth.load(Ordering::Acquire)
    }

    /// Whether any guard is currently held.
    #[inline]
    pub fn is_held(&self) -> bool {
        self.depth() > 0
    }

    /// The wrapped interrupt mask.
    #[inline]
    pub fn mask(&self) -> &M {
        &self.mask
    }

    fn exit(&self) {
        let depth = self.depth.load(Ordering::Acquire);
        debug_assert!(depth > 0, "critical section exited more often than entered");
        let depth = depth.saturating_sub(1);
        self.depth.store(depth, Ordering::Release);
        if depth == 0 {
            self.mask.unmask();
        }
    }
}

impl Default for CriticalSection<NoInterrupts> {
    fn default() -> Self {
        Self::new(NoInterrupts)
    }
}

/// Scoped hold on a [`CriticalSection`]; releases on drop.
#[must_use = "the critical section is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct CriticalGuard<'a, M: InterruptMask> {
    section: &'a CriticalSection<M>,
}

impl<M: InterruptMask> Drop for CriticalGuard<'_, M> {
    fn drop(&mut self) {
        self.section.exit();
    }
}

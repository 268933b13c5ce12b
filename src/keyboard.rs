//! Keyboard modifier state and the process-wide hook-ownership registry.

use std::sync::Mutex;

use crate::keymap::{self, KeyClass};

/// Tracked modifier bitmask (`KMOD_*` bits).
#[derive(Debug, Default, Clone, Copy)]
pub struct ModState {
    mods: u32,
}

impl ModState {
    pub fn bits(&self) -> u32 {
        self.mods
    }

    /// Feed a raw virtual-key press/release. Modifier keys update the bitmask
    /// and return the portable key code to report as an ordinary key event;
    /// anything else returns `None` and leaves the state untouched.
    pub fn apply(&mut self, vk: u32, pressed: bool) -> Option<u32> {
        match keymap::classify(vk, false) {
            KeyClass::Modifier { code, kmod } => {
                if pressed {
                    self.mods |= kmod;
                } else {
                    self.mods &= !kmod;
                }
                Some(code)
            }
            _ => None,
        }
    }
}

/// Process-wide "at most one owner" slot for the low-level keyboard hook.
///
/// Modeled as an explicit arbitrated resource rather than a bare global so it
/// can be exercised in tests with a fake owner type. The mutex keeps the slot
/// sound if a host drives instances from more than one thread.
#[derive(Debug)]
pub struct HookRegistry<T> {
    active: Mutex<Option<T>>,
}

impl<T> HookRegistry<T> {
    pub const fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    /// Install `owner`, evicting whatever was installed before (even an owner
    /// belonging to another instance). Returns the evicted occupant so the
    /// caller can tear its native hook down.
    pub fn install(&self, owner: T) -> Option<T> {
        let mut slot = self.active.lock().unwrap_or_else(|e| e.into_inner());
        slot.replace(owner)
    }

    /// Remove `owner` if and only if it is the current occupant. Returns the
    /// occupant for native teardown, or `None` if someone else owns the slot.
    pub fn uninstall(&self, owner: &T) -> Option<T>
    where
        T: PartialEq,
    {
        let mut slot = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref() == Some(owner) {
            slot.take()
        } else {
            None
        }
    }

    /// Snapshot the current occupant.
    pub fn owner(&self) -> Option<T>
    where
        T: Copy,
    {
        let slot = self.active.lock().unwrap_or_else(|e| e.into_inner());
        *slot
    }

    pub fn is_empty(&self) -> bool {
        let slot = self.active.lock().unwrap_or_else(|e| e.into_inner());
        slot.is_none()
    }
}

impl<T> Default for HookRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

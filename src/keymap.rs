//! Stable key/button code space and raw virtual-key classification.
//!
//! Callers branch on these values, so the bit layout is part of the public
//! contract and must not change between releases:
//!
//! * mouse buttons and wheel pseudo-buttons occupy the low five bits of the
//!   button bitmask,
//! * modifier state occupies the low four bits of the modifier bitmask,
//! * named non-printable keys are reported as their raw Win32 virtual-key
//!   code with [`VKEY_EXT`] OR-ed on, which keeps them disjoint from
//!   translated character codes (UTF-16 units, always below `1 << 16`).

/// Left mouse button bit.
pub const MOUSE_LBUTTON: u32 = 1 << 0;
/// Right mouse button bit.
pub const MOUSE_RBUTTON: u32 = 1 << 1;
/// Middle mouse button bit.
pub const MOUSE_MBUTTON: u32 = 1 << 2;
/// Wheel-up pseudo-button, reported as an immediate press+release pair.
pub const MOUSE_WHEELUP: u32 = 1 << 3;
/// Wheel-down pseudo-button, reported as an immediate press+release pair.
pub const MOUSE_WHEELDOWN: u32 = 1 << 4;

/// Mouse-focus bit of the focus bitmask.
pub const FOCUS_MOUSE: u32 = 1 << 0;

/// Left shift modifier bit.
pub const KMOD_LSHIFT: u32 = 1 << 0;
/// Right shift modifier bit.
pub const KMOD_RSHIFT: u32 = 1 << 1;
/// Left control modifier bit.
pub const KMOD_LCTRL: u32 = 1 << 2;
/// Right control modifier bit.
pub const KMOD_RCTRL: u32 = 1 << 3;

/// Extended-key marker, OR-ed onto raw virtual-key codes for named
/// non-printable keys so they never collide with translated characters.
pub const VKEY_EXT: u32 = 1 << 16;

pub const VKEY_BACKSPACE: u32 = VKEY_EXT | 0x08;
pub const VKEY_TAB: u32 = VKEY_EXT | 0x09;
pub const VKEY_RETURN: u32 = VKEY_EXT | 0x0D;
pub const VKEY_ESCAPE: u32 = VKEY_EXT | 0x1B;
pub const VKEY_F1: u32 = VKEY_EXT | 0x70;
pub const VKEY_F2: u32 = VKEY_EXT | 0x71;
pub const VKEY_F3: u32 = VKEY_EXT | 0x72;
pub const VKEY_F4: u32 = VKEY_EXT | 0x73;
pub const VKEY_F5: u32 = VKEY_EXT | 0x74;
pub const VKEY_F6: u32 = VKEY_EXT | 0x75;
pub const VKEY_F7: u32 = VKEY_EXT | 0x76;
pub const VKEY_F8: u32 = VKEY_EXT | 0x77;
pub const VKEY_F9: u32 = VKEY_EXT | 0x78;
pub const VKEY_F10: u32 = VKEY_EXT | 0x79;
pub const VKEY_F11: u32 = VKEY_EXT | 0x7A;
pub const VKEY_F12: u32 = VKEY_EXT | 0x7B;

/// Portable code for the left shift key, reported as an ordinary key event
/// alongside the [`KMOD_LSHIFT`] state change.
pub const VKEY_LSHIFT: u32 = VKEY_EXT | 0xA0;
/// Portable code for the right shift key.
pub const VKEY_RSHIFT: u32 = VKEY_EXT | 0xA1;
/// Portable code for the left control key.
pub const VKEY_LCTRL: u32 = VKEY_EXT | 0xA2;
/// Portable code for the right control key.
pub const VKEY_RCTRL: u32 = VKEY_EXT | 0xA3;

// Raw Win32 virtual-key codes the classifier branches on. Kept as plain
// constants so the classifier stays testable off-platform.
const VK_BACK: u32 = 0x08;
const VK_TAB: u32 = 0x09;
const VK_RETURN: u32 = 0x0D;
const VK_ESCAPE: u32 = 0x1B;
const VK_F1: u32 = 0x70;
const VK_F12: u32 = 0x7B;
const VK_LSHIFT: u32 = 0xA0;
const VK_RSHIFT: u32 = 0xA1;
const VK_LCONTROL: u32 = 0xA2;
const VK_RCONTROL: u32 = 0xA3;
const VK_LMENU: u32 = 0xA4;
const VK_RMENU: u32 = 0xA5;

/// What a raw low-level key event should turn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Left/right shift or control: updates the modifier bitmask and is also
    /// reported as a key event using the given portable code.
    Modifier { code: u32, kmod: u32 },
    /// Named non-printable key (or platform-extended key): reported as the
    /// given `raw | VKEY_EXT` code, bypassing character translation.
    NamedExtended(u32),
    /// Left alt is never delivered reliably; right alt is delivered but
    /// deliberately not forwarded.
    AltIgnored,
    /// Everything else: attempt character translation with the current
    /// keyboard layout.
    Translatable,
}

/// Classify a raw virtual-key code plus the platform "extended" flag.
///
/// Pure mapping, independent of any native event loop.
pub fn classify(vk: u32, extended: bool) -> KeyClass {
    match vk {
        VK_LSHIFT => KeyClass::Modifier {
            code: VKEY_LSHIFT,
            kmod: KMOD_LSHIFT,
        },
        VK_RSHIFT => KeyClass::Modifier {
            code: VKEY_RSHIFT,
            kmod: KMOD_RSHIFT,
        },
        VK_LCONTROL => KeyClass::Modifier {
            code: VKEY_LCTRL,
            kmod: KMOD_LCTRL,
        },
        VK_RCONTROL => KeyClass::Modifier {
            code: VKEY_RCTRL,
            kmod: KMOD_RCTRL,
        },
        VK_LMENU | VK_RMENU => KeyClass::AltIgnored,
        VK_BACK | VK_TAB | VK_RETURN | VK_ESCAPE => KeyClass::NamedExtended(vk | VKEY_EXT),
        VK_F1..=VK_F12 => KeyClass::NamedExtended(vk | VKEY_EXT),
        _ if extended => KeyClass::NamedExtended(vk | VKEY_EXT),
        _ => KeyClass::Translatable,
    }
}

//! Process-wide low-level keyboard interception.
//!
//! Embedding hosts routinely steal keyboard focus from plugin windows, so key
//! events are captured with a WH_KEYBOARD_LL filter while the surface has
//! mouse focus. At most one instance owns the filter at a time; installing
//! for one instance evicts (and unhooks) whoever held it before. The filter
//! always forwards to the next hook in the chain, whether or not it also
//! reported the event.

use tracing::{debug, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyboardState, ToUnicode, VK_CONTROL, VK_LCONTROL, VK_RCONTROL,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT,
    KBDLLHOOKSTRUCT_FLAGS, LLKHF_EXTENDED, WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP,
};

use crate::keyboard::HookRegistry;
use crate::keymap::{classify, KeyClass};
use crate::view::HostView;

/// The currently installed filter and the instance it reports to.
#[derive(Clone, Copy, PartialEq, Eq)]
struct ActiveHook {
    owner: *mut HostView,
    hhook: HHOOK,
}

// The hook is installed and torn down on the host's message-loop thread and
// the filter itself runs on that same thread.
unsafe impl Send for ActiveHook {}

static KHOOK: HookRegistry<ActiveHook> = HookRegistry::new();

fn unhook(active: ActiveHook) {
    if let Err(err) = unsafe { UnhookWindowsHookEx(active.hhook) } {
        warn!(?err, "UnhookWindowsHookEx failed");
    }
}

/// Install the filter for `view`, evicting any previous owner.
pub fn install(view: *mut HostView) {
    if let Some(prev) = KHOOK.owner() {
        KHOOK.uninstall(&prev);
        unhook(prev);
    }

    let hmodule = match unsafe { GetModuleHandleW(None) } {
        Ok(h) => h,
        Err(err) => {
            warn!(?err, "GetModuleHandleW failed; keyboard hook not installed");
            return;
        }
    };

    match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(ll_keyboard_proc), hmodule, 0) } {
        Ok(hhook) => {
            KHOOK.install(ActiveHook { owner: view, hhook });
        }
        Err(err) => warn!(?err, "SetWindowsHookExW(WH_KEYBOARD_LL) failed"),
    }
}

/// Remove the filter if `view` is its current owner; otherwise a no-op.
pub fn uninstall(view: *mut HostView) {
    if let Some(active) = KHOOK.owner() {
        if active.owner == view {
            KHOOK.uninstall(&active);
            unhook(active);
        }
    }
}

/// Whether `view` currently owns the process-wide filter.
pub fn is_owner(view: *const HostView) -> bool {
    KHOOK
        .owner()
        .is_some_and(|active| active.owner as *const HostView == view)
}

/// Translate via the active keyboard layout. The control-key entries of the
/// snapshot are cleared so ctrl+letter yields the plain letter instead of a
/// control character (or nothing).
fn translate_char(vk: u32, scan: u32) -> Option<u16> {
    let mut key_state = [0u8; 256];
    if unsafe { GetKeyboardState(&mut key_state) }.is_err() {
        return None;
    }
    key_state[VK_CONTROL.0 as usize] = 0;
    key_state[VK_LCONTROL.0 as usize] = 0;
    key_state[VK_RCONTROL.0 as usize] = 0;

    let mut buf = [0u16; 8];
    let n = unsafe { ToUnicode(vk, scan, Some(&key_state), &mut buf, 0) };
    if n >= 1 {
        Some(buf[0])
    } else {
        None
    }
}

fn dispatch_key(view: &mut HostView, info: &KBDLLHOOKSTRUCT, pressed: bool) {
    let extended = (info.flags & LLKHF_EXTENDED) != KBDLLHOOKSTRUCT_FLAGS(0);
    match classify(info.vkCode, extended) {
        KeyClass::Modifier { code, .. } => {
            // reported both as a state change and as an ordinary key event
            view.mods.apply(info.vkCode, pressed);
            view.deliver_key(code, pressed);
        }
        KeyClass::NamedExtended(code) => view.deliver_key(code, pressed),
        KeyClass::AltIgnored => {}
        KeyClass::Translatable => match translate_char(info.vkCode, info.scanCode) {
            Some(unit) => view.deliver_key(u32::from(unit), pressed),
            None => debug!(vk = info.vkCode, "ToUnicode produced nothing; key dropped"),
        },
    }
}

unsafe extern "system" fn ll_keyboard_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        if let Some(active) = KHOOK.owner() {
            let pressed = match w_param.0 as u32 {
                WM_KEYDOWN => Some(true),
                WM_KEYUP => Some(false),
                _ => None,
            };
            if let Some(pressed) = pressed {
                let info = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };
                let view = unsafe { &mut *active.owner };
                dispatch_key(view, info, pressed);
            }
        }
    }

    // never block the event from the rest of the system
    unsafe { CallNextHookEx(HHOOK(std::ptr::null_mut()), n_code, w_param, l_param) }
}

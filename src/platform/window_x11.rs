//! X11 window implementation with Cairo surface.

use crate::core::types::{Key, KeyEvent, PointerButton, PointerEvent, Vec2};
use log::error;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use x11::{keysym, xlib};

/// Input decoded from the X event queue, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

pub struct WindowX11 {
    display: *mut xlib::Display,
    window: xlib::Window,
    width: i32,
    height: i32,
    wm_delete_window: xlib::Atom,
    should_close: bool,
    screen: i32,

    // Mouse state tracking
    button_pressed: [bool; 4],

    // Pending events for external consumption
    pending: Vec<WindowEvent>,
}

impl WindowX11 {
    pub fn new() -> Self {
        Self {
            display: ptr::null_mut(),
            window: 0,
            width: 0,
            height: 0,
            wm_delete_window: 0,
            should_close: false,
            screen: 0,
            button_pressed: [false; 4],
            pending: Vec::new(),
        }
    }

    pub fn create(&mut self, width: i32, height: i32, title: &str) -> bool {
        unsafe {
            self.display = xlib::XOpenDisplay(ptr::null());
            if self.display.is_null() {
                error!("Failed to open X11 display");
                return false;
            }

            self.screen = xlib::XDefaultScreen(self.display);
            let root = xlib::XRootWindow(self.display, self.screen);

            self.window = xlib::XCreateSimpleWindow(
                self.display,
                root,
                0,
                0,
                width as u32,
                height as u32,
                0,
                xlib::XBlackPixel(self.display, self.screen),
                xlib::XBlackPixel(self.display, self.screen),
            );

            self.width = width;
            self.height = height;

            if let Ok(title_c) = CString::new(title) {
                xlib::XStoreName(self.display, self.window, title_c.as_ptr());
            }

            xlib::XSelectInput(
                self.display,
                self.window,
                xlib::ExposureMask
                    | xlib::ButtonPressMask
                    | xlib::ButtonReleaseMask
                    | xlib::PointerMotionMask
                    | xlib::LeaveWindowMask
                    | xlib::KeyPressMask
                    | xlib::StructureNotifyMask,
            );

            // WM_DELETE_WINDOW protocol
            if let Ok(wm_delete) = CString::new("WM_DELETE_WINDOW") {
                self.wm_delete_window =
                    xlib::XInternAtom(self.display, wm_delete.as_ptr(), xlib::False);
                xlib::XSetWMProtocols(
                    self.display,
                    self.window,
                    &mut self.wm_delete_window as *mut _,
                    1,
                );
            }

            xlib::XMapWindow(self.display, self.window);
            xlib::XFlush(self.display);

            true
        }
    }

    /// Create a Cairo context for the current window using cairo-sys FFI.
    pub fn create_cairo_context(&self) -> Option<cairo::Context> {
        if self.display.is_null() {
            return None;
        }
        unsafe {
            let visual = xlib::XDefaultVisual(self.display, self.screen);

            let surface_ptr = cairo_sys::cairo_xlib_surface_create(
                self.display,
                self.window,
                visual,
                self.width,
                self.height,
            );

            if surface_ptr.is_null() {
                return None;
            }

            let cr_ptr = cairo_sys::cairo_create(surface_ptr);
            // Surface is now referenced by the context, release our ref
            cairo_sys::cairo_surface_destroy(surface_ptr);

            if cr_ptr.is_null() {
                return None;
            }

            Some(cairo::Context::from_raw_full(cr_ptr))
        }
    }

    /// Process pending X11 events. Returns false if window should close.
    pub fn poll_events(&mut self) -> bool {
        if self.should_close || self.display.is_null() {
            return false;
        }

        unsafe {
            while xlib::XPending(self.display) > 0 {
                let mut event: xlib::XEvent = std::mem::zeroed();
                xlib::XNextEvent(self.display, &mut event);

                match event.get_type() {
                    xlib::ButtonPress => {
                        let btn = event.button;
                        let pos = Vec2::new(btn.x as f64, btn.y as f64);
                        match btn.button {
                            4 | 5 => {
                                let delta = if btn.button == 4 { -1.0 } else { 1.0 };
                                self.pending
                                    .push(WindowEvent::Pointer(PointerEvent::Wheel { pos, delta }));
                            }
                            b => {
                                if let Some(button) = decode_button(b) {
                                    self.button_pressed[b as usize] = true;
                                    self.pending
                                        .push(WindowEvent::Pointer(PointerEvent::Down { pos, button }));
                                }
                            }
                        }
                    }
                    xlib::ButtonRelease => {
                        let btn = event.button;
                        if let Some(button) = decode_button(btn.button) {
                            self.button_pressed[btn.button as usize] = false;
                            let pos = Vec2::new(btn.x as f64, btn.y as f64);
                            self.pending
                                .push(WindowEvent::Pointer(PointerEvent::Up { pos, button }));
                        }
                    }
                    xlib::MotionNotify => {
                        let motion = event.motion;
                        let dragging = self.button_pressed.iter().any(|&b| b);
                        self.pending.push(WindowEvent::Pointer(PointerEvent::Move {
                            pos: Vec2::new(motion.x as f64, motion.y as f64),
                            dragging,
                        }));
                    }
                    xlib::LeaveNotify => {
                        self.button_pressed = [false; 4];
                        self.pending.push(WindowEvent::Pointer(PointerEvent::Leave));
                    }
                    xlib::KeyPress => {
                        let mut key_event = event.key;
                        let mut buf = [0 as c_char; 16];
                        let mut sym: xlib::KeySym = 0;
                        let n = xlib::XLookupString(
                            &mut key_event,
                            buf.as_mut_ptr(),
                            buf.len() as i32,
                            &mut sym,
                            ptr::null_mut(),
                        );
                        // XLookupString yields Latin-1, which maps 1:1 onto the first 256 chars.
                        let text: String = buf[..n.clamp(0, buf.len() as i32) as usize]
                            .iter()
                            .map(|&c| c as u8 as char)
                            .collect();
                        if let Some(key) = decode_key(sym as u32, &text) {
                            self.pending.push(WindowEvent::Key(KeyEvent {
                                key,
                                ctrl: key_event.state & xlib::ControlMask != 0,
                                shift: key_event.state & xlib::ShiftMask != 0,
                            }));
                        }
                    }
                    xlib::ConfigureNotify => {
                        let configure = event.configure;
                        if configure.width != self.width || configure.height != self.height {
                            self.width = configure.width;
                            self.height = configure.height;
                        }
                    }
                    xlib::ClientMessage => {
                        let cm = event.client_message;
                        if cm.data.get_long(0) as xlib::Atom == self.wm_delete_window {
                            self.should_close = true;
                            return false;
                        }
                    }
                    _ => {}
                }
            }
        }

        !self.should_close
    }

    /// Drain pending input events.
    pub fn take_events(&mut self) -> Vec<WindowEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn flush(&self) {
        if self.display.is_null() {
            return;
        }
        unsafe {
            xlib::XFlush(self.display);
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }
}

impl Default for WindowX11 {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WindowX11 {
    fn drop(&mut self) {
        unsafe {
            if !self.display.is_null() {
                xlib::XDestroyWindow(self.display, self.window);
                xlib::XCloseDisplay(self.display);
            }
        }
    }
}

fn decode_button(button: u32) -> Option<PointerButton> {
    match button {
        1 => Some(PointerButton::Primary),
        2 => Some(PointerButton::Middle),
        3 => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// Map an X keysym (plus its Latin-1 text) onto the keys the shell understands.
pub fn decode_key(sym: u32, text: &str) -> Option<Key> {
    match sym {
        keysym::XK_Left => Some(Key::Left),
        keysym::XK_Right => Some(Key::Right),
        keysym::XK_Return | keysym::XK_KP_Enter => Some(Key::Enter),
        keysym::XK_BackSpace => Some(Key::Backspace),
        keysym::XK_Escape => Some(Key::Escape),
        keysym::XK_Tab => Some(Key::Tab),
        s if (keysym::XK_F1..=keysym::XK_F12).contains(&s) => {
            Some(Key::F((s - keysym::XK_F1 + 1) as u8))
        }
        keysym::XK_KP_Add => Some(Key::Char('+')),
        keysym::XK_KP_Subtract => Some(Key::Char('-')),
        // Latin-1 keysyms equal their code points; this also survives Ctrl.
        s @ (0x20..=0x7e | 0xa0..=0xff) => char::from_u32(s).map(Key::Char),
        _ => text.chars().next().filter(|c| !c.is_control()).map(Key::Char),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named_keys() {
        assert_eq!(decode_key(keysym::XK_Return, "\r"), Some(Key::Enter));
        assert_eq!(decode_key(keysym::XK_BackSpace, "\u{8}"), Some(Key::Backspace));
        assert_eq!(decode_key(keysym::XK_F2, ""), Some(Key::F(2)));
        assert_eq!(decode_key(keysym::XK_F12, ""), Some(Key::F(12)));
    }

    #[test]
    fn test_decode_text_keys() {
        assert_eq!(decode_key(keysym::XK_n, "n"), Some(Key::Char('n')));
        assert_eq!(decode_key(keysym::XK_ntilde, "\u{f1}"), Some(Key::Char('ñ')));
        assert_eq!(decode_key(keysym::XK_Shift_L, ""), None);
        assert_eq!(decode_key(keysym::XK_q, "\u{11}"), Some(Key::Char('q')));
    }
}

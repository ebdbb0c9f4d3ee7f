use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    ffi::c_void,
    mem,
    sync::OnceLock,
};

use image::{Rgb, RgbaImage};
use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{
            BeginPaint, CreateSolidBrush, DeleteObject, DrawTextW, EndPaint, FillRect,
            InvalidateRect, SetBkMode, SetDIBitsToDevice, BITMAPINFO, BITMAPINFOHEADER, BI_RGB,
            DIB_RGB_COLORS, DT_CENTER, DT_SINGLELINE, DT_VCENTER, HDC, PAINTSTRUCT, TRANSPARENT,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            AdjustWindowRectEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
            GetClientRect, GetSystemMetrics, IsWindow, LoadCursorW, PeekMessageW, PostQuitMessage,
            RegisterClassW, SetLayeredWindowAttributes, SetWindowPos, ShowWindow,
            TranslateMessage, HWND_TOPMOST, IDC_ARROW, LWA_ALPHA, LWA_COLORKEY, MSG, PM_REMOVE,
            SM_CXSCREEN, SM_CYSCREEN, SWP_NOACTIVATE, SWP_NOSIZE, SWP_NOZORDER, SWP_SHOWWINDOW,
            SW_SHOWNOACTIVATE, WINDOW_EX_STYLE, WINDOW_STYLE, WM_DESTROY, WM_ERASEBKGND,
            WM_PAINT, WM_QUIT, WNDCLASSW, WS_CAPTION, WS_EX_LAYERED, WS_EX_NOACTIVATE,
            WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP, WS_SYSMENU, WS_VISIBLE,
        },
    },
};

use crate::{
    error::DesktopError,
    platform::{keyed_bgra, Desktop, WindowId, COLOR_KEY},
    popup::Rect,
    utility::to_wstring,
    warn,
};

const WINDOW_CLASS_NAME: PCWSTR = w!("RickrollWindow");
const TEXT_BACKGROUND: COLORREF = colorref(255, 255, 255);

/// What a window paints on `WM_PAINT`.
enum Surface {
    Pixels {
        width: u32,
        height: u32,
        bgra: Vec<u8>,
    },
    Text(Vec<u16>),
    Fill(COLORREF),
}

thread_local! {
    static SURFACES: RefCell<HashMap<isize, Surface>> = RefCell::new(HashMap::new());
    static MAIN_WINDOW: Cell<isize> = const { Cell::new(0) };
}

const fn colorref(r: u8, g: u8, b: u8) -> COLORREF {
    COLORREF((r as u32) | ((g as u32) << 8) | ((b as u32) << 16))
}

fn key(hwnd: HWND) -> isize {
    hwnd.0 as isize
}

fn hwnd(window: WindowId) -> HWND {
    HWND(window.0 as *mut c_void)
}

fn module_instance() -> Result<HINSTANCE, DesktopError> {
    unsafe {
        GetModuleHandleW(None)
            .map(|h| HINSTANCE(h.0))
            .map_err(|e| DesktopError::CreateWindow(format!("GetModuleHandleW failed: {e:?}")))
    }
}

fn ensure_window_class(instance: HINSTANCE) -> Result<(), DesktopError> {
    static CLASS_ONCE: OnceLock<bool> = OnceLock::new();
    if CLASS_ONCE.get().is_some() {
        return Ok(());
    }

    let wc = WNDCLASSW {
        lpfnWndProc: Some(window_proc),
        hInstance: instance,
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW).unwrap_or_default() },
        lpszClassName: WINDOW_CLASS_NAME,
        ..Default::default()
    };

    if unsafe { RegisterClassW(&wc) } == 0 {
        return Err(DesktopError::RegisterClass(format!(
            "RegisterClassW failed: {:?}",
            windows::core::Error::from_win32()
        )));
    }

    let _ = CLASS_ONCE.set(true);
    Ok(())
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            unsafe { paint(hwnd) };
            LRESULT(0)
        }
        WM_DESTROY => {
            SURFACES.with(|surfaces| surfaces.borrow_mut().remove(&key(hwnd)));
            if MAIN_WINDOW.with(Cell::get) == key(hwnd) {
                unsafe { PostQuitMessage(0) };
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

unsafe fn paint(hwnd: HWND) {
    let mut ps = PAINTSTRUCT::default();
    let hdc = unsafe { BeginPaint(hwnd, &mut ps) };
    if hdc.0.is_null() {
        return;
    }

    let mut client = RECT::default();
    let _ = unsafe { GetClientRect(hwnd, &mut client) };
    let [kr, kg, kb] = COLOR_KEY;

    SURFACES.with(|surfaces| match surfaces.borrow().get(&key(hwnd)) {
        Some(Surface::Pixels {
            width,
            height,
            bgra,
        }) => unsafe { blit(hdc, *width, *height, bgra) },
        Some(Surface::Text(text)) => unsafe {
            fill(hdc, &client, TEXT_BACKGROUND);
            SetBkMode(hdc, TRANSPARENT);
            let mut text = text.clone();
            let mut rect = client;
            DrawTextW(hdc, &mut text, &mut rect, DT_CENTER | DT_VCENTER | DT_SINGLELINE);
        },
        Some(Surface::Fill(color)) => unsafe { fill(hdc, &client, *color) },
        None => unsafe { fill(hdc, &client, colorref(kr, kg, kb)) },
    });

    unsafe {
        let _ = EndPaint(hwnd, &ps);
    }
}

unsafe fn fill(hdc: HDC, rect: &RECT, color: COLORREF) {
    unsafe {
        let brush = CreateSolidBrush(color);
        FillRect(hdc, rect, brush);
        let _ = DeleteObject(brush.into());
    }
}

unsafe fn blit(hdc: HDC, width: u32, height: u32, bgra: &[u8]) {
    let mut bmi = BITMAPINFO::default();
    bmi.bmiHeader = BITMAPINFOHEADER {
        biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
        biWidth: width as i32,
        biHeight: -(height as i32),
        biPlanes: 1,
        biBitCount: 32,
        biCompression: BI_RGB.0,
        ..Default::default()
    };

    unsafe {
        SetDIBitsToDevice(
            hdc,
            0,
            0,
            width,
            height,
            0,
            0,
            0,
            height,
            bgra.as_ptr() as *const c_void,
            &bmi,
            DIB_RGB_COLORS,
        );
    }
}

/// Grows a client-area rect to the window rect `style` needs, so a titled
/// popup keeps the requested text area. The client origin stays at `client`.
fn outer_rect(client: Rect, style: WINDOW_STYLE, ex_style: WINDOW_EX_STYLE) -> Rect {
    let mut rect = RECT {
        left: client.x,
        top: client.y,
        right: client.x + client.width as i32,
        bottom: client.y + client.height as i32,
    };
    if unsafe { AdjustWindowRectEx(&mut rect, style, false, ex_style) }.is_err() {
        return client;
    }

    Rect {
        x: rect.left,
        y: rect.top,
        width: (rect.right - rect.left).max(1) as u32,
        height: (rect.bottom - rect.top).max(1) as u32,
    }
}

/// Popups and the disco overlay as real top-level windows. Must be created
/// and used on the thread that pumps messages.
pub struct Win32Desktop {
    instance: HINSTANCE,
    main: HWND,
    screen: (u32, u32),
}

impl Win32Desktop {
    /// Registers the window class and creates the hidden main window that
    /// later carries the disco overlay. Destroying it ends the event loop.
    pub fn new() -> Result<Self, DesktopError> {
        let instance = module_instance()?;
        ensure_window_class(instance)?;

        let screen = unsafe {
            (
                GetSystemMetrics(SM_CXSCREEN).max(1) as u32,
                GetSystemMetrics(SM_CYSCREEN).max(1) as u32,
            )
        };

        let mut desktop = Self {
            instance,
            main: HWND::default(),
            screen,
        };
        let main = desktop.create(
            WS_EX_LAYERED | WS_EX_TOOLWINDOW,
            WS_POPUP,
            Rect {
                x: 0,
                y: 0,
                width: screen.0,
                height: screen.1,
            },
            w!("Rickroll"),
        )?;
        desktop.main = main;
        MAIN_WINDOW.with(|m| m.set(key(main)));

        Ok(desktop)
    }

    fn create(
        &self,
        ex_style: WINDOW_EX_STYLE,
        style: WINDOW_STYLE,
        rect: Rect,
        title: PCWSTR,
    ) -> Result<HWND, DesktopError> {
        unsafe {
            CreateWindowExW(
                ex_style,
                WINDOW_CLASS_NAME,
                title,
                style,
                rect.x,
                rect.y,
                rect.width as i32,
                rect.height as i32,
                None,
                None,
                Some(self.instance),
                None,
            )
        }
        .map_err(|e| DesktopError::CreateWindow(format!("CreateWindowExW failed: {e:?}")))
    }

    fn set_surface(&self, hwnd: HWND, surface: Surface) {
        SURFACES.with(|surfaces| surfaces.borrow_mut().insert(key(hwnd), surface));
        unsafe {
            let _ = InvalidateRect(Some(hwnd), None, false);
        }
    }
}

impl Desktop for Win32Desktop {
    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn open_image_popup(&mut self, rect: Rect) -> Result<WindowId, DesktopError> {
        let hwnd = self.create(
            WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE,
            WS_POPUP,
            rect,
            PCWSTR::null(),
        )?;

        let [kr, kg, kb] = COLOR_KEY;
        unsafe {
            if let Err(e) = SetLayeredWindowAttributes(hwnd, colorref(kr, kg, kb), 0, LWA_COLORKEY) {
                let _ = DestroyWindow(hwnd);
                return Err(DesktopError::CreateWindow(format!(
                    "SetLayeredWindowAttributes failed: {e:?}"
                )));
            }
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
        }

        Ok(WindowId(key(hwnd)))
    }

    fn open_text_popup(
        &mut self,
        rect: Rect,
        title: &str,
        text: &str,
    ) -> Result<WindowId, DesktopError> {
        let title = to_wstring(title);
        let style = WS_CAPTION | WS_SYSMENU | WS_VISIBLE;
        let hwnd = self.create(
            WS_EX_TOPMOST,
            style,
            outer_rect(rect, style, WS_EX_TOPMOST),
            PCWSTR(title.as_ptr()),
        )?;

        self.set_surface(hwnd, Surface::Text(text.encode_utf16().collect()));
        Ok(WindowId(key(hwnd)))
    }

    fn show_frame(&mut self, window: WindowId, frame: &RgbaImage) {
        if !self.is_alive(window) {
            return;
        }

        let (width, height) = frame.dimensions();
        self.set_surface(
            hwnd(window),
            Surface::Pixels {
                width,
                height,
                bgra: keyed_bgra(frame),
            },
        );
    }

    fn move_window(&mut self, window: WindowId, x: i32, y: i32) {
        unsafe {
            let _ = SetWindowPos(
                hwnd(window),
                None,
                x,
                y,
                0,
                0,
                SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            );
        }
    }

    fn close(&mut self, window: WindowId) {
        unsafe {
            if let Err(e) = DestroyWindow(hwnd(window)) {
                warn!("[RICKROLL][POPUP] DestroyWindow failed for {:?}: {:?}", window, e);
            }
        }
    }

    fn is_alive(&self, window: WindowId) -> bool {
        unsafe { IsWindow(Some(hwnd(window))).as_bool() }
    }

    fn disco(&mut self, color: Rgb<u8>, alpha: f32) -> bool {
        if !unsafe { IsWindow(Some(self.main)).as_bool() } {
            return false;
        }

        let [r, g, b] = color.0;
        let (width, height) = self.screen;
        unsafe {
            let _ = SetLayeredWindowAttributes(
                self.main,
                COLORREF(0),
                (alpha.clamp(0.0, 1.0) * 255.0) as u8,
                LWA_ALPHA,
            );
            let _ = SetWindowPos(
                self.main,
                Some(HWND_TOPMOST),
                0,
                0,
                width as i32,
                height as i32,
                SWP_NOACTIVATE | SWP_SHOWWINDOW,
            );
        }
        self.set_surface(self.main, Surface::Fill(colorref(r, g, b)));
        true
    }

    fn pump_events(&mut self) -> bool {
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_QUIT {
                    warn!("[RICKROLL] WM_QUIT received, shutting down");
                    return false;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        true
    }
}
